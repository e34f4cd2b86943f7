//! The interaction loop's state: connection, conversation, results and the
//! voice components, driven by user input, recognizer events and synthesizer
//! events.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use homefinder_core::config::SessionSettings;
use homefinder_core::traits::{GenerativeLookup, PropertySearch};
use homefinder_core::types::Property;
use homefinder_resolve::narration::{TROUBLE_MESSAGE, WELCOME_MESSAGE};
use homefinder_resolve::{Coordinator, Resolution};
use homefinder_voice::{
    final_transcript, Listener, QueueProgress, SpeechQueue, SynthesisEvent, VoiceError, VoiceEvent,
};

use crate::conversation::{Conversation, ConversationTurn};

pub const START_FAILED_WARNING: &str = "Failed to start voice recognition. Please check microphone permissions.";

pub const UNSUPPORTED_WARNING: &str = "Speech recognition is not supported on this device.";

pub const SYNTHESIS_WARNING: &str = "Speech synthesis error.";

pub fn recognition_warning(error: &str) -> String { format!("Voice recognition error: {error}") }

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("not connected")]
    NotConnected,
    #[error("empty query")]
    Empty,
    #[error("a request is already being processed")]
    Busy,
    #[error("the conversation was reset before the answer arrived")]
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// A query accepted by [`Session::begin_turn`], waiting for its outcome.
/// Only valid for the conversation it was started in.
#[derive(Debug)]
pub struct PendingTurn {
    query: String,
    epoch: u64,
}

impl PendingTurn {
    pub fn query(&self) -> &str { &self.query }
}

#[derive(Debug, Clone)]
pub enum TurnOutcome {
    Resolved(Resolution),
    TimedOut,
}

/// Resolves `query`, giving up after `timeout`.
pub async fn run_turn<S, L>(coordinator: &Coordinator<S, L>, query: &str, timeout: Duration) -> TurnOutcome
where
    S: PropertySearch,
    L: GenerativeLookup,
{
    match tokio::time::timeout(timeout, coordinator.resolve(query)).await {
        Ok(resolution) => TurnOutcome::Resolved(resolution),
        Err(_) => {
            warn!(query, timeout_ms = timeout.as_millis() as u64, "turn timed out");
            TurnOutcome::TimedOut
        }
    }
}

pub struct Session<S, L>
where
    S: PropertySearch,
    L: GenerativeLookup,
{
    coordinator: Arc<Coordinator<S, L>>,
    listener: Listener,
    speech: SpeechQueue,
    conversation: Conversation,
    results: Vec<Property>,
    current: Option<Property>,
    warning: Option<String>,
    connection: ConnectionState,
    pending: bool,
    /// Bumped whenever the conversation is reset; older turns are stale.
    epoch: u64,
    turn_timeout: Duration,
}

impl<S, L> Session<S, L>
where
    S: PropertySearch,
    L: GenerativeLookup,
{
    pub fn new(coordinator: Coordinator<S, L>, listener: Listener, speech: SpeechQueue, settings: &SessionSettings) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            listener,
            speech,
            conversation: Conversation::new(),
            results: Vec::new(),
            current: None,
            warning: None,
            connection: ConnectionState::Disconnected,
            pending: false,
            epoch: 0,
            turn_timeout: Duration::from_secs(settings.turn_timeout_secs.max(1)),
        }
    }

    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    /// Shared handle so a turn can be resolved while the session keeps
    /// handling voice events.
    pub fn coordinator(&self) -> Arc<Coordinator<S, L>> { Arc::clone(&self.coordinator) }

    pub fn turn_timeout(&self) -> Duration { self.turn_timeout }

    pub fn conversation(&self) -> &[ConversationTurn] { self.conversation.turns() }

    pub fn results(&self) -> &[Property] { &self.results }

    pub fn current_property(&self) -> Option<&Property> { self.current.as_ref() }

    pub fn warning(&self) -> Option<&str> { self.warning.as_deref() }

    pub fn connection(&self) -> ConnectionState { self.connection }

    pub fn is_connected(&self) -> bool { self.connection == ConnectionState::Connected }

    pub fn is_pending(&self) -> bool { self.pending }

    pub fn is_speaking(&self) -> bool { self.speech.is_speaking() }

    pub fn is_listening(&self) -> bool { self.listener.is_listening() }

    pub fn listener(&self) -> &Listener { &self.listener }

    /// Greets the user. No-op when already connected.
    pub fn connect(&mut self) {
        if self.is_connected() {
            return;
        }
        self.connection = ConnectionState::Connected;
        self.warning = (!self.listener.is_supported()).then(|| UNSUPPORTED_WARNING.to_string());
        self.conversation.push_bot(WELCOME_MESSAGE);
        self.speak(WELCOME_MESSAGE);
        info!("session connected");
    }

    /// Stops voice input and output and forgets the conversation.
    pub fn disconnect(&mut self) {
        self.listener.stop_listening();
        self.speech.cancel();
        self.reset();
        self.connection = ConnectionState::Disconnected;
        info!("session disconnected");
    }

    pub fn clear(&mut self) {
        self.reset();
        debug!("conversation cleared");
    }

    /// Accepts a query for resolution and records it as a user turn.
    pub fn begin_turn(&mut self, text: &str) -> Result<PendingTurn, SubmitError> {
        if !self.is_connected() {
            return Err(SubmitError::NotConnected);
        }
        let query = text.trim();
        if query.is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.pending {
            return Err(SubmitError::Busy);
        }
        self.pending = true;
        self.conversation.push_user(query);
        Ok(PendingTurn { query: query.to_string(), epoch: self.epoch })
    }

    /// Records the bot's answer for `turn` and narrates it. Returns `None`
    /// and changes nothing when the conversation was reset since the turn
    /// began.
    pub fn finish_turn(&mut self, turn: PendingTurn, outcome: TurnOutcome) -> Option<&ConversationTurn> {
        if turn.epoch != self.epoch {
            debug!(query = %turn.query, "dropping answer for a reset conversation");
            return None;
        }
        self.pending = false;
        let answer = match outcome {
            TurnOutcome::Resolved(resolution) => {
                debug!(query = %turn.query, results = resolution.results.len(), source = ?resolution.source, "turn resolved");
                self.current = resolution.featured().cloned();
                self.results = resolution.results;
                self.speak(&resolution.narration);
                self.conversation.push_bot(resolution.narration)
            }
            TurnOutcome::TimedOut => self.conversation.push_bot(TROUBLE_MESSAGE),
        };
        Some(answer)
    }

    /// Gives up on the pending turn without an outcome (its task was lost).
    pub fn abandon_turn(&mut self) {
        if self.pending {
            self.pending = false;
            self.conversation.push_bot(TROUBLE_MESSAGE);
        }
    }

    /// `begin_turn`, resolve within the turn timeout, `finish_turn`.
    pub async fn submit(&mut self, text: &str) -> Result<&ConversationTurn, SubmitError> {
        let turn = self.begin_turn(text)?;
        let coordinator = self.coordinator();
        let outcome = run_turn(&*coordinator, turn.query(), self.turn_timeout).await;
        self.finish_turn(turn, outcome).ok_or(SubmitError::Superseded)
    }

    /// Starts or stops voice input; returns whether the session is now listening.
    pub fn toggle_listening(&mut self) -> bool {
        if self.listener.is_listening() {
            self.listener.stop_listening();
            return false;
        }
        match self.listener.start_listening() {
            Ok(()) => {
                self.warning = None;
                true
            }
            Err(VoiceError::Unsupported) => {
                self.warning = Some(UNSUPPORTED_WARNING.to_string());
                false
            }
            Err(e) => {
                warn!(error = %e, "could not start listening");
                self.warning = Some(START_FAILED_WARNING.to_string());
                false
            }
        }
    }

    /// Applies a recognizer event; returns the final transcript, if the event
    /// carried one.
    pub fn handle_voice_event(&mut self, event: VoiceEvent) -> Option<String> {
        self.listener.observe(&event);
        match event {
            VoiceEvent::Started => {
                self.warning = None;
                None
            }
            VoiceEvent::Results(results) => final_transcript(&results),
            VoiceEvent::Error(e) => {
                warn!(error = %e, "speech recognition error");
                self.warning = Some(recognition_warning(&e));
                None
            }
            VoiceEvent::Ended => None,
        }
    }

    pub fn handle_synthesis_event(&mut self, event: SynthesisEvent) -> QueueProgress {
        let progress = self.speech.handle(event);
        if let QueueProgress::Failed(_) = &progress {
            self.warning = Some(SYNTHESIS_WARNING.to_string());
        }
        progress
    }

    pub fn stop_speaking(&mut self) { self.speech.cancel(); }

    /// Releases the voice components. The session stays readable.
    pub fn dispose(&mut self) {
        self.speech.cancel();
        self.listener.dispose();
        self.connection = ConnectionState::Disconnected;
    }

    fn speak(&mut self, text: &str) {
        if let Err(e) = self.speech.speak(text) {
            warn!(error = %e, "could not start narration");
            self.warning = Some(SYNTHESIS_WARNING.to_string());
        }
    }

    fn reset(&mut self) {
        self.epoch += 1;
        self.pending = false;
        self.conversation.clear();
        self.results.clear();
        self.current = None;
        self.warning = None;
    }
}
