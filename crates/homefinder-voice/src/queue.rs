//! Line-by-line narration queue.
//!
//! Text is split into lines and spoken one utterance at a time; the next line
//! is only handed to the synthesizer once the current one reports
//! `Finished`. Every utterance gets a fresh [`UtteranceTicket`], so events
//! from a cancelled or superseded narration are ignored.

use tracing::{debug, warn};

use homefinder_core::config::VoiceSettings;

use crate::error::VoiceError;
use crate::synth::{select_voice, SpeechSynthesizer, SynthesisEvent, Utterance, UtteranceTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    Speaking { line: usize },
    Cancelled,
}

/// What a synthesis event did to the queue.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueProgress {
    /// Stale ticket or an event that changes nothing.
    Ignored,
    Advanced { line: usize },
    Completed,
    Failed(VoiceError),
}

/// Non-empty lines of `text`; runs of newlines count as one break.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub struct SpeechQueue {
    synth: Box<dyn SpeechSynthesizer>,
    settings: VoiceSettings,
    voice: Option<String>,
    lines: Vec<String>,
    state: QueueState,
    current: Option<UtteranceTicket>,
    next_ticket: u64,
}

impl SpeechQueue {
    pub fn new(synth: Box<dyn SpeechSynthesizer>, settings: VoiceSettings) -> Self {
        let voice = select_voice(&synth.voices(), &settings.language).map(|v| v.name.clone());
        debug!(voice = ?voice, "speech queue ready");
        Self { synth, settings, voice, lines: Vec::new(), state: QueueState::Idle, current: None, next_ticket: 0 }
    }

    pub fn state(&self) -> QueueState { self.state }

    pub fn is_speaking(&self) -> bool { matches!(self.state, QueueState::Speaking { .. }) }

    pub fn current_ticket(&self) -> Option<UtteranceTicket> { self.current }

    pub fn voice(&self) -> Option<&str> { self.voice.as_deref() }

    pub fn lines(&self) -> &[String] { &self.lines }

    /// Starts narrating `text`, superseding anything still playing.
    pub fn speak(&mut self, text: &str) -> Result<(), VoiceError> {
        if self.is_speaking() {
            self.synth.cancel();
        }
        self.lines = split_lines(text);
        self.current = None;
        if self.lines.is_empty() {
            self.state = QueueState::Idle;
            return Ok(());
        }
        self.speak_line(0)
    }

    /// Stops playback; pending lines are dropped.
    pub fn cancel(&mut self) {
        if self.is_speaking() {
            self.synth.cancel();
            self.state = QueueState::Cancelled;
        }
        self.current = None;
        self.lines.clear();
    }

    pub fn handle(&mut self, event: SynthesisEvent) -> QueueProgress {
        if self.current != Some(event.ticket()) {
            debug!(ticket = ?event.ticket(), "ignoring stale synthesis event");
            return QueueProgress::Ignored;
        }
        let QueueState::Speaking { line } = self.state else { return QueueProgress::Ignored };
        match event {
            SynthesisEvent::Started(_) => QueueProgress::Ignored,
            SynthesisEvent::Finished(_) if line + 1 < self.lines.len() => match self.speak_line(line + 1) {
                Ok(()) => QueueProgress::Advanced { line: line + 1 },
                Err(e) => QueueProgress::Failed(e),
            },
            SynthesisEvent::Finished(_) => {
                self.state = QueueState::Idle;
                self.current = None;
                QueueProgress::Completed
            }
            SynthesisEvent::Failed(_, reason) => {
                warn!(line, %reason, "speech synthesis failed");
                self.state = QueueState::Idle;
                self.current = None;
                QueueProgress::Failed(VoiceError::Synthesis(reason))
            }
        }
    }

    fn speak_line(&mut self, line: usize) -> Result<(), VoiceError> {
        let ticket = UtteranceTicket(self.next_ticket);
        self.next_ticket += 1;
        let utterance = Utterance {
            ticket,
            text: self.lines[line].clone(),
            settings: self.settings.clone(),
            voice: self.voice.clone(),
        };
        match self.synth.speak(utterance) {
            Ok(()) => {
                self.state = QueueState::Speaking { line };
                self.current = Some(ticket);
                Ok(())
            }
            Err(e) => {
                self.state = QueueState::Idle;
                self.current = None;
                Err(e)
            }
        }
    }
}
