//! Shared setup for the homefinder binaries and the terminal stand-ins for
//! speech input and output.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use homefinder_core::catalog::CatalogLoader;
use homefinder_core::config::{Settings, VoiceSettings};
use homefinder_match::{CatalogIndex, LocalMatcher, LocalSearch};
use homefinder_voice::{
    RecognitionResult, SpeechRecognizer, SpeechSynthesizer, SynthesisEvent, Utterance, VoiceError, VoiceEvent,
    VoiceEventHub,
};

/// Logs to stderr; `RUST_LOG` overrides the default filter.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Loads the configured catalog (or the built-in one) and wraps it in a
/// local search.
pub fn build_search(settings: &Settings, base: &Path) -> anyhow::Result<LocalSearch> {
    let dir = settings.catalog.resolved_dir(base);
    let records = CatalogLoader::new().load(dir.as_deref())?;
    let index = CatalogIndex::build(records);
    info!(properties = index.len(), skipped = index.skipped(), "catalog loaded");
    Ok(LocalSearch::new(index, LocalMatcher::new(settings.matcher.clone())))
}

const MILLIS_PER_WORD: f32 = 60.0;

/// Prints each utterance and reports it finished after a pause roughly as
/// long as speaking it would take.
pub struct TerminalSynthesizer {
    events: mpsc::UnboundedSender<SynthesisEvent>,
}

impl TerminalSynthesizer {
    pub fn new(events: mpsc::UnboundedSender<SynthesisEvent>) -> Self { Self { events } }
}

impl SpeechSynthesizer for TerminalSynthesizer {
    fn speak(&mut self, utterance: Utterance) -> Result<(), VoiceError> {
        println!("🔊 {}", utterance.text);
        let words = utterance.text.split_whitespace().count() as f32;
        let pause = Duration::from_millis((words * MILLIS_PER_WORD / utterance.settings.rate.max(0.1)) as u64);
        let events = self.events.clone();
        let ticket = utterance.ticket;
        events
            .send(SynthesisEvent::Started(ticket))
            .map_err(|_| VoiceError::Synthesis("speech output closed".into()))?;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(pause).await;
                    let _ = events.send(SynthesisEvent::Finished(ticket));
                });
            }
            Err(_) => {
                let _ = events.send(SynthesisEvent::Finished(ticket));
            }
        }
        Ok(())
    }

    fn cancel(&mut self) { println!("🔇"); }
}

/// Dictation state shared between the REPL and [`ConsoleRecognizer`]: while
/// active, typed lines are treated as recognized speech.
#[derive(Clone, Default)]
pub struct Dictation {
    active: Arc<Mutex<Option<ActiveDictation>>>,
}

struct ActiveDictation {
    hub: VoiceEventHub,
    continuous: bool,
}

impl Dictation {
    pub fn is_active(&self) -> bool { self.lock().is_some() }

    /// Publishes `line` as a final result. A non-continuous dictation ends
    /// after one line. Returns false when no dictation was active.
    pub fn deliver(&self, line: &str) -> bool {
        let mut active = self.lock();
        let Some(current) = active.as_ref() else { return false };
        current.hub.publish(VoiceEvent::Results(vec![RecognitionResult::finalized(line)]));
        if !current.continuous {
            current.hub.publish(VoiceEvent::Ended);
            *active = None;
        }
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ActiveDictation>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct ConsoleRecognizer {
    dictation: Dictation,
}

impl ConsoleRecognizer {
    pub fn new(dictation: Dictation) -> Self { Self { dictation } }
}

impl SpeechRecognizer for ConsoleRecognizer {
    fn start(&mut self, settings: &VoiceSettings, events: VoiceEventHub) -> Result<(), VoiceError> {
        info!(language = %settings.language, continuous = settings.continuous, "dictation started");
        events.publish(VoiceEvent::Started);
        *self.dictation.lock() = Some(ActiveDictation { hub: events, continuous: settings.continuous });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(current) = self.dictation.lock().take() {
            current.hub.publish(VoiceEvent::Ended);
        }
    }
}
