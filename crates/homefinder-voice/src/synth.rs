//! Speech synthesis seam.

use homefinder_core::config::VoiceSettings;

use crate::error::VoiceError;

/// Identifies one utterance; events carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceTicket(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub ticket: UtteranceTicket,
    pub text: String,
    pub settings: VoiceSettings,
    /// Name of the selected voice, if any was available.
    pub voice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    pub language: String,
}

impl VoiceInfo {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self { name: name.into(), language: language.into() }
    }
}

/// Lifecycle notifications a synthesizer sends back for an utterance.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisEvent {
    Started(UtteranceTicket),
    Finished(UtteranceTicket),
    Failed(UtteranceTicket, String),
}

impl SynthesisEvent {
    pub fn ticket(&self) -> UtteranceTicket {
        match self {
            Self::Started(t) | Self::Finished(t) | Self::Failed(t, _) => *t,
        }
    }
}

/// A text-to-speech backend. `speak` only enqueues; completion is reported
/// later as a [`SynthesisEvent`] for the utterance's ticket.
pub trait SpeechSynthesizer: Send {
    fn speak(&mut self, utterance: Utterance) -> Result<(), VoiceError>;

    /// Stops current playback and drops anything queued.
    fn cancel(&mut self);

    fn voices(&self) -> Vec<VoiceInfo> { Vec::new() }
}

impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Box<T> {
    fn speak(&mut self, utterance: Utterance) -> Result<(), VoiceError> { (**self).speak(utterance) }

    fn cancel(&mut self) { (**self).cancel() }

    fn voices(&self) -> Vec<VoiceInfo> { (**self).voices() }
}

/// Prefers a voice for `language`, then one whose name says "British".
pub fn select_voice<'a>(voices: &'a [VoiceInfo], language: &str) -> Option<&'a VoiceInfo> {
    voices
        .iter()
        .find(|v| v.language.contains(language))
        .or_else(|| voices.iter().find(|v| v.name.contains("British")))
}
