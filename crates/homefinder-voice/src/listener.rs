//! Speech recognition lifecycle.

use tracing::{debug, info};

use homefinder_core::config::VoiceSettings;

use crate::error::VoiceError;
use crate::events::{Subscription, VoiceEvent, VoiceEventHub};

/// A speech-to-text backend. Once started it publishes [`VoiceEvent`]s on the
/// hub it was given until stopped or ended.
pub trait SpeechRecognizer: Send {
    fn is_supported(&self) -> bool { true }

    fn start(&mut self, settings: &VoiceSettings, events: VoiceEventHub) -> Result<(), VoiceError>;

    fn stop(&mut self);
}

/// Recognizer for environments without speech input.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRecognizer;

impl SpeechRecognizer for UnsupportedRecognizer {
    fn is_supported(&self) -> bool { false }

    fn start(&mut self, _settings: &VoiceSettings, _events: VoiceEventHub) -> Result<(), VoiceError> {
        Err(VoiceError::Unsupported)
    }

    fn stop(&mut self) {}
}

/// Owns a recognizer and the event hub it publishes to. Must be disposed
/// (or dropped) to release the recognizer.
pub struct Listener {
    recognizer: Box<dyn SpeechRecognizer>,
    hub: VoiceEventHub,
    settings: VoiceSettings,
    listening: bool,
    disposed: bool,
}

impl Listener {
    pub fn init(recognizer: Box<dyn SpeechRecognizer>, settings: VoiceSettings) -> Self {
        info!(supported = recognizer.is_supported(), language = %settings.language, "listener initialized");
        Self { recognizer, hub: VoiceEventHub::new(), settings, listening: false, disposed: false }
    }

    pub fn is_supported(&self) -> bool { self.recognizer.is_supported() }

    pub fn is_listening(&self) -> bool { self.listening }

    pub fn is_disposed(&self) -> bool { self.disposed }

    pub fn hub(&self) -> &VoiceEventHub { &self.hub }

    pub fn subscribe(&self) -> Subscription { self.hub.subscribe() }

    pub fn start_listening(&mut self) -> Result<(), VoiceError> {
        if self.disposed {
            return Err(VoiceError::Disposed);
        }
        if !self.recognizer.is_supported() {
            return Err(VoiceError::Unsupported);
        }
        if self.listening {
            return Err(VoiceError::AlreadyListening);
        }
        self.recognizer.start(&self.settings, self.hub.clone())?;
        self.listening = true;
        debug!("listening");
        Ok(())
    }

    pub fn stop_listening(&mut self) {
        if self.listening {
            self.recognizer.stop();
            self.listening = false;
            debug!("stopped listening");
        }
    }

    /// Keeps the listening flag in step with recognizer events.
    pub fn observe(&mut self, event: &VoiceEvent) {
        match event {
            VoiceEvent::Started => self.listening = !self.disposed,
            VoiceEvent::Error(_) | VoiceEvent::Ended => self.listening = false,
            VoiceEvent::Results(_) => {}
        }
    }

    /// Stops the recognizer and ends every subscription. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.stop_listening();
        self.hub.close();
        self.disposed = true;
        debug!("listener disposed");
    }
}

impl Drop for Listener {
    fn drop(&mut self) { self.dispose(); }
}
