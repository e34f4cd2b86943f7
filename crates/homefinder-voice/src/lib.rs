//! homefinder-voice
//!
//! Speech input and output seams: a typed recognition event stream, the
//! listener lifecycle, and a ticketed line-by-line narration queue.

pub mod error;
pub mod events;
pub mod listener;
pub mod queue;
pub mod synth;
pub mod transcript;

pub use error::VoiceError;
pub use events::{RecognitionResult, Subscription, VoiceEvent, VoiceEventHub};
pub use listener::{Listener, SpeechRecognizer, UnsupportedRecognizer};
pub use queue::{split_lines, QueueProgress, QueueState, SpeechQueue};
pub use synth::{select_voice, SpeechSynthesizer, SynthesisEvent, Utterance, UtteranceTicket, VoiceInfo};
pub use transcript::final_transcript;
