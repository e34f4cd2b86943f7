use std::sync::{Arc, Mutex};

use futures::StreamExt;

use homefinder_core::config::VoiceSettings;
use homefinder_voice::{
    final_transcript, select_voice, split_lines, Listener, QueueProgress, QueueState, RecognitionResult,
    SpeechQueue, SpeechRecognizer, SpeechSynthesizer, SynthesisEvent, UnsupportedRecognizer, Utterance,
    VoiceError, VoiceEvent, VoiceEventHub, VoiceInfo,
};

#[derive(Default)]
struct Spoken {
    utterances: Vec<Utterance>,
    cancels: usize,
}

/// Records utterances; completion is driven by the test.
#[derive(Clone, Default)]
struct RecordingSynth {
    spoken: Arc<Mutex<Spoken>>,
    voices: Vec<VoiceInfo>,
    fail_speak: bool,
}

impl RecordingSynth {
    fn texts(&self) -> Vec<String> {
        self.spoken.lock().unwrap().utterances.iter().map(|u| u.text.clone()).collect()
    }

    fn last(&self) -> Utterance { self.spoken.lock().unwrap().utterances.last().cloned().expect("spoke") }

    fn cancels(&self) -> usize { self.spoken.lock().unwrap().cancels }
}

impl SpeechSynthesizer for RecordingSynth {
    fn speak(&mut self, utterance: Utterance) -> Result<(), VoiceError> {
        if self.fail_speak {
            return Err(VoiceError::Synthesis("no audio device".into()));
        }
        self.spoken.lock().unwrap().utterances.push(utterance);
        Ok(())
    }

    fn cancel(&mut self) { self.spoken.lock().unwrap().cancels += 1; }

    fn voices(&self) -> Vec<VoiceInfo> { self.voices.clone() }
}

fn queue_with(synth: &RecordingSynth) -> SpeechQueue { SpeechQueue::new(Box::new(synth.clone()), VoiceSettings::default()) }

#[test]
fn split_lines_collapses_blank_runs() {
    assert_eq!(split_lines("A\n\nB\nC"), vec!["A", "B", "C"]);
    assert_eq!(split_lines("\n\n  \n"), Vec::<String>::new());
    assert_eq!(split_lines("single"), vec!["single"]);
}

#[test]
fn narrates_one_line_at_a_time() {
    let synth = RecordingSynth::default();
    let mut queue = queue_with(&synth);
    queue.speak("A\n\nB\nC").expect("speak");
    assert_eq!(synth.texts(), vec!["A"]);
    assert_eq!(queue.state(), QueueState::Speaking { line: 0 });
    assert!(queue.is_speaking());

    let first = synth.last().ticket;
    assert_eq!(queue.handle(SynthesisEvent::Started(first)), QueueProgress::Ignored);
    assert_eq!(synth.texts(), vec!["A"], "start does not advance");
    assert_eq!(queue.handle(SynthesisEvent::Finished(first)), QueueProgress::Advanced { line: 1 });
    let second = synth.last().ticket;
    assert_eq!(queue.handle(SynthesisEvent::Finished(second)), QueueProgress::Advanced { line: 2 });
    let third = synth.last().ticket;
    assert_eq!(queue.handle(SynthesisEvent::Finished(third)), QueueProgress::Completed);

    assert_eq!(synth.texts(), vec!["A", "B", "C"]);
    assert_eq!(queue.state(), QueueState::Idle);
    assert!(!queue.is_speaking());
}

#[test]
fn utterances_carry_voice_settings() {
    let synth = RecordingSynth {
        voices: vec![VoiceInfo::new("Alex", "en-US"), VoiceInfo::new("Daniel", "en-GB")],
        ..RecordingSynth::default()
    };
    let mut queue = queue_with(&synth);
    queue.speak("Hello").expect("speak");
    let utterance = synth.last();
    assert_eq!(utterance.voice.as_deref(), Some("Daniel"));
    assert_eq!(utterance.settings.rate, 0.9);
    assert_eq!(utterance.settings.pitch, 1.0);
    assert_eq!(utterance.settings.volume, 1.0);
}

#[test]
fn stale_tickets_are_ignored_after_cancel() {
    let synth = RecordingSynth::default();
    let mut queue = queue_with(&synth);
    queue.speak("one\ntwo").expect("speak");
    let ticket = synth.last().ticket;
    queue.cancel();
    assert_eq!(queue.state(), QueueState::Cancelled);
    assert!(!queue.is_speaking());
    assert_eq!(synth.cancels(), 1);

    assert_eq!(queue.handle(SynthesisEvent::Finished(ticket)), QueueProgress::Ignored);
    assert_eq!(synth.texts(), vec!["one"], "cancelled narration never resumes");
}

#[test]
fn new_narration_supersedes_the_old_one() {
    let synth = RecordingSynth::default();
    let mut queue = queue_with(&synth);
    queue.speak("old 1\nold 2").expect("speak");
    let old = synth.last().ticket;
    queue.speak("new 1\nnew 2").expect("speak");
    assert_eq!(synth.cancels(), 1);

    assert_eq!(queue.handle(SynthesisEvent::Finished(old)), QueueProgress::Ignored);
    let current = synth.last().ticket;
    assert_ne!(old, current);
    assert_eq!(queue.handle(SynthesisEvent::Finished(current)), QueueProgress::Advanced { line: 1 });
    assert_eq!(synth.texts(), vec!["old 1", "new 1", "new 2"]);
}

#[test]
fn synthesis_failure_stops_the_queue() {
    let synth = RecordingSynth::default();
    let mut queue = queue_with(&synth);
    queue.speak("a\nb").expect("speak");
    let ticket = synth.last().ticket;
    let progress = queue.handle(SynthesisEvent::Failed(ticket, "interrupted".into()));
    assert_eq!(progress, QueueProgress::Failed(VoiceError::Synthesis("interrupted".into())));
    assert_eq!(queue.state(), QueueState::Idle);

    let broken = RecordingSynth { fail_speak: true, ..RecordingSynth::default() };
    let mut queue = queue_with(&broken);
    assert!(matches!(queue.speak("a"), Err(VoiceError::Synthesis(_))));
    assert!(!queue.is_speaking());
}

#[test]
fn empty_text_leaves_queue_idle() {
    let synth = RecordingSynth::default();
    let mut queue = queue_with(&synth);
    queue.speak("\n\n").expect("speak");
    assert_eq!(queue.state(), QueueState::Idle);
    assert!(synth.texts().is_empty());
}

#[test]
fn voice_selection_prefers_language_then_british_name() {
    let voices = vec![VoiceInfo::new("Samantha", "en-US"), VoiceInfo::new("Google UK English", "en-GB")];
    assert_eq!(select_voice(&voices, "en-GB").map(|v| v.name.as_str()), Some("Google UK English"));
    let voices = vec![VoiceInfo::new("Samantha", "en-US"), VoiceInfo::new("British Female", "en")];
    assert_eq!(select_voice(&voices, "en-GB").map(|v| v.name.as_str()), Some("British Female"));
    assert!(select_voice(&[VoiceInfo::new("Samantha", "en-US")], "en-GB").is_none());
}

#[test]
fn transcript_keeps_only_final_results() {
    let results = vec![
        RecognitionResult::finalized(" show me "),
        RecognitionResult::interim("ignored"),
        RecognitionResult::finalized("flats in Chelsea "),
    ];
    assert_eq!(final_transcript(&results).as_deref(), Some("show me flats in Chelsea"));
    assert_eq!(final_transcript(&[RecognitionResult::interim("maybe")]), None);
    assert_eq!(final_transcript(&[RecognitionResult::finalized("   ")]), None);
}

#[tokio::test]
async fn hub_fans_out_and_unsubscribes_on_drop() {
    let hub = VoiceEventHub::new();
    let mut first = hub.subscribe();
    let second = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 2);

    assert_eq!(hub.publish(VoiceEvent::Started), 2);
    drop(second);
    assert_eq!(hub.subscriber_count(), 1);
    assert_eq!(hub.publish(VoiceEvent::Ended), 1);

    assert_eq!(first.next().await, Some(VoiceEvent::Started));
    assert_eq!(first.next().await, Some(VoiceEvent::Ended));

    // a later subscription starts fresh
    let mut late = hub.subscribe();
    assert!(late.try_next().is_none());
    hub.close();
    assert_eq!(late.next().await, None);
}

/// Publishes a scripted recognition session as soon as it is started.
struct ScriptedRecognizer {
    script: Vec<VoiceEvent>,
    stops: Arc<Mutex<usize>>,
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&mut self, _settings: &VoiceSettings, events: VoiceEventHub) -> Result<(), VoiceError> {
        for event in self.script.drain(..) {
            events.publish(event);
        }
        Ok(())
    }

    fn stop(&mut self) { *self.stops.lock().unwrap() += 1; }
}

#[tokio::test]
async fn listener_tracks_recognizer_lifecycle() {
    let stops = Arc::new(Mutex::new(0));
    let recognizer = ScriptedRecognizer {
        script: vec![
            VoiceEvent::Started,
            VoiceEvent::Results(vec![RecognitionResult::finalized("cheap flats")]),
            VoiceEvent::Ended,
        ],
        stops: Arc::clone(&stops),
    };
    let mut listener = Listener::init(Box::new(recognizer), VoiceSettings::default());
    let mut events = listener.subscribe();

    listener.start_listening().expect("start");
    assert!(listener.is_listening());
    assert_eq!(listener.start_listening(), Err(VoiceError::AlreadyListening));

    let mut transcript = None;
    while let Some(event) = events.try_next() {
        listener.observe(&event);
        if let VoiceEvent::Results(results) = &event {
            transcript = final_transcript(results);
        }
    }
    assert_eq!(transcript.as_deref(), Some("cheap flats"));
    assert!(!listener.is_listening(), "ended event clears the flag");

    listener.dispose();
    assert!(listener.is_disposed());
    assert_eq!(listener.start_listening(), Err(VoiceError::Disposed));
    assert_eq!(events.next().await, None, "dispose ends subscriptions");
    assert_eq!(*stops.lock().unwrap(), 0, "recognizer had already ended");
}

#[test]
fn errors_clear_listening_and_unsupported_refuses_to_start() {
    let mut listener = Listener::init(Box::new(UnsupportedRecognizer), VoiceSettings::default());
    assert!(!listener.is_supported());
    assert_eq!(listener.start_listening(), Err(VoiceError::Unsupported));

    listener.observe(&VoiceEvent::Started);
    assert!(listener.is_listening());
    listener.observe(&VoiceEvent::Error("no-speech".into()));
    assert!(!listener.is_listening());
}
