use homefinder_cli::{ConsoleRecognizer, Dictation};
use homefinder_core::config::VoiceSettings;
use homefinder_voice::{final_transcript, Listener, Subscription, VoiceEvent};

fn drain(events: &mut Subscription, listener: &mut Listener) -> Vec<VoiceEvent> {
    let mut seen = Vec::new();
    while let Some(event) = events.try_next() {
        listener.observe(&event);
        seen.push(event);
    }
    seen
}

fn transcripts(events: &[VoiceEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            VoiceEvent::Results(results) => final_transcript(results),
            _ => None,
        })
        .collect()
}

fn listener_with(continuous: bool) -> (Listener, Dictation) {
    let dictation = Dictation::default();
    let settings = VoiceSettings { continuous, ..VoiceSettings::default() };
    (Listener::init(Box::new(ConsoleRecognizer::new(dictation.clone())), settings), dictation)
}

#[test]
fn continuous_dictation_keeps_listening_until_stopped() {
    let (mut listener, dictation) = listener_with(true);
    let mut events = listener.subscribe();
    assert!(!dictation.deliver("ignored while idle"));

    listener.start_listening().expect("start");
    assert!(dictation.deliver("flats in Chelsea"));
    assert!(dictation.deliver("cheap lofts"));
    let seen = drain(&mut events, &mut listener);
    assert_eq!(seen.first(), Some(&VoiceEvent::Started));
    assert_eq!(transcripts(&seen), vec!["flats in Chelsea", "cheap lofts"]);
    assert!(listener.is_listening());
    assert!(dictation.is_active());

    listener.stop_listening();
    assert_eq!(drain(&mut events, &mut listener), vec![VoiceEvent::Ended]);
    assert!(!dictation.is_active());
}

#[test]
fn single_shot_dictation_ends_after_one_line() {
    let (mut listener, dictation) = listener_with(false);
    let mut events = listener.subscribe();
    listener.start_listening().expect("start");
    assert!(dictation.deliver("villa in Hampstead"));
    assert!(!dictation.is_active());
    assert!(!dictation.deliver("second line"));

    let seen = drain(&mut events, &mut listener);
    assert_eq!(transcripts(&seen), vec!["villa in Hampstead"]);
    assert_eq!(seen.last(), Some(&VoiceEvent::Ended));
    assert!(!listener.is_listening());
}
