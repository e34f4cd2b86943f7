use std::env;
use std::io::{self, Write};

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::warn;

use homefinder_assistant::{run_turn, PendingTurn, Role, Session, SubmitError, TurnOutcome};
use homefinder_cli::{build_search, init_tracing, ConsoleRecognizer, Dictation, TerminalSynthesizer};
use homefinder_core::config::Config;
use homefinder_lookup::OpenRouterLookup;
use homefinder_match::LocalSearch;
use homefinder_resolve::narration::{catalog_overview, featured_summary};
use homefinder_resolve::Coordinator;
use homefinder_voice::{Listener, SpeechQueue};

type Assistant = Session<LocalSearch, OpenRouterLookup>;

/// Resolution tasks hand back the turn they were started for.
type Turns = JoinSet<(PendingTurn, TurnOutcome)>;

enum Flow {
    Continue,
    Quit,
}

/// Interactive property assistant
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("warn");
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    let base = env::current_dir()?;

    let search = build_search(&settings, &base)?;
    let catalog_size = search.index().len();
    let lookup = OpenRouterLookup::new(settings.lookup.clone())?;
    let coordinator = Coordinator::new(search, lookup, settings.resolver.clone());

    let (speech_tx, mut speech_rx) = mpsc::unbounded_channel();
    let dictation = Dictation::default();
    let listener = Listener::init(Box::new(ConsoleRecognizer::new(dictation.clone())), settings.voice.clone());
    let speech = SpeechQueue::new(Box::new(TerminalSynthesizer::new(speech_tx)), settings.voice.clone());
    let mut session = Session::new(coordinator, listener, speech, &settings.session);
    let mut voice_events = session.listener().subscribe();

    println!("🏠 Homefinder");
    println!("============");
    println!("📊 Catalog: {} properties", catalog_size);
    show_help(catalog_size);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut turns = Turns::new();
    prompt(&dictation)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if !line.starts_with('/') && dictation.deliver(line) {
                    continue;
                }
                match handle_line(&mut session, &mut turns, line, catalog_size) {
                    Flow::Continue => {}
                    Flow::Quit => break,
                }
                if !session.is_pending() {
                    prompt(&dictation)?;
                }
            }
            Some(event) = speech_rx.recv() => {
                session.handle_synthesis_event(event);
                show_warning(&session);
            }
            Some(event) = voice_events.next() => {
                if let Some(transcript) = session.handle_voice_event(event) {
                    println!("🎤 Heard: {}", transcript);
                    start_turn(&mut session, &mut turns, &transcript);
                }
                show_warning(&session);
            }
            Some(joined) = turns.join_next() => {
                match joined {
                    Ok((turn, outcome)) => finish_turn(&mut session, turn, outcome),
                    Err(e) if e.is_cancelled() => continue,
                    Err(e) => {
                        warn!(error = %e, "turn task failed");
                        session.abandon_turn();
                        show_warning(&session);
                    }
                }
                prompt(&dictation)?;
            }
        }
    }

    turns.abort_all();
    session.dispose();
    println!("👋 Goodbye!");
    Ok(())
}

fn handle_line(
    session: &mut Assistant,
    turns: &mut Turns,
    input: &str,
    catalog_size: usize,
) -> Flow {
    match input {
        "" => {}
        "/quit" | "/q" | "/exit" => return Flow::Quit,
        "/help" | "/h" => show_help(catalog_size),
        "/connect" => {
            if session.is_connected() {
                println!("✅ Already connected.");
            } else {
                session.connect();
                show_warning(session);
            }
        }
        "/disconnect" => {
            session.disconnect();
            turns.abort_all();
            println!("🔌 Disconnected.");
        }
        "/clear" => {
            session.clear();
            println!("🧹 Conversation cleared.");
        }
        "/stop" => session.stop_speaking(),
        "/listen" => {
            if session.toggle_listening() {
                println!("🎤 Listening... type what you would say.");
            } else {
                show_warning(session);
            }
        }
        "/history" => show_history(session),
        "/results" => show_results(session),
        "/random" => show_random(session),
        query => start_turn(session, turns, query),
    }
    Flow::Continue
}

fn start_turn(session: &mut Assistant, turns: &mut Turns, text: &str) {
    match session.begin_turn(text) {
        Ok(turn) => {
            let coordinator = session.coordinator();
            let query = turn.query().to_string();
            let timeout = session.turn_timeout();
            turns.spawn(async move {
                let outcome = run_turn(&*coordinator, &query, timeout).await;
                (turn, outcome)
            });
            println!("⏳ Searching...");
        }
        Err(SubmitError::NotConnected) => println!("🔌 Not connected. Type /connect to start."),
        Err(SubmitError::Busy) => println!("⏳ Still working on your last request."),
        Err(SubmitError::Empty) | Err(SubmitError::Superseded) => {}
    }
}

fn finish_turn(session: &mut Assistant, turn: PendingTurn, outcome: TurnOutcome) {
    let query = turn.query().to_string();
    let Some(answer) = session.finish_turn(turn, outcome).map(|t| t.text.clone()) else { return };
    if !session.is_speaking() {
        println!("🏠 {}", answer);
    }
    let location = session.coordinator().search().matcher().explain(&query).location;
    if let Some(summary) = featured_summary(location, session.results()) {
        println!("⭐ {}", summary);
    }
    show_warning(session);
}

fn show_warning(session: &Assistant) {
    if let Some(warning) = session.warning() {
        println!("⚠️  {}", warning);
    }
}

fn show_history(session: &Assistant) {
    if session.conversation().is_empty() {
        println!("📭 No messages yet.");
        return;
    }
    for turn in session.conversation() {
        let who = match turn.role {
            Role::User => "you",
            Role::Bot => "assistant",
        };
        println!("[{}] {}: {}", turn.timestamp.format("%H:%M:%S"), who, turn.text);
    }
}

fn show_results(session: &Assistant) {
    if session.results().is_empty() {
        println!("📭 No results yet.");
        return;
    }
    for (i, p) in session.results().iter().enumerate() {
        println!("  {}. {}  [{}]  {}  {}", i + 1, p.name, p.property_type, p.location, p.price);
        if !p.features.is_empty() {
            println!("     ✨ {}", p.features.join(", "));
        }
    }
    if let Some(current) = session.current_property() {
        println!("📍 Showing: {} ({})", current.name, current.area);
    }
}

fn show_random(session: &Assistant) {
    match session.coordinator().search().index().random() {
        Some(p) => {
            println!("🎲 {} in {} - {}", p.name, p.location, p.price);
            println!("   {}", p.description);
        }
        None => println!("📭 The catalog is empty."),
    }
}

fn show_help(catalog_size: usize) {
    println!();
    println!("{}", catalog_overview(catalog_size));
    println!();
    println!("🎯 Commands:");
    println!("  /connect     - Start a conversation");
    println!("  /disconnect  - End it and forget everything");
    println!("  /clear       - Clear the conversation");
    println!("  /listen      - Toggle voice input");
    println!("  /stop        - Stop speaking");
    println!("  /history     - Show the conversation");
    println!("  /results     - Show the latest results");
    println!("  /random      - Show a random property");
    println!("  /help        - Show this help message");
    println!("  /quit        - Exit");
    println!("  <query>      - Ask about properties");
    println!();
}

fn prompt(dictation: &Dictation) -> io::Result<()> {
    print!("{}", if dictation.is_active() { "🎤> " } else { "you> " });
    io::stdout().flush()
}
