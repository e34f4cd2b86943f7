//! Typed voice events and a broadcast hub with scoped subscriptions.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

/// One alternative reported by the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self { transcript: transcript.into(), is_final: false }
    }

    pub fn finalized(transcript: impl Into<String>) -> Self {
        Self { transcript: transcript.into(), is_final: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    Started,
    Results(Vec<RecognitionResult>),
    Error(String),
    Ended,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<VoiceEvent>>,
}

/// Fan-out point between a recognizer backend and its consumers.
#[derive(Clone, Default)]
pub struct VoiceEventHub {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl VoiceEventHub {
    pub fn new() -> Self { Self::default() }

    /// Delivers `event` to every live subscription; returns how many got it.
    pub fn publish(&self, event: VoiceEvent) -> usize {
        let mut subscribers = self.lock();
        subscribers.senders.retain(|_, tx| tx.send(event.clone()).is_ok());
        subscribers.senders.len()
    }

    /// Starts a fresh event sequence. Events published before this call are
    /// not replayed.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscribers = self.lock();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.senders.insert(id, tx);
        Subscription { id, subscribers: Arc::clone(&self.subscribers), receiver: rx }
    }

    pub fn subscriber_count(&self) -> usize { self.lock().senders.len() }

    /// Ends every subscription's stream.
    pub fn close(&self) { self.lock().senders.clear(); }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A live view on a [`VoiceEventHub`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    subscribers: Arc<Mutex<Subscribers>>,
    receiver: mpsc::UnboundedReceiver<VoiceEvent>,
}

impl Subscription {
    /// Next event without waiting, if one is queued.
    pub fn try_next(&mut self) -> Option<VoiceEvent> { self.receiver.try_recv().ok() }
}

impl Stream for Subscription {
    type Item = VoiceEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<VoiceEvent>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.senders.remove(&self.id);
    }
}
