use std::collections::VecDeque;

use tokio::sync::broadcast;
use tracing::trace;

/// Capacity of the live broadcast channel handed out by [`EventBus::subscribe`].
pub const LIVE_CAPACITY: usize = 64;

/// Events kept in the log by default; older ones are dropped first.
pub const LOG_CAPACITY: usize = 256;

/// Payloads carried on an [`EventBus`] name themselves for traceability.
pub trait EventKind {
    fn kind(&self) -> &'static str;
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    /// 0-based, strictly increasing per bus.
    pub sequence: u64,
    pub kind: &'static str,
    pub payload: E,
}

/// Ordered event log with optional live subscribers.
///
/// The log holds the newest `log_capacity` events until drained; sequence
/// numbers expose any gap left by dropped events. Subscribers created with
/// [`EventBus::subscribe`] additionally receive every event emitted after they
/// subscribed; a lagging subscriber loses its oldest events.
#[derive(Debug)]
pub struct EventBus<E> {
    next_sequence: u64,
    log_capacity: usize,
    events: VecDeque<Event<E>>,
    live: Option<broadcast::Sender<Event<E>>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::with_log_capacity(LOG_CAPACITY)
    }
}

impl<E> EventBus<E> {
    pub fn with_log_capacity(log_capacity: usize) -> Self {
        Self {
            next_sequence: 0,
            log_capacity,
            events: VecDeque::new(),
            live: None,
        }
    }
}

impl<E: EventKind + Clone> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, payload: E) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let event = Event {
            sequence,
            kind: payload.kind(),
            payload,
        };
        trace!(sequence, kind = event.kind, "event emitted");

        if let Some(live) = &self.live {
            // No receivers left is not an error for the log.
            let _ = live.send(event.clone());
        }
        self.events.push_back(event);
        while self.events.len() > self.log_capacity {
            self.events.pop_front();
        }
        sequence
    }

    pub fn subscribe(&mut self) -> broadcast::Receiver<Event<E>> {
        self.live
            .get_or_insert_with(|| broadcast::channel(LIVE_CAPACITY).0)
            .subscribe()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event<E>> + '_ {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, EventKind, LOG_CAPACITY};

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        Hello(&'static str),
        Bye,
    }

    impl EventKind for Ping {
        fn kind(&self) -> &'static str {
            match self {
                Ping::Hello(_) => "hello",
                Ping::Bye => "bye",
            }
        }
    }

    #[test]
    fn records_events_in_sequence() {
        let mut bus = EventBus::new();
        bus.emit(Ping::Hello("a"));
        bus.emit(Ping::Bye);
        assert_eq!(bus.len(), 2);
        let events: Vec<_> = bus.events().collect();
        assert_eq!(events[0].sequence, 0);
        assert_eq!(events[1].sequence, 1);
        assert_eq!(events[1].kind, "bye");
    }

    #[test]
    fn log_keeps_only_the_newest_events() {
        let mut bus = EventBus::with_log_capacity(3);
        for _ in 0..10 {
            bus.emit(Ping::Bye);
        }
        assert_eq!(bus.len(), 3);
        let sequences: Vec<u64> = bus.drain().into_iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![7, 8, 9]);
        assert_eq!(bus.emit(Ping::Bye), 10);
    }

    #[test]
    fn default_log_is_bounded() {
        let mut bus = EventBus::new();
        for _ in 0..(LOG_CAPACITY * 4) {
            bus.emit(Ping::Hello("x"));
        }
        assert_eq!(bus.len(), LOG_CAPACITY);
    }

    #[test]
    fn drain_clears_events_but_keeps_sequence() {
        let mut bus = EventBus::new();
        bus.emit(Ping::Bye);
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.is_empty());
        assert_eq!(bus.emit(Ping::Bye), 1);
    }

    #[tokio::test]
    async fn subscribers_see_events_after_subscribing() {
        let mut bus = EventBus::new();
        bus.emit(Ping::Hello("before"));
        let mut rx = bus.subscribe();
        bus.emit(Ping::Hello("after"));

        let got = rx.recv().await.unwrap();
        assert_eq!(got.payload, Ping::Hello("after"));
        assert_eq!(got.sequence, 1);
        assert!(rx.try_recv().is_err());
    }
}
