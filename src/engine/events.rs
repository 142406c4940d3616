//! Outbound engine events and the listener registry

use serde::Serialize;

use super::state::{GameMode, Scores};
use crate::input::{ClickData, Participant};

/// Event names, for filtered subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SessionStarted,
    SessionEnded,
    SessionExited,
    SessionReset,
    Tick,
    Update,
    TapRegistered,
    SessionPaused,
    SessionResumed,
}

/// Everything the engine tells the outside world
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum GameEvent {
    SessionStarted {
        mode: GameMode,
    },
    SessionEnded {
        mode: GameMode,
        scores: Scores,
        tps: u32,
    },
    SessionExited,
    SessionReset,
    Tick {
        time_left: u32,
    },
    Update {
        scores: Scores,
        time_left: u32,
        tps: u32,
    },
    TapRegistered {
        participant: Participant,
        score: u32,
        tps: u32,
        click_data: ClickData,
    },
    SessionPaused,
    SessionResumed,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::SessionStarted { .. } => EventKind::SessionStarted,
            GameEvent::SessionEnded { .. } => EventKind::SessionEnded,
            GameEvent::SessionExited => EventKind::SessionExited,
            GameEvent::SessionReset => EventKind::SessionReset,
            GameEvent::Tick { .. } => EventKind::Tick,
            GameEvent::Update { .. } => EventKind::Update,
            GameEvent::TapRegistered { .. } => EventKind::TapRegistered,
            GameEvent::SessionPaused => EventKind::SessionPaused,
            GameEvent::SessionResumed => EventKind::SessionResumed,
        }
    }

    /// Wire name, as used in the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self.kind() {
            EventKind::SessionStarted => "session-started",
            EventKind::SessionEnded => "session-ended",
            EventKind::SessionExited => "session-exited",
            EventKind::SessionReset => "session-reset",
            EventKind::Tick => "tick",
            EventKind::Update => "update",
            EventKind::TapRegistered => "tap-registered",
            EventKind::SessionPaused => "session-paused",
            EventKind::SessionResumed => "session-resumed",
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&GameEvent)>;

struct Subscription {
    id: ListenerId,
    filter: Option<EventKind>,
    listener: Listener,
}

/// Listener registry; delivery is synchronous, in registration order
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.add(None, Box::new(listener))
    }

    /// Receive only events of one kind
    pub fn on(&mut self, kind: EventKind, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.add(Some(kind), Box::new(listener))
    }

    fn add(&mut self, filter: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            filter,
            listener,
        });
        id
    }

    /// Returns false if `id` was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn emit(&mut self, event: &GameEvent) {
        let kind = event.kind();
        for sub in &mut self.subscriptions {
            if sub.filter.is_none_or(|k| k == kind) {
                (sub.listener)(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_delivery_in_registration_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b"] {
            let log = log.clone();
            bus.subscribe(move |e| log.borrow_mut().push(format!("{tag}:{}", e.name())));
        }

        bus.emit(&GameEvent::SessionReset);
        assert_eq!(*log.borrow(), vec!["a:session-reset", "b:session-reset"]);
    }

    #[test]
    fn test_filtered_subscription() {
        let mut bus = EventBus::new();
        let ticks = Rc::new(RefCell::new(0));
        {
            let ticks = ticks.clone();
            bus.on(EventKind::Tick, move |_| *ticks.borrow_mut() += 1);
        }

        bus.emit(&GameEvent::Tick { time_left: 3 });
        bus.emit(&GameEvent::SessionPaused);
        bus.emit(&GameEvent::Tick { time_left: 2 });
        assert_eq!(*ticks.borrow(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let id = {
            let count = count.clone();
            bus.subscribe(move |_| *count.borrow_mut() += 1)
        };

        bus.emit(&GameEvent::SessionExited);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&GameEvent::SessionExited);

        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let event = GameEvent::Update {
            scores: Scores {
                single: 7,
                ..Default::default()
            },
            time_left: 12,
            tps: 4,
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["timeLeft"], 12);
        assert_eq!(json["scores"]["single"], 7);

        let json = serde_json::to_value(GameEvent::SessionExited).unwrap();
        assert_eq!(json["type"], GameEvent::SessionExited.name());
    }
}
