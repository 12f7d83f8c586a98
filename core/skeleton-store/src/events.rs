//! FILENAME: core/skeleton-store/src/events.rs
//! PURPOSE: Typed change notifications for the skeleton library.
//! CONTEXT: The popup and content scripts re-render when the library changes.
//! Each subscriber owns a plain channel receiver; receivers that were dropped
//! are pruned on the next emit.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StoreEvent {
    SkeletonSaved { id: String },
    SkeletonDeleted { id: String },
    LightPayloadSaved { skeleton_id: String, query_id: String },
    QueryShapeChanged { skeleton_id: String, query_id: String },
    ColumnCountPinned { skeleton_id: String, query_id: String, count: usize },
    ScenarioCreated { id: String },
    ScenarioRenamed { id: String, name: String },
    ScenarioUpdated { id: String },
    ScenarioDeleted { id: String },
    ScenarioActivated { id: Option<String> },
    BundleImported { scenario_id: String },
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<StoreEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Sends `event` to every live subscriber. Returns how many received it.
    pub fn emit(&mut self, event: StoreEvent) -> usize {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_gets_the_event() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        let delivered = bus.emit(StoreEvent::SkeletonSaved { id: "s1".to_string() });
        assert_eq!(delivered, 2);
        assert_eq!(a.try_recv().unwrap(), StoreEvent::SkeletonSaved { id: "s1".to_string() });
        assert_eq!(b.try_recv().unwrap(), StoreEvent::SkeletonSaved { id: "s1".to_string() });
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let mut bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());

        assert_eq!(bus.emit(StoreEvent::ScenarioActivated { id: None }), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert!(keep.try_recv().is_ok());
    }

    #[test]
    fn test_event_json_is_tagged() {
        let value = serde_json::to_value(StoreEvent::ScenarioDeleted { id: "x".to_string() }).unwrap();
        assert_eq!(value["event"], "scenarioDeleted");
    }
}
