// Small pub/sub bus so the reconciler and presentation layers stay
// decoupled: publishers never know who re-renders. Subscribers drain their
// receiver from the update loop.

use crossbeam_channel::{Receiver, Sender, unbounded};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Fired exactly once per reconciliation pass.
    FiltersUpdated { visible_count: usize },
    FavoriteToggled { key: String, active: bool },
    PlaceSelected { index: usize },
}

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Sender<AppEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<AppEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&self, event: AppEvent) {
        // A dropped receiver just stops getting events; no cleanup needed
        // at publish time.
        for sub in &self.subscribers {
            let _ = sub.send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_subscribers_receive() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(AppEvent::FiltersUpdated { visible_count: 3 });

        assert_eq!(a.try_recv().unwrap(), AppEvent::FiltersUpdated { visible_count: 3 });
        assert_eq!(b.try_recv().unwrap(), AppEvent::FiltersUpdated { visible_count: 3 });
        assert!(a.try_recv().is_err());
    }

    #[test]
    fn test_publish_survives_dropped_subscriber() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        drop(bus.subscribe());

        bus.publish(AppEvent::FavoriteToggled { key: "id:1".into(), active: true });
        assert!(a.try_recv().is_ok());
    }
}
