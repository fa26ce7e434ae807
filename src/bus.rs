use std::collections::VecDeque;

/// Notifications passed between components that don't know each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    /// The gift box started incubating.
    Hatching,
    /// The reveal could not start; the box is idle and can be deployed again.
    HatchAbandoned,
    /// The reveal finished and the box is gone.
    Hatched,
    /// A companion model is on stage with its controller attached.
    CompanionReady,
}

/// FIFO event queue. Producers publish during their update; the world
/// drains and reacts once per frame.
#[derive(Default)]
pub struct EventBus {
    queue: VecDeque<WorldEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: WorldEvent) {
        log::debug!("event: {event:?}");
        self.queue.push_back(event);
    }

    /// Remove and return all pending events in order.
    pub fn drain(&mut self) -> Vec<WorldEvent> {
        self.queue.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut bus = EventBus::new();
        bus.publish(WorldEvent::Hatching);
        bus.publish(WorldEvent::Hatched);
        assert!(bus.has_pending());
        assert_eq!(
            bus.drain(),
            vec![WorldEvent::Hatching, WorldEvent::Hatched]
        );
        assert!(!bus.has_pending());
        assert!(bus.drain().is_empty());
    }
}
