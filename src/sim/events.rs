//! Hit notification
//!
//! Obstacles keep an ordered list of listener ids; the listeners themselves
//! live in a `HitEventBus`. Notification works on a copy of the struck
//! obstacle's list, so a listener may unregister itself (or others) while
//! the event is being delivered without anyone being skipped or called twice.

use super::collision::{BallId, ColliderId, ListenerId, Struck};
use super::geometry::Point;
use super::velocity::Velocity;

/// A body struck a collidable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub struck: ColliderId,
    pub target: Struck,
    pub hitter: BallId,
    /// Velocity of the hitter before the hit
    pub hitter_velocity: Velocity,
    pub point: Point,
}

/// Reacts to hits on the collidables it is registered with
pub trait HitListener<C> {
    /// `me` is the id this listener was registered under
    fn hit_event(&mut self, me: ListenerId, event: &HitEvent, ctx: &mut C);
}

/// Looks up which listeners a collidable currently has
pub trait ListenerSource {
    /// Snapshot of the notifier's listeners, in registration order
    fn hit_listeners(&self, notifier: ColliderId) -> Vec<ListenerId>;
}

/// Owns every listener and dispatches hit events to them
pub struct HitEventBus<C> {
    listeners: Vec<(ListenerId, Box<dyn HitListener<C>>)>,
    next_id: u32,
}

impl<C> Default for HitEventBus<C> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }
}

impl<C: ListenerSource> HitEventBus<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Box<dyn HitListener<C>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Drop a listener for good. Returns whether it was registered.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener the struck collidable had when the call began
    pub fn notify(&mut self, event: &HitEvent, ctx: &mut C) {
        let snapshot = ctx.hit_listeners(event.struck);
        for id in snapshot {
            if let Some((_, listener)) = self.listeners.iter_mut().find(|(l, _)| *l == id) {
                listener.hit_event(id, event, ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Registry {
        lists: HashMap<ColliderId, Vec<ListenerId>>,
        calls: Vec<ListenerId>,
    }

    impl ListenerSource for Registry {
        fn hit_listeners(&self, notifier: ColliderId) -> Vec<ListenerId> {
            self.lists.get(&notifier).cloned().unwrap_or_default()
        }
    }

    /// Records the call, then drops every listener from the notifier
    struct Clearing;

    impl HitListener<Registry> for Clearing {
        fn hit_event(&mut self, me: ListenerId, event: &HitEvent, ctx: &mut Registry) {
            ctx.calls.push(me);
            ctx.lists.insert(event.struck, Vec::new());
        }
    }

    struct Recording;

    impl HitListener<Registry> for Recording {
        fn hit_event(&mut self, me: ListenerId, _event: &HitEvent, ctx: &mut Registry) {
            ctx.calls.push(me);
        }
    }

    fn event(struck: ColliderId) -> HitEvent {
        HitEvent {
            struck,
            target: Struck::Paddle,
            hitter: BallId(1),
            hitter_velocity: Velocity::new(0.0, -1.0),
            point: Point::new(0.0, 0.0),
        }
    }

    #[test]
    fn test_registration_order() {
        let mut bus = HitEventBus::new();
        let a = bus.register(Box::new(Recording));
        let b = bus.register(Box::new(Recording));
        let mut reg = Registry::default();
        reg.lists.insert(ColliderId(7), vec![b, a]);

        bus.notify(&event(ColliderId(7)), &mut reg);
        assert_eq!(reg.calls, vec![b, a]);
    }

    #[test]
    fn test_removal_during_notification_uses_snapshot() {
        let mut bus = HitEventBus::new();
        let clearing = bus.register(Box::new(Clearing));
        let after = bus.register(Box::new(Recording));
        let mut reg = Registry::default();
        reg.lists.insert(ColliderId(1), vec![clearing, after]);

        bus.notify(&event(ColliderId(1)), &mut reg);
        assert_eq!(reg.calls, vec![clearing, after]);

        // Next hit finds nobody
        bus.notify(&event(ColliderId(1)), &mut reg);
        assert_eq!(reg.calls.len(), 2);
    }

    #[test]
    fn test_unknown_notifier_is_silent() {
        let mut bus = HitEventBus::new();
        bus.register(Box::new(Recording));
        let mut reg = Registry::default();
        bus.notify(&event(ColliderId(9)), &mut reg);
        assert!(reg.calls.is_empty());
    }

    #[test]
    fn test_unregister_drops_listener() {
        let mut bus = HitEventBus::new();
        let a = bus.register(Box::new(Recording));
        let b = bus.register(Box::new(Recording));
        let mut reg = Registry::default();
        reg.lists.insert(ColliderId(3), vec![a, b]);

        assert!(bus.unregister(a));
        assert!(!bus.unregister(a));
        assert_eq!(bus.len(), 1);

        // A stale id in the notifier's list is skipped
        bus.notify(&event(ColliderId(3)), &mut reg);
        assert_eq!(reg.calls, vec![b]);
    }
}
