//! Typed extension points for other server plugins.
//!
//! Zero, one or many observers may be registered. They are consulted in registration order:
//! - `find_fallback_target` and `substitute`: the first `Some` wins.
//! - `can_start`: the first denial wins.
//! - `on_started` / `on_stopped`: every observer is notified.

use grip_shared::{ActorId, EntityId};

/// The pair of entities a session drives. Often both ids are the same entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetPair {
    pub move_target: EntityId,
    pub rotate_target: EntityId,
}

impl TargetPair {
    pub fn single(target: EntityId) -> Self {
        Self {
            move_target: target,
            rotate_target: target,
        }
    }

    pub fn new(move_target: EntityId, rotate_target: EntityId) -> Self {
        Self {
            move_target,
            rotate_target,
        }
    }

    #[inline]
    pub fn is_split(&self) -> bool {
        self.move_target != self.rotate_target
    }

    /// The distinct entities of the pair.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> {
        let rotate = self.is_split().then_some(self.rotate_target);
        std::iter::once(self.move_target).chain(rotate)
    }
}

/// Answer of a start veto hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Deny, optionally telling the actor why (sent verbatim, without prefix).
    Deny(Option<String>),
}

pub trait SessionObserver {
    /// Offers a target when the look ray found nothing (e.g. an entity without a collider).
    fn find_fallback_target(&mut self, _actor: ActorId) -> Option<EntityId> {
        None
    }

    /// Replaces the proposed target, e.g. redirecting to a parent assembly.
    fn substitute(&mut self, _actor: ActorId, _target: EntityId) -> Option<TargetPair> {
        None
    }

    fn can_start(&mut self, _actor: ActorId, _targets: TargetPair) -> Verdict {
        Verdict::Allow
    }

    fn on_started(&mut self, _actor: ActorId, _targets: TargetPair) {}

    fn on_stopped(&mut self, _actor: ActorId, _targets: TargetPair) {}
}

#[derive(Default)]
pub struct Observers {
    observers: Vec<Box<dyn SessionObserver>>,
}

impl Observers {
    pub fn register(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn find_fallback_target(&mut self, actor: ActorId) -> Option<EntityId> {
        self.observers
            .iter_mut()
            .find_map(|o| o.find_fallback_target(actor))
    }

    /// The substituted pair, or the target itself for both roles.
    pub fn substitute(&mut self, actor: ActorId, target: EntityId) -> TargetPair {
        self.observers
            .iter_mut()
            .find_map(|o| o.substitute(actor, target))
            .unwrap_or(TargetPair::single(target))
    }

    pub fn can_start(&mut self, actor: ActorId, targets: TargetPair) -> Verdict {
        for observer in &mut self.observers {
            if let Verdict::Deny(message) = observer.can_start(actor, targets) {
                return Verdict::Deny(message);
            }
        }
        Verdict::Allow
    }

    pub fn on_started(&mut self, actor: ActorId, targets: TargetPair) {
        for observer in &mut self.observers {
            observer.on_started(actor, targets);
        }
    }

    pub fn on_stopped(&mut self, actor: ActorId, targets: TargetPair) {
        for observer in &mut self.observers {
            observer.on_stopped(actor, targets);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    struct Redirect(EntityId);

    impl SessionObserver for Redirect {
        fn substitute(&mut self, _actor: ActorId, _target: EntityId) -> Option<TargetPair> {
            Some(TargetPair::new(self.0, 99))
        }
    }

    struct Deny(&'static str, Rc<RefCell<Vec<&'static str>>>);

    impl SessionObserver for Deny {
        fn can_start(&mut self, _actor: ActorId, _targets: TargetPair) -> Verdict {
            self.1.borrow_mut().push(self.0);
            Verdict::Deny(Some(self.0.to_string()))
        }
    }

    #[test]
    fn no_observers_keeps_target_and_allows() {
        let mut observers = Observers::default();
        assert_eq!(observers.substitute(1, 5), TargetPair::single(5));
        assert_eq!(observers.can_start(1, TargetPair::single(5)), Verdict::Allow);
        assert_eq!(observers.find_fallback_target(1), None);
    }

    #[test]
    fn first_substitution_wins() {
        let mut observers = Observers::default();
        observers.register(Box::new(Redirect(10)));
        observers.register(Box::new(Redirect(20)));
        assert_eq!(observers.substitute(1, 5), TargetPair::new(10, 99));
    }

    #[test]
    fn first_veto_wins_and_stops_consulting() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();
        observers.register(Box::new(Deny("first", calls.clone())));
        observers.register(Box::new(Deny("second", calls.clone())));

        assert_eq!(
            observers.can_start(1, TargetPair::single(5)),
            Verdict::Deny(Some("first".to_string()))
        );
        assert_eq!(*calls.borrow(), vec!["first"]);
    }

    #[test]
    fn pair_entities_are_distinct() {
        assert_eq!(TargetPair::single(3).entities().collect::<Vec<_>>(), vec![3]);
        assert_eq!(TargetPair::new(3, 4).entities().collect::<Vec<_>>(), vec![3, 4]);
    }
}
