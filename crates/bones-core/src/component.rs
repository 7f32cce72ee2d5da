use std::any::Any;

use crate::actor::ActorBody;
use crate::context::TickContext;
use crate::input::KeyState;

/// Update order given to components that do not override it.
pub const DEFAULT_UPDATE_ORDER: i32 = 100;

/// A unit of behavior owned by exactly one actor.
///
/// The owning actor is passed into every call as an [`ActorBody`]; components
/// never hold a reference to it, so a component cannot outlive its owner.
/// Within an actor, components run in ascending [`Component::update_order`],
/// ties broken by attach order.
pub trait Component: std::fmt::Debug {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Lower values run first. Read once, when the component is attached.
    fn update_order(&self) -> i32 {
        DEFAULT_UPDATE_ORDER
    }

    /// Called once per tick while the owner is active.
    fn update(&mut self, _owner: &mut ActorBody, _ctx: &mut TickContext<'_>, _dt: f32) {}

    /// Called with each key snapshot while the owner is active.
    fn process_input(&mut self, _owner: &mut ActorBody, _keys: &KeyState) {}

    /// Called after the owner's world matrix has been rebuilt.
    fn on_update_world_transform(&mut self, _owner: &ActorBody) {}

    /// Support downcasting to concrete component types.
    fn as_any(&self) -> &dyn Any;

    /// Support downcasting to concrete component types.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A component paired with the order it was registered under.
#[derive(Debug)]
struct Slot {
    order: i32,
    component: Box<dyn Component>,
}

/// Components owned by one actor, kept sorted by update order.
#[derive(Debug, Default)]
pub struct ComponentList {
    slots: Vec<Slot>,
}

impl ComponentList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert before the first component with a strictly greater order, so
    /// equal orders keep their insertion sequence.
    pub fn insert(&mut self, component: Box<dyn Component>) {
        let order = component.update_order();
        let at = self
            .slots
            .iter()
            .position(|s| s.order > order)
            .unwrap_or(self.slots.len());
        self.slots.insert(at, Slot { order, component });
    }

    /// Detach and return the first component of type `T`.
    pub fn remove<T: Component + 'static>(&mut self) -> Option<Box<dyn Component>> {
        let at = self
            .slots
            .iter()
            .position(|s| s.component.as_any().is::<T>())?;
        Some(self.slots.remove(at).component)
    }

    /// First component of type `T`.
    pub fn get<T: Component + 'static>(&self) -> Option<&T> {
        self.slots
            .iter()
            .find_map(|s| s.component.as_any().downcast_ref::<T>())
    }

    /// First component of type `T`, mutably.
    pub fn get_mut<T: Component + 'static>(&mut self) -> Option<&mut T> {
        self.slots
            .iter_mut()
            .find_map(|s| s.component.as_any_mut().downcast_mut::<T>())
    }

    /// Components in update order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Component> {
        self.slots.iter().map(|s| s.component.as_ref())
    }

    /// Components in update order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Component>> {
        self.slots.iter_mut().map(|s| &mut s.component)
    }

    /// Component names in update order.
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|c| c.name()).collect()
    }

    /// Number of attached components.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no components are attached.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Tagged {
        name: &'static str,
        order: i32,
    }

    impl Component for Tagged {
        fn name(&self) -> &str {
            self.name
        }
        fn update_order(&self) -> i32 {
            self.order
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Other;

    impl Component for Other {
        fn name(&self) -> &str {
            "other"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn tagged(name: &'static str, order: i32) -> Box<dyn Component> {
        Box::new(Tagged { name, order })
    }

    #[test]
    fn sorted_by_order_stable_on_ties() {
        let mut list = ComponentList::new();
        list.insert(tagged("c", 50));
        list.insert(tagged("a", 10));
        list.insert(tagged("d", 50));
        list.insert(tagged("b", 10));
        list.insert(tagged("first", -5));
        assert_eq!(list.names(), vec!["first", "a", "b", "c", "d"]);
    }

    #[test]
    fn downcast_and_remove() {
        let mut list = ComponentList::new();
        list.insert(tagged("t", 1));
        list.insert(Box::new(Other));
        assert!(list.get::<Other>().is_some());
        assert_eq!(list.get::<Tagged>().map(|t| t.order), Some(1));

        list.get_mut::<Tagged>().unwrap().order = 9;
        assert_eq!(list.get::<Tagged>().map(|t| t.order), Some(9));

        assert!(list.remove::<Other>().is_some());
        assert!(list.remove::<Other>().is_none());
        assert_eq!(list.len(), 1);
    }
}
