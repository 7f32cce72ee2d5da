use std::any::Any;

use glam::{Mat4, Quat, Vec3};

use crate::component::{Component, ComponentList};
use crate::context::TickContext;
use crate::input::KeyState;
use crate::math::Transform;

/// Lifecycle state of an actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ActorState {
    /// Updated and fed input every tick.
    #[default]
    Active,
    /// Kept in the directory but skipped by update and input.
    Paused,
    /// Skipped, and destroyed by the directory after the current update pass.
    Dead,
}

impl std::fmt::Display for ActorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
            Self::Dead => write!(f, "dead"),
        }
    }
}

/// The part of an actor that its components and behavior may read and change.
#[derive(Debug, Clone, Default)]
pub struct ActorBody {
    name: String,
    transform: Transform,
    state: ActorState,
}

impl ActorBody {
    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lifecycle state.
    pub fn state(&self) -> ActorState {
        self.state
    }

    /// Change the lifecycle state. Marking `Dead` does not free anything;
    /// the directory does that after the update pass.
    pub fn set_state(&mut self, state: ActorState) {
        self.state = state;
    }

    /// The full transform.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    /// Set the position; the world matrix is rebuilt before it is next read.
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.set_position(position);
    }

    /// Uniform scale.
    pub fn scale(&self) -> f32 {
        self.transform.scale()
    }

    /// Set the uniform scale.
    pub fn set_scale(&mut self, scale: f32) {
        self.transform.set_scale(scale);
    }

    /// Orientation.
    pub fn rotation(&self) -> Quat {
        self.transform.rotation()
    }

    /// Set the orientation. Not normalized.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.set_rotation(rotation);
    }

    /// The cached world matrix.
    pub fn world_transform(&self) -> Mat4 {
        self.transform.world()
    }
}

/// Actor-specific per-tick logic, run after the actor's components.
pub trait Behavior: std::fmt::Debug {
    /// Called once per tick while the owner is active.
    fn update_actor(&mut self, owner: &mut ActorBody, ctx: &mut TickContext<'_>, dt: f32);

    /// Called with each key snapshot while the owner is active.
    fn actor_input(&mut self, _owner: &mut ActorBody, _keys: &KeyState) {}

    /// Support downcasting to the concrete behavior type.
    fn as_any(&self) -> &dyn Any;
}

/// A game object: a transform, a lifecycle state, components and an optional behavior.
#[derive(Debug, Default)]
pub struct Actor {
    body: ActorBody,
    components: ComponentList,
    behavior: Option<Box<dyn Behavior>>,
}

impl Actor {
    /// A new active actor at the origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            body: ActorBody {
                name: name.into(),
                ..ActorBody::default()
            },
            ..Self::default()
        }
    }

    /// Builder: set the starting position.
    pub fn at(mut self, position: Vec3) -> Self {
        self.body.set_position(position);
        self
    }

    /// Builder: attach a component.
    pub fn with_component<C: Component + 'static>(mut self, component: C) -> Self {
        self.add_component(component);
        self
    }

    /// Builder: install the actor-specific behavior.
    pub fn with_behavior<B: Behavior + 'static>(mut self, behavior: B) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Attach a component, keeping the list sorted by update order.
    pub fn add_component<C: Component + 'static>(&mut self, component: C) {
        self.components.insert(Box::new(component));
    }

    /// Detach and destroy the first component of type `C`. Returns whether one was found.
    pub fn remove_component<C: Component + 'static>(&mut self) -> bool {
        self.components.remove::<C>().is_some()
    }

    /// First component of type `C`.
    pub fn component<C: Component + 'static>(&self) -> Option<&C> {
        self.components.get::<C>()
    }

    /// First component of type `C`, mutably.
    pub fn component_mut<C: Component + 'static>(&mut self) -> Option<&mut C> {
        self.components.get_mut::<C>()
    }

    /// All components in update order.
    pub fn components(&self) -> &ComponentList {
        &self.components
    }

    /// The behavior downcast to `B`.
    pub fn behavior<B: Behavior + 'static>(&self) -> Option<&B> {
        self.behavior.as_ref()?.as_any().downcast_ref::<B>()
    }

    /// The body (name, transform, state).
    pub fn body(&self) -> &ActorBody {
        &self.body
    }

    /// The body, mutably.
    pub fn body_mut(&mut self) -> &mut ActorBody {
        &mut self.body
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.body.name()
    }

    /// Lifecycle state.
    pub fn state(&self) -> ActorState {
        self.body.state()
    }

    /// Change the lifecycle state.
    pub fn set_state(&mut self, state: ActorState) {
        self.body.set_state(state);
    }

    /// Whether the actor is updated this tick.
    pub fn is_active(&self) -> bool {
        self.body.state() == ActorState::Active
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    /// Set the position.
    pub fn set_position(&mut self, position: Vec3) {
        self.body.set_position(position);
    }

    /// Set the uniform scale.
    pub fn set_scale(&mut self, scale: f32) {
        self.body.set_scale(scale);
    }

    /// Set the orientation.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.body.set_rotation(rotation);
    }

    /// The cached world matrix.
    pub fn world_transform(&self) -> Mat4 {
        self.body.world_transform()
    }

    /// Rebuild the world matrix if any transform field changed, then notify
    /// components. Returns `true` if it was rebuilt.
    pub fn compute_world_transform(&mut self) -> bool {
        if !self.body.transform.recompute() {
            return false;
        }
        for component in self.components.iter_mut() {
            component.on_update_world_transform(&self.body);
        }
        true
    }

    /// Run one tick: components in order, then the behavior. No-op unless active.
    pub fn update(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        if !self.is_active() {
            return;
        }
        self.compute_world_transform();
        self.update_components(dt, ctx);
        if let Some(behavior) = self.behavior.as_mut() {
            behavior.update_actor(&mut self.body, ctx, dt);
        }
        self.compute_world_transform();
    }

    /// Update every component in ascending update order.
    pub fn update_components(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        for component in self.components.iter_mut() {
            component.update(&mut self.body, ctx, dt);
        }
    }

    /// Forward a key snapshot to components and behavior. No-op unless active.
    pub fn process_input(&mut self, keys: &KeyState) {
        if !self.is_active() {
            return;
        }
        for component in self.components.iter_mut() {
            component.process_input(&mut self.body, keys);
        }
        if let Some(behavior) = self.behavior.as_mut() {
            behavior.actor_input(&mut self.body, keys);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use bones_mechanics::{CombatRound, CombatStats};

    use super::*;
    use crate::context::Subsystems;
    use crate::directory::ActorDirectory;
    use crate::grid::GridMap;
    use crate::input::Key;

    type Trace = Rc<RefCell<Vec<String>>>;

    #[derive(Debug)]
    struct Recorder {
        label: &'static str,
        order: i32,
        trace: Trace,
    }

    impl Component for Recorder {
        fn name(&self) -> &str {
            self.label
        }
        fn update_order(&self) -> i32 {
            self.order
        }
        fn update(&mut self, _owner: &mut ActorBody, _ctx: &mut TickContext<'_>, _dt: f32) {
            self.trace.borrow_mut().push(format!("update {}", self.label));
        }
        fn process_input(&mut self, _owner: &mut ActorBody, keys: &KeyState) {
            if keys.is_pressed(Key::Up) {
                self.trace.borrow_mut().push(format!("input {}", self.label));
            }
        }
        fn on_update_world_transform(&mut self, _owner: &ActorBody) {
            self.trace.borrow_mut().push(format!("world {}", self.label));
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Drifter {
        trace: Trace,
    }

    impl Behavior for Drifter {
        fn update_actor(&mut self, owner: &mut ActorBody, _ctx: &mut TickContext<'_>, _dt: f32) {
            owner.set_position(owner.position() + Vec3::X);
            self.trace.borrow_mut().push("behavior".into());
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn run_one(actor: &mut Actor) {
        let mut directory = ActorDirectory::new();
        let mut systems = Subsystems::new(
            GridMap::open(3, 3),
            CombatRound::new(CombatStats::default(), CombatStats::default()),
        );
        let mut ctx = TickContext::detached(&mut directory, &mut systems);
        actor.update(0.016, &mut ctx);
    }

    fn recorder(label: &'static str, order: i32, trace: &Trace) -> Recorder {
        Recorder {
            label,
            order,
            trace: Rc::clone(trace),
        }
    }

    #[test]
    fn update_runs_components_in_order_then_behavior() {
        let trace = Trace::default();
        let mut actor = Actor::new("hero")
            .with_component(recorder("late", 200, &trace))
            .with_component(recorder("early", 10, &trace))
            .with_behavior(Drifter {
                trace: Rc::clone(&trace),
            });

        run_one(&mut actor);

        assert_eq!(
            *trace.borrow(),
            vec![
                "world early",
                "world late",
                "update early",
                "update late",
                "behavior",
                "world early",
                "world late",
            ]
        );
        assert_eq!(actor.position(), Vec3::X);
        assert_eq!(actor.world_transform().w_axis.truncate(), Vec3::X);
    }

    #[test]
    fn world_transform_rebuilt_only_when_changed() {
        let trace = Trace::default();
        let mut actor = Actor::new("statue").with_component(recorder("c", 0, &trace));
        run_one(&mut actor);
        run_one(&mut actor);
        let rebuilds = trace
            .borrow()
            .iter()
            .filter(|e| e.starts_with("world"))
            .count();
        assert_eq!(rebuilds, 1);
    }

    #[test]
    fn inactive_actor_is_inert() {
        for state in [ActorState::Paused, ActorState::Dead] {
            let trace = Trace::default();
            let mut actor = Actor::new("ghost").with_component(recorder("c", 0, &trace));
            actor.set_state(state);
            run_one(&mut actor);
            actor.process_input(&KeyState::empty().with(Key::Up));
            assert!(trace.borrow().is_empty(), "{state} actor was touched");
        }
    }

    #[test]
    fn input_forwarded_when_active() {
        let trace = Trace::default();
        let mut actor = Actor::new("hero").with_component(recorder("c", 0, &trace));
        actor.process_input(&KeyState::empty().with(Key::Up));
        assert_eq!(*trace.borrow(), vec!["input c"]);
    }

    #[test]
    fn removing_component_drops_it() {
        let trace = Trace::default();
        let mut actor = Actor::new("hero").with_component(recorder("c", 0, &trace));
        assert!(actor.remove_component::<Recorder>());
        assert!(actor.component::<Recorder>().is_none());
        assert!(!actor.remove_component::<Recorder>());
    }

    #[test]
    fn behavior_downcast() {
        let actor = Actor::new("hero").with_behavior(Drifter {
            trace: Trace::default(),
        });
        assert!(actor.behavior::<Drifter>().is_some());
        assert!(Actor::new("plain").behavior::<Drifter>().is_none());
    }
}
