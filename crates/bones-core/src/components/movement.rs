use std::any::Any;

use glam::Vec3;

use crate::actor::ActorBody;
use crate::component::Component;
use crate::context::{Signal, TickContext};
use crate::grid::{Cell, GridMap};
use crate::input::{Key, KeyState};
use crate::math::near_zero;

/// Movement runs ahead of most components so later ones see the new position.
pub const MOVE_UPDATE_ORDER: i32 = 10;

/// Arrow-key bindings: each input poll sets the move magnitudes to
/// `±step` on the pressed axis, or zero when no arrow is held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveBindings {
    /// Displacement per accepted move.
    pub step: f32,
}

/// Grid-validated movement.
///
/// The vertical magnitude moves along rows (world X) and the horizontal
/// magnitude along columns (world Y); positive values increase the index.
/// When both are non-zero only the vertical move is attempted. A move is
/// applied in full or not at all: if the destination cell is not walkable
/// the owner stays where it is.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveComponent {
    horizontal_move: f32,
    vertical_move: f32,
    update_order: i32,
    bindings: Option<MoveBindings>,
}

impl Default for MoveComponent {
    fn default() -> Self {
        Self {
            horizontal_move: 0.0,
            vertical_move: 0.0,
            update_order: MOVE_UPDATE_ORDER,
            bindings: None,
        }
    }
}

impl MoveComponent {
    /// A component with no motion and no key bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: drive the magnitudes from the arrow keys.
    pub fn with_bindings(mut self, step: f32) -> Self {
        self.bindings = Some(MoveBindings { step });
        self
    }

    /// Builder: override the update order.
    pub fn with_update_order(mut self, order: i32) -> Self {
        self.update_order = order;
        self
    }

    /// Column-axis displacement per tick.
    pub fn horizontal_move(&self) -> f32 {
        self.horizontal_move
    }

    /// Row-axis displacement per tick.
    pub fn vertical_move(&self) -> f32 {
        self.vertical_move
    }

    /// Set the column-axis displacement.
    pub fn set_horizontal_move(&mut self, amount: f32) {
        self.horizontal_move = amount;
    }

    /// Set the row-axis displacement.
    pub fn set_vertical_move(&mut self, amount: f32) {
        self.vertical_move = amount;
    }

    /// Key bindings, if any.
    pub fn bindings(&self) -> Option<MoveBindings> {
        self.bindings
    }

    /// The displacement this tick would attempt, with vertical taking priority.
    pub fn pending_displacement(&self) -> Option<Vec3> {
        if !near_zero(self.vertical_move) {
            Some(Vec3::new(self.vertical_move, 0.0, 0.0))
        } else if !near_zero(self.horizontal_move) {
            Some(Vec3::new(0.0, self.horizontal_move, 0.0))
        } else {
            None
        }
    }

    /// Attempt this tick's move against `map`.
    ///
    /// The cell checked is the one containing the landing position, so steps
    /// shorter than a cell are validated against where the actor ends up.
    ///
    /// Returns `Ok(cell)` with the cell entered, `Err(cell)` with the cell that
    /// was refused, or `None` when there was nothing to do.
    pub fn try_move(&self, owner: &mut ActorBody, map: &GridMap) -> Option<Result<Cell, Cell>> {
        let displacement = self.pending_displacement()?;
        let landing = owner.position() + displacement;
        let target = map.cell_of(landing);

        if !map.is_cell_walkable(target) {
            return Some(Err(target));
        }
        owner.set_position(landing);
        Some(Ok(target))
    }
}

impl Component for MoveComponent {
    fn name(&self) -> &str {
        "move"
    }

    fn update_order(&self) -> i32 {
        self.update_order
    }

    fn update(&mut self, owner: &mut ActorBody, ctx: &mut TickContext<'_>, _dt: f32) {
        let Some(outcome) = self.try_move(owner, ctx.map) else {
            return;
        };
        match outcome {
            Ok(cell) => {
                if let Some(actor) = ctx.current() {
                    ctx.emit(Signal::Moved { actor, cell });
                }
            }
            Err(cell) => {
                tracing::debug!(actor = owner.name(), %cell, "move rejected");
                if let Some(actor) = ctx.current() {
                    ctx.emit(Signal::MoveBlocked { actor, cell });
                }
            }
        }
    }

    fn process_input(&mut self, _owner: &mut ActorBody, keys: &KeyState) {
        let Some(MoveBindings { step }) = self.bindings else {
            return;
        };
        let axis = |negative: Key, positive: Key| {
            let mut amount = 0.0;
            if keys.is_pressed(negative) {
                amount -= step;
            }
            if keys.is_pressed(positive) {
                amount += step;
            }
            amount
        };
        self.vertical_move = axis(Key::Up, Key::Down);
        self.horizontal_move = axis(Key::Left, Key::Right);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use bones_mechanics::{CombatRound, CombatStats};

    use super::*;
    use crate::actor::Actor;
    use crate::context::Subsystems;
    use crate::directory::ActorDirectory;

    fn systems(map: GridMap) -> Subsystems {
        Subsystems::new(
            map,
            CombatRound::new(CombatStats::default(), CombatStats::default()),
        )
    }

    /// 3x3, all open except (1, 2).
    fn walled_map() -> GridMap {
        let mut map = GridMap::open(3, 3);
        map.set_walkable(1, 2, false);
        map
    }

    fn tick(actor: &mut Actor, systems: &mut Subsystems) {
        let mut directory = ActorDirectory::new();
        let mut ctx = TickContext::detached(&mut directory, systems);
        actor.update(1.0 / 60.0, &mut ctx);
    }

    #[test]
    fn move_into_blocked_cell_is_rejected() {
        let mut systems = systems(walled_map());
        let mut mover = MoveComponent::new();
        mover.set_horizontal_move(100.0);
        let mut actor = Actor::new("hero")
            .at(Vec3::new(100.0, 100.0, 0.0))
            .with_component(mover);

        tick(&mut actor, &mut systems);
        assert_eq!(actor.position(), Vec3::new(100.0, 100.0, 0.0));
    }

    #[test]
    fn move_into_open_cell_applies_full_displacement() {
        let mut systems = systems(walled_map());
        let mut mover = MoveComponent::new();
        mover.set_horizontal_move(-100.0);
        let mut actor = Actor::new("hero")
            .at(Vec3::new(100.0, 100.0, 0.0))
            .with_component(mover);

        tick(&mut actor, &mut systems);
        assert_eq!(actor.position(), Vec3::new(100.0, 0.0, 0.0));
        assert_eq!(systems.map.cell_of(actor.position()), Cell::new(1, 0));
    }

    #[test]
    fn vertical_takes_priority_over_horizontal() {
        let mut systems = systems(walled_map());
        let mut mover = MoveComponent::new();
        mover.set_vertical_move(100.0);
        mover.set_horizontal_move(100.0);
        let mut actor = Actor::new("hero")
            .at(Vec3::new(100.0, 100.0, 0.0))
            .with_component(mover);

        tick(&mut actor, &mut systems);
        assert_eq!(actor.position(), Vec3::new(200.0, 100.0, 0.0));
    }

    #[test]
    fn blocked_vertical_does_not_fall_back_to_horizontal() {
        let mut map = GridMap::open(3, 3);
        map.set_walkable(0, 1, false);
        let mut systems = systems(map);
        let mut mover = MoveComponent::new();
        mover.set_vertical_move(-100.0);
        mover.set_horizontal_move(-100.0);
        let mut actor = Actor::new("hero")
            .at(Vec3::new(100.0, 100.0, 0.0))
            .with_component(mover);

        tick(&mut actor, &mut systems);
        assert_eq!(actor.position(), Vec3::new(100.0, 100.0, 0.0));
    }

    #[test]
    fn leaving_the_grid_is_rejected() {
        let mut systems = systems(GridMap::open(3, 3));
        let mut mover = MoveComponent::new();
        mover.set_vertical_move(-100.0);
        let mut actor = Actor::new("hero").with_component(mover);

        tick(&mut actor, &mut systems);
        assert_eq!(actor.position(), Vec3::ZERO);
    }

    #[test]
    fn sub_cell_step_cannot_enter_blocked_cell() {
        let mut map = GridMap::open(3, 3);
        map.set_walkable(2, 1, false);
        let mut systems = systems(map);
        let mut mover = MoveComponent::new();
        mover.set_vertical_move(50.0);
        let mut actor = Actor::new("hero")
            .at(Vec3::new(150.0, 100.0, 0.0))
            .with_component(mover);

        tick(&mut actor, &mut systems);
        assert_eq!(actor.position(), Vec3::new(150.0, 100.0, 0.0));
    }

    #[test]
    fn sub_cell_step_within_a_cell_moves() {
        let mut systems = systems(GridMap::open(3, 3));
        let mut mover = MoveComponent::new();
        mover.set_horizontal_move(40.0);
        let mut actor = Actor::new("hero")
            .at(Vec3::new(100.0, 100.0, 0.0))
            .with_component(mover);

        tick(&mut actor, &mut systems);
        assert_eq!(actor.position(), Vec3::new(100.0, 140.0, 0.0));
        assert_eq!(systems.map.cell_of(actor.position()), Cell::new(1, 1));
    }

    #[test]
    fn sub_cell_step_off_the_grid_edge_is_rejected() {
        let mut systems = systems(GridMap::open(3, 3));
        let mut mover = MoveComponent::new();
        mover.set_vertical_move(-50.0);
        let mut actor = Actor::new("hero")
            .at(Vec3::new(20.0, 100.0, 0.0))
            .with_component(mover);

        tick(&mut actor, &mut systems);
        assert_eq!(actor.position(), Vec3::new(20.0, 100.0, 0.0));
    }

    #[test]
    fn bindings_follow_arrow_keys() {
        let mut mover = MoveComponent::new().with_bindings(100.0);
        let mut actor = Actor::new("hero");

        let keys: KeyState = [Key::Up, Key::Right].into_iter().collect();
        mover.process_input(actor.body_mut(), &keys);
        assert_eq!(mover.vertical_move(), -100.0);
        assert_eq!(mover.horizontal_move(), 100.0);

        mover.process_input(actor.body_mut(), &KeyState::empty());
        assert_eq!(mover.pending_displacement(), None);
    }

    #[test]
    fn unbound_component_ignores_keys() {
        let mut mover = MoveComponent::new();
        mover.set_horizontal_move(5.0);
        let mut actor = Actor::new("npc");
        let keys: KeyState = [Key::Down].into_iter().collect();
        mover.process_input(actor.body_mut(), &keys);
        assert_eq!(mover.horizontal_move(), 5.0);
        assert_eq!(mover.vertical_move(), 0.0);
    }

    #[test]
    fn registered_mover_reports_through_signals() {
        let mut systems = systems(walled_map());
        let mut directory = ActorDirectory::new();

        let mut right = MoveComponent::new();
        right.set_horizontal_move(100.0);
        let blocked = directory.add_actor(
            Actor::new("blocked")
                .at(Vec3::new(100.0, 100.0, 0.0))
                .with_component(right),
        );
        let mut down = MoveComponent::new();
        down.set_vertical_move(100.0);
        let walker = directory.add_actor(Actor::new("walker").with_component(down));

        directory.update_actors(1.0 / 60.0, &mut systems, 1);
        assert_eq!(
            systems.drain_signals(),
            vec![
                Signal::MoveBlocked {
                    actor: blocked,
                    cell: Cell::new(1, 2)
                },
                Signal::Moved {
                    actor: walker,
                    cell: Cell::new(1, 0)
                },
            ]
        );
    }
}
