use std::any::Any;

use bones_core::{ActorBody, ActorId, Behavior, TickContext};
use glam::Vec3;

/// Offset from the followed actor to the camera eye.
pub const DEFAULT_FOLLOW_OFFSET: Vec3 = Vec3::new(-300.0, 0.0, 300.0);

/// Keeps its actor at a fixed offset from a target actor.
///
/// The target is read through the tick context, so the camera trails the
/// target by one tick when it updates first and matches it when it updates
/// after. A missing target leaves the camera where it is.
#[derive(Debug, Clone)]
pub struct FollowCamera {
    target: Option<ActorId>,
    offset: Vec3,
}

impl FollowCamera {
    /// Follow `target` at [`DEFAULT_FOLLOW_OFFSET`].
    pub fn new(target: Option<ActorId>) -> Self {
        Self {
            target,
            offset: DEFAULT_FOLLOW_OFFSET,
        }
    }

    /// Builder: override the offset.
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// The actor being followed.
    pub fn target(&self) -> Option<ActorId> {
        self.target
    }

    /// Switch to a different target.
    pub fn set_target(&mut self, target: Option<ActorId>) {
        self.target = target;
    }

    /// Eye-to-target offset.
    pub fn offset(&self) -> Vec3 {
        self.offset
    }
}

impl Behavior for FollowCamera {
    fn update_actor(&mut self, owner: &mut ActorBody, ctx: &mut TickContext<'_>, _dt: f32) {
        let Some(target) = self.target.and_then(|id| ctx.get(id)) else {
            return;
        };
        owner.set_position(target.position() + self.offset);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use bones_core::{Actor, ActorDirectory, GridMap, Subsystems};
    use bones_mechanics::{CombatRound, CombatStats};

    use super::*;

    #[test]
    fn camera_tracks_target_with_offset() {
        let mut directory = ActorDirectory::new();
        let mut systems = Subsystems::new(
            GridMap::open(3, 3),
            CombatRound::new(CombatStats::default(), CombatStats::default()),
        );
        let hero = directory.add_actor(Actor::new("hero").at(Vec3::new(100.0, 200.0, 0.0)));
        let camera = directory.add_actor(
            Actor::new("camera").with_behavior(FollowCamera::new(Some(hero)).with_offset(Vec3::Z)),
        );

        directory.update_actors(0.016, &mut systems, 1);
        assert_eq!(
            directory.get(camera).map(Actor::position),
            Some(Vec3::new(100.0, 200.0, 1.0))
        );

        directory.remove_actor(hero);
        directory.update_actors(0.016, &mut systems, 2);
        assert_eq!(
            directory.get(camera).map(Actor::position),
            Some(Vec3::new(100.0, 200.0, 1.0))
        );
    }
}
