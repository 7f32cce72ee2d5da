use glam::{Mat4, Quat, Vec3};

/// Magnitudes at or below this are treated as zero.
pub const NEAR_ZERO_EPSILON: f32 = 0.001;

/// Return `true` if `value` is within [`NEAR_ZERO_EPSILON`] of zero.
pub fn near_zero(value: f32) -> bool {
    value.abs() <= NEAR_ZERO_EPSILON
}

/// Position, uniform scale and rotation, plus the world matrix built from them.
///
/// Setters only mark the cached matrix dirty; [`Transform::recompute`] rebuilds
/// it. Rotations are stored as given, without normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    scale: f32,
    rotation: Quat,
    world: Mat4,
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
            rotation: Quat::IDENTITY,
            world: Mat4::IDENTITY,
            dirty: true,
        }
    }
}

impl Transform {
    /// A transform at `position` with unit scale and no rotation.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Uniform scale factor.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Orientation.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Set the position and mark the world matrix dirty.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    /// Set the scale and mark the world matrix dirty.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Set the rotation and mark the world matrix dirty.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.dirty = true;
    }

    /// Whether the cached matrix is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The cached world matrix as of the last recompute.
    pub fn world(&self) -> Mat4 {
        self.world
    }

    /// Rebuild the world matrix if dirty. Returns `true` if it was rebuilt.
    ///
    /// Scale is applied first, then rotation, then translation.
    pub fn recompute(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.world = Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.position,
        );
        self.dirty = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_zero_threshold() {
        assert!(near_zero(0.0));
        assert!(near_zero(-0.0005));
        assert!(!near_zero(0.01));
        assert!(!near_zero(-100.0));
    }

    #[test]
    fn new_transform_is_dirty() {
        let t = Transform::default();
        assert!(t.is_dirty());
        assert_eq!(t.world(), Mat4::IDENTITY);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut t = Transform::at(Vec3::new(1.0, 2.0, 3.0));
        assert!(t.recompute());
        let world = t.world();
        assert!(!t.recompute());
        assert_eq!(t.world(), world);
        assert_eq!(world.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn setters_mark_dirty() {
        let mut t = Transform::default();
        t.recompute();
        t.set_scale(2.0);
        assert!(t.is_dirty());
        t.recompute();
        t.set_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        assert!(t.is_dirty());
        t.recompute();
        t.set_position(Vec3::X);
        assert!(t.is_dirty());
    }

    #[test]
    fn world_matrix_scales_rotates_then_translates() {
        let mut t = Transform::at(Vec3::new(10.0, 0.0, 0.0));
        t.set_scale(2.0);
        t.set_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        t.recompute();
        let p = t.world().transform_point3(Vec3::X);
        assert!((p - Vec3::new(10.0, 2.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn non_unit_rotation_is_accepted() {
        let mut t = Transform::default();
        let q = Quat::from_xyzw(0.0, 0.0, 0.0, 2.0);
        t.set_rotation(q);
        assert_eq!(t.rotation(), q);
        assert!(t.recompute());
    }
}
