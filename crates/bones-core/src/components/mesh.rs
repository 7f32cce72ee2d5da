use std::any::Any;

use glam::Mat4;

use crate::actor::ActorBody;
use crate::component::Component;

/// Opaque handle to a loaded mesh or texture. Handles are only meaningful to
/// the asset store that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetHandle(pub u32);

/// A drawable: mesh and texture handles plus the world matrix to draw with.
///
/// The matrix is refreshed whenever the owner rebuilds its world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshComponent {
    mesh: Option<AssetHandle>,
    texture: Option<AssetHandle>,
    visible: bool,
    world: Mat4,
}

impl MeshComponent {
    /// A visible drawable.
    pub fn new(mesh: Option<AssetHandle>, texture: Option<AssetHandle>) -> Self {
        Self {
            mesh,
            texture,
            visible: true,
            world: Mat4::IDENTITY,
        }
    }

    /// Mesh handle, `None` if the asset failed to load.
    pub fn mesh(&self) -> Option<AssetHandle> {
        self.mesh
    }

    /// Texture handle, `None` if the asset failed to load.
    pub fn texture(&self) -> Option<AssetHandle> {
        self.texture
    }

    /// Whether the renderer should draw this.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// World matrix captured at the owner's last transform rebuild.
    pub fn world(&self) -> Mat4 {
        self.world
    }

    /// Whether there is anything to draw.
    pub fn is_drawable(&self) -> bool {
        self.visible && self.mesh.is_some()
    }
}

impl Component for MeshComponent {
    fn name(&self) -> &str {
        "mesh"
    }

    fn on_update_world_transform(&mut self, owner: &ActorBody) {
        self.world = owner.world_transform();
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
    use glam::Vec3;

    use super::*;
    use crate::actor::Actor;

    #[test]
    fn follows_owner_world_transform() {
        let mut actor = Actor::new("crate")
            .at(Vec3::new(3.0, 4.0, 0.0))
            .with_component(MeshComponent::new(Some(AssetHandle(1)), None));
        assert!(actor.compute_world_transform());

        let mesh = actor.component::<MeshComponent>().unwrap();
        assert_eq!(mesh.world(), Mat4::from_translation(Vec3::new(3.0, 4.0, 0.0)));

        actor.set_position(Vec3::new(5.0, 0.0, 0.0));
        assert!(actor.compute_world_transform());
        let mesh = actor.component::<MeshComponent>().unwrap();
        assert_eq!(mesh.world().w_axis.truncate(), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn missing_mesh_is_not_drawable() {
        let mut mesh = MeshComponent::new(None, Some(AssetHandle(2)));
        assert!(!mesh.is_drawable());
        mesh = MeshComponent::new(Some(AssetHandle(1)), None);
        mesh.set_visible(false);
        assert!(!mesh.is_drawable());
    }
}
