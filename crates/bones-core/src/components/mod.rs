mod mesh;
mod movement;

pub use mesh::{AssetHandle, MeshComponent};
pub use movement::{MoveBindings, MoveComponent};
