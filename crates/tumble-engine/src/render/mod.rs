//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers, depth targets) and
//! create them lazily from a [`RenderCtx`].
//!
//! Convention:
//! - World space is right-handed with +Z up; the camera looks down -X.
//! - Clip-space depth runs `0..1`; smaller is nearer.

mod ctx;
pub mod depth;
pub mod mesh;
pub mod shader;
pub mod transform;

pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::MeshRenderer;
pub use shader::{ShaderError, ShaderFailurePolicy, ShaderInterface, ShaderProgram};
pub use transform::{model_matrix, Camera, TransformUniform};
