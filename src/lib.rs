//! Programmable software rasterizer
//!
//! A fixed-function + shader pipeline in the shape of a minimal
//! Direct3D-style renderer, drawing one triangle at a time into an
//! in-memory framebuffer:
//!
//! - user-supplied vertex and pixel stages (plain closures)
//! - open-ended varyings, interpolated perspective-correct
//! - homogeneous clip rejection, left-handed z in [0, 1]
//! - integer edge functions with the top-left fill rule
//! - 1/w depth buffer (larger = nearer)
//! - wireframe overlay, BMP output
//!
//! # Module Organization
//!
//! - `math` - vectors, matrices, projection helpers
//! - `types` - packed 32-bit color
//! - `shader` - varying context and the two stage callable types
//! - `bitmap` - pixel surface, texture sampling, BMP I/O
//! - `render` - the rasterizer itself
//! - `model` - Wavefront OBJ models with companion texture maps

pub mod bitmap;
pub mod math;
pub mod model;
pub mod render;
pub mod shader;
pub mod types;

pub use bitmap::{Bitmap, BitmapError};
pub use math::{
    mat4_identity, mat4_invert, mat4_look_at, mat4_mul, mat4_perspective, mat4_rotation,
    mat4_scale, mat4_transform_point, mat4_transform_vec4, mat4_translation, mat4_transpose,
    mat4_zero, Mat4, Vec2, Vec3, Vec4,
};
pub use model::{Model, ModelError};
pub use render::Renderer;
pub use shader::{PixelShader, ShaderContext, VertexShader, MAX_VARYINGS};
pub use types::Color;
