//! Shader stages and the varying context passed between them
//!
//! The vertex stage publishes named outputs (varyings) into a
//! [`ShaderContext`]; the rasterizer interpolates them perspective-correct
//! across the triangle and hands the blended context to the pixel stage.
//!
//! Varyings are keyed by small integers chosen by the caller. Storage is a
//! fixed set of slots per value class rather than a map, so the per-pixel
//! interpolation path never touches the heap.

use crate::math::{Vec2, Vec3, Vec4};

/// Number of varying slots per value class
pub const MAX_VARYINGS: usize = 8;

/// Per-vertex (and, after interpolation, per-pixel) shader data.
///
/// Four independent slot classes: scalar, 2-, 3- and 4-component vectors.
/// The same key can be used in different classes without conflict.
#[derive(Debug, Clone, Default)]
pub struct ShaderContext {
    pub(crate) varying_float: [Option<f32>; MAX_VARYINGS],
    pub(crate) varying_vec2: [Option<Vec2>; MAX_VARYINGS],
    pub(crate) varying_vec3: [Option<Vec3>; MAX_VARYINGS],
    pub(crate) varying_vec4: [Option<Vec4>; MAX_VARYINGS],
}

impl ShaderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every varying; the rasterizer does this before each vertex
    /// stage invocation.
    pub fn clear(&mut self) {
        self.varying_float = [None; MAX_VARYINGS];
        self.varying_vec2 = [None; MAX_VARYINGS];
        self.varying_vec3 = [None; MAX_VARYINGS];
        self.varying_vec4 = [None; MAX_VARYINGS];
    }

    pub fn set_float(&mut self, key: usize, value: f32) {
        assert!(key < MAX_VARYINGS, "varying key {} out of range", key);
        self.varying_float[key] = Some(value);
    }

    pub fn set_vec2(&mut self, key: usize, value: Vec2) {
        assert!(key < MAX_VARYINGS, "varying key {} out of range", key);
        self.varying_vec2[key] = Some(value);
    }

    pub fn set_vec3(&mut self, key: usize, value: Vec3) {
        assert!(key < MAX_VARYINGS, "varying key {} out of range", key);
        self.varying_vec3[key] = Some(value);
    }

    pub fn set_vec4(&mut self, key: usize, value: Vec4) {
        assert!(key < MAX_VARYINGS, "varying key {} out of range", key);
        self.varying_vec4[key] = Some(value);
    }

    /// Scalar varying; an unset key reads as zero
    pub fn float(&self, key: usize) -> f32 {
        self.varying_float[key].unwrap_or(0.0)
    }

    pub fn vec2(&self, key: usize) -> Vec2 {
        self.varying_vec2[key].unwrap_or_default()
    }

    pub fn vec3(&self, key: usize) -> Vec3 {
        self.varying_vec3[key].unwrap_or_default()
    }

    pub fn vec4(&self, key: usize) -> Vec4 {
        self.varying_vec4[key].unwrap_or_default()
    }

    /// Blend three vertex contexts with the given weights.
    ///
    /// The key set of vertex 0 decides which varyings exist in the result;
    /// a key missing at vertex 1 or 2 contributes zero.
    pub(crate) fn interpolated(
        v0: &ShaderContext,
        v1: &ShaderContext,
        v2: &ShaderContext,
        c0: f32,
        c1: f32,
        c2: f32,
    ) -> ShaderContext {
        let mut out = ShaderContext::default();
        for key in 0..MAX_VARYINGS {
            if let Some(f0) = v0.varying_float[key] {
                let f1 = v1.varying_float[key].unwrap_or(0.0);
                let f2 = v2.varying_float[key].unwrap_or(0.0);
                out.varying_float[key] = Some(f0 * c0 + f1 * c1 + f2 * c2);
            }
            if let Some(f0) = v0.varying_vec2[key] {
                let f1 = v1.varying_vec2[key].unwrap_or_default();
                let f2 = v2.varying_vec2[key].unwrap_or_default();
                out.varying_vec2[key] = Some(f0 * c0 + f1 * c1 + f2 * c2);
            }
            if let Some(f0) = v0.varying_vec3[key] {
                let f1 = v1.varying_vec3[key].unwrap_or_default();
                let f2 = v2.varying_vec3[key].unwrap_or_default();
                out.varying_vec3[key] = Some(f0 * c0 + f1 * c1 + f2 * c2);
            }
            if let Some(f0) = v0.varying_vec4[key] {
                let f1 = v1.varying_vec4[key].unwrap_or_default();
                let f2 = v2.varying_vec4[key].unwrap_or_default();
                out.varying_vec4[key] = Some(f0 * c0 + f1 * c1 + f2 * c2);
            }
        }
        out
    }
}

/// Vertex stage: receives the corner index (0-2) and a fresh context to
/// populate with varyings, returns the homogeneous clip-space position.
pub type VertexShader = Box<dyn Fn(usize, &mut ShaderContext) -> Vec4>;

/// Pixel stage: receives the interpolated context, returns RGBA in [0, 1]
pub type PixelShader = Box<dyn Fn(&ShaderContext) -> Vec4>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_read_back() {
        let mut ctx = ShaderContext::new();
        ctx.set_float(0, 0.5);
        ctx.set_vec2(3, Vec2::new(1.0, 2.0));
        ctx.set_vec4(0, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(ctx.float(0), 0.5);
        assert_eq!(ctx.vec2(3), Vec2::new(1.0, 2.0));
        assert_eq!(ctx.vec4(0), Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_missing_key_reads_zero() {
        let ctx = ShaderContext::new();
        assert_eq!(ctx.float(5), 0.0);
        assert_eq!(ctx.vec3(5), Vec3::ZERO);
    }

    #[test]
    fn test_clear_resets_all_classes() {
        let mut ctx = ShaderContext::new();
        ctx.set_float(1, 1.0);
        ctx.set_vec3(1, Vec3::new(1.0, 1.0, 1.0));
        ctx.clear();
        assert_eq!(ctx.float(1), 0.0);
        assert_eq!(ctx.vec3(1), Vec3::ZERO);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_key_panics() {
        let mut ctx = ShaderContext::new();
        ctx.set_float(MAX_VARYINGS, 1.0);
    }

    #[test]
    fn test_interpolation_follows_vertex_zero_keys() {
        let mut v0 = ShaderContext::new();
        let mut v1 = ShaderContext::new();
        let mut v2 = ShaderContext::new();
        v0.set_float(0, 1.0);
        v1.set_float(0, 2.0);
        v2.set_float(0, 3.0);
        // Key 1 exists only at vertices 1/2, so it must not appear
        v1.set_float(1, 9.0);
        v2.set_float(1, 9.0);

        let out = ShaderContext::interpolated(&v0, &v1, &v2, 0.5, 0.25, 0.25);
        assert!((out.float(0) - 1.75).abs() < 1e-6);
        assert!(out.varying_float[1].is_none());
    }

    #[test]
    fn test_interpolation_missing_corner_is_zero() {
        let mut v0 = ShaderContext::new();
        let v1 = ShaderContext::new();
        let v2 = ShaderContext::new();
        v0.set_vec2(2, Vec2::new(4.0, 8.0));
        let out = ShaderContext::interpolated(&v0, &v1, &v2, 0.5, 0.25, 0.25);
        assert_eq!(out.vec2(2), Vec2::new(2.0, 4.0));
    }
}
