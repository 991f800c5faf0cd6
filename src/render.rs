//! The rendering object and its triangle pipeline
//!
//! One [`Renderer`] owns a color framebuffer and a matching depth buffer and
//! pushes a single triangle per [`Renderer::draw_primitive`] call through:
//! vertex stage, clip rejection, perspective divide, viewport mapping,
//! winding fix-up, top-left fill rule, perspective-correct varying
//! interpolation, depth test, pixel stage, framebuffer write.
//!
//! Clipping is reject-on-crossing: a triangle with any vertex outside the
//! canonical view volume is dropped whole instead of being split in
//! homogeneous space.

use crate::bitmap::{Bitmap, BitmapError};
use crate::math::{Vec2, Vec4};
use crate::shader::{PixelShader, ShaderContext, VertexShader};
use crate::types::Color;
use std::path::Path;

const DEFAULT_BACKGROUND: u32 = 0xff191970;
const DEFAULT_FOREGROUND: u32 = 0xffffffff;

/// Working record for one triangle corner, alive for a single draw call
#[derive(Debug, Clone, Default)]
struct TriangleVertex {
    context: ShaderContext,
    /// Reciprocal homogeneous w; doubles as the depth key (larger = nearer)
    rhw: f32,
    pos: Vec4,
    /// Floating screen coordinate, pixel-center convention
    spf: Vec2,
    /// Integer screen coordinate, rounded
    spi_x: i32,
    spi_y: i32,
}

/// An edge is top-left when it is horizontal going right-to-left or points
/// downward on screen (screen y grows downward).
fn is_top_left(a: (i32, i32), b: (i32, i32)) -> bool {
    (a.1 == b.1 && a.0 < b.0) || a.1 > b.1
}

/// Software rasterizer with programmable vertex and pixel stages
pub struct Renderer {
    frame: Bitmap,
    /// Contiguous width*height rhw values; 0 means infinitely far
    depth: Vec<f32>,
    width: usize,
    height: usize,
    background: u32,
    foreground: u32,
    render_frame: bool,
    render_pixel: bool,
    vertex_shader: Option<VertexShader>,
    pixel_shader: Option<PixelShader>,
}

impl Renderer {
    /// Allocate the framebuffer and depth buffer and clear both
    pub fn new(width: usize, height: usize) -> Self {
        let mut renderer = Self {
            frame: Bitmap::new(width, height),
            depth: vec![0.0; width * height],
            width,
            height,
            background: DEFAULT_BACKGROUND,
            foreground: DEFAULT_FOREGROUND,
            render_frame: false,
            render_pixel: true,
            vertex_shader: None,
            pixel_shader: None,
        };
        renderer.clear();
        renderer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Fill the framebuffer with the background color and reset depth to 0
    pub fn clear(&mut self) {
        self.frame.fill(self.background);
        for d in self.depth.iter_mut() {
            *d = 0.0;
        }
    }

    /// Background color used by [`Renderer::clear`], packed 32-bit
    pub fn set_background(&mut self, color: u32) {
        self.background = color;
    }

    /// Foreground color used by the wireframe overlay and `draw_line`
    pub fn set_foreground(&mut self, color: u32) {
        self.foreground = color;
    }

    pub fn set_vertex_shader<F>(&mut self, shader: F)
    where
        F: Fn(usize, &mut ShaderContext) -> Vec4 + 'static,
    {
        self.vertex_shader = Some(Box::new(shader));
    }

    pub fn set_pixel_shader<F>(&mut self, shader: F)
    where
        F: Fn(&ShaderContext) -> Vec4 + 'static,
    {
        self.pixel_shader = Some(Box::new(shader));
    }

    /// Toggle the wireframe (`frame`) and filled (`pixel`) passes
    pub fn set_render_state(&mut self, frame: bool, pixel: bool) {
        self.render_frame = frame;
        self.render_pixel = pixel;
    }

    pub fn frame(&self) -> &Bitmap {
        &self.frame
    }

    /// Interpolated 1/w values, row-major
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Plot a single framebuffer pixel, packed color
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        self.frame.set_pixel(x, y, color);
    }

    /// Draw a line in the foreground color
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let fg = self.foreground;
        self.frame.draw_line(x0, y0, x1, y1, fg);
    }

    /// Write the framebuffer as a 24-bit BMP file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), BitmapError> {
        self.frame.save_bmp(path, false)
    }

    /// Run one triangle through the pipeline.
    ///
    /// Returns `false` without touching the buffers when the renderer has no
    /// vertex stage or zero-sized buffers, when any vertex fails the clip
    /// test, or when the triangle is degenerate in clip or screen space.
    /// A wireframe-only draw (fill pass disabled) also returns `false`.
    pub fn draw_primitive(&mut self) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let Some(vs) = self.vertex_shader.as_ref() else {
            return false;
        };

        let mut verts: [TriangleVertex; 3] = Default::default();
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;

        for (k, vertex) in verts.iter_mut().enumerate() {
            vertex.context.clear();
            vertex.pos = vs(k, &mut vertex.context);

            // Reject-on-crossing: one vertex outside the canonical view
            // volume drops the whole triangle. The volume is left-handed,
            // z in [0, w].
            let w = vertex.pos.w;
            if w == 0.0 {
                return false;
            }
            if vertex.pos.z < 0.0 || vertex.pos.z > w {
                return false;
            }
            if vertex.pos.x < -w || vertex.pos.x > w {
                return false;
            }
            if vertex.pos.y < -w || vertex.pos.y > w {
                return false;
            }

            vertex.rhw = 1.0 / w;
            vertex.pos = vertex.pos * vertex.rhw;

            // Viewport mapping with the y flip; (0, 0) is top-left on screen
            vertex.spf.x = (vertex.pos.x + 1.0) * self.width as f32 * 0.5;
            vertex.spf.y = (1.0 - vertex.pos.y) * self.height as f32 * 0.5;

            // Round to the pixel grid via the +0.5 floor
            vertex.spi_x = (vertex.spf.x + 0.5) as i32;
            vertex.spi_y = (vertex.spf.y + 0.5) as i32;

            min_x = min_x.min(vertex.spi_x);
            max_x = max_x.max(vertex.spi_x);
            min_y = min_y.min(vertex.spi_y);
            max_y = max_y.max(vertex.spi_y);
        }

        let min_x = min_x.clamp(0, self.width as i32 - 1);
        let max_x = max_x.clamp(0, self.width as i32 - 1);
        let min_y = min_y.clamp(0, self.height as i32 - 1);
        let max_y = max_y.clamp(0, self.height as i32 - 1);

        if self.render_frame {
            self.stroke_triangle(&verts);
        }
        if !self.render_pixel {
            return false;
        }

        // Orientation from the NDC-space edge cross product. Positive z:
        // swap vertices 1 and 2 so the integer edge equations are
        // non-negative inside. Zero: degenerate in clip space.
        let v01 = verts[1].pos - verts[0].pos;
        let v02 = verts[2].pos - verts[0].pos;
        let normal = v01.xyz().cross(v02.xyz());
        let order = if normal.z > 0.0 {
            [0, 2, 1]
        } else if normal.z == 0.0 {
            return false;
        } else {
            [0, 1, 2]
        };
        let t0 = &verts[order[0]];
        let t1 = &verts[order[1]];
        let t2 = &verts[order[2]];

        let p0 = (t0.spi_x, t0.spi_y);
        let p1 = (t1.spi_x, t1.spi_y);
        let p2 = (t2.spi_x, t2.spi_y);

        // Degenerate in screen space
        let area = (p1.0 - p0.0) * (p2.1 - p0.1) - (p1.1 - p0.1) * (p2.0 - p0.0);
        if area == 0 {
            return false;
        }

        let top_left_01 = is_top_left(p0, p1);
        let top_left_12 = is_top_left(p1, p2);
        let top_left_20 = is_top_left(p2, p0);

        let ps = self.pixel_shader.as_ref();

        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                let px = Vec2::new(cx as f32 + 0.5, cy as f32 + 0.5);

                // Integer edge functions; the sign is flipped for the
                // left-handed, y-down screen space
                let e01 = -(cx - p0.0) * (p1.1 - p0.1) + (cy - p0.1) * (p1.0 - p0.0);
                let e12 = -(cx - p1.0) * (p2.1 - p1.1) + (cy - p1.1) * (p2.0 - p1.0);
                let e20 = -(cx - p2.0) * (p0.1 - p2.1) + (cy - p2.1) * (p0.0 - p2.0);

                // Top/left edges admit E = 0, right/bottom edges need E >= 1,
                // so a shared edge lands in exactly one of its two triangles
                if e01 < if top_left_01 { 0 } else { 1 } {
                    continue;
                }
                if e12 < if top_left_12 { 0 } else { 1 } {
                    continue;
                }
                if e20 < if top_left_20 { 0 } else { 1 } {
                    continue;
                }

                // Barycentric weights from the sub-triangle areas around the
                // pixel center
                let s0 = t0.spf - px;
                let s1 = t1.spf - px;
                let s2 = t2.spf - px;
                let a = s1.cross(s2).abs();
                let b = s2.cross(s0).abs();
                let c = s0.cross(s1).abs();
                let total = a + b + c;
                if total == 0.0 {
                    continue;
                }
                let a = a / total;
                let b = b / total;
                let c = c / total;

                // 1/w is linear in screen space, so it interpolates directly
                let rhw = t0.rhw * a + t1.rhw * b + t2.rhw * c;

                // Depth test: larger rhw is nearer
                let idx = cy as usize * self.width + cx as usize;
                if rhw < self.depth[idx] {
                    continue;
                }
                self.depth[idx] = rhw;

                let w = 1.0 / if rhw != 0.0 { rhw } else { 1.0 };

                // Perspective-correct varying weights: attribute/w is linear
                // in screen space, scale back by the recovered w
                let c0 = t0.rhw * a * w;
                let c1 = t1.rhw * b * w;
                let c2 = t2.rhw * c * w;

                let input =
                    ShaderContext::interpolated(&t0.context, &t1.context, &t2.context, c0, c1, c2);

                let color = match ps {
                    Some(shader) => shader(&input),
                    None => Vec4::new(0.0, 0.0, 0.0, 1.0),
                };
                self.frame
                    .set_pixel(cx as usize, cy as usize, Color::from_vec4(color).to_packed());
            }
        }

        // Second wireframe pass so the fill doesn't bury the edges
        if self.render_frame {
            self.stroke_triangle(&verts);
        }

        true
    }

    fn stroke_triangle(&mut self, verts: &[TriangleVertex; 3]) {
        let fg = self.foreground;
        self.frame
            .draw_line(verts[0].spi_x, verts[0].spi_y, verts[1].spi_x, verts[1].spi_y, fg);
        self.frame
            .draw_line(verts[0].spi_x, verts[0].spi_y, verts[2].spi_x, verts[2].spi_y, fg);
        self.frame
            .draw_line(verts[2].spi_x, verts[2].spi_y, verts[1].spi_x, verts[1].spi_y, fg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{
        mat4_identity, mat4_look_at, mat4_mul, mat4_perspective, mat4_rotation,
        mat4_transform_vec4, Vec3,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Triangle with identical screen footprint for any w: positions are
    /// pre-scaled so the NDC coordinates stay put while rhw changes.
    fn set_solid_triangle(r: &mut Renderer, w: f32, color: Vec4) {
        let positions = [
            Vec4::new(-0.5 * w, -0.5 * w, 0.5 * w, w),
            Vec4::new(0.5 * w, -0.5 * w, 0.5 * w, w),
            Vec4::new(0.0, 0.5 * w, 0.5 * w, w),
        ];
        r.set_vertex_shader(move |index, _output| positions[index]);
        r.set_pixel_shader(move |_input| color);
    }

    #[test]
    fn test_draw_without_vertex_shader_fails() {
        let mut r = Renderer::new(64, 64);
        assert!(!r.draw_primitive());
    }

    #[test]
    fn test_draw_with_zero_size_fails() {
        let mut r = Renderer::new(0, 0);
        set_solid_triangle(&mut r, 1.0, Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert!(!r.draw_primitive());
    }

    #[test]
    fn test_single_colored_triangle() {
        let mut r = Renderer::new(800, 600);
        const VARYING_COLOR: usize = 0;
        let positions = [
            Vec4::new(0.0, 0.7, 0.90, 1.0),
            Vec4::new(-0.6, -0.2, 0.01, 1.0),
            Vec4::new(0.6, -0.2, 0.01, 1.0),
        ];
        let colors = [
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
        ];
        r.set_vertex_shader(move |index, output| {
            output.set_vec4(VARYING_COLOR, colors[index]);
            positions[index]
        });
        r.set_pixel_shader(|input| input.vec4(VARYING_COLOR));
        assert!(r.draw_primitive());

        // Untouched background keeps the clear color
        assert_eq!(r.frame().get_pixel(10, 10), 0xff191970);

        // Screen corners land at (400, 90), (160, 360), (640, 360); pixels
        // just inside each corner shade near-pure red / green / blue
        let near_red = Color::from_packed(r.frame().get_pixel(400, 93));
        assert!(near_red.r > 230 && near_red.g < 40 && near_red.b < 40);
        let near_green = Color::from_packed(r.frame().get_pixel(164, 357));
        assert!(near_green.g > 200 && near_green.r < 50 && near_green.b < 50);
        let near_blue = Color::from_packed(r.frame().get_pixel(636, 357));
        assert!(near_blue.b > 200 && near_blue.r < 50 && near_blue.g < 50);

        // The centroid blends to about a third of each channel
        let centroid = Color::from_packed(r.frame().get_pixel(400, 270));
        for channel in [centroid.r, centroid.g, centroid.b] {
            assert!((70..=100).contains(&channel), "centroid channel {}", channel);
        }
        assert_eq!(centroid.a, 255);
    }

    #[test]
    fn test_interpolated_constant_stays_constant() {
        // Partition of unity: a varying that is 1 at all corners must read
        // 1 at every covered pixel, even with per-vertex w variation
        let samples = Rc::new(RefCell::new(Vec::new()));
        let mut r = Renderer::new(64, 64);
        let positions = [
            Vec4::new(0.0, 1.8, 1.8, 2.0),
            Vec4::new(-0.9, -0.9, 0.1, 1.0),
            Vec4::new(0.9, -0.9, 0.1, 1.0),
        ];
        r.set_vertex_shader(move |index, output| {
            output.set_float(0, 1.0);
            positions[index]
        });
        let sink = samples.clone();
        r.set_pixel_shader(move |input| {
            sink.borrow_mut().push(input.float(0));
            Vec4::new(1.0, 1.0, 1.0, 1.0)
        });
        assert!(r.draw_primitive());
        let samples = samples.borrow();
        assert!(!samples.is_empty());
        for &v in samples.iter() {
            assert!((v - 1.0).abs() < 1e-5, "interpolated constant drifted: {}", v);
        }
    }

    #[test]
    fn test_depth_order_independent() {
        // Near triangle (w = 1, rhw = 1) vs far triangle (w = 2, rhw = 0.5)
        // with the same footprint: the overlap stays near-red in both orders
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let green = Vec4::new(0.0, 1.0, 0.0, 1.0);

        let mut r = Renderer::new(100, 100);
        set_solid_triangle(&mut r, 1.0, red);
        assert!(r.draw_primitive());
        set_solid_triangle(&mut r, 2.0, green);
        assert!(r.draw_primitive());
        assert_eq!(r.frame().get_pixel(50, 50), 0xffff0000);

        let mut r = Renderer::new(100, 100);
        set_solid_triangle(&mut r, 2.0, green);
        assert!(r.draw_primitive());
        set_solid_triangle(&mut r, 1.0, red);
        assert!(r.draw_primitive());
        assert_eq!(r.frame().get_pixel(50, 50), 0xffff0000);
    }

    #[test]
    fn test_degenerate_triangle_leaves_buffers_untouched() {
        let mut r = Renderer::new(64, 64);
        let p = Vec4::new(0.2, 0.2, 0.5, 1.0);
        r.set_vertex_shader(move |_index, _output| p);
        r.set_pixel_shader(|_input| Vec4::new(1.0, 1.0, 1.0, 1.0));

        let frame_before = r.frame().pixels.clone();
        let depth_before = r.depth().to_vec();
        assert!(!r.draw_primitive());
        assert_eq!(r.frame().pixels, frame_before);
        assert_eq!(r.depth(), &depth_before[..]);
    }

    #[test]
    fn test_clip_rejection_leaves_buffers_untouched() {
        let mut r = Renderer::new(64, 64);
        let positions = [
            Vec4::new(0.0, 0.5, 2.0, 1.0), // beyond the far plane: z > w
            Vec4::new(-0.5, -0.5, 0.5, 1.0),
            Vec4::new(0.5, -0.5, 0.5, 1.0),
        ];
        r.set_vertex_shader(move |index, _output| positions[index]);
        r.set_pixel_shader(|_input| Vec4::new(1.0, 1.0, 1.0, 1.0));

        let frame_before = r.frame().pixels.clone();
        let depth_before = r.depth().to_vec();
        assert!(!r.draw_primitive());
        assert_eq!(r.frame().pixels, frame_before);
        assert_eq!(r.depth(), &depth_before[..]);
    }

    #[test]
    fn test_zero_w_rejected() {
        let mut r = Renderer::new(32, 32);
        let positions = [
            Vec4::new(0.0, 0.0, 0.0, 0.0),
            Vec4::new(-0.5, -0.5, 0.5, 1.0),
            Vec4::new(0.5, -0.5, 0.5, 1.0),
        ];
        r.set_vertex_shader(move |index, _output| positions[index]);
        assert!(!r.draw_primitive());
    }

    #[test]
    fn test_shared_edge_rasterized_once() {
        // Two triangles split a quad along its diagonal; with consistent
        // winding no pixel may belong to both, and the union has no seam
        let quad = [
            Vec4::new(-0.5, -0.5, 0.5, 1.0),
            Vec4::new(0.5, -0.5, 0.5, 1.0),
            Vec4::new(0.5, 0.5, 0.5, 1.0),
            Vec4::new(-0.5, 0.5, 0.5, 1.0),
        ];
        let tri_a = [quad[0], quad[1], quad[2]];
        let tri_b = [quad[2], quad[3], quad[0]];
        let white = Vec4::new(1.0, 1.0, 1.0, 1.0);
        let bg = 0xff191970;

        let draw_one = |tri: [Vec4; 3]| {
            let mut r = Renderer::new(200, 200);
            r.set_vertex_shader(move |index, _output| tri[index]);
            r.set_pixel_shader(move |_input| white);
            assert!(r.draw_primitive());
            r
        };
        let ra = draw_one(tri_a);
        let rb = draw_one(tri_b);

        let mut covered_by_both = 0;
        for i in 0..200 * 200 {
            if ra.frame().pixels[i] != bg && rb.frame().pixels[i] != bg {
                covered_by_both += 1;
            }
        }
        assert_eq!(covered_by_both, 0);

        // Combined render: every pixel strictly inside the quad is covered
        let mut rc = Renderer::new(200, 200);
        rc.set_vertex_shader(move |index, _output| tri_a[index]);
        rc.set_pixel_shader(move |_input| white);
        assert!(rc.draw_primitive());
        rc.set_vertex_shader(move |index, _output| tri_b[index]);
        assert!(rc.draw_primitive());
        for y in 55..145 {
            for x in 55..145 {
                assert_ne!(rc.frame().get_pixel(x, y), bg, "hole at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_color_clamped_to_byte_range() {
        let mut r = Renderer::new(100, 100);
        let positions = [
            Vec4::new(-0.5, -0.5, 0.5, 1.0),
            Vec4::new(0.5, -0.5, 0.5, 1.0),
            Vec4::new(0.0, 0.5, 0.5, 1.0),
        ];
        r.set_vertex_shader(move |index, _output| positions[index]);
        r.set_pixel_shader(|_input| Vec4::new(2.0, -0.3, 0.5, 1.0));
        assert!(r.draw_primitive());
        assert_eq!(r.frame().get_pixel(50, 50), 0xffff007f);
    }

    #[test]
    fn test_null_pixel_shader_writes_opaque_black() {
        let mut r = Renderer::new(100, 100);
        let positions = [
            Vec4::new(-0.5, -0.5, 0.5, 1.0),
            Vec4::new(0.5, -0.5, 0.5, 1.0),
            Vec4::new(0.0, 0.5, 0.5, 1.0),
        ];
        r.set_vertex_shader(move |index, _output| positions[index]);
        assert!(r.draw_primitive());
        assert_eq!(r.frame().get_pixel(50, 50), 0xff000000);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut r = Renderer::new(64, 64);
        set_solid_triangle(&mut r, 1.0, Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert!(r.draw_primitive());

        r.clear();
        let frame_once = r.frame().pixels.clone();
        let depth_once = r.depth().to_vec();
        r.clear();
        assert_eq!(r.frame().pixels, frame_once);
        assert_eq!(r.depth(), &depth_once[..]);
        assert!(r.depth().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_wireframe_only_pass() {
        let mut r = Renderer::new(100, 100);
        set_solid_triangle(&mut r, 1.0, Vec4::new(1.0, 0.0, 0.0, 1.0));
        r.set_render_state(true, false);
        // Wireframe-only draws report false: the fill pass never ran
        assert!(!r.draw_primitive());
        // Bottom edge runs from (25, 75) to (75, 75) in the foreground color
        assert_eq!(r.frame().get_pixel(50, 75), 0xffffffff);
        // Interior stays background
        assert_eq!(r.frame().get_pixel(50, 50), 0xff191970);
    }

    #[test]
    fn test_wireframe_overlays_fill() {
        let mut r = Renderer::new(100, 100);
        set_solid_triangle(&mut r, 1.0, Vec4::new(1.0, 0.0, 0.0, 1.0));
        r.set_render_state(true, true);
        assert!(r.draw_primitive());
        assert_eq!(r.frame().get_pixel(50, 75), 0xffffffff);
        assert_eq!(r.frame().get_pixel(50, 50), 0xffff0000);
    }

    #[test]
    fn test_custom_background_color() {
        let mut r = Renderer::new(16, 16);
        r.set_background(0xff000000);
        r.clear();
        assert!(r.frame().pixels.iter().all(|&p| p == 0xff000000));
    }

    #[test]
    fn test_textured_quad_perspective() {
        // Perspective checkerboard: two triangles form a square on the
        // z = -1 plane, seen through a look-at camera
        let texture = Bitmap::checker(256, 256, 32, 0xffffffff, 0xff3fbcef);
        const VARYING_TEXUV: usize = 0;

        let mat_view = mat4_look_at(
            Vec3::new(-0.7, 0.0, 1.5),
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
        );
        let mat_proj = mat4_perspective(
            std::f32::consts::FRAC_PI_2,
            800.0 / 600.0,
            1.0,
            500.0,
        );
        let mvp = mat4_mul(&mat4_mul(&mat_proj, &mat_view), &mat4_identity());

        let corners = [
            (Vec4::new(1.0, -1.0, -1.0, 1.0), Vec2::new(0.0, 0.0)),
            (Vec4::new(1.0, 1.0, -1.0, 1.0), Vec2::new(1.0, 0.0)),
            (Vec4::new(-1.0, 1.0, -1.0, 1.0), Vec2::new(1.0, 1.0)),
            (Vec4::new(-1.0, -1.0, -1.0, 1.0), Vec2::new(0.0, 1.0)),
        ];

        let mut r = Renderer::new(800, 600);
        for tri in [[0usize, 1, 2], [2, 3, 0]] {
            let tri_data: [(Vec4, Vec2); 3] =
                [corners[tri[0]], corners[tri[1]], corners[tri[2]]];
            r.set_vertex_shader(move |index, output| {
                let (pos, uv) = tri_data[index];
                output.set_vec2(VARYING_TEXUV, uv);
                mat4_transform_vec4(&mvp, pos)
            });
            let tex = texture.clone();
            r.set_pixel_shader(move |input| {
                let uv = input.vec2(VARYING_TEXUV);
                tex.sample_2d(uv.x, uv.y)
            });
            assert!(r.draw_primitive());
        }

        let bg = 0xff191970;
        let covered = r.frame().pixels.iter().filter(|&&p| p != bg).count();
        assert!(covered > 10_000, "only {} pixels covered", covered);
    }

    #[test]
    fn test_cube_faces_depth_resolved() {
        // Rotated cube, all 12 triangles drawn without backface culling;
        // the depth test sorts out front from back
        let texture = Bitmap::checker(256, 256, 32, 0xffffffff, 0xff3fbcef);
        const VARYING_TEXUV: usize = 0;

        let mat_model = mat4_rotation(Vec3::new(-1.0, -0.5, 1.0), 1.0);
        let mat_view = mat4_look_at(Vec3::new(3.5, 0.0, 0.0), Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let mat_proj = mat4_perspective(
            std::f32::consts::FRAC_PI_2,
            800.0 / 600.0,
            1.0,
            500.0,
        );
        let mvp = mat4_mul(&mat4_mul(&mat_proj, &mat_view), &mat_model);

        let mesh = [
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
        ];
        let planes = [
            [0, 1, 2, 3],
            [7, 6, 5, 4],
            [0, 4, 5, 1],
            [1, 5, 6, 2],
            [2, 6, 7, 3],
            [3, 7, 4, 0],
        ];
        let face_uv = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ];

        let mut r = Renderer::new(800, 600);
        let mut accepted = 0;
        for plane in planes {
            for tri in [[0usize, 1, 2], [2, 3, 0]] {
                let tri_data: [(Vec3, Vec2); 3] = [
                    (mesh[plane[tri[0]]], face_uv[tri[0]]),
                    (mesh[plane[tri[1]]], face_uv[tri[1]]),
                    (mesh[plane[tri[2]]], face_uv[tri[2]]),
                ];
                r.set_vertex_shader(move |index, output| {
                    let (pos, uv) = tri_data[index];
                    output.set_vec2(VARYING_TEXUV, uv);
                    mat4_transform_vec4(&mvp, pos.xyz1())
                });
                let tex = texture.clone();
                r.set_pixel_shader(move |input| {
                    let uv = input.vec2(VARYING_TEXUV);
                    tex.sample_2d(uv.x, uv.y)
                });
                if r.draw_primitive() {
                    accepted += 1;
                }
            }
        }
        assert_eq!(accepted, 12);

        // The cube covers the screen center with checker colors (white or
        // cyan both have high green and blue)
        let center = Color::from_packed(r.frame().get_pixel(400, 300));
        assert!(center.g > 150 && center.b > 200, "center {:?}", center);

        // Depth invariants: cleared pixels stay 0, covered pixels hold rhw > 0
        assert!(r.depth().iter().all(|&d| d >= 0.0));
        let center_depth = r.depth()[300 * 800 + 400];
        assert!(center_depth > 0.0);
    }
}
