//! Textured quad: two triangles on the z = -1 plane under a look-at
//! camera, sampled from a procedural checkerboard. The shared diagonal
//! shows the top-left fill rule producing a seamless join.

use log::info;
use softrast::{
    mat4_look_at, mat4_mul, mat4_perspective, mat4_transform_vec4, Bitmap, Renderer, Vec2, Vec3,
    Vec4,
};

const VARYING_TEXUV: usize = 0;

fn main() {
    env_logger::init();

    let mut rh = Renderer::new(800, 600);

    let texture = Bitmap::checker(256, 256, 32, 0xffffffff, 0xff3fbcef);

    let mat_view = mat4_look_at(
        Vec3::new(-0.7, 0.0, 1.5),
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, 1.0),
    );
    let mat_proj = mat4_perspective(std::f32::consts::FRAC_PI_2, 800.0 / 600.0, 1.0, 500.0);
    let mvp = mat4_mul(&mat_proj, &mat_view);

    // 0 1
    // 3 2
    let corners = [
        (Vec4::new(1.0, -1.0, -1.0, 1.0), Vec2::new(0.0, 0.0)),
        (Vec4::new(1.0, 1.0, -1.0, 1.0), Vec2::new(1.0, 0.0)),
        (Vec4::new(-1.0, 1.0, -1.0, 1.0), Vec2::new(1.0, 1.0)),
        (Vec4::new(-1.0, -1.0, -1.0, 1.0), Vec2::new(0.0, 1.0)),
    ];

    for tri in [[0usize, 1, 2], [2, 3, 0]] {
        let tri_data = [corners[tri[0]], corners[tri[1]], corners[tri[2]]];
        rh.set_vertex_shader(move |index, output| {
            let (pos, uv) = tri_data[index];
            output.set_vec2(VARYING_TEXUV, uv);
            mat4_transform_vec4(&mvp, pos)
        });
        let tex = texture.clone();
        rh.set_pixel_shader(move |input| {
            let uv = input.vec2(VARYING_TEXUV);
            tex.sample_2d(uv.x, uv.y)
        });
        rh.draw_primitive();
    }

    match rh.save("quad.bmp") {
        Ok(()) => info!("wrote quad.bmp"),
        Err(e) => eprintln!("failed to save: {}", e),
    }
}
