//! Gouraud-lit textured cube: six quads fanned into twelve triangles,
//! a model rotation, a look-at camera and one directional light whose
//! intensity is computed per vertex and interpolated.

use log::info;
use softrast::{
    mat4_look_at, mat4_mul, mat4_perspective, mat4_rotation, mat4_transform_point,
    mat4_transform_vec4, Bitmap, Renderer, Vec2, Vec3,
};

const VARYING_TEXUV: usize = 0;
const VARYING_LIGHT: usize = 1;

fn main() {
    env_logger::init();

    let mut rh = Renderer::new(800, 600);

    let texture = Bitmap::checker(256, 256, 32, 0xffffffff, 0xff3fbcef);

    let mat_model = mat4_rotation(Vec3::new(-1.0, -0.5, 1.0), 1.0);
    let mat_view = mat4_look_at(Vec3::new(3.5, 0.0, 0.0), Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
    let mat_proj = mat4_perspective(std::f32::consts::FRAC_PI_2, 800.0 / 600.0, 1.0, 500.0);
    let mvp = mat4_mul(&mat4_mul(&mat_proj, &mat_view), &mat_model);

    let light_dir = Vec3::new(1.0, 0.0, 2.0).normalize();

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

    for plane in planes {
        // Face normal from the plane's winding
        let a = mesh[plane[0]];
        let b = mesh[plane[1]];
        let c = mesh[plane[2]];
        let normal = (c - a).cross(b - a).normalize();

        for tri in [[0usize, 1, 2], [2, 3, 0]] {
            let tri_data = [
                (mesh[plane[tri[0]]], face_uv[tri[0]]),
                (mesh[plane[tri[1]]], face_uv[tri[1]]),
                (mesh[plane[tri[2]]], face_uv[tri[2]]),
            ];
            rh.set_vertex_shader(move |index, output| {
                let (pos, uv) = tri_data[index];
                output.set_vec2(VARYING_TEXUV, uv);
                // Normals rotate with the model but ignore view/projection
                let world_normal = mat4_transform_point(&mat_model, normal);
                let intensity = (world_normal.dot(light_dir).max(0.0) + 0.1).min(1.0);
                output.set_float(VARYING_LIGHT, intensity);
                mat4_transform_vec4(&mvp, pos.xyz1())
            });
            let tex = texture.clone();
            rh.set_pixel_shader(move |input| {
                let uv = input.vec2(VARYING_TEXUV);
                let light = input.float(VARYING_LIGHT);
                tex.sample_2d(uv.x, uv.y) * light
            });
            rh.draw_primitive();
        }
    }

    match rh.save("cube.bmp") {
        Ok(()) => info!("wrote cube.bmp"),
        Err(e) => eprintln!("failed to save: {}", e),
    }
}
