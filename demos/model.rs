//! Normal-mapped relief tile: the full model collaborator path. The demo
//! first writes a small OBJ tile plus companion diffuse/normal/specular
//! BMP maps to a scratch directory, loads them back through `Model`, and
//! renders with per-pixel lighting: the pixel stage reads the object-space
//! normal map, transforms it by the inverse transpose of the model matrix,
//! and adds a specular highlight scaled by the specular map.

use log::info;
use softrast::{
    mat4_invert, mat4_look_at, mat4_mul, mat4_perspective, mat4_rotation, mat4_scale,
    mat4_transform_point, mat4_transform_vec4, mat4_transpose, Bitmap, Model, Renderer, Vec2,
    Vec3,
};
use std::path::{Path, PathBuf};
use std::rc::Rc;

const VARYING_UV: usize = 0;
const VARYING_EYE: usize = 1;

/// A unit tile in the xy plane, facing +z
const TILE_OBJ: &str = "\
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
f 3/3/1 4/4/1 1/1/1
";

/// Write the OBJ and its three companion maps next to each other so
/// `Model::load` picks them up by suffix.
fn write_assets(dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let obj_path = dir.join("tile.obj");
    std::fs::write(&obj_path, TILE_OBJ)?;

    let diffuse = Bitmap::checker(128, 128, 32, 0xffc89664, 0xff50648c);
    diffuse.save_bmp(dir.join("tile_diffuse.bmp"), false)?;

    // Object-space normal map: a hemispherical bump in each 32-pixel cell,
    // encoded from [-1, 1] to [0, 1] per channel
    let mut normals = Bitmap::new(128, 128);
    for y in 0..128 {
        for x in 0..128 {
            let dx = (x % 32) as f32 - 15.5;
            let dy = (y % 32) as f32 - 15.5;
            let r2 = dx * dx + dy * dy;
            let n = if r2 < 144.0 {
                Vec3::new(dx, dy, (144.0 - r2).sqrt()).normalize()
            } else {
                Vec3::new(0.0, 0.0, 1.0)
            };
            let enc = |v: f32| ((v * 0.5 + 0.5) * 255.0) as u32;
            normals.set_pixel(x, y, 0xff000000 | (enc(n.x) << 16) | (enc(n.y) << 8) | enc(n.z));
        }
    }
    normals.save_bmp(dir.join("tile_nm.bmp"), false)?;

    // Specular map: shiny bumps on a dull base; the sampler reads the
    // blue channel
    let mut spec = Bitmap::new(128, 128);
    for y in 0..128 {
        for x in 0..128 {
            let dx = (x % 32) as f32 - 15.5;
            let dy = (y % 32) as f32 - 15.5;
            let b = if dx * dx + dy * dy < 144.0 { 220u32 } else { 40 };
            spec.set_pixel(x, y, 0xff000000 | (b << 16) | (b << 8) | b);
        }
    }
    spec.save_bmp(dir.join("tile_spec.bmp"), false)?;

    Ok(obj_path)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let assets = std::env::temp_dir().join("softrast_tile_assets");
    let obj_path = write_assets(&assets)?;
    let model = Rc::new(Model::load(&obj_path)?);

    let mut rh = Renderer::new(800, 600);

    let eye_pos = Vec3::new(0.8, -2.2, 1.8);
    let mat_model = mat4_mul(
        &mat4_rotation(Vec3::new(0.0, 0.0, 1.0), 0.4),
        &mat4_scale(1.3, 1.3, 1.0),
    );
    let mat_view = mat4_look_at(eye_pos, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
    let mat_proj = mat4_perspective(std::f32::consts::FRAC_PI_2, 800.0 / 600.0, 1.0, 500.0);
    let mvp = mat4_mul(&mat4_mul(&mat_proj, &mat_view), &mat_model);
    // Normals transform by the inverse transpose of the model matrix
    let mat_model_it = mat4_transpose(&mat4_invert(&mat_model));
    let light_dir = Vec3::new(1.0, -1.0, 1.6).normalize();

    let ps_model = model.clone();
    rh.set_pixel_shader(move |input| {
        let uv = input.vec2(VARYING_UV);
        let eye_dir = input.vec3(VARYING_EYE).normalize();
        let n = mat4_transform_point(&mat_model_it, ps_model.normal_map(uv)).normalize();
        let shininess = ps_model.specular(uv);
        let reflected = (n * (2.0 * n.dot(light_dir)) - light_dir).normalize();
        let highlight = reflected.dot(eye_dir).clamp(0.0, 1.0);
        let spec = (highlight.powf(shininess * 20.0) * 0.05).clamp(0.0, 1.0);
        let intensity = n.dot(light_dir).clamp(0.0, 1.0) + 0.2 + spec;
        ps_model.diffuse(uv) * intensity
    });

    for iface in 0..model.nfaces() {
        let tri: [(Vec3, Vec2); 3] = [
            (model.vert(iface, 0), model.uv(iface, 0)),
            (model.vert(iface, 1), model.uv(iface, 1)),
            (model.vert(iface, 2), model.uv(iface, 2)),
        ];
        rh.set_vertex_shader(move |index, output| {
            let (pos, uv) = tri[index];
            let world_pos = mat4_transform_point(&mat_model, pos);
            output.set_vec2(VARYING_UV, uv);
            output.set_vec3(VARYING_EYE, eye_pos - world_pos);
            mat4_transform_vec4(&mvp, pos.xyz1())
        });
        rh.draw_primitive();
    }

    rh.save("model.bmp")?;
    info!("wrote model.bmp");
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("model demo failed: {}", e);
        std::process::exit(1);
    }
}
