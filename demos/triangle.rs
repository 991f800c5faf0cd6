//! Single colored triangle: the smallest possible pipeline exercise.
//! Vertex positions pass straight through, colors interpolate across
//! the face.

use log::info;
use softrast::{Renderer, Vec4};

const VARYING_COLOR: usize = 0;

fn main() {
    env_logger::init();

    let mut rh = Renderer::new(800, 600);

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

    rh.set_vertex_shader(move |index, output| {
        output.set_vec4(VARYING_COLOR, colors[index]);
        positions[index]
    });
    rh.set_pixel_shader(|input| input.vec4(VARYING_COLOR));

    rh.draw_primitive();

    match rh.save("triangle.bmp") {
        Ok(()) => info!("wrote triangle.bmp"),
        Err(e) => eprintln!("failed to save: {}", e),
    }
}
