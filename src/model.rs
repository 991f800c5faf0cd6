//! Wavefront OBJ models with companion texture maps
//!
//! Supports the subset the shaders consume: positions (`v`), texture
//! coordinates (`vt`), normals (`vn`) and triangular faces (`f`, fans are
//! triangulated). The three index streams stay separate so a face corner
//! can combine any position/uv/normal, exactly as OBJ encodes it.
//!
//! Companion maps are looked up next to the OBJ file by suffix:
//! `<stem>_diffuse.bmp`, `<stem>_nm.bmp`, `<stem>_spec.bmp`. Each is
//! flipped vertically on load so v = 0 is the bottom of the image.

use crate::bitmap::Bitmap;
use crate::math::{Vec2, Vec3, Vec4};
use log::{debug, info};
use std::path::Path;

/// One face corner: indices into the position/uv/normal streams
#[derive(Debug, Clone, Copy)]
struct FaceVertex {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

/// Triangle mesh with optional texture maps
pub struct Model {
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    normals: Vec<Vec3>,
    faces: Vec<[FaceVertex; 3]>,
    diffuse_tex: Option<Bitmap>,
    normal_tex: Option<Bitmap>,
    specular_tex: Option<Bitmap>,
}

impl Model {
    /// Load an OBJ file plus whatever companion maps sit next to it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Io(format!("{}: {}", path.display(), e)))?;
        let mut model = Self::parse(&contents)?;

        model.diffuse_tex = load_companion_map(path, "_diffuse.bmp");
        model.normal_tex = load_companion_map(path, "_nm.bmp");
        model.specular_tex = load_companion_map(path, "_spec.bmp");

        info!(
            "loaded {}: {} vertices, {} faces",
            path.display(),
            model.nverts(),
            model.nfaces()
        );
        Ok(model)
    }

    /// Parse OBJ text. Companion maps are left unset.
    pub fn parse(contents: &str) -> Result<Self, ModelError> {
        let mut positions: Vec<Vec3> = Vec::new();
        let mut uvs: Vec<Vec2> = Vec::new();
        let mut normals: Vec<Vec3> = Vec::new();
        let mut faces: Vec<[FaceVertex; 3]> = Vec::new();

        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts[0] {
                "v" => {
                    if parts.len() < 4 {
                        return Err(ModelError::Parse(format!(
                            "Line {}: vertex position needs 3 values",
                            line_num + 1
                        )));
                    }
                    positions.push(Vec3::new(
                        parse_float(parts[1], line_num)?,
                        parse_float(parts[2], line_num)?,
                        parse_float(parts[3], line_num)?,
                    ));
                }

                "vt" => {
                    if parts.len() < 3 {
                        return Err(ModelError::Parse(format!(
                            "Line {}: texture coordinate needs 2 values",
                            line_num + 1
                        )));
                    }
                    uvs.push(Vec2::new(
                        parse_float(parts[1], line_num)?,
                        parse_float(parts[2], line_num)?,
                    ));
                }

                "vn" => {
                    if parts.len() < 4 {
                        return Err(ModelError::Parse(format!(
                            "Line {}: normal needs 3 values",
                            line_num + 1
                        )));
                    }
                    normals.push(Vec3::new(
                        parse_float(parts[1], line_num)?,
                        parse_float(parts[2], line_num)?,
                        parse_float(parts[3], line_num)?,
                    ));
                }

                "f" => {
                    if parts.len() < 4 {
                        return Err(ModelError::Parse(format!(
                            "Line {}: face needs at least 3 corners",
                            line_num + 1
                        )));
                    }
                    let mut corners = Vec::with_capacity(parts.len() - 1);
                    for spec in &parts[1..] {
                        corners.push(parse_face_vertex(
                            spec,
                            line_num,
                            positions.len(),
                            uvs.len(),
                            normals.len(),
                        )?);
                    }
                    // Fan triangulation for quads and n-gons
                    for i in 1..corners.len() - 1 {
                        faces.push([corners[0], corners[i], corners[i + 1]]);
                    }
                }

                // Ignore groups, materials, smoothing etc.
                _ => {}
            }
        }

        if positions.is_empty() {
            return Err(ModelError::Parse("no vertices found".to_string()));
        }
        if faces.is_empty() {
            return Err(ModelError::Parse("no faces found".to_string()));
        }

        debug!("parsed OBJ: {} positions, {} faces", positions.len(), faces.len());
        Ok(Self {
            positions,
            uvs,
            normals,
            faces,
            diffuse_tex: None,
            normal_tex: None,
            specular_tex: None,
        })
    }

    pub fn nverts(&self) -> usize {
        self.positions.len()
    }

    pub fn nfaces(&self) -> usize {
        self.faces.len()
    }

    /// Position of corner `nth` (0-2) of face `iface`
    pub fn vert(&self, iface: usize, nth: usize) -> Vec3 {
        self.positions[self.faces[iface][nth].position]
    }

    /// Texture coordinate of a face corner; (0, 0) when the face has none
    pub fn uv(&self, iface: usize, nth: usize) -> Vec2 {
        match self.faces[iface][nth].uv {
            Some(i) => self.uvs[i],
            None => Vec2::ZERO,
        }
    }

    /// Unit normal of a face corner; zero when the face has none
    pub fn normal(&self, iface: usize, nth: usize) -> Vec3 {
        match self.faces[iface][nth].normal {
            Some(i) => self.normals[i].normalize(),
            None => Vec3::ZERO,
        }
    }

    pub fn diffuse_texture(&self) -> Option<&Bitmap> {
        self.diffuse_tex.as_ref()
    }

    pub fn normal_texture(&self) -> Option<&Bitmap> {
        self.normal_tex.as_ref()
    }

    pub fn specular_texture(&self) -> Option<&Bitmap> {
        self.specular_tex.as_ref()
    }

    /// Sample the diffuse map; white when the model has none
    pub fn diffuse(&self, uv: Vec2) -> Vec4 {
        match &self.diffuse_tex {
            Some(map) => map.sample_2d(uv.x, uv.y),
            None => Vec4::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    /// Sample the normal map, decoded from [0, 1] to [-1, 1].
    /// A model without one reports the unperturbed surface normal.
    pub fn normal_map(&self, uv: Vec2) -> Vec3 {
        match &self.normal_tex {
            Some(map) => {
                let c = map.sample_2d(uv.x, uv.y);
                Vec3::new(c.x * 2.0 - 1.0, c.y * 2.0 - 1.0, c.z * 2.0 - 1.0)
            }
            None => Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// Specular exponent factor from the map's blue channel; 0 without a map
    pub fn specular(&self, uv: Vec2) -> f32 {
        match &self.specular_tex {
            Some(map) => map.sample_2d(uv.x, uv.y).z,
            None => 0.0,
        }
    }
}

fn load_companion_map(obj_path: &Path, suffix: &str) -> Option<Bitmap> {
    let stem = obj_path.file_stem()?.to_str()?;
    let tex_path = obj_path.with_file_name(format!("{}{}", stem, suffix));
    match Bitmap::load_bmp(&tex_path) {
        Ok(mut map) => {
            map.flip_vertical();
            debug!("loaded companion map {}", tex_path.display());
            Some(map)
        }
        Err(_) => {
            debug!("no companion map {}", tex_path.display());
            None
        }
    }
}

/// Parse a face corner like `7/2/3`, `7//3`, `7/2` or `7`
fn parse_face_vertex(
    spec: &str,
    line_num: usize,
    npositions: usize,
    nuvs: usize,
    nnormals: usize,
) -> Result<FaceVertex, ModelError> {
    let parts: Vec<&str> = spec.split('/').collect();

    if parts[0].is_empty() {
        return Err(ModelError::Parse(format!(
            "Line {}: missing position index in face",
            line_num + 1
        )));
    }
    let position = parse_index(parts[0], npositions, line_num)?;

    let uv = if parts.len() > 1 && !parts[1].is_empty() {
        Some(parse_index(parts[1], nuvs, line_num)?)
    } else {
        None
    };

    let normal = if parts.len() > 2 && !parts[2].is_empty() {
        Some(parse_index(parts[2], nnormals, line_num)?)
    } else {
        None
    };

    Ok(FaceVertex { position, uv, normal })
}

fn parse_float(s: &str, line_num: usize) -> Result<f32, ModelError> {
    s.parse().map_err(|_| {
        ModelError::Parse(format!("Line {}: invalid float value '{}'", line_num + 1, s))
    })
}

/// Parse a 1-based index; negative values count back from the current end
fn parse_index(s: &str, count: usize, line_num: usize) -> Result<usize, ModelError> {
    let idx: i32 = s.parse().map_err(|_| {
        ModelError::Parse(format!("Line {}: invalid index '{}'", line_num + 1, s))
    })?;

    let result = if idx > 0 {
        (idx - 1) as usize
    } else if idx < 0 {
        let back = count as i32 + idx;
        if back < 0 {
            return Err(ModelError::Parse(format!(
                "Line {}: index {} out of range",
                line_num + 1,
                idx
            )));
        }
        back as usize
    } else {
        return Err(ModelError::Parse(format!(
            "Line {}: index cannot be 0",
            line_num + 1
        )));
    };

    if result >= count {
        return Err(ModelError::Parse(format!(
            "Line {}: index {} out of range (have {} elements)",
            line_num + 1,
            idx,
            count
        )));
    }

    Ok(result)
}

/// Error types for model loading
#[derive(Debug)]
pub enum ModelError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ModelError::Io(e) => write!(f, "IO error: {}", e),
            ModelError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ModelError {}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "\
# simple triangle
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";

    #[test]
    fn test_parse_triangle() {
        let model = Model::parse(TRIANGLE_OBJ).unwrap();
        assert_eq!(model.nverts(), 3);
        assert_eq!(model.nfaces(), 1);
        assert_eq!(model.vert(0, 1), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(model.uv(0, 2), Vec2::new(0.0, 1.0));
        assert_eq!(model.normal(0, 0), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_quad_triangulates_to_fan() {
        let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";
        let model = Model::parse(obj).unwrap();
        assert_eq!(model.nfaces(), 2);
        assert_eq!(model.vert(0, 0), model.vert(1, 0));
        assert_eq!(model.vert(1, 1), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_negative_indices() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
f -3 -2 -1
";
        let model = Model::parse(obj).unwrap();
        assert_eq!(model.vert(0, 0), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(model.vert(0, 2), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_face_without_uv_or_normal() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        let model = Model::parse(obj).unwrap();
        assert_eq!(model.uv(0, 0), Vec2::ZERO);
        assert_eq!(model.normal(0, 0), Vec3::ZERO);
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let obj = "\
v 0 0 0
f 1 2 3
";
        assert!(Model::parse(obj).is_err());
    }

    #[test]
    fn test_zero_index_rejected() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 0 1 2
";
        assert!(Model::parse(obj).is_err());
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(Model::parse("# nothing here\n").is_err());
    }

    #[test]
    fn test_missing_maps_fall_back() {
        let model = Model::parse(TRIANGLE_OBJ).unwrap();
        assert_eq!(model.diffuse(Vec2::new(0.5, 0.5)), Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(model.normal_map(Vec2::new(0.5, 0.5)), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(model.specular(Vec2::new(0.5, 0.5)), 0.0);
    }

    #[test]
    fn test_normals_are_normalized() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 5
f 1//1 2//1 3//1
";
        let model = Model::parse(obj).unwrap();
        let n = model.normal(0, 0);
        assert!((n.length() - 1.0).abs() < 1e-6);
    }
}
