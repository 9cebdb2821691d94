use glam::{DVec3, Vec3};
use ply_rs_bw::parser::Parser;
use ply_rs_bw::ply::{DefaultElement, Property};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::math::Rgba;
use crate::mesh::{Mesh, Visual};

const TEXTURE_FILE_COMMENT: &str = "TextureFile";

/// Loads an ASCII or binary PLY file as a single triangle mesh
pub fn load_ply_file(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    log::info!("Loading PLY file: {:?}", path);

    let file = File::open(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut BufReader::new(file))
        .map_err(|e| ConvertError::Ply {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let vertices = ply
        .payload
        .get("vertex")
        .ok_or_else(|| ConvertError::unsupported_geometry(path, "no vertex element"))?;

    let mut positions = Vec::with_capacity(vertices.len());
    let mut normals = Vec::with_capacity(vertices.len());
    let mut colors = Vec::with_capacity(vertices.len());
    let mut uvs = Vec::with_capacity(vertices.len());
    let mut has_normals = true;
    let mut has_colors = true;
    let mut has_uvs = true;

    for v in vertices {
        let (x, y, z) = match (prop_f64(v, "x"), prop_f64(v, "y"), prop_f64(v, "z")) {
            (Some(x), Some(y), Some(z)) => (x, y, z),
            _ => {
                return Err(ConvertError::unsupported_geometry(
                    path,
                    "vertex element lacks x/y/z properties",
                ))
            }
        };
        positions.push(DVec3::new(x, y, z));

        if has_normals {
            match (prop_f64(v, "nx"), prop_f64(v, "ny"), prop_f64(v, "nz")) {
                (Some(nx), Some(ny), Some(nz)) => {
                    normals.push(Vec3::new(nx as f32, ny as f32, nz as f32))
                }
                _ => has_normals = false,
            }
        }

        if has_colors {
            match vertex_color(v) {
                Some(c) => colors.push(c),
                None => has_colors = false,
            }
        }

        if has_uvs {
            match texture_coords(v) {
                Some(uv) => uvs.push(uv),
                None => has_uvs = false,
            }
        }
    }

    let faces = match ply.payload.get("face") {
        Some(faces) => triangulate(faces, positions.len()),
        None => {
            return Err(ConvertError::unsupported_geometry(
                path,
                "no face element (point clouds cannot be exported as meshes)",
            ))
        }
    };

    if positions.is_empty() || faces.is_empty() {
        return Err(ConvertError::unsupported_geometry(
            path,
            format!("{} vertices and {} usable faces", positions.len(), faces.len()),
        ));
    }

    let visual = if has_colors {
        Visual::VertexColors(colors)
    } else if has_uvs {
        Visual::Texture {
            uvs,
            image: texture_file(&ply.header.comments, path),
        }
    } else {
        Visual::None
    };

    log::info!(
        "  {} vertices, {} triangles, normals: {}, visual: {}",
        positions.len(),
        faces.len(),
        has_normals,
        visual.kind()
    );

    let mut mesh = Mesh::new(positions, faces).with_visual(visual);
    if has_normals {
        mesh = mesh.with_normals(normals);
    }
    Ok(mesh)
}

/// Fan-triangulates polygon faces, dropping any that reference missing vertices
fn triangulate(faces: &[DefaultElement], vertex_count: usize) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(faces.len());
    let mut dropped = 0usize;

    for face in faces {
        let indices = match prop_indices(face, "vertex_indices")
            .or_else(|| prop_indices(face, "vertex_index"))
        {
            Some(indices) => indices,
            None => {
                dropped += 1;
                continue;
            }
        };

        if indices.len() < 3 || indices.iter().any(|&i| i >= vertex_count) {
            dropped += 1;
            continue;
        }

        for i in 1..(indices.len() - 1) {
            triangles.push([indices[0] as u32, indices[i] as u32, indices[i + 1] as u32]);
        }
    }

    if dropped > 0 {
        log::warn!("Dropped {} malformed PLY faces", dropped);
    }
    triangles
}

fn vertex_color(elem: &DefaultElement) -> Option<Rgba> {
    let channel = |name: &str| {
        elem.get(name)
            .or_else(|| elem.get(&format!("diffuse_{}", name)))
            .and_then(property_channel)
    };
    let r = channel("red")?;
    let g = channel("green")?;
    let b = channel("blue")?;
    let a = channel("alpha").unwrap_or(255);
    Some(Rgba::new(r, g, b, a))
}

fn texture_coords(elem: &DefaultElement) -> Option<[f32; 2]> {
    [("u", "v"), ("s", "t"), ("texture_u", "texture_v")]
        .iter()
        .find_map(|(u, v)| match (prop_f64(elem, u), prop_f64(elem, v)) {
            (Some(u), Some(v)) => Some([u as f32, v as f32]),
            _ => None,
        })
}

/// Resolves a `comment TextureFile <name>` header line against the PLY's directory.
fn texture_file(comments: &[String], path: &Path) -> Option<PathBuf> {
    comments.iter().find_map(|comment| {
        let name = comment.trim().strip_prefix(TEXTURE_FILE_COMMENT)?.trim();
        if name.is_empty() {
            return None;
        }
        Some(match path.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        })
    })
}

fn prop_f64(elem: &DefaultElement, name: &str) -> Option<f64> {
    elem.get(name).and_then(property_f64)
}

fn property_f64(prop: &Property) -> Option<f64> {
    match prop {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

/// Integer color channels are taken as 0..=255, float channels as 0..=1.
fn property_channel(prop: &Property) -> Option<u8> {
    match prop {
        Property::UChar(v) => Some(*v),
        Property::Char(v) => Some((*v).max(0) as u8),
        Property::UShort(v) => Some((*v).min(255) as u8),
        Property::Short(v) => Some((*v).clamp(0, 255) as u8),
        Property::UInt(v) => Some((*v).min(255) as u8),
        Property::Int(v) => Some((*v).clamp(0, 255) as u8),
        Property::Float(v) => Some(Rgba::channel_from_f32(*v)),
        Property::Double(v) => Some(Rgba::channel_from_f32(*v as f32)),
        _ => None,
    }
}

fn prop_indices(elem: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    elem.get(name).and_then(property_indices)
}

/// Negative indices are mapped to `usize::MAX` so the face gets rejected.
fn property_indices(prop: &Property) -> Option<Vec<usize>> {
    fn signed(v: i64) -> usize {
        usize::try_from(v).unwrap_or(usize::MAX)
    }
    match prop {
        Property::ListInt(v) => Some(v.iter().map(|x| signed(*x as i64)).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|x| *x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|x| signed(*x as i64)).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|x| *x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|x| signed(*x as i64)).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|x| *x as usize).collect()),
        _ => None,
    }
}
