use glam::{DMat3, DMat4, DVec3, Vec3};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::math::Rgba;
use crate::mesh::{Mesh, Visual};

/// Loads every triangle primitive of a glTF/GLB file, with node transforms baked in
pub fn load_gltf_file(path: impl AsRef<Path>) -> Result<Vec<Mesh>> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (gltf, buffers, _images) = gltf::import(path).map_err(|source| ConvertError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!(
        "  scenes: {}, nodes: {}, meshes: {}",
        gltf.scenes().count(),
        gltf.nodes().count(),
        gltf.meshes().count()
    );

    let mut parts = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, &DMat4::IDENTITY, path, &mut parts);
        }
    }

    log::info!("  extracted {} mesh parts", parts.len());
    Ok(parts)
}

/// Recursively processes glTF nodes
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &DMat4,
    path: &Path,
    parts: &mut Vec<Mesh>,
) {
    let local = node.transform().matrix().map(|col| col.map(f64::from));
    let global_transform = *parent_transform * DMat4::from_cols_array_2d(&local);

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, path, parts);
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, path, parts);
    }
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &DMat4,
    path: &Path,
    parts: &mut Vec<Mesh>,
) {
    // A mirroring transform flips handedness, so winding has to flip with it.
    let mirrored = transform.determinant() < 0.0;
    let normal_matrix = DMat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive in mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<DVec3> = match reader.read_positions() {
            Some(positions) => positions
                .map(|p| transform.transform_point3(Vec3::from_array(p).as_dvec3()))
                .collect(),
            None => continue,
        };
        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        if indices.len() % 3 != 0 {
            log::warn!(
                "Skipping primitive in mesh {:?}: {} indices do not form whole triangles",
                mesh.name(),
                indices.len()
            );
            continue;
        }
        let faces: Vec<[u32; 3]> = indices
            .chunks_exact(3)
            .map(|t| if mirrored { [t[0], t[2], t[1]] } else { [t[0], t[1], t[2]] })
            .collect();

        let normals: Option<Vec<Vec3>> = reader.read_normals().map(|normals| {
            normals
                .map(|n| {
                    (normal_matrix * Vec3::from_array(n).as_dvec3())
                        .normalize_or_zero()
                        .as_vec3()
                })
                .collect()
        });

        let colors: Option<Vec<Rgba>> = reader
            .read_colors(0)
            .map(|colors| colors.into_rgba_u8().map(Rgba).collect());

        let textured = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_texture()
            .is_some();
        let uvs: Option<Vec<[f32; 2]>> = reader
            .read_tex_coords(0)
            .filter(|_| textured)
            .map(|uvs| uvs.into_f32().collect());

        let visual = match (colors, uvs) {
            (Some(colors), _) => Visual::VertexColors(colors),
            (None, Some(uvs)) => Visual::Texture {
                uvs,
                image: texture_uri(&primitive, path),
            },
            (None, None) => Visual::None,
        };

        let mut part = Mesh::new(positions, faces).with_visual(visual);
        if let Some(normals) = normals {
            part = part.with_normals(normals);
        }

        match part.validate() {
            Ok(()) => parts.push(part),
            Err(reason) => log::warn!("Skipping primitive in mesh {:?}: {}", mesh.name(), reason),
        }
    }
}

/// External image referenced by the primitive's base color texture, if any
fn texture_uri(primitive: &gltf::Primitive, path: &Path) -> Option<PathBuf> {
    let info = primitive.material().pbr_metallic_roughness().base_color_texture()?;
    match info.texture().source().source() {
        gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
            Some(path.parent().map_or_else(|| PathBuf::from(uri), |dir| dir.join(uri)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Writes a one-triangle glTF (+z normals) with an external buffer, placed by `node`
    fn write_triangle_gltf(dir: &Path, indices: &[u32], mut node: serde_json::Value) -> PathBuf {
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals: [[f32; 3]; 3] = [[0.0, 0.0, 1.0]; 3];

        let mut bin = Vec::new();
        bin.extend_from_slice(bytemuck::cast_slice(&positions));
        bin.extend_from_slice(bytemuck::cast_slice(&normals));
        bin.extend_from_slice(bytemuck::cast_slice(indices));
        std::fs::write(dir.join("triangle.bin"), &bin).unwrap();

        node["mesh"] = json!(0);
        let document = json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [node],
            "meshes": [{
                "primitives": [{ "attributes": { "POSITION": 0, "NORMAL": 1 }, "indices": 2 }]
            }],
            "buffers": [{ "uri": "triangle.bin", "byteLength": bin.len() }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
                { "buffer": 0, "byteOffset": 36, "byteLength": 36 },
                { "buffer": 0, "byteOffset": 72, "byteLength": indices.len() * 4 }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
                { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" },
                { "bufferView": 2, "componentType": 5125, "count": indices.len(), "type": "SCALAR" }
            ]
        });

        let path = dir.join("triangle.gltf");
        std::fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();
        path
    }

    fn face_normal(mesh: &Mesh, face: usize) -> DVec3 {
        let [a, b, c] = mesh.faces[face].map(|i| mesh.positions[i as usize]);
        (b - a).cross(c - a).normalize()
    }

    #[test]
    fn test_node_translation_is_baked() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_triangle_gltf(dir.path(), &[0, 1, 2], json!({ "translation": [1.0, 2.0, 3.0] }));

        let parts = load_gltf_file(&path).unwrap();
        assert_eq!(parts.len(), 1);
        let mesh = &parts[0];
        assert_eq!(mesh.positions[1], DVec3::new(2.0, 2.0, 3.0));
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert_eq!(face_normal(mesh, 0), DVec3::Z);
    }

    #[test]
    fn test_mirrored_node_flips_winding() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_triangle_gltf(
            dir.path(),
            &[0, 1, 2],
            json!({ "translation": [0.0, 0.0, 2.0], "scale": [-1.0, 1.0, 1.0] }),
        );

        let mesh = &load_gltf_file(&path).unwrap()[0];
        assert!((mesh.positions[1] - DVec3::new(-1.0, 0.0, 2.0)).length() < 1e-12);
        assert_eq!(mesh.faces, vec![[0, 2, 1]]);

        let stored = mesh.normals.as_ref().unwrap()[0];
        assert!((stored - Vec3::Z).length() < 1e-6, "{:?}", stored);
        assert!(
            face_normal(mesh, 0).dot(stored.as_dvec3()) > 0.0,
            "Faces must keep facing along their normals"
        );
    }

    #[test]
    fn test_non_uniform_scale_keeps_normals_perpendicular() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_triangle_gltf(dir.path(), &[0, 1, 2], json!({ "scale": [3.0, 1.0, 0.5] }));

        let mesh = &load_gltf_file(&path).unwrap()[0];
        let stored = mesh.normals.as_ref().unwrap()[2];
        assert!((stored.length() - 1.0).abs() < 1e-6);
        assert!((face_normal(mesh, 0) - stored.as_dvec3()).length() < 1e-6);
    }

    #[test]
    fn test_partial_triangle_indices_skip_primitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_triangle_gltf(dir.path(), &[0, 1, 2, 0], json!({}));

        assert!(load_gltf_file(&path).unwrap().is_empty());
    }
}
