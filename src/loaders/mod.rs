pub mod gltf;
pub mod ply;

pub use self::gltf::load_gltf_file;
pub use self::ply::load_ply_file;

use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::mesh::Mesh;

/// What a mesh file decodes to before it is collapsed into one mesh
#[derive(Debug)]
pub enum LoadedGeometry {
    Mesh(Mesh),
    Scene(Vec<Mesh>),
}

/// Loads a mesh file, choosing the decoder from its extension
pub fn load_geometry(path: impl AsRef<Path>) -> Result<LoadedGeometry> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("ply") => load_ply_file(path).map(LoadedGeometry::Mesh),
        Some("glb") | Some("gltf") => {
            let mut parts = load_gltf_file(path)?;
            if parts.len() == 1 {
                Ok(LoadedGeometry::Mesh(parts.remove(0)))
            } else {
                Ok(LoadedGeometry::Scene(parts))
            }
        }
        _ => Err(ConvertError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Collapses a loaded scene into a single mesh and checks it is exportable.
pub fn ensure_mesh(geometry: LoadedGeometry, path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let mesh = match geometry {
        LoadedGeometry::Mesh(mesh) => mesh,
        LoadedGeometry::Scene(parts) => {
            log::debug!("Merging {} parts from {:?}", parts.len(), path);
            Mesh::concatenate(parts)
                .ok_or_else(|| ConvertError::unsupported_geometry(path, "scene contains no meshes"))?
        }
    };

    if mesh.vertex_count() == 0 || mesh.face_count() == 0 {
        return Err(ConvertError::unsupported_geometry(
            path,
            "mesh has no triangles",
        ));
    }
    mesh.validate()
        .map_err(|reason| ConvertError::unsupported_geometry(path, reason))?;
    Ok(mesh)
}

/// `load_geometry` followed by `ensure_mesh`
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    ensure_mesh(load_geometry(path)?, path)
}
