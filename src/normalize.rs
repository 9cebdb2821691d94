use glam::DVec3;
use serde::Serialize;

use crate::math::AABB;
use crate::mesh::Mesh;

/// Millimeters to meters
pub const MM_TO_M: f64 = 0.001;

/// Parameters applied by [`normalize_bounds`]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Normalization {
    /// Combined bounds before any transform
    pub bounds_before: AABB,
    /// Translation added to every vertex (zero when not centering)
    pub translation: DVec3,
    /// Uniform scale applied after the translation (1.0 when skipped)
    pub scale: f64,
}

/// Scales every mesh by [`MM_TO_M`] when `enabled`.
pub fn convert_units(meshes: &mut [&mut Mesh], enabled: bool) {
    if !enabled {
        return;
    }
    for mesh in meshes.iter_mut() {
        mesh.apply_scale(MM_TO_M);
    }
}

/// Bounding box of all meshes taken together.
pub fn combined_bounds(meshes: &[&mut Mesh]) -> Option<AABB> {
    meshes
        .iter()
        .filter_map(|m| m.bounds())
        .reduce(|acc, b| acc.union(&b))
}

/// Recenters and/or rescales all meshes against their combined bounding box.
///
/// Centering translates by `-center` first, then unit scaling multiplies by
/// `1 / extent`, so the relative pose of the meshes never changes. A zero
/// extent skips the scale.
pub fn normalize_bounds(meshes: &mut [&mut Mesh], center: bool, unit_scale: bool) -> Option<Normalization> {
    if !center && !unit_scale {
        return None;
    }

    let bounds = combined_bounds(meshes)?;
    let extent = bounds.max_extent();

    let translation = if center { -bounds.center() } else { DVec3::ZERO };
    if center {
        for mesh in meshes.iter_mut() {
            mesh.translate(translation);
        }
    }

    let scale = if unit_scale && extent > 0.0 {
        let s = 1.0 / extent;
        for mesh in meshes.iter_mut() {
            mesh.apply_scale(s);
        }
        s
    } else {
        if unit_scale {
            log::debug!("Combined extent is zero, skipping unit scale");
        }
        1.0
    };

    log::debug!(
        "Normalized bounds {:?}..{:?}: translation {:?}, scale {}",
        bounds.min,
        bounds.max,
        translation,
        scale
    );

    Some(Normalization {
        bounds_before: bounds,
        translation,
        scale,
    })
}
