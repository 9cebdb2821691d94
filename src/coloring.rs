use crate::config::ColorMode;
use crate::math::Rgba;
use crate::mesh::Mesh;

/// Applies `color` to `mesh` according to `mode`. Returns whether the mesh was painted.
pub fn apply_color_mode(mesh: &mut Mesh, mode: ColorMode, color: Rgba) -> bool {
    let paint = match mode {
        ColorMode::Conditional => !mesh.has_vertex_colors(),
        ColorMode::Forced => true,
    };

    if paint {
        log::debug!(
            "Painting {} vertices with {} (was {})",
            mesh.vertex_count(),
            color,
            mesh.visual.kind()
        );
        mesh.set_solid_color(color);
    } else {
        log::debug!("Keeping existing vertex colors");
    }
    paint
}
