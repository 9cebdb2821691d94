use glam::{DVec3, Vec3};
use std::path::PathBuf;

use crate::math::{Rgba, AABB};

/// Color given to parts that lack vertex colors when merged with parts that have them.
pub const DEFAULT_VERTEX_COLOR: Rgba = Rgba::new(102, 102, 102, 255);

/// Visual attachment of a mesh
#[derive(Clone, Debug, PartialEq)]
pub enum Visual {
    None,
    /// One color per vertex
    VertexColors(Vec<Rgba>),
    /// Per-vertex texture coordinates and the image they index, if known
    Texture {
        uvs: Vec<[f32; 2]>,
        image: Option<PathBuf>,
    },
}

impl Visual {
    pub fn kind(&self) -> &'static str {
        match self {
            Visual::None => "none",
            Visual::VertexColors(_) => "vertex",
            Visual::Texture { .. } => "texture",
        }
    }
}

/// Indexed triangle mesh. Positions stay in double precision until export.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub positions: Vec<DVec3>,
    pub faces: Vec<[u32; 3]>,
    pub normals: Option<Vec<Vec3>>,
    pub visual: Visual,
}

impl Mesh {
    pub fn new(positions: Vec<DVec3>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            faces,
            normals: None,
            visual: Visual::None,
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = visual;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn has_vertex_colors(&self) -> bool {
        matches!(self.visual, Visual::VertexColors(_))
    }

    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(&self.positions)
    }

    /// Checks the per-vertex attribute lengths and face indices.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.positions.len();
        if let Some(normals) = &self.normals {
            if normals.len() != n {
                return Err(format!("{} normals for {} vertices", normals.len(), n));
            }
        }
        match &self.visual {
            Visual::VertexColors(colors) if colors.len() != n => {
                return Err(format!("{} vertex colors for {} vertices", colors.len(), n));
            }
            Visual::Texture { uvs, .. } if uvs.len() != n => {
                return Err(format!("{} texture coordinates for {} vertices", uvs.len(), n));
            }
            _ => {}
        }
        if let Some(face) = self.faces.iter().find(|f| f.iter().any(|&i| i as usize >= n)) {
            return Err(format!("face {:?} indexes past {} vertices", face, n));
        }
        Ok(())
    }

    pub fn apply_scale(&mut self, factor: f64) {
        for p in &mut self.positions {
            *p *= factor;
        }
    }

    pub fn translate(&mut self, offset: DVec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Replaces whatever visual the mesh had with `color` on every vertex.
    pub fn set_solid_color(&mut self, color: Rgba) {
        self.visual = Visual::VertexColors(vec![color; self.positions.len()]);
    }

    /// Merges several meshes into one, offsetting face indices.
    ///
    /// Normals survive only if every part has them. Vertex colors win over
    /// textures: if any part is vertex-colored, the others are filled with
    /// [`DEFAULT_VERTEX_COLOR`]. Textures survive only if every part is
    /// textured, keeping the first image.
    pub fn concatenate(parts: Vec<Mesh>) -> Option<Mesh> {
        if parts.len() <= 1 {
            return parts.into_iter().next();
        }

        let total_vertices: usize = parts.iter().map(Mesh::vertex_count).sum();
        let total_faces: usize = parts.iter().map(Mesh::face_count).sum();
        let keep_normals = parts.iter().all(|p| p.normals.is_some());
        let any_colors = parts.iter().any(Mesh::has_vertex_colors);
        let all_textured = parts
            .iter()
            .all(|p| matches!(p.visual, Visual::Texture { .. }));

        let mut positions = Vec::with_capacity(total_vertices);
        let mut faces = Vec::with_capacity(total_faces);
        let mut normals = Vec::with_capacity(if keep_normals { total_vertices } else { 0 });
        let mut colors = Vec::with_capacity(if any_colors { total_vertices } else { 0 });
        let mut uvs = Vec::with_capacity(if all_textured { total_vertices } else { 0 });
        let mut image = None;

        for part in parts {
            let offset = positions.len() as u32;
            let count = part.positions.len();
            faces.extend(part.faces.iter().map(|f| f.map(|i| i + offset)));
            positions.extend(part.positions);

            if keep_normals {
                normals.extend(part.normals.unwrap_or_default());
            }

            match part.visual {
                Visual::VertexColors(c) if any_colors => colors.extend(c),
                _ if any_colors => colors.extend(std::iter::repeat(DEFAULT_VERTEX_COLOR).take(count)),
                Visual::Texture { uvs: part_uvs, image: part_image } if all_textured => {
                    uvs.extend(part_uvs);
                    if image.is_none() {
                        image = part_image;
                    }
                }
                _ => {}
            }
        }

        let visual = if any_colors {
            Visual::VertexColors(colors)
        } else if all_textured {
            Visual::Texture { uvs, image }
        } else {
            Visual::None
        };

        Some(Mesh {
            positions,
            faces,
            normals: keep_normals.then_some(normals),
            visual,
        })
    }
}
