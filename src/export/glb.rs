use gltf::json;
use gltf::json::validation::Checked::Valid;
use gltf::json::validation::USize64;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::mesh::{Mesh, Visual};
use crate::scene::Scene;

pub const GENERATOR: &str = concat!("grasp-glb ", env!("CARGO_PKG_VERSION"));

const GLB_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Accumulates the single binary buffer shared by every mesh
struct BinBuilder {
    buffer: json::Index<json::Buffer>,
    data: Vec<u8>,
}

impl BinBuilder {
    fn new(root: &mut json::Root) -> Self {
        let buffer = root.push(json::Buffer {
            byte_length: USize64(0),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        });
        Self {
            buffer,
            data: Vec::new(),
        }
    }

    /// Appends `bytes` at a 4-byte aligned offset and returns its view
    fn push_view(
        &mut self,
        root: &mut json::Root,
        bytes: &[u8],
        target: json::buffer::Target,
    ) -> json::Index<json::buffer::View> {
        pad_to_four(&mut self.data, 0);
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);

        root.push(json::buffer::View {
            buffer: self.buffer,
            byte_length: USize64::from(bytes.len()),
            byte_offset: Some(USize64::from(offset)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(target)),
        })
    }

    fn finish(mut self, root: &mut json::Root) -> Vec<u8> {
        pad_to_four(&mut self.data, 0);
        root.buffers[self.buffer.value()].byte_length = USize64::from(self.data.len());
        self.data
    }
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}

fn accessor(
    view: json::Index<json::buffer::View>,
    count: usize,
    component: json::accessor::ComponentType,
    type_: json::accessor::Type,
    normalized: bool,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(view),
        byte_offset: Some(USize64(0)),
        count: USize64::from(count),
        component_type: Valid(json::accessor::GenericComponentType(component)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: None,
        max: None,
        name: None,
        normalized,
        sparse: None,
    }
}

/// Writes one mesh's attributes into the buffer and returns its glTF mesh
fn push_mesh(root: &mut json::Root, bin: &mut BinBuilder, name: &str, mesh: &Mesh) -> json::Index<json::Mesh> {
    use gltf::json::accessor::{ComponentType, Type};
    use gltf::json::buffer::Target;

    let positions: Vec<[f32; 3]> = mesh
        .positions
        .iter()
        .map(|p| p.as_vec3().to_array())
        .collect();
    let (min, max) = positions.iter().fold(
        ([f32::INFINITY; 3], [f32::NEG_INFINITY; 3]),
        |(mut min, mut max), p| {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
            (min, max)
        },
    );

    let mut attributes = BTreeMap::new();

    let view = bin.push_view(root, bytemuck::cast_slice(&positions), Target::ArrayBuffer);
    let mut position_accessor = accessor(view, positions.len(), ComponentType::F32, Type::Vec3, false);
    position_accessor.min = Some(json::Value::from(min.to_vec()));
    position_accessor.max = Some(json::Value::from(max.to_vec()));
    attributes.insert(Valid(json::mesh::Semantic::Positions), root.push(position_accessor));

    if let Some(normals) = &mesh.normals {
        let normals: Vec<[f32; 3]> = normals.iter().map(|n| n.to_array()).collect();
        let view = bin.push_view(root, bytemuck::cast_slice(&normals), Target::ArrayBuffer);
        let normal_accessor = accessor(view, normals.len(), ComponentType::F32, Type::Vec3, false);
        attributes.insert(Valid(json::mesh::Semantic::Normals), root.push(normal_accessor));
    }

    if let Visual::VertexColors(colors) = &mesh.visual {
        let view = bin.push_view(root, bytemuck::cast_slice(colors), Target::ArrayBuffer);
        let color_accessor = accessor(view, colors.len(), ComponentType::U8, Type::Vec4, true);
        attributes.insert(Valid(json::mesh::Semantic::Colors(0)), root.push(color_accessor));
    }

    let view = bin.push_view(root, bytemuck::cast_slice(&mesh.faces), Target::ElementArrayBuffer);
    let indices = root.push(accessor(
        view,
        mesh.faces.len() * 3,
        ComponentType::U32,
        Type::Scalar,
        false,
    ));

    let primitive = json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(indices),
        material: None,
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    };

    root.push(json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some(name.to_string()),
        primitives: vec![primitive],
        weights: None,
    })
}

/// Serializes `scene` into a binary glTF (GLB) blob
pub fn encode_glb(scene: &Scene) -> Result<Vec<u8>> {
    let mut root = json::Root::default();
    root.asset.generator = Some(GENERATOR.to_string());

    let mut bin = BinBuilder::new(&mut root);
    let mut nodes = Vec::with_capacity(scene.nodes.len());

    for node in &scene.nodes {
        if let Visual::Texture { .. } = node.mesh.visual {
            log::warn!("Texture on node {:?} is not exported", node.name);
        }
        let mesh = push_mesh(&mut root, &mut bin, &node.name, &node.mesh);
        nodes.push(root.push(json::Node {
            mesh: Some(mesh),
            name: Some(node.name.clone()),
            ..Default::default()
        }));
    }

    let scene_index = root.push(json::Scene {
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        nodes,
    });
    root.scene = Some(scene_index);

    let bin = bin.finish(&mut root);

    let json_string =
        json::serialize::to_string(&root).map_err(|e| ConvertError::Encode(e.to_string()))?;
    let mut json_bytes = json_string.into_bytes();
    pad_to_four(&mut json_bytes, b' ');

    let length = GLB_HEADER_LEN + CHUNK_HEADER_LEN + json_bytes.len() + CHUNK_HEADER_LEN + bin.len();
    let glb = gltf::binary::Glb {
        header: gltf::binary::Header {
            magic: *b"glTF",
            version: 2,
            length: u32::try_from(length)
                .map_err(|_| ConvertError::Encode(format!("{} bytes exceeds the GLB size limit", length)))?,
        },
        json: Cow::Owned(json_bytes),
        bin: Some(Cow::Owned(bin)),
    };

    let mut bytes = Vec::with_capacity(length);
    glb.to_writer(&mut bytes)
        .map_err(|e| ConvertError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Writes `bytes` to `path` in one call, creating missing parent directories first
pub fn write_glb(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, bytes).map_err(write_err)
}
