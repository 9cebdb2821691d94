use crate::mesh::Mesh;

pub const HAND_NODE: &str = "hand";
pub const OBJECT_NODE: &str = "object";

/// A named mesh in the exported scene
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub mesh: Mesh,
}

/// Flat scene graph: every node is a root holding one mesh
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, name: impl Into<String>, mesh: Mesh) {
        self.nodes.push(SceneNode {
            name: name.into(),
            mesh,
        });
    }

    /// The two-node scene web viewers expect: `hand` then `object`.
    pub fn hand_and_object(hand: Mesh, object: Mesh) -> Self {
        let mut scene = Self::new();
        scene.add_geometry(HAND_NODE, hand);
        scene.add_geometry(OBJECT_NODE, object);
        scene
    }

    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}
