use glam::DVec3;
use grasp_glb::config::{ColorMode, ConvertConfig, DEFAULT_HAND_COLOR};
use grasp_glb::export::{encode_glb, write_glb};
use grasp_glb::loaders::{load_geometry, load_mesh, LoadedGeometry};
use grasp_glb::math::Rgba;
use grasp_glb::mesh::{Mesh, Visual};
use grasp_glb::scene::Scene;
use grasp_glb::{run, ConvertError};
use std::fs;
use std::path::{Path, PathBuf};

const HAND_PLY: &str = "ply
format ascii 1.0
comment hand tetrahedron
element vertex 4
property float x
property float y
property float z
element face 4
property list uchar int vertex_indices
end_header
0 0 0
2 0 0
0 2 0
0 0 2
3 0 1 2
3 0 2 3
3 0 3 1
3 1 3 2
";

const OBJECT_PLY: &str = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
property uchar alpha
element face 1
property list uchar int vertex_indices
end_header
4 0 0 10 20 30 255
4 2 0 10 20 30 255
4 1 1 10 20 30 255
3 0 1 2
";

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Reads back `(positions, colors)` of the named node in a GLB file
fn read_node(path: &Path, name: &str) -> (Vec<[f32; 3]>, Option<Vec<[u8; 4]>>) {
    let (document, buffers, _) = gltf::import(path).unwrap();
    let node = document
        .nodes()
        .find(|n| n.name() == Some(name))
        .unwrap_or_else(|| panic!("node {} missing", name));
    let primitive = node.mesh().unwrap().primitives().next().unwrap();
    let reader = primitive.reader(|b| Some(&buffers[b.index()]));
    let positions = reader.read_positions().unwrap().collect();
    let colors = reader.read_colors(0).map(|c| c.into_rgba_u8().collect());
    (positions, colors)
}

fn assert_close(actual: [f32; 3], expected: [f32; 3]) {
    for i in 0..3 {
        assert!(
            (actual[i] - expected[i]).abs() < 1e-6,
            "{:?} != {:?}",
            actual,
            expected
        );
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    #[test]
    fn test_end_to_end_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let hand = write_file(dir.path(), "hand.ply", HAND_PLY);
        let object = write_file(dir.path(), "object.ply", OBJECT_PLY);
        let out = dir.path().join("models/sample.glb");

        let report = run(&ConvertConfig::new(&hand, &object, &out)).unwrap();

        assert!(out.exists(), "Output directories should be created");
        assert_eq!(report.output_bytes as u64, fs::metadata(&out).unwrap().len());
        assert_eq!(report.hand.vertices, 4);
        assert_eq!(report.object.faces, 1);
        assert!(report.hand.painted);
        assert!(!report.object.painted, "Baked vertex colors are kept by default");

        let (positions, colors) = read_node(&out, "hand");
        assert_close(positions[1], [0.0, -0.25, -0.25]);
        assert_eq!(colors, Some(vec![DEFAULT_HAND_COLOR.0; 4]));

        let (positions, colors) = read_node(&out, "object");
        assert_close(positions[1], [0.5, 0.25, -0.25]);
        assert_eq!(colors, Some(vec![[10, 20, 30, 255]; 3]));
    }

    #[test]
    fn test_end_to_end_forced_without_normalization() {
        let dir = tempfile::tempdir().unwrap();
        let hand = write_file(dir.path(), "hand.ply", HAND_PLY);
        let object = write_file(dir.path(), "object.ply", OBJECT_PLY);
        let out = dir.path().join("forced.glb");

        let mut config = ConvertConfig::new(&hand, &object, &out);
        config.center = false;
        config.unit_scale = false;
        config.convert_mm = true;
        config.color_mode = ColorMode::Forced;
        config.obj_color = Rgba::new(124, 154, 129, 255);

        let report = run(&config).unwrap();
        assert!(report.normalization.is_none());
        assert!(report.object.painted);

        let (positions, colors) = read_node(&out, "object");
        assert_close(positions[1], [0.004, 0.002, 0.0]);
        assert_eq!(colors, Some(vec![[124, 154, 129, 255]; 3]));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let hand = write_file(dir.path(), "hand.ply", HAND_PLY);
        let object = write_file(dir.path(), "object.ply", OBJECT_PLY);
        let out = dir.path().join("report.glb");

        let report = run(&ConvertConfig::new(&hand, &object, &out)).unwrap();
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["config"]["color_mode"], "conditional");
        assert_eq!(json["normalization"]["scale"], 0.25);
        assert_eq!(json["hand"]["visual"], "none");
        assert_eq!(json["object"]["visual"], "vertex");
    }

    #[test]
    fn test_output_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let hand = write_file(dir.path(), "hand.ply", HAND_PLY);
        let object = write_file(dir.path(), "object.ply", OBJECT_PLY);
        let first = dir.path().join("a.glb");
        let second = dir.path().join("b.glb");

        run(&ConvertConfig::new(&hand, &object, &first)).unwrap();
        run(&ConvertConfig::new(&hand, &object, &second)).unwrap();

        assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
    }

    #[test]
    fn test_point_cloud_input_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let hand = write_file(
            dir.path(),
            "cloud.ply",
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n",
        );
        let object = write_file(dir.path(), "object.ply", OBJECT_PLY);
        let out = dir.path().join("never.glb");

        let err = run(&ConvertConfig::new(&hand, &object, &out)).unwrap_err();

        assert!(matches!(err, ConvertError::UnsupportedGeometry { .. }), "{}", err);
        assert!(!out.exists());
    }

    #[test]
    fn test_glb_scene_input_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        let red = Rgba::opaque(255, 0, 0);
        let part = |x: f64| {
            Mesh::new(
                vec![DVec3::new(x, 0.0, 0.0), DVec3::new(x + 1.0, 0.0, 0.0), DVec3::new(x, 1.0, 0.0)],
                vec![[0, 1, 2]],
            )
        };
        let mut first = part(0.0);
        first.set_solid_color(red);
        let scene = Scene::hand_and_object(first, part(5.0));
        let input = dir.path().join("two_parts.glb");
        write_glb(&input, &encode_glb(&scene).unwrap()).unwrap();

        match load_geometry(&input).unwrap() {
            LoadedGeometry::Scene(parts) => assert_eq!(parts.len(), 2),
            LoadedGeometry::Mesh(_) => panic!("Two nodes should load as a scene"),
        }

        let merged = load_mesh(&input).unwrap();
        assert_eq!(merged.vertex_count(), 6);
        assert_eq!(merged.faces[1], [3, 4, 5]);
        assert!((merged.positions[4] - DVec3::new(6.0, 0.0, 0.0)).length() < 1e-6);
        match merged.visual {
            Visual::VertexColors(colors) => {
                assert_eq!(colors[0], red);
                assert_eq!(colors[5], grasp_glb::mesh::DEFAULT_VERTEX_COLOR);
            }
            other => panic!("expected vertex colors, got {:?}", other),
        }
    }
}
