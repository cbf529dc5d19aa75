use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// A shader graph as edited by the surrounding application and serialized to
/// JSON.
///
/// Node iteration order is the order of `nodes`; whole-graph compilation
/// treats the last node in this order as the pass output.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShaderGraph {
    pub version: String,
    pub metadata: Metadata,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,

    /// Backs `graph::add_node` id assignment. Serialized so ids stay unique
    /// across editing sessions.
    #[serde(default, rename = "nextNodeId")]
    pub next_node_id: u32,
}

impl ShaderGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: "1.0".to_string(),
            metadata: Metadata {
                name: name.into(),
                created: None,
                modified: None,
            },
            nodes: Vec::new(),
            connections: Vec::new(),
            next_node_id: 0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Metadata {
    pub name: String,
    pub created: Option<String>,
    pub modified: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Node {
    pub id: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// The closed set of node kinds, each carrying its own parameter struct.
///
/// JSON form is internally tagged:
/// `{"id": "1", "type": "Color", "color": [1.0, 0.0, 0.0]}`.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum NodeKind {
    Material(MaterialParams),
    Color(ColorParams),
    Blend(BlendParams),
    Texture(TextureParams),
    #[serde(rename = "UV")]
    Uv,
    Gradient(GradientParams),
    Add,
}

impl NodeKind {
    /// Display name used in generated comment markers and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Material(_) => "Material",
            NodeKind::Color(_) => "Color",
            NodeKind::Blend(_) => "Blend",
            NodeKind::Texture(_) => "Texture",
            NodeKind::Uv => "UV",
            NodeKind::Gradient(_) => "Gradient",
            NodeKind::Add => "Add",
        }
    }

    /// Named input ports, in declaration order. Fan-in is 1 per port.
    pub fn input_ports(&self) -> &'static [&'static str] {
        match self {
            NodeKind::Material(_) => &["Color"],
            NodeKind::Color(_) => &[],
            NodeKind::Blend(_) => &["Color A", "Color B"],
            NodeKind::Texture(_) => &["UV"],
            NodeKind::Uv => &[],
            NodeKind::Gradient(_) => &["UV"],
            NodeKind::Add => &["A", "B"],
        }
    }

    /// Named output ports. An output may fan out to many inputs.
    pub fn output_ports(&self) -> &'static [&'static str] {
        match self {
            NodeKind::Material(_) | NodeKind::Blend(_) | NodeKind::Add => &["Output"],
            NodeKind::Color(_) | NodeKind::Texture(_) | NodeKind::Gradient(_) => &["Color"],
            NodeKind::Uv => &["UV"],
        }
    }
}

// The editor's initial colour swatch (128/255 per channel).
fn default_grey() -> [f32; 3] {
    [128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0]
}

fn default_red() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

fn default_blue() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

fn default_specular_intensity() -> f32 {
    1.0
}

fn default_shininess() -> f32 {
    32.0
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ColorParams {
    #[serde(default = "default_grey")]
    pub color: [f32; 3],
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            color: default_grey(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum ShadingModel {
    #[default]
    Lambert,
    Phong,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MaterialParams {
    #[serde(default, rename = "shadingModel")]
    pub shading_model: ShadingModel,

    /// Used when the `Color` input port is unconnected.
    #[serde(default = "default_grey", rename = "baseColor")]
    pub base_color: [f32; 3],

    #[serde(default = "default_grey", rename = "specularColor")]
    pub specular_color: [f32; 3],
    #[serde(default = "default_specular_intensity", rename = "specularIntensity")]
    pub specular_intensity: f32,
    #[serde(default = "default_shininess")]
    pub shininess: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            shading_model: ShadingModel::default(),
            base_color: default_grey(),
            specular_color: default_grey(),
            specular_intensity: default_specular_intensity(),
            shininess: default_shininess(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum BlendMode {
    #[default]
    Multiply,
    Screen,
    Overlay,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct BlendParams {
    #[serde(default, rename = "blendMode")]
    pub blend_mode: BlendMode,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct TextureParams {
    /// Image path chosen in the editor. Bound by the rendering host; the
    /// compiler only forwards it in the bundle's sampler metadata.
    #[serde(default)]
    pub texture: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GradientParams {
    #[serde(default = "default_red", rename = "colorA")]
    pub color_a: [f32; 3],
    #[serde(default = "default_blue", rename = "colorB")]
    pub color_b: [f32; 3],
}

impl Default for GradientParams {
    fn default() -> Self {
        Self {
            color_a: default_red(),
            color_b: default_blue(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Connection {
    pub id: String,
    pub from: Endpoint,
    pub to: Endpoint,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Endpoint {
    #[serde(rename = "nodeId")]
    pub node_id: String,
    #[serde(rename = "portId")]
    pub port_id: String,
}

pub fn load_graph_from_default_asset() -> Result<ShaderGraph> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join("shadegraph-example.1.json");
    load_graph_from_path(path)
}

pub fn load_graph_from_path(path: impl AsRef<std::path::Path>) -> Result<ShaderGraph> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read graph json at {}", path.display()))?;
    let graph: ShaderGraph = serde_json::from_str(&text).context("failed to parse graph json")?;
    Ok(graph)
}

pub fn save_graph_to_path(graph: &ShaderGraph, path: impl AsRef<std::path::Path>) -> Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(graph).context("failed to serialize graph json")?;
    std::fs::write(path, text)
        .with_context(|| format!("failed to write graph json at {}", path.display()))?;
    Ok(())
}

pub fn nodes_by_id(graph: &ShaderGraph) -> HashMap<&str, &Node> {
    graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
}

pub fn find_node<'a>(nodes_by_id: &HashMap<&str, &'a Node>, node_id: &str) -> Result<&'a Node> {
    nodes_by_id
        .get(node_id)
        .copied()
        .ok_or_else(|| anyhow!("node not found: {node_id}"))
}

pub fn incoming_connection<'a>(
    graph: &'a ShaderGraph,
    to_node_id: &str,
    to_port_id: &str,
) -> Option<&'a Connection> {
    graph
        .connections
        .iter()
        .find(|c| c.to.node_id == to_node_id && c.to.port_id == to_port_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_json_round_trip() {
        let text = r#"{
            "version": "1.0",
            "metadata": { "name": "t" },
            "nodes": [
                { "id": "1", "type": "Color", "color": [1.0, 0.0, 0.0] },
                { "id": "2", "type": "UV" },
                { "id": "3", "type": "Blend", "blendMode": "Screen" }
            ],
            "connections": [
                {
                    "id": "1_3_Color A",
                    "from": { "nodeId": "1", "portId": "Color" },
                    "to": { "nodeId": "3", "portId": "Color A" }
                }
            ]
        }"#;
        let graph: ShaderGraph = serde_json::from_str(text).unwrap();
        assert_eq!(graph.nodes.len(), 3);
        assert!(matches!(graph.nodes[1].kind, NodeKind::Uv));
        match &graph.nodes[2].kind {
            NodeKind::Blend(p) => assert_eq!(p.blend_mode, BlendMode::Screen),
            other => panic!("expected Blend, got {other:?}"),
        }

        let json = serde_json::to_string(&graph).unwrap();
        let again: ShaderGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(again.connections.len(), 1);
        assert_eq!(again.connections[0].to.port_id, "Color A");
        assert!(matches!(again.nodes[0].kind, NodeKind::Color(_)));
    }

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let node: Node = serde_json::from_str(r#"{ "id": "m", "type": "Material" }"#).unwrap();
        match node.kind {
            NodeKind::Material(p) => {
                assert_eq!(p.shading_model, ShadingModel::Lambert);
                assert_eq!(p.specular_intensity, 1.0);
                assert_eq!(p.shininess, 32.0);
            }
            other => panic!("expected Material, got {other:?}"),
        }
    }

    #[test]
    fn save_then_load_preserves_the_graph() {
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be monotonic enough for tests")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("shadegraph-save-{nonce}.json"));

        let mut graph = ShaderGraph::new("saved");
        graph.nodes.push(Node {
            id: "1".to_string(),
            kind: NodeKind::Color(ColorParams {
                color: [1.0, 0.0, 0.0],
            }),
        });
        graph.next_node_id = 1;

        save_graph_to_path(&graph, &path).unwrap();
        let loaded = load_graph_from_path(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.metadata.name, "saved");
        assert_eq!(loaded.nodes.len(), 1);
        assert_eq!(loaded.next_node_id, 1);
        match &loaded.nodes[0].kind {
            NodeKind::Color(p) => assert_eq!(p.color, [1.0, 0.0, 0.0]),
            other => panic!("expected Color, got {other:?}"),
        }
    }

    #[test]
    fn incoming_connection_matches_node_and_port() {
        let mut graph = ShaderGraph::new("t");
        graph.connections.push(Connection {
            id: "a_b_A".to_string(),
            from: Endpoint {
                node_id: "a".to_string(),
                port_id: "Output".to_string(),
            },
            to: Endpoint {
                node_id: "b".to_string(),
                port_id: "A".to_string(),
            },
        });

        assert!(incoming_connection(&graph, "b", "A").is_some());
        assert!(incoming_connection(&graph, "b", "B").is_none());
        assert!(incoming_connection(&graph, "a", "A").is_none());
    }

    #[test]
    fn port_lists_cover_every_kind() {
        let kinds = [
            NodeKind::Material(MaterialParams::default()),
            NodeKind::Color(ColorParams::default()),
            NodeKind::Blend(BlendParams::default()),
            NodeKind::Texture(TextureParams::default()),
            NodeKind::Uv,
            NodeKind::Gradient(GradientParams::default()),
            NodeKind::Add,
        ];
        for kind in kinds {
            assert!(!kind.output_ports().is_empty(), "{} has no output", kind.name());
        }
        assert_eq!(
            NodeKind::Blend(BlendParams::default()).input_ports(),
            ["Color A", "Color B"]
        );
        assert!(NodeKind::Uv.input_ports().is_empty());
    }
}
