// src/graph_models.rs

use serde::Serialize;

// --- Edge vocabulary ---

/// Arrow directionality of a mate edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    None,
    Forward,
    Back,
    Both,
}

/// Which side of a node an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compass {
    East,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    Bold,
    Dashed,
}

/// One edge endpoint: a node, optionally narrowed to one of its ports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndPoint {
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compass: Option<Compass>,
}

/// A wire, shield, loop or mate link. `colors` is the ordered hex band stack
/// the renderer draws as parallel strands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from: EndPoint,
    pub to: EndPoint,
    pub colors: Vec<String>,
    pub style: EdgeStyle,
    pub direction: Direction,
}

// --- Node structs ---

/// One row of a connector's pin table. Port identifiers are only present on
/// sides that carry active ports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_port: Option<String>,
    pub pin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_port: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorNode {
    pub id: String,
    pub label_rows: Vec<Vec<String>>,
    /// Hex swatch for the component's own color, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_bands: Option<Vec<String>>,
    pub pin_rows: Vec<PinRow>,
}

/// One row of a cable's wire table. `bands` stacks the wire's hex colors
/// between black borders; `in_label`/`out_label` annotate the far ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireRow {
    pub port: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub name: String,
    pub bands: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_label: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identification: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableNode {
    pub id: String,
    pub label_rows: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_bands: Option<Vec<String>>,
    pub wire_rows: Vec<WireRow>,
    pub bundle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Connector(ConnectorNode),
    Cable(CableNode),
}

/// The abstract diagram description handed to the layout renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GraphSpec {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSpec {
    pub fn connector(&self, id: &str) -> Option<&ConnectorNode> {
        self.nodes.iter().find_map(|node| match node {
            Node::Connector(connector) if connector.id == id => Some(connector),
            _ => None,
        })
    }

    pub fn cable(&self, id: &str) -> Option<&CableNode> {
        self.nodes.iter().find_map(|node| match node {
            Node::Cable(cable) if cable.id == id => Some(cable),
            _ => None,
        })
    }
}
