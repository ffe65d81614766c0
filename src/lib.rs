// src/lib.rs

pub mod bom;
pub mod colors;
pub mod document;
pub mod error;
pub mod graph_models;
pub mod harness;
pub mod harness_models;
pub mod helper;
pub mod range;
pub mod resolver;

use crate::document::HarnessDocument;
use crate::error::Result;
use crate::graph_models::GraphSpec;
use crate::harness::Harness;
use log::info;

/// Parses a YAML harness description and resolves every connection set into
/// a populated harness aggregate.
pub fn parse(yaml_input: &str) -> Result<Harness> {
    let document = HarnessDocument::from_yaml(yaml_input)?;
    info!(
        "parsed document: {} connector templates, {} cable templates, {} connection sets",
        document.connectors.len(),
        document.cables.len(),
        document.connections.len()
    );
    resolver::Resolver::resolve(document)
}

/// Does the high-level harness conversion: parse the document, then derive
/// the diagram description and the BOM table from it.
pub fn build(yaml_input: &str) -> Result<(GraphSpec, Vec<Vec<String>>)> {
    let mut harness = parse(yaml_input)?;
    let graph = harness.create_graph()?;
    let bom_table = harness.bom_table()?;
    info!(
        "generated {} nodes, {} edges and {} BOM entries",
        graph.nodes.len(),
        graph.edges.len(),
        bom_table.len().saturating_sub(1)
    );
    Ok((graph, bom_table))
}
