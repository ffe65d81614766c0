use crate::error::Result;
use crate::harness_models::{Cable, Connector, OneOrMany};
use crate::range::RangeSpec;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Deserialize;

fn default_qty() -> Decimal {
    Decimal::ONE
}

/// One entry of a connection set: a bare designator, a parallel list of
/// designators, or a single-key map of designator → pin range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConnectionEntry {
    Pins(IndexMap<String, RangeSpec>),
    Designators(Vec<String>),
    Designator(String),
}

/// A freestanding BOM line from `additional_bom_items`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BomLine {
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_qty")]
    pub qty: Decimal,
    pub unit: Option<String>,
    pub designators: Option<OneOrMany>,
    pub manufacturer: Option<String>,
    pub mpn: Option<String>,
    pub pn: Option<String>,
}

/// The deserialized top-level input document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarnessDocument {
    #[serde(default)]
    pub connectors: IndexMap<String, Connector>,
    #[serde(default)]
    pub cables: IndexMap<String, Cable>,
    #[serde(default)]
    pub connections: Vec<Vec<ConnectionEntry>>,
    #[serde(default)]
    pub additional_bom_items: Vec<BomLine>,
}

impl HarnessDocument {
    pub fn from_yaml(input: &str) -> Result<HarnessDocument> {
        Ok(serde_yaml::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::RangeSpec;

    #[test]
    fn entry_shapes_deserialize() {
        let yaml = "\n- X1\n- [A1, A2]\n- W1: 1-4,6\n";
        let entries: Vec<ConnectionEntry> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entries[0], ConnectionEntry::Designator("X1".to_string()));
        assert_eq!(
            entries[1],
            ConnectionEntry::Designators(vec!["A1".to_string(), "A2".to_string()])
        );
        let ConnectionEntry::Pins(map) = &entries[2] else {
            panic!("expected a pin-range entry, got {:?}", entries[2]);
        };
        assert_eq!(
            map.get("W1"),
            Some(&RangeSpec::Shorthand("1-4,6".to_string()))
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let document = HarnessDocument::from_yaml("connectors: {}").unwrap();
        assert!(document.connectors.is_empty());
        assert!(document.cables.is_empty());
        assert!(document.connections.is_empty());
        assert!(document.additional_bom_items.is_empty());
    }
}
