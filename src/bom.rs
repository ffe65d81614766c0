use crate::error::Result;
use crate::harness::Harness;
use crate::harness_models::{Cable, CableCategory, Connector};
use crate::helper::clean_whitespace;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One aggregated BOM row with its stable id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomEntry {
    pub id: usize,
    pub item: String,
    pub qty: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub designators: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,
}

/// One BOM line before aggregation.
struct RawEntry {
    item: String,
    qty: Decimal,
    unit: Option<String>,
    designators: Vec<String>,
    manufacturer: Option<String>,
    mpn: Option<String>,
    pn: Option<String>,
}

/// Entries with the same key merge into one row.
type GroupKey = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn group_key(entry: &RawEntry) -> GroupKey {
    (
        entry.item.clone(),
        entry.unit.clone(),
        entry.manufacturer.clone(),
        entry.mpn.clone(),
        entry.pn.clone(),
    )
}

fn normalize(option: Option<&str>) -> Option<String> {
    option.map(clean_whitespace)
}

fn connector_entries(connector: &Connector, raw: &mut Vec<RawEntry>) -> Result<()> {
    let designators = if connector.show_name {
        vec![connector.name.clone()]
    } else {
        Vec::new()
    };
    if !connector.ignore_in_bom {
        let mut item = "Connector".to_string();
        if let Some(connector_type) = &connector.connector_type {
            item.push_str(&format!(", {connector_type}"));
        }
        if let Some(subtype) = &connector.subtype {
            item.push_str(&format!(", {subtype}"));
        }
        if connector.show_pincount {
            item.push_str(&format!(", {} pins", connector.pincount()));
        }
        if let Some(color) = &connector.color {
            item.push_str(&format!(", {color}"));
        }
        raw.push(RawEntry {
            item,
            qty: Decimal::ONE,
            unit: None,
            designators: designators.clone(),
            manufacturer: connector.manufacturer.clone(),
            mpn: connector.mpn.clone(),
            pn: connector.pn.clone(),
        });
    }
    for part in &connector.additional_components {
        let qty = part.qty * connector.qty_multiplier(part.qty_multiplier.as_ref())?;
        raw.push(RawEntry {
            item: part.description(),
            qty,
            unit: part.unit.clone(),
            designators: designators.clone(),
            manufacturer: part.manufacturer.clone(),
            mpn: part.mpn.clone(),
            pn: part.pn.clone(),
        });
    }
    Ok(())
}

fn cable_entries(cable: &Cable, raw: &mut Vec<RawEntry>) -> Result<()> {
    let designators = if cable.show_name {
        vec![cable.name.clone()]
    } else {
        Vec::new()
    };
    if !cable.ignore_in_bom {
        let gauge_text = cable.gauge.map(|gauge| {
            format!(
                "{gauge} {}",
                cable.gauge_unit.as_deref().unwrap_or("mm²")
            )
        });
        if cable.category != CableCategory::Bundle {
            // the cable is one part
            let mut item = "Cable".to_string();
            if let Some(cable_type) = &cable.cable_type {
                item.push_str(&format!(", {cable_type}"));
            }
            item.push_str(&format!(", {}", cable.wirecount()));
            match &gauge_text {
                Some(gauge) => item.push_str(&format!(" x {gauge}")),
                None => item.push_str(" wires"),
            }
            if cable.shield_active() {
                item.push_str(" shielded");
            }
            raw.push(RawEntry {
                item,
                qty: cable.length,
                unit: Some("m".to_string()),
                designators: designators.clone(),
                manufacturer: cable.manufacturer.as_ref().and_then(|m| m.scalar()).map(str::to_string),
                mpn: cable.mpn.as_ref().and_then(|m| m.scalar()).map(str::to_string),
                pn: cable.pn.as_ref().and_then(|m| m.scalar()).map(str::to_string),
            });
        } else {
            // every wire of a bundle is tracked as its own part
            for (offset, color) in cable.colors.iter().enumerate() {
                let mut item = "Wire".to_string();
                if let Some(cable_type) = &cable.cable_type {
                    item.push_str(&format!(", {cable_type}"));
                }
                if let Some(gauge) = &gauge_text {
                    item.push_str(&format!(", {gauge}"));
                }
                if !color.is_empty() {
                    item.push_str(&format!(", {color}"));
                }
                raw.push(RawEntry {
                    item,
                    qty: cable.length,
                    unit: Some("m".to_string()),
                    designators: designators.clone(),
                    manufacturer: cable
                        .manufacturer
                        .as_ref()
                        .and_then(|m| m.item_or_scalar(offset))
                        .map(str::to_string),
                    mpn: cable
                        .mpn
                        .as_ref()
                        .and_then(|m| m.item_or_scalar(offset))
                        .map(str::to_string),
                    pn: cable
                        .pn
                        .as_ref()
                        .and_then(|m| m.item_or_scalar(offset))
                        .map(str::to_string),
                });
            }
        }
    }
    for part in &cable.additional_components {
        let qty = part.qty * cable.qty_multiplier(part.qty_multiplier.as_ref())?;
        raw.push(RawEntry {
            item: part.description(),
            qty,
            unit: part.unit.clone(),
            designators: designators.clone(),
            manufacturer: part.manufacturer.clone(),
            mpn: part.mpn.clone(),
            pn: part.pn.clone(),
        });
    }
    Ok(())
}

/// Collects, normalizes, groups and sorts every BOM line of the harness.
/// Groups sort by their full key so the result is independent of declaration
/// order; ids are assigned after the sort.
pub(crate) fn generate_bom(harness: &Harness) -> Result<Vec<BomEntry>> {
    let mut raw = Vec::new();
    for connector in harness.connectors.values() {
        connector_entries(connector, &mut raw)?;
    }
    for cable in harness.cables.values() {
        cable_entries(cable, &mut raw)?;
    }
    for line in &harness.additional_bom_items {
        raw.push(RawEntry {
            item: line.description.clone(),
            qty: line.qty,
            unit: line.unit.clone(),
            designators: line
                .designators
                .as_ref()
                .map(|d| d.to_vec())
                .unwrap_or_default(),
            manufacturer: line.manufacturer.clone(),
            mpn: line.mpn.clone(),
            pn: line.pn.clone(),
        });
    }

    let mut groups: BTreeMap<GroupKey, (Decimal, BTreeSet<String>)> = BTreeMap::new();
    for mut entry in raw {
        entry.item = clean_whitespace(&entry.item);
        entry.unit = normalize(entry.unit.as_deref());
        entry.manufacturer = normalize(entry.manufacturer.as_deref());
        entry.mpn = normalize(entry.mpn.as_deref());
        entry.pn = normalize(entry.pn.as_deref());
        let slot = groups.entry(group_key(&entry)).or_default();
        slot.0 += entry.qty;
        slot.1.extend(entry.designators);
    }

    Ok(groups
        .into_iter()
        .enumerate()
        .map(|(index, (key, (qty, designators)))| {
            let (item, unit, manufacturer, mpn, pn) = key;
            BomEntry {
                id: index + 1,
                item,
                qty: qty.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero),
                unit,
                designators,
                pn,
                manufacturer,
                mpn,
            }
        })
        .collect())
}

/// Looks up the id of the BOM row matching the given grouping fields.
pub(crate) fn find_bom_id(
    bom: &[BomEntry],
    item: &str,
    unit: Option<&str>,
    manufacturer: Option<&str>,
    mpn: Option<&str>,
    pn: Option<&str>,
) -> Option<usize> {
    let target = (
        clean_whitespace(item),
        normalize(unit),
        normalize(manufacturer),
        normalize(mpn),
        normalize(pn),
    );
    bom.iter()
        .find(|entry| {
            (
                entry.item.clone(),
                entry.unit.clone(),
                entry.manufacturer.clone(),
                entry.mpn.clone(),
                entry.pn.clone(),
            ) == target
        })
        .map(|entry| entry.id)
}

/// Renders the BOM as printable rows with a header. The `pn`, `manufacturer`
/// and `mpn` columns only appear when some entry populates them.
pub(crate) fn bom_table(bom: &[BomEntry]) -> Vec<Vec<String>> {
    let has_pn = bom.iter().any(|entry| entry.pn.is_some());
    let has_manufacturer = bom.iter().any(|entry| entry.manufacturer.is_some());
    let has_mpn = bom.iter().any(|entry| entry.mpn.is_some());

    let mut header: Vec<String> = ["Id", "Item", "Qty", "Unit", "Designators"]
        .into_iter()
        .map(String::from)
        .collect();
    if has_pn {
        header.push("P/N".to_string());
    }
    if has_manufacturer {
        header.push("Manufacturer".to_string());
    }
    if has_mpn {
        header.push("MPN".to_string());
    }

    let mut table = Vec::with_capacity(bom.len() + 1);
    table.push(header);
    for entry in bom {
        let mut row = vec![
            entry.id.to_string(),
            entry.item.clone(),
            entry.qty.to_string(),
            entry.unit.clone().unwrap_or_default(),
            entry
                .designators
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        ];
        if has_pn {
            row.push(entry.pn.clone().unwrap_or_default());
        }
        if has_manufacturer {
            row.push(entry.manufacturer.clone().unwrap_or_default());
        }
        if has_mpn {
            row.push(entry.mpn.clone().unwrap_or_default());
        }
        table.push(row);
    }
    table
}
