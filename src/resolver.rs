// src/resolver.rs

use crate::document::{ConnectionEntry, HarnessDocument};
use crate::error::{Error, Result};
use crate::harness::Harness;
use crate::harness_models::{Cable, Connector, PinId};
use crate::range::{self, RangeSpec};
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::HashMap;

/// One resolved designator/pin pair at a chain position.
#[derive(Debug, Clone, PartialEq)]
pub struct PinRef {
    pub designator: String,
    pub pin: PinId,
}

/// Session-scoped resolution state: the template registries, the
/// designator → template bindings and the per-template auto-numbering
/// counters. One resolver handles one document; nothing survives it.
pub struct Resolver {
    template_connectors: IndexMap<String, Connector>,
    template_cables: IndexMap<String, Cable>,
    bindings: IndexMap<String, String>,
    auto_counters: HashMap<String, u32>,
}

impl Resolver {
    /// Resolves every connection set of the document into a populated
    /// harness aggregate.
    pub fn resolve(document: HarnessDocument) -> Result<Harness> {
        let mut session = Resolver {
            template_connectors: document.connectors,
            template_cables: document.cables,
            bindings: IndexMap::new(),
            auto_counters: HashMap::new(),
        };
        debug!(
            "connector templates: {:?}",
            session.template_connectors.keys().collect::<Vec<_>>()
        );
        debug!(
            "cable templates: {:?}",
            session.template_cables.keys().collect::<Vec<_>>()
        );

        let mut harness = Harness::new();
        for (set_index, set) in document.connections.into_iter().enumerate() {
            session
                .resolve_set(&mut harness, &set)
                .inspect_err(|error| debug!("connection set {set_index} rejected: {error}"))?;
        }
        for line in document.additional_bom_items {
            harness.add_bom_item(line);
        }
        Ok(harness)
    }

    fn resolve_set(&mut self, harness: &mut Harness, set: &[ConnectionEntry]) -> Result<()> {
        // figure out the number of parallel connections within this set;
        // bare designator strings reveal nothing
        let mut expansions: Vec<Option<Vec<i64>>> = Vec::with_capacity(set.len());
        let mut counts: Vec<usize> = Vec::new();
        for entry in set {
            match entry {
                ConnectionEntry::Designator(_) => expansions.push(None),
                ConnectionEntry::Designators(list) => {
                    counts.push(list.len());
                    expansions.push(None);
                }
                ConnectionEntry::Pins(map) => {
                    let (_, spec) = single_entry(map)?;
                    let pins = range::expand(spec)?;
                    counts.push(pins.len());
                    expansions.push(Some(pins));
                }
            }
        }
        let Some(&count) = counts.first() else {
            return Err(Error::AmbiguousConnectionCount);
        };
        if counts.iter().any(|&c| c != count) {
            return Err(Error::InconsistentConnectionCount(counts));
        }
        debug!("connection set carries {count} parallel connections");

        // resolve designators and expand every entry to per-pin records
        let mut positions: Vec<Vec<PinRef>> = Vec::with_capacity(set.len());
        for (entry, expansion) in set.iter().zip(expansions) {
            let records = match entry {
                ConnectionEntry::Pins(map) => {
                    let (token, spec) = single_entry(map)?;
                    let pins = match expansion {
                        Some(pins) => pins,
                        None => range::expand(spec)?,
                    };
                    let designator = self.bind(token)?;
                    pins.into_iter()
                        .map(|pin| PinRef {
                            designator: designator.clone(),
                            pin: PinId::Number(pin),
                        })
                        .collect()
                }
                ConnectionEntry::Designators(list) => self.spread(list)?,
                ConnectionEntry::Designator(token) => {
                    let repeated = vec![token.clone(); count];
                    self.spread(&repeated)?
                }
            };
            positions.push(records);
        }

        // instantiate whatever the records reference
        for records in &positions {
            for record in records {
                self.materialize(harness, &record.designator)?;
            }
        }

        // transpose into independent chains and link each one
        for chain_index in 0..count {
            let chain: Vec<&PinRef> = positions.iter().map(|records| &records[chain_index]).collect();
            for (position, item) in chain.iter().enumerate() {
                if harness.has_cable(&item.designator) {
                    let previous = position.checked_sub(1).map(|p| chain[p]);
                    let next = chain.get(position + 1).copied();
                    debug!(
                        "connect {:?} via {}:{} {:?}",
                        previous, item.designator, item.pin, next
                    );
                    harness.connect(
                        previous.map(|p| p.designator.as_str()),
                        previous.map(|p| p.pin.clone()),
                        &item.designator,
                        item.pin.clone(),
                        next.map(|p| p.designator.as_str()),
                        next.map(|p| p.pin.clone()),
                    )?;
                } else if !harness.has_connector(&item.designator) {
                    return Err(Error::UnknownDesignator(item.designator.clone()));
                }
            }
        }
        Ok(())
    }

    /// Resolves a run of designator tokens into per-pin records. The n-th
    /// occurrence of a designator within one entry takes its pin n, so a bare
    /// designator repeated across parallel connections walks through its
    /// pins, while distinct designators each contribute their pin 1.
    fn spread(&mut self, tokens: &[String]) -> Result<Vec<PinRef>> {
        let mut occurrences: HashMap<String, i64> = HashMap::new();
        let mut records = Vec::with_capacity(tokens.len());
        for token in tokens {
            let designator = self.bind(token)?;
            let pin = occurrences.entry(designator.clone()).or_insert(0);
            *pin += 1;
            records.push(PinRef {
                pin: PinId::Number(*pin),
                designator,
            });
        }
        Ok(records)
    }

    /// Binds a token to its designator, generating auto-numbered designators
    /// for trailing-dot tokens. A dot-less token referencing an existing
    /// designator is an idempotent reference; re-binding a designator to a
    /// different template through a dotted token is fatal.
    fn bind(&mut self, token: &str) -> Result<String> {
        let (template, designator) = match token.split_once('.') {
            Some((template, "")) => {
                let counter = self.auto_counters.entry(template.to_string()).or_insert(0);
                *counter += 1;
                (template.to_string(), format!("_{template}_{counter}"))
            }
            Some((template, designator)) => (template.to_string(), designator.to_string()),
            None => {
                if self.bindings.contains_key(token) {
                    return Ok(token.to_string());
                }
                (token.to_string(), token.to_string())
            }
        };
        match self.bindings.get(&designator) {
            Some(bound) if *bound != template => Err(Error::DesignatorConflict {
                designator,
                bound: bound.clone(),
                requested: template,
            }),
            Some(_) => Ok(designator),
            None => {
                debug!("designator {designator} bound to template {template}");
                self.bindings.insert(designator.clone(), template);
                Ok(designator)
            }
        }
    }

    /// Instantiates the designator from its template unless it already
    /// exists. An unresolvable template is only logged here; the chain
    /// linker rejects the designator when a link touches it.
    fn materialize(&self, harness: &mut Harness, designator: &str) -> Result<()> {
        let Some(template) = self.bindings.get(designator) else {
            return Err(Error::UnknownDesignator(designator.to_string()));
        };
        if harness.has_connector(designator) {
            return Ok(());
        }
        if let Some(template_connector) = self.template_connectors.get(template) {
            debug!("{designator} is a new connector instance of template {template}");
            harness.add_connector(template_connector.clone().materialize(designator)?);
            return Ok(());
        }
        if harness.has_cable(designator) {
            return Ok(());
        }
        if let Some(template_cable) = self.template_cables.get(template) {
            debug!("{designator} is a new cable instance of template {template}");
            harness.add_cable(template_cable.clone().materialize(designator)?);
            return Ok(());
        }
        warn!("template {template} not found, neither in connectors nor in cables");
        Ok(())
    }
}

fn single_entry(map: &IndexMap<String, RangeSpec>) -> Result<(&String, &RangeSpec)> {
    match map.first() {
        Some(entry) if map.len() == 1 => Ok(entry),
        _ => Err(Error::ParseError(format!(
            "connection set entries take exactly one designator, found {}",
            map.len()
        ))),
    }
}
