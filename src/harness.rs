// src/harness.rs

use crate::bom::{self, BomEntry};
use crate::colors::{self, ColorMode};
use crate::document::BomLine;
use crate::error::{Error, Result};
use crate::graph_models::{
    CableNode, Compass, ConnectorNode, Direction, Edge, EdgeStyle, EndPoint, GraphSpec, Node,
    PinRow, WireRow,
};
use crate::harness_models::{
    arrow_direction, parse_shape, AdditionalComponent, Cable, CableCategory, Connector,
    ConnectorStyle, Mate, MateComponent, MatePin, PinId, WirePort,
};
use crate::helper::{awg_equiv, component_table_entry, manufacturer_info_field, mm2_equiv};
use indexmap::IndexMap;
use rust_decimal::Decimal;

const BLACK: &str = "#000000";
const WHITE: &str = "#ffffff";

/// Owns every connector, cable and mate of one harness document, plus the
/// resolved wire connections and freestanding BOM lines.
#[derive(Debug)]
pub struct Harness {
    pub connectors: IndexMap<String, Connector>,
    pub cables: IndexMap<String, Cable>,
    pub mates: Vec<Mate>,
    pub additional_bom_items: Vec<BomLine>,
    /// Replace inline additional-component descriptions with `#<id>`
    /// back-references into the BOM.
    pub mini_bom_mode: bool,
    pub color_mode: ColorMode,
    bom: Option<Vec<BomEntry>>,
}

impl Default for Harness {
    fn default() -> Self {
        Harness::new()
    }
}

/// A mate with validated endpoints, ready to become an edge.
struct MateLink {
    from_name: String,
    from_pin: Option<PinId>,
    to_name: String,
    to_pin: Option<PinId>,
    direction: Direction,
}

impl Harness {
    pub fn new() -> Harness {
        Harness {
            connectors: IndexMap::new(),
            cables: IndexMap::new(),
            mates: Vec::new(),
            additional_bom_items: Vec::new(),
            mini_bom_mode: true,
            color_mode: ColorMode::Short,
            bom: None,
        }
    }

    pub fn add_connector(&mut self, connector: Connector) {
        self.connectors.insert(connector.name.clone(), connector);
    }

    pub fn add_cable(&mut self, cable: Cable) {
        self.cables.insert(cable.name.clone(), cable);
    }

    pub fn add_mate_pin(
        &mut self,
        from_name: &str,
        from_pin: PinId,
        to_name: &str,
        to_pin: PinId,
        shape: &str,
    ) -> Result<()> {
        self.mates.push(Mate::Pin(MatePin {
            from_name: from_name.to_string(),
            from_pin,
            to_name: to_name.to_string(),
            to_pin,
            shape: parse_shape(shape)?,
        }));
        Ok(())
    }

    pub fn add_mate_component(&mut self, from_name: &str, to_name: &str, shape: &str) -> Result<()> {
        self.mates.push(Mate::Component(MateComponent {
            from_name: from_name.to_string(),
            to_name: to_name.to_string(),
            shape: parse_shape(shape)?,
        }));
        Ok(())
    }

    pub fn add_bom_item(&mut self, line: BomLine) {
        self.additional_bom_items.push(line);
    }

    pub fn has_connector(&self, name: &str) -> bool {
        self.connectors.contains_key(name)
    }

    pub fn has_cable(&self, name: &str) -> bool {
        self.cables.contains_key(name)
    }

    fn connector(&self, name: &str) -> Result<&Connector> {
        self.connectors
            .get(name)
            .ok_or_else(|| Error::UnknownDesignator(name.to_string()))
    }

    /// Validates and records one wire link. Connector-side pin references may
    /// use pin labels; they are substituted by the matching pin identifier.
    /// The pin name `s` on the cable side selects the shield.
    pub fn connect(
        &mut self,
        from_name: Option<&str>,
        from_pin: Option<PinId>,
        via_name: &str,
        via_pin: PinId,
        to_name: Option<&str>,
        to_pin: Option<PinId>,
    ) -> Result<()> {
        let from_pin = self.resolve_connector_pin(from_name, from_pin)?;
        let to_pin = self.resolve_connector_pin(to_name, to_pin)?;
        let via = match via_pin {
            PinId::Name(ref name) if name == "s" => WirePort::Shield,
            PinId::Number(number) if number >= 1 => WirePort::Wire(number as usize),
            other => {
                return Err(Error::UnknownPin {
                    name: via_name.to_string(),
                    pin: other.to_string(),
                });
            }
        };
        let Some(cable) = self.cables.get_mut(via_name) else {
            return Err(Error::UnknownDesignator(via_name.to_string()));
        };
        cable.connect(from_name, from_pin.clone(), via, to_name, to_pin.clone())?;
        if let (Some(name), Some(pin)) = (from_name, &from_pin) {
            if let Some(connector) = self.connectors.get_mut(name) {
                connector.activate_pin(pin);
            }
        }
        if let (Some(name), Some(pin)) = (to_name, &to_pin) {
            if let Some(connector) = self.connectors.get_mut(name) {
                connector.activate_pin(pin);
            }
        }
        Ok(())
    }

    fn resolve_connector_pin(
        &self,
        name: Option<&str>,
        pin: Option<PinId>,
    ) -> Result<Option<PinId>> {
        let (Some(name), Some(pin)) = (name, pin) else {
            return Ok(None);
        };
        let connector = self.connector(name)?;
        Ok(Some(resolve_pin(connector, pin)?))
    }

    /// Builds the deduplicated BOM once and caches it; repeated calls return
    /// the cached table.
    pub fn bom(&mut self) -> Result<&[BomEntry]> {
        if self.bom.is_none() {
            self.bom = Some(bom::generate_bom(self)?);
        }
        Ok(self.bom.as_deref().unwrap_or_default())
    }

    /// The BOM as printable rows, headers first. Optional columns appear only
    /// when some entry populates them.
    pub fn bom_table(&mut self) -> Result<Vec<Vec<String>>> {
        let entries = self.bom()?;
        Ok(bom::bom_table(entries))
    }

    fn bom_id(
        &self,
        item: &str,
        unit: Option<&str>,
        manufacturer: Option<&str>,
        mpn: Option<&str>,
        pn: Option<&str>,
    ) -> Option<usize> {
        bom::find_bom_id(self.bom.as_deref()?, item, unit, manufacturer, mpn, pn)
    }

    /// Computes which connector sides carry active ports and produces the
    /// abstract diagram description for the layout renderer.
    pub fn create_graph(&mut self) -> Result<GraphSpec> {
        // connector sides follow the cables and mates that attach to them
        let mut right_side = Vec::new();
        let mut left_side = Vec::new();
        for cable in self.cables.values() {
            for connection in &cable.connections {
                if let Some(name) = &connection.from_name {
                    right_side.push(name.clone());
                }
                if let Some(name) = &connection.to_name {
                    left_side.push(name.clone());
                }
            }
        }
        for name in right_side {
            if let Some(connector) = self.connectors.get_mut(&name) {
                connector.ports_right = true;
            }
        }
        for name in left_side {
            if let Some(connector) = self.connectors.get_mut(&name) {
                connector.ports_left = true;
            }
        }

        let mate_links = self.resolve_mates()?;
        for link in &mate_links {
            if let Some(pin) = &link.from_pin {
                if let Some(connector) = self.connectors.get_mut(&link.from_name) {
                    connector.ports_right = true;
                    connector.activate_pin(pin);
                }
            }
            if let Some(pin) = &link.to_pin {
                if let Some(connector) = self.connectors.get_mut(&link.to_name) {
                    connector.ports_left = true;
                    connector.activate_pin(pin);
                }
            }
        }

        // the BOM backs the #id references on the labels
        if self.mini_bom_mode {
            self.bom()?;
        }

        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        for connector in self.connectors.values() {
            nodes.push(Node::Connector(self.connector_node(connector)?));
            self.loop_edges(connector, &mut edges)?;
        }

        // pad single-color wires when any wire in the harness is multi-color,
        // so all wires render at equal thickness
        let pad = self
            .cables
            .values()
            .any(|cable| cable.colors.iter().any(|color| color.len() > 2));

        for cable in self.cables.values() {
            let (node, mut cable_edges) = self.cable_node(cable, pad)?;
            nodes.push(Node::Cable(node));
            edges.append(&mut cable_edges);
        }

        for link in &mate_links {
            edges.push(self.mate_edge(link)?);
        }

        Ok(GraphSpec { nodes, edges })
    }

    /// Validates mate endpoints: both ends must be existing connectors, and
    /// pin mates additionally resolve their pins.
    fn resolve_mates(&self) -> Result<Vec<MateLink>> {
        let mut links = Vec::with_capacity(self.mates.len());
        for mate in &self.mates {
            match mate {
                Mate::Pin(pin_mate) => {
                    let from = self.connector(&pin_mate.from_name)?;
                    let from_pin = resolve_pin(from, pin_mate.from_pin.clone())?;
                    let to = self.connector(&pin_mate.to_name)?;
                    let to_pin = resolve_pin(to, pin_mate.to_pin.clone())?;
                    links.push(MateLink {
                        from_name: pin_mate.from_name.clone(),
                        from_pin: Some(from_pin),
                        to_name: pin_mate.to_name.clone(),
                        to_pin: Some(to_pin),
                        direction: arrow_direction(&pin_mate.shape),
                    });
                }
                Mate::Component(component_mate) => {
                    self.connector(&component_mate.from_name)?;
                    self.connector(&component_mate.to_name)?;
                    links.push(MateLink {
                        from_name: component_mate.from_name.clone(),
                        from_pin: None,
                        to_name: component_mate.to_name.clone(),
                        to_pin: None,
                        direction: arrow_direction(&component_mate.shape),
                    });
                }
            }
        }
        Ok(links)
    }

    fn connector_node(&self, connector: &Connector) -> Result<ConnectorNode> {
        let mut label_rows = Vec::new();
        push_row(
            &mut label_rows,
            vec![connector.show_name.then(|| connector.name.clone())],
        );
        push_row(
            &mut label_rows,
            vec![
                connector.pn.as_ref().map(|pn| format!("P/N: {pn}")),
                manufacturer_info_field(
                    connector.manufacturer.as_deref(),
                    connector.mpn.as_deref(),
                ),
            ],
        );
        push_row(
            &mut label_rows,
            vec![
                connector.connector_type.clone(),
                connector.subtype.clone(),
                connector
                    .show_pincount
                    .then(|| format!("{}-pin", connector.pincount())),
                connector
                    .color
                    .as_deref()
                    .map(|color| colors::translate_color(color, self.color_mode))
                    .transpose()?,
            ],
        );
        for row in self.additional_component_rows(
            &connector.additional_components,
            |part| connector.qty_multiplier(part.qty_multiplier.as_ref()),
        )? {
            label_rows.push(row);
        }
        push_row(&mut label_rows, vec![connector.notes.clone()]);

        let mut pin_rows = Vec::new();
        if connector.style != ConnectorStyle::Simple {
            for (pin, pinlabel) in connector.pins.iter().zip(&connector.pinlabels) {
                if connector.hide_disconnected_pins
                    && !connector.visible_pins.get(pin).copied().unwrap_or(false)
                {
                    continue;
                }
                pin_rows.push(PinRow {
                    left_port: connector.ports_left.then(|| format!("p{pin}l")),
                    pin: pin.to_string(),
                    label: (!pinlabel.is_empty()).then(|| pinlabel.clone()),
                    right_port: connector.ports_right.then(|| format!("p{pin}r")),
                });
            }
        }

        let color_bands = connector
            .color
            .as_deref()
            .map(|color| colors::get_color_hex(color, false))
            .transpose()?;

        Ok(ConnectorNode {
            id: connector.name.clone(),
            label_rows,
            color_bands,
            pin_rows,
        })
    }

    /// Internal jumpers run along the connector's active side.
    fn loop_edges(&self, connector: &Connector, edges: &mut Vec<Edge>) -> Result<()> {
        if connector.loops.is_empty() {
            return Ok(());
        }
        let (side, compass) = if connector.ports_left {
            ('l', Compass::West)
        } else if connector.ports_right {
            ('r', Compass::East)
        } else {
            return Err(Error::MissingData(format!(
                "no side for loops on connector {}",
                connector.name
            )));
        };
        for (first, second) in &connector.loops {
            edges.push(Edge {
                from: EndPoint {
                    node: connector.name.clone(),
                    port: Some(format!("p{first}{side}")),
                    compass: Some(compass),
                },
                to: EndPoint {
                    node: connector.name.clone(),
                    port: Some(format!("p{second}{side}")),
                    compass: Some(compass),
                },
                colors: vec![BLACK.to_string(), WHITE.to_string(), BLACK.to_string()],
                style: EdgeStyle::Bold,
                direction: Direction::None,
            });
        }
        Ok(())
    }

    fn cable_node(&self, cable: &Cable, pad: bool) -> Result<(CableNode, Vec<Edge>)> {
        let mut label_rows = Vec::new();
        push_row(
            &mut label_rows,
            vec![cable.show_name.then(|| cable.name.clone())],
        );
        push_row(
            &mut label_rows,
            vec![
                cable
                    .pn
                    .as_ref()
                    .and_then(|pn| pn.scalar())
                    .map(|pn| format!("P/N: {pn}")),
                manufacturer_info_field(
                    cable.manufacturer.as_ref().and_then(|m| m.scalar()),
                    cable.mpn.as_ref().and_then(|m| m.scalar()),
                ),
            ],
        );
        push_row(
            &mut label_rows,
            vec![
                cable.cable_type.clone(),
                cable
                    .show_wirecount
                    .then(|| format!("{}x", cable.wirecount())),
                self.gauge_cell(cable),
                cable.shield_active().then(|| "+ S".to_string()),
                (cable.length > Decimal::ZERO).then(|| format!("{} m", cable.length)),
                cable
                    .color
                    .as_deref()
                    .map(|color| colors::translate_color(color, self.color_mode))
                    .transpose()?,
            ],
        );
        for row in self.additional_component_rows(
            &cable.additional_components,
            |part| cable.qty_multiplier(part.qty_multiplier.as_ref()),
        )? {
            label_rows.push(row);
        }
        push_row(&mut label_rows, vec![cable.notes.clone()]);

        let mut wire_rows = Vec::new();
        for (offset, color) in cable.colors.iter().enumerate() {
            let index = offset + 1;
            let mut bands = vec![BLACK.to_string()];
            bands.extend(colors::get_color_hex(color, pad)?);
            bands.push(BLACK.to_string());
            let mut identification = Vec::new();
            if cable.category == CableCategory::Bundle {
                if let Some(pn) = cable.pn.as_ref().and_then(|pn| pn.per_item(offset)) {
                    identification.push(format!("P/N: {pn}"));
                }
                if let Some(info) = manufacturer_info_field(
                    cable.manufacturer.as_ref().and_then(|m| m.per_item(offset)),
                    cable.mpn.as_ref().and_then(|m| m.per_item(offset)),
                ) {
                    identification.push(info);
                }
            }
            wire_rows.push(WireRow {
                port: format!("w{index}"),
                index: Some(index),
                name: colors::translate_color(color, self.color_mode)?,
                bands,
                in_label: None,
                out_label: None,
                identification,
            });
        }
        let shield_hex = match &cable.shield {
            Some(shield) if shield.is_present() => match shield.color() {
                Some(color) => Some(Some(colors::get_color_hex(color, false)?[0].clone())),
                None => Some(None),
            },
            _ => None,
        };
        if let Some(shield_color) = &shield_hex {
            // a colored shield renders as a band with black borders, a plain
            // one as a thin black wire
            let bands = match shield_color {
                Some(hex) => vec![BLACK.to_string(), hex.clone(), BLACK.to_string()],
                None => vec![BLACK.to_string()],
            };
            wire_rows.push(WireRow {
                port: "ws".to_string(),
                index: None,
                name: "Shield".to_string(),
                bands,
                in_label: None,
                out_label: None,
                identification: Vec::new(),
            });
        }

        let mut edges = Vec::new();
        for connection in &cable.connections {
            let (port, colors_list) = match connection.via {
                WirePort::Wire(index) => {
                    let mut list = vec![BLACK.to_string()];
                    list.extend(colors::get_color_hex(&cable.colors[index - 1], pad)?);
                    list.push(BLACK.to_string());
                    (format!("w{index}"), list)
                }
                WirePort::Shield => {
                    let list = match shield_hex.as_ref().and_then(|color| color.as_ref()) {
                        Some(hex) => vec![BLACK.to_string(), hex.clone(), BLACK.to_string()],
                        None => vec![BLACK.to_string()],
                    };
                    ("ws".to_string(), list)
                }
            };
            if let (Some(from_name), Some(from_pin)) = (&connection.from_name, &connection.from_pin)
            {
                let from_connector = self.connector(from_name)?;
                edges.push(Edge {
                    from: EndPoint {
                        node: from_name.clone(),
                        port: (from_connector.style != ConnectorStyle::Simple)
                            .then(|| format!("p{from_pin}r")),
                        compass: Some(Compass::East),
                    },
                    to: EndPoint {
                        node: cable.name.clone(),
                        port: Some(port.clone()),
                        compass: Some(Compass::West),
                    },
                    colors: colors_list.clone(),
                    style: EdgeStyle::Bold,
                    direction: Direction::None,
                });
                if from_connector.show_name {
                    if let Some(row) = wire_rows.iter_mut().find(|row| row.port == port) {
                        row.in_label = Some(format!("{from_name}:{from_pin}"));
                    }
                }
            }
            if let (Some(to_name), Some(to_pin)) = (&connection.to_name, &connection.to_pin) {
                let to_connector = self.connector(to_name)?;
                edges.push(Edge {
                    from: EndPoint {
                        node: cable.name.clone(),
                        port: Some(port.clone()),
                        compass: Some(Compass::East),
                    },
                    to: EndPoint {
                        node: to_name.clone(),
                        port: (to_connector.style != ConnectorStyle::Simple)
                            .then(|| format!("p{to_pin}l")),
                        compass: Some(Compass::West),
                    },
                    colors: colors_list,
                    style: EdgeStyle::Bold,
                    direction: Direction::None,
                });
                if to_connector.show_name {
                    if let Some(row) = wire_rows.iter_mut().find(|row| row.port == port) {
                        row.out_label = Some(format!("{to_name}:{to_pin}"));
                    }
                }
            }
        }

        let color_bands = cable
            .color
            .as_deref()
            .map(|color| colors::get_color_hex(color, false))
            .transpose()?;

        Ok((
            CableNode {
                id: cable.name.clone(),
                label_rows,
                color_bands,
                wire_rows,
                bundle: cable.category == CableCategory::Bundle,
            },
            edges,
        ))
    }

    fn gauge_cell(&self, cable: &Cable) -> Option<String> {
        let gauge = cable.gauge?;
        let unit = cable.gauge_unit.as_deref().unwrap_or("mm²");
        let mut text = format!("{gauge} {unit}");
        if cable.show_equiv {
            let lookup = gauge.normalize().to_string();
            if unit == "mm²" {
                if let Some(awg) = awg_equiv(&lookup) {
                    text.push_str(&format!(" ({awg} AWG)"));
                }
            } else if unit.eq_ignore_ascii_case("awg") {
                if let Some(mm2) = mm2_equiv(&lookup) {
                    text.push_str(&format!(" ({mm2} mm²)"));
                }
            }
        }
        Some(text)
    }

    fn mate_edge(&self, link: &MateLink) -> Result<Edge> {
        let from_port = match &link.from_pin {
            Some(pin) if self.connector(&link.from_name)?.style != ConnectorStyle::Simple => {
                Some(format!("p{pin}r"))
            }
            _ => None,
        };
        let to_port = match &link.to_pin {
            Some(pin) if self.connector(&link.to_name)?.style != ConnectorStyle::Simple => {
                Some(format!("p{pin}l"))
            }
            _ => None,
        };
        Ok(Edge {
            from: EndPoint {
                node: link.from_name.clone(),
                port: from_port,
                compass: Some(Compass::East),
            },
            to: EndPoint {
                node: link.to_name.clone(),
                port: to_port,
                compass: Some(Compass::West),
            },
            colors: vec![BLACK.to_string()],
            style: EdgeStyle::Dashed,
            direction: link.direction,
        })
    }

    fn additional_component_rows(
        &self,
        components: &[AdditionalComponent],
        multiplier: impl Fn(&AdditionalComponent) -> Result<Decimal>,
    ) -> Result<Vec<Vec<String>>> {
        if components.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows = vec![vec!["Additional components".to_string()]];
        for part in components {
            let qty = part.qty * multiplier(part)?;
            let description = part.description();
            let entry = if self.mini_bom_mode {
                match self.bom_id(
                    &description,
                    part.unit.as_deref(),
                    part.manufacturer.as_deref(),
                    part.mpn.as_deref(),
                    part.pn.as_deref(),
                ) {
                    Some(id) => component_table_entry(
                        &format!("#{id} ({})", part.component_type.trim_end()),
                        qty,
                        part.unit.as_deref(),
                        None,
                        None,
                        None,
                    ),
                    None => component_table_entry(
                        &description,
                        qty,
                        part.unit.as_deref(),
                        part.pn.as_deref(),
                        part.manufacturer.as_deref(),
                        part.mpn.as_deref(),
                    ),
                }
            } else {
                component_table_entry(
                    &description,
                    qty,
                    part.unit.as_deref(),
                    part.pn.as_deref(),
                    part.manufacturer.as_deref(),
                    part.mpn.as_deref(),
                )
            };
            rows.push(vec![entry]);
        }
        Ok(rows)
    }
}

/// Substitutes pin labels by pin identifiers and rejects ambiguous or
/// unknown references.
fn resolve_pin(connector: &Connector, pin: PinId) -> Result<PinId> {
    let pin_index = connector.pins.iter().position(|candidate| *candidate == pin);
    let label_indexes: Vec<usize> = match &pin {
        PinId::Name(label) => connector
            .pinlabels
            .iter()
            .enumerate()
            .filter(|(_, candidate)| *candidate == label)
            .map(|(index, _)| index)
            .collect(),
        PinId::Number(_) => Vec::new(),
    };
    if !label_indexes.is_empty() {
        if let Some(index) = pin_index {
            if index != label_indexes[0] {
                return Err(Error::AmbiguousPinReference {
                    name: connector.name.clone(),
                    pin: pin.to_string(),
                });
            }
        }
        if label_indexes.len() > 1 {
            return Err(Error::DuplicatePinLabel {
                name: connector.name.clone(),
                pin: pin.to_string(),
            });
        }
        return Ok(connector.pins[label_indexes[0]].clone());
    }
    if pin_index.is_none() {
        return Err(Error::UnknownPin {
            name: connector.name.clone(),
            pin: pin.to_string(),
        });
    }
    Ok(pin)
}

/// Appends a label row, dropping empty cells; all-empty rows are skipped.
fn push_row(rows: &mut Vec<Vec<String>>, cells: Vec<Option<String>>) {
    let cells: Vec<String> = cells.into_iter().flatten().collect();
    if !cells.is_empty() {
        rows.push(cells);
    }
}
