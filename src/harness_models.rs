use crate::error::{Error, Result};
use crate::graph_models::Direction;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;

pub(crate) fn default_true() -> bool {
    true
}

fn default_qty() -> Decimal {
    Decimal::ONE
}

/// A pin identity: a number or a name. Equality is typed, so pin `1` and a
/// label `"1"` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum PinId {
    Number(i64),
    Name(String),
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinId::Number(number) => write!(f, "{number}"),
            PinId::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for PinId {
    fn from(number: i64) -> Self {
        PinId::Number(number)
    }
}

impl From<&str> for PinId {
    fn from(name: &str) -> Self {
        PinId::Name(name.to_string())
    }
}

/// A scalar attribute, or one value per wire for bundles.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// The scalar form, if this is not a per-item list.
    pub fn scalar(&self) -> Option<&str> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(_) => None,
        }
    }

    /// The list item at `index`, if this is a per-item list.
    pub fn per_item(&self, index: usize) -> Option<&str> {
        match self {
            OneOrMany::One(_) => None,
            OneOrMany::Many(values) => values.get(index).map(String::as_str),
        }
    }

    /// List indexing with scalars applying to every index.
    pub fn item_or_scalar(&self, index: usize) -> Option<&str> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.get(index).map(String::as_str),
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

/// Scaling policy for additional-component quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QtyMultiplier {
    Pincount,
    Populated,
    Wirecount,
    Length,
    TotalLength,
}

impl fmt::Display for QtyMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QtyMultiplier::Pincount => "pincount",
            QtyMultiplier::Populated => "populated",
            QtyMultiplier::Wirecount => "wirecount",
            QtyMultiplier::Length => "length",
            QtyMultiplier::TotalLength => "total_length",
        };
        write!(f, "{name}")
    }
}

/// An extra part carried by a connector or cable (crimps, boots, sleeving).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdditionalComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub subtype: Option<String>,
    #[serde(default = "default_qty")]
    pub qty: Decimal,
    pub qty_multiplier: Option<QtyMultiplier>,
    pub unit: Option<String>,
    pub manufacturer: Option<String>,
    pub mpn: Option<String>,
    pub pn: Option<String>,
}

impl AdditionalComponent {
    pub fn description(&self) -> String {
        match &self.subtype {
            Some(subtype) => format!("{}, {}", self.component_type, subtype),
            None => self.component_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    #[default]
    Normal,
    Simple,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Connector {
    #[serde(skip)]
    pub name: String,
    pub manufacturer: Option<String>,
    pub mpn: Option<String>,
    pub pn: Option<String>,
    #[serde(default)]
    pub style: ConnectorStyle,
    #[serde(rename = "type")]
    pub connector_type: Option<String>,
    pub subtype: Option<String>,
    pub pincount: Option<usize>,
    #[serde(default)]
    pub pins: Vec<PinId>,
    #[serde(default)]
    pub pinlabels: Vec<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub ignore_in_bom: bool,
    #[serde(default = "default_true")]
    pub show_name: bool,
    #[serde(default = "default_true")]
    pub show_pincount: bool,
    #[serde(default)]
    pub hide_disconnected_pins: bool,
    #[serde(default)]
    pub visible_pins: IndexMap<PinId, bool>,
    #[serde(default)]
    pub loops: Vec<(PinId, PinId)>,
    #[serde(default)]
    pub additional_components: Vec<AdditionalComponent>,
    // derived while building the graph description
    #[serde(skip)]
    pub ports_left: bool,
    #[serde(skip)]
    pub ports_right: bool,
}

impl Default for Connector {
    fn default() -> Self {
        Connector {
            name: String::new(),
            manufacturer: None,
            mpn: None,
            pn: None,
            style: ConnectorStyle::Normal,
            connector_type: None,
            subtype: None,
            pincount: None,
            pins: Vec::new(),
            pinlabels: Vec::new(),
            color: None,
            notes: None,
            ignore_in_bom: false,
            show_name: true,
            show_pincount: true,
            hide_disconnected_pins: false,
            visible_pins: IndexMap::new(),
            loops: Vec::new(),
            additional_components: Vec::new(),
            ports_left: false,
            ports_right: false,
        }
    }
}

impl Connector {
    /// Completes a template into a named instance: derives the pin count,
    /// fills in default pins and pads the pin labels.
    pub fn materialize(mut self, name: &str) -> Result<Connector> {
        self.name = name.to_string();
        let pincount = match self.pincount {
            Some(count) => count,
            None if !self.pins.is_empty() => self.pins.len(),
            None if !self.pinlabels.is_empty() => self.pinlabels.len(),
            None => {
                return Err(Error::MissingData(format!(
                    "connector {name} needs pincount, pins or pinlabels"
                )));
            }
        };
        if self.pins.is_empty() {
            self.pins = (1..=pincount as i64).map(PinId::Number).collect();
        }
        if self.pins.len() != pincount {
            return Err(Error::ParseError(format!(
                "connector {name} declares {} pins but pincount {pincount}",
                self.pins.len()
            )));
        }
        if self.pinlabels.len() > pincount {
            return Err(Error::ParseError(format!(
                "connector {name} declares {} pinlabels but pincount {pincount}",
                self.pinlabels.len()
            )));
        }
        while self.pinlabels.len() < pincount {
            self.pinlabels.push(String::new());
        }
        self.pincount = Some(pincount);
        Ok(self)
    }

    pub fn pincount(&self) -> usize {
        self.pincount.unwrap_or(self.pins.len())
    }

    /// Marks a pin as connected so it renders even with
    /// `hide_disconnected_pins`.
    pub fn activate_pin(&mut self, pin: &PinId) {
        self.visible_pins.insert(pin.clone(), true);
    }

    pub fn qty_multiplier(&self, multiplier: Option<&QtyMultiplier>) -> Result<Decimal> {
        match multiplier {
            None => Ok(Decimal::ONE),
            Some(QtyMultiplier::Pincount) => Ok(Decimal::from(self.pincount())),
            Some(QtyMultiplier::Populated) => Ok(Decimal::from(
                self.visible_pins.values().filter(|visible| **visible).count(),
            )),
            Some(other) => Err(Error::Unsupported(format!(
                "qty multiplier {other} on connector {}",
                self.name
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CableCategory {
    #[default]
    Cable,
    Bundle,
}

/// Braid/foil shield: plain or in a named color.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Shield {
    Named(String),
    Plain(bool),
}

impl Shield {
    pub fn is_present(&self) -> bool {
        match self {
            Shield::Named(_) => true,
            Shield::Plain(present) => *present,
        }
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            Shield::Named(color) => Some(color),
            Shield::Plain(_) => None,
        }
    }
}

/// The wire (or shield) of a cable that a connection runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WirePort {
    /// 1-based index into the cable's colors.
    Wire(usize),
    Shield,
}

impl fmt::Display for WirePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WirePort::Wire(index) => write!(f, "{index}"),
            WirePort::Shield => write!(f, "s"),
        }
    }
}

/// One resolved point-to-point link through a cable wire. `None` sides are
/// open ends.
#[derive(Debug, Clone, PartialEq)]
pub struct WireConnection {
    pub from_name: Option<String>,
    pub from_pin: Option<PinId>,
    pub via: WirePort,
    pub to_name: Option<String>,
    pub to_pin: Option<PinId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cable {
    #[serde(skip)]
    pub name: String,
    pub manufacturer: Option<OneOrMany>,
    pub mpn: Option<OneOrMany>,
    pub pn: Option<OneOrMany>,
    #[serde(default)]
    pub category: CableCategory,
    #[serde(rename = "type")]
    pub cable_type: Option<String>,
    pub gauge: Option<Decimal>,
    pub gauge_unit: Option<String>,
    #[serde(default)]
    pub show_equiv: bool,
    #[serde(default)]
    pub length: Decimal,
    pub color: Option<String>,
    pub wirecount: Option<usize>,
    pub shield: Option<Shield>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub ignore_in_bom: bool,
    #[serde(default = "default_true")]
    pub show_name: bool,
    #[serde(default = "default_true")]
    pub show_wirecount: bool,
    #[serde(default)]
    pub additional_components: Vec<AdditionalComponent>,
    #[serde(skip)]
    pub connections: Vec<WireConnection>,
}

impl Default for Cable {
    fn default() -> Self {
        Cable {
            name: String::new(),
            manufacturer: None,
            mpn: None,
            pn: None,
            category: CableCategory::Cable,
            cable_type: None,
            gauge: None,
            gauge_unit: None,
            show_equiv: false,
            length: Decimal::ZERO,
            color: None,
            wirecount: None,
            shield: None,
            colors: Vec::new(),
            notes: None,
            ignore_in_bom: false,
            show_name: true,
            show_wirecount: true,
            additional_components: Vec::new(),
            connections: Vec::new(),
        }
    }
}

impl Cable {
    /// Completes a template into a named instance: derives the wire count and
    /// tiles the color palette across all wires.
    pub fn materialize(mut self, name: &str) -> Result<Cable> {
        self.name = name.to_string();
        let wirecount = match self.wirecount {
            Some(count) if count > 0 => count,
            Some(_) => {
                return Err(Error::ParseError(format!(
                    "cable {name} needs a positive wirecount"
                )));
            }
            None if !self.colors.is_empty() => self.colors.len(),
            None => {
                return Err(Error::MissingData(format!(
                    "cable {name} needs wirecount or colors"
                )));
            }
        };
        if self.colors.is_empty() {
            self.colors = vec![String::new(); wirecount];
        } else if self.colors.len() != wirecount {
            self.colors = (0..wirecount)
                .map(|index| self.colors[index % self.colors.len()].clone())
                .collect();
        }
        if self.gauge.is_some() && self.gauge_unit.is_none() {
            self.gauge_unit = Some("mm²".to_string());
        }
        self.wirecount = Some(wirecount);
        Ok(self)
    }

    pub fn wirecount(&self) -> usize {
        self.wirecount.unwrap_or(self.colors.len())
    }

    pub fn shield_active(&self) -> bool {
        self.shield.as_ref().is_some_and(Shield::is_present)
    }

    /// Records one resolved link. The wire index must exist, and shield links
    /// require a shield.
    pub fn connect(
        &mut self,
        from_name: Option<&str>,
        from_pin: Option<PinId>,
        via: WirePort,
        to_name: Option<&str>,
        to_pin: Option<PinId>,
    ) -> Result<()> {
        match via {
            WirePort::Wire(index) if index < 1 || index > self.wirecount() => {
                return Err(Error::UnknownPin {
                    name: self.name.clone(),
                    pin: index.to_string(),
                });
            }
            WirePort::Shield if !self.shield_active() => {
                return Err(Error::UnknownPin {
                    name: self.name.clone(),
                    pin: "s".to_string(),
                });
            }
            _ => {}
        }
        self.connections.push(WireConnection {
            from_name: from_name.map(str::to_string),
            from_pin,
            via,
            to_name: to_name.map(str::to_string),
            to_pin,
        });
        Ok(())
    }

    pub fn qty_multiplier(&self, multiplier: Option<&QtyMultiplier>) -> Result<Decimal> {
        match multiplier {
            None => Ok(Decimal::ONE),
            Some(QtyMultiplier::Wirecount) => Ok(Decimal::from(self.wirecount())),
            Some(QtyMultiplier::Length) => Ok(self.length),
            Some(QtyMultiplier::TotalLength) => {
                Ok(self.length * Decimal::from(self.wirecount()))
            }
            Some(other) => Err(Error::Unsupported(format!(
                "qty multiplier {other} on cable {}",
                self.name
            ))),
        }
    }
}

// --- Mates ---

/// A direct pin-to-pin linkage between two connectors.
#[derive(Debug, Clone, PartialEq)]
pub struct MatePin {
    pub from_name: String,
    pub from_pin: PinId,
    pub to_name: String,
    pub to_pin: PinId,
    pub shape: String,
}

/// A whole-component linkage, e.g. board-to-board headers.
#[derive(Debug, Clone, PartialEq)]
pub struct MateComponent {
    pub from_name: String,
    pub to_name: String,
    pub shape: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mate {
    Pin(MatePin),
    Component(MateComponent),
}

impl Mate {
    pub fn shape(&self) -> &str {
        match self {
            Mate::Pin(mate) => &mate.shape,
            Mate::Component(mate) => &mate.shape,
        }
    }

    pub fn direction(&self) -> Direction {
        arrow_direction(self.shape())
    }
}

/// Validates a mate shape token: optional `<` tip, a `-`/`=` body, optional
/// `>` tip.
pub fn parse_shape(token: &str) -> Result<String> {
    let body = token.trim_start_matches('<').trim_end_matches('>');
    if body.is_empty() || !body.chars().all(|c| c == '-' || c == '=') {
        return Err(Error::UnknownMateKind(token.to_string()));
    }
    Ok(token.to_string())
}

pub fn arrow_direction(shape: &str) -> Direction {
    match (shape.starts_with('<'), shape.ends_with('>')) {
        (true, true) => Direction::Both,
        (true, false) => Direction::Back,
        (false, true) => Direction::Forward,
        (false, false) => Direction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_defaults_pins_and_pads_labels() {
        let connector = Connector {
            pincount: Some(3),
            pinlabels: vec!["GND".to_string()],
            ..Default::default()
        }
        .materialize("X1")
        .unwrap();
        assert_eq!(connector.pins, vec![1.into(), 2.into(), 3.into()]);
        assert_eq!(connector.pinlabels, vec!["GND", "", ""]);
    }

    #[test]
    fn connector_rejects_mismatched_pin_lengths() {
        let result = Connector {
            pincount: Some(2),
            pins: vec![1.into(), 2.into(), 3.into()],
            ..Default::default()
        }
        .materialize("X1");
        assert!(matches!(result, Err(Error::ParseError(_))));
    }

    #[test]
    fn cable_tiles_short_color_palettes() {
        let cable = Cable {
            wirecount: Some(5),
            colors: vec!["RD".to_string(), "BK".to_string()],
            ..Default::default()
        }
        .materialize("W1")
        .unwrap();
        assert_eq!(cable.colors, vec!["RD", "BK", "RD", "BK", "RD"]);
    }

    #[test]
    fn cable_rejects_out_of_range_wires() {
        let mut cable = Cable {
            wirecount: Some(2),
            ..Default::default()
        }
        .materialize("W1")
        .unwrap();
        let result = cable.connect(Some("X1"), Some(1.into()), WirePort::Wire(3), None, None);
        assert!(matches!(result, Err(Error::UnknownPin { .. })));
        let result = cable.connect(Some("X1"), Some(1.into()), WirePort::Shield, None, None);
        assert!(matches!(result, Err(Error::UnknownPin { .. })));
    }

    #[test]
    fn mate_shapes_decode_directionality() {
        assert_eq!(arrow_direction("<-->"), Direction::Both);
        assert_eq!(arrow_direction("<=="), Direction::Back);
        assert_eq!(arrow_direction("==>"), Direction::Forward);
        assert_eq!(arrow_direction("--"), Direction::None);
        assert!(matches!(
            parse_shape("<>"),
            Err(Error::UnknownMateKind(_))
        ));
        assert!(matches!(
            parse_shape("~~"),
            Err(Error::UnknownMateKind(_))
        ));
    }
}
