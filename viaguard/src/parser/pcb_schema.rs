//! PCB Schema Definitions
//!
//! Data structures for the parts of a KiCad PCB file (.kicad_pcb) that matter
//! for via keep-out checks. Coordinates are stored in nanometres.

use serde::{Deserialize, Serialize};

use crate::board::{LayerId, LayerSet};
use crate::geometry::{Polygon, Position};

/// A parsed PCB design
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PcbDesign {
    pub uuid: String,
    pub filename: String,
    pub version: Option<String>,
    pub generator: Option<String>,
    pub layers: Vec<PcbLayer>,
    pub nets: Vec<PcbNet>,
    pub footprints: Vec<Footprint>,
    pub vias: Vec<Via>,
    pub zones: Vec<Zone>,
}

impl PcbDesign {
    pub fn net_name(&self, id: u32) -> Option<&str> {
        self.nets
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.name.as_str())
    }
}

/// PCB Layer definition from the `(layers ...)` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcbLayer {
    pub ordinal: u32,
    pub canonical_name: String,
    pub layer_type: LayerType,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LayerType {
    #[default]
    Signal,
    Power,
    Mixed,
    Jumper,
    User,
    Unknown,
}

impl LayerType {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "signal" => LayerType::Signal,
            "power" => LayerType::Power,
            "mixed" => LayerType::Mixed,
            "jumper" => LayerType::Jumper,
            "user" => LayerType::User,
            _ => LayerType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcbNet {
    pub id: u32,
    pub name: String,
}

/// Footprint (component) on the board and the zones it owns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Footprint {
    pub uuid: String,
    pub reference: String,
    pub value: String,
    pub footprint_lib: String,
    pub layer: String,
    pub position: Position,
    pub zones: Vec<Zone>,
}

/// Via (vertical interconnect). Size and drill in nanometres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Via {
    pub uuid: String,
    pub position: Position,
    pub size: i64,
    pub drill: i64,
    pub layers: (String, String),
    pub net: u32,
    pub net_name: Option<String>,
}

/// Copper zone or rule area
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Zone {
    pub uuid: String,
    pub name: Option<String>,
    pub net: u32,
    pub net_name: String,
    pub layers: LayerSet,
    pub priority: u32,
    pub outline: Polygon,
    pub filled_polygons: Vec<FilledPolygon>,
    /// Present only on rule areas
    pub keepout: Option<ZoneKeepout>,
}

impl Zone {
    pub fn is_rule_area(&self) -> bool {
        self.keepout.is_some()
    }

    pub fn prohibits_vias(&self) -> bool {
        self.keepout.as_ref().map_or(false, |k| k.vias)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilledPolygon {
    pub layer: Option<LayerId>,
    pub polygon: Polygon,
}

/// Rule area restrictions; `true` means "not allowed"
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZoneKeepout {
    pub tracks: bool,
    pub vias: bool,
    pub pads: bool,
    pub copperpour: bool,
    pub footprints: bool,
}
