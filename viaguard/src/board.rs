//! Host Board API
//!
//! The checker never owns board data. It talks to whatever host application
//! holds the board through the traits in this module, so the same checker runs
//! against a live EDA session, a parsed `.kicad_pcb` file, or a test double.
//!
//! Layer numbering follows the KiCad 6-8 `PCB_LAYER_ID` ordinals:
//! - `F.Cu` = 0, `In1.Cu`..`In30.Cu` = 1..30, `B.Cu` = 31
//! - technical and user layers occupy 32..59

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Position;

/// First valid layer ID.
pub const PCB_LAYER_ID_START: u8 = 0;

/// Number of valid layer IDs starting at [`PCB_LAYER_ID_START`].
pub const PCB_LAYER_ID_COUNT: u8 = 60;

/// Number of copper layers (front, 30 inner, back).
pub const COPPER_LAYER_COUNT: u8 = 32;

/// Errors raised by a host board implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Host does not provide accessor: {0}")]
    Unsupported(String),
    #[error("Missing board item: {0}")]
    MissingItem(String),
    #[error("Invalid zone geometry: {0}")]
    InvalidGeometry(String),
    #[error("Host error: {0}")]
    Host(String),
}

/// Canonical names indexed by layer ordinal (inner copper handled separately).
const NON_COPPER_LAYER_NAMES: [&str; 28] = [
    "B.Adhes", "F.Adhes", "B.Paste", "F.Paste", "B.SilkS", "F.SilkS", "B.Mask", "F.Mask",
    "Dwgs.User", "Cmts.User", "Eco1.User", "Eco2.User", "Edge.Cuts", "Margin", "B.CrtYd",
    "F.CrtYd", "B.Fab", "F.Fab", "User.1", "User.2", "User.3", "User.4", "User.5", "User.6",
    "User.7", "User.8", "User.9", "Rescue",
];

/// A board layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerId(pub u8);

impl LayerId {
    pub const F_CU: LayerId = LayerId(0);
    pub const B_CU: LayerId = LayerId(31);

    /// Iterate the full valid layer range, in ordinal order.
    pub fn all() -> impl Iterator<Item = LayerId> {
        (PCB_LAYER_ID_START..PCB_LAYER_ID_START + PCB_LAYER_ID_COUNT).map(LayerId)
    }

    /// Resolve a canonical layer name such as `F.Cu` or `In4.Cu`
    pub fn from_name(name: &str) -> Option<LayerId> {
        match name {
            "F.Cu" => return Some(LayerId::F_CU),
            "B.Cu" => return Some(LayerId::B_CU),
            _ => {}
        }

        if let Some(inner) = name.strip_prefix("In").and_then(|s| s.strip_suffix(".Cu")) {
            return inner
                .parse::<u8>()
                .ok()
                .filter(|n| (1..COPPER_LAYER_COUNT - 1).contains(n))
                .map(LayerId);
        }

        NON_COPPER_LAYER_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|idx| LayerId(COPPER_LAYER_COUNT + idx as u8))
    }

    pub fn name(&self) -> String {
        match self.0 {
            0 => "F.Cu".to_string(),
            31 => "B.Cu".to_string(),
            n if n < COPPER_LAYER_COUNT => format!("In{}.Cu", n),
            n => NON_COPPER_LAYER_NAMES
                .get((n - COPPER_LAYER_COUNT) as usize)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Layer{}", n)),
        }
    }

    pub fn is_copper(&self) -> bool {
        self.0 < COPPER_LAYER_COUNT
    }

    pub fn is_valid(&self) -> bool {
        (PCB_LAYER_ID_START..PCB_LAYER_ID_START + PCB_LAYER_ID_COUNT).contains(&self.0)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Set of layers a zone occupies, stored as a bitmask over layer ordinals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerSet(u64);

impl LayerSet {
    pub fn new() -> Self {
        Self(0)
    }

    /// Builder-style insert
    pub fn with(mut self, layer: LayerId) -> Self {
        self.insert(layer);
        self
    }

    /// Every copper layer, front to back
    pub fn all_copper() -> Self {
        LayerId::all().filter(LayerId::is_copper).collect()
    }

    /// Build a set from KiCad layer names, expanding `*.Cu`, `F&B.Cu` and `*.*`.
    /// Unknown names are skipped.
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = LayerSet::new();
        for name in names {
            match name {
                "*.Cu" => set = set.union(LayerSet::all_copper()),
                "F&B.Cu" => {
                    set.insert(LayerId::F_CU);
                    set.insert(LayerId::B_CU);
                }
                "*.*" => set = set.union(LayerId::all().collect()),
                other => {
                    if let Some(layer) = LayerId::from_name(other) {
                        set.insert(layer);
                    }
                }
            }
        }
        set
    }

    pub fn insert(&mut self, layer: LayerId) {
        if layer.is_valid() {
            self.0 |= 1u64 << layer.0;
        }
    }

    pub fn contains(&self, layer: LayerId) -> bool {
        layer.is_valid() && self.0 & (1u64 << layer.0) != 0
    }

    pub fn union(self, other: LayerSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = LayerId> + '_ {
        LayerId::all().filter(move |l| self.contains(*l))
    }

    /// Canonical names of the layers in the set
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|l| l.name()).collect()
    }
}

impl FromIterator<LayerId> for LayerSet {
    fn from_iter<T: IntoIterator<Item = LayerId>>(iter: T) -> Self {
        let mut set = LayerSet::new();
        for layer in iter {
            set.insert(layer);
        }
        set
    }
}

/// A zone as exposed by the host: a rule area or a copper pour
pub trait HostZone {
    /// True when the zone is a rule area rather than a copper pour
    fn is_rule_area(&self) -> Result<bool, BoardError>;

    /// True when the rule area forbids vias
    fn prohibits_vias(&self) -> Result<bool, BoardError>;

    fn layer_set(&self) -> Result<LayerSet, BoardError>;

    /// Test whether `point` lies inside the zone's filled area on `layer`.
    fn hit_test_filled_area(&self, layer: LayerId, point: Position) -> Result<bool, BoardError>;

    /// Optional display name used in diagnostics
    fn name(&self) -> Option<String> {
        None
    }
}

/// A placed component that may own its own zones
pub trait HostFootprint {
    fn reference(&self) -> String;

    fn zones(&self) -> Result<Vec<&dyn HostZone>, BoardError>;
}

/// The two footprint enumeration accessors seen across host versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootprintAccessor {
    /// Older hosts call footprints "modules"
    Modules,
    Footprints,
}

impl FootprintAccessor {
    /// Pick the accessor a board supports. The legacy accessor wins when both
    /// are available, matching how older plugins probed the host.
    pub fn probe(board: &dyn HostBoard) -> FootprintAccessor {
        if board.has_accessor(FootprintAccessor::Modules) {
            FootprintAccessor::Modules
        } else {
            FootprintAccessor::Footprints
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FootprintAccessor::Modules => "modules",
            FootprintAccessor::Footprints => "footprints",
        }
    }

    /// Enumerate footprints through this accessor
    pub fn enumerate<'b>(
        &self,
        board: &'b dyn HostBoard,
    ) -> Result<Vec<&'b dyn HostFootprint>, BoardError> {
        match self {
            FootprintAccessor::Modules => board.modules(),
            FootprintAccessor::Footprints => board.footprints(),
        }
    }
}

/// Board-level access required by the keep-out checker
pub trait HostBoard {
    /// Number of board-level areas (zones and rule areas)
    fn area_count(&self) -> Result<usize, BoardError>;

    fn area(&self, index: usize) -> Result<&dyn HostZone, BoardError>;

    fn footprints(&self) -> Result<Vec<&dyn HostFootprint>, BoardError>;

    /// Legacy footprint accessor. Hosts that still expose it override this
    /// together with [`HostBoard::has_accessor`].
    fn modules(&self) -> Result<Vec<&dyn HostFootprint>, BoardError> {
        Err(BoardError::Unsupported(FootprintAccessor::Modules.as_str().to_string()))
    }

    fn has_accessor(&self, accessor: FootprintAccessor) -> bool {
        accessor == FootprintAccessor::Footprints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_names_round_trip() {
        assert_eq!(LayerId::from_name("F.Cu"), Some(LayerId(0)));
        assert_eq!(LayerId::from_name("In1.Cu"), Some(LayerId(1)));
        assert_eq!(LayerId::from_name("In30.Cu"), Some(LayerId(30)));
        assert_eq!(LayerId::from_name("B.Cu"), Some(LayerId(31)));
        assert_eq!(LayerId::from_name("Edge.Cuts"), Some(LayerId(44)));
        assert_eq!(LayerId::from_name("Rescue"), Some(LayerId(59)));
        assert_eq!(LayerId::from_name("In31.Cu"), None);
        assert_eq!(LayerId::from_name("Bogus"), None);

        for layer in LayerId::all() {
            assert_eq!(LayerId::from_name(&layer.name()), Some(layer));
        }
    }

    #[test]
    fn test_layer_set_wildcards() {
        let all_cu = LayerSet::from_names(["*.Cu"]);
        assert_eq!(all_cu.len(), 32);
        assert!(all_cu.contains(LayerId::F_CU));
        assert!(all_cu.contains(LayerId(15)));
        assert!(!all_cu.contains(LayerId(44)));
        assert!(all_cu.iter().all(|layer| layer.is_copper()));
        assert!(!LayerId(32).is_copper());

        let fb = LayerSet::from_names(["F&B.Cu"]);
        assert_eq!(fb.iter().collect::<Vec<_>>(), vec![LayerId::F_CU, LayerId::B_CU]);

        assert_eq!(LayerSet::from_names(["*.*"]).len(), PCB_LAYER_ID_COUNT as usize);
    }

    #[test]
    fn test_layer_set_ignores_out_of_range() {
        let mut set = LayerSet::new();
        set.insert(LayerId(200));
        assert!(set.is_empty());
        assert!(!set.contains(LayerId(200)));
    }

    struct BareBoard;

    impl HostBoard for BareBoard {
        fn area_count(&self) -> Result<usize, BoardError> {
            Ok(0)
        }
        fn area(&self, index: usize) -> Result<&dyn HostZone, BoardError> {
            Err(BoardError::MissingItem(format!("area {}", index)))
        }
        fn footprints(&self) -> Result<Vec<&dyn HostFootprint>, BoardError> {
            Ok(vec![])
        }
    }

    struct LegacyBoard;

    impl HostBoard for LegacyBoard {
        fn area_count(&self) -> Result<usize, BoardError> {
            Ok(0)
        }
        fn area(&self, index: usize) -> Result<&dyn HostZone, BoardError> {
            Err(BoardError::MissingItem(format!("area {}", index)))
        }
        fn footprints(&self) -> Result<Vec<&dyn HostFootprint>, BoardError> {
            Err(BoardError::Unsupported("footprints".to_string()))
        }
        fn modules(&self) -> Result<Vec<&dyn HostFootprint>, BoardError> {
            Ok(vec![])
        }
        fn has_accessor(&self, accessor: FootprintAccessor) -> bool {
            accessor == FootprintAccessor::Modules
        }
    }

    #[test]
    fn test_accessor_probe() {
        assert_eq!(FootprintAccessor::probe(&BareBoard), FootprintAccessor::Footprints);
        assert_eq!(FootprintAccessor::probe(&LegacyBoard), FootprintAccessor::Modules);
        assert!(FootprintAccessor::Modules.enumerate(&LegacyBoard).is_ok());
        assert!(matches!(
            FootprintAccessor::Modules.enumerate(&BareBoard),
            Err(BoardError::Unsupported(_))
        ));
    }
}
