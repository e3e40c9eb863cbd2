//! Collection of via keep-out zones from a host board

use std::fmt;

use serde::Serialize;

use crate::board::{BoardError, FootprintAccessor, HostBoard, HostZone};

/// Where a collected zone lives on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneOrigin {
    /// Board-level area, by area index
    Board { index: usize },
    /// Zone owned by a footprint, by footprint index
    Footprint { index: usize, reference: String },
}

impl fmt::Display for ZoneOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneOrigin::Board { index } => write!(f, "board area {}", index),
            ZoneOrigin::Footprint { reference, .. } if !reference.is_empty() => {
                write!(f, "footprint {}", reference)
            }
            ZoneOrigin::Footprint { index, .. } => write!(f, "footprint #{}", index),
        }
    }
}

/// A cached reference to a keep-out zone. The origin is kept for diagnostics
/// only; checks treat all handles alike.
#[derive(Clone)]
pub struct ZoneHandle<'b> {
    pub zone: &'b dyn HostZone,
    pub origin: ZoneOrigin,
}

impl fmt::Debug for ZoneHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneHandle")
            .field("origin", &self.origin)
            .field("name", &self.zone.name())
            .finish()
    }
}

fn is_via_keepout(zone: &dyn HostZone) -> Result<bool, BoardError> {
    Ok(zone.is_rule_area()? && zone.prohibits_vias()?)
}

/// Collect every rule area that forbids vias: board areas in index order,
/// then each footprint's zones in footprint order. Duplicates are kept.
///
/// Collection is fail-open. The first host error stops the scan and whatever
/// was gathered up to that point is returned.
pub fn collect_keepout_zones<'b>(board: &'b dyn HostBoard, debug: bool) -> Vec<ZoneHandle<'b>> {
    let mut zones = Vec::new();

    if let Err(e) = collect_into(board, debug, &mut zones) {
        if debug {
            tracing::warn!("[KeepOutChecker] Error collecting zones: {}", e);
        }
    }

    zones
}

fn collect_into<'b>(
    board: &'b dyn HostBoard,
    debug: bool,
    zones: &mut Vec<ZoneHandle<'b>>,
) -> Result<(), BoardError> {
    // 1. Board-level areas
    for index in 0..board.area_count()? {
        let zone = board.area(index)?;
        if is_via_keepout(zone)? {
            zones.push(ZoneHandle {
                zone,
                origin: ZoneOrigin::Board { index },
            });
            if debug {
                tracing::debug!("[KeepOutChecker] Added board keep-out zone {}", index);
            }
        }
    }

    // 2. Footprint-level zones
    let accessor = FootprintAccessor::probe(board);
    let footprints = accessor.enumerate(board)?;

    for (index, footprint) in footprints.into_iter().enumerate() {
        for zone in footprint.zones()? {
            if is_via_keepout(zone)? {
                let reference = footprint.reference();
                if debug {
                    tracing::debug!(
                        "[KeepOutChecker] Added footprint keep-out zone ({} via {})",
                        reference,
                        accessor.as_str()
                    );
                }
                zones.push(ZoneHandle {
                    zone,
                    origin: ZoneOrigin::Footprint { index, reference },
                });
            }
        }
    }

    Ok(())
}
