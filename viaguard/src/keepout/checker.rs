//! Via placement predicate over the cached keep-out zones

use thiserror::Error;

use crate::board::{BoardError, HostBoard, HostZone, LayerId};
use crate::geometry::{circle_samples, Position, EDGE_SAMPLE_ANGLES_DEG};

use super::collector::{collect_keepout_zones, ZoneHandle};

/// Failures inside a single placement check. These never reach callers of
/// [`KeepOutChecker::is_via_allowed`]; they are turned into "allowed".
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Edge sample at {angle_deg} degrees leaves the coordinate range")]
    CoordinateOverflow { angle_deg: f64 },
    #[error("Board error: {0}")]
    Board(#[from] BoardError),
}

/// Test a point against a zone on every layer the zone occupies.
///
/// Host failures count as "not in zone".
pub fn point_in_zone(zone: &dyn HostZone, point: Position, debug: bool) -> bool {
    match try_point_in_zone(zone, point) {
        Ok(hit) => hit,
        Err(e) => {
            if debug {
                tracing::warn!("[KeepOutChecker] Error in point test: {}", e);
            }
            false
        }
    }
}

fn try_point_in_zone(zone: &dyn HostZone, point: Position) -> Result<bool, BoardError> {
    let layer_set = zone.layer_set()?;

    for layer in LayerId::all() {
        if layer_set.contains(layer) && zone.hit_test_filled_area(layer, point)? {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Keep-out checker for one via fill run.
///
/// The zone list is gathered once in [`KeepOutChecker::new`] and never
/// refreshed. Build a new checker after editing the board.
pub struct KeepOutChecker<'b> {
    zones: Vec<ZoneHandle<'b>>,
    debug: bool,
}

impl<'b> KeepOutChecker<'b> {
    pub fn new(board: &'b dyn HostBoard, debug: bool) -> Self {
        let zones = collect_keepout_zones(board, debug);

        if debug && !zones.is_empty() {
            tracing::debug!("[KeepOutChecker] Found {} keep-out zone(s)", zones.len());
        }

        Self { zones, debug }
    }

    /// Number of cached keep-out zones, duplicates included
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn zones(&self) -> &[ZoneHandle<'b>] {
        &self.zones
    }

    /// Check a via with edge sampling enabled
    pub fn allows_via(&self, position: Position, via_size: i64) -> bool {
        self.is_via_allowed(position, via_size, true)
    }

    /// Decide whether a via of diameter `via_size` may be placed at `position`.
    ///
    /// The center is always tested. With `check_edges` and a positive size,
    /// eight points on the via rim (every 45 degrees) are tested as well.
    /// Any error during the check allows the via.
    pub fn is_via_allowed(&self, position: Position, via_size: i64, check_edges: bool) -> bool {
        if self.zones.is_empty() {
            return true;
        }

        match self.check(position, via_size, check_edges) {
            Ok(allowed) => allowed,
            Err(e) => {
                if self.debug {
                    tracing::warn!("[KeepOutChecker] Error checking position: {}", e);
                }
                true
            }
        }
    }

    fn check(&self, position: Position, via_size: i64, check_edges: bool) -> Result<bool, CheckError> {
        if self.hits_any_zone(position) {
            return Ok(false);
        }

        if check_edges && via_size > 0 {
            let radius = via_size / 2;

            for (sample, angle_deg) in circle_samples(position, radius)
                .into_iter()
                .zip(EDGE_SAMPLE_ANGLES_DEG)
            {
                let edge_point = sample.ok_or(CheckError::CoordinateOverflow { angle_deg })?;
                if self.hits_any_zone(edge_point) {
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }

    fn hits_any_zone(&self, point: Position) -> bool {
        self.zones
            .iter()
            .any(|handle| point_in_zone(handle.zone, point, self.debug))
    }
}

/// One-shot check. Reuses `cached_checker` when given, otherwise scans the
/// board for this call only.
pub fn is_via_allowed_at_position(
    board: &dyn HostBoard,
    position: Position,
    via_size: i64,
    cached_checker: Option<&KeepOutChecker<'_>>,
    debug: bool,
) -> bool {
    match cached_checker {
        Some(checker) => checker.allows_via(position, via_size),
        None => KeepOutChecker::new(board, debug).allows_via(position, via_size),
    }
}
