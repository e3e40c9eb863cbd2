//! Keep-out zone enforcement for via stitching.
//!
//! A [`KeepOutChecker`] scans the board once for rule areas that forbid vias
//! and then answers placement queries against that cached list. Every failure
//! inside the checker degrades to "allowed" so a broken board never stalls a
//! fill run.

pub mod checker;
pub mod collector;

pub use checker::{is_via_allowed_at_position, point_in_zone, CheckError, KeepOutChecker};
pub use collector::{collect_keepout_zones, ZoneHandle, ZoneOrigin};
