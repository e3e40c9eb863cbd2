//! ViaGuard - keep-out zone checks for via stitching
//!
//! Via stitching fills a copper area with a grid of vias. Designers mark
//! regions where no via may land with rule areas ("keep-outs"), either on the
//! board or inside a footprint. This library answers, for each candidate via,
//! whether it would intrude into one of those regions.
//!
//! # Quick Start
//!
//! ```no_run
//! use viaguard::{KeepOutChecker, Position, parse_pcb};
//! use std::path::Path;
//!
//! let board = parse_pcb(Path::new("board.kicad_pcb")).unwrap();
//! let checker = KeepOutChecker::new(&board, false);
//!
//! let position = Position::from_mm(12.5, 40.0);
//! if checker.allows_via(position, 600_000) {
//!     println!("via fits");
//! }
//! ```
//!
//! # Features
//!
//! - **Host agnostic**: the checker talks to the board through [`board::HostBoard`]
//! - **Board and footprint keep-outs**: both scopes are collected once per run
//! - **Edge sampling**: eight points on the via rim catch partial intrusions
//! - **Fail-open**: host errors never block a fill; the via is allowed instead
//! - **KiCad files**: `.kicad_pcb` boards work as a host out of the box

pub mod board;
pub mod core;
pub mod geometry;
pub mod keepout;
pub mod parser;

// Re-export main types
pub use board::{BoardError, HostBoard, HostFootprint, HostZone, LayerId, LayerSet};
pub use crate::core::{
    AuditReport, CheckOptions, KeepoutCore, KeepoutError, PlacementVerdict, ViaAudit, ZoneSummary,
};
pub use geometry::{mm_to_nm, Position};
pub use keepout::{is_via_allowed_at_position, KeepOutChecker, ZoneOrigin};
pub use parser::pcb::PcbParser;
pub use parser::pcb_schema::PcbDesign;

/// Parse a PCB file (convenience wrapper).
pub fn parse_pcb(path: &std::path::Path) -> Result<PcbDesign, KeepoutError> {
    PcbParser::parse_pcb(path).map_err(KeepoutError::from)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CheckOptions, HostBoard, KeepOutChecker, KeepoutCore, KeepoutError, PcbDesign, Position,
    };
}
