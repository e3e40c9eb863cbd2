//! File-level keep-out checks shared by the CLI and library users.
//! Wraps the parser and the checker; no host application required.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::geometry::{mm_to_nm, Position};
use crate::keepout::{KeepOutChecker, ZoneOrigin};
use crate::parser::pcb::PcbParser;
use crate::parser::pcb_schema::PcbDesign;

#[derive(Debug, thiserror::Error)]
pub enum KeepoutError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

impl From<crate::parser::pcb::PcbParseError> for KeepoutError {
    fn from(e: crate::parser::pcb::PcbParseError) -> Self {
        match e {
            crate::parser::pcb::PcbParseError::Io(io) => KeepoutError::Io(io),
            other => KeepoutError::Parse(other.to_string()),
        }
    }
}

/// Options for keep-out checks (CLI or library).
#[derive(Clone, Debug)]
pub struct CheckOptions {
    /// Emit collection and failure diagnostics through `tracing`
    pub debug: bool,
    /// Sample the via rim as well as its center
    pub check_edges: bool,
    /// Via diameter for candidate positions, in millimetres
    pub via_size_mm: f64,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            debug: false,
            check_edges: true,
            via_size_mm: 0.6,
        }
    }
}

impl CheckOptions {
    pub fn via_size_nm(&self) -> i64 {
        mm_to_nm(self.via_size_mm)
    }
}

/// Result for one candidate position
#[derive(Debug, Clone, Serialize)]
pub struct PlacementVerdict {
    pub position: Position,
    pub allowed: bool,
}

/// Result for one via already on the board
#[derive(Debug, Clone, Serialize)]
pub struct ViaAudit {
    pub uuid: String,
    pub position: Position,
    pub size: i64,
    pub net_name: Option<String>,
    pub allowed: bool,
}

/// Keep-out audit of every via on a board
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub file: PathBuf,
    pub zone_count: usize,
    pub vias: Vec<ViaAudit>,
}

impl AuditReport {
    pub fn violations(&self) -> impl Iterator<Item = &ViaAudit> {
        self.vias.iter().filter(|v| !v.allowed)
    }

    pub fn violation_count(&self) -> usize {
        self.violations().count()
    }

    pub fn has_violations(&self) -> bool {
        self.violations().next().is_some()
    }
}

/// One rule area on the board
#[derive(Debug, Clone, Serialize)]
pub struct ZoneSummary {
    pub origin: ZoneOrigin,
    pub name: Option<String>,
    pub layers: Vec<String>,
    pub prohibits_vias: bool,
}

/// Core keep-out API used by the CLI.
pub struct KeepoutCore;

impl KeepoutCore {
    /// Check candidate positions (nanometres) against the board's keep-outs.
    pub fn check_positions(
        path: &Path,
        positions: &[Position],
        options: &CheckOptions,
    ) -> Result<Vec<PlacementVerdict>, KeepoutError> {
        let pcb = PcbParser::parse_pcb(path)?;
        Ok(Self::check_design_positions(&pcb, positions, options))
    }

    pub fn check_design_positions(
        pcb: &PcbDesign,
        positions: &[Position],
        options: &CheckOptions,
    ) -> Vec<PlacementVerdict> {
        let checker = KeepOutChecker::new(pcb, options.debug);
        let via_size = options.via_size_nm();

        positions
            .iter()
            .map(|&position| PlacementVerdict {
                position,
                allowed: checker.is_via_allowed(position, via_size, options.check_edges),
            })
            .collect()
    }

    /// Check every existing via, each with its own diameter.
    pub fn audit_vias(path: &Path, options: &CheckOptions) -> Result<AuditReport, KeepoutError> {
        let pcb = PcbParser::parse_pcb(path)?;
        Ok(Self::audit_design(&pcb, path, options))
    }

    pub fn audit_design(pcb: &PcbDesign, path: &Path, options: &CheckOptions) -> AuditReport {
        let checker = KeepOutChecker::new(pcb, options.debug);

        let vias = pcb
            .vias
            .iter()
            .map(|via| ViaAudit {
                uuid: via.uuid.clone(),
                position: via.position,
                size: via.size,
                net_name: via.net_name.clone(),
                allowed: checker.is_via_allowed(via.position, via.size, options.check_edges),
            })
            .collect();

        AuditReport {
            file: path.to_path_buf(),
            zone_count: checker.zone_count(),
            vias,
        }
    }

    /// List every rule area, board areas first, with its via restriction.
    pub fn list_zones(path: &Path) -> Result<Vec<ZoneSummary>, KeepoutError> {
        let pcb = PcbParser::parse_pcb(path)?;
        Ok(Self::summarize_zones(&pcb))
    }

    pub fn summarize_zones(pcb: &PcbDesign) -> Vec<ZoneSummary> {
        let board = pcb
            .zones
            .iter()
            .enumerate()
            .map(|(index, zone)| (ZoneOrigin::Board { index }, zone));
        let footprint = pcb.footprints.iter().enumerate().flat_map(|(index, fp)| {
            fp.zones.iter().map(move |zone| {
                (
                    ZoneOrigin::Footprint {
                        index,
                        reference: fp.reference.clone(),
                    },
                    zone,
                )
            })
        });

        board
            .chain(footprint)
            .filter(|(_, zone)| zone.is_rule_area())
            .map(|(origin, zone)| ZoneSummary {
                origin,
                name: zone.name.clone(),
                layers: zone.layers.names(),
                prohibits_vias: zone.prohibits_vias(),
            })
            .collect()
    }
}
