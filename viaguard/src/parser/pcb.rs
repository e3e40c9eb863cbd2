//! KiCAD PCB Parser
//!
//! Parses KiCad 6-9 PCB files (.kicad_pcb) far enough to drive keep-out
//! checks: the layer table, nets, footprints with their zones, vias and
//! board-level zones.
//!
//! Key format details:
//! - All values are in millimetres and converted to nanometres here
//! - Zones list their layers with `(layer ...)` or `(layers ...)`, wildcards allowed
//! - Rule areas are zones carrying a `(keepout ...)` block
//! - Footprint-owned zones are written in board coordinates

use std::path::Path;

use thiserror::Error;

use crate::board::{LayerId, LayerSet};
use crate::geometry::{mm_to_nm, Polygon, Position};
use crate::parser::pcb_schema::*;
use crate::parser::sexp::{ParseError, SExp, SExpParser};

#[derive(Debug, Error)]
pub enum PcbParseError {
    #[error("S-expression parse error: {0}")]
    SExpParse(#[from] ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid PCB format: {0}")]
    InvalidFormat(String),
    #[error("Unsupported PCB format: {0}")]
    UnsupportedFormat(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Parser for KiCAD PCB files
pub struct PcbParser;

impl PcbParser {
    pub fn parse_pcb(path: &Path) -> Result<PcbDesign, PcbParseError> {
        let content = std::fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        Self::parse_pcb_str(&content, &filename)
    }

    pub fn parse_pcb_str(content: &str, filename: &str) -> Result<PcbDesign, PcbParseError> {
        let trimmed = content.trim_start();
        if trimmed.starts_with("PCBNEW") {
            return Err(PcbParseError::UnsupportedFormat(
                "legacy PCBNEW board (KiCad 4-5); re-save it with KiCad 6 or newer".to_string(),
            ));
        }
        if !trimmed.starts_with("(kicad_pcb") {
            return Err(PcbParseError::InvalidFormat("Expected kicad_pcb root".to_string()));
        }

        let root = SExpParser::new(content).parse()?;
        if root.tag() != Some("kicad_pcb") {
            return Err(PcbParseError::InvalidFormat(format!(
                "Expected kicad_pcb, found {}",
                root.tag().unwrap_or("atom")
            )));
        }

        let mut pcb = PcbDesign {
            uuid: root
                .value("uuid")
                .map(str::to_string)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            filename: filename.to_string(),
            version: root.value("version").map(str::to_string),
            generator: root.value("generator").map(str::to_string),
            ..Default::default()
        };

        for item in root.as_list().unwrap_or(&[]).iter().skip(1) {
            match item.tag() {
                Some("layers") => pcb.layers = Self::parse_layers(item),
                Some("net") => {
                    if let Ok(net) = Self::parse_net(item) {
                        pcb.nets.push(net);
                    }
                }
                Some("footprint") | Some("module") => match Self::parse_footprint(item) {
                    Ok(fp) => pcb.footprints.push(fp),
                    Err(e) => tracing::debug!("Skipping footprint: {}", e),
                },
                Some("via") => match Self::parse_via(item, &pcb) {
                    Ok(via) => pcb.vias.push(via),
                    Err(e) => tracing::debug!("Skipping via: {}", e),
                },
                Some("zone") => match Self::parse_zone(item) {
                    Ok(zone) => pcb.zones.push(zone),
                    Err(e) => tracing::debug!("Skipping zone: {}", e),
                },
                _ => {
                    // Ignore elements the checker has no use for
                }
            }
        }

        Ok(pcb)
    }

    fn uuid_of(sexp: &SExp) -> String {
        sexp.value("uuid")
            .or_else(|| sexp.value("tstamp"))
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }

    fn parse_layers(sexp: &SExp) -> Vec<PcbLayer> {
        sexp.as_list()
            .unwrap_or(&[])
            .iter()
            .skip(1)
            .filter_map(|entry| {
                let list = entry.as_list()?;
                if list.len() < 3 {
                    return None;
                }
                Some(PcbLayer {
                    ordinal: list[0].as_atom()?.parse().ok()?,
                    canonical_name: list[1].as_atom()?.to_string(),
                    layer_type: LayerType::from_keyword(list[2].as_atom().unwrap_or("")),
                    user_name: list.get(3).and_then(|s| s.as_atom()).map(str::to_string),
                })
            })
            .collect()
    }

    fn parse_net(sexp: &SExp) -> Result<PcbNet, PcbParseError> {
        let args = sexp.args();
        let id = args
            .first()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| PcbParseError::MissingField("net id".to_string()))?;
        let name = args.get(1).copied().unwrap_or("").to_string();
        Ok(PcbNet { id, name })
    }

    fn parse_footprint(sexp: &SExp) -> Result<Footprint, PcbParseError> {
        let footprint_lib = sexp
            .as_list()
            .and_then(|l| l.get(1))
            .and_then(|a| a.as_atom())
            .ok_or_else(|| PcbParseError::MissingField("footprint library id".to_string()))?
            .to_string();

        let mut reference = String::new();
        let mut value = String::new();

        // KiCad 8+: (property "Reference" "U1" ...)
        for prop in sexp.find_all("property") {
            match prop.args().as_slice() {
                ["Reference", val, ..] => reference = val.to_string(),
                ["Value", val, ..] => value = val.to_string(),
                _ => {}
            }
        }

        // KiCad 6-7: (fp_text reference "U1" ...)
        for text in sexp.find_all("fp_text") {
            match text.args().as_slice() {
                ["reference", val, ..] if reference.is_empty() => reference = val.to_string(),
                ["value", val, ..] if value.is_empty() => value = val.to_string(),
                _ => {}
            }
        }

        let mut zones = Vec::new();
        for zone_exp in sexp.find_all("zone") {
            match Self::parse_zone(zone_exp) {
                Ok(zone) => zones.push(zone),
                Err(e) => tracing::debug!("Skipping zone in footprint {}: {}", reference, e),
            }
        }

        Ok(Footprint {
            uuid: Self::uuid_of(sexp),
            reference,
            value,
            footprint_lib,
            layer: sexp.value("layer").unwrap_or("F.Cu").to_string(),
            position: Self::parse_xy(sexp, "at").unwrap_or_default(),
            zones,
        })
    }

    fn parse_via(sexp: &SExp, pcb: &PcbDesign) -> Result<Via, PcbParseError> {
        let position = Self::parse_xy(sexp, "at")?;

        let size = sexp
            .float("size")
            .ok_or_else(|| PcbParseError::MissingField("via size".to_string()))?;
        let drill = sexp.float("drill").unwrap_or(0.0);

        let layers = match sexp.find("layers").map(|l| l.args()).as_deref() {
            Some([start, end, ..]) => (start.to_string(), end.to_string()),
            _ => ("F.Cu".to_string(), "B.Cu".to_string()),
        };

        let net = sexp.int("net").unwrap_or(0);
        let net_name = pcb.net_name(net).map(str::to_string);

        Ok(Via {
            uuid: Self::uuid_of(sexp),
            position,
            size: mm_to_nm(size),
            drill: mm_to_nm(drill),
            layers,
            net,
            net_name,
        })
    }

    fn parse_zone(sexp: &SExp) -> Result<Zone, PcbParseError> {
        let layer_names: Vec<&str> = match sexp.find("layers") {
            Some(layers) => layers.args(),
            None => sexp.value("layer").into_iter().collect(),
        };
        if layer_names.is_empty() {
            return Err(PcbParseError::MissingField("zone layer".to_string()));
        }
        let layers = LayerSet::from_names(layer_names);

        let outline = sexp
            .find("polygon")
            .and_then(|p| p.find("pts"))
            .map(Self::parse_pts)
            .unwrap_or_default();

        let filled_polygons = sexp
            .find_all("filled_polygon")
            .filter_map(|fp| {
                let pts = fp.find("pts")?;
                Some(FilledPolygon {
                    layer: fp.value("layer").and_then(LayerId::from_name),
                    polygon: Self::parse_pts(pts),
                })
            })
            .collect();

        let keepout = sexp.find("keepout").map(|ko| {
            let not_allowed = |key: &str| ko.value(key) == Some("not_allowed");
            ZoneKeepout {
                tracks: not_allowed("tracks"),
                vias: not_allowed("vias"),
                pads: not_allowed("pads"),
                copperpour: not_allowed("copperpour"),
                footprints: not_allowed("footprints"),
            }
        });

        Ok(Zone {
            uuid: Self::uuid_of(sexp),
            name: sexp.value("name").map(str::to_string),
            net: sexp.int("net").unwrap_or(0),
            net_name: sexp.value("net_name").unwrap_or("").to_string(),
            layers,
            priority: sexp.int("priority").unwrap_or(0),
            outline,
            filled_polygons,
            keepout,
        })
    }

    /// Read `(key x y ...)` as a position
    fn parse_xy(sexp: &SExp, key: &str) -> Result<Position, PcbParseError> {
        let node = sexp
            .find(key)
            .ok_or_else(|| PcbParseError::MissingField(key.to_string()))?;
        Self::xy_args(node).ok_or_else(|| PcbParseError::InvalidFormat(format!("Invalid '{}' format", key)))
    }

    fn xy_args(node: &SExp) -> Option<Position> {
        let args = node.args();
        let x: f64 = args.first()?.parse().ok()?;
        let y: f64 = args.get(1)?.parse().ok()?;
        Some(Position::from_mm(x, y))
    }

    fn parse_pts(pts: &SExp) -> Polygon {
        Polygon::new(pts.find_all("xy").filter_map(Self::xy_args).collect())
    }
}
