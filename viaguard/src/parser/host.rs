//! Host board implementation backed by a parsed `.kicad_pcb` file.
//!
//! Copper zones answer hit tests from their `filled_polygon` data. Rule areas
//! are never poured, so their outline stands in for the filled area.

use crate::board::{BoardError, HostBoard, HostFootprint, HostZone, LayerId, LayerSet};
use crate::geometry::Position;
use crate::parser::pcb_schema::{Footprint, PcbDesign, Zone};

impl HostZone for Zone {
    fn is_rule_area(&self) -> Result<bool, BoardError> {
        Ok(Zone::is_rule_area(self))
    }

    fn prohibits_vias(&self) -> Result<bool, BoardError> {
        Ok(Zone::prohibits_vias(self))
    }

    fn layer_set(&self) -> Result<LayerSet, BoardError> {
        Ok(self.layers)
    }

    fn hit_test_filled_area(&self, layer: LayerId, point: Position) -> Result<bool, BoardError> {
        if !self.layers.contains(layer) {
            return Ok(false);
        }

        let mut fills = self
            .filled_polygons
            .iter()
            .filter(|fp| fp.layer == Some(layer))
            .peekable();

        if fills.peek().is_some() {
            return Ok(fills.any(|fp| fp.polygon.contains(point)));
        }

        if Zone::is_rule_area(self) {
            if self.outline.is_degenerate() {
                return Err(BoardError::InvalidGeometry(format!(
                    "rule area {} outline has {} point(s)",
                    self.name.as_deref().unwrap_or(&self.uuid),
                    self.outline.points.len()
                )));
            }
            return Ok(self.outline.contains(point));
        }

        Ok(false)
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }
}

impl HostFootprint for Footprint {
    fn reference(&self) -> String {
        self.reference.clone()
    }

    fn zones(&self) -> Result<Vec<&dyn HostZone>, BoardError> {
        Ok(self.zones.iter().map(|z| z as &dyn HostZone).collect())
    }
}

impl HostBoard for PcbDesign {
    fn area_count(&self) -> Result<usize, BoardError> {
        Ok(self.zones.len())
    }

    fn area(&self, index: usize) -> Result<&dyn HostZone, BoardError> {
        self.zones
            .get(index)
            .map(|z| z as &dyn HostZone)
            .ok_or_else(|| BoardError::MissingItem(format!("board area {}", index)))
    }

    fn footprints(&self) -> Result<Vec<&dyn HostFootprint>, BoardError> {
        Ok(self.footprints.iter().map(|fp| fp as &dyn HostFootprint).collect())
    }
}
