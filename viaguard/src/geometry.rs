//! Board coordinates and the small amount of planar geometry the checker needs.
//!
//! Board coordinates are integer nanometres, the internal unit KiCad uses.
//! File formats store millimetres; convert at the boundary with [`mm_to_nm`].

use serde::{Deserialize, Serialize};

/// Nanometres per millimetre
pub const NM_PER_MM: f64 = 1_000_000.0;

/// Angles (degrees) at which the via edge is sampled
pub const EDGE_SAMPLE_ANGLES_DEG: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];

/// Convert millimetres to nanometres, rounding to the nearest unit
pub fn mm_to_nm(mm: f64) -> i64 {
    (mm * NM_PER_MM).round() as i64
}

pub fn nm_to_mm(nm: i64) -> f64 {
    nm as f64 / NM_PER_MM
}

/// 2D board position in nanometres
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Build from millimetres. Values beyond the `i32` range saturate.
    pub fn from_mm(x: f64, y: f64) -> Self {
        Self {
            x: saturate(mm_to_nm(x)),
            y: saturate(mm_to_nm(y)),
        }
    }

    /// Build from millimetres, failing when either axis leaves the `i32`
    /// nanometre range or is not a number.
    pub fn try_from_mm(x: f64, y: f64) -> Option<Self> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Self::try_from_nm(mm_to_nm(x), mm_to_nm(y))
    }

    /// Build from wide coordinates, failing when either axis leaves `i32`
    pub fn try_from_nm(x: i64, y: i64) -> Option<Self> {
        Some(Self {
            x: i32::try_from(x).ok()?,
            y: i32::try_from(y).ok()?,
        })
    }

    pub fn x_mm(&self) -> f64 {
        nm_to_mm(self.x as i64)
    }

    pub fn y_mm(&self) -> f64 {
        nm_to_mm(self.y as i64)
    }
}

fn saturate(nm: i64) -> i32 {
    nm.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Closed polygon, implicit last-to-first edge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Position>,
}

impl Polygon {
    pub fn new(points: Vec<Position>) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle from two opposite corners
    pub fn rect(min: Position, max: Position) -> Self {
        Self::new(vec![
            Position::new(min.x, min.y),
            Position::new(max.x, min.y),
            Position::new(max.x, max.y),
            Position::new(min.x, max.y),
        ])
    }

    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }

    /// Bounding box as (min, max), `None` for an empty polygon
    pub fn bounds(&self) -> Option<(Position, Position)> {
        let first = self.points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    /// Ray casting point-in-polygon test. Degenerate polygons contain nothing.
    pub fn contains(&self, point: Position) -> bool {
        if self.is_degenerate() {
            return false;
        }

        if let Some((min, max)) = self.bounds() {
            if point.x < min.x || point.x > max.x || point.y < min.y || point.y > max.y {
                return false;
            }
        }

        let px = point.x as f64;
        let py = point.y as f64;
        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;

        for i in 0..n {
            let xi = self.points[i].x as f64;
            let yi = self.points[i].y as f64;
            let xj = self.points[j].x as f64;
            let yj = self.points[j].y as f64;

            if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
                inside = !inside;
            }

            j = i;
        }

        inside
    }
}

/// Sample points on a circle of `radius` around `center`, one per
/// [`EDGE_SAMPLE_ANGLES_DEG`] entry. Coordinates are truncated toward zero.
/// A sample is `None` when it falls outside the `i32` coordinate range.
pub fn circle_samples(center: Position, radius: i64) -> [Option<Position>; 8] {
    let mut samples = [None; 8];
    for (slot, angle_deg) in samples.iter_mut().zip(EDGE_SAMPLE_ANGLES_DEG) {
        let angle = angle_deg.to_radians();
        let x = (center.x as f64 + radius as f64 * angle.cos()).trunc();
        let y = (center.y as f64 + radius as f64 * angle.sin()).trunc();
        *slot = to_coord(x).zip(to_coord(y)).map(|(x, y)| Position::new(x, y));
    }
    samples
}

fn to_coord(v: f64) -> Option<i32> {
    if v.is_finite() && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_conversion() {
        assert_eq!(mm_to_nm(1.0), 1_000_000);
        assert_eq!(mm_to_nm(0.6), 600_000);
        assert_eq!(mm_to_nm(-12.5), -12_500_000);
        assert_eq!(Position::from_mm(1.5, -2.0), Position::new(1_500_000, -2_000_000));
    }

    #[test]
    fn test_from_mm_saturates() {
        // 3000 mm is past i32::MAX nanometres and must not wrap to a negative x
        assert_eq!(Position::from_mm(3000.0, 0.0), Position::new(i32::MAX, 0));
        assert_eq!(Position::from_mm(0.0, -3000.0), Position::new(0, i32::MIN));
        assert_eq!(Position::from_mm(2147.0, -2147.0), Position::new(2_147_000_000, -2_147_000_000));
    }

    #[test]
    fn test_try_from_mm_range() {
        assert_eq!(Position::try_from_mm(12.5, -3.0), Some(Position::new(12_500_000, -3_000_000)));
        assert!(Position::try_from_mm(3000.0, 0.0).is_none());
        assert!(Position::try_from_mm(0.0, -3000.0).is_none());
        assert!(Position::try_from_mm(f64::NAN, 0.0).is_none());
        assert!(Position::try_from_mm(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_try_from_nm_range() {
        assert!(Position::try_from_nm(i32::MAX as i64, 0).is_some());
        assert!(Position::try_from_nm(i32::MAX as i64 + 1, 0).is_none());
        assert!(Position::try_from_nm(0, i32::MIN as i64 - 1).is_none());
    }

    #[test]
    fn test_rect_contains() {
        let rect = Polygon::rect(Position::new(0, 0), Position::new(100, 50));
        assert!(rect.contains(Position::new(50, 25)));
        assert!(!rect.contains(Position::new(150, 25)));
        assert!(!rect.contains(Position::new(50, -1)));
    }

    #[test]
    fn test_concave_polygon() {
        // L shape: the notch at top right is outside
        let poly = Polygon::new(vec![
            Position::new(0, 0),
            Position::new(100, 0),
            Position::new(100, 40),
            Position::new(40, 40),
            Position::new(40, 100),
            Position::new(0, 100),
        ]);
        assert!(poly.contains(Position::new(20, 80)));
        assert!(poly.contains(Position::new(80, 20)));
        assert!(!poly.contains(Position::new(80, 80)));
    }

    #[test]
    fn test_degenerate_polygon() {
        let line = Polygon::new(vec![Position::new(0, 0), Position::new(10, 10)]);
        assert!(!line.contains(Position::new(5, 5)));
        assert!(Polygon::default().bounds().is_none());
    }

    #[test]
    fn test_circle_samples() {
        let samples = circle_samples(Position::new(1000, 1000), 100);
        let samples: Vec<Position> = samples.iter().map(|s| s.unwrap()).collect();
        assert_eq!(samples[0], Position::new(1100, 1000));
        assert_eq!(samples[2], Position::new(1000, 1100));
        assert_eq!(samples[4], Position::new(900, 1000));
        assert_eq!(samples[6], Position::new(1000, 900));
        // 45 degrees: 100 * cos(pi/4) = 70.71, truncated
        assert_eq!(samples[1], Position::new(1070, 1070));
    }

    #[test]
    fn test_circle_samples_negative_center_truncates_toward_zero() {
        let samples = circle_samples(Position::new(-1000, -1000), 100);
        let samples: Vec<Position> = samples.iter().map(|s| s.unwrap()).collect();
        assert_eq!(samples[0], Position::new(-900, -1000));
        assert_eq!(samples[2], Position::new(-1000, -900));
        assert_eq!(samples[4], Position::new(-1100, -1000));
        assert_eq!(samples[6], Position::new(-1000, -1100));
        // -929.29 truncates to -929, flooring would give -930
        assert_eq!(samples[1], Position::new(-929, -929));
        assert_eq!(samples[3], Position::new(-1070, -929));
        assert_eq!(samples[5], Position::new(-1070, -1070));
        assert_eq!(samples[7], Position::new(-929, -1070));
    }

    #[test]
    fn test_circle_samples_overflow() {
        let samples = circle_samples(Position::new(i32::MAX - 10, 0), 1_000);
        assert!(samples[0].is_none());
        assert!(samples[4].is_some());
    }
}
