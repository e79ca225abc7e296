//! Stacked ring geometry.
//!
//! Every 400 rating points is one layer. Full layers are drawn as discs, the
//! topmost partial layer as a pie slice starting at 12 o'clock and sweeping
//! clockwise. Layers are painted bottom-up over a neutral background disc.

use crate::band::BandTable;
use crate::rating::{LAYER_SPAN, Rating};
use palette::Srgb;
use std::f64::consts::PI;

pub const BACKGROUND_COLOR: Srgb<u8> = Srgb::new(0x2b, 0x2b, 0x2b);
/// Gap between the drawing bounds and the ring.
pub const RING_INSET: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Converts a clock angle (0° at 12 o'clock, clockwise) into canvas radians.
pub fn clock_radians(angle_deg: f64) -> f64 {
    (angle_deg - 90.0) * PI / 180.0
}

pub fn point_at(center: Point, radius: f64, angle_deg: f64) -> Point {
    let rad = clock_radians(angle_deg);
    Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sector {
    Disc {
        center: Point,
        radius: f64,
    },
    Slice {
        center: Point,
        radius: f64,
        start_deg: f64,
        sweep_deg: f64,
        start: Point,
        end: Point,
        large_arc: bool,
    },
}

/// Filled sector from `start_deg` spanning `sweep_deg`; `None` when empty.
pub fn sector(center: Point, radius: f64, start_deg: f64, sweep_deg: f64) -> Option<Sector> {
    if sweep_deg <= 0.0 {
        return None;
    }
    if sweep_deg >= 360.0 {
        return Some(Sector::Disc { center, radius });
    }

    Some(Sector::Slice {
        center,
        radius,
        start_deg,
        sweep_deg,
        start: point_at(center, radius, start_deg),
        end: point_at(center, radius, start_deg + sweep_deg),
        large_arc: sweep_deg > 180.0,
    })
}

impl Sector {
    pub fn center(&self) -> Point {
        match self {
            Self::Disc { center, .. } | Self::Slice { center, .. } => *center,
        }
    }

    pub fn radius(&self) -> f64 {
        match self {
            Self::Disc { radius, .. } | Self::Slice { radius, .. } => *radius,
        }
    }

    /// Start and end angle in canvas radians.
    pub fn radians(&self) -> (f64, f64) {
        match self {
            Self::Disc { .. } => (0.0, 2.0 * PI),
            Self::Slice {
                start_deg,
                sweep_deg,
                ..
            } => (clock_radians(*start_deg), clock_radians(start_deg + sweep_deg)),
        }
    }

    pub fn svg_path(&self) -> String {
        match self {
            Self::Disc { center, radius } => {
                let (top, bottom) = (center.y - radius, center.y + radius);
                format!(
                    "M {cx:.2} {top:.2} A {r:.2} {r:.2} 0 1 1 {cx:.2} {bottom:.2} \
                     A {r:.2} {r:.2} 0 1 1 {cx:.2} {top:.2} Z",
                    cx = center.x,
                    r = radius,
                )
            }
            Self::Slice {
                center,
                radius,
                start,
                end,
                large_arc,
                ..
            } => format!(
                "M {:.2} {:.2} L {:.2} {:.2} A {r:.2} {r:.2} 0 {} 1 {:.2} {:.2} Z",
                center.x,
                center.y,
                start.x,
                start.y,
                u8::from(*large_arc),
                end.x,
                end.y,
                r = radius,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingLayer {
    pub index: usize,
    pub color: Srgb<u8>,
    pub sweep_degrees: f64,
    /// Extra whole-layer rotation, only ever set on the spinning top layer.
    pub rotation_degrees: Option<f64>,
}

impl RatingLayer {
    pub fn is_full(&self) -> bool {
        self.sweep_degrees >= 360.0
    }

    pub fn sector(&self, center: Point, radius: f64) -> Option<Sector> {
        sector(center, radius, 0.0, self.sweep_degrees)
    }
}

/// Layers for `rating`, bottom first.
///
/// The top layer spins (`rotation_progress_for_top * 360°`) only once the
/// ring has as many layers as the animation target will have.
pub fn layers_for(
    table: &BandTable,
    rating: Rating,
    rotation_progress_for_top: f64,
    total_layers_at_target: u32,
) -> Vec<RatingLayer> {
    let value = rating.value() as f64;
    let span = LAYER_SPAN as f64;
    let layers_to_show = rating.layer_count();

    (0..layers_to_show)
        .map(|layer| {
            let layer_end = (layer as f64 + 1.0) * span;
            let sweep_degrees = if value >= layer_end {
                360.0
            } else {
                (value - layer as f64 * span) / span * 360.0
            };

            let spinning = layer == layers_to_show - 1 && layers_to_show == total_layers_at_target;
            let rotation_degrees =
                (spinning && rotation_progress_for_top > 0.0).then(|| rotation_progress_for_top * 360.0);

            RatingLayer {
                index: layer as usize,
                color: table.layer_color(layer as usize),
                sweep_degrees,
                rotation_degrees,
            }
        })
        .collect()
}

/// Ring radius for a square drawing area of side `size`.
pub fn ring_radius(size: f64) -> f64 {
    (size / 2.0 - RING_INSET).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_multiples_of_span_are_all_full() {
        let table = BandTable::atcoder();
        for k in 1..=12 {
            let rating = Rating::new(400 * k);
            let layers = layers_for(&table, rating, 0.0, rating.layer_count());
            assert_eq!(layers.len(), k as usize);
            assert!(layers.iter().all(RatingLayer::is_full));
            assert!(layers.iter().all(|l| l.rotation_degrees.is_none()));
        }
    }

    #[test]
    fn test_single_partial_layer() {
        let table = BandTable::atcoder();
        let layers = layers_for(&table, Rating::new(399), 0.0, 1);
        assert_eq!(layers.len(), 1);
        assert!(approx(layers[0].sweep_degrees, 399.0 / 400.0 * 360.0));
        assert!(approx(layers[0].sweep_degrees, 359.1));
    }

    #[test]
    fn test_zero_rating_draws_nothing() {
        let table = BandTable::atcoder();
        let layers = layers_for(&table, Rating::ZERO, 0.0, 1);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].sweep_degrees, 0.0);
        assert!(layers[0].sector(Point::default(), 50.0).is_none());
    }

    #[test]
    fn test_layers_are_pure() {
        let table = BandTable::atcoder();
        let a = layers_for(&table, Rating::new(1241), 0.3, 4);
        let b = layers_for(&table, Rating::new(1241), 0.3, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_top_layer_spin() {
        let table = BandTable::atcoder();
        let layers = layers_for(&table, Rating::new(900), 0.5, 3);
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0].rotation_degrees, None);
        assert_eq!(layers[1].rotation_degrees, None);
        assert_eq!(layers[2].rotation_degrees, Some(180.0));
        assert!(approx(layers[2].sweep_degrees, (900.0 - 800.0) / 400.0 * 360.0));

        // Not yet at the target's layer count: no spin.
        let early = layers_for(&table, Rating::new(500), 0.5, 3);
        assert!(early.iter().all(|l| l.rotation_degrees.is_none()));
    }

    #[test]
    fn test_huge_rating_keeps_stacking() {
        let table = BandTable::atcoder();
        let rating = Rating::new(40_001);
        let layers = layers_for(&table, rating, 0.0, 1);
        assert_eq!(layers.len(), 101);
        assert_eq!(layers[100].color, table.layer_color(7));
        assert!(approx(layers[100].sweep_degrees, 0.9));
    }

    #[test]
    fn test_sector_shapes() {
        let center = Point::new(100.0, 100.0);
        assert!(sector(center, 90.0, 0.0, 0.0).is_none());
        assert!(sector(center, 90.0, 0.0, -3.0).is_none());
        assert_eq!(
            sector(center, 90.0, 0.0, 360.0),
            Some(Sector::Disc {
                center,
                radius: 90.0
            })
        );

        let Some(Sector::Slice {
            start,
            end,
            large_arc,
            ..
        }) = sector(center, 90.0, 0.0, 90.0)
        else {
            panic!("expected a slice");
        };
        assert!(approx(start.x, 100.0) && approx(start.y, 10.0));
        assert!(approx(end.x, 190.0) && approx(end.y, 100.0));
        assert!(!large_arc);

        let Some(Sector::Slice { large_arc, .. }) = sector(center, 90.0, 0.0, 180.5) else {
            panic!("expected a slice");
        };
        assert!(large_arc);
    }

    #[test]
    fn test_svg_path() {
        let slice = sector(Point::new(50.0, 50.0), 40.0, 0.0, 180.0).unwrap();
        assert_eq!(
            slice.svg_path(),
            "M 50.00 50.00 L 50.00 10.00 A 40.00 40.00 0 0 1 50.00 90.00 Z"
        );
        let disc = sector(Point::new(50.0, 50.0), 40.0, 0.0, 400.0).unwrap();
        assert!(disc.svg_path().starts_with("M 50.00 10.00 A 40.00 40.00 0 1 1 50.00 90.00"));
    }
}
