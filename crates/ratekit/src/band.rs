use crate::rating::Rating;
use palette::Srgb;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Upper bound stored for the open-ended top band.
pub const OPEN_BAND_MAX: u32 = 9999;

#[derive(Debug, Clone, PartialEq)]
pub struct ColorBand {
    pub min: u32,
    pub max: u32,
    pub color: Srgb<u8>,
    pub label: String,
    pub class: String,
}

impl ColorBand {
    pub fn new(min: u32, max: u32, color: Srgb<u8>, label: &str) -> Self {
        Self {
            min,
            max,
            color,
            label: label.to_string(),
            class: format!("rating-{}", label.to_lowercase()),
        }
    }

    pub fn contains(&self, rating: Rating) -> bool {
        (self.min..=self.max).contains(&rating.value())
    }

    pub fn hex(&self) -> String {
        to_hex(self.color)
    }
}

pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// A band as written in configuration files, colour given as hex.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BandSpec {
    pub min: u32,
    pub max: u32,
    pub color: String,
    pub label: String,
    #[serde(default)]
    pub class: Option<String>,
}

#[derive(Error, Debug, PartialEq)]
pub enum BandTableError {
    #[error("Band table is empty")]
    Empty,
    #[error("First band must start at 0 (starts at {0})")]
    FirstNotZero(u32),
    #[error("Band '{label}' has min {min} greater than max {max}")]
    Inverted { label: String, min: u32, max: u32 },
    #[error("Band '{label}' starts at {min} but previous band ends at {prev_max}")]
    Gap {
        label: String,
        min: u32,
        prev_max: u32,
    },
    #[error("Band '{label}' has invalid colour '{color}'")]
    Color { label: String, color: String },
}

/// Ordered, contiguous rating bands. Read-only once built; share it with `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    bands: Vec<ColorBand>,
}

impl BandTable {
    pub fn new(bands: Vec<ColorBand>) -> Result<Self, BandTableError> {
        let first = bands.first().ok_or(BandTableError::Empty)?;
        if first.min != 0 {
            return Err(BandTableError::FirstNotZero(first.min));
        }

        for band in &bands {
            if band.min > band.max {
                return Err(BandTableError::Inverted {
                    label: band.label.clone(),
                    min: band.min,
                    max: band.max,
                });
            }
        }

        if let Some(pair) = bands
            .windows(2)
            .find(|pair| pair[1].min != pair[0].max.saturating_add(1))
        {
            return Err(BandTableError::Gap {
                label: pair[1].label.clone(),
                min: pair[1].min,
                prev_max: pair[0].max,
            });
        }

        Ok(Self { bands })
    }

    pub fn from_specs(specs: &[BandSpec]) -> Result<Self, BandTableError> {
        let bands = specs
            .iter()
            .map(|spec| {
                let color =
                    Srgb::<u8>::from_str(spec.color.trim()).map_err(|_| BandTableError::Color {
                        label: spec.label.clone(),
                        color: spec.color.clone(),
                    })?;
                let mut band = ColorBand::new(spec.min, spec.max, color, &spec.label);
                if let Some(class) = &spec.class {
                    band.class = class.clone();
                }
                Ok(band)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(bands)
    }

    /// The AtCoder colour scheme: eight bands of 400 points.
    pub fn atcoder() -> Self {
        const SCHEME: [((u8, u8, u8), &str); 8] = [
            ((0x80, 0x80, 0x80), "Gray"),
            ((0x80, 0x40, 0x00), "Brown"),
            ((0x00, 0x80, 0x00), "Green"),
            ((0x00, 0xc0, 0xc0), "Cyan"),
            ((0x00, 0x00, 0xff), "Blue"),
            ((0xc0, 0xc0, 0x00), "Yellow"),
            ((0xff, 0x80, 0x00), "Orange"),
            ((0xff, 0x00, 0x00), "Red"),
        ];
        let last = SCHEME.len() as u32 - 1;

        let bands = (0u32..)
            .zip(SCHEME)
            .map(|(i, ((r, g, b), label))| {
                let max = if i == last { OPEN_BAND_MAX } else { i * 400 + 399 };
                ColorBand::new(i * 400, max, Srgb::new(r, g, b), label)
            })
            .collect();
        Self { bands }
    }

    pub fn bands(&self) -> &[ColorBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Band containing `rating`. The last band is open upward; anything
    /// else that misses the table lands on band 0.
    pub fn band_for(&self, rating: Rating) -> &ColorBand {
        if let Some(band) = self.bands.iter().find(|b| b.contains(rating)) {
            return band;
        }
        match self.bands.last() {
            Some(last) if rating.value() > last.max => last,
            _ => &self.bands[0],
        }
    }

    pub fn band_for_signed(&self, rating: i64) -> &ColorBand {
        Rating::try_from(rating)
            .map(|r| self.band_for(r))
            .unwrap_or(&self.bands[0])
    }

    /// Colour of stacked layer `index`, reusing the last band past the end.
    pub fn layer_color(&self, index: usize) -> Srgb<u8> {
        self.bands[index.min(self.bands.len() - 1)].color
    }
}

impl Default for BandTable {
    fn default() -> Self {
        Self::atcoder()
    }
}
