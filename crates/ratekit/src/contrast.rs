use palette::{Srgb, Srgba};
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};

/// Above this luminance a colour counts as a light background.
pub const OUTLINE_THRESHOLD: f64 = 0.179;
/// Separate, coarser cut used only for the drop shadow.
pub const SHADOW_THRESHOLD: f64 = 0.5;

const DARK_OUTLINE: Srgba<f64> = Srgba::new(0.0, 0.0, 0.0, 0.7);
const LIGHT_OUTLINE: Srgba<f64> = Srgba::new(1.0, 1.0, 1.0, 0.85);

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum ShadowStrength {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub offset: f64,
    pub blur: f64,
    pub alpha: f64,
}

impl ShadowStrength {
    pub fn shadow(self) -> Shadow {
        match self {
            Self::Dark => Shadow {
                offset: 2.0,
                blur: 6.0,
                alpha: 0.45,
            },
            Self::Light => Shadow {
                offset: 1.0,
                blur: 4.0,
                alpha: 0.25,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contrast {
    pub outline: Srgba<f64>,
    pub shadow: ShadowStrength,
}

impl Contrast {
    pub fn is_dark_outline(&self) -> bool {
        self.outline == DARK_OUTLINE
    }
}

impl Default for Contrast {
    fn default() -> Self {
        Self {
            outline: LIGHT_OUTLINE,
            shadow: ShadowStrength::Light,
        }
    }
}

fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn relative_luminance(color: Srgb<u8>) -> f64 {
    0.2126 * linearize(color.red) + 0.7152 * linearize(color.green) + 0.0722 * linearize(color.blue)
}

pub fn contrast_for_color(color: Srgb<u8>) -> Contrast {
    let lum = relative_luminance(color);
    Contrast {
        outline: if lum > OUTLINE_THRESHOLD {
            DARK_OUTLINE
        } else {
            LIGHT_OUTLINE
        },
        shadow: if lum > SHADOW_THRESHOLD {
            ShadowStrength::Dark
        } else {
            ShadowStrength::Light
        },
    }
}

/// Accepts `#rgb`, `#rrggbb` or either without the hash. Anything else gets
/// the light-outline default.
pub fn contrast_for(hex: &str) -> Contrast {
    match Srgb::<u8>::from_str(hex.trim()) {
        Ok(color) => contrast_for_color(color),
        Err(e) => {
            log::debug!("Unparsable colour '{}' ({}), using default contrast", hex, e);
            Contrast::default()
        }
    }
}
