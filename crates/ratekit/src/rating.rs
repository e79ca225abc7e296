use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Points covered by one full layer of the ring.
pub const LAYER_SPAN: u32 = 400;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Rating(u32);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatingError {
    #[error("Rating must not be negative (got {0})")]
    Negative(f64),
    #[error("Rating must be a finite number (got {0})")]
    NotFinite(f64),
    #[error("Rating is too large (got {0})")]
    TooLarge(f64),
    #[error("Invalid rating '{0}'")]
    Unparsable(String),
}

impl Rating {
    pub const ZERO: Rating = Rating(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Validates an untrusted number. Fractions are truncated toward zero.
    pub fn checked(value: f64) -> Result<Self, RatingError> {
        if !value.is_finite() {
            return Err(RatingError::NotFinite(value));
        }
        if value < 0.0 {
            return Err(RatingError::Negative(value));
        }
        if value > u32::MAX as f64 {
            return Err(RatingError::TooLarge(value));
        }
        Ok(Self(value as u32))
    }

    /// `max(1, ceil(rating / 400))`
    pub fn layer_count(self) -> u32 {
        self.0.div_ceil(LAYER_SPAN).max(1)
    }

    pub fn has_partial_top_layer(self) -> bool {
        self.0 % LAYER_SPAN != 0
    }
}

impl TryFrom<f64> for Rating {
    type Error = RatingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::checked(value)
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(Self).map_err(|_| {
            if value < 0 {
                RatingError::Negative(value as f64)
            } else {
                RatingError::TooLarge(value as f64)
            }
        })
    }
}

impl FromStr for Rating {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| RatingError::Unparsable(s.to_string()))?;
        Self::checked(value)
    }
}
