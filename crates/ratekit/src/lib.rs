//! Rating ring engine: colour bands, contrast, stacked ring geometry and the
//! count-up animator, plus the rating data model.

pub mod macros;

pub mod animator;
pub mod band;
pub mod contrast;
pub mod control;
pub mod data;
pub mod geometry;
pub mod goal;
pub mod rating;
pub mod svg;

pub use animator::{AnimationHandle, AnimationSpec, Animator, Completion, Frame, FrameSink, Phase};
pub use band::{BandTable, ColorBand};
pub use contrast::{Contrast, ShadowStrength, contrast_for};
pub use data::{ContestType, RatingData, Stat};
pub use geometry::{RatingLayer, layers_for};
pub use goal::GoalProgress;
pub use rating::Rating;
