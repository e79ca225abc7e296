pub mod model;
pub mod view;

pub use model::{Card, FrameAction, State};
pub use view::draw;

pub const MIN_SIZE: f64 = 64.0;
pub const CARD_PADDING: f64 = 14.0;
pub const CARD_GAP: f64 = 12.0;
pub const CORNER_RADIUS: f64 = 14.0;
pub const HEADER_HEIGHT: f64 = 22.0;
pub const HEADER_FONT_SIZE: f64 = 13.0;
pub const LABEL_FONT_FACTOR: f64 = 0.22; // of the ring box side
pub const LABEL_OUTLINE_WIDTH: f64 = 0.8;
pub const FOOTER_GAP: f64 = 8.0;
pub const FOOTER_FONT_SIZE: f64 = 11.0;
pub const ROW_GAP: f64 = 6.0;
pub const TILE_SIZE: f64 = 8.0;
pub const TILE_GAP: f64 = 2.0;
pub const TILE_TARGET_ALPHA: f64 = 0.28;
pub const TILE_STACK_GAP: f64 = 8.0;
pub const PROGRESS_HEIGHT: f64 = 4.0;
pub const FOOTER_HEIGHT: f64 =
    FOOTER_FONT_SIZE + ROW_GAP + TILE_SIZE + ROW_GAP + PROGRESS_HEIGHT + ROW_GAP + FOOTER_FONT_SIZE;
pub const STATUS_HEIGHT: f64 = 20.0;
pub const STATUS_FONT_SIZE: f64 = 11.0;
