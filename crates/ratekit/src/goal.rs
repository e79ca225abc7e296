use crate::rating::{LAYER_SPAN, Rating};

/// Points represented by one tile inside a colour band.
pub const TILE_SPAN: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalProgress {
    pub current: Rating,
    pub target: Rating,
    pub tiles_current: u32,
    pub tiles_target: u32,
    pub percent_to_target: u32,
    pub remaining: u32,
    pub achieved: bool,
}

/// Tiles shown for a rating: one per started 100 points within its band.
pub fn tiles(rating: Rating) -> u32 {
    (rating.value() % LAYER_SPAN) / TILE_SPAN + 1
}

impl GoalProgress {
    pub fn new(current: Rating, target: Rating) -> Self {
        let (cur, tgt) = (current.value(), target.value());
        let percent_to_target = if tgt == 0 {
            0
        } else {
            (cur.min(tgt) as u64 * 100 / tgt as u64) as u32
        };
        let remaining = tgt.saturating_sub(cur);

        Self {
            current,
            target,
            tiles_current: tiles(current),
            tiles_target: tiles(target),
            percent_to_target,
            remaining,
            achieved: remaining == 0,
        }
    }
}
