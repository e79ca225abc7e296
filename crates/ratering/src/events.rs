use palette::Srgb;
use ratekit::data::DataSource;
use ratekit::{Completion, ContestType, Frame, GoalProgress, Rating, Stat};

/// What a card shows once its data is known, before any frame arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct CardInfo {
    pub contest: ContestType,
    pub stat: Stat,
    pub target: Rating,
    pub contests: u32,
    pub progress: GoalProgress,
    /// Band colours of the current rating and of the goal, for the tiles.
    pub current_color: Srgb<u8>,
    pub goal_color: Srgb<u8>,
}

/// Events for the GTK side. `generation` increases with every reload so
/// stragglers from a replaced run can be dropped.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Show,
    Hide,
    Cards {
        generation: u64,
        /// Ring diameter in pixels.
        size: f64,
        cards: Vec<CardInfo>,
        source: DataSource,
        last_updated: Option<String>,
    },
    Frame {
        generation: u64,
        card: usize,
        frame: Frame,
    },
    AnimationDone {
        generation: u64,
        card: usize,
        completion: Completion,
    },
}
