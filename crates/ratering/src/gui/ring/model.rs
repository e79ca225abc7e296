use crate::events::CardInfo;
use crate::gui::ring::{
    CARD_GAP, CARD_PADDING, FOOTER_GAP, FOOTER_HEIGHT, HEADER_HEIGHT, MIN_SIZE, STATUS_HEIGHT,
};
use ratekit::animator::PULSE_DURATION;
use ratekit::data::DataSource;
use ratekit::geometry::Point;
use ratekit::{Completion, ContestType, Frame, Stat};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Card {
    pub info: CardInfo,
    /// Latest presented frame; `None` until the first one arrives.
    pub frame: Option<Frame>,
    pub pulse_until: Option<Instant>,
    pub completion: Option<Completion>,
}

impl Card {
    pub fn new(info: CardInfo) -> Self {
        Self {
            info,
            frame: None,
            pulse_until: None,
            completion: None,
        }
    }

    pub fn title(&self) -> String {
        let contest = match self.info.contest {
            ContestType::Algorithm => "Algorithm",
            ContestType::Heuristic => "Heuristic",
        };
        match self.info.stat {
            Stat::Current => contest.to_string(),
            Stat::Highest => format!("{} · highest", contest),
            Stat::Performance => format!("{} · best perf", contest),
        }
    }

    pub fn is_pulsing(&self, now: Instant) -> bool {
        self.pulse_until.is_some_and(|until| now < until)
    }

    /// Tiles and progress only appear once the count-up has finished.
    pub fn is_revealed(&self) -> bool {
        self.completion == Some(Completion::Finished)
    }

    /// Goal tracking only makes sense against the current rating.
    pub fn shows_goal(&self) -> bool {
        self.info.stat == Stat::Current
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameAction {
    pub should_redraw: bool,
    pub pulse_started: bool,
}

pub struct State {
    pub size: f64,
    pub generation: u64,
    pub cards: Vec<Card>,
    pub source: Option<DataSource>,
    pub last_updated: Option<String>,
}

impl State {
    pub fn new(size: f64) -> Self {
        Self {
            size: Self::clamp_size(size),
            generation: 0,
            cards: Vec::new(),
            source: None,
            last_updated: None,
        }
    }

    fn clamp_size(size: f64) -> f64 {
        if size.is_finite() { size.max(MIN_SIZE) } else { MIN_SIZE }
    }

    /// Replaces every card for a new run. Returns whether the canvas size changed.
    pub fn set_cards(
        &mut self,
        generation: u64,
        size: f64,
        cards: Vec<CardInfo>,
        source: DataSource,
        last_updated: Option<String>,
    ) -> bool {
        if generation < self.generation {
            return false;
        }
        let before = self.canvas_size();
        self.generation = generation;
        self.size = Self::clamp_size(size);
        self.cards = cards.into_iter().map(Card::new).collect();
        self.source = Some(source);
        self.last_updated = last_updated;
        before != self.canvas_size()
    }

    pub fn apply_frame(
        &mut self,
        generation: u64,
        card: usize,
        frame: Frame,
        now: Instant,
    ) -> FrameAction {
        if generation != self.generation {
            log::trace!("Dropping frame from generation {}", generation);
            return FrameAction::default();
        }
        let Some(slot) = self.cards.get_mut(card) else {
            return FrameAction::default();
        };

        let pulse_started = frame.is_final();
        if pulse_started {
            slot.pulse_until = Some(now + PULSE_DURATION);
        }
        slot.frame = Some(frame);
        FrameAction {
            should_redraw: true,
            pulse_started,
        }
    }

    /// Records how a card's run ended. Returns whether anything visible changed.
    pub fn finish(&mut self, generation: u64, card: usize, completion: Completion) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.cards.get_mut(card) {
            Some(slot) if slot.completion.is_none() => {
                slot.completion = Some(completion);
                completion == Completion::Finished
            }
            _ => false,
        }
    }

    pub fn card_width(&self) -> f64 {
        self.size + 2.0 * CARD_PADDING
    }

    pub fn card_height(&self) -> f64 {
        2.0 * CARD_PADDING + HEADER_HEIGHT + self.size + FOOTER_GAP + FOOTER_HEIGHT
    }

    pub fn card_origin(&self, index: usize) -> Point {
        Point::new(index as f64 * (self.card_width() + CARD_GAP), 0.0)
    }

    pub fn ring_center(&self, index: usize) -> Point {
        let origin = self.card_origin(index);
        Point::new(
            origin.x + CARD_PADDING + self.size / 2.0,
            origin.y + CARD_PADDING + HEADER_HEIGHT + self.size / 2.0,
        )
    }

    /// Pixel size of the drawing area; one card wide even when empty.
    pub fn canvas_size(&self) -> (i32, i32) {
        let n = self.cards.len().max(1) as f64;
        let width = n * self.card_width() + (n - 1.0) * CARD_GAP;
        let height = self.card_height() + STATUS_HEIGHT;
        (width.ceil() as i32, height.ceil() as i32)
    }
}
