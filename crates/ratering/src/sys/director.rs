use crate::config::{self, CardConfig, Config};
use crate::events::{AppEvent, CardInfo};
use async_channel::{Receiver, Sender, TrySendError};
use ratekit::control::Command;
use ratekit::{Animator, BandTable, Frame, FrameSink, RatingData};
use std::sync::Arc;

/// Forwards frames of one card to the GTK side. Intermediate frames are
/// dropped when the queue is full; the final frame is held back and sent
/// from `flush` instead.
struct ChannelSink {
    generation: u64,
    card: usize,
    events: Sender<AppEvent>,
    pending: Option<AppEvent>,
}

impl FrameSink for ChannelSink {
    fn present(&mut self, frame: Frame) {
        let last = frame.is_final();
        let event = AppEvent::Frame {
            generation: self.generation,
            card: self.card,
            frame,
        };
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) if last => self.pending = Some(event),
            Err(_) => log::trace!("Dropped frame for card {}", self.card),
        }
    }

    fn flush(&mut self) -> impl Future<Output = ()> + Send {
        let pending = self.pending.take();
        let events = self.events.clone();
        async move {
            if let Some(event) = pending {
                let _ = events.send(event).await;
            }
        }
    }
}

pub fn card_info(
    data: &RatingData,
    card: &CardConfig,
    config: &Config,
    table: &BandTable,
) -> CardInfo {
    let stats = data.stats(card.contest);
    CardInfo {
        contest: card.contest,
        stat: card.stat,
        target: stats.stat(card.stat),
        contests: stats.contests,
        progress: stats.progress(config.goal),
        current_color: table.band_for(stats.current).color,
        goal_color: table.band_for(config.goal).color,
    }
}

/// Owns one animator per configured card and replays them on reload.
pub struct Director {
    config: Config,
    table: Arc<BandTable>,
    animators: Vec<Animator>,
    generation: u64,
    events: Sender<AppEvent>,
}

impl Director {
    pub fn new(config: Config, events: Sender<AppEvent>) -> Self {
        Self {
            table: Arc::new(config.band_table()),
            config,
            animators: Vec::new(),
            generation: 0,
            events,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Swaps in a new config. Running animations are cancelled.
    pub fn apply_config(&mut self, config: Config) {
        self.table = Arc::new(config.band_table());
        self.config = config;
        self.animators.clear();
    }

    /// Loads rating data and restarts every card from zero. Returns `false`
    /// once the GTK side has gone away.
    pub async fn replay(&mut self) -> bool {
        self.generation += 1;
        let generation = self.generation;

        let (data, source) = RatingData::load_or_fallback(
            &self.config.data_path(),
            self.config.username.clone(),
            self.config.goal,
        );
        let cards: Vec<CardInfo> = self
            .config
            .cards
            .iter()
            .map(|card| card_info(&data, card, &self.config, &self.table))
            .collect();

        let announce = AppEvent::Cards {
            generation,
            size: self.config.size,
            cards: cards.clone(),
            source,
            last_updated: data.last_updated.clone(),
        };
        if self.events.send(announce).await.is_err() {
            return false;
        }

        let spec = self.config.animation_spec();
        let table = self.table.clone();
        self.animators.truncate(cards.len());
        let missing = cards.len() - self.animators.len();
        self.animators
            .extend((0..missing).map(|_| Animator::new(table.clone(), spec)));

        for (card, (animator, info)) in self.animators.iter_mut().zip(&cards).enumerate() {
            animator.set_spec(spec);
            let sink = ChannelSink {
                generation,
                card,
                events: self.events.clone(),
                pending: None,
            };

            let handle = match animator.animate(info.target, sink) {
                Ok(h) => h,
                Err(e) => {
                    log::error!("Failed to animate card {}: {}", card, e);
                    continue;
                }
            };

            let events = self.events.clone();
            tokio::spawn(async move {
                let completion = handle.finished().await;
                let _ = events
                    .send(AppEvent::AnimationDone {
                        generation,
                        card,
                        completion,
                    })
                    .await;
            });
        }

        log::info!(
            "Replaying {} card(s) from {} (generation {})",
            cards.len(),
            source,
            generation
        );
        true
    }
}

pub async fn run_director(commands: Receiver<Command>, events: Sender<AppEvent>) {
    let mut director = Director::new(config::load_or_default(), events.clone());
    if !director.replay().await {
        return;
    }

    while let Ok(command) = commands.recv().await {
        let alive = match command {
            Command::Show => events.send(AppEvent::Show).await.is_ok(),
            Command::Hide => events.send(AppEvent::Hide).await.is_ok(),
            Command::Reload => {
                // editors tend to emit several change events per save
                while let Ok(Command::Reload) = commands.try_recv() {}
                director.apply_config(config::load_or_default());
                director.replay().await
            }
        };
        if !alive {
            break;
        }
    }
}
