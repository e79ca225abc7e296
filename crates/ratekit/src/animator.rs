//! Count-up animation of a rating ring.
//!
//! [`AnimationState`] is the pure frame-stepping state machine. [`Animator`]
//! drives one state per visual target on a Tokio interval, pushes every
//! [`Frame`] to a [`FrameSink`] and resolves an [`AnimationHandle`] exactly
//! once per `animate` call.

use crate::band::{BandTable, ColorBand};
use crate::contrast::{Contrast, contrast_for_color};
use crate::geometry::{RatingLayer, layers_for};
use crate::rating::Rating;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use strum::Display as StrumDisplay;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

pub const DEFAULT_DURATION_MS: f64 = 3000.0;
pub const DEFAULT_FRAME_RATE: f64 = 120.0;
pub const PULSE_SCALE: f64 = 1.15;
pub const PULSE_DURATION: Duration = Duration::from_millis(300);
/// Timer resolution floor; faster frame rates are rejected.
pub const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    #[error("Animation duration must be a non-negative number of milliseconds (got {0})")]
    Duration(f64),
    #[error("Frame rate must be a positive number (got {0})")]
    FrameRate(f64),
    #[error("Frame rate {0} gives no usable frame interval (at most 1000 fps)")]
    FrameInterval(f64),
    #[error("Animations need a running Tokio runtime")]
    NoRuntime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    duration_ms: f64,
    frame_rate: f64,
    frame_interval: Duration,
}

impl AnimationSpec {
    pub fn new(duration_ms: f64, frame_rate: f64) -> Result<Self, AnimationError> {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(AnimationError::Duration(duration_ms));
        }
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(AnimationError::FrameRate(frame_rate));
        }
        let frame_interval = Duration::try_from_secs_f64(1.0 / frame_rate)
            .ok()
            .filter(|interval| *interval >= MIN_FRAME_INTERVAL)
            .ok_or(AnimationError::FrameInterval(frame_rate))?;
        Ok(Self {
            duration_ms,
            frame_rate,
            frame_interval,
        })
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn total_frames(&self) -> u32 {
        (self.duration_ms / (1000.0 / self.frame_rate)).floor() as u32
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            frame_rate: DEFAULT_FRAME_RATE,
            frame_interval: Duration::from_secs_f64(1.0 / DEFAULT_FRAME_RATE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum Phase {
    Idle,
    Running,
    Completed,
}

/// Everything a surface needs to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: u32,
    pub eased: f64,
    pub rating: Rating,
    pub band: ColorBand,
    pub contrast: Contrast,
    pub rotation_progress: f64,
    pub layers: Vec<RatingLayer>,
    /// Set on the final frame only: scale the label by [`PULSE_SCALE`] for
    /// [`PULSE_DURATION`].
    pub pulse: bool,
}

impl Frame {
    fn compose(
        table: &BandTable,
        index: u32,
        eased: f64,
        rating: Rating,
        rotation_progress: f64,
        total_layers_at_target: u32,
    ) -> Self {
        let band = table.band_for(rating).clone();
        Self {
            index,
            eased,
            rating,
            contrast: contrast_for_color(band.color),
            band,
            rotation_progress,
            layers: layers_for(table, rating, rotation_progress, total_layers_at_target),
            pulse: false,
        }
    }

    /// The settled picture of `rating` with no animation in flight.
    pub fn at_rest(table: &BandTable, rating: Rating) -> Self {
        Self::compose(table, 0, 1.0, rating, 0.0, rating.layer_count())
    }

    pub fn is_final(&self) -> bool {
        self.pulse
    }
}

#[derive(Debug, Clone)]
pub struct AnimationState {
    target: Rating,
    elapsed_frames: u32,
    total_frames: u32,
    total_layers_at_target: u32,
    target_has_partial_top: bool,
    phase: Phase,
}

impl AnimationState {
    pub fn new(target: Rating, spec: AnimationSpec) -> Self {
        Self {
            target,
            elapsed_frames: 0,
            total_frames: spec.total_frames(),
            total_layers_at_target: target.layer_count(),
            target_has_partial_top: target.has_partial_top_layer(),
            phase: Phase::Idle,
        }
    }

    pub fn start(&mut self) {
        self.elapsed_frames = 0;
        self.phase = Phase::Running;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> Rating {
        self.target
    }

    pub fn elapsed_frames(&self) -> u32 {
        self.elapsed_frames
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn progress(&self) -> f64 {
        if self.total_frames == 0 {
            1.0
        } else {
            self.elapsed_frames as f64 / self.total_frames as f64
        }
    }

    /// Advances one frame. Returns `None` unless running.
    pub fn tick(&mut self, table: &BandTable) -> Option<Frame> {
        if self.phase != Phase::Running {
            return None;
        }

        self.elapsed_frames += 1;
        let progress = self.progress();

        if progress >= 1.0 {
            self.phase = Phase::Completed;
            return Some(self.final_frame(table));
        }

        let eased = ease_out_cubic(progress);
        let displayed = Rating::new((self.target.value() as f64 * eased).floor() as u32);

        let rotation = if self.target_has_partial_top
            && displayed.layer_count() == self.total_layers_at_target
        {
            eased
        } else {
            0.0
        };

        Some(Frame::compose(
            table,
            self.elapsed_frames,
            eased,
            displayed,
            rotation,
            self.total_layers_at_target,
        ))
    }

    // Lands exactly on the target and always completes the top layer's turn.
    fn final_frame(&self, table: &BandTable) -> Frame {
        let rotation = if self.target_has_partial_top {
            1.0
        } else {
            0.0
        };
        let mut frame = Frame::compose(
            table,
            self.elapsed_frames,
            1.0,
            self.target,
            rotation,
            self.total_layers_at_target,
        );
        frame.pulse = true;
        frame
    }
}

/// Receives frames in order from a running animation.
///
/// `present` runs under the run's lock and must not block. A sink that
/// defers delivery of the final frame can finish it in `flush`, which is
/// awaited without the lock before the run reports `Finished`.
pub trait FrameSink: Send + 'static {
    fn present(&mut self, frame: Frame);

    fn flush(&mut self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

impl<F> FrameSink for F
where
    F: FnMut(Frame) + Send + 'static,
{
    fn present(&mut self, frame: Frame) {
        self(frame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum Completion {
    /// The final frame was presented.
    Finished,
    /// A newer `animate` call on the same animator replaced this run.
    Superseded,
    /// `cancel` was called or the animator was dropped.
    Cancelled,
}

#[derive(Debug)]
pub struct AnimationHandle {
    rx: oneshot::Receiver<Completion>,
}

impl AnimationHandle {
    pub async fn finished(self) -> Completion {
        self.rx.await.unwrap_or(Completion::Cancelled)
    }

    /// Non-blocking check, `None` while the run is still in flight.
    pub fn try_finished(&mut self) -> Option<Completion> {
        match self.rx.try_recv() {
            Ok(c) => Some(c),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Completion::Cancelled),
        }
    }
}

struct RunShared {
    phase: Phase,
    done: Option<oneshot::Sender<Completion>>,
}

impl RunShared {
    /// First caller wins; the signal can only fire once.
    fn settle(&mut self, phase: Phase, completion: Completion) -> bool {
        match self.done.take() {
            Some(tx) => {
                self.phase = phase;
                let _ = tx.send(completion);
                true
            }
            None => false,
        }
    }
}

struct Run {
    target: Rating,
    task: JoinHandle<()>,
    shared: Arc<Mutex<RunShared>>,
}

/// Owns the animation of one visual target. Starting a new run stops the
/// previous one first, so two timers never draw to the same target.
pub struct Animator {
    table: Arc<BandTable>,
    spec: AnimationSpec,
    current: Option<Run>,
}

impl Animator {
    pub fn new(table: Arc<BandTable>, spec: AnimationSpec) -> Self {
        Self {
            table,
            spec,
            current: None,
        }
    }

    pub fn spec(&self) -> AnimationSpec {
        self.spec
    }

    pub fn set_spec(&mut self, spec: AnimationSpec) {
        self.spec = spec;
    }

    pub fn phase(&self) -> Phase {
        self.current
            .as_ref()
            .map_or(Phase::Idle, |run| run.shared.lock().phase)
    }

    pub fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    pub fn animate<S: FrameSink>(
        &mut self,
        target: Rating,
        sink: S,
    ) -> Result<AnimationHandle, AnimationError> {
        let runtime = Handle::try_current().map_err(|_| AnimationError::NoRuntime)?;

        self.stop(Completion::Superseded);

        let (tx, rx) = oneshot::channel();
        let shared = Arc::new(Mutex::new(RunShared {
            phase: Phase::Running,
            done: Some(tx),
        }));

        let mut state = AnimationState::new(target, self.spec);
        state.start();
        log::debug!(
            "Animating to {} over {} frames",
            target,
            state.total_frames()
        );

        let task = runtime.spawn(drive(
            state,
            self.table.clone(),
            self.spec.frame_interval(),
            shared.clone(),
            sink,
        ));

        self.current = Some(Run {
            target,
            task,
            shared,
        });
        Ok(AnimationHandle { rx })
    }

    pub fn cancel(&mut self) {
        self.stop(Completion::Cancelled);
    }

    fn stop(&mut self, completion: Completion) {
        if let Some(run) = self.current.take() {
            // settle before aborting so the task's exit guard finds nothing to fire
            if run.shared.lock().settle(Phase::Idle, completion) {
                log::debug!("Animation to {} stopped: {}", run.target, completion);
            }
            run.task.abort();
        }
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Settles the run as cancelled if the driving task ends without finishing,
/// whether aborted or unwinding from a panicking sink.
struct SettleOnExit(Arc<Mutex<RunShared>>);

impl Drop for SettleOnExit {
    fn drop(&mut self) {
        if self.0.lock().settle(Phase::Idle, Completion::Cancelled) {
            log::warn!("Animation task ended before its final frame");
        }
    }
}

enum Step {
    Continue,
    Landed,
    Stopped,
}

async fn drive<S: FrameSink>(
    mut state: AnimationState,
    table: Arc<BandTable>,
    period: Duration,
    shared: Arc<Mutex<RunShared>>,
    mut sink: S,
) {
    let _guard = SettleOnExit(shared.clone());

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick is immediate; frame one lands one period in.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match advance(&shared, &mut state, &table, &mut sink) {
            Step::Continue => {}
            Step::Landed => break,
            Step::Stopped => return,
        }
    }

    sink.flush().await;
    if shared.lock().settle(Phase::Completed, Completion::Finished) {
        log::debug!("Animation to {} finished", state.target());
    }
}

// Holds the lock while presenting so a stopped run cannot draw afterwards.
fn advance<S: FrameSink>(
    shared: &Mutex<RunShared>,
    state: &mut AnimationState,
    table: &BandTable,
    sink: &mut S,
) -> Step {
    let guard = shared.lock();
    if guard.done.is_none() {
        return Step::Stopped;
    }

    let Some(frame) = state.tick(table) else {
        return Step::Stopped;
    };
    sink.present(frame);
    drop(guard);

    if state.phase() == Phase::Completed {
        Step::Landed
    } else {
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect() -> (Arc<Mutex<Vec<Frame>>>, impl FrameSink) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink_frames = frames.clone();
        (frames, move |frame: Frame| sink_frames.lock().push(frame))
    }

    fn run_to_end(target: u32) -> Vec<Frame> {
        let table = BandTable::atcoder();
        let mut state = AnimationState::new(Rating::new(target), AnimationSpec::default());
        state.start();
        std::iter::from_fn(|| state.tick(&table)).collect()
    }

    #[test]
    fn test_spec_frames() {
        let spec = AnimationSpec::default();
        assert_eq!(spec.total_frames(), 360);
        assert_eq!(AnimationSpec::new(2500.0, 120.0).unwrap().total_frames(), 300);
        assert!(AnimationSpec::new(-1.0, 120.0).is_err());
        assert!(AnimationSpec::new(3000.0, 0.0).is_err());
        assert!(AnimationSpec::new(f64::NAN, 60.0).is_err());
        assert_eq!(
            AnimationSpec::default().frame_interval(),
            AnimationSpec::new(3000.0, 120.0).unwrap().frame_interval()
        );
    }

    #[test]
    fn test_spec_rejects_unusable_intervals() {
        assert_eq!(
            AnimationSpec::new(3000.0, 1e10),
            Err(AnimationError::FrameInterval(1e10))
        );
        assert_eq!(
            AnimationSpec::new(3000.0, 1e-300),
            Err(AnimationError::FrameInterval(1e-300))
        );
        assert!(AnimationSpec::new(3000.0, 1001.0).is_err());
        assert_eq!(
            AnimationSpec::new(3000.0, 1000.0).unwrap().frame_interval(),
            MIN_FRAME_INTERVAL
        );
    }

    #[test]
    fn test_ease_out_cubic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(0.5), 0.875);
    }

    #[test]
    fn test_state_machine() {
        let table = BandTable::atcoder();
        let mut state = AnimationState::new(Rating::new(1241), AnimationSpec::default());
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.tick(&table).is_none());

        state.start();
        assert_eq!(state.phase(), Phase::Running);
        let frames: Vec<_> = std::iter::from_fn(|| state.tick(&table)).collect();
        assert_eq!(state.phase(), Phase::Completed);
        assert_eq!(frames.len(), 360);
        assert!(state.tick(&table).is_none());

        let indices: Vec<_> = frames.iter().map(|f| f.index).collect();
        assert!(indices.windows(2).all(|w| w[1] == w[0] + 1));
        assert!(frames.windows(2).all(|w| w[0].rating <= w[1].rating));
    }

    #[test]
    fn test_final_frame_lands_exactly() {
        let frames = run_to_end(1241);
        let last = frames.last().unwrap();
        assert!(last.is_final());
        assert_eq!(frames.iter().filter(|f| f.pulse).count(), 1);
        assert_eq!(last.rating, Rating::new(1241));
        assert_eq!(last.band.label, "Cyan");
        assert_eq!(last.rotation_progress, 1.0);
        assert_eq!(last.layers.len(), 4);
        assert_eq!(last.layers[3].rotation_degrees, Some(360.0));
    }

    #[test]
    fn test_zero_target_stays_zero() {
        let frames = run_to_end(0);
        assert!(frames.iter().all(|f| f.rating == Rating::ZERO));
        assert!(frames.iter().all(|f| f.rotation_progress == 0.0));
        assert!(frames.last().unwrap().is_final());
    }

    #[test]
    fn test_exact_multiple_never_spins() {
        let frames = run_to_end(800);
        assert!(frames.iter().all(|f| f.rotation_progress == 0.0));
        assert!(
            frames
                .iter()
                .flat_map(|f| &f.layers)
                .all(|l| l.rotation_degrees.is_none())
        );
        let last = frames.last().unwrap();
        assert_eq!(last.layers.len(), 2);
        assert!(last.layers.iter().all(RatingLayer::is_full));
    }

    #[test]
    fn test_partial_top_layer_spins_with_easing() {
        let frames = run_to_end(1000);
        let mut spinning = 0;
        for frame in frames.iter().filter(|f| !f.is_final()) {
            if frame.layers.len() == 3 {
                spinning += 1;
                let top = &frame.layers[2];
                assert_eq!(top.rotation_degrees, Some(frame.eased * 360.0));
                let expected = (frame.rating.value() as f64 - 800.0) / 400.0 * 360.0;
                assert!((top.sweep_degrees - expected).abs() < 1e-9);
            } else {
                assert_eq!(frame.rotation_progress, 0.0);
            }
        }
        assert!(spinning > 0);
    }

    #[test]
    fn test_zero_frame_spec_completes_on_first_tick() {
        let table = BandTable::atcoder();
        let spec = AnimationSpec::new(0.0, 120.0).unwrap();
        let mut state = AnimationState::new(Rating::new(271), spec);
        state.start();
        let frame = state.tick(&table).unwrap();
        assert!(frame.is_final());
        assert_eq!(frame.rating, Rating::new(271));
        assert_eq!(state.phase(), Phase::Completed);
    }

    #[test]
    fn test_animate_needs_runtime() {
        let mut animator = Animator::new(Arc::new(BandTable::atcoder()), AnimationSpec::default());
        let result = animator.animate(Rating::new(10), |_frame: Frame| {});
        assert!(matches!(result, Err(AnimationError::NoRuntime)));
        assert_eq!(animator.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animate_fires_once_after_final_frame() {
        let (frames, sink) = collect();
        let mut animator = Animator::new(Arc::new(BandTable::atcoder()), AnimationSpec::default());

        let handle = animator.animate(Rating::new(1241), sink).unwrap();
        assert!(animator.is_running());
        assert_eq!(handle.finished().await, Completion::Finished);
        assert_eq!(animator.phase(), Phase::Completed);

        let frames = frames.lock();
        assert_eq!(frames.len(), 360);
        assert!(frames.last().unwrap().is_final());
    }

    #[tokio::test(start_paused = true)]
    async fn test_animate_zero_still_completes() {
        let (frames, sink) = collect();
        let mut animator = Animator::new(Arc::new(BandTable::atcoder()), AnimationSpec::default());
        let handle = animator.animate(Rating::ZERO, sink).unwrap();
        assert_eq!(handle.finished().await, Completion::Finished);
        assert!(frames.lock().iter().all(|f| f.rating == Rating::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_run_fires_once_and_stops_drawing() {
        let (old_frames, old_sink) = collect();
        let (new_frames, new_sink) = collect();
        let mut animator = Animator::new(Arc::new(BandTable::atcoder()), AnimationSpec::default());

        let first = animator.animate(Rating::new(1000), old_sink).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let drawn_before = old_frames.lock().len();
        assert!(drawn_before > 0);

        let second = animator.animate(Rating::new(2000), new_sink).unwrap();
        assert_eq!(first.finished().await, Completion::Superseded);
        assert_eq!(second.finished().await, Completion::Finished);

        let old_frames = old_frames.lock();
        assert_eq!(old_frames.len(), drawn_before);
        assert!(old_frames.iter().all(|f| !f.is_final()));
        assert_eq!(new_frames.lock().last().unwrap().rating, Rating::new(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop() {
        let (_, sink) = collect();
        let mut animator = Animator::new(Arc::new(BandTable::atcoder()), AnimationSpec::default());
        let handle = animator.animate(Rating::new(500), sink).unwrap();
        animator.cancel();
        assert!(!animator.is_running());
        assert_eq!(handle.finished().await, Completion::Cancelled);

        let (_, sink) = collect();
        let mut animator = Animator::new(Arc::new(BandTable::atcoder()), AnimationSpec::default());
        let mut handle = animator.animate(Rating::new(500), sink).unwrap();
        assert_eq!(handle.try_finished(), None);
        drop(animator);
        assert_eq!(handle.finished().await, Completion::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_sink_still_settles() {
        let mut animator = Animator::new(Arc::new(BandTable::atcoder()), AnimationSpec::default());
        let handle = animator
            .animate(Rating::new(500), |frame: Frame| {
                if frame.index > 0 {
                    panic!("surface gone");
                }
            })
            .unwrap();
        assert_eq!(handle.finished().await, Completion::Cancelled);
        assert!(!animator.is_running());
        assert_eq!(animator.phase(), Phase::Idle);
    }

    /// Holds the final frame back until `flush`, like a sink with a full queue.
    struct DeferredSink {
        frames: Arc<Mutex<Vec<Frame>>>,
        pending: Option<Frame>,
    }

    impl FrameSink for DeferredSink {
        fn present(&mut self, frame: Frame) {
            if frame.is_final() {
                self.pending = Some(frame);
            } else {
                self.frames.lock().push(frame);
            }
        }

        fn flush(&mut self) -> impl Future<Output = ()> + Send {
            let pending = self.pending.take();
            let frames = self.frames.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                frames.lock().extend(pending);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_waits_for_flush() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = DeferredSink {
            frames: frames.clone(),
            pending: None,
        };
        let mut animator = Animator::new(Arc::new(BandTable::atcoder()), AnimationSpec::default());
        let handle = animator.animate(Rating::new(1241), sink).unwrap();

        assert_eq!(handle.finished().await, Completion::Finished);
        let frames = frames.lock();
        assert_eq!(frames.len(), 360);
        assert!(frames.last().unwrap().is_final());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_finish_is_quiet() {
        let (_, sink) = collect();
        let mut animator = Animator::new(Arc::new(BandTable::atcoder()), AnimationSpec::default());
        let handle = animator.animate(Rating::new(300), sink).unwrap();
        assert_eq!(handle.finished().await, Completion::Finished);
        animator.cancel();
        assert_eq!(animator.phase(), Phase::Idle);
    }
}
