//! Playback controls for an execution trace.
//!
//! [`Playback`] is a pure state machine. It never sleeps; instead it hands
//! out [`TimerToken`]s and the [`crate::Player`] task turns the armed token
//! into real ticks. A tick carrying anything but the armed token is stale
//! and ignored, so a cancelled timer can never advance the cursor.

use std::time::Duration;

use codesense_trace::{Step, TraceStore};
use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;

/// Default auto-advance interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No steps loaded
    Empty,
    /// Steps loaded, not auto-advancing
    Ready,
    /// Auto-advancing on the timer
    Playing,
    /// Reached the last step
    Completed,
}

/// Identity of one armed timer. Each arm gets a fresh generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Result of a manual step or seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { index: usize, line: Option<u32> },
    /// Stepped forward on the last step; the cursor did not move.
    AtEnd,
}

/// Result of delivering a timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced { index: usize, line: Option<u32> },
    /// The tick found the cursor on the last step and stopped the timer.
    Finished,
    /// The token was not the armed one.
    Stale,
}

/// Playback controller over one trace.
#[derive(Debug)]
pub struct Playback {
    store: TraceStore,
    cursor: usize,
    state: PlaybackState,
    interval: Duration,
    timer: Option<TimerToken>,
    generation: u64,
    timers_started: u64,
    timers_cancelled: u64,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            store: TraceStore::new(),
            cursor: 0,
            state: PlaybackState::Empty,
            interval: DEFAULT_INTERVAL,
            timer: None,
            generation: 0,
            timers_started: 0,
            timers_cancelled: 0,
        }
    }
}

impl Playback {
    /// Create an empty controller ticking every `interval`.
    pub fn new(interval: Duration) -> Result<Self, PlaybackError> {
        if interval.is_zero() {
            return Err(PlaybackError::InvalidInterval);
        }
        Ok(Self {
            interval,
            ..Self::default()
        })
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the current step.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn total_steps(&self) -> usize {
        self.store.len()
    }

    pub fn store(&self) -> &TraceStore {
        &self.store
    }

    /// The currently armed timer, if any.
    pub fn armed_timer(&self) -> Option<TimerToken> {
        self.timer
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.store.get(self.cursor).ok()
    }

    pub fn highlighted_line(&self) -> Option<u32> {
        codesense_trace::highlighted_line(&self.store, self.cursor)
    }

    /// Number of timers armed since creation.
    pub fn timers_started(&self) -> u64 {
        self.timers_started
    }

    /// Number of timers cancelled since creation.
    pub fn timers_cancelled(&self) -> u64 {
        self.timers_cancelled
    }

    /// Calculate progress as a fraction of the trace (0.0 - 1.0).
    pub fn progress(&self) -> f64 {
        match self.store.last_index() {
            None => 0.0,
            Some(0) => 1.0,
            Some(last) => self.cursor as f64 / last as f64,
        }
    }

    fn arm_timer(&mut self) -> TimerToken {
        self.cancel_timer();
        self.generation += 1;
        let token = TimerToken(self.generation);
        self.timer = Some(token);
        self.timers_started += 1;
        token
    }

    fn cancel_timer(&mut self) {
        if self.timer.take().is_some() {
            self.timers_cancelled += 1;
        }
    }

    fn idle_state(&self) -> PlaybackState {
        if self.store.is_empty() {
            PlaybackState::Empty
        } else {
            PlaybackState::Ready
        }
    }

    fn moved(&self) -> StepOutcome {
        StepOutcome::Moved {
            index: self.cursor,
            line: self.highlighted_line(),
        }
    }

    /// Replace the trace. Cancels any timer and rewinds to the first step.
    ///
    /// On error the previous trace, cursor and state are kept.
    pub fn load(&mut self, steps: Vec<Step>) -> codesense_trace::Result<()> {
        self.store.load(steps)?;
        self.cancel_timer();
        self.cursor = 0;
        self.state = self.idle_state();
        Ok(())
    }

    /// Start auto-advancing. Replays from the start when on the last step.
    ///
    /// Already playing: returns the armed token and changes nothing.
    pub fn play(&mut self) -> Result<TimerToken, PlaybackError> {
        if self.state == PlaybackState::Empty {
            return Err(PlaybackError::NoSteps);
        }
        if let (PlaybackState::Playing, Some(token)) = (self.state, self.timer) {
            return Ok(token);
        }
        if Some(self.cursor) == self.store.last_index() {
            self.cursor = 0;
        }
        let token = self.arm_timer();
        self.state = PlaybackState::Playing;
        Ok(token)
    }

    /// Stop auto-advancing, keeping the cursor.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.cancel_timer();
            self.state = PlaybackState::Ready;
        }
    }

    /// Stop and return to the first step.
    pub fn reset(&mut self) {
        self.cancel_timer();
        self.cursor = 0;
        self.state = self.idle_state();
    }

    /// Step forward one step. Leaves the timer alone.
    pub fn step_forward(&mut self) -> Result<StepOutcome, PlaybackError> {
        let last = self.store.last_index().ok_or(PlaybackError::NoSteps)?;
        if self.cursor >= last {
            if self.state != PlaybackState::Playing {
                self.state = PlaybackState::Completed;
            }
            return Ok(StepOutcome::AtEnd);
        }
        self.cursor += 1;
        Ok(self.moved())
    }

    /// Step backward one step, stopping at the first. Leaves the timer alone.
    pub fn step_backward(&mut self) -> Result<StepOutcome, PlaybackError> {
        if self.store.is_empty() {
            return Err(PlaybackError::NoSteps);
        }
        self.cursor = self.cursor.saturating_sub(1);
        if self.state == PlaybackState::Completed {
            self.state = PlaybackState::Ready;
        }
        Ok(self.moved())
    }

    /// Jump to a step, clamped to the trace.
    pub fn seek(&mut self, index: usize) -> Result<StepOutcome, PlaybackError> {
        self.cursor = self.store.clamp(index).ok_or(PlaybackError::NoSteps)?;
        if self.state == PlaybackState::Completed {
            self.state = PlaybackState::Ready;
        }
        Ok(self.moved())
    }

    /// Change the tick interval.
    ///
    /// While playing the timer is re-armed, so the next tick is a full new
    /// interval away; the new token is returned.
    pub fn set_speed(&mut self, interval: Duration) -> Result<Option<TimerToken>, PlaybackError> {
        if interval.is_zero() {
            return Err(PlaybackError::InvalidInterval);
        }
        self.interval = interval;
        if self.state == PlaybackState::Playing {
            Ok(Some(self.arm_timer()))
        } else {
            Ok(None)
        }
    }

    /// Deliver a timer tick.
    pub fn tick(&mut self, token: TimerToken) -> TickOutcome {
        if self.timer != Some(token) {
            return TickOutcome::Stale;
        }
        match self.store.last_index() {
            Some(last) if self.cursor < last => {
                self.cursor += 1;
                TickOutcome::Advanced {
                    index: self.cursor,
                    line: self.highlighted_line(),
                }
            }
            _ => {
                self.cancel_timer();
                self.state = PlaybackState::Completed;
                TickOutcome::Finished
            }
        }
    }
}

/// Playback status for sending to frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub index: usize,
    pub total_steps: usize,
    pub line: Option<u32>,
    pub interval_ms: u64,
    pub progress: f64,
}

impl From<&Playback> for PlaybackStatus {
    fn from(playback: &Playback) -> Self {
        Self {
            state: playback.state,
            index: playback.cursor,
            total_steps: playback.total_steps(),
            line: playback.highlighted_line(),
            interval_ms: u64::try_from(playback.interval.as_millis()).unwrap_or(u64::MAX),
            progress: playback.progress(),
        }
    }
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self::from(&Playback::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesense_trace::Visualization;
    use proptest::prelude::*;

    fn make_steps(count: usize) -> Vec<Step> {
        (0..count)
            .map(|i| Step::new(i, Some(i as u32 + 1), Visualization::default()))
            .collect()
    }

    fn loaded(count: usize) -> Playback {
        let mut playback = Playback::default();
        playback.load(make_steps(count)).unwrap();
        playback
    }

    fn assert_timer_invariant(playback: &Playback) {
        assert_eq!(
            playback.state() == PlaybackState::Playing,
            playback.armed_timer().is_some()
        );
        assert!(playback.timers_started() - playback.timers_cancelled() <= 1);
    }

    #[test]
    fn playback_starts_empty() {
        let playback = Playback::default();
        assert_eq!(playback.state(), PlaybackState::Empty);
        assert_eq!(playback.cursor(), 0);
        assert_eq!(playback.highlighted_line(), None);
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert_eq!(
            Playback::new(Duration::ZERO).unwrap_err(),
            PlaybackError::InvalidInterval
        );
        let mut playback = loaded(3);
        assert_eq!(
            playback.set_speed(Duration::ZERO),
            Err(PlaybackError::InvalidInterval)
        );
        assert_eq!(playback.interval(), DEFAULT_INTERVAL);
    }

    #[test]
    fn play_empty_fails_without_timer() {
        let mut playback = Playback::default();
        assert_eq!(playback.play(), Err(PlaybackError::NoSteps));
        assert_eq!(playback.state(), PlaybackState::Empty);
        assert_eq!(playback.timers_started(), 0);
    }

    #[test]
    fn load_resets_cursor_and_cancels_timer() {
        let mut playback = loaded(5);
        playback.seek(3).unwrap();
        playback.play().unwrap();

        playback.load(make_steps(2)).unwrap();
        assert_eq!(playback.cursor(), 0);
        assert_eq!(playback.state(), PlaybackState::Ready);
        assert_eq!(playback.armed_timer(), None);

        playback.load(Vec::new()).unwrap();
        assert_eq!(playback.state(), PlaybackState::Empty);
    }

    #[test]
    fn play_twice_keeps_one_timer() {
        let mut playback = loaded(3);
        let first = playback.play().unwrap();
        let second = playback.play().unwrap();
        assert_eq!(first, second);
        assert_eq!(playback.timers_started(), 1);
    }

    #[test]
    fn play_at_end_replays_from_start() {
        let mut playback = loaded(3);
        playback.seek(2).unwrap();
        playback.play().unwrap();
        assert_eq!(playback.cursor(), 0);
        assert_eq!(playback.state(), PlaybackState::Playing);
    }

    #[test]
    fn ticks_advance_then_finish() {
        let mut playback = loaded(3);
        let token = playback.play().unwrap();

        assert_eq!(
            playback.tick(token),
            TickOutcome::Advanced { index: 1, line: Some(2) }
        );
        assert_eq!(
            playback.tick(token),
            TickOutcome::Advanced { index: 2, line: Some(3) }
        );
        assert_eq!(playback.tick(token), TickOutcome::Finished);
        assert_eq!(playback.state(), PlaybackState::Completed);
        assert_eq!(playback.armed_timer(), None);
        assert_eq!(playback.tick(token), TickOutcome::Stale);
        assert_eq!(playback.cursor(), 2);
    }

    #[test]
    fn single_step_completes_after_one_tick() {
        let mut playback = loaded(1);
        let token = playback.play().unwrap();
        assert_eq!(playback.tick(token), TickOutcome::Finished);
        assert_eq!(playback.state(), PlaybackState::Completed);
        assert_eq!(playback.cursor(), 0);
    }

    #[test]
    fn pause_cancels_timer() {
        let mut playback = loaded(3);
        let token = playback.play().unwrap();
        playback.pause();
        assert_eq!(playback.state(), PlaybackState::Ready);
        assert_eq!(playback.tick(token), TickOutcome::Stale);
        assert_eq!(playback.cursor(), 0);
    }

    #[test]
    fn set_speed_while_playing_rearms() {
        let mut playback = loaded(3);
        let old = playback.play().unwrap();
        let new = playback
            .set_speed(Duration::from_millis(250))
            .unwrap()
            .unwrap();
        assert_ne!(old, new);
        assert!(new.generation() > old.generation());
        assert_eq!(playback.tick(old), TickOutcome::Stale);
        assert!(matches!(playback.tick(new), TickOutcome::Advanced { .. }));
        assert_eq!(playback.timers_started() - playback.timers_cancelled(), 1);
    }

    #[test]
    fn set_speed_while_paused_only_stores() {
        let mut playback = loaded(3);
        assert_eq!(playback.set_speed(Duration::from_millis(250)), Ok(None));
        assert_eq!(playback.interval(), Duration::from_millis(250));
        assert_eq!(playback.timers_started(), 0);
    }

    #[test]
    fn step_forward_stops_at_end() {
        let mut playback = loaded(2);
        assert_eq!(
            playback.step_forward(),
            Ok(StepOutcome::Moved { index: 1, line: Some(2) })
        );
        assert_eq!(playback.step_forward(), Ok(StepOutcome::AtEnd));
        assert_eq!(playback.cursor(), 1);
        assert_eq!(playback.state(), PlaybackState::Completed);

        assert!(matches!(playback.step_backward(), Ok(StepOutcome::Moved { index: 0, .. })));
        assert_eq!(playback.state(), PlaybackState::Ready);
    }

    #[test]
    fn manual_step_during_play_keeps_timer() {
        let mut playback = loaded(4);
        let token = playback.play().unwrap();
        playback.step_forward().unwrap();
        assert_eq!(playback.state(), PlaybackState::Playing);
        assert_eq!(playback.armed_timer(), Some(token));
        assert_eq!(
            playback.tick(token),
            TickOutcome::Advanced { index: 2, line: Some(3) }
        );
    }

    #[test]
    fn step_at_end_while_playing_stays_playing() {
        let mut playback = loaded(2);
        playback.seek(1).unwrap();
        let token = playback.play().unwrap();
        playback.seek(1).unwrap();
        assert_eq!(playback.step_forward(), Ok(StepOutcome::AtEnd));
        assert_eq!(playback.state(), PlaybackState::Playing);
        assert_eq!(playback.tick(token), TickOutcome::Finished);
    }

    #[test]
    fn seek_clamps_to_bounds() {
        let mut playback = loaded(10);
        playback.seek(5).unwrap();
        assert_eq!(playback.cursor(), 5);
        playback.seek(100).unwrap();
        assert_eq!(playback.cursor(), 9);
        assert_eq!(Playback::default().seek(3), Err(PlaybackError::NoSteps));
    }

    #[test]
    fn reset_from_empty_stays_empty() {
        let mut playback = Playback::default();
        playback.reset();
        assert_eq!(playback.state(), PlaybackState::Empty);
    }

    #[test]
    fn failed_load_keeps_previous_trace() {
        let mut playback = loaded(3);
        playback.seek(2).unwrap();
        let bad = vec![Step::new(4, None, Visualization::default())];
        assert!(playback.load(bad).is_err());
        assert_eq!(playback.total_steps(), 3);
        assert_eq!(playback.cursor(), 2);
    }

    #[test]
    fn progress_calculation() {
        let mut playback = loaded(5);
        assert_eq!(playback.progress(), 0.0);
        playback.seek(2).unwrap();
        assert_eq!(playback.progress(), 0.5);
        playback.seek(4).unwrap();
        assert_eq!(playback.progress(), 1.0);
    }

    #[test]
    fn status_conversion() {
        let mut playback = loaded(10);
        playback.seek(3).unwrap();
        playback.set_speed(Duration::from_millis(500)).unwrap();

        let status: PlaybackStatus = (&playback).into();
        assert_eq!(status.index, 3);
        assert_eq!(status.total_steps, 10);
        assert_eq!(status.line, Some(4));
        assert_eq!(status.interval_ms, 500);
        assert_eq!(status.state, PlaybackState::Ready);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Load(usize),
        Play,
        Pause,
        Reset,
        Forward,
        Backward,
        Seek(usize),
        Speed(u64),
        Tick,
        StaleTick,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..6).prop_map(Op::Load),
            Just(Op::Play),
            Just(Op::Pause),
            Just(Op::Reset),
            Just(Op::Forward),
            Just(Op::Backward),
            (0usize..10).prop_map(Op::Seek),
            (0u64..2000).prop_map(Op::Speed),
            Just(Op::Tick),
            Just(Op::StaleTick),
        ]
    }

    proptest! {
        #[test]
        fn timer_invariant_holds(ops in proptest::collection::vec(op(), 0..60)) {
            let mut playback = Playback::default();
            for op in ops {
                match op {
                    Op::Load(n) => { playback.load(make_steps(n)).unwrap(); }
                    Op::Play => { let _ = playback.play(); }
                    Op::Pause => playback.pause(),
                    Op::Reset => playback.reset(),
                    Op::Forward => { let _ = playback.step_forward(); }
                    Op::Backward => { let _ = playback.step_backward(); }
                    Op::Seek(i) => { let _ = playback.seek(i); }
                    Op::Speed(ms) => { let _ = playback.set_speed(Duration::from_millis(ms)); }
                    Op::Tick => {
                        if let Some(token) = playback.armed_timer() {
                            playback.tick(token);
                        }
                    }
                    Op::StaleTick => {
                        let cursor = playback.cursor();
                        prop_assert_eq!(playback.tick(TimerToken(u64::MAX)), TickOutcome::Stale);
                        prop_assert_eq!(playback.cursor(), cursor);
                    }
                }
                assert_timer_invariant(&playback);
                if playback.total_steps() > 0 {
                    prop_assert!(playback.cursor() < playback.total_steps());
                } else {
                    prop_assert_eq!(playback.state(), PlaybackState::Empty);
                }
            }
        }

        #[test]
        fn reset_is_idempotent(n in 0usize..6, seek in 0usize..10, play in any::<bool>()) {
            let mut playback = loaded(n);
            let _ = playback.seek(seek);
            if play {
                let _ = playback.play();
            }
            playback.reset();
            let once = PlaybackStatus::from(&playback);
            playback.reset();
            prop_assert_eq!(PlaybackStatus::from(&playback), once);
            prop_assert_eq!(playback.cursor(), 0);
            prop_assert_ne!(playback.state(), PlaybackState::Playing);
        }

        #[test]
        fn seek_seek_back_lands_before_second_target(
            n in 1usize..12,
            i in 0usize..20,
            j in 0usize..20,
        ) {
            let mut playback = loaded(n);
            playback.seek(i).unwrap();
            playback.seek(j).unwrap();
            playback.step_backward().unwrap();
            prop_assert_eq!(playback.cursor(), j.min(n - 1).saturating_sub(1));
        }
    }
}
