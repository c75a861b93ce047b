//! Player task: drives a [`Playback`] in real time.
//!
//! One task owns the controller and at most one [`Interval`]. Commands and
//! ticks are serialized through it; commands win ties, so a pause or speed
//! change always lands before any tick it makes stale.

use std::ops::ControlFlow;
use std::time::Duration;

use codesense_trace::{Step, TraceError, TraceStore};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{Error, PlaybackError, Result};
use crate::playback::{Playback, PlaybackStatus, StepOutcome, TickOutcome, TimerToken};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

/// Something the player did, for observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    Loaded { total_steps: usize },
    Advanced { index: usize, line: Option<u32> },
    Finished,
    TimerArmed { generation: u64, interval_ms: u64 },
    TimerCancelled { generation: u64 },
}

/// Status plus the trace it refers to.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub status: PlaybackStatus,
    pub store: TraceStore,
}

impl Snapshot {
    /// The step under the cursor.
    pub fn step(&self) -> Option<&Step> {
        self.store.get(self.status.index).ok()
    }
}

enum Command {
    Load {
        steps: Vec<Step>,
        reply: oneshot::Sender<std::result::Result<PlaybackStatus, TraceError>>,
    },
    Play {
        reply: oneshot::Sender<std::result::Result<PlaybackStatus, PlaybackError>>,
    },
    Pause {
        reply: oneshot::Sender<PlaybackStatus>,
    },
    Reset {
        reply: oneshot::Sender<PlaybackStatus>,
    },
    StepForward {
        reply: oneshot::Sender<std::result::Result<StepOutcome, PlaybackError>>,
    },
    StepBackward {
        reply: oneshot::Sender<std::result::Result<StepOutcome, PlaybackError>>,
    },
    Seek {
        index: usize,
        reply: oneshot::Sender<std::result::Result<StepOutcome, PlaybackError>>,
    },
    SetSpeed {
        interval: Duration,
        reply: oneshot::Sender<std::result::Result<PlaybackStatus, PlaybackError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot>,
    },
    Shutdown,
}

/// Handle to a running player task.
///
/// Cheap to clone. The task stops when every handle is dropped or on
/// [`Player::shutdown`].
#[derive(Clone)]
pub struct Player {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<PlaybackStatus>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl Player {
    /// Spawn the task on the current tokio runtime.
    pub fn spawn(playback: Playback) -> Self {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (status_tx, status) = watch::channel(PlaybackStatus::from(&playback));
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        let task = PlayerTask {
            playback,
            ticker: None,
            status: status_tx,
            events: events.clone(),
        };
        tokio::spawn(task.run(rx));

        Self {
            commands,
            status,
            events,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| Error::PlayerStopped)?;
        rx.await.map_err(|_| Error::PlayerStopped)
    }

    /// Replace the trace and rewind.
    pub async fn load(&self, steps: Vec<Step>) -> Result<PlaybackStatus> {
        Ok(self.request(|reply| Command::Load { steps, reply }).await??)
    }

    pub async fn play(&self) -> Result<PlaybackStatus> {
        Ok(self.request(|reply| Command::Play { reply }).await??)
    }

    pub async fn pause(&self) -> Result<PlaybackStatus> {
        self.request(|reply| Command::Pause { reply }).await
    }

    pub async fn reset(&self) -> Result<PlaybackStatus> {
        self.request(|reply| Command::Reset { reply }).await
    }

    pub async fn step_forward(&self) -> Result<StepOutcome> {
        Ok(self.request(|reply| Command::StepForward { reply }).await??)
    }

    pub async fn step_backward(&self) -> Result<StepOutcome> {
        Ok(self.request(|reply| Command::StepBackward { reply }).await??)
    }

    pub async fn seek(&self, index: usize) -> Result<StepOutcome> {
        Ok(self.request(|reply| Command::Seek { index, reply }).await??)
    }

    pub async fn set_speed(&self, interval: Duration) -> Result<PlaybackStatus> {
        Ok(self
            .request(|reply| Command::SetSpeed { interval, reply })
            .await??)
    }

    /// Current status together with the loaded trace.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Latest published status.
    pub fn status(&self) -> PlaybackStatus {
        self.status.borrow().clone()
    }

    /// Receiver that is notified after every command and tick.
    pub fn watch_status(&self) -> watch::Receiver<PlaybackStatus> {
        self.status.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Stop the task. Later requests fail with [`Error::PlayerStopped`].
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

struct PlayerTask {
    playback: Playback,
    ticker: Option<(TimerToken, Interval)>,
    status: watch::Sender<PlaybackStatus>,
    events: broadcast::Sender<PlaybackEvent>,
}

async fn next_tick(ticker: &mut Option<(TimerToken, Interval)>) -> TimerToken {
    match ticker {
        Some((token, interval)) => {
            interval.tick().await;
            *token
        }
        None => std::future::pending().await,
    }
}

impl PlayerTask {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            tokio::select! {
                biased;

                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if self.handle(command).is_break() {
                        break;
                    }
                }
                token = next_tick(&mut self.ticker) => self.on_tick(token),
            }
        }

        self.playback.pause();
        self.settle();
        debug!("player stopped");
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.events.send(event);
    }

    /// Bring the interval in line with the armed token, then publish status.
    fn settle(&mut self) {
        let armed = self.playback.armed_timer();
        let running = self.ticker.as_ref().map(|(token, _)| *token);

        if armed != running {
            if let Some(old) = running {
                self.emit(PlaybackEvent::TimerCancelled {
                    generation: old.generation(),
                });
            }
            self.ticker = armed.map(|token| {
                let period = self.playback.interval();
                let mut interval = interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.emit(PlaybackEvent::TimerArmed {
                    generation: token.generation(),
                    interval_ms: u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
                });
                (token, interval)
            });
        }

        self.status.send_replace(PlaybackStatus::from(&self.playback));
    }

    fn on_tick(&mut self, token: TimerToken) {
        match self.playback.tick(token) {
            TickOutcome::Advanced { index, line } => {
                debug!(index, ?line, "tick");
                self.emit(PlaybackEvent::Advanced { index, line });
            }
            TickOutcome::Finished => {
                debug!("playback finished");
                self.emit(PlaybackEvent::Finished);
            }
            TickOutcome::Stale => {}
        }
        self.settle();
    }

    fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Load { steps, reply } => {
                let result = self.playback.load(steps);
                if result.is_ok() {
                    info!(total_steps = self.playback.total_steps(), "trace loaded");
                    self.emit(PlaybackEvent::Loaded {
                        total_steps: self.playback.total_steps(),
                    });
                }
                self.settle();
                let _ = reply.send(result.map(|()| self.status.borrow().clone()));
            }
            Command::Play { reply } => {
                debug!("play");
                let result = self.playback.play();
                self.settle();
                let _ = reply.send(result.map(|_| self.status.borrow().clone()));
            }
            Command::Pause { reply } => {
                debug!("pause");
                self.playback.pause();
                self.settle();
                let _ = reply.send(self.status.borrow().clone());
            }
            Command::Reset { reply } => {
                debug!("reset");
                self.playback.reset();
                self.settle();
                let _ = reply.send(self.status.borrow().clone());
            }
            Command::StepForward { reply } => {
                let result = self.playback.step_forward();
                self.settle();
                let _ = reply.send(result);
            }
            Command::StepBackward { reply } => {
                let result = self.playback.step_backward();
                self.settle();
                let _ = reply.send(result);
            }
            Command::Seek { index, reply } => {
                debug!(index, "seek");
                let result = self.playback.seek(index);
                self.settle();
                let _ = reply.send(result);
            }
            Command::SetSpeed { interval, reply } => {
                debug!(?interval, "set speed");
                let result = self.playback.set_speed(interval);
                self.settle();
                let _ = reply.send(result.map(|_| self.status.borrow().clone()));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(Snapshot {
                    status: self.status.borrow().clone(),
                    store: self.playback.store().clone(),
                });
            }
            Command::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackState;
    use codesense_trace::Visualization;
    use serde_json::json;
    use tokio::time::sleep;

    fn make_steps(count: usize) -> Vec<Step> {
        (0..count)
            .map(|i| Step::new(i, Some(i as u32 + 1), Visualization::default()))
            .collect()
    }

    fn player(interval_ms: u64) -> Player {
        Player::spawn(Playback::new(Duration::from_millis(interval_ms)).unwrap())
    }

    fn drain(rx: &mut broadcast::Receiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_advance_on_interval() {
        let player = player(500);
        player.load(make_steps(3)).await.unwrap();
        player.play().await.unwrap();

        sleep(Duration::from_millis(450)).await;
        assert_eq!(player.status().index, 0);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(player.status().index, 1);
        assert_eq!(player.status().line, Some(2));

        sleep(Duration::from_millis(500)).await;
        assert_eq!(player.status().index, 2);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(player.status().state, PlaybackState::Completed);
        assert_eq!(player.status().index, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn single_step_completes_after_one_tick() {
        let player = player(500);
        let mut events = player.subscribe();
        let step = Step::new(
            0,
            Some(1),
            Visualization::from_value(json!({
                "type": "variable", "name": "x", "value": 5, "var_type": "int",
            })),
        );
        player.load(vec![step]).await.unwrap();
        player.play().await.unwrap();

        sleep(Duration::from_millis(550)).await;
        let status = player.status();
        assert_eq!(status.state, PlaybackState::Completed);
        assert_eq!(status.index, 0);

        sleep(Duration::from_millis(2000)).await;
        assert_eq!(player.status(), status);
        assert_eq!(
            drain(&mut events),
            vec![
                PlaybackEvent::Loaded { total_steps: 1 },
                PlaybackEvent::TimerArmed { generation: 1, interval_ms: 500 },
                PlaybackEvent::Finished,
                PlaybackEvent::TimerCancelled { generation: 1 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_restarts_timer_without_double_tick() {
        let player = player(1000);
        player.load(make_steps(10)).await.unwrap();
        player.play().await.unwrap();
        let mut events = player.subscribe();

        sleep(Duration::from_millis(600)).await;
        player.set_speed(Duration::from_millis(500)).await.unwrap();

        // The old timer would have fired at 1000ms.
        sleep(Duration::from_millis(450)).await;
        assert_eq!(player.status().index, 0);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(player.status().index, 1);

        // Old plus new interval after the change: exactly two ticks.
        sleep(Duration::from_millis(900)).await;
        assert_eq!(player.status().index, 2);

        let advanced = drain(&mut events)
            .into_iter()
            .filter(|e| matches!(e, PlaybackEvent::Advanced { .. }))
            .count();
        assert_eq!(advanced, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_ticks() {
        let player = player(500);
        player.load(make_steps(5)).await.unwrap();
        player.play().await.unwrap();
        sleep(Duration::from_millis(550)).await;

        let status = player.pause().await.unwrap();
        assert_eq!(status.state, PlaybackState::Ready);
        assert_eq!(status.index, 1);

        sleep(Duration::from_millis(5000)).await;
        assert_eq!(player.status().index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_step_coexists_with_timer() {
        let player = player(500);
        player.load(make_steps(5)).await.unwrap();
        player.play().await.unwrap();

        sleep(Duration::from_millis(200)).await;
        player.step_forward().await.unwrap();
        assert_eq!(player.status().index, 1);
        assert_eq!(player.status().state, PlaybackState::Playing);

        sleep(Duration::from_millis(350)).await;
        assert_eq!(player.status().index, 2);
    }

    #[tokio::test]
    async fn play_without_steps_is_rejected() {
        let player = player(500);
        let mut events = player.subscribe();
        let err = player.play().await.unwrap_err();
        assert!(matches!(err, Error::Playback(PlaybackError::NoSteps)));
        assert_eq!(player.status().state, PlaybackState::Empty);
        assert!(drain(&mut events).is_empty());
    }

    #[tokio::test]
    async fn snapshot_shares_loaded_trace() {
        let player = player(500);
        player.load(make_steps(3)).await.unwrap();
        player.seek(2).await.unwrap();

        let snapshot = player.snapshot().await.unwrap();
        assert_eq!(snapshot.status.index, 2);
        assert_eq!(snapshot.step().map(|s| s.index), Some(2));
        assert_eq!(snapshot.store.len(), 3);
    }

    #[tokio::test]
    async fn shutdown_stops_task() {
        let player = player(500);
        player.shutdown().await;
        tokio::task::yield_now().await;
        assert!(matches!(player.reset().await, Err(Error::PlayerStopped)));
    }
}
