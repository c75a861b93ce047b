//! Session: one player, one registry, one trace source and one status line.
//!
//! Every failure is reported on the status line as well as returned, so a
//! frontend only has to poll the status to show errors.

use std::sync::Arc;
use std::time::Duration;

use codesense_render::{graph_svg, render_step, Registry, RendererEntry, StepView, Theme};
use codesense_trace::{BugReport, Explanation, TraceRequest};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::client::{GeneratorClient, TraceSource};
use crate::config::VisConfig;
use crate::error::{Error, Result};
use crate::playback::{Playback, PlaybackStatus, StepOutcome};
use crate::player::Player;
use crate::status::{StatusLine, StatusMessage};

/// Shown when stepping forward past the last step.
pub const COMPLETED_MESSAGE: &str = "execution completed";

/// The current step as the frontend draws it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub status: PlaybackStatus,
    /// `None` until a trace is loaded.
    pub step: Option<StepView>,
}

/// Cheap-to-clone handle to a visualization session.
pub struct Session<S = GeneratorClient> {
    player: Player,
    registry: Arc<RwLock<Registry>>,
    source: Arc<S>,
    status: Arc<Mutex<StatusLine>>,
    theme: Theme,
    max_code_length: usize,
}

impl<S> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self {
            player: self.player.clone(),
            registry: self.registry.clone(),
            source: self.source.clone(),
            status: self.status.clone(),
            theme: self.theme.clone(),
            max_code_length: self.max_code_length,
        }
    }
}

impl Session<GeneratorClient> {
    /// Session talking to the generator named in `config`.
    pub fn from_config(config: &VisConfig) -> Result<Self> {
        let client = GeneratorClient::new(&config.generator_url)?;
        Self::new(client, config)
    }
}

impl<S: TraceSource> Session<S> {
    /// Spawn the player and set up the default registry.
    pub fn new(source: S, config: &VisConfig) -> Result<Self> {
        let playback = Playback::new(config.interval)?;
        Ok(Self {
            player: Player::spawn(playback),
            registry: Arc::new(RwLock::new(Registry::with_defaults())),
            source: Arc::new(source),
            status: Arc::new(Mutex::new(StatusLine::new(config.status_ttl))),
            theme: Theme::default(),
            max_code_length: config.max_code_length,
        })
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn registry(&self) -> &Arc<RwLock<Registry>> {
        &self.registry
    }

    /// Add or replace the renderer for a structure tag.
    pub async fn register(&self, tag: impl Into<String>, entry: impl Into<RendererEntry>) {
        self.registry.write().await.register(tag, entry);
    }

    async fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(error = %e, "request failed");
            self.status.lock().await.error(e.to_string());
        }
        result
    }

    /// Validate, request a trace and load it.
    ///
    /// Clears the status line first. Overlapping calls are not cancelled;
    /// whichever response arrives last is the one left loaded.
    pub async fn generate(&self, request: TraceRequest) -> Result<PlaybackStatus> {
        self.status.lock().await.clear();
        let result: Result<PlaybackStatus> = async {
            let request = request.prepare(self.max_code_length)?;
            info!(language = %request.language, "generating trace");
            let steps = self.source.visualize(&request).await?;
            self.player.load(steps).await
        }
        .await;

        let status = self.report(result).await?;
        info!(total_steps = status.total_steps, "trace ready");
        self.status
            .lock()
            .await
            .info(format!("loaded {} steps", status.total_steps));
        Ok(status)
    }

    pub async fn explain(&self, request: TraceRequest) -> Result<Explanation> {
        let result: Result<Explanation> = async {
            let request = request.prepare(self.max_code_length)?;
            Ok::<_, Error>(self.source.explain(&request).await?)
        }
        .await;
        self.report(result).await
    }

    pub async fn detect_bugs(&self, request: TraceRequest) -> Result<BugReport> {
        let result: Result<BugReport> = async {
            let request = request.prepare(self.max_code_length)?;
            Ok::<_, Error>(self.source.detect_bugs(&request).await?)
        }
        .await;
        let report = self.report(result).await?;
        info!(bugs = report.bugs_found.len(), "bug analysis ready");
        Ok(report)
    }

    pub async fn play(&self) -> Result<PlaybackStatus> {
        let result = self.player.play().await;
        self.report(result).await
    }

    pub async fn pause(&self) -> Result<PlaybackStatus> {
        let result = self.player.pause().await;
        self.report(result).await
    }

    pub async fn reset(&self) -> Result<PlaybackStatus> {
        let result = self.player.reset().await;
        self.report(result).await
    }

    pub async fn step_forward(&self) -> Result<StepOutcome> {
        let result = self.player.step_forward().await;
        let outcome = self.report(result).await?;
        if outcome == StepOutcome::AtEnd {
            self.status.lock().await.info(COMPLETED_MESSAGE);
        }
        Ok(outcome)
    }

    pub async fn step_backward(&self) -> Result<StepOutcome> {
        let result = self.player.step_backward().await;
        self.report(result).await
    }

    pub async fn seek(&self, index: usize) -> Result<StepOutcome> {
        let result = self.player.seek(index).await;
        self.report(result).await
    }

    pub async fn set_speed(&self, interval: Duration) -> Result<PlaybackStatus> {
        let result = self.player.set_speed(interval).await;
        self.report(result).await
    }

    /// Render the current step.
    pub async fn frame(&self) -> Result<Frame> {
        let result = self.player.snapshot().await;
        let snapshot = self.report(result).await?;
        let registry = self.registry.read().await;
        Ok(Frame {
            step: snapshot.step().map(|step| render_step(&registry, step)),
            status: snapshot.status,
        })
    }

    /// SVG of the current step when it draws a graph.
    pub async fn frame_svg(&self) -> Result<Option<String>> {
        let frame = self.frame().await?;
        Ok(frame
            .step
            .as_ref()
            .and_then(|step| step.view.as_graph())
            .map(|graph| graph_svg(graph, &self.theme)))
    }

    /// The status message, unless it has expired.
    pub async fn status_message(&self) -> Option<StatusMessage> {
        self.status.lock().await.current().cloned()
    }

    /// How many status messages were ever posted.
    pub async fn status_posted(&self) -> u64 {
        self.status.lock().await.posted()
    }
}
