//! Axum web server with WebSocket streaming for visualization.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use codesense_trace::{BugReport, Explanation, TraceRequest};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::client::TraceSource;
use crate::error::{ClientError, Error, PlaybackError};
use crate::playback::{PlaybackStatus, StepOutcome};
use crate::session::{Frame, Session};
use crate::status::StatusMessage;

/// Visualization server.
pub struct VisServer<S> {
    session: Session<S>,
}

impl<S: TraceSource> VisServer<S> {
    pub fn new(session: Session<S>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            // Playback
            .route("/api/playback", get(playback_status_handler::<S>))
            .route("/api/playback/play", post(play_handler::<S>))
            .route("/api/playback/pause", post(pause_handler::<S>))
            .route("/api/playback/reset", post(reset_handler::<S>))
            .route("/api/playback/step", post(step_handler::<S>))
            .route("/api/playback/seek", post(seek_handler::<S>))
            .route("/api/playback/speed", post(speed_handler::<S>))
            // Rendering
            .route("/api/frame", get(frame_handler::<S>))
            .route("/api/frame/svg", get(svg_handler::<S>))
            // Generator
            .route("/api/visualize", post(visualize_handler::<S>))
            .route("/api/explain", post(explain_handler::<S>))
            .route("/api/detect-bugs", post(detect_bugs_handler::<S>))
            .route("/api/status", get(status_handler::<S>))
            // WebSocket for real-time updates
            .route("/ws", get(ws_handler::<S>))
            .layer(CorsLayer::permissive())
            .with_state(self.session.clone())
    }

    /// Run the server on the given address.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Visualization server running on http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await
    }
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Playback(PlaybackError::NoSteps) => StatusCode::CONFLICT,
            Error::Playback(PlaybackError::InvalidInterval) => StatusCode::BAD_REQUEST,
            Error::Client(ClientError::Server { .. })
            | Error::Client(ClientError::Transport(_))
            | Error::Client(ClientError::Decode(_))
            | Error::Client(ClientError::Trace(_))
            | Error::Trace(_) => StatusCode::BAD_GATEWAY,
            Error::PlayerStopped => StatusCode::SERVICE_UNAVAILABLE,
            Error::Config(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn playback_status_handler<S: TraceSource>(
    State(session): State<Session<S>>,
) -> Json<PlaybackStatus> {
    Json(session.player().status())
}

async fn play_handler<S: TraceSource>(
    State(session): State<Session<S>>,
) -> ApiResult<PlaybackStatus> {
    Ok(Json(session.play().await?))
}

async fn pause_handler<S: TraceSource>(
    State(session): State<Session<S>>,
) -> ApiResult<PlaybackStatus> {
    Ok(Json(session.pause().await?))
}

async fn reset_handler<S: TraceSource>(
    State(session): State<Session<S>>,
) -> ApiResult<PlaybackStatus> {
    Ok(Json(session.reset().await?))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Direction {
    Forward,
    Backward,
}

#[derive(Deserialize)]
struct StepRequest {
    direction: Direction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StepResponse {
    /// Stepped forward on the last step.
    pub at_end: bool,
    pub status: PlaybackStatus,
}

async fn step<S: TraceSource>(session: &Session<S>, direction: Direction) -> Result<StepResponse, Error> {
    let outcome = match direction {
        Direction::Forward => session.step_forward().await?,
        Direction::Backward => session.step_backward().await?,
    };
    Ok(StepResponse {
        at_end: outcome == StepOutcome::AtEnd,
        status: session.player().status(),
    })
}

async fn step_handler<S: TraceSource>(
    State(session): State<Session<S>>,
    Json(req): Json<StepRequest>,
) -> ApiResult<StepResponse> {
    Ok(Json(step(&session, req.direction).await?))
}

#[derive(Deserialize)]
struct SeekRequest {
    index: usize,
}

async fn seek_handler<S: TraceSource>(
    State(session): State<Session<S>>,
    Json(req): Json<SeekRequest>,
) -> ApiResult<PlaybackStatus> {
    session.seek(req.index).await?;
    Ok(Json(session.player().status()))
}

#[derive(Deserialize)]
struct SpeedRequest {
    interval_ms: u64,
}

async fn speed_handler<S: TraceSource>(
    State(session): State<Session<S>>,
    Json(req): Json<SpeedRequest>,
) -> ApiResult<PlaybackStatus> {
    Ok(Json(
        session
            .set_speed(Duration::from_millis(req.interval_ms))
            .await?,
    ))
}

async fn frame_handler<S: TraceSource>(State(session): State<Session<S>>) -> ApiResult<Frame> {
    Ok(Json(session.frame().await?))
}

async fn svg_handler<S: TraceSource>(
    State(session): State<Session<S>>,
) -> Result<Response, ApiError> {
    Ok(match session.frame_svg().await? {
        Some(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "current step has no graph".to_string(),
            }),
        )
            .into_response(),
    })
}

async fn visualize_handler<S: TraceSource>(
    State(session): State<Session<S>>,
    Json(req): Json<TraceRequest>,
) -> ApiResult<PlaybackStatus> {
    Ok(Json(session.generate(req).await?))
}

async fn explain_handler<S: TraceSource>(
    State(session): State<Session<S>>,
    Json(req): Json<TraceRequest>,
) -> ApiResult<Explanation> {
    Ok(Json(session.explain(req).await?))
}

async fn detect_bugs_handler<S: TraceSource>(
    State(session): State<Session<S>>,
    Json(req): Json<TraceRequest>,
) -> ApiResult<BugReport> {
    Ok(Json(session.detect_bugs(req).await?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: Option<StatusMessage>,
}

async fn status_handler<S: TraceSource>(State(session): State<Session<S>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        message: session.status_message().await,
    })
}

async fn ws_handler<S: TraceSource>(
    ws: WebSocketUpgrade,
    State(session): State<Session<S>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, session))
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetFrame,
    Play,
    Pause,
    Reset,
    Step { direction: Direction },
    Seek { index: usize },
    Speed { interval_ms: u64 },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    Frame(Frame),
    Error { error: String },
}

fn encode(response: &WsResponse) -> Option<String> {
    serde_json::to_string(response)
        .inspect_err(|e| warn!(error = %e, "dropping unserializable websocket message"))
        .ok()
}

/// `false` once the socket is gone.
async fn send(socket: &mut WebSocket, response: &WsResponse) -> bool {
    match encode(response) {
        Some(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        None => true,
    }
}

async fn current_frame<S: TraceSource>(session: &Session<S>) -> WsResponse {
    match session.frame().await {
        Ok(frame) => WsResponse::Frame(frame),
        Err(e) => WsResponse::Error {
            error: e.to_string(),
        },
    }
}

async fn handle_ws_command<S: TraceSource>(session: &Session<S>, cmd: WsCommand) -> Result<(), Error> {
    match cmd {
        WsCommand::GetFrame => {}
        WsCommand::Play => {
            session.play().await?;
        }
        WsCommand::Pause => {
            session.pause().await?;
        }
        WsCommand::Reset => {
            session.reset().await?;
        }
        WsCommand::Step { direction } => {
            step(session, direction).await?;
        }
        WsCommand::Seek { index } => {
            session.seek(index).await?;
        }
        WsCommand::Speed { interval_ms } => {
            session.set_speed(Duration::from_millis(interval_ms)).await?;
        }
    }
    Ok(())
}

/// Push a frame on connect and after every playback change; accept commands.
async fn handle_ws<S: TraceSource>(mut socket: WebSocket, session: Session<S>) {
    let mut changes = session.player().watch_status();
    changes.borrow_and_update();

    if !send(&mut socket, &current_frame(&session).await).await {
        return;
    }

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                if !send(&mut socket, &current_frame(&session).await).await {
                    break;
                }
            }
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let reply = match serde_json::from_str::<WsCommand>(&text) {
                            Ok(WsCommand::GetFrame) => current_frame(&session).await,
                            Ok(cmd) => match handle_ws_command(&session, cmd).await {
                                Ok(()) => continue,
                                Err(e) => WsResponse::Error { error: e.to_string() },
                            },
                            Err(e) => WsResponse::Error {
                                error: format!("invalid command: {e}"),
                            },
                        };
                        if !send(&mut socket, &reply).await {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    }
    debug!("websocket closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisConfig;
    use codesense_trace::{Step, TraceError};

    struct NoSource;

    impl TraceSource for NoSource {
        async fn visualize(&self, _: &TraceRequest) -> Result<Vec<Step>, ClientError> {
            Err(ClientError::Trace(TraceError::OutOfRange))
        }

        async fn explain(&self, _: &TraceRequest) -> Result<Explanation, ClientError> {
            Ok(Explanation::default())
        }

        async fn detect_bugs(&self, _: &TraceRequest) -> Result<BugReport, ClientError> {
            Ok(BugReport::default())
        }
    }

    #[tokio::test]
    async fn router_builds() {
        let session = Session::new(NoSource, &VisConfig::default()).unwrap();
        let server = VisServer::new(session);
        let _router = server.router();
    }

    #[test]
    fn ws_frame_before_load_has_no_step() {
        let response = tokio_test::block_on(async {
            let session = Session::new(NoSource, &VisConfig::default()).unwrap();
            current_frame(&session).await
        });
        match response {
            WsResponse::Frame(frame) => {
                assert!(frame.step.is_none());
                assert_eq!(frame.status.total_steps, 0);
            }
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[test]
    fn ws_responses_encode_with_type_tag() {
        let json = encode(&WsResponse::Error {
            error: "no steps".to_string(),
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::json!({"type": "error", "error": "no steps"}));

        let json = encode(&WsResponse::Frame(Frame {
            status: PlaybackStatus::default(),
            step: None,
        }))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "frame");
        assert_eq!(value["status"]["total_steps"], 0);
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            ApiError(Error::Playback(PlaybackError::NoSteps)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError(Error::Input(codesense_trace::InputError::EmptyCode)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError(Error::PlayerStopped).status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn ws_commands_parse() {
        let cmd: WsCommand = serde_json::from_str(r#"{"type": "step", "direction": "backward"}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Step { direction: Direction::Backward }));
        let cmd: WsCommand = serde_json::from_str(r#"{"type": "speed", "interval_ms": 250}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Speed { interval_ms: 250 }));
    }
}
