use std::{fmt, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::Mutex, task::JoinHandle};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use proofuino_common::{
    ProofState, RelayState, StatusSnapshot, TargetUpdate, PATH_CONFIG, PATH_OFF, PATH_ON,
    PATH_STATUS, PATH_TEMPERATURE,
};

/// A command as the mock device saw it arrive.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceivedCommand {
    Target { path: String, value: f32 },
    On,
    Off,
}

impl fmt::Display for ReceivedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target { path, value } => write!(f, "{path} target {value}°C"),
            Self::On => write!(f, "{PATH_ON}"),
            Self::Off => write!(f, "{PATH_OFF}"),
        }
    }
}

#[derive(Debug)]
struct MockState {
    snapshot: StatusSnapshot,
    received: Vec<ReceivedCommand>,
    failing: bool,
}

/// In-process stand-in for the device, used in dev mode.
#[derive(Debug, Clone)]
pub struct MockDevice {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl MockState {
    fn record(&mut self, command: ReceivedCommand) {
        info!("mock device received {command}");
        self.received.push(command);
    }
}

impl MockDevice {
    pub fn new(snapshot: StatusSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                snapshot,
                received: Vec::new(),
                failing: false,
            })),
        }
    }

    pub fn mocked() -> Self {
        Self::new(StatusSnapshot {
            state: ProofState::Other("MOCKED".to_string()),
            target_temp_c: 999.0,
            relay: RelayState::On,
            dough_temp_c: 123.0,
            box_temp_c: 123.0,
        })
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(PATH_STATUS, get(handle_get_status))
            .route(PATH_CONFIG, post(handle_set_target))
            .route(PATH_TEMPERATURE, post(handle_set_target))
            .route(PATH_ON, post(handle_on))
            .route(PATH_OFF, post(handle_off))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    #[cfg(test)]
    pub async fn received(&self) -> Vec<ReceivedCommand> {
        self.inner.lock().await.received.clone()
    }

    #[cfg(test)]
    pub async fn snapshot(&self) -> StatusSnapshot {
        self.inner.lock().await.snapshot.clone()
    }

    #[cfg(test)]
    pub async fn set_failing(&self, failing: bool) {
        self.inner.lock().await.failing = failing;
    }
}

pub async fn serve(
    device: MockDevice,
    addr: SocketAddr,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind mock device at {addr}"))?;
    let local = listener
        .local_addr()
        .context("failed to read mock device address")?;

    let app = device.router();
    let handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            warn!("mock device stopped: {err}");
        }
    });

    info!("mock device listening on http://{local}");
    Ok((local, handle))
}

async fn handle_get_status(State(device): State<MockDevice>) -> impl IntoResponse {
    let state = device.inner.lock().await;
    if state.failing {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Sensors unavailable");
    }
    Json(state.snapshot.clone()).into_response()
}

async fn handle_set_target(
    State(device): State<MockDevice>,
    uri: Uri,
    Json(update): Json<TargetUpdate>,
) -> impl IntoResponse {
    if !update.target.is_finite() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid temperature value");
    }

    let mut state = device.inner.lock().await;
    state.snapshot.target_temp_c = update.target;
    state.record(ReceivedCommand::Target {
        path: uri.path().to_string(),
        value: update.target,
    });
    StatusCode::OK.into_response()
}

async fn handle_on(State(device): State<MockDevice>) -> impl IntoResponse {
    let mut state = device.inner.lock().await;
    state.snapshot.state = ProofState::Start;
    state.record(ReceivedCommand::On);
    StatusCode::OK
}

async fn handle_off(State(device): State<MockDevice>) -> impl IntoResponse {
    let mut state = device.inner.lock().await;
    state.snapshot.state = ProofState::Paused;
    state.snapshot.relay = RelayState::Off;
    state.record(ReceivedCommand::Off);
    StatusCode::OK
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
