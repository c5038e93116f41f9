//! HTTP + WebSocket API for Timewarp sessions
//!
//! Endpoints:
//! - POST /session/new - Create new session (optional params patch)
//! - GET /session/{id} - Get session status
//! - POST /session/{id}/update - Apply one signal update
//! - POST /session/{id}/reset - Reset the session kernel
//! - GET /session/{id}/state - Export full state
//! - PUT /session/{id}/state - Import partial state
//! - WS /ws/{id} - Live tick updates
//! - GET /health - Health check

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::core::TimewarpKernel;
use crate::types::{
    FlowBand, FullState, ParamsPatch, SignalInput, StatePatch, TickReport,
};

/// Session state: one kernel per session, one writer at a time (the
/// session map lock serializes access).
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub kernel: TimewarpKernel,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub update_tx: broadcast::Sender<TickReport>,
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
}

/// Create new session request
#[derive(Debug, Default, Deserialize)]
pub struct NewSessionRequest {
    pub params: Option<ParamsPatch>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub step: u64,
    pub absorption: f64,
    pub timelessness: f64,
    pub subjective_dt_scale: f64,
    pub band: FlowBand,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router() -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/update", post(update_session))
        .route("/session/:id/reset", post(reset_session))
        .route(
            "/session/:id/state",
            get(export_session_state).put(import_session_state),
        )
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Json<NewSessionResponse> {
    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);

    let mut params = crate::types::KernelParams::default();
    if let Some(patch) = req.params {
        params.apply(&patch);
    }

    let session = Session {
        id: session_id.clone(),
        kernel: TimewarpKernel::new(params),
        created_at: chrono::Utc::now(),
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);

    Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    })
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let snapshot = session.kernel.get();
    Ok(Json(SessionStatusResponse {
        session_id: id,
        created_at: session.created_at,
        step: session.kernel.update_count(),
        absorption: snapshot.absorption,
        timelessness: snapshot.timelessness,
        subjective_dt_scale: snapshot.subjective_dt_scale,
        band: FlowBand::from_timelessness(snapshot.timelessness),
    }))
}

/// Apply one signal update to the session kernel
async fn update_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<SignalInput>,
) -> Result<Json<TickReport>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    let snapshot = session.kernel.update(input);
    let report = TickReport::new(session.kernel.update_count(), &snapshot);

    // Broadcast to websocket listeners
    let _ = session.update_tx.send(report.clone());

    Ok(Json(report))
}

/// Reset the session kernel to its floors
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TickReport>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session.kernel.reset();
    let report = TickReport::new(0, &session.kernel.get());
    let _ = session.update_tx.send(report.clone());

    Ok(Json(report))
}

/// Export full kernel state
async fn export_session_state(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FullState>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(session.kernel.export_state()))
}

/// Import partial kernel state
async fn import_session_state(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<StatePatch>,
) -> Result<Json<FullState>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    session.kernel.import_state(&patch);
    Ok(Json(session.kernel.export_state()))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Handle WebSocket connection
async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<TickReport>) {
    while let Ok(report) = rx.recv().await {
        let json = serde_json::to_string(&report).unwrap_or_default();
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("session_{:x}", nanos as u64)
}

/// Run the API server
pub async fn run_server(addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("⧖ Timewarp API running on {}", addr);
    println!("  POST /session/new          - Create session");
    println!("  GET  /session/:id          - Get status");
    println!("  POST /session/:id/update   - Apply signal update");
    println!("  POST /session/:id/reset    - Reset kernel");
    println!("  GET  /session/:id/state    - Export state");
    println!("  PUT  /session/:id/state    - Import state");
    println!("  WS   /ws/:id               - Live updates");
    println!("  GET  /health               - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
