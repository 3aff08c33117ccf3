use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct App {
    pub identifier: String,
    pub debuggable: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub device_id: String,
    pub app_id: String,
    pub auto_sync: bool,
    pub screenshots: bool,
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSession {
    pub device_id: String,
    pub app_id: String,
    #[serde(default)]
    pub auto_sync: bool,
    #[serde(default)]
    pub screenshots: bool,
    pub tags: Option<BTreeMap<String, String>>,
    pub username: Option<String>,
    pub pass_or_token: Option<String>,
    pub use_token: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSession {
    #[serde(default)]
    pub include_session_json_in_response: bool,
    pub output_dir: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateJson {
    #[serde(default)]
    pub session_path: String,
    #[serde(default)]
    pub target_path: String,
}

#[derive(Deserialize)]
pub struct ShellCommand {
    #[serde(default)]
    pub command: String,
}

pub const MAJOR_VERSION: &str = "3";
pub const BUILD_NUMBER: i64 = 1024;
pub const COMMIT_HASH: &str = "0b1c2d3";

#[derive(Debug)]
pub struct DeviceEntry {
    pub device: Device,
    pub apps: Vec<App>,
    pub wifi_prof: bool,
}

/// Everything the mock keeps between requests.
#[derive(Debug, Default)]
pub struct ServerState {
    pub devices: BTreeMap<String, DeviceEntry>,
    pub sessions: BTreeMap<String, SessionRecord>,
    pub properties: Map<String, Value>,
    pub syncs: u64,
    /// When set, session starts carrying a different `passOrToken` get a 401.
    pub secret: Option<String>,
}

impl ServerState {
    /// Two devices, one of them with installed apps.
    pub fn seeded() -> Self {
        let mut state = Self::default();
        state.add_device(
            "HT83G1C00069",
            "Pixel 2",
            vec![
                App {
                    identifier: "com.example.app".to_string(),
                    debuggable: true,
                },
                App {
                    identifier: "com.android.chrome".to_string(),
                    debuggable: false,
                },
            ],
        );
        state.add_device("R58M41XYZ", "Galaxy S10", Vec::new());
        state
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn add_device(&mut self, id: &str, name: &str, apps: Vec<App>) {
        let device = Device {
            id: id.to_string(),
            name: name.to_string(),
        };
        self.devices.insert(
            id.to_string(),
            DeviceEntry {
                device,
                apps,
                wifi_prof: false,
            },
        );
    }
}

pub type Db = Arc<RwLock<ServerState>>;

pub fn app() -> Router {
    app_with(ServerState::seeded())
}

pub fn app_with(state: ServerState) -> Router {
    router(shared(state))
}

pub fn shared(state: ServerState) -> Db {
    Arc::new(RwLock::new(state))
}

/// Router over caller-held state, so tests can inspect it after requests.
pub fn router(db: Db) -> Router {
    Router::new()
        .route("/devices", get(list_devices))
        .route("/devices/{id}", get(get_device))
        .route("/devices/{id}/apps", get(get_device_apps))
        .route("/devices/{id}/enable-wifi-prof", post(enable_wifi_prof))
        .route("/devices/{id}/disable-wifi-prof", post(disable_wifi_prof))
        .route("/devices/{id}/shell", post(shell))
        .route("/sessions", get(list_sessions).post(start_session))
        .route("/sessions/sync", post(sync))
        .route("/sessions/{id}/stop", post(stop_session))
        .route("/properties", get(get_properties).put(set_properties))
        .route("/generate-json", post(generate_json))
        .route("/version", get(version))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn list_devices(State(db): State<Db>) -> Json<Vec<Device>> {
    let state = db.read().await;
    Json(state.devices.values().map(|e| e.device.clone()).collect())
}

async fn get_device(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let state = db.read().await;
    match state.devices.get(&id) {
        Some(entry) => Json(entry.device.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "device not found"),
    }
}

async fn get_device_apps(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let state = db.read().await;
    match state.devices.get(&id) {
        Some(entry) => Json(entry.apps.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "device not found"),
    }
}

async fn set_wifi_prof(db: Db, id: String, enabled: bool) -> Response {
    let mut state = db.write().await;
    match state.devices.get_mut(&id) {
        Some(entry) => {
            entry.wifi_prof = enabled;
            StatusCode::OK.into_response()
        }
        None => error(StatusCode::BAD_REQUEST, &format!("unknown device {id}")),
    }
}

async fn enable_wifi_prof(State(db): State<Db>, Path(id): Path<String>) -> Response {
    set_wifi_prof(db, id, true).await
}

async fn disable_wifi_prof(State(db): State<Db>, Path(id): Path<String>) -> Response {
    set_wifi_prof(db, id, false).await
}

/// Only `echo` does anything; other commands answer like a shell that lacks them.
async fn shell(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<ShellCommand>,
) -> Response {
    let state = db.read().await;
    if !state.devices.contains_key(&id) {
        return error(StatusCode::BAD_REQUEST, &format!("unknown device {id}"));
    }
    let command = input.command.trim();
    if command.is_empty() {
        return error(StatusCode::BAD_REQUEST, "command must not be empty");
    }
    let output = match command.strip_prefix("echo ") {
        Some(rest) => format!("{rest}\n"),
        None => format!("sh: {command}: not found\n"),
    };
    (StatusCode::OK, output).into_response()
}

async fn list_sessions(State(db): State<Db>) -> Json<Vec<Session>> {
    let state = db.read().await;
    Json(
        state
            .sessions
            .keys()
            .map(|id| Session { id: id.clone() })
            .collect(),
    )
}

async fn start_session(State(db): State<Db>, Json(input): Json<StartSession>) -> Response {
    let mut state = db.write().await;
    if let Some(secret) = &state.secret {
        if input.pass_or_token.as_deref() != Some(secret.as_str()) {
            tracing::debug!(
                username = input.username.as_deref().unwrap_or_default(),
                use_token = input.use_token.unwrap_or_default(),
                "rejecting session start"
            );
            return error(StatusCode::UNAUTHORIZED, "bad credentials");
        }
    }
    if !state.devices.contains_key(&input.device_id) {
        return error(
            StatusCode::BAD_REQUEST,
            &format!("unknown device {}", input.device_id),
        );
    }
    let record = SessionRecord {
        id: Uuid::new_v4().to_string(),
        device_id: input.device_id,
        app_id: input.app_id,
        auto_sync: input.auto_sync,
        screenshots: input.screenshots,
        tags: input.tags,
    };
    let session = Session {
        id: record.id.clone(),
    };
    state.sessions.insert(record.id.clone(), record);
    (StatusCode::CREATED, Json(session)).into_response()
}

/// Answers in JSON only when asked to; otherwise a plain text line.
async fn stop_session(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<StopSession>,
) -> Response {
    let mut state = db.write().await;
    let Some(record) = state.sessions.remove(&id) else {
        return error(StatusCode::NOT_FOUND, "session not found");
    };
    if input.include_session_json_in_response {
        return Json(record).into_response();
    }
    let text = match input.output_dir {
        Some(dir) => format!("session {id} stopped, written to {dir}"),
        None => format!("session {id} stopped"),
    };
    (StatusCode::OK, text).into_response()
}

async fn sync(State(db): State<Db>) -> StatusCode {
    db.write().await.syncs += 1;
    StatusCode::OK
}

async fn get_properties(State(db): State<Db>) -> Json<Map<String, Value>> {
    Json(db.read().await.properties.clone())
}

async fn set_properties(State(db): State<Db>, body: String) -> Response {
    match serde_json::from_str::<Map<String, Value>>(&body) {
        Ok(properties) => {
            db.write().await.properties = properties;
            StatusCode::OK.into_response()
        }
        Err(e) => error(StatusCode::BAD_REQUEST, &format!("invalid properties: {e}")),
    }
}

async fn generate_json(Json(input): Json<GenerateJson>) -> Response {
    if input.session_path.is_empty() || input.target_path.is_empty() {
        return error(
            StatusCode::BAD_REQUEST,
            "sessionPath and targetPath are required",
        );
    }
    StatusCode::OK.into_response()
}

async fn version() -> Json<Value> {
    Json(serde_json::json!({
        "majorVersion": MAJOR_VERSION,
        "buildNumber": BUILD_NUMBER,
        "commitHash": COMMIT_HASH,
    }))
}
