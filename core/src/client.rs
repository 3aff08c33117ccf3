//! Stateless HTTP request builder and response parser for the GBA API.
//!
//! # Design
//! `GbaClient` holds only its resolved `Config` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. `GbaApi` joins the two around a `Transport`.
//!
//! Only the statuses each endpoint documents are read as `{"error": "..."}`
//! bodies. Anything else falls through to normal decoding.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::config::{Config, Credential};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    App, Device, ErrorBody, GenerateSessionJsonRequest, Properties, ServerVersionInfo, Session,
    ShellCommandRequest, StartSessionOptions, StartSessionRequest, StopSessionOptions,
    StopSessionRequest,
};

const START_SESSION_ERRORS: &[u16] = &[400, 401];
const SET_PROPERTIES_ERRORS: &[u16] = &[400, 404, 500];
const COMMAND_ERRORS: &[u16] = &[400, 500];

/// Synchronous, stateless client for the GBA API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct GbaClient {
    config: Config,
}

impl GbaClient {
    pub fn new(mut config: Config) -> Self {
        let trimmed = config.base_url.trim_end_matches('/').len();
        config.base_url.truncate(trimmed);
        Self { config }
    }

    /// Build a client after applying `GBA_*` environment overrides to `config`.
    pub fn from_env(config: Config) -> Self {
        Self::new(config.with_env_overrides())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn credential(&self) -> Credential {
        self.config.credential()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url(path))
    }

    fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::new(HttpMethod::Post, self.url(path)).with_json(to_json(body)?))
    }

    // -- devices ------------------------------------------------------------

    pub fn build_list_devices(&self) -> HttpRequest {
        self.get("/devices")
    }

    pub fn build_get_device(&self, device_id: &str) -> HttpRequest {
        self.get(&format!("/devices/{device_id}"))
    }

    pub fn build_get_device_apps(&self, device_id: &str) -> HttpRequest {
        self.get(&format!("/devices/{device_id}/apps"))
    }

    pub fn build_enable_wifi_prof(&self, device_id: &str) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Post,
            self.url(&format!("/devices/{device_id}/enable-wifi-prof")),
        )
    }

    pub fn build_disable_wifi_prof(&self, device_id: &str) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Post,
            self.url(&format!("/devices/{device_id}/disable-wifi-prof")),
        )
    }

    pub fn build_execute_shell_command(
        &self,
        device_id: &str,
        command: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = ShellCommandRequest {
            command: command.to_string(),
        };
        self.post_json(&format!("/devices/{device_id}/shell"), &body)
    }

    /// Lenient by contract: a body that does not decode as a device list
    /// yields an empty list rather than an error, whatever the status.
    pub fn parse_list_devices(&self, response: HttpResponse) -> Result<Vec<Device>, ApiError> {
        match decode(&response.body) {
            Ok(devices) => Ok(devices),
            Err(err) => {
                warn!(status = response.status, error = %err, "ignoring undecodable device list");
                Ok(Vec::new())
            }
        }
    }

    pub fn parse_get_device(&self, response: HttpResponse) -> Result<Device, ApiError> {
        check_not_found(&response)?;
        decode(&response.body)
    }

    pub fn parse_get_device_apps(&self, response: HttpResponse) -> Result<Vec<App>, ApiError> {
        check_not_found(&response)?;
        decode(&response.body)
    }

    pub fn parse_enable_wifi_prof(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_error_status(&response, COMMAND_ERRORS)
    }

    pub fn parse_disable_wifi_prof(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_error_status(&response, COMMAND_ERRORS)
    }

    /// Returns the command output as the server sent it.
    pub fn parse_execute_shell_command(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_error_status(&response, COMMAND_ERRORS)?;
        Ok(response.body)
    }

    // -- sessions -----------------------------------------------------------

    pub fn build_list_sessions(&self) -> HttpRequest {
        self.get("/sessions")
    }

    /// The credential is resolved here, per request, from the current config.
    pub fn build_start_session(
        &self,
        device_id: &str,
        app_id: &str,
        options: Option<&StartSessionOptions>,
    ) -> Result<HttpRequest, ApiError> {
        let defaults = StartSessionOptions::default();
        let body = StartSessionRequest::new(
            device_id,
            app_id,
            options.unwrap_or(&defaults),
            self.config.username.as_deref(),
            &self.credential(),
        );
        self.post_json("/sessions", &body)
    }

    pub fn build_stop_session(
        &self,
        session_id: &str,
        options: Option<&StopSessionOptions>,
    ) -> Result<HttpRequest, ApiError> {
        let body = options
            .map(StopSessionRequest::from)
            .unwrap_or_else(|| StopSessionRequest::from(&StopSessionOptions::default()));
        self.post_json(&format!("/sessions/{session_id}/stop"), &body)
    }

    pub fn build_sync(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Post, self.url("/sessions/sync"))
    }

    pub fn build_generate_session_json(
        &self,
        session_path: &str,
        target_path: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = GenerateSessionJsonRequest {
            session_path: session_path.to_string(),
            target_path: target_path.to_string(),
        };
        self.post_json("/generate-json", &body)
    }

    pub fn parse_list_sessions(&self, response: HttpResponse) -> Result<Vec<Session>, ApiError> {
        decode(&response.body)
    }

    pub fn parse_start_session(&self, response: HttpResponse) -> Result<Session, ApiError> {
        check_error_status(&response, START_SESSION_ERRORS)?;
        decode(&response.body)
    }

    /// The stop response is handed back untouched; its format is the
    /// caller's concern.
    pub fn parse_stop_session(&self, response: HttpResponse) -> Result<String, ApiError> {
        Ok(response.body)
    }

    pub fn parse_sync(&self, _response: HttpResponse) -> Result<(), ApiError> {
        Ok(())
    }

    pub fn parse_generate_session_json(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_error_status(&response, COMMAND_ERRORS)
    }

    // -- server -------------------------------------------------------------

    pub fn build_get_properties(&self) -> HttpRequest {
        self.get("/properties")
    }

    pub fn build_set_properties(&self, properties: &Properties) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::new(HttpMethod::Put, self.url("/properties")).with_json(to_json(properties)?))
    }

    pub fn build_get_server_version_info(&self) -> HttpRequest {
        self.get("/version")
    }

    pub fn parse_get_properties(&self, response: HttpResponse) -> Result<Properties, ApiError> {
        decode(&response.body)
    }

    pub fn parse_set_properties(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_error_status(&response, SET_PROPERTIES_ERRORS)
    }

    pub fn parse_get_server_version_info(
        &self,
        response: HttpResponse,
    ) -> Result<ServerVersionInfo, ApiError> {
        check_error_status(&response, COMMAND_ERRORS)?;
        decode(&response.body)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn check_not_found(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Ok(())
}

/// Turn a documented error status into `ApiError::Server` carrying the
/// body's `error` text. Other statuses pass.
///
/// A body without a string `error` field, `{}` included, is a `Decode`
/// error rather than a `Server` error with an empty message, unlike the Go
/// client this API was first served to.
fn check_error_status(response: &HttpResponse, documented: &[u16]) -> Result<(), ApiError> {
    if !documented.contains(&response.status) {
        return Ok(());
    }
    let body: ErrorBody = decode(&response.body)?;
    Err(ApiError::Server {
        status: response.status,
        message: body.error,
    })
}
