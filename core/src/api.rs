//! One-call-per-operation facade over `GbaClient` and a `Transport`.
//!
//! Every method is a single blocking exchange: build, execute, parse. A
//! failed exchange is returned as-is; nothing is retried.

use tracing::{debug, warn};

use crate::client::GbaClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{
    App, Device, Properties, ServerVersionInfo, Session, StartSessionOptions, StopSessionOptions,
};

#[derive(Debug, Clone)]
pub struct GbaApi<T> {
    client: GbaClient,
    transport: T,
}

impl<T: Transport> GbaApi<T> {
    pub fn new(client: GbaClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &GbaClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        let response = self.transport.execute(&request).map_err(|e| {
            warn!(method = request.method.as_str(), path = %request.path, error = %e, "transport failure");
            ApiError::Transport(e)
        })?;
        debug!(status = response.status, path = %request.path, "received response");
        Ok(response)
    }

    pub fn list_devices(&self) -> Result<Vec<Device>, ApiError> {
        let response = self.send(self.client.build_list_devices())?;
        self.client.parse_list_devices(response)
    }

    pub fn get_device(&self, device_id: &str) -> Result<Device, ApiError> {
        let response = self.send(self.client.build_get_device(device_id))?;
        self.client.parse_get_device(response)
    }

    pub fn get_device_apps(&self, device_id: &str) -> Result<Vec<App>, ApiError> {
        let response = self.send(self.client.build_get_device_apps(device_id))?;
        self.client.parse_get_device_apps(response)
    }

    pub fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        let response = self.send(self.client.build_list_sessions())?;
        self.client.parse_list_sessions(response)
    }

    pub fn start_session(
        &self,
        device_id: &str,
        app_id: &str,
        options: Option<&StartSessionOptions>,
    ) -> Result<Session, ApiError> {
        let request = self.client.build_start_session(device_id, app_id, options)?;
        let response = self.send(request)?;
        self.client.parse_start_session(response)
    }

    /// Returns the raw response body.
    pub fn stop_session(
        &self,
        session_id: &str,
        options: Option<&StopSessionOptions>,
    ) -> Result<String, ApiError> {
        let request = self.client.build_stop_session(session_id, options)?;
        let response = self.send(request)?;
        self.client.parse_stop_session(response)
    }

    pub fn sync(&self) -> Result<(), ApiError> {
        let response = self.send(self.client.build_sync())?;
        self.client.parse_sync(response)
    }

    pub fn get_properties(&self) -> Result<Properties, ApiError> {
        let response = self.send(self.client.build_get_properties())?;
        self.client.parse_get_properties(response)
    }

    pub fn set_properties(&self, properties: &Properties) -> Result<(), ApiError> {
        let request = self.client.build_set_properties(properties)?;
        let response = self.send(request)?;
        self.client.parse_set_properties(response)
    }

    pub fn generate_session_json(
        &self,
        session_path: &str,
        target_path: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .build_generate_session_json(session_path, target_path)?;
        let response = self.send(request)?;
        self.client.parse_generate_session_json(response)
    }

    pub fn enable_wifi_prof(&self, device_id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_enable_wifi_prof(device_id))?;
        self.client.parse_enable_wifi_prof(response)
    }

    pub fn disable_wifi_prof(&self, device_id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_disable_wifi_prof(device_id))?;
        self.client.parse_disable_wifi_prof(response)
    }

    pub fn get_server_version_info(&self) -> Result<ServerVersionInfo, ApiError> {
        let response = self.send(self.client.build_get_server_version_info())?;
        self.client.parse_get_server_version_info(response)
    }

    pub fn execute_shell_command_on_device(
        &self,
        device_id: &str,
        command: &str,
    ) -> Result<String, ApiError> {
        let request = self.client.build_execute_shell_command(device_id, command)?;
        let response = self.send(request)?;
        self.client.parse_execute_shell_command(response)
    }
}
