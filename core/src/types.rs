//! Domain DTOs for the GBA API.
//!
//! # Design
//! These types are defined independently of the mock-server's schema;
//! integration tests catch drift between the two. Response types accept the
//! capitalized field names older servers emit alongside the lowercase ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Credential;

/// A device attached to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Name", default)]
    pub name: String,
}

/// An application installed on a device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    #[serde(alias = "Identifier")]
    pub identifier: String,
    #[serde(alias = "Debuggable", default)]
    pub debuggable: bool,
}

/// A server-side measurement session. The client tracks nothing beyond the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    #[serde(alias = "Id")]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerVersionInfo {
    pub major_version: String,
    pub build_number: i64,
    pub commit_hash: String,
}

/// Server properties, read and written wholesale.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Options for starting a session.
///
/// `tags: None` leaves the key out of the request; `Some` of an empty map
/// sends `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartSessionOptions {
    pub auto_sync: bool,
    pub screenshots: bool,
    pub tags: Option<BTreeMap<String, String>>,
}

/// Options for stopping a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopSessionOptions {
    pub include_session_json_in_response: bool,
    pub output_dir: Option<String>,
}

/// Request payload for `POST /sessions`.
///
/// The three auth fields are either all present or all absent, depending on
/// whether the client has a credential configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub device_id: String,
    pub app_id: String,
    pub auto_sync: bool,
    pub screenshots: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pass_or_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub use_token: Option<bool>,
}

impl StartSessionRequest {
    pub fn new(
        device_id: &str,
        app_id: &str,
        options: &StartSessionOptions,
        username: Option<&str>,
        credential: &Credential,
    ) -> Self {
        let (username, pass_or_token, use_token) = match credential.secret() {
            Some(secret) => (
                Some(username.unwrap_or_default().to_string()),
                Some(secret.to_string()),
                Some(credential.uses_token()),
            ),
            None => (None, None, None),
        };

        Self {
            device_id: device_id.to_string(),
            app_id: app_id.to_string(),
            auto_sync: options.auto_sync,
            screenshots: options.screenshots,
            tags: options.tags.clone(),
            username,
            pass_or_token,
            use_token,
        }
    }
}

/// Request payload for `POST /sessions/{id}/stop`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StopSessionRequest {
    pub include_session_json_in_response: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub output_dir: Option<String>,
}

impl From<&StopSessionOptions> for StopSessionRequest {
    fn from(options: &StopSessionOptions) -> Self {
        Self {
            include_session_json_in_response: options.include_session_json_in_response,
            output_dir: options.output_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSessionJsonRequest {
    pub session_path: String,
    pub target_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShellCommandRequest {
    pub command: String,
}

/// Body the server sends with documented error statuses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
