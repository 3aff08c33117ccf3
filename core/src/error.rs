//! Error types for the GBA API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant so callers can treat an absent device
//! as a non-fatal case. Documented error statuses carry a `{"error": "..."}`
//! body whose text lands verbatim in `Server::message`; the variant displays
//! as that text alone.

use thiserror::Error;

use crate::http::TransportFailure;

/// Errors returned by `GbaClient` parse methods and `GbaApi` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The exchange never produced a response.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportFailure),

    /// The server returned 404 for a device-scoped lookup.
    #[error("device not found")]
    NotFound,

    /// The server answered a documented error status with an `error` message.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The response body could not be decoded into the expected type.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Status code of a `Server` error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}
