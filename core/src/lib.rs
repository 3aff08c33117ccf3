//! Synchronous client core for the GBA device-testing API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). `GbaApi` pairs the client
//! with a caller-supplied `Transport` so each operation is one blocking call.
//!
//! # Design
//! - `GbaClient` holds only its resolved `Config`; environment overrides are
//!   applied once, before construction.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use api::GbaApi;
pub use client::GbaClient;
pub use config::{Config, Credential};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportFailure};
pub use types::{
    App, Device, Properties, ServerVersionInfo, Session, StartSessionOptions, StopSessionOptions,
};
