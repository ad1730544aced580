//! korekto-client: network side of the scoring operator.
//!
//! Provides the HTTP [`ScoringTransport`](korekto_core::ScoringTransport)
//! implementation, a recording transport for tests, and loading of the
//! endpoint configuration from TOML and the environment.

pub mod config;
pub mod http;
pub mod recording;

pub use config::{load_config, load_config_from, validate_endpoint_config, KorektoConfig};
pub use http::HttpTransport;
pub use recording::{CannedReply, RecordingTransport};
