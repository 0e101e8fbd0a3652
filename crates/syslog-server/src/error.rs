//! Server-level error types.
//!
//! Grounded on `zc-mqtt-channel::error::MqttError`'s shape: a flat
//! enum of string-carrying variants plus a crate-local `Result` alias.

use thiserror::Error;

/// Errors raised by listener setup, boot configuration, or TLS
/// material loading. Per-record parse errors live in
/// `syslog_rfc::ParseError` and never appear here — they are advisory
/// (spec §7) rather than fatal to the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format not set before boot")]
    FormatUnset,

    #[error("handler not set before boot")]
    HandlerUnset,

    #[error("TLS error: {0}")]
    Tls(String),
}

pub type ServerResult<T> = Result<T, ServerError>;
