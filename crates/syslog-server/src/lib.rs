//! Concurrent syslog listener, framing, and dispatch.
//!
//! Pairs with `syslog-rfc` for wire parsing. This crate owns sockets,
//! stream framing, TLS termination, and the concurrency model that
//! turns raw bytes on the wire into [`Handler::handle`] calls.

mod dispatcher;
mod error;
mod format;
mod framing;
mod handler;
mod listener;
mod server;
mod tls;

pub use error::{ServerError, ServerResult};
pub use format::Format;
pub use handler::{ChannelHandler, DeliveredRecord, Handler};
pub use server::Server;
pub use tls::{build_server_config, peer_common_name, TlsPaths};

pub use syslog_rfc::{LogParts, ParseError, Rfc3164Parts, Rfc5424Parts};
