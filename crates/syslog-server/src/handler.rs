//! The application handler contract (§6) and a channel-based helper.
//!
//! Grounded on `zc-mqtt-channel::channel::Channel` and
//! `zc-log-tools::types::LogTool`: both are `#[async_trait] pub trait
//! ...: Send + Sync` so implementations may do async I/O without
//! blocking a dispatcher worker.

use async_trait::async_trait;
use syslog_rfc::{LogParts, ParseError};
use tokio::sync::mpsc;

/// Receives one parsed record per invocation.
///
/// `message_length` is the raw byte count of the record as delivered
/// to the parser: post-framing-strip, pre-BOM-strip. `parse_error` may
/// be `Some` even when `parts` is only partially populated — the
/// dispatcher hands over whatever the parser produced regardless of
/// whether it errored (spec §7).
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, parts: LogParts, message_length: usize, parse_error: Option<ParseError>);
}

#[async_trait]
impl<F> Handler for F
where
    F: Fn(LogParts, usize, Option<ParseError>) + Send + Sync,
{
    async fn handle(&self, parts: LogParts, message_length: usize, parse_error: Option<ParseError>) {
        (self)(parts, message_length, parse_error)
    }
}

/// One record delivered by [`ChannelHandler`].
pub struct DeliveredRecord {
    pub parts: LogParts,
    pub message_length: usize,
    pub parse_error: Option<ParseError>,
}

/// Forwards every parsed record into a caller-owned `mpsc` channel.
///
/// The spec's §6 "channel-based handler" never blocks indefinitely on
/// an unbounded queue, but this helper intentionally accepts a bounded
/// sender: back-pressure flowing from a slow consumer into the
/// dispatcher's per-record `tokio::spawn` is the documented mode (spec
/// §4.8's datagram queue has the same shape).
pub struct ChannelHandler {
    sender: mpsc::Sender<DeliveredRecord>,
}

impl ChannelHandler {
    pub fn new(sender: mpsc::Sender<DeliveredRecord>) -> Self {
        ChannelHandler { sender }
    }
}

#[async_trait]
impl Handler for ChannelHandler {
    async fn handle(&self, parts: LogParts, message_length: usize, parse_error: Option<ParseError>) {
        let record = DeliveredRecord {
            parts,
            message_length,
            parse_error,
        };
        if self.sender.send(record).await.is_err() {
            tracing::debug!("channel handler's receiver dropped, discarding record");
        }
    }
}
