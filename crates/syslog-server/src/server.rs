//! Server façade (C9): configure → boot → wait → kill lifecycle.
//!
//! Grounded on the Go library's `Server` object (`original_source/server.go`)
//! for the shape of the operations, and on DataDog-libdatadog's use of
//! `tokio_util::sync::CancellationToken` for the single shared
//! shutdown signal (Design Note 9(d)), replacing the source's
//! per-transport channel pair.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;

use syslog_rfc::ParseError;

use crate::dispatcher::{
    datagram_channel, spawn_datagram_parser, spawn_datagram_receiver, spawn_tcp_accept_loop,
    spawn_tls_accept_loop, DatagramSocket, Shared,
};
use crate::error::{ServerError, ServerResult};
use crate::format::Format;
use crate::handler::Handler;
use crate::listener::{listen_tcp, listen_tcp_tls, listen_udp, listen_unixgram, Listener};

/// Aggregates listeners, the configured format/handler/timeout, and
/// shutdown/error state (spec §3's "Server entity").
pub struct Server {
    format: Option<Format>,
    handler: Option<Arc<dyn Handler>>,
    timeout_ms: u64,
    listeners: Vec<Listener>,
    unixgram_paths: Vec<String>,
    shared: Option<Arc<Shared>>,
    tasks: Vec<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl Server {
    pub fn new() -> Self {
        Server {
            format: None,
            handler: None,
            timeout_ms: 0,
            listeners: Vec::new(),
            unixgram_paths: Vec::new(),
            shared: None,
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn set_format(&mut self, format: Format) -> &mut Self {
        self.format = Some(format);
        self
    }

    pub fn set_handler(&mut self, handler: Arc<dyn Handler>) -> &mut Self {
        self.handler = Some(handler);
        self
    }

    /// `0` means no deadline; positive values apply to every stream
    /// read and every datagram read.
    pub fn set_timeout(&mut self, timeout_ms: u64) -> &mut Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn listen_udp(&mut self, addr: &str) -> ServerResult<()> {
        self.listeners.push(listen_udp(addr)?);
        Ok(())
    }

    pub fn listen_unixgram(&mut self, path: &str) -> ServerResult<()> {
        self.listeners.push(listen_unixgram(path)?);
        self.unixgram_paths.push(path.to_string());
        Ok(())
    }

    pub async fn listen_tcp(&mut self, addr: &str) -> ServerResult<()> {
        self.listeners.push(listen_tcp(addr).await?);
        Ok(())
    }

    pub async fn listen_tcp_tls(
        &mut self,
        addr: &str,
        tls_config: Arc<rustls::ServerConfig>,
    ) -> ServerResult<()> {
        self.listeners.push(listen_tcp_tls(addr, tls_config).await?);
        Ok(())
    }

    /// Starts all accept and receive tasks; returns immediately after
    /// scheduling.
    pub fn boot(&mut self) -> ServerResult<()> {
        let format = self.format.ok_or(ServerError::FormatUnset)?;
        let handler = self.handler.clone().ok_or(ServerError::HandlerUnset)?;

        let shared = Arc::new(Shared {
            format,
            handler,
            timeout_ms: self.timeout_ms,
            last_error: Mutex::new(None),
            shutdown: self.shutdown.clone(),
        });

        let mut datagram_sockets = Vec::new();

        for listener in self.listeners.drain(..) {
            match listener {
                Listener::Tcp(l) => {
                    self.tasks.push(spawn_tcp_accept_loop(l, shared.clone()));
                }
                Listener::TcpTls(l, tls_config) => {
                    let acceptor = TlsAcceptor::from(tls_config);
                    self.tasks
                        .push(spawn_tls_accept_loop(l, acceptor, shared.clone()));
                }
                Listener::Udp(s) => datagram_sockets.push(DatagramSocket::Udp(s)),
                Listener::Unixgram(s) => datagram_sockets.push(DatagramSocket::Unixgram(s)),
            }
        }

        if !datagram_sockets.is_empty() {
            let (tx, rx) = datagram_channel();
            for socket in datagram_sockets {
                self.tasks
                    .push(spawn_datagram_receiver(socket, shared.clone(), tx.clone()));
            }
            drop(tx);
            self.tasks.push(spawn_datagram_parser(rx, shared.clone()));
        }

        self.shared = Some(shared);
        tracing::info!(task_count = self.tasks.len(), "server booted");
        Ok(())
    }

    /// Blocks until every scheduled task has exited.
    pub async fn wait(&mut self) {
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }

    /// Releases resources and signals shutdown; returns the first
    /// close error encountered, or `None` (spec §4.9). Idempotent:
    /// cancelling an already-cancelled token is a no-op and a
    /// previously removed socket path simply yields nothing to close
    /// on a repeat call, so repeat calls are harmless.
    ///
    /// A bound Unix datagram socket owns a filesystem path that
    /// outlives the `UnixDatagram` handle moved into its receive task
    /// at `Boot` (`listener.rs::listen_unixgram`'s `bind` creates the
    /// node; dropping the handle does not unlink it) — `Kill` is the
    /// one place left with a synchronous, fallible resource release to
    /// perform and report on. TCP/UDP sockets have no such explicit
    /// close step in this stack: their descriptors are released when
    /// the spawned tasks exit after observing `shutdown`.
    pub fn kill(&mut self) -> Option<ServerError> {
        tracing::info!("server shutdown requested");
        let mut first_error = None;
        for path in self.unixgram_paths.drain(..) {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path, error = %e, "failed to remove unix datagram socket");
                    first_error.get_or_insert(ServerError::Io(e));
                }
            }
        }
        self.shutdown.cancel();
        first_error
    }

    /// Most recent per-record parse error. Advisory — races with
    /// concurrent parses (spec §5).
    pub fn last_error(&self) -> Option<ParseError> {
        self.shared
            .as_ref()
            .and_then(|s| s.last_error.lock().unwrap().clone())
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}
