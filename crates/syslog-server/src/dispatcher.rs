//! Dispatcher (C8): per-connection scanning tasks, datagram
//! receive/parse tasks, the parser path, and handler invocation.
//!
//! Grounded on `original_source/server.go`'s `scan`/`Boot`/`Wait` loop
//! (the conceptual ancestor of this dispatch shape) and
//! `zc-fleet-agent::mqtt_loop::run`'s `loop { match eventloop.poll()
//! ... }` / `tokio::spawn` idiom for the per-connection and
//! per-datagram tasks.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::Datelike;
use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, UdpSocket, UnixDatagram};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_rustls::TlsAcceptor;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;

use syslog_rfc::ParseError;

use crate::format::Format;
use crate::framing::trim_trailing_control;
use crate::handler::Handler;
use crate::tls::peer_common_name;

/// Depth of the central datagram queue (spec §3/§4.8). A slow handler
/// back-pressures receive tasks, which is the intended mode.
const DATAGRAM_QUEUE_DEPTH: usize = 10;

const DATAGRAM_BUFFER_BYTES: usize = 64 * 1024;

/// State shared by every spawned task. Read-only after `Boot` except
/// for `last_error`'s single-writer-last-wins scalar (spec §5).
pub struct Shared {
    pub format: Format,
    pub handler: Arc<dyn Handler>,
    pub timeout_ms: u64,
    pub last_error: Mutex<Option<ParseError>>,
    pub shutdown: CancellationToken,
}

impl Shared {
    fn record_error(&self, err: &Option<ParseError>) {
        if let Some(e) = err {
            tracing::debug!(error = %e, "parse error, handler still invoked with partial parts");
            *self.last_error.lock().unwrap() = Some(e.clone());
        }
    }
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// The parser path (spec §4.8): parse the raw record, capture the
/// last error, then invoke the handler in its own task so a slow
/// handler never blocks the scanner or receiver.
fn dispatch_record(
    buf: &[u8],
    shared: &Arc<Shared>,
    peer_addr: Option<&str>,
    tls_peer: Option<&str>,
) {
    let message_length = buf.len();
    let (mut parts, err) = shared.format.parse(buf, current_year(), peer_addr);
    shared.record_error(&err);
    if let Some(cn) = tls_peer {
        parts.set_tls_peer(cn.to_string());
    }

    let handler = shared.handler.clone();
    tokio::spawn(async move {
        handler.handle(parts, message_length, err).await;
    });
}

/// Accept loop for a plain TCP listener. I/O errors on accept are
/// swallowed and the loop continues, so one malformed peer can't take
/// the listener down (spec §7).
pub fn spawn_tcp_accept_loop(listener: TcpListener, shared: Arc<Shared>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shared.shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        spawn_stream_scanner(stream, peer.to_string(), None, shared.clone());
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept error, continuing");
                    }
                },
            }
        }
        tracing::info!("TCP accept loop exited");
    })
}

/// Accept loop for a mutual-auth TLS listener. The handshake happens
/// per-connection so a hostile client stalling the handshake can't
/// block other peers from being accepted.
pub fn spawn_tls_accept_loop(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    shared: Arc<Shared>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shared.shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let acceptor = acceptor.clone();
                        let shared = shared.clone();
                        tokio::spawn(async move {
                            match acceptor.accept(stream).await {
                                Ok(tls_stream) => {
                                    let certs = tls_stream
                                        .get_ref()
                                        .1
                                        .peer_certificates()
                                        .map(<[_]>::to_vec)
                                        .unwrap_or_default();
                                    let tls_peer = peer_common_name(&certs);
                                    spawn_stream_scanner(tls_stream, peer.to_string(), tls_peer, shared);
                                }
                                Err(e) => {
                                    tracing::warn!(error = %e, "TLS handshake failed");
                                }
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept error, continuing");
                    }
                },
            }
        }
        tracing::info!("TLS accept loop exited");
    })
}

/// One scanning task per accepted connection (spec §4.8 "Stream
/// path"). Applies the format's framing decoder and loops until EOF,
/// a read-deadline expiry, or the shared shutdown signal fires.
fn spawn_stream_scanner<S>(
    stream: S,
    peer_addr: String,
    tls_peer: Option<String>,
    shared: Arc<Shared>,
) -> JoinHandle<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut framed = FramedRead::new(stream, shared.format.frame_decoder());
        loop {
            let next = next_frame(&mut framed, &shared).await;
            match next {
                Some(Ok(record)) => {
                    dispatch_record(&record, &shared, None, tls_peer.as_deref());
                }
                Some(Err(e)) => {
                    tracing::debug!(error = %e, addr = %peer_addr, "stream read error, closing connection");
                    break;
                }
                None => break,
            }
        }
        tracing::debug!(addr = %peer_addr, "scanner exited, connection closed");
    })
}

async fn next_frame<S>(
    framed: &mut FramedRead<S, crate::format::FrameDecoder>,
    shared: &Arc<Shared>,
) -> Option<Result<Bytes, std::io::Error>>
where
    S: AsyncRead + Unpin,
{
    if shared.timeout_ms == 0 {
        tokio::select! {
            _ = shared.shutdown.cancelled() => None,
            item = framed.next() => item,
        }
    } else {
        tokio::select! {
            _ = shared.shutdown.cancelled() => None,
            result = tokio::time::timeout(Duration::from_millis(shared.timeout_ms), framed.next()) => match result {
                Ok(item) => item,
                Err(_elapsed) => None,
            },
        }
    }
}

/// Either flavor of datagram socket, unified behind one receive loop.
pub enum DatagramSocket {
    Udp(UdpSocket),
    Unixgram(UnixDatagram),
}

impl DatagramSocket {
    async fn recv(&self, buf: &mut [u8]) -> std::io::Result<(usize, String)> {
        match self {
            DatagramSocket::Udp(s) => {
                let (n, addr) = s.recv_from(buf).await?;
                Ok((n, addr.ip().to_string()))
            }
            DatagramSocket::Unixgram(s) => {
                let (n, addr) = s.recv_from(buf).await?;
                let path = addr
                    .as_pathname()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "unix".to_string());
                Ok((n, path))
            }
        }
    }
}

/// One receive task per datagram socket (spec §4.8 "Datagram path").
/// Pushes `(bytes, peer)` onto the bounded central queue; back-pressure
/// there is the intended behavior for a slow handler.
pub fn spawn_datagram_receiver(
    socket: DatagramSocket,
    shared: Arc<Shared>,
    tx: mpsc::Sender<(Vec<u8>, String)>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = vec![0u8; DATAGRAM_BUFFER_BYTES];
        loop {
            let recv = if shared.timeout_ms == 0 {
                tokio::select! {
                    _ = shared.shutdown.cancelled() => break,
                    r = socket.recv(&mut buf) => r,
                }
            } else {
                tokio::select! {
                    _ = shared.shutdown.cancelled() => break,
                    r = tokio::time::timeout(Duration::from_millis(shared.timeout_ms), socket.recv(&mut buf)) => match r {
                        Ok(inner) => inner,
                        Err(_elapsed) => continue,
                    },
                }
            };

            match recv {
                Ok((n, peer)) => {
                    let trimmed = trim_trailing_control(&buf[..n]).to_vec();
                    if tx.send((trimmed, peer)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "datagram read error, receiver exiting");
                    break;
                }
            }
        }
        tracing::debug!("datagram receiver exited");
    })
}

/// The single central datagram parse task (spec §4.8: "exactly one
/// central parse task is spawned on Boot if any datagram socket
/// exists").
pub fn spawn_datagram_parser(
    mut rx: mpsc::Receiver<(Vec<u8>, String)>,
    shared: Arc<Shared>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shared.shutdown.cancelled() => break,
                msg = rx.recv() => match msg {
                    Some((bytes, peer)) => dispatch_record(&bytes, &shared, Some(&peer), None),
                    None => break,
                },
            }
        }
        tracing::debug!("datagram parser exited");
    })
}

pub fn datagram_channel() -> (
    mpsc::Sender<(Vec<u8>, String)>,
    mpsc::Receiver<(Vec<u8>, String)>,
) {
    mpsc::channel(DATAGRAM_QUEUE_DEPTH)
}
