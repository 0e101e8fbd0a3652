//! Listener set (C7): UDP, Unix-datagram, TCP, TCP+TLS acceptors.
//!
//! Each `Listen*` operation fails with an address-resolution or bind
//! error from the OS; the server object remains usable afterward and
//! subsequent `Listen` calls may still be made (spec §4.7).

use std::net::SocketAddr;
use std::sync::Arc;

use rustls::ServerConfig;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::{TcpListener, UdpSocket, UnixDatagram};

use crate::error::{ServerError, ServerResult};

/// ~1 MiB, a generous receive buffer for bursty datagram sources.
const DATAGRAM_RECV_BUFFER_BYTES: usize = 1024 * 1024;

/// One bound listener entity. Each variant owns its OS file
/// descriptor for its full lifecycle (spec §3's "Listener entity").
pub enum Listener {
    Udp(UdpSocket),
    Unixgram(UnixDatagram),
    Tcp(TcpListener),
    TcpTls(TcpListener, Arc<ServerConfig>),
}

impl Listener {
    pub fn describe(&self) -> String {
        match self {
            Listener::Udp(s) => s.local_addr().map(|a| a.to_string()).unwrap_or_default(),
            Listener::Unixgram(s) => format!("{:?}", s.local_addr()),
            Listener::Tcp(l) => l.local_addr().map(|a| a.to_string()).unwrap_or_default(),
            Listener::TcpTls(l, _) => l.local_addr().map(|a| a.to_string()).unwrap_or_default(),
        }
    }
}

fn invalid_addr(e: impl std::fmt::Display) -> ServerError {
    ServerError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))
}

pub fn listen_udp(addr: &str) -> ServerResult<Listener> {
    let addr: SocketAddr = addr.parse().map_err(invalid_addr)?;
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_recv_buffer_size(DATAGRAM_RECV_BUFFER_BYTES)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    let std_socket: std::net::UdpSocket = socket.into();
    let socket = UdpSocket::from_std(std_socket)?;
    tracing::info!(addr = %addr, "UDP listener bound");
    Ok(Listener::Udp(socket))
}

pub fn listen_unixgram(path: &str) -> ServerResult<Listener> {
    let _ = std::fs::remove_file(path);
    let socket = UnixDatagram::bind(path)?;
    tracing::info!(path = %path, "Unix datagram listener bound");
    Ok(Listener::Unixgram(socket))
}

pub async fn listen_tcp(addr: &str) -> ServerResult<Listener> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "TCP listener bound");
    Ok(Listener::Tcp(listener))
}

pub async fn listen_tcp_tls(addr: &str, tls_config: Arc<ServerConfig>) -> ServerResult<Listener> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "TLS listener bound");
    Ok(Listener::TcpTls(listener, tls_config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn udp_bind_to_ephemeral_port() {
        let listener = listen_udp("127.0.0.1:0").unwrap();
        assert!(!listener.describe().is_empty());
    }

    #[test]
    fn invalid_udp_address_is_rejected() {
        assert!(listen_udp("not-an-address").is_err());
    }

    #[tokio::test]
    async fn tcp_bind_to_ephemeral_port() {
        let listener = listen_tcp("127.0.0.1:0").await.unwrap();
        assert!(!listener.describe().is_empty());
    }
}
