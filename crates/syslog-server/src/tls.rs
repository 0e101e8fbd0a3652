//! TLS configuration for mutual-auth `ListenTCPTLS` connections.
//!
//! Loads server certificate, private key, and client-CA bundle from
//! PEM files and builds a `rustls::ServerConfig` that requires and
//! verifies the peer's client certificate — mirroring
//! `load_tls_transport`'s "read PEM files, build a ready-to-use
//! transport" shape, but for a raw listener rather than an MQTT
//! broker connection.

use std::io::Cursor;
use std::sync::Arc;

use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use rustls_pki_types::{CertificateDer, PrivateKeyDer};

use crate::error::{ServerError, ServerResult};

/// PEM file paths needed to stand up a mutual-auth TLS listener.
pub struct TlsPaths<'a> {
    pub cert_path: &'a str,
    pub key_path: &'a str,
    pub client_ca_path: &'a str,
}

/// Build a server TLS config requiring and verifying client certs
/// signed by `client_ca_path`.
pub fn build_server_config(paths: TlsPaths<'_>) -> ServerResult<Arc<ServerConfig>> {
    let certs = load_certs(paths.cert_path)?;
    let key = load_key(paths.key_path)?;
    let client_ca_certs = load_certs(paths.client_ca_path)?;

    let mut roots = RootCertStore::empty();
    for cert in client_ca_certs {
        roots
            .add(cert)
            .map_err(|e| ServerError::Tls(format!("invalid client CA cert: {e}")))?;
    }

    let verifier = WebPkiClientVerifier::builder(Arc::new(roots))
        .build()
        .map_err(|e| ServerError::Tls(format!("failed to build client cert verifier: {e}")))?;

    let config = ServerConfig::builder()
        .with_client_cert_verifier(verifier)
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Tls(format!("invalid server cert/key: {e}")))?;

    Ok(Arc::new(config))
}

fn load_certs(path: &str) -> ServerResult<Vec<CertificateDer<'static>>> {
    let bytes = std::fs::read(path)
        .map_err(|e| ServerError::Tls(format!("failed to read cert '{path}': {e}")))?;
    rustls_pemfile::certs(&mut Cursor::new(bytes))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::Tls(format!("invalid PEM cert '{path}': {e}")))
}

fn load_key(path: &str) -> ServerResult<PrivateKeyDer<'static>> {
    let bytes = std::fs::read(path)
        .map_err(|e| ServerError::Tls(format!("failed to read key '{path}': {e}")))?;
    rustls_pemfile::private_key(&mut Cursor::new(bytes))
        .map_err(|e| ServerError::Tls(format!("invalid PEM key '{path}': {e}")))?
        .ok_or_else(|| ServerError::Tls(format!("no private key found in '{path}'")))
}

/// Extract the verified peer certificate's Subject Common Name,
/// surfaced as `tls_peer` on every record delivered over that
/// connection. Grounded on `servertls_test.go`'s
/// `handler.LastLogParts["tls_peer"] == "client"` expectation.
pub fn peer_common_name(certs: &[CertificateDer<'_>]) -> Option<String> {
    let leaf = certs.first()?;
    let (_, parsed) = x509_parser::parse_x509_certificate(leaf.as_ref()).ok()?;
    parsed
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cert_file_returns_error() {
        let paths = TlsPaths {
            cert_path: "/nonexistent/cert.pem",
            key_path: "/nonexistent/key.pem",
            client_ca_path: "/nonexistent/ca.pem",
        };
        let err = build_server_config(paths).err().expect("should fail");
        let msg = err.to_string();
        assert!(msg.contains("cert"), "error should mention cert: {msg}");
    }

    #[test]
    fn peer_common_name_on_empty_chain_is_none() {
        assert_eq!(peer_common_name(&[]), None);
    }
}
