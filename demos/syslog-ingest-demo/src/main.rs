//! Standalone syslog listener demonstrating the `syslog-server` API:
//! load a TOML config, bind whatever listeners it names, and trace
//! every parsed record.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use syslog_server::{build_server_config, Format, Server, TlsPaths};

use crate::config::DemoConfig;

fn parse_format(name: &str) -> anyhow::Result<Format> {
    match name {
        "rfc3164" => Ok(Format::Rfc3164),
        "rfc5424" => Ok(Format::Rfc5424),
        "rfc6587" => Ok(Format::Rfc6587),
        "automatic" => Ok(Format::Automatic),
        other => anyhow::bail!("unknown format '{other}', expected one of rfc3164/rfc5424/rfc6587/automatic"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "syslog-ingest-demo starting"
    );

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/syslog-ingest-demo/config.toml".to_string());

    let config = DemoConfig::from_file(&config_path)
        .with_context(|| format!("loading config from '{config_path}'"))?;
    let format = parse_format(&config.format)?;

    let mut server = Server::new();
    server.set_format(format);
    server.set_timeout(config.timeout_ms);
    server.set_handler(Arc::new(|parts, message_length, parse_error| {
        if let Some(err) = &parse_error {
            tracing::warn!(error = %err, message_length, "record parsed with error");
        }
        tracing::info!(?parts, message_length, "record received");
    }));

    for addr in &config.udp {
        server
            .listen_udp(addr)
            .with_context(|| format!("binding UDP listener on '{addr}'"))?;
        tracing::info!(addr, "UDP listener bound");
    }
    for path in &config.unixgram {
        server
            .listen_unixgram(path)
            .with_context(|| format!("binding Unix datagram listener on '{path}'"))?;
        tracing::info!(path, "Unix datagram listener bound");
    }
    for addr in &config.tcp {
        server
            .listen_tcp(addr)
            .await
            .with_context(|| format!("binding TCP listener on '{addr}'"))?;
        tracing::info!(addr, "TCP listener bound");
    }
    if let Some(tls) = &config.tls {
        let tls_config = build_server_config(TlsPaths {
            cert_path: &tls.cert_path,
            key_path: &tls.key_path,
            client_ca_path: &tls.client_ca_path,
        })
        .context("building TLS server config")?;
        server
            .listen_tcp_tls(&tls.addr, tls_config)
            .await
            .with_context(|| format!("binding TLS listener on '{}'", tls.addr))?;
        tracing::info!(addr = %tls.addr, "TLS listener bound");
    }

    server.boot().context("booting server")?;
    tracing::info!("syslog-ingest-demo ready");

    tokio::select! {
        () = server.wait() => {
            tracing::error!("all listener tasks exited unexpectedly");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            if let Some(err) = server.kill() {
                tracing::warn!(error = %err, "error releasing listener resources");
            }
            server.wait().await;
        }
    }

    tracing::info!("syslog-ingest-demo stopped");
    Ok(())
}
