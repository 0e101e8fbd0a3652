//! Demo listener configuration, loadable from TOML.

use serde::Deserialize;

/// Top-level configuration for the demo binary.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    /// `rfc3164`, `rfc5424`, `rfc6587`, or `automatic`.
    #[serde(default = "default_format")]
    pub format: String,
    /// `0` means no read deadline.
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default)]
    pub udp: Vec<String>,
    #[serde(default)]
    pub unixgram: Vec<String>,
    #[serde(default)]
    pub tcp: Vec<String>,
    #[serde(default)]
    pub tls: Option<TlsListenerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsListenerConfig {
    pub addr: String,
    pub cert_path: String,
    pub key_path: String,
    pub client_ca_path: String,
}

fn default_format() -> String {
    "automatic".to_string()
}

impl DemoConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_minimal_config() {
        let toml = r#"
udp = ["0.0.0.0:5514"]
"#;
        let config: DemoConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.format, "automatic");
        assert_eq!(config.timeout_ms, 0);
        assert_eq!(config.udp, vec!["0.0.0.0:5514"]);
        assert!(config.tcp.is_empty());
        assert!(config.tls.is_none());
    }

    #[test]
    fn deserialize_full_config() {
        let toml = r#"
format = "rfc6587"
timeout_ms = 30000
udp = ["0.0.0.0:5514"]
unixgram = ["/run/syslog-demo.sock"]
tcp = ["0.0.0.0:6514"]

[tls]
addr = "0.0.0.0:6515"
cert_path = "/etc/syslog-demo/server.pem"
key_path = "/etc/syslog-demo/server-key.pem"
client_ca_path = "/etc/syslog-demo/ca.pem"
"#;
        let config: DemoConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.format, "rfc6587");
        assert_eq!(config.timeout_ms, 30000);
        assert_eq!(config.tcp, vec!["0.0.0.0:6514"]);
        let tls = config.tls.unwrap();
        assert_eq!(tls.addr, "0.0.0.0:6515");
    }
}
