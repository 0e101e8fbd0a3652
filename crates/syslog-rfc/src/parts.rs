//! The parsed-record data model (§3), resolving Design Note 9's
//! "LogParts polymorphism": a tagged enum of typed per-format structs
//! plus a thin projection to a string-keyed mapping for handler
//! ergonomics, grounded on `zc-log-tools::types::LogEntry`'s typed
//! normalized-record shape.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// An RFC 3164 (BSD) parsed record.
#[derive(Debug, Clone, PartialEq)]
pub struct Rfc3164Parts {
    pub timestamp: DateTime<Utc>,
    pub hostname: String,
    pub tag: String,
    pub content: String,
    pub priority: u16,
    pub facility: u8,
    pub severity: u8,
    /// Set only when this record arrived over a TLS connection.
    pub tls_peer: Option<String>,
}

/// An RFC 5424 parsed record.
#[derive(Debug, Clone, PartialEq)]
pub struct Rfc5424Parts {
    pub timestamp: DateTime<Utc>,
    pub hostname: Option<String>,
    pub app_name: Option<String>,
    pub proc_id: Option<String>,
    pub msg_id: Option<String>,
    /// Raw bracketed span, verbatim, or `"-"` for nil.
    pub structured_data: String,
    pub message: String,
    pub priority: u16,
    pub facility: u8,
    pub severity: u8,
    pub version: u8,
    pub tls_peer: Option<String>,
}

/// A parsed syslog record, tagged by the grammar that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum LogParts {
    Rfc3164(Rfc3164Parts),
    Rfc5424(Rfc5424Parts),
}

impl LogParts {
    /// Project onto the string-keyed mapping contract from spec §3,
    /// for handlers that don't want to match on the enum.
    pub fn to_map(&self) -> HashMap<String, Value> {
        match self {
            LogParts::Rfc3164(p) => {
                let mut m = HashMap::new();
                m.insert("timestamp".into(), Value::from(p.timestamp.to_rfc3339()));
                m.insert("hostname".into(), Value::from(p.hostname.clone()));
                m.insert("tag".into(), Value::from(p.tag.clone()));
                m.insert("content".into(), Value::from(p.content.clone()));
                m.insert("priority".into(), Value::from(p.priority));
                m.insert("facility".into(), Value::from(p.facility));
                m.insert("severity".into(), Value::from(p.severity));
                if let Some(peer) = &p.tls_peer {
                    m.insert("tls_peer".into(), Value::from(peer.clone()));
                }
                m
            }
            LogParts::Rfc5424(p) => {
                let mut m = HashMap::new();
                m.insert("timestamp".into(), Value::from(p.timestamp.to_rfc3339()));
                m.insert(
                    "hostname".into(),
                    opt_to_value(p.hostname.as_deref()),
                );
                m.insert("app_name".into(), opt_to_value(p.app_name.as_deref()));
                m.insert("proc_id".into(), opt_to_value(p.proc_id.as_deref()));
                m.insert("msg_id".into(), opt_to_value(p.msg_id.as_deref()));
                m.insert(
                    "structured_data".into(),
                    Value::from(p.structured_data.clone()),
                );
                m.insert("message".into(), Value::from(p.message.clone()));
                m.insert("priority".into(), Value::from(p.priority));
                m.insert("facility".into(), Value::from(p.facility));
                m.insert("severity".into(), Value::from(p.severity));
                m.insert("version".into(), Value::from(p.version));
                if let Some(peer) = &p.tls_peer {
                    m.insert("tls_peer".into(), Value::from(peer.clone()));
                }
                m
            }
        }
    }

    pub fn priority(&self) -> u16 {
        match self {
            LogParts::Rfc3164(p) => p.priority,
            LogParts::Rfc5424(p) => p.priority,
        }
    }

    pub fn set_tls_peer(&mut self, peer: String) {
        match self {
            LogParts::Rfc3164(p) => p.tls_peer = Some(peer),
            LogParts::Rfc5424(p) => p.tls_peer = Some(peer),
        }
    }
}

fn opt_to_value(s: Option<&str>) -> Value {
    match s {
        Some(s) => Value::from(s.to_owned()),
        None => Value::from("-"),
    }
}
