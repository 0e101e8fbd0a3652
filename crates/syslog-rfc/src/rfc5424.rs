//! RFC 5424 (structured) parser (C4).
//!
//! Grounded on `rfc5424.go`'s `Parser.parse` pipeline: version digit,
//! timestamp, hostname, app-name, proc-id, msg-id, structured-data,
//! message — each a `parse_up_to_len`/dedicated scanner call, cursor
//! passed forward explicitly rather than mutated through a receiver.

use chrono::{DateTime, Utc};

use crate::error::{FieldError, ParseError, VersionError};
use crate::parts::Rfc5424Parts;
use crate::pri::parse_priority;
use crate::primitives::parse_up_to_len;
use crate::structured_data::parse_structured_data;
use crate::timestamp::parse_rfc5424_timestamp;

const MAX_HOSTNAME_LEN: usize = 255;
const MAX_APP_NAME_LEN: usize = 48;
const MAX_PROC_ID_LEN: usize = 128;
const MAX_MSG_ID_LEN: usize = 32;

/// Parse a full RFC 5424 record.
///
/// Proc-id and msg-id failures are swallowed rather than propagated —
/// ground truth `rfc5424.go` treats those two fields as best-effort
/// and continues to structured-data/message regardless — but a
/// version, timestamp, or hostname/app-name failure stops the field
/// walk and the remainder of `parts` is left at its default.
pub fn parse_rfc5424(buf: &[u8]) -> (Rfc5424Parts, Option<ParseError>) {
    let mut parts = Rfc5424Parts {
        timestamp: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        hostname: None,
        app_name: None,
        proc_id: None,
        msg_id: None,
        structured_data: "-".to_string(),
        message: String::new(),
        priority: 0,
        facility: 0,
        severity: 0,
        version: 0,
        tls_peer: None,
    };

    let (priority, cursor) = match parse_priority(buf) {
        Ok(v) => v,
        Err(e) => return (parts, Some(e)),
    };
    parts.priority = priority.value;
    parts.facility = priority.facility;
    parts.severity = priority.severity;

    let rest = &buf[cursor..];
    let (version, v_len) = match parse_version(rest) {
        Ok(v) => v,
        Err(e) => return (parts, Some(e.into())),
    };
    parts.version = version;

    let rest = &rest[v_len..];
    let rest = match rest.strip_prefix(b" ") {
        Some(r) => r,
        None => return (parts, Some(VersionError::NotFound.into())),
    };

    let (timestamp, ts_len) = match parse_rfc5424_timestamp(rest) {
        Ok(v) => v,
        Err((e, _)) => return (parts, Some(e.into())),
    };
    parts.timestamp = timestamp.to_utc();

    let rest = &rest[ts_len..];
    let rest = match rest.strip_prefix(b" ") {
        Some(r) => r,
        None => return (parts, Some(FieldError::NoSpace.into())),
    };

    let (hostname, h_len) = match parse_up_to_len(rest, MAX_HOSTNAME_LEN, FieldError::NoSpace) {
        Ok(v) => v,
        Err(e) => return (parts, Some(e.into())),
    };
    parts.hostname = nil_or_some(hostname);

    let rest = &rest[h_len..];
    let (app_name, a_len) =
        match parse_up_to_len(rest, MAX_APP_NAME_LEN, FieldError::InvalidAppName) {
            Ok(v) => v,
            Err(e) => return (parts, Some(e.into())),
        };
    parts.app_name = nil_or_some(app_name);

    let rest = &rest[a_len..];
    let (proc_id, p_len) = match parse_up_to_len(rest, MAX_PROC_ID_LEN, FieldError::InvalidProcId) {
        Ok(v) => v,
        // proc-id is best-effort: swallow and keep scanning from the
        // budget boundary, matching the original's silent recovery.
        Err(_) => {
            let advance = MAX_PROC_ID_LEN.min(rest.len());
            (&rest[..0], advance)
        }
    };
    parts.proc_id = nil_or_some(proc_id);

    let rest = &rest[p_len..];
    let (msg_id, m_len) = match parse_up_to_len(rest, MAX_MSG_ID_LEN, FieldError::InvalidMsgId) {
        Ok(v) => v,
        Err(_) => {
            let advance = MAX_MSG_ID_LEN.min(rest.len());
            (&rest[..0], advance)
        }
    };
    parts.msg_id = nil_or_some(msg_id);

    let rest = &rest[m_len..];
    let (sd, sd_len) = match parse_structured_data(rest) {
        Ok(v) => v,
        Err(e) => return (parts, Some(e.into())),
    };
    parts.structured_data = sd.to_string();

    let rest = &rest[sd_len..];
    let rest = rest.strip_prefix(b" ").unwrap_or(rest);
    parts.message = strip_bom(rest);

    (parts, None)
}

fn parse_version(buf: &[u8]) -> Result<(u8, usize), VersionError> {
    match buf.first() {
        Some(&b) if b.is_ascii_digit() && b != b'0' => Ok((b - b'0', 1)),
        Some(&b) if b.is_ascii_digit() => Err(VersionError::NonDigit),
        _ => Err(VersionError::NotFound),
    }
}

fn nil_or_some(buf: &[u8]) -> Option<String> {
    if buf == b"-" {
        None
    } else {
        Some(String::from_utf8_lossy(buf).into_owned())
    }
}

/// Strip a leading UTF-8 BOM from the `MSG` field — spec's supplement
/// from the original's `fixBOM`/message-handling code, which silently
/// drops the three-byte marker some emitters prepend.
fn strip_bom(buf: &[u8]) -> String {
    const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
    let buf = buf.strip_prefix(&BOM).unwrap_or(buf);
    String::from_utf8_lossy(buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_udp_rfc5424() {
        let input = b"<165>1 2003-10-11T22:14:15.003Z mymachine.example.com evntslog - ID47 [exampleSDID@32473 iut=\"3\" eventSource=\"Application\" eventID=\"1011\"] An application event log entry";
        let (parts, err) = parse_rfc5424(input);
        assert!(err.is_none(), "{err:?}");
        assert_eq!(parts.version, 1);
        assert_eq!(parts.hostname.as_deref(), Some("mymachine.example.com"));
        assert_eq!(parts.app_name.as_deref(), Some("evntslog"));
        assert_eq!(parts.proc_id, None);
        assert_eq!(parts.msg_id.as_deref(), Some("ID47"));
        assert_eq!(
            parts.structured_data,
            r#"[exampleSDID@32473 iut="3" eventSource="Application" eventID="1011"]"#
        );
        assert_eq!(parts.message, "An application event log entry");
        assert_eq!(parts.priority, 165);
        assert_eq!(parts.facility, 20);
        assert_eq!(parts.severity, 5);
    }

    #[test]
    fn nil_structured_data_and_fields() {
        let input = b"<13>1 - - - - - - just a message";
        let (parts, err) = parse_rfc5424(input);
        assert!(err.is_none(), "{err:?}");
        assert_eq!(parts.hostname, None);
        assert_eq!(parts.app_name, None);
        assert_eq!(parts.proc_id, None);
        assert_eq!(parts.msg_id, None);
        assert_eq!(parts.structured_data, "-");
        assert_eq!(parts.message, "just a message");
    }

    #[test]
    fn message_strips_leading_bom() {
        let mut input = b"<13>1 - - - - - - ".to_vec();
        input.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
        input.extend_from_slice(b"hello");
        let (parts, err) = parse_rfc5424(&input);
        assert!(err.is_none(), "{err:?}");
        assert_eq!(parts.message, "hello");
    }

    #[test]
    fn version_zero_is_rejected() {
        let input = b"<13>0 - - - - - - msg";
        let (_, err) = parse_rfc5424(input);
        assert_eq!(err, Some(ParseError::Version(VersionError::NonDigit)));
    }

    #[test]
    fn malformed_structured_data_errors() {
        let input = b"<13>1 2003-10-11T22:14:15Z host app - - not-sd-shaped msg";
        let (_, err) = parse_rfc5424(input);
        assert_eq!(
            err,
            Some(ParseError::Field(FieldError::NoStructuredData))
        );
    }
}
