//! RFC 3164 (BSD) parser (C3).
//!
//! Grounded on `rfc3164.go` (`parseTimestamp`/`parseHostname`/
//! `parseTag`/`parseContent`) and `zc-log-tools::parsers::syslog::parse_3164`
//! for the "impute current year" / "source becomes hostname" shape.

use chrono::{DateTime, Utc};

use crate::error::{FieldError, ParseError};
use crate::parts::Rfc3164Parts;
use crate::pri::parse_priority;
use crate::timestamp::{looks_like_iso8601, parse_bsd_timestamp, parse_rfc5424_timestamp};

const MAX_TAG_LEN: usize = 32;

/// Parse a full RFC 3164 record.
///
/// `peer_addr`, when `Some`, is substituted for an empty hostname —
/// spec §9 Open Question (a): this applies only to the datagram path,
/// so stream-path callers must pass `None`.
///
/// Returns the best-effort parts alongside the first error
/// encountered, if any. A timestamp that fails to parse at all is not
/// recoverable field-by-field — per the worked example in spec §8
/// ("UDP RFC 3164, no hostname"), the whole remainder becomes
/// `content` rather than attempting to resynchronize hostname/tag
/// from a guessed offset.
pub fn parse_rfc3164(
    buf: &[u8],
    now_year: i32,
    peer_addr: Option<&str>,
) -> (Rfc3164Parts, Option<ParseError>) {
    let mut parts = Rfc3164Parts {
        timestamp: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        hostname: String::new(),
        tag: String::new(),
        content: String::new(),
        priority: 0,
        facility: 0,
        severity: 0,
        tls_peer: None,
    };

    let (priority, cursor) = match parse_priority(buf) {
        Ok(v) => v,
        Err(e) => {
            parts.content = trim_spaces(buf).to_string();
            return (parts, Some(e));
        }
    };
    parts.priority = priority.value;
    parts.facility = priority.facility;
    parts.severity = priority.severity;

    let rest = &buf[cursor..];

    let timestamp_result = if looks_like_iso8601(rest) {
        parse_rfc5424_timestamp(rest).map(|(ts, n)| (ts.to_utc(), n)).map_err(|(e, _)| e)
    } else {
        parse_bsd_timestamp(rest, now_year)
    };

    let (timestamp, ts_len) = match timestamp_result {
        Ok(v) => v,
        Err(e) => {
            parts.content = trim_spaces(rest).to_string();
            substitute_hostname(&mut parts, peer_addr);
            return (parts, Some(e.into()));
        }
    };
    parts.timestamp = timestamp;

    let after_ts = &rest[ts_len..];
    let after_ts = after_ts.strip_prefix(' ').unwrap_or(after_ts);

    let (hostname, after_host) = parse_hostname(after_ts);
    parts.hostname = hostname.to_string();

    match parse_tag(after_host) {
        Ok((tag, after_tag)) => {
            parts.tag = tag.to_string();
            parts.content = trim_spaces(after_tag).to_string();
            substitute_hostname(&mut parts, peer_addr);
            (parts, None)
        }
        Err(e) => {
            parts.content = String::new();
            substitute_hostname(&mut parts, peer_addr);
            (parts, Some(e.into()))
        }
    }
}

fn substitute_hostname(parts: &mut Rfc3164Parts, peer_addr: Option<&str>) {
    if parts.hostname.is_empty() {
        if let Some(addr) = peer_addr {
            parts.hostname = addr.to_string();
        }
    }
}

/// All bytes up to the next space (or end of buffer). Returns the
/// hostname token and the remaining bytes after the separating space.
fn parse_hostname(buf: &[u8]) -> (&str, &[u8]) {
    match buf.iter().position(|&b| b == b' ') {
        Some(i) => (
            std::str::from_utf8(&buf[..i]).unwrap_or(""),
            &buf[i + 1..],
        ),
        None => (std::str::from_utf8(buf).unwrap_or(""), &buf[buf.len()..]),
    }
}

/// Up to 32 printable bytes terminated by `[`, `:`, or space. PID
/// inside `[...]` is recognized but not surfaced (spec §4.3).
fn parse_tag(buf: &[u8]) -> Result<(&str, &[u8]), FieldError> {
    let mut i = 0;
    while i < buf.len() {
        match buf[i] {
            b'[' => {
                let tag = &buf[..i];
                // Skip the `[pid]` token for completeness; not surfaced.
                let after_bracket = &buf[i + 1..];
                let pid_end = after_bracket.iter().position(|&b| b == b']');
                let rest = match pid_end {
                    Some(j) => &after_bracket[j + 1..],
                    None => &after_bracket[after_bracket.len()..],
                };
                let rest = rest.strip_prefix(b":").unwrap_or(rest);
                let rest = rest.strip_prefix(b" ").unwrap_or(rest);
                return Ok((std::str::from_utf8(tag).unwrap_or(""), rest));
            }
            b':' => {
                let tag = &buf[..i];
                let rest = &buf[i + 1..];
                let rest = rest.strip_prefix(b" ").unwrap_or(rest);
                return Ok((std::str::from_utf8(tag).unwrap_or(""), rest));
            }
            b' ' => {
                let tag = &buf[..i];
                return Ok((std::str::from_utf8(tag).unwrap_or(""), &buf[i + 1..]));
            }
            _ => {
                i += 1;
                if i > MAX_TAG_LEN {
                    return Err(FieldError::TagTooLong);
                }
            }
        }
    }
    // Ran out of bytes with no terminator: whatever we have is the
    // whole tag (and the whole content that follows is empty).
    Ok((std::str::from_utf8(buf).unwrap_or(""), &buf[buf.len()..]))
}

fn trim_spaces(buf: &[u8]) -> &str {
    let s = std::str::from_utf8(buf).unwrap_or("").trim_matches(' ');
    s
}
