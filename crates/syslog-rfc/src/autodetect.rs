//! Format auto-detection (C5).
//!
//! Grounded on `fantapsody-vector`'s syslog source, which peeks at the
//! byte immediately after `<PRI>` to tell the two grammars apart: RFC
//! 5424 always follows PRI with `VERSION SP` where VERSION is a single
//! digit; RFC 3164 never does (it goes straight into a month
//! abbreviation or arbitrary content).

use crate::error::ParseError;
use crate::parts::LogParts;
use crate::pri::parse_priority;
use crate::rfc3164::parse_rfc3164;
use crate::rfc5424::parse_rfc5424;

/// Parse `buf`, choosing the RFC 5424 or RFC 3164 grammar by
/// inspecting the bytes right after `<PRI>`. Falls back to RFC 3164
/// (the more permissive grammar) whenever the priority itself fails
/// to parse, so the caller still gets a best-effort record.
///
/// A leading RFC 6587 octet-count prefix (`DIGITS SP`) is stripped
/// first — spec §4.5's final paragraph: auto-detect runs after any
/// length prefix has been removed, whether that removal happened
/// during stream framing or, as on the datagram path, here.
pub fn parse_auto(
    buf: &[u8],
    now_year: i32,
    peer_addr: Option<&str>,
) -> (LogParts, Option<ParseError>) {
    let buf = strip_octet_count_prefix(buf);
    if looks_like_rfc5424(buf) {
        let (parts, err) = parse_rfc5424(buf);
        (LogParts::Rfc5424(parts), err)
    } else {
        let (parts, err) = parse_rfc3164(buf, now_year, peer_addr);
        (LogParts::Rfc3164(parts), err)
    }
}

/// Strips a `DIGITS SP` octet-count prefix when present. A record ever
/// starts with `<`, so any buffer instead starting with a decimal
/// digit run followed by a space is an octet-counted frame that never
/// went through `OctetCountingCodec` — the datagram path has no
/// framing engine of its own (spec §4.6).
fn strip_octet_count_prefix(buf: &[u8]) -> &[u8] {
    if buf.first() == Some(&b'<') {
        return buf;
    }
    match buf.iter().position(|&b| b == b' ') {
        Some(space_pos) if space_pos > 0 && buf[..space_pos].iter().all(u8::is_ascii_digit) => {
            &buf[space_pos + 1..]
        }
        _ => buf,
    }
}

fn looks_like_rfc5424(buf: &[u8]) -> bool {
    let cursor = match parse_priority(buf) {
        Ok((_, cursor)) => cursor,
        Err(_) => return false,
    };
    let rest = &buf[cursor..];
    matches!(rest.first(), Some(b) if b.is_ascii_digit())
        && matches!(rest.get(1), Some(b' '))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_rfc5424() {
        let input = b"<165>1 2003-10-11T22:14:15.003Z host app - - - msg";
        let (parts, err) = parse_auto(input, 2024, None);
        assert!(err.is_none(), "{err:?}");
        assert!(matches!(parts, LogParts::Rfc5424(_)));
    }

    #[test]
    fn detects_rfc3164() {
        let input = b"<31>Dec 26 05:08:46 hostname tag[296]: content";
        let (parts, err) = parse_auto(input, 2024, None);
        assert!(err.is_none(), "{err:?}");
        assert!(matches!(parts, LogParts::Rfc3164(_)));
    }

    #[test]
    fn auto_across_three_datagrams() {
        let inputs: [&[u8]; 3] = [
            b"<34>Oct 11 22:14:15 mymachine su: 'su root' failed",
            b"<165>1 2003-10-11T22:14:15.003Z host app - - - msg",
            b"<13>Jan  1 00:00:00 host tag: plain content",
        ];
        for input in inputs {
            let (_, err) = parse_auto(input, 2024, None);
            assert!(err.is_none(), "{input:?}: {err:?}");
        }
    }

    #[test]
    fn strips_octet_count_prefix_before_detecting() {
        let body = b"<165>1 2003-10-11T22:14:15.003Z host app - - - msg";
        let framed = format!("{} {}", body.len(), String::from_utf8_lossy(body));
        let (parts, err) = parse_auto(framed.as_bytes(), 2024, None);
        assert!(err.is_none(), "{err:?}");
        assert!(matches!(parts, LogParts::Rfc5424(_)));
    }

    #[test]
    fn version_zero_is_still_detected_as_rfc5424() {
        let input = b"<13>0 2003-10-11T22:14:15Z host app - - - msg";
        let (parts, _) = parse_auto(input, 2024, None);
        assert!(matches!(parts, LogParts::Rfc5424(_)));
    }
}
