//! Format selection (part of C9's `SetFormat`), tying a selected
//! format to both a framing strategy (C6) and a parser (C1–C5).

use syslog_rfc::{parse_auto, parse_rfc3164, parse_rfc5424, LogParts, ParseError};

use crate::framing::{AutoCodec, NewlineCodec, OctetCountingCodec};
use tokio_util::codec::Decoder;

/// One of the four formats `SetFormat` accepts (spec §4.9).
///
/// `Rfc6587` names a *framing* choice (octet-counting) rather than a
/// content grammar — RFC 6587 itself only defines stream framing, so
/// once a record is extracted the content grammar is auto-detected,
/// exactly as for `Automatic` (spec §4.5's final paragraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Rfc3164,
    Rfc5424,
    Rfc6587,
    Automatic,
}

/// A stream decoder, picked per `Format`, boxed so the dispatcher can
/// hold one without a generic parameter per listener.
pub enum FrameDecoder {
    Newline(NewlineCodec),
    OctetCounting(OctetCountingCodec),
    Auto(AutoCodec),
}

impl Decoder for FrameDecoder {
    type Item = bytes::Bytes;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut bytes::BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self {
            FrameDecoder::Newline(c) => c.decode(src),
            FrameDecoder::OctetCounting(c) => c.decode(src),
            FrameDecoder::Auto(c) => c.decode(src),
        }
    }
}

impl Format {
    pub fn frame_decoder(self) -> FrameDecoder {
        match self {
            Format::Rfc3164 | Format::Rfc5424 => FrameDecoder::Newline(NewlineCodec),
            Format::Rfc6587 => FrameDecoder::OctetCounting(OctetCountingCodec),
            Format::Automatic => FrameDecoder::Auto(AutoCodec::default()),
        }
    }

    /// Parse one already-framed record, given the imputed year (for
    /// RFC 3164) and an optional datagram peer address (spec §9 Open
    /// Question (a); always `None` on the stream path).
    pub fn parse(self, buf: &[u8], now_year: i32, peer_addr: Option<&str>) -> (LogParts, Option<ParseError>) {
        match self {
            Format::Rfc3164 => {
                let (parts, err) = parse_rfc3164(buf, now_year, peer_addr);
                (LogParts::Rfc3164(parts), err)
            }
            Format::Rfc5424 => {
                let (parts, err) = parse_rfc5424(buf);
                (LogParts::Rfc5424(parts), err)
            }
            Format::Rfc6587 | Format::Automatic => parse_auto(buf, now_year, peer_addr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3164_format_parses_bsd_grammar() {
        let (parts, err) = Format::Rfc3164.parse(b"<31>Dec 26 05:08:46 host tag: content", 2024, None);
        assert!(err.is_none(), "{err:?}");
        assert!(matches!(parts, LogParts::Rfc3164(_)));
    }

    #[test]
    fn rfc6587_format_auto_detects_content_grammar() {
        let (parts, err) = Format::Rfc6587.parse(
            b"<165>1 2003-10-11T22:14:15.003Z host app - - - msg",
            2024,
            None,
        );
        assert!(err.is_none(), "{err:?}");
        assert!(matches!(parts, LogParts::Rfc5424(_)));
    }
}
