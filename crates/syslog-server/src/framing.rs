//! Stream framing strategies (C6).
//!
//! Each strategy is a `tokio_util::codec::Decoder` — the ecosystem's
//! idiomatic "buffered bytes in, maybe-a-token out" contract, grounded
//! on the `fantapsody-vector` syslog source's `LinesCodec`/`BytesCodec`
//! usage and a custom decoder for RFC 6587.

use bytes::{Buf, Bytes, BytesMut};
use std::io;
use tokio_util::codec::Decoder;

/// Newline-delimited framing (default for both syslog grammars over a
/// stream). The returned token excludes the `\n`.
#[derive(Debug, Default)]
pub struct NewlineCodec;

impl Decoder for NewlineCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>, io::Error> {
        match buf.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                let line = buf.split_to(pos);
                buf.advance(1);
                Ok(Some(line.freeze()))
            }
            None => Ok(None),
        }
    }
}

/// RFC 6587 octet-counted framing: a decimal length, a single space,
/// then exactly that many bytes.
#[derive(Debug, Default)]
pub struct OctetCountingCodec;

/// Defends against an unbounded prefix on a corrupt/hostile stream —
/// 10 decimal digits covers any message length worth framing.
const MAX_LENGTH_PREFIX_DIGITS: usize = 10;

impl Decoder for OctetCountingCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>, io::Error> {
        let space_pos = match buf.iter().position(|&b| b == b' ') {
            Some(p) => p,
            None => {
                if buf.len() > MAX_LENGTH_PREFIX_DIGITS {
                    return Err(invalid_data("octet-counting length prefix not decimal"));
                }
                return Ok(None);
            }
        };

        if space_pos == 0 || !buf[..space_pos].iter().all(u8::is_ascii_digit) {
            return Err(invalid_data("octet-counting length prefix not decimal"));
        }

        let len: usize = std::str::from_utf8(&buf[..space_pos])
            .unwrap()
            .parse()
            .map_err(|_| invalid_data("octet-counting length prefix overflow"))?;

        let total = space_pos + 1 + len;
        if buf.len() < total {
            buf.reserve(total - buf.len());
            return Ok(None);
        }

        buf.advance(space_pos + 1);
        let record = buf.split_to(len);
        Ok(Some(record.freeze()))
    }
}

/// Peeks the first byte of the buffer to pick a strategy: a digit
/// means octet-counting, `<` falls through to newline framing. Lets
/// one TCP listener accept both styles (spec §4.6 point 3).
#[derive(Debug, Default)]
pub struct AutoCodec {
    newline: NewlineCodec,
    octet: OctetCountingCodec,
}

impl Decoder for AutoCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>, io::Error> {
        match buf.first() {
            None => Ok(None),
            Some(b) if b.is_ascii_digit() => self.octet.decode(buf),
            Some(b'<') => self.newline.decode(buf),
            Some(_) => Err(invalid_data("unrecognized frame start byte")),
        }
    }
}

fn invalid_data(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Strips trailing control bytes and NULs (anything below 0x20) from
/// a datagram, which carries no stream framing of its own (spec
/// §4.6's final paragraph).
pub fn trim_trailing_control(buf: &[u8]) -> &[u8] {
    let end = buf.iter().rposition(|&b| b >= 0x20).map_or(0, |i| i + 1);
    &buf[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_codec_splits_on_newline() {
        let mut buf = BytesMut::from(&b"<34>hello\n<35>world\n"[..]);
        let mut codec = NewlineCodec;
        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&first[..], b"<34>hello");
        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&second[..], b"<35>world");
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn newline_codec_waits_for_more_data() {
        let mut buf = BytesMut::from(&b"<34>partial"[..]);
        let mut codec = NewlineCodec;
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn octet_counting_reads_exact_length() {
        let body = b"<34>Oct 11 22:14:15 mymachine su: 'su root' failed";
        let framed = format!("{} {}", body.len(), String::from_utf8_lossy(body));
        let mut buf = BytesMut::from(framed.as_bytes());
        let mut codec = OctetCountingCodec;
        let record = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&record[..], &body[..]);
    }

    #[test]
    fn octet_counting_waits_for_full_payload() {
        let mut buf = BytesMut::from(&b"10 short"[..]);
        let mut codec = OctetCountingCodec;
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn octet_counting_rejects_non_decimal_prefix() {
        let mut buf = BytesMut::from(&b"abc 1234"[..]);
        let mut codec = OctetCountingCodec;
        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn auto_codec_picks_octet_counting_for_digit() {
        let mut buf = BytesMut::from(&b"4 <34>"[..]);
        let mut codec = AutoCodec::default();
        let record = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&record[..], b"<34>");
    }

    #[test]
    fn auto_codec_picks_newline_for_angle_bracket() {
        let mut buf = BytesMut::from(&b"<34>hello\n"[..]);
        let mut codec = AutoCodec::default();
        let record = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&record[..], b"<34>hello");
    }

    #[test]
    fn trims_trailing_control_bytes() {
        assert_eq!(trim_trailing_control(b"hello\0\0\n"), b"hello");
        assert_eq!(trim_trailing_control(b"hello"), b"hello");
        assert_eq!(trim_trailing_control(b"\0\0\0"), b"");
    }
}
