//! RFC 5424 `STRUCTURED-DATA` extraction (C4 continued).
//!
//! Grounded on `rfc5424.go`'s `parseStructuredData`: either the nil
//! value `-`, or one or more balanced `[...]` spans. The whole span is
//! captured verbatim — per spec §4.4, SD-ELEMENT parameters are not
//! split into a sub-mapping.

use crate::error::FieldError;

/// Parse the `STRUCTURED-DATA` field starting at `buf[0]`.
///
/// Returns the raw span (including brackets, excluding any trailing
/// separator space) and the number of bytes consumed. `-` consumes a
/// single byte and yields `"-"`.
pub fn parse_structured_data(buf: &[u8]) -> Result<(&str, usize), FieldError> {
    if buf.is_empty() {
        return Err(FieldError::NoStructuredData);
    }

    if buf[0] == b'-' {
        return Ok(("-", 1));
    }

    if buf[0] != b'[' {
        return Err(FieldError::NoStructuredData);
    }

    let mut depth = 0i32;
    let mut end = None;

    for (i, &b) in buf.iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    let next = i + 1;
                    if next == buf.len() || buf[next] == b' ' {
                        end = Some(next);
                        break;
                    }
                    // Another `[SD-ELEMENT]` follows directly with no
                    // separating space only when depth returns to a
                    // still-open outer element; otherwise keep scanning
                    // for the true terminator.
                }
            }
            _ => {}
        }
        if depth < 0 {
            return Err(FieldError::NoStructuredData);
        }
    }

    match end {
        Some(end) => std::str::from_utf8(&buf[..end])
            .map(|s| (s, end))
            .map_err(|_| FieldError::NoStructuredData),
        None => Err(FieldError::NoStructuredData),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_value() {
        assert_eq!(parse_structured_data(b"- rest").unwrap(), ("-", 1));
    }

    #[test]
    fn single_element() {
        let input = br#"[exampleSDID@32473 iut="3"] msg"#;
        let (sd, consumed) = parse_structured_data(input).unwrap();
        assert_eq!(sd, r#"[exampleSDID@32473 iut="3"]"#);
        assert_eq!(consumed, sd.len());
    }

    #[test]
    fn multiple_elements() {
        let input = br#"[one@1 a="b"][two@2 c="d"] msg"#;
        let (sd, consumed) = parse_structured_data(input).unwrap();
        assert_eq!(sd, r#"[one@1 a="b"][two@2 c="d"]"#);
        assert_eq!(consumed, sd.len());
    }

    #[test]
    fn end_of_record_terminator() {
        let input = br#"[a@1 k="v"]"#;
        let (sd, consumed) = parse_structured_data(input).unwrap();
        assert_eq!(sd, r#"[a@1 k="v"]"#);
        assert_eq!(consumed, input.len());
    }

    #[test]
    fn malformed_is_error() {
        assert!(parse_structured_data(b"not-sd-shaped").is_err());
        assert!(parse_structured_data(b"[unterminated").is_err());
    }
}
