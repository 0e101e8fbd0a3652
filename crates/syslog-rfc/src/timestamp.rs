//! Timestamp grammars for both syslog formats.
//!
//! RFC 3164 grounded on `rfc3164.go`'s `parseTimestamp`/
//! `fixTimestampIfNeeded` (fixed 15-byte `Mmm dd HH:MM:SS`, year always
//! imputed from the wall clock, UTC assumed). RFC 5424 grounded on
//! `rfc5424.go`'s `parseTimestamp`/`parseFullDate`/`parseFullTime`/
//! `parsePartialTime`/`parseSecFrac`/`parseTimeOffset`.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::error::TimestampError;
use crate::primitives::parse_2_digits;

const MONTHS: [&[u8; 3]; 12] = [
    b"Jan", b"Feb", b"Mar", b"Apr", b"May", b"Jun", b"Jul", b"Aug", b"Sep", b"Oct", b"Nov", b"Dec",
];

/// Parse a 15-byte `Mmm dd HH:MM:SS` timestamp, imputing `year` and
/// assuming UTC. Returns the number of bytes consumed on success
/// (always 15).
pub fn parse_bsd_timestamp(buf: &[u8], year: i32) -> Result<(DateTime<Utc>, usize), TimestampError> {
    if buf.len() < 15 {
        return Err(TimestampError::EndOfLine);
    }

    let month = MONTHS
        .iter()
        .position(|m| m.as_slice() == &buf[0..3])
        .ok_or(TimestampError::UnknownFormat)?
        + 1;

    if buf[3] != b' ' {
        return Err(TimestampError::UnknownFormat);
    }

    let day = parse_space_padded_day(&buf[4..6])?;

    if buf[6] != b' ' {
        return Err(TimestampError::UnknownFormat);
    }
    if buf[9] != b':' || buf[12] != b':' {
        return Err(TimestampError::UnknownFormat);
    }

    let (hour, _) = parse_2_digits(&buf[7..9], 0, 23, TimestampError::HourInvalid)?;
    let (minute, _) = parse_2_digits(&buf[10..12], 0, 59, TimestampError::MinuteInvalid)?;
    let (second, _) = parse_2_digits(&buf[13..15], 0, 59, TimestampError::SecondInvalid)?;

    let date = NaiveDate::from_ymd_opt(year, month as u32, day)
        .ok_or(TimestampError::UnknownFormat)?;
    let naive = date
        .and_hms_opt(hour, minute, second)
        .ok_or(TimestampError::UnknownFormat)?;

    Ok((Utc.from_utc_datetime(&naive), 15))
}

fn parse_space_padded_day(buf: &[u8]) -> Result<u32, TimestampError> {
    let day = match (buf[0], buf[1]) {
        (b' ', d) if d.is_ascii_digit() => u32::from(d - b'0'),
        (h, d) if h.is_ascii_digit() && d.is_ascii_digit() => {
            u32::from(h - b'0') * 10 + u32::from(d - b'0')
        }
        _ => return Err(TimestampError::DayInvalid),
    };
    if !(1..=31).contains(&day) {
        return Err(TimestampError::DayInvalid);
    }
    Ok(day)
}

/// Detects whether `buf` begins with a 4-digit year followed by `-`,
/// the shape the RFC 5424 timestamp grammar starts with. Used by the
/// RFC 3164 parser to recognize the ISO-8601 fallback variant (spec
/// §4.3's "Variant" paragraph).
pub fn looks_like_iso8601(buf: &[u8]) -> bool {
    buf.len() >= 5 && buf[0..4].iter().all(u8::is_ascii_digit) && buf[4] == b'-'
}

/// An RFC 5424 timestamp field: either the nil value or a concrete
/// instant with its original offset preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rfc5424Timestamp {
    Nil,
    Value(DateTime<FixedOffset>),
}

impl Rfc5424Timestamp {
    /// Project to the "zero instant" spec §3/§4.4 requires for the
    /// nil case, or the concrete value otherwise.
    pub fn to_utc(self) -> DateTime<Utc> {
        match self {
            Rfc5424Timestamp::Nil => DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
            Rfc5424Timestamp::Value(dt) => dt.with_timezone(&Utc),
        }
    }
}

/// Parse the full RFC 5424 `TIMESTAMP` field (nil-value literal `-`,
/// or `FULL-DATE "T" FULL-TIME`). Returns bytes consumed on success;
/// on failure returns the error and the byte offset (relative to the
/// start of `buf`) at which it was detected, per spec §8's boundary
/// test on 7+ fractional-second digits.
pub fn parse_rfc5424_timestamp(
    buf: &[u8],
) -> Result<(Rfc5424Timestamp, usize), (TimestampError, usize)> {
    if buf.is_empty() {
        return Err((TimestampError::EndOfLine, 0));
    }

    if buf[0] == b'-' {
        return Ok((Rfc5424Timestamp::Nil, 1));
    }

    let mut cursor = 0usize;

    let year = parse_year(buf, &mut cursor)?;
    expect(buf, cursor, b'-').map_err(|e| (e, cursor))?;
    cursor += 1;
    let month = parse_2_digits(&buf[cursor..], 1, 12, TimestampError::MonthInvalid)
        .map_err(|e| (e, cursor))?;
    cursor += month.1;
    expect(buf, cursor, b'-').map_err(|e| (e, cursor))?;
    cursor += 1;
    let day = parse_2_digits(&buf[cursor..], 1, 31, TimestampError::DayInvalid)
        .map_err(|e| (e, cursor))?;
    cursor += day.1;

    expect(buf, cursor, b'T').map_err(|_| (TimestampError::UnknownFormat, cursor))?;
    cursor += 1;

    let hour = parse_2_digits(&buf[cursor..], 0, 23, TimestampError::HourInvalid)
        .map_err(|e| (e, cursor))?;
    cursor += hour.1;
    expect(buf, cursor, b':').map_err(|_| (TimestampError::UnknownFormat, cursor))?;
    cursor += 1;
    let minute = parse_2_digits(&buf[cursor..], 0, 59, TimestampError::MinuteInvalid)
        .map_err(|e| (e, cursor))?;
    cursor += minute.1;
    expect(buf, cursor, b':').map_err(|_| (TimestampError::UnknownFormat, cursor))?;
    cursor += 1;
    let second = parse_2_digits(&buf[cursor..], 0, 59, TimestampError::SecondInvalid)
        .map_err(|e| (e, cursor))?;
    cursor += second.1;

    let mut nanos = 0u32;
    if cursor < buf.len() && buf[cursor] == b'.' {
        cursor += 1;
        let (frac_nanos, frac_len) =
            parse_sec_frac(&buf[cursor..]).map_err(|(e, local)| (e, cursor + local))?;
        nanos = frac_nanos;
        cursor += frac_len;
    }

    let offset = parse_time_offset(buf, &mut cursor).map_err(|e| (e, cursor))?;

    let date =
        NaiveDate::from_ymd_opt(year, month.0, day.0).ok_or((TimestampError::UnknownFormat, 0))?;
    let naive = date
        .and_hms_nano_opt(hour.0, minute.0, second.0, nanos)
        .ok_or((TimestampError::UnknownFormat, 0))?;
    let dt = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or((TimestampError::UnknownFormat, 0))?;

    Ok((Rfc5424Timestamp::Value(dt), cursor))
}

fn expect(buf: &[u8], at: usize, byte: u8) -> Result<(), TimestampError> {
    match buf.get(at) {
        Some(&b) if b == byte => Ok(()),
        _ => Err(TimestampError::UnknownFormat),
    }
}

fn parse_year(buf: &[u8], cursor: &mut usize) -> Result<i32, (TimestampError, usize)> {
    if buf.len() < 4 {
        return Err((TimestampError::EndOfLine, *cursor));
    }
    let slice = &buf[0..4];
    if !slice.iter().all(u8::is_ascii_digit) {
        return Err((TimestampError::YearInvalid, *cursor));
    }
    let year = slice
        .iter()
        .fold(0i32, |acc, &b| acc * 10 + i32::from(b - b'0'));
    *cursor += 4;
    Ok(year)
}

/// `TIME-SECFRAC = "." 1*6DIGIT`. A 7th consecutive digit is an
/// explicit `UnknownFormat` error at that digit's position (spec
/// §8's boundary: "7+ digits yield unknown-format with cursor at
/// position 26").
fn parse_sec_frac(buf: &[u8]) -> Result<(u32, usize), (TimestampError, usize)> {
    let max = 6.min(buf.len());
    let ndigits = buf[..max].iter().take_while(|b| b.is_ascii_digit()).count();

    if ndigits == 0 {
        return Err((TimestampError::SecFracInvalid, 0));
    }

    if ndigits == 6 && buf.get(6).is_some_and(u8::is_ascii_digit) {
        return Err((TimestampError::UnknownFormat, 6));
    }

    Ok((scale_to_nanos(buf, ndigits), ndigits))
}

fn scale_to_nanos(buf: &[u8], ndigits: usize) -> u32 {
    let mut value = 0u64;
    for &b in &buf[..ndigits] {
        value = value * 10 + u64::from(b - b'0');
    }
    let scale = 9 - ndigits as u32;
    (value * 10u64.pow(scale)) as u32
}

fn parse_time_offset(buf: &[u8], cursor: &mut usize) -> Result<FixedOffset, TimestampError> {
    match buf.get(*cursor).copied() {
        Some(b'Z') => {
            *cursor += 1;
            Ok(FixedOffset::east_opt(0).unwrap())
        }
        Some(sign @ (b'+' | b'-')) => {
            *cursor += 1;
            let rest = &buf[*cursor..];
            let hour =
                parse_2_digits(rest, 0, 23, TimestampError::TimeZoneInvalid)?;
            *cursor += hour.1;
            expect(buf, *cursor, b':').map_err(|_| TimestampError::TimeZoneInvalid)?;
            *cursor += 1;
            let minute =
                parse_2_digits(&buf[*cursor..], 0, 59, TimestampError::TimeZoneInvalid)?;
            *cursor += minute.1;

            let total_seconds = (hour.0 * 3600 + minute.0 * 60) as i32;
            let signed = if sign == b'-' { -total_seconds } else { total_seconds };
            FixedOffset::east_opt(signed).ok_or(TimestampError::TimeZoneInvalid)
        }
        _ => Err(TimestampError::TimeZoneInvalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bsd_timestamp_basic() {
        let (ts, consumed) = parse_bsd_timestamp(b"Dec 26 05:08:46", 2024).unwrap();
        assert_eq!(consumed, 15);
        assert_eq!(ts.to_rfc3339(), "2024-12-26T05:08:46+00:00");
    }

    #[test]
    fn bsd_timestamp_space_padded_day() {
        let (ts, _) = parse_bsd_timestamp(b"Oct  1 00:00:00", 2024).unwrap();
        assert_eq!((ts.format("%Y-%m-%d").to_string()), "2024-10-01");
    }

    #[test]
    fn bsd_timestamp_too_short_is_end_of_line() {
        assert_eq!(
            parse_bsd_timestamp(b"Dec 26 05:08", 2024).unwrap_err(),
            TimestampError::EndOfLine
        );
    }

    #[test]
    fn rfc5424_nil_timestamp_is_zero_instant() {
        let (ts, consumed) = parse_rfc5424_timestamp(b"-").unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(ts.to_utc().timestamp(), 0);
    }

    #[test]
    fn rfc5424_timestamp_with_fraction_and_z() {
        let (ts, consumed) = parse_rfc5424_timestamp(b"2003-10-11T22:14:15.003Z").unwrap();
        assert_eq!(consumed, 24);
        match ts {
            Rfc5424Timestamp::Value(dt) => {
                assert_eq!(dt.to_rfc3339(), "2003-10-11T22:14:15.003+00:00");
            }
            Rfc5424Timestamp::Nil => panic!("expected a value"),
        }
    }

    #[test]
    fn rfc5424_timestamp_numeric_offset() {
        let (ts, _) = parse_rfc5424_timestamp(b"2003-08-24T05:14:15.000003-07:00").unwrap();
        match ts {
            Rfc5424Timestamp::Value(dt) => {
                assert_eq!(dt.offset().local_minus_utc(), -7 * 3600);
            }
            Rfc5424Timestamp::Nil => panic!("expected a value"),
        }
    }

    #[test]
    fn one_to_six_fraction_digits_all_pass() {
        for digits in 1..=6 {
            let frac = "1".repeat(digits);
            let input = format!("2003-10-11T22:14:15.{frac}Z");
            assert!(parse_rfc5424_timestamp(input.as_bytes()).is_ok(), "{digits} digits should pass");
        }
    }

    #[test]
    fn seven_fraction_digits_is_unknown_format_at_26() {
        let input = b"2003-10-11T22:14:15.1234567Z";
        let (err, pos) = parse_rfc5424_timestamp(input).unwrap_err();
        assert_eq!(err, TimestampError::UnknownFormat);
        assert_eq!(pos, 26);
    }

    #[test]
    fn month_out_of_range() {
        let (err, _) = parse_rfc5424_timestamp(b"2003-13-11T22:14:15Z").unwrap_err();
        assert_eq!(err, TimestampError::MonthInvalid);
    }

    #[test]
    fn iso8601_lookahead() {
        assert!(looks_like_iso8601(b"2019-06-20T00:00:00Z rest"));
        assert!(!looks_like_iso8601(b"Dec 26 05:08:46 rest"));
    }
}
