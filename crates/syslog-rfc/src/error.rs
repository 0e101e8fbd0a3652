//! Parse error types for the priority, RFC 3164, and RFC 5424 grammars.

use thiserror::Error;

/// Errors that can occur while decoding the `<PRI>` prefix.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PriorityError {
    #[error("priority field empty")]
    Empty,
    #[error("no start char found for priority")]
    NoStart,
    #[error("no end char found for priority")]
    NoEnd,
    #[error("priority field too short")]
    TooShort,
    #[error("priority field too long")]
    TooLong,
    #[error("non digit found in priority")]
    NonDigit,
}

/// Errors from the RFC 5424 `VERSION` field.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VersionError {
    #[error("can not find version")]
    NotFound,
    #[error("non digit found in version")]
    NonDigit,
}

/// Errors from either timestamp grammar.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimestampError {
    #[error("year invalid")]
    YearInvalid,
    #[error("month invalid")]
    MonthInvalid,
    #[error("day invalid")]
    DayInvalid,
    #[error("hour invalid")]
    HourInvalid,
    #[error("minute invalid")]
    MinuteInvalid,
    #[error("second invalid")]
    SecondInvalid,
    #[error("sub-second fraction invalid")]
    SecFracInvalid,
    #[error("time zone invalid")]
    TimeZoneInvalid,
    #[error("unknown timestamp format")]
    UnknownFormat,
    #[error("unexpected end of line while reading timestamp")]
    EndOfLine,
}

/// Errors from the remaining length-bounded or delimited fields.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid app-name")]
    InvalidAppName,
    #[error("invalid proc-id")]
    InvalidProcId,
    #[error("invalid msg-id")]
    InvalidMsgId,
    #[error("tag too long")]
    TagTooLong,
    #[error("no space found")]
    NoSpace,
    #[error("no structured data found")]
    NoStructuredData,
    #[error("unexpected end of line")]
    EndOfLine,
}

/// The unified parse error for a single record, tagged by the
/// component that raised it (spec §7 categories 1–4; I/O and
/// configuration errors belong to `syslog-server`, not here).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("priority: {0}")]
    Priority(#[from] PriorityError),
    #[error("version: {0}")]
    Version(#[from] VersionError),
    #[error("timestamp: {0}")]
    Timestamp(#[from] TimestampError),
    #[error("field: {0}")]
    Field(#[from] FieldError),
}

pub type ParseResult<T> = Result<T, ParseError>;
