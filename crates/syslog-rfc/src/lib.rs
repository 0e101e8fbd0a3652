//! Byte-level RFC 3164 / RFC 5424 syslog record parsing.
//!
//! This crate has no I/O of its own — it only turns a byte slice
//! holding one already-framed record into [`LogParts`]. Framing,
//! transport, and dispatch live in `syslog-server`.

mod autodetect;
mod error;
mod parts;
mod pri;
mod primitives;
mod rfc3164;
mod rfc5424;
mod structured_data;
mod timestamp;

pub use autodetect::parse_auto;
pub use error::{FieldError, ParseError, ParseResult, PriorityError, TimestampError, VersionError};
pub use parts::{LogParts, Rfc3164Parts, Rfc5424Parts};
pub use pri::{parse_priority, Priority};
pub use rfc3164::parse_rfc3164;
pub use rfc5424::parse_rfc5424;
pub use structured_data::parse_structured_data;
pub use timestamp::{looks_like_iso8601, parse_bsd_timestamp, parse_rfc5424_timestamp, Rfc5424Timestamp};
