//! Cross-module conformance tests: the end-to-end scenarios and
//! quantified invariants that don't belong to any single parser
//! module.

use syslog_rfc::{parse_rfc5424, LogParts};

#[test]
fn scenario_udp_rfc5424_su_root() {
    let input = b"<34>1 2003-10-11T22:14:15.003Z mymachine.example.com su - ID47 - 'su root' failed for lonvick on /dev/pts/8";
    let (parts, err) = parse_rfc5424(input);
    assert!(err.is_none(), "{err:?}");
    assert_eq!(parts.hostname.as_deref(), Some("mymachine.example.com"));
    assert_eq!(parts.facility, 4);
    assert_eq!(parts.severity, 2);
    assert_eq!(
        parts.message,
        "'su root' failed for lonvick on /dev/pts/8"
    );
    assert_eq!(parts.app_name.as_deref(), Some("su"));
    assert_eq!(parts.proc_id, None);
    assert_eq!(parts.msg_id.as_deref(), Some("ID47"));
    assert_eq!(parts.structured_data, "-");
}

/// A record shaped as `<PRI>VER SP TS SP HOST SP APP SP PID SP MID SP
/// SD SP MSG`, re-emitted from parsed parts in RFC 5424 canonical
/// order with `-` for nil values, reproduces the original bytes.
#[test]
fn rfc5424_round_trip_is_byte_identical() {
    let input = "<165>1 2003-10-11T22:14:15.003Z mymachine.example.com evntslog - ID47 [exampleSDID@32473 iut=\"3\"] An application event log entry";
    let (parts, err) = parse_rfc5424(input.as_bytes());
    assert!(err.is_none(), "{err:?}");

    let reemitted = format!(
        "<{}>{} {} {} {} {} {} {} {}",
        parts.priority,
        parts.version,
        parts.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        parts.hostname.as_deref().unwrap_or("-"),
        parts.app_name.as_deref().unwrap_or("-"),
        parts.proc_id.as_deref().unwrap_or("-"),
        parts.msg_id.as_deref().unwrap_or("-"),
        parts.structured_data,
        parts.message,
    );
    assert_eq!(reemitted, input);
}

#[test]
fn every_record_yields_exactly_one_logparts() {
    let inputs: [&[u8]; 2] = [
        b"<31>Dec 26 05:08:46 hostname tag[296]: content",
        b"<165>1 2003-10-11T22:14:15.003Z host app - - - msg",
    ];
    let results: Vec<LogParts> = inputs
        .iter()
        .map(|i| syslog_rfc::parse_auto(i, 2024, None).0)
        .collect();
    assert_eq!(results.len(), inputs.len());
}
