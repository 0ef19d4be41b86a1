//! Reader for net-snmp `snmpwalk -On` output.
//!
//! Loads a recorded device walk into [`Results`], for seeding a
//! mock agent or comparing a live walk against a snapshot.
//!
//! ```text
//! .1.3.6.1.2.1.1.1.0 = STRING: "Linux gw1 5.15.0"
//! .1.3.6.1.2.1.1.3.0 = Timeticks: (4381200) 12:10:12.00
//! .1.3.6.1.2.1.2.2.1.3.1 = INTEGER: ethernetCsmacd(6)
//! .1.3.6.1.2.1.2.2.1.6.1 = Hex-STRING: 00 25 90 A1 0B 7C
//! ```
//!
//! A value may continue over several lines; a new record starts at a line
//! beginning with `.` that contains ` = `. BITS records are skipped.

use std::net::Ipv4Addr;

use bytes::Bytes;

use crate::error::{Error, Result, SnapshotErrorKind};
use crate::format;
use crate::oid::Oid;
use crate::results::Results;
use crate::value::Value;

const SEPARATOR: &str = " = ";

/// Parse snmpwalk output. Later records for the same OID replace earlier ones.
///
/// ```
/// use snmp_query::{Value, oid, snmpwalk};
///
/// let results = snmpwalk::parse(".1.3.6.1.2.1.1.5.0 = STRING: \"gw1\"\n")?;
/// assert_eq!(results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)), Some(&Value::from("gw1")));
/// # Ok::<(), snmp_query::Error>(())
/// ```
pub fn parse(text: &str) -> Result<Results> {
    let mut results = Results::new();

    for (line, record) in records(text) {
        let Some(value) = parse_record(line, &record, &mut results)? else {
            continue;
        };
        tracing::trace!(target: "snmp_query::decode", { snmp.line = line, snmp.value_type = value.type_name() }, "read snapshot record");
    }

    Ok(results)
}

/// Group lines into records, each tagged with its 1-based first line.
fn records(text: &str) -> Vec<(usize, String)> {
    let mut records: Vec<(usize, String)> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if is_record_start(line) || records.is_empty() {
            if !line.trim().is_empty() {
                records.push((i + 1, line.to_string()));
            }
        } else if let Some((_, record)) = records.last_mut() {
            record.push('\n');
            record.push_str(line);
        }
    }

    // blank lines between records
    for (_, record) in &mut records {
        let trimmed = record.trim_end_matches(['\n', '\r']).len();
        record.truncate(trimmed);
    }
    records
}

fn is_record_start(line: &str) -> bool {
    line.starts_with('.')
        && line
            .split_once(SEPARATOR)
            .is_some_and(|(oid, _)| Oid::parse(oid).is_ok())
}

fn parse_record(line: usize, record: &str, results: &mut Results) -> Result<Option<Value>> {
    let err = |text: &str, kind| Error::InvalidSnapshot {
        line,
        text: text.into(),
        kind,
    };

    let (oid_text, rest) = record
        .split_once(SEPARATOR)
        .ok_or_else(|| err(record, SnapshotErrorKind::MissingSeparator))?;
    let oid = Oid::parse(oid_text.trim())
        .map_err(|_| err(oid_text, SnapshotErrorKind::MissingSeparator))?;

    let value = match parse_value(rest) {
        Ok(Some(value)) => value,
        Ok(None) => return Ok(None),
        Err((text, kind)) => return Err(err(text, kind)),
    };

    results.insert(oid, value.clone());
    Ok(Some(value))
}

/// Parse `<TYPE>: <value>` or one of the untyped forms.
///
/// `Ok(None)` means the record is deliberately skipped.
fn parse_value(text: &str) -> std::result::Result<Option<Value>, (&str, SnapshotErrorKind)> {
    let text = text.trim_end();

    // untyped forms
    if text == "\"\"" {
        return Ok(Some(Value::OctetString(Bytes::new())));
    }
    if text.starts_with("No Such Object") {
        return Ok(Some(Value::NoSuchObject));
    }
    if text.starts_with("No Such Instance") {
        return Ok(Some(Value::NoSuchInstance));
    }
    if text.starts_with("No more variables left") {
        return Ok(Some(Value::EndOfMibView));
    }
    if text == "NULL" {
        return Ok(Some(Value::Null));
    }

    let (type_name, raw) = match text.split_once(':') {
        Some((type_name, raw)) => (type_name, raw.trim()),
        None => return Err((text, SnapshotErrorKind::UnknownType)),
    };
    let bad = || (raw, SnapshotErrorKind::BadValue);

    let value = match type_name {
        "STRING" | "String" => Value::OctetString(Bytes::copy_from_slice(unquote(raw).as_bytes())),
        "Hex-STRING" => Value::OctetString(format::parse_hex_dump(raw).ok_or_else(bad)?.into()),
        "Opaque" => Value::Opaque(format::parse_hex_dump(raw).ok_or_else(bad)?.into()),
        "OID" => Value::ObjectId(Oid::parse(raw).map_err(|_| bad())?),
        "IpAddress" => Value::IpAddress(raw.parse::<Ipv4Addr>().map_err(|_| bad())?.octets()),
        "INTEGER" => Value::Integer32(enum_number(raw).parse().map_err(|_| bad())?),
        "Gauge32" | "Unsigned32" => Value::Unsigned32(raw.parse().map_err(|_| bad())?),
        "Counter32" => Value::Counter32(raw.parse().map_err(|_| bad())?),
        "Counter64" => Value::Counter64(raw.parse().map_err(|_| bad())?),
        "Timeticks" => Value::Timeticks(
            parenthesised(raw)
                .and_then(|n| n.parse().ok())
                .ok_or_else(bad)?,
        ),
        "BITS" => return Ok(None),
        _ => return Err((type_name, SnapshotErrorKind::UnknownType)),
    };

    Ok(Some(value))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

/// Text between the first `(` and the following `)`.
fn parenthesised(s: &str) -> Option<&str> {
    let (_, rest) = s.split_once('(')?;
    let (inner, _) = rest.split_once(')')?;
    Some(inner)
}

/// `up(1)` -> `1`; a bare number is returned as-is.
fn enum_number(s: &str) -> &str {
    parenthesised(s).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    const WALK: &str = r#".1.3.6.1.2.1.1.1.0 = STRING: "Cisco IOS Software, C2960 Software
Technical Support: http://www.cisco.com/techsupport
Copyright (c) 1986-2010 by Cisco Systems, Inc."
.1.3.6.1.2.1.1.2.0 = OID: .1.3.6.1.4.1.9.1.1208
.1.3.6.1.2.1.1.3.0 = Timeticks: (4381200) 12:10:12.00
.1.3.6.1.2.1.1.5.0 = STRING: "gw1"
.1.3.6.1.2.1.1.7.0 = INTEGER: 72
.1.3.6.1.2.1.2.2.1.3.1 = INTEGER: ethernetCsmacd(6)
.1.3.6.1.2.1.2.2.1.5.1 = Gauge32: 1000000000
.1.3.6.1.2.1.2.2.1.6.1 = Hex-STRING: 00 25 90 A1 0B 7C
.1.3.6.1.2.1.2.2.1.10.1 = Counter32: 3123456
.1.3.6.1.2.1.4.20.1.1.192.0.2.1 = IpAddress: 192.0.2.1
.1.3.6.1.2.1.31.1.1.1.6.1 = Counter64: 18446744073709551615
.1.3.6.1.2.1.88.1.4.2.1.3.6 = BITS: 38 30 20 30 2 3
.1.3.6.1.2.1.1.9.1.2.1 = ""
"#;

    // ========================================================================
    // Types
    // ========================================================================

    #[test]
    fn test_parse_all_types() {
        let results = parse(WALK).unwrap();
        assert_eq!(results.len(), 12);

        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)),
            Some(&Value::ObjectId(oid!(1, 3, 6, 1, 4, 1, 9, 1, 1208)))
        );
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)),
            Some(&Value::Timeticks(4381200))
        );
        assert_eq!(results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 7, 0)), Some(&Value::Integer32(72)));
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 3, 1)),
            Some(&Value::Integer32(6))
        );
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 5, 1)),
            Some(&Value::Unsigned32(1_000_000_000))
        );
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 6, 1)),
            Some(&Value::OctetString(vec![0x00, 0x25, 0x90, 0xA1, 0x0B, 0x7C].into()))
        );
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 1)),
            Some(&Value::Counter32(3_123_456))
        );
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 4, 20, 1, 1, 192, 0, 2, 1)),
            Some(&Value::IpAddress([192, 0, 2, 1]))
        );
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6, 1)),
            Some(&Value::Counter64(u64::MAX))
        );
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 9, 1, 2, 1)),
            Some(&Value::OctetString(Default::default()))
        );
    }

    #[test]
    fn test_multiline_string() {
        let results = parse(WALK).unwrap();
        let descr = results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).unwrap();
        let text = descr.to_string();
        assert!(text.starts_with("Cisco IOS Software"), "{}", text);
        assert!(text.ends_with("Cisco Systems, Inc."), "{}", text);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_bits_skipped() {
        let results = parse(WALK).unwrap();
        assert!(!results.contains(&oid!(1, 3, 6, 1, 2, 1, 88, 1, 4, 2, 1, 3, 6)));
    }

    #[test]
    fn test_exception_lines() {
        let text = "\
.1.3.6.1.2.1.1.8.0 = No Such Object available on this agent at this OID
.1.3.6.1.2.1.1.8.1 = No Such Instance currently exists at this OID
.1.3.6.1.2.1.99 = No more variables left in this MIB View (It is past the end of the MIB tree)
";
        let results = parse(text).unwrap();
        let values: Vec<_> = results.iter().map(|(_, v)| v.clone()).collect();
        assert_eq!(
            values,
            [Value::NoSuchObject, Value::NoSuchInstance, Value::EndOfMibView]
        );
    }

    #[test]
    fn test_later_record_replaces() {
        let text = ".1.3.6.1.2.1.1.5.0 = STRING: \"a\"\n.1.3.6.1.2.1.1.5.0 = STRING: \"b\"\n";
        let results = parse(text).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)), Some(&Value::from("b")));
    }

    // ========================================================================
    // Errors
    // ========================================================================

    #[test]
    fn test_unknown_type_reports_line() {
        let text = ".1.3.6.1.2.1.1.5.0 = STRING: \"gw1\"\n.1.3.6.1.2.1.1.6.0 = Float: 1.5\n";
        match parse(text).unwrap_err() {
            Error::InvalidSnapshot { line, text, kind } => {
                assert_eq!(line, 2);
                assert_eq!(&*text, "Float");
                assert_eq!(kind, SnapshotErrorKind::UnknownType);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_value() {
        let err = parse(".1.3.6.1.2.1.2.2.1.10.1 = Counter32: -4\n").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSnapshot {
                line: 1,
                kind: SnapshotErrorKind::BadValue,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_separator() {
        let err = parse("garbage\n").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSnapshot {
                kind: SnapshotErrorKind::MissingSeparator,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n\n").unwrap().is_empty());
    }
}
