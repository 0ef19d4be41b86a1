//! Output formatting for the CLI.
//!
//! Supports the dump listing, snmpwalk-style lines and JSON.

use crate::cli::args::OutputFormat;
use crate::{Oid, Results, Value, Version, format};
use serde::Serialize;
use std::io::{self, Write};

/// Query output as serialized by the JSON format.
#[derive(Debug, Serialize)]
pub struct QueryOutput {
    pub uri: String,
    pub version: String,
    pub results: Vec<EntryOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<WarningOutput>,
}

/// A single result entry.
#[derive(Debug, Serialize)]
pub struct EntryOutput {
    pub oid: String,
    #[serde(rename = "type")]
    pub value_type: &'static str,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

/// A per-OID decode warning.
#[derive(Debug, Serialize)]
pub struct WarningOutput {
    pub oid: String,
    pub warning: String,
}

impl QueryOutput {
    /// Build the serializable form of `results`.
    pub fn new(uri: &str, version: Version, results: &Results) -> Self {
        Self {
            uri: uri.to_string(),
            version: version.to_string(),
            results: results
                .iter()
                .map(|(oid, value)| EntryOutput::new(oid, value))
                .collect(),
            warnings: results
                .warnings()
                .map(|(oid, warning)| WarningOutput {
                    oid: oid.to_string(),
                    warning: warning.to_string(),
                })
                .collect(),
        }
    }
}

impl EntryOutput {
    fn new(oid: &Oid, value: &Value) -> Self {
        let (value_json, formatted) = json_value(value);
        Self {
            oid: oid.to_string(),
            value_type: value.type_name(),
            value: value_json,
            formatted,
        }
    }
}

/// Write `results` to `w` in the requested format.
pub fn write_results<W: Write>(
    w: &mut W,
    format: OutputFormat,
    uri: &str,
    version: Version,
    results: &Results,
) -> io::Result<()> {
    match format {
        OutputFormat::Dump => results.dump(w),
        OutputFormat::Walk => write_walk(w, results),
        OutputFormat::Json => {
            let output = QueryOutput::new(uri, version, results);
            let json = serde_json::to_string_pretty(&output).map_err(io::Error::other)?;
            writeln!(w, "{}", json)
        }
    }
}

/// Write one `.oid = TYPE: value` line per entry.
///
/// The output is accepted by [`snmpwalk::parse`](crate::snmpwalk::parse).
pub fn write_walk<W: Write>(w: &mut W, results: &Results) -> io::Result<()> {
    for (oid, value) in results {
        writeln!(w, "{} = {}", oid, walk_value(value))?;
    }
    Ok(())
}

/// Right-hand side of an snmpwalk line.
fn walk_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".into(),
        Value::OctetString(bytes) if bytes.is_empty() => "\"\"".into(),
        Value::OctetString(bytes) if format::is_printable(bytes) => {
            format!("STRING: \"{}\"", String::from_utf8_lossy(bytes))
        }
        Value::OctetString(bytes) => format!("Hex-STRING: {}", format::hex_dump(bytes)),
        Value::ObjectId(oid) => format!("OID: {}", oid),
        Value::IpAddress(_) => format!("IpAddress: {}", value),
        Value::Integer32(v) => format!("INTEGER: {}", v),
        Value::Unsigned32(v) => format!("Gauge32: {}", v),
        Value::Counter32(v) => format!("Counter32: {}", v),
        Value::Timeticks(v) => format!("Timeticks: ({}) {}", v, format::timeticks(*v)),
        Value::Opaque(bytes) => format!("Opaque: {}", format::hex_dump(bytes)),
        Value::Counter64(v) => format!("Counter64: {}", v),
        Value::NoSuchObject => "No Such Object available on this agent at this OID".into(),
        Value::NoSuchInstance => "No Such Instance currently exists at this OID".into(),
        Value::EndOfMibView => {
            "No more variables left in this MIB View (It is past the end of the MIB tree)".into()
        }
    }
}

/// Format a value as (json_value, formatted_string).
fn json_value(value: &Value) -> (serde_json::Value, Option<String>) {
    match value {
        Value::Null
        | Value::NoSuchObject
        | Value::NoSuchInstance
        | Value::EndOfMibView => (serde_json::Value::Null, Some(value.to_string())),
        Value::OctetString(bytes) if format::is_printable(bytes) => (
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()),
            None,
        ),
        Value::OctetString(bytes) | Value::Opaque(bytes) => {
            (serde_json::Value::String(format::hex_dump(bytes)), None)
        }
        Value::ObjectId(_) | Value::IpAddress(_) => {
            (serde_json::Value::String(value.to_string()), None)
        }
        Value::Integer32(v) => ((*v).into(), None),
        Value::Unsigned32(v) | Value::Counter32(v) => ((*v).into(), None),
        Value::Timeticks(v) => ((*v).into(), Some(format::timeticks(*v))),
        Value::Counter64(v) => ((*v).into(), None),
    }
}

/// Write an error and its causes to stderr.
pub fn write_error(err: &crate::Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "Error ({}): {}", err.stage(), err);

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  caused by: {}", cause);
        source = std::error::Error::source(cause);
    }
}
