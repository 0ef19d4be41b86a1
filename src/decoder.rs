//! Result decoding.
//!
//! Turns the raw varbinds of an engine response into typed values and merges
//! them into a [`Results`] collection. A varbind that cannot be decoded is
//! recorded as a [`DecodeWarning`](crate::DecodeWarning) for its OID and the
//! rest of the batch is still decoded.

use crate::results::Results;
use crate::value::Value;
use crate::varbind::RawVarBind;

/// Outcome counts of one [`decode_into`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Varbinds stored as values.
    pub decoded: usize,
    /// Varbinds recorded as warnings.
    pub warnings: usize,
}

/// Decode `varbinds` in order and merge them into `results`.
///
/// An OID already present is replaced. Later varbinds for the same OID win.
pub fn decode_into<I>(results: &mut Results, varbinds: I) -> DecodeSummary
where
    I: IntoIterator<Item = RawVarBind>,
{
    let mut summary = DecodeSummary::default();

    for RawVarBind { oid, tag, payload } in varbinds {
        match Value::decode(tag, payload) {
            Ok(value) => {
                tracing::trace!(target: "snmp_query::decode", { snmp.oid = %oid, snmp.value_type = value.type_name() }, "decoded varbind");
                results.insert(oid, value);
                summary.decoded += 1;
            }
            Err(warning) => {
                tracing::warn!(target: "snmp_query::decode", { snmp.oid = %oid, snmp.tag = tag, %warning }, "could not decode varbind");
                results.record_warning(oid, warning);
                summary.warnings += 1;
            }
        }
    }

    summary
}
