//! Variable bindings.
//!
//! [`RawVarBind`] is what an engine hands back: an OID, the wire type tag and
//! a discriminated [`Payload`]. [`QueryResult`] is the decoded pair stored in
//! [`Results`](crate::Results).

use bytes::Bytes;

use crate::oid::Oid;
use crate::value::Value;

/// Raw varbind payload, as chosen by the engine for the wire type.
///
/// Either a scalar of a fixed width or an owned byte/OID vector; never raw
/// memory to be reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// No content (NULL and the exception markers).
    Empty,
    /// Signed 32-bit scalar.
    Int32(i32),
    /// Unsigned 32-bit scalar.
    UInt32(u32),
    /// Unsigned 64-bit scalar.
    UInt64(u64),
    /// Byte vector (octet strings, IP addresses, opaque, unknown types).
    Octets(Bytes),
    /// Object identifier.
    Oid(Oid),
}

impl Payload {
    /// Short name of the payload shape, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Int32(_) => "int32",
            Payload::UInt32(_) => "uint32",
            Payload::UInt64(_) => "uint64",
            Payload::Octets(_) => "octets",
            Payload::Oid(_) => "oid",
        }
    }
}

/// Undecoded varbind returned by an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVarBind {
    /// The object identifier.
    pub oid: Oid,
    /// BER tag of the value.
    pub tag: u8,
    /// Value content.
    pub payload: Payload,
}

impl RawVarBind {
    /// Create a new raw varbind.
    pub fn new(oid: Oid, tag: u8, payload: Payload) -> Self {
        Self { oid, tag, payload }
    }

    /// Raw varbind carrying an already-typed value.
    pub fn from_value(oid: Oid, value: &Value) -> Self {
        let (tag, payload) = value.to_wire();
        Self { oid, tag, payload }
    }

    /// Check for the v2c endOfMibView marker without decoding.
    pub fn is_end_of_mib_view(&self) -> bool {
        self.tag == crate::ber::tag::context::END_OF_MIB_VIEW
    }
}

/// A decoded (OID, value) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl QueryResult {
    /// Create a new QueryResult.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }
}

impl std::fmt::Display for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_query_result_display() {
        let r = QueryResult::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("gw1"));
        assert_eq!(r.to_string(), ".1.3.6.1.2.1.1.5.0 = gw1");
    }

    #[test]
    fn test_raw_from_value_end_of_mib() {
        let raw = RawVarBind::from_value(oid!(1, 3), &Value::EndOfMibView);
        assert!(raw.is_end_of_mib_view());
        assert_eq!(raw.payload, Payload::Empty);

        let raw = RawVarBind::from_value(oid!(1, 3), &Value::Integer32(0));
        assert!(!raw.is_end_of_mib_view());
    }
}
