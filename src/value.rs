//! SNMP value types.
//!
//! The `Value` enum is the closed set of varbind value variants: one per SNMP
//! wire type, including the three v2c exception markers. Every variant renders
//! to a string (via `Display`) and to an integer (via [`Value::integer`]).

use crate::ber::tag;
use crate::error::DecodeWarning;
use crate::format;
use crate::oid::Oid;
use crate::varbind::Payload;
use bytes::Bytes;

/// SNMP varbind value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// NULL
    Null,

    /// OCTET STRING (arbitrary bytes).
    OctetString(Bytes),

    /// OBJECT IDENTIFIER
    ObjectId(Oid),

    /// IpAddress (4 bytes, network order)
    IpAddress([u8; 4]),

    /// INTEGER / Integer32 (signed 32-bit)
    Integer32(i32),

    /// Unsigned32 / Gauge32
    Unsigned32(u32),

    /// Counter32 (unsigned 32-bit, wrapping)
    Counter32(u32),

    /// TimeTicks (hundredths of seconds)
    Timeticks(u32),

    /// Opaque (legacy, arbitrary bytes)
    Opaque(Bytes),

    /// Counter64 (unsigned 64-bit, wrapping).
    ///
    /// v2c only; a v1 agent never returns one.
    Counter64(u64),

    /// noSuchObject exception.
    NoSuchObject,

    /// noSuchInstance exception.
    NoSuchInstance,

    /// endOfMibView exception, the normal end of a GETNEXT/GETBULK walk.
    EndOfMibView,
}

impl Value {
    /// Build a value from a wire tag and its payload.
    ///
    /// The tag is checked first and the payload is only interpreted if it has
    /// the shape that tag requires. Unknown tags and mismatched payloads come
    /// back as a [`DecodeWarning`] instead of a value.
    ///
    /// ```
    /// use snmp_query::{Payload, Value};
    /// use snmp_query::ber::tag;
    ///
    /// let v = Value::decode(tag::application::COUNTER64, Payload::UInt64(u64::MAX)).unwrap();
    /// assert_eq!(v.to_string(), "18446744073709551615");
    ///
    /// assert!(Value::decode(0x47, Payload::Empty).is_err());
    /// ```
    pub fn decode(wire_tag: u8, payload: Payload) -> Result<Self, DecodeWarning> {
        use tag::{application as app, context as ctx, universal as uni};

        let mismatch = |payload: &Payload| DecodeWarning::PayloadMismatch {
            tag: wire_tag,
            payload: payload.kind_name(),
        };

        match wire_tag {
            uni::NULL => match payload {
                Payload::Empty => Ok(Value::Null),
                other => Err(mismatch(&other)),
            },
            uni::OCTET_STRING => match payload {
                Payload::Octets(data) => Ok(Value::OctetString(data)),
                other => Err(mismatch(&other)),
            },
            uni::OBJECT_IDENTIFIER => match payload {
                Payload::Oid(oid) => Ok(Value::ObjectId(oid)),
                other => Err(mismatch(&other)),
            },
            app::IP_ADDRESS => match payload {
                Payload::Octets(data) => match <[u8; 4]>::try_from(&data[..]) {
                    Ok(addr) => Ok(Value::IpAddress(addr)),
                    Err(_) => Err(DecodeWarning::BadIpAddressLength { length: data.len() }),
                },
                other => Err(mismatch(&other)),
            },
            uni::INTEGER => match payload {
                Payload::Int32(v) => Ok(Value::Integer32(v)),
                other => Err(mismatch(&other)),
            },
            app::GAUGE32 | app::COUNTER32 | app::TIMETICKS => match payload {
                Payload::UInt32(v) => Ok(match wire_tag {
                    app::GAUGE32 => Value::Unsigned32(v),
                    app::COUNTER32 => Value::Counter32(v),
                    _ => Value::Timeticks(v),
                }),
                other => Err(mismatch(&other)),
            },
            app::OPAQUE => match payload {
                Payload::Octets(data) => Ok(Value::Opaque(data)),
                other => Err(mismatch(&other)),
            },
            app::COUNTER64 => match payload {
                Payload::UInt64(v) => Ok(Value::Counter64(v)),
                other => Err(mismatch(&other)),
            },
            ctx::NO_SUCH_OBJECT | ctx::NO_SUCH_INSTANCE | ctx::END_OF_MIB_VIEW => match payload {
                Payload::Empty => Ok(match wire_tag {
                    ctx::NO_SUCH_OBJECT => Value::NoSuchObject,
                    ctx::NO_SUCH_INSTANCE => Value::NoSuchInstance,
                    _ => Value::EndOfMibView,
                }),
                other => Err(mismatch(&other)),
            },
            other => Err(DecodeWarning::UnknownTag { tag: other }),
        }
    }

    /// Split into wire tag and payload; the inverse of [`Value::decode`].
    pub fn to_wire(&self) -> (u8, Payload) {
        use tag::{application as app, context as ctx, universal as uni};

        match self {
            Value::Null => (uni::NULL, Payload::Empty),
            Value::OctetString(data) => (uni::OCTET_STRING, Payload::Octets(data.clone())),
            Value::ObjectId(oid) => (uni::OBJECT_IDENTIFIER, Payload::Oid(oid.clone())),
            Value::IpAddress(addr) => (
                app::IP_ADDRESS,
                Payload::Octets(Bytes::copy_from_slice(addr)),
            ),
            Value::Integer32(v) => (uni::INTEGER, Payload::Int32(*v)),
            Value::Unsigned32(v) => (app::GAUGE32, Payload::UInt32(*v)),
            Value::Counter32(v) => (app::COUNTER32, Payload::UInt32(*v)),
            Value::Timeticks(v) => (app::TIMETICKS, Payload::UInt32(*v)),
            Value::Opaque(data) => (app::OPAQUE, Payload::Octets(data.clone())),
            Value::Counter64(v) => (app::COUNTER64, Payload::UInt64(*v)),
            Value::NoSuchObject => (ctx::NO_SUCH_OBJECT, Payload::Empty),
            Value::NoSuchInstance => (ctx::NO_SUCH_INSTANCE, Payload::Empty),
            Value::EndOfMibView => (ctx::END_OF_MIB_VIEW, Payload::Empty),
        }
    }

    /// Integer rendering of the value.
    ///
    /// Numeric variants widen losslessly (`i128` holds both the signed 32-bit
    /// and the full unsigned 64-bit range). An IpAddress is its big-endian
    /// 32-bit interpretation. Everything else, including octet strings that
    /// happen to contain digits, is 0.
    ///
    /// ```
    /// use snmp_query::Value;
    ///
    /// assert_eq!(Value::Counter64(u64::MAX).integer(), u64::MAX as i128);
    /// assert_eq!(Value::Integer32(-5).integer(), -5);
    /// assert_eq!(Value::IpAddress([10, 0, 0, 1]).integer(), 0x0A00_0001);
    /// assert_eq!(Value::OctetString("42".into()).integer(), 0);
    /// ```
    pub fn integer(&self) -> i128 {
        match self {
            Value::Integer32(v) => i128::from(*v),
            Value::Unsigned32(v) | Value::Counter32(v) | Value::Timeticks(v) => i128::from(*v),
            Value::Counter64(v) => i128::from(*v),
            Value::IpAddress(addr) => i128::from(u32::from_be_bytes(*addr)),
            Value::Null
            | Value::OctetString(_)
            | Value::ObjectId(_)
            | Value::Opaque(_)
            | Value::NoSuchObject
            | Value::NoSuchInstance
            | Value::EndOfMibView => 0,
        }
    }

    /// Name of the variant, as shown by [`Results::dump`](crate::Results::dump).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::OctetString(_) => "OctetString",
            Value::ObjectId(_) => "ObjectID",
            Value::IpAddress(_) => "IPAddress",
            Value::Integer32(_) => "Integer32",
            Value::Unsigned32(_) => "Unsigned32",
            Value::Counter32(_) => "Counter32",
            Value::Timeticks(_) => "Timeticks",
            Value::Opaque(_) => "Opaque",
            Value::Counter64(_) => "Counter64",
            Value::NoSuchObject => "NoSuchObject",
            Value::NoSuchInstance => "NoSuchInstance",
            Value::EndOfMibView => "EndOfMibView",
        }
    }

    /// Check for the v2c exception markers.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Try to get as i32 (Integer32 only).
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32 (Unsigned32, Counter32, Timeticks).
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Unsigned32(v) | Value::Counter32(v) | Value::Timeticks(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u64 (any unsigned variant).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Counter64(v) => Some(*v),
            Value::Unsigned32(v) | Value::Counter32(v) | Value::Timeticks(v) => {
                Some(u64::from(*v))
            }
            _ => None,
        }
    }

    /// Try to get the raw bytes of an OctetString or Opaque.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(data) | Value::Opaque(data) => Some(data),
            _ => None,
        }
    }

    /// Try to get as OID.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectId(oid) => Some(oid),
            _ => None,
        }
    }

    /// Try to get as IPv4 address.
    pub fn as_ip(&self) -> Option<std::net::Ipv4Addr> {
        match self {
            Value::IpAddress(addr) => Some(std::net::Ipv4Addr::from(*addr)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::OctetString(data) => {
                if format::is_printable(data) {
                    // is_printable guarantees ASCII
                    write!(f, "{}", String::from_utf8_lossy(data))
                } else {
                    write!(f, "{}", format::hex_dump(data))
                }
            }
            Value::ObjectId(oid) => write!(f, "{}", oid),
            Value::IpAddress(addr) => {
                write!(f, "{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3])
            }
            Value::Integer32(v) => write!(f, "{}", v),
            Value::Unsigned32(v) | Value::Counter32(v) => write!(f, "{}", v),
            Value::Timeticks(v) => write!(f, "{}", format::timeticks(*v)),
            Value::Opaque(data) => write!(f, "{}", format::hex_dump(data)),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::NoSuchObject => {
                write!(f, "No Such Object available on this agent at this OID")
            }
            Value::NoSuchInstance => write!(f, "No Such Instance"),
            Value::EndOfMibView => write!(f, "End of MIB View"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer32(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectId(oid)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Counter64(v)
    }
}
