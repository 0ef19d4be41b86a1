//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! Encoding and decoding of BER data as used by the v1/v2c message format.
//! Parsing is permissive in the same places net-snmp is (non-minimal lengths
//! and integers are accepted).

mod decode;
mod encode;
mod length;
pub mod tag;

pub(crate) use decode::*;
pub(crate) use encode::*;
pub(crate) use length::*;
