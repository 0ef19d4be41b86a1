//! BER decoding.
//!
//! Zero-copy decoding using `Bytes`. Every failure is logged with its precise
//! reason and surfaces as [`EngineError::Malformed`] carrying the byte offset.

use super::length::decode_length;
use super::tag;
use crate::error::EngineError;
use crate::error::internal::DecodeErrorKind;
use crate::oid::Oid;
use crate::varbind::Payload;
use bytes::Bytes;

type BerResult<T> = std::result::Result<T, EngineError>;

/// Log a decode failure and turn it into the public error.
pub(crate) fn malformed(offset: usize, kind: DecodeErrorKind) -> EngineError {
    tracing::debug!(target: "snmp_query::ber", { snmp.offset = %offset, kind = %kind }, "malformed BER");
    EngineError::Malformed { offset }
}

/// BER decoder that reads from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
    /// Position of `data[0]` in the outermost message.
    base: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
        }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Offset within the outermost message.
    pub fn offset(&self) -> usize {
        self.base + self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> BerResult<u8> {
        let Some(byte) = self.peek_tag() else {
            return Err(malformed(self.offset(), DecodeErrorKind::TruncatedData));
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a length.
    pub fn read_length(&mut self) -> BerResult<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset())?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> BerResult<Bytes> {
        if self.offset.saturating_add(len) > self.data.len() {
            return Err(malformed(
                self.offset(),
                DecodeErrorKind::InsufficientData {
                    needed: len,
                    available: self.remaining(),
                },
            ));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> BerResult<usize> {
        let at = self.offset();
        let actual = self.read_tag()?;
        if actual != expected {
            return Err(malformed(
                at,
                DecodeErrorKind::UnexpectedTag { expected, actual },
            ));
        }
        self.read_length()
    }

    /// Read a BER integer (signed).
    pub fn read_integer(&mut self) -> BerResult<i32> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read integer value given the length.
    ///
    /// Over-long integers are truncated to their first four octets, as
    /// net-snmp does.
    pub fn read_integer_value(&mut self, len: usize) -> BerResult<i32> {
        if len == 0 {
            return Err(malformed(self.offset(), DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 4 {
            tracing::warn!(target: "snmp_query::ber", { snmp.offset = %self.offset(), length = len }, "integer too long, truncating to 4 bytes");
        }

        let bytes = self.read_bytes(len)?;
        let init: i32 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        Ok(bytes
            .iter()
            .take(4)
            .fold(init, |acc, &b| (acc << 8) | b as i32))
    }

    /// Read unsigned 32-bit integer value given length.
    pub fn read_unsigned32_value(&mut self, len: usize) -> BerResult<u32> {
        if len == 0 {
            return Err(malformed(self.offset(), DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 5 {
            tracing::warn!(target: "snmp_query::ber", { snmp.offset = %self.offset(), length = len }, "unsigned integer too long, truncating");
        }

        let bytes = self.read_bytes(len)?;
        Ok(bytes
            .iter()
            .take(5)
            .fold(0u32, |acc, &b| (acc << 8) | b as u32))
    }

    /// Read 64-bit unsigned integer value given the length.
    pub fn read_integer64_value(&mut self, len: usize) -> BerResult<u64> {
        if len == 0 {
            return Err(malformed(self.offset(), DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 9 {
            // 9 bytes max: 1 leading zero + 8 bytes for u64
            return Err(malformed(
                self.offset(),
                DecodeErrorKind::Integer64TooLong { length: len },
            ));
        }

        let bytes = self.read_bytes(len)?;
        Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> BerResult<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> BerResult<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    /// Read an OID given a pre-read length.
    pub fn read_oid_value(&mut self, len: usize) -> BerResult<Oid> {
        let start = self.offset();
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|(at, kind)| malformed(start + at, kind))
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> BerResult<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> BerResult<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        let base = self.offset();
        let content = self.read_bytes(len)?;
        Ok(Decoder {
            data: content,
            offset: 0,
            base,
        })
    }

    /// Read one varbind value as its wire tag and payload.
    ///
    /// The payload shape follows the tag; tags outside the SNMP value set
    /// are passed through as raw octets for the caller to judge.
    pub fn read_raw_value(&mut self) -> BerResult<(u8, Payload)> {
        let value_tag = self.read_tag()?;
        let len = self.read_length()?;

        let payload = match value_tag {
            tag::universal::INTEGER => Payload::Int32(self.read_integer_value(len)?),
            tag::universal::OBJECT_IDENTIFIER => Payload::Oid(self.read_oid_value(len)?),
            tag::application::COUNTER32
            | tag::application::GAUGE32
            | tag::application::TIMETICKS => Payload::UInt32(self.read_unsigned32_value(len)?),
            tag::application::COUNTER64 => Payload::UInt64(self.read_integer64_value(len)?),
            tag::universal::NULL
            | tag::context::NO_SUCH_OBJECT
            | tag::context::NO_SUCH_INSTANCE
            | tag::context::END_OF_MIB_VIEW => {
                // Content of a NULL-like value is ignored, as net-snmp does.
                self.read_bytes(len)?;
                Payload::Empty
            }
            _ => Payload::Octets(self.read_bytes(len)?),
        };

        Ok((value_tag, payload))
    }
}
