//! BER encoding.
//!
//! Uses a reverse buffer approach: writes from end backwards to avoid
//! needing to pre-calculate lengths.

use super::length::encode_length;
use super::tag;
use crate::oid::Oid;
use crate::varbind::{Payload, RawVarBind};
use bytes::Bytes;

/// Buffer for BER encoding that writes backwards.
///
/// Content goes in first, then the length and tag are prepended, so nested
/// lengths never have to be computed up front.
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create an empty buffer sized for a typical request.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(512),
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Prepend `content` (kept in forward order in the output).
    fn push_bytes(&mut self, content: &[u8]) {
        self.buf.extend(content.iter().rev());
    }

    fn push_length(&mut self, len: usize) {
        let (bytes, count) = encode_length(len);
        // already reversed for prepending
        self.buf.extend_from_slice(&bytes[..count]);
    }

    /// Prepend one primitive TLV.
    fn push_primitive(&mut self, value_tag: u8, content: &[u8]) {
        self.push_bytes(content);
        self.push_length(content.len());
        self.buf.push(value_tag);
    }

    /// Prepend an integer under `value_tag` in its shortest two's-complement
    /// form. Unsigned wire types pass their value widened, which gains the
    /// leading zero octet when the top bit is set.
    fn push_int(&mut self, value_tag: u8, value: i128) {
        let bytes = value.to_be_bytes();
        self.push_primitive(value_tag, minimal_twos_complement(&bytes));
    }

    /// Encode a constructed type (SEQUENCE, PDU, etc).
    ///
    /// Calls the closure to encode contents, then wraps with length and tag.
    pub fn push_constructed<F>(&mut self, constructed_tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let start_len = self.len();
        f(self);
        let content_len = self.len() - start_len;
        self.push_length(content_len);
        self.buf.push(constructed_tag);
    }

    /// Encode a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Encode an INTEGER.
    pub fn push_integer(&mut self, value: i32) {
        self.push_int(tag::universal::INTEGER, value.into());
    }

    /// Encode an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_primitive(tag::universal::OCTET_STRING, data);
    }

    /// Encode an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &Oid) {
        self.push_primitive(tag::universal::OBJECT_IDENTIFIER, &oid.to_ber_smallvec());
    }

    /// Encode a value under an arbitrary tag from its payload.
    ///
    /// The payload decides the content encoding; the tag is written as given,
    /// so a value can be sent under any wire type.
    pub fn push_raw_value(&mut self, value_tag: u8, payload: &Payload) {
        match payload {
            Payload::Empty => self.push_primitive(value_tag, &[]),
            Payload::Int32(v) => self.push_int(value_tag, (*v).into()),
            Payload::UInt32(v) => self.push_int(value_tag, (*v).into()),
            Payload::UInt64(v) => self.push_int(value_tag, (*v).into()),
            Payload::Octets(data) => self.push_primitive(value_tag, data),
            Payload::Oid(oid) => self.push_primitive(value_tag, &oid.to_ber_smallvec()),
        }
    }

    /// Encode a varbind: `SEQUENCE { name OID, value }`.
    pub fn push_varbind(&mut self, vb: &RawVarBind) {
        self.push_sequence(|buf| {
            buf.push_raw_value(vb.tag, &vb.payload);
            buf.push_oid(&vb.oid);
        });
    }

    /// Finalize and return the encoded bytes in wire order.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip leading octets that only repeat the sign bit.
///
/// A 0x00 is redundant when the next octet is non-negative, a 0xFF when the
/// next octet is negative. At least one octet always remains.
fn minimal_twos_complement(bytes: &[u8]) -> &[u8] {
    let redundant = bytes
        .windows(2)
        .take_while(|w| (w[0] == 0x00 && w[1] & 0x80 == 0) || (w[0] == 0xFF && w[1] & 0x80 != 0))
        .count();
    &bytes[redundant..]
}
