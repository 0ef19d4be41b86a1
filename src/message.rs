//! Community-based SNMP message format (v1/v2c).
//!
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`, where the
//! PDU is `[tag] { request-id, error-status, error-index, varbind-list }`.
//! GETBULK reuses the two error fields for non-repeaters and max-repetitions.

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, malformed, tag};
use crate::engine::{Request, Response};
use crate::error::EngineError;
use crate::error::internal::DecodeErrorKind;
use crate::varbind::{Payload, RawVarBind};
use crate::version::Version;

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum PduType {
    GetRequest = tag::pdu::GET_REQUEST,
    GetNextRequest = tag::pdu::GET_NEXT_REQUEST,
    Response = tag::pdu::RESPONSE,
    GetBulkRequest = tag::pdu::GET_BULK_REQUEST,
}

impl PduType {
    fn from_tag(t: u8) -> Option<Self> {
        match t {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::RESPONSE => Some(Self::Response),
            tag::pdu::GET_BULK_REQUEST => Some(Self::GetBulkRequest),
            _ => None,
        }
    }

    fn tag(self) -> u8 {
        self as u8
    }
}

/// Generic PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pdu {
    pub pdu_type: PduType,
    pub request_id: i32,
    /// Error status, or non-repeaters for GETBULK.
    pub error_status: i32,
    /// Error index, or max-repetitions for GETBULK.
    pub error_index: i32,
    pub varbinds: Vec<RawVarBind>,
}

impl Pdu {
    /// Build the PDU for an engine request.
    pub fn from_request(request_id: i32, request: &Request) -> Self {
        let (pdu_type, error_status, error_index) = match request {
            Request::Get(_) => (PduType::GetRequest, 0, 0),
            Request::GetNext(_) => (PduType::GetNextRequest, 0, 0),
            Request::GetBulk {
                non_repeaters,
                max_repetitions,
                ..
            } => (
                PduType::GetBulkRequest,
                saturating_i32(*non_repeaters),
                saturating_i32(*max_repetitions),
            ),
        };

        Self {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds: request
                .oids()
                .iter()
                .map(|oid| RawVarBind::new(oid.clone(), tag::universal::NULL, Payload::Empty))
                .collect(),
        }
    }

    fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            buf.push_sequence(|buf| {
                for vb in self.varbinds.iter().rev() {
                    buf.push_varbind(vb);
                }
            });
            buf.push_integer(self.error_index);
            buf.push_integer(self.error_status);
            buf.push_integer(self.request_id);
        });
    }

    fn decode(decoder: &mut Decoder) -> Result<Self, EngineError> {
        let at = decoder.offset();
        let Some(pdu_tag) = decoder.peek_tag() else {
            return Err(malformed(at, DecodeErrorKind::TruncatedData));
        };
        let pdu_type = PduType::from_tag(pdu_tag)
            .ok_or_else(|| malformed(at, DecodeErrorKind::UnknownPduType(pdu_tag)))?;

        let mut pdu = decoder.read_constructed(pdu_tag)?;
        let request_id = pdu.read_integer()?;
        let error_status = pdu.read_integer()?;
        let error_index = pdu.read_integer()?;

        let mut list = pdu.read_sequence()?;
        let mut varbinds = Vec::new();
        while !list.is_empty() {
            let mut vb = list.read_sequence()?;
            let oid = vb.read_oid()?;
            let (value_tag, payload) = vb.read_raw_value()?;
            varbinds.push(RawVarBind::new(oid, value_tag, payload));
        }

        Ok(Self {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }

    /// Convert a response PDU into the engine response.
    pub fn into_response(self) -> Response {
        Response {
            error_status: self.error_status,
            error_index: self.error_index,
            varbinds: self.varbinds,
        }
    }
}

fn saturating_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Community-based SNMP message (v1/v2c).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommunityMessage {
    pub version: Version,
    pub community: Bytes,
    pub pdu: Pdu,
}

impl CommunityMessage {
    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32());
        });
        buf.finish()
    }

    /// Decode from BER.
    pub fn decode(data: Bytes) -> Result<Self, EngineError> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let at = seq.offset();
        let version_num = seq.read_integer()?;
        let version = Version::from_i32(version_num)
            .ok_or_else(|| malformed(at, DecodeErrorKind::UnknownVersion(version_num)))?;

        let community = seq.read_octet_string()?;
        let pdu = Pdu::decode(&mut seq)?;

        Ok(Self {
            version,
            community,
            pdu,
        })
    }
}
