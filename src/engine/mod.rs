//! SNMP engine abstraction.
//!
//! An [`Engine`] performs one request/response exchange with an agent. The
//! query layer builds [`Request`]s and interprets [`Response`]s; it never
//! touches the wire format itself.

mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;
#[cfg(any(test, feature = "testing"))]
mod oid_table;

pub use udp::*;

#[cfg(any(test, feature = "testing"))]
pub use mock::*;
#[cfg(any(test, feature = "testing"))]
pub use oid_table::OidTable;

use std::time::Duration;

use bytes::Bytes;

use crate::error::{EngineError, ErrorStatus};
use crate::oid::Oid;
use crate::varbind::RawVarBind;
use crate::version::Version;

/// Default SNMP agent port.
pub const DEFAULT_PORT: u16 = 161;

/// Target and credentials for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Host name or address literal (IPv6 without brackets).
    pub host: String,
    /// UDP port.
    pub port: u16,
    /// Community string.
    pub community: Bytes,
    /// Protocol version.
    pub version: Version,
    /// Time to wait for each attempt.
    pub timeout: Duration,
    /// Resends after the first attempt times out.
    pub retries: u32,
}

impl Session {
    /// Session for `host` with the default port, community `public`, v2c,
    /// a 200 ms timeout and 3 retries.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            community: Bytes::from_static(b"public"),
            version: Version::V2c,
            timeout: Duration::from_millis(200),
            retries: 3,
        }
    }
}

/// One SNMP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Exact-match fetch.
    Get(Vec<Oid>),
    /// Lexicographic successor fetch.
    GetNext(Vec<Oid>),
    /// Bulk successor fetch (v2c only).
    GetBulk {
        non_repeaters: u32,
        max_repetitions: u32,
        oids: Vec<Oid>,
    },
}

impl Request {
    /// The OIDs named in the request.
    pub fn oids(&self) -> &[Oid] {
        match self {
            Request::Get(oids) | Request::GetNext(oids) => oids,
            Request::GetBulk { oids, .. } => oids,
        }
    }

    /// Operation name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Get(_) => "GET",
            Request::GetNext(_) => "GETNEXT",
            Request::GetBulk { .. } => "GETBULK",
        }
    }
}

/// Agent response to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Raw error-status code; zero on success.
    pub error_status: i32,
    /// 1-based index of the failing varbind; zero if not applicable.
    pub error_index: i32,
    /// Returned varbinds, undecoded.
    pub varbinds: Vec<RawVarBind>,
}

impl Response {
    /// Successful response.
    pub fn ok(varbinds: Vec<RawVarBind>) -> Self {
        Self {
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// Error response echoing the request varbinds.
    pub fn error(status: ErrorStatus, index: i32, varbinds: Vec<RawVarBind>) -> Self {
        Self {
            error_status: status.as_i32(),
            error_index: index,
            varbinds,
        }
    }

    /// The error status as an enum.
    pub fn status(&self) -> ErrorStatus {
        ErrorStatus::from_i32(self.error_status)
    }
}

/// Performs SNMP exchanges on behalf of a query.
///
/// Implementations handle encoding, transport, timeouts and retries, and
/// report those failures as [`EngineError`]. A response carrying a non-zero
/// error status is not an engine failure; it is returned as-is for the caller
/// to interpret.
pub trait Engine {
    /// Send `request` to the agent described by `session` and wait for the
    /// matching response.
    fn execute(&mut self, session: &Session, request: &Request) -> Result<Response, EngineError>;
}

impl<E: Engine + ?Sized> Engine for &mut E {
    fn execute(&mut self, session: &Session, request: &Request) -> Result<Response, EngineError> {
        (**self).execute(session, request)
    }
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn execute(&mut self, session: &Session, request: &Request) -> Result<Response, EngineError> {
        (**self).execute(session, request)
    }
}
