//! Error types for snmp-query.
//!
//! All errors are `#[non_exhaustive]` to allow adding new variants without breaking changes.
//!
//! Fatal errors are split by the stage that produced them (see [`Stage`]). Per-OID
//! decode problems are not errors at all: they are recorded as [`DecodeWarning`]s
//! on the result collection and the query carries on.

pub(crate) mod internal;

use std::net::SocketAddr;
use std::time::Duration;

use crate::oid::Oid;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// URI syntax error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriErrorKind {
    /// Scheme is missing or is not `snmp`.
    BadScheme,
    /// No host between `//` and the path.
    MissingHost,
    /// Port is not a number in 0..=65535.
    BadPort,
    /// Bracketed IPv6 host without closing `]`.
    UnclosedBracket,
    /// Invalid percent-encoding in the community.
    BadPercentEncoding,
    /// No `/<context>/<path>` after the authority.
    MissingPath,
    /// Parenthesised OID list is not closed (or closed twice).
    UnbalancedParens,
    /// Empty entry in an OID list.
    EmptyOid,
    /// Several OIDs without the enclosing parentheses.
    UnparenthesizedList,
    /// Trailing characters after the OID list.
    TrailingGarbage,
    /// OID segment is not a non-negative integer.
    BadOid,
}

impl std::fmt::Display for UriErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadScheme => write!(f, "scheme must be snmp://"),
            Self::MissingHost => write!(f, "missing host"),
            Self::BadPort => write!(f, "invalid port"),
            Self::UnclosedBracket => write!(f, "unclosed '[' in host"),
            Self::BadPercentEncoding => write!(f, "invalid percent-encoding"),
            Self::MissingPath => write!(f, "missing /<context>/<oids> path"),
            Self::UnbalancedParens => write!(f, "unbalanced parentheses"),
            Self::EmptyOid => write!(f, "empty OID in list"),
            Self::UnparenthesizedList => write!(f, "OID list must be enclosed in parentheses"),
            Self::TrailingGarbage => write!(f, "unexpected characters after OID list"),
            Self::BadOid => write!(f, "OID segment is not a non-negative integer"),
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Segment is empty (e.g. `1..3`).
    EmptyArc,
    /// Segment is not a non-negative integer that fits in 32 bits.
    InvalidArc,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyArc => write!(f, "empty arc"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// snmpwalk snapshot error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotErrorKind {
    /// Record does not start with `<oid> = `.
    MissingSeparator,
    /// Type name is not one the reader understands.
    UnknownType,
    /// Value text does not parse as its type.
    BadValue,
}

impl std::fmt::Display for SnapshotErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "expected '<oid> = <type>: <value>'"),
            Self::UnknownType => write!(f, "unknown value type"),
            Self::BadValue => write!(f, "value does not match its type"),
        }
    }
}

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Unknown/future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Failure reported by an [`Engine`](crate::engine::Engine).
///
/// Retries are the engine's own business: by the time one of these is
/// returned, the configured retry budget has been spent.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Socket-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No matching response within the timeout, after all retries.
    #[error("timeout after {elapsed:?} (retries={retries})")]
    Timeout { elapsed: Duration, retries: u32 },

    /// Response could not be decoded.
    #[error("malformed response at offset {offset}")]
    Malformed { offset: usize },

    /// Response did not carry one varbind per requested OID.
    #[error("response carried {actual} varbinds for {expected} requested")]
    VarbindCount { expected: usize, actual: usize },

    /// Response carried a request ID that was never sent.
    #[error("request ID mismatch: expected {expected}, got {actual}")]
    RequestIdMismatch { expected: i32, actual: i32 },

    /// Request type is not available for this session (e.g. GETBULK on v1).
    #[error("{operation} not supported by {version}")]
    UnsupportedOperation {
        operation: &'static str,
        version: crate::version::Version,
    },

    /// Host name did not resolve to any address.
    #[error("could not resolve {host}")]
    Resolve { host: Box<str> },
}

/// Stage of a query that produced a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// URI or OID syntax, OID-count policy. Nothing was sent.
    Parse,
    /// Engine failure or agent error status.
    Dispatch,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::Dispatch => write!(f, "dispatch"),
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Malformed `snmp://` URI.
    #[error("invalid URI {uri:?}: {kind}")]
    InvalidUri { uri: Box<str>, kind: UriErrorKind },

    /// Malformed OID path; `path` is the offending substring.
    #[error("invalid path {path:?}: {kind}")]
    InvalidPath { path: Box<str>, kind: UriErrorKind },

    /// Invalid OID format.
    #[error("invalid OID{}: {kind}", input.as_ref().map(|i| format!(" {:?}", i)).unwrap_or_default())]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>,
    },

    /// Unreadable record in snmpwalk output; `text` is the offending part.
    #[error("snmpwalk line {line}: {kind}: {text:?}")]
    InvalidSnapshot {
        line: usize,
        text: Box<str>,
        kind: SnapshotErrorKind,
    },

    /// More OIDs in one request than the configured cap.
    #[error("too many OIDs: {count} exceeds maximum {max}")]
    TooManyOids { count: usize, max: usize },

    /// Transport, timeout or BER failure inside the engine.
    #[error("engine error{}: {source}", target.as_ref().map(|t| format!(" talking to {}", t)).unwrap_or_default())]
    Engine {
        target: Option<SocketAddr>,
        #[source]
        source: EngineError,
    },

    /// Non-zero error status returned by the agent.
    #[error("SNMP error{}: {status} at index {index}", target.map(|t| format!(" from {}", t)).unwrap_or_default())]
    Protocol {
        target: Option<SocketAddr>,
        status: ErrorStatus,
        index: u32,
        oid: Option<Oid>,
    },

    /// Non-increasing OID detected during walk (agent misbehavior).
    ///
    /// Returned when a walk operation receives an OID that is not
    /// lexicographically greater than the previous OID, which would
    /// cause an infinite loop.
    #[error("walk detected non-increasing OID: {previous} >= {current}")]
    NonIncreasingOid { previous: Oid, current: Oid },
}

impl Error {
    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Create an invalid URI error.
    pub fn invalid_uri(uri: impl Into<Box<str>>, kind: UriErrorKind) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            kind,
        }
    }

    /// Create an invalid path error carrying the offending substring.
    pub fn invalid_path(path: impl Into<Box<str>>, kind: UriErrorKind) -> Self {
        Self::InvalidPath {
            path: path.into(),
            kind,
        }
    }

    /// Wrap an engine failure.
    pub fn engine(target: Option<SocketAddr>, source: EngineError) -> Self {
        Self::Engine { target, source }
    }

    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidUri { .. }
            | Self::InvalidPath { .. }
            | Self::InvalidOid { .. }
            | Self::InvalidSnapshot { .. }
            | Self::TooManyOids { .. } => Stage::Parse,
            Self::Engine { .. } | Self::Protocol { .. } | Self::NonIncreasingOid { .. } => {
                Stage::Dispatch
            }
        }
    }

    /// Get the target address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Engine { target, .. } => *target,
            Self::Protocol { target, .. } => *target,
            _ => None,
        }
    }
}

/// Non-fatal problem decoding one varbind.
///
/// Attached to the OID in [`Results`](crate::results::Results); the rest of
/// the batch still decodes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeWarning {
    /// Wire tag is not one of the thirteen SNMP value types.
    #[error("unrecognized wire type 0x{tag:02X}")]
    UnknownTag { tag: u8 },

    /// Tag is known but the payload has the wrong shape for it.
    #[error("payload {payload} does not match wire type 0x{tag:02X}")]
    PayloadMismatch { tag: u8, payload: &'static str },

    /// IpAddress payload is not four octets.
    #[error("IP address must be 4 bytes, got {length}")]
    BadIpAddressLength { length: usize },
}
