//! # snmp-query
//!
//! SNMP v1/v2c client core driven by RFC 4088 `snmp://` URIs.
//!
//! A URI names the agent, the community and a list of OIDs; its path suffix
//! picks the operation (GET, GETNEXT with `+`, or WALK with `.*`). A query
//! parses the URI, dispatches the matching requests through an [`Engine`] and
//! decodes the answers into [`Results`], an OID-ordered collection of typed
//! [`Value`]s.
//!
//! ## Example
//!
//! ```rust,no_run
//! use snmp_query::{QueryParams, UdpEngine, query};
//!
//! fn main() -> snmp_query::Result<()> {
//!     let mut engine = UdpEngine::new();
//!     let results = query(
//!         QueryParams::new("snmp://public@192.168.1.1//1.3.6.1.2.1.1.*"),
//!         &mut engine,
//!     )?;
//!
//!     for (oid, value) in &results {
//!         println!("{}: {}", oid, value);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Fatal errors are [`Error`]s and say which stage failed ([`Error::stage`]).
//! Engine failures (timeouts, malformed packets) and agent error statuses are
//! separate variants. A varbind whose wire type cannot be decoded is not an
//! error: it is recorded as a [`DecodeWarning`] against its OID.
//!
//! ## Logging
//!
//! The library logs through [`tracing`] and never installs a subscriber.
//! Targets are `snmp_query::uri`, `snmp_query::query`, `snmp_query::decode`,
//! `snmp_query::engine` and `snmp_query::ber`. Each query runs inside a
//! `query` span carrying the URI, operation and version.

pub mod ber;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod format;
pub mod oid;
pub mod prelude;
pub mod query;
pub mod results;
pub mod snmpwalk;
pub mod uri;
pub mod value;
pub mod varbind;
pub mod version;

#[cfg(feature = "cli")]
pub mod cli;

pub(crate) mod message;
pub(crate) mod util;

pub use decoder::DecodeSummary;
pub use engine::{Engine, UdpEngine};
pub use error::{DecodeWarning, EngineError, Error, ErrorStatus, Result, Stage};
pub use oid::Oid;
pub use query::{Query, QueryParams, partition_ends, query, query_into};
pub use results::Results;
pub use uri::{Operation, SnmpUri};
pub use value::Value;
pub use varbind::{Payload, QueryResult, RawVarBind};
pub use version::Version;

#[cfg(any(test, feature = "testing"))]
pub use engine::MockEngine;
