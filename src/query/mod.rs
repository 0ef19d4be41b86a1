//! Query dispatch.
//!
//! A [`Query`] takes one `snmp://` URI from text to a [`Results`] collection:
//!
//! ```text
//! Unparsed -> Parsed -> Dispatched -> Decoded
//! ```
//!
//! Any fatal error ends the query in the stage that produced it (see
//! [`Error::stage`]). Per-OID decode problems are not fatal; they are recorded
//! on the returned collection.
//!
//! GET and GETNEXT lists are split into requests of
//! [`oids_per_request`](QueryParams::oids_per_request) OIDs. A v1 agent that
//! answers `noSuchName` gets the offending OID marked as `NoSuchObject` (GET)
//! or `EndOfMibView` (GETNEXT) and the rest of the batch re-requested, so the
//! result shape matches what a v2c agent reports inline. WALK follows each root
//! in order, with GETNEXT on v1 and GETBULK on v2c.

mod params;
mod walk;

pub use params::*;
pub use walk::{BulkWalk, Walk};

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::decoder::{DecodeSummary, decode_into};
use crate::engine::{Engine, Request, Session};
use crate::error::{EngineError, Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::results::Results;
use crate::uri::{Operation, SnmpUri};
use crate::value::Value;
use crate::varbind::RawVarBind;
use crate::version::Version;

/// Run the query described by `params` against `engine`.
///
/// Shorthand for `Query::new(params).run(engine)`.
///
/// # Example
///
/// ```rust,no_run
/// use snmp_query::{QueryParams, UdpEngine, Value, oid, query};
///
/// let mut engine = UdpEngine::new();
/// let results = query(
///     QueryParams::new("snmp://public@192.0.2.1//1.3.6.1.2.1.1.5.0"),
///     &mut engine,
/// )?;
/// if let Some(Value::OctetString(name)) = results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)) {
///     println!("sysName: {}", String::from_utf8_lossy(name));
/// }
/// # Ok::<(), snmp_query::Error>(())
/// ```
pub fn query<E: Engine + ?Sized>(params: QueryParams, engine: &mut E) -> Result<Results> {
    Query::new(params).run(engine)
}

/// Run the query described by `params` and merge its answers into `results`.
///
/// Shorthand for `Query::new(params).run_into(results, engine)`. Entries for
/// OIDs the query returns are replaced and everything else is kept. If the
/// query fails, `results` is left exactly as it was.
///
/// ```rust,no_run
/// use snmp_query::{QueryParams, Results, UdpEngine, query_into};
///
/// let mut engine = UdpEngine::new();
/// let mut results = Results::new();
/// for uri in [
///     "snmp://public@192.0.2.1//1.3.6.1.2.1.1.*",
///     "snmp://public@192.0.2.2//1.3.6.1.2.1.1.*",
/// ] {
///     if let Err(e) = query_into(QueryParams::new(uri), &mut results, &mut engine) {
///         eprintln!("{}: {}", uri, e);
///     }
/// }
/// println!("{} entries", results.len());
/// ```
pub fn query_into<E: Engine + ?Sized>(
    params: QueryParams,
    results: &mut Results,
    engine: &mut E,
) -> Result<DecodeSummary> {
    Query::new(params).run_into(results, engine)
}

/// Whether `position` is the last index of its partition when `len` items
/// are split into partitions of `size`.
///
/// Out-of-range positions and a zero `size` are never partition ends.
///
/// ```
/// use snmp_query::query::partition_ends;
///
/// let ends: Vec<_> = (0..8).filter(|&i| partition_ends(i, 3, 8)).collect();
/// assert_eq!(ends, [2, 5, 7]);
/// ```
pub fn partition_ends(position: usize, size: usize, len: usize) -> bool {
    if size == 0 || position >= len {
        return false;
    }
    position % size == size - 1 || position == len - 1
}

/// Address of the session's agent, when the host is an address literal.
pub(crate) fn session_target(session: &Session) -> Option<SocketAddr> {
    session
        .host
        .parse::<IpAddr>()
        .ok()
        .map(|ip| SocketAddr::new(ip, session.port))
}

/// Lifecycle of a [`Query`], reported at trace level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryState {
    /// Created, URI not yet parsed.
    Unparsed,
    /// URI parsed; operation and OIDs known.
    Parsed,
    /// Requests sent and responses received.
    Dispatched,
    /// Responses decoded into the result collection.
    Decoded,
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparsed => write!(f, "unparsed"),
            Self::Parsed => write!(f, "parsed"),
            Self::Dispatched => write!(f, "dispatched"),
            Self::Decoded => write!(f, "decoded"),
        }
    }
}

/// One URI query.
#[derive(Debug)]
pub struct Query {
    params: QueryParams,
    state: QueryState,
}

impl Query {
    /// Create an unparsed query.
    pub fn new(params: QueryParams) -> Self {
        Self {
            params,
            state: QueryState::Unparsed,
        }
    }

    /// Parse, dispatch and decode into a fresh collection.
    pub fn run<E: Engine + ?Sized>(self, engine: &mut E) -> Result<Results> {
        let mut results = Results::new();
        self.run_into(&mut results, engine)?;
        Ok(results)
    }

    /// Parse, dispatch and decode into `results`.
    ///
    /// Nothing is decoded until every request has been answered, so a failed
    /// query leaves `results` untouched.
    ///
    /// Parse errors ([`Error::InvalidUri`], [`Error::InvalidPath`],
    /// [`Error::TooManyOids`]) are returned before the engine is called.
    /// Engine failures come back as [`Error::Engine`]; agent error statuses
    /// other than a v1 `noSuchName` come back as [`Error::Protocol`]. A WALK
    /// treats agent errors as the end of the subtree.
    #[tracing::instrument(
        name = "query",
        level = "debug",
        skip_all,
        fields(
            snmp.uri = %self.params.uri(),
            snmp.operation = tracing::field::Empty,
            snmp.version = %self.params.get_version(),
        )
    )]
    pub fn run_into<E: Engine + ?Sized>(
        mut self,
        results: &mut Results,
        engine: &mut E,
    ) -> Result<DecodeSummary> {
        let uri = SnmpUri::parse(self.params.uri(), self.params.get_max_oids()).inspect_err(
            |e| tracing::debug!(target: "snmp_query::query", { error = %e }, "query failed to parse"),
        )?;
        tracing::Span::current().record("snmp.operation", tracing::field::display(uri.operation));
        self.advance(QueryState::Parsed);

        let session = Session {
            host: uri.host,
            port: uri.port,
            community: uri.community,
            version: self.params.get_version(),
            timeout: self.params.get_timeout(),
            retries: self.params.get_retries(),
        };

        let varbinds = match uri.operation {
            Operation::Get => self.fetch(engine, &session, Fetch::Get, &uri.oids)?,
            Operation::GetNext => self.fetch(engine, &session, Fetch::GetNext, &uri.oids)?,
            Operation::Walk => self.walk(engine, &session, &uri.oids)?,
        };
        self.advance(QueryState::Dispatched);

        let summary = decode_into(results, varbinds);
        self.advance(QueryState::Decoded);
        tracing::debug!(target: "snmp_query::query", { snmp.decoded = summary.decoded, snmp.warnings = summary.warnings, snmp.results = results.len() }, "query complete");

        Ok(summary)
    }

    fn advance(&mut self, next: QueryState) {
        tracing::trace!(target: "snmp_query::query", { from = %self.state, to = %next }, "query state");
        self.state = next;
    }

    /// GET or GETNEXT every OID, in batches.
    fn fetch<E: Engine + ?Sized>(
        &self,
        engine: &mut E,
        session: &Session,
        kind: Fetch,
        oids: &[Oid],
    ) -> Result<Vec<RawVarBind>> {
        let size = self.params.get_oids_per_request().max(1);
        let mut varbinds = Vec::with_capacity(oids.len());
        let mut batch = Vec::with_capacity(size.min(oids.len()));

        for (position, oid) in oids.iter().enumerate() {
            batch.push(oid.clone());
            if partition_ends(position, size, oids.len()) {
                fetch_batch(engine, session, kind, std::mem::take(&mut batch), &mut varbinds)?;
            }
        }

        Ok(varbinds)
    }

    /// Walk every root in order.
    fn walk<E: Engine + ?Sized>(
        &self,
        engine: &mut E,
        session: &Session,
        roots: &[Oid],
    ) -> Result<Vec<RawVarBind>> {
        let mut varbinds = Vec::new();

        for root in roots {
            let before = varbinds.len();
            match session.version {
                Version::V1 => {
                    for vb in Walk::new(&mut *engine, session, root.clone()) {
                        varbinds.push(vb?);
                    }
                }
                Version::V2c => {
                    let walk = BulkWalk::new(
                        &mut *engine,
                        session,
                        root.clone(),
                        self.params.get_max_repetitions(),
                    );
                    for vb in walk {
                        varbinds.push(vb?);
                    }
                }
            }
            tracing::debug!(target: "snmp_query::query", { snmp.oid = %root, snmp.count = varbinds.len() - before }, "walked subtree");
        }

        Ok(varbinds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fetch {
    Get,
    GetNext,
}

impl Fetch {
    fn request(self, oids: Vec<Oid>) -> Request {
        match self {
            Fetch::Get => Request::Get(oids),
            Fetch::GetNext => Request::GetNext(oids),
        }
    }

    /// Value standing in for an OID a v1 agent rejected with noSuchName.
    fn missing(self) -> Value {
        match self {
            Fetch::Get => Value::NoSuchObject,
            Fetch::GetNext => Value::EndOfMibView,
        }
    }
}

/// Send one batch, retrying without any OID a v1 agent reports as noSuchName.
///
/// Varbinds come out in request order whichever OIDs were rejected.
fn fetch_batch<E: Engine + ?Sized>(
    engine: &mut E,
    session: &Session,
    kind: Fetch,
    batch: Vec<Oid>,
    out: &mut Vec<RawVarBind>,
) -> Result<()> {
    let target = session_target(session);
    let mut slots: Vec<Option<RawVarBind>> = vec![None; batch.len()];
    // (request position, oid) still to be answered
    let mut pending: Vec<(usize, Oid)> = batch.into_iter().enumerate().collect();

    while !pending.is_empty() {
        let request = kind.request(pending.iter().map(|(_, oid)| oid.clone()).collect());
        let response = engine
            .execute(session, &request)
            .map_err(|e| Error::engine(target, e))?;

        let status = response.status();
        if status == ErrorStatus::NoError {
            if response.varbinds.len() != pending.len() {
                tracing::debug!(target: "snmp_query::query", { snmp.request = request.name(), expected = pending.len(), actual = response.varbinds.len() }, "varbind count mismatch");
                return Err(Error::engine(
                    target,
                    EngineError::VarbindCount {
                        expected: pending.len(),
                        actual: response.varbinds.len(),
                    },
                ));
            }
            for ((position, _), vb) in pending.iter().zip(response.varbinds) {
                slots[*position] = Some(vb);
            }
            out.extend(slots.into_iter().flatten());
            return Ok(());
        }

        let index = response.error_index;
        let rejected = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .filter(|&i| i < pending.len());

        match rejected {
            Some(i) if status == ErrorStatus::NoSuchName && session.version == Version::V1 => {
                let (position, oid) = pending.remove(i);
                tracing::debug!(target: "snmp_query::query", { snmp.oid = %oid, snmp.request = request.name() }, "noSuchName, re-requesting remaining OIDs");
                slots[position] = Some(RawVarBind::from_value(oid, &kind.missing()));
            }
            _ => {
                tracing::debug!(target: "snmp_query::query", { snmp.error_status = %status, snmp.error_index = index }, "agent returned error status");
                return Err(Error::Protocol {
                    target,
                    status,
                    index: u32::try_from(index).unwrap_or(0),
                    oid: rejected.map(|i| pending[i].1.clone()),
                });
            }
        }
    }

    out.extend(slots.into_iter().flatten());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockEngine, MockReply};
    use crate::error::{DecodeWarning, Stage};
    use crate::oid;
    use crate::varbind::Payload;
    use std::time::Duration;

    const HOST: &str = "snmp://public@192.0.2.1";

    fn agent() -> MockEngine {
        let mut engine = MockEngine::new();
        engine.insert(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Linux gw1"));
        engine.insert(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::Timeticks(4381200));
        engine.insert(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("gw1"));
        engine.insert(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer32(2));
        engine.insert(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 1), Value::Counter32(1000));
        engine.insert(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 2), Value::Counter32(2000));
        engine
    }

    fn run(uri: &str, version: Version, engine: &mut MockEngine) -> Result<Results> {
        query(QueryParams::new(format!("{HOST}{uri}")).version(version), engine)
    }

    // ========================================================================
    // Partitioning
    // ========================================================================

    #[test]
    fn test_partition_ends() {
        let ends: Vec<_> = (0..8).filter(|&i| partition_ends(i, 3, 8)).collect();
        assert_eq!(ends, [2, 5, 7]);

        assert!(partition_ends(0, 1, 1));
        assert!(partition_ends(4, 10, 5));
        assert!(!partition_ends(8, 3, 8));
        assert!(!partition_ends(0, 0, 8));
    }

    #[test]
    fn test_get_split_into_batches() {
        let mut engine = agent();
        let params = QueryParams::new(format!(
            "{HOST}//(1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.1.3.0,1.3.6.1.2.1.1.5.0)"
        ))
        .oids_per_request(2);
        let results = query(params, &mut engine).unwrap();

        assert_eq!(results.len(), 3);
        let sizes: Vec<_> = engine.requests().iter().map(|r| r.oids().len()).collect();
        assert_eq!(sizes, [2, 1]);
    }

    // ========================================================================
    // GET / GETNEXT
    // ========================================================================

    #[test]
    fn test_get_single() {
        let mut engine = agent();
        let results = run("//1.3.6.1.2.1.1.5.0", Version::V2c, &mut engine).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)),
            Some(&Value::from("gw1"))
        );
        assert!(matches!(engine.requests(), [Request::Get(_)]));
    }

    #[test]
    fn test_get_list_ordered() {
        let mut engine = agent();
        let results = run(
            "//(1.3.6.1.2.1.1.5.0,1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.1.3.0)",
            Version::V2c,
            &mut engine,
        )
        .unwrap();
        let oids: Vec<_> = results.iter().map(|(oid, _)| oid.to_string()).collect();
        assert_eq!(
            oids,
            [".1.3.6.1.2.1.1.1.0", ".1.3.6.1.2.1.1.3.0", ".1.3.6.1.2.1.1.5.0"]
        );
    }

    #[test]
    fn test_getnext_list() {
        let mut engine = agent();
        let results = run("//(1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.1.3.0)+", Version::V2c, &mut engine)
            .unwrap();
        let oids: Vec<_> = results.iter().map(|(oid, _)| oid.clone()).collect();
        assert_eq!(
            oids,
            [oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)]
        );
        assert!(matches!(engine.requests(), [Request::GetNext(_)]));
    }

    #[test]
    fn test_get_missing_same_shape_v1_and_v2c() {
        let uri = "//(1.3.6.1.2.1.1.5.0,1.3.6.1.99.0,1.3.6.1.2.1.1.1.0)";

        let mut engine = agent();
        let v2c = run(uri, Version::V2c, &mut engine).unwrap();

        let mut engine = agent();
        let v1 = run(uri, Version::V1, &mut engine).unwrap();
        // noSuchName, then the remaining two re-requested
        assert_eq!(engine.requests().len(), 2);
        assert_eq!(engine.requests()[1].oids().len(), 2);

        assert_eq!(v1, v2c);
        assert_eq!(v1.get(&oid!(1, 3, 6, 1, 99, 0)), Some(&Value::NoSuchObject));
    }

    #[test]
    fn test_getnext_past_end_same_shape_v1_and_v2c() {
        let uri = "//(1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.2.2.1.10.2)+";

        let mut engine = agent();
        let v2c = run(uri, Version::V2c, &mut engine).unwrap();

        let mut engine = agent();
        let v1 = run(uri, Version::V1, &mut engine).unwrap();

        assert_eq!(v1, v2c);
        assert_eq!(
            v1.get(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 2)),
            Some(&Value::EndOfMibView)
        );
    }

    #[test]
    fn test_v1_every_oid_missing() {
        let mut engine = agent();
        let results = run("//(1.3.6.1.98.0,1.3.6.1.99.0)", Version::V1, &mut engine).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, v)| *v == Value::NoSuchObject));
        assert_eq!(engine.requests().len(), 2);
    }

    // ========================================================================
    // WALK
    // ========================================================================

    #[test]
    fn test_walk_v1_and_v2c_identical() {
        let uri = "//1.3.6.1.2.1.2.*";

        let mut engine = agent();
        let v1 = run(uri, Version::V1, &mut engine).unwrap();
        assert!(engine.requests().iter().all(|r| matches!(r, Request::GetNext(_))));

        let mut engine = agent();
        let v2c = run(uri, Version::V2c, &mut engine).unwrap();
        assert!(engine.requests().iter().all(|r| matches!(r, Request::GetBulk { .. })));

        assert_eq!(v1.len(), 3);
        assert_eq!(v1, v2c);
    }

    #[test]
    fn test_walk_multiple_roots_in_order() {
        let mut engine = agent();
        let results = run(
            "//(1.3.6.1.2.1.2.2.1.10,1.3.6.1.2.1.1).*",
            Version::V2c,
            &mut engine,
        )
        .unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(
            engine.requests()[0].oids(),
            &[oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10)]
        );
    }

    #[test]
    fn test_walk_uses_max_repetitions() {
        let mut engine = agent();
        let params = QueryParams::new(format!("{HOST}//1.3.6.1.2.1.1.*")).max_repetitions(1);
        let results = query(params, &mut engine).unwrap();
        assert_eq!(results.len(), 3);
        assert!(engine.requests().iter().all(|r| matches!(
            r,
            Request::GetBulk {
                non_repeaters: 0,
                max_repetitions: 1,
                ..
            }
        )));
    }

    #[test]
    fn test_walk_tolerates_agent_error() {
        let mut engine = agent();
        engine.push_reply(MockReply::Status {
            status: ErrorStatus::GenErr,
            index: 1,
        });
        let results = run("//1.3.6.1.2.1.1.*", Version::V2c, &mut engine).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_walk_empty_subtree() {
        let mut engine = agent();
        let results = run("//1.3.6.1.4.*", Version::V1, &mut engine).unwrap();
        assert!(results.is_empty());
    }

    // ========================================================================
    // Errors
    // ========================================================================

    #[test]
    fn test_too_many_oids_never_dispatched() {
        let mut engine = agent();
        let list: Vec<_> = (0..51).map(|i| format!("1.3.6.1.{i}")).collect();
        let err = run(&format!("//({})", list.join(",")), Version::V2c, &mut engine).unwrap_err();

        assert!(matches!(err, Error::TooManyOids { count: 51, max: 50 }));
        assert_eq!(err.stage(), Stage::Parse);
        assert!(engine.requests().is_empty());
    }

    #[test]
    fn test_max_oids_configurable() {
        let mut engine = agent();
        let params = QueryParams::new(format!("{HOST}//(1.3.6.1.1,1.3.6.1.2,1.3.6.1.3)")).max_oids(2);
        let err = query(params, &mut engine).unwrap_err();
        assert!(matches!(err, Error::TooManyOids { count: 3, max: 2 }));
    }

    #[test]
    fn test_invalid_uri_never_dispatched() {
        let mut engine = agent();
        let err = query(QueryParams::new("http://192.0.2.1//1.3.6"), &mut engine).unwrap_err();
        assert!(matches!(err, Error::InvalidUri { .. }));

        let err = run("//(1.3.6.1,1.x.3)", Version::V2c, &mut engine).unwrap_err();
        match err {
            Error::InvalidPath { path, .. } => assert_eq!(&*path, "1.x.3"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(engine.requests().is_empty());
    }

    #[test]
    fn test_engine_error_distinct_from_protocol_error() {
        let mut engine = agent();
        engine.fail_next(EngineError::Timeout {
            elapsed: Duration::from_millis(800),
            retries: 3,
        });
        let err = run("//1.3.6.1.2.1.1.5.0", Version::V2c, &mut engine).unwrap_err();
        assert!(matches!(err, Error::Engine { .. }));
        assert_eq!(err.stage(), Stage::Dispatch);
        assert_eq!(err.target(), Some("192.0.2.1:161".parse().unwrap()));

        engine.push_reply(MockReply::Status {
            status: ErrorStatus::TooBig,
            index: 0,
        });
        let err = run("//1.3.6.1.2.1.1.5.0", Version::V2c, &mut engine).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol {
                status: ErrorStatus::TooBig,
                index: 0,
                oid: None,
                ..
            }
        ));
    }

    #[test]
    fn test_protocol_error_names_oid() {
        let mut engine = agent();
        engine.push_reply(MockReply::Status {
            status: ErrorStatus::GenErr,
            index: 2,
        });
        let err = run("//(1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.1.5.0)", Version::V2c, &mut engine)
            .unwrap_err();
        match err {
            Error::Protocol { status, index, oid, .. } => {
                assert_eq!(status, ErrorStatus::GenErr);
                assert_eq!(index, 2);
                assert_eq!(oid, Some(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_such_name_fatal_on_v2c() {
        let mut engine = agent();
        engine.push_reply(MockReply::Status {
            status: ErrorStatus::NoSuchName,
            index: 1,
        });
        let err = run("//1.3.6.1.2.1.1.5.0", Version::V2c, &mut engine).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    #[test]
    fn test_unknown_tag_is_warning_not_error() {
        let mut engine = agent();
        engine.insert_raw(oid!(1, 3, 6, 1, 2, 1, 1, 4, 0), 0x47, Payload::UInt32(9));
        let results = run("//1.3.6.1.2.1.1.*", Version::V2c, &mut engine).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(
            results.warning(&oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)),
            Some(&DecodeWarning::UnknownTag { tag: 0x47 })
        );
    }

    #[test]
    fn test_accumulate_merges_and_replaces() {
        let mut seed = Results::new();
        seed.insert(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("old"));
        seed.insert(oid!(1, 3, 6, 1, 4, 1, 1), Value::Integer32(7));

        let mut engine = agent();
        let mut results = seed;
        let params = QueryParams::new(format!("{HOST}//1.3.6.1.2.1.1.5.0"));
        let summary = query_into(params, &mut results, &mut engine).unwrap();

        assert_eq!(summary.decoded, 1);
        assert_eq!(results.len(), 2);
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)),
            Some(&Value::from("gw1"))
        );
        assert_eq!(results.get(&oid!(1, 3, 6, 1, 4, 1, 1)), Some(&Value::Integer32(7)));
    }

    #[test]
    fn test_failed_query_keeps_accumulated_results() {
        let mut engine = agent();
        let mut results = Results::new();
        query_into(
            QueryParams::new(format!("{HOST}//1.3.6.1.2.1.1.*")),
            &mut results,
            &mut engine,
        )
        .unwrap();
        let before = results.clone();
        assert_eq!(before.len(), 3);

        engine.fail_next(EngineError::Timeout {
            elapsed: Duration::from_millis(200),
            retries: 3,
        });
        let params = QueryParams::new(format!("{HOST}//(1.3.6.1.2.1.1.5.0,1.3.6.1.2.1.2.1.0)"));
        assert!(query_into(params, &mut results, &mut engine).is_err());
        assert_eq!(results, before);

        let err = query_into(QueryParams::new(format!("{HOST}//1.3.x")), &mut results, &mut engine)
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Parse);
        assert_eq!(results, before);
    }

    #[test]
    fn test_failed_later_batch_decodes_nothing() {
        let mut engine = agent();
        // first batch answered in full, second rejected
        engine.push_reply(MockReply::Truncate { keep: 2 });
        engine.push_reply(MockReply::Status {
            status: ErrorStatus::GenErr,
            index: 1,
        });
        let mut results = Results::new();
        let params = QueryParams::new(format!(
            "{HOST}//(1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.1.3.0,1.3.6.1.2.1.1.5.0)"
        ))
        .oids_per_request(2);

        let err = query_into(params, &mut results, &mut engine).unwrap_err();
        assert!(matches!(err, Error::Protocol { status: ErrorStatus::GenErr, .. }));
        assert!(results.is_empty());
    }

    // ========================================================================
    // Response shape
    // ========================================================================

    #[test]
    fn test_short_response_is_engine_error() {
        for (path, kind) in [
            ("//(1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.1.5.0)", "GET"),
            ("//(1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.1.3.0)+", "GETNEXT"),
        ] {
            let mut engine = agent();
            engine.push_reply(MockReply::Truncate { keep: 1 });

            let err = run(path, Version::V2c, &mut engine).unwrap_err();
            match &err {
                Error::Engine {
                    target,
                    source: EngineError::VarbindCount { expected, actual },
                } => {
                    assert_eq!((*expected, *actual), (2, 1), "{}", kind);
                    assert_eq!(*target, Some("192.0.2.1:161".parse().unwrap()));
                }
                other => panic!("{}: expected varbind count error, got {}", kind, other),
            }
            assert_eq!(err.stage(), Stage::Dispatch);
        }
    }

    #[test]
    fn test_short_response_after_no_such_name_is_engine_error() {
        let mut engine = agent();
        // first reply is the v1 noSuchName for the missing OID, the retry comes back empty
        let params = format!("{HOST}//(1.3.6.1.2.1.1.5.0,1.3.6.1.99.0)");
        engine.push_reply(MockReply::Status {
            status: ErrorStatus::NoSuchName,
            index: 2,
        });
        engine.push_reply(MockReply::Truncate { keep: 0 });

        let err = query(QueryParams::new(params).version(Version::V1), &mut engine).unwrap_err();
        assert!(matches!(
            err,
            Error::Engine {
                source: EngineError::VarbindCount {
                    expected: 1,
                    actual: 0
                },
                ..
            }
        ));
        assert_eq!(engine.requests().len(), 2);
    }

    #[test]
    fn test_exception_tags_decoded() {
        let mut engine = agent();
        let results = run("//(1.3.6.1.2.1.1.5.1,1.3.6.1.99.0)", Version::V2c, &mut engine).unwrap();
        assert_eq!(
            results.get(&oid!(1, 3, 6, 1, 2, 1, 1, 5, 1)),
            Some(&Value::NoSuchInstance)
        );
        assert_eq!(results.get(&oid!(1, 3, 6, 1, 99, 0)), Some(&Value::NoSuchObject));
    }
}
