//! Mock engine for testing.
//!
//! An in-memory agent backed by an [`OidTable`]. It answers GET, GETNEXT and
//! GETBULK the way a real agent would for the session's version, records
//! every request, and can be scripted to fail.

use std::collections::VecDeque;

use super::oid_table::OidTable;
use super::{Engine, Request, Response, Session};
use crate::ber::tag;
use crate::error::{EngineError, ErrorStatus};
use crate::oid::Oid;
use crate::results::Results;
use crate::value::Value;
use crate::varbind::{Payload, RawVarBind};
use crate::version::Version;

/// A scripted outcome for the next engine call.
#[derive(Debug)]
pub enum MockReply {
    /// Fail the call with this engine error.
    Fail(EngineError),
    /// Answer with this error status and 1-based index.
    Status { status: ErrorStatus, index: i32 },
    /// Answer from the table but keep only the first `keep` varbinds.
    Truncate { keep: usize },
}

/// Scripted SNMP agent.
///
/// # Example
///
/// ```rust
/// use snmp_query::engine::{Engine, MockEngine, Request, Session};
/// use snmp_query::{Value, oid};
///
/// let mut engine = MockEngine::new();
/// engine.insert(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("gw1"));
///
/// let session = Session::new("192.0.2.1");
/// let response = engine
///     .execute(&session, &Request::GetNext(vec![oid!(1, 3, 6, 1, 2, 1, 1)]))
///     .unwrap();
/// assert_eq!(response.varbinds[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 5, 0));
/// assert_eq!(engine.requests().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockEngine {
    table: OidTable<(u8, Payload)>,
    script: VecDeque<MockReply>,
    requests: Vec<Request>,
}

impl MockEngine {
    /// Create an agent with an empty MIB.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an agent serving every entry of `results`.
    pub fn from_results(results: &Results) -> Self {
        let mut engine = Self::new();
        for (oid, value) in results {
            engine.insert(oid.clone(), value.clone());
        }
        engine
    }

    /// Serve `value` at `oid`.
    pub fn insert(&mut self, oid: Oid, value: Value) {
        let (wire_tag, payload) = value.to_wire();
        self.table.insert(oid, (wire_tag, payload));
    }

    /// Serve an arbitrary tag and payload at `oid`, including tags that are
    /// not SNMP value types.
    pub fn insert_raw(&mut self, oid: Oid, wire_tag: u8, payload: Payload) {
        self.table.insert(oid, (wire_tag, payload));
    }

    /// Stop serving `oid`.
    pub fn remove(&mut self, oid: &Oid) {
        self.table.remove(oid);
    }

    /// Queue a scripted reply. Scripted replies are consumed in order, one
    /// per call, before the table is consulted.
    pub fn push_reply(&mut self, reply: MockReply) {
        self.script.push_back(reply);
    }

    /// Queue an engine failure for the next call.
    pub fn fail_next(&mut self, error: EngineError) {
        self.push_reply(MockReply::Fail(error));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Forget recorded requests.
    pub fn clear_requests(&mut self) {
        self.requests.clear();
    }

    fn raw(&self, oid: &Oid, entry: &(u8, Payload)) -> RawVarBind {
        RawVarBind::new(oid.clone(), entry.0, entry.1.clone())
    }

    fn get(&self, version: Version, oids: &[Oid]) -> Response {
        let mut varbinds = Vec::with_capacity(oids.len());
        for (i, oid) in oids.iter().enumerate() {
            match self.table.get(oid) {
                Some(entry) => varbinds.push(self.raw(oid, entry)),
                None if version == Version::V1 => return no_such_name(oids, i),
                None => {
                    let exception = if self.has_object(oid) {
                        tag::context::NO_SUCH_INSTANCE
                    } else {
                        tag::context::NO_SUCH_OBJECT
                    };
                    varbinds.push(RawVarBind::new(oid.clone(), exception, Payload::Empty));
                }
            }
        }
        Response::ok(varbinds)
    }

    fn get_next(&self, version: Version, oids: &[Oid]) -> Response {
        let mut varbinds = Vec::with_capacity(oids.len());
        for (i, oid) in oids.iter().enumerate() {
            match self.table.get_next(oid) {
                Some((next, entry)) => varbinds.push(self.raw(next, entry)),
                None if version == Version::V1 => return no_such_name(oids, i),
                None => varbinds.push(end_of_mib_view(oid)),
            }
        }
        Response::ok(varbinds)
    }

    fn get_bulk(&self, non_repeaters: u32, max_repetitions: u32, oids: &[Oid]) -> Response {
        let split = (non_repeaters as usize).min(oids.len());
        let (fixed, repeating) = oids.split_at(split);

        let mut varbinds: Vec<RawVarBind> = fixed
            .iter()
            .map(|oid| match self.table.get_next(oid) {
                Some((next, entry)) => self.raw(next, entry),
                None => end_of_mib_view(oid),
            })
            .collect();

        let mut cursors: Vec<Oid> = repeating.to_vec();
        for _ in 0..max_repetitions {
            if cursors.is_empty() {
                break;
            }
            let mut exhausted = true;
            for cursor in cursors.iter_mut() {
                match self.table.get_next(cursor) {
                    Some((next, entry)) => {
                        varbinds.push(self.raw(next, entry));
                        *cursor = next.clone();
                        exhausted = false;
                    }
                    None => varbinds.push(end_of_mib_view(cursor)),
                }
            }
            if exhausted {
                break;
            }
        }

        Response::ok(varbinds)
    }

    /// Whether any served OID lies under the parent of `oid`.
    fn has_object(&self, oid: &Oid) -> bool {
        let arcs = oid.arcs();
        if arcs.len() < 2 {
            return false;
        }
        let parent = Oid::from_slice(&arcs[..arcs.len() - 1]);
        self.table
            .get_next(&parent)
            .is_some_and(|(next, _)| next.starts_with(&parent))
    }
}

fn end_of_mib_view(oid: &Oid) -> RawVarBind {
    RawVarBind::new(oid.clone(), tag::context::END_OF_MIB_VIEW, Payload::Empty)
}

/// v1 error reply: status noSuchName, request varbinds echoed.
fn no_such_name(oids: &[Oid], position: usize) -> Response {
    Response::error(
        ErrorStatus::NoSuchName,
        position as i32 + 1,
        echo(oids),
    )
}

fn echo(oids: &[Oid]) -> Vec<RawVarBind> {
    oids.iter()
        .map(|oid| RawVarBind::new(oid.clone(), tag::universal::NULL, Payload::Empty))
        .collect()
}

impl Engine for MockEngine {
    fn execute(&mut self, session: &Session, request: &Request) -> Result<Response, EngineError> {
        self.requests.push(request.clone());

        let keep = match self.script.pop_front() {
            Some(MockReply::Fail(error)) => return Err(error),
            Some(MockReply::Status { status, index }) => {
                return Ok(Response::error(status, index, echo(request.oids())));
            }
            Some(MockReply::Truncate { keep }) => Some(keep),
            None => None,
        };

        let mut response = match request {
            Request::Get(oids) => self.get(session.version, oids),
            Request::GetNext(oids) => self.get_next(session.version, oids),
            Request::GetBulk { .. } if session.version == Version::V1 => {
                return Err(EngineError::UnsupportedOperation {
                    operation: request.name(),
                    version: session.version,
                });
            }
            Request::GetBulk {
                non_repeaters,
                max_repetitions,
                oids,
            } => self.get_bulk(*non_repeaters, *max_repetitions, oids),
        };
        if let Some(keep) = keep {
            response.varbinds.truncate(keep);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn agent() -> MockEngine {
        let mut engine = MockEngine::new();
        engine.insert(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Linux gw1"));
        engine.insert(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::Timeticks(4381200));
        engine.insert(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("gw1"));
        engine
    }

    fn v1() -> Session {
        Session {
            version: Version::V1,
            ..Session::new("mock")
        }
    }

    fn v2c() -> Session {
        Session::new("mock")
    }

    #[test]
    fn test_get_present() {
        let mut engine = agent();
        let resp = engine
            .execute(&v2c(), &Request::Get(vec![oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)]))
            .unwrap();
        assert_eq!(resp.status(), ErrorStatus::NoError);
        assert_eq!(
            resp.varbinds,
            vec![RawVarBind::from_value(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), &Value::from("gw1"))]
        );
    }

    #[test]
    fn test_get_missing_v2c_exceptions() {
        let mut engine = agent();
        let resp = engine
            .execute(
                &v2c(),
                &Request::Get(vec![oid!(1, 3, 6, 1, 2, 1, 1, 5, 1), oid!(1, 3, 6, 1, 99, 0)]),
            )
            .unwrap();
        assert_eq!(resp.varbinds[0].tag, tag::context::NO_SUCH_INSTANCE);
        assert_eq!(resp.varbinds[1].tag, tag::context::NO_SUCH_OBJECT);
    }

    #[test]
    fn test_get_missing_v1_no_such_name() {
        let mut engine = agent();
        let resp = engine
            .execute(
                &v1(),
                &Request::Get(vec![oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), oid!(1, 3, 6, 1, 99, 0)]),
            )
            .unwrap();
        assert_eq!(resp.status(), ErrorStatus::NoSuchName);
        assert_eq!(resp.error_index, 2);
        assert_eq!(resp.varbinds.len(), 2);
    }

    #[test]
    fn test_get_next_end_of_mib() {
        let mut engine = agent();
        let last = oid!(1, 3, 6, 1, 2, 1, 1, 5, 0);

        let resp = engine
            .execute(&v2c(), &Request::GetNext(vec![last.clone()]))
            .unwrap();
        assert!(resp.varbinds[0].is_end_of_mib_view());

        let resp = engine.execute(&v1(), &Request::GetNext(vec![last])).unwrap();
        assert_eq!(resp.status(), ErrorStatus::NoSuchName);
        assert_eq!(resp.error_index, 1);
    }

    // ========================================================================
    // GETBULK
    // ========================================================================

    #[test]
    fn test_get_bulk_repeats_until_end() {
        let mut engine = agent();
        let resp = engine
            .execute(
                &v2c(),
                &Request::GetBulk {
                    non_repeaters: 0,
                    max_repetitions: 10,
                    oids: vec![oid!(1, 3, 6, 1, 2, 1, 1)],
                },
            )
            .unwrap();
        let oids: Vec<_> = resp.varbinds.iter().map(|vb| vb.oid.to_string()).collect();
        assert_eq!(
            oids,
            [
                ".1.3.6.1.2.1.1.1.0",
                ".1.3.6.1.2.1.1.3.0",
                ".1.3.6.1.2.1.1.5.0",
                ".1.3.6.1.2.1.1.5.0",
            ]
        );
        assert!(resp.varbinds[3].is_end_of_mib_view());
    }

    #[test]
    fn test_get_bulk_respects_max_repetitions() {
        let mut engine = agent();
        let resp = engine
            .execute(
                &v2c(),
                &Request::GetBulk {
                    non_repeaters: 1,
                    max_repetitions: 2,
                    oids: vec![oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), oid!(1, 3, 6, 1, 2, 1, 1)],
                },
            )
            .unwrap();
        assert_eq!(resp.varbinds.len(), 3);
        assert_eq!(resp.varbinds[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 3, 0));
    }

    #[test]
    fn test_get_bulk_rejected_on_v1() {
        let mut engine = agent();
        let err = engine
            .execute(
                &v1(),
                &Request::GetBulk {
                    non_repeaters: 0,
                    max_repetitions: 10,
                    oids: vec![oid!(1, 3)],
                },
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedOperation { .. }));
    }

    // ========================================================================
    // Scripting
    // ========================================================================

    #[test]
    fn test_scripted_replies_consumed_in_order() {
        let mut engine = agent();
        engine.fail_next(EngineError::Malformed { offset: 3 });
        engine.push_reply(MockReply::Status {
            status: ErrorStatus::GenErr,
            index: 1,
        });

        let req = Request::Get(vec![oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)]);
        assert!(matches!(
            engine.execute(&v2c(), &req),
            Err(EngineError::Malformed { offset: 3 })
        ));
        assert_eq!(
            engine.execute(&v2c(), &req).unwrap().status(),
            ErrorStatus::GenErr
        );
        assert_eq!(engine.execute(&v2c(), &req).unwrap().status(), ErrorStatus::NoError);
        assert_eq!(engine.requests().len(), 3);
    }

    #[test]
    fn test_truncated_reply_drops_trailing_varbinds() {
        let mut engine = agent();
        engine.push_reply(MockReply::Truncate { keep: 1 });

        let req = Request::Get(vec![
            oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
            oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
        ]);
        let resp = engine.execute(&v2c(), &req).unwrap();
        assert_eq!(resp.status(), ErrorStatus::NoError);
        assert_eq!(resp.varbinds.len(), 1);
        assert_eq!(resp.varbinds[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));

        assert_eq!(engine.execute(&v2c(), &req).unwrap().varbinds.len(), 2);
    }

    #[test]
    fn test_insert_raw_serves_foreign_tag() {
        let mut engine = MockEngine::new();
        engine.insert_raw(oid!(1, 3, 6, 1, 9), 0x47, Payload::UInt32(5));
        let resp = engine
            .execute(&v2c(), &Request::Get(vec![oid!(1, 3, 6, 1, 9)]))
            .unwrap();
        assert_eq!(resp.varbinds[0].tag, 0x47);
    }
}
