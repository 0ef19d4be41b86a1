//! Subtree walks.
//!
//! [`Walk`] follows GETNEXT one varbind at a time (works on v1 and v2c);
//! [`BulkWalk`] fetches up to `max_repetitions` successors per GETBULK
//! (v2c only). Both yield the same raw varbinds in the same order and stop
//! at the first of:
//!
//! - an endOfMibView marker
//! - an OID outside the walk root
//! - a non-zero error status from the agent (noSuchName is how a v1 agent
//!   reports the end of its MIB)
//!
//! Either walk fails with [`Error::NonIncreasingOid`] if the agent answers
//! with an OID that is not greater than the one requested.

use std::collections::VecDeque;

use crate::engine::{Engine, Request, Response, Session};
use crate::error::{EngineError, Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::varbind::RawVarBind;

use super::session_target;

/// Walk position shared by both walk kinds.
struct Cursor {
    base_oid: Oid,
    current_oid: Oid,
    done: bool,
}

impl Cursor {
    fn new(oid: Oid) -> Self {
        Self {
            base_oid: oid.clone(),
            current_oid: oid,
            done: false,
        }
    }

    /// Whether the response ends the walk.
    fn ends_on_status(&mut self, response: &Response) -> bool {
        let status = response.status();
        if status == ErrorStatus::NoError {
            return false;
        }

        if status == ErrorStatus::NoSuchName {
            tracing::debug!(target: "snmp_query::query", { snmp.oid = %self.base_oid }, "walk reached end of MIB (noSuchName)");
        } else {
            tracing::warn!(target: "snmp_query::query", { snmp.oid = %self.base_oid, snmp.error_status = %status, snmp.error_index = response.error_index }, "walk stopped by agent error");
        }
        self.done = true;
        true
    }

    /// Check a returned varbind; `None` means the walk is over.
    fn accept(&mut self, vb: RawVarBind) -> Option<Result<RawVarBind>> {
        if vb.is_end_of_mib_view() {
            self.done = true;
            return None;
        }

        if !vb.oid.starts_with(&self.base_oid) {
            self.done = true;
            return None;
        }

        if vb.oid <= self.current_oid {
            self.done = true;
            return Some(Err(Error::NonIncreasingOid {
                previous: self.current_oid.clone(),
                current: vb.oid,
            }));
        }

        self.current_oid = vb.oid.clone();
        Some(Ok(vb))
    }
}

/// Iterator walking an OID subtree using GETNEXT.
pub struct Walk<'a, E: Engine + ?Sized> {
    engine: &'a mut E,
    session: &'a Session,
    cursor: Cursor,
}

impl<'a, E: Engine + ?Sized> Walk<'a, E> {
    /// Walk the subtree rooted at `oid`.
    pub fn new(engine: &'a mut E, session: &'a Session, oid: Oid) -> Self {
        Self {
            engine,
            session,
            cursor: Cursor::new(oid),
        }
    }
}

impl<E: Engine + ?Sized> Iterator for Walk<'_, E> {
    type Item = Result<RawVarBind>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.done {
            return None;
        }

        let request = Request::GetNext(vec![self.cursor.current_oid.clone()]);
        let response = match self.engine.execute(self.session, &request) {
            Ok(response) => response,
            Err(e) => {
                self.cursor.done = true;
                return Some(Err(Error::engine(session_target(self.session), e)));
            }
        };

        if self.cursor.ends_on_status(&response) {
            return None;
        }

        if response.varbinds.len() != 1 {
            self.cursor.done = true;
            return Some(Err(Error::engine(
                session_target(self.session),
                EngineError::VarbindCount {
                    expected: 1,
                    actual: response.varbinds.len(),
                },
            )));
        }
        let vb = response.varbinds.into_iter().next()?;
        self.cursor.accept(vb)
    }
}

/// Iterator walking an OID subtree using GETBULK.
pub struct BulkWalk<'a, E: Engine + ?Sized> {
    engine: &'a mut E,
    session: &'a Session,
    cursor: Cursor,
    max_repetitions: u32,
    /// Varbinds from the last GETBULK not yet handed out.
    buffer: VecDeque<RawVarBind>,
}

impl<'a, E: Engine + ?Sized> BulkWalk<'a, E> {
    /// Walk the subtree rooted at `oid`, fetching `max_repetitions` per request.
    pub fn new(engine: &'a mut E, session: &'a Session, oid: Oid, max_repetitions: u32) -> Self {
        Self {
            engine,
            session,
            cursor: Cursor::new(oid),
            max_repetitions: max_repetitions.max(1),
            buffer: VecDeque::new(),
        }
    }
}

impl<E: Engine + ?Sized> Iterator for BulkWalk<'_, E> {
    type Item = Result<RawVarBind>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor.done {
                return None;
            }

            if let Some(vb) = self.buffer.pop_front() {
                return self.cursor.accept(vb);
            }

            let request = Request::GetBulk {
                non_repeaters: 0,
                max_repetitions: self.max_repetitions,
                oids: vec![self.cursor.current_oid.clone()],
            };
            let response = match self.engine.execute(self.session, &request) {
                Ok(response) => response,
                Err(e) => {
                    self.cursor.done = true;
                    return Some(Err(Error::engine(session_target(self.session), e)));
                }
            };

            if self.cursor.ends_on_status(&response) {
                return None;
            }

            if response.varbinds.is_empty() {
                self.cursor.done = true;
                return Some(Err(Error::engine(
                    session_target(self.session),
                    EngineError::VarbindCount {
                        expected: 1,
                        actual: 0,
                    },
                )));
            }
            self.buffer = response.varbinds.into();
        }
    }
}
