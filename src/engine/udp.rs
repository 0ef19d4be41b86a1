//! UDP engine for SNMP v1/v2c.
//!
//! Blocking front over a private current-thread tokio runtime. One socket is
//! kept per engine and rebound only when the target address family changes.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::runtime::Runtime;

use super::{Engine, Request, Response, Session};
use crate::error::EngineError;
use crate::message::{CommunityMessage, Pdu, PduType};
use crate::util::{RequestIds, bind_udp_socket, local_bind_addr};
use crate::version::Version;

/// Largest datagram accepted from an agent.
const MAX_MESSAGE_SIZE: usize = 65535;

/// Real SNMP engine speaking v1/v2c over UDP.
///
/// Calls block the current thread on a private runtime. From async code, run
/// the query on a blocking thread with `tokio::task::spawn_blocking`.
///
/// # Panics
///
/// [`execute`](Engine::execute) panics if called from an async task, since
/// tokio does not allow one runtime to block inside another.
///
/// # Example
///
/// ```no_run
/// use snmp_query::engine::{Engine, Request, Session, UdpEngine};
/// use snmp_query::oid;
///
/// let mut engine = UdpEngine::new();
/// let session = Session::new("192.0.2.1");
/// let response = engine.execute(&session, &Request::Get(vec![oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)]))?;
/// println!("{} varbinds", response.varbinds.len());
/// # Ok::<(), snmp_query::EngineError>(())
/// ```
pub struct UdpEngine {
    runtime: Option<Runtime>,
    socket: Option<UdpSocket>,
    ids: RequestIds,
}

impl UdpEngine {
    /// Create an engine. The runtime and socket are created on first use.
    pub fn new() -> Self {
        Self {
            runtime: None,
            socket: None,
            ids: RequestIds::new(),
        }
    }
}

impl Default for UdpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UdpEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpEngine")
            .field("local_addr", &self.socket.as_ref().and_then(|s| s.local_addr().ok()))
            .finish_non_exhaustive()
    }
}

impl Engine for UdpEngine {
    fn execute(&mut self, session: &Session, request: &Request) -> Result<Response, EngineError> {
        if session.version == Version::V1 && matches!(request, Request::GetBulk { .. }) {
            return Err(EngineError::UnsupportedOperation {
                operation: request.name(),
                version: session.version,
            });
        }

        let runtime = match &mut self.runtime {
            Some(runtime) => runtime,
            slot @ None => slot.insert(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()?,
            ),
        };

        let ids = &self.ids;
        let socket = &mut self.socket;
        runtime.block_on(async move {
            let target = resolve(session).await?;
            let socket = ensure_socket(socket, target)?;
            exchange(socket, ids, session, target, request).await
        })
    }
}

async fn resolve(session: &Session) -> Result<SocketAddr, EngineError> {
    let resolve_err = || EngineError::Resolve {
        host: session.host.as_str().into(),
    };
    tokio::net::lookup_host((session.host.as_str(), session.port))
        .await
        .map_err(|e| {
            tracing::debug!(target: "snmp_query::engine", { snmp.host = %session.host, error = %e }, "lookup failed");
            resolve_err()
        })?
        .next()
        .ok_or_else(resolve_err)
}

fn ensure_socket(
    slot: &mut Option<UdpSocket>,
    target: SocketAddr,
) -> Result<&UdpSocket, EngineError> {
    let family_matches = slot
        .as_ref()
        .and_then(|s| s.local_addr().ok())
        .is_some_and(|local| local.is_ipv6() == target.is_ipv6());

    let socket = match slot.take() {
        Some(socket) if family_matches => socket,
        _ => {
            let socket = bind_udp_socket(local_bind_addr(target))?;
            tracing::debug!(target: "snmp_query::engine", { snmp.local_addr = ?socket.local_addr().ok() }, "UDP socket bound");
            socket
        }
    };
    Ok(slot.insert(socket))
}

/// Send with retries; each attempt uses a fresh request ID.
async fn exchange(
    socket: &UdpSocket,
    ids: &RequestIds,
    session: &Session,
    target: SocketAddr,
    request: &Request,
) -> Result<Response, EngineError> {
    let start = Instant::now();
    let mut buf = vec![0u8; MAX_MESSAGE_SIZE];
    let mut last_mismatch = None;

    for attempt in 0..=session.retries {
        let request_id = ids.next();
        let message = CommunityMessage {
            version: session.version,
            community: session.community.clone(),
            pdu: Pdu::from_request(request_id, request),
        };
        let data = message.encode();

        if attempt > 0 {
            tracing::debug!(target: "snmp_query::engine", { snmp.target = %target, snmp.attempt = attempt }, "retrying request");
        }
        tracing::trace!(target: "snmp_query::engine", { snmp.target = %target, snmp.request_id = request_id, snmp.bytes = data.len() }, "sending {}", request.name());
        socket.send_to(&data, target).await?;

        let deadline = tokio::time::Instant::now() + session.timeout;
        loop {
            let (len, source) =
                match tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await {
                    Ok(received) => received?,
                    Err(_) => break,
                };

            if source != target {
                tracing::debug!(target: "snmp_query::engine", { snmp.target = %target, snmp.source = %source }, "discarding datagram from unexpected source");
                continue;
            }

            let reply = CommunityMessage::decode(bytes::Bytes::copy_from_slice(&buf[..len]))?;
            if reply.pdu.pdu_type != PduType::Response || reply.version != session.version {
                tracing::debug!(target: "snmp_query::engine", { snmp.target = %target, snmp.version = %reply.version, snmp.pdu_type = ?reply.pdu.pdu_type }, "discarding unexpected message");
                continue;
            }
            if reply.pdu.request_id != request_id {
                tracing::debug!(target: "snmp_query::engine", { snmp.target = %target, expected = request_id, actual = reply.pdu.request_id }, "discarding response with stale request ID");
                last_mismatch = Some((request_id, reply.pdu.request_id));
                continue;
            }

            tracing::trace!(target: "snmp_query::engine", { snmp.target = %target, snmp.request_id = request_id, snmp.error_status = reply.pdu.error_status, snmp.varbind_count = reply.pdu.varbinds.len() }, "received response");
            return Ok(reply.pdu.into_response());
        }
    }

    if let Some((expected, actual)) = last_mismatch {
        return Err(EngineError::RequestIdMismatch { expected, actual });
    }

    let elapsed = start.elapsed();
    tracing::debug!(target: "snmp_query::engine", { snmp.target = %target, elapsed = ?elapsed, retries = session.retries }, "request timed out");
    Err(EngineError::Timeout {
        elapsed,
        retries: session.retries,
    })
}
