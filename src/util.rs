//! Internal utilities.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Create and bind a UDP socket.
///
/// For IPv6 addresses, sets `IPV6_V6ONLY = false` to enable dual-stack mode.
pub(crate) fn bind_udp_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }

    // Set non-blocking before converting to tokio socket
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;

    UdpSocket::from_std(socket.into())
}

/// Unspecified local address of the same family as `target`, port 0.
pub(crate) fn local_bind_addr(target: SocketAddr) -> SocketAddr {
    if target.is_ipv6() {
        SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((std::net::Ipv4Addr::UNSPECIFIED, 0))
    }
}

/// Monotonic request ID source seeded from the clock.
#[derive(Debug)]
pub(crate) struct RequestIds {
    next: AtomicI32,
}

impl RequestIds {
    pub(crate) fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i32)
            .unwrap_or(1);
        Self {
            next: AtomicI32::new(nanos.wrapping_abs().max(1)),
        }
    }

    /// Next positive request ID.
    pub(crate) fn next(&self) -> i32 {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        if id <= 0 {
            self.next.store(2, Ordering::Relaxed);
            1
        } else {
            id
        }
    }
}
