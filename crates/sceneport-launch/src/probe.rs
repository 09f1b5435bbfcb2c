//! Is something already listening on a local port?
//!
//! This is a point-in-time check. Another process can bind the port between
//! the probe and the spawn.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::time::Duration;

/// How long a single connection attempt may take
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(250);

/// True if a TCP listener accepts connections on `localhost:port`
///
/// Both loopback addresses are tried since dev servers often bind only one.
pub fn port_in_use(port: u16) -> bool {
    let candidates = [
        SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
        SocketAddr::from((Ipv6Addr::LOCALHOST, port)),
    ];
    candidates
        .iter()
        .any(|addr| TcpStream::connect_timeout(addr, PROBE_TIMEOUT).is_ok())
}
