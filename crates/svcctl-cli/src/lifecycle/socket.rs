//! TCP port probing.
//!
//! A successful connect means the service is running; every failure means it
//! is not. The error kind only decides how loudly the failure is logged.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, warn};

use super::types::ServiceEndpoint;

/// Reports whether something accepts connections on an endpoint.
pub trait PortProbe {
    fn is_open(&self, endpoint: &ServiceEndpoint, timeout: Duration) -> bool;
}

/// Production probe backed by a blocking `connect(2)` with a timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpPortProbe;

impl PortProbe for TcpPortProbe {
    fn is_open(&self, endpoint: &ServiceEndpoint, timeout: Duration) -> bool {
        match try_connect(endpoint, timeout) {
            Ok(()) => true,
            Err(error) if is_closed_signal(&error) => {
                debug!(%endpoint, %error, "port probe refused");
                false
            }
            Err(error) => {
                warn!(%endpoint, %error, kind = ?error.kind(), "port probe failed; treating port as closed");
                false
            }
        }
    }
}

fn try_connect(endpoint: &ServiceEndpoint, timeout: Duration) -> io::Result<()> {
    let address = resolve_tcp(&endpoint.host, endpoint.port)?;
    TcpStream::connect_timeout(&address, timeout).map(|_| ())
}

fn resolve_tcp(host: &str, port: u16) -> io::Result<SocketAddr> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved address"))
}

/// Determines whether an I/O error is the ordinary "nothing is listening"
/// answer rather than a network fault.
///
/// Returns `true` for:
/// - `ConnectionRefused`: the host answered and nothing listens on the port
/// - `AddrNotAvailable`: the address resolved to nothing usable
///
/// Timeouts, resets and permission problems return `false` so they are
/// logged as warnings even though the probe still reports the port closed.
fn is_closed_signal(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::AddrNotAvailable
    )
}
