//! UDP transport
//!
//! Listens on a network interface for datagrams from the debugger. Replies
//! go to whichever peer sent the most recent datagram.

use super::{Transport, TransportInit};
use crate::error::{Result, StubError};
use async_trait::async_trait;
use log::{debug, info};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;

/// Registered name
pub const NAME: &str = "udp";

/// Default listening port
pub const DEFAULT_UDP_PORT: u16 = 43770;

const USAGE: &str = "udp <interface>";

/// UDP transport
pub struct UdpTransport {
    port: u16,
    socket: Option<UdpSocket>,
    peer: Option<SocketAddr>,
}

impl UdpTransport {
    /// Create an unbound transport using the default port
    pub fn new() -> Self {
        Self::with_port(DEFAULT_UDP_PORT)
    }

    /// Create an unbound transport listening on `port` once initialised
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            socket: None,
            peer: None,
        }
    }

    /// Bound address, once initialised
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Current peer, if any datagram has arrived
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    fn socket(&self) -> Result<&UdpSocket> {
        self.socket
            .as_ref()
            .ok_or_else(|| StubError::NotConnected("udp transport is not initialised".into()))
    }
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve an interface name, IP address or socket address to a bind address
pub fn resolve_bind_address(target: &str, port: u16) -> Result<SocketAddr> {
    if let Ok(addr) = target.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }
    let ip = interface_address(target)?;
    Ok(SocketAddr::new(IpAddr::V4(ip), port))
}

/// First IPv4 address assigned to a network interface
#[cfg(unix)]
fn interface_address(name: &str) -> Result<Ipv4Addr> {
    let addrs = nix::ifaddrs::getifaddrs().map_err(std::io::Error::from)?;

    let mut found = false;
    for ifaddr in addrs {
        if ifaddr.interface_name != name {
            continue;
        }
        found = true;
        if let Some(sin) = ifaddr.address.as_ref().and_then(|a| a.as_sockaddr_in()) {
            return Ok(Ipv4Addr::from(sin.ip()));
        }
    }

    if found {
        Err(StubError::NoSuchDevice(format!("{} has no IPv4 address", name)))
    } else {
        Err(StubError::NoSuchDevice(name.to_string()))
    }
}

#[cfg(not(unix))]
fn interface_address(name: &str) -> Result<Ipv4Addr> {
    Err(StubError::NoSuchDevice(name.to_string()))
}

#[async_trait]
impl TransportInit for UdpTransport {
    async fn init(&mut self, args: &[String]) -> Result<()> {
        if args.len() != 1 {
            eprintln!("Usage: {}", USAGE);
            return Err(StubError::InvalidArgument(format!(
                "udp expects one interface argument, got {}",
                args.len()
            )));
        }

        let addr = resolve_bind_address(&args[0], self.port)?;
        let socket = UdpSocket::bind(addr).await?;
        info!("udp transport listening on {}", socket.local_addr()?);

        self.socket = Some(socket);
        self.peer = None;
        Ok(())
    }
}

#[async_trait]
impl Transport for UdpTransport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn initializer(&mut self) -> Option<&mut dyn TransportInit> {
        Some(self)
    }

    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        let (len, from) = self.socket()?.recv_from(buf).await?;
        if self.peer != Some(from) {
            debug!("udp peer is now {}", from);
            self.peer = Some(from);
        }
        Ok(len)
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let peer = self
            .peer
            .ok_or_else(|| StubError::NotConnected("no udp peer has contacted us yet".into()))?;
        self.socket()?.send_to(data, peer).await?;
        Ok(())
    }
}
