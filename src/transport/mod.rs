//! Transports carrying the remote debugging protocol
//!
//! A transport is a byte channel (serial line, UDP socket, ...) that the
//! engine reads packets from and writes replies to. Transports that need
//! setup before use expose a [`TransportInit`] capability; transports that
//! are always ready simply don't.

#[cfg(feature = "serial")]
pub mod serial;
#[cfg(feature = "udp")]
pub mod udp;

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

#[cfg(feature = "serial")]
pub use serial::SerialTransport;
#[cfg(feature = "udp")]
pub use udp::{UdpTransport, DEFAULT_UDP_PORT};

/// Byte channel handed to the debugging engine
#[async_trait]
pub trait Transport: Send {
    /// Registered name of this transport
    fn name(&self) -> &'static str;

    /// Setup hook, if this transport needs one
    fn initializer(&mut self) -> Option<&mut dyn TransportInit> {
        None
    }

    /// Receive at least one byte into `buf`, returning the count.
    /// Zero means the channel is closed.
    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Send all of `data`
    async fn send(&mut self, data: &[u8]) -> Result<()>;
}

/// Optional setup capability of a transport
#[async_trait]
pub trait TransportInit: Send {
    /// Configure the transport from its command-line arguments.
    ///
    /// The arguments are exactly those following the transport name; the
    /// transport decides how many it accepts.
    async fn init(&mut self, args: &[String]) -> Result<()>;
}

type Factory = Box<dyn Fn() -> Box<dyn Transport> + Send + Sync>;

/// Registered record of a transport: its name and how to create it
pub struct TransportDescriptor {
    name: &'static str,
    factory: Factory,
}

impl TransportDescriptor {
    /// Create a descriptor from a constructor
    pub fn new<F, T>(name: &'static str, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Transport + 'static,
    {
        Self {
            name,
            factory: Box::new(move || -> Box<dyn Transport> { Box::new(factory()) }),
        }
    }

    /// Transport name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Create a fresh, uninitialised transport handle
    pub fn instantiate(&self) -> Box<dyn Transport> {
        (self.factory)()
    }
}

impl fmt::Debug for TransportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
