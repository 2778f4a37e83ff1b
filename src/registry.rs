//! Registry of compiled-in transports

use crate::error::{Result, StubError};
use crate::transport::TransportDescriptor;
use log::warn;
use std::collections::BTreeMap;

/// Name → descriptor map, built once before any command runs
#[derive(Debug, Default)]
pub struct TransportRegistry {
    transports: BTreeMap<&'static str, TransportDescriptor>,
}

impl TransportRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every transport enabled at build time
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin_descriptors() {
            if let Err(e) = registry.register(descriptor) {
                warn!("Skipping built-in transport: {}", e);
            }
        }
        registry
    }

    /// Add a transport. Names are unique; a second registration under the
    /// same name is rejected.
    pub fn register(&mut self, descriptor: TransportDescriptor) -> Result<()> {
        let name = descriptor.name();
        if self.transports.contains_key(name) {
            return Err(StubError::DuplicateTransport(name.to_string()));
        }
        self.transports.insert(name, descriptor);
        Ok(())
    }

    /// Find a transport by exact, case-sensitive name
    pub fn lookup(&self, name: &str) -> Option<&TransportDescriptor> {
        self.transports.get(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.transports.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

fn builtin_descriptors() -> Vec<TransportDescriptor> {
    #[allow(unused_mut)]
    let mut descriptors = Vec::new();

    #[cfg(feature = "serial")]
    descriptors.push(TransportDescriptor::new(
        crate::transport::serial::NAME,
        crate::transport::SerialTransport::new,
    ));

    #[cfg(feature = "udp")]
    descriptors.push(TransportDescriptor::new(
        crate::transport::udp::NAME,
        crate::transport::UdpTransport::new,
    ));

    descriptors
}
