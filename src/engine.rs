//! Debugging engine hand-off
//!
//! The command's last step gives the initialised transport to an [`Engine`],
//! which runs the protocol loop for as long as a debugger is attached.
//! [`StubEngine`] is the minimal engine shipped with the binary: it speaks
//! the packet layer, reports the target as stopped and answers every query
//! it does not know with the empty "unsupported" reply.

use crate::error::{Result, StubError};
use crate::protocol::{encode_packet, Event, PacketReader, ACK, MAX_PACKET_SIZE, NACK};
use crate::transport::Transport;
use async_trait::async_trait;
use log::{debug, info, warn};

/// Signal reported in stop replies (SIGTRAP)
pub const STOP_SIGNAL: u8 = 5;

/// Receive buffer size: a full packet with every payload byte escaped plus
/// framing, so one datagram always holds a whole packet
pub const RECV_BUFFER_SIZE: usize = 2 * MAX_PACKET_SIZE + 4;

/// Reply to a packet larger than [`MAX_PACKET_SIZE`]
const OVERSIZED_REPLY: &[u8] = b"E01";

/// How a debugging session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Debugger detached (`D`)
    Detached,
    /// Debugger killed the target (`k`)
    Killed,
}

/// Runs the remote debugging protocol over a transport
#[async_trait]
pub trait Engine: Send {
    /// Take over the transport and run the session.
    ///
    /// This does not return while a debugger is attached. `Ok` is only
    /// produced when the debugger itself ends the session; callers must not
    /// expect control back in the normal case.
    async fn start(&mut self, transport: Box<dyn Transport>) -> Result<SessionEnd>;
}

/// What to do after handling a packet
enum Reply {
    Send(Vec<u8>),
    Finish(SessionEnd, Option<Vec<u8>>),
}

/// Minimal packet-level engine
#[derive(Debug, Default)]
pub struct StubEngine {
    /// Last packet sent, kept for retransmission on NACK
    last_sent: Vec<u8>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn stop_reply() -> Vec<u8> {
        format!("S{:02x}", STOP_SIGNAL).into_bytes()
    }

    fn handle_packet(&self, payload: &[u8]) -> Reply {
        match payload.first() {
            Some(b'?') => Reply::Send(Self::stop_reply()),
            _ if payload.starts_with(b"qSupported") => {
                Reply::Send(format!("PacketSize={:x}", MAX_PACKET_SIZE).into_bytes())
            }
            Some(b'D') => Reply::Finish(SessionEnd::Detached, Some(b"OK".to_vec())),
            Some(b'k') => Reply::Finish(SessionEnd::Killed, None),
            _ => Reply::Send(Vec::new()),
        }
    }

    async fn send_packet(&mut self, transport: &mut dyn Transport, payload: &[u8]) -> Result<()> {
        let packet = encode_packet(payload);
        transport.send(&packet).await?;
        self.last_sent = packet;
        Ok(())
    }
}

#[async_trait]
impl Engine for StubEngine {
    async fn start(&mut self, mut transport: Box<dyn Transport>) -> Result<SessionEnd> {
        info!("Entering debug session on {} transport", transport.name());

        let mut reader = PacketReader::new();
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];

        loop {
            let len = transport.recv(&mut buf).await?;
            if len == 0 {
                return Err(StubError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "transport closed during debug session",
                )));
            }

            for &byte in &buf[..len] {
                let event = match reader.push(byte) {
                    Some(event) => event,
                    None => continue,
                };

                match event {
                    Event::Packet(payload) => {
                        debug!("<- {}", String::from_utf8_lossy(&payload));
                        transport.send(&[ACK]).await?;
                        match self.handle_packet(&payload) {
                            Reply::Send(reply) => {
                                self.send_packet(&mut *transport, &reply).await?;
                            }
                            Reply::Finish(end, reply) => {
                                if let Some(reply) = reply {
                                    self.send_packet(&mut *transport, &reply).await?;
                                }
                                info!("Debug session ended: {:?}", end);
                                return Ok(end);
                            }
                        }
                    }
                    Event::BadChecksum => {
                        warn!("Rejecting packet with bad checksum");
                        transport.send(&[NACK]).await?;
                    }
                    Event::Overflow => {
                        // Retransmitting would overflow again; accept and refuse
                        warn!("Packet exceeds {} bytes", MAX_PACKET_SIZE);
                        transport.send(&[ACK]).await?;
                        self.send_packet(&mut *transport, OVERSIZED_REPLY).await?;
                    }
                    Event::Nack => {
                        if !self.last_sent.is_empty() {
                            debug!("Retransmitting last packet");
                            transport.send(&self.last_sent).await?;
                        }
                    }
                    Event::Interrupt => {
                        debug!("Interrupt requested");
                        self.send_packet(&mut *transport, &Self::stop_reply()).await?;
                    }
                    Event::Ack => {}
                }
            }
        }
    }
}
