//! Remote serial protocol packet framing
//!
//! Packets travel as `$<payload>#<checksum>`, where the checksum is the
//! modulo-256 sum of the payload bytes as sent, in two lowercase hex digits.
//! `}` escapes the next byte (XOR 0x20). Each packet is acknowledged with
//! `+` (or `-` to request retransmission). A lone 0x03 byte is an interrupt.

/// Start of a packet
pub const PACKET_START: u8 = b'$';
/// End of packet payload, checksum follows
pub const PACKET_END: u8 = b'#';
/// Escape marker
pub const ESCAPE: u8 = b'}';
/// Positive acknowledgement
pub const ACK: u8 = b'+';
/// Negative acknowledgement
pub const NACK: u8 = b'-';
/// Interrupt request from the debugger
pub const INTERRUPT: u8 = 0x03;

/// Largest payload accepted
pub const MAX_PACKET_SIZE: usize = 4096;

/// Something recognised on the incoming byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A complete packet with a valid checksum (payload unescaped)
    Packet(Vec<u8>),
    /// A complete packet whose checksum did not match
    BadChecksum,
    /// Payload exceeded [`MAX_PACKET_SIZE`]
    Overflow,
    /// Debugger acknowledged our last packet
    Ack,
    /// Debugger asked for our last packet again
    Nack,
    /// Debugger wants the target stopped
    Interrupt,
}

/// Modulo-256 sum of `data`
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Frame a payload as a packet, escaping reserved bytes
pub fn encode_packet(payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(payload.len());
    for &b in payload {
        match b {
            PACKET_START | PACKET_END | ESCAPE | b'*' => {
                body.push(ESCAPE);
                body.push(b ^ 0x20);
            }
            _ => body.push(b),
        }
    }

    let mut packet = Vec::with_capacity(body.len() + 4);
    packet.push(PACKET_START);
    packet.extend_from_slice(&body);
    packet.push(PACKET_END);
    packet.extend_from_slice(format!("{:02x}", checksum(&body)).as_bytes());
    packet
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Payload,
    Escape,
    ChecksumHigh,
    ChecksumLow(u8),
}

/// Incremental packet decoder, fed one byte at a time
#[derive(Debug)]
pub struct PacketReader {
    state: State,
    payload: Vec<u8>,
    sum: u8,
    overflowed: bool,
}

impl PacketReader {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            payload: Vec::new(),
            sum: 0,
            overflowed: false,
        }
    }

    /// Feed one byte, returning an event when one completes
    pub fn push(&mut self, byte: u8) -> Option<Event> {
        match self.state {
            State::Idle => match byte {
                PACKET_START => {
                    self.begin();
                    None
                }
                ACK => Some(Event::Ack),
                NACK => Some(Event::Nack),
                INTERRUPT => Some(Event::Interrupt),
                // Line noise between packets
                _ => None,
            },
            State::Payload => {
                match byte {
                    PACKET_START => self.begin(),
                    PACKET_END => self.state = State::ChecksumHigh,
                    ESCAPE => {
                        self.sum = self.sum.wrapping_add(byte);
                        self.state = State::Escape;
                    }
                    _ => {
                        self.sum = self.sum.wrapping_add(byte);
                        self.store(byte);
                    }
                }
                None
            }
            State::Escape => {
                self.sum = self.sum.wrapping_add(byte);
                self.store(byte ^ 0x20);
                self.state = State::Payload;
                None
            }
            State::ChecksumHigh => match hex_value(byte) {
                Some(high) => {
                    self.state = State::ChecksumLow(high);
                    None
                }
                None => Some(self.finish(None)),
            },
            State::ChecksumLow(high) => {
                let expected = hex_value(byte).map(|low| (high << 4) | low);
                Some(self.finish(expected))
            }
        }
    }

    fn begin(&mut self) {
        self.payload.clear();
        self.sum = 0;
        self.overflowed = false;
        self.state = State::Payload;
    }

    fn store(&mut self, byte: u8) {
        if self.payload.len() < MAX_PACKET_SIZE {
            self.payload.push(byte);
        } else {
            self.overflowed = true;
        }
    }

    fn finish(&mut self, expected: Option<u8>) -> Event {
        self.state = State::Idle;
        let payload = std::mem::take(&mut self.payload);
        if self.overflowed {
            Event::Overflow
        } else if expected == Some(self.sum) {
            Event::Packet(payload)
        } else {
            Event::BadChecksum
        }
    }
}

impl Default for PacketReader {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}
