//! The client session state machine.
//!
//! [`Session`] holds everything about a connection that is not I/O: the
//! connection state, the keepalive timer, the CONNACK deadline and the packet
//! identifier counter. The blocking and async clients both drive the same
//! session, so the protocol rules live in exactly one place.
//!
//! ```text
//!                 CONNECT sent              CONNACK(0)
//! Disconnected ─────────────────> Connecting ──────────> Connected
//!      ^                              │                      │
//!      │                              │ CONNACK(!=0)         │ DISCONNECT sent
//!      │                              │ or deadline          │ or transport lost
//!      │                              v                      │
//!      │                            Failed                   │
//!      └─────────────────────────────────────────────────────┘
//! ```

use super::dispatch::classify;
use super::error::Error;
use super::keepalive::KeepAlive;
use super::packet::{ConnectReturnCode, ControlPacketType, PacketBuf, connack_return_code};

/// Connection state of a session.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No session. The initial state.
    Disconnected,
    /// CONNECT was sent and the CONNACK is pending.
    Connecting,
    /// The broker accepted the session.
    Connected,
    /// The broker refused the session or never answered.
    Failed,
}

/// Hands out packet identifiers for SUBSCRIBE and UNSUBSCRIBE.
///
/// Identifiers run from 1 to 65535 and wrap back to 1; zero is never used.
#[derive(Debug, Clone)]
pub struct PacketIdGenerator {
    next_id: u16,
}

impl PacketIdGenerator {
    /// A generator whose first identifier is 1.
    pub const fn new() -> Self {
        Self { next_id: 1 }
    }

    /// The next identifier.
    pub fn next_id(&mut self) -> u16 {
        let id = self.next_id;
        self.next_id = if id == u16::MAX { 1 } else { id + 1 };
        id
    }
}

impl Default for PacketIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// One inbound control packet, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// The classified type, or `None` if the type code is unknown.
    pub packet_type: Option<ControlPacketType>,
    /// The raw frame, fixed header included.
    pub bytes: PacketBuf,
}

/// Something that happened while polling a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The broker accepted the CONNECT.
    Connected,
    /// The broker refused the CONNECT. The session is now [`State::Failed`].
    ConnectionRefused(ConnectReturnCode),
    /// No CONNACK arrived in time. The session is now [`State::Failed`].
    HandshakeTimedOut,
    /// The keepalive timer fired and a PINGREQ was sent.
    PingSent,
    /// A packet arrived that the session does not consume itself.
    Packet(Inbound),
}

/// A timer that expired during [`Session::poll_timers`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Timeout {
    /// The keepalive interval elapsed; a PINGREQ is due.
    KeepAlive,
    /// The CONNACK deadline passed.
    Handshake,
}

/// Connection state, timers and packet identifiers for one client.
#[derive(Debug, Clone)]
pub struct Session {
    state: State,
    keep_alive: KeepAlive,
    connect_timeout_ms: u64,
    handshake_deadline: Option<u64>,
    packet_ids: PacketIdGenerator,
}

impl Session {
    /// A disconnected session.
    pub const fn new(keep_alive_seconds: u16, connect_timeout_ms: u32) -> Self {
        Self {
            state: State::Disconnected,
            keep_alive: KeepAlive::new(keep_alive_seconds),
            connect_timeout_ms: connect_timeout_ms as u64,
            handshake_deadline: None,
            packet_ids: PacketIdGenerator::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// The keepalive timer.
    pub fn keep_alive(&self) -> &KeepAlive {
        &self.keep_alive
    }

    /// Fails with [`Error::AlreadyConnected`] unless a new CONNECT may be sent.
    pub fn ensure_can_connect(&self) -> Result<(), Error> {
        match self.state {
            State::Disconnected | State::Failed => Ok(()),
            State::Connecting | State::Connected => Err(Error::AlreadyConnected),
        }
    }

    /// Fails with [`Error::NotConnected`] unless the broker accepted the session.
    pub fn ensure_connected(&self) -> Result<(), Error> {
        if self.state == State::Connected {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    /// Allocate the identifier for the next SUBSCRIBE or UNSUBSCRIBE.
    pub fn next_packet_id(&mut self) -> u16 {
        self.packet_ids.next_id()
    }

    /// CONNECT has been written: start waiting for CONNACK.
    pub fn on_connect_sent(&mut self, now: u64) {
        self.keep_alive.arm(now);
        self.handshake_deadline = Some(now + self.connect_timeout_ms);
        self.transition(State::Connecting);
    }

    /// Any packet other than CONNECT or PINGREQ has been written.
    pub fn on_packet_sent(&mut self, now: u64) {
        self.keep_alive.reset(now);
    }

    /// DISCONNECT has been written.
    pub fn on_disconnect(&mut self) {
        self.stop_timers();
        self.transition(State::Disconnected);
    }

    /// The transport failed or was closed by the peer.
    pub fn on_transport_lost(&mut self) {
        self.stop_timers();
        self.transition(State::Disconnected);
    }

    /// Feed one complete inbound frame through the dispatcher.
    ///
    /// A CONNACK while connecting resolves the handshake. Every other frame is
    /// handed back to the caller as [`Event::Packet`].
    pub fn on_frame(&mut self, frame: PacketBuf) -> Event {
        let packet_type = classify(&frame);
        debug!("received {=usize} bytes: {=[u8]}", frame.len(), &frame[..]);

        if self.state == State::Connecting && packet_type == Some(ControlPacketType::Connack) {
            match connack_return_code(&frame) {
                Ok(ConnectReturnCode::Accepted) => {
                    self.handshake_deadline = None;
                    self.transition(State::Connected);
                    return Event::Connected;
                }
                Ok(code) => {
                    warn!("broker refused connection: {=u8}", code.as_byte());
                    self.stop_timers();
                    self.transition(State::Failed);
                    return Event::ConnectionRefused(code);
                }
                Err(_) => warn!("short CONNACK ignored"),
            }
        }

        Event::Packet(Inbound {
            packet_type,
            bytes: frame,
        })
    }

    /// Check both timers against `now`.
    ///
    /// A passed handshake deadline moves the session to [`State::Failed`].
    /// The keepalive only fires while connected; the caller is expected to send
    /// a PINGREQ when [`Timeout::KeepAlive`] is returned.
    pub fn poll_timers(&mut self, now: u64) -> Option<Timeout> {
        match self.state {
            State::Connecting => match self.handshake_deadline {
                Some(deadline) if now >= deadline => {
                    warn!("no CONNACK within {=u64} ms", self.connect_timeout_ms);
                    self.stop_timers();
                    self.transition(State::Failed);
                    Some(Timeout::Handshake)
                }
                _ => None,
            },
            State::Connected if self.keep_alive.poll(now) => Some(Timeout::KeepAlive),
            _ => None,
        }
    }

    fn stop_timers(&mut self) {
        self.keep_alive.cancel();
        self.handshake_deadline = None;
    }

    fn transition(&mut self, next: State) {
        if self.state != next {
            info!("session {} -> {}", self.state, next);
            self.state = next;
        }
    }
}
