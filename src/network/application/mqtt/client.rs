//! Blocking MQTT v3.1 client.
//!
//! [`Client`] ties a transport, a [`Clock`] and the [`Session`] state machine
//! together. Nothing runs in the background: the keepalive timer and the
//! CONNACK deadline are only checked from [`Client::poll`], so the
//! application must poll regularly, typically from its main loop.
//!
//! # Examples
//!
//! ## Connecting and publishing
//!
//! ```rust,no_run
//! use libmqisdp::network::application::mqtt::{Client, Clock, Event, Options};
//! # use libmqisdp::network::Connection;
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl libmqisdp::network::Read for MockConnection {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl libmqisdp::network::Write for MockConnection {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl libmqisdp::network::Close for MockConnection {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Ticks(u64);
//! # impl Clock for Ticks {
//! #     fn now_millis(&mut self) -> u64 { self.0 += 1; self.0 }
//! # }
//! # fn main() -> Result<(), libmqisdp::network::application::mqtt::Error> {
//! let mut client = Client::new(MockConnection, Options::new("myMQTT-42"), Ticks(0));
//!
//! client.connect(|client| {
//!     client.subscribe("random/")?;
//!     client.publish("random/", br#"{"temperature":74}"#)
//! })?;
//!
//! loop {
//!     match client.poll()? {
//!         Some(Event::Packet(inbound)) => {
//!             // inbound.packet_type is None for unknown type codes
//!             let _ = inbound;
//!         }
//!         Some(_) | None => {}
//!     }
//! }
//! # }
//! ```

use super::error::Error;
use super::framer::Framer;
use super::keepalive::Clock;
use super::options::Options;
use super::packet::{
    MAX_PACKET_LEN, build_connect, build_disconnect, build_pingreq, build_publish,
    build_subscribe, build_unsubscribe,
};
use super::session::{Event, Session, State, Timeout};
use crate::network::{Close, Connect, Connection, Read, Write};

/// Bytes requested from the transport per [`Client::poll`].
pub const READ_CHUNK_LEN: usize = 256;

/// Consecutive zero-length writes tolerated before the transport is
/// considered stalled.
pub const MAX_WRITE_STALLS: usize = 10_000;

/// An MQTT v3.1 client over a blocking or non-blocking [`Connection`].
///
/// # Type Parameters
///
/// * `C` - the transport
/// * `K` - the millisecond [`Clock`] driving keepalive and the handshake
///   deadline
pub struct Client<'a, C: Connection, K: Clock> {
    connection: C,
    options: Options<'a>,
    clock: K,
    session: Session,
    framer: Framer,
}

impl<'a, C: Connection, K: Clock> Client<'a, C, K> {
    /// Wrap an already open transport. No bytes are sent until
    /// [`connect`](Self::connect) or [`begin_connect`](Self::begin_connect).
    pub fn new(connection: C, options: Options<'a>, clock: K) -> Self {
        let session = Session::new(options.keep_alive_seconds, options.connect_timeout_ms);
        Self {
            connection,
            options,
            clock,
            session,
            framer: Framer::new(),
        }
    }

    /// Dial `options.host:options.port` with `connector` and wrap the result.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidAddress`] - the host is empty or too long
    /// * [`Error::ConnectFailed`] - the connector could not open the transport
    pub fn open<T>(connector: &mut T, options: Options<'a>, clock: K) -> Result<Self, Error>
    where
        T: Connect<Connection = C>,
    {
        let remote = options.remote()?;
        debug!("dialing {=str}", remote.as_str());
        let connection = connector
            .connect(&remote)
            .map_err(|_| Error::ConnectFailed)?;
        Ok(Self::new(connection, options, clock))
    }

    /// Send CONNECT and run the handshake to completion.
    ///
    /// Polls the transport until a CONNACK arrives or the handshake deadline
    /// passes. Packets other than CONNACK received in the meantime are
    /// dropped. Once the broker accepts, `on_connected` runs with the
    /// connected client and its result is returned.
    ///
    /// # Errors
    ///
    /// * [`Error::AlreadyConnected`] - the session is connecting or connected
    /// * [`Error::ConnectionRefused`] - the broker answered with a non-zero
    ///   return code; the session is now [`State::Failed`]
    /// * [`Error::HandshakeTimeout`] - no CONNACK before the deadline; the
    ///   session is now [`State::Failed`]
    /// * [`Error::WriteError`] / [`Error::ReadError`] - the transport failed
    pub fn connect<F>(&mut self, on_connected: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.begin_connect()?;
        loop {
            match self.poll()? {
                Some(Event::Connected) => return on_connected(self),
                Some(Event::ConnectionRefused(code)) => return Err(Error::ConnectionRefused(code)),
                Some(Event::HandshakeTimedOut) => return Err(Error::HandshakeTimeout),
                Some(Event::Packet(inbound)) => {
                    debug!("dropping {} received before CONNACK", inbound.packet_type);
                }
                Some(Event::PingSent) => {}
                None => core::hint::spin_loop(),
            }
        }
    }

    /// Send CONNECT and return immediately.
    ///
    /// The session is [`State::Connecting`] afterwards; the outcome is
    /// reported by a later [`poll`](Self::poll) as [`Event::Connected`],
    /// [`Event::ConnectionRefused`] or [`Event::HandshakeTimedOut`].
    pub fn begin_connect(&mut self) -> Result<(), Error> {
        self.session.ensure_can_connect()?;
        let packet = build_connect(
            self.options.client_id,
            self.options.keep_alive_seconds,
            self.options.clean_session,
        )?;

        self.framer.clear();
        self.send(&packet)?;
        let now = self.clock.now_millis();
        self.session.on_connect_sent(now);
        info!("CONNECT sent as {=str}", self.options.client_id);
        Ok(())
    }

    /// Publish `payload` on `topic` at QoS 0.
    ///
    /// # Errors
    ///
    /// * [`Error::NotConnected`] - nothing is written and the state is left
    ///   untouched
    /// * [`Error::UnsupportedCharacter`] - the topic is not Latin-1
    /// * [`Error::BufferOverflow`] - the packet exceeds the packet buffer
    /// * [`Error::WriteError`] - the transport failed; the session is now
    ///   [`State::Disconnected`]
    pub fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Error> {
        self.session.ensure_connected()?;
        let packet = build_publish(topic, payload)?;
        self.send_tracked(&packet)?;
        debug!("PUBLISH {=str} ({=usize} bytes)", topic, payload.len());
        Ok(())
    }

    /// Subscribe to `topic` at QoS 0, returning the packet identifier used.
    ///
    /// The SUBACK shows up later as an [`Event::Packet`].
    pub fn subscribe(&mut self, topic: &str) -> Result<u16, Error> {
        self.session.ensure_connected()?;
        let packet_id = self.session.next_packet_id();
        let packet = build_subscribe(packet_id, topic)?;
        self.send_tracked(&packet)?;
        debug!("SUBSCRIBE {=str} id {=u16}", topic, packet_id);
        Ok(packet_id)
    }

    /// Unsubscribe from `topic`, returning the packet identifier used.
    pub fn unsubscribe(&mut self, topic: &str) -> Result<u16, Error> {
        self.session.ensure_connected()?;
        let packet_id = self.session.next_packet_id();
        let packet = build_unsubscribe(packet_id, topic)?;
        self.send_tracked(&packet)?;
        debug!("UNSUBSCRIBE {=str} id {=u16}", topic, packet_id);
        Ok(packet_id)
    }

    /// Send a PINGREQ.
    ///
    /// [`poll`](Self::poll) does this automatically when the keepalive fires.
    /// A ping does not push the keepalive deadline back.
    pub fn ping(&mut self) -> Result<(), Error> {
        self.session.ensure_connected()?;
        self.send(&build_pingreq())?;
        trace!("PINGREQ sent");
        Ok(())
    }

    /// Send DISCONNECT, stop the keepalive timer and return to
    /// [`State::Disconnected`].
    ///
    /// The transport stays open; use [`close`](Self::close) to release it.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] if the session is already disconnected.
    pub fn disconnect(&mut self) -> Result<(), Error> {
        if self.session.state() == State::Disconnected {
            return Err(Error::NotConnected);
        }
        let result = self.send(&build_disconnect());
        self.session.on_disconnect();
        self.framer.clear();
        result
    }

    /// Drive the session once.
    ///
    /// Runs the timers first (a due keepalive sends a PINGREQ, a passed
    /// handshake deadline fails the session), then hands out the next buffered
    /// frame, and only then reads one chunk from the transport.
    ///
    /// Returns `Ok(None)` when nothing happened.
    ///
    /// # Errors
    ///
    /// * [`Error::ReadError`] - the transport failed or the peer closed it;
    ///   the session is now [`State::Disconnected`]
    /// * [`Error::MalformedRemainingLength`] / [`Error::BufferOverflow`] - an
    ///   inbound frame could not be delimited and was dropped; the session
    ///   state is unchanged
    pub fn poll(&mut self) -> Result<Option<Event>, Error> {
        let now = self.clock.now_millis();
        match self.session.poll_timers(now) {
            Some(Timeout::KeepAlive) => {
                self.ping()?;
                return Ok(Some(Event::PingSent));
            }
            Some(Timeout::Handshake) => return Ok(Some(Event::HandshakeTimedOut)),
            None => {}
        }

        if let Some(frame) = self.framer.next_frame()? {
            return Ok(Some(self.session.on_frame(frame)));
        }

        // A complete frame never exceeds the framer, so there is always room.
        let room = (MAX_PACKET_LEN - self.framer.buffered()).min(READ_CHUNK_LEN);
        let mut chunk = [0u8; READ_CHUNK_LEN];
        let n = match self.connection.read(&mut chunk[..room]) {
            Ok(n) => n,
            Err(_) => {
                warn!("transport read failed");
                self.lose_transport();
                return Err(Error::ReadError);
            }
        };
        if n == 0 {
            return Ok(None);
        }

        trace!("read {=usize} bytes", n);
        self.framer.push(&chunk[..n])?;
        Ok(self.framer.next_frame()?.map(|frame| self.session.on_frame(frame)))
    }

    /// Current session state.
    pub fn state(&self) -> State {
        self.session.state()
    }

    /// Whether the broker accepted the session.
    pub fn is_connected(&self) -> bool {
        self.session.state() == State::Connected
    }

    /// The options this client was created with.
    pub fn options(&self) -> &Options<'a> {
        &self.options
    }

    /// The underlying transport.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// The underlying transport, mutably. Bytes written or consumed directly
    /// bypass the session.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Milliseconds until the next automatic PINGREQ, if the timer is armed.
    pub fn next_ping_in(&mut self) -> Option<u64> {
        let now = self.clock.now_millis();
        self.session.keep_alive().remaining(now)
    }

    /// Release the transport. Does not send DISCONNECT.
    pub fn close(self) -> Result<(), <C as Close>::Error> {
        self.connection.close()
    }

    fn send_tracked(&mut self, packet: &[u8]) -> Result<(), Error> {
        self.send(packet)?;
        let now = self.clock.now_millis();
        self.session.on_packet_sent(now);
        Ok(())
    }

    fn send(&mut self, packet: &[u8]) -> Result<(), Error> {
        if let Err(e) = write_all(&mut self.connection, packet) {
            warn!("transport write failed");
            self.lose_transport();
            return Err(e);
        }
        Ok(())
    }

    fn lose_transport(&mut self) {
        self.session.on_transport_lost();
        self.framer.clear();
    }
}

impl<C: Connection, K: Clock> core::fmt::Debug for Client<'_, C, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Client")
            .field("options", &self.options)
            .field("state", &self.session.state())
            .field("buffered", &self.framer.buffered())
            .finish()
    }
}

fn write_all<W: Write>(writer: &mut W, mut buf: &[u8]) -> Result<(), Error> {
    let mut stalls = 0;
    while !buf.is_empty() {
        match writer.write(buf).map_err(|_| Error::WriteError)? {
            0 => {
                stalls += 1;
                if stalls > MAX_WRITE_STALLS {
                    return Err(Error::ConnectionClosed);
                }
            }
            n => {
                stalls = 0;
                buf = &buf[n.min(buf.len())..];
            }
        }
    }
    writer.flush().map_err(|_| Error::WriteError)
}
