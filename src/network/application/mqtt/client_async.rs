//! Async MQTT v3.1 client.
//!
//! Same protocol rules as [`Client`](super::Client), driven over an
//! [`AsyncConnection`]. The session state machine, framer and builders are
//! shared with the blocking client; only the transport calls are awaited.
//!
//! Timers are still checked from [`AsyncClient::poll`]. A transport whose
//! `read` waits for data indefinitely will delay keepalive pings, so
//! transports should return `Ok(0)` (or time out) when idle.

use super::client::{MAX_WRITE_STALLS, READ_CHUNK_LEN};
use super::error::Error;
use super::framer::Framer;
use super::keepalive::Clock;
use super::options::Options;
use super::packet::{
    MAX_PACKET_LEN, build_connect, build_disconnect, build_pingreq, build_publish,
    build_subscribe, build_unsubscribe,
};
use super::session::{Event, Session, State, Timeout};
use crate::network::{AsyncClose, AsyncConnect, AsyncConnection, AsyncRead, AsyncWrite};

/// An MQTT v3.1 client over an [`AsyncConnection`].
pub struct AsyncClient<'a, C: AsyncConnection, K: Clock> {
    connection: C,
    options: Options<'a>,
    clock: K,
    session: Session,
    framer: Framer,
}

impl<'a, C: AsyncConnection, K: Clock> AsyncClient<'a, C, K> {
    /// Wrap an already open transport.
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
    pub async fn open<T>(connector: &mut T, options: Options<'a>, clock: K) -> Result<Self, Error>
    where
        T: AsyncConnect<Connection = C>,
    {
        let remote = options.remote()?;
        debug!("dialing {=str}", remote.as_str());
        let connection = connector
            .connect(&remote)
            .await
            .map_err(|_| Error::ConnectFailed)?;
        Ok(Self::new(connection, options, clock))
    }

    /// Send CONNECT and wait for the broker's answer.
    ///
    /// Resolves once the session is [`State::Connected`]. Packets other than
    /// CONNACK received during the handshake are dropped.
    ///
    /// # Errors
    ///
    /// Same as [`Client::connect`](super::Client::connect).
    pub async fn connect(&mut self) -> Result<(), Error> {
        self.begin_connect().await?;
        loop {
            match self.poll().await? {
                Some(Event::Connected) => return Ok(()),
                Some(Event::ConnectionRefused(code)) => return Err(Error::ConnectionRefused(code)),
                Some(Event::HandshakeTimedOut) => return Err(Error::HandshakeTimeout),
                Some(Event::Packet(inbound)) => {
                    debug!("dropping {} received before CONNACK", inbound.packet_type);
                }
                Some(Event::PingSent) | None => {}
            }
        }
    }

    /// Send CONNECT without waiting for CONNACK.
    pub async fn begin_connect(&mut self) -> Result<(), Error> {
        self.session.ensure_can_connect()?;
        let packet = build_connect(
            self.options.client_id,
            self.options.keep_alive_seconds,
            self.options.clean_session,
        )?;

        self.framer.clear();
        self.send(&packet).await?;
        let now = self.clock.now_millis();
        self.session.on_connect_sent(now);
        info!("CONNECT sent as {=str}", self.options.client_id);
        Ok(())
    }

    /// Publish `payload` on `topic` at QoS 0.
    pub async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Error> {
        self.session.ensure_connected()?;
        let packet = build_publish(topic, payload)?;
        self.send_tracked(&packet).await
    }

    /// Subscribe to `topic` at QoS 0, returning the packet identifier used.
    pub async fn subscribe(&mut self, topic: &str) -> Result<u16, Error> {
        self.session.ensure_connected()?;
        let packet_id = self.session.next_packet_id();
        let packet = build_subscribe(packet_id, topic)?;
        self.send_tracked(&packet).await?;
        Ok(packet_id)
    }

    /// Unsubscribe from `topic`, returning the packet identifier used.
    pub async fn unsubscribe(&mut self, topic: &str) -> Result<u16, Error> {
        self.session.ensure_connected()?;
        let packet_id = self.session.next_packet_id();
        let packet = build_unsubscribe(packet_id, topic)?;
        self.send_tracked(&packet).await?;
        Ok(packet_id)
    }

    /// Send a PINGREQ. Does not push the keepalive deadline back.
    pub async fn ping(&mut self) -> Result<(), Error> {
        self.session.ensure_connected()?;
        self.send(&build_pingreq()).await
    }

    /// Send DISCONNECT and stop the keepalive timer.
    pub async fn disconnect(&mut self) -> Result<(), Error> {
        if self.session.state() == State::Disconnected {
            return Err(Error::NotConnected);
        }
        let result = self.send(&build_disconnect()).await;
        self.session.on_disconnect();
        self.framer.clear();
        result
    }

    /// Drive the session once. See [`Client::poll`](super::Client::poll).
    pub async fn poll(&mut self) -> Result<Option<Event>, Error> {
        let now = self.clock.now_millis();
        match self.session.poll_timers(now) {
            Some(Timeout::KeepAlive) => {
                self.ping().await?;
                return Ok(Some(Event::PingSent));
            }
            Some(Timeout::Handshake) => return Ok(Some(Event::HandshakeTimedOut)),
            None => {}
        }

        if let Some(frame) = self.framer.next_frame()? {
            return Ok(Some(self.session.on_frame(frame)));
        }

        let room = (MAX_PACKET_LEN - self.framer.buffered()).min(READ_CHUNK_LEN);
        let mut chunk = [0u8; READ_CHUNK_LEN];
        let n = match self.connection.read(&mut chunk[..room]).await {
            Ok(n) => n,
            Err(_) => {
                warn!("transport read failed");
                self.session.on_transport_lost();
                self.framer.clear();
                return Err(Error::ReadError);
            }
        };
        if n == 0 {
            return Ok(None);
        }

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

    /// Release the transport. Does not send DISCONNECT.
    pub async fn close(self) -> Result<(), <C as AsyncClose>::Error> {
        self.connection.close().await
    }

    async fn send_tracked(&mut self, packet: &[u8]) -> Result<(), Error> {
        self.send(packet).await?;
        let now = self.clock.now_millis();
        self.session.on_packet_sent(now);
        Ok(())
    }

    async fn send(&mut self, packet: &[u8]) -> Result<(), Error> {
        if let Err(e) = write_all(&mut self.connection, packet).await {
            warn!("transport write failed");
            self.session.on_transport_lost();
            self.framer.clear();
            return Err(e);
        }
        Ok(())
    }
}

impl<C: AsyncConnection, K: Clock> core::fmt::Debug for AsyncClient<'_, C, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AsyncClient")
            .field("options", &self.options)
            .field("state", &self.session.state())
            .finish()
    }
}

async fn write_all<W: AsyncWrite>(writer: &mut W, mut buf: &[u8]) -> Result<(), Error> {
    let mut stalls = 0;
    while !buf.is_empty() {
        match writer.write(buf).await.map_err(|_| Error::WriteError)? {
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
    writer.flush().await.map_err(|_| Error::WriteError)
}
