//! # Application Layer Protocols
//!
//! Protocol clients written against the transport traits in
//! [`network`](crate::network). They never open sockets themselves: the caller
//! hands over a [`Connection`](crate::network::Connection) (or a
//! [`Connect`](crate::network::Connect) implementation to dial one) and the
//! client drives it.
//!
//! ## Available Protocols
//!
//! - **[`mqtt`]**: MQTT v3.1 (MQIsdp) client for publish-subscribe messaging
//!
//! ## Usage Pattern
//!
//! 1. Create a connection using your transport layer
//! 2. Wrap it with the protocol client
//! 3. Use protocol-specific methods for communication
//!
//! ```rust,no_run
//! use libmqisdp::network::application::mqtt::{Client, Clock, Options};
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
//!
//! // 1. Create connection (implementation-specific)
//! let connection = MockConnection;
//!
//! // 2. Wrap with protocol client
//! let mut client = Client::new(connection, Options::new("sensor-01"), Ticks(0));
//!
//! // 3. Use protocol methods
//! // client.connect(|c| c.publish("status", b"online"))?;
//! ```

/// MQTT client implementation.
///
/// Provides an MQTT v3.1 client for lightweight publish-subscribe messaging,
/// together with the packet codec and session state machine it is built on.
pub mod mqtt;
