//! # libmqisdp - MQTT v3.1 client for any stream transport
//!
//! A small client-side implementation of the MQTT v3.1 ("MQIsdp")
//! publish/subscribe protocol. The crate is built around three pieces:
//!
//! - a binary control-packet codec (fixed header, remaining-length varint,
//!   variable headers and payloads),
//! - a sans-I/O session state machine covering the CONNECT/CONNACK handshake,
//!   packet identifiers and the keepalive timer,
//! - a [`Client`](network::application::mqtt::Client) that drives both over any
//!   type implementing the [`Connection`](network::Connection) traits.
//!
//! The library is designed for embedded systems and supports `no_std`
//! environments. All buffers are fixed-size `heapless` containers.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! libmqisdp = "0.1.0"
//! ```
//!
//! ### Publishing from a connected client
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
//! let options = Options::new("myMQTT-42");
//! let mut client = Client::new(MockConnection, options, Ticks(0));
//!
//! // client.connect(|client| {
//! //     client.subscribe("random/")?;
//! //     client.publish("random/", br#"{"temperature":74}"#)
//! // })?;
//! ```
//!
//! ## Optional Features
//!
//! - `std`: TCP transport adapters over `std::net` and a `std::time` clock
//! - `async`: async transport traits and an async client
//! - `defmt`: defmt logging of packets, state transitions and keepalive pings

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Transport traits and the MQTT protocol implementation built on them.
///
/// The traits describe a duplex byte stream; the `application` layer holds the
/// MQTT codec, session state machine and clients.
pub mod network;
