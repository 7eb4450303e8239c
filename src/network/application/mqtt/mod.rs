//! MQTT v3.1 (MQIsdp) protocol implementation for embedded systems.
//!
//! This module provides a small MQTT v3.1 client designed for `no_std`
//! environments. It speaks protocol name `"MQIsdp"`, protocol level 3, and
//! QoS 0 only.
//!
//! # Layers
//!
//! - [`varint`]: the remaining-length integer of the fixed header
//! - [`packet`]: pure builders for CONNECT, PUBLISH, SUBSCRIBE, UNSUBSCRIBE,
//!   PINGREQ and DISCONNECT, plus the fixed-header model
//! - [`dispatch`]: classification of inbound packets by type code
//! - [`framer`]: reassembly of inbound chunks into whole packets
//! - [`session`]: the connection state machine (handshake, packet ids,
//!   keepalive and CONNACK deadline)
//! - [`Client`] (and `AsyncClient` with the `async` feature): the session
//!   driven over a transport
//!
//! # Usage
//!
//! With the `std` feature, over TCP:
//!
//! ```rust,ignore
//! use libmqisdp::network::application::mqtt::{Client, Event, Options, StdClock};
//! use libmqisdp::network::tcp::TcpConnector;
//!
//! # fn main() -> Result<(), libmqisdp::network::application::mqtt::Error> {
//! let options = Options::new("myMQTT-7");
//! let mut client = Client::open(&mut TcpConnector, options, StdClock::new())?;
//!
//! client.connect(|client| {
//!     client.subscribe("random/")?;
//!     client.publish("random/", br#"{"temperature":74}"#)
//! })?;
//!
//! while let Some(event) = client.poll()? {
//!     if let Event::Packet(inbound) = event {
//!         let _ = inbound.packet_type;
//!     }
//! }
//! client.disconnect()?;
//! # Ok(())
//! # }
//! ```

/// Blocking client.
pub mod client;
/// Async client.
#[cfg(feature = "async")]
pub mod client_async;
/// Packet classification.
pub mod dispatch;
/// Error type of the MQTT layer.
pub mod error;
/// Inbound stream reassembly.
pub mod framer;
/// Keepalive timer and clock abstraction.
pub mod keepalive;
/// Client configuration.
pub mod options;
/// Control packet model and builders.
pub mod packet;
/// Session state machine.
pub mod session;
/// Remaining-length codec.
pub mod varint;

pub use client::Client;
#[cfg(feature = "async")]
pub use client_async::AsyncClient;
pub use dispatch::classify;
pub use error::Error;
pub use framer::Framer;
#[cfg(feature = "std")]
pub use keepalive::StdClock;
pub use keepalive::{Clock, KeepAlive};
pub use options::{Options, default_client_id};
pub use packet::{
    ConnectReturnCode, ControlPacketType, FixedHeader, PacketBuf, build_connect, build_disconnect,
    build_pingreq, build_publish, build_subscribe, build_unsubscribe,
};
pub use session::{Event, Inbound, State};
