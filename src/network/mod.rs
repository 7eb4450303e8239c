//! A transport abstraction layer for embedded systems
//!
//! The protocol code in [`application`] never touches a socket directly. It is
//! written against the small set of traits below, which any byte-stream
//! transport can implement: a TCP socket, a modem UART, or a scripted mock in
//! tests.
//!
//! # Read semantics
//!
//! [`Read::read`] is expected to be non-blocking. `Ok(0)` means "nothing
//! available right now", not end of stream. A transport that detects the peer
//! closing the stream reports it as an error, which the MQTT client treats as
//! loss of the connection.

#![allow(async_fn_in_trait)]
#![deny(unsafe_code)]

/// Common error types for transport operations
pub mod error;

/// Application layer protocols built on the transport traits
pub mod application;

/// TCP transport over `std::net`
#[cfg(feature = "std")]
pub mod tcp;

/// Re-exports of common traits
pub mod prelude {
    #[cfg(feature = "async")]
    pub use super::{AsyncClose, AsyncConnect, AsyncConnection, AsyncRead, AsyncWrite};
    pub use super::{Close, Connect, Connection, Read, Write};
}

/// Reading half of a byte stream.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read whatever is available into `buf`, returning `Ok(0)` when nothing is pending
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Writing half of a byte stream.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write some prefix of `buf`, returning how many bytes were accepted
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Releases a transport.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous duplex connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector that dials a remote `host:port`
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}

/// Asynchronous reading half of a byte stream.
#[cfg(feature = "async")]
pub trait AsyncRead {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection asynchronously
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Asynchronous writing half of a byte stream.
#[cfg(feature = "async")]
pub trait AsyncWrite {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection asynchronously
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer asynchronously
    async fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Asynchronously releases a transport.
#[cfg(feature = "async")]
pub trait AsyncClose {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection asynchronously
    async fn close(self) -> Result<(), Self::Error>;
}

/// An asynchronous duplex connection
#[cfg(feature = "async")]
pub trait AsyncConnection: AsyncRead + AsyncWrite + AsyncClose {}

/// An asynchronous connector that dials a remote `host:port`
#[cfg(feature = "async")]
pub trait AsyncConnect {
    /// Associated connection type
    type Connection: AsyncConnection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection asynchronously
    async fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}
