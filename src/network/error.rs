//! Common error types for transport operations

/// Errors reported by a transport.
///
/// Transports may use any `Debug` error type; this one is provided for the
/// bundled TCP adapter and for test doubles. It is small and `Copy` so it can
/// be passed around freely in `no_std` code.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on a connection that is not open.
    NotOpen,
    /// A connection attempt was refused by the remote host.
    ConnectionRefused,
    /// The peer closed the stream.
    ConnectionClosed,
    /// The operation did not complete in time.
    Timeout,
    /// The remote address could not be parsed or resolved.
    InvalidAddress,
    /// Any other I/O failure while reading or writing.
    Io,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::NotOpen => "connection is not open",
            Error::ConnectionRefused => "connection refused",
            Error::ConnectionClosed => "connection closed by peer",
            Error::Timeout => "operation timed out",
            Error::InvalidAddress => "invalid remote address",
            Error::Io => "i/o error",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::ConnectionRefused => Error::ConnectionRefused,
            ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof => Error::ConnectionClosed,
            ErrorKind::NotConnected => Error::NotOpen,
            ErrorKind::TimedOut | ErrorKind::WouldBlock => Error::Timeout,
            ErrorKind::InvalidInput | ErrorKind::AddrNotAvailable => Error::InvalidAddress,
            _ => Error::Io,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotOpen => defmt::write!(f, "NotOpen"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::Io => defmt::write!(f, "Io"),
        }
    }
}
