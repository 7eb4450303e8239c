//! Errors produced by the MQTT codec and client.

use super::packet::ConnectReturnCode;

/// An error from the MQTT layer.
///
/// Codec errors (`MalformedRemainingLength`, `Incomplete`, ...) are local to
/// the decode or build call that produced them and never change session
/// state. Transport failures are collapsed into `WriteError` / `ReadError`
/// because transports are free to choose their own error types.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A remaining-length field used more than four continuation groups.
    MalformedRemainingLength,
    /// A value above 268,435,455 cannot be encoded as a remaining length.
    RemainingLengthTooLarge,
    /// The input ended before a complete field could be decoded.
    Incomplete,
    /// A header carried one of the reserved type codes 0 or 15.
    UnknownPacketType,
    /// A frame of a different type than the caller expected.
    UnexpectedPacket,
    /// The operation needs an established session.
    NotConnected,
    /// `connect` was called while a session is already open or opening.
    AlreadyConnected,
    /// A string contained a character outside the 8-bit (Latin-1) range.
    UnsupportedCharacter,
    /// A string is longer than its length prefix allows.
    StringTooLong,
    /// A packet or inbound frame does not fit the fixed-size buffer.
    BufferOverflow,
    /// The broker answered CONNECT with a non-zero return code.
    ConnectionRefused(ConnectReturnCode),
    /// No CONNACK arrived before the handshake deadline.
    HandshakeTimeout,
    /// The broker address does not fit the address buffer.
    InvalidAddress,
    /// A configuration document could not be parsed.
    InvalidConfig,
    /// The connector failed to open a transport.
    ConnectFailed,
    /// Writing to the transport failed.
    WriteError,
    /// Reading from the transport failed.
    ReadError,
    /// The transport stopped accepting bytes.
    ConnectionClosed,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MalformedRemainingLength => f.write_str("malformed remaining length"),
            Error::RemainingLengthTooLarge => f.write_str("remaining length exceeds 268435455"),
            Error::Incomplete => f.write_str("incomplete packet"),
            Error::UnknownPacketType => f.write_str("unknown control packet type"),
            Error::UnexpectedPacket => f.write_str("unexpected control packet"),
            Error::NotConnected => f.write_str("not connected"),
            Error::AlreadyConnected => f.write_str("already connected"),
            Error::UnsupportedCharacter => f.write_str("character outside the 8-bit range"),
            Error::StringTooLong => f.write_str("string too long"),
            Error::BufferOverflow => f.write_str("packet buffer overflow"),
            Error::ConnectionRefused(code) => {
                write!(f, "connection refused by broker (code {})", code.as_byte())
            }
            Error::HandshakeTimeout => f.write_str("timed out waiting for CONNACK"),
            Error::InvalidAddress => f.write_str("invalid broker address"),
            Error::InvalidConfig => f.write_str("invalid client configuration"),
            Error::ConnectFailed => f.write_str("failed to open transport"),
            Error::WriteError => f.write_str("transport write failed"),
            Error::ReadError => f.write_str("transport read failed"),
            Error::ConnectionClosed => f.write_str("transport closed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::MalformedRemainingLength => defmt::write!(f, "MalformedRemainingLength"),
            Error::RemainingLengthTooLarge => defmt::write!(f, "RemainingLengthTooLarge"),
            Error::Incomplete => defmt::write!(f, "Incomplete"),
            Error::UnknownPacketType => defmt::write!(f, "UnknownPacketType"),
            Error::UnexpectedPacket => defmt::write!(f, "UnexpectedPacket"),
            Error::NotConnected => defmt::write!(f, "NotConnected"),
            Error::AlreadyConnected => defmt::write!(f, "AlreadyConnected"),
            Error::UnsupportedCharacter => defmt::write!(f, "UnsupportedCharacter"),
            Error::StringTooLong => defmt::write!(f, "StringTooLong"),
            Error::BufferOverflow => defmt::write!(f, "BufferOverflow"),
            Error::ConnectionRefused(code) => {
                defmt::write!(f, "ConnectionRefused({=u8})", code.as_byte())
            }
            Error::HandshakeTimeout => defmt::write!(f, "HandshakeTimeout"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::InvalidConfig => defmt::write!(f, "InvalidConfig"),
            Error::ConnectFailed => defmt::write!(f, "ConnectFailed"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
        }
    }
}
