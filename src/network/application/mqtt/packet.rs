//! Control packet model and the outbound packet builders.
//!
//! Every builder is a pure function: it takes plain values and returns a
//! ready-to-transmit [`PacketBuf`] laid out as
//! `[header byte, remaining length..., variable header..., payload...]`.
//! Nothing here performs I/O or keeps state.
//!
//! # Wire format notes
//!
//! The client speaks the MQTT v3.1 dialect (`"MQIsdp"`, level 3). Outbound
//! packets always carry zero header flags: PUBLISH is QoS 0 without DUP or
//! RETAIN, and SUBSCRIBE/UNSUBSCRIBE are sent with a `0x80`/`0xA0` header.
//!
//! Strings are encoded one byte per character and only characters up to
//! U+00FF are accepted (see [`encode_latin1`]).

use super::error::Error;
use super::varint;
use heapless::Vec;

/// Capacity of a single outbound or inbound packet buffer.
pub const MAX_PACKET_LEN: usize = 2048;

/// A fixed-capacity buffer holding one encoded control packet.
pub type PacketBuf = Vec<u8, MAX_PACKET_LEN>;

/// Protocol name sent in CONNECT.
pub const PROTOCOL_NAME: &str = "MQIsdp";
/// Protocol level sent in CONNECT.
pub const PROTOCOL_LEVEL: u8 = 3;
/// Connect flag requesting a clean session.
pub const CLEAN_SESSION_FLAG: u8 = 0x02;
/// Longest client identifier the one-byte length field can describe.
pub const MAX_CLIENT_ID_LEN: usize = 255;
/// Requested QoS appended to every subscription.
const SUBSCRIBE_QOS: u8 = 0x00;

/// The fourteen MQTT control packet types.
///
/// The discriminant is the 4-bit code stored in the high nibble of the first
/// header byte.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ControlPacketType {
    /// Client request to connect to a broker.
    Connect = 1,
    /// Connect acknowledgment.
    Connack = 2,
    /// Publish message.
    Publish = 3,
    /// Publish acknowledgment (QoS 1).
    Puback = 4,
    /// Publish received (QoS 2, part 1).
    Pubrec = 5,
    /// Publish release (QoS 2, part 2).
    Pubrel = 6,
    /// Publish complete (QoS 2, part 3).
    Pubcomp = 7,
    /// Subscribe request.
    Subscribe = 8,
    /// Subscribe acknowledgment.
    Suback = 9,
    /// Unsubscribe request.
    Unsubscribe = 10,
    /// Unsubscribe acknowledgment.
    Unsuback = 11,
    /// Keepalive ping request.
    Pingreq = 12,
    /// Keepalive ping response.
    Pingresp = 13,
    /// Client is disconnecting.
    Disconnect = 14,
}

impl ControlPacketType {
    /// Type table in code order, used for lookups.
    pub const ALL: [ControlPacketType; 14] = [
        ControlPacketType::Connect,
        ControlPacketType::Connack,
        ControlPacketType::Publish,
        ControlPacketType::Puback,
        ControlPacketType::Pubrec,
        ControlPacketType::Pubrel,
        ControlPacketType::Pubcomp,
        ControlPacketType::Subscribe,
        ControlPacketType::Suback,
        ControlPacketType::Unsubscribe,
        ControlPacketType::Unsuback,
        ControlPacketType::Pingreq,
        ControlPacketType::Pingresp,
        ControlPacketType::Disconnect,
    ];

    /// The 4-bit type code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The first header byte with all flags cleared.
    pub const fn header_byte(self) -> u8 {
        (self as u8) << 4
    }

    /// Look up a type by its 4-bit code. Codes 0 and 15 are reserved.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Upper-case protocol name, for logs.
    pub const fn name(self) -> &'static str {
        match self {
            ControlPacketType::Connect => "CONNECT",
            ControlPacketType::Connack => "CONNACK",
            ControlPacketType::Publish => "PUBLISH",
            ControlPacketType::Puback => "PUBACK",
            ControlPacketType::Pubrec => "PUBREC",
            ControlPacketType::Pubrel => "PUBREL",
            ControlPacketType::Pubcomp => "PUBCOMP",
            ControlPacketType::Subscribe => "SUBSCRIBE",
            ControlPacketType::Suback => "SUBACK",
            ControlPacketType::Unsubscribe => "UNSUBSCRIBE",
            ControlPacketType::Unsuback => "UNSUBACK",
            ControlPacketType::Pingreq => "PINGREQ",
            ControlPacketType::Pingresp => "PINGRESP",
            ControlPacketType::Disconnect => "DISCONNECT",
        }
    }
}

/// The fixed header that starts every control packet.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixedHeader {
    /// Packet type, stored in the high nibble of byte 0.
    pub packet_type: ControlPacketType,
    /// Flags, stored in the low nibble of byte 0.
    pub flags: u8,
    /// Number of bytes following the header.
    pub remaining_length: u32,
}

impl FixedHeader {
    /// A header with zero flags.
    pub const fn new(packet_type: ControlPacketType, remaining_length: u32) -> Self {
        Self {
            packet_type,
            flags: 0,
            remaining_length,
        }
    }

    /// Append the encoded header to `out`.
    pub fn encode<const N: usize>(&self, out: &mut Vec<u8, N>) -> Result<(), Error> {
        let length = varint::encode_remaining_length(self.remaining_length)?;
        out.push(self.packet_type.header_byte() | (self.flags & 0x0F))
            .map_err(|_| Error::BufferOverflow)?;
        out.extend_from_slice(&length)
            .map_err(|_| Error::BufferOverflow)
    }

    /// Decode a header from the start of `bytes`.
    ///
    /// Returns the header and its encoded length in bytes.
    ///
    /// # Errors
    ///
    /// * [`Error::Incomplete`] - `bytes` ends inside the header
    /// * [`Error::MalformedRemainingLength`] - the length field is garbled
    /// * [`Error::UnknownPacketType`] - the type code is reserved
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), Error> {
        let first = *bytes.first().ok_or(Error::Incomplete)?;
        let packet_type =
            ControlPacketType::from_code(first >> 4).ok_or(Error::UnknownPacketType)?;
        let (remaining_length, length_len) = varint::decode_remaining_length(bytes, 1)?;
        Ok((
            Self {
                packet_type,
                flags: first & 0x0F,
                remaining_length,
            },
            1 + length_len,
        ))
    }

    /// Encoded size of this header.
    pub const fn encoded_len(&self) -> usize {
        1 + varint::remaining_length_len(self.remaining_length)
    }
}

/// Return code carried by a CONNACK packet.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectReturnCode {
    /// Connection accepted.
    Accepted,
    /// The broker does not support protocol level 3.
    UnacceptableProtocolVersion,
    /// The client identifier was rejected.
    IdentifierRejected,
    /// The broker is unavailable.
    ServerUnavailable,
    /// Bad user name or password.
    BadUserNameOrPassword,
    /// The client is not authorised to connect.
    NotAuthorized,
    /// A code the protocol reserves for future use.
    Reserved(u8),
}

impl ConnectReturnCode {
    /// Decode a return code byte.
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => ConnectReturnCode::Accepted,
            0x01 => ConnectReturnCode::UnacceptableProtocolVersion,
            0x02 => ConnectReturnCode::IdentifierRejected,
            0x03 => ConnectReturnCode::ServerUnavailable,
            0x04 => ConnectReturnCode::BadUserNameOrPassword,
            0x05 => ConnectReturnCode::NotAuthorized,
            other => ConnectReturnCode::Reserved(other),
        }
    }

    /// The byte on the wire.
    pub const fn as_byte(self) -> u8 {
        match self {
            ConnectReturnCode::Accepted => 0x00,
            ConnectReturnCode::UnacceptableProtocolVersion => 0x01,
            ConnectReturnCode::IdentifierRejected => 0x02,
            ConnectReturnCode::ServerUnavailable => 0x03,
            ConnectReturnCode::BadUserNameOrPassword => 0x04,
            ConnectReturnCode::NotAuthorized => 0x05,
            ConnectReturnCode::Reserved(other) => other,
        }
    }
}

/// Read the return code out of a complete CONNACK frame.
///
/// # Errors
///
/// * [`Error::UnexpectedPacket`] - the frame is not a CONNACK
/// * [`Error::Incomplete`] - the frame is shorter than its variable header
pub fn connack_return_code(frame: &[u8]) -> Result<ConnectReturnCode, Error> {
    let (header, header_len) = FixedHeader::decode(frame)?;
    if header.packet_type != ControlPacketType::Connack {
        return Err(Error::UnexpectedPacket);
    }
    // Variable header: acknowledge flags, then the return code.
    let code = *frame.get(header_len + 1).ok_or(Error::Incomplete)?;
    Ok(ConnectReturnCode::from_byte(code))
}

/// Number of bytes `text` occupies once encoded with [`encode_latin1`].
pub fn latin1_len(text: &str) -> usize {
    text.chars().count()
}

/// Append `text` to `out`, one byte per character.
///
/// Only code points up to U+00FF (ASCII plus Latin-1) can be represented.
/// Anything above is rejected instead of being silently truncated.
///
/// # Errors
///
/// * [`Error::UnsupportedCharacter`] - a character above U+00FF
/// * [`Error::BufferOverflow`] - `out` is full
///
/// # Examples
///
/// ```rust
/// use libmqisdp::network::application::mqtt::packet::{encode_latin1, PacketBuf};
/// use libmqisdp::network::application::mqtt::Error;
///
/// let mut out = PacketBuf::new();
/// encode_latin1("caf\u{e9}", &mut out).unwrap();
/// assert_eq!(&out[..], b"caf\xe9");
///
/// assert_eq!(encode_latin1("\u{304a}", &mut out), Err(Error::UnsupportedCharacter));
/// ```
pub fn encode_latin1<const N: usize>(text: &str, out: &mut Vec<u8, N>) -> Result<(), Error> {
    for c in text.chars() {
        let byte = u8::try_from(u32::from(c)).map_err(|_| Error::UnsupportedCharacter)?;
        out.push(byte).map_err(|_| Error::BufferOverflow)?;
    }
    Ok(())
}

/// Append a 2-byte length prefix followed by the Latin-1 bytes of `text`.
fn encode_string(text: &str, out: &mut PacketBuf) -> Result<(), Error> {
    let len = u16::try_from(latin1_len(text)).map_err(|_| Error::StringTooLong)?;
    out.extend_from_slice(&len.to_be_bytes())
        .map_err(|_| Error::BufferOverflow)?;
    encode_latin1(text, out)
}

/// Start a packet by writing its fixed header.
fn start_packet(packet_type: ControlPacketType, remaining_length: usize) -> Result<PacketBuf, Error> {
    let remaining_length =
        u32::try_from(remaining_length).map_err(|_| Error::RemainingLengthTooLarge)?;
    let header = FixedHeader::new(packet_type, remaining_length);
    if header.encoded_len() + remaining_length as usize > MAX_PACKET_LEN {
        return Err(Error::BufferOverflow);
    }

    let mut packet = PacketBuf::new();
    header.encode(&mut packet)?;
    Ok(packet)
}

/// Build a CONNECT packet.
///
/// Layout: `0x10`, remaining length, `0x00 0x06 "MQIsdp"`, protocol level 3,
/// connect flags, 2-byte keep-alive, a zero byte, the client-id length byte
/// and the client-id. The total size is `16 + client_id.len()`.
///
/// # Errors
///
/// * [`Error::StringTooLong`] - the client id is longer than 255 characters
/// * [`Error::UnsupportedCharacter`] - the client id is not Latin-1
///
/// # Examples
///
/// ```rust
/// use libmqisdp::network::application::mqtt::packet::build_connect;
///
/// let packet = build_connect("myMQTT-7", 15, true).unwrap();
/// assert_eq!(packet.len(), 16 + 8);
/// assert_eq!(&packet[12..14], &[0x00, 0x0F]);
/// ```
pub fn build_connect(
    client_id: &str,
    keep_alive_seconds: u16,
    clean_session: bool,
) -> Result<PacketBuf, Error> {
    let id_len = latin1_len(client_id);
    if id_len > MAX_CLIENT_ID_LEN {
        return Err(Error::StringTooLong);
    }

    let remaining_length = 8 + PROTOCOL_NAME.len() + id_len;
    let mut packet = start_packet(ControlPacketType::Connect, remaining_length)?;

    // --- Variable Header ---
    encode_string(PROTOCOL_NAME, &mut packet)?;
    let flags = if clean_session { CLEAN_SESSION_FLAG } else { 0x00 };
    let mut fields: Vec<u8, 6> = Vec::new();
    fields
        .extend_from_slice(&[PROTOCOL_LEVEL, flags])
        .map_err(|_| Error::BufferOverflow)?;
    fields
        .extend_from_slice(&keep_alive_seconds.to_be_bytes())
        .map_err(|_| Error::BufferOverflow)?;
    // One reserved zero byte, then a single length byte for the identifier.
    fields
        .extend_from_slice(&[0x00, id_len as u8])
        .map_err(|_| Error::BufferOverflow)?;
    packet
        .extend_from_slice(&fields)
        .map_err(|_| Error::BufferOverflow)?;

    // --- Payload ---
    encode_latin1(client_id, &mut packet)?;
    Ok(packet)
}

/// Build a QoS 0 PUBLISH packet.
///
/// The topic is length-prefixed and Latin-1 encoded; the payload is copied
/// verbatim.
pub fn build_publish(topic: &str, payload: &[u8]) -> Result<PacketBuf, Error> {
    let remaining_length = 2 + latin1_len(topic) + payload.len();
    let mut packet = start_packet(ControlPacketType::Publish, remaining_length)?;

    encode_string(topic, &mut packet)?;
    packet
        .extend_from_slice(payload)
        .map_err(|_| Error::BufferOverflow)?;
    Ok(packet)
}

/// Build a SUBSCRIBE packet for a single topic filter at QoS 0.
///
/// # Examples
///
/// ```rust
/// use libmqisdp::network::application::mqtt::packet::build_subscribe;
///
/// let packet = build_subscribe(0x000A, "random/").unwrap();
/// assert_eq!(&packet[..6], &[0x80, 0x0C, 0x00, 0x0A, 0x00, 0x07]);
/// assert_eq!(&packet[6..13], b"random/");
/// assert_eq!(packet[13], 0x00);
/// ```
pub fn build_subscribe(packet_id: u16, topic: &str) -> Result<PacketBuf, Error> {
    let remaining_length = 2 + 2 + latin1_len(topic) + 1;
    let mut packet = start_packet(ControlPacketType::Subscribe, remaining_length)?;

    packet
        .extend_from_slice(&packet_id.to_be_bytes())
        .map_err(|_| Error::BufferOverflow)?;
    encode_string(topic, &mut packet)?;
    packet.push(SUBSCRIBE_QOS).map_err(|_| Error::BufferOverflow)?;
    Ok(packet)
}

/// Build an UNSUBSCRIBE packet for a single topic filter.
pub fn build_unsubscribe(packet_id: u16, topic: &str) -> Result<PacketBuf, Error> {
    let remaining_length = 2 + 2 + latin1_len(topic);
    let mut packet = start_packet(ControlPacketType::Unsubscribe, remaining_length)?;

    packet
        .extend_from_slice(&packet_id.to_be_bytes())
        .map_err(|_| Error::BufferOverflow)?;
    encode_string(topic, &mut packet)?;
    Ok(packet)
}

/// Build a PINGREQ packet: `[0xC0, 0x00]`.
pub fn build_pingreq() -> PacketBuf {
    header_only(ControlPacketType::Pingreq)
}

/// Build a DISCONNECT packet: `[0xE0, 0x00]`.
pub fn build_disconnect() -> PacketBuf {
    header_only(ControlPacketType::Disconnect)
}

fn header_only(packet_type: ControlPacketType) -> PacketBuf {
    let mut packet = PacketBuf::new();
    // Two bytes always fit.
    let _ = packet.extend_from_slice(&[packet_type.header_byte(), 0x00]);
    packet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes() {
        assert_eq!(ControlPacketType::Connect.header_byte(), 0x10);
        assert_eq!(ControlPacketType::Subscribe.header_byte(), 0x80);
        assert_eq!(ControlPacketType::Pingreq.header_byte(), 0xC0);
        assert_eq!(ControlPacketType::Disconnect.header_byte(), 0xE0);
        assert_eq!(ControlPacketType::from_code(0), None);
        assert_eq!(ControlPacketType::from_code(15), None);
        for t in ControlPacketType::ALL {
            assert_eq!(ControlPacketType::from_code(t.code()), Some(t));
        }
    }

    #[test]
    fn test_connect_layout() {
        let packet = build_connect("myMQTT-7", 15, true).unwrap();
        assert_eq!(packet.len(), 16 + "myMQTT-7".len());
        assert_eq!(packet[0], 0x10);
        assert_eq!(packet[1] as usize, 8 + PROTOCOL_NAME.len() + 8);
        assert_eq!(&packet[2..4], &[0x00, 0x06]);
        assert_eq!(&packet[4..10], b"MQIsdp");
        assert_eq!(packet[10], 3);
        assert_eq!(packet[11], 0x02);
        assert_eq!(&packet[12..14], &[0x00, 0x0F]);
        assert_eq!(&packet[14..16], &[0x00, 0x08]);
        assert_eq!(&packet[16..], b"myMQTT-7");
    }

    #[test]
    fn test_connect_without_clean_session() {
        let packet = build_connect("id", 60, false).unwrap();
        assert_eq!(packet[11], 0x00);
        assert_eq!(&packet[12..14], &[0x00, 60]);
    }

    #[test]
    fn test_connect_rejects_long_client_id() {
        let id: heapless::String<300> = core::iter::repeat('a').take(256).collect();
        assert_eq!(build_connect(&id, 15, true), Err(Error::StringTooLong));

        let id: heapless::String<300> = core::iter::repeat('a').take(255).collect();
        let packet = build_connect(&id, 15, true).unwrap();
        // Two remaining-length bytes shift the client-id length byte to index 16.
        assert_eq!(packet.len(), 3 + 14 + 255);
        assert_eq!(&packet[15..17], &[0x00, 255]);
    }

    #[test]
    fn test_publish_layout() {
        let packet = build_publish("random/", b"{\"a\":1}").unwrap();
        assert_eq!(packet[0], 0x30);
        assert_eq!(packet[1] as usize, 2 + 7 + 7);
        assert_eq!(&packet[2..4], &[0x00, 0x07]);
        assert_eq!(&packet[4..11], b"random/");
        assert_eq!(&packet[11..], b"{\"a\":1}");
    }

    #[test]
    fn test_publish_uses_multi_byte_remaining_length() {
        let payload = [0x55u8; 200];
        let packet = build_publish("t", &payload).unwrap();
        let (header, header_len) = FixedHeader::decode(&packet).unwrap();
        assert_eq!(header.packet_type, ControlPacketType::Publish);
        assert_eq!(header.remaining_length, 2 + 1 + 200);
        assert_eq!(header_len, 3);
        assert_eq!(packet.len(), header_len + 203);
    }

    #[test]
    fn test_publish_rejects_wide_characters() {
        assert_eq!(
            build_publish("\u{304a}\u{306f}", b"x"),
            Err(Error::UnsupportedCharacter)
        );
    }

    #[test]
    fn test_publish_too_large_for_buffer() {
        let payload = [0u8; MAX_PACKET_LEN];
        assert_eq!(build_publish("t", &payload), Err(Error::BufferOverflow));
    }

    #[test]
    fn test_subscribe_layout() {
        let packet = build_subscribe(0x000A, "random/").unwrap();
        assert_eq!(&packet[..6], &[0x80, 0x0C, 0x00, 0x0A, 0x00, 0x07]);
        assert_eq!(&packet[6..13], b"random/");
        assert_eq!(packet[13], 0x00);
        assert_eq!(packet.len(), 14);
    }

    #[test]
    fn test_unsubscribe_layout() {
        let packet = build_unsubscribe(0x0102, "random/").unwrap();
        assert_eq!(&packet[..6], &[0xA0, 0x0B, 0x01, 0x02, 0x00, 0x07]);
        assert_eq!(&packet[6..], b"random/");
    }

    #[test]
    fn test_header_only_packets() {
        assert_eq!(&build_pingreq()[..], &[0xC0, 0x00]);
        assert_eq!(&build_disconnect()[..], &[0xE0, 0x00]);
    }

    #[test]
    fn test_builders_are_deterministic() {
        assert_eq!(
            build_connect("a", 1, true).unwrap(),
            build_connect("a", 1, true).unwrap()
        );
        assert_eq!(
            build_publish("t", b"p").unwrap(),
            build_publish("t", b"p").unwrap()
        );
    }

    #[test]
    fn test_fixed_header_decode_errors() {
        assert_eq!(FixedHeader::decode(&[]), Err(Error::Incomplete));
        assert_eq!(FixedHeader::decode(&[0x30]), Err(Error::Incomplete));
        assert_eq!(FixedHeader::decode(&[0xF0, 0x00]), Err(Error::UnknownPacketType));
        assert_eq!(
            FixedHeader::decode(&[0x30, 0x80, 0x80, 0x80, 0x80, 0x01]),
            Err(Error::MalformedRemainingLength)
        );
    }

    #[test]
    fn test_connack_return_codes() {
        assert_eq!(
            connack_return_code(&[0x20, 0x02, 0x00, 0x00]),
            Ok(ConnectReturnCode::Accepted)
        );
        assert_eq!(
            connack_return_code(&[0x20, 0x02, 0x00, 0x05]),
            Ok(ConnectReturnCode::NotAuthorized)
        );
        assert_eq!(
            connack_return_code(&[0x20, 0x02, 0x00, 0x09]),
            Ok(ConnectReturnCode::Reserved(9))
        );
        assert_eq!(connack_return_code(&[0x20, 0x02, 0x00]), Err(Error::Incomplete));
        assert_eq!(
            connack_return_code(&[0xD0, 0x00]),
            Err(Error::UnexpectedPacket)
        );
    }
}
