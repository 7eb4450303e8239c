//! Inbound packet classification.
//!
//! Classification is permissive: anything that does not start with a known
//! type code is reported as unknown rather than treated as an error. Only the
//! first byte is inspected. Variable headers and payloads are left to the caller.

use super::packet::ControlPacketType;

/// Mask selecting the type code in the first header byte.
const TYPE_MASK: u8 = 0xF0;

/// Classify a buffer by the type code in its first byte.
///
/// Returns `None` for an empty buffer or a reserved type code.
///
/// # Examples
///
/// ```rust
/// use libmqisdp::network::application::mqtt::{classify, ControlPacketType};
///
/// assert_eq!(classify(&[0x20, 0x02, 0x00, 0x00]), Some(ControlPacketType::Connack));
/// assert_eq!(classify(&[0x32, 0x00]), Some(ControlPacketType::Publish));
/// assert_eq!(classify(&[0xF0]), None);
/// assert_eq!(classify(&[]), None);
/// ```
pub fn classify(buffer: &[u8]) -> Option<ControlPacketType> {
    let first = *buffer.first()?;
    let kind = ControlPacketType::from_code((first & TYPE_MASK) >> 4);
    match kind {
        Some(t) => trace!("classified {} ({=usize} bytes)", t.name(), buffer.len()),
        None => trace!("unclassified header byte {=u8:#x}", first),
    }
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_every_known_type() {
        for t in ControlPacketType::ALL {
            assert_eq!(classify(&[t.header_byte(), 0x00]), Some(t));
        }
    }

    #[test]
    fn test_flags_are_ignored() {
        assert_eq!(classify(&[0x3D]), Some(ControlPacketType::Publish));
        assert_eq!(classify(&[0x82]), Some(ControlPacketType::Subscribe));
    }

    #[test]
    fn test_reserved_and_empty_are_unknown() {
        assert_eq!(classify(&[0x00, 0x00]), None);
        assert_eq!(classify(&[0xF0, 0x00]), None);
        assert_eq!(classify(&[]), None);
    }

    #[test]
    fn test_fragment_is_classified_by_first_byte_only() {
        // A chunk cut mid-payload still gets a best-effort answer from its first byte.
        assert_eq!(classify(b"llo world"), Some(ControlPacketType::Pubrel));
    }
}
