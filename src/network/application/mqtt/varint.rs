//! The MQTT "remaining length" variable-byte integer.
//!
//! Values are written base-128, least significant group first. The top bit
//! of every byte is a continuation flag, so 1 to 4 bytes cover the range
//! `0..=268_435_455`:
//!
//! | value range               | bytes |
//! |---------------------------|-------|
//! | 0 - 127                   | 1     |
//! | 128 - 16,383              | 2     |
//! | 16,384 - 2,097,151        | 3     |
//! | 2,097,152 - 268,435,455   | 4     |

use super::error::Error;
use heapless::Vec;

/// Largest value a remaining-length field can carry.
pub const MAX_REMAINING_LENGTH: u32 = 268_435_455;

/// Maximum number of bytes in an encoded remaining length.
pub const MAX_REMAINING_LENGTH_BYTES: usize = 4;

/// Encode `value` as a remaining-length field.
///
/// # Errors
///
/// [`Error::RemainingLengthTooLarge`] if `value` exceeds
/// [`MAX_REMAINING_LENGTH`].
///
/// # Examples
///
/// ```rust
/// use libmqisdp::network::application::mqtt::varint::encode_remaining_length;
///
/// assert_eq!(&encode_remaining_length(0).unwrap()[..], &[0x00]);
/// assert_eq!(&encode_remaining_length(321).unwrap()[..], &[0xC1, 0x02]);
/// ```
pub fn encode_remaining_length(value: u32) -> Result<Vec<u8, MAX_REMAINING_LENGTH_BYTES>, Error> {
    if value > MAX_REMAINING_LENGTH {
        return Err(Error::RemainingLengthTooLarge);
    }

    let mut out = Vec::new();
    let mut rest = value;
    loop {
        let mut byte = (rest % 128) as u8;
        rest /= 128;
        if rest > 0 {
            byte |= 0x80;
        }
        // At most four groups for values within the ceiling checked above.
        out.push(byte).map_err(|_| Error::RemainingLengthTooLarge)?;
        if rest == 0 {
            break;
        }
    }
    Ok(out)
}

/// Decode a remaining-length field starting at `bytes[offset]`.
///
/// Returns the decoded value and the number of bytes it occupied.
///
/// # Errors
///
/// * [`Error::MalformedRemainingLength`] - more than four groups were read
///   without finding a terminating byte
/// * [`Error::Incomplete`] - the input ended before the terminating byte
pub fn decode_remaining_length(bytes: &[u8], offset: usize) -> Result<(u32, usize), Error> {
    let mut value: u32 = 0;
    let mut consumed = 0;

    loop {
        if consumed == MAX_REMAINING_LENGTH_BYTES {
            return Err(Error::MalformedRemainingLength);
        }
        let byte = *bytes.get(offset + consumed).ok_or(Error::Incomplete)?;
        value |= u32::from(byte & 0x7F) << (7 * consumed);
        consumed += 1;
        if byte & 0x80 == 0 {
            return Ok((value, consumed));
        }
    }
}

/// Number of bytes [`encode_remaining_length`] produces for `value`.
pub const fn remaining_length_len(value: u32) -> usize {
    match value {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        _ => 4,
    }
}
