//! Length-aware reassembly of inbound control packets.
//!
//! A stream transport may hand over half a packet, or three packets glued
//! together. The [`Framer`] buffers raw chunks and only releases a frame once
//! the fixed header's remaining length says it is complete, so the
//! dispatcher always sees packet-aligned input.

use super::error::Error;
use super::packet::{MAX_PACKET_LEN, PacketBuf};
use super::varint;
use heapless::Vec;

/// Accumulates inbound bytes and splits them into whole control packets.
#[derive(Debug, Default)]
pub struct Framer {
    buf: Vec<u8, MAX_PACKET_LEN>,
}

impl Framer {
    /// Create an empty framer.
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append a chunk of inbound bytes.
    ///
    /// # Errors
    ///
    /// [`Error::BufferOverflow`] if the chunk does not fit next to the bytes
    /// already buffered. Nothing is appended in that case.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), Error> {
        self.buf
            .extend_from_slice(chunk)
            .map_err(|_| Error::BufferOverflow)
    }

    /// Take the next complete frame, if one is buffered.
    ///
    /// # Errors
    ///
    /// * [`Error::MalformedRemainingLength`] - the header is garbled; all
    ///   buffered bytes are dropped so the next chunk starts clean
    /// * [`Error::BufferOverflow`] - the announced packet can never fit the
    ///   buffer; the buffered bytes are dropped as well
    pub fn next_frame(&mut self) -> Result<Option<PacketBuf>, Error> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let (remaining_length, length_len) = match varint::decode_remaining_length(&self.buf, 1) {
            Ok(decoded) => decoded,
            Err(Error::Incomplete) => return Ok(None),
            Err(e) => {
                warn!("dropping {=usize} unframeable bytes", self.buf.len());
                self.buf.clear();
                return Err(e);
            }
        };

        let frame_len = 1 + length_len + remaining_length as usize;
        if frame_len > MAX_PACKET_LEN {
            warn!("inbound packet of {=usize} bytes exceeds buffer", frame_len);
            self.buf.clear();
            return Err(Error::BufferOverflow);
        }
        if self.buf.len() < frame_len {
            return Ok(None);
        }

        let frame = PacketBuf::from_slice(&self.buf[..frame_len]).map_err(|_| Error::BufferOverflow)?;
        let rest = self.buf.len() - frame_len;
        self.buf.copy_within(frame_len.., 0);
        self.buf.truncate(rest);
        Ok(Some(frame))
    }

    /// Number of bytes waiting for the rest of their packet.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop everything buffered.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
