//! Bit-level packet layout.
//!
//! Every unit crossing the data channel is a [`Packet`]: a fixed-length bit
//! vector of exactly `packet_len` bits.  This module is responsible for:
//! - Defining the bit layout (payload bits followed by the sequence number).
//! - Building a packet from payload bits, zero-padding short payloads.
//! - Extracting the sequence number and payload bits back out.
//!
//! No I/O happens here — this is pure data transformation.
//!
//! # Bit layout
//!
//! The sequence number occupies the **trailing** [`SEQ_BITS`] bits, most
//! significant bit first.  Everything before it is payload:
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────┐
//! │  payload (packet_len − 16)   │  sequence number (16)│
//! └──────────────────────────────┴──────────────────────┘
//!  bit 0                                      bit packet_len − 1
//! ```
//!
//! The final packet of a stream is right-padded with zero bits inside the
//! payload field so that every packet has the same total width.

/// Width of the trailing sequence-number field, in bits.
pub const SEQ_BITS: usize = 16;

/// Smallest legal packet length: one payload bit plus the sequence field.
pub const MIN_PACKET_LEN: usize = SEQ_BITS + 1;

// ---------------------------------------------------------------------------
// Bit helpers
// ---------------------------------------------------------------------------

/// Expand a byte into its 8 bits, most significant first.
pub(crate) fn byte_to_bits(b: u8) -> [bool; 8] {
    std::array::from_fn(|i| b & (1 << (7 - i)) != 0)
}

/// Collapse up to 8 bits (most significant first) back into a byte.
pub(crate) fn bits_to_byte(bits: &[bool]) -> u8 {
    debug_assert!(bits.len() <= 8);
    bits.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit))
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// A fixed-width bit packet: payload bits plus a trailing 16-bit sequence
/// number.
///
/// Construct with [`Packet::build`]; inspect with [`Packet::seq`] and
/// [`Packet::payload_bits`].  The total width is chosen by the caller and is
/// identical for every packet in a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    bits: Vec<bool>,
}

impl Packet {
    /// Assemble a packet of exactly `packet_len` bits.
    ///
    /// `payload` may be shorter than `packet_len - SEQ_BITS`; the gap is
    /// filled with zero bits (final-packet padding).
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `packet_len` is below [`MIN_PACKET_LEN`] or
    /// the payload does not fit.  The packetizer validates both up front.
    pub fn build(seq: u16, payload: &[bool], packet_len: usize) -> Self {
        debug_assert!(packet_len >= MIN_PACKET_LEN, "packet_len too small");
        debug_assert!(
            payload.len() <= packet_len - SEQ_BITS,
            "payload of {} bits does not fit in a {}-bit packet",
            payload.len(),
            packet_len
        );

        let mut bits = Vec::with_capacity(packet_len);
        bits.extend_from_slice(payload);
        bits.resize(packet_len - SEQ_BITS, false); // zero-pad the payload field

        for i in 0..SEQ_BITS {
            bits.push(seq & (1 << (SEQ_BITS - 1 - i)) != 0);
        }
        Self { bits }
    }

    /// Total width in bits (constant across a stream).
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The trailing 16-bit sequence number.
    pub fn seq(&self) -> u16 {
        let start = self.bits.len() - SEQ_BITS;
        self.bits[start..]
            .iter()
            .fold(0u16, |acc, &bit| (acc << 1) | u16::from(bit))
    }

    /// The payload bits (everything before the sequence field), padding
    /// included.
    pub fn payload_bits(&self) -> &[bool] {
        &self.bits[..self.bits.len() - SEQ_BITS]
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
