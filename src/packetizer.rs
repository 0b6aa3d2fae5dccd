//! Byte stream → packet sequence.
//!
//! [`packetize`] converts an input byte stream into the ordered sequence of
//! fixed-width [`Packet`]s the sender transmits.  Each input byte contributes
//! its 8 bits (most significant first) to one contiguous bit stream, which is
//! then partitioned into `packet_len - 16` sized payload chunks; the final
//! chunk is right-padded with zero bits.  Sequence numbers are the packet's
//! position in transmission order, starting at 0.

use thiserror::Error;

use crate::packet::{byte_to_bits, Packet, MIN_PACKET_LEN, SEQ_BITS};

/// Hard cap on stream length: the sequence field is 16 bits wide, so at most
/// `2^16` packets (sequence numbers `0..=65535`) can be represented.
pub const MAX_PACKETS: usize = 1 << SEQ_BITS;

/// Errors that can arise while packetizing an input stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketizeError {
    /// `packet_len` leaves no room for payload bits.
    #[error("packet length must be at least {MIN_PACKET_LEN} bits, got {0}")]
    PacketLenTooSmall(usize),

    /// The stream needs more packets than the 16-bit sequence field can
    /// number.  Rejected outright rather than silently truncated.
    #[error("input requires {0} packets, exceeding the 16-bit sequence space of {MAX_PACKETS}")]
    TooManyPackets(usize),
}

/// Split `input` into packets of exactly `packet_len` bits each.
///
/// Returns `N` packets carrying sequence numbers `0..N-1`.  An empty input
/// yields an empty packet list.
pub fn packetize(input: &[u8], packet_len: usize) -> Result<Vec<Packet>, PacketizeError> {
    if packet_len < MIN_PACKET_LEN {
        return Err(PacketizeError::PacketLenTooSmall(packet_len));
    }

    let payload_bits = packet_len - SEQ_BITS;
    let total_bits = input.len() * 8;
    let count = total_bits.div_ceil(payload_bits);
    if count > MAX_PACKETS {
        return Err(PacketizeError::TooManyPackets(count));
    }

    let mut bits = Vec::with_capacity(total_bits);
    for &byte in input {
        bits.extend_from_slice(&byte_to_bits(byte));
    }

    let packets = bits
        .chunks(payload_bits)
        .enumerate()
        .map(|(seq, chunk)| Packet::build(seq as u16, chunk, packet_len))
        .collect();
    Ok(packets)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
