//! Go-Back-N receive-side state machine.
//!
//! [`ReceiverState`] enforces strict in-order delivery:
//!
//! - Only the packet whose sequence number equals the next expected index is
//!   accepted; its payload bits join the reassembly buffer and an ack for
//!   that index goes back to the sender.
//! - Anything else — duplicates, and packets arriving after a gap left by a
//!   drop — is discarded, answered with a duplicate ack naming the last
//!   accepted index ("resend starting after this").
//!
//! Receiver state is single-writer: only the session's receive loop touches
//! it, so no locking is needed.  Reassembly happens once, after the
//! end-of-stream marker is observed.

use crate::packet::{bits_to_byte, Packet};

/// Outcome of offering one packet to the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// In-order packet: payload buffered, ack its sequence number.
    Accepted { ack: u16 },
    /// Out-of-order or duplicate: payload discarded.  `ack` re-confirms the
    /// last accepted index, or is `None` when nothing has been accepted yet
    /// (there is no index to re-confirm; recovery is timeout-driven).
    Rejected { seq: u16, ack: Option<u16> },
}

/// Receive-side state for one transfer.
#[derive(Debug, Default)]
pub struct ReceiverState {
    /// Next packet index that will be accepted; increments by exactly one
    /// per acceptance.  `usize` rather than `u16` so it can pass the final
    /// sequence number when the stream fills the whole sequence space.
    expected: usize,
    /// Payload bits of accepted packets, in acceptance (= sequence) order.
    chunks: Vec<Vec<bool>>,
}

impl ReceiverState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next expected packet index.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Offer one packet; buffer it if it is the expected one.
    pub fn accept(&mut self, packet: &Packet) -> AcceptOutcome {
        let seq = packet.seq();
        if usize::from(seq) == self.expected {
            self.chunks.push(packet.payload_bits().to_vec());
            self.expected += 1;
            AcceptOutcome::Accepted { ack: seq }
        } else {
            let ack = self.expected.checked_sub(1).map(|last| last as u16);
            AcceptOutcome::Rejected { seq, ack }
        }
    }

    /// Rebuild the original byte stream from the buffered payload bits.
    ///
    /// Concatenates all chunks in order, regroups into 8-bit bytes (an
    /// incomplete trailing group is discarded), and strips the trailing zero
    /// bytes introduced by final-packet padding.
    pub fn into_bytes(self) -> Vec<u8> {
        let bits: Vec<bool> = self.chunks.into_iter().flatten().collect();
        let mut bytes: Vec<u8> = bits
            .chunks_exact(8)
            .map(bits_to_byte)
            .collect();
        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        bytes
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
