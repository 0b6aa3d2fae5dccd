//! In-process lossless channel between sender and receiver.
//!
//! The "network" here is a pair of unbounded FIFO queues built on
//! `tokio::sync::mpsc`:
//!
//! ```text
//!  ┌────────┐   Frame::Data(pkt) … Frame::Eot   ┌──────────┐
//!  │ Sender │──────────────────────────────────▶│ Receiver │
//!  └────────┘                                   └──────────┘
//!       ▲               ack (u16 seq)                │
//!       └────────────────────────────────────────────┘
//! ```
//!
//! The channel itself never drops, reorders, or duplicates — loss is
//! simulated explicitly by the sender's drop logic, and duplication only
//! arises from retransmission.  [`Frame::Eot`] is the distinguished
//! end-of-stream marker: once it appears on the data queue, no further
//! packets will ever be enqueued.

use tokio::sync::mpsc;

use crate::packet::Packet;

/// One unit on the data queue: a packet, or the end-of-stream marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data(Packet),
    /// End of transmission — the sender will enqueue nothing after this.
    Eot,
}

/// The sender's view of the channel: transmit frames, take in acks.
#[derive(Debug)]
pub struct SenderSide {
    pub data_tx: mpsc::UnboundedSender<Frame>,
    pub ack_rx: mpsc::UnboundedReceiver<u16>,
}

/// The receiver's view of the channel: take in frames, emit acks.
#[derive(Debug)]
pub struct ReceiverSide {
    pub data_rx: mpsc::UnboundedReceiver<Frame>,
    pub ack_tx: mpsc::UnboundedSender<u16>,
}

/// Create a connected channel pair.
pub fn channel() -> (SenderSide, ReceiverSide) {
    let (data_tx, data_rx) = mpsc::unbounded_channel();
    let (ack_tx, ack_rx) = mpsc::unbounded_channel();
    (
        SenderSide { data_tx, ack_rx },
        ReceiverSide { data_rx, ack_tx },
    )
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
