//! Async driver: the sender and receiver run loops, and [`transfer`].
//!
//! # Architecture
//!
//! ```text
//!  input bytes                                          output bytes
//!      │                                                      ▲
//!      ▼                                                      │
//!  packetize ─▶ run_sender ══ data queue (Frame) ══▶ run_receiver
//!                   ▲                                         ║
//!                   ╚═════════ ack queue (u16) ═══════════════╝
//! ```
//!
//! `run_sender` is the single owner of [`SenderState`]; it multiplexes ack
//! intake and retransmit-timeout expiry with `tokio::select!`, so every
//! mutation of the acked flags / timers / drop set is serialized through one
//! task.  The timeout arm is event-driven: the task sleeps until the
//! earliest per-packet deadline rather than polling.
//!
//! `run_receiver` owns [`ReceiverState`] outright and terminates strictly on
//! the end-of-stream marker — an empty queue is just a wait state.

use std::time::Instant;

use thiserror::Error;
use tokio::task::JoinError;

use crate::channel::{channel, Frame, ReceiverSide, SenderSide};
use crate::config::{Config, ConfigError};
use crate::packetizer::{packetize, PacketizeError};
use crate::receiver::{AcceptOutcome, ReceiverState};
use crate::sender::{AckOutcome, SenderState, WindowEvent};

/// Errors that can abort a transfer before or outside normal protocol
/// operation.  Loss, reordering, and duplicate acks are *not* errors — the
/// state machines absorb them.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("packetizing failed: {0}")]
    Packetize(#[from] PacketizeError),

    #[error("worker task failed: {0}")]
    Task(#[from] JoinError),
}

/// Run a complete sender → receiver transfer of `input` and return the
/// reconstructed byte stream.
///
/// Both endpoints run as tokio tasks connected by the in-process channel;
/// the call resolves once the receiver has consumed the end-of-stream
/// marker and reassembled its buffer.
pub async fn transfer(input: &[u8], config: &Config) -> Result<Vec<u8>, TransferError> {
    config.validate()?;
    let packets = packetize(input, config.packet_len)?;

    let (sender_side, receiver_side) = channel();
    let state = SenderState::new(packets, config.window_size, config.nth_packet);
    let config = config.clone();

    let sender = tokio::spawn(run_sender(state, sender_side, config));
    let receiver = tokio::spawn(run_receiver(receiver_side));

    sender.await?;
    Ok(receiver.await?)
}

// ---------------------------------------------------------------------------
// Sender loop
// ---------------------------------------------------------------------------

/// Drive the send window to completion, then emit the end-of-stream marker.
pub async fn run_sender(mut state: SenderState, mut link: SenderSide, config: Config) {
    let timeout = config.timeout_interval;

    for event in state.transmit_window(Instant::now()) {
        dispatch(event, &link.data_tx);
    }

    while !state.is_complete() {
        // Always Some here: an incomplete window has at least one unacked
        // in-window packet, because acks arrive in index order.
        let deadline = state
            .next_deadline(Instant::now(), timeout)
            .unwrap_or_else(|| Instant::now() + timeout);

        tokio::select! {
            maybe_ack = link.ack_rx.recv() => {
                let Some(ack) = maybe_ack else {
                    log::warn!("ack queue closed before completion");
                    break;
                };
                match state.advance_on_ack(ack, Instant::now()) {
                    AckOutcome::Advanced(events) => {
                        log::info!("ack {ack} received");
                        for event in events {
                            dispatch(event, &link.data_tx);
                        }
                    }
                    AckOutcome::Ignored => {
                        log::info!("ack {ack} received, ignoring");
                    }
                }
            }
            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                let now = Instant::now();
                let stale = state.timed_out(now, timeout);
                if !stale.is_empty() {
                    for index in &stale {
                        log::info!("packet {index} timed out");
                    }
                    // Go back N: resend the entire unacknowledged window.
                    for event in state.transmit_window(now) {
                        dispatch(event, &link.data_tx);
                    }
                }
            }
        }
    }

    // Exactly once: nothing follows the marker on the data queue.
    if link.data_tx.send(Frame::Eot).is_err() {
        log::warn!("receiver gone before end-of-stream marker");
    }
}

/// Act on one window event: enqueue the packet, or observe the drop.
fn dispatch(event: WindowEvent, data_tx: &tokio::sync::mpsc::UnboundedSender<Frame>) {
    match event {
        WindowEvent::Sent { index, packet } => {
            log::info!("sending packet {index}");
            if data_tx.send(Frame::Data(packet)).is_err() {
                log::warn!("data queue closed; packet {index} not delivered");
            }
        }
        WindowEvent::Dropped { index } => {
            // Simulated loss: silently absent from the channel; the timeout
            // mechanism recovers it.
            log::info!("packet {index} dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// Receiver loop
// ---------------------------------------------------------------------------

/// Consume frames until the end-of-stream marker, acking as we go, then
/// reassemble and return the byte stream.
pub async fn run_receiver(mut link: ReceiverSide) -> Vec<u8> {
    let mut state = ReceiverState::new();

    while let Some(frame) = link.data_rx.recv().await {
        let packet = match frame {
            Frame::Data(packet) => packet,
            Frame::Eot => break,
        };
        match state.accept(&packet) {
            AcceptOutcome::Accepted { ack } => {
                log::info!("packet {ack} received");
                if link.ack_tx.send(ack).is_err() {
                    log::warn!("ack queue closed; ack {ack} not delivered");
                }
            }
            AcceptOutcome::Rejected { seq, ack } => {
                log::info!("packet {seq} received out of order");
                if let Some(ack) = ack {
                    // Duplicate ack of the last accepted packet.
                    let _ = link.ack_tx.send(ack);
                }
            }
        }
    }

    state.into_bytes()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
