//! `go-back-n` — a simulated Go-Back-N ARQ reliable-delivery protocol over
//! an in-process lossy channel.
//!
//! # Architecture
//!
//! ```text
//!  ┌────────────┐  packets   ┌────────────┐
//!  │ Packetizer │───────────▶│   Sender   │  sliding window, drop-once
//!  └────────────┘            └─────┬──────┘  loss simulation, timeouts
//!                                  │ data queue (+ end-of-stream marker)
//!                            ┌─────▼──────┐
//!                            │  Receiver  │  in-order acceptance,
//!                            └─────┬──────┘  duplicate acks, reassembly
//!                                  │ ack queue
//!                                  └──────────▶ back to Sender
//! ```
//!
//! Each module has a single responsibility:
//! - [`packet`]     — fixed-width bit-packet layout (16-bit trailing seq)
//! - [`packetizer`] — byte stream → ordered packets, final-packet padding
//! - [`channel`]    — the two in-process FIFO queues
//! - [`sender`]     — send-side window state machine (pure, no I/O)
//! - [`receiver`]   — receive-side state machine (pure, no I/O)
//! - [`session`]    — async run loops wiring the above, and [`transfer`]
//! - [`config`]     — run parameters and startup validation

pub mod channel;
pub mod config;
pub mod packet;
pub mod packetizer;
pub mod receiver;
pub mod sender;
pub mod session;

pub use config::{Config, ConfigError};
pub use packet::{Packet, SEQ_BITS};
pub use packetizer::{packetize, PacketizeError};
pub use session::{transfer, TransferError};
