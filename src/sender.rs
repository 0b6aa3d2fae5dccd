//! Go-Back-N send-side state machine.
//!
//! [`SenderState`] owns everything the sender mutates during a run: the
//! window base, the per-packet acknowledged flags, the per-packet transmit
//! timestamps, and the set of indices already claimed by the loss
//! simulation.  All mutation goes through the methods here, and the async
//! driver ([`crate::session`]) is the only owner — ack intake and timeout
//! expiry are serialized onto this one state block rather than sharing it
//! between threads.
//!
//! # Protocol contract
//!
//! - The admissible send set is `[base, base + window_size)`, clipped to the
//!   packet count.
//! - Simulated loss: a packet whose 1-indexed position is a multiple of
//!   `nth_packet` is silently dropped the first time it would be sent, and
//!   never again.  The drop stamps the packet's timer, so retransmission
//!   follows one full timeout after the drop.
//! - On timeout, the **entire** current window of unacknowledged packets is
//!   retransmitted (go back N), not just the oldest.
//! - Each distinct newly-observed ack slides `base` forward by exactly one,
//!   regardless of which index it names, and the index the window newly
//!   uncovers (if any) goes through the same loss/transmit logic.  Repeat
//!   acks are no-ops.
//!
//! This module only manages state; queue I/O, logging, and timer scheduling
//! belong to the session loop, which acts on the [`WindowEvent`]s returned
//! here.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::packet::Packet;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// What happened to one window slot during a transmit pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// The packet goes on the data queue.
    Sent { index: usize, packet: Packet },
    /// The loss simulation consumed this index's single allowed drop.
    Dropped { index: usize },
}

/// Result of feeding one acknowledgment into the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    /// First sighting of this ack: the base slid by one, and the newly
    /// uncovered window slot (if any) produced an event.
    Advanced(Vec<WindowEvent>),
    /// Already-seen or out-of-range ack — nothing changed.
    Ignored,
}

// ---------------------------------------------------------------------------
// SenderState
// ---------------------------------------------------------------------------

/// Send-side window state for one transfer.
///
/// ```text
///   base              base + window_size
///     │                      │
///  ───┼──────────────────────┼──────────────▶ packet index
///     │ ◀── may be sent ──▶  │ ◀─ not yet ─▶
/// ```
#[derive(Debug)]
pub struct SenderState {
    packets: Vec<Packet>,
    window_size: usize,
    nth_packet: usize,

    /// Index of the oldest unacknowledged packet (left window edge).
    base: usize,
    /// Per-packet acknowledged flag, set true exactly once.
    acked: Vec<bool>,
    /// Per-packet last-transmit (or drop) timestamp.
    timers: Vec<Option<Instant>>,
    /// Indices whose one allowed simulated drop has already happened.
    dropped: HashSet<usize>,
}

impl SenderState {
    pub fn new(packets: Vec<Packet>, window_size: usize, nth_packet: usize) -> Self {
        assert!(window_size >= 1, "window_size must be at least 1");
        assert!(nth_packet >= 1, "nth_packet must be at least 1");
        let n = packets.len();
        Self {
            packets,
            window_size,
            nth_packet,
            base: 0,
            acked: vec![false; n],
            timers: vec![None; n],
            dropped: HashSet::new(),
        }
    }

    /// Index of the oldest unacknowledged packet.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Total number of packets in the stream.
    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }

    /// `true` once every packet has been accounted for (`base == N`); the
    /// driver then emits the end-of-stream marker exactly once and stops.
    pub fn is_complete(&self) -> bool {
        self.base >= self.packets.len()
    }

    /// First index past the admissible window.
    fn window_end(&self) -> usize {
        (self.base + self.window_size).min(self.packets.len())
    }

    /// Run one index through the loss/transmit decision and stamp its timer.
    fn transmit_one(&mut self, index: usize, now: Instant) -> WindowEvent {
        self.timers[index] = Some(now);
        if (index + 1) % self.nth_packet == 0 && !self.dropped.contains(&index) {
            self.dropped.insert(index);
            WindowEvent::Dropped { index }
        } else {
            WindowEvent::Sent {
                index,
                packet: self.packets[index].clone(),
            }
        }
    }

    /// Transmit every unacknowledged packet in the current window.
    ///
    /// Invoked once at start and again, for the whole window, whenever
    /// [`timed_out`](Self::timed_out) reports expiry (the go-back-N step).
    pub fn transmit_window(&mut self, now: Instant) -> Vec<WindowEvent> {
        let mut events = Vec::new();
        for index in self.base..self.window_end() {
            if !self.acked[index] {
                events.push(self.transmit_one(index, now));
            }
        }
        events
    }

    /// Feed one acknowledgment into the window.
    ///
    /// A first-seen ack marks its index, slides `base` by one, and — when the
    /// slide uncovers a fresh in-range, unacknowledged index — applies the
    /// loss/transmit logic to that single packet.  Note the slide happens per
    /// *distinct* ack regardless of which index was named; acks are not
    /// required to arrive in order.
    pub fn advance_on_ack(&mut self, ack: u16, now: Instant) -> AckOutcome {
        let index = ack as usize;
        if index >= self.packets.len() || self.acked[index] {
            return AckOutcome::Ignored;
        }
        self.acked[index] = true;
        self.base += 1;

        let mut events = Vec::new();
        let uncovered = self.base + self.window_size - 1;
        if uncovered < self.packets.len() && !self.acked[uncovered] {
            events.push(self.transmit_one(uncovered, now));
        }
        AckOutcome::Advanced(events)
    }

    /// Indices in the window whose last transmission is older than
    /// `timeout`.  A non-empty result triggers a full-window retransmit.
    pub fn timed_out(&self, now: Instant, timeout: Duration) -> Vec<usize> {
        (self.base..self.window_end())
            .filter(|&i| {
                !self.acked[i]
                    && self.timers[i]
                        .map_or(true, |t| now.duration_since(t) > timeout)
            })
            .collect()
    }

    /// Earliest instant at which some in-window packet will have waited a
    /// full `timeout` since its last transmission.  `None` once complete.
    pub fn next_deadline(&self, now: Instant, timeout: Duration) -> Option<Instant> {
        (self.base..self.window_end())
            .filter(|&i| !self.acked[i])
            .map(|i| match self.timers[i] {
                Some(t) => t + timeout,
                None => now, // never transmitted: due immediately
            })
            .min()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packetizer::packetize;

    const NO_DROPS: usize = 1_000_000;

    fn state(input: &[u8], window: usize, nth: usize) -> SenderState {
        SenderState::new(packetize(input, 24).unwrap(), window, nth)
    }

    fn sent_indices(events: &[WindowEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|e| match e {
                WindowEvent::Sent { index, .. } => Some(*index),
                WindowEvent::Dropped { .. } => None,
            })
            .collect()
    }

    #[test]
    fn initial_transmit_covers_window() {
        let mut s = state(b"abcdef", 3, NO_DROPS);
        let events = s.transmit_window(Instant::now());
        assert_eq!(sent_indices(&events), vec![0, 1, 2]);
        assert_eq!(s.base(), 0);
    }

    #[test]
    fn window_is_clipped_to_packet_count() {
        let mut s = state(b"ab", 8, NO_DROPS);
        let events = s.transmit_window(Instant::now());
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn nth_packet_positions_are_dropped() {
        // nth = 2 drops 1-indexed positions 2, 4, … → indices 1 and 3.
        let mut s = state(b"abcd", 4, 2);
        let events = s.transmit_window(Instant::now());
        assert_eq!(sent_indices(&events), vec![0, 2]);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, WindowEvent::Dropped { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn each_index_is_dropped_at_most_once() {
        let mut s = state(b"ab", 2, 1); // nth = 1: every packet is droppable
        let now = Instant::now();
        let first = s.transmit_window(now);
        assert!(first
            .iter()
            .all(|e| matches!(e, WindowEvent::Dropped { .. })));

        // The retransmit pass must actually send both packets.
        let second = s.transmit_window(now);
        assert_eq!(sent_indices(&second), vec![0, 1]);

        // And a third pass sends again — the drop never re-fires.
        let third = s.transmit_window(now);
        assert_eq!(sent_indices(&third), vec![0, 1]);
    }

    #[test]
    fn new_ack_slides_base_by_one() {
        let mut s = state(b"abcd", 2, NO_DROPS);
        let now = Instant::now();
        s.transmit_window(now);

        match s.advance_on_ack(0, now) {
            AckOutcome::Advanced(events) => {
                // base 1, window [1, 3): index 2 is newly uncovered.
                assert_eq!(sent_indices(&events), vec![2]);
            }
            AckOutcome::Ignored => panic!("first ack must advance"),
        }
        assert_eq!(s.base(), 1);
    }

    #[test]
    fn non_base_ack_still_slides_base() {
        let mut s = state(b"abcd", 2, NO_DROPS);
        let now = Instant::now();
        s.transmit_window(now);

        assert!(matches!(s.advance_on_ack(1, now), AckOutcome::Advanced(_)));
        assert_eq!(s.base(), 1, "any distinct new ack advances the base");
    }

    #[test]
    fn repeat_ack_is_ignored() {
        let mut s = state(b"abcd", 2, NO_DROPS);
        let now = Instant::now();
        s.transmit_window(now);

        assert!(matches!(s.advance_on_ack(0, now), AckOutcome::Advanced(_)));
        assert_eq!(s.advance_on_ack(0, now), AckOutcome::Ignored);
        assert_eq!(s.base(), 1, "base must not move on a repeat ack");
    }

    #[test]
    fn out_of_range_ack_is_ignored() {
        let mut s = state(b"ab", 2, NO_DROPS);
        assert_eq!(
            s.advance_on_ack(9, Instant::now()),
            AckOutcome::Ignored
        );
        assert_eq!(s.base(), 0);
    }

    #[test]
    fn uncovered_index_goes_through_loss_logic() {
        // nth = 3 drops 1-indexed position 3 → index 2, which is uncovered
        // by the first slide.
        let mut s = state(b"abcd", 2, 3);
        let now = Instant::now();
        s.transmit_window(now);

        match s.advance_on_ack(0, now) {
            AckOutcome::Advanced(events) => {
                assert_eq!(events, vec![WindowEvent::Dropped { index: 2 }]);
            }
            AckOutcome::Ignored => panic!("first ack must advance"),
        }
    }

    #[test]
    fn completion_after_all_acks() {
        let mut s = state(b"abc", 2, NO_DROPS);
        let now = Instant::now();
        s.transmit_window(now);
        for ack in 0..3u16 {
            s.advance_on_ack(ack, now);
        }
        assert!(s.is_complete());
        assert_eq!(s.base(), 3);
    }

    #[test]
    fn empty_stream_is_immediately_complete() {
        let mut s = state(b"", 2, NO_DROPS);
        assert!(s.is_complete());
        assert!(s.transmit_window(Instant::now()).is_empty());
    }

    #[test]
    fn timed_out_reports_stale_packets() {
        let mut s = state(b"ab", 2, NO_DROPS);
        let sent_at = Instant::now();
        s.transmit_window(sent_at);

        let timeout = Duration::from_millis(100);
        assert!(s.timed_out(sent_at + Duration::from_millis(50), timeout).is_empty());
        assert_eq!(
            s.timed_out(sent_at + Duration::from_millis(150), timeout),
            vec![0, 1]
        );
    }

    #[test]
    fn acked_packets_never_time_out() {
        let mut s = state(b"abc", 3, NO_DROPS);
        let sent_at = Instant::now();
        s.transmit_window(sent_at);
        s.advance_on_ack(1, sent_at); // index 1 acked (base slides to 1)

        let later = sent_at + Duration::from_secs(10);
        let stale = s.timed_out(later, Duration::from_millis(100));
        assert!(!stale.contains(&1));
    }

    #[test]
    fn dropped_packet_deadline_counts_from_the_drop() {
        let mut s = state(b"a", 1, 1); // single packet, dropped on first pass
        let dropped_at = Instant::now();
        s.transmit_window(dropped_at);

        let timeout = Duration::from_millis(100);
        let deadline = s.next_deadline(dropped_at, timeout).unwrap();
        assert_eq!(deadline, dropped_at + timeout);
    }

    #[test]
    fn next_deadline_is_none_when_complete() {
        let mut s = state(b"a", 1, NO_DROPS);
        let now = Instant::now();
        s.transmit_window(now);
        s.advance_on_ack(0, now);
        assert_eq!(s.next_deadline(now, Duration::from_secs(1)), None);
    }
}
