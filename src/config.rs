//! Run configuration and startup validation.
//!
//! The four scalar parameters of a transfer.  Validation is fatal at
//! startup (no partial execution); everything that can go wrong after a
//! valid start is handled inside the sender/receiver state machines and is
//! never surfaced as an error.

use std::time::Duration;

use thiserror::Error;

use crate::packet::MIN_PACKET_LEN;

/// Errors rejected before any packet is exchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("window size must be at least 1")]
    WindowSize,

    #[error("packet length must be at least {MIN_PACKET_LEN} bits, got {0}")]
    PacketLen(usize),

    #[error("drop periodicity (nth packet) must be at least 1")]
    NthPacket,

    #[error("timeout interval must be non-zero")]
    Timeout,
}

/// Transfer parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of unacknowledged packets in flight (N).
    pub window_size: usize,
    /// Total packet width in bits, sequence field included.
    pub packet_len: usize,
    /// Every packet at a 1-indexed position divisible by this is dropped
    /// once.  Set far above the packet count to disable loss.
    pub nth_packet: usize,
    /// How long an unacknowledged packet may sit before the whole window is
    /// retransmitted.
    pub timeout_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_size: 4,
            packet_len: 32,
            nth_packet: 1_000_000,
            timeout_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Reject out-of-range parameters before the run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::WindowSize);
        }
        if self.packet_len < MIN_PACKET_LEN {
            return Err(ConfigError::PacketLen(self.packet_len));
        }
        if self.nth_packet == 0 {
            return Err(ConfigError::NthPacket);
        }
        if self.timeout_interval.is_zero() {
            return Err(ConfigError::Timeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_window() {
        let cfg = Config {
            window_size: 0,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::WindowSize));
    }

    #[test]
    fn rejects_packet_len_at_or_below_seq_width() {
        let cfg = Config {
            packet_len: 16,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::PacketLen(16)));
    }

    #[test]
    fn rejects_zero_nth_packet() {
        let cfg = Config {
            nth_packet: 0,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NthPacket));
    }

    #[test]
    fn rejects_zero_timeout() {
        let cfg = Config {
            timeout_interval: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::Timeout));
    }
}
