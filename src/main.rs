//! Entry point for `go-back-n`.
//!
//! Parses CLI arguments, validates the configuration, and runs one
//! sender → receiver transfer of the input file.  All protocol work is
//! delegated to library modules; `main.rs` owns only process setup (logging,
//! argument parsing, file I/O).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use go_back_n::{transfer, Config};

/// Simulated Go-Back-N reliable delivery over a lossy in-process channel.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// File whose contents are transmitted.
    input: PathBuf,

    /// File the reconstructed stream is written to.
    output: PathBuf,

    /// Sliding-window size (N).
    #[arg(short, long, default_value_t = 4)]
    window_size: usize,

    /// Total packet width in bits (must exceed the 16-bit sequence field).
    #[arg(short, long, default_value_t = 32)]
    packet_len: usize,

    /// Drop every nth packet (1-indexed) once; large values disable loss.
    #[arg(short, long, default_value_t = 1_000_000)]
    nth_packet: usize,

    /// Retransmission timeout in milliseconds.
    #[arg(short, long, default_value_t = 1000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();
    let config = Config {
        window_size: cli.window_size,
        packet_len: cli.packet_len,
        nth_packet: cli.nth_packet,
        timeout_interval: Duration::from_millis(cli.timeout_ms),
    };

    let input = std::fs::read(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let output = transfer(&input, &config).await?;

    // Written only after end-of-stream processing completes; a startup
    // failure above leaves no output file behind.
    std::fs::write(&cli.output, &output)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    log::info!(
        "transferred {} byte(s) from {} to {}",
        output.len(),
        cli.input.display(),
        cli.output.display()
    );
    Ok(())
}
