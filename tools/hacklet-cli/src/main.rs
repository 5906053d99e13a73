//! hacklet - command-line access to a Modlet USB dongle
//!
//! Boots the dongle, runs one command inside the session and prints the
//! reply as JSON on stdout. Logs go to stderr.

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use hacklet::{Dongle, DongleConfig, TracingPacketLogger};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hacklet")]
#[command(about = "Talk to a Modlet USB dongle")]
#[command(long_about = "Talk to a Modlet USB dongle

Commands:
  select-network   Boot the dongle and select a network
  samples          Boot the dongle and read stored samples from a channel

Examples:
  hacklet select-network --network 0x1234
  hacklet samples --network 0x1234 --channel 0
  hacklet --port /dev/ttyUSB1 -v samples --network 4660 --channel 1")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file
    #[arg(short = 'c', long, global = true, env = "HACKLET_CONFIG")]
    config: Option<PathBuf>,

    /// Serial device, overrides the configuration
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Boot the dongle and select a network
    SelectNetwork {
        /// Network id (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_id)]
        network: u16,
    },

    /// Boot the dongle and read stored samples from a channel
    Samples {
        /// Network id (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_id)]
        network: u16,

        /// Channel id (decimal or 0x-prefixed hex)
        #[arg(short = 'C', long, value_parser = parse_id)]
        channel: u16,
    },
}

/// Parse a 16-bit id written in decimal or `0x` hex
fn parse_id(value: &str) -> std::result::Result<u16, String> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid id '{value}': {e}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize response")?;
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = DongleConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(port) = cli.port {
        config.serial.port = port;
    }

    logging::init(cli.verbose, &config.logging.level, !cli.no_color);

    let dongle = if config.logging.log_packets {
        Dongle::with_logger(Arc::new(TracingPacketLogger::new(&config.serial.port)))
    } else {
        Dongle::new()
    };
    let port = config.serial.port.clone();

    match cli.command {
        Commands::SelectNetwork { network } => {
            let response = dongle
                .open_session(config.serial, move |session| {
                    Box::pin(async move { session.select_network(network).await })
                })
                .await
                .with_context(|| format!("select-network 0x{network:04X} on {port} failed"))?;

            eprintln!("{} network 0x{:04X} selected", "✓".green(), network);
            print_json(&response)?;
        },
        Commands::Samples { network, channel } => {
            let response = dongle
                .open_session(config.serial, move |session| {
                    Box::pin(async move { session.request_samples(network, channel).await })
                })
                .await
                .with_context(|| {
                    format!("samples 0x{network:04X}/0x{channel:04X} on {port} failed")
                })?;

            eprintln!(
                "{} {} samples from channel 0x{:04X}",
                "✓".green(),
                response.samples.len().to_string().bold(),
                channel
            );
            print_json(&response)?;
        },
    }

    Ok(())
}
