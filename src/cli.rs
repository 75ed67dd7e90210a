// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hidbat::MonitorConfig;

#[derive(Parser)]
#[command(name = "hidbat")]
#[command(author, version, about = "Battery status monitor for USB HID wireless dongles")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: ~/.config/hidbat/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// hidraw device path (e.g. /dev/hidraw2)
    #[arg(short, long, global = true)]
    pub path: Option<PathBuf>,

    /// Vendor ID in hex (e.g. 1d57)
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    pub vid: Option<u16>,

    /// Product ID in hex (e.g. fa60)
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    pub pid: Option<u16>,

    /// Open the first interface matching VID/PID instead of a hidraw path
    #[arg(long, global = true)]
    pub by_id: bool,

    /// Seconds between refreshes of an unchanged status
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Milliseconds to sleep between polls
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_ms: Option<u64>,

    /// Append every reading to a log file (--log or --log=FILE, default file: bats.txt)
    #[arg(short, long, global = true, value_name = "FILE", require_equals = true)]
    pub log: Option<Option<PathBuf>>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Monitor battery status until Ctrl+C (default)
    #[command(visible_alias = "m")]
    Monitor,

    /// List HID interfaces of the configured VID/PID
    #[command(visible_alias = "ls")]
    List,

    /// Decode one report given as hex bytes (e.g. "03 00 00 01 57")
    Decode {
        #[arg(required = true)]
        bytes: Vec<String>,
    },
}

impl Cli {
    /// Apply command line overrides on top of the file configuration
    pub fn apply_overrides(&self, config: &mut MonitorConfig) {
        if let Some(path) = &self.path {
            config.device_path = path.clone();
            config.open_by_id = false;
        }
        if let Some(vid) = self.vid {
            config.vendor_id = vid;
        }
        if let Some(pid) = self.pid {
            config.product_id = pid;
        }
        if self.by_id {
            config.open_by_id = true;
        }
        if let Some(secs) = self.interval {
            config.update_interval_secs = secs;
        }
        if let Some(ms) = self.poll_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(log) = &self.log {
            config.logging.enabled = true;
            if let Some(path) = log {
                config.logging.path = path.clone();
            }
        }
    }
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id '{s}': {e}"))
}
