//! hidbat CLI
//!
//! Watches a wireless dongle's battery report and prints a single,
//! continuously redrawn status line.

use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

mod cli;
use cli::{Cli, Commands};

use hidbat::monitor::{open_device, Monitor};
use hidbat::report::parse_hex_report;
use hidbat::sink::ConsoleSink;
use hidbat::{MonitorConfig, MonitorError, ShutdownFlag};

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stderr keeps log lines off the in-place status line on stdout
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<MonitorConfig> {
    let (path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (MonitorConfig::default_path(), false),
    };
    debug!("Loading config from {:?}", path);

    let mut config = MonitorConfig::load(&path, required)?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = load_config(&cli)?;

    match &cli.command {
        None | Some(Commands::Monitor) => monitor(&config),
        Some(Commands::List) => list(&config),
        Some(Commands::Decode { bytes }) => decode(&config, bytes),
    }
}

fn monitor(config: &MonitorConfig) -> Result<ExitCode> {
    let shutdown = ShutdownFlag::new();
    shutdown
        .install_ctrlc_handler()
        .context("Failed to install Ctrl+C handler")?;

    if config.open_by_id {
        println!(
            "Attempting to open device {:04x}:{:04x}",
            config.vendor_id, config.product_id
        );
    } else {
        println!(
            "Attempting to open device path: {}",
            config.device_path.display()
        );
    }

    let source = match open_device(config) {
        Ok(source) => source,
        Err(e) => {
            print_open_diagnostics(&e);
            println!("Exited.");
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("Device opened: {}", source.info().banner());
    if config.logging.enabled {
        println!(
            "Logging battery status to {}",
            config.logging.path.display()
        );
    }
    println!("Monitoring battery status... (Press Ctrl+C to stop)");

    let mut monitor = Monitor::new(source, ConsoleSink::stdout(), config, Instant::now());
    let result = monitor.run(&shutdown);

    match &result {
        Ok(cycles) => {
            info!("Stopped after {} polls", cycles);
            println!("\nCtrl+C detected. Exiting gracefully...");
        }
        Err(e) => println!("\n{e}"),
    }

    let (source, _) = monitor.into_parts();
    println!("Closing device.");
    source.close();
    println!("Exited.");

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_open_diagnostics(err: &MonitorError) {
    println!("\n{err}");
    let path = match err {
        MonitorError::Open { path, .. } => path.display().to_string(),
        MonitorError::Read(_) => return,
    };

    if err.is_not_found() {
        println!("Error: Device '{path}' not found.");
        println!("Ensure the dongle is plugged in.");
    } else {
        println!("Ensure the device path '{path}' exists, is correct,");
        println!("and you have the necessary permissions (check udev rules).");
        if err.is_permission_denied() {
            println!("Try running with 'sudo' to test for permission issues.");
        }
    }
}

fn list(config: &MonitorConfig) -> Result<ExitCode> {
    let devices = hidbat_transport::list_devices(config.vendor_id, config.product_id)?;
    if devices.is_empty() {
        println!(
            "No HID interfaces found for {:04x}:{:04x}",
            config.vendor_id, config.product_id
        );
        return Ok(ExitCode::FAILURE);
    }

    println!(
        "HID interfaces for {:04x}:{:04x}:",
        config.vendor_id, config.product_id
    );
    for dev in devices {
        println!(
            "  {} if={} usage={:04x} page={:04x} {}",
            dev.path.display(),
            dev.interface,
            dev.usage,
            dev.usage_page,
            dev.product.as_deref().unwrap_or("")
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn decode(config: &MonitorConfig, bytes: &[String]) -> Result<ExitCode> {
    let raw = parse_hex_report(bytes).context("Invalid hex report")?;
    match config.report.decode(&raw) {
        Some(reading) => {
            println!("{reading}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("Not a battery report: {:02x?}", raw);
            Ok(ExitCode::FAILURE)
        }
    }
}
