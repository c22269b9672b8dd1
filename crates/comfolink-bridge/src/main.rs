//! Command-line interface for the ComfoConnect PRO bridge.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfolink_bridge::config::log_json_enabled;
use comfolink_bridge::{BridgeConfig, Poller, SimulatedDevice, Snapshot, TcpTransport};
use comfolink_core::{
    parse_value, registry, EntityCategory, EntityDescriptor, RegisterClass, RegisterTransport,
    Registry,
};

/// ComfoConnect PRO Modbus bridge.
#[derive(Parser, Debug)]
#[command(name = "comfolink")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to comfolink.toml, then environment).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List the entities compiled from the register map.
    Entities {
        /// Print descriptors as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the address envelope per register class.
    Envelopes,
    /// Poll the device and print decoded values.
    Poll {
        /// Poll once and exit.
        #[arg(long)]
        once: bool,
        /// Use the in-memory simulator instead of the device.
        #[arg(long)]
        simulate: bool,
    },
    /// Write a value to a point.
    Write {
        /// Point key.
        key: String,
        /// Value: a number, on/off, or an option label.
        value: String,
        /// Use the in-memory simulator instead of the device.
        #[arg(long)]
        simulate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let registry = registry::shared().context("Failed to build register map")?;

    match args.command {
        Command::Entities { json } => list_entities(registry, json),
        Command::Envelopes => {
            list_envelopes(registry);
            Ok(())
        }
        Command::Poll { once, simulate } => {
            let config = BridgeConfig::load(args.config.as_deref())?;
            if simulate {
                run_poll(registry, SimulatedDevice::from_registry(registry), &config, once).await
            } else {
                let transport = TcpTransport::connect(&config.device).await?;
                run_poll(registry, transport, &config, once).await
            }
        }
        Command::Write {
            key,
            value,
            simulate,
        } => {
            if simulate {
                write_point(registry, SimulatedDevice::from_registry(registry), &key, &value).await
            } else {
                let config = BridgeConfig::load(args.config.as_deref())?;
                let transport = TcpTransport::connect(&config.device).await?;
                write_point(registry, transport, &key, &value).await
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        tracing_subscriber::EnvFilter::new(format!(
            "comfolink={level},comfolink_core={level},comfolink_bridge={level}"
        ))
    });

    if log_json_enabled() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .init();
    }
}

fn list_entities(registry: &Registry, json: bool) -> Result<()> {
    if json {
        let descriptors: Vec<&EntityDescriptor> = EntityCategory::ALL
            .iter()
            .filter_map(|c| registry.category_table(*c))
            .flat_map(|t| t.values())
            .collect();
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    for category in EntityCategory::ALL {
        let Some(table) = registry.category_table(category) else {
            continue;
        };
        if table.is_empty() {
            continue;
        }
        println!("{} ({})", category, table.len());
        for descriptor in table.values() {
            println!("  {:<28} {}", descriptor.key(), descriptor.display_name());
        }
    }
    for gap in registry.gaps() {
        println!("skipped: {}", gap);
    }
    Ok(())
}

fn list_envelopes(registry: &Registry) {
    for class in RegisterClass::ALL {
        match registry.envelope(class) {
            Some(range) => println!(
                "{:<18} {:>5}..={:<5} ({} addresses)",
                class,
                range.start,
                range.end,
                range.count()
            ),
            None => println!("{:<18} -", class),
        }
    }
}

fn print_snapshot(registry: &Registry, snapshot: &Snapshot) {
    for point in registry.points() {
        if let Some(value) = snapshot.get(&point.key) {
            let unit = point.unit.as_deref().unwrap_or("");
            println!("{:<28} {} {}", point.key, value, unit);
        } else if let Some(error) = snapshot.errors.get(&point.key) {
            println!("{:<28} <{}>", point.key, error);
        }
    }
}

async fn run_poll<T: RegisterTransport>(
    registry: &Registry,
    transport: T,
    config: &BridgeConfig,
    once: bool,
) -> Result<()> {
    let mut poller = Poller::new(registry, transport);

    if once {
        let snapshot = poller.poll_once().await?;
        print_snapshot(registry, &snapshot);
        return Ok(());
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        }
    };
    poller
        .run(config.device.scan_interval(), shutdown, |snapshot| {
            print_snapshot(registry, snapshot)
        })
        .await;
    Ok(())
}

async fn write_point<T: RegisterTransport>(
    registry: &Registry,
    transport: T,
    key: &str,
    text: &str,
) -> Result<()> {
    let point = registry
        .point(key)
        .with_context(|| format!("Unknown point: {}", key))?;
    let value = parse_value(point, text)?;

    let mut poller = Poller::new(registry, transport);
    poller.write_value(key, &value).await?;
    println!("{} = {}", key, value);
    Ok(())
}
