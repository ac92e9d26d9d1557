use clap::{ArgAction, Parser};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use ns3topo::config::Config;
use ns3topo::config_loader::{self, CliOverrides, Preset};
use ns3topo::ns3::Ns3Runner;
use ns3topo::orchestrator::generate_ns3_scenario;

/// Topology configuration utility for ns-3 network simulations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a topology configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in topology used when no configuration file is given
    #[arg(short, long, value_enum, default_value = "campus")]
    preset: Preset,

    /// Output directory for the manifest, address plan and ns-3 program
    #[arg(short, long, default_value = "ns3_output")]
    output: PathBuf,

    /// Extra hosts on every CSMA segment
    #[arg(long, alias = "nCsma")]
    n_csma: Option<u32>,

    /// Stations in every WiFi cell
    #[arg(long, alias = "nWifi")]
    n_wifi: Option<u32>,

    /// Enable echo application logging in the simulation
    #[arg(long, action = ArgAction::Set)]
    verbose: Option<bool>,

    /// Enable pcap, ASCII and animation tracing
    #[arg(long, action = ArgAction::Set)]
    tracing: Option<bool>,

    /// Write the resolved configuration to this path
    #[arg(long)]
    emit_config: Option<PathBuf>,

    /// ns-3 source tree; when given, the generated program is run there
    #[arg(long)]
    ns3_dir: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            n_csma: self.n_csma,
            n_wifi: self.n_wifi,
            verbose: self.verbose,
            tracing: self.tracing,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    let mut config: Config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => config_loader::preset_config(args.preset),
    };
    config_loader::apply_cli_overrides(&mut config, &args.overrides())?;

    // Initialize logging; RUST_LOG wins over `general.log_level`
    env_logger::Builder::from_env(Env::default().default_filter_or(log_filter(&config))).init();

    info!("Starting ns3topo");
    match &args.config {
        Some(path) => info!("Configuration: {:?}", path),
        None => info!("Using built-in preset {:?}", args.preset),
    }
    info!("Output directory: {:?}", args.output);

    if let Some(path) = &args.emit_config {
        config_loader::write_config(&config, path)?;
    }

    let artifacts = generate_ns3_scenario(&config, &args.output)?;

    match &args.ns3_dir {
        Some(ns3_dir) => {
            let log_path = args.output.join(format!("{}.log", artifacts.scenario.name));
            let stage = Ns3Runner::new(ns3_dir)
                .run(&artifacts.scenario.name, &artifacts.program_path, &log_path)
                .wrap_err("ns-3 run failed")?;
            info!("Scenario '{}' reached stage {}", artifacts.scenario.name, stage);
        }
        None => {
            info!(
                "Ready to run with: cp {:?} <ns-3>/scratch/ && ./ns3 run scratch/{}",
                artifacts.program_path, artifacts.scenario.name
            );
        }
    }

    info!("Scenario generation completed successfully");
    Ok(())
}

fn log_filter(config: &Config) -> String {
    config
        .general
        .log_level
        .as_deref()
        .unwrap_or("info")
        .to_lowercase()
}
