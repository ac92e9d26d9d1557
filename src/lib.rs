//! # ns3topo - Topology configuration utility for ns-3 network simulations
//!
//! This library turns a declarative topology description into everything the
//! ns-3 discrete-event simulator needs to run it.
//!
//! ## Overview
//!
//! A topology is a chain of point-to-point "spine" nodes with CSMA LANs and
//! WiFi infrastructure cells hanging off individual spine nodes. Each link,
//! LAN and cell gets its own IPv4 subnet; a UDP echo client and server
//! exchange traffic across the whole network.
//!
//! ## Key Features
//!
//! - **Declarative Topologies**: one YAML file, or the built-in `campus` and `echo` presets
//! - **Deterministic Addressing**: consecutive host numbers per subnet, in a configurable order
//! - **Isolated WiFi Cells**: every cell owns its channel, PHY, SSID and grid placement
//! - **Staged Assembly**: wiring, segments, addressing, applications and tracing run in a fixed order
//! - **Engine Hand-off**: renders an ns-3 program and optionally runs it
//!
//! ## Architecture
//!
//! - `config`: Type-safe configuration structures and validation
//! - `config_loader`: Configuration file loading, presets and CLI overrides
//! - `topology`: Node registry and builders for links, CSMA segments and WiFi cells
//! - `ip`: Subnet planning and the address registry
//! - `apps`: The UDP echo workload
//! - `assembler`: The staged topology assembler
//! - `scenario`: The assembled, fully resolved scenario
//! - `ns3`: Program rendering and engine execution
//! - `orchestrator`: High-level orchestration of artifact generation
//! - `utils`: Durations, link units and validation helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ns3topo::{config_loader, orchestrator};
//! use std::path::Path;
//!
//! let config = config_loader::load_config(Path::new("campus.yaml"))?;
//! let artifacts = orchestrator::generate_ns3_scenario(&config, Path::new("ns3_output"))?;
//!
//! // ns3_output now contains:
//! // - scenario.yaml: the resolved scenario manifest
//! // - address_plan.json: every subnet and interface address
//! // - campus.cc: the ns-3 program
//! println!("{} nodes", artifacts.scenario.node_count());
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   name: campus
//!   stop_time: "31s"
//!
//! backbone:
//!   spine_count: 4
//!   data_rate: 5Mbps
//!   delay: 2ms
//!   subnets: ["10.1.1.0", "10.1.2.0", "10.1.3.0"]
//!
//! csma_segments:
//!   - { name: lan1, anchor: 1, extra_nodes: 3, subnet: "10.1.4.0" }
//!
//! wifi_cells:
//!   - { name: cell0, anchor: 0, stations: 3, subnet: "10.1.6.0" }
//!
//! applications:
//!   echo_server: { node: { segment: lan1, member: last }, start: "1s", stop: "31s" }
//!   echo_client: { node: { segment: cell0, member: last }, start: "2s", stop: "31s" }
//! ```
//!
//! ## Error Handling
//!
//! Domain errors are `thiserror` enums per module; the binary and the
//! orchestrator report them through `color_eyre` with context.

pub mod apps;
pub mod assembler;
pub mod config;
pub mod config_loader;
pub mod ip;
pub mod ns3;
pub mod orchestrator;
pub mod scenario;
pub mod topology;
pub mod utils;
