//! Scenario orchestrator.
//!
//! This module coordinates the overall generation process, from an assembled
//! configuration to the files the ns-3 engine consumes:
//!
//! - `scenario.yaml`: the resolved scenario manifest
//! - `address_plan.json`: every subnet and interface address, in planning order
//! - `<name>.cc`: the ns-3 program

use color_eyre::eyre::{eyre, WrapErr};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assembler::assemble;
use crate::config::Config;
use crate::ip::AddressRegistry;
use crate::ns3::render_program;
use crate::scenario::Scenario;
use crate::topology::types::NodeRole;

pub const SCENARIO_FILE: &str = "scenario.yaml";
pub const ADDRESS_PLAN_FILE: &str = "address_plan.json";

/// Paths of everything written for one scenario.
#[derive(Debug, Clone)]
pub struct GeneratedArtifacts {
    pub scenario: Scenario,
    pub manifest_path: PathBuf,
    pub address_plan_path: PathBuf,
    pub program_path: PathBuf,
}

/// Assemble `config` and write its artifacts into `output_dir`.
pub fn generate_ns3_scenario(config: &Config, output_dir: &Path) -> color_eyre::Result<GeneratedArtifacts> {
    let scenario = assemble(config)
        .wrap_err_with(|| format!("Failed to assemble topology '{}'", config.general.name))?;

    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    // Scenario manifest
    let manifest_path = output_dir.join(SCENARIO_FILE);
    let manifest = serde_yaml::to_string(&scenario)?;
    fs::write(&manifest_path, manifest)
        .wrap_err_with(|| format!("Failed to write '{}'", manifest_path.display()))?;

    // Address plan
    let address_plan_path = output_dir.join(ADDRESS_PLAN_FILE);
    let address_plan = serde_json::to_string_pretty(&scenario.address_plan)?;
    fs::write(&address_plan_path, address_plan)
        .wrap_err_with(|| format!("Failed to write '{}'", address_plan_path.display()))?;

    // ns-3 program
    let program_path = output_dir.join(format!("{}.cc", scenario.name));
    let program = render_program(&scenario).map_err(|e| eyre!("Failed to render program: {}", e))?;
    fs::write(&program_path, program)
        .wrap_err_with(|| format!("Failed to write '{}'", program_path.display()))?;

    print_summary(&scenario, &program_path)?;

    Ok(GeneratedArtifacts { scenario, manifest_path, address_plan_path, program_path })
}

fn print_summary(scenario: &Scenario, program_path: &Path) -> color_eyre::Result<()> {
    let count = |role| scenario.nodes_with_role(role).count();

    println!("Generated ns-3 scenario '{}' at {:?}", scenario.name, program_path);
    println!("  - Simulation time: {}s", scenario.stop_time);
    println!(
        "  - Nodes: {} ({} spine, {} CSMA hosts, {} WiFi stations)",
        scenario.node_count(),
        count(NodeRole::Spine),
        count(NodeRole::CsmaHost),
        count(NodeRole::Station)
    );
    println!(
        "  - Segments: {} point-to-point links, {} CSMA segments, {} WiFi cells",
        scenario.links.len(),
        scenario.csma_segments.len(),
        scenario.wifi_cells.len()
    );

    let apps = &scenario.applications;
    println!(
        "  - Echo: node {} -> {}:{} (node {})",
        apps.client.node, apps.client.remote, apps.client.port, apps.server.node
    );

    // IP allocation statistics
    let registry = AddressRegistry::from_blocks(&scenario.address_plan).map_err(|e| eyre!(e))?;
    println!("  - IP Allocation Summary:");
    for (subnet, count) in registry.get_allocation_stats() {
        println!("    - {}: {} IPs assigned", subnet, count);
    }
    println!("  - Total IPs assigned: {}", registry.total_assigned());

    if scenario.tracing.enabled {
        info!(
            "Tracing with prefix '{}'{}",
            scenario.tracing.pcap_prefix,
            scenario
                .tracing
                .animation_file
                .as_ref()
                .map(|f| format!(", animation in '{}'", f))
                .unwrap_or_default()
        );
    }
    Ok(())
}
