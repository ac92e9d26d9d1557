//! Configuration loading, built-in presets and command-line overrides.

use crate::config::{
    AddressingConfig, ApplicationsConfig, BackboneConfig, Config, CsmaSegmentConfig,
    EchoClientConfig, EchoServerConfig, GeneralConfig, MemberKeyword, MemberSelector,
    NodeSelector, TracingConfig, WifiCellConfig, BACKBONE,
};
use crate::topology::mobility::{default_walk_bounds, GridSpec};
use crate::topology::types::RateControl;
use crate::utils::units::{DataRate, Delay};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    // Open the configuration file
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    // Parse the YAML content
    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    info!(
        "Loaded topology '{}': {} spine nodes, {} CSMA segments, {} WiFi cells",
        config.general.name,
        config.backbone.spine_count,
        config.csma_segments.len(),
        config.wifi_cells.len()
    );

    // Validate the configuration
    config.validate()?;

    Ok(config)
}

/// Write a configuration back out as YAML
pub fn write_config(config: &Config, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(path, yaml)
        .wrap_err_with(|| format!("Failed to write configuration '{}'", path.display()))?;
    info!("Wrote resolved configuration to {:?}", path);
    Ok(())
}

/// Built-in topologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Four spine nodes, CSMA LANs on the inner two, WiFi cells on the outer two
    Campus,
    /// Two nodes on one point-to-point link with an ASCII trace
    Echo,
}

/// Defaults of the `nCsma` / `nWifi` flags
pub const DEFAULT_CSMA_EXTRA: u32 = 3;
pub const DEFAULT_WIFI_STATIONS: u32 = 3;

/// Build the configuration of a preset
pub fn preset_config(preset: Preset) -> Config {
    match preset {
        Preset::Campus => campus(DEFAULT_CSMA_EXTRA, DEFAULT_WIFI_STATIONS),
        Preset::Echo => echo(),
    }
}

fn campus(n_csma: u32, n_wifi: u32) -> Config {
    let lan = |name: &str, anchor: u32, subnet: &str| CsmaSegmentConfig {
        name: name.to_string(),
        anchor,
        extra_nodes: n_csma,
        data_rate: DataRate::from_bps(100_000_000),
        delay: Delay::from_nanos(6_560),
        subnet: subnet.to_string(),
    };
    let cell = |name: &str, anchor: u32, subnet: &str| WifiCellConfig {
        name: name.to_string(),
        anchor,
        stations: n_wifi,
        ssid: "ns-3-ssid".to_string(),
        subnet: subnet.to_string(),
        grid: GridSpec::default(),
        walk_bounds: default_walk_bounds(),
        rate_control: RateControl::Aarf,
    };

    Config {
        general: GeneralConfig {
            name: "campus".to_string(),
            stop_time: "31s".to_string(),
            verbose: true,
            log_level: None,
        },
        backbone: BackboneConfig {
            spine_count: 4,
            data_rate: DataRate::from_bps(5_000_000),
            delay: Delay::from_nanos(2_000_000),
            subnets: vec!["10.1.1.0".to_string(), "10.1.2.0".to_string(), "10.1.3.0".to_string()],
        },
        csma_segments: vec![lan("lan1", 1, "10.1.4.0"), lan("lan2", 2, "10.1.5.0")],
        wifi_cells: vec![cell("cell0", 0, "10.1.6.0"), cell("cell3", 3, "10.1.7.0")],
        addressing: AddressingConfig::default(),
        applications: ApplicationsConfig {
            echo_server: EchoServerConfig {
                node: NodeSelector::new("lan2", MemberSelector::Keyword(MemberKeyword::Last)),
                port: 9,
                start: "1s".to_string(),
                stop: "31s".to_string(),
            },
            echo_client: EchoClientConfig {
                node: NodeSelector::new("cell0", MemberSelector::Keyword(MemberKeyword::Last)),
                max_packets: 1,
                interval: "1s".to_string(),
                packet_size: 1024,
                start: "2s".to_string(),
                stop: "31s".to_string(),
            },
        },
        tracing: TracingConfig {
            enabled: true,
            pcap: true,
            pcap_prefix: "campus".to_string(),
            animation_file: Some("campus-anim.xml".to_string()),
            ascii_file: None,
            positions: BTreeMap::new(),
        },
    }
}

fn echo() -> Config {
    Config {
        general: GeneralConfig {
            name: "echo".to_string(),
            stop_time: "10s".to_string(),
            verbose: true,
            log_level: None,
        },
        backbone: BackboneConfig {
            spine_count: 2,
            data_rate: DataRate::from_bps(5_000_000),
            delay: Delay::from_nanos(2_000_000),
            subnets: vec!["10.1.1.0".to_string()],
        },
        csma_segments: Vec::new(),
        wifi_cells: Vec::new(),
        addressing: AddressingConfig::default(),
        applications: ApplicationsConfig {
            echo_server: EchoServerConfig {
                node: NodeSelector::new(BACKBONE, MemberSelector::Index(1)),
                port: 9,
                start: "0s".to_string(),
                stop: "10s".to_string(),
            },
            echo_client: EchoClientConfig {
                node: NodeSelector::new(BACKBONE, MemberSelector::Index(0)),
                max_packets: 10,
                interval: "1s".to_string(),
                packet_size: 1024,
                start: "0s".to_string(),
                stop: "10s".to_string(),
            },
        },
        tracing: TracingConfig {
            enabled: true,
            pcap: false,
            pcap_prefix: "echo".to_string(),
            animation_file: None,
            ascii_file: Some("myfirst.tr".to_string()),
            positions: BTreeMap::new(),
        },
    }
}

/// CLI arguments that can override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub n_csma: Option<u32>,
    pub n_wifi: Option<u32>,
    pub verbose: Option<bool>,
    pub tracing: Option<bool>,
}

/// Apply CLI overrides to a configuration
pub fn apply_cli_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(n_csma) = overrides.n_csma {
        if config.csma_segments.is_empty() {
            warn!("nCsma={} ignored: topology '{}' has no CSMA segments", n_csma, config.general.name);
        }
        for lan in config.csma_segments.iter_mut() {
            lan.extra_nodes = n_csma;
        }
    }

    if let Some(n_wifi) = overrides.n_wifi {
        if config.wifi_cells.is_empty() {
            warn!("nWifi={} ignored: topology '{}' has no WiFi cells", n_wifi, config.general.name);
        }
        for cell in config.wifi_cells.iter_mut() {
            cell.stations = n_wifi;
        }
    }

    if let Some(verbose) = overrides.verbose {
        config.general.verbose = verbose;
    }

    if let Some(tracing) = overrides.tracing {
        config.tracing.enabled = tracing;
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_presets_validate() {
        assert!(preset_config(Preset::Campus).validate().is_ok());
        assert!(preset_config(Preset::Echo).validate().is_ok());
    }

    #[test]
    fn test_load_config() {
        let yaml = r#"
general:
  name: "lab"
  stop_time: "20s"
backbone:
  spine_count: 3
  subnets: ["10.2.1.0", "10.2.2.0"]
csma_segments:
  - name: "lan1"
    anchor: 1
    extra_nodes: 2
    subnet: "10.2.3.0"
applications:
  echo_server:
    node: { segment: lan1, member: last }
    start: "1s"
    stop: "20s"
  echo_client:
    node: { segment: backbone, member: 0 }
    start: "2s"
    stop: "20s"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.general.name, "lab");
        assert_eq!(config.csma_segments[0].extra_nodes, 2);
    }

    #[test]
    fn test_load_invalid_config() {
        let yaml = r#"
general:
  name: "lab"
  stop_time: "20s"
backbone:
  spine_count: 3
  subnets: ["10.2.1.0", "10.2.1.0"]
applications:
  echo_server:
    node: { segment: backbone }
    start: "1s"
    stop: "20s"
  echo_client:
    node: { segment: backbone, member: 0 }
    start: "2s"
    stop: "20s"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();
        assert!(load_config(temp_file.path()).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = preset_config(Preset::Campus);
        let overrides = CliOverrides {
            n_csma: Some(5),
            n_wifi: Some(2),
            verbose: Some(false),
            tracing: Some(false),
        };

        apply_cli_overrides(&mut config, &overrides).unwrap();
        assert!(config.csma_segments.iter().all(|l| l.extra_nodes == 5));
        assert!(config.wifi_cells.iter().all(|c| c.stations == 2));
        assert!(!config.general.verbose);
        assert!(!config.tracing.enabled);
    }

    #[test]
    fn test_oversized_host_count_rejected() {
        let mut config = preset_config(Preset::Campus);
        let overrides = CliOverrides { n_csma: Some(u32::MAX), ..Default::default() };
        assert!(apply_cli_overrides(&mut config, &overrides).is_err());

        let mut config = preset_config(Preset::Campus);
        let overrides = CliOverrides { n_wifi: Some(254), ..Default::default() };
        assert!(apply_cli_overrides(&mut config, &overrides).is_err());
    }

    #[test]
    fn test_echo_preset_writes_ascii_trace_only() {
        let tracing = preset_config(Preset::Echo).tracing;
        assert!(tracing.enabled);
        assert!(!tracing.pcap);
        assert_eq!(tracing.ascii_file.as_deref(), Some("myfirst.tr"));
    }

    #[test]
    fn test_empty_overrides_leave_config_untouched() {
        let mut config = preset_config(Preset::Echo);
        apply_cli_overrides(&mut config, &CliOverrides::default()).unwrap();
        assert_eq!(config, preset_config(Preset::Echo));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.yaml");
        let config = preset_config(Preset::Campus);

        write_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }
}
