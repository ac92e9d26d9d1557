//! Declarative topology descriptor.
//!
//! A scenario is described by data: a backbone chain, the CSMA segments and
//! WiFi cells hanging off it, the subnet each of them gets, the echo
//! workload, and tracing options. One generic assembler consumes it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::apps::{check_windows, AppWindow};
use crate::ip::host_capacity;
use crate::topology::mobility::{default_walk_bounds, GridSpec, Rectangle};
use crate::topology::types::{NodeId, RateControl};
use crate::utils::duration::parse_duration_to_seconds;
use crate::utils::units::{DataRate, Delay};
use crate::utils::validation::{validate_distinct_subnets, validate_name, validate_unique_names};

/// Segment name that selects spine nodes in a [`NodeSelector`].
pub const BACKBONE: &str = "backbone";

/// Kinds of segments, in the order the address planner may visit them
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Backbone,
    Csma,
    Wifi,
}

/// Root topology configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub general: GeneralConfig,
    pub backbone: BackboneConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub csma_segments: Vec<CsmaSegmentConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wifi_cells: Vec<WifiCellConfig>,
    #[serde(default)]
    pub addressing: AddressingConfig,
    pub applications: ApplicationsConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_general()?;
        self.validate_backbone()?;
        self.validate_segments()?;
        self.validate_addressing()?;
        self.validate_applications()?;
        self.validate_tracing()?;
        Ok(())
    }

    fn validate_general(&self) -> Result<(), ValidationError> {
        validate_name(&self.general.name)
            .map_err(|e| ValidationError::InvalidGeneral(format!("name: {}", e)))?;

        let stop = self.general.stop_seconds()?;
        if stop <= 0.0 {
            return Err(ValidationError::InvalidGeneral(
                "stop_time must be greater than zero".to_string(),
            ));
        }

        if let Some(level) = &self.general.log_level {
            if !["trace", "debug", "info", "warn", "error"].contains(&level.to_lowercase().as_str()) {
                return Err(ValidationError::InvalidGeneral(format!(
                    "unknown log_level '{}'",
                    level
                )));
            }
        }
        Ok(())
    }

    fn validate_backbone(&self) -> Result<(), ValidationError> {
        let backbone = &self.backbone;
        if backbone.spine_count == 0 {
            return Err(ValidationError::InvalidBackbone(
                "spine_count must be at least 1".to_string(),
            ));
        }
        let links = backbone.spine_count as usize - 1;
        if backbone.subnets.len() != links {
            return Err(ValidationError::InvalidBackbone(format!(
                "{} spine nodes need {} link subnets, got {}",
                backbone.spine_count,
                links,
                backbone.subnets.len()
            )));
        }
        Ok(())
    }

    fn validate_segments(&self) -> Result<(), ValidationError> {
        let names = self
            .csma_segments
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.wifi_cells.iter().map(|c| c.name.as_str()));
        validate_unique_names(names, &[BACKBONE]).map_err(ValidationError::InvalidSegment)?;

        // A bad mask is reported by validate_addressing
        let capacity = host_capacity(&self.addressing.mask).ok();

        for lan in &self.csma_segments {
            validate_name(&lan.name).map_err(ValidationError::InvalidSegment)?;
            self.check_anchor(&lan.name, lan.anchor)?;
            check_capacity(&lan.name, lan.extra_nodes, capacity)?;
        }

        for cell in &self.wifi_cells {
            validate_name(&cell.name).map_err(ValidationError::InvalidSegment)?;
            self.check_anchor(&cell.name, cell.anchor)?;
            check_capacity(&cell.name, cell.stations, capacity)?;
            if cell.ssid.is_empty() || cell.ssid.len() > 32 {
                return Err(ValidationError::InvalidSegment(format!(
                    "cell '{}': ssid must be 1 to 32 characters",
                    cell.name
                )));
            }
            if cell.grid.grid_width == 0 {
                return Err(ValidationError::InvalidSegment(format!(
                    "cell '{}': grid_width must be at least 1",
                    cell.name
                )));
            }
            if !cell.walk_bounds.is_well_formed() {
                return Err(ValidationError::InvalidSegment(format!(
                    "cell '{}': walk_bounds must have min < max on both axes",
                    cell.name
                )));
            }
        }

        let mut anchors: Vec<(u32, &str)> = self
            .wifi_cells
            .iter()
            .map(|c| (c.anchor, c.name.as_str()))
            .collect();
        anchors.sort();
        if let Some(pair) = anchors.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ValidationError::InvalidSegment(format!(
                "cells '{}' and '{}' both use spine {} as access point",
                pair[0].1, pair[1].1, pair[0].0
            )));
        }
        Ok(())
    }

    fn check_anchor(&self, name: &str, anchor: u32) -> Result<(), ValidationError> {
        if anchor >= self.backbone.spine_count {
            return Err(ValidationError::InvalidSegment(format!(
                "segment '{}' is anchored on spine {}, but the backbone has {} spine nodes",
                name, anchor, self.backbone.spine_count
            )));
        }
        Ok(())
    }

    fn validate_addressing(&self) -> Result<(), ValidationError> {
        let order = &self.addressing.order;
        for kind in [SegmentKind::Backbone, SegmentKind::Csma, SegmentKind::Wifi] {
            let count = order.iter().filter(|k| **k == kind).count();
            if count != 1 {
                return Err(ValidationError::InvalidAddressing(format!(
                    "order must list {:?} exactly once",
                    kind
                )));
            }
        }

        validate_distinct_subnets(&self.planned_subnets(), &self.addressing.mask)
            .map_err(ValidationError::InvalidAddressing)
    }

    fn validate_applications(&self) -> Result<(), ValidationError> {
        let server = &self.applications.echo_server;
        let client = &self.applications.echo_client;

        for selector in [&server.node, &client.node] {
            if !self.has_segment(&selector.segment) {
                return Err(ValidationError::InvalidApplication(format!(
                    "node selector refers to unknown segment '{}'",
                    selector.segment
                )));
            }
        }
        if server.port == 0 {
            return Err(ValidationError::InvalidApplication(
                "echo server port cannot be 0".to_string(),
            ));
        }
        if client.max_packets == 0 || client.packet_size == 0 {
            return Err(ValidationError::InvalidApplication(
                "echo client max_packets and packet_size must be positive".to_string(),
            ));
        }
        let interval = seconds(&client.interval, "echo client interval")
            .map_err(ValidationError::InvalidApplication)?;
        if interval <= 0.0 {
            return Err(ValidationError::InvalidApplication(
                "echo client interval must be positive".to_string(),
            ));
        }

        let server_window = server.window().map_err(ValidationError::InvalidApplication)?;
        let client_window = client.window().map_err(ValidationError::InvalidApplication)?;
        check_windows(&server_window, &client_window, self.general.stop_seconds()?)
            .map_err(ValidationError::InvalidApplication)
    }

    fn validate_tracing(&self) -> Result<(), ValidationError> {
        let tracing = &self.tracing;
        if tracing.enabled && tracing.pcap && tracing.pcap_prefix.trim().is_empty() {
            return Err(ValidationError::InvalidTracing(
                "pcap_prefix cannot be empty when pcap tracing is enabled".to_string(),
            ));
        }
        for file in [&tracing.animation_file, &tracing.ascii_file].into_iter().flatten() {
            if file.trim().is_empty() || file.contains('"') {
                return Err(ValidationError::InvalidTracing(format!(
                    "invalid trace file name '{}'",
                    file
                )));
            }
        }

        let total = self.total_nodes();
        if let Some(node) = tracing.positions.keys().find(|&&n| u64::from(n) >= total) {
            return Err(ValidationError::InvalidTracing(format!(
                "position given for node {}, but the scenario has {} nodes",
                node, total
            )));
        }
        Ok(())
    }

    /// Nodes the scenario will create: spines, extra CSMA hosts and stations
    pub fn total_nodes(&self) -> u64 {
        let hosts: u64 = self.csma_segments.iter().map(|l| u64::from(l.extra_nodes)).sum();
        let stations: u64 = self.wifi_cells.iter().map(|c| u64::from(c.stations)).sum();
        u64::from(self.backbone.spine_count) + hosts + stations
    }

    /// `(owner, network)` for every subnet in planning order
    pub fn planned_subnets(&self) -> Vec<(String, String)> {
        let mut subnets = Vec::new();
        for kind in &self.addressing.order {
            match kind {
                SegmentKind::Backbone => subnets.extend(
                    self.backbone
                        .subnets
                        .iter()
                        .enumerate()
                        .map(|(i, s)| (crate::topology::backbone::link_name(i), s.clone())),
                ),
                SegmentKind::Csma => subnets.extend(
                    self.csma_segments.iter().map(|l| (l.name.clone(), l.subnet.clone())),
                ),
                SegmentKind::Wifi => subnets.extend(
                    self.wifi_cells.iter().map(|c| (c.name.clone(), c.subnet.clone())),
                ),
            }
        }
        subnets
    }

    pub fn has_segment(&self, name: &str) -> bool {
        name == BACKBONE
            || self.csma_segments.iter().any(|s| s.name == name)
            || self.wifi_cells.iter().any(|c| c.name == name)
    }
}

/// Scenario-wide settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneralConfig {
    pub name: String,
    pub stop_time: String,
    #[serde(default = "default_true")]
    pub verbose: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl GeneralConfig {
    pub fn stop_seconds(&self) -> Result<f64, ValidationError> {
        seconds(&self.stop_time, "stop_time").map_err(ValidationError::InvalidGeneral)
    }
}

/// The point-to-point spine chain
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BackboneConfig {
    pub spine_count: u32,
    #[serde(default = "default_p2p_rate")]
    pub data_rate: DataRate,
    #[serde(default = "default_p2p_delay")]
    pub delay: Delay,
    /// One subnet per link, link `i` joins spine `i` and `i + 1`
    pub subnets: Vec<String>,
}

/// A CSMA LAN attached to a spine node
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CsmaSegmentConfig {
    pub name: String,
    /// Spine index the segment hangs off
    pub anchor: u32,
    pub extra_nodes: u32,
    #[serde(default = "default_csma_rate")]
    pub data_rate: DataRate,
    #[serde(default = "default_csma_delay")]
    pub delay: Delay,
    pub subnet: String,
}

/// A WiFi infrastructure cell whose access point is a spine node
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WifiCellConfig {
    pub name: String,
    pub anchor: u32,
    pub stations: u32,
    #[serde(default = "default_ssid")]
    pub ssid: String,
    pub subnet: String,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default = "default_walk_bounds")]
    pub walk_bounds: Rectangle,
    #[serde(default)]
    pub rate_control: RateControl,
}

/// Mask and planning order shared by every subnet
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AddressingConfig {
    #[serde(default = "default_mask")]
    pub mask: String,
    #[serde(default = "default_order")]
    pub order: Vec<SegmentKind>,
}

impl Default for AddressingConfig {
    fn default() -> Self {
        AddressingConfig { mask: default_mask(), order: default_order() }
    }
}

/// The echo workload
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApplicationsConfig {
    pub echo_server: EchoServerConfig,
    pub echo_client: EchoClientConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EchoServerConfig {
    pub node: NodeSelector,
    #[serde(default = "default_echo_port")]
    pub port: u16,
    pub start: String,
    pub stop: String,
}

impl EchoServerConfig {
    pub fn window(&self) -> Result<AppWindow, String> {
        Ok(AppWindow::new(
            seconds(&self.start, "echo server start")?,
            seconds(&self.stop, "echo server stop")?,
        ))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EchoClientConfig {
    pub node: NodeSelector,
    #[serde(default = "default_max_packets")]
    pub max_packets: u32,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_packet_size")]
    pub packet_size: u32,
    pub start: String,
    pub stop: String,
}

impl EchoClientConfig {
    pub fn window(&self) -> Result<AppWindow, String> {
        Ok(AppWindow::new(
            seconds(&self.start, "echo client start")?,
            seconds(&self.stop, "echo client stop")?,
        ))
    }
}

/// Picks one node by segment name and position within the segment
///
/// Segment members are ordered anchor first, so `first` on a CSMA segment or
/// WiFi cell is its spine node and `last` is the newest host or station.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NodeSelector {
    pub segment: String,
    #[serde(default)]
    pub member: MemberSelector,
}

impl NodeSelector {
    pub fn new(segment: impl Into<String>, member: MemberSelector) -> Self {
        NodeSelector { segment: segment.into(), member }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum MemberSelector {
    Index(usize),
    Keyword(MemberKeyword),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberKeyword {
    First,
    Last,
}

impl Default for MemberSelector {
    fn default() -> Self {
        MemberSelector::Keyword(MemberKeyword::Last)
    }
}

impl MemberSelector {
    pub fn pick(&self, members: &[NodeId]) -> Option<NodeId> {
        match self {
            MemberSelector::Index(i) => members.get(*i).copied(),
            MemberSelector::Keyword(MemberKeyword::First) => members.first().copied(),
            MemberSelector::Keyword(MemberKeyword::Last) => members.last().copied(),
        }
    }
}

/// Packet capture and animation output
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TracingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-device pcap captures; ASCII and animation output are separate
    #[serde(default = "default_true")]
    pub pcap: bool,
    #[serde(default = "default_pcap_prefix")]
    pub pcap_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascii_file: Option<String>,
    /// Fixed animation coordinates by node id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub positions: BTreeMap<NodeId, [f64; 2]>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        TracingConfig {
            enabled: true,
            pcap: true,
            pcap_prefix: default_pcap_prefix(),
            animation_file: None,
            ascii_file: None,
            positions: BTreeMap::new(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid backbone configuration: {0}")]
    InvalidBackbone(String),
    #[error("Invalid segment configuration: {0}")]
    InvalidSegment(String),
    #[error("Invalid addressing configuration: {0}")]
    InvalidAddressing(String),
    #[error("Invalid application configuration: {0}")]
    InvalidApplication(String),
    #[error("Invalid tracing configuration: {0}")]
    InvalidTracing(String),
}

/// The anchor takes one address next to the `count` new nodes
fn check_capacity(name: &str, count: u32, capacity: Option<u32>) -> Result<(), ValidationError> {
    match capacity {
        Some(capacity) if u64::from(count) + 1 > u64::from(capacity) => {
            Err(ValidationError::InvalidSegment(format!(
                "segment '{}' needs {} addresses, its subnet holds {}",
                name,
                u64::from(count) + 1,
                capacity
            )))
        }
        _ => Ok(()),
    }
}

fn seconds(value: &str, what: &str) -> Result<f64, String> {
    parse_duration_to_seconds(value).map_err(|e| format!("{}: {}", what, e))
}

fn default_true() -> bool {
    true
}

fn default_p2p_rate() -> DataRate {
    DataRate::from_bps(5_000_000)
}

fn default_p2p_delay() -> Delay {
    Delay::from_nanos(2_000_000)
}

fn default_csma_rate() -> DataRate {
    DataRate::from_bps(100_000_000)
}

fn default_csma_delay() -> Delay {
    Delay::from_nanos(6_560)
}

fn default_ssid() -> String {
    "ns-3-ssid".to_string()
}

fn default_mask() -> String {
    "255.255.255.0".to_string()
}

fn default_order() -> Vec<SegmentKind> {
    vec![SegmentKind::Backbone, SegmentKind::Csma, SegmentKind::Wifi]
}

fn default_echo_port() -> u16 {
    9
}

fn default_max_packets() -> u32 {
    1
}

fn default_interval() -> String {
    "1s".to_string()
}

fn default_packet_size() -> u32 {
    1024
}

fn default_pcap_prefix() -> String {
    "ns3topo".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
general:
  name: "mini"
  stop_time: "10s"
backbone:
  spine_count: 2
  subnets: ["10.1.1.0"]
applications:
  echo_server:
    node: { segment: backbone, member: 1 }
    start: "0s"
    stop: "10s"
  echo_client:
    node: { segment: backbone, member: first }
    start: "1s"
    stop: "10s"
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        assert!(config.validate().is_ok());

        assert!(config.general.verbose);
        assert_eq!(config.backbone.data_rate.to_string(), "5Mbps");
        assert_eq!(config.backbone.delay.to_string(), "2ms");
        assert_eq!(config.addressing.mask, "255.255.255.0");
        assert_eq!(
            config.addressing.order,
            vec![SegmentKind::Backbone, SegmentKind::Csma, SegmentKind::Wifi]
        );
        assert_eq!(config.applications.echo_server.port, 9);
        assert_eq!(config.applications.echo_client.packet_size, 1024);
        assert_eq!(config.applications.echo_client.node.member, MemberSelector::Keyword(MemberKeyword::First));
        assert_eq!(config.applications.echo_server.node.member, MemberSelector::Index(1));
        assert!(config.tracing.enabled);
        assert!(config.tracing.pcap);
    }

    #[test]
    fn test_segment_defaults() {
        let yaml = r#"
name: "cell0"
anchor: 0
stations: 3
subnet: "10.1.6.0"
"#;
        let cell: WifiCellConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cell.ssid, "ns-3-ssid");
        assert_eq!(cell.grid, GridSpec::default());
        assert_eq!(cell.walk_bounds, default_walk_bounds());
        assert_eq!(cell.rate_control, RateControl::Aarf);

        let yaml = r#"
name: "lan1"
anchor: 1
extra_nodes: 3
subnet: "10.1.4.0"
"#;
        let lan: CsmaSegmentConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(lan.data_rate.to_string(), "100Mbps");
        assert_eq!(lan.delay.to_string(), "6560ns");
    }

    #[test]
    fn test_member_selector_pick() {
        let members = [1, 4, 5, 6];
        assert_eq!(MemberSelector::Keyword(MemberKeyword::First).pick(&members), Some(1));
        assert_eq!(MemberSelector::Keyword(MemberKeyword::Last).pick(&members), Some(6));
        assert_eq!(MemberSelector::Index(2).pick(&members), Some(5));
        assert_eq!(MemberSelector::Index(4).pick(&members), None);
        assert_eq!(MemberSelector::default().pick(&[]), None);
    }

    #[test]
    fn test_link_subnet_count_must_match() {
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        config.backbone.subnets.push("10.1.2.0".to_string());
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBackbone(_))));
    }

    #[test]
    fn test_duplicate_subnet_rejected() {
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        config.csma_segments.push(CsmaSegmentConfig {
            name: "lan0".to_string(),
            anchor: 0,
            extra_nodes: 1,
            data_rate: default_csma_rate(),
            delay: default_csma_delay(),
            subnet: "10.1.1.0".to_string(),
        });
        assert!(matches!(config.validate(), Err(ValidationError::InvalidAddressing(_))));
    }

    #[test]
    fn test_anchor_out_of_range() {
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        config.csma_segments.push(CsmaSegmentConfig {
            name: "lan5".to_string(),
            anchor: 5,
            extra_nodes: 1,
            data_rate: default_csma_rate(),
            delay: default_csma_delay(),
            subnet: "10.1.9.0".to_string(),
        });
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSegment(_))));
    }

    #[test]
    fn test_unknown_selector_segment() {
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        config.applications.echo_client.node.segment = "nowhere".to_string();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidApplication(_))));
    }

    #[test]
    fn test_order_must_be_complete() {
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        config.addressing.order = vec![SegmentKind::Backbone, SegmentKind::Backbone, SegmentKind::Wifi];
        assert!(matches!(config.validate(), Err(ValidationError::InvalidAddressing(_))));
    }

    #[test]
    fn test_bad_stop_time() {
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        config.general.stop_time = "soon".to_string();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidGeneral(_))));
        config.general.stop_time = "0s".to_string();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidGeneral(_))));
    }

    #[test]
    fn test_planned_subnets_follow_order() {
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        config.addressing.order = vec![SegmentKind::Wifi, SegmentKind::Csma, SegmentKind::Backbone];
        config.csma_segments.push(CsmaSegmentConfig {
            name: "lan1".to_string(),
            anchor: 1,
            extra_nodes: 2,
            data_rate: default_csma_rate(),
            delay: default_csma_delay(),
            subnet: "10.1.2.0".to_string(),
        });
        let owners: Vec<String> = config.planned_subnets().into_iter().map(|(o, _)| o).collect();
        assert_eq!(owners, vec!["lan1".to_string(), "link0".to_string()]);
    }

    fn lan(name: &str, extra_nodes: u32, subnet: &str) -> CsmaSegmentConfig {
        CsmaSegmentConfig {
            name: name.to_string(),
            anchor: 1,
            extra_nodes,
            data_rate: default_csma_rate(),
            delay: default_csma_delay(),
            subnet: subnet.to_string(),
        }
    }

    #[test]
    fn test_segment_must_fit_its_subnet() {
        // A /24 holds 254 hosts: the anchor plus 253 extras
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        config.csma_segments.push(lan("lan1", 253, "10.1.2.0"));
        assert!(config.validate().is_ok());

        config.csma_segments[0].extra_nodes = 254;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSegment(_))));

        config.csma_segments[0].extra_nodes = u32::MAX;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSegment(_))));

        config.csma_segments[0].extra_nodes = 3;
        config.addressing.mask = "255.255.255.252".to_string();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSegment(_))));
    }

    #[test]
    fn test_cell_stations_must_fit_subnet() {
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        let yaml = "name: cell0\nanchor: 0\nstations: 254\nsubnet: \"10.1.6.0\"\n";
        config.wifi_cells.push(serde_yaml::from_str(yaml).unwrap());
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSegment(_))));
    }

    #[test]
    fn test_total_nodes() {
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(config.total_nodes(), 2);
        config.csma_segments.push(lan("lan1", 3, "10.1.2.0"));
        config.csma_segments.push(lan("lan2", u32::MAX, "10.1.3.0"));
        assert_eq!(config.total_nodes(), 5 + u64::from(u32::MAX));
    }

    #[test]
    fn test_position_for_missing_node_rejected() {
        let mut config: Config = serde_yaml::from_str(MINIMAL).unwrap();
        config.tracing.positions.insert(1, [10.0, 20.0]);
        assert!(config.validate().is_ok());

        config.tracing.positions.insert(2, [10.0, 20.0]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTracing(_)));
        assert!(err.to_string().contains("node 2"));
    }
}
