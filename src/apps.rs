//! Echo workload.
//!
//! One UDP echo server and one UDP echo client. The client's active window
//! must sit inside the server's, and neither may outlive the simulation.

use serde::Serialize;
use std::net::Ipv4Addr;

use crate::topology::types::NodeId;

/// Start/stop times of an application, in simulated seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppWindow {
    pub start: f64,
    pub stop: f64,
}

impl AppWindow {
    pub fn new(start: f64, stop: f64) -> Self {
        AppWindow { start, stop }
    }

    pub fn is_well_formed(&self) -> bool {
        self.start >= 0.0 && self.start < self.stop
    }

    /// True when `inner` starts no earlier and stops no later than `self`.
    pub fn contains(&self, inner: &AppWindow) -> bool {
        self.start <= inner.start && inner.stop <= self.stop
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoServer {
    pub node: NodeId,
    pub port: u16,
    pub window: AppWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoClient {
    pub node: NodeId,
    pub remote: Ipv4Addr,
    pub port: u16,
    pub max_packets: u32,
    pub interval: f64,
    pub packet_size: u32,
    pub window: AppWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoApplications {
    pub server: EchoServer,
    pub client: EchoClient,
}

/// Check `server.start <= client.start < client.stop <= server.stop <= stop_time`.
pub fn check_windows(server: &AppWindow, client: &AppWindow, stop_time: f64) -> Result<(), String> {
    if !server.is_well_formed() {
        return Err(format!(
            "echo server window [{}s, {}s) must start at or after 0 and before it stops",
            server.start, server.stop
        ));
    }
    if !client.is_well_formed() {
        return Err(format!(
            "echo client window [{}s, {}s) must start at or after 0 and before it stops",
            client.start, client.stop
        ));
    }
    if !server.contains(client) {
        return Err(format!(
            "echo client window [{}s, {}s) must lie inside the server window [{}s, {}s)",
            client.start, client.stop, server.start, server.stop
        ));
    }
    if server.stop > stop_time {
        return Err(format!(
            "echo server stops at {}s, after the simulation stop time {}s",
            server.stop, stop_time
        ));
    }
    Ok(())
}
