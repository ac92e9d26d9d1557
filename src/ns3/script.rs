//! Renders a [`Scenario`] as an ns-3 C++ program.
//!
//! All nodes are created in one `NodeContainer` so the engine's node ids
//! match the scenario's. Every link, LAN and cell gets its own helper
//! variables, indexed by position, so no two segments share a channel,
//! PHY, MAC or mobility helper.

use std::fmt::{self, Write};

use crate::scenario::Scenario;
use crate::topology::mobility::MobilityModel;
use crate::topology::types::{GroupLabel, NodeId, WifiCell};
use crate::utils::duration::format_seconds;

/// Device containers of one segment, keyed by interface group.
struct SegmentDevices {
    segment: String,
    groups: Vec<(GroupLabel, String)>,
}

impl SegmentDevices {
    fn var_for(&self, label: GroupLabel) -> Option<&str> {
        self.groups.iter().find(|(l, _)| *l == label).map(|(_, v)| v.as_str())
    }
}

/// Render the complete program.
pub fn render_program(scenario: &Scenario) -> Result<String, fmt::Error> {
    let mut s = String::new();
    let mut devices = Vec::new();

    write_includes(&mut s, scenario)?;
    writeln!(s, "using namespace ns3;")?;
    writeln!(s)?;
    writeln!(s, "NS_LOG_COMPONENT_DEFINE(\"{}\");", log_component(&scenario.name))?;
    writeln!(s)?;
    writeln!(s, "int")?;
    writeln!(s, "main(int argc, char* argv[])")?;
    writeln!(s, "{{")?;
    writeln!(s, "    CommandLine cmd(__FILE__);")?;
    writeln!(s, "    cmd.Parse(argc, argv);")?;
    writeln!(s)?;

    if scenario.verbose {
        writeln!(s, "    LogComponentEnable(\"UdpEchoClientApplication\", LOG_LEVEL_INFO);")?;
        writeln!(s, "    LogComponentEnable(\"UdpEchoServerApplication\", LOG_LEVEL_INFO);")?;
        writeln!(s)?;
    }

    writeln!(s, "    NodeContainer nodes;")?;
    writeln!(s, "    nodes.Create({});", scenario.node_count())?;
    writeln!(s)?;

    for (i, link) in scenario.links.iter().enumerate() {
        let helper = format!("p2p{}", i);
        let devs = format!("p2pDevices{}", i);
        writeln!(s, "    // {}", link.segment.name)?;
        write_node_container(&mut s, &format!("p2pNodes{}", i), &link.segment.members)?;
        writeln!(s, "    PointToPointHelper {};", helper)?;
        writeln!(s, "    {}.SetDeviceAttribute(\"DataRate\", StringValue(\"{}\"));", helper, link.data_rate)?;
        writeln!(s, "    {}.SetChannelAttribute(\"Delay\", StringValue(\"{}\"));", helper, link.delay)?;
        writeln!(s, "    NetDeviceContainer {} = {}.Install(p2pNodes{});", devs, helper, i)?;
        writeln!(s)?;
        devices.push(SegmentDevices {
            segment: link.segment.name.clone(),
            groups: vec![(GroupLabel::Endpoints, devs)],
        });
    }

    for (i, lan) in scenario.csma_segments.iter().enumerate() {
        let helper = format!("csma{}", i);
        let devs = format!("csmaDevices{}", i);
        writeln!(s, "    // {}", lan.segment.name)?;
        write_node_container(&mut s, &format!("csmaNodes{}", i), &lan.segment.members)?;
        writeln!(s, "    CsmaHelper {};", helper)?;
        writeln!(s, "    {}.SetChannelAttribute(\"DataRate\", StringValue(\"{}\"));", helper, lan.data_rate)?;
        writeln!(
            s,
            "    {}.SetChannelAttribute(\"Delay\", TimeValue(NanoSeconds({})));",
            helper,
            lan.delay.nanos()
        )?;
        writeln!(s, "    NetDeviceContainer {} = {}.Install(csmaNodes{});", devs, helper, i)?;
        writeln!(s)?;
        devices.push(SegmentDevices {
            segment: lan.segment.name.clone(),
            groups: vec![(GroupLabel::Hosts, devs)],
        });
    }

    for (i, cell) in scenario.wifi_cells.iter().enumerate() {
        devices.push(write_cell(&mut s, i, cell)?);
    }

    writeln!(s, "    InternetStackHelper stack;")?;
    writeln!(s, "    stack.Install(nodes);")?;
    writeln!(s)?;

    write_addresses(&mut s, scenario, &devices)?;
    write_applications(&mut s, scenario)?;
    write_tracing(&mut s, scenario)?;

    writeln!(s, "    Simulator::Stop(Seconds({}));", format_seconds(scenario.stop_time))?;
    writeln!(s, "    Simulator::Run();")?;
    writeln!(s, "    Simulator::Destroy();")?;
    writeln!(s, "    return 0;")?;
    writeln!(s, "}}")?;
    Ok(s)
}

fn write_includes(s: &mut String, scenario: &Scenario) -> fmt::Result {
    let mut modules = vec!["core", "network", "internet"];
    if !scenario.links.is_empty() {
        modules.push("point-to-point");
    }
    if !scenario.csma_segments.is_empty() {
        modules.push("csma");
    }
    if !scenario.wifi_cells.is_empty() {
        modules.push("wifi");
        modules.push("mobility");
    }
    modules.push("applications");
    if scenario.tracing.enabled && scenario.tracing.animation_file.is_some() {
        modules.push("netanim");
    }

    for module in modules {
        writeln!(s, "#include \"ns3/{}-module.h\"", module)?;
    }
    writeln!(s)
}

/// `campus-lab` -> `CampusLabScenario`
fn log_component(name: &str) -> String {
    let mut component: String = name
        .split(|c: char| c == '-' || c == '_')
        .filter(|p| !p.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    component.push_str("Scenario");
    component
}

fn write_node_container(s: &mut String, var: &str, members: &[NodeId]) -> fmt::Result {
    writeln!(s, "    NodeContainer {};", var)?;
    for node in members {
        writeln!(s, "    {}.Add(nodes.Get({}));", var, node)?;
    }
    Ok(())
}

fn write_cell(s: &mut String, i: usize, cell: &WifiCell) -> Result<SegmentDevices, fmt::Error> {
    let ap_nodes = format!("wifiApNode{}", i);
    let sta_nodes = format!("wifiStaNodes{}", i);
    let channel = format!("channel{}", cell.channel.id);
    let phy = format!("phy{}", i);
    let wifi = format!("wifi{}", i);
    let mac = format!("mac{}", i);
    let ssid = format!("ssid{}", i);
    let ap_devs = format!("apDevices{}", i);
    let sta_devs = format!("staDevices{}", i);
    let mobility = format!("mobility{}", i);

    writeln!(s, "    // {}", cell.segment.name)?;
    write_node_container(s, &ap_nodes, &[cell.access_point])?;
    write_node_container(s, &sta_nodes, &cell.stations)?;
    writeln!(s, "    YansWifiChannelHelper {} = YansWifiChannelHelper::Default();", channel)?;
    writeln!(s, "    YansWifiPhyHelper {};", phy)?;
    writeln!(s, "    {}.SetChannel({}.Create());", phy, channel)?;
    writeln!(s, "    WifiHelper {};", wifi)?;
    writeln!(s, "    {}.SetRemoteStationManager(\"{}\");", wifi, cell.rate_control.type_id())?;
    writeln!(s, "    WifiMacHelper {};", mac)?;
    writeln!(s, "    Ssid {} = Ssid(\"{}\");", ssid, escape(&cell.ssid))?;
    writeln!(
        s,
        "    {}.SetType(\"ns3::StaWifiMac\", \"Ssid\", SsidValue({}), \"ActiveProbing\", BooleanValue(false));",
        mac, ssid
    )?;
    writeln!(s, "    NetDeviceContainer {} = {}.Install({}, {}, {});", sta_devs, wifi, phy, mac, sta_nodes)?;
    writeln!(s, "    {}.SetType(\"ns3::ApWifiMac\", \"Ssid\", SsidValue({}));", mac, ssid)?;
    writeln!(s, "    NetDeviceContainer {} = {}.Install({}, {}, {});", ap_devs, wifi, phy, mac, ap_nodes)?;

    // The access point is installed first so it takes grid slot 0.
    let grid = &cell.grid;
    let bounds = &cell.walk_bounds;
    writeln!(s, "    MobilityHelper {};", mobility)?;
    writeln!(
        s,
        "    {}.SetPositionAllocator(\"ns3::GridPositionAllocator\", \"MinX\", DoubleValue({:?}), \
         \"MinY\", DoubleValue({:?}), \"DeltaX\", DoubleValue({:?}), \"DeltaY\", DoubleValue({:?}), \
         \"GridWidth\", UintegerValue({}), \"LayoutType\", StringValue(\"{}\"));",
        mobility,
        grid.min_x,
        grid.min_y,
        grid.delta_x,
        grid.delta_y,
        grid.grid_width,
        grid.layout.as_str()
    )?;
    writeln!(s, "    {}.SetMobilityModel(\"{}\");", mobility, MobilityModel::ConstantPosition.type_id())?;
    writeln!(s, "    {}.Install({});", mobility, ap_nodes)?;
    writeln!(
        s,
        "    {}.SetMobilityModel(\"{}\", \"Bounds\", RectangleValue(Rectangle({:?}, {:?}, {:?}, {:?})));",
        mobility,
        MobilityModel::RandomWalk2d { bounds: *bounds }.type_id(),
        bounds.x_min,
        bounds.x_max,
        bounds.y_min,
        bounds.y_max
    )?;
    writeln!(s, "    {}.Install({});", mobility, sta_nodes)?;
    writeln!(s)?;

    Ok(SegmentDevices {
        segment: cell.segment.name.clone(),
        groups: vec![(GroupLabel::AccessPoint, ap_devs), (GroupLabel::Stations, sta_devs)],
    })
}

fn write_addresses(s: &mut String, scenario: &Scenario, devices: &[SegmentDevices]) -> fmt::Result {
    writeln!(s, "    Ipv4AddressHelper address;")?;
    for block in &scenario.address_plan {
        let Some(segment) = devices.iter().find(|d| d.segment == block.segment) else {
            continue;
        };
        writeln!(s, "    // {} {}", block.segment, block.cidr())?;
        writeln!(s, "    address.SetBase(\"{}\", \"{}\");", block.network, block.mask)?;
        for group in &block.interfaces {
            if let Some(var) = segment.var_for(group.group) {
                writeln!(s, "    address.Assign({});", var)?;
            }
        }
    }
    writeln!(s)?;

    if scenario.address_plan.len() > 1 {
        writeln!(s, "    Ipv4GlobalRoutingHelper::PopulateRoutingTables();")?;
        writeln!(s)?;
    }
    Ok(())
}

fn write_applications(s: &mut String, scenario: &Scenario) -> fmt::Result {
    let server = &scenario.applications.server;
    let client = &scenario.applications.client;

    writeln!(s, "    UdpEchoServerHelper echoServer({});", server.port)?;
    writeln!(s, "    ApplicationContainer serverApps = echoServer.Install(nodes.Get({}));", server.node)?;
    writeln!(s, "    serverApps.Start(Seconds({}));", format_seconds(server.window.start))?;
    writeln!(s, "    serverApps.Stop(Seconds({}));", format_seconds(server.window.stop))?;
    writeln!(s)?;

    writeln!(s, "    UdpEchoClientHelper echoClient(Ipv4Address(\"{}\"), {});", client.remote, client.port)?;
    writeln!(s, "    echoClient.SetAttribute(\"MaxPackets\", UintegerValue({}));", client.max_packets)?;
    writeln!(s, "    echoClient.SetAttribute(\"Interval\", TimeValue(Seconds({})));", format_seconds(client.interval))?;
    writeln!(s, "    echoClient.SetAttribute(\"PacketSize\", UintegerValue({}));", client.packet_size)?;
    writeln!(s, "    ApplicationContainer clientApps = echoClient.Install(nodes.Get({}));", client.node)?;
    writeln!(s, "    clientApps.Start(Seconds({}));", format_seconds(client.window.start))?;
    writeln!(s, "    clientApps.Stop(Seconds({}));", format_seconds(client.window.stop))?;
    writeln!(s)
}

fn write_tracing(s: &mut String, scenario: &Scenario) -> fmt::Result {
    let tracing = &scenario.tracing;
    if !tracing.enabled {
        return Ok(());
    }
    let prefix = escape(&tracing.pcap_prefix);

    if tracing.pcap {
        // EnablePcapAll covers every device of the helper's type, one call is enough.
        if !scenario.links.is_empty() {
            writeln!(s, "    p2p0.EnablePcapAll(\"{}\");", prefix)?;
        }
        for i in 0..scenario.wifi_cells.len() {
            writeln!(s, "    phy{}.EnablePcap(\"{}\", apDevices{}.Get(0));", i, prefix, i)?;
        }
        for i in 0..scenario.csma_segments.len() {
            writeln!(s, "    csma{}.EnablePcap(\"{}\", csmaDevices{}.Get(0), true);", i, prefix, i)?;
        }
    }

    if let Some(file) = &tracing.ascii_file {
        let helper = if !scenario.links.is_empty() {
            Some("p2p0")
        } else if !scenario.csma_segments.is_empty() {
            Some("csma0")
        } else if !scenario.wifi_cells.is_empty() {
            Some("phy0")
        } else {
            None
        };
        if let Some(helper) = helper {
            writeln!(s, "    AsciiTraceHelper ascii;")?;
            writeln!(s, "    {}.EnableAsciiAll(ascii.CreateFileStream(\"{}\"));", helper, escape(file))?;
        }
    }

    if let Some(file) = &tracing.animation_file {
        writeln!(s, "    AnimationInterface anim(\"{}\");", escape(file))?;
        for (node, position) in &tracing.animation_positions {
            writeln!(
                s,
                "    anim.SetConstantPosition(nodes.Get({}), {:?}, {:?});",
                node, position.x, position.y
            )?;
        }
    }
    writeln!(s)
}

/// Escape a value placed inside a C++ string literal.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
