use clap::Parser;
use pktsim_core::{
    Bandwidth, Latency, PacketLoss, SimTime,
    network::Network,
    node::{Address, NodeId},
    topology::RenderPolicy,
};
use std::{net::Ipv4Addr, time::Duration};

/// Send packets from one end of a chain of nodes to the other.
#[derive(Parser)]
struct Command {
    /// number of nodes in the chain
    #[arg(long, default_value = "3")]
    nodes: u8,

    #[arg(long, default_value = "100kbps")]
    bandwidth: Bandwidth,

    #[arg(long, default_value = "1ms")]
    latency: Latency,

    #[arg(long, default_value = "0%")]
    loss: PacketLoss,

    /// number of packets to send, one every `every` milliseconds
    #[arg(long, default_value = "10")]
    packets: u32,

    #[arg(long, default_value = "10")]
    every: u64,

    #[arg(long, default_value = "980")]
    payload: u64,

    #[arg(long, default_value = "0")]
    seed: u64,

    /// stop the simulation at this time (in milliseconds)
    #[arg(long)]
    until: Option<u64>,

    /// print the topology in the Graphviz format
    #[arg(long)]
    dot: bool,
}

fn address(index: u8) -> Address {
    Ipv4Addr::new(10, 0, 0, index).into()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cmd = Command::parse();
    anyhow::ensure!(cmd.nodes >= 2, "a chain needs at least 2 nodes");

    let mut network = Network::new();
    network.set_seed(cmd.seed);

    let nodes = (1..=cmd.nodes)
        .map(|index| network.new_node(address(index)).build())
        .collect::<Result<Vec<NodeId>, _>>()?;
    for pair in nodes.windows(2) {
        network
            .configure_link(pair[0], pair[1])
            .set_bandwidth(cmd.bandwidth)
            .set_latency(cmd.latency)
            .set_packet_loss(cmd.loss)
            .apply()?;
    }

    if cmd.dot {
        print!("{}", network.topology()?.to_dot(&RenderPolicy::default()));
    }

    let source = address(1);
    let destination = address(cmd.nodes);
    for i in 0..cmd.packets {
        let packet = network
            .packet(source, destination)
            .payload_size(cmd.payload)
            .created_at(SimTime::ZERO + Duration::from_millis(cmd.every) * i)
            .build()?;
        network.schedule_send(Duration::from_millis(cmd.every) * i, nodes[0], packet)?;
    }

    let handle = |delivery: pktsim_core::Delivery| {
        let packet = delivery.packet();
        println!(
            "[{id}] {from}->{to}: {hops} hops, sent at {sent}, latency {latency:?}",
            id = packet.id(),
            from = packet.source(),
            to = packet.destination(),
            hops = delivery.hops().len() - 1,
            sent = packet.creation_time(),
            latency = packet.latency().unwrap_or_default(),
        );
    };

    let report = match cmd.until {
        Some(until) => {
            network.run_until_with(SimTime::ZERO + Duration::from_millis(until), handle)?
        }
        None => network.run_with(handle)?,
    };

    println!(
        "processed {} events, clock at {}",
        report.events, report.time
    );
    println!("{}", network.stats());

    Ok(())
}
