// Line Walkthrough
//
// Four nodes in a row, A - B - C - D. An event appears at D, one agent
// spreads breadcrumbs from D towards A, then a query sent from A finds the
// event and comes home.
//
//   cargo run --example line_walkthrough

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rr_rust::{Network, NetworkConfig, Position};
use simple_logger::SimpleLogger;

fn main() -> anyhow::Result<()> {
    SimpleLogger::new().init()?;

    let config = NetworkConfig {
        num_query_nodes: 1,
        agent_max_steps: 3,
        ..NetworkConfig::default()
    };
    let mut network = Network::new(
        vec![
            Position::new(0, 0),
            Position::new(10, 0),
            Position::new(20, 0),
            Position::new(30, 0),
        ],
        config,
        StdRng::seed_from_u64(42),
    )?;

    let event = network.nodes_mut()[3].create_event(1);
    network.spawn_agent(3, 1);
    info!("event {} at {}", event, network.node(3).position());

    let mut time = 1;
    while !network.agents().is_empty() {
        time += 1;
        network.step_messages(time)?;
    }

    for node in network.nodes() {
        match node.event_info(&event) {
            Some(info) if info.is_event() => println!("{}: event", node.position()),
            Some(info) => match info.via() {
                Some(via) => println!(
                    "{}: {} step(s) via {}",
                    node.position(),
                    info.steps(),
                    network.node(via).position()
                ),
                None => println!("{}: event", node.position()),
            },
            None => println!("{}: -", node.position()),
        }
    }

    network.spawn_query(0, event, time);
    loop {
        time += 1;
        let report = network.step_messages(time)?;
        if let Some(returned) = report.returned.first() {
            println!(
                "query {} returned after {} ticks with {}",
                returned.query, returned.latency, returned.event
            );
            break;
        }
        if !report.expired.is_empty() || network.queries().is_empty() {
            println!("query expired");
            break;
        }
    }

    Ok(())
}
