//! # rrRust - Rumor Routing Simulation
//!
//! A discrete-time simulation of rumor routing over an ad-hoc network of
//! spatially placed nodes. Agents wander the network, gossiping
//! distance-to-event tables with every node they visit; queries wander
//! until they hit a node that knows their event, follow the breadcrumbs to
//! the source and walk back home.
//!
//! ## Core Components
//!
//! - **Network**: node arena, neighbour computation, event/agent/query generation and per-tick dispatch
//! - **Node**: position, neighbours, routing table and FIFO message queue
//! - **Agent**: gossip carrier merging and aging routing tables
//! - **Query**: search / follow-path / return state machine
//! - **EventInfo**: routing table entry, either the event itself or a breadcrumb
//!
//! ## Usage
//!
//! The library has no notion of wall-clock time or rendering. A driver
//! advances it tick by tick:
//!
//! ```no_run
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use rr_rust::{Network, NetworkConfig};
//!
//! let description = "3\n0,0\n10,0\n20,0\n";
//! let mut network =
//!     Network::from_description(description, NetworkConfig::default(), StdRng::seed_from_u64(1))
//!         .expect("valid network");
//!
//! let mut ids = Vec::new();
//! for tick in 1..10_000 {
//!     ids.extend(network.generate_event(tick));
//!     if tick % 400 == 0 {
//!         network.generate_query(&ids, tick);
//!     }
//!     let report = network.step_messages(tick).expect("intact routing state");
//!     for returned in report.returned {
//!         println!("{}", returned.event);
//!     }
//! }
//! ```
//!
//! ## Simulation
//!
//! A headless driver reading YAML scenarios lives in `simulator/`.

pub mod rr_agent;
pub mod rr_event_info;
pub mod rr_interface;
pub mod rr_network;
pub mod rr_node;
pub mod rr_query;
pub mod rr_walk;

// Re-export commonly used types
pub use rr_agent::Agent;
pub use rr_event_info::{EventInfo, EventTable};
pub use rr_interface::{
    Event, EventId, EventSink, FormatError, MessageId, NoOpSink, NodeIndex, Position, Progress,
    RoutingError, RoutingEvent, RrTime,
};
pub use rr_network::{Network, NetworkConfig, ReturnedQuery, TickReport};
pub use rr_node::Node;
pub use rr_query::{Query, QueryState};
