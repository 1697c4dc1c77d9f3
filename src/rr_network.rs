//! The network owns every node, agent and query.
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by index.
//! Each tick the driver asks for new events (and with them agents), now and
//! then for new queries, and then calls [`Network::step_messages`] which
//! moves every live agent and then every live query once, in list order.

use hashbrown::HashSet;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::Deserialize;

use crate::rr_agent::Agent;
use crate::rr_interface::{
    Event, EventId, EventSink, FormatError, MessageId, NoOpSink, NodeIndex, Position, Progress,
    RoutingError, RoutingEvent, RrTime,
};
use crate::rr_node::Node;
use crate::rr_query::{Query, QueryState};

// ============================================================================
// Configuration
// ============================================================================

/// Tunables of a rumor routing network
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Nodes within this euclidean distance are neighbours (default: 15)
    pub radius: i64,

    /// Number of nodes allowed to originate queries (default: 4)
    pub num_query_nodes: usize,

    /// Per node and tick chance of an event (default: 0.0001)
    pub event_probability: f64,

    /// Chance that an event also spawns an agent (default: 0.5)
    pub agent_probability: f64,

    /// Moves an agent makes before it retires (default: 50)
    pub agent_max_steps: usize,

    /// Search moves a query makes before it resets or expires (default: 45)
    pub query_max_steps: usize,

    /// A query parked for `query_max_steps * query_resend_multiplier` ticks
    /// is resent (default: 8)
    pub query_resend_multiplier: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            radius: 15,
            num_query_nodes: 4,
            event_probability: 0.0001,
            agent_probability: 0.5,
            agent_max_steps: 50,
            query_max_steps: 45,
            query_resend_multiplier: 8,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), FormatError> {
        for (name, value) in [
            ("event_probability", self.event_probability),
            ("agent_probability", self.agent_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FormatError::InvalidParameter { name, value });
            }
        }

        if self.radius < 0 || self.radius.checked_mul(self.radius).is_none() {
            return Err(FormatError::InvalidParameter {
                name: "radius",
                value: self.radius as f64,
            });
        }

        if self
            .query_max_steps
            .checked_mul(self.query_resend_multiplier)
            .is_none()
        {
            return Err(FormatError::InvalidParameter {
                name: "query_resend_multiplier",
                value: self.query_resend_multiplier as f64,
            });
        }

        Ok(())
    }
}

// ============================================================================
// Tick report
// ============================================================================

/// A query that made it home this tick
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnedQuery {
    pub query: MessageId,
    pub origin: NodeIndex,
    pub event: Event,
    pub latency: RrTime,
}

/// What finished during one call to [`Network::step_messages`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub returned: Vec<ReturnedQuery>,
    pub expired: Vec<MessageId>,
    pub agents_retired: usize,
}

// ============================================================================
// Network
// ============================================================================

pub struct Network {
    config: NetworkConfig,
    nodes: Vec<Node>,
    query_nodes: Vec<NodeIndex>,
    agents: Vec<Agent>,
    queries: Vec<Query>,
    rng: StdRng,
    next_message_id: MessageId,
    event_sink: Box<dyn EventSink>,
}

impl Network {
    /// Parses a network description: a node count line followed by exactly
    /// that many `x,y` lines.
    pub fn from_description(
        description: &str,
        config: NetworkConfig,
        rng: StdRng,
    ) -> Result<Self, FormatError> {
        let positions = parse_description(description)?;
        Self::new(positions, config, rng)
    }

    /// Builds the network over `positions`. Rejects duplicate positions and
    /// nodes left without neighbours.
    pub fn new(
        positions: Vec<Position>,
        config: NetworkConfig,
        mut rng: StdRng,
    ) -> Result<Self, FormatError> {
        config.validate()?;

        let mut seen = HashSet::with_capacity(positions.len());
        for position in &positions {
            if !seen.insert(*position) {
                return Err(FormatError::DuplicatePosition(*position));
            }
        }

        let nodes: Vec<Node> = positions.into_iter().map(Node::new).collect();

        let amount = config.num_query_nodes.min(nodes.len());
        let query_nodes = index::sample(&mut rng, nodes.len(), amount).into_vec();

        let mut network = Self {
            config,
            nodes,
            query_nodes,
            agents: Vec::new(),
            queries: Vec::new(),
            rng,
            next_message_id: 1,
            event_sink: Box::new(NoOpSink),
        };

        network.find_neighbours();

        if let Some(node) = network.nodes.iter().find(|n| n.neighbours().is_empty()) {
            return Err(FormatError::IsolatedNode(node.position()));
        }

        debug!(
            "network of {} nodes, {} query nodes",
            network.nodes.len(),
            network.query_nodes.len()
        );

        Ok(network)
    }

    /// Report routing events to `sink` instead of dropping them
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// (Re)computes every node's neighbours: all other nodes within `radius`.
    pub fn find_neighbours(&mut self) {
        let max = self.config.radius.saturating_mul(self.config.radius);

        let neighbours: Vec<Vec<NodeIndex>> = self
            .nodes
            .iter()
            .map(|node| {
                self.nodes
                    .iter()
                    .enumerate()
                    .filter(|(_, other)| {
                        let distance = node.position().distance_squared(&other.position());
                        0 < distance && distance <= max
                    })
                    .map(|(index, _)| index)
                    .collect()
            })
            .collect();

        for (node, list) in self.nodes.iter_mut().zip(neighbours) {
            node.set_neighbours(list);
        }
    }

    /// Lets events happen this tick. Each node independently triggers with
    /// `event_probability`; each trigger creates the event at a random node
    /// not yet used this tick, and with `agent_probability` an agent there.
    pub fn generate_event(&mut self, time: RrTime) -> Vec<EventId> {
        let mut ids = Vec::new();
        let mut used: HashSet<NodeIndex> = HashSet::new();

        for _ in 0..self.nodes.len() {
            if self.rng.gen::<f64>() >= self.config.event_probability {
                continue;
            }

            let mut at = self.rng.gen_range(0..self.nodes.len());
            while used.contains(&at) {
                at = self.rng.gen_range(0..self.nodes.len());
            }
            used.insert(at);

            let id = self.nodes[at].create_event(time);
            if let Some(info) = self.nodes[at].event_info(&id) {
                if let Some(event) = info.event() {
                    self.event_sink
                        .log(time, RoutingEvent::EventCreated { event: *event });
                }
            }
            ids.push(id);

            if self.rng.gen::<f64>() < self.config.agent_probability {
                self.spawn_agent(at, time);
            }
        }

        ids
    }

    /// Sends one query from every query node, each for an id picked at
    /// random from `ids`.
    pub fn generate_query(&mut self, ids: &[EventId], time: RrTime) {
        if ids.is_empty() {
            return;
        }

        for i in 0..self.query_nodes.len() {
            let origin = self.query_nodes[i];
            if let Some(target) = ids.choose(&mut self.rng).copied() {
                self.spawn_query(origin, target, time);
            }
        }
    }

    pub fn spawn_agent(&mut self, at: NodeIndex, time: RrTime) -> MessageId {
        let id = self.next_id();
        let agent = Agent::new(id, at, &mut self.nodes, self.config.agent_max_steps);
        self.agents.push(agent);

        self.event_sink
            .log(time, RoutingEvent::AgentSpawned { agent: id, node: at });
        id
    }

    pub fn spawn_query(&mut self, at: NodeIndex, target: EventId, time: RrTime) -> MessageId {
        let id = self.next_id();
        let query = Query::new(
            id,
            at,
            target,
            &mut self.nodes,
            self.config.query_max_steps,
            self.config.query_resend_multiplier,
        )
        .with_spawn_time(time);
        self.queries.push(query);

        self.event_sink.log(
            time,
            RoutingEvent::QuerySpawned {
                query: id,
                node: at,
                target,
            },
        );
        id
    }

    /// Moves every live agent, then every live query, once. Finished
    /// messages are dropped from the network and reported.
    pub fn step_messages(&mut self, time: RrTime) -> Result<TickReport, RoutingError> {
        let mut report = TickReport::default();

        let mut i = 0;
        while i < self.agents.len() {
            let progress = self.agents[i]
                .step(&mut self.nodes, &mut self.rng)
                .map_err(|e| {
                    warn!("tick {}: {}", time, e);
                    e
                })?;

            if progress == Progress::Done {
                let agent = self.agents.remove(i);
                report.agents_retired += 1;
                self.event_sink.log(
                    time,
                    RoutingEvent::AgentRetired {
                        agent: agent.id(),
                        node: agent.current_node(),
                    },
                );
            } else {
                i += 1;
            }
        }

        let mut i = 0;
        while i < self.queries.len() {
            let progress = self.queries[i]
                .step(&mut self.nodes, &mut self.rng)
                .map_err(|e| {
                    warn!("tick {}: {}", time, e);
                    e
                })?;

            if progress != Progress::Done {
                i += 1;
                continue;
            }

            let query = self.queries.remove(i);
            match query.state() {
                QueryState::Returned { event } => {
                    let latency = time.saturating_sub(query.spawned_at());
                    self.event_sink.log(
                        time,
                        RoutingEvent::QueryReturned {
                            query: query.id(),
                            event,
                            latency,
                        },
                    );
                    report.returned.push(ReturnedQuery {
                        query: query.id(),
                        origin: query.origin(),
                        event,
                        latency,
                    });
                }
                _ => {
                    self.event_sink.log(
                        time,
                        RoutingEvent::QueryExpired {
                            query: query.id(),
                            target: query.target(),
                        },
                    );
                    report.expired.push(query.id());
                }
            }
        }

        Ok(report)
    }

    fn next_id(&mut self) -> MessageId {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    // ===== Read access =====

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    pub fn query_nodes(&self) -> &[NodeIndex] {
        &self.query_nodes
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }
}

/// Splits a network description into positions, checking the declared count.
pub fn parse_description(description: &str) -> Result<Vec<Position>, FormatError> {
    let mut lines = description.lines();

    let declared: usize = lines
        .next()
        .and_then(|line| line.trim().parse().ok())
        .ok_or(FormatError::InvalidNodeCount)?;

    let mut positions = Vec::with_capacity(declared);
    for _ in 0..declared {
        let line = lines.next().ok_or(FormatError::NodeCountMismatch {
            declared,
            found: positions.len(),
        })?;
        positions.push(line.parse::<Position>()?);
    }

    let surplus = lines.filter(|line| !line.trim().is_empty()).count();
    if surplus > 0 {
        return Err(FormatError::NodeCountMismatch {
            declared,
            found: declared + surplus,
        });
    }

    Ok(positions)
}
