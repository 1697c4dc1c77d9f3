// Rumor Routing Simulator Runner

use super::config::RumorConfig;
use super::event_sink::LoggingEventSink;
use super::stats::{seed_hex, SimulationResult};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rr_rust::{EventId, Network, RoutingError};

/// Main simulator runner
pub struct RumorRunner {
    config: RumorConfig,
    seed: [u8; 32],
    network: Network,

    /// Every event id created so far; queries pick their targets from it
    known_events: Vec<EventId>,
    result: SimulationResult,
}

impl RumorRunner {
    /// Builds the network described by `config`
    pub fn new(config: RumorConfig) -> anyhow::Result<Self> {
        let seed = config.seed.unwrap_or_else(|| {
            let mut seed = [0u8; 32];
            rand::thread_rng().fill(&mut seed);
            seed
        });

        let network = Network::from_description(
            &config.description,
            config.network.clone(),
            StdRng::from_seed(seed),
        )?
        .with_sink(Box::new(LoggingEventSink::new(config.verbose)));

        let result = SimulationResult {
            name: config.name.clone(),
            seed_used: seed,
            nodes: network.nodes().len(),
            ..SimulationResult::default()
        };

        Ok(Self {
            config,
            seed,
            network,
            known_events: Vec::new(),
            result,
        })
    }

    /// Run the simulation
    pub fn run(mut self) -> Result<SimulationResult, RoutingError> {
        info!(
            "running {} for {} rounds, seed {}",
            self.config.name,
            self.config.rounds,
            seed_hex(&self.seed)
        );

        for round in 1..self.config.rounds {
            self.tick(round)?;
            self.result.total_rounds = round;
        }

        self.result.queries_in_flight = self.network.queries().len();
        Ok(self.result)
    }

    fn tick(&mut self, round: u64) -> Result<(), RoutingError> {
        let created = self.network.generate_event(round);
        self.result.events_created += created.len();
        self.known_events.extend(created);

        if round % self.config.query_interval == 0 && !self.known_events.is_empty() {
            let before = self.network.queries().len();
            self.network.generate_query(&self.known_events, round);
            self.result.queries_sent += self.network.queries().len() - before;
        }

        let report = self.network.step_messages(round)?;

        self.result.agents_retired += report.agents_retired;
        self.result.queries_expired += report.expired.len();
        for returned in report.returned {
            self.result.queries_returned += 1;
            self.result.total_latency += returned.latency;
            info!("{}", returned.event);
        }

        Ok(())
    }
}
