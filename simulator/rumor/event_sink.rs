//! Event logging for simulator

use log::info;
use rr_rust::{EventSink, RoutingEvent, RrTime};

/// Logging event sink that forwards routing events to the `log` facade
pub struct LoggingEventSink {
    enabled: bool,
}

impl LoggingEventSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl EventSink for LoggingEventSink {
    fn log(&mut self, round: RrTime, event: RoutingEvent) {
        if !self.enabled {
            return;
        }

        match event {
            RoutingEvent::EventCreated { event } => {
                info!("{} event: {}", round, event);
            }
            RoutingEvent::AgentSpawned { agent, node } => {
                info!("{} agent: a:{} at n:{}", round, agent, node);
            }
            RoutingEvent::AgentRetired { agent, node } => {
                info!("{} retire: a:{} at n:{}", round, agent, node);
            }
            RoutingEvent::QuerySpawned {
                query,
                node,
                target,
            } => {
                info!(
                    "{} query: q:{} at n:{} for e:{}",
                    round,
                    query,
                    node,
                    target & 0xFFFF
                );
            }
            RoutingEvent::QueryReturned {
                query,
                event,
                latency,
            } => {
                info!("{} found: q:{} after {} ticks - {}", round, query, latency, event);
            }
            RoutingEvent::QueryExpired { query, target } => {
                info!("{} expired: q:{} for e:{}", round, query, target & 0xFFFF);
            }
        }
    }
}
