// Rumor Routing Simulator Statistics

use rr_rust::RrTime;

// ============================================================================
// Simulation Result
// ============================================================================

/// Complete simulation result
#[derive(Debug, Clone, Default)]
pub struct SimulationResult {
    /// Scenario name
    pub name: String,

    /// Random seed used
    pub seed_used: [u8; 32],

    /// Total rounds executed
    pub total_rounds: u64,

    pub nodes: usize,

    pub events_created: usize,

    pub agents_retired: usize,

    pub queries_sent: usize,

    pub queries_returned: usize,

    pub queries_expired: usize,

    /// Queries still travelling when the run ended
    pub queries_in_flight: usize,

    /// Sum of spawn-to-return ticks over all returned queries
    pub total_latency: RrTime,
}

impl SimulationResult {
    /// Fraction of sent queries that came back with their event
    pub fn success_rate(&self) -> f64 {
        if self.queries_sent == 0 {
            return 0.0;
        }
        self.queries_returned as f64 / self.queries_sent as f64
    }

    pub fn mean_latency(&self) -> Option<f64> {
        if self.queries_returned == 0 {
            return None;
        }
        Some(self.total_latency as f64 / self.queries_returned as f64)
    }

    pub fn print_summary(&self) {
        println!("\n═══ {} ═══", self.name);
        println!("  Rounds:           {}", self.total_rounds);
        println!("  Nodes:            {}", self.nodes);
        println!("  Events created:   {}", self.events_created);
        println!("  Agents retired:   {}", self.agents_retired);
        println!("  Queries sent:     {}", self.queries_sent);
        println!("  Queries returned: {}", self.queries_returned);
        println!("  Queries expired:  {}", self.queries_expired);
        println!("  Still in flight:  {}", self.queries_in_flight);
        println!("  Success rate:     {:.3}", self.success_rate());
        match self.mean_latency() {
            Some(latency) => println!("  Mean latency:     {:.1} ticks", latency),
            None => println!("  Mean latency:     -"),
        }
        println!("  Seed:             {}", seed_hex(&self.seed_used));
    }
}

pub fn seed_hex(seed: &[u8; 32]) -> String {
    seed.iter().map(|b| format!("{:02x}", b)).collect()
}
