// Rumor Routing Simulator Configuration

use anyhow::{bail, Context};
use rr_rust::NetworkConfig;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Scenario file
// ============================================================================

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
pub struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    pub meta: ScenarioMeta,

    /// Node description file, relative to the scenario file
    pub graph: PathBuf,

    #[serde(default = "default_rounds")]
    pub rounds: u64,

    #[serde(default = "default_query_interval")]
    pub query_interval: u64,

    /// Optional 32 byte seed as hex
    #[serde(default)]
    pub seed: Option<String>,

    #[serde(default)]
    pub verbose: bool,

    /// Network overrides; anything missing keeps its default
    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct ScenarioMeta {
    pub name: Option<String>,
    pub description: Option<String>,
}

fn default_rounds() -> u64 {
    10_000
}

fn default_query_interval() -> u64 {
    400
}

// ============================================================================
// Main Configuration
// ============================================================================

/// Everything a run needs, resolved from a scenario file
#[derive(Debug, Clone)]
pub struct RumorConfig {
    pub name: String,

    /// Contents of the node description file
    pub description: String,

    /// Ticks to simulate (tick 0 is never run)
    pub rounds: u64,

    /// Every this many ticks the query nodes send queries
    pub query_interval: u64,

    /// Random seed for reproducibility
    pub seed: Option<[u8; 32]>,

    pub verbose: bool,

    pub network: NetworkConfig,
}

impl RumorConfig {
    /// Reads a scenario and the node description it points at
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario: ScenarioFile = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing scenario {}", path.display()))?;

        let graph = path
            .parent()
            .map(|dir| dir.join(&scenario.graph))
            .unwrap_or_else(|| scenario.graph.clone());
        let description = fs::read_to_string(&graph)
            .with_context(|| format!("reading network description {}", graph.display()))?;

        if scenario.query_interval == 0 {
            bail!("query_interval must be at least 1");
        }

        let seed = scenario.seed.as_deref().map(parse_seed_hex).transpose()?;

        let name = scenario.meta.name.clone().unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("scenario")
                .to_string()
        });

        Ok(Self {
            name,
            description,
            rounds: scenario.rounds,
            query_interval: scenario.query_interval,
            seed,
            verbose: scenario.verbose,
            network: scenario.network,
        })
    }
}

/// Parses a 64 digit hex seed, with or without a `0x` prefix
pub fn parse_seed_hex(hex: &str) -> anyhow::Result<[u8; 32]> {
    let hex = hex.trim().trim_start_matches("0x");
    if hex.len() != 64 {
        bail!("seed must be 64 hex digits, got {}", hex.len());
    }

    let mut seed = [0u8; 32];
    for (i, byte) in seed.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .with_context(|| format!("invalid hex in seed at byte {}", i))?;
    }
    Ok(seed)
}
