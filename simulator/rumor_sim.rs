// Rumor Routing Scenario Runner - Load and execute scenario YAML files
//
// Usage:
//   cargo run --bin rumor_sim scenarios/grid.yaml
//   cargo run --bin rumor_sim scenarios/  (runs all .yaml files in directory)
//   cargo run --bin rumor_sim scenarios/grid.yaml --seed 0x1234...

mod rumor;

use anyhow::{bail, Context};
use rumor::{parse_seed_hex, RumorConfig, RumorRunner, SimulationResult};
use simple_logger::SimpleLogger;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/grid.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/grid.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    let seed = if args.len() >= 4 && args[2] == "--seed" {
        Some(parse_seed_hex(&args[3])?)
    } else {
        None
    };

    let scenarios = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        scenario_files(path)?
    } else {
        bail!("path does not exist: {}", path.display());
    };

    for (i, scenario) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}", i + 1, scenarios.len(), scenario.display());
        let result = run_scenario_file(scenario, seed)?;
        result.print_summary();
    }

    Ok(())
}

fn scenario_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut scenarios: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();

    scenarios.sort();

    if scenarios.is_empty() {
        bail!("no .yaml files found in {}", dir.display());
    }
    Ok(scenarios)
}

fn run_scenario_file(path: &Path, seed: Option<[u8; 32]>) -> anyhow::Result<SimulationResult> {
    let mut config = RumorConfig::load(path)?;

    // command line seed wins over the scenario's
    if seed.is_some() {
        config.seed = seed;
    }

    println!("Configuration:");
    println!("  Rounds:         {}", config.rounds);
    println!("  Query interval: {}", config.query_interval);
    println!("  Radius:         {}", config.network.radius);
    println!("  Query nodes:    {}", config.network.num_query_nodes);
    println!("  Event p:        {}", config.network.event_probability);
    println!("  Agent p:        {}", config.network.agent_probability);

    let runner = RumorRunner::new(config)?;
    let result = runner
        .run()
        .with_context(|| format!("simulating {}", path.display()))?;
    Ok(result)
}
