//! Tree workload runner
//!
//! This module provides the `workload` subcommand. It loads a tree with even
//! keys and then checks navigation, range views, random removals and a
//! cursor drain against the expected answers, logging how long each phase
//! took.

use anyhow::{Context, Result, bail, ensure};
use clap::Args;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use sylva::tree::{SearchStrategy, TreeConfig, TreeMap};
use tracing::{info, warn};

/// Arguments for the workload subcommand
#[derive(Args, Debug)]
pub struct WorkloadArgs {
    /// Scenario YAML file path
    #[arg(long, short = 's', default_value = "xtask/scenarios/default.yaml")]
    pub scenario: PathBuf,

    /// Override tree order
    #[arg(long)]
    pub order: Option<usize>,

    /// Override number of even keys to load
    #[arg(long)]
    pub count: Option<u32>,

    /// Override number of random removals
    #[arg(long)]
    pub removals: Option<u32>,

    /// Random seed for reproducible removals
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override in-node search (linear|binary)
    #[arg(long)]
    pub search: Option<String>,

    /// Override slot caching (true|false)
    #[arg(long)]
    pub slotted: Option<bool>,

    /// Print a JSON summary to stdout
    #[arg(long)]
    pub json: bool,
}

/// Scenario configuration from YAML
#[derive(Debug, Default, Deserialize)]
struct ScenarioConfig {
    name: Option<String>,
    order: Option<usize>,
    count: Option<u32>,
    removals: Option<u32>,
    seed: Option<u64>,
    search: Option<String>,
    slotted: Option<bool>,
}

/// Settings resolved from every configuration source
#[derive(Debug, Serialize)]
struct Settings {
    name: String,
    order: usize,
    count: u32,
    removals: u32,
    seed: u64,
    search: String,
    slotted: bool,
}

fn from_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}

impl Settings {
    /// Resolve settings from CLI overrides and the scenario
    fn from_args_and_scenario(args: &WorkloadArgs, scenario: &ScenarioConfig) -> Self {
        // Priority: CLI > Environment > Scenario YAML > Default

        let name = env::var("SYLVA_SCENARIO")
            .ok()
            .or_else(|| scenario.name.clone())
            .unwrap_or_else(|| "default".to_string());

        let order = args
            .order
            .or_else(|| from_env("SYLVA_ORDER"))
            .or(scenario.order)
            .unwrap_or(3);

        let count = args
            .count
            .or_else(|| from_env("SYLVA_COUNT"))
            .or(scenario.count)
            .unwrap_or(500_001);

        let removals = args
            .removals
            .or_else(|| from_env("SYLVA_REMOVALS"))
            .or(scenario.removals)
            .unwrap_or(10_000);

        let seed = args
            .seed
            .or_else(|| from_env("SYLVA_SEED"))
            .or(scenario.seed)
            .unwrap_or(42);

        let search = args
            .search
            .clone()
            .or_else(|| env::var("SYLVA_SEARCH").ok())
            .or_else(|| scenario.search.clone())
            .unwrap_or_else(|| "binary".to_string());

        let slotted = args
            .slotted
            .or_else(|| from_env("SYLVA_SLOTTED"))
            .or(scenario.slotted)
            .unwrap_or(true);

        Self {
            name,
            order,
            count,
            removals,
            seed,
            search,
            slotted,
        }
    }

    fn tree_config(&self) -> Result<TreeConfig> {
        let search: SearchStrategy = self
            .search
            .parse()
            .with_context(|| format!("Invalid search strategy: {}", self.search))?;
        Ok(TreeConfig::new()
            .with_order(self.order)
            .with_search(search)
            .with_slotted(self.slotted))
    }
}

/// Duration and work done by one phase
#[derive(Debug, Serialize)]
struct PhaseReport {
    phase: &'static str,
    operations: u64,
    millis: u128,
}

/// Summary printed with `--json`
#[derive(Debug, Serialize)]
struct Summary {
    settings: Settings,
    height: usize,
    phases: Vec<PhaseReport>,
}

/// Load the scenario file, if it exists
fn load_scenario(path: &Path) -> Result<ScenarioConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "scenario file not found, using defaults");
        return Ok(ScenarioConfig::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    serde_yaml::from_str(&content).context("Failed to parse scenario YAML")
}

/// Get the project root directory
fn project_root() -> PathBuf {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").map_or_else(|_| PathBuf::from("."), PathBuf::from);

    // xtask is in project_root/xtask, so go up one level
    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map_or_else(|| manifest_dir.clone(), Path::to_path_buf)
    } else {
        manifest_dir
    }
}

/// Time `phase` and record its report
fn timed(
    reports: &mut Vec<PhaseReport>,
    phase: &'static str,
    action: impl FnOnce() -> Result<u64>,
) -> Result<()> {
    let started = Instant::now();
    let operations = action().with_context(|| format!("Phase {phase} failed"))?;
    let millis = started.elapsed().as_millis();
    info!(phase, operations, millis, "phase finished");
    reports.push(PhaseReport {
        phase,
        operations,
        millis,
    });
    Ok(())
}

fn load(map: &mut TreeMap<u32, u32>, count: u32) -> Result<u64> {
    for index in 0..count {
        map.put(index * 2, index);
    }
    ensure!(map.len() == count as usize, "expected {count} entries, found {}", map.len());
    ensure!(map.first_key() == Some(&0), "unexpected first key");
    ensure!(map.last_key() == Some(&((count - 1) * 2)), "unexpected last key");
    Ok(u64::from(count))
}

fn navigate(map: &TreeMap<u32, u32>, count: u32) -> Result<u64> {
    let mut probes = 0;
    for probe in (1..(count - 1) * 2).step_by(2) {
        let below = Some(probe - 1);
        let above = Some(probe + 1);
        if map.lower_key(&probe).copied() != below
            || map.floor_key(&probe).copied() != below
            || map.higher_key(&probe).copied() != above
            || map.ceiling_key(&probe).copied() != above
        {
            bail!("navigation mismatch around {probe}");
        }
        probes += 4;
    }
    Ok(probes)
}

fn views(map: &TreeMap<u32, u32>) -> Result<u64> {
    let head: Vec<u32> = map.head_map(100).keys().copied().collect();
    ensure!(head.iter().copied().eq((0..=100).step_by(2)), "head view mismatch");

    let sub: Vec<u32> = map.sub_map(100, 200).keys().copied().collect();
    ensure!(sub.iter().copied().eq((100..=200).step_by(2)), "sub view mismatch");

    let from = u32::try_from(map.len().saturating_sub(101)).context("tree too large")?;
    let tail = map.tail_map(from);
    let first = tail.first_key().copied();
    ensure!(first.is_some_and(|key| key >= from), "tail view starts at {first:?}");
    ensure!(tail.last_key() == map.last_key(), "tail view does not reach the last key");

    Ok((head.len() + sub.len() + tail.len()) as u64)
}

fn remove_random(map: &mut TreeMap<u32, u32>, removals: u32, seed: u64) -> Result<u64> {
    let mut keys: Vec<u32> = map.keys().copied().collect();
    keys.shuffle(&mut StdRng::seed_from_u64(seed));
    keys.truncate(removals as usize);

    let mut remaining: BTreeSet<u32> = map.keys().copied().collect();
    for key in &keys {
        ensure!(map.remove(key).is_some(), "key {key} vanished before removal");
        remaining.remove(key);
    }

    for key in &keys {
        let floor = remaining.range(..=*key).next_back();
        let ceiling = remaining.range(*key..).next();
        ensure!(map.floor_key(key) == floor, "floor mismatch at removed key {key}");
        ensure!(map.ceiling_key(key) == ceiling, "ceiling mismatch at removed key {key}");
    }

    map.check_invariants()?;
    Ok(u64::from(removals) * 3)
}

fn drain(map: &mut TreeMap<u32, u32>) -> Result<u64> {
    let mut removed = 0;
    let mut cursor = map.cursor_mut();
    while cursor.next().is_some() {
        cursor.remove()?;
        removed += 1;
    }
    ensure!(map.is_empty(), "{} entries survived the drain", map.len());
    Ok(removed)
}

/// Run the workload subcommand
pub fn run(args: WorkloadArgs) -> Result<()> {
    let scenario_path = if args.scenario.is_absolute() {
        args.scenario.clone()
    } else {
        project_root().join(&args.scenario)
    };
    let scenario = load_scenario(&scenario_path)?;
    let settings = Settings::from_args_and_scenario(&args, &scenario);
    ensure!(settings.count >= 2, "count must be at least 2");
    ensure!(
        settings.removals < settings.count,
        "removals ({}) must be below count ({})",
        settings.removals,
        settings.count
    );

    let config = settings.tree_config()?;
    info!(?settings, "starting workload");

    let mut map = TreeMap::with_config(config);
    let mut reports = Vec::new();
    timed(&mut reports, "load", || load(&mut map, settings.count))?;
    let height = map.height();
    timed(&mut reports, "navigate", || navigate(&map, settings.count))?;
    timed(&mut reports, "views", || views(&map))?;
    timed(&mut reports, "remove", || remove_random(&mut map, settings.removals, settings.seed))?;
    timed(&mut reports, "drain", || drain(&mut map))?;

    let summary = Summary {
        settings,
        height,
        phases: reports,
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(height = summary.height, phases = summary.phases.len(), "workload passed");
    }

    Ok(())
}
