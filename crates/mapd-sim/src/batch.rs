//! Headless batch runs over many configurations.
//!
//! Every repetition builds a fresh network, fleet, and task stream from a
//! seed derived with [`mix_seed`], so results depend only on the
//! configurations and the repetition count, never on scheduling.  With the
//! `parallel` feature the repetitions run on Rayon's thread pool.

use tracing::{info, warn};

use mapd_core::{PlannerVariant, RunConfig, mix_seed};

use crate::observer::RunSummary;
use crate::{NoopObserver, SimBuilder, SimError, SimResult};

/// A list of configurations, each run `repetitions` times.
#[derive(Clone, Debug)]
pub struct BatchSweep {
    pub configs:     Vec<RunConfig>,
    pub repetitions: u32,
}

impl BatchSweep {
    /// The benchmark grid: a 17×17 network with 50 obstacles and a 33×33
    /// network with 200, each with 20 or 40 agents and 60 or 80 deliveries,
    /// for every planner variant.  Ten repetitions each.
    pub fn reference() -> Self {
        let mut configs = Vec::new();
        for (grid_size, obstacle_count) in [(17, 50), (33, 200)] {
            for agent_count in [20, 40] {
                for required_deliveries in [60, 80] {
                    for variant in PlannerVariant::ALL {
                        configs.push(RunConfig {
                            grid_size,
                            obstacle_count,
                            agent_count,
                            required_deliveries,
                            variant,
                            ..RunConfig::default()
                        });
                    }
                }
            }
        }
        Self { configs, repetitions: 10 }
    }

    pub fn run(&self) -> SimResult<Vec<BatchResult>> {
        run_batch(&self.configs, self.repetitions)
    }
}

/// All repetitions of one configuration.
#[derive(Clone, Debug)]
pub struct BatchResult {
    pub config: RunConfig,
    /// One summary per repetition, in repetition order.
    pub runs:   Vec<RunSummary>,
}

impl BatchResult {
    pub fn mean_elapsed(&self) -> f64 {
        self.mean(|r| r.elapsed_ticks)
    }

    pub fn mean_cost(&self) -> f64 {
        self.mean(|r| r.total_cost)
    }

    pub fn mean_holds(&self) -> f64 {
        self.mean(|r| r.holds)
    }

    fn mean(&self, f: impl Fn(&RunSummary) -> u64) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.runs.iter().map(f).sum::<u64>() as f64 / self.runs.len() as f64
    }
}

/// Run every configuration `repetitions` times.
///
/// Repetition `r` of a configuration uses seed `mix_seed(config.seed, r)`.
/// Any failed repetition aborts the batch, a stalled one
/// ([`SimError::Stalled`]) included.
pub fn run_batch(configs: &[RunConfig], repetitions: u32) -> SimResult<Vec<BatchResult>> {
    for config in configs {
        config.validate()?;
    }
    let jobs: Vec<(usize, u32)> = (0..configs.len())
        .flat_map(|c| (0..repetitions).map(move |r| (c, r)))
        .collect();
    info!(configs = configs.len(), repetitions, runs = jobs.len(), "batch started");

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<SimResult<RunSummary>> =
        jobs.iter().map(|&(c, r)| run_one(&configs[c], r)).collect();

    #[cfg(feature = "parallel")]
    let outcomes: Vec<SimResult<RunSummary>> = {
        use rayon::prelude::*;
        jobs.par_iter().map(|&(c, r)| run_one(&configs[c], r)).collect()
    };

    let mut results: Vec<BatchResult> = configs
        .iter()
        .map(|config| BatchResult { config: config.clone(), runs: Vec::new() })
        .collect();
    for (&(c, _), outcome) in jobs.iter().zip(outcomes) {
        results[c].runs.push(outcome?);
    }
    Ok(results)
}

/// One repetition.
fn run_one(config: &RunConfig, repetition: u32) -> SimResult<RunSummary> {
    let mut config = config.clone();
    config.seed = mix_seed(config.seed, repetition as u64);
    let seed = config.seed;
    let variant = config.variant;

    let mut sim = SimBuilder::new(config).build()?;
    sim.run(&mut NoopObserver).inspect_err(|e| {
        if let SimError::Stalled { ticks } = e {
            warn!(seed, ticks, %variant, "repetition stalled");
        }
    })
}
