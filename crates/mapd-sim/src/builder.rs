//! Fluent builder for constructing a [`Sim`].

use tracing::info;

use mapd_core::{Cell, RunConfig, SimClock, SimRng};
use mapd_fleet::FleetBuilder;
use mapd_grid::RoadNetwork;
use mapd_plan::{PathPlanner, TickProgress, VariantPlanner};

use crate::stall::StallMonitor;
use crate::tasks::{RandomTasks, TaskSource};
use crate::{Sim, SimError, SimResult};

/// Child-stream offsets of the run's root RNG, one per concern.
const NETWORK_STREAM: u64 = 0;
const SPAWN_STREAM:   u64 = 1;
const TASK_STREAM:    u64 = 2;

/// Fluent builder for [`Sim<P>`].
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                                        |
/// |----------------------|------------------------------------------------|
/// | `.network(n)`        | Generated from `grid_size` and `obstacle_count`|
/// | `.positions(v)`      | Distinct random road cells                     |
/// | `.task_source(s)`    | `RandomTasks` with `min_trip_distance`         |
/// | `.planner(p)`        | `VariantPlanner::from(config.variant)`         |
///
/// Every random choice draws from a child of one root `SimRng` seeded with
/// `config.seed`, so overriding one input never shifts the others.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(RunConfig::default()).build()?;
/// let summary = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<P: PathPlanner = VariantPlanner> {
    config:    RunConfig,
    network:   Option<RoadNetwork>,
    positions: Option<Vec<Cell>>,
    source:    Option<Box<dyn TaskSource>>,
    planner:   P,
}

impl SimBuilder<VariantPlanner> {
    pub fn new(config: RunConfig) -> Self {
        let planner = VariantPlanner::from(config.variant);
        Self {
            config,
            network:   None,
            positions: None,
            source:    None,
            planner,
        }
    }
}

impl<P: PathPlanner> SimBuilder<P> {
    /// Use this network instead of generating one.  Its size must equal
    /// `config.grid_size`.
    pub fn network(mut self, network: RoadNetwork) -> Self {
        self.network = Some(network);
        self
    }

    /// Spawn agent `i` on `positions[i]`.  Must be length `agent_count`.
    pub fn positions(mut self, positions: Vec<Cell>) -> Self {
        self.positions = Some(positions);
        self
    }

    pub fn task_source(mut self, source: impl TaskSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Replace the planner chosen from `config.variant`.
    pub fn planner<Q: PathPlanner>(self, planner: Q) -> SimBuilder<Q> {
        SimBuilder {
            config:    self.config,
            network:   self.network,
            positions: self.positions,
            source:    self.source,
            planner,
        }
    }

    /// Validate inputs, build the network and the fleet, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<P>> {
        self.config.validate()?;
        let agent_count = self.config.agent_count as usize;

        let mut root = SimRng::new(self.config.seed);
        let mut network_rng = root.child(NETWORK_STREAM);
        let mut spawn_rng = root.child(SPAWN_STREAM);
        let task_rng = root.child(TASK_STREAM);

        // ── Network ───────────────────────────────────────────────────────
        let network = match self.network {
            Some(n) if n.size != self.config.grid_size => {
                return Err(SimError::Config(format!(
                    "network is {}x{} but grid_size is {}",
                    n.size, n.size, self.config.grid_size
                )));
            }
            Some(n) => n,
            None => RoadNetwork::generate(
                self.config.grid_size,
                self.config.obstacle_count,
                &mut network_rng,
            )?,
        };

        // ── Fleet ─────────────────────────────────────────────────────────
        let mut fleet = FleetBuilder::new(agent_count);
        if let Some(p) = self.positions {
            if p.len() != agent_count {
                return Err(SimError::AgentCountMismatch {
                    expected: agent_count,
                    got:      p.len(),
                    what:     "spawn positions",
                });
            }
            fleet = fleet.positions(p);
        }
        let fleet = fleet.build(&network, &mut spawn_rng)?;

        let tasks = self.source.unwrap_or_else(|| {
            Box::new(RandomTasks::new(task_rng, self.config.min_trip_distance))
        });

        info!(
            grid = network.size,
            road_cells = network.open_count(),
            agents = agent_count,
            required = self.config.required_deliveries,
            variant = %self.config.variant,
            seed = self.config.seed,
            "simulation built"
        );

        Ok(Sim {
            clock:     SimClock::new(self.config.tick_duration_ms),
            progress:  TickProgress::new(agent_count),
            stalls:    StallMonitor::new(network.size, network.open_count(), agent_count),
            config:    self.config,
            network,
            fleet,
            planner:   self.planner,
            tasks,
            delivered: 0,
            cost:      0,
            holds:     0,
            replans:   0,
        })
    }
}
