//! The `Sim` struct and its tick loop.

use tracing::{debug, info, trace, warn};

use mapd_core::{AgentId, Cell, Direction, PriorityScheme, RunConfig, SimClock, Tick};
use mapd_fleet::{Agent, Dispatcher, FleetStore, TaskStatus};
use mapd_grid::RoadNetwork;
use mapd_plan::{NoReservations, PathPlanner, PlanningContext, TickProgress, VariantPlanner, plan_path};

use crate::observer::{RunSummary, TickStats};
use crate::stall::StallMonitor;
use crate::tasks::TaskSource;
use crate::{SimError, SimObserver, SimResult};

#[cfg(feature = "fx-hash")]
type ClaimIndex = rustc_hash::FxHashMap<Cell, Vec<Claim>>;
#[cfg(not(feature = "fx-hash"))]
type ClaimIndex = std::collections::HashMap<Cell, Vec<Claim>>;

/// Where a stepped agent ends the current tick.
#[derive(Copy, Clone, Debug)]
struct Claim {
    agent: AgentId,
    /// The cell the agent started the tick on.
    from:  Cell,
    dir:   Direction,
}

impl Claim {
    #[inline]
    fn is_move(&self, cell: Cell) -> bool {
        self.from != cell
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<P>` owns the whole state of one run and drives the tick loop:
///
/// 1. **Release**: new tasks are created while fewer tasks are outstanding
///    than there are agents and more deliveries are still required.
/// 2. **Escort**: a stalled agent picked by the stall monitor steps first,
///    trading places with a lone agent in its way.
/// 3. **Move** (in priority order): dispatch idle agents or tasks, plan for
///    agents without a plan, then step.  A step that collides with a cell
///    already claimed this tick is held, and any earlier agent that moved
///    into the held agent's cell is pushed back in turn.
/// 4. **Arrivals**: agents standing on the last waypoint of their plan pick
///    up or drop off; an agent whose plan ended short of its sub-goal
///    replans next tick.  Once every remaining delivery is outstanding,
///    every agent without a task retires.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<P: PathPlanner = VariantPlanner> {
    pub config:  RunConfig,
    pub clock:   SimClock,
    pub network: RoadNetwork,
    pub fleet:   FleetStore,
    pub planner: P,

    pub(crate) tasks:     Box<dyn TaskSource>,
    pub(crate) progress:  TickProgress,
    pub(crate) delivered: u32,
    pub(crate) cost:      u64,
    pub(crate) holds:     u64,
    pub(crate) replans:   u64,
    pub(crate) stalls:    StallMonitor,
}

impl<P: PathPlanner> Sim<P> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run until `required_deliveries` tasks have been delivered.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    ///
    /// Fails with [`SimError::Stalled`] if the run is still going after
    /// `config.effective_max_ticks()` ticks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        let max_ticks = self.config.effective_max_ticks();
        info!(variant = %self.config.variant, max_ticks, "run started");

        while !self.is_finished() {
            if self.clock.elapsed_ticks() >= max_ticks {
                warn!(
                    delivered = self.delivered,
                    required = self.config.required_deliveries,
                    "run stalled"
                );
                return Err(SimError::Stalled { ticks: max_ticks });
            }
            self.step(observer)?;
        }

        let summary = self.summary();
        info!(
            elapsed = summary.elapsed_ticks,
            cost = summary.total_cost,
            holds = summary.holds,
            replans = summary.replans,
            "run finished"
        );
        observer.on_sim_end(&summary);
        Ok(summary)
    }

    /// Run at most `n` ticks from the current position, stopping early once
    /// the run is finished.  Does not check the tick bound.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            if self.is_finished() {
                break;
            }
            self.step(observer)?;
        }
        Ok(())
    }

    /// Process one tick.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickStats> {
        self.clock.advance();
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        self.release_tasks(now)?;

        // ── Move phase ────────────────────────────────────────────────────
        let start: Vec<Cell> = self.fleet.agents.iter().map(|a| a.pos).collect();
        let mut claims = ClaimIndex::default();
        let mut held: Vec<AgentId> = Vec::new();
        self.progress.reset();

        if let Some(id) = self.stalls.escort() {
            self.step_escort(now, id, &mut claims, &mut held, observer);
        }

        match self.config.priority() {
            PriorityScheme::ByTaskId => {
                for task in self.fleet.task_ids() {
                    let Some(t) = self.fleet.task(task) else { continue };
                    let assigned = t.agent;
                    let agent = match assigned {
                        Some(a) => a,
                        None if self.fleet.has_free_agent() => {
                            Dispatcher::assign_agent_to_task(&self.network, &mut self.fleet, task)?
                        }
                        None => continue,
                    };
                    self.step_agent(now, agent, &mut claims, &mut held, observer)?;
                }
            }
            PriorityScheme::ByAgentId => {
                for i in 0..self.fleet.agent_count() {
                    let agent = AgentId(i as u32);
                    if self.fleet.agent(agent).is_free() && self.fleet.has_pending_task() {
                        Dispatcher::assign_task_to_agent(&self.network, &mut self.fleet, agent)?;
                    }
                    let a = self.fleet.agent(agent);
                    if a.active && a.task.is_some() {
                        self.step_agent(now, agent, &mut claims, &mut held, observer)?;
                    }
                }
            }
        }

        // ── Arrival phase ─────────────────────────────────────────────────
        self.process_arrivals(now, observer)?;

        // A conflict-avoiding plan no longer matches its agent's timing once
        // the agent was held; drop it so the next step replans.
        if self.planner.avoids_conflicts() {
            let escort = self.stalls.escort();
            for &id in &held {
                let agent = self.fleet.agent_mut(id);
                if agent.task.is_some() && escort != Some(id) {
                    agent.clear_plan();
                }
            }
        }

        if let Some(id) = self.stalls.end_tick(&self.fleet, &held) {
            self.start_escort(now, id)?;
        }

        let moved = self
            .fleet
            .agents
            .iter()
            .zip(&start)
            .filter(|(a, from)| a.pos != **from)
            .count();
        let stats = TickStats {
            moved:           moved as u32,
            held:            held.len() as u32,
            delivered_total: self.delivered,
            cost_total:      self.cost,
        };
        observer.on_tick_end(now, &stats);

        let interval = self.config.snapshot_interval_ticks.max(1);
        if now.0.is_multiple_of(interval) || self.is_finished() {
            observer.on_snapshot(now, &self.network, &self.fleet);
        }
        Ok(stats)
    }

    /// `true` once every required delivery has been made.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.delivered >= self.config.required_deliveries
    }

    #[inline]
    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    #[inline]
    pub fn total_cost(&self) -> u64 {
        self.cost
    }

    /// Counters so far; final once [`is_finished`](Self::is_finished).
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            elapsed_ticks: self.clock.elapsed_ticks(),
            total_cost:    self.cost,
            delivered:     self.delivered,
            holds:         self.holds,
            replans:       self.replans,
        }
    }

    // ── Tick phases ───────────────────────────────────────────────────────

    fn release_tasks(&mut self, now: Tick) -> SimResult<()> {
        let agents = self.fleet.agent_count();
        let required = self.config.required_deliveries as usize;

        while self.fleet.outstanding() < agents
            && self.fleet.outstanding() + (self.delivered as usize) < required
        {
            let trip = self.tasks.next_trip(&self.network, &self.fleet).ok_or_else(|| {
                SimError::Config(format!(
                    "task source ran dry after {} tasks",
                    self.fleet.issued_tasks()
                ))
            })?;
            for cell in [trip.origin, trip.destination] {
                if !self.network.is_open(cell) {
                    return Err(SimError::Config(format!("trip endpoint {cell} is not a road cell")));
                }
            }
            let id = self.fleet.spawn_task(trip.origin, trip.destination);
            debug!(tick = %now, task = %id, origin = %trip.origin, destination = %trip.destination, "task released");
        }
        Ok(())
    }

    /// Plan if needed, then advance `id` one waypoint unless the target cell
    /// is already claimed by an earlier agent.
    fn step_agent<O: SimObserver>(
        &mut self,
        now:      Tick,
        id:       AgentId,
        claims:   &mut ClaimIndex,
        held:     &mut Vec<AgentId>,
        observer: &mut O,
    ) -> SimResult<()> {
        if self.progress.has_stepped(id) {
            return Ok(());
        }
        if self.fleet.agent(id).plan.is_empty() {
            let ctx = PlanningContext {
                network:  &self.network,
                fleet:    &self.fleet,
                progress: &self.progress,
            };
            let plan = self.planner.plan(&ctx, id)?;
            let agent = self.fleet.agent_mut(id);
            agent.plan = plan;
            agent.cursor = -1;
            self.replans += 1;
        }
        self.cost += 1;
        self.progress.mark_stepped(id);

        let agent = self.fleet.agent_mut(id);
        let from = agent.pos;
        agent.cursor += 1;
        let (to, dir) = match agent.plan.get(agent.current_index()) {
            Some(w) => (w.cell, w.dir),
            None => {
                // Already on the last waypoint.
                agent.cursor -= 1;
                (from, Direction::STILL)
            }
        };

        let blocked = claims
            .get(&to)
            .is_some_and(|cs| cs.iter().any(|c| !dir.is_opposite(c.dir)));
        if !blocked {
            agent.pos = to;
            claims.entry(to).or_default().push(Claim { agent: id, from, dir });
            trace!(tick = %now, agent = %id, %from, %to, "stepped");
            return Ok(());
        }

        agent.cursor -= 1;
        warn!(tick = %now, agent = %id, cell = %from, target = %to, "step held");
        self.record_hold(now, id, held, observer);
        self.push_back(now, from, claims, held, observer);
        claims.entry(from).or_default().push(Claim { agent: id, from, dir: Direction::STILL });
        Ok(())
    }

    /// Give `id` an unconstrained shortest path to its sub-goal.
    fn start_escort(&mut self, now: Tick, id: AgentId) -> SimResult<()> {
        let Some(goal) = self.fleet.task_of(id).map(|t| t.sub_goal()) else {
            return Ok(());
        };
        let pos = self.fleet.agent(id).pos;
        match plan_path(&self.network, pos, goal, &NoReservations)? {
            Some(plan) => {
                let agent = self.fleet.agent_mut(id);
                agent.plan = plan;
                agent.cursor = -1;
                self.replans += 1;
                debug!(tick = %now, agent = %id, %pos, %goal, "escort planned");
            }
            None => {
                warn!(tick = %now, agent = %id, %pos, %goal, "no route for stalled agent");
                self.stalls.bench(id);
            }
        }
        Ok(())
    }

    /// Advance the escort one waypoint ahead of everyone else.  A lone task
    /// holder on the target cell is sent the other way and replans.
    fn step_escort<O: SimObserver>(
        &mut self,
        now:      Tick,
        id:       AgentId,
        claims:   &mut ClaimIndex,
        held:     &mut Vec<AgentId>,
        observer: &mut O,
    ) {
        self.cost += 1;
        self.progress.mark_stepped(id);

        let agent = self.fleet.agent(id);
        let from = agent.pos;
        let Some(next) = agent.next_waypoint().copied() else {
            claims.entry(from).or_default().push(Claim { agent: id, from, dir: Direction::STILL });
            return;
        };

        let carrying = |b: &&Agent, cell: Cell| {
            b.id != id && b.active && b.task.is_some() && b.pos == cell
        };
        let occupants: Vec<AgentId> = self
            .fleet
            .agents
            .iter()
            .filter(|b| carrying(b, next.cell))
            .map(|b| b.id)
            .collect();
        let alone = !self.fleet.agents.iter().any(|b| carrying(&b, from));

        match occupants.as_slice() {
            [] => {}
            &[other] if alone => {
                let b = self.fleet.agent_mut(other);
                b.pos = from;
                b.clear_plan();
                self.cost += 1;
                self.progress.mark_stepped(other);
                claims.entry(from).or_default().push(Claim {
                    agent: other,
                    from:  next.cell,
                    dir:   next.dir.reverse(),
                });
                warn!(tick = %now, agent = %other, escort = %id, from = %next.cell, to = %from, "yielded to escorted agent");
                self.record_hold(now, other, held, observer);
            }
            _ => {
                claims.entry(from).or_default().push(Claim { agent: id, from, dir: Direction::STILL });
                warn!(tick = %now, agent = %id, target = %next.cell, "escort waiting");
                self.record_hold(now, id, held, observer);
                self.stalls.escort_waited();
                return;
            }
        }

        let agent = self.fleet.agent_mut(id);
        agent.cursor += 1;
        agent.pos = next.cell;
        claims.entry(next.cell).or_default().push(Claim { agent: id, from, dir: next.dir });
        trace!(tick = %now, agent = %id, %from, to = %next.cell, "escort stepped");
    }

    /// Send every agent that moved into `cell` this tick back where it came
    /// from, and cascade to whoever moved into those cells.
    fn push_back<O: SimObserver>(
        &mut self,
        now:      Tick,
        cell:     Cell,
        claims:   &mut ClaimIndex,
        held:     &mut Vec<AgentId>,
        observer: &mut O,
    ) {
        let mut pending = vec![cell];
        while let Some(cell) = pending.pop() {
            let Some(list) = claims.get_mut(&cell) else { continue };
            let movers: Vec<Claim> = list.iter().copied().filter(|c| c.is_move(cell)).collect();
            list.retain(|c| !c.is_move(cell));

            for m in movers {
                let agent = self.fleet.agent_mut(m.agent);
                agent.cursor -= 1;
                agent.pos = m.from;
                claims.entry(m.from).or_default().push(Claim {
                    agent: m.agent,
                    from:  m.from,
                    dir:   Direction::STILL,
                });
                warn!(tick = %now, agent = %m.agent, from = %cell, to = %m.from, "pushed back");
                self.record_hold(now, m.agent, held, observer);
                pending.push(m.from);
            }
        }
    }

    fn record_hold<O: SimObserver>(
        &mut self,
        now:      Tick,
        id:       AgentId,
        held:     &mut Vec<AgentId>,
        observer: &mut O,
    ) {
        self.holds += 1;
        held.push(id);
        observer.on_agent_held(now, id);
    }

    fn process_arrivals<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<()> {
        let required = self.config.required_deliveries as usize;

        for i in 0..self.fleet.agent_count() {
            let id = AgentId(i as u32);
            let agent = self.fleet.agent(id);
            if !agent.active || !agent.at_plan_end() {
                continue;
            }
            let Some((status, goal)) = self.fleet.task_of(id).map(|t| (t.status, t.sub_goal())) else {
                continue;
            };
            if agent.pos != goal {
                // A holding plan ran out short of the goal.
                self.fleet.agent_mut(id).clear_plan();
                continue;
            }

            match status {
                TaskStatus::InTransit => {
                    let task = self.fleet.complete_delivery(id)?;
                    self.delivered += 1;
                    debug!(tick = %now, agent = %id, task = %task.id, delivered = self.delivered, "delivered");
                    observer.on_delivery(now, task.id, id);
                }
                TaskStatus::Pending | TaskStatus::EnRouteToPickup => {
                    let task = self.fleet.complete_pickup(id)?;
                    debug!(tick = %now, agent = %id, %task, "picked up");
                }
            }
        }

        // No further task will be released for an agent without one.
        if self.delivered as usize + self.fleet.outstanding() >= required {
            for agent in self.fleet.agents.iter_mut().filter(|a| a.is_free()) {
                agent.active = false;
                debug!(tick = %now, agent = %agent.id, "agent retired");
            }
        }
        Ok(())
    }
}
