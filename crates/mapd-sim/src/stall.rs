//! Stall detection and the escort that breaks deadlocks.
//!
//! Each agent carrying a task keeps two counters:
//!
//! | Counter   | Counts                                                       |
//! |-----------|--------------------------------------------------------------|
//! | `stuck`   | consecutive ticks held, or ending without a route to its goal |
//! | `overdue` | ticks since its sub-goal last changed                        |
//!
//! Once either reaches its patience the most overdue agent (lowest id on a
//! tie) becomes the *escort*.  It gets an unconstrained shortest path and
//! steps before everyone else each tick.  A task holder standing alone on
//! its next cell trades places with it and replans.  The escort is released
//! when its sub-goal changes, i.e. when it picks up or delivers.
//!
//! An escort that has to wait more than `stuck_patience` ticks (its next
//! cell is shared by two agents, or its own cell is) is benched and another
//! candidate is tried.  Benches clear once an agent's sub-goal changes, or
//! when every candidate is benched.

use std::cmp::Reverse;

use tracing::{info, warn};

use mapd_core::{AgentId, TaskId};
use mapd_fleet::{FleetStore, TaskStatus};

/// The task an agent serves and whether the passenger is aboard.
type GoalKey = (TaskId, bool);

#[derive(Copy, Clone, Debug)]
struct Escort {
    agent: AgentId,
    key:   GoalKey,
    waits: u32,
}

pub(crate) struct StallMonitor {
    pub(crate) stuck_patience:   u32,
    pub(crate) overdue_patience: u32,
    stuck:   Vec<u32>,
    overdue: Vec<u32>,
    keys:    Vec<Option<GoalKey>>,
    benched: Vec<bool>,
    escort:  Option<Escort>,
}

impl StallMonitor {
    pub(crate) fn new(grid_size: i32, open_cells: usize, agents: usize) -> Self {
        Self {
            stuck_patience:   ((grid_size / 2).max(3)) as u32,
            overdue_patience: 2 * open_cells as u32,
            stuck:            vec![0; agents],
            overdue:          vec![0; agents],
            keys:             vec![None; agents],
            benched:          vec![false; agents],
            escort:           None,
        }
    }

    #[inline]
    pub(crate) fn escort(&self) -> Option<AgentId> {
        self.escort.map(|e| e.agent)
    }

    /// Stop escorting `agent` and skip it when picking the next escort.
    pub(crate) fn bench(&mut self, agent: AgentId) {
        self.benched[agent.index()] = true;
        if self.escort() == Some(agent) {
            self.escort = None;
        }
    }

    /// The escort could not move this tick.  Benches it once it has waited
    /// longer than `stuck_patience`.
    pub(crate) fn escort_waited(&mut self) {
        let Some(e) = self.escort.as_mut() else { return };
        e.waits += 1;
        if e.waits > self.stuck_patience {
            let agent = e.agent;
            warn!(%agent, waits = e.waits, "escort benched");
            self.bench(agent);
        }
    }

    /// Update the counters once a tick is over.  Returns the agent to start
    /// escorting, if a new escort is needed.
    pub(crate) fn end_tick(&mut self, fleet: &FleetStore, held: &[AgentId]) -> Option<AgentId> {
        for agent in &fleet.agents {
            let i = agent.id.index();
            let task = fleet.task_of(agent.id).filter(|_| agent.active);
            let Some(task) = task else {
                self.keys[i] = None;
                self.stuck[i] = 0;
                self.overdue[i] = 0;
                continue;
            };
            let key = (task.id, task.status == TaskStatus::InTransit);
            if self.keys[i] != Some(key) {
                self.keys[i] = Some(key);
                self.stuck[i] = 0;
                self.overdue[i] = 0;
                self.benched[i] = false;
                continue;
            }

            self.overdue[i] += 1;
            let routed = agent.plan.last().is_some_and(|w| w.cell == task.sub_goal());
            if held.contains(&agent.id) || !routed {
                self.stuck[i] += 1;
            } else {
                self.stuck[i] = 0;
            }
        }

        if let Some(e) = self.escort {
            if self.keys[e.agent.index()] == Some(e.key) {
                return None;
            }
            info!(agent = %e.agent, "escort released");
            self.escort = None;
        }
        self.pick()
    }

    fn pick(&mut self) -> Option<AgentId> {
        let stalled: Vec<usize> = (0..self.keys.len())
            .filter(|&i| {
                self.keys[i].is_some()
                    && (self.stuck[i] >= self.stuck_patience || self.overdue[i] >= self.overdue_patience)
            })
            .collect();
        if stalled.is_empty() {
            return None;
        }
        if stalled.iter().all(|&i| self.benched[i]) {
            self.benched.fill(false);
        }

        let i = stalled
            .into_iter()
            .filter(|&i| !self.benched[i])
            .max_by_key(|&i| (self.overdue[i], Reverse(i)))?;
        let key = self.keys[i]?;
        let agent = AgentId(i as u32);
        info!(
            %agent,
            stuck = self.stuck[i],
            overdue = self.overdue[i],
            "escorting stalled agent"
        );
        self.stuck[i] = 0;
        self.escort = Some(Escort { agent, key, waits: 0 });
        Some(agent)
    }
}
