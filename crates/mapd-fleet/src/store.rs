//! `FleetStore`: every agent and every outstanding task of a run.
//!
//! Agents live in a `Vec` indexed by `AgentId` and are never removed.  Tasks
//! live in a `BTreeMap` so iteration is in ascending `TaskId`, the order the
//! `ByTaskId` priority scheme processes them in.

use std::collections::BTreeMap;

use mapd_core::{AgentId, Cell, TaskId};

use crate::{Agent, AgentPhase, FleetError, FleetResult, Task, TaskStatus};

pub struct FleetStore {
    /// Indexed by `AgentId`.
    pub agents: Vec<Agent>,
    tasks:      BTreeMap<TaskId, Task>,
    next_task:  u32,
}

impl FleetStore {
    /// One agent per cell, ids assigned in order.
    pub fn new(positions: impl IntoIterator<Item = Cell>) -> Self {
        let agents = positions
            .into_iter()
            .enumerate()
            .map(|(i, pos)| Agent::new(AgentId(i as u32), pos))
            .collect();
        Self { agents, tasks: BTreeMap::new(), next_task: 0 }
    }

    // ── Agents ────────────────────────────────────────────────────────────

    #[inline]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// # Panics
    /// Panics if `id` was not issued by this store.
    #[inline]
    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id.index()]
    }

    #[inline]
    pub fn agent_mut(&mut self, id: AgentId) -> &mut Agent {
        &mut self.agents[id.index()]
    }

    /// Active agents without a task, ascending id.
    pub fn free_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.is_free())
    }

    pub fn has_free_agent(&self) -> bool {
        self.agents.iter().any(Agent::is_free)
    }

    pub fn phase(&self, id: AgentId) -> AgentPhase {
        let agent = self.agent(id);
        if !agent.active {
            return AgentPhase::Done;
        }
        match agent.task.and_then(|t| self.tasks.get(&t)).map(|t| t.status) {
            None => AgentPhase::Idle,
            Some(TaskStatus::InTransit) => AgentPhase::EnRouteDropoff,
            Some(TaskStatus::Pending | TaskStatus::EnRouteToPickup) => AgentPhase::EnRoutePickup,
        }
    }

    // ── Tasks ─────────────────────────────────────────────────────────────

    /// Create a pending task and return its id.  Ids are never reused.
    pub fn spawn_task(&mut self, origin: Cell, destination: Cell) -> TaskId {
        let id = TaskId(self.next_task);
        self.next_task += 1;
        self.tasks.insert(id, Task::new(id, origin, destination));
        id
    }

    /// Number of tasks ever created.
    #[inline]
    pub fn issued_tasks(&self) -> u32 {
        self.next_task
    }

    /// Tasks created but not yet delivered.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Outstanding tasks, ascending id.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Snapshot of outstanding task ids, ascending.
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.keys().copied().collect()
    }

    /// Pending, unassigned tasks, ascending id.
    pub fn pending_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values().filter(|t| t.is_unassigned())
    }

    pub fn has_pending_task(&self) -> bool {
        self.pending_tasks().next().is_some()
    }

    /// The task an agent is serving, if it still exists.
    pub fn task_of(&self, agent: AgentId) -> Option<&Task> {
        self.agent(agent).task.and_then(|t| self.tasks.get(&t))
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Bind a free agent to an unassigned task.  Both sides change together
    /// or not at all.
    pub fn assign(&mut self, agent: AgentId, task: TaskId) -> FleetResult<()> {
        let invalid = |reason| FleetError::InvalidAssignment { agent, task, reason };
        if !self.agent(agent).is_free() {
            return Err(invalid("agent is not free"));
        }
        let t = self.tasks.get_mut(&task).ok_or(FleetError::TaskNotFound(task))?;
        if !t.is_unassigned() {
            return Err(invalid("task is already assigned"));
        }
        t.agent = Some(agent);
        t.status = TaskStatus::EnRouteToPickup;

        let a = self.agent_mut(agent);
        a.task = Some(task);
        a.clear_plan();
        Ok(())
    }

    /// The agent reached its task's origin: the task is now in transit and the
    /// agent will plan toward the destination on its next step.
    pub fn complete_pickup(&mut self, agent: AgentId) -> FleetResult<TaskId> {
        let id = self.agent(agent).task.ok_or(FleetError::NoTask(agent))?;
        let t = self.tasks.get_mut(&id).ok_or(FleetError::TaskNotFound(id))?;
        t.status = TaskStatus::InTransit;
        self.agent_mut(agent).clear_plan();
        Ok(id)
    }

    /// The agent reached its task's destination: the task is removed and the
    /// agent is free again.
    pub fn complete_delivery(&mut self, agent: AgentId) -> FleetResult<Task> {
        let id = self.agent(agent).task.ok_or(FleetError::NoTask(agent))?;
        let t = self.tasks.remove(&id).ok_or(FleetError::TaskNotFound(id))?;
        let a = self.agent_mut(agent);
        a.task = None;
        a.clear_plan();
        Ok(t)
    }
}
