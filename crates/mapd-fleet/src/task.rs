//! Pickup-and-delivery tasks.

use mapd_core::{AgentId, Cell, TaskId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskStatus {
    /// Waiting at its origin for an agent.
    Pending,
    /// Assigned; the agent is driving to the origin.
    EnRouteToPickup,
    /// Picked up; the agent is driving to the destination.
    InTransit,
}

/// A passenger to carry from `origin` to `destination`.
///
/// Removed from the fleet store on delivery.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    pub id:          TaskId,
    pub origin:      Cell,
    pub destination: Cell,
    pub status:      TaskStatus,
    pub agent:       Option<AgentId>,
}

impl Task {
    pub fn new(id: TaskId, origin: Cell, destination: Cell) -> Self {
        Self {
            id,
            origin,
            destination,
            status: TaskStatus::Pending,
            agent:  None,
        }
    }

    /// Pending and not yet claimed by any agent.
    #[inline]
    pub fn is_unassigned(&self) -> bool {
        self.status == TaskStatus::Pending && self.agent.is_none()
    }

    /// Where the serving agent is currently headed.
    #[inline]
    pub fn sub_goal(&self) -> Cell {
        match self.status {
            TaskStatus::InTransit => self.destination,
            TaskStatus::Pending | TaskStatus::EnRouteToPickup => self.origin,
        }
    }
}
