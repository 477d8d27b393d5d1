//! Unit tests for mapd-fleet.

#[cfg(test)]
mod helpers {
    use mapd_core::Cell;
    use mapd_grid::{RoadNetwork, RoadNetworkBuilder};

    use crate::FleetStore;

    /// Open 7×7 lattice (intersections at odd/odd cells 1..=5).
    pub fn open_7x7() -> RoadNetwork {
        RoadNetworkBuilder::new(7).build().unwrap()
    }

    pub fn fleet_at(cells: &[(i32, i32)]) -> FleetStore {
        FleetStore::new(cells.iter().map(|&(x, y)| Cell::new(x, y)))
    }
}

#[cfg(test)]
mod plan {
    use mapd_core::{Cell, Direction};
    use crate::{Plan, Waypoint};

    #[test]
    fn from_cells_derives_directions() {
        let p = Plan::from_cells(&[Cell::new(1, 1), Cell::new(2, 1), Cell::new(2, 1), Cell::new(2, 2)])
            .unwrap();
        let dirs: Vec<Direction> = p.waypoints.iter().map(|w| w.dir).collect();
        assert_eq!(dirs, vec![Direction::STILL, Direction::EAST, Direction::STILL, Direction::SOUTH]);
        assert!(p.is_well_formed());
        assert_eq!(p.wait_count(), 1);
        assert_eq!(p.first_visit(Cell::new(2, 1)), Some(1));
    }

    #[test]
    fn from_cells_rejects_jumps() {
        assert!(Plan::from_cells(&[Cell::new(1, 1), Cell::new(3, 1)]).is_none());
    }

    #[test]
    fn wrong_offsets_are_malformed() {
        let p = Plan::new(vec![
            Waypoint::new(Cell::new(1, 1), 0, Direction::STILL),
            Waypoint::new(Cell::new(2, 1), 2, Direction::EAST),
        ]);
        assert!(!p.is_well_formed());
    }

    #[test]
    fn mismatched_direction_is_malformed() {
        let p = Plan::new(vec![
            Waypoint::new(Cell::new(1, 1), 0, Direction::STILL),
            Waypoint::new(Cell::new(2, 1), 1, Direction::WEST),
        ]);
        assert!(!p.is_well_formed());
    }
}

#[cfg(test)]
mod agent {
    use mapd_core::{AgentId, Cell};
    use crate::{Agent, Plan};

    #[test]
    fn cursor_tracks_current_waypoint() {
        let mut a = Agent::new(AgentId(0), Cell::new(1, 1));
        a.plan = Plan::from_cells(&[Cell::new(1, 1), Cell::new(2, 1), Cell::new(3, 1)]).unwrap();
        assert_eq!(a.current_index(), 0);
        assert_eq!(a.next_waypoint().unwrap().cell, Cell::new(2, 1));
        assert!(!a.at_plan_end());

        a.cursor = 1;
        assert_eq!(a.current_index(), 2);
        assert!(a.next_waypoint().is_none());
        assert!(a.at_plan_end());

        a.clear_plan();
        assert_eq!(a.cursor, -1);
        assert!(!a.at_plan_end());
    }
}

#[cfg(test)]
mod store {
    use mapd_core::{AgentId, Cell, TaskId};
    use crate::{AgentPhase, FleetError, TaskStatus};

    use super::helpers::fleet_at;

    #[test]
    fn task_ids_are_monotonic_and_never_reused() {
        let mut fleet = fleet_at(&[(1, 1)]);
        let a = fleet.spawn_task(Cell::new(1, 1), Cell::new(3, 3));
        let b = fleet.spawn_task(Cell::new(3, 1), Cell::new(1, 3));
        assert_eq!((a, b), (TaskId(0), TaskId(1)));

        fleet.assign(AgentId(0), a).unwrap();
        fleet.complete_pickup(AgentId(0)).unwrap();
        fleet.complete_delivery(AgentId(0)).unwrap();
        assert_eq!(fleet.spawn_task(Cell::new(1, 1), Cell::new(3, 3)), TaskId(2));
        assert_eq!(fleet.task_ids(), vec![TaskId(1), TaskId(2)]);
        assert_eq!(fleet.issued_tasks(), 3);
    }

    #[test]
    fn lifecycle_phases() {
        let mut fleet = fleet_at(&[(1, 1)]);
        let agent = AgentId(0);
        let task = fleet.spawn_task(Cell::new(3, 1), Cell::new(1, 3));
        assert_eq!(fleet.phase(agent), AgentPhase::Idle);

        fleet.assign(agent, task).unwrap();
        assert_eq!(fleet.phase(agent), AgentPhase::EnRoutePickup);
        assert_eq!(fleet.task(task).unwrap().status, TaskStatus::EnRouteToPickup);
        assert_eq!(fleet.task(task).unwrap().sub_goal(), Cell::new(3, 1));

        fleet.complete_pickup(agent).unwrap();
        assert_eq!(fleet.phase(agent), AgentPhase::EnRouteDropoff);
        assert_eq!(fleet.task_of(agent).unwrap().sub_goal(), Cell::new(1, 3));

        let done = fleet.complete_delivery(agent).unwrap();
        assert_eq!(done.id, task);
        assert_eq!(fleet.outstanding(), 0);
        assert!(fleet.agent(agent).is_free());

        fleet.agent_mut(agent).active = false;
        assert_eq!(fleet.phase(agent), AgentPhase::Done);
    }

    #[test]
    fn assign_is_all_or_nothing() {
        let mut fleet = fleet_at(&[(1, 1), (3, 3)]);
        let t = fleet.spawn_task(Cell::new(3, 1), Cell::new(1, 3));
        fleet.assign(AgentId(0), t).unwrap();

        let err = fleet.assign(AgentId(1), t).unwrap_err();
        assert!(matches!(err, FleetError::InvalidAssignment { .. }));
        assert!(fleet.agent(AgentId(1)).task.is_none());
        assert_eq!(fleet.task(t).unwrap().agent, Some(AgentId(0)));
    }

    #[test]
    fn completing_without_task_fails() {
        let mut fleet = fleet_at(&[(1, 1)]);
        assert!(matches!(fleet.complete_pickup(AgentId(0)), Err(FleetError::NoTask(_))));
    }
}

#[cfg(test)]
mod builder {
    use mapd_core::{Cell, ErrorKind, SimRng};
    use crate::FleetBuilder;

    use super::helpers::open_7x7;

    #[test]
    fn random_spawn_on_distinct_road_cells() {
        let net = open_7x7();
        let fleet = FleetBuilder::new(10).build(&net, &mut SimRng::new(5)).unwrap();
        let mut cells: Vec<Cell> = fleet.agents.iter().map(|a| a.pos).collect();
        assert!(cells.iter().all(|&c| net.is_open(c)));
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), 10);
    }

    #[test]
    fn explicit_positions_are_validated() {
        let net = open_7x7();
        let mut rng = SimRng::new(0);
        let dup = FleetBuilder::new(2)
            .positions(vec![Cell::new(1, 1), Cell::new(1, 1)])
            .build(&net, &mut rng);
        assert_eq!(dup.err().map(|e| e.kind()), Some(ErrorKind::Config));

        let grass = FleetBuilder::new(1).positions(vec![Cell::new(2, 2)]).build(&net, &mut rng);
        assert!(grass.is_err());

        let short = FleetBuilder::new(3).positions(vec![Cell::new(1, 1)]).build(&net, &mut rng);
        assert!(short.is_err());
    }

    #[test]
    fn too_many_agents() {
        let net = open_7x7();
        let over = net.open_count() + 1;
        assert!(FleetBuilder::new(over).build(&net, &mut SimRng::new(0)).is_err());
    }
}

#[cfg(test)]
mod dispatch {
    use mapd_core::{AgentId, Cell, ErrorKind, SimRng, TaskId};
    use mapd_grid::RoadNetwork;
    use crate::{Dispatcher, FleetBuilder, FleetError, FleetStore, TaskStatus};

    use super::helpers::{fleet_at, open_7x7};

    #[test]
    fn picks_nearest_agent() {
        let net = open_7x7();
        let mut fleet = fleet_at(&[(5, 5), (1, 3), (5, 1)]);
        let t = fleet.spawn_task(Cell::new(1, 1), Cell::new(5, 5));
        let agent = Dispatcher::assign_agent_to_task(&net, &mut fleet, t).unwrap();
        assert_eq!(agent, AgentId(1));
        assert_eq!(fleet.task(t).unwrap().status, TaskStatus::EnRouteToPickup);
        assert_eq!(fleet.agent(agent).task, Some(t));
        assert_eq!(fleet.agent(agent).cursor, -1);
    }

    #[test]
    fn tie_broken_by_neighbor_order() {
        // (2, 1) is discovered (+x) before (1, 2) (+y).
        let net = open_7x7();
        let fleet = fleet_at(&[(1, 2), (2, 1)]);
        let (agent, d) = Dispatcher::nearest_free_agent(&net, &fleet, Cell::new(1, 1)).unwrap();
        assert_eq!((agent, d), (AgentId(1), 1));
    }

    #[test]
    fn co_located_members_lowest_id_wins() {
        let net = open_7x7();
        let mut fleet = fleet_at(&[(1, 1)]);
        fleet.spawn_task(Cell::new(3, 3), Cell::new(1, 1));
        fleet.spawn_task(Cell::new(3, 3), Cell::new(5, 5));
        let t = Dispatcher::assign_task_to_agent(&net, &mut fleet, AgentId(0)).unwrap();
        assert_eq!(t, TaskId(0));
    }

    #[test]
    fn busy_and_retired_agents_are_skipped() {
        let net = open_7x7();
        let mut fleet = fleet_at(&[(1, 1), (1, 3), (5, 5)]);
        let first = fleet.spawn_task(Cell::new(1, 1), Cell::new(5, 1));
        fleet.assign(AgentId(0), first).unwrap();
        fleet.agent_mut(AgentId(1)).active = false;

        let t = fleet.spawn_task(Cell::new(1, 1), Cell::new(3, 3));
        let agent = Dispatcher::assign_agent_to_task(&net, &mut fleet, t).unwrap();
        assert_eq!(agent, AgentId(2));
    }

    #[test]
    fn empty_pool_is_a_precondition_violation() {
        let net = open_7x7();
        let mut fleet = fleet_at(&[(1, 1)]);
        let err = Dispatcher::assign_task_to_agent(&net, &mut fleet, AgentId(0)).unwrap_err();
        assert!(matches!(err, FleetError::EmptyPool { .. }));
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    }

    #[test]
    fn dispatched_distance_is_minimal() {
        for seed in 0..20 {
            let mut rng = SimRng::new(seed);
            let net = RoadNetwork::generate(15, 40, &mut rng).unwrap();
            let fleet: FleetStore = FleetBuilder::new(12).build(&net, &mut rng).unwrap();
            let open: Vec<Cell> = net.open_cells().collect();
            let from = open[rng.gen_range(0..open.len())];

            let (chosen, d) = Dispatcher::nearest_free_agent(&net, &fleet, from).unwrap();
            assert_eq!(net.distance(from, fleet.agent(chosen).pos), Some(d));
            for a in fleet.free_agents() {
                let other = net.distance(from, a.pos).unwrap();
                assert!(d <= other, "seed {seed}: {chosen} at {d} but {} at {other}", a.id);
            }
        }
    }
}
