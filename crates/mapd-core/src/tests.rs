//! Unit tests for mapd-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, TaskId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(TaskId(0) < TaskId(1));
        assert!(AgentId(100) > AgentId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(TaskId::default(), TaskId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(TaskId(7).to_string(), "TaskId(7)");
    }
}

#[cfg(test)]
mod cell {
    use crate::{Cell, Direction};

    #[test]
    fn adjacent_follows_fixed_order() {
        let c = Cell::new(3, 3);
        assert_eq!(
            c.adjacent(),
            [Cell::new(4, 3), Cell::new(3, 4), Cell::new(2, 3), Cell::new(3, 2)]
        );
    }

    #[test]
    fn adjacent_is_not_bounds_checked() {
        let c = Cell::new(0, 0);
        assert!(c.adjacent().contains(&Cell::new(-1, 0)));
    }

    #[test]
    fn opposite_single_axis_moves_pass_through() {
        assert!(Direction::EAST.is_opposite(Direction::WEST));
        assert!(Direction::NORTH.is_opposite(Direction::SOUTH));
    }

    #[test]
    fn same_perpendicular_and_still_conflict() {
        assert!(!Direction::EAST.is_opposite(Direction::EAST));
        assert!(!Direction::EAST.is_opposite(Direction::SOUTH));
        assert!(!Direction::STILL.is_opposite(Direction::STILL));
        assert!(!Direction::EAST.is_opposite(Direction::STILL));
    }

    #[test]
    fn reverse_undoes_a_move() {
        for d in Direction::NEIGHBOR_ORDER {
            assert!(d.reverse().is_opposite(d));
            assert_eq!(Cell::new(3, 3).step(d).step(d.reverse()), Cell::new(3, 3));
        }
        assert_eq!(Direction::STILL.reverse(), Direction::STILL);
    }

    #[test]
    fn between_adjacent_and_identical() {
        let a = Cell::new(1, 1);
        assert_eq!(Direction::between(a, Cell::new(2, 1)), Some(Direction::EAST));
        assert_eq!(Direction::between(a, Cell::new(1, 0)), Some(Direction::NORTH));
        assert_eq!(Direction::between(a, a), Some(Direction::STILL));
        assert_eq!(Direction::between(a, Cell::new(2, 2)), None);
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(Cell::new(1, 1).manhattan(Cell::new(3, 4)), 5);
        assert_eq!(Cell::new(3, 4).manhattan(Cell::new(1, 1)), 5);
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn tick_displays_with_prefix() {
        assert_eq!(Tick(15).to_string(), "T15");
        assert_eq!(Tick::ZERO, Tick::default());
    }

    #[test]
    fn clock_counts_steps() {
        let mut clock = SimClock::new(250);
        assert_eq!(clock.elapsed_ticks(), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.current_tick, Tick(2));
        assert_eq!(clock.frame_interval().as_millis(), 250);
    }
}

#[cfg(test)]
mod config {
    use crate::{ErrorKind, PlannerVariant, PriorityScheme, RunConfig};

    #[test]
    fn default_is_valid() {
        RunConfig::default().validate().unwrap();
    }

    #[test]
    fn derived_tick_bound_scales_with_rounds_of_deliveries() {
        let reference = RunConfig::default();
        assert_eq!((reference.grid_size, reference.agent_count, reference.required_deliveries), (17, 20, 60));
        assert_eq!(reference.effective_max_ticks(), 4 * 40 * 17);

        let single = RunConfig { grid_size: 5, agent_count: 1, required_deliveries: 1, ..RunConfig::default() };
        assert_eq!(single.effective_max_ticks(), 400);

        let small = RunConfig { grid_size: 9, agent_count: 4, required_deliveries: 8, ..RunConfig::default() };
        assert_eq!(small.effective_max_ticks(), 1080);

        let fixed = RunConfig { max_ticks: Some(12), ..RunConfig::default() };
        assert_eq!(fixed.effective_max_ticks(), 12);
    }

    #[test]
    fn lattice_cell_counts() {
        let cfg = RunConfig { grid_size: 5, ..RunConfig::default() };
        // Intersections (1,1) (3,1) (1,3) (3,3); lanes (2,1) (2,3) (1,2) (3,2).
        assert_eq!(cfg.lane_cell_count(), 4);
        assert_eq!(cfg.road_cell_count(), 8);
    }

    #[test]
    fn even_or_small_grid_rejected() {
        for size in [3, 4, 6, 18] {
            let cfg = RunConfig { grid_size: size, ..RunConfig::default() };
            let err = cfg.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "size {size}");
        }
    }

    #[test]
    fn too_many_obstacles_rejected() {
        let cfg = RunConfig {
            grid_size: 5,
            obstacle_count: 5,
            agent_count: 1,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn too_many_agents_rejected() {
        let cfg = RunConfig {
            grid_size: 5,
            obstacle_count: 0,
            agent_count: 9,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn priority_follows_variant_unless_overridden() {
        let mut cfg = RunConfig { variant: PlannerVariant::Naive, ..RunConfig::default() };
        assert_eq!(cfg.priority(), PriorityScheme::ByTaskId);
        cfg.variant = PlannerVariant::WaitBackoffByAgent;
        assert_eq!(cfg.priority(), PriorityScheme::ByAgentId);
        cfg.priority = Some(PriorityScheme::ByTaskId);
        assert_eq!(cfg.priority(), PriorityScheme::ByTaskId);
    }
}

#[cfg(test)]
mod rng {
    use crate::{SimRng, mix_seed};

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1000u32), b.gen_range(0..1000u32));
        }
    }

    #[test]
    fn mixed_seeds_differ_per_stream() {
        assert_ne!(mix_seed(1, 0), mix_seed(1, 1));
        assert_eq!(mix_seed(1, 0), 1);
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = SimRng::new(0);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}
