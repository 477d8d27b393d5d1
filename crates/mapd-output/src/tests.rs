//! Integration tests for mapd-output.

use tempfile::TempDir;

use mapd_core::{Cell, PlannerVariant, RunConfig};
use mapd_grid::{RoadNetwork, RoadNetworkBuilder};
use mapd_sim::{ScriptedTasks, Sim, SimBuilder, Trip};

fn tmp() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

fn open_net(size: i32) -> RoadNetwork {
    RoadNetworkBuilder::new(size).build().unwrap()
}

fn read_rows(path: &std::path::Path) -> Vec<csv::StringRecord> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records().map(|r| r.unwrap()).collect()
}

fn read_headers(path: &std::path::Path) -> Vec<String> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.headers().unwrap().iter().map(str::to_owned).collect()
}

/// One agent on (1, 1) delivering (3, 1) → (1, 3) on an open 5×5 grid.
fn five_by_five() -> (RunConfig, Sim) {
    let config = RunConfig {
        grid_size:           5,
        obstacle_count:      0,
        agent_count:         1,
        required_deliveries: 1,
        variant:             PlannerVariant::Naive,
        ..RunConfig::default()
    };
    let sim = SimBuilder::new(config.clone())
        .network(open_net(5))
        .positions(vec![Cell::new(1, 1)])
        .task_source(ScriptedTasks::new([Trip::new(Cell::new(3, 1), Cell::new(1, 3))]))
        .build()
        .unwrap();
    (config, sim)
}

// ── CSV writer ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use super::*;
    use crate::row::{AgentSnapshotRow, TaskSnapshotRow, TickSummaryRow};
    use crate::writer::OutputWriter;
    use crate::CsvWriter;

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("agent_snapshots.csv").exists());
        assert!(dir.path().join("task_snapshots.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            read_headers(&dir.path().join("agent_snapshots.csv")),
            ["tick", "agent_id", "x", "y", "next_x", "next_y", "task_id", "phase"]
        );
        assert_eq!(
            read_headers(&dir.path().join("task_snapshots.csv")),
            ["tick", "task_id", "origin_x", "origin_y", "dest_x", "dest_y", "status", "agent_id"]
        );
        assert_eq!(
            read_headers(&dir.path().join("tick_summaries.csv")),
            ["tick", "elapsed_ms", "moved", "held", "delivered", "cost"]
        );
    }

    #[test]
    fn absent_fields_are_written_empty() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_agent_snapshots(&[
            AgentSnapshotRow {
                tick:     3,
                agent_id: 0,
                pos:      Cell::new(1, 1),
                next:     None,
                task_id:  None,
                phase:    "idle",
            },
            AgentSnapshotRow {
                tick:     3,
                agent_id: 1,
                pos:      Cell::new(3, 1),
                next:     Some(Cell::new(3, 2)),
                task_id:  Some(4),
                phase:    "en-route-dropoff",
            },
        ])
        .unwrap();
        w.finish().unwrap();

        let rows = read_rows(&dir.path().join("agent_snapshots.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].iter().collect::<Vec<_>>(), ["3", "0", "1", "1", "", "", "", "idle"]);
        assert_eq!(
            rows[1].iter().collect::<Vec<_>>(),
            ["3", "1", "3", "1", "3", "2", "4", "en-route-dropoff"]
        );
    }

    #[test]
    fn task_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_task_snapshots(&[TaskSnapshotRow {
            tick:        2,
            task_id:     7,
            origin:      Cell::new(3, 1),
            destination: Cell::new(1, 3),
            status:      "pending",
            agent_id:    None,
        }])
        .unwrap();
        w.finish().unwrap();

        let rows = read_rows(&dir.path().join("task_snapshots.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].iter().collect::<Vec<_>>(), ["2", "7", "3", "1", "1", "3", "pending", ""]);
    }

    #[test]
    fn tick_summary_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick:            5,
            elapsed_ms:      500,
            moved:           3,
            held:            1,
            delivered_total: 2,
            cost_total:      17,
        })
        .unwrap();
        w.finish().unwrap();

        let rows = read_rows(&dir.path().join("tick_summaries.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].iter().collect::<Vec<_>>(), ["5", "500", "3", "1", "2", "17"]);
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_snapshot_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_agent_snapshots(&[]).unwrap();
        w.write_task_snapshots(&[]).unwrap();
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tmp();
        let result = CsvWriter::new(&dir.path().join("no").join("such").join("dir"));
        assert!(result.is_err());
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use mapd_core::Tick;
    use mapd_fleet::FleetStore;

    use super::*;
    use crate::{CsvWriter, SimOutputObserver, agent_rows, task_rows};

    #[test]
    fn run_writes_one_summary_per_tick() {
        let (config, mut sim) = five_by_five();
        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer, &config);
        let summary = sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(summary.elapsed_ticks, 6);

        let summaries = read_rows(&dir.path().join("tick_summaries.csv"));
        assert_eq!(summaries.len(), 6);
        assert_eq!(&summaries[0][0], "1");
        assert_eq!(&summaries[0][1], "100");
        let last = &summaries[5];
        assert_eq!(&last[0], "6");
        assert_eq!(&last[4], "1"); // delivered
        assert_eq!(&last[5], "6"); // cost
    }

    #[test]
    fn run_writes_agent_snapshot_every_tick() {
        let (config, mut sim) = five_by_five();
        let dir = tmp();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap(), &config);
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());

        let agents = read_rows(&dir.path().join("agent_snapshots.csv"));
        assert_eq!(agents.len(), 6);
        assert_eq!(agents[0].iter().take(4).collect::<Vec<_>>(), ["1", "0", "2", "1"]);
        // Retired at the drop-off with nothing left to carry.
        assert_eq!(agents[5].iter().collect::<Vec<_>>(), ["6", "0", "1", "3", "", "", "", "done"]);
    }

    #[test]
    fn task_snapshots_stop_after_delivery() {
        let (config, mut sim) = five_by_five();
        let dir = tmp();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap(), &config);
        sim.run(&mut obs).unwrap();

        let tasks = read_rows(&dir.path().join("task_snapshots.csv"));
        assert!(!tasks.is_empty());
        assert!(tasks.iter().all(|r| &r[1] == "0" && &r[7] == "0"));
        assert!(tasks.iter().all(|r| &r[0] != "6"));
    }

    #[test]
    fn row_builders_follow_fleet_state() {
        let mut fleet = FleetStore::new([Cell::new(1, 1), Cell::new(3, 3)]);
        let task = fleet.spawn_task(Cell::new(3, 1), Cell::new(1, 3));
        fleet.assign(mapd_core::AgentId(1), task).unwrap();

        let agents = agent_rows(Tick(4), &fleet);
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].phase, "idle");
        assert_eq!(agents[0].task_id, None);
        assert_eq!(agents[1].phase, "en-route-pickup");
        assert_eq!(agents[1].task_id, Some(0));
        assert_eq!(agents[1].next, None);

        let tasks = task_rows(Tick(4), &fleet);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, "en-route-to-pickup");
        assert_eq!(tasks[0].agent_id, Some(1));
        assert_eq!(tasks[0].tick, 4);
    }
}

// ── Batch export ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod batch_tests {
    use mapd_sim::{BatchResult, RunSummary};

    use super::*;
    use crate::write_batch_csv;

    fn summary(elapsed_ticks: u64) -> RunSummary {
        RunSummary {
            elapsed_ticks,
            total_cost: elapsed_ticks * 2,
            delivered:  4,
            holds:      1,
            replans:    9,
        }
    }

    #[test]
    fn one_row_per_run() {
        let config = RunConfig {
            grid_size:           9,
            obstacle_count:      6,
            agent_count:         3,
            required_deliveries: 4,
            variant:             PlannerVariant::WaitBackoffByAgent,
            ..RunConfig::default()
        };
        let results = vec![BatchResult { config, runs: vec![summary(30), summary(41)] }];

        let dir = tmp();
        let path = dir.path().join("batch.csv");
        write_batch_csv(&path, &results).unwrap();

        assert_eq!(read_headers(&path).len(), 10);
        let rows = read_rows(&path);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].iter().collect::<Vec<_>>(),
            ["wait-backoff-by-agent", "9", "6", "3", "4", "0", "30", "60", "1", "9"]
        );
        assert_eq!(&rows[1][5], "1");
        assert_eq!(&rows[1][6], "41");
    }

    #[test]
    fn empty_batch_writes_header_only() {
        let dir = tmp();
        let path = dir.path().join("batch.csv");
        write_batch_csv(&path, &[]).unwrap();
        assert_eq!(read_headers(&path)[0], "variant");
        assert!(read_rows(&path).is_empty());
    }
}

// ── ASCII frames ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod ascii_tests {
    use mapd_core::AgentId;
    use mapd_fleet::FleetStore;

    use super::*;
    use crate::{render_ascii, render_frame};

    #[test]
    fn empty_grid_shows_lattice() {
        let net = open_net(5);
        let fleet = FleetStore::new(Vec::<Cell>::new());
        let frame = render_ascii(&net, &fleet);
        let rows: Vec<&str> = frame.lines().collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], "[][][][][]");
        assert_eq!(rows[1], "[]      []");
        assert_eq!(rows[2], "[]  []  []");
        assert!(frame.ends_with('\n'));
    }

    #[test]
    fn agents_and_task_points_are_marked() {
        let net = open_net(5);
        let mut fleet = FleetStore::new([Cell::new(1, 1)]);
        fleet.spawn_task(Cell::new(3, 1), Cell::new(1, 3));

        let rows: Vec<String> = render_ascii(&net, &fleet).lines().map(str::to_owned).collect();
        assert_eq!(rows[1], "[]--  P.[]");
        assert_eq!(rows[3], "[]D.    []");
    }

    #[test]
    fn shared_point_and_picked_up_task() {
        let net = open_net(5);
        let mut fleet = FleetStore::new([Cell::new(1, 1)]);
        let a = fleet.spawn_task(Cell::new(3, 3), Cell::new(3, 1));
        fleet.spawn_task(Cell::new(3, 1), Cell::new(1, 3));
        fleet.assign(AgentId(0), a).unwrap();
        fleet.complete_pickup(AgentId(0)).unwrap();

        let rows: Vec<String> = render_ascii(&net, &fleet).lines().map(str::to_owned).collect();
        assert_eq!(rows[1], "[]--  X.[]");
        // Task 0 is in transit, so its origin is no longer a pickup.
        assert_eq!(rows[3], "[]D.    []");
    }

    #[test]
    fn retired_agents_are_not_drawn() {
        let net = open_net(5);
        let mut fleet = FleetStore::new([Cell::new(1, 1)]);
        fleet.agent_mut(AgentId(0)).active = false;
        let frame = render_frame(&net, &fleet, "tick 3");
        let rows: Vec<&str> = frame.lines().collect();
        assert_eq!(rows[0], "tick 3");
        assert_eq!(rows[2], "[]      []");
    }
}
