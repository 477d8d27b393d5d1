//! CSV output backend.
//!
//! [`CsvWriter`] creates three files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `task_snapshots.csv`
//! - `tick_summaries.csv`
//!
//! Optional fields (next waypoint, serving agent) are written empty when
//! absent.  [`write_batch_csv`] writes one row per finished batch run.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use mapd_sim::BatchResult;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TaskSnapshotRow, TickSummaryRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    agents:    Writer<File>,
    tasks:     Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut agents = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        agents.write_record(["tick", "agent_id", "x", "y", "next_x", "next_y", "task_id", "phase"])?;

        let mut tasks = Writer::from_path(dir.join("task_snapshots.csv"))?;
        tasks.write_record([
            "tick", "task_id", "origin_x", "origin_y", "dest_x", "dest_y", "status", "agent_id",
        ])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["tick", "elapsed_ms", "moved", "held", "delivered", "cost"])?;

        Ok(Self {
            agents,
            tasks,
            summaries,
            finished: false,
        })
    }
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_agent_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.agents.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.pos.x.to_string(),
                row.pos.y.to_string(),
                opt(row.next.map(|c| c.x)),
                opt(row.next.map(|c| c.y)),
                opt(row.task_id),
                row.phase.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_task_snapshots(&mut self, rows: &[TaskSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.tasks.write_record(&[
                row.tick.to_string(),
                row.task_id.to_string(),
                row.origin.x.to_string(),
                row.origin.y.to_string(),
                row.destination.x.to_string(),
                row.destination.y.to_string(),
                row.status.to_string(),
                opt(row.agent_id),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_ms.to_string(),
            row.moved.to_string(),
            row.held.to_string(),
            row.delivered_total.to_string(),
            row.cost_total.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.agents.flush()?;
        self.tasks.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}

// ── Batch results ─────────────────────────────────────────────────────────────

/// Write one row per run of every batch result to `path`.
pub fn write_batch_csv(path: &Path, results: &[BatchResult]) -> OutputResult<()> {
    let mut w = Writer::from_path(path)?;
    w.write_record([
        "variant",
        "grid_size",
        "obstacle_count",
        "agent_count",
        "required_deliveries",
        "run",
        "elapsed_ticks",
        "total_cost",
        "holds",
        "replans",
    ])?;
    for result in results {
        let c = &result.config;
        for (i, run) in result.runs.iter().enumerate() {
            w.write_record(&[
                c.variant.to_string(),
                c.grid_size.to_string(),
                c.obstacle_count.to_string(),
                c.agent_count.to_string(),
                c.required_deliveries.to_string(),
                i.to_string(),
                run.elapsed_ticks.to_string(),
                run.total_cost.to_string(),
                run.holds.to_string(),
                run.replans.to_string(),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}
