//! fleet: command-line driver for the rust_mapd pickup-and-delivery simulator.
//!
//! ```text
//! fleet run   [config.json] [trips.csv]   animate one run, write CSV output
//! fleet batch [results.csv]               headless benchmark sweep
//! ```
//!
//! `run` draws one ASCII frame per snapshot, pausing `tick_duration_ms`
//! between frames, and writes snapshots and tick summaries to
//! `output/fleet/`.  With a trips file the tasks are released in file order
//! instead of being generated.
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr so
//! frames on stdout stay readable.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mapd_core::{AgentId, RunConfig, TaskId, Tick};
use mapd_fleet::FleetStore;
use mapd_grid::RoadNetwork;
use mapd_output::{CsvWriter, SimOutputObserver, render_frame, write_batch_csv};
use mapd_sim::{BatchSweep, RunSummary, ScriptedTasks, SimBuilder, SimObserver, TickStats, load_trips_csv};

const OUTPUT_DIR: &str = "output/fleet";

// ── Frame observer ────────────────────────────────────────────────────────────

/// Draws a frame per snapshot and forwards every callback to `inner`.
struct FrameObserver<O: SimObserver> {
    inner:     O,
    pause:     Duration,
    last:      TickStats,
    frames:    usize,
}

impl<O: SimObserver> FrameObserver<O> {
    fn new(inner: O, pause: Duration) -> Self {
        Self { inner, pause, last: TickStats::default(), frames: 0 }
    }
}

impl<O: SimObserver> SimObserver for FrameObserver<O> {
    fn on_tick_start(&mut self, tick: Tick) {
        self.inner.on_tick_start(tick);
    }

    fn on_agent_held(&mut self, tick: Tick, agent: AgentId) {
        self.inner.on_agent_held(tick, agent);
    }

    fn on_delivery(&mut self, tick: Tick, task: TaskId, agent: AgentId) {
        self.inner.on_delivery(tick, task, agent);
    }

    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        self.last = *stats;
        self.inner.on_tick_end(tick, stats);
    }

    fn on_snapshot(&mut self, tick: Tick, network: &RoadNetwork, fleet: &FleetStore) {
        let header = format!(
            "{tick}  delivered {}  cost {}  moved {}  held {}",
            self.last.delivered_total, self.last.cost_total, self.last.moved, self.last.held,
        );
        println!("{}", render_frame(network, fleet, &header));
        self.frames += 1;
        if !self.pause.is_zero() {
            thread::sleep(self.pause);
        }
        self.inner.on_snapshot(tick, network, fleet);
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        self.inner.on_sim_end(summary);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: RunConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn run(config_path: Option<PathBuf>, trips_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    config.validate()?;

    let mut builder = SimBuilder::new(config.clone());
    if let Some(path) = &trips_path {
        let trips = load_trips_csv(path)?;
        info!(trips = trips.len(), path = %path.display(), "loaded trips");
        builder = builder.task_source(ScriptedTasks::new(trips));
    }
    let mut sim = builder.build()?;

    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let pause = sim.clock.frame_interval();
    let mut obs = FrameObserver::new(SimOutputObserver::new(writer, &config), pause);

    let t0 = Instant::now();
    let summary = sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    println!("Variant        : {}", config.variant);
    println!("Elapsed ticks  : {}", summary.elapsed_ticks);
    println!("Total cost     : {}", summary.total_cost);
    println!("Deliveries     : {}", summary.delivered);
    println!("Holds          : {}", summary.holds);
    println!("Replans        : {}", summary.replans);
    println!("Frames drawn   : {}", obs.frames);
    println!("Wall time      : {:.3} s", elapsed.as_secs_f64());
    println!("Output         : {OUTPUT_DIR}/");
    Ok(())
}

fn batch(out: Option<PathBuf>) -> Result<()> {
    let sweep = BatchSweep::reference();
    let t0 = Instant::now();
    let results = sweep.run()?;
    let elapsed = t0.elapsed();

    let out = out.unwrap_or_else(|| PathBuf::from("batch_results.csv"));
    write_batch_csv(&out, &results)?;

    println!(
        "{:<22} {:>5} {:>6} {:>7} {:>10} {:>11} {:>10}",
        "Variant", "Grid", "Agents", "Tasks", "Ticks", "Cost", "Holds"
    );
    println!("{}", "-".repeat(77));
    for r in &results {
        let c = &r.config;
        println!(
            "{:<22} {:>5} {:>6} {:>7} {:>10.1} {:>11.1} {:>10.1}",
            c.variant.to_string(),
            c.grid_size,
            c.agent_count,
            c.required_deliveries,
            r.mean_elapsed(),
            r.mean_cost(),
            r.mean_holds(),
        );
    }
    println!();
    println!(
        "{} configurations × {} repetitions in {:.3} s → {}",
        results.len(),
        sweep.repetitions,
        elapsed.as_secs_f64(),
        out.display()
    );
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "run".to_owned());
    let rest: Vec<PathBuf> = args.map(PathBuf::from).collect();

    match command.as_str() {
        "run" => run(rest.first().cloned(), rest.get(1).cloned()),
        "batch" => batch(rest.first().cloned()),
        other => bail!("unknown command `{other}`; expected `run` or `batch`"),
    }
}
