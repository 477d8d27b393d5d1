//! `mapd-output`: simulation output for the rust_mapd fleet simulator.
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`csv`]       | `CsvWriter` (`agent_snapshots.csv`, `task_snapshots.csv`,|
//! |               | `tick_summaries.csv`) and `write_batch_csv`             |
//! | [`observer`]  | `SimOutputObserver`, row builders                       |
//! | [`ascii`]     | `render_ascii`: two-character-per-cell grid frames      |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `mapd_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mapd_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &sim.config);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod ascii;
pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use ascii::{render_ascii, render_frame};
pub use csv::{CsvWriter, write_batch_csv};
pub use error::{OutputError, OutputResult};
pub use observer::{SimOutputObserver, agent_rows, task_rows};
pub use row::{AgentSnapshotRow, TaskSnapshotRow, TickSummaryRow};
pub use writer::OutputWriter;
