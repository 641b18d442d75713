//! `mac-output` — end-of-run metrics writers for the mac decision engine.
//!
//! | Backend     | Files created                       |
//! |-------------|-------------------------------------|
//! | CSV         | `estimates.csv`, `counters.csv`     |
//!
//! Writers implement [`OutputWriter`] and consume the
//! [`MetricsReport`](mac_core::MetricsReport) of any component.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mac_output::{CsvWriter, OutputWriter};
//!
//! let mut writer = CsvWriter::new(Path::new("./output"))?;
//! writer.write_report(&bandit.report_metrics())?;
//! writer.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use row::{estimate_rows, CounterRow, EstimateCsvRow};
pub use writer::OutputWriter;
