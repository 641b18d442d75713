//! The `OutputWriter` trait implemented by all backend writers.

use mac_core::MetricsReport;

use crate::row::estimate_rows;
use crate::{CounterRow, EstimateCsvRow, OutputResult};

pub trait OutputWriter {
    /// Write a batch of estimate rows.
    fn write_estimates(&mut self, rows: &[EstimateCsvRow]) -> OutputResult<()>;

    /// Write one counter row.
    fn write_counters(&mut self, row: &CounterRow) -> OutputResult<()>;

    /// Write everything a component reported.
    fn write_report(&mut self, report: &MetricsReport) -> OutputResult<()> {
        self.write_counters(&CounterRow::from(report))?;
        self.write_estimates(&estimate_rows(report))
    }

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
