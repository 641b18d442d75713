//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `estimates.csv`
//! - `counters.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{CounterRow, EstimateCsvRow, OutputResult};

/// Writes metrics dumps to two CSV files.
pub struct CsvWriter {
    estimates: Writer<File>,
    counters:  Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the two CSV files and write the headers.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut estimates = Writer::from_path(dir.join("estimates.csv"))?;
        estimates.write_record(["component", "key_kind", "cell", "key", "value", "visits"])?;

        let mut counters = Writer::from_path(dir.join("counters.csv"))?;
        counters.write_record(["component", "exploration", "exploitation"])?;

        Ok(Self {
            estimates,
            counters,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_estimates(&mut self, rows: &[EstimateCsvRow]) -> OutputResult<()> {
        for row in rows {
            self.estimates.write_record(&[
                row.component.clone(),
                row.key_kind.to_owned(),
                row.cell.map(|c| c.to_string()).unwrap_or_default(),
                row.key.to_string(),
                row.value.to_string(),
                row.visits.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_counters(&mut self, row: &CounterRow) -> OutputResult<()> {
        self.counters.write_record(&[
            row.component.clone(),
            row.exploration.to_string(),
            row.exploitation.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.estimates.flush()?;
        self.counters.flush()?;
        Ok(())
    }
}
