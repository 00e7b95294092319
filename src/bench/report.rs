//! CSV result sink.
//!
//! Suites run for minutes; rows are written and flushed one at a time so
//! partial results survive an interrupted run and progress is visible
//! with `tail -f`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};

use super::{Algorithm, ExecutionMode};

/// One benchmark run's metrics.
#[derive(Debug, Clone)]
pub struct BenchmarkRecord {
    /// Index of the graph configuration.
    pub graph_id: usize,
    /// Vertices in the generated graph.
    pub num_vertices: usize,
    /// Edges in the generated graph.
    pub num_edges: usize,
    /// Requested cluster count K*.
    pub target_clusters: usize,
    /// Strategy under test.
    pub algorithm: Algorithm,
    /// Thread configuration.
    pub execution_mode: ExecutionMode,
    /// Repetition index for this configuration.
    pub run_number: usize,
    /// Wall-clock partitioning time in seconds.
    pub runtime_sec: f64,
    /// Portion of the runtime spent in MCMC refinement.
    pub mcmc_runtime_sec: f64,
    /// Peak resident set size in MiB (0 where unsupported).
    pub memory_mb: u64,
    /// Agreement with the planted labels.
    pub nmi: f64,
    /// Final description length.
    pub mdl_raw: f64,
    /// Description length relative to the one-cluster model.
    pub mdl_norm: f64,
    /// Clusters in the returned partition.
    pub clusters_found: usize,
}

impl BenchmarkRecord {
    /// Column names, in row order.
    pub const CSV_HEADER: &'static str = "graph_id,num_vertices,num_edges,target_clusters,\
        algorithm,execution_mode,run_number,runtime_sec,mcmc_runtime_sec,memory_mb,nmi,\
        mdl_raw,mdl_norm,clusters_found";

    /// Render as one CSV row (no trailing newline).
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{:.6},{:.6},{},{:.6},{:.2},{:.6},{}",
            self.graph_id,
            self.num_vertices,
            self.num_edges,
            self.target_clusters,
            self.algorithm.label(),
            self.execution_mode.label(),
            self.run_number,
            self.runtime_sec,
            self.mcmc_runtime_sec,
            self.memory_mb,
            self.nmi,
            self.mdl_raw,
            self.mdl_norm,
            self.clusters_found,
        )
    }
}

/// Row-by-row CSV writer with eager flushing.
#[derive(Debug)]
pub struct ResultWriter {
    writer: BufWriter<File>,
}

impl ResultWriter {
    /// Create the result file (and its parent directory) and write the
    /// header.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| Error::Io(format!("{}: {err}", parent.display())))?;
        }
        let file = File::create(path)
            .map_err(|err| Error::Io(format!("{}: {err}", path.display())))?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", BenchmarkRecord::CSV_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// Append one record and flush it to disk.
    pub fn append(&mut self, record: &BenchmarkRecord) -> Result<()> {
        writeln!(self.writer, "{}", record.to_csv_row())?;
        self.writer.flush()?;
        Ok(())
    }
}
