//! CSV benchmark configuration loading.
//!
//! One row per graph. Standard header `n,k,p_in,p_out`; LFR header
//! `n,tau1,tau2,mu,avg_degree,min_comm_size`. Malformed rows are skipped
//! with a warning so one typo does not sink a whole suite.

use std::fs;
use std::path::Path;

use log::warn;

use crate::error::{Error, Result};
use crate::generate::{GraphSource, LfrConfig, SbmConfig};

/// Which generator family a configuration file describes.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratorMode {
    /// Planted-partition SBM rows: `n,k,p_in,p_out`.
    #[default]
    Standard,
    /// LFR rows: `n,tau1,tau2,mu,avg_degree,min_comm_size`.
    Lfr,
}

/// Load graph sources from a configuration CSV.
///
/// The first line is treated as a header and skipped.
pub fn load_sources(path: &Path, mode: GeneratorMode) -> Result<Vec<Box<dyn GraphSource>>> {
    let contents = fs::read_to_string(path)
        .map_err(|err| Error::Io(format!("{}: {err}", path.display())))?;

    let mut sources: Vec<Box<dyn GraphSource>> = Vec::new();
    for (index, line) in contents.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        match parse_row(line, mode) {
            Some(source) => sources.push(source),
            None => warn!(
                "skipping malformed row {} of {}: {line:?}",
                index + 1,
                path.display()
            ),
        }
    }
    Ok(sources)
}

fn parse_row(line: &str, mode: GeneratorMode) -> Option<Box<dyn GraphSource>> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    match mode {
        GeneratorMode::Standard => {
            let [n, k, p_in, p_out] = fields.as_slice() else {
                return None;
            };
            Some(Box::new(SbmConfig {
                n: n.parse().ok()?,
                k: k.parse().ok()?,
                p_in: p_in.parse().ok()?,
                p_out: p_out.parse().ok()?,
            }))
        }
        GeneratorMode::Lfr => {
            let [n, tau1, tau2, mu, avg_degree, min_comm_size] = fields.as_slice() else {
                return None;
            };
            Some(Box::new(LfrConfig {
                n: n.parse().ok()?,
                tau1: tau1.parse().ok()?,
                tau2: tau2.parse().ok()?,
                mu: mu.parse().ok()?,
                avg_degree: avg_degree.parse().ok()?,
                min_comm_size: min_comm_size.parse().ok()?,
            }))
        }
    }
}
