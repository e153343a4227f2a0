//! P-value cutoff for signal SNP scanning
//!
//! Two ways to arrive at the cutoff:
//! - Bonferroni: -log10(0.05 / n), where n is the number of lines in the
//!   association file (header included)
//! - User: a -log10 threshold supplied on the command line
//!
//! Either way the p-value cutoff is 10^(-threshold).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, ScanError};

/// Genome-wide significance level for the Bonferroni correction.
pub const BONFERRONI_LEVEL: f64 = 0.05;

/// Where a threshold came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdSource {
    Bonferroni,
    User,
}

impl ThresholdSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdSource::Bonferroni => "Bonferroni (0.05 / total snps)",
            ThresholdSource::User => "user supplied",
        }
    }
}

/// Result of threshold calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// Cutoff on the -log10 scale
    pub log_threshold: f64,
    /// Cutoff on the p-value scale; a SNP is significant when p_wald <= p_threshold
    pub p_threshold: f64,
    pub source: ThresholdSource,
}

/// Compute the p-value cutoff.
///
/// `user_threshold == 0.0` means "unset" and selects the Bonferroni rule over
/// `total_records`. Any other value is taken as a -log10 threshold.
pub fn compute_threshold(total_records: usize, user_threshold: f64) -> Result<Threshold> {
    let (log_threshold, source) = if user_threshold == 0.0 {
        if total_records == 0 {
            return Err(ScanError::InvalidInput(
                "association file is empty; cannot derive a Bonferroni threshold".to_string(),
            ));
        }
        (
            -(BONFERRONI_LEVEL / total_records as f64).log10(),
            ThresholdSource::Bonferroni,
        )
    } else {
        if !user_threshold.is_finite() || user_threshold < 0.0 {
            return Err(ScanError::InvalidInput(format!(
                "threshold must be a positive -log10 value, got {}",
                user_threshold
            )));
        }
        (user_threshold, ThresholdSource::User)
    };

    Ok(Threshold {
        log_threshold,
        p_threshold: 10f64.powf(-log_threshold),
        source,
    })
}

/// Count the lines of a file the way a line reader sees them: a final line
/// without a trailing newline still counts.
pub fn count_lines<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut n = 0usize;
    for chunk in reader.split(b'\n') {
        chunk.map_err(|e| ScanError::io(path, e))?;
        n += 1;
    }
    Ok(n)
}
