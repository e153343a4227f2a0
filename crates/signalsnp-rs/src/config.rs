//! Run configuration and output path derivation.

use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

/// Suffix appended to the prefix to name the report.
pub const REPORT_SUFFIX: &str = ".scanning_signalsnp.txt";

/// Everything a scan needs, as collected from the command line.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// GEMMA association results (`*.assoc.txt`)
    pub assoc_path: PathBuf,
    /// snpEff-annotated VCF
    pub annotation_path: PathBuf,
    /// Number of samples in the GEMMA model
    pub sample_count: u32,
    /// -log10 p-value threshold; 0.0 selects the Bonferroni rule
    pub threshold: f64,
    /// Report prefix; defaults to the association file name minus its extension
    pub prefix: Option<String>,
    /// Report directory; defaults to the association file's directory
    pub output_dir: Option<PathBuf>,
}

/// Where the report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub prefix: String,
    pub output_dir: PathBuf,
    pub report_path: PathBuf,
}

impl OutputLayout {
    pub fn derive(assoc_path: &Path, prefix: Option<&str>, output_dir: Option<&Path>) -> Result<Self> {
        if assoc_path.extension().and_then(|e| e.to_str()) != Some("txt") {
            return Err(ScanError::InvalidInput(format!(
                "GEMMA output file must have a .txt extension (assoc.txt): {}",
                assoc_path.display()
            )));
        }

        let prefix = match prefix {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => assoc_path
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    ScanError::InvalidInput(format!(
                        "cannot derive an output prefix from {}",
                        assoc_path.display()
                    ))
                })?
                .to_string(),
        };

        let output_dir = match output_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => match assoc_path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        };

        let report_path = output_dir.join(format!("{}{}", prefix, REPORT_SUFFIX));
        Ok(OutputLayout {
            prefix,
            output_dir,
            report_path,
        })
    }
}

impl ScanConfig {
    /// Check required inputs and derive the output layout.
    pub fn validate(&self) -> Result<OutputLayout> {
        if self.sample_count == 0 {
            return Err(ScanError::InvalidInput(
                "sample number must be greater than 0".to_string(),
            ));
        }
        if !self.assoc_path.exists() {
            return Err(ScanError::InvalidInput(format!(
                "{} does not exist!",
                self.assoc_path.display()
            )));
        }
        if !self.annotation_path.exists() {
            return Err(ScanError::InvalidInput(format!(
                "{} does not exist!",
                self.annotation_path.display()
            )));
        }

        let layout = OutputLayout::derive(
            &self.assoc_path,
            self.prefix.as_deref(),
            self.output_dir.as_deref(),
        )?;
        if !layout.output_dir.is_dir() {
            return Err(ScanError::InvalidInput(format!(
                "Output path {} does not exist!",
                layout.output_dir.display()
            )));
        }
        Ok(layout)
    }
}
