//! signalsnp-rs: scan GEMMA association results for significant SNPs
//!
//! This crate filters a GEMMA `*.assoc.txt` file down to the SNPs whose Wald
//! p-value passes a Bonferroni-style cutoff, then joins those SNPs against a
//! snpEff-annotated VCF and writes a tab-delimited report.
//!
//! ## Module Organization
//! - `types`: Core data types (SnpRecord, SignificantSet, AnnotationRow)
//! - `error`: ScanError and the crate Result alias
//! - `logging`: EventSink, the logging seam handed to every stage
//! - `threshold`: Line counting and p-value cutoff (Bonferroni or user supplied)
//! - `assoc`: Association filter over GEMMA output
//! - `annotate`: Annotation join and report writer
//! - `report`: Summary table and number formatting
//! - `config`: Run configuration and output path derivation
//! - `pipeline`: Driver sequencing the stages above
//!
//! ## Example
//! ```ignore
//! use signalsnp_rs::{run_scan, LogSink, ScanConfig};
//!
//! let config = ScanConfig {
//!     assoc_path: "out/height.assoc.txt".into(),
//!     annotation_path: "height.snpEff.vcf".into(),
//!     sample_count: 350,
//!     threshold: 0.0, // auto: -log10(0.05 / total lines)
//!     prefix: None,
//!     output_dir: None,
//! };
//! config.validate()?;
//! let outcome = run_scan(&config, &LogSink, &mut std::io::stdout())?;
//! println!("{}", outcome.output_path.display());
//! ```

pub mod types;
pub mod error;
pub mod logging;
pub mod threshold;
pub mod assoc;
pub mod annotate;
pub mod report;
pub mod config;
pub mod pipeline;

pub use types::{AnnotationRow, SignificantSet, SnpRecord};

pub use error::{Result, ScanError};

pub use logging::{EventSink, LogSink, MemorySink};

pub use threshold::{
    compute_threshold,
    count_lines,
    Threshold,
    ThresholdSource,
    BONFERRONI_LEVEL,
};

pub use assoc::{filter_associations, is_header_line, pve};

pub use annotate::{join_annotations, REPORT_HEADER};

pub use report::{format_scientific, write_summary};

pub use config::{OutputLayout, ScanConfig, REPORT_SUFFIX};

pub use pipeline::{run_scan, ScanOutcome};
