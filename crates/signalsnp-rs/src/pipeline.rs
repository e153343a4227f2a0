//! Pipeline driver: count, threshold, filter, summarise, join.

use std::io::Write;
use std::path::PathBuf;

use crate::annotate::join_annotations;
use crate::assoc::filter_associations;
use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::logging::EventSink;
use crate::report::write_summary;
use crate::threshold::{compute_threshold, count_lines, Threshold};

/// What a completed scan produced.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub output_path: PathBuf,
    pub threshold: Threshold,
    pub total_lines: usize,
    pub n_significant: usize,
    pub n_rows_written: usize,
}

/// Run a full scan.
///
/// The summary table of significant SNPs goes to `summary_out`; the report
/// is written to the path derived from `config`. When no SNP passes the
/// threshold the scan stops with [`ScanError::NoSignalFound`] and no report
/// is created.
pub fn run_scan(
    config: &ScanConfig,
    sink: &dyn EventSink,
    summary_out: &mut dyn Write,
) -> Result<ScanOutcome> {
    let layout = config.validate()?;

    sink.info(&format!("Gemma file: {}", config.assoc_path.display()));
    sink.info(&format!("SnpEff annotation file: {}", config.annotation_path.display()));
    sink.info(&format!("Prefix: {}", layout.prefix));
    sink.info(&format!("Output path: {}", layout.output_dir.display()));
    sink.info(&format!("Sample number: {}", config.sample_count));

    let total_lines = count_lines(&config.assoc_path)?;
    sink.info(&format!("Total snps: {}", total_lines));

    let threshold = compute_threshold(total_lines, config.threshold)?;
    sink.info(&format!(
        "The threshold ({}) for p-value (-log10) is: {:.6}",
        threshold.source.as_str(),
        threshold.log_threshold
    ));

    let significant = filter_associations(
        &config.assoc_path,
        threshold.p_threshold,
        config.sample_count,
        sink,
    )?;
    if significant.is_empty() {
        return Err(ScanError::NoSignalFound {
            threshold: threshold.p_threshold,
        });
    }
    sink.info(&format!("The number of signal snps found is {}", significant.len()));

    write_summary(&significant, &mut *summary_out)
        .and_then(|()| summary_out.flush())
        .map_err(|e| ScanError::io("<stdout>", e))?;

    sink.info("Getting the annotation of signal snps from SnpEff annotation file ...");
    let n_rows_written = join_annotations(
        &config.annotation_path,
        &significant,
        &layout.report_path,
        sink,
    )?;
    sink.info(&format!(
        "Wrote {} annotated row(s); the result file is {}",
        n_rows_written,
        layout.report_path.display()
    ));

    Ok(ScanOutcome {
        output_path: layout.report_path,
        threshold,
        total_lines,
        n_significant: significant.len(),
        n_rows_written,
    })
}
