//! Join significant SNPs against a snpEff-annotated VCF.
//!
//! The VCF is streamed line by line; every data line whose ID matches one or
//! more significant SNPs produces one report row per match. The report is
//! written to a temporary file beside the destination and only moved into
//! place once every row has been written.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, ScanError};
use crate::logging::EventSink;
use crate::report::{format_fixed, format_scientific};
use crate::types::{AnnotationRow, SignificantSet};

const COL_POS: usize = 1;
const COL_ID: usize = 2;
const COL_REF: usize = 3;
const COL_ALT: usize = 4;
const COL_INFO: usize = 7;
const MIN_FIELDS: usize = COL_INFO + 1;

const META_MARKER: &str = "##";

/// Report header, written once before any data rows.
pub const REPORT_HEADER: [&str; 9] = [
    "Chr", "Pos", "ID", "Ref", "Alt", "Pve", "P_wald", "-log(10)", "Ann",
];

fn parse_line(line: &str) -> Option<AnnotationRow<'_>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }
    Some(AnnotationRow {
        pos: fields[COL_POS].parse().ok()?,
        snp_id: fields[COL_ID],
        ref_allele: fields[COL_REF],
        alt_allele: fields[COL_ALT],
        annotation: fields[COL_INFO],
    })
}

/// Write the annotated report for `significant` to `output_path`.
///
/// Returns the number of data rows written.
pub fn join_annotations<P: AsRef<Path>, Q: AsRef<Path>>(
    annotation_path: P,
    significant: &SignificantSet,
    output_path: Q,
    sink: &dyn EventSink,
) -> Result<usize> {
    let annotation_path = annotation_path.as_ref();
    let output_path = output_path.as_ref();

    let file = File::open(annotation_path).map_err(|e| ScanError::io(annotation_path, e))?;
    let mut reader = BufReader::new(file);

    let out_dir = match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".signalsnp")
        .suffix(".tmp")
        .tempfile_in(out_dir)
        .map_err(|e| ScanError::io(out_dir, e))?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .has_headers(false)
        .from_writer(tmp);

    let write_err = |e: csv::Error| ScanError::io(output_path, e.into());

    writer.write_record(REPORT_HEADER).map_err(write_err)?;

    let mut n_rows = 0usize;
    let mut n_skipped = 0usize;

    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| ScanError::io(annotation_path, e))?;
        if n == 0 {
            break;
        }
        // Stray bytes in a free-text INFO payload must not drop the row.
        let line = String::from_utf8_lossy(&buf);
        if line.contains(META_MARKER) {
            continue;
        }
        let Some(row) = parse_line(&line) else {
            n_skipped += 1;
            continue;
        };

        let pos = row.pos.to_string();
        for rec in significant.matching(row.snp_id) {
            let pve = format_fixed(rec.pve, 6);
            let p_wald = format_scientific(rec.p_wald, 6);
            let log_p = format_fixed(rec.log_p_value, 6);
            writer
                .write_record([
                    rec.chrom.as_str(),
                    pos.as_str(),
                    row.snp_id,
                    row.ref_allele,
                    row.alt_allele,
                    pve.as_str(),
                    p_wald.as_str(),
                    log_p.as_str(),
                    row.annotation,
                ])
                .map_err(write_err)?;
            n_rows += 1;
        }
    }

    if n_skipped > 0 {
        sink.debug(&format!(
            "Ignored {} non-data line(s) in {}",
            n_skipped,
            annotation_path.display()
        ));
    }

    writer.flush().map_err(|e| ScanError::io(output_path, e))?;
    let tmp = writer
        .into_inner()
        .map_err(|e| ScanError::io(output_path, io::Error::new(e.error().kind(), e.to_string())))?;
    tmp.persist(output_path)
        .map_err(|e| ScanError::io(output_path, e.error))?;

    Ok(n_rows)
}
