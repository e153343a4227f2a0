//! Association filter over GEMMA `*.assoc.txt` output
//!
//! GEMMA writes one whitespace-delimited line per SNP:
//!
//! ```text
//! chr  rs  ps  n_miss  allele1  allele0  af  beta  se  logl_H1  l_remle  p_wald
//! ```
//!
//! Only the columns named below are read; the others just hold their place.
//! A line is treated as a header whenever it contains `p_wald`, wherever it
//! appears in the file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, ScanError};
use crate::logging::EventSink;
use crate::types::{SignificantSet, SnpRecord};

const COL_CHR: usize = 0;
const COL_RS: usize = 1;
const COL_N_MISS: usize = 3;
const COL_AF: usize = 6;
const COL_BETA: usize = 7;
const COL_SE: usize = 8;
const COL_P_WALD: usize = 11;
const MIN_FIELDS: usize = COL_P_WALD + 1;

const HEADER_TOKEN: &str = "p_wald";

/// Fields consumed from one association line.
#[derive(Debug, Clone, PartialEq)]
struct AssocLine<'a> {
    chrom: &'a str,
    snp_id: &'a str,
    n_miss: i64,
    af: f64,
    beta: f64,
    se: f64,
    p_wald: f64,
}

/// Header lines are recognised by content, not position.
pub fn is_header_line(line: &str) -> bool {
    line.contains(HEADER_TOKEN)
}

/// Proportion of phenotypic variance explained by a SNP.
///
/// `n_effective` is the sample count minus the SNP's missing genotypes.
/// With af = 0 or af = 1 both numerator and denominator vanish and the
/// result is NaN; callers get that value unchanged.
pub fn pve(beta: f64, af: f64, se: f64, n_effective: f64) -> f64 {
    let het = af * (1.0 - af);
    let explained = 2.0 * beta.powi(2) * het;
    explained / (explained + se.powi(2) * 2.0 * n_effective * het)
}

fn parse_line(line: &str) -> Option<AssocLine<'_>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }
    Some(AssocLine {
        chrom: fields[COL_CHR],
        snp_id: fields[COL_RS],
        n_miss: fields[COL_N_MISS].parse().ok()?,
        af: fields[COL_AF].parse().ok()?,
        beta: fields[COL_BETA].parse().ok()?,
        se: fields[COL_SE].parse().ok()?,
        p_wald: fields[COL_P_WALD].parse().ok()?,
    })
}

/// Stream the association file and keep every SNP with `p_wald <= p_threshold`.
///
/// Blank lines are ignored. Lines that are not valid UTF-8, are too short,
/// or whose numeric columns do not parse are skipped and reported once as a
/// warning.
pub fn filter_associations<P: AsRef<Path>>(
    path: P,
    p_threshold: f64,
    sample_count: u32,
    sink: &dyn EventSink,
) -> Result<SignificantSet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    let mut reader = BufReader::new(file);

    let mut significant = SignificantSet::new();
    let mut n_malformed = 0usize;
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| ScanError::io(path, e))?;
        if n == 0 {
            break;
        }
        line_no += 1;

        let Ok(line) = std::str::from_utf8(&buf) else {
            n_malformed += 1;
            sink.debug(&format!(
                "{}:{}: association line is not valid UTF-8",
                path.display(),
                line_no
            ));
            continue;
        };
        if is_header_line(line) || line.trim().is_empty() {
            continue;
        }

        let Some(rec) = parse_line(line) else {
            n_malformed += 1;
            sink.debug(&format!("{}:{}: unparseable association line", path.display(), line_no));
            continue;
        };

        let passes = rec.p_wald <= p_threshold;
        if !passes {
            continue;
        }

        let n_effective = f64::from(sample_count) - rec.n_miss as f64;
        let pve = pve(rec.beta, rec.af, rec.se, n_effective);
        if !pve.is_finite() {
            sink.warn(&format!(
                "SNP {} has a non-finite Pve (af = {}); keeping it as {}",
                rec.snp_id, rec.af, pve
            ));
        }

        significant.push(SnpRecord {
            snp_id: rec.snp_id.to_string(),
            chrom: rec.chrom.to_string(),
            p_wald: rec.p_wald,
            pve,
            log_p_value: -rec.p_wald.log10(),
        });
    }

    if n_malformed > 0 {
        sink.warn(&format!(
            "Skipped {} malformed line(s) in {}",
            n_malformed,
            path.display()
        ));
    }

    Ok(significant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use approx::assert_relative_eq;
    use log::Level;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "chr\trs\tps\tn_miss\tallele1\tallele0\taf\tbeta\tse\tlogl_H1\tl_remle\tp_wald";

    fn write_assoc(lines: &[&str]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "{}", HEADER).unwrap();
        for l in lines {
            writeln!(f, "{}", l).unwrap();
        }
        f
    }

    #[test]
    fn test_parse_line_positions() {
        let rec = parse_line("1 rs1 1200 3 A G 0.3 0.5 0.1 -100.5 1e5 1e-06").unwrap();
        assert_eq!(rec.chrom, "1");
        assert_eq!(rec.snp_id, "rs1");
        assert_eq!(rec.n_miss, 3);
        assert_eq!(rec.af, 0.3);
        assert_eq!(rec.beta, 0.5);
        assert_eq!(rec.se, 0.1);
        assert_eq!(rec.p_wald, 1e-6);
    }

    #[test]
    fn test_parse_line_rejects_short_and_non_numeric() {
        assert!(parse_line("1 rs1 1200 3 A G 0.3 0.5 0.1 -100.5 1e5").is_none());
        assert!(parse_line("1 rs1 1200 NA A G 0.3 0.5 0.1 -100.5 1e5 1e-6").is_none());
        assert!(parse_line("1 rs1 1200 0 A G 0.3 0.5 0.1 -100.5 1e5 nope").is_none());
    }

    #[test]
    fn test_header_detection_anywhere() {
        assert!(is_header_line(HEADER));
        assert!(is_header_line("1 p_wald_dup 1 0 A G 0.3 0.5 0.1 0 0 1e-9"));
        assert!(!is_header_line("1 rs1 1 0 A G 0.3 0.5 0.1 0 0 1e-9"));
    }

    #[test]
    fn test_pve_closed_form() {
        let (beta, af, se, n) = (0.5_f64, 0.3_f64, 0.1_f64, 100.0_f64);
        let num = 2.0 * beta * beta * af * (1.0 - af);
        let expected = num / (num + se * se * 2.0 * n * af * (1.0 - af));
        assert_relative_eq!(pve(beta, af, se, n), expected, max_relative = 1e-12);
        // 0.105 / (0.105 + 0.42) = 0.2
        assert_relative_eq!(pve(beta, af, se, n), 0.2, max_relative = 1e-12);
    }

    #[test]
    fn test_pve_monomorphic_is_nan() {
        assert!(pve(0.5, 0.0, 0.1, 100.0).is_nan());
        assert!(pve(0.5, 1.0, 0.1, 100.0).is_nan());
    }

    #[test]
    fn test_filter_single_significant_record() {
        let f = write_assoc(&[
            "1\trs1\t1000\t0\tA\tG\t0.3\t0.5\t0.1\t-10.0\t1.0\t1e-06",
            "1\trs2\t2000\t0\tA\tG\t0.3\t0.5\t0.1\t-10.0\t1.0\t0.5",
        ]);
        let sink = MemorySink::new();
        let set = filter_associations(f.path(), 1e-5, 100, &sink).unwrap();

        assert_eq!(set.len(), 1);
        let rec = &set.as_slice()[0];
        assert_eq!(rec.snp_id, "rs1");
        assert_eq!(rec.chrom, "1");
        assert_relative_eq!(rec.pve, 0.2, max_relative = 1e-12);
        assert_relative_eq!(rec.log_p_value, 6.0, epsilon = 1e-12);
        assert!(sink.messages_at(Level::Warn).is_empty());
    }

    #[test]
    fn test_filter_boundary_is_inclusive() {
        let f = write_assoc(&["2\trs7\t10\t0\tC\tT\t0.2\t0.1\t0.05\t0\t0\t0.001"]);
        let set = filter_associations(f.path(), 0.001, 50, &MemorySink::new()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_filter_uses_effective_sample_size() {
        let f = write_assoc(&["1\trs1\t1000\t20\tA\tG\t0.3\t0.5\t0.1\t0\t0\t1e-06"]);
        let set = filter_associations(f.path(), 1e-5, 100, &MemorySink::new()).unwrap();
        assert_relative_eq!(
            set.as_slice()[0].pve,
            pve(0.5, 0.3, 0.1, 80.0),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_filter_skips_repeated_headers_and_malformed_lines() {
        let f = write_assoc(&[
            "1\trs1\t1000\t0\tA\tG\t0.3\t0.5\t0.1\t0\t0\t1e-08",
            HEADER,
            "1\trs2\t2000\t0\tA\tG",
            "1\trs3\t3000\tNA\tA\tG\t0.3\t0.5\t0.1\t0\t0\t1e-08",
            "",
            "3\trs4\t4000\t1\tA\tG\t0.4\t0.2\t0.1\t0\t0\t1e-09",
        ]);
        let sink = MemorySink::new();
        let set = filter_associations(f.path(), 1e-5, 100, &sink).unwrap();

        let ids: Vec<&str> = set.iter().map(|r| r.snp_id.as_str()).collect();
        assert_eq!(ids, vec!["rs1", "rs4"]);
        let warnings = sink.messages_at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Skipped 2 malformed line(s)"));
    }

    #[test]
    fn test_filter_keeps_duplicates_in_file_order() {
        let f = write_assoc(&[
            "1\trs1\t1000\t0\tA\tG\t0.3\t0.5\t0.1\t0\t0\t1e-08",
            "5\trs9\t9000\t0\tA\tG\t0.3\t0.5\t0.1\t0\t0\t1e-07",
            "1\trs1\t1000\t0\tA\tG\t0.3\t0.5\t0.1\t0\t0\t1e-08",
        ]);
        let set = filter_associations(f.path(), 1e-5, 100, &MemorySink::new()).unwrap();
        let ids: Vec<&str> = set.iter().map(|r| r.snp_id.as_str()).collect();
        assert_eq!(ids, vec!["rs1", "rs9", "rs1"]);
    }

    #[test]
    fn test_filter_keeps_monomorphic_snp_with_nan_pve() {
        let f = write_assoc(&["1\trs1\t1000\t0\tA\tG\t0\t0.5\t0.1\t0\t0\t1e-08"]);
        let sink = MemorySink::new();
        let set = filter_associations(f.path(), 1e-5, 100, &sink).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.as_slice()[0].pve.is_nan());
        assert_eq!(sink.messages_at(Level::Warn).len(), 1);
    }

    #[test]
    fn test_filter_skips_invalid_utf8_line() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "{}", HEADER).unwrap();
        writeln!(f, "1\trs1\t1000\t0\tA\tG\t0.3\t0.5\t0.1\t0\t0\t1e-09").unwrap();
        f.write_all(b"1\trs\xff2\t2000\t0\tA\tG\t0.3\t0.5\t0.1\t0\t0\t0.9\n").unwrap();
        writeln!(f, "2\trs3\t3000\t0\tA\tG\t0.3\t0.5\t0.1\t0\t0\t1e-09").unwrap();
        f.flush().unwrap();

        let sink = MemorySink::new();
        let set = filter_associations(f.path(), 1e-5, 100, &sink).unwrap();

        let ids: Vec<&str> = set.iter().map(|r| r.snp_id.as_str()).collect();
        assert_eq!(ids, vec!["rs1", "rs3"]);
        let warnings = sink.messages_at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Skipped 1 malformed line(s)"));
    }

    #[test]
    fn test_filter_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = filter_associations(dir.path().join("x.assoc.txt"), 1e-5, 10, &MemorySink::new())
            .unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }
}
