//! Summary table and number formatting shared by the stdout summary and the
//! annotation report.

use std::io::{self, Write};

use crate::types::SignificantSet;

const SUMMARY_RULE: &str = " -------------  ------------  ------------  ---------";

/// printf-style `%.*e`: mantissa with `precision` fractional digits and a
/// signed exponent of at least two digits (`1.000000e-06`).
pub fn format_scientific(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }
    let raw = format!("{:.*e}", precision, value);
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => raw,
    }
}

/// printf-style `%.*f`, spelling NaN and infinities in lower case.
pub fn format_fixed(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }
    format!("{:.*}", precision, value)
}

fn non_finite(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}

/// Write the human-readable table of significant SNPs.
pub fn write_summary<W: Write + ?Sized>(set: &SignificantSet, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", SUMMARY_RULE)?;
    writeln!(out, " {:<15}{:<14}{:<14}{}", "SNP", "P-value", "Pve", "-Log")?;
    writeln!(out, "{}", SUMMARY_RULE)?;
    for rec in set {
        writeln!(
            out,
            " {} | {} | {} | {}",
            rec.snp_id,
            format_scientific(rec.p_wald, 6),
            format_fixed(rec.pve, 6),
            format_fixed(rec.log_p_value, 6)
        )?;
    }
    writeln!(out, "{}", SUMMARY_RULE)?;
    Ok(())
}
