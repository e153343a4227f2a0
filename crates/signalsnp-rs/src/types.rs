//! Core data types for signalsnp-rs

pub type SnpId = String;

/// A SNP that passed the p-value cutoff, with its derived statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct SnpRecord {
    pub snp_id: SnpId,
    pub chrom: String,
    /// Wald test p-value as reported by GEMMA
    pub p_wald: f64,
    /// Proportion of phenotypic variance explained
    pub pve: f64,
    /// -log10(p_wald)
    pub log_p_value: f64,
}

/// Significant SNPs in the order they appear in the association file.
///
/// Identifiers are not deduplicated: if the input repeats a SNP, so does the set.
#[derive(Clone, Debug, Default)]
pub struct SignificantSet {
    records: Vec<SnpRecord>,
}

impl SignificantSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: SnpRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SnpRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[SnpRecord] {
        &self.records
    }

    /// Every record whose identifier equals `snp_id`, in insertion order.
    pub fn matching<'a>(&'a self, snp_id: &'a str) -> impl Iterator<Item = &'a SnpRecord> + 'a {
        self.records.iter().filter(move |r| r.snp_id == snp_id)
    }
}

impl FromIterator<SnpRecord> for SignificantSet {
    fn from_iter<I: IntoIterator<Item = SnpRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SignificantSet {
    type Item = &'a SnpRecord;
    type IntoIter = std::slice::Iter<'a, SnpRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// One data line of a snpEff-annotated VCF, borrowed from the line buffer.
///
/// The VCF chromosome column is not kept; report rows take the chromosome
/// from the matching SnpRecord.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationRow<'a> {
    pub pos: u64,
    pub snp_id: &'a str,
    pub ref_allele: &'a str,
    pub alt_allele: &'a str,
    pub annotation: &'a str,
}
