//! Weak label matrices: the collected votes of all rules over all records.
//!
//! [`WeakLabelMatrix`] holds single-label votes of shape
//! `[n_records × n_rules]`, [`WeakMultiLabelMatrix`] holds multi-label votes
//! of shape `[n_records × n_rules × k]`. Both carry an aligned annotation
//! vector (ground truth, possibly absent) and aligned [`Record`] handles,
//! and are consumed read-only by the label models.

use crate::error::{EtiquetarError, Result};
use crate::label::{LabelVocabulary, RuleVote, ABSTAIN};
use crate::record::Record;

/// Single-label weak label matrix.
///
/// Votes are stored row-major as `i32` codes with [`ABSTAIN`] for
/// abstentions. Annotations use the same encoding, `ABSTAIN` meaning
/// "unannotated".
///
/// # Examples
///
/// ```
/// use etiquetar::label::{LabelVocabulary, RuleVote};
/// use etiquetar::record::Record;
/// use etiquetar::weak_labels::WeakLabelMatrix;
///
/// let vocab = LabelVocabulary::new(["yes", "no"]).unwrap();
/// let votes = vec![
///     vec![RuleVote::Label(0), RuleVote::Abstain],
///     vec![RuleVote::Label(1), RuleVote::Label(1)],
/// ];
/// let records = vec![Record::new("a"), Record::new("b")];
/// let wl = WeakLabelMatrix::new(vocab, &votes, vec![None, Some(1)], records).unwrap();
///
/// assert_eq!(wl.n_records(), 2);
/// assert_eq!(wl.n_rules(), 2);
/// assert_eq!(wl.row_indices(Some(true)), vec![1]);
/// ```
#[derive(Clone, Debug)]
pub struct WeakLabelMatrix {
    vocabulary: LabelVocabulary,
    votes: Vec<i32>,
    n_records: usize,
    n_rules: usize,
    annotations: Vec<i32>,
    records: Vec<Record>,
}

impl WeakLabelMatrix {
    /// Builds a matrix from per-record vote rows.
    ///
    /// All rows must have the same number of rules, and `votes`,
    /// `annotations` and `records` must be aligned.
    ///
    /// # Errors
    ///
    /// Returns [`EtiquetarError::DimensionMismatch`] on misaligned or ragged
    /// inputs, and [`EtiquetarError::InvalidLabelCode`] if a vote or
    /// annotation code falls outside the vocabulary.
    pub fn new(
        vocabulary: LabelVocabulary,
        votes: &[Vec<RuleVote>],
        annotations: Vec<Option<usize>>,
        records: Vec<Record>,
    ) -> Result<Self> {
        let n_records = votes.len();
        check_alignment(n_records, annotations.len(), records.len())?;

        let k = vocabulary.len();
        let n_rules = votes.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(n_records * n_rules);
        for row in votes {
            if row.len() != n_rules {
                return Err(EtiquetarError::DimensionMismatch {
                    expected: format!("{n_rules} rules per record"),
                    actual: format!("{} rules", row.len()),
                });
            }
            for &vote in row {
                if let RuleVote::Label(code) = vote {
                    if code >= k {
                        return Err(EtiquetarError::InvalidLabelCode {
                            code: code as i32,
                            cardinality: k,
                        });
                    }
                }
                flat.push(vote.to_i32());
            }
        }

        let mut annotation_codes = Vec::with_capacity(n_records);
        for annotation in annotations {
            match annotation {
                Some(code) if code >= k => {
                    return Err(EtiquetarError::InvalidLabelCode {
                        code: code as i32,
                        cardinality: k,
                    });
                }
                Some(code) => annotation_codes.push(code as i32),
                None => annotation_codes.push(ABSTAIN),
            }
        }

        Ok(Self {
            vocabulary,
            votes: flat,
            n_records,
            n_rules,
            annotations: annotation_codes,
            records,
        })
    }

    /// The label vocabulary the votes are coded against.
    #[must_use]
    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    /// Number of records (rows).
    #[must_use]
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// Number of rules (columns).
    #[must_use]
    pub fn n_rules(&self) -> usize {
        self.n_rules
    }

    /// The vote row for a record, as sentinel-encoded codes.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn row(&self, row: usize) -> &[i32] {
        &self.votes[row * self.n_rules..(row + 1) * self.n_rules]
    }

    /// The annotation codes aligned to rows (`ABSTAIN` = unannotated).
    #[must_use]
    pub fn annotations(&self) -> &[i32] {
        &self.annotations
    }

    /// The record handle aligned to a row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn record(&self, row: usize) -> &Record {
        &self.records[row]
    }

    /// Row indices filtered by annotation status.
    ///
    /// `None` selects every row, `Some(true)` only annotated rows,
    /// `Some(false)` only unannotated rows.
    #[must_use]
    pub fn row_indices(&self, has_annotation: Option<bool>) -> Vec<usize> {
        (0..self.n_records)
            .filter(|&i| match has_annotation {
                None => true,
                Some(annotated) => (self.annotations[i] != ABSTAIN) == annotated,
            })
            .collect()
    }

    /// Per-rule coverage: the fraction of records the rule voted on.
    #[must_use]
    pub fn coverage(&self) -> Vec<f64> {
        let mut covered = vec![0usize; self.n_rules];
        for row in 0..self.n_records {
            for (rule, &vote) in self.row(row).iter().enumerate() {
                if vote != ABSTAIN {
                    covered[rule] += 1;
                }
            }
        }
        covered
            .into_iter()
            .map(|c| {
                if self.n_records == 0 {
                    0.0
                } else {
                    c as f64 / self.n_records as f64
                }
            })
            .collect()
    }
}

/// Multi-label weak label matrix.
///
/// Votes are stored row-major as `i8` in `{-1, 0, 1}`: per record, rule and
/// label, `1` is a vote for the label, `0` a vote against it, and `-1` in
/// every label slot of a rule means that rule abstained entirely on the
/// record. Annotations are binary vectors of length `k`.
#[derive(Clone, Debug)]
pub struct WeakMultiLabelMatrix {
    vocabulary: LabelVocabulary,
    votes: Vec<i8>,
    n_records: usize,
    n_rules: usize,
    annotations: Vec<Option<Vec<u8>>>,
    records: Vec<Record>,
}

impl WeakMultiLabelMatrix {
    /// Builds a matrix from per-record, per-rule label vote vectors.
    ///
    /// # Errors
    ///
    /// Returns [`EtiquetarError::DimensionMismatch`] on misaligned or ragged
    /// inputs, [`EtiquetarError::InvalidVoteValue`] for vote entries outside
    /// `{-1, 0, 1}` or annotation entries outside `{0, 1}`.
    pub fn new(
        vocabulary: LabelVocabulary,
        votes: &[Vec<Vec<i8>>],
        annotations: Vec<Option<Vec<u8>>>,
        records: Vec<Record>,
    ) -> Result<Self> {
        let n_records = votes.len();
        check_alignment(n_records, annotations.len(), records.len())?;

        let k = vocabulary.len();
        let n_rules = votes.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(n_records * n_rules * k);
        for row in votes {
            if row.len() != n_rules {
                return Err(EtiquetarError::DimensionMismatch {
                    expected: format!("{n_rules} rules per record"),
                    actual: format!("{} rules", row.len()),
                });
            }
            for rule_votes in row {
                if rule_votes.len() != k {
                    return Err(EtiquetarError::DimensionMismatch {
                        expected: format!("{k} label slots per rule"),
                        actual: format!("{} label slots", rule_votes.len()),
                    });
                }
                for &value in rule_votes {
                    if !(-1..=1).contains(&value) {
                        return Err(EtiquetarError::InvalidVoteValue {
                            value: i32::from(value),
                        });
                    }
                    flat.push(value);
                }
            }
        }

        for annotation in annotations.iter().flatten() {
            if annotation.len() != k {
                return Err(EtiquetarError::DimensionMismatch {
                    expected: format!("{k} annotation slots"),
                    actual: format!("{} annotation slots", annotation.len()),
                });
            }
            for &value in annotation {
                if value > 1 {
                    return Err(EtiquetarError::InvalidVoteValue {
                        value: i32::from(value),
                    });
                }
            }
        }

        Ok(Self {
            vocabulary,
            votes: flat,
            n_records,
            n_rules,
            annotations,
            records,
        })
    }

    /// The label vocabulary the votes are coded against.
    #[must_use]
    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    /// Number of records.
    #[must_use]
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// Number of rules.
    #[must_use]
    pub fn n_rules(&self) -> usize {
        self.n_rules
    }

    /// The flattened `[n_rules × k]` vote row for a record.
    ///
    /// Entry `rule * k + label` is the rule's vote on the label.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn row(&self, row: usize) -> &[i8] {
        let width = self.n_rules * self.vocabulary.len();
        &self.votes[row * width..(row + 1) * width]
    }

    /// The binary annotation vector for a row, if annotated.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn annotation(&self, row: usize) -> Option<&[u8]> {
        self.annotations[row].as_deref()
    }

    /// The record handle aligned to a row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn record(&self, row: usize) -> &Record {
        &self.records[row]
    }

    /// Row indices filtered by annotation status, as in
    /// [`WeakLabelMatrix::row_indices`].
    #[must_use]
    pub fn row_indices(&self, has_annotation: Option<bool>) -> Vec<usize> {
        (0..self.n_records)
            .filter(|&i| match has_annotation {
                None => true,
                Some(annotated) => self.annotations[i].is_some() == annotated,
            })
            .collect()
    }

    /// Per-rule coverage: the fraction of records the rule voted on.
    ///
    /// A rule abstains on a record iff all its label slots are `-1`.
    #[must_use]
    pub fn coverage(&self) -> Vec<f64> {
        let k = self.vocabulary.len();
        let mut covered = vec![0usize; self.n_rules];
        for row in 0..self.n_records {
            let row_votes = self.row(row);
            for (rule, count) in covered.iter_mut().enumerate() {
                let slots = &row_votes[rule * k..(rule + 1) * k];
                if slots.iter().any(|&v| v != -1) {
                    *count += 1;
                }
            }
        }
        covered
            .into_iter()
            .map(|c| {
                if self.n_records == 0 {
                    0.0
                } else {
                    c as f64 / self.n_records as f64
                }
            })
            .collect()
    }
}

fn check_alignment(n_votes: usize, n_annotations: usize, n_records: usize) -> Result<()> {
    if n_votes != n_annotations || n_votes != n_records {
        return Err(EtiquetarError::DimensionMismatch {
            expected: format!("{n_votes} aligned vote rows, annotations and records"),
            actual: format!("{n_annotations} annotations, {n_records} records"),
        });
    }
    Ok(())
}
