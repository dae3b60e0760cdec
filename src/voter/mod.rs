//! Majority-vote label aggregation.
//!
//! [`MajorityVoter`] combines the noisy votes of independent labeling rules
//! into one calibrated prediction per record. It is a stateless aggregator:
//! there is nothing to fit, and the probability computation is shared
//! bit-for-bit between the predict and score paths.
//!
//! Single-label probabilities are normalized vote counts; a record on which
//! every rule abstained becomes the uniform distribution over all labels,
//! i.e. a maximal tie. Multi-label probabilities are binary per label (at
//! least one vote), with an all-`NaN` row signalling full abstention.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{EtiquetarError, Result};
use crate::label::LabelVocabulary;
use crate::metrics::{classification_report, multi_label_report, ClassificationReport};
use crate::record::{Prediction, Record};
use crate::weak_labels::{WeakLabelMatrix, WeakMultiLabelMatrix};

/// Absolute tolerance under which two probabilities count as tied.
pub const TIE_TOLERANCE: f64 = 1e-8;

/// Probability threshold for accepting a label in multi-label scoring.
pub const DEFAULT_MULTI_LABEL_THRESHOLD: f64 = 0.5;

/// When a tie is broken, by how much the winner's probability is increased.
const TIE_BREAK_PROBABILITY_INCREASE: f64 = 1e-4;

/// Policy for resolving probability ties.
///
/// `TrueRandom` is reserved for generative backends with their own sampling
/// discipline; the [`MajorityVoter`] rejects it.
///
/// # Examples
///
/// ```
/// use etiquetar::voter::TieBreakPolicy;
///
/// let policy: TieBreakPolicy = "random".parse().unwrap();
/// assert_eq!(policy, TieBreakPolicy::Random);
/// assert!("coin-flip".parse::<TieBreakPolicy>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreakPolicy {
    /// Do not provide any prediction for tied records.
    #[default]
    Abstain,
    /// Pick a tied label via a deterministic hash of the record position.
    Random,
    /// Non-reproducible random choice; not implemented by this aggregator.
    TrueRandom,
}

impl TieBreakPolicy {
    /// The wire name of the policy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TieBreakPolicy::Abstain => "abstain",
            TieBreakPolicy::Random => "random",
            TieBreakPolicy::TrueRandom => "true-random",
        }
    }
}

impl fmt::Display for TieBreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TieBreakPolicy {
    type Err = EtiquetarError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "abstain" => Ok(TieBreakPolicy::Abstain),
            "random" => Ok(TieBreakPolicy::Random),
            "true-random" => Ok(TieBreakPolicy::TrueRandom),
            _ => Err(EtiquetarError::InvalidTieBreakPolicy {
                value: value.to_string(),
            }),
        }
    }
}

/// A basic label model that computes the majority vote across all rules.
///
/// For multi-label classification it simply votes for all labels with a
/// non-zero probability, that is labels that got at least one vote by the
/// rules.
///
/// # Examples
///
/// ```
/// use etiquetar::prelude::*;
///
/// let vocab = LabelVocabulary::new(["pos", "neg"]).unwrap();
/// let votes = vec![
///     vec![RuleVote::Label(0), RuleVote::Label(0), RuleVote::Abstain],
///     vec![RuleVote::Label(1), RuleVote::Abstain, RuleVote::Label(1)],
/// ];
/// let records = vec![Record::new("a"), Record::new("b")];
/// let wl = WeakLabelMatrix::new(vocab, &votes, vec![None, None], records).unwrap();
///
/// let voter = MajorityVoter::new();
/// let predicted = voter
///     .predict(&wl, false, false, "MajorityVoter", TieBreakPolicy::Abstain)
///     .unwrap();
/// assert_eq!(predicted.len(), 2);
/// assert_eq!(predicted[0].prediction.as_ref().unwrap()[0].0, "pos");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct MajorityVoter;

impl MajorityVoter {
    /// Creates a majority voter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// There is nothing to fit on a majority voter.
    ///
    /// # Errors
    ///
    /// Always returns [`EtiquetarError::UnsupportedOperation`]; the voter is
    /// stateless and calling `fit` is a caller error, surfaced immediately
    /// instead of being a silent no-op.
    pub fn fit(&mut self) -> Result<()> {
        Err(EtiquetarError::UnsupportedOperation {
            operation: "fit".to_string(),
            model: "MajorityVoter".to_string(),
        })
    }

    /// Applies the label model to a single-label matrix.
    ///
    /// Annotated rows are excluded unless `include_annotated_records`.
    /// Tied rows are resolved per `tie_break_policy`: under
    /// [`TieBreakPolicy::Abstain`] they are emitted with no prediction, or
    /// dropped entirely when `include_abstentions` is false; under
    /// [`TieBreakPolicy::Random`] a deterministic hash of the row position
    /// selects the winner, whose probability is nudged above its rivals.
    ///
    /// Emitted records are deep copies carrying `prediction_agent` verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`EtiquetarError::UnsupportedTieBreakPolicy`] for
    /// [`TieBreakPolicy::TrueRandom`].
    pub fn predict(
        &self,
        weak_labels: &WeakLabelMatrix,
        include_annotated_records: bool,
        include_abstentions: bool,
        prediction_agent: &str,
        tie_break_policy: TieBreakPolicy,
    ) -> Result<Vec<Record>> {
        ensure_supported(tie_break_policy)?;

        let rows = weak_labels.row_indices(annotation_filter(include_annotated_records));
        let probabilities = single_label_probabilities(weak_labels, &rows);
        let vocabulary = weak_labels.vocabulary();

        let mut out = Vec::with_capacity(rows.len());
        for (position, (&row, mut probability)) in rows.iter().zip(probabilities).enumerate() {
            let tie = tie_set(&probability);

            let prediction = if tie.len() <= 1 {
                Some(sorted_prediction(vocabulary, &probability))
            } else {
                match tie_break_policy {
                    TieBreakPolicy::Abstain => {
                        if !include_abstentions {
                            continue;
                        }
                        None
                    }
                    TieBreakPolicy::Random => {
                        nudge_tie_winner(&mut probability, &tie, position);
                        Some(sorted_prediction(vocabulary, &probability))
                    }
                    TieBreakPolicy::TrueRandom => return Err(unsupported(tie_break_policy)),
                }
            };

            let mut record = weak_labels.record(row).clone();
            record.attach_prediction(prediction, prediction_agent);
            out.push(record);
        }

        Ok(out)
    }

    /// Applies the label model to a multi-label matrix.
    ///
    /// Tie-break policies are not well-defined for independent per-label
    /// decisions and play no role here. A record is dropped iff every rule
    /// abstained on every label and `include_abstentions` is false;
    /// otherwise its prediction lists all labels sorted by probability
    /// descending, ties broken by vocabulary order.
    #[must_use]
    pub fn predict_multi(
        &self,
        weak_labels: &WeakMultiLabelMatrix,
        include_annotated_records: bool,
        include_abstentions: bool,
        prediction_agent: &str,
    ) -> Vec<Record> {
        let rows = weak_labels.row_indices(annotation_filter(include_annotated_records));
        let probabilities = multi_label_probabilities(weak_labels, &rows);
        let vocabulary = weak_labels.vocabulary();

        let mut out = Vec::with_capacity(rows.len());
        for (&row, probability) in rows.iter().zip(probabilities) {
            let all_abstained = probability.iter().all(|p| p.is_nan());
            if all_abstained && !include_abstentions {
                continue;
            }

            let prediction = if all_abstained {
                None
            } else {
                Some(sorted_prediction(vocabulary, &probability))
            };

            let mut record = weak_labels.record(row).clone();
            record.attach_prediction(prediction, prediction_agent);
            out.push(record);
        }

        out
    }

    /// Evaluates the label model against the annotated records.
    ///
    /// Probabilities are recomputed over annotated rows exactly as in
    /// [`MajorityVoter::predict`]. Tied rows are removed from both the
    /// prediction and annotation arrays under [`TieBreakPolicy::Abstain`];
    /// under [`TieBreakPolicy::Random`] the tied prediction index is
    /// replaced by the hash-selected tie-set member (no probability nudge,
    /// only the class index matters here).
    ///
    /// # Errors
    ///
    /// Returns [`EtiquetarError::MissingAnnotations`] if there are no
    /// annotated records, or if the abstain policy removed all of them, and
    /// [`EtiquetarError::UnsupportedTieBreakPolicy`] for
    /// [`TieBreakPolicy::TrueRandom`].
    pub fn score(
        &self,
        weak_labels: &WeakLabelMatrix,
        tie_break_policy: TieBreakPolicy,
    ) -> Result<ClassificationReport> {
        ensure_supported(tie_break_policy)?;

        let rows = weak_labels.row_indices(Some(true));
        if rows.is_empty() {
            return Err(EtiquetarError::MissingAnnotations {
                message: "you need annotated records to compute scores/metrics for your label \
                          model"
                    .to_string(),
            });
        }

        let probabilities = single_label_probabilities(weak_labels, &rows);
        let ties: Vec<Vec<usize>> = probabilities.iter().map(|p| tie_set(p)).collect();

        // first tie-set member == first index within tolerance of the max
        let mut prediction: Vec<usize> = ties.iter().map(|tie| tie[0]).collect();
        let mut annotation: Vec<usize> = rows
            .iter()
            .map(|&row| weak_labels.annotations()[row] as usize)
            .collect();

        match tie_break_policy {
            TieBreakPolicy::Abstain => {
                let keep: Vec<bool> = ties.iter().map(|tie| tie.len() <= 1).collect();
                prediction = filter_in_lockstep(prediction, &keep);
                annotation = filter_in_lockstep(annotation, &keep);
            }
            TieBreakPolicy::Random => {
                for (position, tie) in ties.iter().enumerate() {
                    if tie.len() > 1 {
                        prediction[position] = tie[tie_break_index(position, tie.len())];
                    }
                }
            }
            TieBreakPolicy::TrueRandom => return Err(unsupported(tie_break_policy)),
        }

        if annotation.is_empty() {
            return Err(EtiquetarError::MissingAnnotations {
                message: "every annotated record was tied, nothing left to score under the \
                          'abstain' tie-break policy"
                    .to_string(),
            });
        }

        Ok(classification_report(
            &prediction,
            &annotation,
            weak_labels.vocabulary().labels(),
        ))
    }

    /// Evaluates the label model against the annotated multi-label records.
    ///
    /// Probabilities above `threshold` (typically
    /// [`DEFAULT_MULTI_LABEL_THRESHOLD`]) become hard `1` calls. Rows on
    /// which every rule abstained are removed from both arrays.
    ///
    /// # Errors
    ///
    /// Returns [`EtiquetarError::MissingAnnotations`] if there are no
    /// annotated records, or if every one of them was a full abstention.
    pub fn score_multi(
        &self,
        weak_labels: &WeakMultiLabelMatrix,
        threshold: f64,
    ) -> Result<ClassificationReport> {
        let rows = weak_labels.row_indices(Some(true));
        if rows.is_empty() {
            return Err(EtiquetarError::MissingAnnotations {
                message: "you need annotated records to compute scores/metrics for your label \
                          model"
                    .to_string(),
            });
        }

        let probabilities = multi_label_probabilities(weak_labels, &rows);

        let mut prediction = Vec::with_capacity(rows.len());
        let mut annotation = Vec::with_capacity(rows.len());
        for (&row, probability) in rows.iter().zip(probabilities) {
            if probability.iter().all(|p| p.is_nan()) {
                continue;
            }
            // row_indices(Some(true)) guarantees the annotation is present
            if let Some(truth) = weak_labels.annotation(row) {
                prediction.push(
                    probability
                        .iter()
                        .map(|&p| u8::from(p > threshold))
                        .collect::<Vec<u8>>(),
                );
                annotation.push(truth.to_vec());
            }
        }

        if annotation.is_empty() {
            return Err(EtiquetarError::MissingAnnotations {
                message: "every annotated record was a full abstention, nothing left to score"
                    .to_string(),
            });
        }

        Ok(multi_label_report(
            &prediction,
            &annotation,
            weak_labels.vocabulary().labels(),
        ))
    }
}

/// Maps the `include_annotated_records` switch onto the row filter.
fn annotation_filter(include_annotated_records: bool) -> Option<bool> {
    if include_annotated_records {
        None
    } else {
        Some(false)
    }
}

fn ensure_supported(policy: TieBreakPolicy) -> Result<()> {
    if policy == TieBreakPolicy::TrueRandom {
        return Err(unsupported(policy));
    }
    Ok(())
}

fn unsupported(policy: TieBreakPolicy) -> EtiquetarError {
    EtiquetarError::UnsupportedTieBreakPolicy {
        policy: policy.to_string(),
        model: "MajorityVoter".to_string(),
    }
}

/// Normalized vote counts per label, for the selected rows.
///
/// A row on which every rule abstained becomes the exact uniform
/// distribution `1/k`, treating universal abstention as a maximal tie.
fn single_label_probabilities(weak_labels: &WeakLabelMatrix, rows: &[usize]) -> Vec<Vec<f64>> {
    let k = weak_labels.vocabulary().len();
    rows.iter()
        .map(|&row| {
            let mut counts = vec![0usize; k];
            for &vote in weak_labels.row(row) {
                if vote >= 0 {
                    counts[vote as usize] += 1;
                }
            }
            let total: usize = counts.iter().sum();
            if total == 0 {
                vec![1.0 / k as f64; k]
            } else {
                counts.iter().map(|&c| c as f64 / total as f64).collect()
            }
        })
        .collect()
}

/// Binary per-label probabilities, for the selected rows.
///
/// A label gets `1.0` iff at least one rule voted `1` for it (abstains are
/// clamped to `0` first, so they never count as evidence). A row whose raw
/// vote sum equals exactly `-(n_rules * k)` means every rule abstained on
/// every label; it becomes all-`NaN`. The condition is structural on the
/// abstain encoding, not a threshold.
fn multi_label_probabilities(weak_labels: &WeakMultiLabelMatrix, rows: &[usize]) -> Vec<Vec<f64>> {
    let k = weak_labels.vocabulary().len();
    let n_rules = weak_labels.n_rules();
    rows.iter()
        .map(|&row| {
            let votes = weak_labels.row(row);
            let raw_sum: i64 = votes.iter().map(|&v| i64::from(v)).sum();
            if raw_sum == -(n_rules as i64 * k as i64) {
                return vec![f64::NAN; k];
            }
            (0..k)
                .map(|label| {
                    let voted = (0..n_rules).any(|rule| votes[rule * k + label] == 1);
                    if voted {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

/// Label indices whose probability is within [`TIE_TOLERANCE`] of the row
/// maximum. A row is tied iff more than one index qualifies.
fn tie_set(probability: &[f64]) -> Vec<usize> {
    let max = probability.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    probability
        .iter()
        .enumerate()
        .filter(|(_, &p)| (max - p).abs() < TIE_TOLERANCE)
        .map(|(idx, _)| idx)
        .collect()
}

/// Deterministic, reproducible index into a tie set.
///
/// The decimal string of the row position is hashed with SHA-256 and the
/// digest, read as a big-endian integer, is reduced modulo the tie-set
/// size. The winner depends only on the position, never on iteration order
/// or on other rows.
fn tie_break_index(position: usize, n_tied: usize) -> usize {
    let digest = Sha256::digest(position.to_string().as_bytes());
    let modulus = n_tied as u64;
    digest
        .iter()
        .fold(0u64, |acc, &byte| (acc * 256 + u64::from(byte)) % modulus) as usize
}

/// Breaks an exact tie numerically: the hash-selected winner gains a small
/// fixed increment, every other tied entry loses its share of it. Non-tied
/// entries are untouched and the row sum is preserved.
fn nudge_tie_winner(probability: &mut [f64], tie: &[usize], position: usize) {
    let winner = tie[tie_break_index(position, tie.len())];
    for &idx in tie {
        if idx == winner {
            probability[idx] += TIE_BREAK_PROBABILITY_INCREASE;
        } else {
            probability[idx] -= TIE_BREAK_PROBABILITY_INCREASE / (tie.len() - 1) as f64;
        }
    }
}

/// Full `(label, probability)` list sorted by probability descending, ties
/// broken by vocabulary order. `NaN` entries sort and display as `0.0`.
fn sorted_prediction(vocabulary: &LabelVocabulary, probability: &[f64]) -> Prediction {
    let displayed: Vec<f64> = probability
        .iter()
        .map(|&p| if p.is_nan() { 0.0 } else { p })
        .collect();

    let mut order: Vec<usize> = (0..displayed.len()).collect();
    order.sort_by(|&a, &b| displayed[b].total_cmp(&displayed[a]).then(a.cmp(&b)));

    order
        .into_iter()
        .map(|idx| (vocabulary.label(idx).to_string(), displayed[idx]))
        .collect()
}

fn filter_in_lockstep(values: Vec<usize>, keep: &[bool]) -> Vec<usize> {
    values
        .into_iter()
        .zip(keep)
        .filter(|(_, &kept)| kept)
        .map(|(value, _)| value)
        .collect()
}

#[cfg(test)]
mod tests;
