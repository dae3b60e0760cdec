//! Evaluation metrics for label models.
//!
//! Builds the standard classification report over aligned prediction and
//! annotation arrays: accuracy, micro and macro averaged
//! precision/recall/F1, and per-label precision/recall/F1/support.
//!
//! Reported labels are restricted to those actually observed in the
//! annotation array, so labels with zero support never show up. Macro
//! averages are unweighted means over those labels; micro averages pool
//! counts over the whole vocabulary before taking ratios.

use serde::{Deserialize, Serialize};

/// Precision, recall, F1 and support for one label (or one average).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    /// TP / (TP + FP)
    pub precision: f64,
    /// TP / (TP + FN)
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
    /// Number of true instances of the label
    pub support: usize,
}

/// Full classification report over aligned predictions and annotations.
///
/// Serializable as a structured mapping for the consuming service layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Exact match rate (subset accuracy for multi-label).
    pub accuracy: f64,
    /// Counts pooled over the whole vocabulary before taking ratios.
    pub micro_avg: LabelMetrics,
    /// Unweighted mean over the observed labels.
    pub macro_avg: LabelMetrics,
    /// Per-label metrics in vocabulary order, observed labels only.
    pub labels: Vec<(String, LabelMetrics)>,
}

/// Per-label confusion counts.
#[derive(Clone, Copy, Debug, Default)]
struct Tally {
    tp: usize,
    fp: usize,
    fn_count: usize,
    support: usize,
}

impl Tally {
    fn metrics(self) -> LabelMetrics {
        let precision = class_precision(self.tp, self.fp);
        let recall = class_recall(self.tp, self.fn_count);
        LabelMetrics {
            precision,
            recall,
            f1: f1_from_prec_rec(precision, recall),
            support: self.support,
        }
    }
}

/// Compute precision for a class given true positives and false positives.
fn class_precision(tp: usize, fp: usize) -> f64 {
    if tp + fp == 0 {
        0.0
    } else {
        tp as f64 / (tp + fp) as f64
    }
}

/// Compute recall for a class given true positives and false negatives.
fn class_recall(tp: usize, fn_count: usize) -> f64 {
    if tp + fn_count == 0 {
        0.0
    } else {
        tp as f64 / (tp + fn_count) as f64
    }
}

/// Compute F1 score from precision and recall.
fn f1_from_prec_rec(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Compute classification accuracy (exact match rate).
///
/// # Panics
///
/// Panics if the slices have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use etiquetar::metrics::accuracy;
///
/// let y_true = vec![0, 1, 2, 0];
/// let y_pred = vec![0, 1, 1, 0];
/// assert!((accuracy(&y_pred, &y_true) - 0.75).abs() < 1e-12);
/// ```
#[must_use]
pub fn accuracy(y_pred: &[usize], y_true: &[usize]) -> f64 {
    assert_eq!(y_pred.len(), y_true.len(), "Arrays must have same length");
    assert!(!y_true.is_empty(), "Arrays cannot be empty");

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    correct as f64 / y_true.len() as f64
}

/// Builds the single-label classification report.
///
/// `label_names` is the full vocabulary in code order; the per-label
/// entries and the macro average only cover the labels observed in
/// `y_true`. Predictions of unobserved labels still feed the micro pool
/// as false positives, and count as false negatives for the true label.
///
/// # Panics
///
/// Panics if the arrays are misaligned or empty, or if a code exceeds the
/// vocabulary.
///
/// # Examples
///
/// ```
/// use etiquetar::metrics::classification_report;
///
/// let names = vec!["a".to_string(), "b".to_string()];
/// let report = classification_report(&[0, 1, 0], &[0, 1, 1], &names);
/// assert!((report.accuracy - 2.0 / 3.0).abs() < 1e-12);
/// assert_eq!(report.labels.len(), 2);
/// ```
#[must_use]
pub fn classification_report(
    y_pred: &[usize],
    y_true: &[usize],
    label_names: &[String],
) -> ClassificationReport {
    assert_eq!(y_pred.len(), y_true.len(), "Arrays must have same length");
    assert!(!y_true.is_empty(), "Arrays cannot be empty");

    let k = label_names.len();
    let mut tallies = vec![Tally::default(); k];
    for (&pred, &truth) in y_pred.iter().zip(y_true.iter()) {
        tallies[truth].support += 1;
        if pred == truth {
            tallies[truth].tp += 1;
        } else {
            tallies[pred].fp += 1;
            tallies[truth].fn_count += 1;
        }
    }

    let observed: Vec<usize> = (0..k).filter(|&code| tallies[code].support > 0).collect();

    build_report(accuracy(y_pred, y_true), &tallies, &observed, label_names)
}

/// Builds the multi-label classification report over aligned binary rows.
///
/// Accuracy is the subset accuracy (a row counts as correct only when every
/// label call matches). Per-label counts come from the binary columns;
/// observed labels are those with at least one true instance.
///
/// # Panics
///
/// Panics if the arrays are misaligned or empty, or if a row's length does
/// not match the vocabulary.
#[must_use]
pub fn multi_label_report(
    y_pred: &[Vec<u8>],
    y_true: &[Vec<u8>],
    label_names: &[String],
) -> ClassificationReport {
    assert_eq!(y_pred.len(), y_true.len(), "Arrays must have same length");
    assert!(!y_true.is_empty(), "Arrays cannot be empty");

    let k = label_names.len();
    let mut tallies = vec![Tally::default(); k];
    let mut exact = 0usize;
    for (pred, truth) in y_pred.iter().zip(y_true.iter()) {
        assert_eq!(pred.len(), k, "Prediction row must match vocabulary size");
        assert_eq!(truth.len(), k, "Annotation row must match vocabulary size");

        if pred == truth {
            exact += 1;
        }
        for (label, tally) in tallies.iter_mut().enumerate() {
            match (pred[label], truth[label]) {
                (1, 1) => {
                    tally.tp += 1;
                    tally.support += 1;
                }
                (1, 0) => tally.fp += 1,
                (0, 1) => {
                    tally.fn_count += 1;
                    tally.support += 1;
                }
                _ => {}
            }
        }
    }

    let observed: Vec<usize> = (0..k).filter(|&code| tallies[code].support > 0).collect();
    let subset_accuracy = exact as f64 / y_true.len() as f64;

    build_report(subset_accuracy, &tallies, &observed, label_names)
}

fn build_report(
    accuracy: f64,
    tallies: &[Tally],
    observed: &[usize],
    label_names: &[String],
) -> ClassificationReport {
    let per_label: Vec<(String, LabelMetrics)> = observed
        .iter()
        .map(|&code| (label_names[code].clone(), tallies[code].metrics()))
        .collect();

    // Micro pools over the whole vocabulary: a false positive on a label
    // with zero support still counts against micro precision.
    let pooled = tallies.iter().fold(Tally::default(), |mut acc, tally| {
        acc.tp += tally.tp;
        acc.fp += tally.fp;
        acc.fn_count += tally.fn_count;
        acc.support += tally.support;
        acc
    });
    let micro_avg = pooled.metrics();

    let n_observed = per_label.len().max(1);
    let macro_avg = LabelMetrics {
        precision: per_label.iter().map(|(_, m)| m.precision).sum::<f64>() / n_observed as f64,
        recall: per_label.iter().map(|(_, m)| m.recall).sum::<f64>() / n_observed as f64,
        f1: per_label.iter().map(|(_, m)| m.f1).sum::<f64>() / n_observed as f64,
        support: pooled.support,
    };

    ClassificationReport {
        accuracy,
        micro_avg,
        macro_avg,
        labels: per_label,
    }
}
