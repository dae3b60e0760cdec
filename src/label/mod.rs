//! Label vocabulary and per-rule vote encoding.
//!
//! A [`LabelVocabulary`] maps label identifiers to dense zero-based codes.
//! Abstention is never a vocabulary member; it is carried by the reserved
//! [`ABSTAIN`] sentinel, or by [`RuleVote::Abstain`] at the API boundary.

use std::collections::HashMap;

use crate::error::{EtiquetarError, Result};

/// Integer code reserved for a rule that casts no vote.
pub const ABSTAIN: i32 = -1;

/// The output of a single labeling rule for a single record.
///
/// The bulk matrices store votes as `i32` with [`ABSTAIN`] as sentinel;
/// `RuleVote` is the typed view of the same encoding and the two must stay
/// behaviorally identical.
///
/// # Examples
///
/// ```
/// use etiquetar::label::RuleVote;
///
/// assert_eq!(RuleVote::Abstain.to_i32(), -1);
/// assert_eq!(RuleVote::Label(2).to_i32(), 2);
/// assert_eq!(RuleVote::from_i32(-1), RuleVote::Abstain);
/// assert_eq!(RuleVote::from_i32(1), RuleVote::Label(1));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleVote {
    /// The rule explicitly casts no vote.
    Abstain,
    /// The rule votes for the label with this vocabulary code.
    Label(usize),
}

impl RuleVote {
    /// Converts to the integer sentinel encoding.
    #[must_use]
    pub fn to_i32(self) -> i32 {
        match self {
            RuleVote::Abstain => ABSTAIN,
            RuleVote::Label(code) => code as i32,
        }
    }

    /// Converts from the integer sentinel encoding.
    ///
    /// Every negative value is read as an abstention.
    #[must_use]
    pub fn from_i32(value: i32) -> Self {
        if value < 0 {
            RuleVote::Abstain
        } else {
            RuleVote::Label(value as usize)
        }
    }
}

/// Ordered, deduplicated set of label identifiers with dense codes.
///
/// Codes are zero-based, assigned in first-occurrence order, and stable for
/// the lifetime of the vocabulary. At least two labels are required.
///
/// # Examples
///
/// ```
/// use etiquetar::label::LabelVocabulary;
///
/// let vocab = LabelVocabulary::new(["spam", "ham", "spam"]).unwrap();
/// assert_eq!(vocab.len(), 2);
/// assert_eq!(vocab.code("ham"), Some(1));
/// assert_eq!(vocab.label(0), "spam");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LabelVocabulary {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelVocabulary {
    /// Builds a vocabulary from label identifiers, deduplicating while
    /// preserving first-occurrence order.
    ///
    /// # Errors
    ///
    /// Returns [`EtiquetarError::InvalidVocabulary`] if fewer than two
    /// distinct labels remain after deduplication.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique = Vec::new();
        let mut index = HashMap::new();
        for label in labels {
            let label = label.into();
            if !index.contains_key(&label) {
                index.insert(label.clone(), unique.len());
                unique.push(label);
            }
        }

        if unique.len() < 2 {
            return Err(EtiquetarError::InvalidVocabulary {
                message: format!("need at least 2 distinct labels, got {}", unique.len()),
            });
        }

        Ok(Self {
            labels: unique,
            index,
        })
    }

    /// Number of labels (the cardinality `k`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false: a vocabulary holds at least two labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The labels in code order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The label identifier for a code.
    ///
    /// # Panics
    ///
    /// Panics if `code` is out of range.
    #[must_use]
    pub fn label(&self, code: usize) -> &str {
        &self.labels[code]
    }

    /// The dense code of a label, if it is a vocabulary member.
    #[must_use]
    pub fn code(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }
}
