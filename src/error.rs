//! Error types for Etiquetar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Etiquetar operations.
///
/// Provides detailed context about failures including misaligned inputs,
/// invalid label codes, unsupported tie-break policies, and scoring
/// without ground truth.
///
/// # Examples
///
/// ```
/// use etiquetar::error::EtiquetarError;
///
/// let err = EtiquetarError::DimensionMismatch {
///     expected: "4 rows".to_string(),
///     actual: "3 rows".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum EtiquetarError {
    /// Vocabulary construction failed (e.g. fewer than two labels).
    InvalidVocabulary {
        /// Description of the constraint violation
        message: String,
    },

    /// Input arrays don't line up for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// A vote or annotation refers to a label code outside the vocabulary.
    InvalidLabelCode {
        /// Offending code
        code: i32,
        /// Number of labels in the vocabulary
        cardinality: usize,
    },

    /// A multi-label vote entry is outside the `{-1, 0, 1}` encoding.
    InvalidVoteValue {
        /// Offending value
        value: i32,
    },

    /// Unrecognized tie-break policy string.
    InvalidTieBreakPolicy {
        /// Provided value
        value: String,
    },

    /// Tie-break policy not implemented by the given label model.
    UnsupportedTieBreakPolicy {
        /// Policy name
        policy: String,
        /// Label model name
        model: String,
    },

    /// Operation not supported by the given label model.
    UnsupportedOperation {
        /// Operation name
        operation: String,
        /// Label model name
        model: String,
    },

    /// Scoring was requested without any usable annotated records.
    MissingAnnotations {
        /// Description of what was missing
        message: String,
    },
}

impl fmt::Display for EtiquetarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtiquetarError::InvalidVocabulary { message } => {
                write!(f, "Invalid label vocabulary: {message}")
            }
            EtiquetarError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Input dimension mismatch: expected {expected}, got {actual}"
                )
            }
            EtiquetarError::InvalidLabelCode { code, cardinality } => {
                write!(
                    f,
                    "Invalid label code {code}, expected -1 (abstain) or 0..{cardinality}"
                )
            }
            EtiquetarError::InvalidVoteValue { value } => {
                write!(
                    f,
                    "Invalid multi-label vote value {value}, expected -1, 0 or 1"
                )
            }
            EtiquetarError::InvalidTieBreakPolicy { value } => {
                write!(
                    f,
                    "'{value}' is not a valid tie-break policy, please select one of \
                     ['abstain', 'random', 'true-random']"
                )
            }
            EtiquetarError::UnsupportedTieBreakPolicy { policy, model } => {
                write!(
                    f,
                    "The tie-break policy '{policy}' is not implemented for {model}"
                )
            }
            EtiquetarError::UnsupportedOperation { operation, model } => {
                write!(f, "Operation '{operation}' is not supported by {model}")
            }
            EtiquetarError::MissingAnnotations { message } => {
                write!(f, "Missing annotations: {message}")
            }
        }
    }
}

impl std::error::Error for EtiquetarError {}

/// Convenience alias for results with [`EtiquetarError`].
pub type Result<T> = std::result::Result<T, EtiquetarError>;
