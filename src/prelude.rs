//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use etiquetar::prelude::*;
//! ```

pub use crate::error::{EtiquetarError, Result};
pub use crate::label::{LabelVocabulary, RuleVote, ABSTAIN};
pub use crate::metrics::{ClassificationReport, LabelMetrics};
pub use crate::record::{Prediction, Record};
pub use crate::voter::{MajorityVoter, TieBreakPolicy, DEFAULT_MULTI_LABEL_THRESHOLD};
pub use crate::weak_labels::{WeakLabelMatrix, WeakMultiLabelMatrix};
