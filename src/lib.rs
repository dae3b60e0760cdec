//! Etiquetar: weak-supervision label aggregation in pure Rust.
//!
//! Given a matrix of noisy, possibly-abstaining votes cast by independent
//! labeling rules, Etiquetar combines them into one calibrated prediction
//! per record, breaks ties deterministically, and computes held-out
//! evaluation metrics against ground truth. Single-label and multi-label
//! vocabularies are both supported.
//!
//! The crate is a pure library: no persistence, no I/O, no generative noise
//! model. It only aggregates already-known per-rule votes.
//!
//! # Quick Start
//!
//! ```
//! use etiquetar::prelude::*;
//!
//! // Three labels, votes from three rules over two records
//! let vocab = LabelVocabulary::new(["pos", "neg", "neu"]).unwrap();
//! let votes = vec![
//!     vec![RuleVote::Label(0), RuleVote::Label(0), RuleVote::Label(1)],
//!     vec![RuleVote::Label(2), RuleVote::Label(2), RuleVote::Abstain],
//! ];
//! let records = vec![Record::new("r0"), Record::new("r1")];
//! let wl = WeakLabelMatrix::new(vocab, &votes, vec![None, None], records).unwrap();
//!
//! let voter = MajorityVoter::new();
//! let predicted = voter
//!     .predict(&wl, false, false, "MajorityVoter", TieBreakPolicy::Abstain)
//!     .unwrap();
//!
//! let top = &predicted[0].prediction.as_ref().unwrap()[0];
//! assert_eq!(top.0, "pos");
//! assert!((top.1 - 2.0 / 3.0).abs() < 1e-12);
//! ```
//!
//! # Modules
//!
//! - [`label`]: Label vocabulary and vote encoding
//! - [`record`]: Opaque record handles with prediction attachment
//! - [`weak_labels`]: Single- and multi-label weak label matrices
//! - [`voter`]: The majority-vote label model and tie-break policies
//! - [`metrics`]: Classification report over aligned arrays

pub mod error;
pub mod label;
pub mod metrics;
pub mod prelude;
pub mod record;
pub mod voter;
pub mod weak_labels;

pub use error::{EtiquetarError, Result};
pub use label::{LabelVocabulary, RuleVote, ABSTAIN};
pub use metrics::{ClassificationReport, LabelMetrics};
pub use record::{Prediction, Record};
pub use voter::{MajorityVoter, TieBreakPolicy};
pub use weak_labels::{WeakLabelMatrix, WeakMultiLabelMatrix};
