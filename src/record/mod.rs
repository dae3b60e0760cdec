//! Opaque record handles carrying predictions and their provenance.

use serde::{Deserialize, Serialize};

/// A prediction: `(label, probability)` pairs sorted by probability
/// descending, ties broken by vocabulary order.
pub type Prediction = Vec<(String, f64)>;

/// An opaque record handle, aligned to one row of a weak label matrix.
///
/// The label models never mutate caller-owned records: emitted records are
/// deep copies (`Clone`) with the prediction and provenance tag attached.
///
/// # Examples
///
/// ```
/// use etiquetar::record::Record;
///
/// let mut record = Record::new("doc-42");
/// record.attach_prediction(Some(vec![("pos".to_string(), 1.0)]), "MajorityVoter");
/// assert_eq!(record.prediction_agent.as_deref(), Some("MajorityVoter"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Caller-assigned identifier.
    pub id: String,
    /// The attached prediction; `None` means the model fully abstained.
    #[serde(default)]
    pub prediction: Option<Prediction>,
    /// Provenance tag naming the model that produced the prediction.
    #[serde(default)]
    pub prediction_agent: Option<String>,
}

impl Record {
    /// Creates a record with no prediction attached.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prediction: None,
            prediction_agent: None,
        }
    }

    /// Attaches a prediction and its provenance tag.
    ///
    /// The tag is recorded verbatim even when the prediction is `None`,
    /// so abstentions remain attributable.
    pub fn attach_prediction(&mut self, prediction: Option<Prediction>, agent: &str) {
        self.prediction = prediction;
        self.prediction_agent = Some(agent.to_string());
    }
}
