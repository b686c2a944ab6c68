use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::applicant::ApplicantRecord;
use super::artifacts::Artifacts;
use super::encoding::{encode_record, FeatureVector};

/// Binary outcome of a credit risk prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskVerdict {
    /// Label 1, lower risk.
    Good,
    /// Label 0, higher risk.
    Bad,
}

impl RiskVerdict {
    pub fn label(self) -> i64 {
        match self {
            RiskVerdict::Good => 1,
            RiskVerdict::Bad => 0,
        }
    }

    /// Word shown in bold inside the result message.
    pub fn headline(self) -> &'static str {
        match self {
            RiskVerdict::Good => "GOOD",
            RiskVerdict::Bad => "BAD",
        }
    }

    pub fn message(self) -> String {
        format!("Predicted Credit Risk is: {}", self.headline())
    }

    pub fn tone(self) -> Tone {
        match self {
            RiskVerdict::Good => Tone::Success,
            RiskVerdict::Bad => Tone::Error,
        }
    }
}

impl TryFrom<i64> for RiskVerdict {
    type Error = PredictionError;

    fn try_from(label: i64) -> Result<Self, Self::Error> {
        match label {
            1 => Ok(RiskVerdict::Good),
            0 => Ok(RiskVerdict::Bad),
            other => Err(PredictionError::UnexpectedLabel(other)),
        }
    }
}

/// Visual styling a presenter applies to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Error,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Error => "error",
        }
    }
}

/// Verdict together with the row the classifier saw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub verdict: RiskVerdict,
    pub features: FeatureVector,
}

/// Encodes applicant records and runs them through the loaded classifier.
#[derive(Debug, Clone)]
pub struct RiskPredictor {
    artifacts: Arc<Artifacts>,
}

impl RiskPredictor {
    pub fn new(artifacts: Arc<Artifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn encode(&self, record: &ApplicantRecord) -> FeatureVector {
        encode_record(&self.artifacts.encoders, record)
    }

    pub fn predict(&self, record: &ApplicantRecord) -> Result<Prediction, PredictionError> {
        let features = self.encode(record);
        let label = self.artifacts.classifier.predict(&features);
        let verdict = RiskVerdict::try_from(label)?;
        debug!(?features, label, ?verdict, "credit risk predicted");

        Ok(Prediction { verdict, features })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    #[error("classifier returned unexpected label {0}; expected 0 or 1")]
    UnexpectedLabel(i64),
}
