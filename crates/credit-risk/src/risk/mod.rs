//! Applicant intake, categorical encoding, and boosted-tree credit risk prediction.

pub mod applicant;
pub mod artifacts;
pub mod encoding;
pub mod model;
pub mod predictor;
pub mod router;

#[cfg(test)]
mod tests;

pub use applicant::{
    ApplicantError, ApplicantForm, ApplicantRecord, Category, CheckingAccount, Housing,
    SavingAccounts, Sex,
};
pub use artifacts::{ArtifactError, ArtifactPaths, Artifacts};
pub use encoding::{
    encode_record, EncoderSet, EncodingError, FeatureVector, LabelEncoder, FEATURE_COLUMNS,
};
pub use model::{BoostedTreeClassifier, Classifier, ModelError};
pub use predictor::{Prediction, PredictionError, RiskPredictor, RiskVerdict, Tone};
pub use router::{prediction_router, PredictionView};
