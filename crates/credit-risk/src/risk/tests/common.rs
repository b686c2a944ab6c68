use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::risk::applicant::{CheckingAccount, Housing, SavingAccounts, Sex};
use crate::risk::artifacts::Artifacts;
use crate::risk::encoding::{CategoryCodes, EncoderSet, FeatureVector, LabelEncoder};
use crate::risk::model::Classifier;
use crate::risk::predictor::RiskPredictor;
use crate::risk::ApplicantRecord;

pub(super) fn label_encoder(field: &str, classes: &[&str]) -> LabelEncoder {
    LabelEncoder::new(field, classes.iter().map(|c| c.to_string()).collect())
        .expect("valid encoder")
}

/// Encoders mapping male→1, own→0 and little→0 for both account columns.
pub(super) fn encoders() -> EncoderSet {
    EncoderSet {
        sex: CategoryCodes::<Sex>::new(label_encoder("Sex", &["female", "male"]))
            .expect("sex covered"),
        housing: CategoryCodes::<Housing>::new(label_encoder(
            "Housing",
            &["own", "free", "rent"],
        ))
        .expect("housing covered"),
        saving_accounts: CategoryCodes::<SavingAccounts>::new(label_encoder(
            "Saving accounts",
            &["little", "moderate", "quite rich", "rich"],
        ))
        .expect("savings covered"),
        checking_account: CategoryCodes::<CheckingAccount>::new(label_encoder(
            "Checking account",
            &["little", "moderate", "rich"],
        ))
        .expect("checking covered"),
    }
}

pub(super) fn applicant() -> ApplicantRecord {
    ApplicantRecord::new(
        30,
        Sex::Male,
        1,
        Housing::Own,
        SavingAccounts::Little,
        CheckingAccount::Little,
        12,
        100,
    )
    .expect("valid applicant")
}

/// Classifier returning a fixed label and remembering every row it was asked about.
pub(super) struct FixedClassifier {
    pub(super) label: i64,
    pub(super) seen: Mutex<Vec<FeatureVector>>,
}

impl FixedClassifier {
    pub(super) fn returning(label: i64) -> Self {
        Self {
            label,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl Classifier for FixedClassifier {
    fn predict(&self, features: &FeatureVector) -> i64 {
        self.seen
            .lock()
            .expect("classifier mutex poisoned")
            .push(*features);
        self.label
    }
}

impl Classifier for Arc<FixedClassifier> {
    fn predict(&self, features: &FeatureVector) -> i64 {
        self.as_ref().predict(features)
    }
}

pub(super) fn predictor_returning(label: i64) -> RiskPredictor {
    let artifacts = Artifacts::new(Box::new(FixedClassifier::returning(label)), encoders());
    RiskPredictor::new(Arc::new(artifacts))
}

pub(super) fn recording_predictor(label: i64) -> (RiskPredictor, Arc<FixedClassifier>) {
    let classifier = Arc::new(FixedClassifier::returning(label));
    let artifacts = Artifacts::new(Box::new(classifier.clone()), encoders());
    (RiskPredictor::new(Arc::new(artifacts)), classifier)
}

pub(super) fn shipped_artifacts() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../artifacts")
}

/// Copy the shipped artifact set into `target` so a test can break one file.
pub(super) fn copy_shipped_artifacts(target: &Path) {
    for entry in fs::read_dir(shipped_artifacts()).expect("artifact dir readable") {
        let entry = entry.expect("dir entry");
        fs::copy(entry.path(), target.join(entry.file_name())).expect("artifact copied");
    }
}

pub(super) async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}
