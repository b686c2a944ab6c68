use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::applicant::{Category, CheckingAccount, Housing, SavingAccounts, Sex};
use super::encoding::{CategoryCodes, EncoderDocument, EncoderSet, EncodingError, LabelEncoder};
use super::model::{BoostedTreeClassifier, Classifier, ModelError};

pub const MODEL_FILE: &str = "xgb_credit_model.json";

/// File locations of the classifier and the four encoders inside one artifact directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    directory: PathBuf,
}

impl ArtifactPaths {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn model(&self) -> PathBuf {
        self.directory.join(MODEL_FILE)
    }

    /// `{column}_encoder.json`, e.g. `Saving accounts_encoder.json`.
    pub fn encoder(&self, field: &str) -> PathBuf {
        self.directory.join(format!("{field}_encoder.json"))
    }
}

/// Classifier and encoders loaded once at startup and shared read-only afterwards.
pub struct Artifacts {
    pub classifier: Box<dyn Classifier>,
    pub encoders: EncoderSet,
}

impl Artifacts {
    pub fn new(classifier: Box<dyn Classifier>, encoders: EncoderSet) -> Self {
        Self {
            classifier,
            encoders,
        }
    }

    /// Read every artifact under `paths`, failing on the first missing or malformed file.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let model_path = paths.model();
        let raw = read(&model_path)?;
        let classifier =
            BoostedTreeClassifier::from_json(&raw).map_err(|source| ArtifactError::Model {
                path: model_path.clone(),
                source,
            })?;

        let encoders = EncoderSet {
            sex: load_codes::<Sex>(paths)?,
            housing: load_codes::<Housing>(paths)?,
            saving_accounts: load_codes::<SavingAccounts>(paths)?,
            checking_account: load_codes::<CheckingAccount>(paths)?,
        };

        info!(
            directory = %paths.directory().display(),
            trees = classifier.tree_count(),
            objective = ?classifier.objective(),
            "credit risk artifacts loaded"
        );

        Ok(Self::new(Box::new(classifier), encoders))
    }
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("encoders", &self.encoders)
            .finish_non_exhaustive()
    }
}

fn read(path: &Path) -> Result<String, ArtifactError> {
    fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_codes<C: Category>(paths: &ArtifactPaths) -> Result<CategoryCodes<C>, ArtifactError> {
    let path = paths.encoder(C::FIELD);
    let raw = read(&path)?;
    let document: EncoderDocument =
        serde_json::from_str(&raw).map_err(|source| ArtifactError::Malformed {
            path: path.clone(),
            source,
        })?;

    let codes = LabelEncoder::new(C::FIELD, document.into_classes())
        .and_then(CategoryCodes::<C>::new)
        .map_err(|source| ArtifactError::Encoder {
            path: path.clone(),
            source,
        })?;

    let unused = codes.unused_labels();
    if !unused.is_empty() {
        warn!(
            field = C::FIELD,
            labels = ?unused,
            "encoder knows labels the form never submits"
        );
    }

    Ok(codes)
}

/// Startup failure while reading the classifier or encoder artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("unable to read artifact {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact {} is not valid JSON: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoder artifact {} is unusable: {source}", .path.display())]
    Encoder {
        path: PathBuf,
        #[source]
        source: EncodingError,
    },
    #[error("classifier artifact {} is unusable: {source}", .path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
}
