use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use super::applicant::{ApplicantRecord, Category, CheckingAccount, Housing, SavingAccounts, Sex};

/// Training column order; the classifier reads features positionally in exactly this order.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "Sex",
    "Age",
    "Job",
    "Housing",
    "Credit amount",
    "Saving accounts",
    "Checking account",
    "Duration",
];

pub const FEATURE_COUNT: usize = 8;

/// Text-to-code bijection for one categorical column.
///
/// A label's code is its position in `classes`, matching how the training pipeline assigned
/// codes when it fitted the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    field: String,
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(
        field: impl Into<String>,
        classes: Vec<String>,
    ) -> Result<Self, EncodingError> {
        let field = field.into();
        if classes.is_empty() {
            return Err(EncodingError::Empty { field });
        }

        let mut seen = BTreeMap::new();
        for (index, label) in classes.iter().enumerate() {
            if let Some(first) = seen.insert(label.as_str(), index) {
                return Err(EncodingError::DuplicateLabel {
                    field,
                    label: label.clone(),
                    first,
                    second: index,
                });
            }
        }

        Ok(Self { field, classes })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, label: &str) -> Result<u32, EncodingError> {
        self.classes
            .iter()
            .position(|class| class == label)
            .map(|index| index as u32)
            .ok_or_else(|| EncodingError::UnknownLabel {
                field: self.field.clone(),
                label: label.to_string(),
            })
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

/// Code table for a single [`Category`], resolved once when the encoder set is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCodes<C: Category> {
    encoder: LabelEncoder,
    codes: Vec<u32>,
    category: PhantomData<C>,
}

impl<C: Category> CategoryCodes<C> {
    /// Fails when the encoder was not fitted on every variant of `C`.
    pub fn new(encoder: LabelEncoder) -> Result<Self, EncodingError> {
        let mut missing = Vec::new();
        let mut codes = Vec::with_capacity(C::ALL.len());
        for &category in C::ALL {
            match encoder.encode(category.label()) {
                Ok(code) => codes.push(code),
                Err(_) => missing.push(category.label().to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(EncodingError::MissingCategories {
                field: C::FIELD.to_string(),
                missing,
            });
        }

        Ok(Self {
            encoder,
            codes,
            category: PhantomData,
        })
    }

    /// Labels the encoder knows that no variant of `C` maps to.
    pub fn unused_labels(&self) -> Vec<&str> {
        self.encoder
            .classes()
            .iter()
            .map(String::as_str)
            .filter(|label| C::from_label(label).is_none())
            .collect()
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    pub fn code(&self, category: C) -> u32 {
        self.codes[category.index()]
    }
}

/// The four fitted encoders, one per categorical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSet {
    pub sex: CategoryCodes<Sex>,
    pub housing: CategoryCodes<Housing>,
    pub saving_accounts: CategoryCodes<SavingAccounts>,
    pub checking_account: CategoryCodes<CheckingAccount>,
}

impl EncoderSet {
    /// Encoders keyed by training column name.
    pub fn by_field(&self) -> BTreeMap<&str, &LabelEncoder> {
        [
            self.sex.encoder(),
            self.housing.encoder(),
            self.saving_accounts.encoder(),
            self.checking_account.encoder(),
        ]
        .into_iter()
        .map(|encoder| (encoder.field(), encoder))
        .collect()
    }
}

/// One encoded applicant row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        FEATURE_COLUMNS.iter().copied().zip(self.0.iter().copied())
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (column, value) in self.columns() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}

/// Assemble the classifier input for `record`. Numeric fields pass through unchanged.
pub fn encode_record(encoders: &EncoderSet, record: &ApplicantRecord) -> FeatureVector {
    FeatureVector([
        encoders.sex.code(record.sex) as f32,
        record.age as f32,
        record.job as f32,
        encoders.housing.code(record.housing) as f32,
        record.credit_amount as f32,
        encoders.saving_accounts.code(record.saving_accounts) as f32,
        encoders.checking_account.code(record.checking_account) as f32,
        record.duration as f32,
    ])
}

/// Serialized encoder artifact: either `{"classes": [...]}` or a bare label array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum EncoderDocument {
    Object { classes: Vec<String> },
    Classes(Vec<String>),
}

impl EncoderDocument {
    pub(crate) fn into_classes(self) -> Vec<String> {
        match self {
            EncoderDocument::Object { classes } | EncoderDocument::Classes(classes) => classes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("'{label}' is not a known {field} label")]
    UnknownLabel { field: String, label: String },
    #[error("{field} encoder lists '{label}' twice (positions {first} and {second})")]
    DuplicateLabel {
        field: String,
        label: String,
        first: usize,
        second: usize,
    },
    #[error("{field} encoder has no classes")]
    Empty { field: String },
    #[error("{field} encoder was not fitted on: {}", .missing.join(", "))]
    MissingCategories { field: String, missing: Vec<String> },
}
