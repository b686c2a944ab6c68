use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One categorical applicant attribute backed by a trained label encoder.
///
/// Variants enumerate exactly the categories the encoders were fitted on, so an encoded
/// record can never carry a label the encoder has not seen.
pub trait Category: Copy + Eq + fmt::Debug + 'static {
    /// Column name of the field in the training data.
    const FIELD: &'static str;
    /// Every variant, in the order the page offers them.
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    /// Position of the variant within [`Category::ALL`].
    fn index(self) -> usize;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.label() == label)
    }
}

macro_rules! category {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl Category for $name {
            const FIELD: &'static str = $field;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            fn index(self) -> usize {
                self as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ApplicantError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::from_label(value.trim()).ok_or_else(|| ApplicantError::UnknownCategory {
                    field: $field,
                    value: value.to_string(),
                })
            }
        }
    };
}

category!(
    /// Applicant sex as recorded in the training data.
    Sex, "Sex", { Male => "male", Female => "female" }
);

category!(
    Housing, "Housing", { Own => "own", Free => "free", Rent => "rent" }
);

category!(
    /// Savings account balance bucket.
    SavingAccounts, "Saving accounts", {
        Little => "little",
        Moderate => "moderate",
        Rich => "rich",
        QuiteRich => "quite rich",
    }
);

category!(
    /// Checking account balance bucket.
    CheckingAccount, "Checking account", {
        Little => "little",
        Moderate => "moderate",
        Rich => "rich",
    }
);

pub const AGE_RANGE: RangeInclusive<u32> = 18..=80;
pub const JOB_RANGE: RangeInclusive<u32> = 0..=3;
pub const MIN_DURATION_MONTHS: u32 = 1;

/// The eight attributes describing one credit applicant.
///
/// Construct through [`ApplicantRecord::new`], [`ApplicantForm::parse`] or deserialization;
/// every path enforces the numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ApplicantSubmission")]
pub struct ApplicantRecord {
    pub age: u32,
    pub sex: Sex,
    pub job: u32,
    pub housing: Housing,
    pub saving_accounts: SavingAccounts,
    pub checking_account: CheckingAccount,
    pub duration: u32,
    pub credit_amount: u32,
}

impl ApplicantRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        age: u32,
        sex: Sex,
        job: u32,
        housing: Housing,
        saving_accounts: SavingAccounts,
        checking_account: CheckingAccount,
        duration: u32,
        credit_amount: u32,
    ) -> Result<Self, ApplicantError> {
        check_range("Age", age, &AGE_RANGE)?;
        check_range("Job", job, &JOB_RANGE)?;
        if duration < MIN_DURATION_MONTHS {
            return Err(ApplicantError::BelowMinimum {
                field: "Duration",
                value: i64::from(duration),
                min: i64::from(MIN_DURATION_MONTHS),
            });
        }

        Ok(Self {
            age,
            sex,
            job,
            housing,
            saving_accounts,
            checking_account,
            duration,
            credit_amount,
        })
    }
}

impl Default for ApplicantRecord {
    /// Values the form shows before the applicant edits anything.
    fn default() -> Self {
        Self {
            age: 30,
            sex: Sex::Male,
            job: 1,
            housing: Housing::Own,
            saving_accounts: SavingAccounts::Little,
            checking_account: CheckingAccount::Little,
            duration: 12,
            credit_amount: 100,
        }
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), ApplicantError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ApplicantError::OutOfRange {
            field,
            value: i64::from(value),
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// Typed wire shape accepted by the JSON API before bounds are checked.
#[derive(Debug, Clone, Deserialize)]
struct ApplicantSubmission {
    age: u32,
    sex: Sex,
    job: u32,
    housing: Housing,
    saving_accounts: SavingAccounts,
    checking_account: CheckingAccount,
    duration: u32,
    credit_amount: u32,
}

impl TryFrom<ApplicantSubmission> for ApplicantRecord {
    type Error = ApplicantError;

    fn try_from(value: ApplicantSubmission) -> Result<Self, Self::Error> {
        ApplicantRecord::new(
            value.age,
            value.sex,
            value.job,
            value.housing,
            value.saving_accounts,
            value.checking_account,
            value.duration,
            value.credit_amount,
        )
    }
}

/// Raw text values as posted by the page, kept verbatim so they can be echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantForm {
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub housing: String,
    #[serde(default)]
    pub saving_accounts: String,
    #[serde(default)]
    pub checking_account: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub credit_amount: String,
}

impl ApplicantForm {
    pub fn parse(&self) -> Result<ApplicantRecord, ApplicantError> {
        ApplicantRecord::new(
            parse_integer("Age", &self.age)?,
            self.sex.parse()?,
            parse_integer("Job", &self.job)?,
            self.housing.parse()?,
            self.saving_accounts.parse()?,
            self.checking_account.parse()?,
            parse_integer("Duration", &self.duration)?,
            parse_integer("Credit amount", &self.credit_amount)?,
        )
    }
}

impl From<&ApplicantRecord> for ApplicantForm {
    fn from(record: &ApplicantRecord) -> Self {
        Self {
            age: record.age.to_string(),
            sex: record.sex.label().to_string(),
            job: record.job.to_string(),
            housing: record.housing.label().to_string(),
            saving_accounts: record.saving_accounts.label().to_string(),
            checking_account: record.checking_account.label().to_string(),
            duration: record.duration.to_string(),
            credit_amount: record.credit_amount.to_string(),
        }
    }
}

impl Default for ApplicantForm {
    fn default() -> Self {
        Self::from(&ApplicantRecord::default())
    }
}

fn parse_integer(field: &'static str, raw: &str) -> Result<u32, ApplicantError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApplicantError::Missing { field });
    }

    let value: i64 = trimmed.parse().map_err(|_| ApplicantError::NotAnInteger {
        field,
        value: raw.to_string(),
    })?;

    if value < 0 {
        return Err(ApplicantError::BelowMinimum {
            field,
            value,
            min: 0,
        });
    }
    u32::try_from(value).map_err(|_| ApplicantError::TooLarge { field, value })
}

/// Rejection raised while turning raw input into an [`ApplicantRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplicantError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a whole number, got '{value}'")]
    NotAnInteger { field: &'static str, value: String },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        value: i64,
        min: i64,
    },
    #[error("{field} must not exceed {max}, got {value}", max = u32::MAX)]
    TooLarge { field: &'static str, value: i64 },
    #[error("'{value}' is not a known {field} category")]
    UnknownCategory { field: &'static str, value: String },
}
