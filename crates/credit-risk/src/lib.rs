//! Credit risk classification for single applicant records.
//!
//! The crate loads a boosted-tree classifier and four categorical label encoders from a local
//! artifact directory, encodes an [`risk::ApplicantRecord`] into the fixed training column order
//! and turns the classifier output into a [`risk::RiskVerdict`].

pub mod config;
pub mod error;
pub mod risk;
pub mod telemetry;
