use crate::cli::ArtifactArgs;
use crate::infra::{artifact_directory, load_predictor};
use clap::Args;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::risk::{ApplicantForm, RiskPredictor, RiskVerdict};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with Age, Sex, Job, Housing, Saving accounts, Checking account, Duration and
    /// Credit amount columns
    #[arg(long)]
    pub(crate) input: PathBuf,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

/// One CSV row using the training data's column headers. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct BatchRow {
    #[serde(rename = "Age")]
    age: String,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Job")]
    job: String,
    #[serde(rename = "Housing")]
    housing: String,
    #[serde(rename = "Saving accounts")]
    saving_accounts: String,
    #[serde(rename = "Checking account")]
    checking_account: String,
    #[serde(rename = "Duration")]
    duration: String,
    #[serde(rename = "Credit amount")]
    credit_amount: String,
}

impl From<BatchRow> for ApplicantForm {
    fn from(row: BatchRow) -> Self {
        Self {
            age: row.age,
            sex: row.sex,
            job: row.job,
            housing: row.housing,
            saving_accounts: row.saving_accounts,
            checking_account: row.checking_account,
            duration: row.duration,
            credit_amount: row.credit_amount,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    pub(crate) good: usize,
    pub(crate) bad: usize,
    pub(crate) rejected: usize,
}

pub(crate) fn run_batch_command(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let predictor = load_predictor(artifact_directory(args.artifacts, &config.artifacts))?;
    let input = File::open(&args.input)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Credit risk batch: {}", args.input.display())?;
    let summary = run_batch(input, &predictor, &mut out)?;
    writeln!(
        out,
        "\n{} good | {} bad | {} rejected",
        summary.good, summary.bad, summary.rejected
    )?;

    Ok(())
}

/// Score every row, reporting rejected rows without stopping the batch.
pub(crate) fn run_batch<R: Read, W: Write>(
    input: R,
    predictor: &RiskPredictor,
    out: &mut W,
) -> Result<BatchSummary, AppError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let mut summary = BatchSummary::default();

    for (index, row) in reader.deserialize::<BatchRow>().enumerate() {
        let row_number = index + 1;
        let outcome = row
            .map_err(|err| err.to_string())
            .and_then(|row| ApplicantForm::from(row).parse().map_err(|err| err.to_string()))
            .and_then(|record| predictor.predict(&record).map_err(|err| err.to_string()));

        match outcome {
            Ok(prediction) => {
                match prediction.verdict {
                    RiskVerdict::Good => summary.good += 1,
                    RiskVerdict::Bad => summary.bad += 1,
                }
                writeln!(out, "- row {row_number}: {}", prediction.verdict.headline())?;
            }
            Err(reason) => {
                warn!(row = row_number, %reason, "batch row rejected");
                summary.rejected += 1;
                writeln!(out, "- row {row_number}: rejected ({reason})")?;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::testing::predictor;

    const HEADER: &str =
        "Age,Sex,Job,Housing,Saving accounts,Checking account,Credit amount,Duration,Purpose";

    fn score(rows: &[&str]) -> (BatchSummary, String) {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        let mut out = Vec::new();
        let summary =
            run_batch(csv.as_bytes(), &predictor(), &mut out).expect("batch completes");
        (summary, String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn scores_rows_in_file_order() {
        let (summary, output) = score(&[
            "30,male,1,own,little,little,100,12,car",
            "30,male,1,own,little,little,9000,48,business",
        ]);

        assert_eq!(
            summary,
            BatchSummary {
                good: 1,
                bad: 1,
                rejected: 0
            }
        );
        assert_eq!(output, "- row 1: GOOD\n- row 2: BAD\n");
    }

    #[test]
    fn rejected_rows_are_counted_and_skipped() {
        let (summary, output) = score(&[
            "67,male,2,own,NA,little,1169,6,radio/TV",
            "17,female,2,own,little,moderate,5951,48,radio/TV",
            "45, female ,2,free,quite rich,moderate,2100,12,education",
        ]);

        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.good + summary.bad, 1);
        assert!(output.contains("row 1: rejected ('NA' is not a known Saving accounts category)"));
        assert!(output.contains("row 2: rejected (Age must be between 18 and 80, got 17)"));
    }

    #[test]
    fn missing_columns_reject_each_row() {
        let mut out = Vec::new();
        let summary = run_batch(
            "Age,Sex\n30,male\n".as_bytes(),
            &predictor(),
            &mut out,
        )
        .expect("batch completes");

        assert_eq!(summary.rejected, 1);
    }
}
