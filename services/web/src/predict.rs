use crate::cli::ArtifactArgs;
use crate::infra::{artifact_directory, load_predictor};
use clap::Args;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::risk::{
    ApplicantRecord, CheckingAccount, Housing, Prediction, PredictionView, RiskPredictor,
    SavingAccounts, Sex,
};

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Applicant age in years (18-80)
    #[arg(long, default_value_t = 30)]
    pub(crate) age: u32,
    /// male or female
    #[arg(long, default_value_t = Sex::Male)]
    pub(crate) sex: Sex,
    /// Job skill level (0-3)
    #[arg(long, default_value_t = 1)]
    pub(crate) job: u32,
    /// own, free or rent
    #[arg(long, default_value_t = Housing::Own)]
    pub(crate) housing: Housing,
    /// little, moderate, rich or "quite rich"
    #[arg(long, default_value_t = SavingAccounts::Little)]
    pub(crate) saving_accounts: SavingAccounts,
    /// little, moderate or rich
    #[arg(long, default_value_t = CheckingAccount::Little)]
    pub(crate) checking_account: CheckingAccount,
    /// Loan duration in months
    #[arg(long, default_value_t = 12)]
    pub(crate) duration: u32,
    /// Requested credit amount
    #[arg(long, default_value_t = 100)]
    pub(crate) credit_amount: u32,
    /// Print the verdict and encoded features as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

impl PredictArgs {
    fn record(&self) -> Result<ApplicantRecord, AppError> {
        let record = ApplicantRecord::new(
            self.age,
            self.sex,
            self.job,
            self.housing,
            self.saving_accounts,
            self.checking_account,
            self.duration,
            self.credit_amount,
        )?;
        Ok(record)
    }
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let record = args.record()?;
    let predictor = load_predictor(artifact_directory(args.artifacts.clone(), &config.artifacts))?;

    let prediction = predict_one(&predictor, &record)?;
    if args.json {
        let view = PredictionView::from(prediction);
        let rendered = serde_json::to_string_pretty(&view).map_err(std::io::Error::other)?;
        println!("{rendered}");
    } else {
        println!("{}", prediction.verdict.message());
        for (column, value) in prediction.features.columns() {
            println!("  - {column}: {value}");
        }
    }

    Ok(())
}

fn predict_one(predictor: &RiskPredictor, record: &ApplicantRecord) -> Result<Prediction, AppError> {
    Ok(predictor.predict(record)?)
}
