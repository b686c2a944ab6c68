//! Server-rendered credit risk form.
//!
//! Every submission re-renders the whole page from the posted values, so the controls keep
//! what the applicant entered and the outcome appears underneath.

use credit_risk::risk::applicant::{AGE_RANGE, JOB_RANGE, MIN_DURATION_MONTHS};
use credit_risk::risk::{
    ApplicantForm, Category, CheckingAccount, Housing, RiskVerdict, SavingAccounts, Sex,
};
use std::fmt::Write;

pub(crate) const TITLE: &str = "CREDIT RISK PREDICTION";
pub(crate) const INTRO: &str =
    "Enter applicant information to predict if the credit risk is good or bad.";
pub(crate) const ACTION: &str = "Predict Risk";

/// What to show below the form after the action ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Verdict(RiskVerdict),
    Failure(String),
}

pub(crate) fn render(form: &ApplicantForm, outcome: Option<&Outcome>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(concat!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n",
        "<title>Credit Risk Prediction</title>\n<style>\n",
        "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\n",
        "label{display:block;margin-top:1rem;font-weight:600}\n",
        "input,select{width:100%;padding:.4rem;margin-top:.25rem}\n",
        "button{margin-top:1.5rem;padding:.5rem 1.25rem}\n",
        ".outcome{margin-top:1.5rem;padding:1rem;border-radius:.25rem}\n",
        ".success{background:#e6f4ea;color:#1e4620}\n",
        ".error{background:#fdecea;color:#611a15}\n",
        "</style>\n</head>\n<body>\n",
    ));
    let _ = writeln!(html, "<h1>{TITLE}</h1>\n<p>{INTRO}</p>");
    html.push_str("<form method=\"post\" action=\"/\">\n");

    number_input(
        &mut html,
        "age",
        "Age",
        &form.age,
        *AGE_RANGE.start(),
        Some(*AGE_RANGE.end()),
    );
    select::<Sex>(&mut html, "sex", "Sex", &form.sex);
    number_input(
        &mut html,
        "job",
        "Job (0-3)",
        &form.job,
        *JOB_RANGE.start(),
        Some(*JOB_RANGE.end()),
    );
    select::<Housing>(&mut html, "housing", "Housing", &form.housing);
    select::<SavingAccounts>(
        &mut html,
        "saving_accounts",
        "Saving Accounts",
        &form.saving_accounts,
    );
    select::<CheckingAccount>(
        &mut html,
        "checking_account",
        "Checking Accounts",
        &form.checking_account,
    );
    number_input(
        &mut html,
        "duration",
        "Duration (months)",
        &form.duration,
        MIN_DURATION_MONTHS,
        None,
    );
    number_input(
        &mut html,
        "credit_amount",
        "Credit Amount",
        &form.credit_amount,
        0,
        None,
    );

    let _ = writeln!(html, "<button type=\"submit\">{ACTION}</button>\n</form>");

    match outcome {
        Some(Outcome::Verdict(verdict)) => {
            let _ = writeln!(
                html,
                "<div class=\"outcome {}\" role=\"status\">Predicted Credit Risk is: <strong>{}</strong></div>",
                verdict.tone().css_class(),
                verdict.headline()
            );
        }
        Some(Outcome::Failure(reason)) => {
            let _ = writeln!(
                html,
                "<div class=\"outcome error\" role=\"alert\">Unable to predict credit risk: {}</div>",
                escape(reason)
            );
        }
        None => {}
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn number_input(
    html: &mut String,
    name: &str,
    label: &str,
    value: &str,
    min: u32,
    max: Option<u32>,
) {
    let _ = write!(
        html,
        "<label for=\"{name}\">{label}</label>\n<input type=\"number\" id=\"{name}\" name=\"{name}\" step=\"1\" min=\"{min}\""
    );
    if let Some(max) = max {
        let _ = write!(html, " max=\"{max}\"");
    }
    let _ = writeln!(html, " value=\"{}\" required>", escape(value));
}

fn select<C: Category>(html: &mut String, name: &str, label: &str, current: &str) {
    let _ = writeln!(
        html,
        "<label for=\"{name}\">{label}</label>\n<select id=\"{name}\" name=\"{name}\">"
    );
    for category in C::ALL {
        let option = category.label();
        let selected = if option == current { " selected" } else { "" };
        let _ = writeln!(html, "<option value=\"{option}\"{selected}>{option}</option>");
    }
    html.push_str("</select>\n");
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_lists_every_control() {
        let html = render(&ApplicantForm::default(), None);

        assert!(html.contains(TITLE));
        assert!(html.contains(INTRO));
        for label in [
            "Age",
            "Sex",
            "Job (0-3)",
            "Housing",
            "Saving Accounts",
            "Checking Accounts",
            "Duration (months)",
            "Credit Amount",
        ] {
            assert!(html.contains(&format!(">{label}</label>")), "{label} rendered");
        }
        assert!(html.contains("min=\"18\" max=\"80\" value=\"30\""));
        assert!(html.contains("<option value=\"quite rich\">quite rich</option>"));
        assert!(html.contains("<option value=\"male\" selected>male</option>"));
        assert!(!html.contains("class=\"outcome"));
    }

    #[test]
    fn submitted_values_stay_in_their_controls() {
        let form = ApplicantForm {
            age: "44".to_string(),
            housing: "rent".to_string(),
            ..ApplicantForm::default()
        };
        let html = render(&form, None);

        assert!(html.contains("value=\"44\""));
        assert!(html.contains("<option value=\"rent\" selected>rent</option>"));
        assert!(html.contains("<option value=\"own\">own</option>"));
    }

    #[test]
    fn verdicts_use_distinct_styling() {
        let good = render(
            &ApplicantForm::default(),
            Some(&Outcome::Verdict(RiskVerdict::Good)),
        );
        assert!(good.contains(
            "<div class=\"outcome success\" role=\"status\">Predicted Credit Risk is: <strong>GOOD</strong></div>"
        ));

        let bad = render(
            &ApplicantForm::default(),
            Some(&Outcome::Verdict(RiskVerdict::Bad)),
        );
        assert!(bad.contains("outcome error"));
        assert!(bad.contains("<strong>BAD</strong>"));
        assert!(!bad.contains("GOOD"));
    }

    #[test]
    fn posted_text_is_escaped() {
        let form = ApplicantForm {
            age: "\"><script>alert(1)</script>".to_string(),
            ..ApplicantForm::default()
        };
        let html = render(
            &form,
            Some(&Outcome::Failure("'<b>' is not a known Sex category".to_string())),
        );

        assert!(!html.contains("<script>"));
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;"));
        assert!(html.contains("&#39;&lt;b&gt;&#39; is not a known Sex category"));
    }
}
