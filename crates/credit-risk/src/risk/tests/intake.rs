use crate::risk::applicant::{
    ApplicantError, ApplicantForm, ApplicantRecord, CheckingAccount, Housing, SavingAccounts, Sex,
};

fn form() -> ApplicantForm {
    ApplicantForm::default()
}

#[test]
fn default_form_matches_default_applicant() {
    let form = form();
    assert_eq!(form.age, "30");
    assert_eq!(form.sex, "male");
    assert_eq!(form.saving_accounts, "little");
    assert_eq!(form.parse(), Ok(ApplicantRecord::default()));
}

#[test]
fn age_bounds_are_inclusive() {
    for age in ["18", "80"] {
        let form = ApplicantForm {
            age: age.to_string(),
            ..form()
        };
        assert!(form.parse().is_ok(), "age {age} accepted");
    }

    for age in ["17", "81"] {
        let form = ApplicantForm {
            age: age.to_string(),
            ..form()
        };
        assert!(
            matches!(
                form.parse(),
                Err(ApplicantError::OutOfRange { field: "Age", min: 18, max: 80, .. })
            ),
            "age {age} rejected"
        );
    }
}

#[test]
fn job_duration_and_amount_bounds_are_enforced() {
    let job = ApplicantForm {
        job: "4".to_string(),
        ..form()
    };
    assert!(matches!(
        job.parse(),
        Err(ApplicantError::OutOfRange { field: "Job", .. })
    ));

    let duration = ApplicantForm {
        duration: "0".to_string(),
        ..form()
    };
    assert!(matches!(
        duration.parse(),
        Err(ApplicantError::BelowMinimum { field: "Duration", min: 1, .. })
    ));

    let amount = ApplicantForm {
        credit_amount: "-250".to_string(),
        ..form()
    };
    assert_eq!(
        amount.parse(),
        Err(ApplicantError::BelowMinimum {
            field: "Credit amount",
            value: -250,
            min: 0,
        })
    );

    let zero = ApplicantForm {
        credit_amount: "0".to_string(),
        ..form()
    };
    assert_eq!(zero.parse().map(|record| record.credit_amount), Ok(0));
}

#[test]
fn non_numeric_and_missing_values_are_rejected() {
    let fractional = ApplicantForm {
        age: "30.5".to_string(),
        ..form()
    };
    assert!(matches!(
        fractional.parse(),
        Err(ApplicantError::NotAnInteger { field: "Age", .. })
    ));

    let blank = ApplicantForm {
        duration: "  ".to_string(),
        ..form()
    };
    assert_eq!(
        blank.parse(),
        Err(ApplicantError::Missing { field: "Duration" })
    );

    let huge = ApplicantForm {
        credit_amount: "99999999999".to_string(),
        ..form()
    };
    assert!(matches!(
        huge.parse(),
        Err(ApplicantError::TooLarge { field: "Credit amount", .. })
    ));
}

#[test]
fn unknown_category_is_rejected_before_encoding() {
    let form = ApplicantForm {
        sex: "other".to_string(),
        ..form()
    };
    let err = form.parse().expect_err("sex must be a known category");

    assert_eq!(
        err,
        ApplicantError::UnknownCategory {
            field: "Sex",
            value: "other".to_string(),
        }
    );
    assert_eq!(err.to_string(), "'other' is not a known Sex category");
}

#[test]
fn category_labels_parse_including_spaces() {
    assert_eq!(
        "quite rich".parse::<SavingAccounts>(),
        Ok(SavingAccounts::QuiteRich)
    );
    assert_eq!(" rent ".parse::<Housing>(), Ok(Housing::Rent));
    assert_eq!("female".parse::<Sex>(), Ok(Sex::Female));
    assert!("Rich".parse::<CheckingAccount>().is_err());
}

#[test]
fn json_submissions_are_bounded_like_the_form() {
    let record: ApplicantRecord = serde_json::from_str(
        r#"{"age":80,"sex":"female","job":0,"housing":"free","saving_accounts":"quite rich",
            "checking_account":"rich","duration":6,"credit_amount":1500}"#,
    )
    .expect("valid submission");
    assert_eq!(record.saving_accounts, SavingAccounts::QuiteRich);
    assert_eq!(record.housing, Housing::Free);

    let err = serde_json::from_str::<ApplicantRecord>(
        r#"{"age":81,"sex":"female","job":0,"housing":"free","saving_accounts":"little",
            "checking_account":"rich","duration":6,"credit_amount":1500}"#,
    )
    .expect_err("age out of range");
    assert!(err.to_string().contains("Age must be between 18 and 80"));
}

#[test]
fn records_round_trip_through_the_form_shape() {
    let record = ApplicantRecord::new(
        52,
        Sex::Female,
        3,
        Housing::Rent,
        SavingAccounts::Rich,
        CheckingAccount::Moderate,
        48,
        7_200,
    )
    .expect("valid applicant");

    assert_eq!(ApplicantForm::from(&record).parse(), Ok(record));
}
