//! Interactive applicant form using dialoguer

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::pipeline::ApplicantRecord;

pub const HOME_OWNERSHIP_OPTIONS: [&str; 4] = ["RENT", "OWN", "MORTGAGE", "OTHER"];
pub const LOAN_INTENT_OPTIONS: [&str; 6] = [
    "PERSONAL",
    "EDUCATION",
    "MEDICAL",
    "VENTURE",
    "HOMEIMPROVEMENT",
    "DEBTCONSOLIDATION",
];
pub const LOAN_GRADE_OPTIONS: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];
pub const PRIOR_DEFAULT_OPTIONS: [&str; 2] = ["N", "Y"];

/// Ask for a number in `[min, max]`; empty input falls back to `default`
fn prompt_number(theme: &ColorfulTheme, label: &str, min: f64, max: f64, default: f64) -> Result<f64> {
    let value: f64 = Input::with_theme(theme)
        .with_prompt(label)
        .default(default)
        .validate_with(|v: &f64| {
            if (min..=max).contains(v) {
                Ok(())
            } else {
                Err(format!("enter a value between {} and {}", min, max))
            }
        })
        .interact_text()?;
    Ok(value)
}

fn prompt_choice(theme: &ColorfulTheme, label: &str, options: &[&str], current: Option<&str>) -> Result<String> {
    let default = current
        .and_then(|c| options.iter().position(|o| o.eq_ignore_ascii_case(c)))
        .unwrap_or(0);
    let index = Select::with_theme(theme)
        .with_prompt(label)
        .items(options)
        .default(default)
        .interact()?;
    Ok(options[index].to_string())
}

/// Collect an applicant's details, pre-filled from `initial` where set
pub fn prompt_applicant(initial: &ApplicantRecord) -> Result<ApplicantRecord> {
    let theme = ColorfulTheme::default();

    Ok(ApplicantRecord {
        age: Some(prompt_number(&theme, "Age", 18.0, 100.0, initial.age.unwrap_or(30.0))?),
        income: Some(prompt_number(
            &theme,
            "Annual income ($)",
            0.0,
            1_000_000.0,
            initial.income.unwrap_or(50_000.0),
        )?),
        home_ownership: Some(prompt_choice(
            &theme,
            "Home ownership",
            &HOME_OWNERSHIP_OPTIONS,
            initial.home_ownership.as_deref(),
        )?),
        employment_length: Some(prompt_number(
            &theme,
            "Employment length (years)",
            0.0,
            50.0,
            initial.employment_length.unwrap_or(5.0),
        )?),
        loan_intent: Some(prompt_choice(
            &theme,
            "Loan intent",
            &LOAN_INTENT_OPTIONS,
            initial.loan_intent.as_deref(),
        )?),
        loan_grade: Some(prompt_choice(
            &theme,
            "Loan grade",
            &LOAN_GRADE_OPTIONS,
            initial.loan_grade.as_deref(),
        )?),
        loan_amount: Some(prompt_number(
            &theme,
            "Loan amount ($)",
            0.0,
            500_000.0,
            initial.loan_amount.unwrap_or(10_000.0),
        )?),
        interest_rate: Some(prompt_number(
            &theme,
            "Interest rate (%)",
            0.0,
            30.0,
            initial.interest_rate.unwrap_or(10.0),
        )?),
        prior_default: Some(prompt_choice(
            &theme,
            "Historical default?",
            &PRIOR_DEFAULT_OPTIONS,
            initial.prior_default.as_deref(),
        )?),
        credit_history_length: Some(prompt_number(
            &theme,
            "Credit history length (years)",
            0.0,
            50.0,
            initial.credit_history_length.unwrap_or(5.0),
        )?),
    })
}
