use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[6-9]\d{9}$").expect("PHONE_REGEX is a valid regex pattern")
});

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Please fill all required fields"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Please fill all required fields"))]
    pub last_name: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Please fill all required fields"))]
    pub password: String,

    #[validate(regex(
        path = *PHONE_REGEX,
        message = "Please enter a valid 10-digit Indian phone number"
    ))]
    pub phone_number: String,

    pub birthdate: Option<NaiveDate>,

    // Already-hosted picture URL; this server does not accept uploads
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email & password required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Email & password required"))]
    pub password: String,
}

/// Body of the answer route. Exactly one of the two shapes is legal: a
/// selected value, or `timedOut: true` with no selection counted.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = selected_or_timed_out))]
pub struct AnswerRequest {
    #[serde(default)]
    pub selected: Option<f64>,

    #[serde(default)]
    pub timed_out: bool,
}

fn selected_or_timed_out(request: &AnswerRequest) -> Result<(), ValidationError> {
    if request.selected.is_none() && !request.timed_out {
        let mut error = ValidationError::new("selected");
        error.message = Some("Selected answer required unless timed out".into());
        return Err(error);
    }
    Ok(())
}
