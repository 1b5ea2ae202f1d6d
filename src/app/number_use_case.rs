use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::ports::GroupApiPort;
use crate::constants::COUNTRY_CODE;
use crate::error::{Result, ValidationError};
use crate::types::{Location, NumberAdditionPayload};

static MOBILE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("mobile number pattern is valid"));

/// Checks a ten-digit Indian mobile number, reporting the first rule it breaks.
pub fn validate_mobile_number(number: &str) -> std::result::Result<(), ValidationError> {
    if number.is_empty() {
        return Err(ValidationError::InvalidNumber("Mobile number is required"));
    }
    if !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidNumber("Only digits are allowed"));
    }
    if number.len() != 10 {
        return Err(ValidationError::InvalidNumber("Must be exactly 10 digits"));
    }
    if !MOBILE_NUMBER.is_match(number) {
        return Err(ValidationError::InvalidNumber("Must start with 6-9"));
    }
    Ok(())
}

/// Result of an add-number request that reached the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionOutcome {
    Added { number: u64 },
    /// The backend answered but did not add the number.
    Rejected { reply: Value },
}

/// A reply counts as accepted unless it carries a falsy `status` field.
fn reply_accepted(reply: &Value) -> bool {
    match reply.get("status") {
        None => true,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty() && !s.eq_ignore_ascii_case("false"),
        Some(Value::Null) => false,
        Some(_) => true,
    }
}

pub struct NumberAdditionUseCase {
    api: Arc<dyn GroupApiPort>,
}

impl NumberAdditionUseCase {
    pub fn new(api: Arc<dyn GroupApiPort>) -> Self {
        Self { api }
    }

    pub fn build_payload(
        location: &Location,
        number: &str,
    ) -> std::result::Result<NumberAdditionPayload, ValidationError> {
        if !location.is_complete() {
            return Err(ValidationError::MissingLocation);
        }
        let number = number.trim();
        validate_mobile_number(number)?;
        let full_number = format!("{COUNTRY_CODE}{number}")
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidNumber("Only digits are allowed"))?;

        let location = location.lowercased();
        Ok(NumberAdditionPayload {
            district: location.district,
            block: location.block,
            number: full_number,
        })
    }

    /// Adds one number to every group of the district/block.
    pub async fn add(&self, location: &Location, number: &str) -> Result<AdditionOutcome> {
        let payload = Self::build_payload(location, number)?;
        let reply = self.api.add_number(&payload).await?;

        if reply_accepted(&reply) {
            info!(
                district = %payload.district,
                block = %payload.block,
                "Number added to groups"
            );
            Ok(AdditionOutcome::Added {
                number: payload.number,
            })
        } else {
            warn!(reply = %reply, "Backend declined number addition");
            Ok(AdditionOutcome::Rejected { reply })
        }
    }

    /// Progress of earlier additions for a district/block, as reported by the backend.
    pub async fn status(&self, location: &Location) -> Result<Value> {
        if !location.is_complete() {
            return Err(ValidationError::MissingLocation.into());
        }
        Ok(self.api.addition_status(&location.lowercased()).await?)
    }
}
