use chrono::{DateTime, Datelike, Timelike, Utc};
use thiserror::Error;

use super::models::{NewSubscription, Subscription, SubscriptionDraft};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("service_name is required")]
    MissingServiceName,
    #[error("price must be greater than 0")]
    NonPositivePrice,
    #[error("user_id is required")]
    MissingUserId,
    #[error("start_date is required")]
    MissingStartDate,
    #[error("end_date is required")]
    MissingEndDate,
    #[error("end_date must be after start_date")]
    EndNotAfterStart,
    #[error("id is required for update")]
    MissingId,
}

impl ValidationError {
    /// Short name of the violated rule, stable across message wording.
    pub fn rule(&self) -> &'static str {
        match self {
            ValidationError::MissingServiceName => "service_name_required",
            ValidationError::NonPositivePrice => "price_positive",
            ValidationError::MissingUserId => "user_id_required",
            ValidationError::MissingStartDate => "start_date_required",
            ValidationError::MissingEndDate => "end_date_required",
            ValidationError::EndNotAfterStart => "end_after_start",
            ValidationError::MissingId => "id_required",
        }
    }
}

// key: subs-validation -> create
pub fn validate_for_create(draft: &SubscriptionDraft) -> Result<NewSubscription, ValidationError> {
    let (start_date, end_date) = check_fields(draft)?;
    Ok(NewSubscription {
        service_name: draft.service_name.clone(),
        price: draft.price,
        user_id: draft.user_id.clone(),
        start_date,
        end_date,
    })
}

// key: subs-validation -> update
/// Runs the create checks first, then requires a non-zero id.
pub fn validate_for_update(
    id: Option<i64>,
    draft: &SubscriptionDraft,
) -> Result<Subscription, ValidationError> {
    let record = validate_for_create(draft)?;
    match id {
        Some(id) if id > 0 => Ok(record.with_id(id)),
        _ => Err(ValidationError::MissingId),
    }
}

fn check_fields(
    draft: &SubscriptionDraft,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
    if draft.service_name.is_empty() {
        return Err(ValidationError::MissingServiceName);
    }
    if draft.price <= 0 {
        return Err(ValidationError::NonPositivePrice);
    }
    if draft.user_id.is_empty() {
        return Err(ValidationError::MissingUserId);
    }
    let start_date = draft
        .start_date
        .filter(|date| !is_zero_time(date))
        .ok_or(ValidationError::MissingStartDate)?;
    let end_date = draft
        .end_date
        .filter(|date| !is_zero_time(date))
        .ok_or(ValidationError::MissingEndDate)?;
    if end_date <= start_date {
        return Err(ValidationError::EndNotAfterStart);
    }
    Ok((start_date, end_date))
}

/// `0001-01-01T00:00:00Z` is what zero-valued clients send for an unset date.
fn is_zero_time(date: &DateTime<Utc>) -> bool {
    date.year() == 1
        && date.ordinal() == 1
        && date.num_seconds_from_midnight() == 0
        && date.nanosecond() == 0
}
