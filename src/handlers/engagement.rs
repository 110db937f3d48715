//! Reader engagement endpoints: the contact form, newsletter sign-up and
//! real-user-monitoring (Web Vitals) collection.
//!
//! All three are public and write-only. Delivery to an email or newsletter
//! provider happens elsewhere; these handlers only validate and store.

use axum::{Json, extract::State, http::StatusCode};

use super::require_text;
use crate::{
    AppState,
    error::AppError,
    models::{ContactRequest, NewsletterSubscribeRequest, RumMetricRequest, is_valid_email},
};

pub const MAX_CONTACT_NAME_CHARS: usize = 100;
pub const MAX_CONTACT_SUBJECT_CHARS: usize = 200;
pub const MAX_CONTACT_MESSAGE_CHARS: usize = 5000;
pub const MAX_RUM_PATH_CHARS: usize = 2048;

/// Web Vitals metric names accepted by `POST /rum`.
pub const RUM_METRICS: &[&str] = &["CLS", "FCP", "FID", "INP", "LCP", "TTFB"];
const RUM_RATINGS: &[&str] = &["good", "needs-improvement", "poor"];

fn within(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        Err(AppError::BadRequest(format!("{field} must be at most {max} characters")))
    } else {
        Ok(())
    }
}

fn normalized_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(AppError::BadRequest("invalid email address".to_string()))
    }
}

/// submit_contact
///
/// [Public Route] Validates and stores a contact-form submission.
#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactRequest,
    responses(
        (status = 202, description = "Message received"),
        (status = 400, description = "Missing or invalid field")
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<StatusCode, AppError> {
    let email = normalized_email(&payload.email)?;
    let name = require_text("name", &payload.name)?;
    within("name", &name, MAX_CONTACT_NAME_CHARS)?;
    let message = require_text("message", &payload.message)?;
    within("message", &message, MAX_CONTACT_MESSAGE_CHARS)?;

    let subject = payload
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    if let Some(subject) = &subject {
        within("subject", subject, MAX_CONTACT_SUBJECT_CHARS)?;
    }

    let stored = state
        .repo
        .create_contact_message(ContactRequest {
            name,
            email,
            subject,
            message,
        })
        .await?;

    tracing::info!(message_id = stored.id, "contact message received");
    Ok(StatusCode::ACCEPTED)
}

/// subscribe_newsletter
///
/// [Public Route] Adds an address to the newsletter list. Subscribing twice is
/// not an error: 201 for a new address, 200 when it was already on the list.
#[utoipa::path(
    post,
    path = "/newsletter",
    request_body = NewsletterSubscribeRequest,
    responses(
        (status = 201, description = "Subscribed"),
        (status = 200, description = "Already subscribed"),
        (status = 400, description = "Invalid email address")
    )
)]
pub async fn subscribe_newsletter(
    State(state): State<AppState>,
    Json(payload): Json<NewsletterSubscribeRequest>,
) -> Result<StatusCode, AppError> {
    let email = normalized_email(&payload.email)?;

    if state.repo.subscribe_newsletter(&email).await? {
        tracing::info!("newsletter subscription added");
        Ok(StatusCode::CREATED)
    } else {
        Ok(StatusCode::OK)
    }
}

/// record_rum_metric
///
/// [Public Route] Stores one Web Vitals sample. Metric names are matched
/// case-insensitively and stored upper-case.
#[utoipa::path(
    post,
    path = "/rum",
    request_body = RumMetricRequest,
    responses(
        (status = 202, description = "Sample stored"),
        (status = 400, description = "Unknown metric or invalid value")
    )
)]
pub async fn record_rum_metric(
    State(state): State<AppState>,
    Json(mut payload): Json<RumMetricRequest>,
) -> Result<StatusCode, AppError> {
    payload.name = payload.name.trim().to_uppercase();
    if !RUM_METRICS.contains(&payload.name.as_str()) {
        return Err(AppError::BadRequest(format!("unknown metric {}", payload.name)));
    }
    if !payload.value.is_finite() || payload.value < 0.0 {
        return Err(AppError::BadRequest(
            "value must be a non-negative number".to_string(),
        ));
    }

    payload.path = payload.path.trim().to_string();
    if !payload.path.starts_with('/') {
        return Err(AppError::BadRequest("path must start with /".to_string()));
    }
    within("path", &payload.path, MAX_RUM_PATH_CHARS)?;

    payload.rating = payload.rating.map(|r| r.trim().to_lowercase());
    if let Some(rating) = &payload.rating {
        if !RUM_RATINGS.contains(&rating.as_str()) {
            return Err(AppError::BadRequest(format!("unknown rating {rating}")));
        }
    }

    state.repo.record_rum_metric(payload).await?;
    Ok(StatusCode::ACCEPTED)
}
