//! Lead capture forms.
//!
//! Submissions are validated and logged. Nothing is stored and no email is
//! sent; delivery belongs to an external mail service.

use axum::Json;
use validator::Validate;

use crate::api::{
    dto::{ContactRequest, ErrorResponse, MessageResponse, NewsletterRequest},
    error::{ApiError, AppJson},
};

#[utoipa::path(
    post,
    path = "/contact",
    tag = "forms",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Submission accepted", body = MessageResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse)
    )
)]
pub async fn submit_contact(
    AppJson(req): AppJson<ContactRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate()?;

    tracing::info!(
        contact_name = req.name.as_deref().unwrap_or_default(),
        email = req.email.as_deref().unwrap_or_default(),
        company = req.company.as_deref().unwrap_or("-"),
        phone = req.phone.as_deref().unwrap_or("-"),
        service = req.service.as_deref().unwrap_or("-"),
        body = req.message.as_deref().unwrap_or_default(),
        "Contact form submission"
    );

    Ok(Json(MessageResponse::new(
        "Thank you for your message! We'll get back to you soon.",
    )))
}

#[utoipa::path(
    post,
    path = "/newsletter",
    tag = "forms",
    request_body = NewsletterRequest,
    responses(
        (status = 200, description = "Subscription accepted", body = MessageResponse),
        (status = 400, description = "Missing or invalid email", body = ErrorResponse)
    )
)]
pub async fn subscribe_newsletter(
    AppJson(req): AppJson<NewsletterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate()?;

    tracing::info!(
        email = req.email.as_deref().unwrap_or_default(),
        "Newsletter subscription"
    );

    Ok(Json(MessageResponse::new(
        "Successfully subscribed to the newsletter",
    )))
}
