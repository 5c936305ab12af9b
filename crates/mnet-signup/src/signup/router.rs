use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use super::error::FailureKind;
use super::input::SignupFields;
use super::service::SignupService;
use crate::batch::{self, BatchSummary};
use crate::error::AppError;
use crate::transport::Transport;

/// Router builder exposing the single and batch signup endpoints.
pub fn signup_router<T>(service: Arc<SignupService<T>>) -> Router
where
    T: Transport + 'static,
{
    Router::new()
        .route("/signup", post(signup_handler::<T>))
        .route(
            "/batch-signup",
            post(batch_signup_handler::<T>).layer(DefaultBodyLimit::disable()),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub struct BatchSignupResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub summary: BatchSummary,
}

pub(crate) async fn signup_handler<T>(
    State(service): State<Arc<SignupService<T>>>,
    payload: Result<Json<SignupFields>, JsonRejection>,
) -> Result<Json<Value>, AppError>
where
    T: Transport + 'static,
{
    let Json(fields) = payload.map_err(|rejection| {
        AppError::Rejected(format!("invalid JSON body: {}", rejection.body_text()))
    })?;
    validate_boundary(&fields).map_err(AppError::Rejected)?;

    service.signup(fields).await.map_err(|err| {
        if err.kind() != FailureKind::InvalidInput {
            error!(error = %err, "signup failed");
        }
        AppError::Signup(err)
    })?;

    Ok(Json(json!({ "ok": true })))
}

pub(crate) async fn batch_signup_handler<T>(
    State(service): State<Arc<SignupService<T>>>,
    mut multipart: Multipart,
) -> Result<Json<BatchSignupResponse>, AppError>
where
    T: Transport + 'static,
{
    let mut upload: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Rejected(format!("multipart error: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let is_csv = field
            .file_name()
            .map(|name| name.to_ascii_lowercase().ends_with(".csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(AppError::Rejected("Please upload a CSV file.".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::Rejected(format!("multipart error: {err}")))?;
        upload = Some(bytes.to_vec());
    }

    let bytes =
        upload.ok_or_else(|| AppError::Rejected("CSV file required as 'file'".to_string()))?;
    let content = String::from_utf8_lossy(&bytes);
    let rows = batch::parse_rows(content.as_bytes())?;

    let summary = service.run_batch(rows, service.defaults()).await;
    Ok(Json(BatchSignupResponse { ok: true, summary }))
}

/// Checks the core leaves to callers: email shape and a plausible birth year.
fn validate_boundary(fields: &SignupFields) -> Result<(), String> {
    if !fields.has_credentials() {
        return Err("email & password required".to_string());
    }

    if let Some(email) = fields.email() {
        if !is_plausible_email(email) {
            return Err(format!("'{email}' is not a valid email address"));
        }
    }

    if let Some(year) = fields
        .birth_year
        .as_deref()
        .map(str::trim)
        .filter(|year| !year.is_empty())
    {
        let current = Utc::now().year();
        match year.parse::<i32>() {
            Ok(parsed) if (1900..=current).contains(&parsed) => {}
            _ => return Err(format!("birth_year must be a year between 1900 and {current}")),
        }
    }

    Ok(())
}

pub(crate) fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}
