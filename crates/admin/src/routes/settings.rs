//! Settings route handlers.

use axum::{Form, Json, extract::State};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::CurrentShop;
use crate::models::{Settings, SettingsView};
use crate::state::AppState;

/// Form body for saving settings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    pub warning_period: String,
}

/// Current settings, with the default warning period if none are saved.
///
/// # Errors
///
/// Returns 500 on a storage failure.
pub async fn show(
    State(state): State<AppState>,
    CurrentShop(shop): CurrentShop,
) -> Result<Json<SettingsView>, AppError> {
    Ok(Json(state.settings().get(&shop).await?))
}

/// Save the warning period.
///
/// # Errors
///
/// Returns 400 if `warningPeriod` is not a positive integer.
pub async fn save(
    State(state): State<AppState>,
    CurrentShop(shop): CurrentShop,
    Form(form): Form<SettingsForm>,
) -> Result<Json<Settings>, AppError> {
    let warning_period: i32 = form.warning_period.trim().parse().map_err(|_| {
        AppError::BadRequest(format!(
            "warningPeriod must be a whole number of days (got {:?})",
            form.warning_period
        ))
    })?;

    let settings = state.settings().save(&shop, warning_period).await?;
    Ok(Json(settings))
}
