use axum::extract::{FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::models::warning::{Warning, WarningType};

const DEFAULT_HISTORY_DAYS: i64 = 7;
// Upper bound keeps the cutoff arithmetic in range; chrono's Duration
// overflows far below i64::MAX days.
const MAX_HISTORY_DAYS: i64 = 3650;

/// Authenticated user id, injected by the fronting session layer as the
/// `x-user-id` header. Session validity is that layer's problem; an
/// absent or empty header is rejected here.
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| AuthUser(v.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = state.store.ping().await.is_ok();
    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

pub async fn active_warnings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Warning>>> {
    let warnings = state.store.get_active_warnings(Some(&user_id)).await?;
    Ok(Json(warnings))
}

#[derive(Deserialize)]
pub struct HistoricalParams {
    // Kept as a string so a bad value is a 400, not a deserialization reject.
    days: Option<String>,
}

pub async fn historical_warnings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<HistoricalParams>,
) -> ApiResult<Json<Vec<Warning>>> {
    let days = match params.days.as_deref() {
        None => DEFAULT_HISTORY_DAYS,
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|d| (1..=MAX_HISTORY_DAYS).contains(d))
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "days must be an integer between 1 and {MAX_HISTORY_DAYS}"
                ))
            })?,
    };
    let warnings = state
        .store
        .get_historical_warnings(days, Some(&user_id))
        .await?;
    Ok(Json(warnings))
}

#[derive(Serialize)]
pub struct PreferenceResponse {
    pub user_id: String,
    pub warning_types: Vec<WarningType>,
}

pub async fn get_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<PreferenceResponse>> {
    let warning_types = state
        .store
        .get_preferences(&user_id)
        .await?
        .map(|p| p.warning_types)
        .unwrap_or_default();
    Ok(Json(PreferenceResponse {
        user_id,
        warning_types,
    }))
}

#[derive(Deserialize)]
pub struct UpdatePreferencesRequest {
    // Absent means "clear the filter": an empty subscription set.
    #[serde(default)]
    pub warning_types: Option<Vec<String>>,
}

pub async fn update_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<UpdatePreferencesRequest>,
) -> ApiResult<Json<PreferenceResponse>> {
    let names = request.warning_types.unwrap_or_default();
    let mut warning_types = Vec::with_capacity(names.len());
    for name in &names {
        let parsed = WarningType::from_name(name)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown warning type: {name}")))?;
        if !warning_types.contains(&parsed) {
            warning_types.push(parsed);
        }
    }

    state
        .store
        .update_preferences(&user_id, &warning_types)
        .await?;
    Ok(Json(PreferenceResponse {
        user_id,
        warning_types,
    }))
}

#[derive(Serialize)]
pub struct UpdateResponse {
    pub saved: usize,
    pub archived: u64,
    pub purged: u64,
}

/// Manual one-shot fetch+save, outside the scheduler's cadence. Failures
/// surface to the caller instead of being retried.
pub async fn trigger_update(State(state): State<AppState>) -> ApiResult<Json<UpdateResponse>> {
    let summary = state.updater.run_once().await?.unwrap_or_default();
    Ok(Json(UpdateResponse {
        saved: summary.saved,
        archived: summary.archived,
        purged: summary.purged,
    }))
}
