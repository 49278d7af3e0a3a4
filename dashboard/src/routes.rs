use std::sync::{Arc, PoisonError};

use axum::extract::{Form, Json, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::charts::{self, SeriesResult};
use crate::config::RECENT_BREAKDOWN_DAYS;
use crate::error::{ChartError, StoreError};
use crate::events::STORAGE_FORMAT;
use crate::state::AppState;
use crate::summary::{self, DailyCount, SummaryReport};
use crate::views::ChartQuery;

#[derive(Deserialize)]
pub struct LogEntryRequest {
    user_time: String,
}

#[derive(Serialize)]
pub struct LogEntryResponse {
    status: String,
    timestamp: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

fn append_entry(state: &AppState, user_time: &str) -> Result<String, (StatusCode, String)> {
    let mut store = state.store.write().unwrap_or_else(PoisonError::into_inner);
    match store.append(user_time) {
        Ok(timestamp) => Ok(timestamp.to_rfc3339()),
        Err(e @ StoreError::InvalidTimestamp(_)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e @ StoreError::Io(_)) => {
            warn!("failed to append entry: {e}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Form submission from the page. Answers with a plain status line.
pub async fn log_entry(
    State(state): State<Arc<AppState>>,
    Form(data): Form<LogEntryRequest>,
) -> (StatusCode, String) {
    match append_entry(&state, &data.user_time) {
        Ok(_) => (StatusCode::OK, "OK".to_owned()),
        Err(rejection) => rejection,
    }
}

pub async fn api_log_entry(
    State(state): State<Arc<AppState>>,
    Json(data): Json<LogEntryRequest>,
) -> Result<(StatusCode, Json<LogEntryResponse>), (StatusCode, Json<ErrorResponse>)> {
    match append_entry(&state, &data.user_time) {
        Ok(timestamp) => Ok((
            StatusCode::CREATED,
            Json(LogEntryResponse {
                status: "recorded".to_owned(),
                timestamp,
            }),
        )),
        Err((status, error)) => Err((status, Json(ErrorResponse { error }))),
    }
}

#[derive(Serialize)]
pub struct SeriesResponse {
    #[serde(flatten)]
    series: SeriesResult,
    caption_text: String,
}

pub async fn api_series(
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SeriesResponse>, ChartError> {
    let mut navigator = query.position(&state.config)?;
    if let Some(step) = query.step {
        navigator.step(step);
    }
    let series = charts::compute(
        navigator.view(),
        navigator.offset(),
        &state.snapshot(),
        state.now(),
    )?;
    Ok(Json(SeriesResponse {
        caption_text: series.caption.to_string(),
        series,
    }))
}

#[derive(Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    report: SummaryReport,
    last_entry: Option<String>,
    freshness: Option<String>,
}

pub async fn api_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    let events = state.snapshot();
    let now = state.now();
    Json(SummaryResponse {
        report: summary::summarize(&events, now).report(),
        last_entry: summary::last_entry(&events, now).map(|entry| entry.to_string()),
        freshness: summary::freshness(&events, now),
    })
}

#[derive(Serialize)]
pub struct MetricsResponse {
    status: String,
    total_last_7_days: usize,
    average_per_day: f64,
    daily_breakdown: Vec<DailyCount>,
    last_entry: Option<String>,
}

/// Recent activity for external consumers.
pub async fn api_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    let events = state.snapshot();
    let now = state.now();
    let recent = summary::recent_breakdown(&events, now, RECENT_BREAKDOWN_DAYS);
    Json(MetricsResponse {
        status: "ok".to_owned(),
        total_last_7_days: recent.total,
        average_per_day: recent.average_per_day,
        daily_breakdown: recent.daily,
        last_entry: events
            .iter()
            .map(|e| e.occurred_at)
            .max()
            .map(|t| t.format(STORAGE_FORMAT).to_string()),
    })
}
