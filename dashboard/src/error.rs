use std::io;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("unknown chart view `{0}`")]
    InvalidView(String),
    #[error("offset {0} reaches outside the supported calendar")]
    OffsetOutOfRange(u32),
}

impl IntoResponse for ChartError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid timestamp `{0}`, expected YYYY-MM-DDTHH:MM")]
    InvalidTimestamp(String),
    #[error("event log I/O failed: {0}")]
    Io(#[from] io::Error),
}
