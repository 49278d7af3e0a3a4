use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

pub mod calendar;
pub mod charts;
pub mod config;
pub mod dashboard_config;
pub mod error;
pub mod events;
pub mod navigation;
pub mod paths;
pub mod routes;
pub mod state;
pub mod storage;
pub mod store;
pub mod styles;
pub mod summary;
pub mod views;

pub fn router(state: Arc<AppState>) -> Router {
    // Fragment routes: /fragments/*
    let fragment_routes = Router::new().route("/chart", get(views::home::fragment_chart));

    let api_routes = Router::new()
        .route("/log", post(routes::api_log_entry))
        .route("/series", get(routes::api_series))
        .route("/summary", get(routes::api_summary))
        .route("/metrics", get(routes::api_metrics));

    Router::new()
        .route("/", get(views::home::index))
        .route("/log", post(routes::log_entry))
        .route("/styles.css", get(views::styles))
        .nest("/fragments", fragment_routes)
        .nest("/api", api_routes)
        .with_state(state)
}
