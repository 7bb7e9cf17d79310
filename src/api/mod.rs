use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Router};

use crate::lens::LensClient;
use crate::observe;

pub mod metrics;
pub mod status;

/// Shared state for the HTTP front-end. `lens` is `None` when the process
/// came up without a backend URL; `/metrics` keeps serving while every
/// status lookup reports the initialization failure.
#[derive(Clone)]
pub struct AppState {
    pub lens: Option<Arc<LensClient>>,
}

pub fn router(state: AppState) -> Router {
    // register the histogram up front so /metrics shows it before the
    // first status request comes in
    once_cell::sync::Lazy::force(&observe::REQUEST_DURATION);

    Router::new()
        .route("/status/:jobid", get(status::get_status))
        .route("/metrics", get(metrics::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(observe::middleware))
}
