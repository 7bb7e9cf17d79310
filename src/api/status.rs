use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::AppState;
use crate::error::StatusError;

/// GET /status/{jobid}: plain-text report, or the error message as the
/// body with a server-error status.
pub async fn get_status(State(state): State<AppState>, Path(jobid): Path<String>) -> Response {
    match status_report(&state, &jobid).await {
        Ok(report) => (StatusCode::OK, report).into_response(),
        Err(err) => (err.http_status(), err.to_string()).into_response(),
    }
}

async fn status_report(state: &AppState, jobid: &str) -> Result<String, StatusError> {
    let lens = state
        .lens
        .as_ref()
        .ok_or(StatusError::ClientNotInitialized)?;
    let job = lens.get_job_info(jobid, None).await?;
    Ok(job.report(jobid))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::api;
    use crate::lens::LensClient;

    #[tokio::test]
    async fn missing_client_reports_not_initialized() {
        let state = AppState { lens: None };
        let err = status_report(&state, "alice@schedd.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, StatusError::ClientNotInitialized));
    }

    /// Serves one canned Lens response on a loopback port.
    async fn spawn_lens_backend(response: Value) -> String {
        let app = Router::new().route(
            "/",
            post(move || {
                let response = response.clone();
                async move { Json(response) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    /// Serves the real router, middleware and all, on a loopback port.
    async fn spawn_frontend(state: AppState) -> String {
        let app = api::router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn serves_the_status_report_over_http() {
        let lens_url = spawn_lens_backend(json!({
            "data": {
                "job": {
                    "id": "alice@schedd.example.com",
                    "owner": "alice",
                    "group": "fermilab",
                    "subject": "alice@fnal.gov",
                    "submitTime": "2024-01-02T03:04:05Z",
                    "done": false
                }
            }
        }))
        .await;
        let state = AppState {
            lens: Some(Arc::new(LensClient::new(&lens_url).unwrap())),
        };
        let base = spawn_frontend(state).await;

        let resp = reqwest::get(format!("{base}/status/alice@schedd.example.com"))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(
            resp.text().await.unwrap(),
            "Subission alice@schedd.example.com submitted by alice at 2024-01-02 03:04:05 UTC is not done.\n"
        );
    }

    #[tokio::test]
    async fn malformed_identifier_returns_the_error_text_with_500() {
        let lens_url = spawn_lens_backend(json!({"data": {"job": null}})).await;
        let state = AppState {
            lens: Some(Arc::new(LensClient::new(&lens_url).unwrap())),
        };
        let base = spawn_frontend(state).await;

        let resp = reqwest::get(format!("{base}/status/notajobid"))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 500);
        assert_eq!(
            resp.text().await.unwrap(),
            "\"notajobid\" does not appear to be a job or submission id"
        );
    }

    #[tokio::test]
    async fn uninitialized_client_returns_503_over_http() {
        let base = spawn_frontend(AppState { lens: None }).await;

        let resp = reqwest::get(format!("{base}/status/alice@schedd.example.com"))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 503);
        assert_eq!(resp.text().await.unwrap(), "Lens client was not initialized");
    }
}
