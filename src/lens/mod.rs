//! Client for the Lanscape Lens GraphQL API, plus the identifier → query →
//! lookup pipeline used by both front-ends.

pub mod id;
pub mod job;
pub mod query;

use std::future::Future;

use opentelemetry::global;
use opentelemetry::trace::Status;
use opentelemetry_http::HeaderInjector;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::error::StatusError;
use crate::lens::id::JobOrSubmissionId;
use crate::lens::job::Job;

/// Lens API client. One instance is built at bootstrap and shared by every
/// in-flight request; nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct LensClient {
    url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlData {
    job: Option<Job>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl LensClient {
    /// Builds a client for the given endpoint. An empty URL means the
    /// process was started without `LENS_URL`; that is rejected here, once,
    /// instead of on every request.
    pub fn new(url: &str) -> Result<LensClient, StatusError> {
        if url.trim().is_empty() {
            return Err(StatusError::ClientNotInitialized);
        }
        Ok(LensClient {
            url: url.to_string(),
            http: reqwest::Client::new(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Looks up the information for the job/submission: classify the raw
    /// identifier, build the matching query, run it. Short-circuits on the
    /// first failure and records it on the span before returning.
    pub async fn get_job_info(
        &self,
        jobid: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Job, StatusError> {
        let span = tracing::info_span!("get_job_info", job.id = %jobid);
        async move {
            let result = async {
                let id = JobOrSubmissionId::parse(jobid)?;
                let q = query::build(&id, jobid);
                tracing::debug!(jobid, "querying lens for job/submission info");
                self.run(&q, cancel).await
            }
            .await;

            if let Err(err) = &result {
                let span = tracing::Span::current();
                span.set_status(Status::error(err.to_string()));
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Sends one GraphQL query to Lens and decodes the `job` field out of
    /// the response. The current span's trace context is injected into the
    /// outbound headers so the backend call shows up as a child span.
    pub async fn run(
        &self,
        query: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Job, StatusError> {
        let mut headers = HeaderMap::new();
        let cx = tracing::Span::current().context();
        global::get_text_map_propagator(|prop| {
            prop.inject_context(&cx, &mut HeaderInjector(&mut headers))
        });

        let resp = with_cancel(
            self.http
                .post(&self.url)
                .headers(headers)
                .json(&serde_json::json!({ "query": query }))
                .send(),
            cancel,
        )
        .await?
        .map_err(|e| StatusError::Backend(e.to_string()))?;

        let http_status = resp.status();
        let raw = with_cancel(resp.text(), cancel)
            .await?
            .map_err(|e| StatusError::Backend(e.to_string()))?;

        if !http_status.is_success() {
            return Err(StatusError::Backend(format!(
                "status {http_status}: {raw}"
            )));
        }

        let parsed: GraphQlResponse = serde_json::from_str(&raw)
            .map_err(|e| StatusError::Backend(format!("invalid JSON response: {e}")))?;

        if let Some(errors) = parsed.errors {
            if !errors.is_empty() {
                let msgs = errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(StatusError::Backend(msgs));
            }
        }

        match parsed.data.and_then(|d| d.job) {
            Some(job) => Ok(job),
            None => Err(StatusError::JobNotFound),
        }
    }
}

/// Awaits `fut`, bailing out with `Cancelled` the moment the token fires.
/// With no token the future runs to completion (hyper still aborts it if
/// the inbound connection goes away).
async fn with_cancel<F: Future>(
    fut: F,
    cancel: Option<&CancellationToken>,
) -> Result<F::Output, StatusError> {
    match cancel {
        Some(token) => tokio::select! {
            _ = token.cancelled() => Err(StatusError::Cancelled),
            out = fut => Ok(out),
        },
        None => Ok(fut.await),
    }
}
