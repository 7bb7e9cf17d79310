use std::time::Instant;

use clap::{Parser, Subcommand};
use opentelemetry::trace::TraceContextExt;
use tracing::{info_span, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::lens::LensClient;
use crate::observe;

#[derive(Debug, Parser)]
#[command(name = "jobstat", version, about = "Job/submission status lookup against Lens")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP front-end.
    Serve {
        /// Address and port to listen on.
        #[arg(
            short = 'a',
            long,
            env = "JOBSTAT_ADDRESS",
            default_value = "localhost:8888"
        )]
        address: String,
    },
    /// Print the status of one job or submission.
    Status {
        /// job/submission ID
        #[arg(short = 'J', long, visible_alias = "job")]
        jobid: String,
    },
}

/// The `status` command: same pipeline and report as the HTTP handler,
/// written to stdout, the error to stderr with a nonzero exit code. The
/// whole action runs inside the CLI observation, so even a misconfigured
/// client produces its log line and histogram sample.
pub async fn status_command(lens_url: &str, jobid: &str) -> i32 {
    let start = Instant::now();
    let span = info_span!("cli.status", otel.name = "status");

    let result = async {
        let lens = LensClient::new(lens_url)?;
        tracing::debug!(jobid, "getting info for job/submission from lens");
        lens.get_job_info(jobid, None).await
    }
    .instrument(span.clone())
    .await;

    let trace_id = span.context().span().span_context().trace_id().to_string();
    observe::observe_cli("status", start.elapsed(), result.is_ok(), &trace_id);

    match result {
        Ok(job) => {
            print!("{}", job.report(jobid));
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::REQUEST_DURATION;

    #[tokio::test]
    async fn uninitialized_client_still_records_an_observation() {
        let before = REQUEST_DURATION
            .with_label_values(&["cli"])
            .get_sample_count();

        let code = status_command("", "alice@schedd.example.com").await;
        assert_eq!(code, 1);

        // other tests may also hit the cli bucket concurrently
        let after = REQUEST_DURATION
            .with_label_values(&["cli"])
            .get_sample_count();
        assert!(after >= before + 1);
    }

    #[tokio::test]
    async fn invalid_identifier_exits_nonzero_and_observes() {
        let before = REQUEST_DURATION
            .with_label_values(&["cli"])
            .get_sample_count();

        let code = status_command("http://127.0.0.1:9/", "not a job id").await;
        assert_eq!(code, 1);

        let after = REQUEST_DURATION
            .with_label_values(&["cli"])
            .get_sample_count();
        assert!(after >= before + 1);
    }
}
