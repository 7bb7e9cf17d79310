use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One job or submission record as Lens returns it. Built fresh per
/// request and dropped once the report is rendered; nothing caches these.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub owner: String,
    #[serde(default)]
    pub group: String,
    /// AuthTokenSubject classad of whoever submitted it.
    #[serde(default)]
    pub subject: String,
    pub submit_time: DateTime<Utc>,
    pub done: bool,
}

impl Job {
    /// The one-line status report, identical for the HTTP and CLI
    /// front-ends. "Subission" is the historical output text; downstream
    /// consumers grep for it, so it stays misspelled.
    pub fn report(&self, jobid: &str) -> String {
        let done = if self.done { "done" } else { "not done" };
        format!(
            "Subission {} submitted by {} at {} is {}.\n",
            jobid, self.owner, self.submit_time, done
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(done: bool) -> Job {
        Job {
            id: "alice@schedd.example.com".into(),
            owner: "alice".into(),
            group: "fermilab".into(),
            subject: "alice@fnal.gov".into(),
            submit_time: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            done,
        }
    }

    #[test]
    fn report_for_unfinished_job() {
        let line = sample(false).report("alice@schedd.example.com");
        assert_eq!(
            line,
            "Subission alice@schedd.example.com submitted by alice at 2024-01-02 03:04:05 UTC is not done.\n"
        );
    }

    #[test]
    fn report_for_finished_job_ends_in_is_done() {
        let line = sample(true).report("alice@schedd.example.com");
        assert!(line.ends_with("is done.\n"));
    }

    #[test]
    fn report_uses_the_identifier_it_was_asked_about() {
        // the raw query id, not the record's own id field
        let mut job = sample(false);
        job.id = "something-else".into();
        let line = job.report("bob.3@schedd.example.com");
        assert!(line.starts_with("Subission bob.3@schedd.example.com "));
    }

    #[test]
    fn decodes_camel_case_wire_form() {
        let job: Job = serde_json::from_str(
            r#"{
                "id": "a@d",
                "owner": "a",
                "group": "g",
                "subject": "s",
                "submitTime": "2024-01-02T03:04:05Z",
                "done": true
            }"#,
        )
        .unwrap();
        assert!(job.done);
        assert_eq!(job.submit_time.to_string(), "2024-01-02 03:04:05 UTC");
    }
}
