use crate::lens::id::JobOrSubmissionId;

/// Submission lookup, aliased to `job` so both templates decode into the
/// same response shape.
const SUBMISSION_QUERY: &str = r#"
query {
  job:submission(id:"%ID%"){
    id owner group
    subject: classAd(name: "AuthTokenSubject")
    submitTime
    done
  }
}
"#;

const JOB_QUERY: &str = r#"
query {
  job(id:"%ID%"){
    id owner group
    subject: classAd(name: "AuthTokenSubject")
    submitTime
    done
  }
}
"#;

/// Picks the template for the classified variant and substitutes the full
/// raw identifier, so Lens does its own canonical lookup. The grammar check
/// in [`JobOrSubmissionId::parse`] is the only sanitization the id gets
/// before landing here; callers must not bypass it.
pub fn build(id: &JobOrSubmissionId, raw: &str) -> String {
    let template = match id {
        JobOrSubmissionId::Submission { .. } => SUBMISSION_QUERY,
        JobOrSubmissionId::Job { .. } => JOB_QUERY,
    };
    template.replace("%ID%", raw)
}
