use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::StatusError;

/// Accepted identifier grammar: `base[.sequence]@domain`. Anchored on both
/// ends so the whole input has to match; this doubles as the allow-list
/// before the id is interpolated into a query template.
static ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)(\.(\d+))?@([\w.]+)$").expect("identifier regex"));

/// A classified job/submission identifier. The presence of a sequence
/// number is the sole discriminant: `base@domain` names a whole submission,
/// `base.N@domain` names one job inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOrSubmissionId {
    Submission { base: String, domain: String },
    Job {
        base: String,
        /// Kept as the matched digit string: the value is never
        /// interpreted here, only its presence matters.
        sequence: String,
        domain: String,
    },
}

impl JobOrSubmissionId {
    /// Classifies a raw identifier. Total over the grammar: anything that
    /// does not match in its entirety is `InvalidIdentifier`, with no
    /// partial result.
    pub fn parse(raw: &str) -> Result<JobOrSubmissionId, StatusError> {
        let caps = ID_REGEX
            .captures(raw)
            .ok_or_else(|| StatusError::InvalidIdentifier(raw.to_string()))?;

        let base = caps[1].to_string();
        let domain = caps[4].to_string();

        match caps.get(3) {
            None => Ok(JobOrSubmissionId::Submission { base, domain }),
            Some(seq) => Ok(JobOrSubmissionId::Job {
                base,
                sequence: seq.as_str().to_string(),
                domain,
            }),
        }
    }
}
