//! Job and candidate storage seams.
//!
//! The engines never reach for ambient global state: services receive a
//! repository through their constructor, so tests swap in fakes and the host
//! decides whether records live purely in memory or are snapshotted to disk.

mod memory;

pub use memory::{InMemoryCandidateStore, InMemoryJobStore};

use chrono::{NaiveDate, Utc};

use crate::workflows::candidates::domain::{
    Candidate, CandidateId, CandidatePatch, NewCandidate,
};
use crate::workflows::jobs::domain::{Job, JobId, JobPatch, JobStatus, NewJob};

/// Storage abstraction for job postings.
pub trait JobRepository: Send + Sync {
    fn create(&self, job: NewJob) -> Result<Job, RepositoryError>;
    fn update(&self, id: &JobId, patch: JobPatch) -> Result<Job, RepositoryError>;
    fn delete(&self, id: &JobId) -> Result<(), RepositoryError>;
    fn find_by_id(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError>;
    fn list(&self) -> Result<Vec<Job>, RepositoryError>;
}

/// Storage abstraction for submitted candidates.
pub trait CandidateRepository: Send + Sync {
    fn append(&self, candidate: NewCandidate) -> Result<Candidate, RepositoryError>;
    fn list_by_job_id(&self, job_id: &JobId) -> Result<Vec<Candidate>, RepositoryError>;
    fn find_by_id(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError>;
    fn update(&self, id: &CandidateId, patch: CandidatePatch)
        -> Result<Candidate, RepositoryError>;
    fn delete(&self, id: &CandidateId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot at {path} is unreadable: {reason}")]
    CorruptSnapshot { path: String, reason: String },
}

/// `{prefix}_{YYYYMMDD}_{sequence}` identifiers, e.g. `job_20251019_0001`.
pub fn generate_id(prefix: &str, date: NaiveDate, sequence: u64) -> String {
    format!("{prefix}_{}_{sequence:04}", date.format("%Y%m%d"))
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_embed_date_and_padded_sequence() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 19).expect("valid date");
        assert_eq!(generate_id("job", date, 7), "job_20251019_0007");
        assert_eq!(generate_id("cand", date, 12345), "cand_20251019_12345");
    }
}
