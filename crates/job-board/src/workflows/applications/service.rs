use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::engine::{FormEngine, FormValues, RenderedField, ValidationErrors};
use super::photo::{PhotoError, PhotoStore, PhotoUpload};
use crate::workflows::candidates::domain::{Candidate, NewCandidate};
use crate::workflows::jobs::domain::{JobId, JobStatus, PHOTO_PROFILE};
use crate::workflows::store::{CandidateRepository, JobRepository, RepositoryError};

/// What the applicant hands over when pressing submit.
#[derive(Debug, Clone, Default)]
pub struct ApplicationSubmission {
    pub values: FormValues,
    pub photo: Option<PhotoUpload>,
}

/// Progress of one submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Editing,
    Validating,
    Rejected,
    Uploading,
    Submitted,
    UploadFailed,
    Cancelled,
}

impl SubmissionPhase {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionPhase::Editing => "editing",
            SubmissionPhase::Validating => "validating",
            SubmissionPhase::Rejected => "rejected",
            SubmissionPhase::Uploading => "uploading",
            SubmissionPhase::Submitted => "submitted",
            SubmissionPhase::UploadFailed => "upload_failed",
            SubmissionPhase::Cancelled => "cancelled",
        }
    }

    /// Validation may skip `Uploading` when no photo is attached. Failed and
    /// cancelled attempts return to `Editing` for a retry.
    pub const fn can_advance_to(self, next: SubmissionPhase) -> bool {
        use SubmissionPhase::*;

        matches!(
            (self, next),
            (Editing, Validating)
                | (Validating, Rejected)
                | (Validating, Uploading)
                | (Validating, Submitted)
                | (Uploading, Submitted)
                | (Uploading, UploadFailed)
                | (Uploading, Cancelled)
                | (Rejected, Editing)
                | (UploadFailed, Editing)
                | (Cancelled, Editing)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionPhase::Rejected
                | SubmissionPhase::Submitted
                | SubmissionPhase::UploadFailed
                | SubmissionPhase::Cancelled
        )
    }
}

struct Attempt {
    candidate_ref: String,
    phase: SubmissionPhase,
}

impl Attempt {
    fn start(candidate_ref: String) -> Self {
        let mut attempt = Self {
            candidate_ref,
            phase: SubmissionPhase::Editing,
        };
        attempt.advance(SubmissionPhase::Validating);
        attempt
    }

    fn advance(&mut self, next: SubmissionPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal submission transition {:?} -> {:?}",
            self.phase,
            next
        );
        debug!(
            candidate_ref = %self.candidate_ref,
            from = self.phase.label(),
            to = next.label(),
            "submission phase changed"
        );
        self.phase = next;
    }
}

static CANDIDATE_REF_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_candidate_ref(job_id: &JobId) -> String {
    let sequence = CANDIDATE_REF_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{job_id}-applicant-{sequence:06}")
}

/// Application form for one job, ready for the applicant UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobForm {
    pub job_id: JobId,
    pub title: String,
    pub status: JobStatus,
    pub accepting_applications: bool,
    pub fields: Vec<RenderedField>,
}

/// Service wiring the form engine to the job store, candidate store, and photo store.
pub struct ApplicationService<J, C, P> {
    jobs: Arc<J>,
    candidates: Arc<C>,
    photos: Arc<P>,
    engine: Arc<FormEngine>,
    shutdown: CancellationToken,
}

impl<J, C, P> ApplicationService<J, C, P>
where
    J: JobRepository + 'static,
    C: CandidateRepository + 'static,
    P: PhotoStore + 'static,
{
    pub fn new(jobs: Arc<J>, candidates: Arc<C>, photos: Arc<P>, engine: FormEngine) -> Self {
        Self {
            jobs,
            candidates,
            photos,
            engine: Arc::new(engine),
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancel in-flight uploads when `token` fires.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn engine(&self) -> &FormEngine {
        &self.engine
    }

    /// Render the empty form for a job.
    pub fn form(&self, job_id: &JobId) -> Result<JobForm, SubmissionError> {
        let job = self
            .jobs
            .find_by_id(job_id)?
            .ok_or_else(|| SubmissionError::JobNotFound(job_id.clone()))?;

        let fields = self
            .engine
            .render(job.fields(), &FormValues::new(), &ValidationErrors::default());

        Ok(JobForm {
            accepting_applications: job.accepts_applications(),
            job_id: job.id,
            title: job.title,
            status: job.status,
            fields,
        })
    }

    /// Validate, upload the photo if one is attached, then append the candidate.
    pub async fn submit(
        &self,
        job_id: &JobId,
        submission: ApplicationSubmission,
        cancel: &CancellationToken,
    ) -> Result<Candidate, SubmissionError> {
        let job = self
            .jobs
            .find_by_id(job_id)?
            .ok_or_else(|| SubmissionError::JobNotFound(job_id.clone()))?;

        if !job.accepts_applications() {
            return Err(SubmissionError::JobClosed {
                job_id: job.id,
                status: job.status,
            });
        }

        let mut attempt = Attempt::start(next_candidate_ref(&job.id));
        let photo_enabled = job
            .fields()
            .iter()
            .any(|field| field.key == PHOTO_PROFILE && field.validation.is_enabled());
        let photo = submission.photo.filter(|_| photo_enabled);

        let errors = self
            .engine
            .validate(job.fields(), &submission.values, photo.as_ref());
        if !errors.is_empty() {
            attempt.advance(SubmissionPhase::Rejected);
            info!(job_id = %job.id, fields = errors.len(), "application rejected");
            return Err(SubmissionError::Rejected(errors));
        }

        let photo_url = match photo {
            Some(photo) => {
                attempt.advance(SubmissionPhase::Uploading);
                match self.upload_photo(&photo, &attempt.candidate_ref, cancel).await {
                    Ok(url) => url,
                    Err(err) => {
                        attempt.advance(err.phase());
                        return Err(err);
                    }
                }
            }
            None => String::new(),
        };

        let candidate = NewCandidate {
            job_id: job.id.clone(),
            attributes: self.engine.attributes(job.fields(), &submission.values),
            photo_url: photo_url.clone(),
        };

        let stored = match self.candidates.append(candidate) {
            Ok(stored) => stored,
            Err(err) => {
                if !photo_url.is_empty() {
                    self.discard_photo(&photo_url).await;
                }
                return Err(err.into());
            }
        };

        attempt.advance(SubmissionPhase::Submitted);
        info!(job_id = %job.id, candidate_id = %stored.id, "application submitted");
        Ok(stored)
    }

    async fn upload_photo(
        &self,
        photo: &PhotoUpload,
        candidate_ref: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SubmissionError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(candidate_ref, "photo upload cancelled");
                Err(SubmissionError::Cancelled)
            }
            result = self.photos.upload(photo, candidate_ref) => {
                let url = result.map_err(SubmissionError::UploadFailed)?;
                if cancel.is_cancelled() {
                    self.discard_photo(&url).await;
                    return Err(SubmissionError::Cancelled);
                }
                Ok(url)
            }
        }
    }

    async fn discard_photo(&self, url: &str) {
        match self.photos.delete(url).await {
            Ok(true) => debug!(url, "discarded orphaned photo"),
            Ok(false) => debug!(url, "orphaned photo was already gone"),
            Err(err) => warn!(url, error = %err, "failed to discard orphaned photo"),
        }
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("job '{0}' not found")]
    JobNotFound(JobId),
    #[error("job '{job_id}' is {} and not accepting applications", status.label())]
    JobClosed { job_id: JobId, status: JobStatus },
    #[error("{0}")]
    Rejected(ValidationErrors),
    #[error("photo upload failed: {0}")]
    UploadFailed(#[source] PhotoError),
    #[error("submission cancelled")]
    Cancelled,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SubmissionError {
    /// Phase an attempt ends in when it fails with this error.
    pub fn phase(&self) -> SubmissionPhase {
        match self {
            SubmissionError::UploadFailed(_) => SubmissionPhase::UploadFailed,
            SubmissionError::Cancelled => SubmissionPhase::Cancelled,
            _ => SubmissionPhase::Rejected,
        }
    }
}
