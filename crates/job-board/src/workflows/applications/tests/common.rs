use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::workflows::applications::engine::{FormEngine, FormValues};
use crate::workflows::applications::photo::{PhotoError, PhotoStore, PhotoUpload};
use crate::workflows::applications::service::{ApplicationService, ApplicationSubmission};
use crate::workflows::candidates::domain::{
    Candidate, CandidateId, CandidatePatch, NewCandidate,
};
use crate::workflows::jobs::domain::{
    slugify, ApplicationForm, FieldValidation, Job, JobId, JobStatus, NewJob, SalaryRange,
};
use crate::workflows::store::{
    CandidateRepository, InMemoryCandidateStore, InMemoryJobStore, JobRepository,
    RepositoryError,
};

pub(super) fn new_job(title: &str, status: JobStatus, form: ApplicationForm) -> NewJob {
    NewJob {
        slug: slugify(title),
        title: title.to_string(),
        job_type: "Full-time".to_string(),
        department: "Engineering".to_string(),
        status,
        candidates_needed: 2,
        salary_range: SalaryRange::idr(7_000_000, 8_000_000),
        description: Some("Build the applicant pipeline.".to_string()),
        application_form: form,
    }
}

pub(super) fn seed_job(jobs: &InMemoryJobStore, status: JobStatus) -> Job {
    jobs.create(new_job(
        "Frontend Developer",
        status,
        ApplicationForm::default(),
    ))
    .expect("job stored")
}

/// Default form with the photo field switched off.
pub(super) fn form_without_photo() -> ApplicationForm {
    let mut form = ApplicationForm::default();
    form.set_validation("photo_profile", FieldValidation::Off);
    form
}

pub(super) fn valid_values() -> FormValues {
    FormValues::new()
        .with("full_name", "Ayu Lestari")
        .with("email", "ayu@example.com")
        .with("phone_number", "81234567890")
        .with("domicile", "Jawa Barat")
        .with("linkedin_link", "https://www.linkedin.com/in/ayu")
}

pub(super) fn png(len: usize) -> PhotoUpload {
    PhotoUpload::new("ayu.png", "image/png", vec![0x89; len])
}

pub(super) fn submission_with_photo() -> ApplicationSubmission {
    ApplicationSubmission {
        values: valid_values(),
        photo: Some(png(512)),
    }
}

pub(super) type MemoryService =
    ApplicationService<InMemoryJobStore, InMemoryCandidateStore, MemoryPhotos>;

pub(super) fn build_service() -> (
    Arc<MemoryService>,
    InMemoryJobStore,
    InMemoryCandidateStore,
    Arc<MemoryPhotos>,
) {
    let jobs = InMemoryJobStore::default();
    let candidates = InMemoryCandidateStore::default();
    let photos = Arc::new(MemoryPhotos::default());
    let service = ApplicationService::new(
        Arc::new(jobs.clone()),
        Arc::new(candidates.clone()),
        photos.clone(),
        FormEngine::default(),
    );
    (Arc::new(service), jobs, candidates, photos)
}

pub(super) fn service_with_photos<P>(
    jobs: &InMemoryJobStore,
    photos: Arc<P>,
) -> ApplicationService<InMemoryJobStore, InMemoryCandidateStore, P>
where
    P: PhotoStore + 'static,
{
    ApplicationService::new(
        Arc::new(jobs.clone()),
        Arc::new(InMemoryCandidateStore::default()),
        photos,
        FormEngine::default(),
    )
}

#[derive(Default)]
pub(super) struct MemoryPhotos {
    stored: Mutex<HashMap<String, usize>>,
    deleted: Mutex<Vec<String>>,
}

impl MemoryPhotos {
    pub(super) fn stored(&self) -> usize {
        self.stored.lock().expect("photo lock").len()
    }

    pub(super) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("photo lock").clone()
    }
}

impl PhotoStore for MemoryPhotos {
    async fn upload(&self, photo: &PhotoUpload, candidate_ref: &str) -> Result<String, PhotoError> {
        let url = format!("memory://photos/{candidate_ref}.{}", photo.extension());
        self.stored
            .lock()
            .expect("photo lock")
            .insert(url.clone(), photo.bytes.len());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<bool, PhotoError> {
        self.deleted.lock().expect("photo lock").push(url.to_string());
        Ok(self.stored.lock().expect("photo lock").remove(url).is_some())
    }
}

pub(super) struct FailingPhotos;

impl PhotoStore for FailingPhotos {
    async fn upload(
        &self,
        _photo: &PhotoUpload,
        _candidate_ref: &str,
    ) -> Result<String, PhotoError> {
        Err(PhotoError::Backend("quota exceeded".to_string()))
    }

    async fn delete(&self, url: &str) -> Result<bool, PhotoError> {
        Err(PhotoError::UnknownUrl(url.to_string()))
    }
}

/// Upload that never finishes on its own.
#[derive(Default)]
pub(super) struct StalledPhotos {
    pub(super) started: AtomicUsize,
}

impl PhotoStore for StalledPhotos {
    async fn upload(
        &self,
        _photo: &PhotoUpload,
        _candidate_ref: &str,
    ) -> Result<String, PhotoError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn delete(&self, _url: &str) -> Result<bool, PhotoError> {
        Ok(false)
    }
}

/// Upload that succeeds but fires the cancel token before returning.
pub(super) struct CancelAfterUpload {
    pub(super) token: CancellationToken,
    pub(super) inner: MemoryPhotos,
}

impl PhotoStore for CancelAfterUpload {
    async fn upload(&self, photo: &PhotoUpload, candidate_ref: &str) -> Result<String, PhotoError> {
        let url = self.inner.upload(photo, candidate_ref).await?;
        self.token.cancel();
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<bool, PhotoError> {
        self.inner.delete(url).await
    }
}

pub(super) struct UnavailableCandidates;

impl CandidateRepository for UnavailableCandidates {
    fn append(&self, _candidate: NewCandidate) -> Result<Candidate, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn list_by_job_id(&self, _job_id: &JobId) -> Result<Vec<Candidate>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn find_by_id(&self, _id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn update(
        &self,
        _id: &CandidateId,
        _patch: CandidatePatch,
    ) -> Result<Candidate, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn delete(&self, _id: &CandidateId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }
}

pub(super) async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let json = serde_json::from_slice(&body).expect("json body");
    (status, json)
}
