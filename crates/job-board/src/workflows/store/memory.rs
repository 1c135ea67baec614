use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{generate_id, today, CandidateRepository, JobRepository, RepositoryError};
use crate::workflows::candidates::domain::{
    Candidate, CandidateId, CandidatePatch, NewCandidate,
};
use crate::workflows::jobs::domain::{Job, JobId, JobPatch, JobStatus, NewJob};

const SNAPSHOT_VERSION: u32 = 0;

trait Record: Clone + Serialize + DeserializeOwned {
    fn record_id(&self) -> &str;
}

impl Record for Job {
    fn record_id(&self) -> &str {
        &self.id.0
    }
}

impl Record for Candidate {
    fn record_id(&self) -> &str {
        &self.id.0
    }
}

/// Ordered record list with an optional JSON snapshot on disk.
struct Collection<T> {
    name: &'static str,
    prefix: &'static str,
    records: Mutex<Vec<T>>,
    sequence: AtomicU64,
    snapshot: Option<PathBuf>,
}

impl<T: Record> Collection<T> {
    fn empty(name: &'static str, prefix: &'static str) -> Self {
        Self {
            name,
            prefix,
            records: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(1),
            snapshot: None,
        }
    }

    async fn open(
        name: &'static str,
        prefix: &'static str,
        path: PathBuf,
    ) -> Result<Self, RepositoryError> {
        let records: Vec<T> = match tokio::fs::read(&path).await {
            Ok(bytes) => decode_snapshot(name, &path, &bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(RepositoryError::Unavailable(err.to_string())),
        };

        debug!(
            collection = name,
            records = records.len(),
            path = %path.display(),
            "store rehydrated"
        );

        let sequence = AtomicU64::new(records.len() as u64 + 1);
        Ok(Self {
            name,
            prefix,
            records: Mutex::new(records),
            sequence,
            snapshot: Some(path),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<T>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable(format!("{} store lock poisoned", self.name)))
    }

    /// Apply `change` to a staged copy. The shared list takes it once the snapshot is written.
    fn write<R>(
        &self,
        change: impl FnOnce(&mut Vec<T>) -> Result<R, RepositoryError>,
    ) -> Result<R, RepositoryError> {
        let mut records = self.lock()?;
        let mut staged = records.clone();
        let result = change(&mut staged)?;
        self.persist(&staged)?;
        *records = staged;
        Ok(result)
    }

    fn next_id(&self, records: &[T]) -> String {
        loop {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
            let id = generate_id(self.prefix, today(), sequence);
            if !records.iter().any(|record| record.record_id() == id) {
                return id;
            }
        }
    }

    fn persist(&self, records: &[T]) -> Result<(), RepositoryError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        encode_snapshot(self.name, records)
            .and_then(|bytes| {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, bytes)
            })
            .map_err(|err| {
                warn!(
                    collection = self.name,
                    path = %path.display(),
                    error = %err,
                    "snapshot write failed"
                );
                RepositoryError::Unavailable(err.to_string())
            })
    }
}

fn encode_snapshot<T: Serialize>(name: &str, records: &[T]) -> std::io::Result<Vec<u8>> {
    let mut state = serde_json::Map::new();
    state.insert(name.to_string(), serde_json::to_value(records)?);
    let envelope = json!({ "state": state, "version": SNAPSHOT_VERSION });
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

fn decode_snapshot<T: DeserializeOwned>(
    name: &str,
    path: &Path,
    bytes: &[u8],
) -> Result<Vec<T>, RepositoryError> {
    let corrupt = |reason: String| RepositoryError::CorruptSnapshot {
        path: path.display().to_string(),
        reason,
    };

    let envelope: Value = serde_json::from_slice(bytes).map_err(|err| corrupt(err.to_string()))?;
    let records = envelope
        .get("state")
        .and_then(|state| state.get(name))
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    serde_json::from_value(records).map_err(|err| corrupt(err.to_string()))
}

/// Job store held in memory, optionally mirrored to a JSON snapshot.
///
/// A snapshot-backed store can only be obtained through [`InMemoryJobStore::open`],
/// which finishes rehydration before handing the store out.
#[derive(Clone)]
pub struct InMemoryJobStore {
    inner: Arc<Collection<Job>>,
}

impl Default for InMemoryJobStore {
    fn default() -> Self {
        Self {
            inner: Arc::new(Collection::empty("jobs", "job")),
        }
    }
}

impl InMemoryJobStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let collection = Collection::open("jobs", "job", path.into()).await?;
        Ok(Self {
            inner: Arc::new(collection),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.inner.snapshot.as_deref()
    }
}

impl JobRepository for InMemoryJobStore {
    fn create(&self, job: NewJob) -> Result<Job, RepositoryError> {
        self.inner.write(|records| {
            let job = Job {
                id: JobId(self.inner.next_id(records)),
                slug: job.slug,
                title: job.title,
                job_type: job.job_type,
                department: job.department,
                status: job.status,
                candidates_needed: job.candidates_needed,
                salary_range: job.salary_range,
                description: job.description,
                created_at: Utc::now(),
                application_form: job.application_form,
            };
            records.push(job.clone());
            Ok(job)
        })
    }

    fn update(&self, id: &JobId, patch: JobPatch) -> Result<Job, RepositoryError> {
        self.inner.write(|records| {
            let job = records
                .iter_mut()
                .find(|job| &job.id == id)
                .ok_or(RepositoryError::NotFound)?;
            patch.apply_to(job);
            Ok(job.clone())
        })
    }

    fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        self.inner.write(|records| {
            let index = records
                .iter()
                .position(|job| &job.id == id)
                .ok_or(RepositoryError::NotFound)?;
            records.remove(index);
            Ok(())
        })
    }

    fn find_by_id(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let records = self.inner.lock()?;
        Ok(records.iter().find(|job| &job.id == id).cloned())
    }

    fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        let records = self.inner.lock()?;
        Ok(records
            .iter()
            .filter(|job| job.status == status)
            .cloned()
            .collect())
    }

    fn list(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.inner.lock()?.clone())
    }
}

/// Candidate store held in memory, optionally mirrored to a JSON snapshot.
#[derive(Clone)]
pub struct InMemoryCandidateStore {
    inner: Arc<Collection<Candidate>>,
}

impl Default for InMemoryCandidateStore {
    fn default() -> Self {
        Self {
            inner: Arc::new(Collection::empty("candidates", "cand")),
        }
    }
}

impl InMemoryCandidateStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let collection = Collection::open("candidates", "cand", path.into()).await?;
        Ok(Self {
            inner: Arc::new(collection),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.inner.snapshot.as_deref()
    }
}

impl CandidateRepository for InMemoryCandidateStore {
    fn append(&self, candidate: NewCandidate) -> Result<Candidate, RepositoryError> {
        self.inner.write(|records| {
            let candidate = Candidate {
                id: CandidateId(self.inner.next_id(records)),
                job_id: candidate.job_id,
                photo_url: candidate.photo_url,
                attributes: candidate.attributes,
                applied_date: Utc::now(),
            };
            records.push(candidate.clone());
            Ok(candidate)
        })
    }

    fn list_by_job_id(&self, job_id: &JobId) -> Result<Vec<Candidate>, RepositoryError> {
        let records = self.inner.lock()?;
        Ok(records
            .iter()
            .filter(|candidate| &candidate.job_id == job_id)
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        let records = self.inner.lock()?;
        Ok(records.iter().find(|candidate| &candidate.id == id).cloned())
    }

    fn update(
        &self,
        id: &CandidateId,
        patch: CandidatePatch,
    ) -> Result<Candidate, RepositoryError> {
        self.inner.write(|records| {
            let candidate = records
                .iter_mut()
                .find(|candidate| &candidate.id == id)
                .ok_or(RepositoryError::NotFound)?;
            patch.apply_to(candidate);
            Ok(candidate.clone())
        })
    }

    fn delete(&self, id: &CandidateId) -> Result<(), RepositoryError> {
        self.inner.write(|records| {
            let index = records
                .iter()
                .position(|candidate| &candidate.id == id)
                .ok_or(RepositoryError::NotFound)?;
            records.remove(index);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::candidates::domain::CandidateAttribute;
    use crate::workflows::jobs::domain::{slugify, ApplicationForm, SalaryRange};

    fn new_job(title: &str, status: JobStatus) -> NewJob {
        NewJob {
            slug: slugify(title),
            title: title.to_string(),
            job_type: "Full Time".to_string(),
            department: "Engineering".to_string(),
            status,
            candidates_needed: 2,
            salary_range: SalaryRange::idr(7_000_000, 8_000_000),
            description: Some("Build things".to_string()),
            application_form: ApplicationForm::default(),
        }
    }

    fn new_candidate(job_id: &JobId, name: &str) -> NewCandidate {
        NewCandidate {
            job_id: job_id.clone(),
            photo_url: String::new(),
            attributes: vec![CandidateAttribute {
                key: "full_name".to_string(),
                label: "Full Name".to_string(),
                value: name.to_string(),
                order: 1,
            }],
        }
    }

    #[test]
    fn job_store_lists_by_status_in_insertion_order() {
        let store = InMemoryJobStore::default();
        let first = store
            .create(new_job("Backend Engineer", JobStatus::Active))
            .expect("create");
        store
            .create(new_job("Designer", JobStatus::Draft))
            .expect("create");
        let third = store
            .create(new_job("Data Analyst", JobStatus::Active))
            .expect("create");

        let active = store.list_by_status(JobStatus::Active).expect("list");
        let ids: Vec<_> = active.iter().map(|job| job.id.clone()).collect();
        assert!(ids[0].0.starts_with("job_"));
        assert_eq!(ids, vec![first.id, third.id]);
    }

    #[test]
    fn update_and_delete_report_missing_jobs() {
        let store = InMemoryJobStore::default();
        let missing = JobId("job_missing".to_string());
        assert!(matches!(
            store.update(&missing, JobPatch::default()),
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            store.delete(&missing),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn deleting_a_job_leaves_its_candidates() {
        let jobs = InMemoryJobStore::default();
        let candidates = InMemoryCandidateStore::default();
        let job = jobs
            .create(new_job("Backend Engineer", JobStatus::Active))
            .expect("create");
        candidates
            .append(new_candidate(&job.id, "Ayu"))
            .expect("append");

        jobs.delete(&job.id).expect("delete");

        assert!(jobs.find_by_id(&job.id).expect("find").is_none());
        assert_eq!(candidates.list_by_job_id(&job.id).expect("list").len(), 1);
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_open() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("candidate-storage.json");

        let store = InMemoryCandidateStore::open(&path).await.expect("open");
        let job_id = JobId("job_20251019_0001".to_string());
        let stored = store
            .append(new_candidate(&job_id, "Budi"))
            .expect("append");

        let reopened = InMemoryCandidateStore::open(&path).await.expect("reopen");
        let listed = reopened.list_by_job_id(&job_id).expect("list");
        assert_eq!(listed, vec![stored.clone()]);

        let next = reopened
            .append(new_candidate(&job_id, "Citra"))
            .expect("append after reopen");
        assert_ne!(next.id, stored.id);
    }

    #[tokio::test]
    async fn open_rejects_corrupt_snapshot() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("job-storage.json");
        std::fs::write(&path, b"{not json").expect("write");

        match InMemoryJobStore::open(&path).await {
            Err(RepositoryError::CorruptSnapshot { .. }) => {}
            Err(other) => panic!("expected corrupt snapshot, got {other:?}"),
            Ok(_) => panic!("expected corrupt snapshot error"),
        }
    }

    #[tokio::test]
    async fn failed_snapshot_write_leaves_records_unchanged() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let data = dir.path().join("data");
        let job_id = JobId("job_20251019_0001".to_string());

        let candidates = InMemoryCandidateStore::open(data.join("candidate-storage.json"))
            .await
            .expect("open");
        let jobs = InMemoryJobStore::open(data.join("job-storage.json"))
            .await
            .expect("open");
        let stored = candidates
            .append(new_candidate(&job_id, "Budi"))
            .expect("append");
        let job = jobs
            .create(new_job("Backend Engineer", JobStatus::Active))
            .expect("create");

        // The snapshot directory becomes a plain file, so every write fails.
        std::fs::remove_dir_all(&data).expect("remove data dir");
        std::fs::write(&data, b"not a directory").expect("block data dir");

        assert!(matches!(
            candidates.append(new_candidate(&job_id, "Citra")),
            Err(RepositoryError::Unavailable(_))
        ));
        assert!(candidates.delete(&stored.id).is_err());
        assert_eq!(
            candidates.list_by_job_id(&job_id).expect("list"),
            vec![stored]
        );

        let patch = JobPatch {
            status: Some(JobStatus::Inactive),
            ..JobPatch::default()
        };
        assert!(jobs.update(&job.id, patch).is_err());
        assert!(jobs
            .create(new_job("Designer", JobStatus::Draft))
            .is_err());
        assert_eq!(jobs.list().expect("list"), vec![job]);
    }
}
