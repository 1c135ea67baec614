use job_board::config::StorageConfig;
use job_board::error::AppError;
use job_board::workflows::applications::{PhotoError, PhotoStore, PhotoUpload};
use job_board::workflows::store::{InMemoryCandidateStore, InMemoryJobStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Photo store used by the binary. Objects live for the life of the process.
#[derive(Default)]
pub(crate) struct InMemoryPhotoStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    uploads: AtomicU64,
}

impl InMemoryPhotoStore {
    pub(crate) fn len(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub(crate) fn bytes(&self, url: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(url).cloned()
    }
}

impl PhotoStore for InMemoryPhotoStore {
    async fn upload(&self, photo: &PhotoUpload, candidate_ref: &str) -> Result<String, PhotoError> {
        let sequence = self.uploads.fetch_add(1, Ordering::Relaxed) + 1;
        let url = format!(
            "memory://photos/{candidate_ref}-{sequence}.{}",
            photo.extension()
        );
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| PhotoError::Backend("photo store lock poisoned".to_string()))?;
        objects.insert(url.clone(), photo.bytes.clone());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<bool, PhotoError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| PhotoError::Backend("photo store lock poisoned".to_string()))?;
        Ok(objects.remove(url).is_some())
    }
}

#[derive(Clone)]
pub(crate) struct Stores {
    pub(crate) jobs: Arc<InMemoryJobStore>,
    pub(crate) candidates: Arc<InMemoryCandidateStore>,
}

/// Open snapshot-backed stores when a data directory is configured, in-memory ones otherwise.
pub(crate) async fn open_stores(storage: &StorageConfig) -> Result<Stores, AppError> {
    let jobs = match storage.jobs_path() {
        Some(path) => InMemoryJobStore::open(path).await?,
        None => InMemoryJobStore::default(),
    };
    let candidates = match storage.candidates_path() {
        Some(path) => InMemoryCandidateStore::open(path).await?,
        None => InMemoryCandidateStore::default(),
    };

    info!(
        persistent = storage.data_dir.is_some(),
        "job and candidate stores ready"
    );

    Ok(Stores {
        jobs: Arc::new(jobs),
        candidates: Arc::new(candidates),
    })
}

/// Parse a `key=needle` CLI filter.
pub(crate) fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, needle) = raw
        .split_once('=')
        .ok_or_else(|| format!("filter '{raw}' must look like key=needle"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("filter '{raw}' is missing a column key"));
    }
    Ok((key.to_string(), needle.trim().to_string()))
}
