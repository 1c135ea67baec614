mod service;

use std::sync::Arc;

use super::service::{JobDraft, JobService};
use crate::workflows::store::InMemoryJobStore;

pub(super) fn complete_draft(title: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        job_type: "Full Time".to_string(),
        description: "Own the hiring dashboard.".to_string(),
        department: "Engineering".to_string(),
        candidates_needed: Some(3),
        salary_min: "7.000.000".to_string(),
        salary_max: "8.500.000".to_string(),
        application_form: None,
    }
}

pub(super) fn service() -> (JobService<InMemoryJobStore>, Arc<InMemoryJobStore>) {
    let store = Arc::new(InMemoryJobStore::default());
    (JobService::new(store.clone()), store)
}
