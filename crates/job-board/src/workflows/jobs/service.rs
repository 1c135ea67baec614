use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::domain::{
    parse_salary_input, slugify, ApplicationForm, FieldValidation, Job, JobId, JobPatch,
    JobStatus, NewJob, SalaryRange,
};
use crate::workflows::applications::engine::ValidationErrors;
use crate::workflows::store::{JobRepository, RepositoryError};

pub const DEFAULT_JOB_TYPE: &str = "Full Time";

const CANDIDATES_NEEDED_MESSAGE: &str = "Number of candidates must be at least 1";
const DRAFT_TITLE_MESSAGE: &str = "At least job title is required to save as draft";

/// Field keys must be unique, otherwise one answer would map to several attributes.
fn check_form(form: Option<&ApplicationForm>, errors: &mut ValidationErrors) {
    if let Some(key) = form.and_then(ApplicationForm::duplicate_key) {
        errors.insert(
            "application_form",
            format!("Field '{key}' appears more than once"),
        );
    }
}

/// Raw values from the job editor. Salaries arrive formatted (`7.000.000`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub description: String,
    pub department: String,
    pub candidates_needed: Option<u32>,
    pub salary_min: String,
    pub salary_max: String,
    pub application_form: Option<ApplicationForm>,
}

impl JobDraft {
    /// Everything a published job must have, keyed by editor field.
    pub fn publish_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        let required = [
            ("title", &self.title, "Job title is required"),
            ("type", &self.job_type, "Job type is required"),
            ("description", &self.description, "Job description is required"),
            ("department", &self.department, "Department is required"),
        ];
        for (key, value, message) in required {
            if value.trim().is_empty() {
                errors.insert(key, message.to_string());
            }
        }
        if self.candidates_needed.unwrap_or(0) < 1 {
            errors.insert("candidates_needed", CANDIDATES_NEEDED_MESSAGE.to_string());
        }
        check_form(self.application_form.as_ref(), &mut errors);
        errors
    }

    fn salary_range(&self) -> SalaryRange {
        SalaryRange::idr(
            parse_salary_input(&self.salary_min),
            parse_salary_input(&self.salary_max),
        )
    }

    fn into_new_job(self, status: JobStatus) -> NewJob {
        let salary_range = self.salary_range();
        let job_type = if self.job_type.trim().is_empty() {
            DEFAULT_JOB_TYPE.to_string()
        } else {
            self.job_type.trim().to_string()
        };
        let description =
            Some(self.description.trim().to_string()).filter(|text| !text.is_empty());

        NewJob {
            slug: slugify(&self.title),
            title: self.title.trim().to_string(),
            job_type,
            department: self.department.trim().to_string(),
            status,
            candidates_needed: self.candidates_needed.filter(|n| *n >= 1).unwrap_or(1),
            salary_range,
            description,
            application_form: self.application_form.unwrap_or_default(),
        }
    }

    fn into_patch(self, status: JobStatus) -> JobPatch {
        let job = self.into_new_job(status);
        JobPatch {
            title: Some(job.title),
            job_type: Some(job.job_type),
            department: Some(job.department),
            status: Some(job.status),
            candidates_needed: Some(job.candidates_needed),
            salary_range: Some(job.salary_range),
            description: job.description,
            application_form: Some(job.application_form),
        }
    }
}

/// Admin operations on job postings.
pub struct JobService<J> {
    jobs: Arc<J>,
}

impl<J> JobService<J>
where
    J: JobRepository + 'static,
{
    pub fn new(jobs: Arc<J>) -> Self {
        Self { jobs }
    }

    /// Save without publishing. Only a title is required.
    pub fn save_draft(&self, draft: JobDraft, existing: Option<&JobId>) -> Result<Job, JobError> {
        let mut errors = ValidationErrors::default();
        if draft.title.trim().is_empty() {
            errors.insert("title", DRAFT_TITLE_MESSAGE.to_string());
        }
        check_form(draft.application_form.as_ref(), &mut errors);
        if !errors.is_empty() {
            return Err(JobError::Invalid(errors));
        }

        let job = match existing {
            Some(id) => {
                let current = self.get(id)?;
                if current.status != JobStatus::Draft {
                    return Err(JobError::InvalidTransition {
                        from: current.status,
                        to: JobStatus::Draft,
                    });
                }
                self.jobs.update(id, draft.into_patch(JobStatus::Draft))?
            }
            None => self.jobs.create(draft.into_new_job(JobStatus::Draft))?,
        };
        info!(job_id = %job.id, "job saved as draft");
        Ok(job)
    }

    /// Create an active job, or publish an existing draft.
    pub fn publish(&self, draft: JobDraft, existing: Option<&JobId>) -> Result<Job, JobError> {
        let errors = draft.publish_errors();
        if !errors.is_empty() {
            return Err(JobError::Invalid(errors));
        }

        let job = match existing {
            Some(id) => {
                let current = self.get(id)?;
                if !current.status.can_transition_to(JobStatus::Active) {
                    return Err(JobError::InvalidTransition {
                        from: current.status,
                        to: JobStatus::Active,
                    });
                }
                self.jobs.update(id, draft.into_patch(JobStatus::Active))?
            }
            None => self.jobs.create(draft.into_new_job(JobStatus::Active))?,
        };
        info!(job_id = %job.id, slug = %job.slug, "job published");
        Ok(job)
    }

    pub fn get(&self, id: &JobId) -> Result<Job, JobError> {
        self.jobs
            .find_by_id(id)?
            .ok_or_else(|| JobError::NotFound(id.clone()))
    }

    pub fn list(&self, status: Option<JobStatus>) -> Result<Vec<Job>, JobError> {
        let jobs = match status {
            Some(status) => self.jobs.list_by_status(status)?,
            None => self.jobs.list()?,
        };
        Ok(jobs)
    }

    /// Partial edit. Status changes still follow the job lifecycle.
    pub fn update(&self, id: &JobId, patch: JobPatch) -> Result<Job, JobError> {
        let current = self.get(id)?;

        let mut errors = ValidationErrors::default();
        if patch.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            let message = if current.status == JobStatus::Draft {
                DRAFT_TITLE_MESSAGE
            } else {
                "Job title is required"
            };
            errors.insert("title", message.to_string());
        }
        if patch.candidates_needed == Some(0) {
            errors.insert("candidates_needed", CANDIDATES_NEEDED_MESSAGE.to_string());
        }
        check_form(patch.application_form.as_ref(), &mut errors);
        if !errors.is_empty() {
            return Err(JobError::Invalid(errors));
        }

        if let Some(next) = patch.status {
            if !current.status.can_transition_to(next) {
                return Err(JobError::InvalidTransition {
                    from: current.status,
                    to: next,
                });
            }
        }
        self.jobs.update(id, patch).map_err(|err| missing_as_not_found(id, err))
    }

    pub fn set_status(&self, id: &JobId, status: JobStatus) -> Result<Job, JobError> {
        let current = self.get(id)?;
        if current.status == status {
            return Ok(current);
        }
        if !current.status.can_transition_to(status) {
            return Err(JobError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let job = self.jobs.update(
            id,
            JobPatch {
                status: Some(status),
                ..JobPatch::default()
            },
        )?;
        info!(job_id = %job.id, status = status.label(), "job status changed");
        Ok(job)
    }

    /// Change one form field's status for a job.
    pub fn set_field_validation(
        &self,
        id: &JobId,
        key: &str,
        validation: FieldValidation,
    ) -> Result<Job, JobError> {
        let mut form = self.get(id)?.application_form;
        if !form.set_validation(key, validation) {
            return Err(JobError::UnknownField(key.to_string()));
        }

        let job = self.jobs.update(
            id,
            JobPatch {
                application_form: Some(form),
                ..JobPatch::default()
            },
        )?;
        Ok(job)
    }

    /// Remove the job only. Its candidates stay in the candidate store.
    pub fn delete(&self, id: &JobId) -> Result<(), JobError> {
        self.jobs.delete(id).map_err(|err| missing_as_not_found(id, err))?;
        info!(job_id = %id, "job deleted");
        Ok(())
    }
}

fn missing_as_not_found(id: &JobId, err: RepositoryError) -> JobError {
    match err {
        RepositoryError::NotFound => JobError::NotFound(id.clone()),
        other => JobError::Repository(other),
    }
}

/// Error raised by the job service.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error("job '{0}' not found")]
    NotFound(JobId),
    #[error("cannot move a job from {} to {}", from.label(), to.label())]
    InvalidTransition { from: JobStatus, to: JobStatus },
    #[error("unknown form field '{0}'")]
    UnknownField(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
