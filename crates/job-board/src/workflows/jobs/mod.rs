//! Job postings and their per-job application form configuration.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    default_field_config, ApplicationForm, FieldConfig, FieldValidation, FormSection, Job, JobId,
    JobPatch, JobStatus, NewJob, SalaryRange,
};
pub use router::job_router;
pub use service::{JobDraft, JobError, JobService};
