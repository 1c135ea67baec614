//! Applicant-facing form engine.
//!
//! A job's field configuration drives everything here: which inputs render,
//! in what order, which are required, and how the submitted answers become
//! candidate attributes. Photos go through a [`PhotoStore`] before the
//! candidate is appended, and that upload is the one cancelable step.

pub mod drive;
pub mod engine;
pub mod fields;
pub mod photo;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use drive::GoogleDrivePhotoStore;
pub use engine::{enabled_fields, FormEngine, FormValues, RenderedField, ValidationErrors};
pub use fields::{FieldRenderer, FieldWidget, RendererRegistry};
pub use photo::{PhotoError, PhotoPolicy, PhotoStore, PhotoUpload, DEFAULT_MAX_PHOTO_BYTES};
pub use router::{application_router, ApplicationRequest, PhotoPayload};
pub use service::{
    ApplicationService, ApplicationSubmission, JobForm, SubmissionError, SubmissionPhase,
};
