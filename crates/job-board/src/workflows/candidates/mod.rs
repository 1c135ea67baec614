//! Candidate records and the admin grid over them.

pub mod domain;
pub mod export;
pub mod grid;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Candidate, CandidateAttribute, CandidateId, CandidatePatch, NewCandidate};
pub use export::{export_csv, CandidateCsvError, CandidateCsvImporter};
pub use grid::{CandidateGrid, GridError, GridQuery, GridView, PageSize};
pub use router::{candidate_router, parse_grid_query};
pub use service::{CandidateService, CandidateServiceError};
