use std::io::Read;
use std::sync::Arc;

use tracing::info;

use super::domain::Candidate;
use super::export::{export_csv, CandidateCsvError, CandidateCsvImporter};
use super::grid::{CandidateGrid, GridError, GridQuery, GridView, PageSize};
use crate::workflows::jobs::domain::{FieldConfig, JobId};
use crate::workflows::store::{CandidateRepository, RepositoryError};

/// Admin-side access to a job's candidates through the grid engine.
pub struct CandidateService<C> {
    candidates: Arc<C>,
    page_size: PageSize,
}

impl<C> CandidateService<C>
where
    C: CandidateRepository + 'static,
{
    pub fn new(candidates: Arc<C>) -> Self {
        Self {
            candidates,
            page_size: PageSize::default(),
        }
    }

    /// Rows per page for sessions that do not ask for one.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Fresh grid session over every candidate stored for `job_id`.
    ///
    /// Candidates of a deleted job are still listed.
    pub fn grid(&self, job_id: &JobId) -> Result<CandidateGrid, CandidateServiceError> {
        let candidates = self.candidates.list_by_job_id(job_id)?;
        Ok(CandidateGrid::new(candidates).with_page_size(self.page_size))
    }

    pub fn view(
        &self,
        job_id: &JobId,
        query: &GridQuery,
    ) -> Result<GridView, CandidateServiceError> {
        let mut grid = self.grid(job_id)?;
        query.apply(&mut grid)?;
        Ok(grid.view())
    }

    /// CSV of the filtered, sorted rows across every page.
    pub fn export(
        &self,
        job_id: &JobId,
        query: &GridQuery,
    ) -> Result<String, CandidateServiceError> {
        let mut grid = self.grid(job_id)?;
        query.apply(&mut grid)?;
        let csv = export_csv(&grid)?;
        info!(job_id = %job_id, rows = grid.rows().len(), "exported candidates");
        Ok(csv)
    }

    /// Append every row of a candidate CSV to `job_id`.
    pub fn import<R: Read>(
        &self,
        job_id: &JobId,
        fields: &[FieldConfig],
        reader: R,
    ) -> Result<Vec<Candidate>, CandidateServiceError> {
        let rows = CandidateCsvImporter::new(job_id.clone(), fields).read(reader)?;
        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            stored.push(self.candidates.append(row)?);
        }
        info!(job_id = %job_id, rows = stored.len(), "imported candidates");
        Ok(stored)
    }
}

/// Error raised by the candidate service.
#[derive(Debug, thiserror::Error)]
pub enum CandidateServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Csv(#[from] CandidateCsvError),
}
