//! CSV in and out of the candidate grid.
//!
//! Export writes the current filtered, sorted rows over the visible columns,
//! headed by column labels. Import reads a header of field keys (plus an
//! optional `photo_url` column) and turns each row into a [`NewCandidate`].

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use super::domain::{CandidateAttribute, NewCandidate};
use super::grid::query::{cell_value, PHOTO_COLUMN};
use super::grid::CandidateGrid;
use crate::workflows::jobs::domain::{FieldConfig, JobId};

#[derive(Debug)]
pub enum CandidateCsvError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingHeader,
    DuplicateColumn(String),
}

impl std::fmt::Display for CandidateCsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateCsvError::Io(err) => write!(f, "failed to read candidate CSV: {}", err),
            CandidateCsvError::Csv(err) => write!(f, "invalid candidate CSV data: {}", err),
            CandidateCsvError::MissingHeader => f.write_str("candidate CSV has no header row"),
            CandidateCsvError::DuplicateColumn(key) => {
                write!(f, "candidate CSV repeats column '{}'", key)
            }
        }
    }
}

impl std::error::Error for CandidateCsvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CandidateCsvError::Io(err) => Some(err),
            CandidateCsvError::Csv(err) => Some(err),
            CandidateCsvError::MissingHeader | CandidateCsvError::DuplicateColumn(_) => None,
        }
    }
}

impl From<std::io::Error> for CandidateCsvError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CandidateCsvError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Render the grid's current rows as CSV. Pagination is ignored.
pub fn export_csv(grid: &CandidateGrid) -> Result<String, CandidateCsvError> {
    let columns: Vec<_> = grid.columns().visible().collect();
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(columns.iter().map(|column| column.label.as_str()))?;
    for candidate in grid.rows() {
        writer.write_record(
            columns
                .iter()
                .map(|column| cell_value(candidate, &column.key)),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| CandidateCsvError::Io(std::io::Error::other(err.to_string())))?;
    String::from_utf8(bytes).map_err(|err| {
        CandidateCsvError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}

/// Reads candidate rows for one job. Labels come from the job's field configuration.
pub struct CandidateCsvImporter<'a> {
    job_id: JobId,
    fields: &'a [FieldConfig],
}

impl<'a> CandidateCsvImporter<'a> {
    pub fn new(job_id: JobId, fields: &'a [FieldConfig]) -> Self {
        Self { job_id, fields }
    }

    pub fn read_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<NewCandidate>, CandidateCsvError> {
        let file = std::fs::File::open(path)?;
        self.read(file)
    }

    pub fn read<R: Read>(&self, reader: R) -> Result<Vec<NewCandidate>, CandidateCsvError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|header| header.to_string())
            .collect();
        if headers.iter().all(|header| header.is_empty()) {
            return Err(CandidateCsvError::MissingHeader);
        }

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(CandidateCsvError::DuplicateColumn(header.clone()));
            }
        }

        let mut candidates = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let mut photo_url = String::new();
            let mut attributes = Vec::new();

            for (key, value) in headers.iter().zip(record.iter()) {
                if key == PHOTO_COLUMN {
                    photo_url = value.to_string();
                    continue;
                }
                attributes.push(CandidateAttribute {
                    key: key.clone(),
                    label: self.label_for(key),
                    value: value.to_string(),
                    order: attributes.len() as u32 + 1,
                });
            }

            candidates.push(NewCandidate {
                job_id: self.job_id.clone(),
                photo_url,
                attributes,
            });
        }

        Ok(candidates)
    }

    fn label_for(&self, key: &str) -> String {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.label.clone())
            .unwrap_or_else(|| key.to_string())
    }
}
