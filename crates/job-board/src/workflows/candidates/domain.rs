use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::jobs::domain::JobId;

/// Identifier wrapper for submitted candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A candidate's answer to one configured form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAttribute {
    pub key: String,
    pub label: String,
    pub value: String,
    pub order: u32,
}

/// Submitted application as held by the candidate store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub job_id: JobId,
    #[serde(default)]
    pub photo_url: String,
    pub attributes: Vec<CandidateAttribute>,
    pub applied_date: DateTime<Utc>,
}

impl Candidate {
    pub fn attribute(&self, key: &str) -> Option<&CandidateAttribute> {
        self.attributes.iter().find(|attribute| attribute.key == key)
    }
}

/// Candidate payload before the store assigns an id and applied date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCandidate {
    pub job_id: JobId,
    #[serde(default)]
    pub photo_url: String,
    pub attributes: Vec<CandidateAttribute>,
}

/// Admin edit applied through `CandidateRepository::update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidatePatch {
    pub photo_url: Option<String>,
    pub attributes: Option<Vec<CandidateAttribute>>,
}

impl CandidatePatch {
    pub fn apply_to(self, candidate: &mut Candidate) {
        if let Some(photo_url) = self.photo_url {
            candidate.photo_url = photo_url;
        }
        if let Some(attributes) = self.attributes {
            candidate.attributes = attributes;
        }
    }
}
