use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a configured form field is required, optional, or hidden entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValidation {
    Mandatory,
    Optional,
    Off,
}

impl FieldValidation {
    pub const fn label(self) -> &'static str {
        match self {
            FieldValidation::Mandatory => "mandatory",
            FieldValidation::Optional => "optional",
            FieldValidation::Off => "off",
        }
    }

    pub const fn is_enabled(self) -> bool {
        !matches!(self, FieldValidation::Off)
    }
}

/// One entry of a job's application form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub key: String,
    pub label: String,
    pub validation: FieldValidation,
    pub order: u32,
}

impl FieldConfig {
    pub fn new(key: &str, label: &str, validation: FieldValidation, order: u32) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            validation,
            order,
        }
    }
}

pub const FULL_NAME: &str = "full_name";
pub const PHOTO_PROFILE: &str = "photo_profile";
pub const EMAIL: &str = "email";
pub const PHONE_NUMBER: &str = "phone_number";
pub const GENDER: &str = "gender";
pub const DATE_OF_BIRTH: &str = "date_of_birth";
pub const DOMICILE: &str = "domicile";
pub const LINKEDIN_LINK: &str = "linkedin_link";

pub const DEFAULT_SECTION_TITLE: &str = "Minimum Profile Information Required";

/// Field list every new job starts from.
pub fn default_field_config() -> Vec<FieldConfig> {
    use FieldValidation::{Mandatory, Optional};

    vec![
        FieldConfig::new(FULL_NAME, "Full Name", Mandatory, 1),
        FieldConfig::new(PHOTO_PROFILE, "Photo Profile", Mandatory, 2),
        FieldConfig::new(EMAIL, "Email", Mandatory, 3),
        FieldConfig::new(PHONE_NUMBER, "Phone Number", Mandatory, 4),
        FieldConfig::new(GENDER, "Gender", Optional, 5),
        FieldConfig::new(DATE_OF_BIRTH, "Date of Birth", Optional, 6),
        FieldConfig::new(DOMICILE, "Domicile", Optional, 7),
        FieldConfig::new(LINKEDIN_LINK, "LinkedIn Profile", Optional, 8),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSection {
    pub title: String,
    pub fields: Vec<FieldConfig>,
}

/// Sectioned form definition. Only the first section feeds the form engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationForm {
    pub sections: Vec<FormSection>,
}

impl ApplicationForm {
    pub fn single(fields: Vec<FieldConfig>) -> Self {
        Self {
            sections: vec![FormSection {
                title: DEFAULT_SECTION_TITLE.to_string(),
                fields,
            }],
        }
    }

    pub fn fields(&self) -> &[FieldConfig] {
        self.sections
            .first()
            .map(|section| section.fields.as_slice())
            .unwrap_or(&[])
    }

    /// First key that appears more than once in the engine's field list.
    pub fn duplicate_key(&self) -> Option<&str> {
        let fields = self.fields();
        fields
            .iter()
            .enumerate()
            .find(|(index, field)| fields[..*index].iter().any(|seen| seen.key == field.key))
            .map(|(_, field)| field.key.as_str())
    }

    /// Change one field's status in place. Returns false when the key is unknown.
    pub fn set_validation(&mut self, key: &str, validation: FieldValidation) -> bool {
        let Some(section) = self.sections.first_mut() else {
            return false;
        };
        match section.fields.iter_mut().find(|field| field.key == key) {
            Some(field) => {
                field.validation = validation;
                true
            }
            None => false,
        }
    }
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self::single(default_field_config())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
    Inactive,
    Draft,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Inactive => "inactive",
            JobStatus::Draft => "draft",
        }
    }

    /// `draft -> active` and `active <-> inactive`; re-applying a status is allowed.
    pub const fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Draft, JobStatus::Active)
                | (JobStatus::Active, JobStatus::Inactive)
                | (JobStatus::Inactive, JobStatus::Active)
                | (JobStatus::Active, JobStatus::Active)
                | (JobStatus::Inactive, JobStatus::Inactive)
                | (JobStatus::Draft, JobStatus::Draft)
        )
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(JobStatus::Active),
            "inactive" => Ok(JobStatus::Inactive),
            "draft" => Ok(JobStatus::Draft),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

impl SalaryRange {
    pub fn idr(min: u64, max: u64) -> Self {
        let display_text =
            (min > 0 && max > 0).then(|| format!("{} - {}", format_idr(min), format_idr(max)));
        Self {
            min,
            max,
            currency: "IDR".to_string(),
            display_text,
        }
    }
}

/// Job posting as held by the job store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub department: String,
    pub status: JobStatus,
    pub candidates_needed: u32,
    pub salary_range: SalaryRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub application_form: ApplicationForm,
}

impl Job {
    pub fn fields(&self) -> &[FieldConfig] {
        self.application_form.fields()
    }

    pub fn accepts_applications(&self) -> bool {
        self.status == JobStatus::Active
    }
}

/// Job payload before the store assigns an id and creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub department: String,
    pub status: JobStatus,
    pub candidates_needed: u32,
    pub salary_range: SalaryRange,
    #[serde(default)]
    pub description: Option<String>,
    pub application_form: ApplicationForm,
}

/// Partial update applied by `JobRepository::update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPatch {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub department: Option<String>,
    pub status: Option<JobStatus>,
    pub candidates_needed: Option<u32>,
    pub salary_range: Option<SalaryRange>,
    pub description: Option<String>,
    pub application_form: Option<ApplicationForm>,
}

impl JobPatch {
    pub fn apply_to(self, job: &mut Job) {
        if let Some(title) = self.title {
            job.slug = slugify(&title);
            job.title = title;
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(department) = self.department {
            job.department = department;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(candidates_needed) = self.candidates_needed {
            job.candidates_needed = candidates_needed;
        }
        if let Some(salary_range) = self.salary_range {
            job.salary_range = salary_range;
        }
        if let Some(description) = self.description {
            job.description = Some(description);
        }
        if let Some(application_form) = self.application_form {
            job.application_form = application_form;
        }
    }
}

/// Lower-case the title and collapse every non-alphanumeric run into `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// `Rp1.500.000` style rendering used for salary display text.
pub fn format_idr(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("Rp{grouped}")
}

/// Salary inputs arrive formatted (`7.000.000`); only the digits count.
pub fn parse_salary_input(raw: &str) -> u64 {
    raw.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}
