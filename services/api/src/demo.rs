use crate::infra::{parse_filter, InMemoryPhotoStore};
use clap::Args;
use job_board::error::AppError;
use job_board::workflows::applications::{
    ApplicationService, ApplicationSubmission, FormEngine, FormValues, PhotoUpload,
    SubmissionError,
};
use job_board::workflows::candidates::grid::query::{FilterSet, SortConfig};
use job_board::workflows::candidates::{CandidateService, GridQuery, GridView, PageSize};
use job_board::workflows::jobs::{Job, JobDraft, JobService};
use job_board::workflows::store::{InMemoryCandidateStore, InMemoryJobStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const SAMPLE_CANDIDATES: &str = "\
full_name,email,phone_number,gender,date_of_birth,domicile,linkedin_link
Budi Santoso,budi@example.com,81234500001,male,1995-04-12,DKI Jakarta,https://www.linkedin.com/in/budi
Citra Dewi,,81234500002,female,1998-11-02,Jawa Barat,
Ayu Lestari,ayu@example.com,81234500003,female,1997-07-21,Jakarta Selatan,https://www.linkedin.com/in/ayu
Dimas Pratama,dimas@example.com,,male,,Bali,
";

/// 1x1 transparent PNG used when no `--photo` is given.
const SAMPLE_PHOTO: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Candidate CSV (header row of field keys) to load instead of the built-in sample.
    #[arg(long)]
    pub(crate) candidates_csv: Option<PathBuf>,
    /// Image attached to the sample application.
    #[arg(long)]
    pub(crate) photo: Option<PathBuf>,
    /// Column key to sort the grid by.
    #[arg(long)]
    pub(crate) sort: Option<String>,
    /// Sort descending instead of ascending.
    #[arg(long, requires = "sort")]
    pub(crate) descending: bool,
    /// Column filter as key=needle. Repeatable.
    #[arg(long, value_parser = parse_filter)]
    pub(crate) filter: Vec<(String, String)>,
    /// Rows per page (10, 25, 50 or 100).
    #[arg(long)]
    pub(crate) page_size: Option<usize>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        candidates_csv,
        photo,
        sort,
        descending,
        filter,
        page_size,
    } = args;

    let page_size = page_size
        .map(PageSize::try_from)
        .transpose()
        .map_err(|err| AppError::Candidates(err.into()))?;

    let jobs = Arc::new(InMemoryJobStore::default());
    let candidates = Arc::new(InMemoryCandidateStore::default());
    let photos = Arc::new(InMemoryPhotoStore::default());

    println!("Job board demo");
    let job_service = JobService::new(jobs.clone());
    let job = job_service.publish(sample_job(), None)?;
    render_job(&job);

    let applications = ApplicationService::new(
        jobs.clone(),
        candidates.clone(),
        photos.clone(),
        FormEngine::default(),
    );

    println!("\nApplication form");
    let form = applications.form(&job.id)?;
    for field in &form.fields {
        println!(
            "  - {} [{}]{}",
            field.label,
            field.widget.kind(),
            if field.required { " *" } else { "" }
        );
    }

    println!("\nApplication intake");
    let cancel = CancellationToken::new();
    let incomplete = ApplicationSubmission {
        values: FormValues::new()
            .with("full_name", "Eka Putri")
            .with("email", "eka@"),
        photo: None,
    };
    match applications.submit(&job.id, incomplete, &cancel).await {
        Ok(candidate) => println!("- Unexpectedly accepted {}", candidate.id),
        Err(SubmissionError::Rejected(errors)) => {
            println!("- Rejected incomplete application:");
            for (key, message) in errors.iter() {
                println!("    {key}: {message}");
            }
        }
        Err(err) => return Err(err.into()),
    }

    let submission = ApplicationSubmission {
        values: FormValues::new()
            .with("full_name", "Rina Wulandari")
            .with("email", "rina@example.com")
            .with("phone_number", "81234500009")
            .with("domicile", "DI Yogyakarta"),
        photo: Some(load_photo(photo.as_deref()).await?),
    };
    let candidate = applications.submit(&job.id, submission, &cancel).await?;
    let photo_size = photos
        .bytes(&candidate.photo_url)
        .map(|bytes| bytes.len())
        .unwrap_or_default();
    println!(
        "- Accepted {} with photo {} ({} bytes, {} stored)",
        candidate.id,
        candidate.photo_url,
        photo_size,
        photos.len()
    );

    let review = CandidateService::new(candidates);
    let imported = match candidates_csv {
        Some(path) => {
            let file = std::fs::File::open(&path)?;
            review.import(&job.id, job.fields(), file)?
        }
        None => review.import(&job.id, job.fields(), SAMPLE_CANDIDATES.as_bytes())?,
    };
    println!("- Imported {} candidates from CSV", imported.len());

    let query = GridQuery {
        sort: sort.map(|key| {
            if descending {
                SortConfig::desc(&key)
            } else {
                SortConfig::asc(&key)
            }
        }),
        filters: filter.into_iter().collect::<FilterSet>(),
        page_size,
        ..GridQuery::default()
    };
    let view = review.view(&job.id, &query)?;
    render_grid(&view);

    Ok(())
}

fn sample_job() -> JobDraft {
    JobDraft {
        title: "Frontend Developer".to_string(),
        job_type: "Full Time".to_string(),
        description: "Build and maintain the candidate review dashboard.".to_string(),
        department: "Engineering".to_string(),
        candidates_needed: Some(2),
        salary_min: "7.000.000".to_string(),
        salary_max: "8.500.000".to_string(),
        application_form: None,
    }
}

async fn load_photo(path: Option<&Path>) -> Result<PhotoUpload, AppError> {
    let Some(path) = path else {
        return Ok(PhotoUpload::new(
            "sample.png",
            "image/png",
            SAMPLE_PHOTO.to_vec(),
        ));
    };

    let bytes = tokio::fs::read(path).await?;
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());

    Ok(PhotoUpload::new(file_name, content_type, bytes))
}

fn render_job(job: &Job) {
    println!(
        "- Published {} ({}) as {}",
        job.title,
        job.slug,
        job.status.label()
    );
    println!(
        "  {} | {} | {} candidates needed",
        job.department, job.job_type, job.candidates_needed
    );
    if let Some(salary) = &job.salary_range.display_text {
        println!("  Salary: {salary}");
    }
}

fn render_grid(view: &GridView) {
    println!("\nCandidate grid");
    if let Some(sort) = &view.sort {
        println!("  Sorted by {} ({:?})", sort.key, sort.direction);
    }
    if view.active_filters > 0 {
        let filters: Vec<String> = view
            .filters
            .iter()
            .map(|(key, needle)| format!("{key}~{needle}"))
            .collect();
        println!(
            "  {} active filter(s): {}",
            view.active_filters,
            filters.join(", ")
        );
    }

    let headers: Vec<&str> = view
        .columns
        .iter()
        .map(|column| column.label.as_str())
        .collect();
    println!("  Applied | {}", headers.join(" | "));

    if view.rows.is_empty() {
        println!("  (no candidates match)");
    }
    for row in &view.rows {
        println!(
            "  {} | {}",
            row.applied_date.format("%d %b %Y"),
            row.cells.join(" | ")
        );
    }

    println!(
        "  {} (page {} of {}, {} per page)",
        view.page.summary(),
        view.page.page,
        view.page.total_pages,
        view.page.page_size.rows()
    );
}
