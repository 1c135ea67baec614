use super::{complete_draft, service};
use crate::workflows::candidates::domain::NewCandidate;
use crate::workflows::jobs::domain::{
    default_field_config, ApplicationForm, FieldConfig, FieldValidation, JobId, JobPatch,
    JobStatus,
};
use crate::workflows::jobs::service::{JobDraft, JobError, DEFAULT_JOB_TYPE};
use crate::workflows::store::{CandidateRepository, InMemoryCandidateStore, JobRepository};

#[test]
fn draft_needs_only_a_title() {
    let (service, _) = service();

    let err = service
        .save_draft(JobDraft::default(), None)
        .expect_err("empty draft rejected");
    let JobError::Invalid(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert_eq!(
        errors.get("title"),
        Some("At least job title is required to save as draft")
    );

    let job = service
        .save_draft(
            JobDraft {
                title: "  Data Analyst ".to_string(),
                ..JobDraft::default()
            },
            None,
        )
        .expect("draft saved");
    assert_eq!(job.status, JobStatus::Draft);
    assert_eq!(job.title, "Data Analyst");
    assert_eq!(job.slug, "data-analyst");
    assert_eq!(job.job_type, DEFAULT_JOB_TYPE);
    assert_eq!(job.candidates_needed, 1);
    assert!(job.description.is_none());
    assert_eq!(job.fields().len(), 8);
}

#[test]
fn publish_reports_every_missing_field() {
    let (service, store) = service();

    let err = service
        .publish(
            JobDraft {
                title: "Backend Engineer".to_string(),
                candidates_needed: Some(0),
                ..JobDraft::default()
            },
            None,
        )
        .expect_err("incomplete job rejected");
    let JobError::Invalid(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert_eq!(errors.len(), 4);
    assert_eq!(errors.get("type"), Some("Job type is required"));
    assert_eq!(errors.get("description"), Some("Job description is required"));
    assert_eq!(errors.get("department"), Some("Department is required"));
    assert_eq!(
        errors.get("candidates_needed"),
        Some("Number of candidates must be at least 1")
    );
    assert!(errors.get("title").is_none());
    assert!(store.list().expect("list").is_empty());
}

#[test]
fn publish_parses_formatted_salaries() {
    let (service, _) = service();

    let job = service
        .publish(complete_draft("Frontend Developer"), None)
        .expect("job published");

    assert_eq!(job.status, JobStatus::Active);
    assert!(job.accepts_applications());
    assert_eq!(job.salary_range.min, 7_000_000);
    assert_eq!(job.salary_range.max, 8_500_000);
    assert_eq!(
        job.salary_range.display_text.as_deref(),
        Some("Rp7.000.000 - Rp8.500.000")
    );
}

#[test]
fn drafts_can_be_published_later() {
    let (service, _) = service();
    let draft = service
        .save_draft(complete_draft("QA Engineer"), None)
        .expect("draft saved");

    let published = service
        .publish(complete_draft("QA Engineer"), Some(&draft.id))
        .expect("draft published");
    assert_eq!(published.id, draft.id);
    assert_eq!(published.status, JobStatus::Active);

    let err = service
        .save_draft(complete_draft("QA Engineer"), Some(&draft.id))
        .expect_err("active job cannot go back to draft");
    assert!(matches!(
        err,
        JobError::InvalidTransition {
            from: JobStatus::Active,
            to: JobStatus::Draft
        }
    ));
}

#[test]
fn status_changes_follow_the_lifecycle() {
    let (service, _) = service();
    let job = service
        .publish(complete_draft("Product Designer"), None)
        .expect("job published");

    let closed = service
        .set_status(&job.id, JobStatus::Inactive)
        .expect("active job closes");
    assert_eq!(closed.status, JobStatus::Inactive);

    let unchanged = service
        .set_status(&job.id, JobStatus::Inactive)
        .expect("same status is a no-op");
    assert_eq!(unchanged, closed);

    assert!(matches!(
        service.set_status(&job.id, JobStatus::Draft),
        Err(JobError::InvalidTransition { .. })
    ));
    assert!(matches!(
        service.update(
            &job.id,
            JobPatch {
                status: Some(JobStatus::Draft),
                ..JobPatch::default()
            }
        ),
        Err(JobError::InvalidTransition { .. })
    ));

    let reopened = service
        .set_status(&job.id, JobStatus::Active)
        .expect("inactive job reopens");
    assert_eq!(reopened.status, JobStatus::Active);
}

#[test]
fn list_filters_by_status() {
    let (service, _) = service();
    service
        .publish(complete_draft("Frontend Developer"), None)
        .expect("published");
    service
        .save_draft(complete_draft("Backend Engineer"), None)
        .expect("drafted");

    assert_eq!(service.list(None).expect("list").len(), 2);
    let active = service.list(Some(JobStatus::Active)).expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].title, "Frontend Developer");
}

#[test]
fn field_validation_can_be_changed_per_job() {
    let (service, _) = service();
    let job = service
        .publish(complete_draft("Frontend Developer"), None)
        .expect("published");

    let updated = service
        .set_field_validation(&job.id, "linkedin_link", FieldValidation::Mandatory)
        .expect("field updated");
    let linkedin = updated
        .fields()
        .iter()
        .find(|field| field.key == "linkedin_link")
        .expect("field present");
    assert_eq!(linkedin.validation, FieldValidation::Mandatory);

    assert!(matches!(
        service.set_field_validation(&job.id, "salary", FieldValidation::Off),
        Err(JobError::UnknownField(key)) if key == "salary"
    ));
}

#[test]
fn missing_jobs_are_reported_by_id() {
    let (service, _) = service();
    let missing = JobId("job_20251019_9999".to_string());

    assert!(matches!(service.get(&missing), Err(JobError::NotFound(id)) if id == missing));
    assert!(matches!(service.delete(&missing), Err(JobError::NotFound(_))));
    assert!(matches!(
        service.update(&missing, JobPatch::default()),
        Err(JobError::NotFound(_))
    ));
}

#[test]
fn deleting_a_job_keeps_its_candidates() {
    let (service, _) = service();
    let candidates = InMemoryCandidateStore::default();
    let job = service
        .publish(complete_draft("Frontend Developer"), None)
        .expect("published");
    candidates
        .append(NewCandidate {
            job_id: job.id.clone(),
            photo_url: String::new(),
            attributes: Vec::new(),
        })
        .expect("candidate stored");

    service.delete(&job.id).expect("job deleted");

    assert!(matches!(service.get(&job.id), Err(JobError::NotFound(_))));
    assert_eq!(candidates.list_by_job_id(&job.id).expect("list").len(), 1);
}

fn form_with_repeated_email() -> ApplicationForm {
    let mut fields = default_field_config();
    fields.push(FieldConfig::new(
        "email",
        "Work Email",
        FieldValidation::Optional,
        9,
    ));
    ApplicationForm::single(fields)
}

#[test]
fn repeated_field_keys_are_rejected_on_publish_and_draft() {
    let (service, store) = service();
    let draft = JobDraft {
        application_form: Some(form_with_repeated_email()),
        ..complete_draft("Frontend Developer")
    };

    for result in [
        service.publish(draft.clone(), None),
        service.save_draft(draft, None),
    ] {
        let Err(JobError::Invalid(errors)) = result else {
            panic!("expected validation errors, got {result:?}");
        };
        assert_eq!(
            errors.get("application_form"),
            Some("Field 'email' appears more than once")
        );
    }
    assert!(store.list().expect("list").is_empty());
}

#[test]
fn repeated_field_keys_are_rejected_on_patch() {
    let (service, _) = service();
    let job = service
        .publish(complete_draft("Frontend Developer"), None)
        .expect("published");

    let result = service.update(
        &job.id,
        JobPatch {
            application_form: Some(form_with_repeated_email()),
            ..JobPatch::default()
        },
    );
    assert!(matches!(
        result,
        Err(JobError::Invalid(errors)) if errors.get("application_form").is_some()
    ));
    assert_eq!(
        service.get(&job.id).expect("job").application_form,
        job.application_form
    );
}

#[test]
fn patch_keeps_required_values_present() {
    let (service, _) = service();
    let job = service
        .publish(complete_draft("Frontend Developer"), None)
        .expect("published");

    let result = service.update(
        &job.id,
        JobPatch {
            candidates_needed: Some(0),
            title: Some("   ".to_string()),
            ..JobPatch::default()
        },
    );
    let Err(JobError::Invalid(errors)) = result else {
        panic!("expected validation errors, got {result:?}");
    };
    assert_eq!(
        errors.get("candidates_needed"),
        Some("Number of candidates must be at least 1")
    );
    assert_eq!(errors.get("title"), Some("Job title is required"));

    let unchanged = service.get(&job.id).expect("job");
    assert_eq!(unchanged.candidates_needed, 3);
    assert_eq!(unchanged.title, "Frontend Developer");

    let updated = service
        .update(
            &job.id,
            JobPatch {
                candidates_needed: Some(5),
                ..JobPatch::default()
            },
        )
        .expect("positive count accepted");
    assert_eq!(updated.candidates_needed, 5);
}
