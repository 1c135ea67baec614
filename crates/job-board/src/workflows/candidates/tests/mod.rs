mod routing;

use crate::workflows::candidates::domain::{CandidateAttribute, NewCandidate};
use crate::workflows::jobs::domain::JobId;
use crate::workflows::store::{CandidateRepository, InMemoryCandidateStore};

fn job_id() -> JobId {
    JobId("job_20251019_0001".to_string())
}

fn applicant(job_id: &JobId, name: &str, email: &str, domicile: &str) -> NewCandidate {
    let attributes = [
        ("full_name", "Full Name", name),
        ("email", "Email", email),
        ("domicile", "Domicile", domicile),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (key, label, value))| CandidateAttribute {
        key: key.to_string(),
        label: label.to_string(),
        value: value.to_string(),
        order: index as u32 + 1,
    })
    .collect();

    NewCandidate {
        job_id: job_id.clone(),
        photo_url: String::new(),
        attributes,
    }
}

/// Three applicants for [`job_id`] plus one for another job.
fn seeded_store() -> InMemoryCandidateStore {
    let store = InMemoryCandidateStore::default();
    let job = job_id();
    for (name, email, domicile) in [
        ("Budi Santoso", "b@example.com", "DKI Jakarta"),
        ("Citra Dewi", "", "Jawa Barat"),
        ("Ayu Lestari", "a@example.com", "Jakarta Selatan"),
    ] {
        store
            .append(applicant(&job, name, email, domicile))
            .expect("candidate stored");
    }
    store
        .append(applicant(
            &JobId("job_20251019_0002".to_string()),
            "Dimas",
            "d@example.com",
            "Bali",
        ))
        .expect("candidate stored");
    store
}
