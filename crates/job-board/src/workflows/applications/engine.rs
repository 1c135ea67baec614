use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fields::{FieldWidget, RendererRegistry};
use super::photo::{PhotoPolicy, PhotoUpload};
use crate::workflows::candidates::domain::CandidateAttribute;
use crate::workflows::jobs::domain::{FieldConfig, FieldValidation, PHOTO_PROFILE};

/// Raw text values keyed by field key, as typed by the applicant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    /// Missing keys read as an empty string.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Blocking problems keyed by field key. Empty means the submission is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, message: String) {
        self.0.insert(key.to_string(), message);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(key, message)| (key.as_str(), message.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", keys.join(", "))
    }
}

/// Fields that are shown, in display order. `off` fields never appear.
pub fn enabled_fields(config: &[FieldConfig]) -> Vec<FieldConfig> {
    let mut fields: Vec<FieldConfig> = config
        .iter()
        .filter(|field| field.validation.is_enabled())
        .cloned()
        .collect();
    fields.sort_by_key(|field| field.order);
    fields
}

/// One input ready to draw: widget, current value, and any inline error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedField {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub value: String,
    pub widget: FieldWidget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Renders and validates a job's application form.
#[derive(Clone)]
pub struct FormEngine {
    registry: RendererRegistry,
    photos: PhotoPolicy,
}

impl Default for FormEngine {
    fn default() -> Self {
        Self::new(RendererRegistry::standard(), PhotoPolicy::default())
    }
}

impl FormEngine {
    pub fn new(registry: RendererRegistry, photos: PhotoPolicy) -> Self {
        Self { registry, photos }
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    pub fn photo_policy(&self) -> PhotoPolicy {
        self.photos
    }

    pub fn render_field(&self, field: &FieldConfig, value: &str) -> FieldWidget {
        self.registry.renderer_for(&field.key).render(field, value)
    }

    pub fn render(
        &self,
        config: &[FieldConfig],
        values: &FormValues,
        errors: &ValidationErrors,
    ) -> Vec<RenderedField> {
        enabled_fields(config)
            .into_iter()
            .map(|field| {
                let value = values.get(&field.key).to_string();
                RenderedField {
                    widget: self.render_field(&field, &value),
                    required: field.validation == FieldValidation::Mandatory,
                    error: errors.get(&field.key).map(str::to_string),
                    key: field.key,
                    label: field.label,
                    value,
                }
            })
            .collect()
    }

    pub fn validate(
        &self,
        config: &[FieldConfig],
        values: &FormValues,
        photo: Option<&PhotoUpload>,
    ) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        for field in config.iter().filter(|field| field.validation.is_enabled()) {
            let mandatory = field.validation == FieldValidation::Mandatory;

            if field.key == PHOTO_PROFILE {
                match photo {
                    Some(photo) => {
                        if let Err(err) = self.photos.check(photo) {
                            errors.insert(&field.key, self.photos.message_for(&err));
                        }
                    }
                    None if mandatory => {
                        errors.insert(&field.key, format!("{} is required", field.label));
                    }
                    None => {}
                }
                continue;
            }

            let value = values.get(&field.key).trim();
            if value.is_empty() {
                if mandatory {
                    errors.insert(&field.key, format!("{} is required", field.label));
                }
                continue;
            }

            if let Some(message) = self.registry.renderer_for(&field.key).validate(field, value) {
                errors.insert(&field.key, message);
            }
        }

        errors
    }

    /// Map enabled, non-photo fields to stored attributes in display order.
    pub fn attributes(
        &self,
        config: &[FieldConfig],
        values: &FormValues,
    ) -> Vec<CandidateAttribute> {
        enabled_fields(config)
            .into_iter()
            .filter(|field| field.key != PHOTO_PROFILE)
            .enumerate()
            .map(|(index, field)| CandidateAttribute {
                value: values.get(&field.key).trim().to_string(),
                key: field.key,
                label: field.label,
                order: index as u32 + 1,
            })
            .collect()
    }
}
