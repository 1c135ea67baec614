//! Field renderers keyed by field key.
//!
//! Each renderer describes the input widget for one kind of field and may add a
//! type-specific check on non-empty values. New field kinds are added by
//! registering another renderer; the engine itself never matches on keys.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::workflows::jobs::domain::{
    FieldConfig, DATE_OF_BIRTH, DOMICILE, EMAIL, FULL_NAME, GENDER, LINKEDIN_LINK, PHONE_NUMBER,
    PHOTO_PROFILE,
};

use super::photo::DEFAULT_MAX_PHOTO_BYTES;

/// Input widget description handed to whatever draws the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldWidget {
    Text {
        placeholder: &'static str,
    },
    Date {
        placeholder: &'static str,
    },
    SingleChoice {
        options: Vec<ChoiceOption>,
        selected: Option<String>,
    },
    Typeahead {
        placeholder: &'static str,
        suggestions: Vec<&'static str>,
    },
    Phone {
        placeholder: &'static str,
        country_codes: Vec<CountryCode>,
        selected_country: CountryCode,
    },
    Email {
        placeholder: &'static str,
    },
    Url {
        placeholder: &'static str,
    },
    PhotoCapture {
        accept: &'static str,
        max_bytes: usize,
    },
}

impl FieldWidget {
    /// Same tag the widget serializes under.
    pub const fn kind(&self) -> &'static str {
        match self {
            FieldWidget::Text { .. } => "text",
            FieldWidget::Date { .. } => "date",
            FieldWidget::SingleChoice { .. } => "single_choice",
            FieldWidget::Typeahead { .. } => "typeahead",
            FieldWidget::Phone { .. } => "phone",
            FieldWidget::Email { .. } => "email",
            FieldWidget::Url { .. } => "url",
            FieldWidget::PhotoCapture { .. } => "photo_capture",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountryCode {
    pub code: &'static str,
    pub country: &'static str,
    pub flag: &'static str,
}

pub const COUNTRY_CODES: &[CountryCode] = &[
    CountryCode { code: "+62", country: "Indonesia", flag: "🇮🇩" },
    CountryCode { code: "+60", country: "Malaysia", flag: "🇲🇾" },
    CountryCode { code: "+65", country: "Singapore", flag: "🇸🇬" },
    CountryCode { code: "+66", country: "Thailand", flag: "🇹🇭" },
    CountryCode { code: "+63", country: "Philippines", flag: "🇵🇭" },
    CountryCode { code: "+84", country: "Vietnam", flag: "🇻🇳" },
    CountryCode { code: "+61", country: "Australia", flag: "🇦🇺" },
    CountryCode { code: "+81", country: "Japan", flag: "🇯🇵" },
    CountryCode { code: "+44", country: "United Kingdom", flag: "🇬🇧" },
    CountryCode { code: "+1", country: "United States", flag: "🇺🇸" },
];

pub const PROVINCES: &[&str] = &[
    "Aceh",
    "Sumatera Utara",
    "Sumatera Barat",
    "Riau",
    "Kepulauan Riau",
    "Jambi",
    "Bengkulu",
    "Sumatera Selatan",
    "Kepulauan Bangka Belitung",
    "Lampung",
    "Banten",
    "DKI Jakarta",
    "Jawa Barat",
    "Jawa Tengah",
    "DI Yogyakarta",
    "Jawa Timur",
    "Bali",
    "Nusa Tenggara Barat",
    "Nusa Tenggara Timur",
    "Kalimantan Barat",
    "Kalimantan Tengah",
    "Kalimantan Selatan",
    "Kalimantan Timur",
    "Kalimantan Utara",
    "Sulawesi Utara",
    "Gorontalo",
    "Sulawesi Tengah",
    "Sulawesi Barat",
    "Sulawesi Selatan",
    "Sulawesi Tenggara",
    "Maluku",
    "Maluku Utara",
    "Papua",
    "Papua Barat",
    "Papua Barat Daya",
    "Papua Tengah",
    "Papua Pegunungan",
    "Papua Selatan",
];

/// Capability implemented once per field kind.
pub trait FieldRenderer: Send + Sync {
    fn render(&self, field: &FieldConfig, value: &str) -> FieldWidget;

    /// Format check applied to non-empty values whether or not the field is mandatory.
    fn validate(&self, _field: &FieldConfig, _value: &str) -> Option<String> {
        None
    }
}

pub struct TextRenderer {
    pub placeholder: &'static str,
}

impl FieldRenderer for TextRenderer {
    fn render(&self, _field: &FieldConfig, _value: &str) -> FieldWidget {
        FieldWidget::Text {
            placeholder: self.placeholder,
        }
    }
}

pub struct DateRenderer;

impl FieldRenderer for DateRenderer {
    fn render(&self, _field: &FieldConfig, _value: &str) -> FieldWidget {
        FieldWidget::Date {
            placeholder: "Select your date",
        }
    }
}

pub struct GenderRenderer;

impl FieldRenderer for GenderRenderer {
    fn render(&self, _field: &FieldConfig, value: &str) -> FieldWidget {
        let options = vec![
            ChoiceOption {
                value: "Female",
                label: "She/her (Female)",
            },
            ChoiceOption {
                value: "Male",
                label: "He/him (Male)",
            },
        ];
        let selected = options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.value.to_string());
        FieldWidget::SingleChoice { options, selected }
    }
}

/// Typeahead over a fixed option list, narrowed by the current input.
pub struct TypeaheadRenderer {
    pub placeholder: &'static str,
    pub options: &'static [&'static str],
}

impl TypeaheadRenderer {
    pub fn suggestions(&self, query: &str) -> Vec<&'static str> {
        let needle = query.trim().to_lowercase();
        self.options
            .iter()
            .copied()
            .filter(|option| option.to_lowercase().contains(&needle))
            .collect()
    }
}

impl FieldRenderer for TypeaheadRenderer {
    fn render(&self, _field: &FieldConfig, value: &str) -> FieldWidget {
        FieldWidget::Typeahead {
            placeholder: self.placeholder,
            suggestions: self.suggestions(value),
        }
    }
}

pub struct PhoneRenderer;

impl FieldRenderer for PhoneRenderer {
    fn render(&self, _field: &FieldConfig, _value: &str) -> FieldWidget {
        FieldWidget::Phone {
            placeholder: "81XXXXXXXXX",
            country_codes: COUNTRY_CODES.to_vec(),
            selected_country: COUNTRY_CODES[0],
        }
    }
}

pub struct EmailRenderer;

impl FieldRenderer for EmailRenderer {
    fn render(&self, _field: &FieldConfig, _value: &str) -> FieldWidget {
        FieldWidget::Email {
            placeholder: "Enter your email address",
        }
    }

    fn validate(&self, _field: &FieldConfig, value: &str) -> Option<String> {
        (!is_valid_email(value)).then(|| "Invalid email format".to_string())
    }
}

pub struct LinkedInRenderer;

impl FieldRenderer for LinkedInRenderer {
    fn render(&self, _field: &FieldConfig, _value: &str) -> FieldWidget {
        FieldWidget::Url {
            placeholder: "https://linkedin.com/in/username",
        }
    }

    fn validate(&self, _field: &FieldConfig, value: &str) -> Option<String> {
        (!is_valid_linkedin_url(value)).then(|| "Invalid LinkedIn URL".to_string())
    }
}

pub struct PhotoRenderer {
    pub max_bytes: usize,
}

impl FieldRenderer for PhotoRenderer {
    fn render(&self, _field: &FieldConfig, _value: &str) -> FieldWidget {
        FieldWidget::PhotoCapture {
            accept: "image/*",
            max_bytes: self.max_bytes,
        }
    }
}

/// `local@domain.tld`: no whitespace, a single `@`, and some dot inside the
/// domain with text on both sides.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < domain.len())
}

/// Deliberately loose: any value mentioning `linkedin.com` passes.
pub fn is_valid_linkedin_url(value: &str) -> bool {
    value.contains("linkedin.com")
}

/// Lookup table from field key to renderer, with a plain-text fallback.
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn FieldRenderer>>,
    fallback: Arc<dyn FieldRenderer>,
}

impl RendererRegistry {
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Arc::new(TextRenderer { placeholder: "" }),
        }
    }

    pub fn standard() -> Self {
        Self::with_photo_limit(DEFAULT_MAX_PHOTO_BYTES)
    }

    pub fn with_photo_limit(max_bytes: usize) -> Self {
        Self::empty()
            .register(
                FULL_NAME,
                TextRenderer {
                    placeholder: "Enter your full name",
                },
            )
            .register(DATE_OF_BIRTH, DateRenderer)
            .register(GENDER, GenderRenderer)
            .register(
                DOMICILE,
                TypeaheadRenderer {
                    placeholder: "Choose your domicile",
                    options: PROVINCES,
                },
            )
            .register(PHONE_NUMBER, PhoneRenderer)
            .register(EMAIL, EmailRenderer)
            .register(LINKEDIN_LINK, LinkedInRenderer)
            .register(PHOTO_PROFILE, PhotoRenderer { max_bytes })
    }

    pub fn register<R>(mut self, key: &str, renderer: R) -> Self
    where
        R: FieldRenderer + 'static,
    {
        self.renderers.insert(key.to_string(), Arc::new(renderer));
        self
    }

    pub fn renderer_for(&self, key: &str) -> &dyn FieldRenderer {
        self.renderers
            .get(key)
            .map(|renderer| &**renderer)
            .unwrap_or_else(|| &*self.fallback)
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.renderers.contains_key(key)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
