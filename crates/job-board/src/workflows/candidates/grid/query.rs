//! Pure view computations over a loaded candidate list.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PageSize;
use crate::workflows::candidates::domain::Candidate;

/// Placeholder shown for a missing or empty cell.
pub const SENTINEL: &str = "-";

/// Column key that reads the candidate's photo URL instead of an attribute.
pub const PHOTO_COLUMN: &str = "photo_url";

pub fn cell_value<'a>(candidate: &'a Candidate, key: &str) -> &'a str {
    let value = if key == PHOTO_COLUMN {
        candidate.photo_url.as_str()
    } else {
        candidate
            .attribute(key)
            .map(|attribute| attribute.value.as_str())
            .unwrap_or("")
    };

    if value.is_empty() {
        SENTINEL
    } else {
        value
    }
}

/// Column key to substring needle. Every entry must match for a row to stay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, String>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty needle clears the column's filter.
    pub fn set(&mut self, key: &str, needle: &str) {
        if needle.is_empty() {
            self.0.remove(key);
        } else {
            self.0.insert(key.to_string(), needle.to_string());
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(key, needle)| (key.as_str(), needle.as_str()))
    }

    pub fn matches(&self, candidate: &Candidate) -> bool {
        self.0.iter().all(|(key, needle)| {
            cell_value(candidate, key)
                .to_lowercase()
                .contains(&needle.to_lowercase())
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::default();
        for (key, needle) in iter {
            filters.set(&key.into(), &needle.into());
        }
        filters
    }
}

pub fn apply_filters<'a>(candidates: &'a [Candidate], filters: &FilterSet) -> Vec<&'a Candidate> {
    candidates
        .iter()
        .filter(|candidate| filters.matches(candidate))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn asc(key: &str) -> Self {
        Self {
            key: key.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: &str) -> Self {
        Self {
            key: key.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Header click: `none -> asc -> desc -> none` on one column. Another column starts at `asc`.
pub fn sort_cycle(current: Option<&SortConfig>, clicked: &str) -> Option<SortConfig> {
    match current {
        Some(sort) if sort.key == clicked => match sort.direction {
            SortDirection::Asc => Some(SortConfig::desc(clicked)),
            SortDirection::Desc => None,
        },
        _ => Some(SortConfig::asc(clicked)),
    }
}

/// Stable sort by cell text. Sentinel cells sink to the bottom in both directions.
pub fn apply_sort(rows: &mut [&Candidate], sort: Option<&SortConfig>) {
    let Some(sort) = sort else {
        return;
    };

    rows.sort_by(|left, right| {
        let left = cell_value(left, &sort.key);
        let right = cell_value(right, &sort.key);
        match (left == SENTINEL, right == SENTINEL) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match sort.direction {
                SortDirection::Asc => left.cmp(right),
                SortDirection::Desc => right.cmp(left),
            },
        }
    });
}

/// One page of a sequence plus the numbers behind "Showing x to y of z".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    /// 1-based index of the first row, 0 when empty.
    pub start: usize,
    /// 1-based index of the last row, 0 when empty.
    pub end: usize,
}

pub fn total_pages(total: usize, page_size: PageSize) -> usize {
    total.div_ceil(page_size.rows()).max(1)
}

/// Clamp `page` into `[1, total_pages]` and slice that page out.
pub fn paginate<T>(items: &[T], page: usize, page_size: PageSize) -> Page<'_, T> {
    let total = items.len();
    let size = page_size.rows();
    let total_pages = total_pages(total, page_size);
    let page = page.clamp(1, total_pages);

    let offset = (page - 1) * size;
    let end = (offset + size).min(total);
    let slice = &items[offset.min(total)..end];

    Page {
        items: slice,
        page,
        total_pages,
        total,
        start: if slice.is_empty() { 0 } else { offset + 1 },
        end: if slice.is_empty() { 0 } else { end },
    }
}
