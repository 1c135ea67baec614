use std::collections::BTreeSet;

use crate::workflows::candidates::domain::CandidateId;

/// Checked rows, tracked by candidate id so they survive sorting and filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<CandidateId>,
}

impl Selection {
    pub fn set(&mut self, id: &CandidateId, checked: bool) {
        if checked {
            self.ids.insert(id.clone());
        } else {
            self.ids.remove(id);
        }
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        self.ids.contains(id)
    }

    /// Header checkbox: affects only the ids on the current page.
    pub fn set_page<'a>(&mut self, page: impl IntoIterator<Item = &'a CandidateId>, checked: bool) {
        for id in page {
            self.set(id, checked);
        }
    }

    /// True iff the page has rows and every one of them is checked.
    pub fn covers<'a>(&self, page: impl IntoIterator<Item = &'a CandidateId>) -> bool {
        let mut seen = false;
        for id in page {
            if !self.ids.contains(id) {
                return false;
            }
            seen = true;
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> impl Iterator<Item = &CandidateId> {
        self.ids.iter()
    }
}
