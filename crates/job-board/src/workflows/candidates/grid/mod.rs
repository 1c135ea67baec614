//! Candidate grid engine.
//!
//! A [`CandidateGrid`] owns one admin session over an already loaded candidate
//! list: column layout, filters, sort, page, row selection, and the two pointer
//! gestures (column resize and header drag). Every read goes through
//! [`CandidateGrid::view`], which filters, sorts, and paginates on demand so
//! the session never holds derived state that could drift.

pub mod columns;
pub mod query;
pub mod selection;

use std::mem;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use self::columns::{ColumnConfig, ColumnLayout, DragGesture, ResizeGesture};
use self::query::{
    apply_filters, apply_sort, cell_value, paginate, sort_cycle, FilterSet, SortConfig,
};
use self::selection::Selection;
use crate::workflows::candidates::domain::{Candidate, CandidateId};

/// Rows per page offered by the grid footer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "usize", try_from = "usize")]
pub enum PageSize {
    #[default]
    Ten,
    TwentyFive,
    Fifty,
    OneHundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::Ten,
        PageSize::TwentyFive,
        PageSize::Fifty,
        PageSize::OneHundred,
    ];

    pub const fn rows(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
            PageSize::OneHundred => 100,
        }
    }

    pub fn from_rows(rows: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.rows() == rows)
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.rows()
    }
}

impl TryFrom<usize> for PageSize {
    type Error = GridError;

    fn try_from(rows: usize) -> Result<Self, Self::Error> {
        PageSize::from_rows(rows).ok_or(GridError::InvalidPageSize(rows))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("page size {0} is not one of 10, 25, 50, 100")]
    InvalidPageSize(usize),
    #[error("no column gesture in progress")]
    NoActiveGesture,
}

/// Footer numbers for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: PageSize,
    pub total_pages: usize,
    pub total: usize,
    pub start: usize,
    pub end: usize,
}

impl PageInfo {
    pub fn summary(&self) -> String {
        format!("Showing {} to {} of {}", self.start, self.end, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub id: CandidateId,
    pub selected: bool,
    pub applied_date: DateTime<Utc>,
    /// One cell per visible column, in column order.
    pub cells: Vec<String>,
}

/// Everything needed to draw the grid once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridView {
    pub columns: Vec<ColumnConfig>,
    pub rows: Vec<GridRow>,
    pub page: PageInfo,
    pub sort: Option<SortConfig>,
    pub filters: FilterSet,
    pub active_filters: usize,
    pub selected: usize,
    pub all_selected: bool,
}

/// One admin session over a job's candidates.
#[derive(Debug, Clone)]
pub struct CandidateGrid {
    candidates: Vec<Candidate>,
    columns: ColumnLayout,
    filters: FilterSet,
    sort: Option<SortConfig>,
    page: usize,
    page_size: PageSize,
    selection: Selection,
    resize: ResizeGesture,
    drag: DragGesture,
}

impl CandidateGrid {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            columns: ColumnLayout::default(),
            filters: FilterSet::new(),
            sort: None,
            page: 1,
            page_size: PageSize::default(),
            selection: Selection::default(),
            resize: ResizeGesture::Idle,
            drag: DragGesture::Idle,
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnConfig>) -> Self {
        self.columns = ColumnLayout::new(columns);
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn columns(&self) -> &ColumnLayout {
        &self.columns
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortConfig> {
        self.sort.as_ref()
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn resize_gesture(&self) -> &ResizeGesture {
        &self.resize
    }

    pub fn drag_gesture(&self) -> &DragGesture {
        &self.drag
    }

    /// Filtered then sorted rows, before pagination.
    pub fn rows(&self) -> Vec<&Candidate> {
        let mut rows = apply_filters(&self.candidates, &self.filters);
        apply_sort(&mut rows, self.sort.as_ref());
        rows
    }

    /// Requested page clamped to the pages that currently exist.
    pub fn current_page(&self) -> usize {
        let total = self.rows().len();
        self.page.clamp(1, query::total_pages(total, self.page_size))
    }

    pub fn click_sort(&mut self, key: &str) -> Option<&SortConfig> {
        self.sort = sort_cycle(self.sort.as_ref(), key);
        debug!(column = key, sort = ?self.sort, "grid sort changed");
        self.sort.as_ref()
    }

    pub fn set_sort(&mut self, sort: Option<SortConfig>) {
        self.sort = sort;
    }

    pub fn set_filter(&mut self, key: &str, needle: &str) {
        self.filters.set(key, needle);
        self.page = 1;
    }

    pub fn clear_filter(&mut self, key: &str) -> bool {
        self.page = 1;
        self.filters.remove(key)
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 1;
    }

    pub fn active_filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 1;
    }

    pub fn toggle_column(&mut self, key: &str) -> Result<bool, GridError> {
        self.columns.toggle_visibility(key)
    }

    pub fn show_columns(&mut self, keys: &[&str]) -> Result<(), GridError> {
        self.columns.show_only(keys)
    }

    pub fn begin_resize(&mut self, key: &str, x: i32) -> Result<(), GridError> {
        self.resize = ResizeGesture::begin(&self.columns, key, x)?;
        Ok(())
    }

    /// Pointer moved while resizing: the new width is committed immediately.
    pub fn resize_to(&mut self, x: i32) -> Result<u32, GridError> {
        let (key, width) = self.resize.width_at(x).ok_or(GridError::NoActiveGesture)?;
        self.columns.set_width(key, width)
    }

    /// Pointer released. Returns false when no resize was in progress.
    pub fn end_resize(&mut self) -> bool {
        mem::take(&mut self.resize).is_active()
    }

    pub fn begin_drag(&mut self, key: &str) -> Result<(), GridError> {
        if self.columns.get(key).is_none() {
            return Err(GridError::UnknownColumn(key.to_string()));
        }
        self.drag = DragGesture::Dragging {
            key: key.to_string(),
            over: None,
        };
        Ok(())
    }

    pub fn drag_over(&mut self, key: &str) {
        self.drag.hover(key);
    }

    /// Drop the dragged column onto `target`. Returns whether the layout changed.
    pub fn drop_on(&mut self, target: &str) -> Result<bool, GridError> {
        match mem::take(&mut self.drag) {
            DragGesture::Idle => Err(GridError::NoActiveGesture),
            DragGesture::Dragging { key, .. } => self.columns.reorder(&key, target),
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag = DragGesture::Idle;
    }

    pub fn select_row(&mut self, id: &CandidateId, checked: bool) {
        self.selection.set(id, checked);
    }

    /// Header checkbox. Only rows on the current page change.
    pub fn select_page(&mut self, checked: bool) {
        let ids = self.page_ids();
        self.selection.set_page(&ids, checked);
    }

    pub fn is_page_selected(&self) -> bool {
        self.selection.covers(&self.page_ids())
    }

    fn page_ids(&self) -> Vec<CandidateId> {
        let rows = self.rows();
        paginate(&rows, self.page, self.page_size)
            .items
            .iter()
            .map(|candidate| candidate.id.clone())
            .collect()
    }

    pub fn view(&self) -> GridView {
        let rows = self.rows();
        let page = paginate(&rows, self.page, self.page_size);
        let columns: Vec<ColumnConfig> = self.columns.visible().cloned().collect();

        let grid_rows: Vec<GridRow> = page
            .items
            .iter()
            .map(|candidate| GridRow {
                id: candidate.id.clone(),
                selected: self.selection.contains(&candidate.id),
                applied_date: candidate.applied_date,
                cells: columns
                    .iter()
                    .map(|column| cell_value(candidate, &column.key).to_string())
                    .collect(),
            })
            .collect();

        let all_selected = !grid_rows.is_empty() && grid_rows.iter().all(|row| row.selected);

        GridView {
            page: PageInfo {
                page: page.page,
                page_size: self.page_size,
                total_pages: page.total_pages,
                total: page.total,
                start: page.start,
                end: page.end,
            },
            columns,
            rows: grid_rows,
            sort: self.sort.clone(),
            filters: self.filters.clone(),
            active_filters: self.filters.len(),
            selected: self.selection.len(),
            all_selected,
        }
    }
}

/// Grid settings carried by a request, applied to a fresh session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridQuery {
    pub sort: Option<SortConfig>,
    pub filters: FilterSet,
    pub page: Option<usize>,
    pub page_size: Option<PageSize>,
    pub columns: Option<Vec<String>>,
}

impl GridQuery {
    pub fn apply(&self, grid: &mut CandidateGrid) -> Result<(), GridError> {
        if let Some(columns) = &self.columns {
            let keys: Vec<&str> = columns.iter().map(String::as_str).collect();
            grid.show_columns(&keys)?;
        }
        if let Some(page_size) = self.page_size {
            grid.set_page_size(page_size);
        }
        for (key, needle) in self.filters.iter() {
            grid.set_filter(key, needle);
        }
        grid.set_sort(self.sort.clone());
        if let Some(page) = self.page {
            grid.set_page(page);
        }
        Ok(())
    }
}
