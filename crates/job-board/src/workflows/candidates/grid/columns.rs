use serde::{Deserialize, Serialize};

use super::query::PHOTO_COLUMN;
use super::GridError;
use crate::workflows::applications::engine::enabled_fields;
use crate::workflows::jobs::domain::{FieldConfig, PHOTO_PROFILE};

pub const MIN_COLUMN_WIDTH: u32 = 80;
const DERIVED_COLUMN_WIDTH: u32 = 180;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: String,
    pub label: String,
    pub width: u32,
    pub visible: bool,
}

impl ColumnConfig {
    pub fn new(key: &str, label: &str, width: u32) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            width: width.max(MIN_COLUMN_WIDTH),
            visible: true,
        }
    }
}

pub fn default_columns() -> Vec<ColumnConfig> {
    vec![
        ColumnConfig::new(PHOTO_COLUMN, "Photo", 180),
        ColumnConfig::new("full_name", "Nama Lengkap", 200),
        ColumnConfig::new("email", "Email Address", 220),
        ColumnConfig::new("phone_number", "Phone Numbers", 160),
        ColumnConfig::new("date_of_birth", "Date of Birth", 150),
        ColumnConfig::new("domicile", "Domicile", 160),
        ColumnConfig::new("gender", "Gender", 110),
        ColumnConfig::new("linkedin_link", "Link LinkedIn", 220),
    ]
}

/// One column per enabled field, in form order. The photo field becomes the photo column.
pub fn columns_for_fields(config: &[FieldConfig]) -> Vec<ColumnConfig> {
    enabled_fields(config)
        .iter()
        .map(|field| {
            if field.key == PHOTO_PROFILE {
                ColumnConfig::new(PHOTO_COLUMN, &field.label, DERIVED_COLUMN_WIDTH)
            } else {
                ColumnConfig::new(&field.key, &field.label, DERIVED_COLUMN_WIDTH)
            }
        })
        .collect()
}

/// Ordered column list owned by one grid session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnLayout {
    columns: Vec<ColumnConfig>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new(default_columns())
    }
}

impl ColumnLayout {
    pub fn new(columns: Vec<ColumnConfig>) -> Self {
        Self { columns }
    }

    pub fn all(&self) -> &[ColumnConfig] {
        &self.columns
    }

    pub fn visible(&self) -> impl Iterator<Item = &ColumnConfig> {
        self.columns.iter().filter(|column| column.visible)
    }

    pub fn get(&self, key: &str) -> Option<&ColumnConfig> {
        self.columns.iter().find(|column| column.key == key)
    }

    fn position(&self, key: &str) -> Result<usize, GridError> {
        self.columns
            .iter()
            .position(|column| column.key == key)
            .ok_or_else(|| GridError::UnknownColumn(key.to_string()))
    }

    /// Move `dragged` to the index `target` occupied. Returns false when nothing moved.
    pub fn reorder(&mut self, dragged: &str, target: &str) -> Result<bool, GridError> {
        let from = self.position(dragged)?;
        let to = self.position(target)?;
        if from == to {
            return Ok(false);
        }

        let column = self.columns.remove(from);
        self.columns.insert(to, column);
        Ok(true)
    }

    /// Width is floored at [`MIN_COLUMN_WIDTH`]. Other columns are untouched.
    pub fn set_width(&mut self, key: &str, width: u32) -> Result<u32, GridError> {
        let index = self.position(key)?;
        let width = width.max(MIN_COLUMN_WIDTH);
        self.columns[index].width = width;
        Ok(width)
    }

    /// Flip a column's visibility and return the new state.
    pub fn toggle_visibility(&mut self, key: &str) -> Result<bool, GridError> {
        let index = self.position(key)?;
        let column = &mut self.columns[index];
        column.visible = !column.visible;
        Ok(column.visible)
    }

    /// Show only the listed keys, in the listed order first.
    /// Unlisted columns stay hidden at the end.
    pub fn show_only(&mut self, keys: &[&str]) -> Result<(), GridError> {
        for key in keys {
            self.position(key)?;
        }

        let mut ordered = Vec::with_capacity(self.columns.len());
        for key in keys {
            if let Some(index) = self.columns.iter().position(|column| column.key == *key) {
                let mut column = self.columns.remove(index);
                column.visible = true;
                ordered.push(column);
            }
        }
        for mut column in self.columns.drain(..) {
            column.visible = false;
            ordered.push(column);
        }
        self.columns = ordered;
        Ok(())
    }
}

/// Pointer gesture for resizing a column edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResizeGesture {
    #[default]
    Idle,
    Dragging {
        key: String,
        start_x: i32,
        start_width: u32,
    },
}

impl ResizeGesture {
    pub fn begin(layout: &ColumnLayout, key: &str, start_x: i32) -> Result<Self, GridError> {
        let column = layout
            .get(key)
            .ok_or_else(|| GridError::UnknownColumn(key.to_string()))?;
        Ok(ResizeGesture::Dragging {
            key: key.to_string(),
            start_x,
            start_width: column.width,
        })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ResizeGesture::Dragging { .. })
    }

    /// Width for the pointer at `x`, or `None` while idle.
    pub fn width_at(&self, x: i32) -> Option<(&str, u32)> {
        match self {
            ResizeGesture::Idle => None,
            ResizeGesture::Dragging {
                key,
                start_x,
                start_width,
            } => {
                let width = i64::from(*start_width) + i64::from(x) - i64::from(*start_x);
                let width = width.clamp(i64::from(MIN_COLUMN_WIDTH), i64::from(u32::MAX));
                Some((key.as_str(), width as u32))
            }
        }
    }
}

/// Header drag-and-drop for column reordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragGesture {
    #[default]
    Idle,
    Dragging {
        key: String,
        over: Option<String>,
    },
}

impl DragGesture {
    pub fn is_active(&self) -> bool {
        matches!(self, DragGesture::Dragging { .. })
    }

    pub fn dragged(&self) -> Option<&str> {
        match self {
            DragGesture::Idle => None,
            DragGesture::Dragging { key, .. } => Some(key),
        }
    }

    /// Hovering the dragged column over itself shows no drop target.
    pub fn hover(&mut self, target: &str) {
        if let DragGesture::Dragging { key, over } = self {
            *over = (key != target).then(|| target.to_string());
        }
    }
}
