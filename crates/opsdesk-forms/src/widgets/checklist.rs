//! Checklist widget

use crate::ids::IdGenerator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub checked: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChecklistProgress {
    pub checked: usize,
    pub total: usize,
    /// 0 for an empty list
    pub percent: u8,
}

/// Flat, ordered list of checkable items
pub struct Checklist {
    items: Vec<ChecklistItem>,
    ids: Arc<dyn IdGenerator>,
}

impl Checklist {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            items: Vec::new(),
            ids,
        }
    }

    /// Restore a saved list
    pub fn with_items(ids: Arc<dyn IdGenerator>, items: Vec<ChecklistItem>) -> Self {
        Self { items, ids }
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Append an unchecked item and return its id. Blank labels are ignored.
    pub fn add(&mut self, label: impl Into<String>) -> Option<String> {
        let label = label.into();
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        let id = self.ids.next_id();
        self.items.push(ChecklistItem {
            id: id.clone(),
            label: label.to_string(),
            checked: false,
        });
        Some(id)
    }

    /// Flip an item; returns the new state
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.checked = !item.checked;
        Some(item.checked)
    }

    pub fn set_checked(&mut self, id: &str, checked: bool) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.checked = checked;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<ChecklistItem> {
        let index = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn progress(&self) -> ChecklistProgress {
        let total = self.items.len();
        let checked = self.items.iter().filter(|i| i.checked).count();
        ChecklistProgress {
            checked,
            total,
            percent: if total == 0 { 0 } else { (checked * 100 / total) as u8 },
        }
    }

    /// Non-empty and every item checked
    pub fn is_complete(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.checked)
    }
}
