//! Multi-select of rule ids for bulk deletion.

use std::collections::BTreeSet;

use crate::error::RuleValidationError;
use crate::types::DbId;

/// Rule ids ticked for deletion in one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSelection {
    ids: BTreeSet<DbId>,
}

impl RuleSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Flip one id. Returns whether it is now selected.
    pub fn toggle_one(&mut self, id: DbId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Select every id in `visible`, or clear the selection when all of
    /// them are already selected.
    pub fn toggle_all(&mut self, visible: &[DbId]) {
        let all_selected = !visible.is_empty()
            && self.ids.len() == visible.len()
            && visible.iter().all(|id| self.ids.contains(id));
        if all_selected {
            self.ids.clear();
        } else {
            self.ids = visible.iter().copied().collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selected ids in ascending order, rejecting an empty selection.
    pub fn ids(&self) -> Result<Vec<DbId>, RuleValidationError> {
        if self.ids.is_empty() {
            return Err(RuleValidationError::EmptySelection);
        }
        Ok(self.ids.iter().copied().collect())
    }
}
