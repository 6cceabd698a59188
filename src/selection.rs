use std::collections::BTreeSet;

use tracing::trace;

use crate::record::RecordId;

/// Selected record ids, keyed by id so that selections survive filtering,
/// sorting, paging and replacement of the record set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<RecordId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it otherwise.
    pub fn toggle(&mut self, id: RecordId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Header checkbox. A fully selected page clears the whole selection,
    /// otherwise every id of the page is added and nothing is removed.
    /// An empty page counts as fully selected here.
    pub fn toggle_all_visible(&mut self, page_ids: &[RecordId]) {
        if page_ids.iter().all(|id| self.selected.contains(id)) {
            trace!("Clearing selection of {} ids", self.selected.len());
            self.selected.clear();
        } else {
            self.selected.extend(page_ids.iter().copied());
        }
    }

    pub fn is_all_visible_selected(&self, page_ids: &[RecordId]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.selected.contains(id))
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selected.contains(&id)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.selected.iter().copied()
    }
}
