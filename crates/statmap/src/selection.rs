use foundation::ids::RegionId;

use crate::batch::RenderBatch;

/// At most one selected region.
///
/// The tracked id survives level switches even though the new batch starts
/// unselected; the flag is not re-applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: Option<RegionId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&RegionId> {
        self.selected.as_ref()
    }

    /// Returns `true` when the tracked id changed.
    pub fn set_selected(&mut self, id: Option<RegionId>, batch: Option<&mut RenderBatch>) -> bool {
        if let Some(batch) = batch {
            if let Some(prev) = &self.selected {
                batch.set_selected(prev.as_str(), false);
            }
            if let Some(next) = &id {
                batch.set_selected(next.as_str(), true);
            }
        }
        let changed = self.selected != id;
        self.selected = id;
        changed
    }
}
