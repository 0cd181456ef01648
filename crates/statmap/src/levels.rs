use std::collections::BTreeMap;
use std::sync::Arc;

use foundation::ids::LevelIndex;
use tracing::info;

use crate::batch::{BatchId, RenderBatch};
use crate::geometry::LevelGeometry;
use crate::render::RenderSink;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LevelState {
    Unloaded,
    Loaded,
    Active,
}

/// Owns loaded level geometry and the single active batch.
#[derive(Debug, Default)]
pub struct BoundaryLevelManager {
    levels: BTreeMap<LevelIndex, Arc<LevelGeometry>>,
    desired: Option<LevelIndex>,
    active: Option<LevelIndex>,
    batch: Option<RenderBatch>,
    // Active level's geometry was replaced by a later load.
    active_replaced: bool,
    next_batch: u64,
}

impl BoundaryLevelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a built level, replacing earlier geometry for the same index.
    pub fn insert_level(&mut self, geometry: LevelGeometry) {
        let level = geometry.level;
        if self.active == Some(level) {
            self.active_replaced = true;
        }
        self.levels.insert(level, Arc::new(geometry));
    }

    pub fn state(&self, level: LevelIndex) -> LevelState {
        if self.active == Some(level) {
            LevelState::Active
        } else if self.levels.contains_key(&level) {
            LevelState::Loaded
        } else {
            LevelState::Unloaded
        }
    }

    pub fn loaded_levels(&self) -> impl Iterator<Item = LevelIndex> + '_ {
        self.levels.keys().copied()
    }

    pub fn desired_level(&self) -> Option<LevelIndex> {
        self.desired
    }

    pub fn active_level(&self) -> Option<LevelIndex> {
        self.active
    }

    pub fn set_desired_level(&mut self, level: LevelIndex) {
        self.desired = Some(level);
    }

    pub fn batch(&self) -> Option<&RenderBatch> {
        self.batch.as_ref()
    }

    pub fn batch_mut(&mut self) -> Option<&mut RenderBatch> {
        self.batch.as_mut()
    }

    /// Swaps in the desired level once it is loaded. Returns the level that
    /// became active, if any; the caller owes it a statistics refresh.
    pub fn refresh(&mut self, sink: &mut dyn RenderSink) -> Option<LevelIndex> {
        let desired = self.desired?;
        if self.active == Some(desired) && !self.active_replaced {
            return None;
        }
        let geometry = Arc::clone(self.levels.get(&desired)?);

        if let Some(old) = self.batch.take() {
            sink.remove_batch(old.id());
        }
        self.next_batch += 1;
        let batch = RenderBatch::new(BatchId(self.next_batch), geometry);
        sink.add_batch(&batch);

        info!(
            level = desired.0,
            previous = ?self.active.map(|l| l.0),
            regions = batch.len(),
            "boundary level activated"
        );
        self.batch = Some(batch);
        self.active = Some(desired);
        self.active_replaced = false;
        Some(desired)
    }
}
