use std::collections::BTreeMap;

use foundation::ids::{LevelIndex, RegionId};

use crate::batch::{BatchId, RegionAttributes, RenderBatch};
use crate::material::BoundaryMaterial;

/// Rendering collaborator.
///
/// The engine adds and removes whole batches, reports attribute writes once
/// per tick, and pushes the material every tick.
pub trait RenderSink {
    fn add_batch(&mut self, batch: &RenderBatch);
    fn remove_batch(&mut self, id: BatchId);
    fn attributes_changed(&mut self, batch: &RenderBatch);
    fn push_material(&mut self, material: &BoundaryMaterial);
}

/// Scene mirror kept by [`HeadlessSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBatch {
    pub id: BatchId,
    pub level: LevelIndex,
    pub triangles: usize,
    pub attributes: BTreeMap<RegionId, RegionAttributes>,
}

impl SceneBatch {
    fn capture(batch: &RenderBatch) -> Self {
        Self {
            id: batch.id(),
            level: batch.level(),
            triangles: batch
                .geometry()
                .regions
                .iter()
                .map(|r| r.solid.triangle_count())
                .sum(),
            attributes: batch.iter().map(|(id, a)| (id.clone(), *a)).collect(),
        }
    }
}

/// Sink without a GPU: mirrors what a renderer would hold.
#[derive(Debug, Default, Clone)]
pub struct HeadlessSink {
    batches: BTreeMap<BatchId, SceneBatch>,
    material: Option<BoundaryMaterial>,
    pub adds: usize,
    pub removes: usize,
    pub attribute_updates: usize,
    pub material_pushes: usize,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> impl Iterator<Item = &SceneBatch> + '_ {
        self.batches.values()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// The only batch in the scene, if there is exactly one.
    pub fn active(&self) -> Option<&SceneBatch> {
        if self.batches.len() == 1 {
            self.batches.values().next()
        } else {
            None
        }
    }

    pub fn material(&self) -> Option<&BoundaryMaterial> {
        self.material.as_ref()
    }
}

impl RenderSink for HeadlessSink {
    fn add_batch(&mut self, batch: &RenderBatch) {
        self.adds += 1;
        self.batches.insert(batch.id(), SceneBatch::capture(batch));
    }

    fn remove_batch(&mut self, id: BatchId) {
        self.removes += 1;
        self.batches.remove(&id);
    }

    fn attributes_changed(&mut self, batch: &RenderBatch) {
        self.attribute_updates += 1;
        if let Some(scene) = self.batches.get_mut(&batch.id()) {
            scene.attributes = batch.iter().map(|(id, a)| (id.clone(), *a)).collect();
        }
    }

    fn push_material(&mut self, material: &BoundaryMaterial) {
        self.material_pushes += 1;
        self.material = Some(material.clone());
    }
}
