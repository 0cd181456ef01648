use statmap::batch::{BatchId, RenderBatch};
use statmap::material::BoundaryMaterial;
use statmap::render::{HeadlessSink, RenderSink};
use statmap::symbology::{displayed_height, hue_ramp, is_visible};
use tracing::{debug, info};

/// Headless scene that reports what a renderer would be drawing.
#[derive(Default)]
pub struct LoggingSink {
    scene: HeadlessSink,
}

impl LoggingSink {
    pub fn scene(&self) -> &HeadlessSink {
        &self.scene
    }

    /// Regions drawn at the current blend (no-data regions are hidden).
    pub fn visible_regions(&self) -> usize {
        let blend = self.scene.material().map_or(0.0, |m| m.height_morph());
        self.scene
            .active()
            .map(|batch| {
                batch
                    .attributes
                    .values()
                    .filter(|a| is_visible(displayed_height(a.height1, a.height2, blend)))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Shader colour of a region at the current blend.
    pub fn region_tint(&self, id: &str) -> Option<[f32; 3]> {
        let blend = self.scene.material().map_or(0.0, |m| m.height_morph());
        let attrs = self.scene.active()?.attributes.get(id)?;
        let height = displayed_height(attrs.height1, attrs.height2, blend);
        Some(hue_ramp(1.0 - height))
    }
}

impl RenderSink for LoggingSink {
    fn add_batch(&mut self, batch: &RenderBatch) {
        self.scene.add_batch(batch);
        info!(
            batch = batch.id().0,
            level = batch.level().0,
            regions = batch.len(),
            "batch added"
        );
    }

    fn remove_batch(&mut self, id: BatchId) {
        self.scene.remove_batch(id);
        info!(batch = id.0, "batch removed");
    }

    fn attributes_changed(&mut self, batch: &RenderBatch) {
        self.scene.attributes_changed(batch);
        debug!(batch = batch.id().0, "attributes changed");
    }

    fn push_material(&mut self, material: &BoundaryMaterial) {
        self.scene.push_material(material);
    }
}
