use std::sync::Arc;

use formats::{BoundarySource, StatisticsDataset};
use futures_util::future::BoxFuture;
use foundation::ids::{LevelIndex, RegionId};
use foundation::time::Time;
use runtime::{
    ACTIVE_REGIONS, BOUNDARY_LOADS, Event, EventBus, EventKind, LEVEL_SWITCHES, LOAD_FAILURES,
    Metrics, PENDING_LOADS, STATISTICS_LOADS, STATISTICS_REFRESHES,
};
use streaming::{Fetcher, PendingLoads, Request};
use tracing::{debug, info, warn};

use crate::batch::RenderBatch;
use crate::cleaner::clean_regions;
use crate::config::StatMapConfig;
use crate::error::{LoadFailure, LoadTarget};
use crate::geometry::{BoundaryGeometryBuilder, EarcutExtruder, GeometryService, LevelGeometry};
use crate::levels::{BoundaryLevelManager, LevelState};
use crate::material::{BoundaryMaterial, HEIGHT_MORPH};
use crate::morph::MorphAnimator;
use crate::normalizer::{self, NormalizedSlice, RegionValue};
use crate::render::RenderSink;
use crate::selection::SelectionTracker;

/// Whether the active batch still owes a statistics refresh.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatisticsRefresh {
    Idle,
    Pending,
}

enum LoadOutcome {
    Boundaries(Result<LevelGeometry, LoadFailure>),
    Statistics(Result<StatisticsDataset, LoadFailure>),
}

/// Boundary and statistics morph engine for one viewer.
///
/// Everything happens inside [`StatMap::update`], called once per frame:
/// completed loads are applied, the desired level is swapped in, statistics
/// are re-normalized if stale, the morph advances, and the material is pushed.
pub struct StatMap {
    fetcher: Box<dyn Fetcher>,
    geometry: Arc<dyn GeometryService>,
    extrusion_height: f64,
    loads: PendingLoads<LoadOutcome>,
    levels: BoundaryLevelManager,
    dataset: Option<StatisticsDataset>,
    statistics: StatisticsRefresh,
    last_slice: Option<NormalizedSlice>,
    morph: MorphAnimator,
    selection: SelectionTracker,
    material: BoundaryMaterial,
    failures: Vec<LoadFailure>,
    events: EventBus,
    metrics: Metrics,
    tick: u64,
}

impl StatMap {
    pub fn new(config: &StatMapConfig, fetcher: Box<dyn Fetcher>) -> Self {
        Self::with_geometry_service(config, fetcher, Arc::new(EarcutExtruder))
    }

    pub fn with_geometry_service(
        config: &StatMapConfig,
        fetcher: Box<dyn Fetcher>,
        geometry: Arc<dyn GeometryService>,
    ) -> Self {
        let mut levels = BoundaryLevelManager::new();
        levels.set_desired_level(config.initial_level());
        Self {
            fetcher,
            geometry,
            extrusion_height: config.extrusion_height,
            loads: PendingLoads::new(),
            levels,
            dataset: None,
            statistics: StatisticsRefresh::Idle,
            last_slice: None,
            morph: MorphAnimator::new(config.transition_duration_s),
            selection: SelectionTracker::new(),
            material: BoundaryMaterial::new(),
            failures: Vec::new(),
            events: EventBus::new(),
            metrics: Metrics::new(),
            tick: 0,
        }
    }

    /// Starts fetching, cleaning and building `level` from `url`.
    pub fn load_boundaries(&mut self, url: &str, level: LevelIndex) -> Request {
        let fetch = self.fetcher.fetch(url);
        let service = Arc::clone(&self.geometry);
        let extrusion_height = self.extrusion_height;
        let url = url.to_string();

        let load = async move {
            let text = fetch.await.map_err(|error| LoadFailure::Fetch {
                target: LoadTarget::Boundaries(level),
                error,
            })?;
            let source =
                BoundarySource::from_geojson_str(&text).map_err(|e| LoadFailure::Boundaries {
                    level,
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
            let cleaned = clean_regions(&source.regions);
            debug!(
                %url,
                level = level.0,
                parts = cleaned.regions.len(),
                regions = cleaned.ids.len(),
                dropped_regions = cleaned.dropped_regions,
                dropped_holes = cleaned.dropped_holes,
                skipped_features = source.skipped_features,
                "boundaries cleaned"
            );
            let builder = BoundaryGeometryBuilder::new(service.as_ref(), extrusion_height);
            Ok::<_, LoadFailure>(builder.build_level(level, &cleaned.regions))
        };
        self.submit(Box::pin(async move { LoadOutcome::Boundaries(load.await) }))
    }

    pub fn load_statistics(&mut self, url: &str) -> Request {
        let fetch = self.fetcher.fetch(url);
        let url = url.to_string();

        let load = async move {
            let text = fetch.await.map_err(|error| LoadFailure::Fetch {
                target: LoadTarget::Statistics,
                error,
            })?;
            StatisticsDataset::from_json_str(&text).map_err(|e| LoadFailure::Statistics {
                url,
                reason: e.to_string(),
            })
        };
        self.submit(Box::pin(async move { LoadOutcome::Statistics(load.await) }))
    }

    fn submit(&mut self, load: BoxFuture<'static, LoadOutcome>) -> Request {
        let request = self.loads.submit(load);
        self.metrics.set_gauge(PENDING_LOADS, self.loads.len() as i64);
        request
    }

    /// Replaces the dataset with an already parsed one; applied on the next
    /// update.
    pub fn set_statistics(&mut self, dataset: StatisticsDataset) {
        self.dataset = Some(dataset);
        self.statistics = StatisticsRefresh::Pending;
    }

    pub fn set_desired_level(&mut self, level: LevelIndex) {
        self.levels.set_desired_level(level);
    }

    pub fn set_selected(&mut self, id: Option<RegionId>) {
        let label = id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        if self.selection.set_selected(id, self.levels.batch_mut()) {
            self.events.emit(self.tick, EventKind::SelectionChanged, label);
        }
    }

    pub fn update(&mut self, now: Time, sink: &mut dyn RenderSink) {
        self.tick += 1;
        self.apply_completed_loads();

        if let Some(level) = self.levels.refresh(sink) {
            self.metrics.inc_counter(LEVEL_SWITCHES, 1);
            let regions = self.levels.batch().map_or(0, RenderBatch::len);
            self.metrics.set_gauge(ACTIVE_REGIONS, regions as i64);
            self.events
                .emit(self.tick, EventKind::LevelActivated, format!("{level}: {regions} regions"));
            self.statistics = StatisticsRefresh::Pending;
        }

        self.refresh_statistics(now);

        let blend = self.morph.tick(now);
        self.material.set_uniform(HEIGHT_MORPH, blend as f32);

        if let Some(batch) = self.levels.batch_mut()
            && batch.take_changed()
        {
            sink.attributes_changed(batch);
        }
        sink.push_material(&self.material);
    }

    fn apply_completed_loads(&mut self) {
        for (request, outcome) in self.loads.poll_completed() {
            match outcome {
                LoadOutcome::Boundaries(Ok(geometry)) => {
                    let level = geometry.level;
                    info!(
                        request = request.0,
                        level = level.0,
                        regions = geometry.len(),
                        "boundaries loaded"
                    );
                    self.metrics.inc_counter(BOUNDARY_LOADS, 1);
                    self.events.emit(
                        self.tick,
                        EventKind::BoundariesLoaded,
                        format!("{level}: {} regions", geometry.len()),
                    );
                    self.levels.insert_level(geometry);
                }
                LoadOutcome::Statistics(Ok(dataset)) => {
                    info!(
                        request = request.0,
                        series = dataset.data.len(),
                        times = dataset.times.len(),
                        "statistics loaded"
                    );
                    self.metrics.inc_counter(STATISTICS_LOADS, 1);
                    self.events.emit(
                        self.tick,
                        EventKind::StatisticsLoaded,
                        format!("{} series", dataset.data.len()),
                    );
                    self.set_statistics(dataset);
                }
                LoadOutcome::Boundaries(Err(failure)) | LoadOutcome::Statistics(Err(failure)) => {
                    warn!(request = request.0, error = %failure, "load failed");
                    self.metrics.inc_counter(LOAD_FAILURES, 1);
                    self.events
                        .emit(self.tick, EventKind::LoadFailed, failure.to_string());
                    self.failures.push(failure);
                }
            }
        }
        self.metrics.set_gauge(PENDING_LOADS, self.loads.len() as i64);
    }

    fn refresh_statistics(&mut self, now: Time) {
        if self.statistics == StatisticsRefresh::Idle {
            return;
        }
        let (Some(dataset), Some(batch)) = (&self.dataset, self.levels.batch_mut()) else {
            return;
        };

        let slice = normalizer::normalize(dataset, batch.region_ids());
        let channel = self.morph.begin_transition(now);
        normalizer::apply(&slice, batch, channel);

        info!(
            level = batch.level().0,
            channel = channel.attribute_name(),
            time = ?slice.time_label.as_ref().map(|t| t.0.as_str()),
            min = ?slice.min,
            max = ?slice.max,
            present = slice.present(),
            regions = slice.values.len(),
            "statistics refreshed"
        );
        self.metrics.inc_counter(STATISTICS_REFRESHES, 1);
        self.events.emit(
            self.tick,
            EventKind::StatisticsRefreshed,
            format!("{} of {} regions with data", slice.present(), slice.values.len()),
        );
        self.last_slice = Some(slice);
        self.statistics = StatisticsRefresh::Idle;
    }

    /// Loads still in flight; a loading indicator shows while non-zero.
    pub fn pending_loads(&self) -> usize {
        self.loads.len()
    }

    pub fn level_state(&self, level: LevelIndex) -> LevelState {
        self.levels.state(level)
    }

    /// Levels with geometry in memory, ascending.
    pub fn loaded_levels(&self) -> Vec<LevelIndex> {
        self.levels.loaded_levels().collect()
    }

    pub fn desired_level(&self) -> Option<LevelIndex> {
        self.levels.desired_level()
    }

    pub fn active_level(&self) -> Option<LevelIndex> {
        self.levels.active_level()
    }

    pub fn active_batch(&self) -> Option<&RenderBatch> {
        self.levels.batch()
    }

    pub fn statistics_refresh(&self) -> StatisticsRefresh {
        self.statistics
    }

    pub fn dataset(&self) -> Option<&StatisticsDataset> {
        self.dataset.as_ref()
    }

    pub fn blend_factor(&self) -> f64 {
        self.morph.blend()
    }

    pub fn morph(&self) -> &MorphAnimator {
        &self.morph
    }

    pub fn material(&self) -> &BoundaryMaterial {
        &self.material
    }

    pub fn selected(&self) -> Option<&RegionId> {
        self.selection.selected()
    }

    pub fn last_slice(&self) -> Option<&NormalizedSlice> {
        self.last_slice.as_ref()
    }

    /// Tooltip data for a picked region at the last refreshed slice.
    pub fn region_value(&self, id: &str) -> Option<&RegionValue> {
        self.last_slice.as_ref()?.value(id)
    }

    pub fn drain_load_failures(&mut self) -> Vec<LoadFailure> {
        std::mem::take(&mut self.failures)
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
