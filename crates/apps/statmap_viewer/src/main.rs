mod fetch;
mod sink;

use std::path::PathBuf;
use std::time::Duration;

use catalog::DatasetCatalog;
use clap::Parser;
use foundation::ids::{LevelIndex, RegionId};
use runtime::FrameClock;
use statmap::config::StatMapConfig;
use statmap::StatMap;
use streaming::Fetcher;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::fetch::HttpFetcher;
use crate::sink::LoggingSink;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for the StatMap boundary morph engine")]
struct Args {
    /// JSON config file (defaults to the built-in ASGS levels)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory that relative boundary/statistics paths resolve against
    #[arg(long, env = "STATMAP_DATA_ROOT", default_value = ".")]
    data_root: PathBuf,

    /// Boundary level to show (0 = State .. 3 = SA2)
    #[arg(long)]
    level: Option<u8>,

    /// Dataset id from the summary (`<concept>.<code>`); first entry if unset
    #[arg(long)]
    dataset: Option<String>,

    /// Dataset summary location, overriding the config
    #[arg(long)]
    summary: Option<String>,

    /// Frames to run before exiting
    #[arg(long, default_value_t = 120)]
    frames: u64,

    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Region id to select once boundaries are showing
    #[arg(long)]
    select: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => StatMapConfig::from_path(path)?,
        None => StatMapConfig::default(),
    };
    let level = args.level.map(LevelIndex).unwrap_or(config.initial_level());
    if config.level(level).is_none() {
        return Err(format!("{level} is not configured").into());
    }

    let fetcher = HttpFetcher::new(&args.data_root);
    let mut map = StatMap::new(&config, Box::new(fetcher.clone()));
    map.set_desired_level(level);

    // Desired level first so it is not queued behind finer ones.
    if let Some(source) = config.level(level) {
        map.load_boundaries(&source.url, source.level());
    }
    for source in config.levels.iter().filter(|s| s.level() != level) {
        map.load_boundaries(&source.url, source.level());
    }

    if let Some(summary_url) = args.summary.clone().or(config.summary_url.clone()) {
        match load_catalog(&fetcher, &summary_url).await {
            Ok(catalog) => {
                let entry = match &args.dataset {
                    Some(id) => Some(catalog.get(id)?),
                    None => catalog.first(),
                };
                match entry {
                    Some(entry) => {
                        info!(dataset = %entry.id, label = %entry.label, "loading statistics");
                        map.load_statistics(&entry.url);
                    }
                    None => warn!(%summary_url, "summary lists no datasets"),
                }
            }
            Err(e) => error!(%summary_url, error = %e, "dataset summary unavailable"),
        }
    }

    let mut sink = LoggingSink::default();
    let mut clock = FrameClock::new(args.fps);
    let mut selection = args.select.map(RegionId::from);

    for _ in 0..args.frames {
        let frame = clock.tick();
        map.update(frame.time, &mut sink);

        for failure in map.drain_load_failures() {
            error!(error = %failure, "load failed");
        }
        for event in map.drain_events() {
            debug!(tick = event.tick, kind = ?event.kind, message = %event.message, "event");
        }
        if map.active_level().is_some() {
            if let Some(id) = selection.take() {
                map.set_selected(Some(id));
            }
        }
        if frame.index % 30 == 0 {
            info!(
                frame = frame.index,
                pending = map.pending_loads(),
                active = ?map.active_level().map(|l| l.0),
                blend = map.blend_factor(),
                visible = sink.visible_regions(),
                "tick"
            );
        }

        tokio::time::sleep(Duration::from_secs_f64(clock.dt_s())).await;
    }

    if let Some(slice) = map.last_slice() {
        info!(
            time = ?slice.time_label.as_ref().map(|t| t.0.as_str()),
            min = ?slice.min,
            max = ?slice.max,
            units = ?slice.units,
            "final slice"
        );
    }
    if let Some(id) = map.selected() {
        match map.region_value(id.as_str()) {
            Some(value) => info!(
                region = %id,
                raw = ?value.raw,
                normalized = value.normalized,
                tint = ?sink.region_tint(id.as_str()),
                "selected region"
            ),
            None => info!(region = %id, "selected region has no value"),
        }
    }
    for (name, value) in map.metrics().snapshot().counters {
        info!(%name, value, "counter");
    }
    info!(
        batches = sink.scene().batch_count(),
        loaded = ?map.loaded_levels().iter().map(|l| l.0).collect::<Vec<_>>(),
        "done"
    );

    Ok(())
}

async fn load_catalog(
    fetcher: &HttpFetcher,
    summary_url: &str,
) -> Result<DatasetCatalog, Box<dyn std::error::Error>> {
    let payload = fetcher.fetch(summary_url).await?;
    Ok(DatasetCatalog::from_summary_json(summary_url, &payload)?)
}
