use std::collections::BTreeMap;

pub const BOUNDARY_LOADS: &str = "boundary_loads";
pub const STATISTICS_LOADS: &str = "statistics_loads";
pub const LOAD_FAILURES: &str = "load_failures";
pub const LEVEL_SWITCHES: &str = "level_switches";
pub const STATISTICS_REFRESHES: &str = "statistics_refreshes";
pub const ACTIVE_REGIONS: &str = "active_regions";
pub const PENDING_LOADS: &str = "pending_loads";

/// Deterministic counters and gauges.
///
/// Sorted maps keep snapshots stable for logs and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(String, u64)>,
    pub gauges: Vec<(String, i64)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn inc_counter(&mut self, name: impl Into<String>, by: u64) {
        *self.counters.entry(name.into()).or_insert(0) += by;
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).copied()
    }

    pub fn set_gauge(&mut self, name: impl Into<String>, value: i64) {
        self.gauges.insert(name.into(), value);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            gauges: self.gauges.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LEVEL_SWITCHES, Metrics, PENDING_LOADS};

    #[test]
    fn counters_accumulate() {
        let mut m = Metrics::new();
        m.inc_counter(LEVEL_SWITCHES, 1);
        m.inc_counter(LEVEL_SWITCHES, 2);
        assert_eq!(m.counter(LEVEL_SWITCHES), 3);
        assert_eq!(m.counter("missing"), 0);
    }

    #[test]
    fn gauges_overwrite() {
        let mut m = Metrics::new();
        assert_eq!(m.gauge(PENDING_LOADS), None);
        m.set_gauge(PENDING_LOADS, 3);
        m.set_gauge(PENDING_LOADS, 0);
        assert_eq!(m.gauge(PENDING_LOADS), Some(0));
    }

    #[test]
    fn snapshot_is_stably_sorted() {
        let mut m = Metrics::new();
        m.inc_counter("b", 1);
        m.inc_counter("a", 1);
        m.set_gauge("z", 1);
        m.set_gauge("m", 2);
        let snap = m.snapshot();
        assert_eq!(
            snap.counters,
            vec![("a".to_string(), 1), ("b".to_string(), 1)]
        );
        assert_eq!(
            snap.gauges,
            vec![("m".to_string(), 2), ("z".to_string(), 1)]
        );
    }
}
