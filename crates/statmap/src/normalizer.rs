use formats::{StatisticsDataset, TimeLabel};
use foundation::ids::RegionId;

use crate::batch::{Channel, RenderBatch};
use crate::symbology::region_color;

/// Normalized value written for regions without data.
pub const NO_DATA: f64 = -1.0;

/// Normalized value of every present region when min == max.
pub const FLAT_MIDPOINT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct RegionValue {
    pub id: RegionId,
    pub raw: Option<f64>,
    /// In [0, 1], or [`NO_DATA`].
    pub normalized: f64,
}

/// One time slice mapped onto the active regions.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSlice {
    pub time_index: Option<usize>,
    pub time_label: Option<TimeLabel>,
    /// `None` when no active region has a value.
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub units: Option<String>,
    /// In batch order.
    pub values: Vec<RegionValue>,
}

impl NormalizedSlice {
    pub fn value(&self, id: &str) -> Option<&RegionValue> {
        self.values.iter().find(|v| v.id.as_str() == id)
    }

    pub fn present(&self) -> usize {
        self.values.iter().filter(|v| v.raw.is_some()).count()
    }
}

/// Normalizes the latest slice of `dataset` over `ids`.
///
/// Min and max are taken first over present values only; normalization runs
/// in a second pass.
pub fn normalize<'a>(
    dataset: &StatisticsDataset,
    ids: impl IntoIterator<Item = &'a RegionId>,
) -> NormalizedSlice {
    let time_index = dataset.latest_index();

    let raw: Vec<(RegionId, Option<f64>)> = ids
        .into_iter()
        .map(|id| {
            let value = time_index
                .and_then(|i| dataset.value_at(id.as_str(), i))
                .filter(|v| v.is_finite());
            (id.clone(), value)
        })
        .collect();

    let mut range: Option<(f64, f64)> = None;
    for v in raw.iter().filter_map(|(_, v)| *v) {
        range = Some(match range {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }

    let values = raw
        .into_iter()
        .map(|(id, raw)| {
            let normalized = match (raw, range) {
                (Some(v), Some((lo, hi))) if hi > lo => (v - lo) / (hi - lo),
                (Some(_), Some(_)) => FLAT_MIDPOINT,
                _ => NO_DATA,
            };
            RegionValue {
                id,
                raw,
                normalized,
            }
        })
        .collect();

    NormalizedSlice {
        time_index,
        time_label: time_index.and_then(|i| dataset.times.get(i).cloned()),
        min: range.map(|(lo, _)| lo),
        max: range.map(|(_, hi)| hi),
        units: dataset.units.clone(),
        values,
    }
}

/// Writes heights into `channel` and sets region colours.
pub fn apply(slice: &NormalizedSlice, batch: &mut RenderBatch, channel: Channel) {
    for value in &slice.values {
        let Some(attrs) = batch.get_mut(value.id.as_str()) else {
            continue;
        };
        attrs.set_height(channel, value.normalized as f32);
        attrs.color = region_color(value.raw.map(|_| value.normalized));
    }
}

#[cfg(test)]
mod tests {
    use super::{FLAT_MIDPOINT, NO_DATA, normalize};
    use formats::StatisticsDataset;
    use foundation::ids::RegionId;
    use pretty_assertions::assert_eq;

    fn ids(names: &[&str]) -> Vec<RegionId> {
        names.iter().map(|n| RegionId::from(*n)).collect()
    }

    fn dataset(json: &str) -> StatisticsDataset {
        StatisticsDataset::from_json_str(json).expect("dataset")
    }

    #[test]
    fn latest_slice_min_max() {
        let ds = dataset(r#"{ "times": ["t0", "t1"], "data": { "A": [1, 3], "B": [2, 4] } }"#);
        let slice = normalize(&ds, &ids(&["A", "B"]));
        assert_eq!(slice.time_index, Some(1));
        assert_eq!((slice.min, slice.max), (Some(3.0), Some(4.0)));
        assert_eq!(slice.value("A").map(|v| v.normalized), Some(0.0));
        assert_eq!(slice.value("B").map(|v| v.normalized), Some(1.0));
    }

    #[test]
    fn flat_dataset_uses_midpoint() {
        let ds = dataset(r#"{ "times": [1], "data": { "A": [5], "B": [5], "C": [null] } }"#);
        let slice = normalize(&ds, &ids(&["A", "B", "C"]));
        let got: Vec<f64> = slice.values.iter().map(|v| v.normalized).collect();
        assert_eq!(got, vec![FLAT_MIDPOINT, FLAT_MIDPOINT, NO_DATA]);
        assert!(got.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn missing_series_and_nulls_are_no_data() {
        let ds = dataset(r#"{ "times": [1, 2], "data": { "A": [1, null], "B": [0, 10], "C": [3] } }"#);
        let slice = normalize(&ds, &ids(&["A", "B", "C", "D"]));
        assert_eq!((slice.min, slice.max), (Some(10.0), Some(10.0)));
        assert_eq!(slice.present(), 1);
        assert_eq!(slice.value("A").map(|v| v.normalized), Some(NO_DATA));
        assert_eq!(slice.value("C").map(|v| v.normalized), Some(NO_DATA));
        assert_eq!(slice.value("D").map(|v| v.raw), Some(None));
    }

    #[test]
    fn empty_times_leave_everything_without_data() {
        let ds = dataset(r#"{ "times": [], "data": { "A": [1] } }"#);
        let slice = normalize(&ds, &ids(&["A"]));
        assert_eq!(slice.time_index, None);
        assert_eq!(slice.min, None);
        assert_eq!(slice.values[0].normalized, NO_DATA);
    }

    #[test]
    fn only_active_ids_contribute() {
        let ds = dataset(r#"{ "times": [0], "data": { "A": [1], "B": [100], "C": [3] } }"#);
        let slice = normalize(&ds, &ids(&["A", "C"]));
        assert_eq!(slice.max, Some(3.0));
        assert_eq!(slice.value("C").map(|v| v.normalized), Some(1.0));
        assert_eq!(slice.value("B"), None);
    }
}
