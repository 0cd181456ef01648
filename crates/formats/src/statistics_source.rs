use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

/// Label of one time step (`"2011"`, `"2012-06"`, ...).
///
/// Sources emit both strings and bare numbers; numbers keep their JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLabel(pub String);

impl<'de> Deserialize<'de> for TimeLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawLabel {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawLabel::deserialize(deserializer)? {
            RawLabel::Text(s) => TimeLabel(s),
            RawLabel::Number(n) => TimeLabel(n.to_string()),
        })
    }
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A time series per region, loaded wholesale from one statistics file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatisticsDataset {
    pub times: Vec<TimeLabel>,
    pub data: BTreeMap<String, Vec<Option<f64>>>,
    #[serde(default)]
    pub units: Option<String>,
}

#[derive(Debug)]
pub struct StatisticsSourceError(serde_json::Error);

impl fmt::Display for StatisticsSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid statistics source: {}", self.0)
    }
}

impl std::error::Error for StatisticsSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl StatisticsDataset {
    pub fn from_json_str(payload: &str) -> Result<Self, StatisticsSourceError> {
        serde_json::from_str(payload).map_err(StatisticsSourceError)
    }

    /// Index of the most recent time step.
    pub fn latest_index(&self) -> Option<usize> {
        self.times.len().checked_sub(1)
    }

    pub fn series(&self, region_id: &str) -> Option<&[Option<f64>]> {
        self.data.get(region_id).map(Vec::as_slice)
    }

    /// Value of `region_id` at `index`; `None` for missing series, short
    /// series and explicit nulls alike.
    pub fn value_at(&self, region_id: &str, index: usize) -> Option<f64> {
        self.series(region_id)?.get(index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::{StatisticsDataset, TimeLabel};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_series_with_nulls_and_numeric_times() {
        let ds = StatisticsDataset::from_json_str(
            r#"{ "times": [2010, "2011"], "data": { "A": [1, null], "B": [2.5, 4] }, "units": "persons" }"#,
        )
        .expect("parse");
        assert_eq!(
            ds.times,
            vec![TimeLabel("2010".to_string()), TimeLabel("2011".to_string())]
        );
        assert_eq!(ds.units.as_deref(), Some("persons"));
        assert_eq!(ds.latest_index(), Some(1));
        assert_eq!(ds.value_at("A", 1), None);
        assert_eq!(ds.value_at("B", 1), Some(4.0));
        assert_eq!(ds.value_at("missing", 0), None);
        assert_eq!(ds.value_at("A", 9), None);
    }

    #[test]
    fn units_are_optional_and_empty_times_have_no_slice() {
        let ds = StatisticsDataset::from_json_str(r#"{ "times": [], "data": {} }"#).expect("parse");
        assert_eq!(ds.units, None);
        assert_eq!(ds.latest_index(), None);
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err =
            StatisticsDataset::from_json_str(r#"{ "times": ["t"], "data": { "A": ["x"] } }"#)
                .unwrap_err();
        assert!(err.to_string().starts_with("invalid statistics source"));
    }
}
