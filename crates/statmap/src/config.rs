use std::path::Path;

use foundation::ids::LevelIndex;
use serde::{Deserialize, Serialize};

use crate::morph::DEFAULT_TRANSITION_S;

/// One boundary resolution and where its source lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSource {
    pub index: u8,
    pub name: String,
    pub url: String,
}

impl LevelSource {
    fn new(index: u8, name: &str, url: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    pub fn level(&self) -> LevelIndex {
        LevelIndex(self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatMapConfig {
    pub transition_duration_s: f64,
    /// Baked extrusion of every region solid, a render baseline only.
    pub extrusion_height: f64,
    pub initial_level: u8,
    pub levels: Vec<LevelSource>,
    pub summary_url: Option<String>,
}

impl Default for StatMapConfig {
    fn default() -> Self {
        Self {
            transition_duration_s: DEFAULT_TRANSITION_S,
            extrusion_height: 1.0,
            initial_level: 2,
            levels: vec![
                LevelSource::new(0, "State", "data/ASGS/ste_q1e6_s0.00001.json"),
                LevelSource::new(1, "Statistical Areas Level 4", "data/ASGS/sa4_q1e6_s0.000001.json"),
                LevelSource::new(2, "Statistical Areas Level 3", "data/ASGS/sa3_q1e6_s0.0000001.json"),
                LevelSource::new(3, "Statistical Areas Level 2", "data/ASGS/sa2_q1e6_s0.00000001.json"),
            ],
            summary_url: Some("data/stats/ABS_NRP9_ASGS/summary.json".to_string()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config read failed: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse failed: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl StatMapConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.transition_duration_s.is_finite() || self.transition_duration_s < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "transition_duration_s must be >= 0, got {}",
                self.transition_duration_s
            )));
        }
        if !self.extrusion_height.is_finite() {
            return Err(ConfigError::Invalid("extrusion_height must be finite".into()));
        }
        for (i, level) in self.levels.iter().enumerate() {
            if self.levels[..i].iter().any(|l| l.index == level.index) {
                return Err(ConfigError::Invalid(format!("duplicate level {}", level.index)));
            }
        }
        if self.level(LevelIndex(self.initial_level)).is_none() {
            return Err(ConfigError::Invalid(format!(
                "initial_level {} has no source",
                self.initial_level
            )));
        }
        Ok(())
    }

    pub fn level(&self, level: LevelIndex) -> Option<&LevelSource> {
        self.levels.iter().find(|l| l.index == level.0)
    }

    pub fn initial_level(&self) -> LevelIndex {
        LevelIndex(self.initial_level)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StatMapConfig};
    use foundation::ids::LevelIndex;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_describe_the_four_asgs_levels() {
        let config = StatMapConfig::default();
        config.validate().expect("defaults are valid");
        let names: Vec<&str> = config.levels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "State",
                "Statistical Areas Level 4",
                "Statistical Areas Level 3",
                "Statistical Areas Level 2"
            ]
        );
        assert_eq!(config.initial_level(), LevelIndex(2));
        assert_eq!(config.transition_duration_s, 1.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StatMapConfig::from_json_str(r#"{ "transition_duration_s": 0.25 }"#).expect("parse");
        assert_eq!(config.transition_duration_s, 0.25);
        assert_eq!(config.levels.len(), 4);
    }

    #[test]
    fn rejects_unknown_initial_level() {
        let err = StatMapConfig::from_json_str(r#"{ "initial_level": 9 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = StatMapConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
