use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::difficulty::{EloDepthEntry, EloDepthMap};
use crate::error::ConfigError;

const DEFAULT_DEPTH: u32 = 2;

/// Engine settings as read from a TOML file.
///
/// ```toml
/// depth = 3
/// seed = 42
///
/// [[elo_depth_map]]
/// rating = 100
/// depth = 1
///
/// [[elo_depth_map]]
/// rating = 1000
/// depth = 3
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub depth: u32,
    pub elo_depth_map: Vec<EloDepthEntry>,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            elo_depth_map: EloDepthMap::default().entries().to_vec(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::InvalidDepth(self.depth));
        }
        self.elo_map().map(|_| ())
    }

    pub fn elo_map(&self) -> Result<EloDepthMap, ConfigError> {
        EloDepthMap::new(self.elo_depth_map.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.depth, 2);
        assert_eq!(config.seed, None);
        assert_eq!(config.elo_map().unwrap(), EloDepthMap::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config.depth, 2);
        assert_eq!(config.elo_depth_map.len(), 5);
    }

    #[test]
    fn test_parse() {
        let text = r#"
            depth = 3
            seed = 7

            [[elo_depth_map]]
            rating = 0
            depth = 1

            [[elo_depth_map]]
            rating = 1500
            depth = 4
        "#;
        let config = EngineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.depth, 3);
        assert_eq!(config.seed, Some(7));
        let map = config.elo_map().unwrap();
        assert_eq!(map.depth_for_rating(1499), 1);
        assert_eq!(map.depth_for_rating(1500), 4);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("depth = 0"),
            Err(ConfigError::InvalidDepth(0))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("elo_depth_map = []"),
            Err(ConfigError::EmptyEloMap)
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("depht = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("salmon-analyst-{}.toml", std::process::id()));
        fs::write(&path, "depth = 4\n").unwrap();
        let config = EngineConfig::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.depth, 4);

        assert!(matches!(
            EngineConfig::from_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }
}
