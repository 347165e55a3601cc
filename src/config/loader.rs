//! Configuration file loading (TOML or JSON)

use std::path::Path;

use super::TerrainConfig;
use crate::error::{TerrainError, TerrainResult};

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(ConfigFormat::Json),
            Some("toml") => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

impl TerrainConfig {
    /// Load and validate a config file; the format follows the extension
    pub fn from_path(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| TerrainError::ConfigParse {
            path: path.to_path_buf(),
            error: "unsupported extension, expected .toml or .json".to_string(),
        })?;

        let raw = std::fs::read_to_string(path).map_err(|e| TerrainError::ConfigIo {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: TerrainConfig = match format {
            ConfigFormat::Toml => toml::from_str(&raw).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(&raw).map_err(|e| e.to_string()),
        }
        .map_err(|error| TerrainError::ConfigParse {
            path: path.to_path_buf(),
            error,
        })?;

        config.validate()?;
        log::info!(
            "[TerrainConfig] Loaded {:?} config from {:?} (segment width {}, window {}+{})",
            format,
            path,
            config.segment_width,
            config.segments_behind,
            config.segments_ahead
        );
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> TerrainResult<Self> {
        let config: TerrainConfig = toml::from_str(raw).map_err(|e| TerrainError::ConfigParse {
            path: "<inline>".into(),
            error: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/terrain.toml")), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_path(Path::new("terrain.json")), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_path(Path::new("terrain.yaml")), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TerrainConfig::from_toml_str(
            r#"
            segments_ahead = 8

            [lod_distances]
            medium = 150.0

            [physics_simplification]
            skip_minor_segments = false
            "#,
        )
        .unwrap();

        assert_eq!(config.segments_ahead, 8);
        assert_eq!(config.segments_behind, 5);
        assert_eq!(config.lod_distances.medium, 150.0);
        assert_eq!(config.lod_distances.high, 60.0);
        assert!(!config.physics_simplification.skip_minor_segments);
        assert_eq!(config.physics_simplification.segment_step, 2);
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        let result = TerrainConfig::from_toml_str("segment_width = -4.0");
        assert!(matches!(result, Err(TerrainError::Config { .. })));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "segment_width": 32.0, "decoration_density": {{ "tree": 0.0 }} }}"#).unwrap();

        let config = TerrainConfig::from_path(file.path()).unwrap();
        assert_eq!(config.segment_width, 32.0);
        assert_eq!(config.decoration_density.tree, 0.0);
        assert_eq!(config.decoration_density.rock, 4.0);
    }

    #[test]
    fn test_load_missing_file() {
        let result = TerrainConfig::from_path("/definitely/not/here/terrain.toml");
        assert!(matches!(result, Err(TerrainError::ConfigIo { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = TerrainConfig::from_path(file.path());
        assert!(matches!(result, Err(TerrainError::ConfigParse { .. })));
    }
}
