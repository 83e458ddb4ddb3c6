//! Service configuration loaded from TOML.
//!
//! Every section and field has a default so the file can be partial or
//! missing entirely.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub geocoder: GeocoderConfig,
    pub selection: SelectionConfig,
    pub render: RenderConfig,
    pub publish: PublishConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:10000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetConfig {
    /// GeoJSON FeatureCollection with one feature per region
    pub path: PathBuf,
    /// Feature property holding the region name
    pub name_property: String,
    /// Feature property holding the admin-1 (parent) name
    pub parent_property: String,
    /// [min_lon, min_lat, max_lon, max_lat]; regions not touching it are dropped
    pub clip_bbox: Option<[f64; 4]>,
    pub exclude_parents: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("departamentos-argentina.geojson"),
            name_property: "departamento".to_string(),
            parent_property: "provincia".to_string(),
            clip_bbox: Some([-73.0, -55.0, -53.0, -20.0]),
            exclude_parents: vec!["CIUDAD AUTONOMA DE BUENOS AIRES".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Appended to every query as the last address component
    pub country: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "georadius/0.1".to_string(),
            country: "Argentina".to_string(),
            timeout_secs: 10,
            max_attempts: 2,
            retry_backoff_ms: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelectionConfig {
    pub circle_segments: usize,
    pub max_radius_km: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            circle_segments: 64,
            max_radius_km: 2000.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RenderConfig {
    /// Extra distance around the circle shown on the detail page
    pub detail_margin_km: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            detail_margin_km: 20.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublishBackend {
    Drive,
    #[default]
    Local,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PublishConfig {
    pub backend: PublishBackend,
    pub drive: DriveConfig,
    pub local: LocalConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DriveConfig {
    pub folder_id: String,
    /// Falls back to the DRIVE_ACCESS_TOKEN environment variable
    pub access_token: Option<String>,
    pub upload_url: String,
    pub api_url: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            folder_id: String::new(),
            access_token: None,
            upload_url: "https://www.googleapis.com/upload/drive/v3/files".to_string(),
            api_url: "https://www.googleapis.com/drive/v3/files".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LocalConfig {
    pub output_dir: PathBuf,
    pub public_base_url: Option<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir(),
            public_base_url: None,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [geocoder]
            country = "Chile"

            [publish]
            backend = "drive"

            [publish.drive]
            folder_id = "abc123"
            "#,
        )
        .unwrap();

        assert_eq!(config.geocoder.country, "Chile");
        assert_eq!(config.geocoder.max_attempts, 2);
        assert_eq!(config.publish.backend, PublishBackend::Drive);
        assert_eq!(config.publish.drive.folder_id, "abc123");
        assert_eq!(config.selection.circle_segments, 64);
        assert_eq!(config.dataset.name_property, "departamento");
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:10000");
        assert_eq!(config.publish.backend, PublishBackend::Local);
        assert_eq!(
            config.dataset.exclude_parents,
            vec!["CIUDAD AUTONOMA DE BUENOS AIRES".to_string()]
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("georadius.toml");
        fs::write(&path, "[selection]\nmax_radius_km = 500.0\n").unwrap();

        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.selection.max_radius_km, 500.0);
        assert!(Config::load_from_file(dir.path().join("missing.toml")).is_err());
    }
}
