//! Region dataset loading from GeoJSON.

use geo::{Intersects, MultiPolygon, Polygon, Rect};
use geojson::GeoJson;
use std::fs;
use tracing::{info, warn};

use crate::config::DatasetConfig;
use crate::error::{MapError, MapResult};
use crate::models::Region;

/// Load regions from the configured GeoJSON file.
pub fn load_regions(config: &DatasetConfig) -> MapResult<Vec<Region>> {
    info!("Loading regions from {}", config.path.display());
    let text = fs::read_to_string(&config.path)
        .map_err(|e| MapError::Dataset(format!("{}: {}", config.path.display(), e)))?;
    parse_regions(&text, config)
}

/// Parse a FeatureCollection, keeping polygonal features that pass the
/// clip box and parent filters.
pub fn parse_regions(text: &str, config: &DatasetConfig) -> MapResult<Vec<Region>> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| MapError::Dataset(e.to_string()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(MapError::Dataset("expected a FeatureCollection".to_string())),
    };

    let clip = config
        .clip_bbox
        .map(|[min_x, min_y, max_x, max_y]| Rect::new((min_x, min_y), (max_x, max_y)).to_polygon());

    let mut regions = Vec::new();
    let mut skipped = 0usize;

    for (idx, feature) in collection.features.into_iter().enumerate() {
        let name = feature
            .property(&config.name_property)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let Some(name) = name else {
            warn!("Skipping feature {} without '{}'", idx, config.name_property);
            skipped += 1;
            continue;
        };

        let parent = feature
            .property(&config.parent_property)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string();

        if config.exclude_parents.iter().any(|p| p.eq_ignore_ascii_case(&parent)) {
            continue;
        }

        let Some(geometry) = feature.geometry.and_then(|g| to_multipolygon(g.value)) else {
            warn!("Skipping region '{}': geometry is not polygonal", name);
            skipped += 1;
            continue;
        };

        if let Some(clip) = &clip {
            if !clip.intersects(&geometry) {
                continue;
            }
        }

        regions.push(Region::new(name, parent, geometry));
    }

    info!("Loaded {} regions ({} skipped)", regions.len(), skipped);
    Ok(regions)
}

fn to_multipolygon(value: geojson::Value) -> Option<MultiPolygon<f64>> {
    match value {
        geojson::Value::Polygon(_) => {
            let polygon: Polygon<f64> = value.try_into().ok()?;
            Some(MultiPolygon::new(vec![polygon]))
        }
        geojson::Value::MultiPolygon(_) => value.try_into().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"departamento": "Capital", "provincia": "CORDOBA"},
                "geometry": {"type": "Polygon", "coordinates": [[[-64.3,-31.5],[-64.1,-31.5],[-64.1,-31.3],[-64.3,-31.3],[-64.3,-31.5]]]}
            },
            {
                "type": "Feature",
                "properties": {"departamento": "Comuna 1", "provincia": "CIUDAD AUTONOMA DE BUENOS AIRES"},
                "geometry": {"type": "Polygon", "coordinates": [[[-58.4,-34.6],[-58.3,-34.6],[-58.3,-34.5],[-58.4,-34.6]]]}
            },
            {
                "type": "Feature",
                "properties": {"departamento": "Islas", "provincia": "TIERRA DEL FUEGO"},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[-30.0,-60.0],[-29.0,-60.0],[-29.0,-59.0],[-30.0,-60.0]]]]}
            },
            {
                "type": "Feature",
                "properties": {"departamento": "Punto", "provincia": "SALTA"},
                "geometry": {"type": "Point", "coordinates": [-65.4, -24.8]}
            },
            {
                "type": "Feature",
                "properties": {"provincia": "SALTA"},
                "geometry": {"type": "Polygon", "coordinates": [[[-65.5,-24.9],[-65.3,-24.9],[-65.3,-24.7],[-65.5,-24.9]]]}
            },
            {
                "type": "Feature",
                "properties": {"departamento": "Ushuaia", "provincia": "TIERRA DEL FUEGO"},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[-68.5,-54.9],[-68.0,-54.9],[-68.0,-54.6],[-68.5,-54.9]]]]}
            }
        ]
    }"#;

    #[test]
    fn test_filters_applied() {
        let regions = parse_regions(SAMPLE, &DatasetConfig::default()).unwrap();
        let names: Vec<&str> = regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Capital", "Ushuaia"]);
        assert_eq!(regions[0].parent, "CORDOBA");
        assert_eq!(regions[1].geometry.0.len(), 1);
    }

    #[test]
    fn test_no_clip_keeps_offshore() {
        let config = DatasetConfig {
            clip_bbox: None,
            exclude_parents: vec![],
            ..DatasetConfig::default()
        };
        let regions = parse_regions(SAMPLE, &config).unwrap();
        assert_eq!(regions.len(), 4);
    }

    #[test]
    fn test_rejects_non_collection() {
        let err = parse_regions(
            r#"{"type":"Point","coordinates":[0.0,0.0]}"#,
            &DatasetConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MapError::Dataset(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let config = DatasetConfig {
            path: "/nonexistent/regions.geojson".into(),
            ..DatasetConfig::default()
        };
        assert!(matches!(load_regions(&config), Err(MapError::Dataset(_))));
    }
}
