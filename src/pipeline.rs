//! Request pipeline: geocode, select, render, publish.

use chrono::Local;
use geo::Point;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::{MapError, MapResult};
use crate::geocoder::Geocoder;
use crate::models::{MapRequest, MapResponse, RawMapRequest, Region};
use crate::publish::Publisher;
use crate::render::MapRenderer;
use crate::selection::{load_regions, RegionIndex, RegionSelector};

/// Shared, read-only state for handling map requests.
pub struct MapService {
    config: Config,
    selector: RegionSelector,
    renderer: MapRenderer,
    geocoder: Geocoder,
    publisher: Publisher,
}

impl MapService {
    /// Build the service around an already loaded region set.
    pub fn new(config: Config, regions: Vec<Region>) -> MapResult<Self> {
        let selector = RegionSelector::new(
            RegionIndex::build(regions),
            config.selection.circle_segments,
        );
        let renderer = MapRenderer::new(config.render.clone());
        let geocoder = Geocoder::new(config.geocoder.clone())?;
        let publisher = Publisher::from_config(&config.publish)?;
        info!("Publishing to {} backend", publisher.name());

        Ok(Self {
            config,
            selector,
            renderer,
            geocoder,
            publisher,
        })
    }

    /// Load the configured dataset and build the service.
    pub fn from_config(config: Config) -> MapResult<Self> {
        let regions = load_regions(&config.dataset)?;
        if regions.is_empty() {
            return Err(MapError::Dataset(format!(
                "{} contains no usable regions",
                config.dataset.path.display()
            )));
        }
        Self::new(config, regions)
    }

    pub fn region_count(&self) -> usize {
        self.selector.index().len()
    }

    pub fn validate(&self, raw: RawMapRequest) -> MapResult<MapRequest> {
        raw.validate(self.config.selection.max_radius_km)
    }

    /// Full pipeline for one request body.
    pub async fn handle(self: &Arc<Self>, raw: RawMapRequest) -> MapResult<MapResponse> {
        let request = self.validate(raw)?;
        let location = self.geocoder.geocode(&request.place, &request.admin1).await?;
        self.generate_at(request, location.point()).await
    }

    /// Select, render and publish around a known center, skipping geocoding.
    pub async fn generate_at(
        self: &Arc<Self>,
        request: MapRequest,
        center: Point<f64>,
    ) -> MapResult<MapResponse> {
        let service = Arc::clone(self);
        let job = request.clone();

        // Selection and layout are CPU-bound
        let (bytes, included, bordering) = tokio::task::spawn_blocking(move || {
            let selection = service.selector.select(center, job.radius_km);
            info!(
                "{} km around ({}, {}): {} included, {} bordering",
                job.radius_km,
                center.y(),
                center.x(),
                selection.included.len(),
                selection.bordering.len()
            );
            let bytes = service
                .renderer
                .render(&job, &selection, service.selector.index().regions())?;
            Ok::<_, MapError>((bytes, selection.included_names(), selection.bordering_names()))
        })
        .await
        .map_err(|e| MapError::Render(e.to_string()))??;

        let file_name = request.file_name(Local::now().date_naive());
        let scratch = tempfile::Builder::new().prefix("georadius-").tempdir()?;
        let path = scratch.path().join(&file_name);
        tokio::fs::write(&path, &bytes).await?;
        info!("Rendered {} ({} bytes)", file_name, bytes.len());

        let published = self.publisher.publish(&path, &file_name).await?;
        match &published.file_id {
            Some(id) => info!("Published {} at {} (id {})", file_name, published.url, id),
            None => info!("Published {} at {}", file_name, published.url),
        }

        Ok(MapResponse {
            url: published.url,
            file_name,
            included,
            bordering,
        })
    }
}
