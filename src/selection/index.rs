//! Spatial index over region bounding boxes.

use geo::Rect;
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use crate::models::Region;

/// Wrapper for R-tree indexing of regions
#[derive(Clone)]
pub struct IndexedRegion {
    pub region: Arc<Region>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedRegion {
    pub fn new(region: Arc<Region>) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = region.bbox()?;
        Some(Self {
            region,
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// Read-only region collection with an R-tree for envelope queries.
pub struct RegionIndex {
    tree: RTree<IndexedRegion>,
    /// Load order, used when every region is drawn
    regions: Vec<Arc<Region>>,
}

impl RegionIndex {
    pub fn build(regions: Vec<Region>) -> Self {
        info!("Building spatial index for {} regions...", regions.len());

        let regions: Vec<Arc<Region>> = regions.into_iter().map(Arc::new).collect();
        let indexed: Vec<IndexedRegion> = regions
            .iter()
            .cloned()
            .filter_map(IndexedRegion::new)
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self { tree, regions }
    }

    /// Regions whose bounding box intersects `rect`
    pub fn candidates(&self, rect: &Rect<f64>) -> Vec<Arc<Region>> {
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|ir| Arc::clone(&ir.region))
            .collect()
    }

    pub fn regions(&self) -> &[Arc<Region>] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(name: &str, x: f64, y: f64) -> Region {
        let poly = polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ];
        Region::new(name, "P", MultiPolygon::new(vec![poly]))
    }

    #[test]
    fn test_candidates_by_envelope() {
        let index = RegionIndex::build(vec![
            square("a", 0.0, 0.0),
            square("b", 5.0, 5.0),
            square("c", 0.5, 0.5),
        ]);
        assert_eq!(index.len(), 3);

        let rect = Rect::new((0.2, 0.2), (0.8, 0.8));
        let mut names: Vec<String> = index
            .candidates(&rect)
            .iter()
            .map(|r| r.name.clone())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_index() {
        let index = RegionIndex::build(vec![]);
        assert!(index.is_empty());
        assert!(index.candidates(&Rect::new((0.0, 0.0), (1.0, 1.0))).is_empty());
    }

    #[test]
    fn test_keeps_load_order() {
        let index = RegionIndex::build(vec![square("z", 0.0, 0.0), square("a", 2.0, 0.0)]);
        let names: Vec<&str> = index.regions().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
