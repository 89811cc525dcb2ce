//! Polyline representation for route geometries.
//!
//! The optimizer sends the geometry either as a bare array of `[lng, lat]`
//! pairs or as a GeoJSON `LineString`. Both are decoded into the same type
//! here; the schedule payload always sends the bare array form.

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::Coordinates;

/// A route geometry as an ordered list of coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Coordinates>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGeometry {
    Points(Vec<Coordinates>),
    LineString { coordinates: Vec<Coordinates> },
}

impl<'de> Deserialize<'de> for Polyline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let points = match Option::<RawGeometry>::deserialize(deserializer)? {
            Some(RawGeometry::Points(points)) => points,
            Some(RawGeometry::LineString { coordinates }) => coordinates,
            None => Vec::new(),
        };
        Ok(Self { points })
    }
}

impl Polyline {
    /// Creates a new Polyline from `[lng, lat]` points in travel order.
    pub fn new(points: Vec<Coordinates>) -> Self {
        Self { points }
    }

    /// Returns the points of the polyline.
    pub fn points(&self) -> &[Coordinates] {
        &self.points
    }

    /// Consumes the polyline and returns its points.
    pub fn into_points(self) -> Vec<Coordinates> {
        self.points
    }

    /// Returns true if the optimizer sent no geometry.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }
}
