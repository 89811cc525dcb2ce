//! Reference data served by the backend: areas and the bins inside them.
//!
//! Field names follow the backend JSON (`_id`, camelCase, GeoJSON geometry
//! with `[lng, lat]` coordinate order).

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A `[lng, lat]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinates {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Placeholder position for stops that could not be resolved.
    pub const ORIGIN: Coordinates = Coordinates::new(0.0, 0.0);
}

impl From<[f64; 2]> for Coordinates {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(value: Coordinates) -> Self {
        [value.lng, value.lat]
    }
}

/// Fallback depot used when an area has no start/end point: central Colombo.
pub const DEFAULT_DEPOT: Coordinates = Coordinates::new(79.8612, 6.9271);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WasteType {
    General,
    Organic,
    Recycle,
    Hazardous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BinStatus {
    Active,
    Maintenance,
    Inactive,
    PendingInstallation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    pub coordinates: Coordinates,
}

/// A physical collection point with a fill-level sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    #[serde(rename = "_id")]
    pub id: String,
    pub location: PointGeometry,
    /// Percentage, 0..=100.
    #[serde(default)]
    pub fill_level: u8,
    pub waste_type: WasteType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BinStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_collected: Option<Timestamp>,
}

impl Bin {
    pub fn coordinates(&self) -> Coordinates {
        self.location.coordinates
    }
}

/// Designated start or end point of an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    /// Linear rings; the first one is the outer boundary.
    pub coordinates: Vec<Vec<Coordinates>>,
}

/// A collection zone and the bins located inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<PolygonGeometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Depot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<Depot>,
    #[serde(default)]
    pub bins: Vec<Bin>,
}

impl Area {
    /// Looks up a bin of this area by id.
    pub fn bin(&self, id: &str) -> Option<&Bin> {
        self.bins.iter().find(|bin| bin.id == id)
    }

    /// Outer boundary ring, if present.
    pub fn boundary(&self) -> Option<&[Coordinates]> {
        self.geometry
            .as_ref()
            .and_then(|geometry| geometry.coordinates.first())
            .map(Vec::as_slice)
    }

    /// A usable boundary has at least four points and is closed.
    pub fn has_valid_boundary(&self) -> bool {
        match self.boundary() {
            Some(ring) => ring.len() >= 4 && ring.first() == ring.last(),
            None => false,
        }
    }

    /// Start depot, or `fallback` when the area has none.
    pub fn start_point(&self, fallback: Coordinates) -> Coordinates {
        self.start_location
            .as_ref()
            .map_or(fallback, |depot| depot.coordinates)
    }

    pub fn end_point(&self, fallback: Coordinates) -> Coordinates {
        self.end_location
            .as_ref()
            .map_or(fallback, |depot| depot.coordinates)
    }

    pub fn start_label(&self) -> String {
        depot_label(self.start_location.as_ref(), &self.name, "start")
    }

    pub fn end_label(&self) -> String {
        depot_label(self.end_location.as_ref(), &self.name, "end")
    }
}

fn depot_label(depot: Option<&Depot>, area_name: &str, which: &str) -> String {
    depot
        .and_then(|depot| depot.address.clone())
        .unwrap_or_else(|| format!("{} {} point", area_name, which))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA_JSON: &str = r#"{
        "_id": "area-1",
        "name": "Wellawatte South",
        "geometry": {"type": "Polygon", "coordinates": [[[79.85, 6.87], [79.87, 6.87], [79.87, 6.89], [79.85, 6.87]]]},
        "startLocation": {"type": "Point", "coordinates": [79.86, 6.88], "address": "Depot Road"},
        "bins": [{
            "_id": "bin-1",
            "location": {"type": "Point", "coordinates": [79.861, 6.874]},
            "fillLevel": 82,
            "wasteType": "RECYCLE",
            "status": "ACTIVE",
            "lastCollected": "2024-05-01T06:30:00Z"
        }]
    }"#;

    #[test]
    fn test_area_from_backend_json() {
        let area: Area = serde_json::from_str(AREA_JSON).unwrap();
        assert_eq!(area.id, "area-1");
        assert_eq!(area.bins.len(), 1);

        let bin = area.bin("bin-1").unwrap();
        assert_eq!(bin.fill_level, 82);
        assert_eq!(bin.waste_type, WasteType::Recycle);
        assert_eq!(bin.status, Some(BinStatus::Active));
        assert_eq!(bin.coordinates(), Coordinates::new(79.861, 6.874));
        assert!(bin.last_collected.is_some());
    }

    #[test]
    fn test_boundary_validation() {
        let mut area: Area = serde_json::from_str(AREA_JSON).unwrap();
        assert!(area.has_valid_boundary());

        area.geometry.as_mut().unwrap().coordinates[0].pop();
        assert!(!area.has_valid_boundary());

        area.geometry = None;
        assert!(!area.has_valid_boundary());
    }

    #[test]
    fn test_depot_fallback() {
        let area: Area = serde_json::from_str(AREA_JSON).unwrap();
        assert_eq!(area.start_point(DEFAULT_DEPOT), Coordinates::new(79.86, 6.88));
        assert_eq!(area.end_point(DEFAULT_DEPOT), DEFAULT_DEPOT);
        assert_eq!(area.start_label(), "Depot Road");
        assert_eq!(area.end_label(), "Wellawatte South end point");
    }

    #[test]
    fn test_coordinates_wire_order() {
        let json = serde_json::to_string(&Coordinates::new(79.8, 6.9)).unwrap();
        assert_eq!(json, "[79.8,6.9]");
    }
}
