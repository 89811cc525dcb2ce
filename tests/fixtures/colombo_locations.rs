//! Colombo (Wellawatte / Bambalapitiya) street locations for test fixtures.
//!
//! Approximate coordinates taken from OpenStreetMap.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }
}

// ============================================================================
// Depots
// ============================================================================

pub const WELLAWATTE_DEPOT: Location = Location::new("Wellawatte Municipal Yard", 6.8741, 79.8605);

// ============================================================================
// Wellawatte South bin sites
// ============================================================================

pub const WELLAWATTE_SOUTH: &[Location] = &[
    Location::new("Galle Road / Manning Place", 6.8768, 79.8590),
    Location::new("Ramakrishna Road", 6.8725, 79.8622),
    Location::new("Hamden Lane", 6.8702, 79.8598),
    Location::new("Vihara Road", 6.8689, 79.8641),
    Location::new("Fussels Lane", 6.8754, 79.8630),
];

/// Boundary of Wellawatte South as a closed ring of `[lng, lat]`.
pub const WELLAWATTE_SOUTH_BOUNDARY: &[[f64; 2]] = &[
    [79.8570, 6.8670],
    [79.8665, 6.8670],
    [79.8665, 6.8790],
    [79.8570, 6.8790],
    [79.8570, 6.8670],
];
