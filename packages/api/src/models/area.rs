//! Payloads backing the full area report: amenities and ward population.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Query/body shared by the area endpoints.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct AreaQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Amenity {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AmenityGroup {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
}

/// Response of `POST /amenities-report/`, keyed by amenity type
/// (`"schools"`, `"bus_stops"`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AmenitiesReport {
    #[serde(default)]
    pub amenities_report: BTreeMap<String, AmenityGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ward {
    #[serde(default)]
    pub ward_number: u32,
    #[serde(default)]
    pub population: f64,
    #[serde(default)]
    pub population_density: f64,
}

/// Response of `GET /area-population/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AreaPopulation {
    #[serde(default)]
    pub total_population: Option<f64>,
    #[serde(default)]
    pub affected_ward_count: u32,
    #[serde(default)]
    pub affected_wards: Vec<Ward>,
}
