//! Suitability analysis and nearby-café payloads.
//!
//! The backend omits fields freely (no ward under the point, model not
//! trained yet), so every response field is optional or defaulted.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point on the map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Business category the analysis is run for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CafeType {
    CoffeeShop,
    Bakery,
    DessertShop,
    Restaurant,
}

impl CafeType {
    pub const ALL: [CafeType; 4] = [
        CafeType::CoffeeShop,
        CafeType::Bakery,
        CafeType::DessertShop,
        CafeType::Restaurant,
    ];

    /// Wire value (`"coffee_shop"`).
    pub fn as_str(self) -> &'static str {
        match self {
            CafeType::CoffeeShop => "coffee_shop",
            CafeType::Bakery => "bakery",
            CafeType::DessertShop => "dessert_shop",
            CafeType::Restaurant => "restaurant",
        }
    }

    /// Human label (`"Coffee Shop"`).
    pub fn label(self) -> &'static str {
        match self {
            CafeType::CoffeeShop => "Coffee Shop",
            CafeType::Bakery => "Bakery",
            CafeType::DessertShop => "Dessert Shop",
            CafeType::Restaurant => "Restaurant",
        }
    }
}

impl std::fmt::Display for CafeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown café type `{0}`")]
pub struct UnknownCafeType(pub String);

impl FromStr for CafeType {
    type Err = UnknownCafeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CafeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownCafeType(s.to_string()))
    }
}

/// Body of `POST /analyze/`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisRequest {
    pub lat: f64,
    pub lng: f64,
    pub cafe_type: CafeType,
    pub radius: u32,
}

/// A café as serialised by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cafe {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cafe_type: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub is_open: Option<bool>,
    /// Ranking score, `rating × ln(review_count + 1)`.
    #[serde(default)]
    pub score: Option<f64>,
}

impl Cafe {
    pub fn position(&self) -> Option<LatLng> {
        Some(LatLng::new(self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Suitability {
    /// 0–100.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub competitor_count: Option<u32>,
    #[serde(default)]
    pub road_length_m: Option<f64>,
    /// People per km².
    #[serde(default)]
    pub population_density: Option<f64>,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    #[serde(default)]
    pub predicted_type: Option<String>,
    #[serde(default)]
    pub predicted_suitability: Option<String>,
    /// 0.0–1.0.
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub all_probabilities: BTreeMap<String, f64>,
}

/// Response of `POST /analyze/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub location: Option<LatLng>,
    #[serde(default)]
    pub nearby_count: Option<u32>,
    #[serde(default)]
    pub top5: Vec<Cafe>,
    #[serde(default)]
    pub suitability: Suitability,
    #[serde(default)]
    pub prediction: Prediction,
}

/// Response of `GET /cafes/nearby/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NearbyResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub cafes: Vec<Cafe>,
    #[serde(default)]
    pub center: Option<LatLng>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cafe_type_wire_names() {
        let req = AnalysisRequest {
            lat: 27.7,
            lng: 85.3,
            cafe_type: CafeType::DessertShop,
            radius: 800,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["cafe_type"], "dessert_shop");
        assert_eq!(json["radius"], 800);

        assert_eq!("bakery".parse::<CafeType>(), Ok(CafeType::Bakery));
        assert!("tea_house".parse::<CafeType>().is_err());
    }

    #[test]
    fn test_analysis_response_tolerates_missing_fields() {
        let response: AnalysisResponse = serde_json::from_str(
            r#"{
                "nearby_count": 3,
                "suitability": {"score": 72, "road_length_m": 1840},
                "prediction": {"predicted_type": "Bakery Café", "confidence": 0.87}
            }"#,
        )
        .unwrap();
        assert_eq!(response.nearby_count, Some(3));
        assert!(response.top5.is_empty());
        assert_eq!(response.suitability.score, Some(72.0));
        assert!(response.suitability.population_density.is_none());
        assert_eq!(response.prediction.confidence, Some(0.87));
        assert!(response.prediction.all_probabilities.is_empty());
    }

    #[test]
    fn test_cafe_position_requires_both_coordinates() {
        let cafe: Cafe = serde_json::from_str(r#"{"name": "Himalayan Java", "latitude": 27.71}"#).unwrap();
        assert!(cafe.position().is_none());

        let cafe: Cafe =
            serde_json::from_str(r#"{"name": "Himalayan Java", "latitude": 27.71, "longitude": 85.31}"#)
                .unwrap();
        assert_eq!(cafe.position(), Some(LatLng::new(27.71, 85.31)));
    }
}
