//! Wire models exchanged with the CafeLocate backend.

mod analysis;
mod area;
mod user;

pub use analysis::{
    AnalysisRequest, AnalysisResponse, Cafe, CafeType, LatLng, NearbyResponse, Prediction,
    Suitability, UnknownCafeType,
};
pub use area::{Amenity, AmenityGroup, AmenitiesReport, AreaPopulation, AreaQuery, Ward};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, UserId, UserRecord, GUEST_USERNAME};
