//! Traits the client state machines are written against.
//!
//! [`crate::ApiClient`] implements both; tests substitute in-memory fakes.
//! Futures are not required to be `Send`: the client runs on the browser's
//! single-threaded event loop.

use std::future::Future;

use crate::error::ApiError;
use crate::models::{
    AmenitiesReport, AnalysisRequest, AnalysisResponse, AreaPopulation, AreaQuery, LoginResponse,
    NearbyResponse,
};

/// Credential exchange and account creation.
pub trait AuthApi {
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>>;

    fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), ApiError>>;

    /// Token attached as `Authorization: Bearer` to subsequent requests.
    fn set_bearer(&self, token: Option<&str>);
}

/// Location analysis endpoints.
pub trait AnalysisApi {
    fn request_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<AnalysisResponse, ApiError>>;

    fn request_nearby(
        &self,
        query: &AreaQuery,
    ) -> impl Future<Output = Result<NearbyResponse, ApiError>>;

    fn amenities_report(
        &self,
        query: &AreaQuery,
    ) -> impl Future<Output = Result<AmenitiesReport, ApiError>>;

    fn area_population(
        &self,
        query: &AreaQuery,
    ) -> impl Future<Output = Result<AreaPopulation, ApiError>>;
}
