//! # API crate: HTTP access to the CafeLocate backend
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`backend`] | `AuthApi` / `AnalysisApi` traits the client state machines depend on |
//! | [`client`] | [`ApiClient`], the reqwest implementation of both traits |
//! | [`error`] | [`ApiError`] and the message-extraction helpers |
//! | [`models`] | Request/response payloads and the [`UserRecord`] kept in the session |
//!
//! ## Endpoints
//!
//! All paths are relative to the configured base address.
//!
//! - **Auth**: `POST /auth/login/`, `POST /auth/register/`
//! - **Analysis**: `POST /analyze/`, `GET /cafes/nearby/`
//! - **Area report**: `POST /amenities-report/`, `GET /area-population/`

pub mod backend;
pub mod client;
pub mod error;
pub mod models;

pub use backend::{AnalysisApi, AuthApi};
pub use client::ApiClient;
pub use error::ApiError;
pub use models::{
    AnalysisRequest, AnalysisResponse, AreaQuery, CafeType, LatLng, LoginResponse, UserRecord,
};
