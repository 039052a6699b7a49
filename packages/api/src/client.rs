//! # reqwest-backed backend client
//!
//! [`ApiClient`] owns transport details only: URL construction, the bearer
//! header, JSON (de)serialisation, and mapping HTTP outcomes onto
//! [`ApiError`]. It keeps no per-request state; clones share the HTTP
//! connection pool and the bearer token, so the session layer can update the
//! token once and every holder sees it.
//!
//! On `wasm32` reqwest issues requests through the browser's `fetch`.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::{AnalysisApi, AuthApi};
use crate::error::ApiError;
use crate::models::{
    AmenitiesReport, AnalysisRequest, AnalysisResponse, AreaPopulation, AreaQuery, LoginRequest,
    LoginResponse, NearbyResponse, RegisterRequest,
};

/// HTTP client for the CafeLocate backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    bearer: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a client for endpoints under `base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            bearer: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token currently attached to requests.
    pub fn bearer(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Port the backend is expected on, for the "cannot reach server" advisory.
    fn port(&self) -> u16 {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.port_or_known_default())
            .unwrap_or(80)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_builder() {
                return ApiError::InvalidRequest(e.to_string());
            }
            tracing::warn!(base_url = %self.base_url, "backend unreachable: {}", e);
            ApiError::Unreachable {
                base_url: self.base_url.clone(),
                port: self.port(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // A non-JSON error body keeps the generic message.
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        let err = ApiError::rejected(status.as_u16(), body);
        tracing::warn!(status = status.as_u16(), "request rejected: {}", err);
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.dispatch(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `GET /cafes/nearby/?lat&lng&radius`
    pub async fn nearby_cafes(&self, query: &AreaQuery) -> Result<NearbyResponse, ApiError> {
        tracing::debug!(lat = query.lat, lng = query.lng, radius = query.radius, "nearby cafés");
        self.send_json(self.http.get(self.url("/cafes/nearby/")).query(query))
            .await
    }

    /// `POST /analyze/`
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ApiError> {
        tracing::debug!(
            lat = request.lat,
            lng = request.lng,
            cafe_type = request.cafe_type.as_str(),
            radius = request.radius,
            "suitability analysis"
        );
        self.send_json(self.http.post(self.url("/analyze/")).json(request))
            .await
    }

    /// `POST /amenities-report/`
    pub async fn amenities(&self, query: &AreaQuery) -> Result<AmenitiesReport, ApiError> {
        self.send_json(self.http.post(self.url("/amenities-report/")).json(query))
            .await
    }

    /// `GET /area-population/?lat&lng&radius`
    pub async fn population(&self, query: &AreaQuery) -> Result<AreaPopulation, ApiError> {
        self.send_json(self.http.get(self.url("/area-population/")).query(query))
            .await
    }

    /// `POST /auth/login/`
    pub async fn login_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { username, password };
        self.send_json(self.http.post(self.url("/auth/login/")).json(&body))
            .await
    }

    /// `POST /auth/register/`. The response body is not used.
    pub async fn register_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let body = RegisterRequest {
            username,
            email,
            password,
        };
        self.dispatch(self.http.post(self.url("/auth/register/")).json(&body))
            .await?;
        Ok(())
    }
}

impl AuthApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.login_password(username, password).await
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        self.register_account(username, email, password).await
    }

    fn set_bearer(&self, token: Option<&str>) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = token.map(str::to_string);
    }
}

impl AnalysisApi for ApiClient {
    async fn request_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResponse, ApiError> {
        self.analyze(request).await
    }

    async fn request_nearby(&self, query: &AreaQuery) -> Result<NearbyResponse, ApiError> {
        self.nearby_cafes(query).await
    }

    async fn amenities_report(&self, query: &AreaQuery) -> Result<AmenitiesReport, ApiError> {
        self.amenities(query).await
    }

    async fn area_population(&self, query: &AreaQuery) -> Result<AreaPopulation, ApiError> {
        self.population(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CafeType;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    /// Serve `router` on an ephemeral port and return the API base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    fn fake_backend() -> Router {
        Router::new()
            .route(
                "/api/auth/login/",
                post(|Json(body): Json<Value>| async move {
                    if body["username"] == "bob" && body["password"] == "secret" {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "user": {"id": 1, "username": "bob", "email": "bob@example.com"},
                                "token": "tok-1"
                            })),
                        )
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"error": "Invalid credentials"})),
                        )
                    }
                }),
            )
            .route(
                "/api/auth/register/",
                post(|Json(body): Json<Value>| async move {
                    if body["username"] == "taken" {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"username": ["A user with that username already exists."]})),
                        )
                    } else {
                        (StatusCode::CREATED, Json(json!({"id": 2})))
                    }
                }),
            )
            .route(
                "/api/analyze/",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    let authorized = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        == Some("Bearer tok-1");
                    (
                        StatusCode::OK,
                        Json(json!({
                            "nearby_count": 4,
                            "top5": [{"name": "Himalayan Java", "latitude": 27.71, "longitude": 85.32}],
                            "suitability": {"score": 64, "competitor_count": 4},
                            "prediction": {"predicted_type": body["cafe_type"], "confidence": 0.8},
                            "location": {"lat": body["lat"], "lng": body["lng"]},
                            "authorized": authorized,
                            "radius": body["radius"],
                        })),
                    )
                }),
            )
            .route(
                "/api/cafes/nearby/",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({
                        "count": 1,
                        "cafes": [{"name": "Cafe Soma"}],
                        "center": {"lat": params["lat"].parse::<f64>().unwrap(), "lng": params["lng"].parse::<f64>().unwrap()},
                    }))
                }),
            )
            .route(
                "/api/area-population/",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Traceback (most recent call last)") }),
            )
            .route(
                "/api/amenities-report/",
                post(|| async { (StatusCode::BAD_REQUEST, Json(json!({"detail": "radius out of range"}))) }),
            )
    }

    #[tokio::test]
    async fn test_login_success_and_rejection() {
        let client = ApiClient::new(serve(fake_backend()).await);

        let response = client.login("bob", "secret").await.unwrap();
        assert_eq!(response.token, "tok-1");
        assert_eq!(response.user.username, "bob");

        let err = client.login("bob", "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_register_field_errors_keep_body() {
        let client = ApiClient::new(serve(fake_backend()).await);

        assert!(client.register("alice", "a@example.com", "pw123456").await.is_ok());

        let err = client.register("taken", "t@example.com", "pw123456").await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            crate::error::field_errors(err.body().unwrap()).as_deref(),
            Some("username: A user with that username already exists.")
        );
    }

    #[tokio::test]
    async fn test_bearer_is_attached_only_when_set() {
        let client = ApiClient::new(serve(fake_backend()).await);
        let request = AnalysisRequest {
            lat: 27.7,
            lng: 85.3,
            cafe_type: CafeType::Bakery,
            radius: 800,
        };

        let plain: Value = client
            .send_json(client.http.post(client.url("/analyze/")).json(&request))
            .await
            .unwrap();
        assert_eq!(plain["authorized"], false);
        assert_eq!(plain["radius"], 800);

        client.set_bearer(Some("tok-1"));
        let shared = client.clone();
        let authed: Value = shared
            .send_json(shared.http.post(shared.url("/analyze/")).json(&request))
            .await
            .unwrap();
        assert_eq!(authed["authorized"], true);

        client.set_bearer(None);
        assert!(shared.bearer().is_none());
    }

    #[tokio::test]
    async fn test_analysis_and_nearby_decode() {
        let client = ApiClient::new(serve(fake_backend()).await);
        let analysis = client
            .request_analysis(&AnalysisRequest {
                lat: 27.7,
                lng: 85.3,
                cafe_type: CafeType::CoffeeShop,
                radius: 500,
            })
            .await
            .unwrap();
        assert_eq!(analysis.suitability.score, Some(64.0));
        assert_eq!(analysis.prediction.predicted_type.as_deref(), Some("coffee_shop"));
        assert_eq!(analysis.top5.len(), 1);

        let nearby = client
            .request_nearby(&AreaQuery {
                lat: 27.7,
                lng: 85.3,
                radius: 500,
            })
            .await
            .unwrap();
        assert_eq!(nearby.count, 1);
        assert_eq!(nearby.cafes[0].name, "Cafe Soma");
        assert_eq!(nearby.center.map(|c| c.lat), Some(27.7));
    }

    #[tokio::test]
    async fn test_error_bodies_map_to_messages() {
        let client = ApiClient::new(serve(fake_backend()).await);
        let query = AreaQuery {
            lat: 27.7,
            lng: 85.3,
            radius: 500,
        };

        let err = client.area_population(&query).await.unwrap_err();
        assert_eq!(err.to_string(), "server error (500)");

        let err = client.amenities_report(&query).await.unwrap_err();
        assert_eq!(err.to_string(), "radius out of range");
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // Grab a free port, then close it so nothing is listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = ApiClient::new(format!("http://127.0.0.1:{port}/api/"));
        assert_eq!(client.base_url(), format!("http://127.0.0.1:{port}/api"));

        let err = client.login("bob", "secret").await.unwrap_err();
        assert!(err.is_unreachable());
        assert!(err.to_string().contains(&format!("port {port}")));
    }
}
