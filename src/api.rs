//! HTTP adapter for the waste-management backend.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;
use crate::model::Area;
use crate::request::{AdjustRouteRequest, OptimizationRequest};
use crate::schedule::{SchedulePayload, ScheduleRecord};
use crate::traits::{OptimizedRoute, RouteBackend};

pub const BASE_URL_ENV: &str = "WASTE_API_URL";
pub const TOKEN_ENV: &str = "WASTE_API_TOKEN";
pub const TIMEOUT_ENV: &str = "WASTE_API_TIMEOUT_SECS";

/// Bearer token sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Creates credentials for `Authorization: Bearer <token>`.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("token", &"<redacted>").finish()
    }
}

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Sent on every request when set.
    pub credentials: Option<Credentials>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
            credentials: None,
        }
    }
}

impl ApiConfig {
    /// Reads `WASTE_API_URL`, `WASTE_API_TOKEN` and `WASTE_API_TIMEOUT_SECS`,
    /// keeping the defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ApiConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup(BASE_URL_ENV)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout_secs: lookup(TIMEOUT_ENV)
                .and_then(|secs| secs.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            credentials: lookup(TOKEN_ENV)
                .filter(|token| !token.is_empty())
                .map(Credentials::bearer),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Blocking [`RouteBackend`] over the backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: ApiConfig,
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    /// Creates a new backend client with the given configuration.
    ///
    /// Fails only if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.client.get(self.config.url(path)))
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.send(self.client.post(self.config.url(path)).json(body))
    }

    fn send<T: DeserializeOwned>(&self, request: reqwest::blocking::RequestBuilder) -> Result<T, ApiError> {
        let request = match &self.config.credentials {
            Some(credentials) => request.bearer_auth(credentials.token()),
            None => request,
        };

        let response = request.send()?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "backend response");

        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl RouteBackend for HttpBackend {
    fn areas_with_bins(&self) -> Result<Vec<Area>, ApiError> {
        self.get("/api/areas/with-bins")
    }

    fn optimize_route(&self, request: &OptimizationRequest) -> Result<OptimizedRoute, ApiError> {
        self.post(
            &format!("/api/route-optimization/area/{}", request.area_id),
            request,
        )
    }

    fn adjust_route(&self, request: &AdjustRouteRequest) -> Result<OptimizedRoute, ApiError> {
        self.post("/api/route-optimization/adjust-existing", request)
    }

    fn create_schedule(&self, payload: &SchedulePayload) -> Result<ScheduleRecord, ApiError> {
        self.post("/api/schedules", payload)
    }
}
