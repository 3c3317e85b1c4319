//! `OsrmClient`: a [`CostQueryClient`] backed by OSRM's Route and Table
//! services.

use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use stopwise_core::{
    Coordinate, CostCell, CostMatrix, CostQueryClient, CostTables, QueryError, RoadRoute,
};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::osrm::{RouteResponse, TableResponse};

/// Error type for [`OsrmClient`] construction failures.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default OSRM endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default routing profile.
pub const DEFAULT_PROFILE: &str = "driving";

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "stopwise-routing/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`OsrmClient`].
#[derive(Debug, Clone)]
pub struct OsrmClientConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile segment of the request path, e.g. `"driving"`.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OsrmClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmClientConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP cost-query client for an OSRM-compatible routing engine.
///
/// The client implements the synchronous [`CostQueryClient`] trait by
/// blocking on asynchronous HTTP requests. It owns a multi-threaded Tokio
/// runtime that is reused across calls, so several worker threads of a
/// network matrix build may block on it at the same time.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the client uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics. Inside a
/// `current_thread` runtime it falls back to its own runtime.
pub struct OsrmClient {
    client: Client,
    config: OsrmClientConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OsrmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmClient")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OsrmClient {
    /// Create a new client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(OsrmClientConfig::new(base_url))
    }

    /// Create a new client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OsrmClientConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(ClientBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &OsrmClientConfig {
        &self.config
    }

    /// `{base_url}/{service}/v1/{profile}/{lon,lat;...}`.
    fn service_url(&self, service: &str, coordinates: &[Coordinate]) -> String {
        let coords = coordinates
            .iter()
            .map(|c| format!("{},{}", c.longitude(), c.latitude()))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/{service}/v1/{}/{coords}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        )
    }

    fn build_route_url(&self, waypoints: &[Coordinate]) -> String {
        format!(
            "{}?overview=full&geometries=geojson",
            self.service_url("route", waypoints)
        )
    }

    fn build_table_url(&self, coordinates: &[Coordinate]) -> String {
        format!(
            "{}?annotations=distance,duration",
            self.service_url("table", coordinates)
        )
    }

    /// GET `url` and decode the JSON body.
    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, QueryError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;

        response.json().await.map_err(|err| QueryError::ParseError {
            message: err.to_string(),
        })
    }

    /// Convert a reqwest error to a `QueryError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> QueryError {
        if error.is_timeout() {
            return QueryError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return QueryError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        QueryError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Run `future` to completion from synchronous code.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

/// Convert an OSRM route response into a [`RoadRoute`].
///
/// Only the first route is used. Geometry positions that are not valid
/// coordinates drop the geometry rather than failing the query.
fn convert_route(response: RouteResponse) -> Result<RoadRoute, QueryError> {
    if !response.is_ok() {
        return Err(QueryError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| QueryError::ParseError {
            message: "OSRM response contains no routes".to_owned(),
        })?;

    let geometry = route.geometry.and_then(|line| {
        line.coordinates
            .into_iter()
            .map(|[lon, lat]| Coordinate::new(lat, lon))
            .collect::<Result<Vec<_>, _>>()
            .ok()
    });

    Ok(RoadRoute {
        distance_m: route.distance,
        duration_s: route.duration,
        geometry,
    })
}

/// Convert an OSRM table response into [`CostTables`] of `expected` stops.
///
/// `null`, negative and non-finite entries become
/// [`CostCell::Unreachable`].
fn convert_table(response: TableResponse, expected: usize) -> Result<CostTables, QueryError> {
    if !response.is_ok() {
        return Err(QueryError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let distances = response.distances.ok_or_else(|| QueryError::ParseError {
        message: "OSRM response missing distances array".to_owned(),
    })?;
    let durations = response.durations.ok_or_else(|| QueryError::ParseError {
        message: "OSRM response missing durations array".to_owned(),
    })?;

    Ok(CostTables {
        distances: table_matrix(distances, expected)?,
        durations: table_matrix(durations, expected)?,
    })
}

fn table_matrix(rows: Vec<Vec<Option<f64>>>, expected: usize) -> Result<CostMatrix, QueryError> {
    if rows.len() != expected {
        return Err(QueryError::DimensionMismatch {
            expected,
            rows: rows.len(),
        });
    }
    let cells = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map_or(CostCell::Unreachable, CostCell::from_value))
                .collect()
        })
        .collect();
    CostMatrix::from_cells(cells).map_err(|err| QueryError::ParseError {
        message: err.to_string(),
    })
}

impl CostQueryClient for OsrmClient {
    /// Road route through `waypoints` in order.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime should
    /// be multi-threaded; inside a `current_thread` runtime the call blocks
    /// that runtime while the client's own runtime serves the request.
    fn route(&self, waypoints: &[Coordinate]) -> Result<RoadRoute, QueryError> {
        if waypoints.len() < 2 {
            return Err(QueryError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }

        let url = self.build_route_url(waypoints);
        debug!("requesting OSRM route through {} waypoints", waypoints.len());
        let result = self
            .block_on(self.fetch::<RouteResponse>(&url))
            .and_then(convert_route);
        if let Err(err) = &result {
            warn!("OSRM route query failed: {err}");
        }
        result
    }

    fn table(&self, coordinates: &[Coordinate]) -> Result<CostTables, QueryError> {
        if coordinates.is_empty() {
            return Err(QueryError::EmptyInput);
        }

        let url = self.build_table_url(coordinates);
        debug!("requesting OSRM table for {} coordinates", coordinates.len());
        let result = self
            .block_on(self.fetch::<TableResponse>(&url))
            .and_then(|response| convert_table(response, coordinates.len()));
        if let Err(err) = &result {
            warn!("OSRM table query failed: {err}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn stops() -> Vec<Coordinate> {
        vec![
            Coordinate::new(51.5, -0.1).expect("valid coordinate"),
            Coordinate::new(51.6, -0.2).expect("valid coordinate"),
        ]
    }

    #[fixture]
    fn client() -> OsrmClient {
        OsrmClient::new("http://osrm.example.com").expect("client should build")
    }

    fn ok_table(cells: Vec<Vec<Option<f64>>>) -> TableResponse {
        TableResponse {
            code: "Ok".to_owned(),
            message: None,
            distances: Some(cells.clone()),
            durations: Some(cells),
        }
    }

    #[rstest]
    fn build_table_url_formats_coordinates(client: OsrmClient, stops: Vec<Coordinate>) {
        assert_eq!(
            client.build_table_url(&stops),
            "http://osrm.example.com/table/v1/driving/-0.1,51.5;-0.2,51.6\
             ?annotations=distance,duration"
        );
    }

    #[rstest]
    fn build_route_url_requests_geojson_overview(client: OsrmClient, stops: Vec<Coordinate>) {
        assert_eq!(
            client.build_route_url(&stops),
            "http://osrm.example.com/route/v1/driving/-0.1,51.5;-0.2,51.6\
             ?overview=full&geometries=geojson"
        );
    }

    #[rstest]
    fn urls_strip_trailing_slash_and_use_profile(stops: Vec<Coordinate>) {
        let config = OsrmClientConfig::new("http://osrm.example.com/").with_profile("car");
        let client = OsrmClient::with_config(config).expect("client should build");

        let url = client.build_route_url(&stops);

        assert!(url.starts_with("http://osrm.example.com/route/v1/car/"));
        assert!(!url.contains("//route"));
    }

    #[rstest]
    fn convert_table_maps_nulls_to_unreachable() {
        let response = ok_table(vec![vec![Some(0.0), None], vec![Some(950.0), Some(0.0)]]);

        let tables = convert_table(response, 2).expect("should parse");

        assert_eq!(tables.distances.get(0, 1), Some(CostCell::Unreachable));
        assert_eq!(tables.distances.get(1, 0), Some(CostCell::Cost(950.0)));
        assert_eq!(tables.durations.get(0, 0), Some(CostCell::ZERO));
    }

    #[rstest]
    fn convert_table_rejects_wrong_dimension() {
        let response = ok_table(vec![vec![Some(0.0)]]);

        let err = convert_table(response, 2).expect_err("should fail");

        assert_eq!(err, QueryError::DimensionMismatch { expected: 2, rows: 1 });
    }

    #[rstest]
    fn convert_table_requires_both_annotations() {
        let response = TableResponse {
            code: "Ok".to_owned(),
            message: None,
            distances: Some(vec![vec![Some(0.0)]]),
            durations: None,
        };

        let err = convert_table(response, 1).expect_err("should fail");

        assert!(matches!(err, QueryError::ParseError { .. }));
    }

    #[rstest]
    #[case("NoRoute", Some("Impossible route".to_owned()), "Impossible route")]
    #[case("InvalidQuery", None, "")]
    fn convert_route_reports_service_errors(
        #[case] code: &str,
        #[case] message: Option<String>,
        #[case] expected: &str,
    ) {
        let response = RouteResponse {
            code: code.to_owned(),
            message,
            routes: Vec::new(),
        };

        let err = convert_route(response).expect_err("should fail");

        assert_eq!(
            err,
            QueryError::ServiceError {
                code: code.to_owned(),
                message: expected.to_owned(),
            }
        );
    }

    #[rstest]
    fn convert_route_requires_a_route() {
        let response = RouteResponse {
            code: "Ok".to_owned(),
            message: None,
            routes: Vec::new(),
        };

        assert!(matches!(
            convert_route(response),
            Err(QueryError::ParseError { .. })
        ));
    }

    #[rstest]
    fn route_rejects_single_waypoint(client: OsrmClient, stops: Vec<Coordinate>) {
        let err = client.route(&stops[..1]).expect_err("should fail");

        assert_eq!(err, QueryError::TooFewWaypoints { count: 1 });
    }

    #[rstest]
    fn table_rejects_empty_input(client: OsrmClient) {
        assert_eq!(client.table(&[]), Err(QueryError::EmptyInput));
    }

    #[rstest]
    fn config_builder_sets_all_fields() {
        let config = OsrmClientConfig::new("http://custom:8080")
            .with_profile("foot")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("custom-agent/1.0");

        assert_eq!(config.base_url, "http://custom:8080");
        assert_eq!(config.profile, "foot");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "custom-agent/1.0");
    }

    #[rstest]
    fn default_config_targets_local_driving_profile() {
        let config = OsrmClientConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.profile, DEFAULT_PROFILE);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
