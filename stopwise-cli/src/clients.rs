//! Construction of road-network cost-query clients.

use stopwise_core::CostQueryClient;

use crate::CliError;

/// Builds a cost-query client for a routing engine endpoint.
pub(crate) trait QueryClientFactory {
    fn build(&self, base_url: &str) -> Result<Box<dyn CostQueryClient>, CliError>;
}

/// Connects to an OSRM-compatible engine when the `osrm` feature is enabled.
pub(crate) struct DefaultQueryClientFactory;

impl QueryClientFactory for DefaultQueryClientFactory {
    #[cfg(feature = "osrm")]
    fn build(&self, base_url: &str) -> Result<Box<dyn CostQueryClient>, CliError> {
        let client = stopwise_osrm::OsrmClient::new(base_url).map_err(|source| {
            CliError::BuildClient {
                base_url: base_url.to_owned(),
                source,
            }
        })?;
        Ok(Box::new(client))
    }

    #[cfg(not(feature = "osrm"))]
    fn build(&self, _base_url: &str) -> Result<Box<dyn CostQueryClient>, CliError> {
        Err(CliError::MissingFeature {
            feature: "osrm",
            action: "querying a routing engine",
        })
    }
}

/// The routing engine URL used when none is configured.
pub(crate) fn default_base_url() -> String {
    #[cfg(feature = "osrm")]
    {
        stopwise_osrm::OsrmClientConfig::default().base_url
    }
    #[cfg(not(feature = "osrm"))]
    {
        "http://localhost:5000".to_owned()
    }
}
