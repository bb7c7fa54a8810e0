use anyhow::{Context, anyhow};
use reqwest::Url;
use slog::{Logger, o};
use std::collections::HashMap;
use std::sync::Arc;

use crate::WMStatsResult;
use crate::couch_client::{CouchClient, CouchHTTPClient};
use crate::view_client::ViewClient;

/// Name of the central summary database.
pub const WMSTATS_DATABASE: &str = "wmstats";

/// Name of the design document holding the WMStats views.
pub const WMSTATS_DESIGN_DOCUMENT: &str = "WMStats";

/// Structure that aggregates the available clients for the WMStats database.
///
/// Use the [ClientBuilder] to instantiate it easily.
pub struct Client {
    view_client: Arc<ViewClient>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// Get the client that queries views and document listings.
    pub fn views(&self) -> Arc<ViewClient> {
        self.view_client.clone()
    }
}

/// Builder that can be used to create a [Client] easily or with custom dependencies.
pub struct ClientBuilder {
    couch_url: Option<String>,
    couch_client: Option<Arc<dyn CouchClient>>,
    logger: Option<Logger>,
    custom_http_headers: Option<HashMap<String, String>>,
}

impl ClientBuilder {
    /// Construct a new [ClientBuilder] that fetches data from the CouchDB
    /// server at the given url.
    ///
    /// The database name and the design document name are fixed,
    /// [WMSTATS_DATABASE] and [WMSTATS_DESIGN_DOCUMENT].
    pub fn couch(url: &str) -> ClientBuilder {
        Self {
            couch_url: Some(url.to_string()),
            couch_client: None,
            logger: None,
            custom_http_headers: None,
        }
    }

    /// Construct a new [ClientBuilder] without any dependencies set.
    ///
    /// Use [ClientBuilder::couch] if you don't need to set a custom
    /// [CouchClient] to request data from the database.
    pub fn new() -> ClientBuilder {
        Self {
            couch_url: None,
            couch_client: None,
            logger: None,
            custom_http_headers: None,
        }
    }

    /// Returns a [Client] that uses the dependencies provided to the [ClientBuilder].
    ///
    /// For missing dependencies the builder will try to create them using
    /// default implementations if possible.
    pub fn build(self) -> WMStatsResult<Client> {
        let logger = match self.logger {
            Some(logger) => logger,
            None => Logger::root(slog::Discard, o!()),
        };

        let couch_client: Arc<dyn CouchClient> = match self.couch_client {
            None => {
                let url = self.couch_url.ok_or(anyhow!(
                    "No CouchDB url found: \
                    You must either provide a CouchDB url or your own CouchClient implementation"
                ))?;
                let url =
                    Url::parse(&url).with_context(|| format!("Invalid CouchDB URL: '{url}'"))?;

                Arc::new(
                    CouchHTTPClient::new(
                        url,
                        WMSTATS_DATABASE,
                        logger.clone(),
                        self.custom_http_headers,
                    )
                    .with_context(|| "Building couch client failed")?,
                )
            }
            Some(client) => client,
        };

        let view_client = Arc::new(ViewClient::new(couch_client, WMSTATS_DESIGN_DOCUMENT));

        Ok(Client { view_client })
    }

    /// Set the [CouchClient] that will be used to request data to the database.
    pub fn with_couch_client(mut self, couch_client: Arc<dyn CouchClient>) -> ClientBuilder {
        self.couch_client = Some(couch_client);
        self
    }

    /// Set the [Logger] to use.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set custom headers to send with every HTTP request.
    pub fn with_custom_http_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.custom_http_headers = Some(headers);
        self
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
