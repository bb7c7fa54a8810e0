//! Mechanisms to exchange data with a CouchDB server.
//!
//! The [CouchClient] trait abstracts how the communication with the database
//! is done.
//! The clients that need to communicate only need to define their request
//! using the [CouchRequest] enum.
//!
//! An implementation using HTTP is available: [CouchHTTPClient].

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Response, StatusCode, Url};
use slog::{Logger, debug};
use std::collections::HashMap;
use thiserror::Error;

use crate::entities::CouchErrorMessage;
use crate::query::ViewQuery;
use crate::{WMStatsError, WMStatsResult};

/// Error tied with the Couch client
#[derive(Error, Debug)]
pub enum CouchClientError {
    /// Error raised when querying the database returned a 5XX error.
    #[error("Internal error of the CouchDB server")]
    RemoteServerTechnical(#[source] WMStatsError),

    /// Error raised when querying the database returned a 4XX error.
    #[error("Invalid request to the CouchDB server")]
    RemoteServerLogical(#[source] WMStatsError),

    /// HTTP subsystem error
    #[error("HTTP subsystem error")]
    SubsystemError(#[source] WMStatsError),
}

/// What can be read from a [CouchClient].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouchRequest {
    /// Query a view defined in a design document of the bound database
    GetView {
        /// Name of the design document holding the view
        design: String,
        /// Name of the view within the design document
        name: String,
        /// Query parameters
        query: ViewQuery,
    },
    /// List all documents of the bound database
    ListAllDocs {
        /// Query parameters
        query: ViewQuery,
    },
}

impl CouchRequest {
    /// Get the request route relative to the database root endpoint.
    pub fn route(&self) -> String {
        match self {
            CouchRequest::GetView { design, name, .. } => {
                format!("_design/{design}/_view/{name}")
            }
            CouchRequest::ListAllDocs { .. } => "_all_docs".to_string(),
        }
    }

    /// Get the URL query pairs to send with the request.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query().to_query_pairs()
    }

    /// Get the request body to send to the database.
    ///
    /// Only present for `keys` queries, which CouchDB accepts as a POST of
    /// `{"keys": [...]}` on the same route.
    pub fn get_body(&self) -> Option<String> {
        self.query()
            .keys
            .as_ref()
            .map(|keys| serde_json::json!({ "keys": keys }).to_string())
    }

    fn query(&self) -> &ViewQuery {
        match self {
            CouchRequest::GetView { query, .. } => query,
            CouchRequest::ListAllDocs { query } => query,
        }
    }
}

/// API that defines a client for the database
#[async_trait]
pub trait CouchClient: Sync + Send {
    /// Get the content back from the database
    async fn get_content(&self, request: CouchRequest) -> Result<String, CouchClientError>;

    /// Post information to the database
    async fn post_content(&self, request: CouchRequest) -> Result<String, CouchClientError>;
}

/// Responsible for HTTP transport against one CouchDB database.
pub struct CouchHTTPClient {
    http_client: reqwest::Client,
    database_endpoint: Url,
    logger: Logger,
    http_headers: HeaderMap,
}

impl CouchHTTPClient {
    /// Constructs a new `CouchHTTPClient` bound to the given database of the
    /// given server.
    pub fn new(
        couch_endpoint: Url,
        database: &str,
        logger: Logger,
        custom_headers: Option<HashMap<String, String>>,
    ) -> WMStatsResult<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .build()
            .with_context(|| "Building http client for Couch client failed")?;

        // Trailing slash is significant because url::join
        // (https://docs.rs/url/latest/url/struct.Url.html#method.join) will remove
        // the 'path' part of the url if it doesn't end with a trailing slash.
        let couch_endpoint = if couch_endpoint.as_str().ends_with('/') {
            couch_endpoint
        } else {
            let mut url = couch_endpoint.clone();
            url.set_path(&format!("{}/", couch_endpoint.path()));
            url
        };
        let database_endpoint = couch_endpoint.join(&format!("{database}/")).with_context(
            || format!("Invalid url when joining database '{database}' to couch url '{couch_endpoint}'"),
        )?;

        let mut http_headers = HeaderMap::new();
        if let Some(headers) = custom_headers {
            for (key, value) in headers.iter() {
                http_headers.insert(
                    HeaderName::from_bytes(key.as_bytes())?,
                    HeaderValue::from_str(value)?,
                );
            }
        }

        Ok(Self {
            http_client,
            database_endpoint,
            logger,
            http_headers,
        })
    }

    /// Perform a HTTP GET request on the database and return the response
    async fn get(&self, url: Url) -> Result<Response, CouchClientError> {
        debug!(self.logger, "GET url='{url}'.");
        let request_builder = self
            .http_client
            .get(url.clone())
            .headers(self.http_headers.clone());

        let response = request_builder.send().await.map_err(|e| {
            CouchClientError::SubsystemError(anyhow!(e).context(format!(
                "Cannot perform a GET against the CouchDB server (url='{url}')"
            )))
        })?;

        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::NOT_FOUND => Err(Self::not_found_error(url)),
            status_code if status_code.is_client_error() => {
                Err(Self::remote_logical_error(response).await)
            }
            _ => Err(Self::remote_technical_error(response).await),
        }
    }

    async fn post(&self, url: Url, json: &str) -> Result<Response, CouchClientError> {
        debug!(self.logger, "POST url='{url}'"; "json" => json);
        let request_builder = self
            .http_client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(json.to_owned())
            .headers(self.http_headers.clone());

        let response = request_builder.send().await.map_err(|e| {
            CouchClientError::SubsystemError(
                anyhow!(e).context(format!("Error while POSTing data '{json}' to URL='{url}'.")),
            )
        })?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(response),
            StatusCode::NOT_FOUND => Err(Self::not_found_error(url)),
            status_code if status_code.is_client_error() => {
                Err(Self::remote_logical_error(response).await)
            }
            _ => Err(Self::remote_technical_error(response).await),
        }
    }

    fn get_url_for_request(&self, request: &CouchRequest) -> Result<Url, CouchClientError> {
        let route = request.route();
        let mut url = self
            .database_endpoint
            .join(&route)
            .with_context(|| {
                format!(
                    "Invalid url when joining given route, '{route}', to database url '{}'",
                    self.database_endpoint
                )
            })
            .map_err(CouchClientError::SubsystemError)?;

        let pairs = request.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    fn not_found_error(url: Url) -> CouchClientError {
        CouchClientError::RemoteServerLogical(anyhow!("Url='{url}' not found"))
    }

    async fn remote_logical_error(response: Response) -> CouchClientError {
        let status_code = response.status();
        let error_message = response
            .json::<CouchErrorMessage>()
            .await
            .unwrap_or(CouchErrorMessage::new(
                format!("Unhandled error {status_code}"),
                "",
            ));

        CouchClientError::RemoteServerLogical(anyhow!("{error_message}"))
    }

    async fn remote_technical_error(response: Response) -> CouchClientError {
        let status_code = response.status();
        let error_message = response
            .json::<CouchErrorMessage>()
            .await
            .unwrap_or(CouchErrorMessage::new(
                format!("Unhandled error {status_code}"),
                "",
            ));

        CouchClientError::RemoteServerTechnical(anyhow!("{error_message}"))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
impl CouchClient for CouchHTTPClient {
    async fn get_content(&self, request: CouchRequest) -> Result<String, CouchClientError> {
        let response = self.get(self.get_url_for_request(&request)?).await?;
        let content = format!("{response:?}");

        response.text().await.map_err(|e| {
            CouchClientError::SubsystemError(
                anyhow!(e).context(format!("Could not find a JSON body in the response '{content}'.")),
            )
        })
    }

    async fn post_content(&self, request: CouchRequest) -> Result<String, CouchClientError> {
        let response = self
            .post(
                self.get_url_for_request(&request)?,
                &request.get_body().unwrap_or_default(),
            )
            .await?;

        response.text().await.map_err(|e| {
            CouchClientError::SubsystemError(
                anyhow!(e).context("Could not find a text body in the response."),
            )
        })
    }
}
