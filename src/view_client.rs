//! A client to query monitoring data from the WMStats database.
//!
//! In order to do so it defines a [ViewClient] which exposes the following features:
//!  - [view][ViewClient::view]: query a view of the `WMStats` design document by name
//!  - [all_docs][ViewClient::all_docs]: list all documents of the database
//!
//! # Query a view
//!
//! To query a view using the [ClientBuilder][crate::ClientBuilder].
//!
//! ```no_run
//! # async fn run() -> wmstats_client::WMStatsResult<()> {
//! use serde_json::json;
//! use wmstats_client::{ClientBuilder, ViewQuery};
//!
//! let client = ClientBuilder::couch("YOUR_COUCHDB_ENDPOINT").build()?;
//! let jobs = client
//!     .views()
//!     .view("jobsByStatus", ViewQuery::default().with_startkey(json!(["running"])))
//!     .await?;
//!
//! for row in jobs.rows {
//!     println!("key={}, value={}", row.key, row.value);
//! }
//! #    Ok(())
//! # }
//! ```
//!
//! # List all documents
//!
//! To list the documents of the database using the [ClientBuilder][crate::ClientBuilder].
//!
//! ```no_run
//! # async fn run() -> wmstats_client::WMStatsResult<()> {
//! use wmstats_client::{ClientBuilder, ViewQuery};
//!
//! let client = ClientBuilder::couch("YOUR_COUCHDB_ENDPOINT").build()?;
//! let documents = client.views().all_docs(ViewQuery::default()).await?;
//!
//! println!("{} documents", documents.rows.len());
//! #    Ok(())
//! # }
//! ```

use std::sync::Arc;

use anyhow::Context;

use crate::couch_client::{CouchClient, CouchRequest};
use crate::{ViewQuery, ViewResultSet, WMStatsResult};

/// Client for the views of one design document of the bound database
pub struct ViewClient {
    couch_client: Arc<dyn CouchClient>,
    design_document: String,
}

impl ViewClient {
    /// Constructs a new `ViewClient` scoped to the given design document.
    pub fn new(couch_client: Arc<dyn CouchClient>, design_document: &str) -> Self {
        Self {
            couch_client,
            design_document: design_document.to_string(),
        }
    }

    /// Query the given view of the design document.
    ///
    /// The result set is delivered through the returned future, exactly once;
    /// any transport or decode failure surfaces as an error.
    pub async fn view(&self, name: &str, query: ViewQuery) -> WMStatsResult<ViewResultSet> {
        self.execute(CouchRequest::GetView {
            design: self.design_document.clone(),
            name: name.to_string(),
            query,
        })
        .await
    }

    /// List all documents of the database, outside any design document scope.
    pub async fn all_docs(&self, query: ViewQuery) -> WMStatsResult<ViewResultSet> {
        self.execute(CouchRequest::ListAllDocs { query }).await
    }

    async fn execute(&self, request: CouchRequest) -> WMStatsResult<ViewResultSet> {
        // Keys queries travel as a POST body, everything else as a GET.
        let response = if request.get_body().is_some() {
            self.couch_client.post_content(request).await
        } else {
            self.couch_client.get_content(request).await
        }
        .with_context(|| "View Client can not get the result set")?;
        let result_set = serde_json::from_str::<ViewResultSet>(&response)
            .with_context(|| "View Client can not deserialize result set")?;

        Ok(result_set)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::couch_client::MockCouchHTTPClient;
    use crate::entities::ViewResultRow;

    use super::*;

    fn fake_rows() -> ViewResultSet {
        ViewResultSet {
            total_rows: Some(2),
            offset: Some(0),
            rows: vec![
                ViewResultRow {
                    id: Some("job-123".to_string()),
                    key: json!(["running", "T1_IT_CNAF"]),
                    value: json!(1),
                    doc: None,
                },
                ViewResultRow {
                    id: Some("job-456".to_string()),
                    key: json!(["running", "T2_CH_CERN"]),
                    value: json!(7),
                    doc: None,
                },
            ],
        }
    }

    #[tokio::test]
    async fn view_forwards_design_scoped_request() {
        let rows = fake_rows();
        let mut couch_client = MockCouchHTTPClient::new();
        let expected_request = CouchRequest::GetView {
            design: "WMStats".to_string(),
            name: "jobsByStatus".to_string(),
            query: ViewQuery::default().with_startkey(json!(["running"])),
        };
        couch_client
            .expect_get_content()
            .withf(move |request| *request == expected_request)
            .return_once(move |_| Ok(serde_json::to_string(&rows).unwrap()));
        let client = ViewClient::new(Arc::new(couch_client), "WMStats");

        let result_set = client
            .view(
                "jobsByStatus",
                ViewQuery::default().with_startkey(json!(["running"])),
            )
            .await
            .unwrap();

        assert_eq!(2, result_set.rows.len());
        assert_eq!(Some("job-123".to_string()), result_set.rows[0].id);
    }

    #[tokio::test]
    async fn all_docs_never_builds_a_view_route() {
        let rows = fake_rows();
        let mut couch_client = MockCouchHTTPClient::new();
        couch_client
            .expect_get_content()
            .withf(|request| {
                *request
                    == CouchRequest::ListAllDocs {
                        query: ViewQuery::default(),
                    }
                    && request.route() == "_all_docs"
            })
            .return_once(move |_| Ok(serde_json::to_string(&rows).unwrap()));
        let client = ViewClient::new(Arc::new(couch_client), "WMStats");

        let result_set = client.all_docs(ViewQuery::default()).await.unwrap();

        assert_eq!(2, result_set.rows.len());
    }

    #[tokio::test]
    async fn keys_query_goes_through_post() {
        let rows = fake_rows();
        let mut couch_client = MockCouchHTTPClient::new();
        couch_client.expect_get_content().never();
        couch_client
            .expect_post_content()
            .withf(|request| {
                request.get_body() == Some(r#"{"keys":["job-123","job-456"]}"#.to_string())
            })
            .return_once(move |_| Ok(serde_json::to_string(&rows).unwrap()));
        let client = ViewClient::new(Arc::new(couch_client), "WMStats");

        client
            .view(
                "jobsByStatus",
                ViewQuery::default().with_keys(vec![json!("job-123"), json!("job-456")]),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rows_are_delivered_exactly_as_returned_by_the_transport() {
        let rows = fake_rows();
        let expected = rows.clone();
        let mut couch_client = MockCouchHTTPClient::new();
        couch_client
            .expect_get_content()
            .return_once(move |_| Ok(serde_json::to_string(&rows).unwrap()));
        let client = ViewClient::new(Arc::new(couch_client), "WMStats");

        let result_set = client.view("agentInfo", ViewQuery::default()).await.unwrap();

        assert_eq!(expected, result_set);
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_error() {
        let mut couch_client = MockCouchHTTPClient::new();
        couch_client.expect_get_content().return_once(|_| {
            Err(crate::couch_client::CouchClientError::RemoteServerTechnical(
                anyhow::anyhow!("view compaction in progress"),
            ))
        });
        let client = ViewClient::new(Arc::new(couch_client), "WMStats");

        client
            .view("jobsByStatus", ViewQuery::default())
            .await
            .expect_err("a transport failure must not be silently dropped");
    }
}
