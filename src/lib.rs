#![warn(missing_docs)]

//! Define everything necessary to query the WMStats monitoring database, a
//! CouchDB database holding workload management summary documents.
//!
//! The database name (`wmstats`) and the design document holding its views
//! (`WMStats`) are fixed; callers only provide the CouchDB server endpoint,
//! a view name and optional query parameters.
//!
//! To build a [Client] use the [ClientBuilder]:
//!
//! ```no_run
//! # async fn run() -> wmstats_client::WMStatsResult<()> {
//! use serde_json::json;
//! use wmstats_client::{ClientBuilder, ViewQuery};
//!
//! let client = ClientBuilder::couch("http://localhost:5984/").build()?;
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
//! The HTTP transport lives behind the [CouchClient][couch_client::CouchClient]
//! trait, so a custom implementation can be injected through
//! [ClientBuilder::with_couch_client].

pub mod couch_client;

mod client;
mod entities;
mod query;
mod type_alias;
mod view_client;

pub use client::*;
pub use entities::*;
pub use query::*;
pub use type_alias::*;
pub use view_client::ViewClient;

#[cfg(test)]
pub(crate) mod test_utils;
