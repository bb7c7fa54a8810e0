//! Typed query parameters for view and `_all_docs` requests.
//!
//! A [ViewQuery] is built by copy-and-override `with_*` methods, so a caller
//! never sees a query it holds mutated behind its back. [ViewQuery::default]
//! is the empty query: no parameter is sent at all.

use serde_json::Value;

/// Freshness requirement of a view query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stale {
    /// Accept a possibly outdated index, do not trigger a rebuild.
    Ok,
    /// Accept a possibly outdated index, trigger a rebuild after responding.
    UpdateAfter,
}

impl Stale {
    fn as_str(&self) -> &'static str {
        match self {
            Stale::Ok => "ok",
            Stale::UpdateAfter => "update_after",
        }
    }
}

/// Query parameters accepted by CouchDB views and `_all_docs`.
///
/// Key bounds (`key`, `startkey`, `endkey`) are arbitrary JSON values and are
/// JSON-encoded on the wire. `keys` is never sent as a query parameter: it
/// turns the request into a POST with a `{"keys": [...]}` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Only return rows matching this exact key.
    pub key: Option<Value>,
    /// Only return rows matching one of these keys.
    pub keys: Option<Vec<Value>>,
    /// Lower key bound (inclusive).
    pub startkey: Option<Value>,
    /// Upper key bound (inclusive by default).
    pub endkey: Option<Value>,
    /// Document id to start at, for rows sharing the start key.
    pub startkey_docid: Option<String>,
    /// Document id to stop at, for rows sharing the end key.
    pub endkey_docid: Option<String>,
    /// Maximum number of rows to return.
    pub limit: Option<u64>,
    /// Number of leading rows to skip.
    pub skip: Option<u64>,
    /// Return rows in descending key order.
    pub descending: Option<bool>,
    /// Attach the full emitting document to each row.
    pub include_docs: Option<bool>,
    /// Apply (or bypass, when `false`) the reduce function.
    pub reduce: Option<bool>,
    /// Group reduced rows by exact key.
    pub group: Option<bool>,
    /// Group reduced rows by key prefix of this length.
    pub group_level: Option<u32>,
    /// Index freshness requirement.
    pub stale: Option<Stale>,
}

impl ViewQuery {
    /// Set the exact key to match.
    pub fn with_key(mut self, key: Value) -> Self {
        self.key = Some(key);
        self
    }

    /// Set the keys to match, turning the request into a keys POST.
    pub fn with_keys(mut self, keys: Vec<Value>) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Set the lower key bound.
    pub fn with_startkey(mut self, startkey: Value) -> Self {
        self.startkey = Some(startkey);
        self
    }

    /// Set the upper key bound.
    pub fn with_endkey(mut self, endkey: Value) -> Self {
        self.endkey = Some(endkey);
        self
    }

    /// Set the document id to start at.
    pub fn with_startkey_docid<T: Into<String>>(mut self, docid: T) -> Self {
        self.startkey_docid = Some(docid.into());
        self
    }

    /// Set the document id to stop at.
    pub fn with_endkey_docid<T: Into<String>>(mut self, docid: T) -> Self {
        self.endkey_docid = Some(docid.into());
        self
    }

    /// Set the maximum number of rows to return.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the number of leading rows to skip.
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Set the row ordering.
    pub fn with_descending(mut self, descending: bool) -> Self {
        self.descending = Some(descending);
        self
    }

    /// Request (or not) the full document on each row.
    pub fn with_include_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = Some(include_docs);
        self
    }

    /// Apply or bypass the reduce function.
    pub fn with_reduce(mut self, reduce: bool) -> Self {
        self.reduce = Some(reduce);
        self
    }

    /// Group reduced rows by exact key.
    pub fn with_group(mut self, group: bool) -> Self {
        self.group = Some(group);
        self
    }

    /// Group reduced rows by key prefix of the given length.
    pub fn with_group_level(mut self, group_level: u32) -> Self {
        self.group_level = Some(group_level);
        self
    }

    /// Set the index freshness requirement.
    pub fn with_stale(mut self, stale: Stale) -> Self {
        self.stale = Some(stale);
        self
    }

    /// Serialize the set parameters to URL query pairs.
    ///
    /// `keys` is excluded: it travels in the request body.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(key) = &self.key {
            pairs.push(("key".to_string(), key.to_string()));
        }
        if let Some(startkey) = &self.startkey {
            pairs.push(("startkey".to_string(), startkey.to_string()));
        }
        if let Some(endkey) = &self.endkey {
            pairs.push(("endkey".to_string(), endkey.to_string()));
        }
        if let Some(docid) = &self.startkey_docid {
            pairs.push(("startkey_docid".to_string(), docid.clone()));
        }
        if let Some(docid) = &self.endkey_docid {
            pairs.push(("endkey_docid".to_string(), docid.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(descending) = self.descending {
            pairs.push(("descending".to_string(), descending.to_string()));
        }
        if let Some(include_docs) = self.include_docs {
            pairs.push(("include_docs".to_string(), include_docs.to_string()));
        }
        if let Some(reduce) = self.reduce {
            pairs.push(("reduce".to_string(), reduce.to_string()));
        }
        if let Some(group) = self.group {
            pairs.push(("group".to_string(), group.to_string()));
        }
        if let Some(group_level) = self.group_level {
            pairs.push(("group_level".to_string(), group_level.to_string()));
        }
        if let Some(stale) = self.stale {
            pairs.push(("stale".to_string(), stale.as_str().to_string()));
        }

        pairs
    }
}
