//! REST client for the hosted database.
//!
//! Tables are exposed at `{url}/rest/v1/{table}` with PostgREST-style
//! filters (`col=eq.value`, `col=gte.value`, `order=col.desc`, `limit=n`).

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::feed::{ChangeFeed, ChangeKind, Table};

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://xyz.example.co`.
    pub url: String,
    /// Public (anonymous) API key, sent as the `apikey` header.
    pub anon_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Table plus query-string parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestQuery {
    table: Table,
    params: Vec<(String, String)>,
}

impl RestQuery {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            params: Vec::new(),
        }
    }

    fn param(mut self, key: impl Into<String>, value: String) -> Self {
        self.params.push((key.into(), value));
        self
    }

    #[must_use]
    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns.to_string())
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl std::fmt::Display) -> Self {
        self.param(column, format!("eq.{value}"))
    }

    #[must_use]
    pub fn gte(self, column: &str, value: impl std::fmt::Display) -> Self {
        self.param(column, format!("gte.{value}"))
    }

    /// `column=in.("a","b")`. Values are quoted so commas inside them survive.
    #[must_use]
    pub fn in_list(self, column: &str, values: &[String]) -> Self {
        let quoted: Vec<String> = values
            .iter()
            .map(|v| format!("\"{}\"", v.replace('"', "\\\"")))
            .collect();
        self.param(column, format!("in.({})", quoted.join(",")))
    }

    #[must_use]
    pub fn order(self, column: &str, order: Order) -> Self {
        let dir = match order {
            Order::Asc => "asc",
            Order::Desc => "desc",
        };
        self.param("order", format!("{column}.{dir}"))
    }

    #[must_use]
    pub fn limit(self, n: u32) -> Self {
        self.param("limit", n.to_string())
    }

    #[must_use]
    pub fn on_conflict(self, columns: &str) -> Self {
        self.param("on_conflict", columns.to_string())
    }

    pub const fn table(&self) -> Table {
        self.table
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// The hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    feed: ChangeFeed,
}

impl RemoteBackend {
    pub fn new(config: &RemoteConfig) -> StoreResult<Self> {
        if config.url.is_empty() {
            return Err(StoreError::Config("backend url is empty".into()));
        }
        if config.anon_key.is_empty() {
            return Err(StoreError::Config("anon key is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.anon_key)
            .map_err(|_| StoreError::Config("Invalid anon key format".into()))?;
        headers.insert("apikey", key);

        // reqwest is built with rustls-no-provider; an Err only means a provider is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: None,
            feed: ChangeFeed::default(),
        })
    }

    /// Act as a signed-in user instead of the anonymous role.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_feed(mut self, feed: ChangeFeed) -> Self {
        self.feed = feed;
        self
    }

    pub const fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the REST URL for a query.
    pub fn rest_url(&self, query: &RestQuery) -> StoreResult<Url> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, query.table()))
            .map_err(|e| StoreError::Config(format!("invalid backend url: {e}")))?;
        if !query.params().is_empty() {
            url.query_pairs_mut().extend_pairs(query.params());
        }
        Ok(url)
    }

    pub(crate) fn raw(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
    }

    /// Turn a non-success status into [`StoreError::Api`] (or `Auth` for 401).
    pub(crate) async fn check_status(resp: Response) -> StoreResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = api_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
        warn!(status = status.as_u16(), %message, "Backend request failed");
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StoreError::Auth(message));
        }
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // =========================================================================
    // Row operations
    // =========================================================================

    pub async fn select<T: DeserializeOwned>(&self, query: &RestQuery) -> StoreResult<Vec<T>> {
        let url = self.rest_url(query)?;
        debug!(table = %query.table(), "select");
        let resp = self.raw(Method::GET, url).send().await?;
        let resp = Self::check_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn select_one<T: DeserializeOwned>(&self, query: RestQuery) -> StoreResult<Option<T>> {
        let mut rows = self.select(&query.limit(1)).await?;
        Ok(rows.pop())
    }

    pub async fn insert<T: Serialize + Sync>(&self, table: Table, row: &T) -> StoreResult<()> {
        let url = self.rest_url(&RestQuery::new(table))?;
        let resp = self
            .raw(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        Self::check_status(resp).await?;
        self.feed.publish_row(table, ChangeKind::Insert, row);
        Ok(())
    }

    /// Insert or merge on the given conflict columns.
    pub async fn upsert<T: Serialize + Sync>(
        &self,
        table: Table,
        row: &T,
        on_conflict: &str,
    ) -> StoreResult<()> {
        let url = self.rest_url(&RestQuery::new(table).on_conflict(on_conflict))?;
        let resp = self
            .raw(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await?;
        Self::check_status(resp).await?;
        self.feed.publish_row(table, ChangeKind::Update, row);
        Ok(())
    }

    /// Patch matching rows and return them as updated.
    pub async fn update<T: DeserializeOwned + Serialize>(
        &self,
        query: &RestQuery,
        patch: &serde_json::Value,
    ) -> StoreResult<Vec<T>> {
        let url = self.rest_url(query)?;
        let resp = self
            .raw(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        let rows: Vec<T> = Self::check_status(resp).await?.json().await?;
        for row in &rows {
            self.feed.publish_row(query.table(), ChangeKind::Update, row);
        }
        Ok(rows)
    }

    /// Delete matching rows and return them.
    pub async fn delete<T: DeserializeOwned + Serialize>(
        &self,
        query: &RestQuery,
    ) -> StoreResult<Vec<T>> {
        let url = self.rest_url(query)?;
        let resp = self
            .raw(Method::DELETE, url)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<T> = Self::check_status(resp).await?.json().await?;
        for row in &rows {
            self.feed.publish_row(query.table(), ChangeKind::Delete, row);
        }
        Ok(rows)
    }
}

/// Pull a human-readable message out of an error body.
pub(crate) fn api_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error_description", "msg", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(String::from)
}
