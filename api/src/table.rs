//! Direct table access over PostgREST (`<supabase_url>/rest/v1/<table>`).
//!
//! Separate from the REST façade: no envelope, rows come back as bare JSON
//! arrays, and errors arrive as `{message, code, details, hint}`.

use crate::client::race_cancel;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use log::{debug, error};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const REST_PREFIX: &str = "/rest/v1";
const ALL_COLUMNS: &str = "*";

/// A table with a compile-time row schema.
pub trait Table {
    const NAME: &'static str;
    type Row: DeserializeOwned + Send;
    type Insert: Serialize + Sync;
    type Update: Serialize + Sync;
}

// ---------------------------------------------------------------------------
// events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTier {
    T1,
    T2,
    T3,
    T4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    League,
    Tournament,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::League => "League",
            EventType::Tournament => "Tournament",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub tier: Option<EventTier>,
    #[serde(rename = "type", default)]
    pub event_type: Option<EventType>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Insert payload. Absent fields are omitted so the table defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventInsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<EventTier>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
}

/// Partial update. Only the fields set here are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<EventTier>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

pub struct Events;

impl Table for Events {
    const NAME: &'static str = "events";
    type Row = EventRow;
    type Insert = EventInsert;
    type Update = EventUpdate;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
struct PostgrestError {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl PostgrestError {
    fn describe(self, status: StatusCode) -> String {
        let mut text = self
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error: {}", status.as_u16()));
        if let Some(code) = self.code {
            text.push_str(&format!(" ({code})"));
        }
        for extra in [self.details, self.hint].into_iter().flatten() {
            text.push_str(": ");
            text.push_str(&extra);
        }
        text
    }
}

#[derive(Debug, Clone)]
pub struct TableClient {
    client: Client,
    base_url: String,
    anon_key: String,
    timeout: Duration,
    cancel: Option<CancellationToken>,
}

impl TableClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_owned(),
            anon_key: config.supabase_anon_key.clone(),
            timeout: config.request_timeout,
            cancel: None,
        }
    }

    pub fn with_endpoint(supabase_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let config = Config {
            supabase_url: supabase_url.into(),
            supabase_anon_key: anon_key.into(),
            ..Config::development()
        };
        Self::new(&config)
    }

    /// A clone whose requests are abandoned once `token` is cancelled.
    pub fn scoped(&self, token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            ..self.clone()
        }
    }

    /// Every row of `T`. `columns` defaults to `*`.
    pub async fn fetch_all<T: Table>(&self, columns: Option<&str>) -> ApiResult<Vec<T::Row>> {
        let url = self.table_url::<T>(&[("select", columns.unwrap_or(ALL_COLUMNS))])?;
        self.rows(self.request(reqwest::Method::GET, url)).await
    }

    /// The single row whose `id` matches, or `None` when the lookup fails or
    /// does not match exactly one row.
    pub async fn fetch_by_id<T: Table>(&self, id: &str, columns: Option<&str>) -> Option<T::Row> {
        let filter = format!("eq.{id}");
        let result = match self.table_url::<T>(&[
            ("select", columns.unwrap_or(ALL_COLUMNS)),
            ("id", filter.as_str()),
        ]) {
            Ok(url) => self.rows(self.request(reqwest::Method::GET, url)).await,
            Err(e) => Err(e),
        };
        single::<T>(result, &format!("fetching {} {id}", T::NAME))
    }

    /// Insert `row` and return it as stored.
    pub async fn insert<T: Table>(&self, row: &T::Insert) -> Option<T::Row> {
        let result = match self.table_url::<T>(&[]) {
            Ok(url) => {
                let builder = self
                    .request(reqwest::Method::POST, url)
                    .header("Prefer", "return=representation")
                    .json(row);
                self.rows(builder).await
            }
            Err(e) => Err(e),
        };
        single::<T>(result, &format!("creating {} row", T::NAME))
    }

    /// Apply `changes` to the row `id` and return it as stored.
    pub async fn update<T: Table>(&self, id: &str, changes: &T::Update) -> Option<T::Row> {
        let filter = format!("eq.{id}");
        let result = match self.table_url::<T>(&[("id", filter.as_str())]) {
            Ok(url) => {
                let builder = self
                    .request(reqwest::Method::PATCH, url)
                    .header("Prefer", "return=representation")
                    .json(changes);
                self.rows(builder).await
            }
            Err(e) => Err(e),
        };
        single::<T>(result, &format!("updating {} {id}", T::NAME))
    }

    /// `true` when the delete was accepted.
    pub async fn delete<T: Table>(&self, id: &str) -> bool {
        let filter = format!("eq.{id}");
        let result = match self.table_url::<T>(&[("id", filter.as_str())]) {
            Ok(url) => self.send(self.request(reqwest::Method::DELETE, url)).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => true,
            Err(e) => {
                error!("Error deleting {} {id}: {e}", T::NAME);
                false
            }
        }
    }

    /// Most recent events by `start_date`, newest first.
    pub async fn fetch_recent_events(&self, limit: u32) -> ApiResult<Vec<EventRow>> {
        let limit = limit.to_string();
        let url = self.table_url::<Events>(&[
            ("select", ALL_COLUMNS),
            ("order", "start_date.desc"),
            ("limit", limit.as_str()),
        ])?;
        self.rows(self.request(reqwest::Method::GET, url)).await
    }

    fn table_url<T: Table>(&self, params: &[(&str, &str)]) -> ApiResult<Url> {
        let raw = format!("{}{REST_PREFIX}/{}", self.base_url, T::NAME);
        let parsed = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        parsed.map_err(|e| ApiError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .timeout(self.timeout)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(&self.anon_key)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }

    async fn rows<R: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<Vec<R>> {
        let (url, bytes) = self.send(builder).await?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode { url, source })
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<(String, Vec<u8>)> {
        let (client, request) = builder.build_split();
        let request = request.map_err(|source| ApiError::Transport {
            url: source
                .url()
                .map(|u| u.to_string())
                .unwrap_or_default(),
            source,
        })?;
        let url = request.url().to_string();

        let exchange = async {
            let response = client
                .execute(request)
                .await
                .map_err(|source| ApiError::Transport {
                    url: url.clone(),
                    source,
                })?;
            let status = response.status();
            debug!("{url} -> {status}");
            let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
            Ok::<_, ApiError>((status, bytes))
        };
        let (status, bytes) = race_cancel(self.cancel.as_ref(), &url, exchange).await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<PostgrestError>(&bytes)
                .unwrap_or_default()
                .describe(status);
            return Err(ApiError::Request {
                url,
                status,
                message,
            });
        }
        Ok((url, bytes.to_vec()))
    }
}

/// Collapse a row list to exactly one row, logging anything else.
fn single<T: Table>(result: ApiResult<Vec<T::Row>>, action: &str) -> Option<T::Row> {
    match result {
        Ok(rows) if rows.len() == 1 => rows.into_iter().next(),
        Ok(rows) => {
            error!("Error {action}: expected one row, got {}", rows.len());
            None
        }
        Err(e) => {
            error!("Error {action}: {e}");
            None
        }
    }
}
