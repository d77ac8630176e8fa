//! Live catalog access: properties, agents and blog posts.
//!
//! Catalog items are loosely-typed `serde_json::Value` objects exactly as
//! the platform APIs return them. Fetch failures never reach the caller;
//! they are logged and replaced with empty collections so the chat
//! pipeline still completes.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::CatalogConfig;

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_properties(&self) -> Vec<Value>;
    async fn fetch_agents(&self) -> Vec<Value>;
    async fn fetch_blogs(&self) -> Vec<Value>;
}

/// HTTP client for the platform's REST endpoints.
pub struct HttpCatalogClient {
    http: reqwest::Client,
    properties_url: String,
    agents_url: String,
    blogs_url: String,
}

impl HttpCatalogClient {
    pub fn new(config: &CatalogConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            properties_url: config.properties_url.clone(),
            agents_url: config.agents_url.clone(),
            blogs_url: config.blogs_url.clone(),
        })
    }

    /// Timed GET; non-success status, transport errors and undecodable
    /// bodies all collapse to an empty collection.
    async fn fetch(&self, url: &str, what: &str) -> Vec<Value> {
        let response = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%url, error = %e, "{what} fetch failed");
                return Vec::new();
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "{what} fetch returned non-success status");
            return Vec::new();
        }

        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(%url, error = %e, "{what} response was not valid JSON");
                return Vec::new();
            }
        };

        unwrap_envelope(body)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn fetch_properties(&self) -> Vec<Value> {
        self.fetch(&self.properties_url, "properties").await
    }

    async fn fetch_agents(&self) -> Vec<Value> {
        self.fetch(&self.agents_url, "agents").await
    }

    async fn fetch_blogs(&self) -> Vec<Value> {
        self.fetch(&self.blogs_url, "blogs").await
    }
}

/// Accepts either a bare JSON array or an object with a `data` key
/// wrapping the array; anything else yields an empty collection.
pub fn unwrap_envelope(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// One fetched view of the three collections.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub properties: Vec<Value>,
    pub agents: Vec<Value>,
    pub blogs: Vec<Value>,
}

/// TTL-bounded cache over a `CatalogSource`.
///
/// The platform's chat flow refetches the whole catalog on every request;
/// the TTL keeps staleness bounded without an unbounded memo. Concurrent
/// requests may race to refill an expired slot; both fill it with fresh
/// data, so the race is harmless.
pub struct CachedCatalog {
    source: Arc<dyn CatalogSource>,
    ttl: Duration,
    slot: Mutex<Option<(Instant, CatalogSnapshot)>>,
}

impl CachedCatalog {
    pub fn new(source: Arc<dyn CatalogSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Current snapshot, refetched when the cached one has expired.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        if let Some((fetched_at, snapshot)) = self.slot.lock().as_ref() {
            if fetched_at.elapsed() < self.ttl {
                return snapshot.clone();
            }
        }

        let snapshot = CatalogSnapshot {
            properties: self.source.fetch_properties().await,
            agents: self.source.fetch_agents().await,
            blogs: self.source.fetch_blogs().await,
        };
        *self.slot.lock() = Some((Instant::now(), snapshot.clone()));
        snapshot
    }
}

// ── Searchable-text projections ────────────────────────────────────────────

/// First non-empty string found under any of `keys`.
pub fn field_str<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| item.get(*k).and_then(Value::as_str))
        .filter(|s| !s.trim().is_empty())
}

/// Price-like field rendered for display; numbers and strings both occur.
pub fn field_display(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match item.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Amenity names from an `[{name}, ...]` array.
pub fn amenity_names(item: &Value) -> Vec<String> {
    item.get("amenities")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|a| a.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Text the hybrid matcher scores a property against.
pub fn property_search_text(item: &Value) -> String {
    let mut parts: Vec<String> = Vec::new();
    for keys in [
        &["name", "title"][..],
        &["location", "address", "city"][..],
        &["description", "summary"][..],
    ] {
        if let Some(s) = field_str(item, keys) {
            parts.push(s.to_string());
        }
    }
    if let Some(price) = field_display(item, &["price", "rent_price", "sale_price"]) {
        parts.push(price);
    }
    parts.extend(amenity_names(item));
    parts.join(" ")
}
