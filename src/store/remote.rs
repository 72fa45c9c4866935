//! Hosted CRUD API backend.
//!
//! ARCHITECTURE
//! ============
//! Every collection maps to one hosted table (`Record::REMOTE_TABLE`):
//!
//! ```text
//! GET    {base}/tables/{table}/records
//! GET    {base}/tables/{table}/records/{id}
//! POST   {base}/tables/{table}/records
//! PATCH  {base}/tables/{table}/records/{id}
//! DELETE {base}/tables/{table}/records/{id}
//! ```
//!
//! Responses use the envelope `{success, message, data | results[]}`. A
//! `404` means the record is absent; `success: false` or any other non-2xx
//! status is an `External` error. A listing skips rows that do not decode
//! (logged) rather than failing the whole collection.
//!
//! SCHEMA
//! ======
//! Hosted field names carry a `_c` suffix (`content_c`), the id is `Id`, and
//! system fields are capitalized (`Name`, `Tags`). List fields are stored as
//! embedded JSON text. [`normalize_keys`] and [`to_remote_fields`] translate
//! between that schema and the canonical one; the model layer decodes the
//! embedded lists.
//!
//! CONCURRENCY
//! ===========
//! The hosted API has no conditional update, so read-modify-write is a GET
//! followed by a PATCH. Mutations are serialized per collection within this
//! process; concurrent writers in other processes can still interleave.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{Builder, Mutation, Repository};
use crate::config::RemoteConfig;
use crate::error::ServiceError;
use crate::record::{Record, ensure_unique};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REMOTE_SUFFIX: &str = "_c";

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client shared by every remote collection.
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: String,
}

impl RemoteClient {
    /// # Errors
    ///
    /// Returns `External` if the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ServiceError::External(format!("http client build: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn records_url(&self, table: &str, id: Option<i64>) -> String {
        match id {
            Some(id) => format!("{}/tables/{table}/records/{id}", self.base_url),
            None => format!("{}/tables/{table}/records", self.base_url),
        }
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("X-Project-Id", &self.project_id)
            .bearer_auth(&self.api_key)
    }

    /// Send a request and decode the envelope. `Ok(None)` on `404`.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Option<Envelope>, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::External(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::External(e.to_string()))?;
        if !status.is_success() {
            return Err(ServiceError::External(format!("status {}: {text}", status.as_u16())));
        }

        parse_envelope(&text).map(Some)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    results: Option<Vec<ResultEntry>>,
}

#[derive(Debug, Deserialize)]
struct ResultEntry {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

impl Envelope {
    /// The single record a create or update returned: `data`, or the first
    /// successful entry of `results`.
    fn into_single(self) -> Result<Option<Value>, ServiceError> {
        if let Some(data) = self.data {
            return Ok(Some(data));
        }
        let Some(results) = self.results else {
            return Ok(None);
        };
        if let Some(failed) = results.iter().find(|entry| !entry.success) {
            let message = failed.message.clone().unwrap_or_else(|| "record rejected".into());
            if !results.iter().any(|entry| entry.success) {
                return Err(ServiceError::External(message));
            }
            tracing::warn!(%message, "hosted backend rejected part of a batch");
        }
        Ok(results.into_iter().find(|entry| entry.success).and_then(|entry| entry.data))
    }
}

fn parse_envelope(text: &str) -> Result<Envelope, ServiceError> {
    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| ServiceError::External(format!("malformed response: {e}")))?;
    if !envelope.success {
        let message = envelope.message.unwrap_or_else(|| "request failed".into());
        return Err(ServiceError::External(message));
    }
    Ok(envelope)
}

// =============================================================================
// SCHEMA TRANSLATION
// =============================================================================

/// Rename hosted keys to canonical ones.
///
/// `Id` becomes `id`, a trailing `_c` is stripped, capitalized system fields
/// are lowercased, and `renames` maps hosted names back to canonical ones.
/// When a suffixed field and a system field normalize to the same key, the
/// suffixed field wins.
#[must_use]
pub fn normalize_keys(record: Map<String, Value>, renames: &[(&str, &str)]) -> Map<String, Value> {
    let canonical = |name: &str| {
        renames
            .iter()
            .find(|(_, hosted)| *hosted == name)
            .map_or_else(|| name.to_owned(), |(canonical, _)| (*canonical).to_owned())
    };

    let mut system = Map::new();
    let mut custom = Map::new();
    for (key, value) in record {
        if key == "Id" {
            system.insert("id".into(), value);
        } else if let Some(stripped) = key.strip_suffix(REMOTE_SUFFIX) {
            custom.insert(canonical(stripped), value);
        } else if key.starts_with(|c: char| c.is_ascii_uppercase()) {
            system.insert(canonical(&key.to_ascii_lowercase()), value);
        } else {
            system.insert(canonical(&key), value);
        }
    }

    system.extend(custom);
    system
}

/// Encode a canonical record as hosted fields. `id` is dropped (it travels
/// in the URL), keys gain the `_c` suffix, and lists and objects are
/// embedded as JSON text.
#[must_use]
pub fn to_remote_fields(record: Value, renames: &[(&str, &str)]) -> Map<String, Value> {
    let Value::Object(fields) = record else {
        return Map::new();
    };

    fields
        .into_iter()
        .filter(|(key, _)| key != "id")
        .map(|(key, value)| {
            let hosted = renames
                .iter()
                .find(|(canonical, _)| *canonical == key)
                .map_or(key.as_str(), |(_, hosted)| *hosted);
            let value = match value {
                Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
                other => other,
            };
            (format!("{hosted}{REMOTE_SUFFIX}"), value)
        })
        .collect()
}

/// Decode one hosted record into `T`.
///
/// # Errors
///
/// Returns `External` when the payload is not an object or does not match
/// the record schema.
pub fn decode_record<T: Record>(value: Value) -> Result<T, ServiceError> {
    let Value::Object(fields) = value else {
        return Err(ServiceError::External(format!("{} record is not an object", T::REMOTE_TABLE)));
    };
    let normalized = normalize_keys(fields, T::REMOTE_RENAMES);
    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| ServiceError::External(format!("undecodable {} record: {e}", T::REMOTE_TABLE)))
}

// =============================================================================
// REPOSITORY
// =============================================================================

pub struct RemoteRepository<T> {
    client: Arc<RemoteClient>,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RemoteRepository<T> {
    #[must_use]
    pub fn new(client: Arc<RemoteClient>) -> Self {
        Self { client, write_lock: Mutex::new(()), _record: PhantomData }
    }

    async fn fetch(&self, id: i64) -> Result<Option<T>, ServiceError> {
        let url = self.client.records_url(T::REMOTE_TABLE, Some(id));
        let Some(envelope) = self.client.send(self.client.request(reqwest::Method::GET, url)).await? else {
            return Ok(None);
        };
        envelope.into_single()?.map(decode_record).transpose()
    }

    fn encode(record: &T) -> Result<Map<String, Value>, ServiceError> {
        let value = serde_json::to_value(record)
            .map_err(|e| ServiceError::validation(format!("cannot encode {} record: {e}", T::COLLECTION)))?;
        Ok(to_remote_fields(value, T::REMOTE_RENAMES))
    }
}

#[async_trait::async_trait]
impl<T: Record> Repository<T> for RemoteRepository<T> {
    async fn all(&self) -> Result<Vec<T>, ServiceError> {
        let url = self.client.records_url(T::REMOTE_TABLE, None);
        let Some(envelope) = self.client.send(self.client.request(reqwest::Method::GET, url)).await? else {
            return Err(ServiceError::External(format!("table {} not found", T::REMOTE_TABLE)));
        };
        match envelope.data {
            Some(Value::Array(rows)) => Ok(rows
                .into_iter()
                .filter_map(|row| {
                    decode_record(row)
                        .inspect_err(|e| {
                            tracing::warn!(table = T::REMOTE_TABLE, error = %e, "skipping undecodable hosted record");
                        })
                        .ok()
                })
                .collect()),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(_) => Err(ServiceError::External(format!("{} listing is not an array", T::REMOTE_TABLE))),
        }
    }

    async fn get(&self, id: i64) -> Result<Option<T>, ServiceError> {
        self.fetch(id).await
    }

    /// The hosted backend allocates ids itself; the record is built with a
    /// placeholder id and the stored copy is decoded from the response.
    async fn insert(&self, build: Builder<T>) -> Result<T, ServiceError> {
        let draft = build(0)?;
        let fields = Self::encode(&draft)?;

        let _guard = self.write_lock.lock().await;
        if draft.unique_key().is_some() {
            ensure_unique(&draft, &self.all().await?)?;
        }
        let url = self.client.records_url(T::REMOTE_TABLE, None);
        let request = self.client.request(reqwest::Method::POST, url).json(&fields);
        let Some(envelope) = self.client.send(request).await? else {
            return Err(ServiceError::External(format!("table {} not found", T::REMOTE_TABLE)));
        };
        let stored = envelope
            .into_single()?
            .ok_or_else(|| ServiceError::External(format!("{} create returned no record", T::REMOTE_TABLE)))?;
        decode_record(stored)
    }

    async fn mutate(&self, id: i64, apply: Mutation<T>) -> Result<Option<T>, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let Some(mut record) = self.fetch(id).await? else {
            return Ok(None);
        };
        apply(&mut record)?;

        let mut fields = Self::encode(&record)?;
        fields.insert("Id".into(), Value::from(id));
        let url = self.client.records_url(T::REMOTE_TABLE, Some(id));
        let request = self.client.request(reqwest::Method::PATCH, url).json(&fields);
        let Some(envelope) = self.client.send(request).await? else {
            return Ok(None);
        };
        match envelope.into_single()? {
            Some(stored) => decode_record(stored).map(Some),
            None => Ok(Some(record)),
        }
    }

    async fn remove(&self, id: i64) -> Result<Option<T>, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let Some(record) = self.fetch(id).await? else {
            return Ok(None);
        };
        let url = self.client.records_url(T::REMOTE_TABLE, Some(id));
        match self.client.send(self.client.request(reqwest::Method::DELETE, url)).await? {
            Some(_) => Ok(Some(record)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "remote_test.rs"]
mod tests;
