//! Per-generation entry storage.
//!
//! A [`StoreHandle`] addresses one generation. Its `put` and `lookup`
//! operations never fail: storage errors are logged and downgraded to a
//! no-op write or a miss, so a cache fault can never fail the request it
//! shadows. Critical-path callers use the `try_` variants instead.

use super::connection::CacheDb;
use super::hash::body_digest;
use crate::{Error, Response, ResponseType};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use url::Url;

/// Metadata about one stored entry, without its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntryInfo {
    pub generation: String,
    pub key: String,
    pub status: u16,
    pub response_type: ResponseType,
    pub body_len: usize,
    pub body_sha256: String,
    pub stored_at: String,
}

/// Handle to a single cache generation.
#[derive(Clone, Debug)]
pub struct StoreHandle {
    db: CacheDb,
    name: String,
}

struct Row {
    url: String,
    status: i64,
    response_type: String,
    headers_json: String,
    body: Vec<u8>,
}

impl Row {
    fn into_response(self) -> Result<Response, Error> {
        let url = Url::parse(&self.url).map_err(|e| Error::InvalidPath(format!("stored url {}: {e}", self.url)))?;
        let status = u16::try_from(self.status)
            .map_err(|_| Error::InvalidInput(format!("stored status out of range: {}", self.status)))?;
        let response_type = ResponseType::parse(&self.response_type)
            .ok_or_else(|| Error::InvalidInput(format!("unknown response type: {}", self.response_type)))?;
        let headers: Vec<(String, String)> = serde_json::from_str(&self.headers_json)
            .map_err(|e| Error::InvalidInput(format!("stored headers: {e}")))?;

        Ok(Response { url, status, headers, body: Bytes::from(self.body), response_type })
    }
}

impl StoreHandle {
    pub(crate) fn new(db: CacheDb, name: &str) -> Self {
        Self { db, name: name.to_string() }
    }

    /// Generation name this handle writes to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a copy of `response` under `key`, overwriting any prior entry.
    pub async fn try_put(&self, key: &Url, response: &Response) -> Result<(), Error> {
        let generation = self.name.clone();
        let key = key.as_str().to_string();
        let url = response.url.as_str().to_string();
        let status = i64::from(response.status);
        let response_type = response.response_type.as_str();
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::StoreWrite(format!("headers: {e}")))?;
        let body = response.body.to_vec();
        let digest = body_digest(&body);
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let written = conn
                    .execute(
                        "INSERT INTO entries (
                            generation, cache_key, url, status_code, response_type,
                            headers_json, body, body_sha256, stored_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                        ON CONFLICT(generation, cache_key) DO UPDATE SET
                            url = excluded.url,
                            status_code = excluded.status_code,
                            response_type = excluded.response_type,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            body_sha256 = excluded.body_sha256,
                            stored_at = excluded.stored_at",
                        params![generation, key, url, status, response_type, headers_json, body, digest, stored_at],
                    )
                    .map_err(|e| Error::StoreWrite(e.to_string()))?;
                if written == 0 {
                    return Err(Error::StoreWrite(format!("no row written for {key}")));
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store a copy of `response` under `key`. Failures are logged, not returned.
    pub async fn put(&self, key: &Url, response: &Response) {
        match self.try_put(key, response).await {
            Ok(()) => tracing::debug!(generation = %self.name, key = %key, status = response.status, "cache put"),
            Err(e) => tracing::warn!(generation = %self.name, key = %key, error = %e, "cache write dropped"),
        }
    }

    /// Exact-key lookup.
    pub async fn try_lookup(&self, key: &Url) -> Result<Option<Response>, Error> {
        let generation = self.name.clone();
        let key = key.as_str().to_string();
        let row = self
            .db
            .conn
            .call(move |conn| -> Result<Option<Row>, Error> {
                let result = conn.query_row(
                    "SELECT url, status_code, response_type, headers_json, body
                     FROM entries WHERE generation = ?1 AND cache_key = ?2",
                    params![generation, key],
                    |row| {
                        Ok(Row {
                            url: row.get(0)?,
                            status: row.get(1)?,
                            response_type: row.get(2)?,
                            headers_json: row.get(3)?,
                            body: row.get(4)?,
                        })
                    },
                );

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(Row::into_response).transpose()
    }

    /// Exact-key lookup. Storage errors are logged and reported as a miss.
    pub async fn lookup(&self, key: &Url) -> Option<Response> {
        match self.try_lookup(key).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(generation = %self.name, key = %key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Metadata for every entry in this generation, ordered by key.
    pub async fn entries(&self) -> Result<Vec<EntryInfo>, Error> {
        let generation = self.name.clone();
        let rows = self
            .db
            .conn
            .call(move |conn| -> Result<Vec<(String, i64, String, i64, String, String)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT cache_key, status_code, response_type, LENGTH(body), body_sha256, stored_at
                     FROM entries WHERE generation = ?1 ORDER BY cache_key",
                )?;
                let rows = stmt
                    .query_map(params![generation], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        rows.into_iter()
            .map(|(key, status, response_type, body_len, body_sha256, stored_at)| {
                Ok(EntryInfo {
                    generation: self.name.clone(),
                    key,
                    status: u16::try_from(status).unwrap_or_default(),
                    response_type: ResponseType::parse(&response_type)
                        .ok_or_else(|| Error::InvalidInput(format!("unknown response type: {response_type}")))?,
                    body_len: usize::try_from(body_len).unwrap_or_default(),
                    body_sha256,
                    stored_at,
                })
            })
            .collect()
    }

    /// Stored keys, ordered.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.entries().await?.into_iter().map(|e| e.key).collect())
    }
}

impl CacheDb {
    /// Look `key` up across every generation, preferring `preferred`.
    ///
    /// Inspection helper for hosts that do not know which generation holds a
    /// key. Errors are logged and reported as a miss.
    pub async fn lookup_any(&self, key: &Url, preferred: &str) -> Option<Response> {
        let preferred = preferred.to_string();
        let key_str = key.as_str().to_string();
        let result = self
            .conn
            .call(move |conn| -> Result<Option<Row>, Error> {
                let result = conn.query_row(
                    "SELECT url, status_code, response_type, headers_json, body
                     FROM entries WHERE cache_key = ?1
                     ORDER BY (generation = ?2) DESC, stored_at DESC
                     LIMIT 1",
                    params![key_str, preferred],
                    |row| {
                        Ok(Row {
                            url: row.get(0)?,
                            status: row.get(1)?,
                            response_type: row.get(2)?,
                            headers_json: row.get(3)?,
                            body: row.get(4)?,
                        })
                    },
                );

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
            .and_then(|row| row.map(Row::into_response).transpose());

        match result {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }
}
