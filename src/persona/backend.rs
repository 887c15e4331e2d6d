//! Cookie storage backends.
//!
//! `PersonaStore` never talks to storage directly; it goes through a
//! [`CookieBackend`] handed to it at construction. Three backends ship:
//!
//! - [`MemoryBackend`]: in-process map, used by tests and embedders
//! - [`FileBackend`]: JSON cookie jar on disk, used by the CLI
//! - [`HeaderBackend`]: read-only view over a request `Cookie:` header

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Path scope for every persona cookie.
pub const COOKIE_PATH: &str = "/";

/// Cross-site policy for every persona cookie.
pub const SAME_SITE: &str = "Lax";

// ─────────────────────────────────────────────────────────────────
// Stored Cookie
// ─────────────────────────────────────────────────────────────────

/// A cookie as held by a backend. `value` is already percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub same_site: String,
    pub written_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredCookie {
    /// Build a root-scoped, lax cookie from a raw (unencoded) value.
    pub fn new(
        name: impl Into<String>,
        raw_value: &str,
        written_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            value: encode_value(raw_value),
            path: COOKIE_PATH.to_string(),
            same_site: SAME_SITE.to_string(),
            written_at,
            expires_at,
        }
    }

    /// The percent-decoded value.
    pub fn decoded_value(&self) -> Option<String> {
        decode_value(&self.value)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn max_age_secs(&self) -> i64 {
        (self.expires_at - self.written_at).num_seconds().max(0)
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_set_cookie_header(&self) -> String {
        format!(
            "{}={}; Path={}; Max-Age={}; Expires={}; SameSite={}",
            self.name,
            self.value,
            self.path,
            self.max_age_secs(),
            self.expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.same_site
        )
    }
}

/// Percent-encode a cookie value.
pub fn encode_value(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Decode a percent-encoded cookie value. Empty values decode to `None`.
pub fn decode_value(encoded: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .filter(|v| !v.is_empty())
}

// ─────────────────────────────────────────────────────────────────
// Backend Trait
// ─────────────────────────────────────────────────────────────────

/// Storage for persona cookies.
///
/// Writes are last-write-wins; no backend detects concurrent writers.
pub trait CookieBackend: Send + Sync {
    /// Short backend name for logs and errors.
    fn name(&self) -> &'static str;

    /// Store or replace a cookie.
    fn write(&self, cookie: StoredCookie) -> Result<()>;

    /// Fetch a cookie by name, expired or not.
    fn read(&self, name: &str) -> Result<Option<StoredCookie>>;

    /// Delete a cookie. Deleting a missing cookie is not an error.
    fn remove(&self, name: &str) -> Result<()>;
}

impl<B: CookieBackend + ?Sized> CookieBackend for Arc<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn write(&self, cookie: StoredCookie) -> Result<()> {
        (**self).write(cookie)
    }

    fn read(&self, name: &str) -> Result<Option<StoredCookie>> {
        (**self).read(name)
    }

    fn remove(&self, name: &str) -> Result<()> {
        (**self).remove(name)
    }
}

// ─────────────────────────────────────────────────────────────────
// Memory Backend
// ─────────────────────────────────────────────────────────────────

/// In-process cookie map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    cookies: RwLock<HashMap<String, StoredCookie>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cookies held, expired ones included.
    pub fn len(&self) -> usize {
        self.cookies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.read().is_empty()
    }
}

impl CookieBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn write(&self, cookie: StoredCookie) -> Result<()> {
        self.cookies.write().insert(cookie.name.clone(), cookie);
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Option<StoredCookie>> {
        Ok(self.cookies.read().get(name).cloned())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.cookies.write().remove(name);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// File Backend
// ─────────────────────────────────────────────────────────────────

/// On-disk jar format.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieJar {
    #[serde(default)]
    cookies: BTreeMap<String, StoredCookie>,
}

/// JSON cookie jar on disk.
///
/// The whole jar is rewritten on every change, through a temp file and a
/// rename so readers never see a half-written jar.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CookieJar> {
        if !self.path.exists() {
            return Ok(CookieJar::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| Error::IoRead {
            path: self.path.clone(),
            source: e,
        })?;
        if content.trim().is_empty() {
            return Ok(CookieJar::default());
        }
        serde_json::from_str(&content).map_err(|e| Error::StorageCorrupted {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn save(&self, jar: &CookieJar) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
                debug!(path = %parent.display(), "Created cookie jar directory");
            }
        }

        let content = serde_json::to_string_pretty(jar)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| Error::IoWrite {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::IoWrite {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(())
    }

    fn storage_error(&self, err: Error) -> Error {
        match err {
            Error::StorageCorrupted { .. } => err,
            other => Error::storage("file", other.to_string()),
        }
    }
}

impl CookieBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn write(&self, cookie: StoredCookie) -> Result<()> {
        let mut jar = self.load().map_err(|e| self.storage_error(e))?;
        jar.cookies.insert(cookie.name.clone(), cookie);
        self.save(&jar).map_err(|e| self.storage_error(e))
    }

    fn read(&self, name: &str) -> Result<Option<StoredCookie>> {
        let jar = self.load().map_err(|e| self.storage_error(e))?;
        Ok(jar.cookies.get(name).cloned())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let mut jar = self.load().map_err(|e| self.storage_error(e))?;
        if jar.cookies.remove(name).is_some() {
            self.save(&jar).map_err(|e| self.storage_error(e))?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Header Backend
// ─────────────────────────────────────────────────────────────────

/// Cookies sent by a client in a `Cookie:` request header.
///
/// The client already dropped expired cookies, so every present cookie is
/// treated as live. Writes are rejected; respond with
/// `PersonaStore::set_cookie_headers` instead.
#[derive(Debug, Clone)]
pub struct HeaderBackend {
    cookies: HashMap<String, String>,
    received_at: DateTime<Utc>,
}

impl HeaderBackend {
    /// Parse a `Cookie:` header value (`a=1; b=2`).
    pub fn from_header(header: &str, received_at: DateTime<Utc>) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().trim_matches('"').to_string()))
            })
            .collect();
        Self {
            cookies,
            received_at,
        }
    }
}

impl CookieBackend for HeaderBackend {
    fn name(&self) -> &'static str {
        "header"
    }

    fn write(&self, cookie: StoredCookie) -> Result<()> {
        Err(Error::storage(
            "header",
            format!("request cookies are read-only (tried to write '{}')", cookie.name),
        ))
    }

    fn read(&self, name: &str) -> Result<Option<StoredCookie>> {
        Ok(self.cookies.get(name).map(|value| StoredCookie {
            name: name.to_string(),
            value: value.clone(),
            path: COOKIE_PATH.to_string(),
            same_site: SAME_SITE.to_string(),
            written_at: self.received_at,
            expires_at: DateTime::<Utc>::MAX_UTC,
        }))
    }

    fn remove(&self, _name: &str) -> Result<()> {
        Err(Error::storage("header", "request cookies are read-only"))
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
