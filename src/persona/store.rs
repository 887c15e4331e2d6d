//! Persisted persona records.
//!
//! Every persist writes two cookies:
//! - canonical `arco_persona`: six-persona taxonomy, 90 days
//! - legacy `arco-brew-style`: five-slug taxonomy for older content, 30 days
//!
//! The two are never reconciled. Once the legacy cookie lapses the canonical
//! one keeps serving until its own window closes.
//!
//! Storage failures never escape this module. A failed persist is a no-op and
//! a failed read is an unknown visitor.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::error::Result;

use super::backend::{CookieBackend, StoredCookie};
use super::types::{LegacyBrewStyle, PersonaState, PersonaTag};

/// Canonical persona cookie name.
pub const CANONICAL_COOKIE: &str = "arco_persona";

/// Legacy brew-style cookie name.
pub const LEGACY_COOKIE: &str = "arco-brew-style";

/// Retention of the canonical record.
pub const CANONICAL_TTL_DAYS: i64 = 90;

/// Retention of the legacy record.
pub const LEGACY_TTL_DAYS: i64 = 30;

/// A live canonical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaRecord {
    pub tag: PersonaTag,
    pub written_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Read/write access to the visitor's persisted persona.
pub struct PersonaStore<B> {
    backend: B,
}

impl<B: CookieBackend> PersonaStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The two cookies a persist of `tag` at `now` writes, canonical first.
    pub fn cookies_for(tag: PersonaTag, now: DateTime<Utc>) -> [StoredCookie; 2] {
        [
            StoredCookie::new(
                CANONICAL_COOKIE,
                tag.slug(),
                now,
                now + Duration::days(CANONICAL_TTL_DAYS),
            ),
            StoredCookie::new(
                LEGACY_COOKIE,
                tag.legacy_style().slug(),
                now,
                now + Duration::days(LEGACY_TTL_DAYS),
            ),
        ]
    }

    /// `Set-Cookie` header values for persisting `tag` over HTTP.
    pub fn set_cookie_headers(tag: PersonaTag, now: DateTime<Utc>) -> [String; 2] {
        Self::cookies_for(tag, now).map(|c| c.to_set_cookie_header())
    }

    // ─────────────────────────────────────────────────────────────
    // Write
    // ─────────────────────────────────────────────────────────────

    pub fn persist(&self, tag: PersonaTag) {
        self.persist_at(tag, Utc::now());
    }

    /// Write both records as of `now`. Each write is attempted independently.
    pub fn persist_at(&self, tag: PersonaTag, now: DateTime<Utc>) {
        for cookie in Self::cookies_for(tag, now) {
            let name = cookie.name.clone();
            match self.backend.write(cookie) {
                Ok(()) => debug!(cookie = %name, persona = %tag, "Persona cookie written"),
                Err(e) => warn!(
                    backend = self.backend.name(),
                    cookie = %name,
                    error = %e.format_for_log(),
                    "Persona cookie not written"
                ),
            }
        }
        info!(persona = %tag, legacy = %tag.legacy_style(), "Persona persisted");
    }

    /// Delete both records.
    pub fn clear(&self) -> Result<()> {
        self.backend.remove(CANONICAL_COOKIE)?;
        self.backend.remove(LEGACY_COOKIE)?;
        info!(backend = self.backend.name(), "Persona cleared");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Read
    // ─────────────────────────────────────────────────────────────

    pub fn read(&self) -> Option<PersonaTag> {
        self.read_at(Utc::now())
    }

    /// Canonical persona if present, unexpired and valid at `now`.
    pub fn read_at(&self, now: DateTime<Utc>) -> Option<PersonaTag> {
        self.record_at(now).map(|r| r.tag)
    }

    pub fn read_legacy(&self) -> Option<LegacyBrewStyle> {
        self.read_legacy_at(Utc::now())
    }

    /// Legacy brew style if present, unexpired and valid at `now`.
    pub fn read_legacy_at(&self, now: DateTime<Utc>) -> Option<LegacyBrewStyle> {
        let cookie = self.live_cookie(LEGACY_COOKIE, now)?;
        let value = cookie.decoded_value()?;
        match value.parse() {
            Ok(style) => Some(style),
            Err(e) => {
                warn!(
                    cookie = LEGACY_COOKIE,
                    value = %value,
                    error = %e,
                    "Ignoring invalid brew style"
                );
                None
            }
        }
    }

    /// The live canonical record at `now`.
    pub fn record_at(&self, now: DateTime<Utc>) -> Option<PersonaRecord> {
        let cookie = self.live_cookie(CANONICAL_COOKIE, now)?;
        let value = cookie.decoded_value()?;
        match value.parse::<PersonaTag>() {
            Ok(tag) => Some(PersonaRecord {
                tag,
                written_at: cookie.written_at,
                expires_at: cookie.expires_at,
            }),
            Err(e) => {
                warn!(
                    cookie = CANONICAL_COOKIE,
                    value = %value,
                    error = %e,
                    "Ignoring invalid persona"
                );
                None
            }
        }
    }

    /// Lifecycle state of the stored persona at `now`.
    pub fn state_at(&self, now: DateTime<Utc>) -> PersonaState {
        match self.fetch(CANONICAL_COOKIE) {
            Some(cookie) if cookie.is_expired_at(now) => PersonaState::Expired,
            Some(_) => self
                .record_at(now)
                .map_or(PersonaState::Unknown, |r| PersonaState::Persisted(r.tag)),
            None => PersonaState::Unknown,
        }
    }

    fn live_cookie(&self, name: &str, now: DateTime<Utc>) -> Option<StoredCookie> {
        let cookie = self.fetch(name)?;
        if cookie.is_expired_at(now) {
            debug!(cookie = %name, expired_at = %cookie.expires_at, "Persona cookie expired");
            return None;
        }
        Some(cookie)
    }

    fn fetch(&self, name: &str) -> Option<StoredCookie> {
        match self.backend.read(name) {
            Ok(cookie) => cookie,
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    cookie = %name,
                    error = %e.format_for_log(),
                    "Persona storage unavailable, treating visitor as unknown"
                );
                None
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
