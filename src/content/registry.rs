//! Persona-keyed content variant tables.
//!
//! Each table carries a mandatory default, enforced when the registry is
//! built, so every lookup resolves. Tables never reference each other.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::persona::PersonaTag;

use super::types::{
    ArticleTeaser, Hero, NavigationOverride, ProductRecommendation, PromotionalCta, VariantKind,
};

const BUNDLED_VARIANTS: &str = include_str!("../../config/variants.toml");

const DEFAULT_KEY: &str = "default";

// ─────────────────────────────────────────────────────────────────
// Variant Table
// ─────────────────────────────────────────────────────────────────

/// One persona-keyed table with its fallback entry.
#[derive(Debug, Clone)]
pub struct VariantTable<T> {
    default: T,
    personas: HashMap<PersonaTag, T>,
}

impl<T> VariantTable<T> {
    /// Build from authored entries keyed by `"default"` or a persona slug.
    fn from_raw(kind: VariantKind, mut raw: BTreeMap<String, T>) -> Result<Self> {
        let default = raw.remove(DEFAULT_KEY).ok_or_else(|| {
            Error::variants_invalid(kind.table_name(), "missing 'default' entry")
        })?;

        let mut personas = HashMap::with_capacity(raw.len());
        for (key, entry) in raw {
            let tag: PersonaTag = key.parse().map_err(|_| {
                Error::variants_invalid(kind.table_name(), format!("unknown persona key '{}'", key))
            })?;
            if personas.insert(tag, entry).is_some() {
                return Err(Error::variants_invalid(
                    kind.table_name(),
                    format!("duplicate persona key '{}'", key),
                ));
            }
        }

        Ok(Self { default, personas })
    }

    /// Entry for `tag`, or the default when absent or not in this table.
    pub fn get(&self, tag: Option<PersonaTag>) -> &T {
        tag.and_then(|t| self.personas.get(&t)).unwrap_or(&self.default)
    }

    pub fn default_entry(&self) -> &T {
        &self.default
    }

    /// Whether `tag` has its own entry rather than the fallback.
    pub fn has_entry(&self, tag: PersonaTag) -> bool {
        self.personas.contains_key(&tag)
    }
}

impl<T> VariantTable<Vec<T>> {
    /// First `min(limit, len)` entries for `tag`.
    pub fn get_limited(&self, tag: Option<PersonaTag>, limit: usize) -> &[T] {
        let list = self.get(tag);
        &list[..limit.min(list.len())]
    }
}

// ─────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────

/// Authored form of the variants file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawVariants {
    hero: BTreeMap<String, Hero>,
    products: BTreeMap<String, Vec<ProductRecommendation>>,
    article_feed: BTreeMap<String, Vec<ArticleTeaser>>,
    promotional_cta: BTreeMap<String, PromotionalCta>,
    nav_override: BTreeMap<String, NavigationOverride>,
}

/// All content variant tables. Immutable once built.
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    hero: VariantTable<Hero>,
    products: VariantTable<Vec<ProductRecommendation>>,
    article_feed: VariantTable<Vec<ArticleTeaser>>,
    promotional_cta: VariantTable<PromotionalCta>,
    nav_override: VariantTable<NavigationOverride>,
}

/// Every variant resolved for one persona.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSet<'a> {
    pub hero: &'a Hero,
    pub products: &'a [ProductRecommendation],
    pub article_feed: &'a [ArticleTeaser],
    #[serde(rename = "promotionalCTA")]
    pub promotional_cta: &'a PromotionalCta,
    pub nav_override: &'a NavigationOverride,
}

impl VariantRegistry {
    /// The tables shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_VARIANTS)
    }

    /// Parse and validate tables from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawVariants = toml::from_str(content)
            .map_err(|e| Error::variants_invalid("*", format!("Failed to parse TOML: {}", e)))?;

        Ok(Self {
            hero: VariantTable::from_raw(VariantKind::Hero, raw.hero)?,
            products: VariantTable::from_raw(VariantKind::Products, raw.products)?,
            article_feed: VariantTable::from_raw(VariantKind::ArticleFeed, raw.article_feed)?,
            promotional_cta: VariantTable::from_raw(
                VariantKind::PromotionalCta,
                raw.promotional_cta,
            )?,
            nav_override: VariantTable::from_raw(VariantKind::NavOverride, raw.nav_override)?,
        })
    }

    /// Load tables from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let registry = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Variant tables loaded");
        Ok(registry)
    }

    // ─────────────────────────────────────────────────────────────
    // Typed lookups
    // ─────────────────────────────────────────────────────────────

    pub fn hero(&self, tag: Option<PersonaTag>) -> &Hero {
        self.hero.get(tag)
    }

    pub fn products(&self, tag: Option<PersonaTag>, limit: usize) -> &[ProductRecommendation] {
        self.products.get_limited(tag, limit)
    }

    pub fn article_feed(&self, tag: Option<PersonaTag>, limit: usize) -> &[ArticleTeaser] {
        self.article_feed.get_limited(tag, limit)
    }

    pub fn promotional_cta(&self, tag: Option<PersonaTag>) -> &PromotionalCta {
        self.promotional_cta.get(tag)
    }

    pub fn nav_override(&self, tag: Option<PersonaTag>) -> &NavigationOverride {
        self.nav_override.get(tag)
    }

    /// All five variants for `tag`.
    pub fn variant_set(
        &self,
        tag: Option<PersonaTag>,
        product_limit: usize,
        article_limit: usize,
    ) -> VariantSet<'_> {
        VariantSet {
            hero: self.hero(tag),
            products: self.products(tag, product_limit),
            article_feed: self.article_feed(tag, article_limit),
            promotional_cta: self.promotional_cta(tag),
            nav_override: self.nav_override(tag),
        }
    }

    /// Whether `tag` has its own entry in `kind`.
    pub fn has_entry(&self, kind: VariantKind, tag: PersonaTag) -> bool {
        match kind {
            VariantKind::Hero => self.hero.has_entry(tag),
            VariantKind::Products => self.products.has_entry(tag),
            VariantKind::ArticleFeed => self.article_feed.has_entry(tag),
            VariantKind::PromotionalCta => self.promotional_cta.has_entry(tag),
            VariantKind::NavOverride => self.nav_override.has_entry(tag),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // JSON lookups
    // ─────────────────────────────────────────────────────────────

    /// Variant for `tag` in `kind` as JSON. `limit` applies to list tables only.
    pub fn lookup(&self, kind: VariantKind, tag: Option<PersonaTag>, limit: usize) -> Value {
        match kind {
            VariantKind::Hero => to_json(kind, self.hero(tag)),
            VariantKind::Products => to_json(kind, self.products(tag, limit)),
            VariantKind::ArticleFeed => to_json(kind, self.article_feed(tag, limit)),
            VariantKind::PromotionalCta => to_json(kind, self.promotional_cta(tag)),
            VariantKind::NavOverride => to_json(kind, self.nav_override(tag)),
        }
    }

    /// Like [`lookup`](Self::lookup) with a free-form tag; unrecognized tags
    /// resolve like an absent one.
    pub fn lookup_for(&self, kind: VariantKind, tag: Option<&str>, limit: usize) -> Value {
        self.lookup(kind, tag.and_then(PersonaTag::parse_lenient), limit)
    }
}

fn to_json<T: Serialize + ?Sized>(kind: VariantKind, variant: &T) -> Value {
    serde_json::to_value(variant).unwrap_or_else(|e| {
        warn!(table = %kind, error = %e, "Variant could not be serialized");
        Value::Null
    })
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
