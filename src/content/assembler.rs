//! Page assembly.
//!
//! Resolves the effective persona and overlays variants onto a page's base
//! content. Assembly is total: unknown personas, unknown page types and
//! unreachable storage all fall back instead of failing.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::persona::{CookieBackend, PersonaStore, PersonaTag};

use super::registry::VariantRegistry;
use super::types::{PageType, VariantKind};

/// Stamped with the effective persona slug, or null.
pub const PERSONA_FIELD: &str = "_persona";

/// Stamped with the assembly time.
pub const ASSEMBLED_AT_FIELD: &str = "_assembledAt";

/// Product-detail field holding per-persona partial overrides.
pub const PERSONA_OVERRIDES_FIELD: &str = "personaOverrides";

/// Default number of homepage product recommendations.
pub const DEFAULT_PRODUCT_LIMIT: usize = 4;

/// Default number of homepage articles.
pub const DEFAULT_ARTICLE_LIMIT: usize = 3;

// ─────────────────────────────────────────────────────────────────
// Assembled Content
// ─────────────────────────────────────────────────────────────────

/// Base content with variants applied and resolution metadata stamped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AssembledContent(Map<String, Value>);

impl AssembledContent {
    /// The persona this content was assembled for.
    pub fn persona(&self) -> Option<PersonaTag> {
        self.0
            .get(PERSONA_FIELD)
            .and_then(Value::as_str)
            .and_then(PersonaTag::parse_lenient)
    }

    /// The `_assembledAt` stamp.
    pub fn assembled_at(&self) -> Option<&str> {
        self.0.get(ASSEMBLED_AT_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Content without the `_assembledAt` stamp, for comparing assemblies.
    pub fn without_timestamp(&self) -> Map<String, Value> {
        let mut map = self.0.clone();
        map.remove(ASSEMBLED_AT_FIELD);
        map
    }
}

// ─────────────────────────────────────────────────────────────────
// Assembler
// ─────────────────────────────────────────────────────────────────

/// How many list entries homepage assembly takes from each list table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyLimits {
    pub products: usize,
    pub articles: usize,
}

impl Default for AssemblyLimits {
    fn default() -> Self {
        Self {
            products: DEFAULT_PRODUCT_LIMIT,
            articles: DEFAULT_ARTICLE_LIMIT,
        }
    }
}

/// Composes page data from base content, variants and the stored persona.
pub struct ContentAssembler<'a, B> {
    registry: &'a VariantRegistry,
    store: Option<&'a PersonaStore<B>>,
    limits: AssemblyLimits,
}

impl<'a, B: CookieBackend> ContentAssembler<'a, B> {
    /// Assembler that falls back to `store` when no persona is passed.
    pub fn new(registry: &'a VariantRegistry, store: &'a PersonaStore<B>) -> Self {
        Self {
            registry,
            store: Some(store),
            limits: AssemblyLimits::default(),
        }
    }

    /// Assembler without persisted state; only explicit personas apply.
    pub fn without_store(registry: &'a VariantRegistry) -> Self {
        Self {
            registry,
            store: None,
            limits: AssemblyLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: AssemblyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Explicit persona if given, else the stored one, else none.
    pub fn resolve_persona(
        &self,
        explicit: Option<PersonaTag>,
        now: DateTime<Utc>,
    ) -> Option<PersonaTag> {
        explicit.or_else(|| self.store.and_then(|s| s.read_at(now)))
    }

    pub fn compose(
        &self,
        page_type: PageType,
        tag: Option<PersonaTag>,
        base: &Map<String, Value>,
    ) -> AssembledContent {
        self.compose_at(page_type, tag, base, Utc::now())
    }

    /// Compose with free-form inputs. Unknown page types pass base content
    /// through. A supplied persona that is not recognized composes with the
    /// defaults; the store is only consulted when no persona is supplied.
    pub fn compose_str(
        &self,
        page_type: &str,
        tag: Option<&str>,
        base: &Map<String, Value>,
    ) -> AssembledContent {
        let now = Utc::now();
        let persona = match tag {
            Some(slug) => {
                let parsed = PersonaTag::parse_lenient(slug);
                if parsed.is_none() {
                    debug!(persona = slug, "Unrecognized persona, using defaults");
                }
                parsed
            }
            None => self.resolve_persona(None, now),
        };

        match page_type.parse::<PageType>() {
            Ok(page) => self.assemble(page, persona, base, now),
            Err(_) => {
                debug!(page_type, "Unknown page type, passing base content through");
                stamp(base.clone(), persona, now)
            }
        }
    }

    /// Compose as of `now`. `now` is used for the store read and the stamp.
    pub fn compose_at(
        &self,
        page_type: PageType,
        tag: Option<PersonaTag>,
        base: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> AssembledContent {
        let persona = self.resolve_persona(tag, now);
        self.assemble(page_type, persona, base, now)
    }

    fn assemble(
        &self,
        page_type: PageType,
        persona: Option<PersonaTag>,
        base: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> AssembledContent {
        let mut content = base.clone();

        match page_type {
            PageType::Homepage => self.apply_variants(&mut content, persona),
            PageType::ProductDetail => apply_persona_override(&mut content, persona),
            PageType::Guide
            | PageType::Article
            | PageType::Experience
            | PageType::Tool
            | PageType::Bundle => {}
        }

        debug!(
            page_type = %page_type,
            persona = persona.map_or("none", |p| p.slug()),
            "Page assembled"
        );

        stamp(content, persona, now)
    }

    fn apply_variants(&self, content: &mut Map<String, Value>, persona: Option<PersonaTag>) {
        for kind in VariantKind::all() {
            let limit = match kind {
                VariantKind::Products => self.limits.products,
                VariantKind::ArticleFeed => self.limits.articles,
                _ => 0,
            };
            content.insert(
                kind.page_field().to_string(),
                self.registry.lookup(*kind, persona, limit),
            );
        }
    }
}

/// Shallow-merge `personaOverrides[persona]` onto `content`; override keys
/// replace base keys wholesale.
fn apply_persona_override(content: &mut Map<String, Value>, persona: Option<PersonaTag>) {
    let Some(tag) = persona else {
        return;
    };
    let overrides = content
        .get(PERSONA_OVERRIDES_FIELD)
        .and_then(|all| all.get(tag.slug()))
        .and_then(Value::as_object)
        .cloned();

    if let Some(fields) = overrides {
        debug!(persona = %tag, fields = fields.len(), "Applying persona override");
        for (key, value) in fields {
            content.insert(key, value);
        }
    }
}

fn stamp(
    mut content: Map<String, Value>,
    persona: Option<PersonaTag>,
    now: DateTime<Utc>,
) -> AssembledContent {
    content.insert(
        PERSONA_FIELD.to_string(),
        persona.map_or(Value::Null, |p| Value::String(p.slug().to_string())),
    );
    content.insert(
        ASSEMBLED_AT_FIELD.to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    AssembledContent(content)
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::MemoryBackend;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 15, 30).unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    fn registry() -> VariantRegistry {
        VariantRegistry::bundled().unwrap()
    }

    #[test]
    fn test_homepage_without_persona_uses_defaults() {
        let registry = registry();
        let store = PersonaStore::new(MemoryBackend::new());
        let assembler = ContentAssembler::new(&registry, &store);

        let page = assembler.compose_at(PageType::Homepage, None, &Map::new(), t0());

        assert_eq!(page.get("hero"), Some(&registry.lookup(VariantKind::Hero, None, 0)));
        assert_eq!(page.get("products").unwrap().as_array().unwrap().len(), 4);
        assert_eq!(page.get("articleFeed").unwrap().as_array().unwrap().len(), 3);
        assert!(page.get("promotionalCTA").is_some());
        assert!(page.get("navOverride").is_some());
        assert_eq!(page.get(PERSONA_FIELD), Some(&Value::Null));
        assert_eq!(page.assembled_at(), Some("2026-05-04T09:15:30.000Z"));
        assert_eq!(page.persona(), None);
    }

    #[test]
    fn test_homepage_is_idempotent_apart_from_timestamp() {
        let registry = registry();
        let store = PersonaStore::new(MemoryBackend::new());
        let assembler = ContentAssembler::new(&registry, &store);

        let first = assembler.compose(PageType::Homepage, None, &Map::new());
        let second = assembler.compose(PageType::Homepage, None, &Map::new());
        assert_eq!(first.without_timestamp(), second.without_timestamp());

        let a = assembler.compose_at(PageType::Homepage, None, &Map::new(), t0());
        let b = assembler.compose_at(PageType::Homepage, None, &Map::new(), t0());
        assert_eq!(a, b);
    }

    #[test]
    fn test_homepage_overwrites_variant_fields_only() {
        let registry = registry();
        let assembler = ContentAssembler::<MemoryBackend>::without_store(&registry);
        let base = object(json!({
            "title": "Arco Coffee",
            "hero": {"headline": "stale"},
            "footer": {"links": ["about"]}
        }));

        let page = assembler.compose_at(
            PageType::Homepage,
            Some(PersonaTag::CraftBarista),
            &base,
            t0(),
        );

        assert_eq!(page.get("title"), Some(&json!("Arco Coffee")));
        assert_eq!(page.get("footer"), Some(&json!({"links": ["about"]})));
        assert_eq!(page.get("hero").unwrap()["headline"], "Dial it in");
        assert_eq!(page.persona(), Some(PersonaTag::CraftBarista));
    }

    #[test]
    fn test_homepage_respects_limits() {
        let registry = registry();
        let assembler = ContentAssembler::<MemoryBackend>::without_store(&registry)
            .with_limits(AssemblyLimits { products: 1, articles: 0 });
        let page = assembler.compose_at(
            PageType::Homepage,
            Some(PersonaTag::Upgrader),
            &Map::new(),
            t0(),
        );
        assert_eq!(page.get("products").unwrap().as_array().unwrap().len(), 1);
        assert!(page.get("articleFeed").unwrap().as_array().unwrap().is_empty());
    }

    #[test]
    fn test_product_detail_override() {
        let registry = registry();
        let assembler = ContentAssembler::<MemoryBackend>::without_store(&registry);
        let base = object(json!({
            "personaOverrides": {"upgrader": {"price": 10}},
            "price": 20,
            "name": "Arco Burr Grinder"
        }));

        let page = assembler.compose_at(
            PageType::ProductDetail,
            Some(PersonaTag::Upgrader),
            &base,
            t0(),
        );
        assert_eq!(page.get("price"), Some(&json!(10)));
        assert_eq!(page.get("name"), Some(&json!("Arco Burr Grinder")));
        assert!(page.get(PERSONA_OVERRIDES_FIELD).is_some());

        let other = assembler.compose_at(
            PageType::ProductDetail,
            Some(PersonaTag::Traveller),
            &base,
            t0(),
        );
        assert_eq!(other.get("price"), Some(&json!(20)));

        let anonymous = assembler.compose_at(PageType::ProductDetail, None, &base, t0());
        assert_eq!(anonymous.get("price"), Some(&json!(20)));
    }

    #[test]
    fn test_product_detail_override_is_shallow() {
        let registry = registry();
        let assembler = ContentAssembler::<MemoryBackend>::without_store(&registry);
        let base = object(json!({
            "specs": {"weight": "2kg", "burrs": "64mm"},
            "personaOverrides": {"craft-barista": {"specs": {"burrs": "83mm"}}}
        }));

        let page = assembler.compose_at(
            PageType::ProductDetail,
            Some(PersonaTag::CraftBarista),
            &base,
            t0(),
        );
        assert_eq!(page.get("specs"), Some(&json!({"burrs": "83mm"})));
    }

    #[test]
    fn test_product_detail_non_object_override_ignored() {
        let registry = registry();
        let assembler = ContentAssembler::<MemoryBackend>::without_store(&registry);
        let base = object(json!({"price": 20, "personaOverrides": {"upgrader": 5}}));
        let page = assembler.compose_at(
            PageType::ProductDetail,
            Some(PersonaTag::Upgrader),
            &base,
            t0(),
        );
        assert_eq!(page.get("price"), Some(&json!(20)));
    }

    #[test]
    fn test_other_pages_pass_through() {
        let registry = registry();
        let assembler = ContentAssembler::<MemoryBackend>::without_store(&registry);
        let base = object(json!({"title": "Grind Size Guide", "hero": "keep"}));

        for page_type in [
            PageType::Guide,
            PageType::Article,
            PageType::Experience,
            PageType::Tool,
            PageType::Bundle,
        ] {
            let page = assembler.compose_at(page_type, Some(PersonaTag::Upgrader), &base, t0());
            let mut expected = base.clone();
            expected.insert(PERSONA_FIELD.into(), json!("upgrader"));
            expected.insert(ASSEMBLED_AT_FIELD.into(), json!("2026-05-04T09:15:30.000Z"));
            assert_eq!(page.as_map(), &expected, "page type {}", page_type);
        }
    }

    #[test]
    fn test_persona_resolved_from_store() {
        let registry = registry();
        let store = PersonaStore::new(MemoryBackend::new());
        store.persist_at(PersonaTag::Traveller, t0());
        let assembler = ContentAssembler::new(&registry, &store);

        let page = assembler.compose_at(PageType::Homepage, None, &Map::new(), t0());
        assert_eq!(page.persona(), Some(PersonaTag::Traveller));
        assert_eq!(page.get("hero").unwrap()["ctaHref"], "/collections/travel");

        let explicit = assembler.compose_at(
            PageType::Homepage,
            Some(PersonaTag::Upgrader),
            &Map::new(),
            t0(),
        );
        assert_eq!(explicit.persona(), Some(PersonaTag::Upgrader));
    }

    #[test]
    fn test_expired_store_reads_unknown() {
        let registry = registry();
        let store = PersonaStore::new(MemoryBackend::new());
        store.persist_at(PersonaTag::Traveller, t0());
        let assembler = ContentAssembler::new(&registry, &store);

        let later = t0() + Duration::days(91);
        let page = assembler.compose_at(PageType::Homepage, None, &Map::new(), later);
        assert_eq!(page.persona(), None);
    }

    #[test]
    fn test_compose_str_lenient_inputs() {
        let registry = registry();
        let assembler = ContentAssembler::<MemoryBackend>::without_store(&registry);
        let base = object(json!({"title": "x"}));

        let page = assembler.compose_str("landing-page", Some("upgrader"), &base);
        assert_eq!(page.get("title"), Some(&json!("x")));
        assert_eq!(page.persona(), Some(PersonaTag::Upgrader));
        assert!(page.get("hero").is_none());

        let page = assembler.compose_str("homepage", Some("unknown-tag"), &Map::new());
        assert_eq!(page.get(PERSONA_FIELD), Some(&Value::Null));
        assert_eq!(page.get("hero"), Some(&registry.lookup(VariantKind::Hero, None, 0)));
    }

    #[test]
    fn test_compose_str_unrecognized_persona_skips_store() {
        let registry = registry();
        let store = PersonaStore::new(MemoryBackend::new());
        store.persist(PersonaTag::Traveller);
        let assembler = ContentAssembler::new(&registry, &store);

        let page = assembler.compose_str("homepage", Some("unknown-tag"), &Map::new());
        assert_eq!(page.persona(), None);
        assert_eq!(page.get(PERSONA_FIELD), Some(&Value::Null));
        assert_eq!(page.get("hero"), Some(&registry.lookup(VariantKind::Hero, None, 0)));

        let stored = assembler.compose_str("homepage", None, &Map::new());
        assert_eq!(stored.persona(), Some(PersonaTag::Traveller));
        assert_eq!(stored.get("hero").unwrap()["ctaHref"], "/collections/travel");

        let landing = assembler.compose_str("landing-page", Some("unknown-tag"), &Map::new());
        assert_eq!(landing.persona(), None);
    }

    #[test]
    fn test_base_content_not_mutated() {
        let registry = registry();
        let assembler = ContentAssembler::<MemoryBackend>::without_store(&registry);
        let base = object(json!({"price": 20, "personaOverrides": {"upgrader": {"price": 10}}}));
        let snapshot = base.clone();
        let _ = assembler.compose_at(
            PageType::ProductDetail,
            Some(PersonaTag::Upgrader),
            &base,
            t0(),
        );
        assert_eq!(base, snapshot);
    }
}
