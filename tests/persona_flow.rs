//! End-to-end persona flow through the public library API
//!
//! Quiz answers -> classification -> persisted cookies -> page assembly.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

use arco_persona::content::{ContentAssembler, PageType, VariantKind, VariantRegistry};
use arco_persona::persona::{
    CookieBackend, FileBackend, HeaderBackend, LegacyBrewStyle, MemoryBackend, PersonaClassifier,
    PersonaState, PersonaStore, PersonaTag, ScoringMatrix,
};

fn classifier() -> PersonaClassifier {
    PersonaClassifier::new(ScoringMatrix::bundled().unwrap())
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

#[test]
fn test_quiz_to_homepage() {
    let registry = VariantRegistry::bundled().unwrap();
    let store = PersonaStore::new(MemoryBackend::new());
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();

    let tag = classifier().classify(&[3, 3, 3, 3]);
    assert_eq!(tag, PersonaTag::NonBarista);
    store.persist_at(tag, now);

    let page = ContentAssembler::new(&registry, &store).compose_at(
        PageType::Homepage,
        None,
        &Map::new(),
        now + Duration::days(1),
    );

    assert_eq!(page.persona(), Some(PersonaTag::NonBarista));
    assert_eq!(
        page.get("hero"),
        Some(&registry.lookup(VariantKind::Hero, Some(PersonaTag::NonBarista), 0))
    );
    // No non-barista product list is authored, so the default list is used.
    assert_eq!(
        page.get("products"),
        Some(&registry.lookup(VariantKind::Products, None, 4))
    );
}

#[test]
fn test_every_answer_combination_yields_a_persona() {
    let classifier = classifier();
    for a in -1..5 {
        for b in -1..5 {
            for c in -1..5 {
                for d in -1..5 {
                    let tag = classifier.classify(&[a, b, c, d]);
                    assert!(PersonaTag::all().contains(&tag));
                }
            }
        }
    }
}

#[test]
fn test_expired_persona_falls_back_to_defaults() {
    let registry = VariantRegistry::bundled().unwrap();
    let store = PersonaStore::new(MemoryBackend::new());
    let written = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    store.persist_at(PersonaTag::Traveller, written);

    let assembler = ContentAssembler::new(&registry, &store);
    let live = assembler.compose_at(
        PageType::Homepage,
        None,
        &Map::new(),
        written + Duration::days(45),
    );
    let expired = assembler.compose_at(
        PageType::Homepage,
        None,
        &Map::new(),
        written + Duration::days(90),
    );

    assert_eq!(live.persona(), Some(PersonaTag::Traveller));
    assert_eq!(expired.persona(), None);
    assert_eq!(expired.get("hero"), Some(&registry.lookup(VariantKind::Hero, None, 0)));
}

#[test]
fn test_legacy_record_expires_first() {
    let store = PersonaStore::new(MemoryBackend::new());
    let written = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
    store.persist_at(PersonaTag::OfficeManager, written);

    let day_29 = written + Duration::days(29);
    assert_eq!(store.read_legacy_at(day_29), Some(LegacyBrewStyle::Convenience));

    let day_30 = written + Duration::days(30);
    assert_eq!(store.read_legacy_at(day_30), None);
    assert_eq!(store.read_at(day_30), Some(PersonaTag::OfficeManager));
    assert_eq!(store.state_at(day_30), PersonaState::Persisted(PersonaTag::OfficeManager));
    assert_eq!(store.state_at(written + Duration::days(90)), PersonaState::Expired);
}

#[test]
fn test_file_jar_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("jar").join("cookies.json");

    PersonaStore::new(FileBackend::new(&jar)).persist(PersonaTag::CraftBarista);

    let reopened = PersonaStore::new(FileBackend::new(&jar));
    assert_eq!(reopened.read(), Some(PersonaTag::CraftBarista));
    assert_eq!(reopened.read_legacy(), Some(LegacyBrewStyle::Barista));
}

#[test]
fn test_request_header_drives_assembly() {
    let registry = VariantRegistry::bundled().unwrap();
    let now = Utc::now();
    let store = PersonaStore::new(HeaderBackend::from_header(
        "session=abc; arco_persona=upgrader; arco-brew-style=enthusiast",
        now,
    ));

    let page = ContentAssembler::new(&registry, &store).compose_at(
        PageType::Homepage,
        None,
        &Map::new(),
        now,
    );
    assert_eq!(page.persona(), Some(PersonaTag::Upgrader));

    // Read-only backend: persisting is swallowed, the header value stays.
    store.persist(PersonaTag::Traveller);
    assert_eq!(store.read(), Some(PersonaTag::Upgrader));
}

#[test]
fn test_set_cookie_headers_round_trip_through_header_backend() {
    let now = Utc::now();
    let headers = PersonaStore::<MemoryBackend>::set_cookie_headers(
        PersonaTag::MorningMinimalist,
        now,
    );

    let request: Vec<&str> = headers
        .iter()
        .map(|h| h.split(';').next().unwrap())
        .collect();
    let store = PersonaStore::new(HeaderBackend::from_header(&request.join("; "), now));

    assert_eq!(store.read(), Some(PersonaTag::MorningMinimalist));
    assert_eq!(store.read_legacy(), Some(LegacyBrewStyle::Minimalist));
}

#[test]
fn test_shared_store_across_threads() {
    let backend = Arc::new(MemoryBackend::new());
    let handles: Vec<_> = PersonaTag::all()
        .iter()
        .map(|tag| {
            let store = PersonaStore::new(Arc::clone(&backend));
            let tag = *tag;
            thread::spawn(move || store.persist(tag))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Last write wins; whichever it was, it is a declared persona.
    let store = PersonaStore::new(Arc::clone(&backend));
    assert!(store.read().is_some());
    assert_eq!(backend.len(), 2);
    assert!(backend.read("arco_persona").unwrap().is_some());
}

#[test]
fn test_product_detail_override_scenario() {
    let registry = VariantRegistry::bundled().unwrap();
    let base = object(json!({
        "personaOverrides": { "upgrader": { "price": 10 } },
        "price": 20,
        "name": "Burr Grinder",
    }));

    let page = ContentAssembler::<MemoryBackend>::without_store(&registry).compose(
        PageType::ProductDetail,
        Some(PersonaTag::Upgrader),
        &base,
    );

    assert_eq!(page.get("price"), Some(&json!(10)));
    assert_eq!(page.get("name"), Some(&json!("Burr Grinder")));
    assert!(page.get("personaOverrides").is_some());
}

#[test]
fn test_compose_is_idempotent_apart_from_timestamp() {
    let registry = VariantRegistry::bundled().unwrap();
    let assembler = ContentAssembler::<MemoryBackend>::without_store(&registry);

    let first = assembler.compose(PageType::Homepage, None, &Map::new());
    let second = assembler.compose(PageType::Homepage, None, &Map::new());

    assert_eq!(first.without_timestamp(), second.without_timestamp());
    assert!(first.assembled_at().is_some());
}
