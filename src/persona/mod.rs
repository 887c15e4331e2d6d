//! Persona system: quiz classification and persisted visitor personas.
//!
//! A visitor answers a short quiz once. The complete answer vector is
//! classified into one of six personas and persisted as a cookie; later page
//! loads read it back to pick content variants.

pub mod backend;
pub mod classifier;
pub mod quiz;
pub mod store;
pub mod types;

pub use backend::{CookieBackend, FileBackend, HeaderBackend, MemoryBackend, StoredCookie};
pub use classifier::{select_winner, Classification, PersonaClassifier, ScoreVector, UNANSWERED};
pub use quiz::{Quiz, QuizOption, QuizQuestion, ScoreRow, ScoringMatrix};
pub use store::{
    PersonaRecord, PersonaStore, CANONICAL_COOKIE, CANONICAL_TTL_DAYS, LEGACY_COOKIE,
    LEGACY_TTL_DAYS,
};
pub use types::{LegacyBrewStyle, PersonaState, PersonaTag};
