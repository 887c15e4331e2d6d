//! Arco persona library
//!
//! Quiz-driven visitor persona classification, cookie persistence of the
//! result, and persona-aware page content assembly.

pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod persona;

pub use config::SiteConfig;
pub use content::{AssembledContent, ContentAssembler, PageType, VariantRegistry};
pub use error::{Error, ErrorCode, Result};
pub use persona::{
    CookieBackend, FileBackend, MemoryBackend, PersonaClassifier, PersonaStore, PersonaTag,
};
