//! Persona-aware content: variant tables and page assembly.

pub mod assembler;
pub mod registry;
pub mod types;

pub use assembler::{
    AssembledContent, AssemblyLimits, ContentAssembler, ASSEMBLED_AT_FIELD,
    DEFAULT_ARTICLE_LIMIT, DEFAULT_PRODUCT_LIMIT, PERSONA_FIELD, PERSONA_OVERRIDES_FIELD,
};
pub use registry::{VariantRegistry, VariantSet, VariantTable};
pub use types::{
    ArticleTeaser, Hero, NavigationOverride, PageType, ProductRecommendation, PromotionalCta,
    VariantKind,
};
