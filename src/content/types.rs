//! Content variant and page types.
//!
//! Variants are authored in snake_case TOML and emitted as camelCase JSON
//! for the rendering layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────
// Variants
// ─────────────────────────────────────────────────────────────────

/// Homepage hero block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct Hero {
    pub headline: String,
    pub subhead: String,
    pub cta_label: String,
    pub cta_href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One entry of an ordered product recommendation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct ProductRecommendation {
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub href: String,
    /// Why this product suits the persona.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One entry of an ordered article feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct ArticleTeaser {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub href: String,
}

/// Promotional call-to-action block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct PromotionalCta {
    pub headline: String,
    pub body: String,
    pub button_label: String,
    pub href: String,
    /// Discount code shown with the CTA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Navigation emphasis for a persona.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct NavigationOverride {
    /// Nav item ids to emphasize, in order.
    #[serde(default)]
    pub highlight: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_href: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Variant Tables
// ─────────────────────────────────────────────────────────────────

/// The five persona-keyed tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Hero,
    Products,
    ArticleFeed,
    PromotionalCta,
    NavOverride,
}

impl VariantKind {
    pub fn all() -> &'static [VariantKind] {
        &[
            VariantKind::Hero,
            VariantKind::Products,
            VariantKind::ArticleFeed,
            VariantKind::PromotionalCta,
            VariantKind::NavOverride,
        ]
    }

    /// Table name in the variants TOML.
    pub fn table_name(&self) -> &'static str {
        match self {
            VariantKind::Hero => "hero",
            VariantKind::Products => "products",
            VariantKind::ArticleFeed => "article_feed",
            VariantKind::PromotionalCta => "promotional_cta",
            VariantKind::NavOverride => "nav_override",
        }
    }

    /// Field the variant is written to on an assembled homepage.
    pub fn page_field(&self) -> &'static str {
        match self {
            VariantKind::Hero => "hero",
            VariantKind::Products => "products",
            VariantKind::ArticleFeed => "articleFeed",
            VariantKind::PromotionalCta => "promotionalCTA",
            VariantKind::NavOverride => "navOverride",
        }
    }

    /// Whether the table holds ordered lists that take a limit.
    pub fn is_list(&self) -> bool {
        matches!(self, VariantKind::Products | VariantKind::ArticleFeed)
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

// ─────────────────────────────────────────────────────────────────
// Page Type
// ─────────────────────────────────────────────────────────────────

/// Kinds of page the assembler composes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    Homepage,
    ProductDetail,
    Guide,
    Article,
    Experience,
    Tool,
    Bundle,
}

impl PageType {
    pub fn all() -> &'static [PageType] {
        &[
            PageType::Homepage,
            PageType::ProductDetail,
            PageType::Guide,
            PageType::Article,
            PageType::Experience,
            PageType::Tool,
            PageType::Bundle,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageType::Homepage => "homepage",
            PageType::ProductDetail => "product-detail",
            PageType::Guide => "guide",
            PageType::Article => "article",
            PageType::Experience => "experience",
            PageType::Tool => "tool",
            PageType::Bundle => "bundle",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        PageType::all()
            .iter()
            .find(|page| page.name() == normalized)
            .copied()
            .ok_or_else(|| Error::UnknownPageType { name: s.to_string() })
    }
}
