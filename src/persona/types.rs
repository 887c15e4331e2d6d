//! Core types for the persona system.
//!
//! Visitors are sorted into one of six behavioral personas. The declaration
//! order of [`PersonaTag`] is load-bearing: it is the scan order for the
//! classifier's tie-break, and persona 0 doubles as the default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────
// Persona Tag
// ─────────────────────────────────────────────────────────────────

/// The six canonical visitor personas, in classifier scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonaTag {
    /// Wants good coffee with the fewest steps before work.
    MorningMinimalist,
    /// Owns entry-level kit and is ready to step up.
    Upgrader,
    /// Treats espresso as a craft; dials in every shot.
    CraftBarista,
    /// Brews in hotel rooms, campsites and trains.
    Traveller,
    /// Likes coffee, not the ritual; values convenience.
    NonBarista,
    /// Buys for a team or a shared office kitchen.
    OfficeManager,
}

impl PersonaTag {
    /// Number of personas in the taxonomy.
    pub const COUNT: usize = 6;

    /// Persona assigned when nothing distinguishes a visitor.
    ///
    /// Must stay the first declared variant: the classifier's all-zero and
    /// tie cases resolve to index 0.
    pub const DEFAULT: PersonaTag = PersonaTag::MorningMinimalist;

    /// All personas in declaration (scan) order.
    pub fn all() -> &'static [PersonaTag; PersonaTag::COUNT] {
        &[
            PersonaTag::MorningMinimalist,
            PersonaTag::Upgrader,
            PersonaTag::CraftBarista,
            PersonaTag::Traveller,
            PersonaTag::NonBarista,
            PersonaTag::OfficeManager,
        ]
    }

    /// Position in the taxonomy; indexes score vectors.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Persona at `index`, if any.
    pub fn from_index(index: usize) -> Option<PersonaTag> {
        Self::all().get(index).copied()
    }

    /// Slug used in cookies, variant tables and CLI args.
    pub fn slug(&self) -> &'static str {
        match self {
            PersonaTag::MorningMinimalist => "morning-minimalist",
            PersonaTag::Upgrader => "upgrader",
            PersonaTag::CraftBarista => "craft-barista",
            PersonaTag::Traveller => "traveller",
            PersonaTag::NonBarista => "non-barista",
            PersonaTag::OfficeManager => "office-manager",
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PersonaTag::MorningMinimalist => "Morning Minimalist",
            PersonaTag::Upgrader => "Upgrader",
            PersonaTag::CraftBarista => "Craft Barista",
            PersonaTag::Traveller => "Traveller",
            PersonaTag::NonBarista => "Non-Barista",
            PersonaTag::OfficeManager => "Office Manager",
        }
    }

    /// Legacy brew-style slug written alongside the canonical record.
    ///
    /// Many-to-one: `NonBarista` and `OfficeManager` share `Convenience`.
    pub fn legacy_style(&self) -> LegacyBrewStyle {
        match self {
            PersonaTag::MorningMinimalist => LegacyBrewStyle::Minimalist,
            PersonaTag::Upgrader => LegacyBrewStyle::Enthusiast,
            PersonaTag::CraftBarista => LegacyBrewStyle::Barista,
            PersonaTag::Traveller => LegacyBrewStyle::OnTheGo,
            PersonaTag::NonBarista | PersonaTag::OfficeManager => LegacyBrewStyle::Convenience,
        }
    }

    /// Parse a slug, treating anything unrecognized as absent.
    pub fn parse_lenient(s: &str) -> Option<PersonaTag> {
        s.parse().ok()
    }
}

impl fmt::Display for PersonaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for PersonaTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "morning-minimalist" => Ok(PersonaTag::MorningMinimalist),
            "upgrader" => Ok(PersonaTag::Upgrader),
            "craft-barista" => Ok(PersonaTag::CraftBarista),
            "traveller" => Ok(PersonaTag::Traveller),
            "non-barista" => Ok(PersonaTag::NonBarista),
            "office-manager" => Ok(PersonaTag::OfficeManager),
            _ => Err(Error::UnknownPersona { slug: s.to_string() }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Legacy Brew Style
// ─────────────────────────────────────────────────────────────────

/// The five-value taxonomy read by older content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegacyBrewStyle {
    Minimalist,
    Enthusiast,
    Barista,
    OnTheGo,
    Convenience,
}

impl LegacyBrewStyle {
    pub fn all() -> &'static [LegacyBrewStyle] {
        &[
            LegacyBrewStyle::Minimalist,
            LegacyBrewStyle::Enthusiast,
            LegacyBrewStyle::Barista,
            LegacyBrewStyle::OnTheGo,
            LegacyBrewStyle::Convenience,
        ]
    }

    pub fn slug(&self) -> &'static str {
        match self {
            LegacyBrewStyle::Minimalist => "minimalist",
            LegacyBrewStyle::Enthusiast => "enthusiast",
            LegacyBrewStyle::Barista => "barista",
            LegacyBrewStyle::OnTheGo => "on-the-go",
            LegacyBrewStyle::Convenience => "convenience",
        }
    }
}

impl fmt::Display for LegacyBrewStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for LegacyBrewStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LegacyBrewStyle::all()
            .iter()
            .find(|style| style.slug() == s.trim())
            .copied()
            .ok_or_else(|| format!("Unknown brew style '{}'", s))
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Lifecycle
// ─────────────────────────────────────────────────────────────────

/// Lifecycle of a visitor's persona as seen by content assembly.
///
/// `Classified` only exists between a completed quiz and the persist call;
/// there is no partially classified state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaState {
    /// No record stored.
    Unknown,
    /// Quiz completed, not yet persisted.
    Classified(PersonaTag),
    /// Record stored and within its retention window.
    Persisted(PersonaTag),
    /// Record stored but past its retention window; reads as unknown.
    Expired,
}

impl PersonaState {
    /// The persona content assembly would act on in this state.
    pub fn effective(&self) -> Option<PersonaTag> {
        match self {
            PersonaState::Classified(tag) | PersonaState::Persisted(tag) => Some(*tag),
            PersonaState::Unknown | PersonaState::Expired => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
