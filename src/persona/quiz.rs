//! Quiz definition and the scoring matrix derived from it.
//!
//! The bundled quiz lives in `config/quiz.toml`. A site may point
//! `[content].quiz_file` at its own copy; either way the matrix is validated
//! once at load and never mutated afterwards.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::types::PersonaTag;

/// Points awarded to each persona, indexed by [`PersonaTag::index`].
pub type ScoreRow = [u32; PersonaTag::COUNT];

const BUNDLED_QUIZ: &str = include_str!("../../config/quiz.toml");

// ─────────────────────────────────────────────────────────────────
// Quiz (deserialized from TOML)
// ─────────────────────────────────────────────────────────────────

/// Full quiz, as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Version of the quiz content (e.g. "1.0.0").
    #[serde(default)]
    pub version: String,

    /// Questions in the order they are asked.
    pub questions: Vec<QuizQuestion>,
}

/// One quiz question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<QuizOption>,
}

/// One answer option and the points it awards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOption {
    pub label: String,
    pub scores: ScoreRow,
}

impl Quiz {
    /// The quiz shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_QUIZ)
    }

    /// Parse and validate a quiz from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let quiz: Quiz = toml::from_str(content)
            .map_err(|e| Error::quiz_invalid(format!("Failed to parse TOML: {}", e)))?;
        quiz.validate()?;
        Ok(quiz)
    }

    /// Load a quiz from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let quiz = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), questions = quiz.questions.len(), "Quiz loaded");
        Ok(quiz)
    }

    fn validate(&self) -> Result<()> {
        if self.questions.is_empty() {
            return Err(Error::quiz_invalid("Quiz has no questions"));
        }
        for (q, question) in self.questions.iter().enumerate() {
            if question.options.is_empty() {
                return Err(Error::quiz_invalid(format!(
                    "Question {} ('{}') has no options",
                    q, question.prompt
                )));
            }
        }
        Ok(())
    }

    /// The scoring matrix for this quiz.
    pub fn matrix(&self) -> ScoringMatrix {
        ScoringMatrix {
            rows: self
                .questions
                .iter()
                .map(|q| q.options.iter().map(|o| o.scores).collect())
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Scoring Matrix
// ─────────────────────────────────────────────────────────────────

/// (question, option) → per-persona points.
///
/// Every question has at least one option; construction enforces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringMatrix {
    rows: Vec<Vec<ScoreRow>>,
}

impl ScoringMatrix {
    /// Matrix of the bundled quiz.
    pub fn bundled() -> Result<Self> {
        Ok(Quiz::bundled()?.matrix())
    }

    /// Build a matrix directly from rows.
    pub fn from_rows(rows: Vec<Vec<ScoreRow>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::quiz_invalid("Scoring matrix has no questions"));
        }
        if let Some(q) = rows.iter().position(|options| options.is_empty()) {
            return Err(Error::quiz_invalid(format!("Question {} has no options", q)));
        }
        Ok(Self { rows })
    }

    /// Number of questions.
    pub fn question_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of authored options for `question`, 0 if out of range.
    pub fn option_count(&self, question: usize) -> usize {
        self.rows.get(question).map_or(0, Vec::len)
    }

    /// Score row for an answer, clamping `option` to the last authored one.
    pub fn row(&self, question: usize, option: usize) -> Option<&ScoreRow> {
        let options = self.rows.get(question)?;
        options.get(option.min(options.len().saturating_sub(1)))
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
