//! Quiz answers → persona.
//!
//! Classification is total: any answer vector, however incomplete or out of
//! range, produces exactly one [`PersonaTag`].

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::quiz::{ScoreRow, ScoringMatrix};
use super::types::PersonaTag;

/// Answer value meaning "question left unanswered". Any negative value counts.
pub const UNANSWERED: i32 = -1;

// ─────────────────────────────────────────────────────────────────
// Score Vector
// ─────────────────────────────────────────────────────────────────

/// Points accumulated per persona during one classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreVector(ScoreRow);

impl ScoreVector {
    pub fn get(&self, tag: PersonaTag) -> u32 {
        self.0[tag.index()]
    }

    pub fn as_array(&self) -> &ScoreRow {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&s| s == 0)
    }

    fn add(&mut self, row: &ScoreRow) {
        for (slot, points) in self.0.iter_mut().zip(row) {
            *slot = slot.saturating_add(*points);
        }
    }
}

impl From<ScoreRow> for ScoreVector {
    fn from(row: ScoreRow) -> Self {
        Self(row)
    }
}

impl fmt::Display for ScoreVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = PersonaTag::all()
            .iter()
            .map(|tag| format!("{}:{}", tag.slug(), self.get(*tag)))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Tie-break rule: first persona in declaration order with a strictly
/// greater score than everything before it.
///
/// The running maximum starts at 0 and the running winner at persona 0, so
/// ties go to the lower index and an all-zero vector yields
/// [`PersonaTag::DEFAULT`].
pub fn select_winner(scores: &ScoreVector) -> PersonaTag {
    let mut winner = PersonaTag::DEFAULT;
    let mut max = 0;
    for tag in PersonaTag::all() {
        let score = scores.get(*tag);
        if score > max {
            max = score;
            winner = *tag;
        }
    }
    winner
}

// ─────────────────────────────────────────────────────────────────
// Classifier
// ─────────────────────────────────────────────────────────────────

/// Result of a classification with its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tag: PersonaTag,
    pub scores: ScoreVector,
    /// Questions that contributed points.
    pub answered: usize,
}

/// Maps answer vectors to personas over an immutable scoring matrix.
#[derive(Debug, Clone)]
pub struct PersonaClassifier {
    matrix: ScoringMatrix,
}

impl PersonaClassifier {
    pub fn new(matrix: ScoringMatrix) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &ScoringMatrix {
        &self.matrix
    }

    /// Classify a complete answer vector.
    pub fn classify(&self, answers: &[i32]) -> PersonaTag {
        self.classify_detailed(answers).tag
    }

    /// Accumulate scores without choosing a winner.
    pub fn score(&self, answers: &[i32]) -> ScoreVector {
        self.accumulate(answers).0
    }

    /// Classify and keep the score vector.
    pub fn classify_detailed(&self, answers: &[i32]) -> Classification {
        let (scores, answered) = self.accumulate(answers);
        let tag = select_winner(&scores);
        debug!(
            answers = ?answers,
            scores = %scores,
            answered,
            persona = %tag,
            "Persona classified"
        );
        Classification {
            tag,
            scores,
            answered,
        }
    }

    fn accumulate(&self, answers: &[i32]) -> (ScoreVector, usize) {
        let mut scores = ScoreVector::default();
        let mut answered = 0;

        // Entries beyond the question count are ignored.
        for (question, &answer) in answers.iter().enumerate().take(self.matrix.question_count()) {
            if answer < 0 {
                continue;
            }
            if let Some(row) = self.matrix.row(question, answer as usize) {
                scores.add(row);
                answered += 1;
            }
        }

        (scores, answered)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
