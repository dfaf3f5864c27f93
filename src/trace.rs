//! Match provenance returned alongside every mapping attempt.

use serde::Serialize;
use std::fmt;

use crate::validate::InvalidReason;

/// Matching strategies, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Exact,
    HighFidelityFuzzy,
    LooseFuzzy,
    WordBoundary,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Exact => "exact",
            Strategy::HighFidelityFuzzy => "high_fidelity_fuzzy",
            Strategy::LooseFuzzy => "loose_fuzzy",
            Strategy::WordBoundary => "word_boundary",
        };
        f.write_str(name)
    }
}

/// A located chunk: char offsets into the document's normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    pub start: usize,
    pub end: usize,
    pub score: f64,
    pub strategy: Strategy,
    /// The fuzzy window was shrunk to the chunk's anchor phrases.
    pub trimmed: bool,
}

/// Why a chunk produced no highlight. None of these is an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    EmptyDocument,
    ChunkTooShort { chars: usize },
    NotFound,
    NoFragments,
    LowConfidence { similarity: f64 },
    NoGeometry,
    Invalid { reason: InvalidReason },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyDocument => write!(f, "document has no text fragments"),
            Rejection::ChunkTooShort { chars } => {
                write!(f, "chunk too short ({chars} normalized chars)")
            }
            Rejection::NotFound => write!(f, "no strategy located the chunk"),
            Rejection::NoFragments => write!(f, "matched range maps to no fragments"),
            Rejection::LowConfidence { similarity } => {
                write!(f, "matched fragments too dissimilar ({:.1}%)", similarity * 100.0)
            }
            Rejection::NoGeometry => write!(f, "matched fragments form no highlight line"),
            Rejection::Invalid { reason } => write!(f, "invalid highlight: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyAttempt {
    pub strategy: Strategy,
    /// Best score the strategy reached, if it produced any candidate.
    pub best_score: Option<f64>,
    pub accepted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchTrace {
    pub chunk_chars: usize,
    pub attempts: Vec<StrategyAttempt>,
    pub matched: Option<MatchResult>,
    pub fragment_indices: Vec<usize>,
    pub quality: Option<f64>,
    pub malformed_fragments: usize,
    pub rejection: Option<Rejection>,
}

impl MatchTrace {
    pub fn record(&mut self, strategy: Strategy, best_score: Option<f64>, accepted: bool) {
        self.attempts.push(StrategyAttempt {
            strategy,
            best_score,
            accepted,
        });
    }

    /// Strategy that produced the match, if any.
    pub fn strategy(&self) -> Option<Strategy> {
        self.matched.map(|m| m.strategy)
    }
}
