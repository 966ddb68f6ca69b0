//! Equivalence of actual vs expected output under an ordered cascade of
//! text-normalization strategies. The toplevel line-wraps long values at a
//! column that depends on the terminal, so byte equality legitimately fails
//! on correct output; collapsing whitespace recovers those cases while
//! still requiring the non-whitespace content to match exactly.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Exact,
    Trimmed,
    WhitespaceNormalized,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Exact => "exact",
            Strategy::Trimmed => "trimmed",
            Strategy::WhitespaceNormalized => "whitespace-normalized",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Strategy::Exact => text.to_string(),
            Strategy::Trimmed => text.trim().to_string(),
            Strategy::WhitespaceNormalized => normalize_whitespace(text),
        }
    }
}

/// Tried in order; first success wins.
pub const STRATEGIES: [Strategy; 3] = [
    Strategy::Exact,
    Strategy::Trimmed,
    Strategy::WhitespaceNormalized,
];

/// Collapses every run of whitespace (including newlines) to a single
/// space and trims both ends. Idempotent.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub matched: bool,
    /// The strategy that matched, or the last one tried on failure.
    pub strategy: Strategy,
}

pub fn compare(actual: &str, expected: &str) -> Comparison {
    for strategy in STRATEGIES {
        if strategy.apply(actual) == strategy.apply(expected) {
            return Comparison {
                matched: true,
                strategy,
            };
        }
    }
    Comparison {
        matched: false,
        strategy: STRATEGIES[STRATEGIES.len() - 1],
    }
}
