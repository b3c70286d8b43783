use serde::{Deserialize, Serialize};

use crate::error::{OracleError, OracleResult};
use crate::seed::Seed;

/// Upper bound on explanation length, in characters.
pub const MAX_EXPLANATION_CHARS: usize = 280;

/// Seed characters quoted in the explanation.
pub const SEED_FRAGMENT_LEN: usize = 12;

/// Cap on `length_signal`.
pub const LENGTH_SIGNAL_CAP: usize = 100;

/// Terms scanned for `keyword_weight`. Matching is case-insensitive substring.
pub const KEYWORDS: [&str; 7] = ["ETH", "Bitcoin", "inflation", "Fed", "ETF", "AI", "sports"];

/// Deterministic text features. They only feed the explanation, never the probability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    /// Whitespace-delimited tokens in the description. U+001C..U+001F count
    /// as separators alongside Unicode whitespace.
    pub word_count: usize,
    /// Number of distinct keywords present at least once.
    pub keyword_weight: usize,
    /// `min(100, chars(description))`.
    pub length_signal: usize,
}

pub fn compute_signals(identifier: &str, description: &str) -> Signals {
    let haystack = format!("{identifier} {description}").to_lowercase();
    let keyword_weight = KEYWORDS
        .iter()
        .filter(|k| haystack.contains(&k.to_lowercase()))
        .count();

    Signals {
        word_count: description
            .split(is_word_separator)
            .filter(|w| !w.is_empty())
            .count(),
        keyword_weight,
        length_signal: description.chars().count().min(LENGTH_SIGNAL_CAP),
    }
}

fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Render signals and seed fragment into the fixed template, truncated to
/// `MAX_EXPLANATION_CHARS` characters.
pub fn render_explanation(signals: &Signals, seed: &Seed) -> OracleResult<String> {
    let fragment = seed
        .prefix(SEED_FRAGMENT_LEN)
        .ok_or_else(|| OracleError::derivation("seed prefix not available"))?;

    let text = format!(
        "Signals: words={}, keywordWeight={}, lengthSignal={}. Deterministic seed={}",
        signals.word_count, signals.keyword_weight, signals.length_signal, fragment
    );
    Ok(truncate_chars(text, MAX_EXPLANATION_CHARS))
}

/// Signals + render in one step.
pub fn synthesize_explanation(identifier: &str, description: &str, seed: &Seed) -> OracleResult<String> {
    let signals = compute_signals(identifier, description);
    render_explanation(&signals, seed)
}

/// Hard cut at `max` characters; no word-boundary handling.
#[inline]
pub fn truncate_chars(mut s: String, max: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
    s
}
