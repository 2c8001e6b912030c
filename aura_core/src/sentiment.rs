//! Lexicon-based sentiment polarity.
//!
//! Scores are averaged over the sentiment-bearing words of a text, giving a
//! polarity in `[-1.0, 1.0]`. A negator within the three preceding tokens
//! flips and dampens a word's score; an intensifier directly before it
//! scales the score.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Scores the emotional polarity of a user utterance.
pub trait SentimentAnalyzer: Send + Sync {
    /// Polarity in `[-1.0, 1.0]`; `0.0` when nothing sentiment-bearing is found.
    fn polarity(&self, text: &str) -> f32;
}

static LEXICON: Lazy<HashMap<&'static str, f32>> = Lazy::new(|| {
    [
        // positive
        ("good", 0.7),
        ("great", 0.8),
        ("happy", 0.8),
        ("glad", 0.5),
        ("love", 0.5),
        ("loved", 0.7),
        ("wonderful", 1.0),
        ("excellent", 1.0),
        ("amazing", 0.6),
        ("awesome", 1.0),
        ("nice", 0.6),
        ("fine", 0.4),
        ("okay", 0.5),
        ("ok", 0.5),
        ("better", 0.5),
        ("best", 1.0),
        ("calm", 0.3),
        ("relaxed", 0.3),
        ("hopeful", 0.5),
        ("excited", 0.4),
        ("grateful", 0.6),
        ("thankful", 0.5),
        ("proud", 0.8),
        ("peaceful", 0.5),
        ("beautiful", 0.85),
        ("fun", 0.3),
        ("enjoy", 0.4),
        ("enjoyed", 0.4),
        ("confident", 0.5),
        ("safe", 0.5),
        ("thanks", 0.2),
        ("helpful", 0.5),
        ("joy", 0.8),
        ("cheerful", 0.6),
        ("positive", 0.2),
        // negative
        ("bad", -0.7),
        ("sad", -0.5),
        ("terrible", -1.0),
        ("awful", -1.0),
        ("horrible", -1.0),
        ("worst", -1.0),
        ("worse", -0.4),
        ("angry", -0.5),
        ("mad", -0.6),
        ("hate", -0.8),
        ("stressed", -0.4),
        ("stress", -0.3),
        ("anxious", -0.25),
        ("anxiety", -0.3),
        ("worried", -0.3),
        ("nervous", -0.3),
        ("afraid", -0.6),
        ("scared", -0.5),
        ("lonely", -0.5),
        ("alone", -0.3),
        ("depressed", -0.6),
        ("hopeless", -0.8),
        ("tired", -0.4),
        ("exhausted", -0.5),
        ("upset", -0.5),
        ("hurt", -0.4),
        ("hard", -0.3),
        ("difficult", -0.5),
        ("miserable", -1.0),
        ("cry", -0.4),
        ("crying", -0.4),
        ("pain", -0.5),
        ("overwhelmed", -0.5),
        ("frustrated", -0.6),
        ("annoyed", -0.4),
        ("boring", -1.0),
        ("sick", -0.7),
        ("lost", -0.2),
        ("negative", -0.3),
    ]
    .into_iter()
    .collect()
});

static INTENSIFIERS: Lazy<HashMap<&'static str, f32>> = Lazy::new(|| {
    [
        ("very", 1.3),
        ("really", 1.3),
        ("so", 1.3),
        ("extremely", 1.5),
        ("incredibly", 1.5),
        ("super", 1.4),
        ("too", 1.2),
        ("quite", 1.1),
        ("pretty", 1.1),
        ("slightly", 0.5),
        ("somewhat", 0.7),
        ("bit", 0.6),
    ]
    .into_iter()
    .collect()
});

const NEGATORS: &[&str] = &["not", "no", "never", "nothing", "neither", "nor", "hardly"];

/// Negated words keep half their magnitude with the opposite sign.
const NEGATION_FACTOR: f32 = -0.5;

/// How many tokens back a negator still applies.
const NEGATION_WINDOW: usize = 3;

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't") || token == "cannot"
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .filter(|t| !t.is_empty())
        .map(|t| t.replace('\u{2019}', "'").to_lowercase())
        .collect()
}

/// Default analyzer backed by a small built-in English lexicon.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SentimentAnalyzer for LexiconSentiment {
    #[allow(clippy::cast_precision_loss)]
    fn polarity(&self, text: &str) -> f32 {
        let tokens = tokenize(text);
        let mut scores = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = LEXICON.get(token.as_str()) else {
                continue;
            };

            let mut score = base;

            let intensifier = i
                .checked_sub(1)
                .and_then(|p| INTENSIFIERS.get(tokens[p].as_str()));
            if let Some(&factor) = intensifier {
                score *= factor;
            }

            let window_start = i.saturating_sub(NEGATION_WINDOW);
            if tokens[window_start..i].iter().any(|t| is_negator(t)) {
                score *= NEGATION_FACTOR;
            }

            scores.push(score.clamp(-1.0, 1.0));
        }

        if scores.is_empty() {
            return 0.0;
        }

        let mean = scores.iter().sum::<f32>() / scores.len() as f32;
        mean.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polarity(text: &str) -> f32 {
        LexiconSentiment::new().polarity(text)
    }

    #[test]
    fn neutral_and_empty_text_score_zero() {
        assert!(polarity("").abs() < f32::EPSILON);
        assert!(polarity("I went to the library today").abs() < f32::EPSILON);
    }

    #[test]
    fn positive_and_negative_words() {
        assert!(polarity("I feel happy today") > 0.0);
        assert!(polarity("I'm stressed about finals") < 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        assert!(polarity("I am not happy") < 0.0);
        assert!(polarity("I don't feel bad") > 0.0);
    }

    #[test]
    fn intensifier_strengthens_score() {
        assert!(polarity("very good") > polarity("good"));
        assert!(polarity("slightly sad") > polarity("sad"));
    }

    #[test]
    fn score_stays_within_bounds() {
        let score = polarity("extremely wonderful amazing awesome best");
        assert!(score <= 1.0);
        let score = polarity("extremely terrible awful horrible worst");
        assert!(score >= -1.0);
    }

    #[test]
    fn curly_apostrophes_are_normalised() {
        assert!(polarity("I don\u{2019}t feel good") < 0.0);
    }
}
