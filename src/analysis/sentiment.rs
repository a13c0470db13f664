//! Sentiment classification policy.
//!
//! A [`PolarityScorer`] assigns free text a polarity in `[-1, 1]`; the
//! policy in [`Sentiment::from_polarity`] turns that score into a
//! category. A scorer failure counts as neutral polarity.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Polarity above this is positive, below its negation negative.
pub const POLARITY_THRESHOLD: f64 = 0.1;

/// Sentiment category of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Neutral => write!(f, "Neutral"),
            Sentiment::Negative => write!(f, "Negative"),
        }
    }
}

impl Sentiment {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > POLARITY_THRESHOLD {
            Sentiment::Positive
        } else if polarity < -POLARITY_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("text contains {0} undecodable character(s)")]
    Undecodable(usize),
}

/// Something that can score the polarity of a text.
pub trait PolarityScorer {
    fn polarity(&self, text: &str) -> Result<f64, ScoringError>;
}

/// Classify a text, treating scorer failures as neutral.
pub fn classify(scorer: &dyn PolarityScorer, text: &str) -> Sentiment {
    let polarity = scorer.polarity(text).unwrap_or_else(|e| {
        debug!("Sentiment scoring failed, assuming neutral: {}", e);
        0.0
    });
    Sentiment::from_polarity(polarity)
}

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't", "can't",
    "cannot", "won't", "shouldn't",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("super", 1.3),
    ("so", 1.2),
    ("quite", 1.1),
    ("slightly", 0.5),
    ("somewhat", 0.7),
];

const LEXICON: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("appreciate", 0.5),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("clean", 0.37),
    ("cool", 0.35),
    ("correct", 0.3),
    ("easy", 0.43),
    ("excellent", 1.0),
    ("fantastic", 0.4),
    ("fast", 0.2),
    ("fine", 0.42),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("helpful", 0.5),
    ("love", 0.5),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("pleased", 0.5),
    ("smooth", 0.4),
    ("stable", 0.3),
    ("thanks", 0.2),
    ("useful", 0.3),
    ("welcome", 0.8),
    ("wonderful", 1.0),
    ("works", 0.2),
    ("annoying", -0.8),
    ("awful", -1.0),
    ("bad", -0.7),
    ("broken", -0.4),
    ("confusing", -0.3),
    ("difficult", -0.5),
    ("disappointed", -0.75),
    ("frustrating", -0.4),
    ("hard", -0.29),
    ("horrible", -1.0),
    ("impossible", -0.67),
    ("incorrect", -0.5),
    ("inconsistent", -0.4),
    ("poor", -0.4),
    ("sad", -0.5),
    ("slow", -0.3),
    ("stupid", -0.8),
    ("terrible", -1.0),
    ("ugly", -0.7),
    ("unable", -0.5),
    ("unclear", -0.3),
    ("unexpected", -0.1),
    ("unfortunately", -0.5),
    ("unusable", -0.7),
    ("useless", -0.5),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

/// Word-level lexicon scorer.
///
/// Polarity is the mean score of the lexicon words found in the text. A
/// negation directly before a word flips and halves its score; an
/// intensifier directly before scales it. Text with no lexicon words
/// scores 0.0. Text carrying U+FFFD replacement characters came from a
/// lossy decode and is refused.
pub struct LexiconScorer {
    lexicon: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> Result<f64, ScoringError> {
        let replaced = text.chars().filter(|&c| c == char::REPLACEMENT_CHARACTER).count();
        if replaced > 0 {
            return Err(ScoringError::Undecodable(replaced));
        }

        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .collect();

        let mut scores = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.lexicon.get(token) else {
                continue;
            };

            let mut score = base;
            let mut back = i;
            // Look back over at most one intensifier, then one negation.
            if back > 0 {
                if let Some(&factor) = self.intensifiers.get(tokens[back - 1]) {
                    score *= factor;
                    back -= 1;
                }
            }
            if back > 0 && NEGATIONS.contains(&tokens[back - 1]) {
                score *= -0.5;
            }

            scores.push(score.clamp(-1.0, 1.0));
        }

        if scores.is_empty() {
            return Ok(0.0);
        }
        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingScorer;

    impl PolarityScorer for FailingScorer {
        fn polarity(&self, _text: &str) -> Result<f64, ScoringError> {
            Err(ScoringError::Undecodable(1))
        }
    }

    #[test]
    fn test_threshold_policy() {
        assert_eq!(Sentiment::from_polarity(0.5), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(-0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(-0.11), Sentiment::Negative);
    }

    #[test]
    fn test_simple_sentences() {
        let scorer = LexiconScorer::default();
        assert_eq!(classify(&scorer, "I am happy"), Sentiment::Positive);
        assert_eq!(classify(&scorer, "I am sad"), Sentiment::Negative);
        assert_eq!(classify(&scorer, "I am neutral"), Sentiment::Neutral);
        assert_eq!(classify(&scorer, ""), Sentiment::Neutral);
    }

    #[test]
    fn test_negation_and_intensifier() {
        let scorer = LexiconScorer::default();
        assert_eq!(scorer.polarity("not good").unwrap(), -0.35);
        assert!((scorer.polarity("very good").unwrap() - 0.91).abs() < 1e-9);
        assert_eq!(classify(&scorer, "this is not bad"), Sentiment::Positive);
        assert_eq!(scorer.polarity("best best best").unwrap(), 1.0);
    }

    #[test]
    fn test_indirect_phrasing_is_scored_word_by_word() {
        // "the opposite of sad" only sees "sad"; phrase-level meaning is out of reach.
        let scorer = LexiconScorer::default();
        let polarity = scorer.polarity("I am the opposite of sad").unwrap();
        assert!((-1.0..=1.0).contains(&polarity));
    }

    #[test]
    fn test_scorer_failure_is_neutral() {
        assert_eq!(classify(&FailingScorer, "I am happy"), Sentiment::Neutral);
    }

    #[test]
    fn test_lossy_text_is_refused() {
        let scorer = LexiconScorer::default();
        let text = String::from_utf8_lossy(b"great \xff\xfe work").into_owned();
        assert!(matches!(
            scorer.polarity(&text),
            Err(ScoringError::Undecodable(2))
        ));
        assert_eq!(classify(&scorer, &text), Sentiment::Neutral);
    }
}
