use crate::classify::tokenize;

/// Polarity capability used by the signal scorer.
///
/// Implementations return `Some(p)` with `p` in [-1, 1], or `None` when the text
/// has nothing to score (blank, punctuation only, ...).
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Option<f64>;
}

const POSITIVE: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "fun", "love", "loved", "enjoy",
    "enjoyed", "helpful", "friendly", "fantastic", "best", "nice", "engaging", "interesting",
    "welcoming", "organized", "useful", "active", "inspiring", "happy", "wonderful", "cool",
];

const NEGATIVE: &[&str] = &[
    "bad", "poor", "boring", "terrible", "awful", "worst", "hate", "disorganized", "useless",
    "rude", "dull", "inactive", "unhelpful", "waste", "late", "chaotic", "disappointing",
    "cancelled", "confusing", "never", "unfriendly", "lame", "slow",
];

const NEGATORS: &[&str] = &[
    "not", "no", "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "cant",
    "wont", "hardly", "nothing",
];

/// Word-list polarity: `(positive - negative) / (positive + negative)` over lexicon hits.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconScorer;

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> Option<f64> {
        // Contractions stay one token: "wasn't" reads as "wasnt".
        let tokens = tokenize(&text.replace(['\'', '\u{2019}'], ""));
        if tokens.is_empty() {
            return None;
        }

        let mut positive = 0u32;
        let mut negative = 0u32;
        let mut negate = false;

        for token in &tokens {
            let word = token.as_str();
            if NEGATORS.contains(&word) {
                negate = true;
                continue;
            }
            let polarity = if POSITIVE.contains(&word) {
                1
            } else if NEGATIVE.contains(&word) {
                -1
            } else {
                0
            };
            let polarity = if negate { -polarity } else { polarity };
            match polarity {
                1 => positive += 1,
                -1 => negative += 1,
                _ => {}
            }
            negate = false;
        }

        let hits = positive + negative;
        if hits == 0 {
            return Some(0.0);
        }
        Some((f64::from(positive) - f64::from(negative)) / f64::from(hits))
    }
}
