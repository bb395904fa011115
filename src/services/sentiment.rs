use serde::{Deserialize, Serialize};
use std::fmt;

/// Compound scores at or beyond this magnitude are polar.
pub const POLARITY_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn from_compound(score: f64) -> Self {
        if score >= POLARITY_THRESHOLD {
            Sentiment::Positive
        } else if score <= -POLARITY_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Catalog query token used to bias a search towards this mood.
    pub fn mood_query(&self) -> &'static str {
        match self {
            Sentiment::Positive => "mood:happy",
            Sentiment::Negative => "mood:sad",
            Sentiment::Neutral => "mood:neutral",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces a compound polarity score in `[-1.0, 1.0]` for a span of text.
pub trait SentimentScorer: Send + Sync {
    fn compound(&self, text: &str) -> f64;
}

/// Lexicon scorer backed by VADER.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaderScorer;

impl SentimentScorer for VaderScorer {
    fn compound(&self, text: &str) -> f64 {
        let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
        analyzer
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }
}

pub fn analyze_sentiment(scorer: &dyn SentimentScorer, text: &str) -> Sentiment {
    let score = scorer.compound(text);
    let sentiment = Sentiment::from_compound(score);
    tracing::debug!(score, %sentiment, "Scored conversation sentiment");
    sentiment
}
