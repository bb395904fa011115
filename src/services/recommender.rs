use crate::error::Result;
use crate::models::{ConversationHistory, Recommendation, SongInfo, Track};
use crate::services::intent::extract_genre_from_conversation;
use crate::services::sentiment::{analyze_sentiment, Sentiment, SentimentScorer};
use crate::services::spotify::TrackCatalog;
use std::sync::Arc;
use tracing::info;

/// Turns the conversation's mood and genre into a short list of catalog
/// tracks.
pub struct Recommender {
    catalog: Arc<dyn TrackCatalog>,
    scorer: Arc<dyn SentimentScorer>,
    limit: usize,
}

/// Explicit preferences win outright; otherwise the mood token is combined
/// with whatever genre the conversation mentioned.
pub fn build_query(sentiment: Sentiment, preferences: Option<&str>, genre: &str) -> String {
    match preferences.map(str::trim).filter(|p| !p.is_empty()) {
        Some(preference) => preference.to_string(),
        None => format!("{} {}", sentiment.mood_query(), genre)
            .trim()
            .to_string(),
    }
}

pub fn recommendation_context(sentiment: Sentiment) -> String {
    format!(
        "Based on your current mood '{}' and the conversation context, here are some song recommendations:",
        sentiment
    )
}

pub fn format_tracks(tracks: &[Track]) -> String {
    tracks
        .iter()
        .enumerate()
        .map(|(idx, track)| format!("{}. {} by {}", idx + 1, track.title, track.artist))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Recommender {
    pub fn new(
        catalog: Arc<dyn TrackCatalog>,
        scorer: Arc<dyn SentimentScorer>,
        limit: usize,
    ) -> Self {
        Self {
            catalog,
            scorer,
            limit,
        }
    }

    pub async fn recommend_music(
        &self,
        history: &ConversationHistory,
        preferences: Option<&str>,
    ) -> Result<Recommendation> {
        let sentiment = analyze_sentiment(self.scorer.as_ref(), &history.joined());

        let preferences = preferences.map(str::trim).filter(|p| !p.is_empty());
        let genre = if preferences.is_some() {
            String::new()
        } else {
            extract_genre_from_conversation(history)
        };
        let query = build_query(sentiment, preferences, &genre);

        info!(%query, %sentiment, limit = self.limit, "Requesting recommendations");

        let tracks = self.catalog.search_tracks(&query, self.limit).await?;
        let tracks: Vec<Track> = tracks.into_iter().take(self.limit).collect();

        Ok(Recommendation {
            sentiment,
            context: recommendation_context(sentiment),
            text: format_tracks(&tracks),
            preview_urls: tracks.iter().map(|t| t.preview_url.clone()).collect(),
            song_info: tracks.iter().map(SongInfo::from).collect(),
            query,
        })
    }
}
