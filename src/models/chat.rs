use crate::models::SongInfo;
use crate::services::sentiment::Sentiment;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Decoded body of `POST /chat`.
#[derive(Debug, Clone, Default, Validate, PartialEq)]
pub struct ChatForm {
    #[validate(length(min = 1, message = "user_input must not be empty"))]
    pub user_input: String,
    pub conversation_history: Vec<String>,
}

impl ChatForm {
    /// Collects form pairs. Repeated `conversation_history[]` (or bare
    /// `conversation_history`) fields keep their submission order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = ChatForm::default();
        for (key, value) in pairs {
            match key.as_ref() {
                "user_input" => form.user_input = value.into().trim().to_string(),
                "conversation_history[]" | "conversation_history" => {
                    form.conversation_history.push(value.into())
                }
                _ => {}
            }
        }
        form
    }

    pub fn from_urlencoded(body: &[u8]) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(body).into_owned())
    }
}

/// Formatted output of one catalog lookup.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub sentiment: Sentiment,
    pub query: String,
    pub context: String,
    pub text: String,
    pub preview_urls: Vec<Option<String>>,
    pub song_info: Vec<SongInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    pub recommendation_text: String,
    pub preview_urls: Vec<Option<String>>,
    pub song_info: Vec<SongInfo>,
}

impl ChatResponse {
    pub fn reply_only(reply: String) -> Self {
        ChatResponse {
            response: reply,
            ..Default::default()
        }
    }

    pub fn with_recommendation(reply: String, recommendation: Recommendation) -> Self {
        let response = format!(
            "{}\n\n{}\n{}",
            reply, recommendation.context, recommendation.text
        );
        ChatResponse {
            response,
            recommendation_text: recommendation.text,
            preview_urls: recommendation.preview_urls,
            song_info: recommendation.song_info,
        }
    }
}
