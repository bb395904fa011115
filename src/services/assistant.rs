use crate::error::Result;
use crate::models::{ChatResponse, ConversationHistory};
use crate::services::intent::{extract_intent_and_preferences, should_recommend_music, Intent};
use crate::services::openai::{build_messages, ChatModel};
use crate::services::recommender::Recommender;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs one chat turn: a model reply, then at most one catalog lookup.
pub struct ChatAssistant {
    chat_model: Arc<dyn ChatModel>,
    recommender: Arc<Recommender>,
}

impl ChatAssistant {
    pub fn new(chat_model: Arc<dyn ChatModel>, recommender: Arc<Recommender>) -> Self {
        Self {
            chat_model,
            recommender,
        }
    }

    pub async fn handle_turn(&self, user_input: &str, history: Vec<String>) -> Result<ChatResponse> {
        let conversation = ConversationHistory::from_turn(history, user_input);
        debug!("Handling chat turn with {} messages in window", conversation.len());

        let reply = self
            .chat_model
            .complete(&build_messages(&conversation))
            .await?;

        // An explicit request searches for the named preference; a model offer
        // falls back to the conversation's mood and genre.
        let (intent, preferences) = extract_intent_and_preferences(&conversation);
        let preferences = match intent {
            Intent::MusicRecommendation => preferences,
            Intent::GeneralConversation if should_recommend_music(&conversation, &reply) => None,
            Intent::GeneralConversation => return Ok(ChatResponse::reply_only(reply)),
        };

        info!(?intent, preferences = ?preferences, "Recommending music");
        let recommendation = self
            .recommender
            .recommend_music(&conversation, preferences.as_deref())
            .await?;

        Ok(ChatResponse::with_recommendation(reply, recommendation))
    }
}
