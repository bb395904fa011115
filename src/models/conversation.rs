use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of messages kept in a conversation window.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Bounded recency buffer of message strings, rebuilt from the client on
/// every request. Pushing beyond capacity evicts the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationHistory {
    messages: VecDeque<String>,
    capacity: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_LIMIT)
    }
}

impl ConversationHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Client-submitted history followed by the new user turn.
    pub fn from_turn<I, S>(history: I, user_input: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut conversation = Self::default();
        conversation.extend(history);
        conversation.push(user_input);
        conversation
    }

    pub fn push(&mut self, message: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message.into());
    }

    pub fn extend<I, S>(&mut self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for message in messages {
            self.push(message);
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// All messages joined by single spaces, oldest first.
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }

    /// Role-tagged view of the window. Roles alternate and are anchored on
    /// the newest entry, which is always the user's turn.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let len = self.messages.len();
        self.messages
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let role = if (len - 1 - i) % 2 == 0 {
                    Role::User
                } else {
                    Role::Assistant
                };
                ChatMessage::new(role, content.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_newest_ten() {
        let history: Vec<String> = (1..=12).map(|i| format!("m{}", i)).collect();
        let conversation = ConversationHistory::from_turn(history, "latest");

        assert_eq!(conversation.len(), HISTORY_LIMIT);
        let kept: Vec<&str> = conversation.iter().collect();
        assert_eq!(kept.first(), Some(&"m4"));
        assert_eq!(kept.last(), Some(&"latest"));
    }

    #[test]
    fn test_joined() {
        let conversation = ConversationHistory::from_turn(["hi", "hello there"], "play music");
        assert_eq!(conversation.joined(), "hi hello there play music");
    }

    #[test]
    fn test_roles_anchor_on_newest_user_turn() {
        let conversation = ConversationHistory::from_turn(["hey", "hi, how are you?"], "great");
        let roles: Vec<Role> = conversation.to_messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);

        // Even-length window after truncation still ends on the user
        let history: Vec<String> = (0..15).map(|i| i.to_string()).collect();
        let conversation = ConversationHistory::from_turn(history, "now");
        let messages = conversation.to_messages();
        assert_eq!(messages.len(), HISTORY_LIMIT);
        assert_eq!(messages[0].role, Role::Assistant);
        assert_eq!(messages.last().unwrap().role, Role::User);
        assert_eq!(messages.last().unwrap().content, "now");
    }

    #[test]
    fn test_zero_capacity() {
        let mut conversation = ConversationHistory::with_capacity(0);
        conversation.push("ignored");
        assert!(conversation.is_empty());
        assert!(conversation.to_messages().is_empty());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_value(ChatMessage::new(Role::Assistant, "ok")).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
