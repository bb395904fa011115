pub mod chat;
pub mod conversation;
pub mod track;

pub use chat::{ChatForm, ChatResponse, Recommendation};
pub use conversation::{ChatMessage, ConversationHistory, Role};
pub use track::{SongInfo, Track};
