pub mod chat;

pub use chat::{chat_routes, AppState};
