pub mod assistant;
pub mod intent;
pub mod openai;
pub mod recommender;
pub mod sentiment;
pub mod spotify;

#[cfg(test)]
mod test_support;

pub use assistant::ChatAssistant;
pub use openai::OpenAiClient;
pub use recommender::Recommender;
pub use sentiment::VaderScorer;
pub use spotify::SpotifyClient;
