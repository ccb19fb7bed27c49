pub mod chat_completions;
pub mod completions;
pub mod embeddings;
pub mod health;
pub mod images;
pub mod models;
