pub mod cli;
pub mod config;

// Re-export the client surface for convenience
pub use grokipedia_cache::FileCache;
pub use grokipedia_client::*;
