pub mod cache;
pub mod config;
pub mod edits;
pub mod get;
pub mod many;
pub mod search;

pub use cache::handle_cache_command;
pub use config::handle_config_command;
pub use edits::run_edits_command;
pub use get::{run_get_command, PageView};
pub use many::{run_get_many_command, run_search_many_command};
pub use search::run_search_command;
