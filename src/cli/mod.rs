pub mod args;
pub mod commands;
pub mod root;
pub mod ui;

pub use args::{Args, CacheAction, Commands};
pub use root::{build_client, RootCommand};
