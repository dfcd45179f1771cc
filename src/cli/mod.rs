mod commands;
mod handlers;

pub use commands::{Cli, Commands, ConfigAction, ConfigCommand};
pub use handlers::{handle_config_path, handle_config_set, handle_config_show, handle_sync};
