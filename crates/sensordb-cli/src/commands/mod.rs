//! Command implementations for the CLI.

mod config;
mod history;
mod info;
mod ingest;
mod latest;
mod log;

pub use config::cmd_config;
pub use history::{HistoryArgs, cmd_history};
pub use info::cmd_info;
pub use ingest::cmd_ingest;
pub use latest::cmd_latest;
pub use log::cmd_log;
