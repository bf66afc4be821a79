pub mod catalog;
pub mod classifier;
pub mod error;
pub mod history;
pub mod inventory;
pub mod io;
pub mod launch;
pub mod paths;
pub mod process;
pub mod settings;
pub mod site_config;
pub mod site_status;
pub mod timefmt;
pub mod types;
pub mod walker;
pub mod webserver;

pub use error::{BotdeckError, Result};
