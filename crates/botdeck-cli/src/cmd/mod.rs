pub mod bot;
pub mod config;
pub mod list;
pub mod menu;
pub mod reload;
pub mod site;
