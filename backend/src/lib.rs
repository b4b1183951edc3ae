pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod lobby;
pub mod relay;
pub mod ws;
