//! Command handlers

pub mod config;
pub mod migrate;
pub mod project;
pub mod status;
pub mod watch;
