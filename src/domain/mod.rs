//! Core domain types and logic.

pub mod analysis;
pub mod assistant;
pub mod bar;
pub mod command;
pub mod command_parser;
pub mod config_validation;
pub mod coordinates;
pub mod error;
pub mod history;
pub mod overlay;
pub mod overlay_manager;
pub mod preferences;
pub mod session;
pub mod settings;
pub mod symbol_change;
