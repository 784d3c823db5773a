//! Port traits implemented by adapters.

pub mod bar_port;
pub mod config_port;
pub mod llm_port;
pub mod preference_port;
pub mod surface_port;
pub mod widget_port;
