//! Concrete adapter implementations for ports.

#[cfg(feature = "http")]
pub mod anthropic_adapter;
pub mod csv_adapter;
pub mod csv_preference_adapter;
pub mod file_config_adapter;
pub mod headless_widget;
#[cfg(feature = "http")]
pub mod http_bar_adapter;
pub mod svg_surface;
