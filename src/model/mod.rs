pub mod geometry_adjuster;
pub mod panel_registry;
pub mod window_filter;
