//! List renderer
//!
//! Renders a formatted list from a content tree, a relational query or a
//! remote XML feed into a single markup string.

pub mod api;
pub mod config;
pub mod db;
pub mod fields;
pub mod logic;
pub mod model;
pub mod renderer;
pub mod sources;
pub mod store;
pub mod template;
pub mod utils;

pub use config::{Parameters, RenderSettings, SettingsStore, YamlSettings};
pub use renderer::{Collaborators, RenderRequest, Renderer};
