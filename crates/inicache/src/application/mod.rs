//! Application layer: the configuration store and its instance registry.

pub mod registry;
pub mod settings;
