//! HTTP request handlers.

pub mod cloud_texture;
pub mod flattened;
pub mod health;

/// Treat an empty query value as absent.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
