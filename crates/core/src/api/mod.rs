//! HTTP access to the catalog API.

/// Typed client for the game and review resources.
pub mod client;
/// Normalization of list response shapes.
pub mod listing;

pub use client::ApiClient;
pub use listing::Listing;
