#![warn(clippy::all, missing_docs)]

//! Core domain logic for the GameStrike catalog client.
//!
//! This crate hosts the record models, the HTTP fetcher for the
//! catalog API, presentation aggregates, the toast queue, form
//! validation, and the configuration used by the terminal UI and any
//! future frontends.

pub mod aggregate;
pub mod api;
pub mod avatar;
pub mod config;
pub mod context;
pub mod error;
pub mod images;
pub mod models;
pub mod notify;
pub mod validate;

pub use api::{ApiClient, Listing};
pub use crate::config::AppConfig;
pub use context::AppContext;
pub use error::{ApiError, ConfigError, Field, ValidationError};
pub use models::{Game, GameRef, NewGame, NewReview, Review, Severity};
pub use notify::{Toast, ToastId, ToastQueue};
