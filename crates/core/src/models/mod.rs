//! Shared domain models.
//!
//! Field names follow the catalog API's camelCase JSON; identifiers
//! arrive as `_id` and are accepted as `id` as well.

mod lenient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author label used when a review carries no usable name.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// A catalogued video game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Opaque server identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Title.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Free-form genre label.
    #[serde(default, deserialize_with = "lenient::text")]
    pub genre: String,
    /// Free-form platform label.
    #[serde(default, deserialize_with = "lenient::text")]
    pub platform: String,
    /// Year of release.
    #[serde(default, deserialize_with = "lenient::optional_year")]
    pub release_year: Option<i32>,
    /// Absolute URL or a filename under the static assets path.
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub image_url: Option<String>,
    /// Headline score in `0..=5`, independent of review ratings.
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub rating: Option<f64>,
    /// Optional blurb.
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub description: Option<String>,
    /// When the server stored the record.
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Returns a user-facing label combining name, platform and year.
    pub fn display_name(&self) -> String {
        match (self.platform.trim(), self.release_year) {
            ("", None) => self.name.clone(),
            ("", Some(year)) => format!("{} ({year})", self.name),
            (platform, None) => format!("{} · {platform}", self.name),
            (platform, Some(year)) => format!("{} · {platform} ({year})", self.name),
        }
    }
}

/// Reference from a review to its game.
///
/// The reviews listing may populate the reference with the game's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameRef {
    /// Bare identifier.
    Id(String),
    /// Populated summary of the game.
    Populated(GameSummary),
}

impl GameRef {
    /// Identifier of the referenced game.
    pub fn id(&self) -> &str {
        match self {
            GameRef::Id(id) => id,
            GameRef::Populated(summary) => &summary.id,
        }
    }

    /// Name of the referenced game, when populated.
    pub fn name(&self) -> Option<&str> {
        match self {
            GameRef::Id(_) => None,
            GameRef::Populated(summary) => Some(summary.name.as_str()).filter(|s| !s.is_empty()),
        }
    }
}

/// Minimal game projection embedded in populated review listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Identifier of the game.
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    /// Title of the game.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
}

/// A player's review of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Opaque server identifier.
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    /// Reviewed game.
    #[serde(default)]
    pub game_id: Option<GameRef>,
    /// Display name of the reviewer, possibly blank.
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub author: Option<String>,
    /// Emoji avatar chosen when the review was written.
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub avatar: Option<String>,
    /// Star rating in `1..=5`.
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub rating: Option<f64>,
    /// Review body; older records store it as `comment`.
    #[serde(default, alias = "comment", deserialize_with = "lenient::optional_text")]
    pub text: Option<String>,
    /// Perceived difficulty in `1..=10`.
    #[serde(default, deserialize_with = "lenient::optional_step")]
    pub difficulty: Option<u8>,
    /// Completion percentage.
    #[serde(default, deserialize_with = "lenient::optional_step")]
    pub progress: Option<u8>,
    /// Client supplied date of writing.
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub date: Option<DateTime<Utc>>,
    /// Server creation timestamp.
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Author name with blanks collapsed to [`ANONYMOUS_AUTHOR`].
    pub fn author_name(&self) -> &str {
        normalize_author(self.author.as_deref())
    }

    /// Body text, or a placeholder when the review has none.
    pub fn display_text(&self) -> &str {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or("No comment")
    }

    /// Date shown and sorted on: the written date, else the server timestamp.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date.or(self.created_at)
    }

    /// Label for the reviewed game in flattened listings.
    pub fn game_label(&self) -> Option<&str> {
        self.game_id
            .as_ref()
            .map(|game| game.name().unwrap_or("Game"))
    }
}

/// Collapse a missing or blank author into the shared sentinel.
pub fn normalize_author(author: Option<&str>) -> &str {
    author
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_AUTHOR)
}

/// Body of `POST /games` and `PUT /games/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub(crate) name: String,
    pub(crate) genre: String,
    pub(crate) platform: String,
    pub(crate) release_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
}

impl NewGame {
    /// Trimmed game name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validated release year.
    pub fn release_year(&self) -> i32 {
        self.release_year
    }
}

/// Body of `POST /reviews/{gameId}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReview {
    pub(crate) text: String,
    pub(crate) rating: u8,
    pub(crate) author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) avatar: Option<String>,
    pub(crate) difficulty: u8,
    pub(crate) progress: u8,
    pub(crate) date: DateTime<Utc>,
}

impl NewReview {
    /// Trimmed author name.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Star rating.
    pub fn rating(&self) -> u8 {
        self.rating
    }
}

/// Severity tag of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Confirmation of a completed action.
    #[default]
    Success,
    /// A failed action.
    Error,
}
