//! Presentation aggregates computed over fetched collections.
//!
//! Every function borrows its input and returns freshly built values;
//! callers keep the collection they fetched untouched.

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    hash::Hash,
};

use chrono::{DateTime, Utc};

use crate::models::{normalize_author, Game, Review};

/// Number of entries shown in the stats rankings.
pub const RANKING_SIZE: usize = 5;

/// Label used for the favourite genre of an empty library.
pub const NO_GENRE: &str = "N/A";

/// Records that can be ranked by rating and recency.
pub trait Entry {
    /// Rating used for ranking; missing ratings rank as 0.
    fn rating(&self) -> Option<f64>;
    /// Timestamp used for recency; missing timestamps rank earliest.
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

impl Entry for Game {
    fn rating(&self) -> Option<f64> {
        self.rating
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Entry for Review {
    fn rating(&self) -> Option<f64> {
        self.rating
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Review::timestamp(self)
    }
}

/// Ordering modes offered by list pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Server order.
    #[default]
    All,
    /// Highest rating first.
    TopRated,
    /// Newest first.
    MostRecent,
}

impl FilterMode {
    /// Short label for tabs and status lines.
    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::TopRated => "Top rated",
            FilterMode::MostRecent => "Most recent",
        }
    }
}

/// Mean of `field` over `items`, with missing values counted as 0.
///
/// An empty collection averages to 0.
pub fn average<T>(items: &[T], field: impl Fn(&T) -> Option<f64>) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let total: f64 = items.iter().map(|item| field(item).unwrap_or(0.0)).sum();
    total / items.len() as f64
}

/// Occurrence count per key, ordered by the first time each key was seen.
pub fn group_count<T, K>(items: &[T], key: impl Fn(&T) -> K) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for item in items {
        let key = key(item);
        match index.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts
}

/// The `n` greatest items by `compare`, greatest first.
///
/// Ties keep their original relative order.
pub fn top_n<T: Clone>(n: usize, items: &[T], compare: impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    let mut ranked = items.to_vec();
    ranked.sort_by(|a, b| compare(b, a));
    ranked.truncate(n);
    ranked
}

/// Rating comparator treating missing ratings as 0.
pub fn by_rating<T: Entry>(a: &T, b: &T) -> Ordering {
    a.rating()
        .unwrap_or(0.0)
        .total_cmp(&b.rating().unwrap_or(0.0))
}

/// Recency comparator treating missing timestamps as the earliest instant.
pub fn by_timestamp<T: Entry>(a: &T, b: &T) -> Ordering {
    a.timestamp().cmp(&b.timestamp())
}

/// Copy of `items` ordered for the given mode.
pub fn filter_sort<T: Entry + Clone>(mode: FilterMode, items: &[T]) -> Vec<T> {
    match mode {
        FilterMode::All => items.to_vec(),
        FilterMode::TopRated => top_n(items.len(), items, by_rating),
        FilterMode::MostRecent => top_n(items.len(), items, by_timestamp),
    }
}

/// Number of distinct reviewers, with all anonymous reviews counted once.
pub fn distinct_author_count(reviews: &[Review]) -> usize {
    reviews
        .iter()
        .map(|review| normalize_author(review.author.as_deref()))
        .collect::<HashSet<_>>()
        .len()
}

/// Percentage share of `count` in `total`, 0 when `total` is 0.
pub fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 * 100.0 / total as f64
}

/// Figures shown on the statistics page.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStats {
    /// Games in the library.
    pub total_games: usize,
    /// Reviews across all games.
    pub total_reviews: usize,
    /// Mean headline rating of the library.
    pub average_rating: f64,
    /// Most frequent genre, first seen wins ties.
    pub favourite_genre: String,
    /// Genre histogram in first-seen order.
    pub genres: Vec<(String, usize)>,
    /// Platform histogram in first-seen order.
    pub platforms: Vec<(String, usize)>,
    /// Best rated games, unrated ones excluded.
    pub top_rated: Vec<Game>,
    /// Most recently added games.
    pub recent: Vec<Game>,
}

impl GameStats {
    /// Derive the statistics page figures.
    pub fn from_games_and_reviews(games: &[Game], reviews: &[Review]) -> Self {
        let genres = group_count(games, |game| game.genre.clone());
        let platforms = group_count(games, |game| game.platform.clone());
        let favourite_genre = top_n(1, &genres, |a, b| a.1.cmp(&b.1))
            .into_iter()
            .next()
            .map(|(genre, _)| genre)
            .unwrap_or_else(|| NO_GENRE.to_string());

        let rated: Vec<Game> = games
            .iter()
            .filter(|game| game.rating.unwrap_or(0.0) > 0.0)
            .cloned()
            .collect();

        Self {
            total_games: games.len(),
            total_reviews: reviews.len(),
            average_rating: average(games, |game| game.rating),
            favourite_genre,
            genres,
            platforms,
            top_rated: top_n(RANKING_SIZE, &rated, by_rating),
            recent: top_n(RANKING_SIZE, games, by_timestamp),
        }
    }
}

/// Header figures of the reviews page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewStats {
    /// Number of reviews.
    pub total: usize,
    /// Mean star rating, 0 when there are none.
    pub average_rating: f64,
    /// Distinct reviewers, anonymous ones counted once.
    pub players: usize,
}

impl ReviewStats {
    /// Derive the header figures from a review listing.
    pub fn from_reviews(reviews: &[Review]) -> Self {
        Self {
            total: reviews.len(),
            average_rating: average(reviews, |review| review.rating),
            players: distinct_author_count(reviews),
        }
    }
}
