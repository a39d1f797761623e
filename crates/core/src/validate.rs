//! Form checks run before any request is sent.

use chrono::{DateTime, Datelike, Local, Utc};

use crate::{
    avatar,
    error::{Field, ValidationError},
    models::{NewGame, NewReview},
};

/// Oldest accepted release year.
pub const MIN_RELEASE_YEAR: i32 = 1950;
/// Highest star rating.
pub const MAX_RATING: u8 = 5;
/// Slider range for review difficulty.
pub const DIFFICULTY_RANGE: std::ops::RangeInclusive<u8> = 1..=10;
/// Slider range for review progress.
pub const PROGRESS_RANGE: std::ops::RangeInclusive<u8> = 0..=100;

/// Raw input of the add/edit game form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameForm {
    /// Title, required.
    pub name: String,
    /// Genre label, required.
    pub genre: String,
    /// Platform label, required.
    pub platform: String,
    /// Release year as typed.
    pub release_year: String,
    /// Cover URL or asset filename; blank for none.
    pub image_url: String,
    /// Score in `0..=5` as typed; blank means 0.
    pub rating: String,
    /// Optional blurb.
    pub description: String,
}

impl GameForm {
    /// Prefill the form from an existing record for editing.
    pub fn from_game(game: &crate::models::Game) -> Self {
        Self {
            name: game.name.clone(),
            genre: game.genre.clone(),
            platform: game.platform.clone(),
            release_year: game
                .release_year
                .map(|year| year.to_string())
                .unwrap_or_default(),
            image_url: game.image_url.clone().unwrap_or_default(),
            rating: game.rating.map(|r| r.to_string()).unwrap_or_default(),
            description: game.description.clone().unwrap_or_default(),
        }
    }
}

/// Raw input of the review form.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewForm {
    /// Reviewer name, required.
    pub author: String,
    /// Review body, required.
    pub text: String,
    /// Stars picked; 0 until the user chooses.
    pub rating: u8,
    /// Difficulty slider, see [`DIFFICULTY_RANGE`].
    pub difficulty: u8,
    /// Progress slider, see [`PROGRESS_RANGE`].
    pub progress: u8,
    /// Emoji avatar from the palette.
    pub avatar: String,
}

impl ReviewForm {
    /// Empty form with slider defaults and a random avatar.
    pub fn new() -> Self {
        Self {
            author: String::new(),
            text: String::new(),
            rating: 0,
            difficulty: *DIFFICULTY_RANGE.start(),
            progress: *PROGRESS_RANGE.start(),
            avatar: avatar::random().to_string(),
        }
    }

    /// Move the star rating by `delta`, staying within `0..=5`.
    pub fn adjust_rating(&mut self, delta: i16) {
        self.rating = step(self.rating, delta, 0, MAX_RATING);
    }

    /// Move the difficulty slider by `delta`.
    pub fn adjust_difficulty(&mut self, delta: i16) {
        self.difficulty = step(
            self.difficulty,
            delta,
            *DIFFICULTY_RANGE.start(),
            *DIFFICULTY_RANGE.end(),
        );
    }

    /// Move the progress slider by `delta`.
    pub fn adjust_progress(&mut self, delta: i16) {
        self.progress = step(
            self.progress,
            delta,
            *PROGRESS_RANGE.start(),
            *PROGRESS_RANGE.end(),
        );
    }
}

impl Default for ReviewForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole-number year; integral decimals such as `2019.0` are accepted.
fn parse_year(raw: &str) -> Option<i32> {
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|year| year.is_finite() && year.fract() == 0.0)
        .filter(|year| (i32::MIN as f64..=i32::MAX as f64).contains(year))
        .map(|year| year as i32)
}

fn step(value: u8, delta: i16, min: u8, max: u8) -> u8 {
    (value as i16 + delta).clamp(min as i16, max as i16) as u8
}

/// Latest accepted release year for the given current year.
pub fn max_release_year(current_year: i32) -> i32 {
    current_year + 1
}

/// Check a game form against the calendar year `current_year`.
///
/// Constraints are checked as name, genre, platform, release year, then
/// rating; the first failure is reported.
pub fn validate_game(form: &GameForm, current_year: i32) -> Result<NewGame, ValidationError> {
    let name = required(&form.name, Field::Name, "Game name is required")?;
    let genre = required(&form.genre, Field::Genre, "Genre is required")?;
    let platform = required(&form.platform, Field::Platform, "Platform is required")?;

    let max_year = max_release_year(current_year);
    let out_of_range = || {
        ValidationError::new(
            Field::ReleaseYear,
            format!("Release year must be between {MIN_RELEASE_YEAR} and {max_year}"),
        )
    };
    let year_input = form.release_year.trim();
    if year_input.is_empty() {
        return Err(out_of_range());
    }
    let release_year = parse_year(year_input).ok_or_else(|| {
        ValidationError::new(Field::ReleaseYear, "Release year must be a whole number")
    })?;
    if !(MIN_RELEASE_YEAR..=max_year).contains(&release_year) {
        return Err(out_of_range());
    }

    let rating = match form.rating.trim() {
        "" => 0.0,
        raw => raw
            .parse::<f64>()
            .ok()
            .filter(|value| (0.0..=MAX_RATING as f64).contains(value))
            .ok_or_else(|| {
                ValidationError::new(Field::Rating, "Rating must be between 0 and 5")
            })?,
    };

    Ok(NewGame {
        name,
        genre,
        platform,
        release_year,
        image_url: optional(&form.image_url),
        rating: Some(rating),
        description: optional(&form.description),
    })
}

/// [`validate_game`] against the local calendar year.
pub fn validate_game_now(form: &GameForm) -> Result<NewGame, ValidationError> {
    validate_game(form, Local::now().year())
}

/// Check a review form; `written_at` becomes the review date.
///
/// Constraints are checked as author, text, then rating.
pub fn validate_review(
    form: &ReviewForm,
    written_at: DateTime<Utc>,
) -> Result<NewReview, ValidationError> {
    let author = required(&form.author, Field::Author, "Please enter your name")?;
    let text = required(&form.text, Field::Text, "Please write your review")?;
    if form.rating == 0 || form.rating > MAX_RATING {
        return Err(ValidationError::new(
            Field::Rating,
            "Please rate the game with 1 to 5 stars",
        ));
    }

    Ok(NewReview {
        text,
        rating: form.rating,
        author,
        avatar: optional(&form.avatar),
        difficulty: form.difficulty,
        progress: form.progress,
        date: written_at,
    })
}

fn required(value: &str, field: Field, reason: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, reason));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &str) -> Option<String> {
    Some(value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2026;

    fn form() -> GameForm {
        GameForm {
            name: " Outer Wilds ".to_string(),
            genre: "Adventure".to_string(),
            platform: "PC".to_string(),
            release_year: "2019".to_string(),
            ..GameForm::default()
        }
    }

    #[test]
    fn accepts_valid_game_and_trims() {
        let game = validate_game(&form(), YEAR).expect("valid form");
        assert_eq!(game.name(), "Outer Wilds");
        assert_eq!(game.release_year(), 2019);
        assert_eq!(game.image_url, None);
        assert_eq!(game.rating, Some(0.0));
    }

    #[test]
    fn release_year_bounds() {
        let mut too_old = form();
        too_old.release_year = "1800".to_string();
        let err = validate_game(&too_old, YEAR).unwrap_err();
        assert_eq!(err.field, Field::ReleaseYear);

        let mut too_new = form();
        too_new.release_year = (YEAR + 5).to_string();
        assert_eq!(
            validate_game(&too_new, YEAR).unwrap_err().field,
            Field::ReleaseYear
        );

        let mut this_year = form();
        this_year.release_year = YEAR.to_string();
        assert!(validate_game(&this_year, YEAR).is_ok());

        let mut next_year = form();
        next_year.release_year = (YEAR + 1).to_string();
        assert!(validate_game(&next_year, YEAR).is_ok());

        let mut garbage = form();
        garbage.release_year = "soon".to_string();
        let err = validate_game(&garbage, YEAR).unwrap_err();
        assert_eq!(err.reason, "Release year must be a whole number");
    }

    #[test]
    fn integral_decimal_years_are_whole_numbers() {
        let mut decimal = form();
        decimal.release_year = "2019.0".to_string();
        assert_eq!(validate_game(&decimal, YEAR).map(|game| game.release_year()), Ok(2019));

        let mut fractional = form();
        fractional.release_year = "2019.5".to_string();
        let err = validate_game(&fractional, YEAR).unwrap_err();
        assert_eq!(err.reason, "Release year must be a whole number");
    }

    #[test]
    fn reports_first_missing_field() {
        let empty = GameForm::default();
        assert_eq!(validate_game(&empty, YEAR).unwrap_err().field, Field::Name);

        let mut no_platform = form();
        no_platform.genre = "  ".to_string();
        no_platform.platform.clear();
        assert_eq!(
            validate_game(&no_platform, YEAR).unwrap_err().field,
            Field::Genre
        );

        let mut bad_rating = form();
        bad_rating.rating = "7".to_string();
        assert_eq!(
            validate_game(&bad_rating, YEAR).unwrap_err().field,
            Field::Rating
        );
    }

    #[test]
    fn review_requires_author_text_and_stars() {
        let now = Utc::now();
        let mut review = ReviewForm::new();
        review.text = "Loved it".to_string();
        review.rating = 4;
        assert_eq!(
            validate_review(&review, now).unwrap_err().field,
            Field::Author
        );

        review.author = "Kai".to_string();
        review.rating = 0;
        assert_eq!(
            validate_review(&review, now).unwrap_err().field,
            Field::Rating
        );

        review.rating = 5;
        let payload = validate_review(&review, now).expect("valid review");
        assert_eq!(payload.author(), "Kai");
        assert_eq!(payload.difficulty, 1);
        assert_eq!(payload.progress, 0);
        assert_eq!(payload.date, now);
        assert!(payload.avatar.is_some());
    }

    #[test]
    fn sliders_stay_in_range() {
        let mut review = ReviewForm::new();
        review.adjust_difficulty(-3);
        assert_eq!(review.difficulty, 1);
        review.adjust_difficulty(20);
        assert_eq!(review.difficulty, 10);
        review.adjust_progress(150);
        assert_eq!(review.progress, 100);
        review.adjust_rating(9);
        assert_eq!(review.rating, 5);
    }
}
