//! Emoji avatars attached to reviews.

/// Avatars offered when writing a review.
pub const PALETTE: [&str; 20] = [
    "🦊", "🐱", "🐰", "🐼", "🐨", "🐸", "🦄", "🐙", "🦋", "🌸", "🎮", "⭐", "💜", "🌟", "🎨", "🎭",
    "🎪", "🎯", "🎲", "🎹",
];

/// Number of palette entries used for reviews stored without an avatar.
const FALLBACK_POOL: usize = 10;

/// Pick a random avatar from the palette.
pub fn random() -> &'static str {
    PALETTE[rand::random_range(0..PALETTE.len())]
}

/// Avatar `steps` positions away from `current`, wrapping around the palette.
///
/// Unknown avatars start from the first entry.
pub fn cycle(current: &str, steps: isize) -> &'static str {
    let len = PALETTE.len() as isize;
    let index = PALETTE
        .iter()
        .position(|avatar| *avatar == current)
        .unwrap_or(0) as isize;
    PALETTE[(index + steps).rem_euclid(len) as usize]
}

/// Avatar to show for a stored review.
///
/// Reviews without one get a stable pick derived from the author name.
pub fn display(avatar: Option<&str>, author: Option<&str>) -> String {
    if let Some(avatar) = avatar.filter(|value| !value.trim().is_empty()) {
        return avatar.to_string();
    }
    let name = author.unwrap_or("anonymous");
    PALETTE[name.chars().count() % FALLBACK_POOL].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_avatar_comes_from_palette() {
        for _ in 0..32 {
            assert!(PALETTE.contains(&random()));
        }
    }

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle("🦊", -1), "🎹");
        assert_eq!(cycle("🎹", 1), "🦊");
        assert_eq!(cycle("not-an-avatar", 2), "🐰");
    }

    #[test]
    fn fallback_is_stable_per_author() {
        assert_eq!(display(Some("🐙"), Some("Kai")), "🐙");
        assert_eq!(display(None, Some("Kai")), "🐼");
        assert_eq!(display(Some(" "), Some("Kai")), "🐼");
        // "anonymous" has nine characters
        assert_eq!(display(None, None), "🌸");
    }
}
