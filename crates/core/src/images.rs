//! Resolution of game cover references.

use std::fmt;

use crate::config::AppConfig;

/// Where a game's cover image should be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Absolute URL, used verbatim.
    Remote(String),
    /// File under the static assets path.
    Asset(String),
    /// Placeholder shown when no usable image exists.
    Placeholder(String),
}

impl ImageSource {
    /// Location string for the resolved image.
    pub fn location(&self) -> &str {
        match self {
            ImageSource::Remote(url) | ImageSource::Asset(url) | ImageSource::Placeholder(url) => {
                url
            }
        }
    }

    /// Source to use after this one failed to load.
    pub fn or_placeholder_on_error(self, config: &AppConfig) -> ImageSource {
        match self {
            ImageSource::Placeholder(_) => self,
            _ => ImageSource::Placeholder(config.placeholder_image.clone()),
        }
    }

    /// Whether this is the placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ImageSource::Placeholder(_))
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.location())
    }
}

/// Resolve a stored `imageUrl` value.
pub fn resolve_image(image_url: Option<&str>, config: &AppConfig) -> ImageSource {
    let Some(reference) = image_url.map(str::trim).filter(|value| !value.is_empty()) else {
        return ImageSource::Placeholder(config.placeholder_image.clone());
    };
    if reference.starts_with("http") {
        return ImageSource::Remote(reference.to_string());
    }
    let base = config.assets_base.trim_end_matches('/');
    let file = reference.trim_start_matches('/');
    ImageSource::Asset(format!("{base}/{file}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_each_reference_kind() {
        let config = AppConfig::default();
        assert_eq!(
            resolve_image(Some("https://cdn.example.com/zelda.jpg"), &config),
            ImageSource::Remote("https://cdn.example.com/zelda.jpg".to_string())
        );
        assert_eq!(
            resolve_image(Some("zelda.jpg"), &config),
            ImageSource::Asset("/images/zelda.jpg".to_string())
        );
        assert!(resolve_image(None, &config).is_placeholder());
        assert!(resolve_image(Some("  "), &config).is_placeholder());
    }

    #[test]
    fn failed_load_falls_back_to_placeholder() {
        let config = AppConfig::default();
        let source = resolve_image(Some("missing.png"), &config).or_placeholder_on_error(&config);
        assert_eq!(source.location(), config.placeholder_image);
    }
}
