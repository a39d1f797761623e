use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::{
    api::listing::Listing,
    config::AppConfig,
    error::{ApiError, ConfigError},
    models::{Game, NewGame, NewReview, Review},
};

const USER_AGENT: &str = concat!("gamestrike/", env!("CARGO_PKG_VERSION"));

/// Client for the catalog REST API.
///
/// Every path is appended to the configured `api_base`, which already
/// carries the `/api` mount point. Requests are sent once; there is no
/// retry, timeout, or caching.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Build a client for the configured API base.
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let base = config.api_url()?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ConfigError::Invalid {
                key: "api_base",
                reason: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self { http, base })
    }

    /// Base URL requests are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `GET /games`
    pub async fn list_games(&self) -> Result<Vec<Game>, ApiError> {
        self.fetch_collection(&["games"], "games").await
    }

    /// `GET /games/{id}`
    pub async fn get_game(&self, id: &str) -> Result<Game, ApiError> {
        let response = self.send(self.http.get(self.endpoint(&["games", id]))).await?;
        decode(response).await
    }

    /// `POST /games`; returns the stored record when the server echoes it.
    pub async fn create_game(&self, game: &NewGame) -> Result<Option<Game>, ApiError> {
        let request = self.http.post(self.endpoint(&["games"])).json(game);
        let response = self.send(request).await?;
        info!(name = %game.name(), "game created");
        decode_optional(response).await
    }

    /// `PUT /games/{id}`
    pub async fn update_game(&self, id: &str, game: &NewGame) -> Result<Option<Game>, ApiError> {
        let request = self.http.put(self.endpoint(&["games", id])).json(game);
        let response = self.send(request).await?;
        info!(id, "game updated");
        decode_optional(response).await
    }

    /// `DELETE /games/{id}`
    pub async fn delete_game(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.http.delete(self.endpoint(&["games", id])))
            .await?;
        info!(id, "game deleted");
        Ok(())
    }

    /// `GET /reviews`, flattened across games.
    pub async fn list_reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.fetch_collection(&["reviews"], "reviews").await
    }

    /// `GET /reviews/game/{id}`
    pub async fn list_game_reviews(&self, game_id: &str) -> Result<Vec<Review>, ApiError> {
        self.fetch_collection(&["reviews", "game", game_id], "reviews")
            .await
    }

    /// `POST /reviews/{gameId}`; returns the stored review when echoed.
    pub async fn create_review(
        &self,
        game_id: &str,
        review: &NewReview,
    ) -> Result<Option<Review>, ApiError> {
        let request = self
            .http
            .post(self.endpoint(&["reviews", game_id]))
            .json(review);
        let response = self.send(request).await?;
        info!(game_id, author = %review.author(), "review created");
        decode_optional(response).await
    }

    /// Fetch a list resource, accepting both the bare and wrapped shapes.
    pub async fn fetch_collection<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        key: &str,
    ) -> Result<Vec<T>, ApiError> {
        let response = self.send(self.http.get(self.endpoint(segments))).await?;
        let body: Value = decode(response).await?;
        let records = Listing::decode(body, key).into_records();
        debug!(path = %segments.join("/"), count = records.len(), "collection fetched");
        Ok(records)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `api_url` rejects cannot-be-a-base URLs, so this always applies.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|err| {
            error!(error = %err, "request failed");
            ApiError::Network(err)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string));
        error!(%url, status = status.as_u16(), message = message.as_deref().unwrap_or(""), "request rejected");
        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(ApiError::Network)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}

async fn decode_optional<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ApiError> {
    let bytes = response.bytes().await.map_err(ApiError::Network)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    match serde_json::from_slice(&bytes) {
        Ok(record) => Ok(Some(record)),
        Err(err) => {
            debug!(error = %err, "ignoring unexpected success body");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let config = AppConfig {
            api_base: base.to_string(),
            ..AppConfig::default()
        };
        ApiClient::new(&config).expect("valid base")
    }

    #[test]
    fn endpoints_append_to_api_mount() {
        let api = client("http://localhost:4000/api");
        assert_eq!(
            api.endpoint(&["games", "abc"]).as_str(),
            "http://localhost:4000/api/games/abc"
        );

        let trailing = client("http://localhost:4000/api/");
        assert_eq!(
            trailing.endpoint(&["reviews", "game", "abc"]).as_str(),
            "http://localhost:4000/api/reviews/game/abc"
        );
    }

    #[test]
    fn identifiers_are_escaped() {
        let api = client("https://example.com/api");
        assert_eq!(
            api.endpoint(&["games", "a/b c"]).as_str(),
            "https://example.com/api/games/a%2Fb%20c"
        );
    }
}
