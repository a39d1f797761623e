use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use gamestrike_core::{
    validate::{validate_game, validate_review, GameForm, ReviewForm},
    ApiClient, ApiError, AppConfig,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

#[derive(Default)]
struct Recorded {
    created_games: Vec<Value>,
    created_reviews: Vec<(String, Value)>,
    deleted: Vec<String>,
}

type Shared = Arc<Mutex<Recorded>>;

struct TestServer {
    addr: SocketAddr,
    recorded: Shared,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(wrapped: bool) -> Self {
        let recorded = Shared::default();
        let games_handler = if wrapped {
            get(|| async { Json(json!({ "games": sample_games() })) })
        } else {
            get(|| async { Json(sample_games()) })
        };

        let app = Router::new()
            .route("/api/games", games_handler.post(create_game))
            .route(
                "/api/games/{id}",
                get(get_game).put(update_game).delete(delete_game),
            )
            .route("/api/reviews", get(|| async { Json(sample_reviews()) }))
            .route("/api/reviews/game/{id}", get(game_reviews))
            .route("/api/reviews/{id}", post(create_review))
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            recorded,
            _handle: handle,
        }
    }

    fn client(&self) -> ApiClient {
        let config = AppConfig {
            api_base: format!("http://{}/api", self.addr),
            ..AppConfig::default()
        };
        ApiClient::new(&config).unwrap()
    }
}

fn sample_games() -> Value {
    json!([
        { "_id": "g1", "name": "Hades", "genre": "Roguelike", "platform": "PC", "releaseYear": 2020, "rating": 5 },
        { "_id": "g2", "name": "Celeste", "genre": "Platformer", "platform": "Switch", "releaseYear": 2018 }
    ])
}

fn sample_reviews() -> Value {
    json!([
        { "_id": "r1", "gameId": { "_id": "g1", "name": "Hades" }, "author": "Kai", "rating": 5, "text": "Again!" },
        { "_id": "r2", "gameId": "g2", "author": "", "rating": 3, "comment": "Hard" }
    ])
}

async fn get_game(Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    sample_games()
        .as_array()
        .and_then(|games| games.iter().find(|game| game["_id"] == id.as_str()).cloned())
        .map(Json)
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Game not found" })),
        ))
}

async fn create_game(State(recorded): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    recorded.lock().created_games.push(body.clone());
    let mut stored = body;
    stored["_id"] = json!("g3");
    (StatusCode::CREATED, Json(stored))
}

async fn update_game(Path(id): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if id == "locked" {
        return (StatusCode::FORBIDDEN, Json(json!({})));
    }
    let mut stored = body;
    stored["_id"] = json!(id);
    (StatusCode::OK, Json(stored))
}

async fn delete_game(State(recorded): State<Shared>, Path(id): Path<String>) -> StatusCode {
    recorded.lock().deleted.push(id);
    StatusCode::NO_CONTENT
}

async fn game_reviews(Path(id): Path<String>) -> Json<Value> {
    let reviews: Vec<Value> = sample_reviews()
        .as_array()
        .map(|all| {
            all.iter()
                .filter(|review| {
                    review["gameId"] == id.as_str() || review["gameId"]["_id"] == id.as_str()
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Json(json!({ "reviews": reviews }))
}

async fn create_review(
    State(recorded): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorded.lock().created_reviews.push((id.clone(), body.clone()));
    let mut stored = body;
    stored["_id"] = json!("r9");
    stored["gameId"] = json!(id);
    (StatusCode::CREATED, Json(stored))
}

#[tokio::test]
async fn wrapped_and_bare_game_lists_match() {
    let bare = TestServer::start(false).await;
    let wrapped = TestServer::start(true).await;

    let from_bare = bare.client().list_games().await.unwrap();
    let from_wrapped = wrapped.client().list_games().await.unwrap();

    assert_eq!(from_bare.len(), 2);
    assert_eq!(from_bare, from_wrapped);
    assert_eq!(from_bare[0].name, "Hades");
    assert_eq!(from_bare[0].rating, Some(5.0));
}

#[tokio::test]
async fn http_errors_carry_status_and_message() {
    let server = TestServer::start(false).await;
    let api = server.client();

    let game = api.get_game("g2").await.unwrap();
    assert_eq!(game.name, "Celeste");

    match api.get_game("missing").await {
        Err(ApiError::Http { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("Game not found"));
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }

    let form = GameForm {
        name: "Hades".to_string(),
        genre: "Roguelike".to_string(),
        platform: "PC".to_string(),
        release_year: "2020".to_string(),
        ..GameForm::default()
    };
    let payload = validate_game(&form, 2026).unwrap();
    let err = api.update_game("locked", &payload).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.to_string(), "HTTP error! status: 403");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = AppConfig {
        api_base: format!("http://{addr}/api"),
        ..AppConfig::default()
    };
    let api = ApiClient::new(&config).unwrap();
    let err = api.list_games().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

#[tokio::test]
async fn mutations_send_camel_case_bodies() {
    let server = TestServer::start(false).await;
    let api = server.client();

    let form = GameForm {
        name: " Outer Wilds ".to_string(),
        genre: "Adventure".to_string(),
        platform: "PC".to_string(),
        release_year: "2019".to_string(),
        image_url: "outer-wilds.jpg".to_string(),
        rating: "4.5".to_string(),
        ..GameForm::default()
    };
    let created = api
        .create_game(&validate_game(&form, 2026).unwrap())
        .await
        .unwrap()
        .expect("server echoes the record");
    assert_eq!(created.id, "g3");
    assert_eq!(created.name, "Outer Wilds");

    api.delete_game("g1").await.unwrap();

    let mut review = ReviewForm::new();
    review.author = "Kai".to_string();
    review.text = "Beautiful".to_string();
    review.rating = 5;
    let saved = api
        .create_review("g2", &validate_review(&review, chrono::Utc::now()).unwrap())
        .await
        .unwrap()
        .expect("server echoes the review");
    assert_eq!(saved.id, "r9");

    let recorded = server.recorded.lock();
    let body = &recorded.created_games[0];
    assert_eq!(body["releaseYear"], json!(2019));
    assert_eq!(body["imageUrl"], json!("outer-wilds.jpg"));
    assert!(body.get("description").is_none());
    assert_eq!(recorded.deleted, vec!["g1".to_string()]);
    let (game_id, review_body) = &recorded.created_reviews[0];
    assert_eq!(game_id, "g2");
    assert_eq!(review_body["difficulty"], json!(1));
    assert_eq!(review_body["progress"], json!(0));
}

#[tokio::test]
async fn review_listings_accept_both_game_refs() {
    let server = TestServer::start(false).await;
    let api = server.client();

    let all = api.list_reviews().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].game_label(), Some("Hades"));
    assert_eq!(all[1].display_text(), "Hard");

    let for_celeste = api.list_game_reviews("g2").await.unwrap();
    assert_eq!(for_celeste.len(), 1);
    assert_eq!(for_celeste[0].id, "r2");
}
