use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// A list response after its shape has been identified.
///
/// The API has answered list requests both with a bare array and with an
/// object wrapping the array under a resource key.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    /// `[ ... ]`
    Bare(Vec<T>),
    /// `{ "<key>": [ ... ] }`
    Wrapped(Vec<T>),
    /// Any other body; treated as an empty list.
    Unrecognized,
}

impl<T: DeserializeOwned> Listing<T> {
    /// Identify the shape of `body`, decoding records wrapped under `key`.
    ///
    /// Records that still cannot be decoded are logged and skipped, so one
    /// bad entry never hides the rest of the list.
    pub fn decode(body: Value, key: &str) -> Self {
        match body {
            Value::Array(items) => Listing::Bare(decode_items(items)),
            Value::Object(mut map) => match map.remove(key) {
                Some(Value::Array(items)) => Listing::Wrapped(decode_items(items)),
                _ => {
                    warn!(key, "object response without a record list");
                    Listing::Unrecognized
                }
            },
            other => {
                warn!(kind = value_kind(&other), "unexpected list response");
                Listing::Unrecognized
            }
        }
    }
}

impl<T> Listing<T> {
    /// Plain ordered records regardless of the original shape.
    pub fn into_records(self) -> Vec<T> {
        match self {
            Listing::Bare(records) | Listing::Wrapped(records) => records,
            Listing::Unrecognized => Vec::new(),
        }
    }
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(index, error = %err, "skipping undecodable record");
                None
            }
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Game, Review};
    use serde_json::json;

    fn games() -> Value {
        json!([
            { "_id": "1", "name": "Hades", "genre": "Roguelike", "platform": "PC" },
            { "_id": "2", "name": "Tetris", "genre": "Puzzle", "platform": "GB" }
        ])
    }

    #[test]
    fn both_shapes_normalize_to_the_same_records() {
        let bare = Listing::<Game>::decode(games(), "games");
        assert!(matches!(bare, Listing::Bare(_)));

        let wrapped = Listing::<Game>::decode(json!({ "games": games() }), "games");
        assert!(matches!(wrapped, Listing::Wrapped(_)));

        let bare = bare.into_records();
        assert_eq!(bare.len(), 2);
        assert_eq!(bare, wrapped.into_records());
    }

    #[test]
    fn other_shapes_are_empty() {
        for body in [json!({ "items": games() }), json!("nope"), Value::Null] {
            let listing = Listing::<Game>::decode(body, "games");
            assert_eq!(listing, Listing::Unrecognized);
            assert!(listing.into_records().is_empty());
        }
    }

    #[test]
    fn loosely_typed_records_stay_in_the_list() {
        let body = json!({ "games": [
            { "_id": "1", "name": "Hades", "genre": "Roguelike", "platform": "PC" },
            { "_id": "2", "name": "Tetris", "genre": null, "platform": "GB", "releaseYear": "1989" }
        ] });
        let games = Listing::<Game>::decode(body, "games").into_records();
        assert_eq!(games.len(), 2);
        assert_eq!(games[1].genre, "");
        assert_eq!(games[1].release_year, Some(1989));

        let reviews = Listing::<Review>::decode(json!([{ "_id": "r1", "difficulty": 5.5 }]), "reviews")
            .into_records();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].difficulty, Some(6));
    }

    #[test]
    fn undecodable_record_is_skipped() {
        let body = json!([{ "_id": "1", "name": "ok" }, { "name": "no id" }, { "_id": "3" }]);
        let games = Listing::<Game>::decode(body, "games").into_records();
        let ids: Vec<_> = games.iter().map(|game| game.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
    }
}
