use crate::types::{DecodedItem, MovieRecord};
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

/// A row in DynamoDB's tagged-attribute format.
pub type Item = HashMap<String, AttributeValue>;

pub const MOVIE_ID: &str = "movieId";
pub const TITLE: &str = "title";
pub const OVERVIEW: &str = "overview";
pub const GENRE: &str = "genre";
pub const USER_ID: &str = "userId";
pub const USERNAME: &str = "username";
pub const GRINNING_SCORE: &str = "grinningScore";
pub const CREATED_AT: &str = "createdAt";

/// Attributes stored with the numeric tag. Everything else is a string.
const NUMERIC_ATTRIBUTES: &[&str] = &[GRINNING_SCORE];

/// Tag plain field values for the store.
pub fn encode(fields: &DecodedItem) -> Item {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_attribute(name, value)))
        .collect()
}

fn encode_attribute(name: &str, value: &str) -> AttributeValue {
    if NUMERIC_ATTRIBUTES.contains(&name) {
        AttributeValue::N(value.to_string())
    } else {
        AttributeValue::S(value.to_string())
    }
}

pub fn encode_movie(movie: &MovieRecord) -> Item {
    let mut item = HashMap::new();
    item.insert(MOVIE_ID.to_string(), AttributeValue::S(movie.movie_id.clone()));
    item.insert(TITLE.to_string(), AttributeValue::S(movie.title.clone()));
    item.insert(OVERVIEW.to_string(), AttributeValue::S(movie.overview.clone()));
    item.insert(GENRE.to_string(), AttributeValue::S(movie.genre.clone()));
    item.insert(USER_ID.to_string(), AttributeValue::S(movie.user_id.clone()));
    item.insert(USERNAME.to_string(), AttributeValue::S(movie.username.clone()));
    item.insert(
        GRINNING_SCORE.to_string(),
        AttributeValue::N(movie.grinning_score.to_string()),
    );
    item.insert(CREATED_AT.to_string(), AttributeValue::S(movie.created_at.clone()));
    item
}

/// Flatten a stored row to text. Numbers come back as their decimal text and
/// any tag other than S or N reads as an empty string; decoding never fails.
pub fn decode(item: &Item) -> DecodedItem {
    item.iter()
        .map(|(name, value)| (name.clone(), decode_attribute(value)))
        .collect()
}

pub fn decode_all(items: &[Item]) -> Vec<DecodedItem> {
    items.iter().map(decode).collect()
}

pub fn decode_attribute(value: &AttributeValue) -> String {
    match value {
        AttributeValue::S(s) => s.clone(),
        AttributeValue::N(n) => n.clone(),
        _ => String::new(),
    }
}
