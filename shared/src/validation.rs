use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// The declared body of one operation: every listed field is a required
/// string and nothing else may appear.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

pub const CREATE_MOVIE: Shape = Shape {
    name: "create movie",
    fields: &["movieId", "userId", "username", "title", "overview", "genre"],
};

pub const SCORE_UPDATE: Shape = Shape {
    name: "score update",
    fields: &["grinningScore"],
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("body is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("body must be a JSON object")]
    NotAnObject,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{0}' must be a string")]
    WrongType(&'static str),
    #[error("unexpected field '{0}'")]
    UnknownField(String),
    #[error("'{0}' is not a non-negative integer")]
    InvalidScore(String),
}

pub fn validate(candidate: &Value, shape: &Shape) -> Result<(), ValidationError> {
    let object = candidate.as_object().ok_or(ValidationError::NotAnObject)?;

    if let Some(unknown) = object.keys().find(|key| !shape.fields.contains(&key.as_str())) {
        return Err(ValidationError::UnknownField(unknown.clone()));
    }

    for field in shape.fields.iter().copied() {
        match object.get(field) {
            None => return Err(ValidationError::MissingField(field)),
            Some(Value::String(_)) => {}
            Some(_) => return Err(ValidationError::WrongType(field)),
        }
    }

    Ok(())
}

/// Parse and shape-check a raw body, then deserialize it into `T`.
/// Returns `Ok(None)` when there is no body at all.
pub fn parse_body<T: DeserializeOwned>(
    body: &[u8],
    shape: &Shape,
) -> Result<Option<T>, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let candidate: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;

    if let Err(e) = validate(&candidate, shape) {
        tracing::info!("Rejected {} body: {}", shape.name, e);
        return Err(e);
    }

    serde_json::from_value(candidate)
        .map(Some)
        .map_err(|e| ValidationError::MalformedJson(e.to_string()))
}

/// Score deltas travel as text and must be a non-negative integer.
pub fn parse_delta(raw: &str) -> Result<u64, ValidationError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidScore(raw.to_string()))
}
