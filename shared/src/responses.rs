use crate::error::MovieError;
use crate::types::MessageBody;
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Serialize;

/// JSON response with the headers every endpoint sends
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(body)?.into())
        .map_err(Box::new)?)
}

pub fn message_response(status: StatusCode, message: &str) -> Result<Response<Body>, Error> {
    json_response(status, &MessageBody::new(message))
}

pub fn error_response(err: &MovieError) -> Result<Response<Body>, Error> {
    match err {
        MovieError::Store(e) => tracing::error!("Store fault: {}", e),
        other => tracing::info!("Client error: {}", other),
    }
    message_response(err.status(), &err.public_message())
}

pub fn preflight_response() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET,POST,PUT,PATCH,OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
        .body(Body::Empty)
        .map_err(Box::new)?)
}

pub fn not_found() -> Result<Response<Body>, Error> {
    message_response(StatusCode::NOT_FOUND, "Not found")
}
