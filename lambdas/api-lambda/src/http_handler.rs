use grinning_shared::error::MovieError;
use grinning_shared::ingest;
use grinning_shared::responses::{error_response, json_response, not_found, preflight_response};
use grinning_shared::store::MovieStore;
use grinning_shared::types::{CreateMovieRequest, MessageBody, MovieFilter};
use grinning_shared::validation::{self, CREATE_MOVIE};
use grinning_shared::AppState;
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::sync::Arc;

/// Main Lambda handler - routes /movies requests to the movie service
pub(crate) async fn function_handler<S: MovieStore>(
    event: Request,
    state: Arc<AppState<S>>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    tracing::info!("Movies API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        return preflight_response();
    }

    let movies = &state.movies;
    // Interior empty segments are kept so `/movies//score` still reaches the score route
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method, parts.as_slice()) {
        // GET /movies?userId=|genre=|title= - list, at most one filter honored
        (&Method::GET, ["movies"]) => respond(movies.list(&list_filter(&event)).await),
        // GET /movies/random?genre= - one random movie of a genre
        (&Method::GET, ["movies", "random"]) => {
            let genre = query_param(&event, "genre").unwrap_or_default();
            respond(movies.random_by_genre(&genre).await)
        }
        // GET /movies/{movieId} - get movie
        (&Method::GET, ["movies", movie_id]) => {
            let movie_id =
                path_param(&event, "movieId").unwrap_or_else(|| decode_segment(movie_id));
            respond(movies.get_by_id(&movie_id).await)
        }
        // POST /movies - create movie
        (&Method::POST, ["movies"]) => {
            let result = match validation::parse_body::<CreateMovieRequest>(body, &CREATE_MOVIE) {
                Ok(Some(req)) => movies.create(req).await,
                Ok(None) => Err(MovieError::MissingBody),
                Err(e) => Err(e.into()),
            };
            respond(result.map(|()| MessageBody::new("successfully added new item")))
        }
        // PATCH /movies/{movieId}/score - add to the grinning score
        (&Method::PATCH | &Method::PUT, ["movies", movie_id, "score"]) => {
            let movie_id =
                path_param(&event, "movieId").unwrap_or_else(|| decode_segment(movie_id));
            let result = ingest::apply_http(movies, Some(movie_id.as_str()), body).await;
            respond(result.map(|_| MessageBody::new("successfully updated the score")))
        }
        _ => {
            tracing::warn!("No route matched - Method: {} Path: {}", method, path);
            not_found()
        }
    }
}

fn respond<T: Serialize>(result: Result<T, MovieError>) -> Result<Response<Body>, Error> {
    match result {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(e) => error_response(&e),
    }
}

fn query_param(event: &Request, name: &str) -> Option<String> {
    event
        .query_string_parameters_ref()
        .and_then(|params| params.first(name))
        .map(|s| s.to_string())
}

// API Gateway fills path parameters; fall back to the raw path segment otherwise
fn path_param(event: &Request, name: &str) -> Option<String> {
    event
        .path_parameters_ref()
        .and_then(|params| params.first(name))
        .map(|s| s.to_string())
}

// Raw path segments arrive percent-encoded
fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

fn list_filter(event: &Request) -> MovieFilter {
    MovieFilter {
        user_id: query_param(event, "userId"),
        genre: query_param(event, "genre"),
        title: query_param(event, "title"),
    }
}
