pub mod types;
pub mod codec;
pub mod validation;
pub mod access;
pub mod error;
pub mod store;
pub mod service;
pub mod ingest;
pub mod responses;
pub mod config;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use service::MovieService;
use std::sync::Arc;
use store::{DynamoMovieStore, MovieStore};

/// Shared application state, built once per execution environment
pub struct AppState<S: MovieStore = DynamoMovieStore> {
    pub movies: MovieService<S>,
}

impl<S: MovieStore> AppState<S> {
    pub fn new(store: S) -> Arc<Self> {
        Arc::new(Self {
            movies: MovieService::new(store),
        })
    }
}
