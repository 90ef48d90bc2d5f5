use crate::access::{self, MovieQuery};
use crate::codec;
use crate::error::{MovieError, StoreError};
use crate::store::MovieStore;
use crate::types::{CreateMovieRequest, DecodedItem, MovieFilter};
use chrono::{SecondsFormat, Utc};

/// The five movie operations, each one store request behind validation.
pub struct MovieService<S> {
    store: S,
}

impl<S: MovieStore> MovieService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a single movie by its primary key
    pub async fn get_by_id(&self, movie_id: &str) -> Result<DecodedItem, MovieError> {
        if movie_id.is_empty() {
            return Err(MovieError::MissingParameter("movieId"));
        }

        let mut items = self.run(&MovieQuery::ById(movie_id.to_string())).await?;
        match items.pop() {
            Some(item) => Ok(codec::decode(&item)),
            None => Err(MovieError::NotFound(movie_id.to_string())),
        }
    }

    /// List movies, narrowed by at most one filter
    pub async fn list(&self, filter: &MovieFilter) -> Result<Vec<DecodedItem>, MovieError> {
        let query = access::route(filter);
        tracing::info!("Listing movies with {:?}", query);

        let items = self.run(&query).await?;
        if items.is_empty() {
            return Err(MovieError::NoMatches);
        }
        Ok(codec::decode_all(&items))
    }

    /// Pick one movie of a genre uniformly at random
    pub async fn random_by_genre(&self, genre: &str) -> Result<DecodedItem, MovieError> {
        if genre.is_empty() {
            return Err(MovieError::MissingParameter("genre"));
        }

        let items = self.run(&access::by_genre(genre)).await?;
        let picked = {
            let mut rng = rand::rng();
            access::pick_uniform(items, &mut rng)
        };

        picked
            .map(|item| codec::decode(&item))
            .ok_or(MovieError::NoMatches)
    }

    /// Store a new movie. The score starts at zero and the timestamp is ours;
    /// an existing movie with the same id is overwritten.
    pub async fn create(&self, req: CreateMovieRequest) -> Result<(), MovieError> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let movie = req.into_record(created_at);

        self.store.put(codec::encode_movie(&movie)).await?;
        tracing::info!("Movie created: {}", movie.movie_id);
        Ok(())
    }

    /// Add `delta` to a movie's score with the store's atomic update
    pub async fn increment_score(&self, movie_id: &str, delta: u64) -> Result<(), MovieError> {
        if movie_id.is_empty() {
            return Err(MovieError::MissingParameter("movieId"));
        }

        match self.store.add_score(movie_id, delta).await {
            Ok(()) => {
                tracing::info!("Score updated: {} (+{})", movie_id, delta);
                Ok(())
            }
            Err(StoreError::ConditionFailed) => Err(MovieError::NotFound(movie_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn run(&self, query: &MovieQuery) -> Result<Vec<codec::Item>, StoreError> {
        match query {
            MovieQuery::ById(id) => Ok(self.store.get(id).await?.into_iter().collect()),
            MovieQuery::ByIndex { index, value } => self.store.query_index(*index, value).await,
            MovieQuery::Scan { limit } => self.store.scan(*limit).await,
        }
    }
}
