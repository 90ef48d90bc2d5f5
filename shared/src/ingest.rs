use crate::error::MovieError;
use crate::service::MovieService;
use crate::store::MovieStore;
use crate::types::{ScoreIncrement, ScoreUpdateRequest};
use crate::validation::{self, SCORE_UPDATE};

/// One queued score update, already lifted out of the queue's event shape.
#[derive(Debug, Clone, Default)]
pub struct QueueMessage {
    pub message_id: Option<String>,
    /// The movie id travels as the FIFO message group.
    pub group_id: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug)]
pub struct SkippedMessage {
    pub message_id: Option<String>,
    pub error: MovieError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub applied: Vec<ScoreIncrement>,
    pub skipped: Vec<SkippedMessage>,
}

/// Validate a score update. The body is checked before the id.
pub fn parse_increment(
    movie_id: Option<&str>,
    body: Option<&[u8]>,
) -> Result<ScoreIncrement, MovieError> {
    let req: ScoreUpdateRequest = body
        .map(|b| validation::parse_body(b, &SCORE_UPDATE))
        .transpose()?
        .flatten()
        .ok_or(MovieError::MissingBody)?;
    let delta = validation::parse_delta(&req.grinning_score)?;

    let movie_id = movie_id
        .filter(|id| !id.is_empty())
        .ok_or(MovieError::MissingParameter("movieId"))?;

    Ok(ScoreIncrement {
        movie_id: movie_id.to_string(),
        delta,
    })
}

/// Synchronous path: id from the route, delta from the request body.
pub async fn apply_http<S: MovieStore>(
    service: &MovieService<S>,
    movie_id: Option<&str>,
    body: &[u8],
) -> Result<ScoreIncrement, MovieError> {
    let increment = parse_increment(movie_id, Some(body))?;
    service
        .increment_score(&increment.movie_id, increment.delta)
        .await?;
    Ok(increment)
}

/// Queue path: every message stands alone. A bad or failing message is
/// logged and skipped and the rest of the batch still runs, in order.
/// Redelivery is left to the queue.
pub async fn apply_batch<S: MovieStore>(
    service: &MovieService<S>,
    messages: impl IntoIterator<Item = QueueMessage>,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for message in messages {
        let result = match parse_increment(
            message.group_id.as_deref(),
            message.body.as_deref().map(str::as_bytes),
        ) {
            Ok(increment) => service
                .increment_score(&increment.movie_id, increment.delta)
                .await
                .map(|()| increment),
            Err(e) => Err(e),
        };

        match result {
            Ok(increment) => {
                tracing::info!(
                    "Score successfully updated. movieId: {}",
                    increment.movie_id
                );
                outcome.applied.push(increment);
            }
            Err(error) => {
                tracing::warn!(
                    "Skipping message {:?} (group {:?}): {}",
                    message.message_id,
                    message.group_id,
                    error
                );
                outcome.skipped.push(SkippedMessage {
                    message_id: message.message_id,
                    error,
                });
            }
        }
    }

    outcome
}
