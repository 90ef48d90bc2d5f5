use aws_lambda_events::event::sqs::{SqsEvent, SqsMessage};
use aws_sdk_dynamodb::Client as DynamoClient;
use grinning_shared::config::Config;
use grinning_shared::ingest::{self, QueueMessage};
use grinning_shared::store::{DynamoMovieStore, MovieStore};
use grinning_shared::AppState;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    let config = Config::from_env();
    let aws_config = aws_config::load_from_env().await;
    let store = DynamoMovieStore::new(DynamoClient::new(&aws_config), config.table_name);
    let state = AppState::new(store);

    run(service_fn(move |event: LambdaEvent<SqsEvent>| {
        let state = Arc::clone(&state);
        async move { function_handler(event, state).await }
    }))
    .await
}

/// Applies every score message in the batch. Individual failures are logged
/// and never fail the invocation; redelivery is the queue's business.
async fn function_handler<S: MovieStore>(
    event: LambdaEvent<SqsEvent>,
    state: Arc<AppState<S>>,
) -> Result<(), Error> {
    let records = event.payload.records;
    tracing::info!("SQS event received with {} records", records.len());

    let outcome = ingest::apply_batch(&state.movies, records.into_iter().map(queue_message)).await;

    tracing::info!(
        "Batch processed: {} applied, {} skipped",
        outcome.applied.len(),
        outcome.skipped.len()
    );
    Ok(())
}

// The target movie rides in the FIFO message group id
fn queue_message(mut message: SqsMessage) -> QueueMessage {
    QueueMessage {
        group_id: message.attributes.remove("MessageGroupId"),
        message_id: message.message_id,
        body: message.body,
    }
}
