use aws_sdk_dynamodb::Client as DynamoClient;
use grinning_shared::config::Config;
use grinning_shared::store::DynamoMovieStore;
use grinning_shared::AppState;
use lambda_http::{run, service_fn, tracing, Error, Request};
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Initialize the table client once and reuse it across invocations
    let config = Config::from_env();
    let aws_config = aws_config::load_from_env().await;
    let store = DynamoMovieStore::new(DynamoClient::new(&aws_config), config.table_name);
    tracing::info!("Movies API starting, table: {}", store.table_name());

    let state = AppState::new(store);

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
