use crate::access::SecondaryIndex;
use crate::codec::{self, Item};
use crate::error::StoreError;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use aws_sdk_dynamodb::Client as DynamoClient;

/// The handful of table requests the movie functions make. Each call is one
/// independent store request; nothing here locks or retries.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Point lookup on the primary key.
    async fn get(&self, movie_id: &str) -> Result<Option<Item>, StoreError>;

    /// Equality query against one secondary index, every page.
    async fn query_index(&self, index: SecondaryIndex, value: &str)
        -> Result<Vec<Item>, StoreError>;

    /// One page of the table, at most `limit` rows.
    async fn scan(&self, limit: i32) -> Result<Vec<Item>, StoreError>;

    /// Unconditional write; an existing row with the same key is replaced.
    async fn put(&self, item: Item) -> Result<(), StoreError>;

    /// Store-side atomic add to `grinningScore`. Fails with
    /// `StoreError::ConditionFailed` when the movie does not exist.
    async fn add_score(&self, movie_id: &str, delta: u64) -> Result<(), StoreError>;
}

pub struct DynamoMovieStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoMovieStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

// Callers log the fault once, where it becomes a response or a skipped message
fn request_error<E: std::error::Error>(err: E) -> StoreError {
    StoreError::Request(DisplayErrorContext(err).to_string())
}

#[async_trait]
impl MovieStore for DynamoMovieStore {
    async fn get(&self, movie_id: &str) -> Result<Option<Item>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(codec::MOVIE_ID, AttributeValue::S(movie_id.to_string()))
            .send()
            .await
            .map_err(request_error)?;

        Ok(result.item)
    }

    async fn query_index(
        &self,
        index: SecondaryIndex,
        value: &str,
    ) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(index.index_name())
                .select(Select::AllAttributes)
                .key_condition_expression("#attrName = :attrVal")
                .expression_attribute_names("#attrName", index.attribute())
                .expression_attribute_values(":attrVal", AttributeValue::S(value.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(request_error)?;

            items.extend(result.items.unwrap_or_default());

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        tracing::info!(
            "Queried {} = {} on {}: {} items",
            index.attribute(),
            value,
            index.index_name(),
            items.len()
        );
        Ok(items)
    }

    async fn scan(&self, limit: i32) -> Result<Vec<Item>, StoreError> {
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .limit(limit)
            .send()
            .await
            .map_err(request_error)?;

        Ok(result.items.unwrap_or_default())
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(request_error)?;

        Ok(())
    }

    async fn add_score(&self, movie_id: &str, delta: u64) -> Result<(), StoreError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(codec::MOVIE_ID, AttributeValue::S(movie_id.to_string()))
            .update_expression("SET #score = if_not_exists(#score, :zero) + :delta")
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#score", codec::GRINNING_SCORE)
            .expression_attribute_names("#id", codec::MOVIE_ID)
            .expression_attribute_values(":zero", AttributeValue::N("0".to_string()))
            .expression_attribute_values(":delta", AttributeValue::N(delta.to_string()))
            .send()
            .await
            .map_err(|err| {
                let missing = err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception());
                if missing {
                    StoreError::ConditionFailed
                } else {
                    request_error(err)
                }
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::SCAN_LIMIT;
    use crate::error::MovieError;
    use crate::service::MovieService;
    use crate::types::MovieFilter;
    use aws_sdk_dynamodb::operation::get_item::GetItemOutput;
    use aws_sdk_dynamodb::operation::put_item::PutItemOutput;
    use aws_sdk_dynamodb::operation::query::QueryOutput;
    use aws_sdk_dynamodb::operation::scan::ScanOutput;
    use aws_sdk_dynamodb::operation::update_item::{UpdateItemError, UpdateItemOutput};
    use aws_sdk_dynamodb::types::error::{ConditionalCheckFailedException, InternalServerError};
    use aws_sdk_dynamodb::Client;
    use aws_smithy_mocks::{mock, mock_client};
    use std::collections::HashMap;

    const TABLE: &str = "movies-test";

    fn row(id: &str) -> Item {
        HashMap::from([
            (codec::MOVIE_ID.to_string(), AttributeValue::S(id.to_string())),
            (codec::GENRE.to_string(), AttributeValue::S("drama".to_string())),
        ])
    }

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn n(value: &str) -> AttributeValue {
        AttributeValue::N(value.to_string())
    }

    fn name<'a>(names: Option<&'a HashMap<String, String>>, key: &str) -> Option<&'a str> {
        names.and_then(|names| names.get(key)).map(String::as_str)
    }

    fn value<'a>(
        values: Option<&'a HashMap<String, AttributeValue>>,
        key: &str,
    ) -> Option<&'a AttributeValue> {
        values.and_then(|values| values.get(key))
    }

    #[tokio::test]
    async fn test_get_uses_primary_key() {
        let rule = mock!(Client::get_item)
            .match_requests(|req| {
                req.table_name() == Some(TABLE)
                    && value(req.key(), codec::MOVIE_ID) == Some(&s("m1"))
            })
            .then_output(|| GetItemOutput::builder().set_item(Some(row("m1"))).build());
        let store = DynamoMovieStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);

        let item = store.get("m1").await.unwrap();

        assert_eq!(item, Some(row("m1")));
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_add_score_is_a_conditional_store_side_add() {
        let rule = mock!(Client::update_item)
            .match_requests(|req| {
                req.table_name() == Some(TABLE)
                    && value(req.key(), codec::MOVIE_ID) == Some(&s("m1"))
                    && req.update_expression()
                        == Some("SET #score = if_not_exists(#score, :zero) + :delta")
                    && req.condition_expression() == Some("attribute_exists(#id)")
                    && name(req.expression_attribute_names(), "#score")
                        == Some(codec::GRINNING_SCORE)
                    && name(req.expression_attribute_names(), "#id") == Some(codec::MOVIE_ID)
                    && value(req.expression_attribute_values(), ":zero") == Some(&n("0"))
                    && value(req.expression_attribute_values(), ":delta") == Some(&n("7"))
            })
            .then_output(|| UpdateItemOutput::builder().build());
        let store = DynamoMovieStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);

        store.add_score("m1", 7).await.unwrap();

        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_condition_is_not_found() {
        let rule = mock!(Client::update_item).then_error(|| {
            UpdateItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder()
                    .message("The conditional request failed")
                    .build(),
            )
        });
        let store = DynamoMovieStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);

        let err = store.add_score("ghost", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::ConditionFailed));

        let service = MovieService::new(store);
        let err = service.increment_score("ghost", 1).await.unwrap_err();
        assert!(matches!(err, MovieError::NotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_other_update_failures_are_store_faults() {
        let rule = mock!(Client::update_item).then_error(|| {
            UpdateItemError::InternalServerError(
                InternalServerError::builder().message("try again").build(),
            )
        });
        let service = MovieService::new(DynamoMovieStore::new(
            mock_client!(aws_sdk_dynamodb, [&rule]),
            TABLE,
        ));

        let err = service.increment_score("m1", 1).await.unwrap_err();

        assert!(matches!(err, MovieError::Store(StoreError::Request(_))));
        assert_eq!(err.status(), 500);
    }

    #[tokio::test]
    async fn test_unfiltered_list_scans_one_limited_page() {
        let rule = mock!(Client::scan)
            .match_requests(|req| {
                req.table_name() == Some(TABLE) && req.limit() == Some(SCAN_LIMIT)
            })
            .then_output(|| {
                ScanOutput::builder()
                    .items(row("m1"))
                    .items(row("m2"))
                    .last_evaluated_key(codec::MOVIE_ID, s("m2"))
                    .build()
            });
        let service = MovieService::new(DynamoMovieStore::new(
            mock_client!(aws_sdk_dynamodb, [&rule]),
            TABLE,
        ));

        let movies = service.list(&MovieFilter::default()).await.unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_index_query_follows_every_page() {
        let first_page = mock!(Client::query)
            .match_requests(|req| {
                req.index_name() == Some("genreIndex")
                    && req.key_condition_expression() == Some("#attrName = :attrVal")
                    && name(req.expression_attribute_names(), "#attrName") == Some(codec::GENRE)
                    && value(req.expression_attribute_values(), ":attrVal") == Some(&s("drama"))
                    && req.exclusive_start_key().is_none()
            })
            .then_output(|| {
                QueryOutput::builder()
                    .items(row("m1"))
                    .items(row("m2"))
                    .last_evaluated_key(codec::MOVIE_ID, s("m2"))
                    .build()
            });
        let second_page = mock!(Client::query)
            .match_requests(|req| {
                req.index_name() == Some("genreIndex")
                    && value(req.exclusive_start_key(), codec::MOVIE_ID) == Some(&s("m2"))
            })
            .then_output(|| QueryOutput::builder().items(row("m3")).build());
        let client = mock_client!(aws_sdk_dynamodb, [&first_page, &second_page]);
        let service = MovieService::new(DynamoMovieStore::new(client, TABLE));

        let filter = MovieFilter {
            genre: Some("drama".to_string()),
            ..MovieFilter::default()
        };
        let movies = service.list(&filter).await.unwrap();

        let ids: Vec<&str> = movies.iter().map(|m| m[codec::MOVIE_ID].as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_eq!(first_page.num_calls(), 1);
        assert_eq!(second_page.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_put_writes_whole_item() {
        let rule = mock!(Client::put_item)
            .match_requests(|req| {
                req.table_name() == Some(TABLE)
                    && req.condition_expression().is_none()
                    && value(req.item(), codec::MOVIE_ID) == Some(&s("m1"))
            })
            .then_output(|| PutItemOutput::builder().build());
        let store = DynamoMovieStore::new(mock_client!(aws_sdk_dynamodb, [&rule]), TABLE);

        store.put(row("m1")).await.unwrap();

        assert_eq!(rule.num_calls(), 1);
    }
}
