use crate::client::{Column, Row};
use crate::error::PrestoError;
use crate::query::Query;

use futures_util::Stream;
use std::collections::VecDeque;


/// Lazy, single-pass sequence of the rows of one [`Query`].
///
/// Buffered rows are handed out immediately; a network round-trip only
/// happens when the buffer is empty and the query is not finished yet. Once
/// exhausted, [`next`](ResultSet::next) keeps returning `Ok(None)`: a result
/// set is never re-run.
#[derive(Debug)]
pub struct ResultSet {
    query: Query,
    rows: VecDeque<Row>,
    row_number: u64,
}

impl ResultSet {
    pub(crate) fn new(query: Query, rows: Vec<Row>) -> Self {
        Self { query, rows: rows.into(), row_number: 0 }
    }

    pub async fn next(&mut self) -> Result<Option<Row>, PrestoError> {
        loop {
            if let Some(row) = self.rows.pop_front() {
                self.row_number += 1;
                return Ok(Some(row));
            }
            if self.query.is_finished() {
                return Ok(None);
            }
            let page = self.query.fetch().await?;
            self.rows.extend(page);
        }
    }

    /// Collect every remaining row.
    pub async fn fetch_all(&mut self) -> Result<Vec<Row>, PrestoError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Number of rows handed out so far.
    pub fn row_number(&self) -> u64 {
        self.row_number
    }

    pub fn columns(&self) -> Option<&[Column]> {
        self.query.columns()
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    /// The same rows as a [`Stream`], for use with `futures` combinators.
    pub fn into_stream(self) -> impl Stream<Item = Result<Row, PrestoError>> {
        futures_util::stream::try_unfold(self, |mut result_set| async move {
            let row = result_set.next().await?;
            Ok::<_, PrestoError>(row.map(|row| (row, result_set)))
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::{MockBackend, client_with, json_response, page};
    use futures_util::TryStreamExt;
    use serde_json::json;

    fn three_pages() -> Vec<Result<crate::client::HttpResponse, PrestoError>> {
        vec![
            json_response(page("q1", "QUEUED", Some("/v1/statement/q1/1"), None, None)),
            json_response(page(
                "q1",
                "RUNNING",
                Some("/v1/statement/q1/2"),
                Some(json!([{"name": "id", "type": "bigint"}])),
                Some(json!([[1], [2]])),
            )),
            json_response(page("q1", "RUNNING", Some("/v1/statement/q1/3"), None, Some(json!([])))),
            json_response(page("q1", "FINISHED", None, None, Some(json!([[3], [4], [5]])))),
        ]
    }

    async fn result_set(backend: &std::sync::Arc<MockBackend>) -> ResultSet {
        Query::new(client_with(backend), "SELECT id FROM t").run().await.unwrap()
    }

    #[tokio::test]
    async fn test_rows_arrive_in_page_order() {
        let backend = MockBackend::new(three_pages());
        let mut rows = result_set(&backend).await;

        let all = rows.fetch_all().await.unwrap();

        assert_eq!(all, vec![vec![json!(1)], vec![json!(2)], vec![json!(3)], vec![json!(4)], vec![json!(5)]]);
        assert_eq!(rows.row_number(), 5);
        assert_eq!(rows.columns().unwrap()[0].column_type, "bigint");
        assert_eq!(backend.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_pages_are_fetched_lazily() {
        let backend = MockBackend::new(three_pages());
        let mut rows = result_set(&backend).await;
        assert_eq!(backend.requests().len(), 1);

        assert_eq!(rows.next().await.unwrap(), Some(vec![json!(1)]));
        assert_eq!(backend.requests().len(), 2);

        assert_eq!(rows.next().await.unwrap(), Some(vec![json!(2)]));
        assert_eq!(backend.requests().len(), 2);

        assert_eq!(rows.next().await.unwrap(), Some(vec![json!(3)]));
        assert_eq!(backend.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_no_second_pass() {
        let backend = MockBackend::new(three_pages());
        let mut rows = result_set(&backend).await;

        assert_eq!(rows.fetch_all().await.unwrap().len(), 5);
        assert_eq!(rows.next().await.unwrap(), None);
        assert!(rows.fetch_all().await.unwrap().is_empty());
        assert_eq!(rows.row_number(), 5);
        assert_eq!(backend.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_stream_yields_same_rows() {
        let backend = MockBackend::new(three_pages());
        let rows = result_set(&backend).await;

        let collected: Vec<Row> = rows.into_stream().try_collect().await.unwrap();

        assert_eq!(collected.len(), 5);
        assert_eq!(collected[4], vec![json!(5)]);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let backend = MockBackend::new(vec![
            json_response(page("q1", "RUNNING", Some("/v1/statement/q1/1"), None, Some(json!([[1]])))),
            crate::test_utils::test_utils::status_response(500, "boom"),
        ]);
        let mut rows = result_set(&backend).await;

        assert_eq!(rows.next().await.unwrap(), Some(vec![json!(1)]));
        assert!(matches!(rows.next().await, Err(PrestoError::Http { status: 500, .. })));
    }
}
