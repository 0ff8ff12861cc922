//! Statement execution and row retrieval for one [`Connection`](crate::Connection).
//!
//! # Overview
//!
//! A [`Cursor`] runs one statement at a time. [`Cursor::execute`] submits SQL
//! text; [`Cursor::execute_with`] and the fluent [`Cursor::query`] builder bind
//! parameters through a prepared statement. Rows are then pulled with
//! [`fetch_one`](Cursor::fetch_one), [`fetch_many`](Cursor::fetch_many) or
//! [`fetch_all`](Cursor::fetch_all); pages are requested from the coordinator
//! only as those calls need them.
//!
//! # Example
//!
//! ```no_run
//! use presto_client::Connection;
//!
//! # tokio_test::block_on(async {
//! let mut connection = Connection::builder("localhost").user("test").catalog("tpch").build().unwrap();
//! let mut cursor = connection.cursor().await.unwrap();
//!
//! let rows = cursor
//!     .query("SELECT name FROM tiny.nation WHERE regionkey = ? AND name <> ?")
//!     .bind(1)
//!     .bind("BRAZIL")
//!     .execute()
//!     .await
//!     .unwrap()
//!     .fetch_all()
//!     .await
//!     .unwrap();
//! # });
//! ```

use crate::client::{PrestoClient, Row};
use crate::error::PrestoError;
use crate::literal::{Param, ToParam};
use crate::prepared;
use crate::query::Query;
use crate::result::ResultSet;

use serde_json::{Map, Value};


#[derive(Debug)]
pub struct Cursor {
    client: PrestoClient,
    result: Option<ResultSet>,
    /// Number of rows [`fetch_many`](Cursor::fetch_many) returns by default.
    pub arraysize: usize,
}

impl Cursor {
    pub(crate) fn new(client: PrestoClient) -> Self {
        Self { client, result: None, arraysize: 1 }
    }

    /// Run a statement, replacing the result of the previous one.
    pub async fn execute(&mut self, sql: &str) -> Result<&mut Self, PrestoError> {
        self.result = None;
        self.result = Some(Query::new(self.client.clone(), sql).run().await?);
        Ok(self)
    }

    /// Run a statement with `params` bound to its `?` placeholders.
    ///
    /// `params` must convert to an ordered sequence: a tuple, a `Vec` or a
    /// [`Param::Array`]/[`Param::Row`]. Anything else fails with
    /// [`PrestoError::InvalidParameters`].
    pub async fn execute_with<P: ToParam>(&mut self, sql: &str, params: P) -> Result<&mut Self, PrestoError> {
        self.result = None;
        self.result = Some(prepared::execute_prepared(&self.client, sql, params.to_param()).await?);
        Ok(self)
    }

    /// Start a parameterized statement; chain [`bind`](StatementBuilder::bind)
    /// calls and finish with [`execute`](StatementBuilder::execute).
    pub fn query(&mut self, sql: &str) -> StatementBuilder<'_> {
        StatementBuilder::new(self, sql)
    }

    /// The next row, or `None` once the result is exhausted.
    pub async fn fetch_one(&mut self) -> Result<Option<Row>, PrestoError> {
        self.result_mut()?.next().await
    }

    /// Up to `size` rows (default [`arraysize`](Cursor::arraysize)); fewer, or
    /// none, at the end of the result.
    pub async fn fetch_many(&mut self, size: Option<usize>) -> Result<Vec<Row>, PrestoError> {
        let size = size.unwrap_or(self.arraysize);
        let result = self.result_mut()?;

        let mut rows = Vec::new();
        while rows.len() < size {
            match result.next().await? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    pub async fn fetch_all(&mut self) -> Result<Vec<Row>, PrestoError> {
        self.result_mut()?.fetch_all().await
    }

    /// Ask the coordinator to kill the running statement.
    pub async fn cancel(&mut self) -> Result<(), PrestoError> {
        match self.result.as_mut() {
            Some(result) => result.query_mut().cancel().await,
            None => Err(PrestoError::Operational("Cancel query failed; no running query".to_string())),
        }
    }

    /// `(name, type)` of each result column, once the coordinator sent them.
    pub fn description(&self) -> Option<Vec<(String, String)>> {
        let columns = self.result.as_ref()?.columns()?;
        Some(
            columns
                .iter()
                .map(|c| (c.name.clone(), c.column_type.clone()))
                .collect(),
        )
    }

    /// Latest statistics of the running statement, including its `queryId`.
    pub fn stats(&self) -> Option<Map<String, Value>> {
        let query = self.result.as_ref()?.query();
        let mut stats = query.stats().clone();
        if let Some(id) = query.query_id() {
            stats.insert("queryId".to_string(), Value::String(id.to_string()));
        }
        Some(stats)
    }

    pub fn query_id(&self) -> Option<&str> {
        self.result.as_ref()?.query().query_id()
    }

    /// Rows fetched from the current result so far.
    pub fn row_number(&self) -> Option<u64> {
        self.result.as_ref().map(ResultSet::row_number)
    }

    /// Release the cursor, cancelling a statement that is still running.
    pub async fn close(mut self) {
        let Some(mut result) = self.result.take() else { return };
        let query = result.query_mut();
        if query.is_finished() {
            return;
        }
        if let Err(error) = query.cancel().await {
            tracing::warn!(query_id = query.query_id().unwrap_or(""), "Failed to cancel query on close: {}", error);
        }
    }

    fn result_mut(&mut self) -> Result<&mut ResultSet, PrestoError> {
        self.result
            .as_mut()
            .ok_or_else(|| PrestoError::Operational("no statement has been executed".to_string()))
    }
}


/// Fluent parameter binding for [`Cursor::query`].
pub struct StatementBuilder<'a> {
    cursor: &'a mut Cursor,
    sql: String,
    params: Vec<Param>,
}

impl<'a> StatementBuilder<'a> {
    fn new(cursor: &'a mut Cursor, sql: &str) -> Self {
        Self {
            cursor,
            sql: sql.to_string(),
            params: Vec::new(),
        }
    }

    pub fn bind<T: ToParam>(mut self, value: T) -> Self {
        self.params.push(value.to_param());
        self
    }

    pub async fn execute(self) -> Result<&'a mut Cursor, PrestoError> {
        self.cursor.execute_with(&self.sql, Param::Array(self.params)).await
    }
}
