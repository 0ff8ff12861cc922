//! Drives one statement through the submission/continuation protocol.
//!
//! # Overview
//!
//! A [`Query`] is created with its SQL text and a [`PrestoClient`]. Calling
//! [`Query::execute`] POSTs the statement; every following [`Query::fetch`]
//! GETs the last continuation URI the coordinator returned. The query is
//! terminal as soon as a response carries no continuation URI, which can
//! already be the case for the very first response.
//!
//! Both calls go through the client's [`RetryPolicy`](crate::RetryPolicy), so
//! a `503` or a dropped connection re-issues the same request.
//!
//! Callers normally do not drive a [`Query`] by hand: [`Query::run`] executes
//! it and hands it to a [`ResultSet`], which pulls further pages on demand.

use crate::client::{Column, PrestoClient, QueryStatus, Row};
use crate::error::PrestoError;
use crate::result::ResultSet;

use serde_json::{Map, Value};


#[derive(Debug)]
pub struct Query {
    client: PrestoClient,
    sql: String,
    query_id: Option<String>,
    state: Option<String>,
    stats: Map<String, Value>,
    info_uri: Option<String>,
    next_uri: Option<String>,
    columns: Option<Vec<Column>>,
    finished: bool,
    cancelled: bool,
}

impl Query {
    pub fn new(client: PrestoClient, sql: impl Into<String>) -> Self {
        Self {
            client,
            sql: sql.into(),
            query_id: None,
            state: None,
            stats: Map::new(),
            info_uri: None,
            next_uri: None,
            columns: None,
            finished: false,
            cancelled: false,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Server-assigned id, known after the first response.
    pub fn query_id(&self) -> Option<&str> {
        self.query_id.as_deref()
    }

    /// Last state the coordinator reported.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn stats(&self) -> &Map<String, Value> {
        &self.stats
    }

    pub fn info_uri(&self) -> Option<&str> {
        self.info_uri.as_deref()
    }

    pub fn next_uri(&self) -> Option<&str> {
        self.next_uri.as_deref()
    }

    pub fn columns(&self) -> Option<&[Column]> {
        self.columns.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Submit the statement and return the rows of the first page.
    pub async fn execute(&mut self) -> Result<Vec<Row>, PrestoError> {
        if self.query_id.is_some() || self.finished {
            return Err(PrestoError::Operational(format!(
                "Query {} was already executed",
                self.query_id.as_deref().unwrap_or("<unknown>")
            )));
        }

        let client = &self.client;
        let sql = self.sql.as_str();
        let result = client.retry_policy().run(|| client.submit(sql)).await;

        self.advance(result)
    }

    /// Fetch the page behind the current continuation URI.
    pub async fn fetch(&mut self) -> Result<Vec<Row>, PrestoError> {
        let Some(next_uri) = self.next_uri.as_deref().filter(|_| !self.finished) else {
            return Err(PrestoError::Operational(format!(
                "Query {} is finished, there is nothing left to fetch",
                self.query_id.as_deref().unwrap_or("<not executed>")
            )));
        };

        let client = &self.client;
        let result = client.retry_policy().run(|| client.fetch(next_uri)).await;

        self.advance(result)
    }

    /// Execute the statement and wrap it in a [`ResultSet`] over its rows.
    pub async fn run(mut self) -> Result<ResultSet, PrestoError> {
        let rows = self.execute().await?;
        Ok(ResultSet::new(self, rows))
    }

    /// Ask the coordinator to kill this query.
    ///
    /// Sends `DELETE /v1/query/{queryId}` to the coordinator the client is
    /// connected to. The `infoUri` only serves the query's HTML page and is
    /// not used.
    pub async fn cancel(&mut self) -> Result<(), PrestoError> {
        let Some(query_id) = self.query_id.as_deref() else {
            return Err(PrestoError::Operational("Cancel query failed; no running query".to_string()));
        };
        if self.finished {
            return Err(PrestoError::Operational(
                "Cancel query failed; query already finished".to_string(),
            ));
        }

        tracing::debug!(query_id, "Cancelling query");
        self.client.cancel(query_id).await?;

        self.cancelled = true;
        self.finished = true;
        self.next_uri = None;
        Ok(())
    }

    fn advance(&mut self, result: Result<QueryStatus, PrestoError>) -> Result<Vec<Row>, PrestoError> {
        match result {
            Ok(status) => Ok(self.update(status)),
            Err(error) => {
                // The coordinator reports failed queries as terminal.
                if error.query_error().is_some() {
                    self.state = Some("FAILED".to_string());
                    self.finished = true;
                    self.next_uri = None;
                }
                Err(error)
            }
        }
    }

    fn update(&mut self, status: QueryStatus) -> Vec<Row> {
        self.state = status.state().map(str::to_string);
        self.query_id = Some(status.id);
        self.stats = status.stats;
        if status.info_uri.is_some() {
            self.info_uri = status.info_uri;
        }
        if status.columns.is_some() {
            self.columns = status.columns;
        }
        self.next_uri = status.next_uri;
        self.finished = self.next_uri.is_none();

        status.rows
    }
}
