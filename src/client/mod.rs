mod backend;
mod headers;
mod retry;
mod status;

pub use self::backend::{
    Authentication, BasicAuthentication, HttpBackend, HttpRequest, HttpResponse, ReqwestBackend,
};
pub use self::retry::RetryPolicy;
pub use self::status::{Column, QueryStatus, Row};
use self::status::StatementResponse;
use crate::constants;
use crate::error::PrestoError;
use crate::session::SharedSession;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use url::{Url, form_urlencoded};


/// The statement-protocol transport, used internally by [`Query`](crate::Query).
///
/// Every call performs exactly one HTTP exchange against the coordinator.
/// Session directives found in response headers are applied to the shared
/// session before the call returns, so the next request already carries them.
#[derive(Clone, Debug)]
pub struct PrestoClient {
    backend: Arc<dyn HttpBackend>,
    session: SharedSession,
    base_url: Url,
    retry: RetryPolicy,
}

impl PrestoClient {
    pub fn new(
        backend: Arc<dyn HttpBackend>,
        session: SharedSession,
        base_url: Url,
        retry: RetryPolicy,
    ) -> Self {
        Self { backend, session, base_url, retry }
    }

    /// Return the session shared by every query of this client.
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn statement_url(&self) -> Result<Url, PrestoError> {
        Ok(self.base_url.join(constants::URL_STATEMENT_PATH)?)
    }

    /// `POST` the SQL text, returning the first page of the query.
    pub async fn submit(&self, sql: &str) -> Result<QueryStatus, PrestoError> {
        let url = self.statement_url()?;
        let response = self.request(Method::POST, url, Some(sql.to_string())).await?;
        self.process(response).await
    }

    /// `GET` a continuation URI, returning the page it points to.
    pub async fn fetch(&self, next_uri: &str) -> Result<QueryStatus, PrestoError> {
        let url = Url::parse(next_uri)
            .map_err(|e| PrestoError::Operational(format!("invalid nextUri '{next_uri}': {e}")))?;
        let response = self.request(Method::GET, url, None).await?;
        self.process(response).await
    }

    /// Ask the coordinator to kill a query.
    pub async fn cancel(&self, query_id: &str) -> Result<(), PrestoError> {
        let url = self
            .base_url
            .join(&format!("{}/{}", constants::URL_QUERY_PATH, query_id))?;
        let response = self.request(Method::DELETE, url, None).await?;
        check_status(response)?;
        Ok(())
    }

    async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<String>,
    ) -> Result<HttpResponse, PrestoError> {
        let session = self.session.read().await;
        let headers = headers::session_headers(&session)?;
        drop(session);

        tracing::debug!(%method, %url, "Sending request");
        self.backend.send(HttpRequest { method, url, headers, body }).await
    }

    async fn process(&self, response: HttpResponse) -> Result<QueryStatus, PrestoError> {
        let response = check_status(response)?;
        self.apply_directives(&response.headers).await;

        let mut resp: StatementResponse = serde_json::from_str(&response.body)?;
        tracing::debug!(
            query_id = %resp.id,
            state = resp.stats.get("state").and_then(|s| s.as_str()).unwrap_or("UNKNOWN"),
            next_uri = resp.next_uri.as_deref().unwrap_or(""),
            rows = resp.data.as_ref().map_or(0, Vec::len),
            "HTTP {}", response.status
        );

        if let Some(error) = resp.error.take() {
            return Err(PrestoError::from_query_error(error));
        }

        Ok(resp.into())
    }

    /// Fold the session directives of a response into the shared session.
    async fn apply_directives(&self, headers: &HeaderMap) {
        const DIRECTIVES: [&str; 6] = [
            constants::HEADER_SET_SESSION,
            constants::HEADER_CLEAR_SESSION,
            constants::HEADER_STARTED_TRANSACTION,
            constants::HEADER_CLEAR_TRANSACTION,
            constants::HEADER_ADDED_PREPARE,
            constants::HEADER_DEALLOCATED_PREPARE,
        ];
        if !DIRECTIVES.iter().any(|name| headers.contains_key(*name)) {
            return;
        }

        let mut session = self.session.write().await;

        for directive in header_values(headers, constants::HEADER_SET_SESSION) {
            if let Some((name, value)) = headers::decode_pair(directive) {
                session.set_property(name, value);
            }
        }
        for name in header_values(headers, constants::HEADER_CLEAR_SESSION) {
            session.clear_property(name.trim());
        }
        for directive in header_values(headers, constants::HEADER_ADDED_PREPARE) {
            if let Some((name, sql)) = headers::decode_pair(directive) {
                session.add_prepared_statement(name, sql);
            }
        }
        for name in header_values(headers, constants::HEADER_DEALLOCATED_PREPARE) {
            session.remove_prepared_statement(&decode(name));
        }
        for id in header_values(headers, constants::HEADER_STARTED_TRANSACTION) {
            if id != constants::NO_TRANSACTION {
                session.set_transaction_id(id.trim());
            }
        }
        if headers.contains_key(constants::HEADER_CLEAR_TRANSACTION) {
            session.clear_transaction_id();
        }
    }
}

fn check_status(response: HttpResponse) -> Result<HttpResponse, PrestoError> {
    if response.status.is_success() {
        return Ok(response);
    }
    if response.status == StatusCode::SERVICE_UNAVAILABLE {
        return Err(PrestoError::Unavailable("service unavailable".to_string()));
    }
    Err(PrestoError::Http { status: response.status.as_u16(), body: response.body })
}

fn header_values<'a>(headers: &'a HeaderMap, name: &'static str) -> impl Iterator<Item = &'a str> {
    headers.get_all(name).iter().filter_map(|value| value.to_str().ok())
}

fn decode(value: &str) -> String {
    form_urlencoded::parse(format!("v={}", value.trim()).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}
