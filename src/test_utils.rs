#[cfg(test)]
pub mod test_utils {
    use crate::client::{HttpBackend, HttpRequest, HttpResponse, PrestoClient, RetryPolicy};
    use crate::error::PrestoError;
    use crate::session::ClientSession;

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use url::Url;

    pub const BASE_URL: &str = "http://coordinator:8080";

    /// An [`HttpBackend`] answering from a script and recording every request.
    #[derive(Debug, Default)]
    pub struct MockBackend {
        responses: Mutex<VecDeque<Result<HttpResponse, PrestoError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl MockBackend {
        pub fn new(responses: Vec<Result<HttpResponse, PrestoError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// SQL bodies of the `POST` requests, in order.
        pub fn statements(&self) -> Vec<String> {
            self.requests()
                .into_iter()
                .filter_map(|r| r.body)
                .collect()
        }

        pub fn remaining(&self) -> usize {
            self.responses.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpBackend for MockBackend {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, PrestoError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(PrestoError::Operational("mock backend exhausted".to_string())))
        }
    }

    /// A client with a `test_user` session pointed at [`BASE_URL`].
    pub fn client_with(backend: &Arc<MockBackend>) -> PrestoClient {
        let mut session = ClientSession::new("test_user", "test_source");
        session.catalog = Some("test_catalog".to_string());
        session.schema = Some("test_schema".to_string());

        PrestoClient::new(
            backend.clone(),
            session.into_shared(),
            Url::parse(BASE_URL).unwrap(),
            RetryPolicy::default().with_base_delay(Duration::from_millis(1)),
        )
    }

    pub fn json_response(body: Value) -> Result<HttpResponse, PrestoError> {
        Ok(HttpResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.to_string(),
        })
    }

    pub fn status_response(status: u16, body: &str) -> Result<HttpResponse, PrestoError> {
        Ok(HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.to_string(),
        })
    }

    /// Append response headers; names may repeat.
    pub fn with_headers(
        response: Result<HttpResponse, PrestoError>,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, PrestoError> {
        response.map(|mut resp| {
            for (name, value) in headers {
                resp.headers.append(
                    HeaderName::from_bytes(name.as_bytes()).unwrap(),
                    HeaderValue::from_str(value).unwrap(),
                );
            }
            resp
        })
    }

    /// One statement page. `next` is a path relative to [`BASE_URL`].
    pub fn page(id: &str, state: &str, next: Option<&str>, columns: Option<Value>, rows: Option<Value>) -> Value {
        let mut body = json!({
            "id": id,
            "infoUri": format!("{BASE_URL}/query.html?{id}"),
            "stats": {"state": state, "processedRows": 0},
        });
        if let Some(next) = next {
            body["nextUri"] = json!(format!("{BASE_URL}{next}"));
        }
        if let Some(columns) = columns {
            body["columns"] = columns;
        }
        if let Some(rows) = rows {
            body["data"] = rows;
        }
        body
    }

    /// A query that completes on its first response.
    pub fn finished(id: &str) -> Result<HttpResponse, PrestoError> {
        json_response(page(id, "FINISHED", None, None, None))
    }

    pub fn resp_data_post_0() -> Value {
        json!({
            "nextUri": "http://coordinator:8080/v1/statement/20161115_222658_00040_xtnym/1",
            "id": "20161115_222658_00040_xtnym",
            "taskDownloadUris": [],
            "infoUri": "http://coordinator:8080/query.html?20161115_222658_00040_xtnym",
            "stats": {
                "scheduled": false,
                "runningSplits": 0,
                "processedRows": 0,
                "queuedSplits": 0,
                "processedBytes": 0,
                "state": "QUEUED",
                "completedSplits": 0,
                "queued": true,
                "cpuTimeMillis": 0,
                "totalSplits": 0,
                "nodes": 0,
                "userTimeMillis": 0,
                "wallTimeMillis": 0
            }
        })
    }

    pub fn resp_data_get_0() -> Value {
        let varchar = json!({
            "typeArguments": [],
            "arguments": [{"kind": "LONG_LITERAL", "value": 2147483647}],
            "literalArguments": [],
            "rawType": "varchar"
        });
        json!({
            "id": "20161116_195728_00000_xtnym",
            "nextUri": "http://coordinator:8080/v1/statement/20161116_195728_00000_xtnym/2",
            "data": [
                ["UUID-0", "http://worker0:8080", "0.157", false, "active"],
                ["UUID-1", "http://worker1:8080", "0.157", false, "active"],
                ["UUID-2", "http://worker2:8080", "0.157", false, "active"]
            ],
            "columns": [
                {"name": "node_id", "type": "varchar", "typeSignature": varchar.clone()},
                {"name": "http_uri", "type": "varchar", "typeSignature": varchar.clone()},
                {"name": "node_version", "type": "varchar", "typeSignature": varchar.clone()},
                {"name": "coordinator", "type": "boolean", "typeSignature": {
                    "typeArguments": [],
                    "arguments": [],
                    "literalArguments": [],
                    "rawType": "boolean"
                }},
                {"name": "state", "type": "varchar", "typeSignature": varchar.clone()}
            ],
            "taskDownloadUris": [],
            "partialCancelUri": "http://localhost:8080/v1/stage/20161116_195728_00000_xtnym.0",
            "stats": {
                "nodes": 2,
                "processedBytes": 880,
                "scheduled": true,
                "completedSplits": 2,
                "userTimeMillis": 0,
                "state": "RUNNING",
                "queued": false,
                "cpuTimeMillis": 3,
                "runningSplits": 0,
                "totalSplits": 2,
                "processedRows": 8,
                "queuedSplits": 0,
                "wallTimeMillis": 36
            },
            "infoUri": "http://coordinator:8080/query.html?20161116_195728_00000_xtnym"
        })
    }

    pub fn resp_error_get_0() -> Value {
        json!({
            "error": {
                "errorCode": 1,
                "errorLocation": {"columnNumber": 15, "lineNumber": 1},
                "errorName": "SYNTAX_ERROR",
                "errorType": "USER_ERROR",
                "failureInfo": {
                    "errorLocation": {"columnNumber": 15, "lineNumber": 1},
                    "message": "line 1:15: Schema must be specified when session schema is not set",
                    "stack": [
                        "com.facebook.presto.metadata.MetadataUtil.createQualifiedObjectName(MetadataUtil.java:132)",
                        "com.facebook.presto.sql.analyzer.StatementAnalyzer.visitTable(StatementAnalyzer.java:529)"
                    ],
                    "suppressed": [],
                    "type": "com.facebook.presto.sql.analyzer.SemanticException"
                },
                "message": "line 1:15: Schema must be specified when session schema is not set"
            },
            "id": "20161116_205844_00002_xtnym",
            "infoUri": "http://test02.presto.data.facebook.com:7777/query.html?20161116_205844_00002_xtnym",
            "stats": {
                "completedSplits": 0,
                "cpuTimeMillis": 0,
                "nodes": 0,
                "processedBytes": 0,
                "processedRows": 0,
                "queued": false,
                "queuedSplits": 0,
                "runningSplits": 0,
                "scheduled": false,
                "state": "FAILED",
                "totalSplits": 0,
                "userTimeMillis": 0,
                "wallTimeMillis": 0
            },
            "taskDownloadUris": []
        })
    }
}
