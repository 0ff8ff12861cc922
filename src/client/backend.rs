use crate::error::PrestoError;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use url::Url;


/// One outgoing HTTP exchange, fully described.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// The parts of an HTTP answer the protocol looks at.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Performs HTTP exchanges for a [`PrestoClient`](crate::PrestoClient).
///
/// Implementations must report an exchange that did not complete as
/// [`PrestoError::Connection`], and must return every completed exchange as
/// `Ok`, whatever its status code.
#[async_trait]
pub trait HttpBackend: Send + Sync + Debug {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, PrestoError>;
}

/// Attaches credentials to outgoing requests.
pub trait Authentication: Send + Sync + Debug {
    fn authenticate(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder;
}

/// HTTP basic authentication. Only allowed over `https`.
#[derive(Clone, Debug)]
pub struct BasicAuthentication {
    username: String,
    password: String,
}

impl BasicAuthentication {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl Authentication for BasicAuthentication {
    fn authenticate(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }
}


/// The production [`HttpBackend`], built on a pooled [`reqwest::Client`].
#[derive(Clone, Debug)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    auth: Option<Arc<dyn Authentication>>,
}

impl ReqwestBackend {
    pub fn new(
        request_timeout: Duration,
        redirect_policy: reqwest::redirect::Policy,
        auth: Option<Arc<dyn Authentication>>,
    ) -> Result<Self, PrestoError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .redirect(redirect_policy)
            .build()?;

        Ok(Self { client, auth })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, PrestoError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(auth) = &self.auth {
            builder = auth.authenticate(builder);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PrestoError::Connection(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| PrestoError::Connection(e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }
}
