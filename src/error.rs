use core::fmt;
use serde::Deserialize;


/// Line and column of a failure inside the submitted SQL text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLocation {
    pub line_number: u32,
    pub column_number: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct FailureInfo {
    #[serde(rename = "type")]
    pub(crate) failure_type: Option<String>,
}

/// The `error` object of a failed statement response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryError {
    pub error_code: i64,
    pub error_name: String,
    pub error_type: String,
    pub message: Option<String>,
    pub error_location: Option<ErrorLocation>,
    #[serde(default)]
    pub(crate) failure_info: Option<FailureInfo>,
}

impl QueryError {
    /// The server-side exception type, when the coordinator reported one.
    pub fn failure_type(&self) -> Option<&str> {
        self.failure_info.as_ref()?.failure_type.as_deref()
    }

    /// `(line, column)` of the failure in the SQL text.
    pub fn location(&self) -> Option<(u32, u32)> {
        self.error_location.map(|l| (l.line_number, l.column_number))
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("Presto did not return an error message")
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type={}, name={}, message=\"{}\"", self.error_type, self.error_name, self.message())?;
        if let Some((line, column)) = self.location() {
            write!(f, ", location={line}:{column}")?;
        }
        Ok(())
    }
}


/// Different `Presto` error types.
#[derive(Debug)]
pub enum PrestoError {
    /// The coordinator answered `503 Service Unavailable`.
    Unavailable(String),
    /// The HTTP exchange did not complete.
    Connection(String),
    /// Any other non-2xx answer.
    Http { status: u16, body: String },
    /// Failure the engine attributes to something outside itself.
    External(QueryError),
    /// Bad SQL, missing objects and other caller mistakes.
    User(QueryError),
    /// Every other engine-reported failure.
    Internal(QueryError),
    Operational(String),
    UnsupportedParameter(String),
    InvalidParameters(String),
    Decode(serde_json::Error),
    InvalidConnectionUrl(String),
    InvalidHeader(String),
    Config(String),
}

impl PrestoError {
    /// Whether the retry policy may re-issue the failed request.
    pub fn is_transient(&self) -> bool {
        matches!(self, PrestoError::Unavailable(_) | PrestoError::Connection(_))
    }

    /// The structured server error, for the three engine-reported kinds.
    pub fn query_error(&self) -> Option<&QueryError> {
        match self {
            PrestoError::External(e) | PrestoError::User(e) | PrestoError::Internal(e) => Some(e),
            _ => None,
        }
    }

    /// Sort a server `error` object into the taxonomy by its `errorType`.
    pub(crate) fn from_query_error(error: QueryError) -> Self {
        match error.error_type.as_str() {
            "EXTERNAL" => PrestoError::External(error),
            "USER_ERROR" => PrestoError::User(error),
            _ => PrestoError::Internal(error),
        }
    }
}

impl fmt::Display for PrestoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrestoError::Unavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            PrestoError::Connection(msg) => write!(f, "Connection Error: {}", msg),
            PrestoError::Http { status, body } => write!(f, "HTTP Error {}: {}", status, body),
            PrestoError::External(e) => write!(f, "External Error: {}", e),
            PrestoError::User(e) => write!(f, "User Error: {}", e),
            PrestoError::Internal(e) => write!(f, "Internal Error: {}", e),
            PrestoError::Operational(msg) => write!(f, "Operational Error: {}", msg),
            PrestoError::UnsupportedParameter(msg) => write!(f, "Unsupported Parameter: {}", msg),
            PrestoError::InvalidParameters(msg) => write!(f, "Invalid Parameters: {}", msg),
            PrestoError::Decode(e) => write!(f, "Invalid Response: {}", e),
            PrestoError::InvalidConnectionUrl(msg) => write!(f, "Invalid Connection URL: {}", msg),
            PrestoError::InvalidHeader(msg) => write!(f, "Invalid Header: {}", msg),
            PrestoError::Config(msg) => write!(f, "Invalid Configuration: {}", msg),
        }
    }
}

impl std::error::Error for PrestoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrestoError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PrestoError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            PrestoError::Config(error.to_string())
        } else {
            PrestoError::Connection(error.to_string())
        }
    }
}

impl From<serde_json::Error> for PrestoError {
    fn from(error: serde_json::Error) -> Self {
        PrestoError::Decode(error)
    }
}

impl From<url::ParseError> for PrestoError {
    fn from(error: url::ParseError) -> Self {
        PrestoError::InvalidConnectionUrl(error.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for PrestoError {
    fn from(error: reqwest::header::InvalidHeaderName) -> Self {
        PrestoError::InvalidHeader(error.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for PrestoError {
    fn from(error: reqwest::header::InvalidHeaderValue) -> Self {
        PrestoError::InvalidHeader(error.to_string())
    }
}
