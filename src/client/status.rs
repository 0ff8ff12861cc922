use crate::error::QueryError;

use serde::Deserialize;
use serde_json::{Map, Value};


/// One result row, as the coordinator encodes it.
pub type Row = Vec<Value>;

/// A result column descriptor.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(rename = "typeSignature", default)]
    pub type_signature: Option<Value>,
}

/// Wire form of a statement response; every field the client does not
/// consume is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatementResponse {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) stats: Map<String, Value>,
    pub(crate) info_uri: Option<String>,
    pub(crate) next_uri: Option<String>,
    #[serde(default)]
    pub(crate) data: Option<Vec<Row>>,
    #[serde(default)]
    pub(crate) columns: Option<Vec<Column>>,
    #[serde(default)]
    pub(crate) error: Option<QueryError>,
}

/// The decoded form of one successful statement response.
#[derive(Clone, Debug)]
pub struct QueryStatus {
    pub id: String,
    pub stats: Map<String, Value>,
    pub info_uri: Option<String>,
    pub next_uri: Option<String>,
    pub rows: Vec<Row>,
    pub columns: Option<Vec<Column>>,
}

impl QueryStatus {
    /// The server-reported query state (`QUEUED`, `RUNNING`, `FINISHED`, ...).
    pub fn state(&self) -> Option<&str> {
        self.stats.get("state").and_then(Value::as_str)
    }

    pub fn is_terminal(&self) -> bool {
        self.next_uri.is_none()
    }
}

impl From<StatementResponse> for QueryStatus {
    fn from(resp: StatementResponse) -> Self {
        Self {
            id: resp.id,
            stats: resp.stats,
            info_uri: resp.info_uri,
            next_uri: resp.next_uri,
            rows: resp.data.unwrap_or_default(),
            columns: resp.columns,
        }
    }
}
