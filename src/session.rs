//! Connection-scoped state sent with every request.
//!
//! A [`ClientSession`] is created by [`ConnectionBuilder::build`](crate::ConnectionBuilder::build)
//! and shared, behind a [`tokio::sync::RwLock`], with every cursor and query of
//! that connection. The coordinator itself keeps nothing between HTTP requests:
//! session properties, prepared statements and the transaction id all travel
//! as request headers and come back as response directives.
use crate::constants::NO_TRANSACTION;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;


/// Shared handle to the session of one connection.
pub type SharedSession = Arc<RwLock<ClientSession>>;

#[derive(Clone, Debug)]
pub struct ClientSession {
    pub user: String,
    pub source: String,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    /// Extra headers attached to every request.
    pub headers: HashMap<String, String>,
    pub(crate) properties: HashMap<String, String>,
    pub(crate) prepared_statements: HashMap<String, String>,
    pub(crate) transaction_id: String,
}

impl ClientSession {
    pub fn new(user: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            source: source.into(),
            catalog: None,
            schema: None,
            headers: HashMap::new(),
            properties: HashMap::new(),
            prepared_statements: HashMap::new(),
            transaction_id: NO_TRANSACTION.to_string(),
        }
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn clear_property(&mut self, name: &str) -> Option<String> {
        self.properties.remove(name)
    }

    pub fn prepared_statements(&self) -> &HashMap<String, String> {
        &self.prepared_statements
    }

    pub(crate) fn add_prepared_statement(&mut self, name: impl Into<String>, sql: impl Into<String>) {
        self.prepared_statements.insert(name.into(), sql.into());
    }

    pub(crate) fn remove_prepared_statement(&mut self, name: &str) -> Option<String> {
        self.prepared_statements.remove(name)
    }

    /// The active transaction id, or `NONE` in autocommit mode.
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction_id != NO_TRANSACTION
    }

    pub(crate) fn set_transaction_id(&mut self, id: impl Into<String>) {
        self.transaction_id = id.into();
    }

    pub(crate) fn clear_transaction_id(&mut self) {
        self.transaction_id = NO_TRANSACTION.to_string();
    }

    pub(crate) fn into_shared(self) -> SharedSession {
        Arc::new(RwLock::new(self))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_autocommit() {
        let session = ClientSession::new("test", "source");

        assert_eq!(session.transaction_id(), "NONE");
        assert!(!session.in_transaction());
        assert!(session.properties().is_empty());
    }

    #[test]
    fn properties_are_replaced_and_cleared() {
        let mut session = ClientSession::new("test", "source");

        session.set_property("query_max_run_time", "10m");
        session.set_property("query_max_run_time", "1h");
        assert_eq!(session.properties().get("query_max_run_time").map(String::as_str), Some("1h"));

        assert_eq!(session.clear_property("query_max_run_time"), Some("1h".to_string()));
        assert_eq!(session.clear_property("query_max_run_time"), None);
    }

    #[test]
    fn transaction_id_round_trip() {
        let mut session = ClientSession::new("test", "source");

        session.set_transaction_id("6b1b3b4e");
        assert!(session.in_transaction());

        session.clear_transaction_id();
        assert_eq!(session.transaction_id(), "NONE");
    }
}
