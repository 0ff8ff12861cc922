//! Server-side transactions over the statement protocol.
//!
//! Presto keeps transactions on the coordinator, identified by an id the
//! client must send back with every statement. [`Transaction::begin`] runs
//! `START TRANSACTION` and picks the id up from the
//! `X-Presto-Started-Transaction-Id` response header; from then on every
//! query of the connection carries it, until `COMMIT` or `ROLLBACK` resets the
//! session to `NONE`.

use crate::client::PrestoClient;
use crate::constants::NO_TRANSACTION;
use crate::error::PrestoError;
use crate::query::Query;

use core::fmt;

const START_TRANSACTION: &str = "START TRANSACTION";
const COMMIT: &str = "COMMIT";
const ROLLBACK: &str = "ROLLBACK";


/// Isolation level requested for the transactions of a connection.
///
/// [`IsolationLevel::Autocommit`] means no transaction is opened implicitly:
/// each statement commits on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IsolationLevel {
    #[default]
    Autocommit = 0,
    ReadUncommitted = 1,
    ReadCommitted = 2,
    RepeatableRead = 3,
    Serializable = 4,
}

impl IsolationLevel {
    /// The level as spelled in `START TRANSACTION ISOLATION LEVEL ...`.
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            IsolationLevel::Autocommit => None,
            IsolationLevel::ReadUncommitted => Some("READ UNCOMMITTED"),
            IsolationLevel::ReadCommitted => Some("READ COMMITTED"),
            IsolationLevel::RepeatableRead => Some("REPEATABLE READ"),
            IsolationLevel::Serializable => Some("SERIALIZABLE"),
        }
    }
}

impl TryFrom<u8> for IsolationLevel {
    type Error = PrestoError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(IsolationLevel::Autocommit),
            1 => Ok(IsolationLevel::ReadUncommitted),
            2 => Ok(IsolationLevel::ReadCommitted),
            3 => Ok(IsolationLevel::RepeatableRead),
            4 => Ok(IsolationLevel::Serializable),
            _ => Err(PrestoError::Config(format!("invalid isolation level {}", level))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    NotStarted,
    Active,
    Committed,
    RolledBack,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionState::NotStarted => "not started",
            TransactionState::Active => "active",
            TransactionState::Committed => "committed",
            TransactionState::RolledBack => "rolled back",
        };
        f.write_str(name)
    }
}


#[derive(Debug)]
pub struct Transaction {
    client: PrestoClient,
    isolation_level: IsolationLevel,
    id: String,
    state: TransactionState,
}

impl Transaction {
    pub(crate) fn new(client: PrestoClient, isolation_level: IsolationLevel) -> Self {
        Self {
            client,
            isolation_level,
            id: NO_TRANSACTION.to_string(),
            state: TransactionState::NotStarted,
        }
    }

    /// The coordinator-assigned id, `NONE` until the transaction has begun.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn isolation_level(&self) -> IsolationLevel {
        self.isolation_level
    }

    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    pub async fn begin(&mut self) -> Result<(), PrestoError> {
        if self.state != TransactionState::NotStarted {
            return Err(PrestoError::Operational(format!(
                "failed to start transaction: transaction {} is {}",
                self.id, self.state
            )));
        }
        if self.client.session().read().await.in_transaction() {
            return Err(PrestoError::Operational(
                "failed to start transaction: another transaction is active".to_string(),
            ));
        }

        let sql = match self.isolation_level.as_sql() {
            Some(level) => format!("{} ISOLATION LEVEL {}", START_TRANSACTION, level),
            None => START_TRANSACTION.to_string(),
        };
        Query::new(self.client.clone(), sql).run().await?.fetch_all().await?;

        let id = self.client.session().read().await.transaction_id().to_string();
        if id == NO_TRANSACTION {
            return Err(PrestoError::Operational(
                "failed to start transaction: no transaction id returned".to_string(),
            ));
        }

        tracing::info!(transaction_id = %id, "Transaction started");
        self.id = id;
        self.state = TransactionState::Active;
        Ok(())
    }

    pub async fn commit(&mut self) -> Result<(), PrestoError> {
        self.finish(COMMIT, TransactionState::Committed).await
    }

    pub async fn rollback(&mut self) -> Result<(), PrestoError> {
        self.finish(ROLLBACK, TransactionState::RolledBack).await
    }

    /// Run `COMMIT` or `ROLLBACK` under this transaction's id.
    ///
    /// On failure the transaction stays active, so the caller may still roll
    /// it back.
    async fn finish(&mut self, sql: &str, outcome: TransactionState) -> Result<(), PrestoError> {
        if self.state != TransactionState::Active {
            return Err(PrestoError::Operational(format!(
                "failed to {} transaction {}: transaction is {}",
                sql.to_lowercase(),
                self.id,
                self.state
            )));
        }

        Query::new(self.client.clone(), sql).run().await?.fetch_all().await?;

        self.client.session().write().await.clear_transaction_id();
        self.state = outcome;
        tracing::info!(transaction_id = %self.id, "Transaction {}", outcome);
        Ok(())
    }
}
