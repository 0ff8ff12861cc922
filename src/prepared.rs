//! Parameter binding through `PREPARE` / `EXECUTE` / `DEALLOCATE PREPARE`.
//!
//! The statement protocol cannot carry bind values, so a parameterized
//! statement is prepared under a fresh name, executed with its parameters
//! rendered as literals in the `USING` clause, then deallocated. The three
//! statements are separate queries; the prepared SQL reaches the coordinator
//! through the `X-Presto-Prepared-Statement` request header.

use crate::client::PrestoClient;
use crate::error::PrestoError;
use crate::literal::{Param, join_literals};
use crate::query::Query;
use crate::result::ResultSet;

use uuid::Uuid;


/// A statement name no other cursor will pick: `st_` followed by a v4 UUID.
pub(crate) fn unique_statement_name() -> String {
    format!("st_{}", Uuid::new_v4().simple())
}

/// Run `sql` with `params` bound to its `?` placeholders.
///
/// `params` must be an ordered sequence ([`Param::Array`] or [`Param::Row`]);
/// an empty one runs `sql` as is. The returned [`ResultSet`] belongs to the
/// `EXECUTE` query. `DEALLOCATE` is attempted whenever `PREPARE` succeeded,
/// and its failure is only logged.
pub(crate) async fn execute_prepared(
    client: &PrestoClient,
    sql: &str,
    params: Param,
) -> Result<ResultSet, PrestoError> {
    let values = match params {
        Param::Array(values) | Param::Row(values) => values,
        other => {
            return Err(PrestoError::InvalidParameters(format!(
                "parameters must be an ordered sequence, got {:?}",
                other
            )));
        }
    };
    if values.is_empty() {
        return Query::new(client.clone(), sql).run().await;
    }

    let literals = join_literals(values.iter())?;
    let name = unique_statement_name();

    Query::new(client.clone(), format!("PREPARE {} FROM {}", name, sql))
        .run()
        .await?
        .fetch_all()
        .await?;

    let result = Query::new(client.clone(), format!("EXECUTE {} USING {}", name, literals))
        .run()
        .await;

    deallocate(client, &name).await;
    result
}

async fn deallocate(client: &PrestoClient, name: &str) {
    let outcome = match Query::new(client.clone(), format!("DEALLOCATE PREPARE {}", name)).run().await {
        Ok(mut result) => result.fetch_all().await.map(|_| ()),
        Err(error) => Err(error),
    };
    if let Err(error) = outcome {
        tracing::warn!(statement = name, "Failed to deallocate prepared statement: {}", error);
    }

    client.session().write().await.remove_prepared_statement(name);
}
