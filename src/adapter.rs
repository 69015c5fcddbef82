//! Secondary database adapter boundary.
//!
//! The backend speaks MySQL; when the secondary database is SQL Server every
//! statement goes through the [`Transpiler`] before it reaches a [`Session`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{SqlValue, TranspileError, Transpiler, TranspilerConfig};

/// Rows returned by a session, one JSON value per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryOutput {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_objects(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let object = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<serde_json::Map<String, Value>>();
                Value::Object(object)
            })
            .collect()
    }
}

/// A connection to the secondary database able to run T-SQL with named parameters.
pub trait Session {
    type Error: std::error::Error + Send + Sync + 'static;

    fn bind(&mut self, name: &str, value: &SqlValue) -> Result<(), Self::Error>;

    fn execute(&mut self, sql: &str) -> Result<QueryOutput, Self::Error>;
}

#[derive(Debug, Error)]
pub enum AdapterError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Transpile(#[from] TranspileError),

    #[error("secondary database error: {0}")]
    Session(#[source] E),
}

/// Runs MySQL statements against a T-SQL session.
pub struct SecondaryAdapter<S: Session> {
    transpiler: Transpiler,
    session: S,
}

impl<S: Session> SecondaryAdapter<S> {
    pub fn new(session: S) -> Self {
        Self { transpiler: Transpiler::default(), session }
    }

    pub fn with_config(session: S, config: TranspilerConfig) -> Self {
        Self { transpiler: Transpiler::new(config), session }
    }

    pub fn query(&mut self, sql: &str, params: Vec<SqlValue>) -> Result<QueryOutput, AdapterError<S::Error>> {
        let rewritten = self.transpiler.transpile(sql, params).inspect_err(|err| {
            warn!(pass = %err.pass(), error = %err, "statement rejected before reaching the secondary database");
        })?;

        for (name, value) in rewritten.bindings() {
            self.session.bind(name, value).map_err(AdapterError::Session)?;
        }
        debug!(sql = %rewritten.sql, params = rewritten.params.len(), "executing on secondary database");

        self.session.execute(&rewritten.sql).map_err(AdapterError::Session)
    }

    pub fn query_json(&mut self, sql: &str, params: &[Value]) -> Result<QueryOutput, AdapterError<S::Error>> {
        self.query(sql, params.iter().map(SqlValue::from).collect())
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }
}
