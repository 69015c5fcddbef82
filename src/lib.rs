//! MySQL to T-SQL statement rewriting for the payroll backend's secondary
//! database adapter.
//!
//! ```ignore
//! use tsql_transpiler::{SqlValue, Transpiler};
//!
//! let result = Transpiler::default()
//!     .transpile("SELECT * FROM payslip WHERE employee_id = ? LIMIT ? OFFSET ?", vec![
//!         SqlValue::Int(7),
//!         SqlValue::Int(10),
//!         SqlValue::Int(20),
//!     ])?;
//!
//! assert_eq!(
//!     result.sql,
//!     "SELECT * FROM payslip WHERE employee_id = @p1 ORDER BY (SELECT NULL) OFFSET @p2 ROWS FETCH NEXT @p3 ROWS ONLY"
//! );
//! ```

pub mod parser;

pub mod error;
pub use error::{Pass, TranspileError, TranspileResult};

pub mod config;
pub use config::{ConfigError, TranspilerConfig};

pub mod value;
pub use value::SqlValue;

pub mod statement;
pub use statement::{RewriteResult, Statement};

pub mod transpiler;
pub use transpiler::{RewritePass, Transpiler};

pub mod adapter;
pub use adapter::{AdapterError, QueryOutput, SecondaryAdapter, Session};
