//! Error types for the transpiler.

use std::fmt::Display;

use thiserror::Error;

use crate::parser::{ParseError, ParseErrorKind};

/// Rewrite step a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Locate,
    Pagination,
    Functions,
    GroupingAliases,
    SubqueryAliases,
    Renumber,
}

impl Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Pass::Locate => "locate",
            Pass::Pagination => "pagination",
            Pass::Functions => "functions",
            Pass::GroupingAliases => "grouping-aliases",
            Pass::SubqueryAliases => "subquery-aliases",
            Pass::Renumber => "renumber",
        })
    }
}

/// A statement that cannot be rewritten safely. Every variant carries the
/// statement text as the failing pass saw it.
#[derive(Debug, Clone, Error)]
pub enum TranspileError {
    /// A `LIMIT` clause that is none of the accepted shapes, in strict mode.
    #[error("[{pass}] unsupported pagination clause `{clause}` in: {sql}")]
    UnsupportedPagination { pass: Pass, sql: String, clause: String },

    /// Placeholders in the text and bound parameters went out of sync.
    #[error("[{pass}] {found} placeholder(s) for {expected} bound parameter(s) in: {sql}")]
    ParameterMismatch {
        pass: Pass,
        sql: String,
        expected: usize,
        found: usize,
    },

    #[error("[{pass}] unbalanced parentheses at {position} in: {sql}")]
    UnbalancedParentheses { pass: Pass, sql: String, position: usize },

    #[error("[{pass}] {source} in: {sql}")]
    Parse {
        pass: Pass,
        sql: String,
        #[source]
        source: ParseError,
    },
}

impl TranspileError {
    pub fn parse(pass: Pass, sql: &str, source: ParseError) -> Self {
        match source.kind {
            ParseErrorKind::UnbalancedParentheses => Self::UnbalancedParentheses {
                pass,
                sql: sql.to_string(),
                position: source.start,
            },
            _ => Self::Parse { pass, sql: sql.to_string(), source },
        }
    }

    pub fn mismatch(pass: Pass, sql: &str, expected: usize, found: usize) -> Self {
        Self::ParameterMismatch {
            pass,
            sql: sql.to_string(),
            expected,
            found,
        }
    }

    pub fn pass(&self) -> Pass {
        match self {
            Self::UnsupportedPagination { pass, .. } |
            Self::ParameterMismatch { pass, .. } |
            Self::UnbalancedParentheses { pass, .. } |
            Self::Parse { pass, .. } => *pass,
        }
    }

    pub fn sql(&self) -> &str {
        match self {
            Self::UnsupportedPagination { sql, .. } |
            Self::ParameterMismatch { sql, .. } |
            Self::UnbalancedParentheses { sql, .. } |
            Self::Parse { sql, .. } => sql,
        }
    }
}

/// Result type alias for transpiler operations.
pub type TranspileResult<T> = Result<T, TranspileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::QueryParser;

    #[test]
    fn test_error_display() {
        let err = TranspileError::mismatch(Pass::Renumber, "SELECT ?", 2, 1);

        assert_eq!(
            err.to_string(),
            "[renumber] 1 placeholder(s) for 2 bound parameter(s) in: SELECT ?"
        );
        assert_eq!(err.pass(), Pass::Renumber);
        assert_eq!(err.sql(), "SELECT ?");
    }

    #[test]
    fn test_unbalanced_parse_error_is_promoted() {
        let parser = QueryParser::new("CONCAT(a");
        let source = ParseError::unbalanced(6, &parser);

        let err = TranspileError::parse(Pass::Functions, "CONCAT(a", source);

        assert!(matches!(
            err,
            TranspileError::UnbalancedParentheses { pass: Pass::Functions, position: 6, .. }
        ));
    }

    #[test]
    fn test_other_parse_errors_are_wrapped() {
        let parser = QueryParser::new("'abc");
        let source = ParseError::unterminated(0, &parser);

        let err = TranspileError::parse(Pass::Locate, "'abc", source);

        assert!(matches!(err, TranspileError::Parse { pass: Pass::Locate, .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
