use once_cell::sync::Lazy;
use tracing::trace;

use crate::{
    error::{Pass, TranspileError, TranspileResult},
    parser::{ast::TextCollector, Dialect, ParseError, QueryParser, WordComparer},
    statement::Statement,
    transpiler::RewritePass,
    TranspilerConfig,
};

/// Keywords that may follow a derived table alias.
static FOLLOWERS: Lazy<Vec<WordComparer>> = Lazy::new(|| {
    [
        "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "CROSS", "OUTER", "ON", "WHERE", "GROUP BY", "ORDER BY",
        "HAVING", "UNION", "LIMIT", "OFFSET",
    ]
    .into_iter()
    .map(WordComparer::keyword)
    .collect()
});

/// Words that are never an alias.
const RESERVED: &[&str] = &[
    "AS", "AND", "OR", "NOT", "IN", "IS", "LIKE", "BETWEEN", "CASE", "WHEN", "THEN", "ELSE", "END", "ASC",
    "DESC", "ON", "USING", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "CROSS", "OUTER", "WHERE", "GROUP",
    "ORDER", "BY", "HAVING", "UNION", "ALL", "LIMIT", "OFFSET", "ROWS", "ROW", "FETCH", "NEXT", "ONLY",
    "SELECT", "FROM", "VALUES", "SET", "INTO", "COLLATE", "OVER", "WITH", "INTERSECT", "EXCEPT", "FOR",
    "NULL", "ESCAPE", "DIV", "MOD", "XOR", "REGEXP", "RLIKE", "PARTITION",
];

/// Writes `) t` as `) AS t` for derived tables.
pub struct SubqueryAliasNormalizer;

impl SubqueryAliasNormalizer {
    pub fn normalize(statement: Statement) -> TranspileResult<Statement> {
        let sql = SubqueryAliasNormalizer::normalize_text(&statement.sql, statement.dialect)
            .map_err(|err| TranspileError::parse(Pass::SubqueryAliases, &statement.sql, err))?;

        Ok(Statement { sql, ..statement })
    }

    pub fn normalize_text(sql: &str, dialect: Dialect) -> Result<String, ParseError> {
        let mut parser = QueryParser::with_dialect(sql, dialect);
        let mut out = String::with_capacity(sql.len() + 16);
        let mut pivot = 0;

        while !parser.eof() {
            if parser.skip_quoted()? {
                continue;
            }
            if parser.current() != ')' {
                parser.next();
                continue;
            }

            let after = parser.position + 1;
            if let Some(alias) = SubqueryAliasNormalizer::alias_after(&mut parser, after) {
                trace!(pass = %Pass::SubqueryAliases, alias = %alias, "derived table alias gets AS");
                out.push_str(&parser.text_from_range(pivot, after));
                out.push_str(" AS");
                pivot = after;
            }
            parser.position = after;
        }

        out.push_str(&parser.text_from_range(pivot, parser.length));
        Ok(out)
    }

    /// Alias text when `position` starts with whitespace, an identifier and
    /// then something that can only follow a table alias.
    fn alias_after(parser: &mut QueryParser, position: usize) -> Option<String> {
        if !parser.char_at(position).is_whitespace() {
            return None;
        }

        let mut start = position;
        while parser.char_at(start).is_whitespace() {
            start += 1;
        }
        let (start, end) = TextCollector::identifier_at(parser, start)?;
        let alias = parser.text_from_range(start, end);
        if !alias.starts_with('[') && RESERVED.iter().any(|word| word.eq_ignore_ascii_case(&alias)) {
            return None;
        }

        let mut next = end;
        while parser.char_at(next).is_whitespace() {
            next += 1;
        }
        if next >= parser.length || matches!(parser.char_at(next), ',' | ';' | ')') {
            return Some(alias);
        }

        parser.position = next;
        FOLLOWERS.iter().any(|follower| follower.compare(parser)).then_some(alias)
    }
}

impl RewritePass for SubqueryAliasNormalizer {
    fn pass(&self) -> Pass {
        Pass::SubqueryAliases
    }

    fn apply(&self, statement: Statement, _config: &TranspilerConfig) -> TranspileResult<Statement> {
        SubqueryAliasNormalizer::normalize(statement)
    }
}
