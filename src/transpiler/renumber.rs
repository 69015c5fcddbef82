use crate::{
    error::{Pass, TranspileError, TranspileResult},
    parser::PlaceholderOccurrence,
    statement::{RewriteResult, Statement},
    TranspilerConfig,
};

/// Final step: every `?` becomes a numbered named parameter, `@p1` bound to
/// `params[0]` and so on.
pub struct PlaceholderRenumberer;

impl PlaceholderRenumberer {
    pub fn renumber(statement: Statement, config: &TranspilerConfig) -> TranspileResult<RewriteResult> {
        let parse_error = |err| TranspileError::parse(Pass::Renumber, &statement.sql, err);

        let mut parser = statement.parser();
        let mut sql = String::with_capacity(statement.sql.len() + statement.params.len() * 2);
        let mut written = 0;
        let mut occurrences: Vec<PlaceholderOccurrence> = vec![];

        while !parser.eof() {
            let pivot = parser.position;
            if parser.skip_quoted().map_err(parse_error)? {
                sql.push_str(&parser.text_from_pivot(pivot));
                written += parser.position - pivot;
                continue;
            }

            if parser.is_placeholder() {
                let name = format!("{}{}", config.param_prefix, occurrences.len() + 1);
                let length = name.chars().count();
                sql.push_str(&name);
                occurrences.push(PlaceholderOccurrence {
                    index: occurrences.len(),
                    start: written,
                    end: written + length,
                    name: Some(name),
                });
                written += length;
            } else {
                sql.push(parser.current());
                written += 1;
            }
            parser.next();
        }

        if occurrences.len() != statement.params.len() {
            return Err(TranspileError::mismatch(
                Pass::Renumber,
                &statement.sql,
                statement.params.len(),
                occurrences.len(),
            ));
        }

        Ok(RewriteResult { sql, params: statement.params, occurrences })
    }
}
