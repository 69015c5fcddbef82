use tracing::{debug, warn};

use crate::{
    error::{Pass, TranspileError, TranspileResult},
    parser::{ast::{ArgsParser, ClauseLayout, LimitAndOffsetParser, Operand, PaginationSpec}, Phase, PlaceholderLocator, PlaceholderOccurrence, QueryParser},
    statement::{Statement, StatementBuilder},
    transpiler::RewritePass,
    TranspilerConfig,
};

/// Turns `LIMIT` into `OFFSET .. ROWS FETCH NEXT .. ROWS ONLY`, adding the
/// `ORDER BY` T-SQL requires for it. Operands are written offset first, so
/// `LIMIT ? OFFSET ?` swaps its two parameter values.
pub struct PaginationRewriter;

impl PaginationRewriter {
    pub fn rewrite(statement: Statement, config: &TranspilerConfig) -> TranspileResult<Statement> {
        let parse_error = |err| TranspileError::parse(Pass::Pagination, &statement.sql, err);

        let mut parser = statement.parser();
        let layout = ClauseLayout::parse(&mut parser).map_err(parse_error)?;
        let Some(clause) = layout.last(Phase::LimitAndOffset).copied() else {
            return Ok(statement);
        };
        let occurrences = PlaceholderLocator::locate_with(&mut parser).map_err(parse_error)?;

        let spec = if layout.has(Phase::Projection) {
            LimitAndOffsetParser::parse(&mut parser, &clause, &occurrences, layout.has(Phase::OrderBy))
        } else {
            None
        };

        let Some(spec) = spec else {
            let clause_text = parser.text_from_range(clause.start, clause.end);
            if config.strict_pagination {
                return Err(TranspileError::UnsupportedPagination {
                    pass: Pass::Pagination,
                    sql: statement.sql.clone(),
                    clause: clause_text,
                });
            }
            warn!(pass = %Pass::Pagination, clause = %clause_text, sql = %statement.sql,
                "unrecognized LIMIT clause passed through untouched");
            return Ok(statement);
        };

        debug!(
            pass = %Pass::Pagination,
            form = ?spec.form,
            count = %spec.count,
            offset = %spec.offset,
            params_before = PlaceholderLocator::count_before(&occurrences, spec.start),
            "LIMIT clause recognized"
        );
        if let Some((count, offset)) = spec.required_swap() {
            debug!(count = count.index, offset = offset.index, "count and offset parameters swap places");
        }

        Ok(PaginationRewriter::render(&parser, &occurrences, &statement, &spec, config))
    }

    fn render(
        parser: &QueryParser,
        occurrences: &[PlaceholderOccurrence],
        statement: &Statement,
        spec: &PaginationSpec,
        config: &TranspilerConfig,
    ) -> Statement {
        let (_, head_end) = ArgsParser::trim_span(parser, 0, spec.start);

        let mut builder = StatementBuilder::new(parser, occurrences, &statement.params);
        builder.push_span(0, head_end);
        if !spec.had_order_by {
            builder.push_str(" ORDER BY ").push_str(&config.fallback_order_by);
        }
        builder.push_str(" OFFSET ");
        PaginationRewriter::push_operand(&mut builder, &spec.offset);
        builder.push_str(" ROWS FETCH NEXT ");
        PaginationRewriter::push_operand(&mut builder, &spec.count);
        builder.push_str(" ROWS ONLY");
        builder.push_span(spec.end, parser.length);

        builder.finish()
    }

    fn push_operand(builder: &mut StatementBuilder<'_>, operand: &Operand) {
        match operand {
            Operand::Literal(value) => builder.push_str(&value.to_string()),
            Operand::Param { position, .. } => builder.push_span(*position, position + 1),
        };
    }
}

impl RewritePass for PaginationRewriter {
    fn pass(&self) -> Pass {
        Pass::Pagination
    }

    fn apply(&self, statement: Statement, config: &TranspilerConfig) -> TranspileResult<Statement> {
        PaginationRewriter::rewrite(statement, config)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{Pass, TranspileError},
        statement::Statement,
        transpiler::PaginationRewriter,
        SqlValue, TranspilerConfig,
    };

    fn rewrite(sql: &str, params: Vec<SqlValue>) -> Statement {
        PaginationRewriter::rewrite(Statement::new(sql, params), &TranspilerConfig::default())
            .expect("Failed to rewrite pagination")
    }

    #[test]
    fn test_limit_only_gets_neutral_order() {
        let statement = rewrite("SELECT * FROM t LIMIT 10", vec![]);

        assert_eq!(statement.sql, "SELECT * FROM t ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY");
    }

    #[test]
    fn test_limit_offset_keeps_existing_order() {
        let statement = rewrite("SELECT * FROM t ORDER BY id DESC LIMIT 10 OFFSET 5", vec![]);

        assert_eq!(statement.sql, "SELECT * FROM t ORDER BY id DESC OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY");
    }

    #[test]
    fn test_legacy_two_argument_limit() {
        let statement = rewrite("SELECT * FROM t ORDER BY id LIMIT 5, 10;", vec![]);

        assert_eq!(statement.sql, "SELECT * FROM t ORDER BY id OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY;");
    }

    #[test]
    fn test_order_by_goes_after_grouping() {
        let statement = rewrite("SELECT a, COUNT(*) FROM t WHERE b = 1 GROUP BY a HAVING COUNT(*) > 1 LIMIT 3", vec![]);

        assert_eq!(
            statement.sql,
            "SELECT a, COUNT(*) FROM t WHERE b = 1 GROUP BY a HAVING COUNT(*) > 1 ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 3 ROWS ONLY"
        );
    }

    #[test]
    fn test_count_offset_params_are_swapped() {
        let statement = rewrite(
            "SELECT * FROM t WHERE a = ? LIMIT ? OFFSET ?",
            vec![SqlValue::from("X"), SqlValue::Int(10), SqlValue::Int(5)],
        );

        assert_eq!(statement.sql, "SELECT * FROM t WHERE a = ? ORDER BY (SELECT NULL) OFFSET ? ROWS FETCH NEXT ? ROWS ONLY");
        assert_eq!(statement.params, vec![SqlValue::from("X"), SqlValue::Int(5), SqlValue::Int(10)]);
    }

    #[test]
    fn test_offset_count_params_keep_order() {
        let statement = rewrite(
            "SELECT * FROM t WHERE a = ? LIMIT ?, ?",
            vec![SqlValue::from("X"), SqlValue::Int(5), SqlValue::Int(10)],
        );

        assert_eq!(statement.params, vec![SqlValue::from("X"), SqlValue::Int(5), SqlValue::Int(10)]);
    }

    #[test]
    fn test_single_param_with_literal() {
        let statement = rewrite("SELECT * FROM t LIMIT ? OFFSET 20", vec![SqlValue::Int(10)]);

        assert_eq!(statement.sql, "SELECT * FROM t ORDER BY (SELECT NULL) OFFSET 20 ROWS FETCH NEXT ? ROWS ONLY");
        assert_eq!(statement.params, vec![SqlValue::Int(10)]);
    }

    #[test]
    fn test_trailing_comment_is_kept() {
        let statement = rewrite("SELECT * FROM t LIMIT 10 -- note", vec![]);

        assert_eq!(statement.sql, "SELECT * FROM t ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY -- note");
    }

    #[test]
    fn test_subquery_limit_is_left_alone() {
        let sql = "SELECT * FROM (SELECT id FROM t LIMIT 5) x";

        assert_eq!(rewrite(sql, vec![]).sql, sql);
    }

    #[test]
    fn test_unrecognized_limit_passes_through() {
        let sql = "SELECT * FROM t LIMIT 10 + 5";

        assert_eq!(rewrite(sql, vec![]).sql, sql);
    }

    #[test]
    fn test_unrecognized_limit_in_strict_mode() {
        let result = PaginationRewriter::rewrite(
            Statement::new("DELETE FROM t WHERE a = 1 LIMIT 10", vec![]),
            &TranspilerConfig::default().strict(),
        );

        match result {
            Err(TranspileError::UnsupportedPagination { pass, clause, .. }) => {
                assert_eq!(pass, Pass::Pagination);
                assert_eq!(clause, "LIMIT 10");
            },
            _ => panic!(),
        }
    }

    #[test]
    fn test_custom_fallback_order() {
        let statement = PaginationRewriter::rewrite(
            Statement::new("SELECT id FROM t LIMIT 1", vec![]),
            &TranspilerConfig::default().with_fallback_order_by("1"),
        )
        .expect("Failed to rewrite pagination");

        assert_eq!(statement.sql, "SELECT id FROM t ORDER BY 1 OFFSET 0 ROWS FETCH NEXT 1 ROWS ONLY");
    }
}
