use crate::parser::{ast::{ArgsParser, ClauseSpan, TextCollector}, ParseError, QueryParser, WordComparer};

/// Date functions MySQL and T-SQL both accept without parentheses.
const NILADIC_CALLS: &[&str] = &["CURRENT_TIMESTAMP", "CURRENT_DATE", "CURRENT_TIME"];

/// One item of the SELECT list. `alias` is only set for true aliases: an
/// explicit `AS`, or a trailing name after a function call, a parenthesized
/// expression or a `CASE` block.
///
/// `value` is the selected value without any trailing name, bare column
/// aliases included. It is `None` when a trailing name cannot be told apart
/// from the expression, as in `a IS NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub start: usize,
    pub end: usize,
    pub expr_start: usize,
    pub expr_end: usize,
    pub alias: Option<String>,
    pub value: Option<(usize, usize)>,
}

impl SelectItem {
    pub fn expression(&self, parser: &QueryParser) -> String {
        parser.text_from_range(self.expr_start, self.expr_end)
    }

    pub fn is_wildcard(&self, parser: &QueryParser) -> bool {
        self.expression(parser).ends_with('*')
    }
}

pub struct ProjectionParser;

impl ProjectionParser {
    pub fn parse(parser: &mut QueryParser, clause: &ClauseSpan) -> Result<Vec<SelectItem>, ParseError> {
        parser.position = clause.body_start;
        parser.next_non_whitespace();
        for modifier in [parser.comparers.distinct.clone(), parser.comparers.all.clone()] {
            if let Some(length) = modifier.matched_length(parser) {
                parser.jump(length);
                parser.next_non_whitespace();
            }
        }

        let items_start = parser.position;
        let spans = ArgsParser::split_spans(parser, items_start, clause.end)?;
        spans
            .into_iter()
            .map(|(start, end)| ProjectionParser::parse_item(parser, start, end))
            .collect()
    }

    fn parse_item(parser: &mut QueryParser, start: usize, end: usize) -> Result<SelectItem, ParseError> {
        if let Some((as_start, as_end)) = ProjectionParser::find_alias_keyword(parser, start, end)? {
            let (expr_start, expr_end) = ArgsParser::trim_span(parser, start, as_start);
            let (alias_start, alias_end) = ArgsParser::trim_span(parser, as_end, end);
            if expr_start < expr_end && alias_start < alias_end {
                return Ok(SelectItem {
                    start,
                    end,
                    expr_start,
                    expr_end,
                    alias: Some(TextCollector::unquote(&parser.text_from_range(alias_start, alias_end))),
                    value: Some((expr_start, expr_end)),
                });
            }
        }

        let bare = SelectItem { start, end, expr_start: start, expr_end: end, alias: None, value: Some((start, end)) };

        let Some((alias_start, alias_end)) = TextCollector::identifier_before(parser, end) else {
            return Ok(bare);
        };
        if alias_start <= start || !parser.char_at(alias_start - 1).is_whitespace() {
            return Ok(bare);
        }

        let (expr_start, expr_end) = ArgsParser::trim_span(parser, start, alias_start);
        if ProjectionParser::is_call(parser, expr_start, expr_end)? || ProjectionParser::is_case(parser, expr_start, expr_end) {
            return Ok(SelectItem {
                start,
                end,
                expr_start,
                expr_end,
                alias: Some(TextCollector::unquote(&parser.text_from_range(alias_start, alias_end))),
                value: Some((expr_start, expr_end)),
            });
        }

        // `dept d` names a column alias, `a + b` ends on an operand
        let value = if ProjectionParser::is_operand(parser, expr_start, expr_end)? {
            Some((expr_start, expr_end))
        } else if ProjectionParser::ends_on_operator(parser, expr_end) {
            Some((start, end))
        } else {
            None
        };

        Ok(SelectItem { value, ..bare })
    }

    /// A single column reference, quoted name or literal.
    fn is_operand(parser: &mut QueryParser, start: usize, end: usize) -> Result<bool, ParseError> {
        parser.position = start;
        loop {
            let pivot = parser.position;
            if !parser.skip_quoted()? {
                match TextCollector::identifier_at(parser, pivot) {
                    Some((_, name_end)) => parser.position = name_end,
                    None => {
                        while parser.position < end && (parser.current().is_ascii_digit() || parser.current() == '.') {
                            parser.next();
                        }
                    },
                }
            }

            if parser.position == pivot || parser.position > end {
                return Ok(false);
            }
            if parser.position == end {
                return Ok(true);
            }
            if parser.current() != '.' {
                return Ok(false);
            }
            parser.next();
        }
    }

    fn ends_on_operator(parser: &QueryParser, end: usize) -> bool {
        let last = parser.char_at(end.saturating_sub(1));
        !(WordComparer::is_identifier_char(last) || matches!(last, ']' | ')' | '\'' | '"' | '`'))
    }

    /// Last `AS` outside parentheses within the item.
    fn find_alias_keyword(parser: &mut QueryParser, start: usize, end: usize) -> Result<Option<(usize, usize)>, ParseError> {
        parser.position = start;
        parser.parentheses_depth = 0;

        let mut found = None;
        while parser.position < end && !parser.eof() {
            if parser.at_top_level() {
                if let Some(length) = parser.comparers.alias.matched_length(parser) {
                    found = Some((parser.position, parser.position + length));
                    parser.jump(length);
                    continue;
                }
            }
            parser.advance()?;
        }
        parser.parentheses_depth = 0;

        Ok(found)
    }

    /// `name(...)` or `(...)` where the first parenthesis closes at the end of
    /// the expression, or a date function written without parentheses.
    pub fn is_call(parser: &mut QueryParser, start: usize, end: usize) -> Result<bool, ParseError> {
        if start >= end {
            return Ok(false);
        }
        let text = parser.text_from_range(start, end);
        if NILADIC_CALLS.iter().any(|name| text.eq_ignore_ascii_case(name)) {
            return Ok(true);
        }
        if parser.char_at(end - 1) != ')' {
            return Ok(false);
        }

        parser.position = start;
        if !ArgsParser::is_args_start(parser) {
            let Some((_, name_end)) = TextCollector::identifier_at(parser, start) else {
                return Ok(false);
            };
            parser.position = name_end;
            parser.next_non_whitespace();
            if !ArgsParser::is_args_start(parser) {
                return Ok(false);
            }
        }
        parser.parentheses_depth = 0;
        let close = ArgsParser::matching_close(parser)?;

        Ok(close == end - 1)
    }

    /// `CASE ... END`
    pub fn is_case(parser: &mut QueryParser, start: usize, end: usize) -> bool {
        if end < start + 7 {
            return false;
        }
        parser.position = start;
        if !parser.comparers.case.compare(parser) {
            return false;
        }
        parser.position = end - 3;
        parser.comparers.end.compare(parser)
    }
}
