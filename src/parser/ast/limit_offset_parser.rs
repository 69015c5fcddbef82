use std::fmt::Display;

use crate::parser::{ast::ClauseSpan, ParamRef, PlaceholderOccurrence, QueryParser, WordComparer};

/// The three accepted spellings of a MySQL row limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationForm {
    /// `LIMIT offset, count`
    OffsetCount,
    /// `LIMIT count OFFSET offset`
    CountOffset,
    /// `LIMIT count`
    CountOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Literal(u64),
    Param { param: ParamRef, position: usize },
}

impl Operand {
    pub fn param(&self) -> Option<ParamRef> {
        match self {
            Operand::Literal(_) => None,
            Operand::Param { param, .. } => Some(*param),
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Param { .. } => f.write_str("?"),
        }
    }
}

/// A recognized `LIMIT` clause spanning `[start, end)` of the statement.
/// Trailing comments are left outside the span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSpec {
    pub form: PaginationForm,
    pub count: Operand,
    pub offset: Operand,
    pub had_order_by: bool,
    pub start: usize,
    pub end: usize,
}

impl PaginationSpec {
    /// The `(count, offset)` parameters that trade places once the clause is
    /// written offset first. Only `LIMIT ? OFFSET ?` needs it.
    pub fn required_swap(&self) -> Option<(ParamRef, ParamRef)> {
        match (self.form, self.count.param(), self.offset.param()) {
            (PaginationForm::CountOffset, Some(count), Some(offset)) => Some((count, offset)),
            _ => None,
        }
    }
}

pub struct LimitAndOffsetParser;

impl LimitAndOffsetParser {
    /// Reads the `LIMIT` clause. `None` when its body is none of the three accepted shapes.
    pub fn parse(
        parser: &mut QueryParser,
        clause: &ClauseSpan,
        occurrences: &[PlaceholderOccurrence],
        had_order_by: bool,
    ) -> Option<PaginationSpec> {
        parser.position = clause.body_start;
        parser.skip_trivia();

        let first = Self::parse_operand(parser, occurrences, clause.end)?;
        let mut operands_end = parser.position;
        parser.skip_trivia();

        let (form, count, offset) = if parser.position >= clause.end {
            (PaginationForm::CountOnly, first, Operand::Literal(0))
        } else if parser.current() == ',' {
            parser.next();
            parser.skip_trivia();
            let second = Self::parse_operand(parser, occurrences, clause.end)?;
            operands_end = parser.position;
            (PaginationForm::OffsetCount, second, first)
        } else if let Some(length) = parser.comparers.offset.matched_length(parser) {
            parser.jump(length);
            parser.skip_trivia();
            let second = Self::parse_operand(parser, occurrences, clause.end)?;
            operands_end = parser.position;
            (PaginationForm::CountOffset, first, second)
        } else {
            return None;
        };

        parser.skip_trivia();
        if parser.position < clause.end {
            return None;
        }

        Some(PaginationSpec {
            form,
            count,
            offset,
            had_order_by,
            start: clause.start,
            end: operands_end,
        })
    }

    fn parse_operand(parser: &mut QueryParser, occurrences: &[PlaceholderOccurrence], end: usize) -> Option<Operand> {
        if parser.position >= end {
            return None;
        }

        if parser.is_placeholder() {
            let position = parser.position;
            let occurrence = occurrences.iter().find(|occurrence| occurrence.start == position)?;
            parser.next();
            return Some(Operand::Param { param: occurrence.param(), position });
        }

        let pivot = parser.position;
        while parser.position < end && parser.current().is_ascii_digit() {
            parser.next();
        }
        if pivot == parser.position || WordComparer::is_identifier_char(parser.current()) {
            return None;
        }

        parser.text_from_pivot(pivot).parse::<u64>().ok().map(Operand::Literal)
    }
}
