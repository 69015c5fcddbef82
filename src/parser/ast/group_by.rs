use crate::parser::{ast::{ArgsParser, ClauseSpan, TextCollector}, ParseError, QueryParser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupByItem {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl GroupByItem {
    /// 1-based select list position for `GROUP BY 2` style items.
    pub fn ordinal(&self) -> Option<usize> {
        if self.text.is_empty() || !self.text.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }
        self.text.parse().ok()
    }

    pub fn key(&self) -> String {
        TextCollector::key(&self.text)
    }
}

pub struct GroupBy;

impl GroupBy {
    pub fn parse(parser: &mut QueryParser, clause: &ClauseSpan) -> Result<Vec<GroupByItem>, ParseError> {
        let spans = ArgsParser::split_spans(parser, clause.body_start, clause.end)?;
        if spans.is_empty() {
            return ParseError::new("Invalid group by", clause.start, parser).err();
        }

        Ok(spans
            .into_iter()
            .map(|(start, end)| GroupByItem { start, end, text: parser.text_from_range(start, end) })
            .collect())
    }
}
