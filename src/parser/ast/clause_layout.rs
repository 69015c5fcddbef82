use crate::parser::{ParseError, Phase, QueryParser};

/// One top-level clause: `start` is the keyword, `body_start` the first char
/// after it, `end` the start of the next top-level clause or the content end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClauseSpan {
    pub phase: Phase,
    pub start: usize,
    pub body_start: usize,
    pub end: usize,
}

/// Shallow parse of a statement into its top-level clauses.
///
/// Keywords inside parentheses, literals and comments belong to whatever
/// encloses them and are not reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseLayout {
    pub clauses: Vec<ClauseSpan>,
    pub content_end: usize,
    pub has_union: bool,
}

impl ClauseLayout {
    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        parser.position = 0;
        parser.parentheses_depth = 0;
        parser.phase = Phase::Projection;

        let content_end = parser.content_end();
        let mut markers: Vec<(Phase, usize, usize)> = vec![];
        let mut has_union = false;

        while parser.position < content_end {
            if parser.at_top_level() {
                if let Some((phase, length)) = parser.comparers.clause_at(parser) {
                    markers.push((phase, parser.position, parser.position + length));
                    parser.phase = phase;
                    parser.jump(length);
                    continue;
                }
                if parser.comparers.union.compare(parser) {
                    has_union = true;
                }
            }
            parser.advance()?;
        }

        if !parser.at_top_level() {
            parser.parentheses_depth = 0;
            return ParseError::unbalanced(0, parser).err();
        }
        parser.phase = Phase::EOF;

        let clauses = markers
            .iter()
            .enumerate()
            .map(|(i, (phase, start, body_start))| ClauseSpan {
                phase: *phase,
                start: *start,
                body_start: *body_start,
                end: markers.get(i + 1).map(|(_, next, _)| *next).unwrap_or(content_end),
            })
            .collect();

        Ok(Self { clauses, content_end, has_union })
    }

    pub fn first(&self, phase: Phase) -> Option<&ClauseSpan> {
        self.clauses.iter().find(|clause| clause.phase == phase)
    }

    pub fn last(&self, phase: Phase) -> Option<&ClauseSpan> {
        self.clauses.iter().rev().find(|clause| clause.phase == phase)
    }

    pub fn has(&self, phase: Phase) -> bool {
        self.first(phase).is_some()
    }
}

impl TryFrom<&str> for ClauseLayout {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut parser = QueryParser::new(value);
        ClauseLayout::parse(&mut parser)
    }
}
