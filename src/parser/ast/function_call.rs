use crate::parser::{ast::ArgsParser, ParseError, QueryParser, WordComparer};

/// A located call `NAME(arg, ...)`. All positions are char indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub start: usize,
    pub open: usize,
    pub close: usize,
    pub args: Vec<(usize, usize)>,
}

impl FunctionCall {
    pub fn end(&self) -> usize {
        self.close + 1
    }

    pub fn inner(&self, parser: &QueryParser) -> String {
        parser.text_from_range(self.open + 1, self.close)
    }

    /// Next call of the function matched by `comparer` at or after the parser
    /// position, skipping literals and comments. Leaves the parser past the call.
    pub fn find_next(parser: &mut QueryParser, comparer: &WordComparer) -> Result<Option<FunctionCall>, ParseError> {
        while !parser.eof() {
            if parser.skip_quoted()? {
                continue;
            }

            let Some(length) = comparer.matched_length(parser) else {
                parser.next();
                continue;
            };

            let start = parser.position;
            parser.jump(length);
            parser.next_non_whitespace();
            if !ArgsParser::is_args_start(parser) {
                continue;
            }

            let open = parser.position;
            let close = ArgsParser::matching_close(parser)?;
            let args = ArgsParser::split_spans(parser, open + 1, close)?;
            parser.position = close + 1;

            return Ok(Some(FunctionCall {
                name: parser.text_from_range(start, start + length),
                start,
                open,
                close,
                args,
            }));
        }

        Ok(None)
    }
}
