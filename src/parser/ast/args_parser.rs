use crate::parser::{Dialect, ParseError, QueryParser};

pub struct ArgsParser;

impl ArgsParser {
    pub fn is_args_start(parser: &QueryParser) -> bool {
        parser.current() == '('
    }

    pub fn is_args_end(parser: &QueryParser) -> bool {
        parser.current() == ')'
    }

    /// With the parser on `(`, returns the position of the matching `)` and
    /// leaves the parser just past it.
    pub fn matching_close(parser: &mut QueryParser) -> Result<usize, ParseError> {
        let pivot = parser.position;

        if !ArgsParser::is_args_start(parser) {
            return Err(ParseError::new("Invalid args value", pivot, parser));
        }

        let base = parser.parentheses_depth;
        parser.advance()?;

        while !parser.eof() {
            if ArgsParser::is_args_end(parser) && parser.parentheses_depth == base + 1 {
                let close = parser.position;
                parser.advance()?;
                return Ok(close);
            }
            parser.advance()?;
        }

        parser.parentheses_depth = base;
        Err(ParseError::unbalanced(pivot, parser))
    }

    /// Trims whitespace off both ends of a span.
    pub fn trim_span(parser: &QueryParser, start: usize, end: usize) -> (usize, usize) {
        let mut start = start;
        let mut end = end.min(parser.length);
        while start < end && parser.char_at(start).is_whitespace() {
            start += 1;
        }
        while end > start && parser.char_at(end - 1).is_whitespace() {
            end -= 1;
        }
        (start, end)
    }

    /// Splits `[start, end)` at commas outside parentheses and literals.
    ///
    /// Items come back trimmed. A blank range yields no items; a blank item
    /// between two commas is an error.
    pub fn split_spans(parser: &mut QueryParser, start: usize, end: usize) -> Result<Vec<(usize, usize)>, ParseError> {
        parser.position = start;
        parser.parentheses_depth = 0;

        let mut spans: Vec<(usize, usize)> = vec![];
        let mut item_start = start;

        while parser.position < end && !parser.eof() {
            if parser.current() == ',' && parser.at_top_level() {
                let span = ArgsParser::trim_span(parser, item_start, parser.position);
                if span.0 == span.1 {
                    return Err(ParseError::new("Invalid args value", item_start, parser));
                }
                spans.push(span);
                parser.next();
                item_start = parser.position;
                continue;
            }
            parser.advance()?;
        }

        if !parser.at_top_level() {
            parser.parentheses_depth = 0;
            return Err(ParseError::unbalanced(start, parser));
        }

        let last = ArgsParser::trim_span(parser, item_start, end);
        if last.0 == last.1 {
            if spans.is_empty() {
                return Ok(spans);
            }
            return Err(ParseError::new("Invalid args value", item_start, parser));
        }
        spans.push(last);

        Ok(spans)
    }

    pub fn split(text: &str, dialect: Dialect) -> Result<Vec<String>, ParseError> {
        let mut parser = QueryParser::with_dialect(text, dialect);
        let length = parser.length;
        let spans = ArgsParser::split_spans(&mut parser, 0, length)?;

        Ok(spans.into_iter().map(|(start, end)| parser.text_from_range(start, end)).collect())
    }
}
