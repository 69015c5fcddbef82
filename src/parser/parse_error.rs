use std::fmt::Display;

use crate::parser::QueryParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Invalid,
    UnterminatedLiteral,
    UnbalancedParentheses,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl ParseError {
    pub fn new(message: &str, pivot: usize, parser: &QueryParser) -> Self {
        Self {
            kind: ParseErrorKind::Invalid,
            message: message.to_string(),
            text: parser.text_from_range(pivot, parser.position + 1),
            start: pivot,
            end: parser.position,
        }
    }

    pub fn unterminated(pivot: usize, parser: &QueryParser) -> Self {
        Self {
            kind: ParseErrorKind::UnterminatedLiteral,
            ..Self::new("Unterminated literal", pivot, parser)
        }
    }

    pub fn unbalanced(pivot: usize, parser: &QueryParser) -> Self {
        Self {
            kind: ParseErrorKind::UnbalancedParentheses,
            ..Self::new("Unbalanced parentheses", pivot, parser)
        }
    }

    pub fn err<T>(self) -> Result<T, ParseError> {
        Err(self)
    }
}

impl Display for ParseError  {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(
                f,
                "ParseError: {}\n  at [{}:{}] -> '{}'",
                self.message,
                self.start,
                self.end,
                self.text
            )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use crate::parser::{ParseError, ParseErrorKind, QueryParser};

    #[test]
    pub fn test_parse_error_display() {
        let mut parser = QueryParser::new("LIMIT x");
        parser.jump(6);

        let err = ParseError::new("Invalid limit", 6, &parser);

        assert_eq!(err.kind, ParseErrorKind::Invalid);
        assert_eq!(err.to_string(), "ParseError: Invalid limit\n  at [6:6] -> 'x'");
    }

    #[test]
    pub fn test_parse_error_unbalanced_kind() {
        let mut parser = QueryParser::new("CONCAT(a, b");
        parser.jump(11);

        let err = ParseError::unbalanced(6, &parser);

        assert_eq!(err.kind, ParseErrorKind::UnbalancedParentheses);
        assert_eq!(err.text, "(a, b");
        assert_eq!(err.start, 6);
    }
}
