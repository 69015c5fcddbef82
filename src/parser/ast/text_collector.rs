use crate::parser::{QueryParser, WordComparer};

pub struct TextCollector;

impl TextCollector {
    /// Span of the bare or quoted identifier at the parser position, without moving it.
    pub fn identifier_at(parser: &QueryParser, position: usize) -> Option<(usize, usize)> {
        let first = parser.char_at(position);

        if let Some(close) = QueryParser::closing_quote(first).filter(|_| first == '[' || first == '`') {
            let mut end = position + 1;
            while end < parser.length {
                if parser.char_at(end) == close {
                    if parser.char_at(end + 1) == close {
                        end += 2;
                        continue;
                    }
                    return Some((position, end + 1));
                }
                end += 1;
            }
            return None;
        }

        if !(first.is_alphabetic() || first == '_') {
            return None;
        }

        let mut end = position;
        while end < parser.length && WordComparer::is_identifier_char(parser.char_at(end)) {
            end += 1;
        }
        Some((position, end))
    }

    /// Span of the identifier ending right before `end`, if the text ends with one.
    pub fn identifier_before(parser: &QueryParser, end: usize) -> Option<(usize, usize)> {
        if end == 0 {
            return None;
        }

        let last = parser.char_at(end - 1);
        if last == ']' {
            let mut start = end - 1;
            while start > 0 {
                start -= 1;
                if parser.char_at(start) == '[' {
                    return Some((start, end));
                }
            }
            return None;
        }

        let mut start = end;
        while start > 0 && WordComparer::is_identifier_char(parser.char_at(start - 1)) {
            start -= 1;
        }
        let first = parser.char_at(start);
        (start < end && (first.is_alphabetic() || first == '_')).then_some((start, end))
    }

    /// Identifier text without its quoting.
    pub fn unquote(text: &str) -> String {
        let text = text.trim();
        let mut chars = text.chars();
        let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
            return text.to_string();
        };

        let inner = &text[first.len_utf8()..text.len() - last.len_utf8()];
        match (first, last) {
            ('[', ']') => inner.replace("]]", "]"),
            ('`', '`') => inner.replace("``", "`"),
            ('"', '"') => inner.replace("\"\"", "\""),
            ('\'', '\'') => inner.replace("''", "'"),
            _ => text.to_string(),
        }
    }

    /// Lookup key for aliases and grouping items: unquoted and lower-cased.
    pub fn key(text: &str) -> String {
        TextCollector::unquote(text).to_lowercase()
    }
}
