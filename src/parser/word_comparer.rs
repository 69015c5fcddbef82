use crate::parser::QueryParser;

/// Case-insensitive keyword matcher anchored at the parser position.
///
/// A space inside the word matches any run of whitespace in the text, so
/// `GROUP BY` also matches `group\n   by`. A word never matches in the middle
/// of an identifier (`IIF` does not contain `IF`, `t.limit` is not `LIMIT`).
#[derive(Debug, Default, Clone)]
pub struct WordComparer {
    pub length: usize,
    pub word: Vec<char>,
    whitespace_postfix: bool,
    full_block_delimiter_postfix: bool,
    eof: bool,
    delimiter: Option<char>,
    optional_postfix: Vec<char>,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        let word: Vec<char> = word.to_uppercase().chars().collect();
        Self {
            length: word.len(),
            word,
            ..Default::default()
        }
    }

    pub fn is_identifier_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$'
    }

    pub fn is_block_delimiter(ch: char) -> bool {
        ch.is_whitespace()
    }

    pub fn is_any_delimiter(ch: char) -> bool {
        ch == ',' || ch == '(' || ch == ')' || ch == '.' || ch == ';' || Self::is_block_delimiter(ch)
    }

    fn is_word_start(&self, parser: &QueryParser) -> bool {
        if parser.position == 0 || !self.word.first().is_some_and(|ch| Self::is_identifier_char(*ch)) {
            return true;
        }
        let previous = parser.text_v[parser.position - 1];
        !Self::is_identifier_char(previous) && previous != '.'
    }

    fn has_postfix_rule(&self) -> bool {
        self.delimiter.is_some() || self.full_block_delimiter_postfix || self.whitespace_postfix ||
            !self.optional_postfix.is_empty()
    }

    /// Number of chars of the text covered by the word, when it matches.
    pub fn matched_length(&self, parser: &QueryParser) -> Option<usize> {
        if !self.is_word_start(parser) {
            return None;
        }

        let mut offset = 0;
        for expected in self.word.iter() {
            let at = parser.position + offset;
            if at >= parser.length {
                return None;
            }
            let current = parser.text_v[at];
            if *expected == ' ' {
                if !current.is_whitespace() {
                    return None;
                }
                while parser.position + offset < parser.length &&
                    parser.text_v[parser.position + offset].is_whitespace() {
                    offset += 1;
                }
                continue;
            }
            if current.to_ascii_uppercase() != *expected {
                return None;
            }
            offset += 1;
        }

        if !self.has_postfix_rule() {
            return Some(offset);
        }

        let Some(next) = parser.text_v.get(parser.position + offset).copied() else {
            return self.eof.then_some(offset);
        };

        let accepted = self.delimiter == Some(next) ||
            (self.full_block_delimiter_postfix && Self::is_any_delimiter(next)) ||
            (self.whitespace_postfix && Self::is_block_delimiter(next)) ||
            self.optional_postfix.contains(&next);

        accepted.then_some(offset)
    }

    pub fn compare(&self, parser: &QueryParser) -> bool {
        self.matched_length(parser).is_some()
    }

    pub fn with_eof(mut self) -> Self { self.eof = true; self }
    pub fn with_whitespace_postfix(mut self) -> Self { self.whitespace_postfix = true; self }
    pub fn with_any_delimiter_postfix(mut self) -> Self { self.full_block_delimiter_postfix = true; self }
    pub fn with_delimiter(mut self, delimiter: char) -> Self { self.delimiter = Some(delimiter); self }
    pub fn with_optional_postfix(mut self, value: char) -> Self { self.optional_postfix.push(value); self }

    /// Keyword bounded by any delimiter or the end of the text.
    pub fn keyword(word: &str) -> Self {
        Self::new(word).with_any_delimiter_postfix().with_eof()
    }

    /// Function name directly or loosely followed by its argument list.
    pub fn function(name: &str) -> Self {
        Self::new(name).with_delimiter('(').with_whitespace_postfix()
    }
}
