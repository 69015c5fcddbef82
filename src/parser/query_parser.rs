use crate::parser::{ParseError, Phase, QueryComparers};

/// Lexical rules the text is scanned with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `\'` escapes a quote inside string literals.
    #[default]
    MySql,
    /// Backslashes are ordinary characters; only doubled quotes escape.
    TSql,
}

impl Dialect {
    pub fn backslash_escapes(self) -> bool {
        self == Dialect::MySql
    }
}

/// Char cursor over one statement.
///
/// Positions are char indices into `text_v`. The cursor knows how to step over
/// string literals, quoted identifiers and comments as a single unit, and keeps
/// the parentheses depth of the code it walked through with [`QueryParser::advance`].
#[derive(Debug, Default)]
pub struct QueryParser {
    pub position: usize,
    pub length: usize,
    pub text_v: Vec<char>,
    pub phase: Phase,
    pub text: String,
    pub parentheses_depth: usize,
    pub dialect: Dialect,

    pub comparers: QueryComparers,
}

impl QueryParser {
    pub fn new(query: &str) -> Self {
        Self::with_dialect(query, Dialect::MySql)
    }

    pub fn with_dialect(query: &str, dialect: Dialect) -> Self {
        let text_v: Vec<char> = query.chars().collect();
        Self {
            position: 0,
            length: text_v.len(),
            text_v,
            text: query.to_string(),
            dialect,
            comparers: QueryComparers::new(),
            ..Default::default()
        }
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    pub fn current(&self) -> char {
        self.char_at(self.position)
    }

    pub fn char_at(&self, position: usize) -> char {
        self.text_v.get(position).copied().unwrap_or('\0')
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.char_at(self.position + ahead)
    }

    pub fn next(&mut self) {
        if self.position < self.length {
            self.position += 1;
        }
    }

    pub fn next_non_whitespace(&mut self) {
        while !self.eof() && self.current().is_whitespace() {
            self.next();
        }
    }

    /// Skips whitespace and comments.
    pub fn skip_trivia(&mut self) {
        loop {
            self.next_non_whitespace();
            let comment = matches!((self.current(), self.peek(1)), ('-', '-') | ('/', '*'));
            if !comment || !matches!(self.skip_quoted(), Ok(true)) {
                return;
            }
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        let start = start.min(end);
        self.text_v[start..end].iter().collect()
    }

    pub fn text_from_pivot(&self, pivot: usize) -> String {
        self.text_from_range(pivot, self.position)
    }

    pub fn closing_quote(ch: char) -> Option<char> {
        match ch {
            '\'' | '"' | '`' => Some(ch),
            '[' => Some(']'),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.comparers.param.compare(self)
    }

    pub fn at_top_level(&self) -> bool {
        self.parentheses_depth == 0
    }

    /// Steps over a literal, quoted identifier or comment starting at the
    /// current position. Returns `false` and stays put on plain code.
    pub fn skip_quoted(&mut self) -> Result<bool, ParseError> {
        if self.eof() {
            return Ok(false);
        }

        let pivot = self.position;
        let current = self.current();

        if current == '-' && self.peek(1) == '-' {
            while !self.eof() && self.current() != '\n' {
                self.next();
            }
            return Ok(true);
        }

        if current == '/' && self.peek(1) == '*' {
            self.jump(2);
            while !self.eof() {
                if self.current() == '*' && self.peek(1) == '/' {
                    self.jump(2);
                    return Ok(true);
                }
                self.next();
            }
            return ParseError::unterminated(pivot, self).err();
        }

        let Some(close) = Self::closing_quote(current) else {
            return Ok(false);
        };

        self.next();
        while !self.eof() {
            let ch = self.current();
            if ch == '\\' && self.dialect.backslash_escapes() && (close == '\'' || close == '"') {
                self.jump(2);
                continue;
            }
            if ch == close {
                if self.peek(1) == close {
                    self.jump(2);
                    continue;
                }
                self.next();
                return Ok(true);
            }
            self.next();
        }

        ParseError::unterminated(pivot, self).err()
    }

    /// Moves past one lexical unit of code, tracking parentheses depth.
    pub fn advance(&mut self) -> Result<(), ParseError> {
        if self.skip_quoted()? {
            return Ok(());
        }

        match self.current() {
            '(' => self.parentheses_depth += 1,
            ')' => {
                if self.parentheses_depth == 0 {
                    return ParseError::unbalanced(self.position, self).err();
                }
                self.parentheses_depth -= 1;
            },
            _ => {},
        }
        self.next();

        Ok(())
    }

    /// End of the statement content: trailing whitespace and `;` terminators excluded.
    pub fn content_end(&self) -> usize {
        let mut end = self.length;
        while end > 0 && (self.text_v[end - 1].is_whitespace() || self.text_v[end - 1] == ';') {
            end -= 1;
        }
        end
    }
}
