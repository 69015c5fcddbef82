use crate::{
    error::{Pass, TranspileError, TranspileResult},
    parser::{Dialect, ParamRef, PlaceholderLocator, PlaceholderOccurrence, QueryParser},
    SqlValue,
};

/// SQL text plus its positional parameters, `params[i]` bound to the i-th `?`.
/// `dialect` tells how its string literals are escaped.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
    pub dialect: Dialect,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self { sql: sql.into(), params, dialect: Dialect::MySql }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn parser(&self) -> QueryParser {
        QueryParser::with_dialect(&self.sql, self.dialect)
    }

    pub fn placeholders(&self, pass: Pass) -> TranspileResult<Vec<PlaceholderOccurrence>> {
        PlaceholderLocator::locate_with(&mut self.parser()).map_err(|err| TranspileError::parse(pass, &self.sql, err))
    }

    /// Fails unless the text holds exactly one `?` per bound parameter.
    pub fn check_aligned(&self, pass: Pass) -> TranspileResult<usize> {
        let found = self.placeholders(pass)?.len();
        if found != self.params.len() {
            return Err(TranspileError::mismatch(pass, &self.sql, self.params.len(), found));
        }
        Ok(found)
    }
}

/// Assembles a rewritten statement out of spans of a source statement.
///
/// Copying a span copies the parameters of the placeholders inside it, in
/// the order they land in the new text, so moving a clause moves its values
/// and repeating an expression repeats them.
pub struct StatementBuilder<'a> {
    parser: &'a QueryParser,
    occurrences: &'a [PlaceholderOccurrence],
    params: &'a [SqlValue],
    sql: String,
    bound: Vec<ParamRef>,
}

impl<'a> StatementBuilder<'a> {
    pub fn new(parser: &'a QueryParser, occurrences: &'a [PlaceholderOccurrence], params: &'a [SqlValue]) -> Self {
        Self {
            parser,
            occurrences,
            params,
            sql: String::with_capacity(parser.text.len() + 32),
            bound: vec![],
        }
    }

    pub fn push_span(&mut self, start: usize, end: usize) -> &mut Self {
        if start >= end {
            return self;
        }
        self.sql.push_str(&self.parser.text_from_range(start, end));
        self.bound.extend(
            self.occurrences
                .iter()
                .filter(|occurrence| occurrence.within(start, end))
                .map(PlaceholderOccurrence::param),
        );
        self
    }

    /// Template text; must not contain placeholders.
    pub fn push_str(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    pub fn bound(&self) -> &[ParamRef] {
        &self.bound
    }

    pub fn finish(self) -> Statement {
        let params = self
            .bound
            .iter()
            .filter_map(|param| self.params.get(param.index).cloned())
            .collect();

        Statement { sql: self.sql, params, dialect: self.parser.dialect }
    }
}

/// Final T-SQL text with `@pN` parameters and the values to bind to them.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteResult {
    pub sql: String,
    pub params: Vec<SqlValue>,
    pub occurrences: Vec<PlaceholderOccurrence>,
}

impl RewriteResult {
    /// `(name, value)` pairs in parameter order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &SqlValue)> + '_ {
        self.occurrences
            .iter()
            .zip(self.params.iter())
            .filter_map(|(occurrence, value)| occurrence.name.as_deref().map(|name| (name, value)))
    }

    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}
