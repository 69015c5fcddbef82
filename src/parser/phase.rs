use std::fmt::Display;

/// Top-level clauses of a statement, in the order they may appear.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    #[default]
    Projection = 0,
    Collections = 1,
    Criteria = 2,
    Aggregates = 3,
    Having = 4,
    OrderBy = 5,
    LimitAndOffset = 6,
    EOF = 7,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keyword = match self {
            Phase::Projection => "SELECT",
            Phase::Collections => "FROM",
            Phase::Criteria => "WHERE",
            Phase::Aggregates => "GROUP BY",
            Phase::Having => "HAVING",
            Phase::OrderBy => "ORDER BY",
            Phase::LimitAndOffset => "LIMIT",
            Phase::EOF => "<eof>",
        };
        f.write_str(keyword)
    }
}
