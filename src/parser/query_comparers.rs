use crate::parser::{Phase, QueryParser, WordComparer};

#[derive(Debug, Clone)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub distinct: WordComparer,
    pub all: WordComparer,
    pub alias: WordComparer,
    pub from: WordComparer,
    pub r#where: WordComparer,
    pub group_by: WordComparer,
    pub having: WordComparer,
    pub order_by: WordComparer,
    pub limit: WordComparer,
    pub offset: WordComparer,
    pub union: WordComparer,
    pub case: WordComparer,
    pub end: WordComparer,
    pub param: WordComparer,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::keyword("SELECT").with_optional_postfix('*'),
            distinct: WordComparer::keyword("DISTINCT"),
            all: WordComparer::new("ALL").with_whitespace_postfix(),
            alias: WordComparer::new("AS").with_whitespace_postfix().with_optional_postfix('['),
            from: WordComparer::keyword("FROM"),
            r#where: WordComparer::keyword("WHERE"),
            group_by: WordComparer::keyword("GROUP BY"),
            having: WordComparer::keyword("HAVING"),
            order_by: WordComparer::keyword("ORDER BY"),
            limit: WordComparer::keyword("LIMIT"),
            offset: WordComparer::keyword("OFFSET"),
            union: WordComparer::keyword("UNION"),
            case: WordComparer::keyword("CASE"),
            end: WordComparer::keyword("END"),
            param: WordComparer::new("?"),
        }
    }

    /// Clause keyword starting at the parser position, with the number of chars it covers.
    pub fn clause_at(&self, parser: &QueryParser) -> Option<(Phase, usize)> {
        [
            (Phase::Projection, &self.select),
            (Phase::Collections, &self.from),
            (Phase::Criteria, &self.r#where),
            (Phase::Aggregates, &self.group_by),
            (Phase::Having, &self.having),
            (Phase::OrderBy, &self.order_by),
            (Phase::LimitAndOffset, &self.limit),
        ]
        .into_iter()
        .find_map(|(phase, comparer)| comparer.matched_length(parser).map(|length| (phase, length)))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{Phase, QueryComparers, QueryParser};

    #[test]
    pub fn test_clause_at() {
        let comparers = QueryComparers::new();

        let parser = QueryParser::new("ORDER  BY id");
        assert_eq!(comparers.clause_at(&parser), Some((Phase::OrderBy, 9)));

        let parser = QueryParser::new("SELECT* FROM t");
        assert_eq!(comparers.clause_at(&parser), Some((Phase::Projection, 6)));

        let parser = QueryParser::new("ordering");
        assert_eq!(comparers.clause_at(&parser), None);
    }
}
