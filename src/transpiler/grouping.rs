use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    error::{Pass, TranspileError, TranspileResult},
    parser::{ast::{ClauseLayout, GroupBy, GroupByItem, ProjectionParser, SelectItem, TextCollector}, Phase, PlaceholderLocator, QueryParser},
    statement::{Statement, StatementBuilder},
    transpiler::RewritePass,
    TranspilerConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasTarget {
    Expression { start: usize, end: usize },
    /// Same alias bound to different expressions.
    Ambiguous,
}

/// Select list aliases, lower-cased, in declaration order.
#[derive(Debug, Default)]
pub struct AliasMap {
    entries: IndexMap<String, AliasTarget>,
}

impl AliasMap {
    pub fn build(parser: &QueryParser, items: &[SelectItem]) -> Self {
        let mut entries: IndexMap<String, AliasTarget> = IndexMap::new();

        for item in items {
            let Some(alias) = &item.alias else {
                continue;
            };
            let key = TextCollector::key(alias);
            let target = match entries.get(&key) {
                None => AliasTarget::Expression { start: item.expr_start, end: item.expr_end },
                Some(AliasTarget::Expression { start, end })
                    if parser.text_from_range(*start, *end) == item.expression(parser) =>
                {
                    continue;
                },
                Some(_) => AliasTarget::Ambiguous,
            };
            entries.insert(key, target);
        }

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&AliasTarget> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replaces `GROUP BY` items naming a select alias (or a select position)
/// with the aliased expression, which T-SQL requires.
pub struct GroupingAliasResolver;

impl GroupingAliasResolver {
    pub fn resolve(statement: Statement) -> TranspileResult<Statement> {
        let parse_error = |err| TranspileError::parse(Pass::GroupingAliases, &statement.sql, err);

        let mut parser = statement.parser();
        let layout = ClauseLayout::parse(&mut parser).map_err(parse_error)?;
        let (Some(select), Some(group)) = (layout.first(Phase::Projection).copied(), layout.first(Phase::Aggregates).copied()) else {
            return Ok(statement);
        };
        if layout.has_union {
            warn!(pass = %Pass::GroupingAliases, sql = %statement.sql, "GROUP BY aliases are not resolved across UNION");
            return Ok(statement);
        }
        if select.start > group.start {
            return Ok(statement);
        }

        let items = ProjectionParser::parse(&mut parser, &select).map_err(parse_error)?;
        let groups = GroupBy::parse(&mut parser, &group).map_err(parse_error)?;
        let aliases = AliasMap::build(&parser, &items);

        let replacements: Vec<(&GroupByItem, usize, usize)> = groups
            .iter()
            .filter_map(|item| {
                GroupingAliasResolver::target(&parser, item, &items, &aliases, &statement.sql)
                    .map(|(start, end)| (item, start, end))
            })
            .collect();
        if replacements.is_empty() {
            return Ok(statement);
        }
        debug!(pass = %Pass::GroupingAliases, replaced = replacements.len(), "GROUP BY items resolved");

        let occurrences = PlaceholderLocator::locate_with(&mut parser).map_err(parse_error)?;
        let mut builder = StatementBuilder::new(&parser, &occurrences, &statement.params);
        let mut pivot = 0;
        for (item, start, end) in replacements {
            builder.push_span(pivot, item.start).push_span(start, end);
            pivot = item.end;
        }
        builder.push_span(pivot, parser.length);

        Ok(builder.finish())
    }

    /// Expression span that should stand in for `item`, if any.
    fn target(
        parser: &QueryParser,
        item: &GroupByItem,
        items: &[SelectItem],
        aliases: &AliasMap,
        sql: &str,
    ) -> Option<(usize, usize)> {
        if let Some(ordinal) = item.ordinal() {
            return match ordinal.checked_sub(1).and_then(|index| items.get(index)) {
                Some(selected) if !selected.is_wildcard(parser) && selected.value.is_some() => selected.value,
                Some(selected) if !selected.is_wildcard(parser) => {
                    warn!(pass = %Pass::GroupingAliases, ordinal, sql, "GROUP BY position names an item whose alias cannot be split off");
                    None
                },
                _ => {
                    warn!(pass = %Pass::GroupingAliases, ordinal, sql, "GROUP BY position left untouched");
                    None
                },
            };
        }

        match aliases.get(&item.key())? {
            AliasTarget::Expression { start, end } => Some((*start, *end)),
            AliasTarget::Ambiguous => {
                warn!(pass = %Pass::GroupingAliases, alias = %item.text, sql, "ambiguous alias left untouched in GROUP BY");
                None
            },
        }
    }
}

impl RewritePass for GroupingAliasResolver {
    fn pass(&self) -> Pass {
        Pass::GroupingAliases
    }

    fn apply(&self, statement: Statement, _config: &TranspilerConfig) -> TranspileResult<Statement> {
        GroupingAliasResolver::resolve(statement)
    }
}
