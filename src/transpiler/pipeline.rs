use tracing::{debug, trace};

use crate::{
    error::{Pass, TranspileResult},
    statement::{RewriteResult, Statement},
    transpiler::{FunctionTranspiler, GroupingAliasResolver, PaginationRewriter, PlaceholderRenumberer, SubqueryAliasNormalizer},
    SqlValue, TranspilerConfig,
};

/// One rewrite step over a statement and its parameters.
pub trait RewritePass: Send + Sync {
    fn pass(&self) -> Pass;

    fn apply(&self, statement: Statement, config: &TranspilerConfig) -> TranspileResult<Statement>;
}

/// Rewrites MySQL statements with `?` placeholders into T-SQL with named
/// parameters. Holds no state between calls and can be shared across threads.
pub struct Transpiler {
    config: TranspilerConfig,
    passes: Vec<Box<dyn RewritePass>>,
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new(TranspilerConfig::default())
    }
}

impl Transpiler {
    pub fn new(config: TranspilerConfig) -> Self {
        Self {
            config,
            passes: vec![
                Box::new(PaginationRewriter),
                Box::new(FunctionTranspiler),
                Box::new(GroupingAliasResolver),
                Box::new(SubqueryAliasNormalizer),
            ],
        }
    }

    pub fn config(&self) -> &TranspilerConfig {
        &self.config
    }

    /// Passes in the order they run, renumbering excluded.
    pub fn passes(&self) -> Vec<Pass> {
        self.passes.iter().map(|pass| pass.pass()).collect()
    }

    pub fn transpile(&self, sql: &str, params: Vec<SqlValue>) -> TranspileResult<RewriteResult> {
        let mut statement = Statement::new(sql, params);
        statement.check_aligned(Pass::Locate)?;

        for pass in &self.passes {
            let name = pass.pass();
            statement = pass.apply(statement, &self.config)?;
            statement.check_aligned(name)?;
            trace!(pass = %name, sql = %statement.sql, params = statement.params.len(), "pass applied");
        }

        let result = PlaceholderRenumberer::renumber(statement, &self.config)?;
        debug!(sql = %result.sql, params = result.params.len(), "statement transpiled");

        Ok(result)
    }

    /// Same as [`Transpiler::transpile`] for callers holding JSON values.
    pub fn transpile_json(&self, sql: &str, params: &[serde_json::Value]) -> TranspileResult<RewriteResult> {
        self.transpile(sql, params.iter().map(SqlValue::from).collect())
    }
}
