use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{trace, warn};

use crate::{
    error::{Pass, TranspileError, TranspileResult},
    parser::{ast::{ArgsParser, FunctionCall}, Dialect, ParseError, PlaceholderLocator, QueryParser, WordComparer},
    statement::Statement,
    transpiler::RewritePass,
    SqlValue, TranspilerConfig,
};

static CREATE_TABLE_IF_NOT_EXISTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\s*)CREATE\s+TABLE\s+IF\s+NOT\s+EXISTS\b").expect("valid CREATE TABLE pattern"));

/// A `%x` date token, or a char that `FORMAT` would not copy as is.
static DATE_FORMAT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"%.?|[A-Za-z\\/:'"]"#).expect("valid date token pattern"));

/// Closes the parameter index written after a `?` while calls are rewritten.
const PARAM_TAG_END: char = '#';

static TRIM_FROM: Lazy<WordComparer> = Lazy::new(|| WordComparer::keyword("FROM"));

const DATEDIFF_UNITS: &[&str] = &[
    "MICROSECOND", "SECOND", "MINUTE", "HOUR", "DAY", "WEEK", "MONTH", "QUARTER", "YEAR",
];

type TextRewrite = fn(&str, &TranspilerConfig) -> Result<String, ParseError>;
type CallBuilder = fn(&CallArgs, &TranspilerConfig) -> CallRewrite;

/// Arguments of one located call, already rewritten.
pub struct CallArgs {
    pub name: String,
    pub inner: String,
    pub args: Vec<String>,
}

pub enum CallRewrite {
    Keep,
    Replace(String),
}

/// Applied in this order; calls may sit inside arguments of later ones.
/// Quoting reads MySQL text, every later step reads T-SQL text.
const TEXT_REWRITES: &[(&str, TextRewrite)] = &[
    ("quoting", FunctionTranspiler::requote),
    ("create-table", FunctionTranspiler::drop_create_table_guard),
    ("tagging", FunctionTranspiler::tag_params),
    ("calls", FunctionTranspiler::rewrite_all_calls),
];

const CALL_REWRITES: &[(&str, CallBuilder)] = &[
    ("NOW", FunctionTranspiler::now),
    ("CURRENT_TIMESTAMP", FunctionTranspiler::current_timestamp),
    ("CURDATE", FunctionTranspiler::curdate),
    ("CURRENT_DATE", FunctionTranspiler::curdate),
    ("IFNULL", FunctionTranspiler::ifnull),
    ("IF", FunctionTranspiler::iif),
    ("CHAR_LENGTH", FunctionTranspiler::len),
    ("CHARACTER_LENGTH", FunctionTranspiler::len),
    ("LPAD", FunctionTranspiler::lpad),
    ("RPAD", FunctionTranspiler::rpad),
    ("TRIM", FunctionTranspiler::trim),
    ("TIMESTAMPDIFF", FunctionTranspiler::timestampdiff),
    ("DATE_FORMAT", FunctionTranspiler::date_format),
    ("CONCAT", FunctionTranspiler::concat),
];

/// MySQL identifier quoting, DDL guards and built-in functions to T-SQL.
pub struct FunctionTranspiler;

impl FunctionTranspiler {
    pub fn transpile(statement: Statement, config: &TranspilerConfig) -> TranspileResult<Statement> {
        let mut sql = statement.sql.clone();
        for (step, rewrite) in TEXT_REWRITES {
            sql = rewrite(&sql, config).map_err(|err| TranspileError::parse(Pass::Functions, &sql, err))?;
            trace!(pass = %Pass::Functions, step, sql = %sql, "step applied");
        }

        FunctionTranspiler::untag_params(&sql, &statement.params)
            .map_err(|err| TranspileError::parse(Pass::Functions, &sql, err))
    }

    /// Writes the parameter index after every `?`, as in `?0#`, so call
    /// rewrites that repeat or reorder arguments keep track of the values.
    pub fn tag_params(sql: &str, _config: &TranspilerConfig) -> Result<String, ParseError> {
        let mut parser = QueryParser::with_dialect(sql, Dialect::TSql);
        let occurrences = PlaceholderLocator::locate_with(&mut parser)?;

        let mut out = String::with_capacity(sql.len() + occurrences.len() * 3);
        let mut pivot = 0;
        for occurrence in &occurrences {
            out.push_str(&parser.text_from_range(pivot, occurrence.end));
            out.push_str(&format!("{}{PARAM_TAG_END}", occurrence.index));
            pivot = occurrence.end;
        }
        out.push_str(&parser.text_from_range(pivot, parser.length));

        Ok(out)
    }

    /// Strips the tags written by [`FunctionTranspiler::tag_params`] and
    /// lays out `params` in the order the tagged placeholders now appear.
    pub fn untag_params(sql: &str, params: &[SqlValue]) -> Result<Statement, ParseError> {
        let mut parser = QueryParser::with_dialect(sql, Dialect::TSql);
        let occurrences = PlaceholderLocator::locate_with(&mut parser)?;

        let mut out = String::with_capacity(sql.len());
        let mut values = Vec::with_capacity(occurrences.len());
        let mut pivot = 0;
        for occurrence in &occurrences {
            let mut tag_end = occurrence.end;
            while parser.char_at(tag_end).is_ascii_digit() {
                tag_end += 1;
            }
            parser.position = tag_end;

            let value = parser
                .text_from_range(occurrence.end, tag_end)
                .parse::<usize>()
                .ok()
                .filter(|_| parser.char_at(tag_end) == PARAM_TAG_END)
                .and_then(|index| params.get(index));
            let Some(value) = value else {
                return ParseError::new("Placeholder without a parameter tag", occurrence.start, &parser).err();
            };

            out.push_str(&parser.text_from_range(pivot, occurrence.end));
            values.push(value.clone());
            pivot = tag_end + 1;
        }
        out.push_str(&parser.text_from_range(pivot, parser.length));

        Ok(Statement::new(out, values).with_dialect(Dialect::TSql))
    }

    /// Backtick identifiers become bracketed, double-quoted strings become
    /// single-quoted, and backslash escapes in strings are resolved.
    pub fn requote(sql: &str, _config: &TranspilerConfig) -> Result<String, ParseError> {
        let mut parser = QueryParser::new(sql);
        let mut out = String::with_capacity(sql.len());

        while !parser.eof() {
            let pivot = parser.position;
            let quote = parser.current();
            if !parser.skip_quoted()? {
                out.push(quote);
                parser.next();
                continue;
            }

            let quoted = parser.text_from_pivot(pivot);
            match quote {
                '`' => {
                    let name = quoted[1..quoted.len() - 1].replace("``", "`");
                    out.push('[');
                    out.push_str(&name.replace(']', "]]"));
                    out.push(']');
                },
                '"' => out.push_str(&FunctionTranspiler::string_literal(&quoted, '"')),
                '\'' if quoted.contains('\\') => out.push_str(&FunctionTranspiler::string_literal(&quoted, '\'')),
                _ => out.push_str(&quoted),
            }
        }

        Ok(out)
    }

    /// Re-encodes a MySQL string literal as a single-quoted T-SQL one.
    fn string_literal(quoted: &str, quote: char) -> String {
        let inner: Vec<char> = quoted.chars().collect();
        let inner = &inner[1..inner.len() - 1];

        let mut value = String::with_capacity(inner.len());
        let mut i = 0;
        while i < inner.len() {
            let ch = inner[i];
            let next = inner.get(i + 1).copied();
            match (ch, next) {
                ('\\', Some(escaped @ ('\'' | '"' | '\\'))) => value.push(escaped),
                ('\\', Some('n')) => value.push('\n'),
                ('\\', Some('t')) => value.push('\t'),
                ('\\', Some('r')) => value.push('\r'),
                ('\\', Some(other)) => {
                    value.push('\\');
                    value.push(other);
                },
                (c, Some(n)) if c == quote && n == quote => value.push(quote),
                (c, _) => {
                    value.push(c);
                    i += 1;
                    continue;
                },
            }
            i += 2;
        }

        format!("'{}'", value.replace('\'', "''"))
    }

    pub fn drop_create_table_guard(sql: &str, _config: &TranspilerConfig) -> Result<String, ParseError> {
        Ok(CREATE_TABLE_IF_NOT_EXISTS.replace(sql, "${1}CREATE TABLE").into_owned())
    }

    fn rewrite_all_calls(sql: &str, config: &TranspilerConfig) -> Result<String, ParseError> {
        let mut sql = sql.to_string();
        for (name, build) in CALL_REWRITES {
            sql = FunctionTranspiler::rewrite_calls(&sql, name, config, *build)?;
        }
        Ok(sql)
    }

    /// Replaces every call of `name` in `sql`, innermost first.
    pub fn rewrite_calls(sql: &str, name: &str, config: &TranspilerConfig, build: CallBuilder) -> Result<String, ParseError> {
        let comparer = WordComparer::function(name);
        let mut parser = QueryParser::with_dialect(sql, Dialect::TSql);
        let mut out = String::with_capacity(sql.len());
        let mut pivot = 0;

        while let Some(call) = FunctionCall::find_next(&mut parser, &comparer)? {
            let inner = FunctionTranspiler::rewrite_calls(&call.inner(&parser), name, config, build)?;
            let args = ArgsParser::split(&inner, Dialect::TSql)?;
            out.push_str(&parser.text_from_range(pivot, call.start));

            let call_args = CallArgs { name: call.name.clone(), inner, args };
            match build(&call_args, config) {
                CallRewrite::Replace(replacement) => out.push_str(&replacement),
                CallRewrite::Keep => {
                    out.push_str(&parser.text_from_range(call.start, call.open + 1));
                    out.push_str(&call_args.inner);
                    out.push(')');
                },
            }
            pivot = call.end();
        }

        out.push_str(&parser.text_from_range(pivot, parser.length));
        Ok(out)
    }

    /// Whether `text` holds `comparer`'s keyword outside parentheses and literals.
    fn has_top_level(text: &str, comparer: &WordComparer) -> bool {
        let mut parser = QueryParser::with_dialect(text, Dialect::TSql);
        while !parser.eof() {
            if parser.at_top_level() && comparer.compare(&parser) {
                return true;
            }
            if parser.advance().is_err() {
                return true;
            }
        }
        false
    }

    fn now(call: &CallArgs, _config: &TranspilerConfig) -> CallRewrite {
        match call.args.len() {
            0 => CallRewrite::Replace("GETDATE()".to_string()),
            _ => CallRewrite::Replace("SYSDATETIME()".to_string()),
        }
    }

    fn current_timestamp(call: &CallArgs, _config: &TranspilerConfig) -> CallRewrite {
        match call.args.len() {
            0 => CallRewrite::Replace("CURRENT_TIMESTAMP".to_string()),
            _ => CallRewrite::Replace("SYSDATETIME()".to_string()),
        }
    }

    fn curdate(call: &CallArgs, _config: &TranspilerConfig) -> CallRewrite {
        if !call.args.is_empty() {
            return CallRewrite::Keep;
        }
        CallRewrite::Replace("CAST(GETDATE() AS DATE)".to_string())
    }

    fn ifnull(call: &CallArgs, _config: &TranspilerConfig) -> CallRewrite {
        if call.args.len() != 2 {
            return CallRewrite::Keep;
        }
        CallRewrite::Replace(format!("ISNULL({})", call.inner))
    }

    fn iif(call: &CallArgs, _config: &TranspilerConfig) -> CallRewrite {
        if call.args.len() != 3 {
            return CallRewrite::Keep;
        }
        CallRewrite::Replace(format!("IIF({})", call.inner))
    }

    fn len(call: &CallArgs, _config: &TranspilerConfig) -> CallRewrite {
        if call.args.len() != 1 {
            return CallRewrite::Keep;
        }
        CallRewrite::Replace(format!("LEN({})", call.inner))
    }

    fn lpad(call: &CallArgs, config: &TranspilerConfig) -> CallRewrite {
        let [subject, length, pad] = call.args.as_slice() else {
            return CallRewrite::Keep;
        };
        CallRewrite::Replace(format!(
            "RIGHT(REPLICATE({pad}, {length}) + LEFT(CAST({subject} AS {}), {length}), {length})",
            config.text_type
        ))
    }

    fn rpad(call: &CallArgs, config: &TranspilerConfig) -> CallRewrite {
        let [subject, length, pad] = call.args.as_slice() else {
            return CallRewrite::Keep;
        };
        CallRewrite::Replace(format!(
            "LEFT(CAST({subject} AS {}) + REPLICATE({pad}, {length}), {length})",
            config.text_type
        ))
    }

    fn trim(call: &CallArgs, _config: &TranspilerConfig) -> CallRewrite {
        let [value] = call.args.as_slice() else {
            return CallRewrite::Keep;
        };
        if FunctionTranspiler::has_top_level(value, &TRIM_FROM) {
            return CallRewrite::Keep;
        }
        CallRewrite::Replace(format!("LTRIM(RTRIM({value}))"))
    }

    fn timestampdiff(call: &CallArgs, _config: &TranspilerConfig) -> CallRewrite {
        let [unit, start, end] = call.args.as_slice() else {
            return CallRewrite::Keep;
        };
        let unit = unit.to_uppercase();
        let unit = unit.strip_prefix("SQL_TSI_").unwrap_or(&unit);
        if !DATEDIFF_UNITS.contains(&unit) {
            warn!(pass = %Pass::Functions, unit, "TIMESTAMPDIFF unit has no DATEDIFF counterpart");
            return CallRewrite::Keep;
        }
        CallRewrite::Replace(format!("DATEDIFF({unit}, {start}, {end})"))
    }

    fn date_format(call: &CallArgs, _config: &TranspilerConfig) -> CallRewrite {
        let [date, format] = call.args.as_slice() else {
            return CallRewrite::Keep;
        };
        let Some(pattern) = FunctionTranspiler::literal_value(format) else {
            warn!(pass = %Pass::Functions, format = %format, "DATE_FORMAT with a non-literal format left untouched");
            return CallRewrite::Keep;
        };

        match pattern.as_str() {
            "%Y-%m-%d" => CallRewrite::Replace(format!("CONVERT(VARCHAR(10), {date}, 23)")),
            "%Y-%m-%d %H:%i:%s" | "%Y-%m-%d %T" => CallRewrite::Replace(format!("CONVERT(VARCHAR(19), {date}, 120)")),
            "%H:%i:%s" | "%T" => CallRewrite::Replace(format!("CONVERT(VARCHAR(8), {date}, 108)")),
            _ => match FunctionTranspiler::net_format(&pattern) {
                Some(net) => CallRewrite::Replace(format!("FORMAT({date}, '{}')", net.replace('\'', "''"))),
                None => {
                    warn!(pass = %Pass::Functions, format = %pattern, "DATE_FORMAT pattern has unsupported tokens");
                    CallRewrite::Keep
                },
            },
        }
    }

    /// Value of a single-quoted literal argument.
    fn literal_value(text: &str) -> Option<String> {
        let text = text.trim();
        if text.len() < 2 || !text.starts_with('\'') || !text.ends_with('\'') {
            return None;
        }
        let inner = &text[1..text.len() - 1];
        (!inner.replace("''", "").contains('\'')).then(|| inner.replace("''", "'"))
    }

    /// MySQL `DATE_FORMAT` pattern as a .NET custom format string.
    pub fn net_format(pattern: &str) -> Option<String> {
        let mut unsupported = false;
        let converted = DATE_FORMAT_TOKEN.replace_all(pattern, |caps: &Captures| {
            let token = &caps[0];
            let mapped = match token {
                "%Y" => "yyyy",
                "%y" => "yy",
                "%m" => "MM",
                "%c" => "M",
                "%d" => "dd",
                "%e" => "d",
                "%H" => "HH",
                "%k" => "H",
                "%h" | "%I" => "hh",
                "%l" => "h",
                "%i" => "mm",
                "%s" | "%S" => "ss",
                "%f" => "ffffff",
                "%p" => "tt",
                "%M" => "MMMM",
                "%b" => "MMM",
                "%W" => "dddd",
                "%a" => "ddd",
                "%T" => "HH\\:mm\\:ss",
                "%r" => "hh\\:mm\\:ss tt",
                "%%" | "%" => "\\%",
                _ if token.starts_with('%') => {
                    unsupported = true;
                    ""
                },
                _ => return format!("\\{token}"),
            };
            mapped.to_string()
        });

        (!unsupported).then(|| converted.into_owned())
    }

    fn concat(call: &CallArgs, config: &TranspilerConfig) -> CallRewrite {
        if call.args.is_empty() {
            return CallRewrite::Keep;
        }
        let operands: Vec<String> = call
            .args
            .iter()
            .map(|arg| format!("CAST({arg} AS {})", config.text_type))
            .collect();
        CallRewrite::Replace(format!("({})", operands.join(" + ")))
    }
}

impl RewritePass for FunctionTranspiler {
    fn pass(&self) -> Pass {
        Pass::Functions
    }

    fn apply(&self, statement: Statement, config: &TranspilerConfig) -> TranspileResult<Statement> {
        FunctionTranspiler::transpile(statement, config)
    }
}
