//! Rendering expression trees in a foreign query dialect.
//!
//! A [`Dialect`] is a table of string templates keyed by what a node is:
//!
//! | Node | Key |
//! |---|---|
//! | operators | CQL2-JSON name: `and`, `=`, `like`, `isNull`, `s_intersects`, `t_during`, ... |
//! | property references | `property` |
//! | literals | `string`, `number`, `boolean`, `null`, `timestamp`, `date`, `interval`, `geometry` |
//! | open interval bound | `open` |
//! | extension functions | the function name |
//!
//! Templates refer to the node's translated operands:
//!
//! - `{0}`, `{1}`, ... one operand by position
//! - `{args}` every operand, joined with `", "`
//! - `{rest}` every operand after the first
//! - `{args:SEP}` / `{rest:SEP}` the same with a custom separator
//!
//! Leaves expose their text as `{0}`: the property name after
//! `identifier_escapes`, the string contents after `escapes`, the number,
//! `true`/`false`, the ISO date or timestamp. Intervals expose their two
//! translated bounds; geometries expose WKT as `{0}` and compact GeoJSON as
//! `{1}`.
//!
//! A node whose key has no template fails the whole translation; nothing is
//! silently dropped.
//!
//! # Examples
//!
//! ```
//! use cql2_lang::{parse_text, translate::{Dialect, translate}};
//!
//! let dialect = Dialect::new("sql")
//!     .with_template("and", "{args: AND }")
//!     .with_template("<", "{0} < {1}")
//!     .with_template("=", "{0} = {1}")
//!     .with_template("property", "\"{0}\"")
//!     .with_template("string", "'{0}'")
//!     .with_template("number", "{0}")
//!     .with_escape('\'', "''")
//!     .with_identifier_escape('"', "\"\"");
//!
//! let expr = parse_text("platform = 'sentinel' AND cloud_cover < 20").unwrap();
//! assert_eq!(
//!     translate(&expr, &dialect).unwrap(),
//!     "\"platform\" = 'sentinel' AND \"cloud_cover\" < 20"
//! );
//! ```

use std::{collections::HashMap, fs, path::Path, sync::LazyLock};

use regex::{Captures, Regex};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    ast::Expr,
    geometry::Geometry,
    output::{SerializeError, descend},
    value::{Instant, Literal, format_date, format_number, format_timestamp},
};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(\d+|args|rest)(?::([^}]*))?\}").expect("placeholder pattern is valid")
});

const DEFAULT_SEPARATOR: &str = ", ";

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Operator '{op}' is not supported by dialect '{dialect}'")]
    UnsupportedOperator { op: String, dialect: String },

    #[error("Template for '{op}' uses {placeholder} but the node has {available} operand(s)")]
    Placeholder {
        op: String,
        placeholder: String,
        available: usize,
    },

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("Invalid dialect definition: {0}")]
    InvalidDialect(#[from] serde_json::Error),

    #[error("Cannot read dialect file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Mapping table for one target query language.
///
/// Loaded from JSON:
///
/// ```json
/// {
///   "name": "sql",
///   "operators": { "and": "({args: AND })", "=": "{0} = {1}", "property": "\"{0}\"" },
///   "escapes": { "'": "''" },
///   "identifier_escapes": { "\"": "\"\"" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Dialect {
    pub name: String,
    #[serde(default)]
    pub operators: HashMap<String, String>,
    /// Replacements applied to each character of string literal contents
    #[serde(default)]
    pub escapes: HashMap<String, String>,
    /// Replacements applied to each character of property names
    #[serde(default)]
    pub identifier_escapes: HashMap<String, String>,
}

impl Dialect {
    pub fn new(name: impl Into<String>) -> Self {
        Dialect {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_template(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.operators.insert(key.into(), template.into());
        self
    }

    #[must_use]
    pub fn with_escape(mut self, ch: char, replacement: impl Into<String>) -> Self {
        self.escapes.insert(ch.to_string(), replacement.into());
        self
    }

    #[must_use]
    pub fn with_identifier_escape(mut self, ch: char, replacement: impl Into<String>) -> Self {
        self.identifier_escapes.insert(ch.to_string(), replacement.into());
        self
    }

    pub fn from_json_str(input: &str) -> Result<Self, TranslateError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TranslateError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TranslateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    fn template(&self, key: &str) -> Result<&str, TranslateError> {
        self.operators
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| TranslateError::UnsupportedOperator {
                op: key.to_string(),
                dialect: self.name.clone(),
            })
    }

    fn escape(&self, s: &str) -> String {
        replace_chars(&self.escapes, s)
    }

    fn escape_identifier(&self, name: &str) -> String {
        replace_chars(&self.identifier_escapes, name)
    }
}

fn replace_chars(table: &HashMap<String, String>, s: &str) -> String {
    if table.is_empty() {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut buf = [0u8; 4];
    for c in s.chars() {
        match table.get(&*c.encode_utf8(&mut buf)) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

/// Renders `expr` in `dialect`.
pub fn translate(expr: &Expr, dialect: &Dialect) -> Result<String, TranslateError> {
    debug!(dialect = %dialect.name, op = expr.op_name(), "translating expression");
    Translator { dialect }.node(expr, 0)
}

struct Translator<'d> {
    dialect: &'d Dialect,
}

impl Translator<'_> {
    fn node(&self, expr: &Expr, depth: usize) -> Result<String, TranslateError> {
        let depth = descend(depth)?;
        let operands = match expr {
            Expr::Property(name) => vec![self.dialect.escape_identifier(name)],
            Expr::Literal(literal) => return self.literal(literal),
            Expr::Comparison { left, right, .. }
            | Expr::Like {
                value: left,
                pattern: right,
            }
            | Expr::Spatial { left, right, .. }
            | Expr::Temporal { left, right, .. } => {
                vec![self.node(left, depth)?, self.node(right, depth)?]
            }
            Expr::Logical { children, .. } => self.nodes(children, depth)?,
            Expr::Not(inner) | Expr::IsNull(inner) => vec![self.node(inner, depth)?],
            Expr::Between {
                value,
                lower,
                upper,
            } => vec![
                self.node(value, depth)?,
                self.node(lower, depth)?,
                self.node(upper, depth)?,
            ],
            Expr::In { value, candidates } => {
                let mut operands = vec![self.node(value, depth)?];
                operands.extend(self.nodes(candidates, depth)?);
                operands
            }
            Expr::Function { args, .. } => self.nodes(args, depth)?,
        };
        self.apply(expr.op_name(), &operands)
    }

    fn nodes(&self, exprs: &[Expr], depth: usize) -> Result<Vec<String>, TranslateError> {
        exprs.iter().map(|e| self.node(e, depth)).collect()
    }

    fn literal(&self, literal: &Literal) -> Result<String, TranslateError> {
        let operands = match literal {
            Literal::String(s) => vec![self.dialect.escape(s)],
            Literal::Number(n) => {
                if !n.is_finite() {
                    return Err(SerializeError::NonFiniteNumber(*n).into());
                }
                vec![format_number(*n)]
            }
            Literal::Boolean(b) => vec![b.to_string()],
            Literal::Null => Vec::new(),
            Literal::Timestamp(ts) => vec![format_timestamp(ts)],
            Literal::Date(date) => vec![format_date(date)],
            Literal::Interval(interval) => vec![
                self.bound(interval.start.as_ref())?,
                self.bound(interval.end.as_ref())?,
            ],
            Literal::Geometry(geometry) => geometry_operands(geometry)?,
        };
        self.apply(literal.kind(), &operands)
    }

    fn bound(&self, bound: Option<&Instant>) -> Result<String, TranslateError> {
        match bound {
            Some(Instant::Timestamp(ts)) => self.apply("timestamp", &[format_timestamp(ts)]),
            Some(Instant::Date(date)) => self.apply("date", &[format_date(date)]),
            None => self.apply("open", &[]),
        }
    }

    /// Fills the template for `key` with `operands`.
    fn apply(&self, key: &str, operands: &[String]) -> Result<String, TranslateError> {
        let template = self.dialect.template(key)?;
        let mut out = String::with_capacity(template.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&template[last..whole.start()]);
            out.push_str(&expand(key, &caps, operands)?);
            last = whole.end();
        }
        out.push_str(&template[last..]);
        Ok(out)
    }
}

fn expand(key: &str, caps: &Captures<'_>, operands: &[String]) -> Result<String, TranslateError> {
    let name = &caps[1];
    let separator = caps.get(2).map_or(DEFAULT_SEPARATOR, |m| m.as_str());

    let out_of_range = || TranslateError::Placeholder {
        op: key.to_string(),
        placeholder: caps[0].to_string(),
        available: operands.len(),
    };

    match name {
        "args" => Ok(operands.join(separator)),
        "rest" => Ok(operands.get(1..).unwrap_or_default().join(separator)),
        index => {
            let index: usize = index.parse().map_err(|_| out_of_range())?;
            operands.get(index).cloned().ok_or_else(out_of_range)
        }
    }
}

fn geometry_operands(geometry: &Geometry) -> Result<Vec<String>, TranslateError> {
    let geojson = geometry.to_geojson().map_err(SerializeError::from)?;
    Ok(vec![geometry.to_wkt(), geojson.to_string()])
}
