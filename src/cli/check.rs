//! Validate CQL2 filters

use serde_json::{Value, json};

use super::{CliError, Syntax, convert::parse_filter, detect_syntax};
use crate::Expr;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The filter to validate
    pub filter: String,
    /// Input syntax; detected from the filter when not set
    pub from: Option<Syntax>,
}

/// Result of a successful check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    /// Syntax the filter was read as
    pub syntax: Syntax,
    /// CQL2-JSON name of the root operator
    pub root: String,
    /// Number of terminal predicates anywhere in the tree
    pub predicates: usize,
}

impl CheckResult {
    pub fn to_json(&self) -> Value {
        json!({
            "valid": true,
            "syntax": self.syntax.name(),
            "root": self.root,
            "predicates": self.predicates,
        })
    }
}

impl std::fmt::Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Valid {} filter ({} predicate{}, root '{}')",
            self.syntax.name(),
            self.predicates,
            if self.predicates == 1 { "" } else { "s" },
            self.root
        )
    }
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let syntax = options
        .from
        .unwrap_or_else(|| detect_syntax(&options.filter));
    let expr = parse_filter(&options.filter, Some(syntax))?;

    Ok(CheckResult {
        syntax,
        root: expr.op_name().to_string(),
        predicates: count_predicates(&expr),
    })
}

fn count_predicates(expr: &Expr) -> usize {
    let mut count = 0;
    let mut pending = vec![expr];
    while let Some(expr) = pending.pop() {
        match expr {
            Expr::Logical { children, .. } => pending.extend(children),
            Expr::Not(inner) => pending.push(&**inner),
            other if other.is_terminal_predicate() => count += 1,
            _ => {}
        }
    }
    count
}
