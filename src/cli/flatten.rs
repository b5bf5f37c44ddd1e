//! List the terminal predicates of a conjunction

use super::{CliError, Syntax, convert::parse_filter};
use crate::{Expr, flatten_conjunction, group_by_operator, group_by_property, to_json_string, to_text};

/// How to bucket the flattened predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Property,
    Operator,
}

/// Options for the flatten command
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// The filter to flatten
    pub filter: String,
    /// Input syntax; detected from the filter when not set
    pub from: Option<Syntax>,
    /// Optional grouping of the output
    pub group_by: Option<GroupBy>,
}

/// Execute a flatten operation. Returns one predicate per line, indented
/// under a heading per group when grouping is requested.
pub fn execute_flatten(options: &FlattenOptions) -> Result<String, CliError> {
    let expr = parse_filter(&options.filter, options.from)?;
    let predicates = flatten_conjunction(&expr)?;

    let mut lines = Vec::new();
    match options.group_by {
        None => {
            for predicate in predicates {
                lines.push(render(predicate)?);
            }
        }
        Some(GroupBy::Property) => {
            for (property, bucket) in group_by_property(&predicates) {
                lines.push(format!("{}:", property.as_deref().unwrap_or("(no property)")));
                for predicate in bucket {
                    lines.push(format!("  {}", render(predicate)?));
                }
            }
        }
        Some(GroupBy::Operator) => {
            for (op, bucket) in group_by_operator(&predicates) {
                lines.push(format!("{}:", op));
                for predicate in bucket {
                    lines.push(format!("  {}", render(predicate)?));
                }
            }
        }
    }
    Ok(lines.join("\n"))
}

/// Text when the predicate has a text form, compact JSON otherwise.
fn render(predicate: &Expr) -> Result<String, CliError> {
    match to_text(predicate) {
        Ok(text) => Ok(text),
        Err(_) => Ok(to_json_string(predicate)?),
    }
}
