use thiserror::Error;

use crate::ast::{Expr, LogicalOp};

/// Raised when a tree is not a plain conjunction of terminal predicates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// An `OR` or `NOT` somewhere in the tree.
    #[error("Only AND is supported when flattening a filter, found {op}")]
    OnlyAndSupported { op: String },

    /// A leaf that does not test anything: a bare property, literal or
    /// extension function.
    #[error("Expected a predicate, found a {kind}")]
    NotAPredicate { kind: String },
}

/// Flattens a pure AND-tree into its terminal predicates, left to right.
///
/// Callers that need to keep OR/NOT structure must not use this.
///
/// # Examples
///
/// ```
/// use cql2_lang::{parse_text, transform::flatten_conjunction};
///
/// let expr = parse_text("type = \"satellite\" AND (cloud_cover < 20 AND gsd <= 10)").unwrap();
/// let predicates = flatten_conjunction(&expr).unwrap();
/// assert_eq!(predicates.len(), 3);
///
/// let either = parse_text("a = 1 OR b = 2").unwrap();
/// assert!(flatten_conjunction(&either).is_err());
/// ```
pub fn flatten_conjunction(expr: &Expr) -> Result<Vec<&Expr>, PolicyError> {
    let mut predicates = Vec::new();
    // Explicit stack, children pushed in reverse so they pop left to right.
    let mut pending = vec![expr];
    while let Some(expr) = pending.pop() {
        match expr {
            Expr::Logical {
                op: LogicalOp::And,
                children,
            } => pending.extend(children.iter().rev()),

            Expr::Logical { op: LogicalOp::Or, .. } => {
                return Err(PolicyError::OnlyAndSupported {
                    op: "OR".to_string(),
                });
            }

            Expr::Not(_) => {
                return Err(PolicyError::OnlyAndSupported {
                    op: "NOT".to_string(),
                });
            }

            predicate if predicate.is_terminal_predicate() => predicates.push(predicate),

            // Property, Literal and Function leaves
            other => {
                return Err(PolicyError::NotAPredicate {
                    kind: other.op_name().to_string(),
                });
            }
        }
    }
    Ok(predicates)
}

/// Buckets predicates by the property they test, in first-seen order.
/// Predicates without a property subject share the `None` bucket.
pub fn group_by_property<'a>(predicates: &[&'a Expr]) -> Vec<(Option<String>, Vec<&'a Expr>)> {
    group_by(predicates, |p| p.subject_property().map(str::to_string))
}

/// Buckets predicates by their CQL2-JSON operator name, in first-seen order.
pub fn group_by_operator<'a>(predicates: &[&'a Expr]) -> Vec<(String, Vec<&'a Expr>)> {
    group_by(predicates, |p| p.op_name().to_string())
}

fn group_by<'a, K, F>(predicates: &[&'a Expr], key: F) -> Vec<(K, Vec<&'a Expr>)>
where
    K: PartialEq,
    F: Fn(&Expr) -> K,
{
    let mut groups: Vec<(K, Vec<&'a Expr>)> = Vec::new();
    for &predicate in predicates {
        let k = key(predicate);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, bucket)) => bucket.push(predicate),
            None => groups.push((k, vec![predicate])),
        }
    }
    groups
}
