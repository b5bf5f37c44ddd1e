use serde_json::{Value, json};
use tracing::debug;

use super::{SerializeError, descend, require};
use crate::{
    ast::Expr,
    value::{Literal, format_bound, format_date, format_timestamp, number_to_json},
};

/// Converts an expression to its canonical CQL2-JSON tree.
///
/// ```
/// use cql2_lang::{Expr, to_json};
/// use cql2_lang::ast::ComparisonOp;
/// use serde_json::json;
///
/// let expr = Expr::comparison(ComparisonOp::LessThan, Expr::property("eo:cloud_cover"), Expr::literal(20));
/// assert_eq!(
///     to_json(&expr).unwrap(),
///     json!({"op": "<", "args": [{"property": "eo:cloud_cover"}, 20]})
/// );
/// ```
pub fn to_json(expr: &Expr) -> Result<Value, SerializeError> {
    debug!(op = expr.op_name(), "serializing CQL2 JSON");
    node(expr, 0)
}

/// [`to_json`] for an optional tree; `None` is [`SerializeError::Empty`].
pub fn to_json_opt(expr: Option<&Expr>) -> Result<Value, SerializeError> {
    to_json(require(expr)?)
}

/// Compact CQL2-JSON text. Keys are sorted, so equal trees always give
/// identical bytes.
pub fn to_json_string(expr: &Expr) -> Result<String, SerializeError> {
    Ok(to_json(expr)?.to_string())
}

/// CQL2-JSON with two-space indentation.
pub fn to_json_pretty(expr: &Expr) -> Result<String, SerializeError> {
    Ok(format!("{:#}", to_json(expr)?))
}

fn node(expr: &Expr, depth: usize) -> Result<Value, SerializeError> {
    let depth = descend(depth)?;
    let value = match expr {
        Expr::Property(name) => json!({ "property": name }),
        Expr::Literal(literal) => literal_json(literal)?,
        Expr::Comparison { left, right, .. }
        | Expr::Like {
            value: left,
            pattern: right,
        }
        | Expr::Spatial { left, right, .. }
        | Expr::Temporal { left, right, .. } => {
            op(expr, vec![node(left, depth)?, node(right, depth)?])
        }
        Expr::Logical { children, .. } => op(expr, nodes(children, depth)?),
        Expr::Not(inner) | Expr::IsNull(inner) => op(expr, vec![node(inner, depth)?]),
        Expr::Between {
            value,
            lower,
            upper,
        } => op(expr, vec![node(value, depth)?, node(lower, depth)?, node(upper, depth)?]),
        Expr::In { value, candidates } => {
            op(expr, vec![node(value, depth)?, Value::Array(nodes(candidates, depth)?)])
        }
        Expr::Function { name, args } => json!({
            "function": { "name": name, "args": nodes(args, depth)? }
        }),
    };
    Ok(value)
}

fn nodes(exprs: &[Expr], depth: usize) -> Result<Vec<Value>, SerializeError> {
    exprs.iter().map(|expr| node(expr, depth)).collect()
}

fn op(expr: &Expr, args: Vec<Value>) -> Value {
    json!({ "op": expr.op_name(), "args": args })
}

fn literal_json(literal: &Literal) -> Result<Value, SerializeError> {
    let value = match literal {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Number(n) => number_to_json(*n).ok_or(SerializeError::NonFiniteNumber(*n))?,
        Literal::Boolean(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
        Literal::Timestamp(ts) => json!({ "timestamp": format_timestamp(ts) }),
        Literal::Date(date) => json!({ "date": format_date(date) }),
        Literal::Interval(interval) => json!({
            "interval": [format_bound(&interval.start), format_bound(&interval.end)]
        }),
        Literal::Geometry(geometry) => geometry.to_geojson()?,
    };
    Ok(value)
}
