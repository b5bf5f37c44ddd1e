//! CQL2-JSON parsing.
//!
//! Every node is `{"op": <name>, "args": [...]}`. The op name is looked up in
//! a fixed table that yields the node kind and its arity; each argument is
//! then classified by the keys it carries before anything is converted.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{ComparisonOp, Expr, LogicalOp, MAX_NESTING, SpatialOp, TemporalOp},
    geometry::{Geometry, GeometryError},
    value::{Instant, Interval, Literal, OPEN_BOUND, parse_bound, parse_date, parse_timestamp},
};

/// Argument count an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Shape violations in CQL2-JSON input.
#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a CQL2 expression object, got {found}")]
    NotAnExpression { found: String },

    #[error("Unknown operator '{op}'")]
    UnknownOperator { op: String },

    #[error("Operator '{op}' expects {expected} argument(s), got {actual}")]
    Arity {
        op: String,
        expected: Arity,
        actual: usize,
    },

    #[error("Operator '{op}': {message}")]
    MalformedOperand { op: String, message: String },

    #[error("{0}")]
    InvalidLiteral(String),

    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Expression nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

#[derive(Debug, Clone, Copy)]
enum OpKind {
    Logical(LogicalOp),
    Not,
    Comparison(ComparisonOp),
    Like,
    Between,
    In,
    IsNull,
    Spatial(SpatialOp),
    Temporal(TemporalOp),
}

/// The operator table. Names are case-sensitive.
fn lookup(op: &str) -> Option<(OpKind, Arity)> {
    let entry = match op {
        "and" => (OpKind::Logical(LogicalOp::And), Arity::AtLeast(1)),
        "or" => (OpKind::Logical(LogicalOp::Or), Arity::AtLeast(1)),
        "not" => (OpKind::Not, Arity::Exactly(1)),
        "like" => (OpKind::Like, Arity::Exactly(2)),
        "between" => (OpKind::Between, Arity::Exactly(3)),
        "in" => (OpKind::In, Arity::Exactly(2)),
        "isNull" => (OpKind::IsNull, Arity::Exactly(1)),
        other => {
            let kind = ComparisonOp::from_symbol(other)
                .map(OpKind::Comparison)
                .or_else(|| SpatialOp::from_json_name(other).map(OpKind::Spatial))
                .or_else(|| TemporalOp::from_json_name(other).map(OpKind::Temporal))?;
            (kind, Arity::Exactly(2))
        }
    };
    Some(entry)
}

/// What an argument object represents, decided from its keys alone.
enum OperandShape {
    Property,
    Expression,
    Function,
    Timestamp,
    Date,
    Interval,
    BBox,
    Geometry,
}

fn classify(object: &Map<String, Value>) -> Option<OperandShape> {
    let shape = if object.contains_key("property") {
        OperandShape::Property
    } else if object.contains_key("op") {
        OperandShape::Expression
    } else if object.contains_key("function") {
        OperandShape::Function
    } else if object.contains_key("timestamp") {
        OperandShape::Timestamp
    } else if object.contains_key("date") {
        OperandShape::Date
    } else if object.contains_key("interval") {
        OperandShape::Interval
    } else if object.contains_key("type") {
        OperandShape::Geometry
    } else if object.contains_key("bbox") {
        OperandShape::BBox
    } else {
        return None;
    };
    Some(shape)
}

/// Parses a CQL2-JSON expression.
///
/// ```
/// use cql2_lang::{Expr, Literal, parse_json};
/// use serde_json::json;
///
/// let expr = parse_json(&json!({
///     "op": ">=",
///     "args": [{"property": "datetime"}, {"timestamp": "2021-04-08T04:39:23Z"}]
/// }))
/// .unwrap();
/// assert!(matches!(expr, Expr::Comparison { right, .. } if matches!(*right, Expr::Literal(Literal::Timestamp(_)))));
/// ```
pub fn parse_json(value: &Value) -> Result<Expr, SemanticError> {
    debug!("parsing CQL2 JSON");
    parse_expression(value)
}

/// Parses CQL2-JSON from a string.
pub fn parse_json_str(input: &str) -> Result<Expr, SemanticError> {
    let value: Value = serde_json::from_str(input)?;
    parse_json(&value)
}

fn parse_expression(value: &Value) -> Result<Expr, SemanticError> {
    let object = value.as_object().ok_or_else(|| SemanticError::NotAnExpression {
        found: describe(value),
    })?;
    match classify(object) {
        Some(OperandShape::Expression) => parse_operation(object, 0),
        Some(OperandShape::Function) => parse_function(object, 0),
        _ => Err(SemanticError::NotAnExpression {
            found: describe(value),
        }),
    }
}

/// An argument of `and`, `or` or `not`: a nested operation or function.
fn condition(op: &str, value: &Value, depth: usize) -> Result<Expr, SemanticError> {
    match value.as_object().map(|object| (object, classify(object))) {
        Some((object, Some(OperandShape::Expression))) => parse_operation(object, depth),
        Some((object, Some(OperandShape::Function))) => parse_function(object, depth),
        _ => Err(malformed(
            op,
            format!("arguments must be expressions, got {}", describe(value)),
        )),
    }
}

/// One more level of nested operation or function; the root is level 0 and
/// at most [`MAX_NESTING`] levels may sit below it.
fn enter(depth: usize) -> Result<usize, SemanticError> {
    if depth > MAX_NESTING {
        return Err(SemanticError::NestingTooDeep { limit: MAX_NESTING });
    }
    Ok(depth + 1)
}

fn parse_operation(object: &Map<String, Value>, depth: usize) -> Result<Expr, SemanticError> {
    let depth = enter(depth)?;
    let op = object
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| SemanticError::NotAnExpression {
            found: "an object whose \"op\" is not a string".to_string(),
        })?;

    let args: &[Value] = match object.get("args") {
        Some(Value::Array(args)) => args,
        None => &[],
        Some(other) => {
            return Err(malformed(op, format!("\"args\" must be an array, got {}", describe(other))));
        }
    };

    let (kind, arity) = lookup(op).ok_or_else(|| SemanticError::UnknownOperator {
        op: op.to_string(),
    })?;
    if !arity.accepts(args.len()) {
        return Err(SemanticError::Arity {
            op: op.to_string(),
            expected: arity,
            actual: args.len(),
        });
    }

    let expr = match kind {
        OpKind::Logical(logical) => {
            let children = args
                .iter()
                .map(|arg| condition(op, arg, depth))
                .collect::<Result<Vec<_>, _>>()?;
            // Arity was checked, so there is at least one child.
            Expr::logical(logical, children).ok_or_else(|| SemanticError::Arity {
                op: op.to_string(),
                expected: arity,
                actual: 0,
            })?
        }
        OpKind::Not => Expr::not(condition(op, &args[0], depth)?),
        OpKind::Comparison(cmp) => {
            Expr::comparison(cmp, operand(op, &args[0], depth)?, operand(op, &args[1], depth)?)
        }
        OpKind::Like => Expr::like(subject(op, &args[0], depth)?, operand(op, &args[1], depth)?),
        OpKind::Between => Expr::between(
            subject(op, &args[0], depth)?,
            operand(op, &args[1], depth)?,
            operand(op, &args[2], depth)?,
        ),
        OpKind::In => {
            let candidates = args[1].as_array().ok_or_else(|| {
                malformed(op, format!("second argument must be an array, got {}", describe(&args[1])))
            })?;
            let candidates = candidates
                .iter()
                .map(|c| operand(op, c, depth))
                .collect::<Result<Vec<_>, _>>()?;
            Expr::in_list(subject(op, &args[0], depth)?, candidates)
        }
        OpKind::IsNull => Expr::is_null(subject(op, &args[0], depth)?),
        OpKind::Spatial(spatial) => {
            Expr::spatial(spatial, subject(op, &args[0], depth)?, operand(op, &args[1], depth)?)
        }
        OpKind::Temporal(temporal) => {
            Expr::temporal(temporal, subject(op, &args[0], depth)?, operand(op, &args[1], depth)?)
        }
    };
    Ok(expr)
}

/// `{"function": {"name": .., "args": [..]}}`
fn parse_function(object: &Map<String, Value>, depth: usize) -> Result<Expr, SemanticError> {
    let depth = enter(depth)?;
    let function = object
        .get("function")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("function", "\"function\" must be an object"))?;
    let name = function
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("function", "missing string \"name\""))?;
    let args = match function.get("args") {
        Some(Value::Array(args)) => args
            .iter()
            .map(|arg| operand(name, arg, depth))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
        Some(other) => {
            return Err(malformed(name, format!("\"args\" must be an array, got {}", describe(other))));
        }
    };
    Ok(Expr::function(name, args))
}

/// First argument of a predicate: a property reference or a nested expression.
fn subject(op: &str, value: &Value, depth: usize) -> Result<Expr, SemanticError> {
    let acceptable = value.as_object().and_then(classify).is_some_and(|shape| {
        matches!(
            shape,
            OperandShape::Property | OperandShape::Expression | OperandShape::Function
        )
    });
    if !acceptable {
        return Err(malformed(
            op,
            format!(
                "first argument must be a property reference or a nested expression, got {}",
                describe(value)
            ),
        ));
    }
    operand(op, value, depth)
}

/// Any argument position.
fn operand(op: &str, value: &Value, depth: usize) -> Result<Expr, SemanticError> {
    let literal = match value {
        Value::Null => Literal::Null,
        Value::Bool(b) => Literal::Boolean(*b),
        Value::Number(n) => Literal::Number(
            n.as_f64()
                .ok_or_else(|| SemanticError::InvalidLiteral(format!("unrepresentable number {}", n)))?,
        ),
        Value::String(s) => Literal::String(s.clone()),
        Value::Array(_) => {
            return Err(malformed(op, "arrays are only allowed as the candidate list of 'in'"));
        }
        Value::Object(object) => return object_operand(op, object, depth),
    };
    Ok(Expr::Literal(literal))
}

fn object_operand(
    op: &str,
    object: &Map<String, Value>,
    depth: usize,
) -> Result<Expr, SemanticError> {
    let Some(shape) = classify(object) else {
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        return Err(malformed(
            op,
            format!("unrecognized operand object with keys [{}]", keys.join(", ")),
        ));
    };

    let literal = match shape {
        OperandShape::Property => {
            return match object.get("property") {
                Some(Value::String(name)) => Ok(Expr::Property(name.clone())),
                _ => Err(malformed(op, "\"property\" must be a string")),
            };
        }
        OperandShape::Expression => return parse_operation(object, depth),
        OperandShape::Function => return parse_function(object, depth),
        OperandShape::Timestamp => {
            Literal::Timestamp(parse_timestamp(wrapped_string(op, object, "timestamp")?)?)
        }
        OperandShape::Date => Literal::Date(parse_date(wrapped_string(op, object, "date")?)?),
        OperandShape::Interval => Literal::Interval(interval(op, &object["interval"])?),
        OperandShape::BBox => {
            let bounds = object["bbox"]
                .as_array()
                .and_then(|b| b.iter().map(Value::as_f64).collect::<Option<Vec<_>>>())
                .ok_or_else(|| malformed(op, "\"bbox\" must be an array of numbers"))?;
            Literal::Geometry(Geometry::envelope(bounds)?)
        }
        OperandShape::Geometry => {
            Literal::Geometry(Geometry::from_geojson(&Value::Object(object.clone()))?)
        }
    };
    Ok(Expr::Literal(literal))
}

fn wrapped_string<'a>(
    op: &str,
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str, SemanticError> {
    object
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(op, format!("\"{}\" must be an ISO-8601 string", key)))
}

/// `{"interval": [start, end]}`; bounds are ISO strings, typed wrappers,
/// `".."` or `null`.
fn interval(op: &str, value: &Value) -> Result<Interval, SemanticError> {
    let bounds = value
        .as_array()
        .filter(|b| b.len() == 2)
        .ok_or_else(|| malformed(op, "\"interval\" must be an array of two bounds"))?;
    Ok(Interval::new(bound(op, &bounds[0])?, bound(op, &bounds[1])?))
}

fn bound(op: &str, value: &Value) -> Result<Option<Instant>, SemanticError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => parse_bound(text),
        Value::Object(object) => match classify(object) {
            Some(OperandShape::Timestamp) => Ok(Some(Instant::Timestamp(parse_timestamp(
                wrapped_string(op, object, "timestamp")?,
            )?))),
            Some(OperandShape::Date) => Ok(Some(Instant::Date(parse_date(wrapped_string(
                op, object, "date",
            )?)?))),
            _ => Err(malformed(op, "interval bounds must be instants")),
        },
        other => Err(malformed(
            op,
            format!(
                "interval bound must be an instant, \"{}\" or null, got {}",
                OPEN_BOUND,
                describe(other)
            ),
        )),
    }
}

fn malformed(op: &str, message: impl Into<String>) -> SemanticError {
    SemanticError::MalformedOperand {
        op: op.to_string(),
        message: message.into(),
    }
}

/// Short human description of a JSON value for diagnostics.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(items) => format!("an array of {} item(s)", items.len()),
        Value::Object(_) => "an object".to_string(),
    }
}
