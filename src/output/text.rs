use tracing::debug;

use super::{SerializeError, descend, require};
use crate::{
    ast::{
        Expr,
        operators::{PRECEDENCE_NOT, PRECEDENCE_OR},
    },
    lexer::is_identifier,
    value::{Literal, format_bound, format_date, format_number, format_timestamp},
};

/// Renders an expression as CQL2-Text.
///
/// Parentheses are emitted exactly where a child binds more loosely than
/// the operator it sits under, so `a AND (b OR c)` keeps its group while
/// `a AND b` never gains one.
///
/// ```
/// use cql2_lang::{Expr, to_text};
/// use cql2_lang::ast::ComparisonOp;
///
/// let expr = Expr::or(
///     Expr::comparison(ComparisonOp::LessThan, Expr::property("humidity"), Expr::literal(50)),
///     Expr::not(Expr::comparison(ComparisonOp::Equal, Expr::property("status"), Expr::literal("active"))),
/// );
/// assert_eq!(to_text(&expr).unwrap(), "humidity < 50 OR NOT status = \"active\"");
/// ```
pub fn to_text(expr: &Expr) -> Result<String, SerializeError> {
    debug!(op = expr.op_name(), "serializing CQL2 text");
    TextPrinter.condition(expr, PRECEDENCE_OR, 0)
}

/// [`to_text`] for an optional tree; `None` is [`SerializeError::Empty`].
pub fn to_text_opt(expr: Option<&Expr>) -> Result<String, SerializeError> {
    to_text(require(expr)?)
}

struct TextPrinter;

impl TextPrinter {
    /// A boolean-valued node, wrapped when it binds looser than `enclosing`.
    fn condition(&self, expr: &Expr, enclosing: u8, depth: usize) -> Result<String, SerializeError> {
        let depth = descend(depth)?;
        let body = match expr {
            Expr::Logical { op, children } => {
                if children.is_empty() {
                    return Err(SerializeError::NotExpressibleInText {
                        found: format!("{} without children", op.keyword()),
                        position: "a condition",
                    });
                }
                let parts = children
                    .iter()
                    .map(|child| self.condition(child, op.precedence(), depth))
                    .collect::<Result<Vec<_>, _>>()?;
                parts.join(&format!(" {} ", op.keyword()))
            }
            Expr::Not(inner) => format!("NOT {}", self.condition(inner, PRECEDENCE_NOT, depth)?),
            Expr::Comparison { op, left, right } => format!(
                "{} {} {}",
                self.operand(left)?,
                op.symbol(),
                self.operand(right)?
            ),
            Expr::Between {
                value,
                lower,
                upper,
            } => format!(
                "{} BETWEEN {} AND {}",
                self.subject(value)?,
                self.operand(lower)?,
                self.operand(upper)?
            ),
            Expr::Like { value, pattern } => match pattern.as_ref() {
                Expr::Literal(Literal::String(p)) => {
                    format!("{} LIKE {}", self.subject(value)?, quote(p))
                }
                other => {
                    return Err(SerializeError::NotExpressibleInText {
                        found: other.op_name().to_string(),
                        position: "a LIKE pattern",
                    });
                }
            },
            Expr::In { value, candidates } => {
                let items = candidates
                    .iter()
                    .map(|c| self.operand(c))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("{} IN ({})", self.subject(value)?, items.join(", "))
            }
            Expr::IsNull(value) => format!("{} IS NULL", self.subject(value)?),
            Expr::Spatial { op, left, right } => format!(
                "{} {} ({})",
                self.subject(left)?,
                op.keyword(),
                self.operand(right)?
            ),
            Expr::Temporal { op, left, right } => format!(
                "{} {} {}",
                self.subject(left)?,
                op.keyword(),
                self.operand(right)?
            ),
            Expr::Function { name, .. } => {
                return Err(SerializeError::UnsupportedFunction { name: name.clone() });
            }
            Expr::Property(_) | Expr::Literal(_) => {
                return Err(SerializeError::NotExpressibleInText {
                    found: expr.op_name().to_string(),
                    position: "a condition",
                });
            }
        };

        if expr.precedence() < enclosing {
            Ok(format!("({})", body))
        } else {
            Ok(body)
        }
    }

    /// The tested property of BETWEEN, LIKE, IN, IS NULL and the
    /// spatial/temporal operators.
    fn subject(&self, expr: &Expr) -> Result<String, SerializeError> {
        match expr {
            Expr::Property(name) => property(name),
            Expr::Function { name, .. } => {
                Err(SerializeError::UnsupportedFunction { name: name.clone() })
            }
            other => Err(SerializeError::NotExpressibleInText {
                found: other.op_name().to_string(),
                position: "a predicate subject",
            }),
        }
    }

    fn operand(&self, expr: &Expr) -> Result<String, SerializeError> {
        match expr {
            Expr::Property(name) => property(name),
            Expr::Literal(literal) => literal_text(literal),
            Expr::Function { name, .. } => {
                Err(SerializeError::UnsupportedFunction { name: name.clone() })
            }
            other => Err(SerializeError::NotExpressibleInText {
                found: other.op_name().to_string(),
                position: "an operand",
            }),
        }
    }
}

fn property(name: &str) -> Result<String, SerializeError> {
    if is_identifier(name) {
        Ok(name.to_string())
    } else {
        Err(SerializeError::InvalidPropertyName {
            name: name.to_string(),
        })
    }
}

fn literal_text(literal: &Literal) -> Result<String, SerializeError> {
    let text = match literal {
        Literal::String(s) => quote(s),
        Literal::Number(n) => {
            if !n.is_finite() {
                return Err(SerializeError::NonFiniteNumber(*n));
            }
            format_number(*n)
        }
        Literal::Boolean(true) => "TRUE".to_string(),
        Literal::Boolean(false) => "FALSE".to_string(),
        Literal::Null => "NULL".to_string(),
        Literal::Timestamp(ts) => format!("TIMESTAMP(\"{}\")", format_timestamp(ts)),
        Literal::Date(date) => format!("DATE(\"{}\")", format_date(date)),
        Literal::Interval(interval) => format!(
            "[{} / {}]",
            quote(&format_bound(&interval.start)),
            quote(&format_bound(&interval.end))
        ),
        Literal::Geometry(geometry) => {
            geometry.validate()?;
            geometry.to_wkt()
        }
    };
    Ok(text)
}

/// Double-quotes a string, escaping what the lexer unescapes.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
