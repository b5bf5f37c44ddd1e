//! Serialization of expression trees back to the two CQL2 surface syntaxes.
//!
//! - **CQL2-Text** via [`to_text()`]: minimal parenthesization driven by
//!   operator precedence, upper-case keywords, `TRUE`/`FALSE` booleans.
//! - **CQL2-JSON** via [`to_json()`], [`to_json_string()`] and
//!   [`to_json_pretty()`]: the canonical `{"op", "args"}` tree. Output is
//!   deterministic because object keys are kept sorted.
//!
//! Both serializers are the left inverse of the matching parser: parsing
//! the output yields a tree equal to the input.
//!
//! # Examples
//!
//! ```
//! use cql2_lang::{parse_text, to_json_string, to_text};
//!
//! let expr = parse_text("temp > 30 AND (humidity < 50 OR NOT status = \"active\")").unwrap();
//!
//! assert_eq!(
//!     to_text(&expr).unwrap(),
//!     "temp > 30 AND (humidity < 50 OR NOT status = \"active\")"
//! );
//! assert!(to_json_string(&expr).unwrap().starts_with("{\"args\":["));
//! ```

pub mod json;
pub mod text;

use thiserror::Error;

use crate::{
    ast::{Expr, MAX_DEPTH},
    geometry::GeometryError,
};

pub use json::{to_json, to_json_opt, to_json_pretty, to_json_string};
pub use text::{to_text, to_text_opt};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializeError {
    #[error("No expression to serialize")]
    Empty,

    #[error("Function '{name}' has no CQL2-Text form")]
    UnsupportedFunction { name: String },

    #[error("Number {0} is not finite")]
    NonFiniteNumber(f64),

    #[error("Property name '{name}' cannot be written as a CQL2-Text identifier")]
    InvalidPropertyName { name: String },

    #[error("A {found} cannot appear as {position} in CQL2-Text")]
    NotExpressibleInText {
        found: String,
        position: &'static str,
    },

    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Expression tree deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Steps one node down a tree walk, failing below [`MAX_DEPTH`].
pub(crate) fn descend(depth: usize) -> Result<usize, SerializeError> {
    if depth >= MAX_DEPTH {
        return Err(SerializeError::NestingTooDeep { limit: MAX_DEPTH });
    }
    Ok(depth + 1)
}

/// Turns an optional tree into the tree or [`SerializeError::Empty`].
pub(crate) fn require(expr: Option<&Expr>) -> Result<&Expr, SerializeError> {
    expr.ok_or(SerializeError::Empty)
}
