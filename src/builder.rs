//! Programmatic construction of filter expressions.
//!
//! [`FilterBuilder`] produces exactly the trees the parsers produce, so its
//! output serializes and round-trips like parsed input.
//!
//! # Examples
//!
//! ```
//! use cql2_lang::FilterBuilder;
//!
//! let text = FilterBuilder::new()
//!     .equal("type", "satellite")
//!     .less_than("cloud_cover", 20)
//!     .to_text()
//!     .unwrap();
//! assert_eq!(text, "type = \"satellite\" AND cloud_cover < 20");
//! ```

use serde_json::Value;

use crate::{
    ast::{ComparisonOp, Expr, SpatialOp, TemporalOp},
    geometry::Geometry,
    output::{self, SerializeError},
    value::{Interval, Literal},
};

/// Accumulates predicates; each terminal call is ANDed onto what is already
/// there, while [`or`](Self::or) and [`not`](Self::not) wrap it.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBuilder {
    expr: Option<Expr>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        FilterBuilder::default()
    }

    /// Adds any predicate (or sub-tree) to the conjunction.
    pub fn predicate(self, predicate: Expr) -> Self {
        let expr = match self.expr {
            Some(existing) => Expr::and(existing, predicate),
            None => predicate,
        };
        FilterBuilder { expr: Some(expr) }
    }

    fn compare(self, op: ComparisonOp, property: &str, value: impl Into<Literal>) -> Self {
        self.predicate(Expr::comparison(
            op,
            Expr::property(property),
            Expr::literal(value),
        ))
    }

    pub fn equal(self, property: &str, value: impl Into<Literal>) -> Self {
        self.compare(ComparisonOp::Equal, property, value)
    }

    pub fn not_equal(self, property: &str, value: impl Into<Literal>) -> Self {
        self.compare(ComparisonOp::NotEqual, property, value)
    }

    pub fn less_than(self, property: &str, value: impl Into<Literal>) -> Self {
        self.compare(ComparisonOp::LessThan, property, value)
    }

    pub fn less_than_or_equal(self, property: &str, value: impl Into<Literal>) -> Self {
        self.compare(ComparisonOp::LessEqual, property, value)
    }

    pub fn greater_than(self, property: &str, value: impl Into<Literal>) -> Self {
        self.compare(ComparisonOp::GreaterThan, property, value)
    }

    pub fn greater_than_or_equal(self, property: &str, value: impl Into<Literal>) -> Self {
        self.compare(ComparisonOp::GreaterEqual, property, value)
    }

    pub fn between(
        self,
        property: &str,
        lower: impl Into<Literal>,
        upper: impl Into<Literal>,
    ) -> Self {
        self.predicate(Expr::between(
            Expr::property(property),
            Expr::literal(lower),
            Expr::literal(upper),
        ))
    }

    /// `pattern` uses `%` and `_` wildcards.
    pub fn like(self, property: &str, pattern: &str) -> Self {
        self.predicate(Expr::like(Expr::property(property), Expr::literal(pattern)))
    }

    pub fn in_list<I, V>(self, property: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Literal>,
    {
        let candidates = values.into_iter().map(Expr::literal).collect();
        self.predicate(Expr::in_list(Expr::property(property), candidates))
    }

    pub fn is_null(self, property: &str) -> Self {
        self.predicate(Expr::is_null(Expr::property(property)))
    }

    pub fn is_not_null(self, property: &str) -> Self {
        self.predicate(Expr::not(Expr::is_null(Expr::property(property))))
    }

    pub fn spatial(self, op: SpatialOp, property: &str, geometry: Geometry) -> Self {
        self.predicate(Expr::spatial(
            op,
            Expr::property(property),
            Expr::literal(geometry),
        ))
    }

    pub fn intersects(self, property: &str, geometry: Geometry) -> Self {
        self.spatial(SpatialOp::Intersects, property, geometry)
    }

    pub fn temporal(self, op: TemporalOp, property: &str, value: impl Into<Literal>) -> Self {
        self.predicate(Expr::temporal(
            op,
            Expr::property(property),
            Expr::literal(value),
        ))
    }

    pub fn during(self, property: &str, interval: Interval) -> Self {
        self.temporal(TemporalOp::During, property, interval)
    }

    /// ANDs in everything another builder accumulated; an empty builder
    /// changes nothing.
    pub fn and(self, other: FilterBuilder) -> Self {
        match other.expr {
            Some(expr) => self.predicate(expr),
            None => self,
        }
    }

    /// `(accumulated) OR (other)`. With either side empty the other side is
    /// kept as is.
    pub fn or(self, other: FilterBuilder) -> Self {
        let expr = match (self.expr, other.expr) {
            (Some(left), Some(right)) => Some(Expr::or(left, right)),
            (left, right) => left.or(right),
        };
        FilterBuilder { expr }
    }

    /// Negates everything accumulated so far. No-op when empty.
    pub fn not(self) -> Self {
        FilterBuilder {
            expr: self.expr.map(Expr::not),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expr.is_none()
    }

    /// The finished tree, or `None` when no predicate was added.
    pub fn build(self) -> Option<Expr> {
        self.expr
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        self.expr.as_ref()
    }

    pub fn to_text(&self) -> Result<String, SerializeError> {
        output::to_text_opt(self.as_expr())
    }

    pub fn to_json(&self) -> Result<Value, SerializeError> {
        output::to_json_opt(self.as_expr())
    }
}
