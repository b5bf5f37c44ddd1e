use crate::ast::operators::{
    ComparisonOp, LogicalOp, PRECEDENCE_ATOM, PRECEDENCE_NOT, SpatialOp, TemporalOp,
};
use crate::value::Literal;

/// Deepest NOT / parenthesis / nested-operation level either parser accepts.
pub const MAX_NESTING: usize = 256;

/// Deepest tree the serializers and the translator walk. Each accepted
/// nesting level adds at most one node, and the few levels on top cover the
/// root group, the predicate and its operands.
pub const MAX_DEPTH: usize = MAX_NESTING + 16;

/// Abstract Syntax Tree node representing a CQL2 filter expression.
///
/// Every node exclusively owns its children. Both parsers and the builder
/// produce this type; both serializers and the translator read it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a field of the record being filtered
    ///
    /// # Example
    /// ```text
    /// eo:cloud_cover
    /// ```
    Property(String),

    /// Typed literal value
    Literal(Literal),

    /// Binary comparison
    ///
    /// # Example
    /// ```text
    /// temperature > 30.5
    /// ```
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// N-ary boolean connective.
    ///
    /// Always built through [`Expr::and`], [`Expr::or`] or [`Expr::logical`],
    /// which keep the tree flat: a child never has the same operator as its
    /// parent and a single child is never wrapped.
    Logical { op: LogicalOp, children: Vec<Expr> },

    /// Negation
    Not(Box<Expr>),

    /// Range test
    ///
    /// # Example
    /// ```text
    /// depth BETWEEN 100 AND 150
    /// ```
    Between {
        value: Box<Expr>,
        lower: Box<Expr>,
        upper: Box<Expr>,
    },

    /// Pattern match with `%` and `_` wildcards
    Like { value: Box<Expr>, pattern: Box<Expr> },

    /// Set membership; the candidate list may be empty
    In {
        value: Box<Expr>,
        candidates: Vec<Expr>,
    },

    /// Null test
    IsNull(Box<Expr>),

    /// Spatial relationship, normally a property against a geometry literal
    ///
    /// # Example
    /// ```text
    /// geometry S_INTERSECTS (POINT(7.02 49.92))
    /// ```
    Spatial {
        op: SpatialOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Temporal relationship against an instant or an interval
    ///
    /// # Example
    /// ```text
    /// datetime T_DURING ["2020-01-01" / ".."]
    /// ```
    Temporal {
        op: TemporalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Extension function outside the fixed operator set
    Function { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn property(name: impl Into<String>) -> Self {
        Expr::Property(name.into())
    }

    pub fn literal(value: impl Into<Literal>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn comparison(op: ComparisonOp, left: Expr, right: Expr) -> Self {
        Expr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Joins two expressions under `op`, splicing in the children of either
    /// side that already uses the same operator.
    pub fn combine(op: LogicalOp, left: Expr, right: Expr) -> Self {
        let mut children = Vec::new();
        for side in [left, right] {
            match side {
                Expr::Logical {
                    op: inner,
                    children: nested,
                } if inner == op => children.extend(nested),
                other => children.push(other),
            }
        }
        Expr::Logical { op, children }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::combine(LogicalOp::And, left, right)
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::combine(LogicalOp::Or, left, right)
    }

    /// Folds any number of children under `op`.
    ///
    /// Returns `None` for an empty list and the child itself for a single one.
    pub fn logical(op: LogicalOp, children: impl IntoIterator<Item = Expr>) -> Option<Self> {
        let mut iter = children.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |acc, next| Self::combine(op, acc, next)))
    }

    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn between(value: Expr, lower: Expr, upper: Expr) -> Self {
        Expr::Between {
            value: Box::new(value),
            lower: Box::new(lower),
            upper: Box::new(upper),
        }
    }

    pub fn like(value: Expr, pattern: Expr) -> Self {
        Expr::Like {
            value: Box::new(value),
            pattern: Box::new(pattern),
        }
    }

    pub fn in_list(value: Expr, candidates: Vec<Expr>) -> Self {
        Expr::In {
            value: Box::new(value),
            candidates,
        }
    }

    pub fn is_null(value: Expr) -> Self {
        Expr::IsNull(Box::new(value))
    }

    pub fn spatial(op: SpatialOp, left: Expr, right: Expr) -> Self {
        Expr::Spatial {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn temporal(op: TemporalOp, left: Expr, right: Expr) -> Self {
        Expr::Temporal {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    /// True for leaf-level tests: comparison, between, like, in, is-null,
    /// spatial and temporal predicates.
    pub fn is_terminal_predicate(&self) -> bool {
        matches!(
            self,
            Expr::Comparison { .. }
                | Expr::Between { .. }
                | Expr::Like { .. }
                | Expr::In { .. }
                | Expr::IsNull(_)
                | Expr::Spatial { .. }
                | Expr::Temporal { .. }
        )
    }

    /// The property a terminal predicate tests, if its first operand is one.
    pub fn subject_property(&self) -> Option<&str> {
        let subject = match self {
            Expr::Comparison { left, .. }
            | Expr::Spatial { left, .. }
            | Expr::Temporal { left, .. } => left,
            Expr::Between { value, .. }
            | Expr::Like { value, .. }
            | Expr::In { value, .. }
            | Expr::IsNull(value) => value,
            _ => return None,
        };
        match subject.as_ref() {
            Expr::Property(name) => Some(name),
            _ => None,
        }
    }

    /// Operator name as used in CQL2-JSON (`"and"`, `"="`, `"s_intersects"`),
    /// the function name for extensions, or the leaf kind (`"property"`,
    /// `"string"`, `"geometry"`, ...).
    pub fn op_name(&self) -> &str {
        match self {
            Expr::Property(_) => "property",
            Expr::Literal(literal) => literal.kind(),
            Expr::Comparison { op, .. } => op.symbol(),
            Expr::Logical { op, .. } => op.json_name(),
            Expr::Not(_) => "not",
            Expr::Between { .. } => "between",
            Expr::Like { .. } => "like",
            Expr::In { .. } => "in",
            Expr::IsNull(_) => "isNull",
            Expr::Spatial { op, .. } => op.json_name(),
            Expr::Temporal { op, .. } => op.json_name(),
            Expr::Function { name, .. } => name,
        }
    }

    /// Text binding strength; see [`crate::ast::operators`].
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Logical { op, .. } => op.precedence(),
            Expr::Not(_) => PRECEDENCE_NOT,
            _ => PRECEDENCE_ATOM,
        }
    }
}
