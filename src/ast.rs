//! # CQL2 - Abstract Syntax Tree
//!
//! This module defines the single expression tree shared by every part of the
//! crate: the CQL2-Text and CQL2-JSON parsers produce it, the two serializers
//! and the dialect translator consume it, and the fluent builder assembles it
//! without going through text.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the text lexer
//! - **[expressions]** - The [`Expr`] tree and its smart constructors
//! - **[operators]** - Comparison, logical, spatial and temporal operators
//!   with their text keywords, JSON names and precedence
//!
//! ## Quick Start
//!
//! ```text
//! temp > 30 AND (humidity < 50 OR NOT status = "active")
//! ```
//!
//! parses to
//!
//! ```text
//! Logical(AND, [
//!     Comparison(>, Property(temp), Literal(30)),
//!     Logical(OR, [
//!         Comparison(<, Property(humidity), Literal(50)),
//!         Not(Comparison(=, Property(status), Literal("active"))),
//!     ]),
//! ])
//! ```
//!
//! ## Precedence
//!
//! `NOT` binds tighter than `AND`, which binds tighter than `OR`. Both
//! connectives are left-associative, and chains of the same connective are
//! stored as one n-ary node.
//!
//! ## Literals
//!
//! Literal values form a closed set (see [`crate::value::Literal`]): strings,
//! numbers, booleans, null, timestamps, dates, intervals and geometries.
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Expr, MAX_DEPTH, MAX_NESTING};
pub use operators::{ComparisonOp, LogicalOp, SpatialOp, TemporalOp};
pub use tokens::Token;
