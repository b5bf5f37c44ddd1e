//! CQL2 filter expressions: parsing, serialization and translation.
//!
//! Both surface syntaxes, CQL2-Text and CQL2-JSON, parse into the same
//! [`Expr`] tree and serialize back from it:
//!
//! ```
//! use cql2_lang::{parse_json_str, parse_text, to_json_string, to_text};
//!
//! let expr = parse_text("eo:cloud_cover < 20 AND platform IN (\"sentinel-2a\", \"sentinel-2b\")")?;
//! let json = to_json_string(&expr)?;
//! assert_eq!(parse_json_str(&json)?, expr);
//! assert_eq!(to_text(&expr)?, "eo:cloud_cover < 20 AND platform IN (\"sentinel-2a\", \"sentinel-2b\")");
//! # Ok::<(), cql2_lang::Error>(())
//! ```
//!
//! Trees can also be assembled with [`FilterBuilder`], flattened into their
//! terminal predicates with [`transform::flatten_conjunction`], and rendered
//! in another query language with [`translate::translate`].

pub mod ast;
pub mod builder;
pub mod cli;
pub mod error;
pub mod geometry;
pub mod json;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod transform;
pub mod translate;
pub mod value;

pub use ast::{ComparisonOp, Expr, LogicalOp, SpatialOp, TemporalOp, Token};
pub use builder::FilterBuilder;
pub use error::{Error, Result};
pub use geometry::{Geometry, GeometryError};
pub use json::{SemanticError, parse_json, parse_json_str};
pub use lexer::{LexError, Lexer, Position};
pub use output::{
    SerializeError, to_json, to_json_opt, to_json_pretty, to_json_string, to_text, to_text_opt,
};
pub use parser::{ParseError, Parser, parse_text};
pub use transform::{PolicyError, flatten_conjunction, group_by_operator, group_by_property};
pub use translate::{Dialect, TranslateError, translate};
pub use value::{Instant, Interval, Literal, TypeHint};
