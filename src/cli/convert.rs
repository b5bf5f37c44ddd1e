//! Syntax detection and CQL2-Text <-> CQL2-JSON conversion

use super::CliError;
use crate::{Expr, parse_json_str, parse_text, to_json_pretty, to_json_string, to_text};

/// The two CQL2 surface syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Text,
    Json,
}

impl Syntax {
    pub fn name(self) -> &'static str {
        match self {
            Syntax::Text => "cql2-text",
            Syntax::Json => "cql2-json",
        }
    }
}

/// Options for the convert command
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// The filter to convert
    pub filter: String,
    /// Input syntax; detected from the filter when not set
    pub from: Option<Syntax>,
    /// Output syntax
    pub to: Syntax,
    /// Pretty-print JSON output
    pub pretty: bool,
}

/// A filter starting with `{` is CQL2-JSON, anything else CQL2-Text.
pub fn detect_syntax(filter: &str) -> Syntax {
    if filter.trim_start().starts_with('{') {
        Syntax::Json
    } else {
        Syntax::Text
    }
}

/// Parses `filter` in the given syntax, or the detected one.
pub fn parse_filter(filter: &str, from: Option<Syntax>) -> Result<Expr, CliError> {
    match from.unwrap_or_else(|| detect_syntax(filter)) {
        Syntax::Text => Ok(parse_text(filter)?),
        Syntax::Json => Ok(parse_json_str(filter)?),
    }
}

/// Execute a convert operation
pub fn execute_convert(options: &ConvertOptions) -> Result<String, CliError> {
    let expr = parse_filter(&options.filter, options.from)?;
    let output = match options.to {
        Syntax::Text => to_text(&expr)?,
        Syntax::Json if options.pretty => to_json_pretty(&expr)?,
        Syntax::Json => to_json_string(&expr)?,
    };
    Ok(output)
}
