//! CLI support for cql2-lang
//!
//! Each subcommand of the `cql2` binary is a plain function here taking an
//! options struct, so the commands can be driven from tests or embedded in
//! other tools without going through argument parsing.

mod check;
mod convert;
mod docs;
mod flatten;
mod translate;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{ConvertOptions, Syntax, detect_syntax, execute_convert, parse_filter};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use flatten::{FlattenOptions, GroupBy, execute_flatten};
pub use translate::{TranslateOptions, execute_translate};

use std::io;

use crate::{ParseError, PolicyError, SemanticError, SerializeError, TranslateError};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// CQL2-Text syntax error
    Parse(ParseError),
    /// CQL2-JSON shape error
    Semantic(SemanticError),
    /// Output cannot be produced in the requested syntax
    Serialize(SerializeError),
    /// Filter is not a plain conjunction
    Policy(PolicyError),
    /// Dialect loading or rendering failed
    Translate(TranslateError),
    /// IO error
    Io(io::Error),
    /// No filter given and nothing piped to stdin
    NoInput,
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Syntax error: {}", e),
            CliError::Semantic(e) => write!(f, "Invalid CQL2-JSON: {}", e),
            CliError::Serialize(e) => write!(f, "Cannot serialize: {}", e),
            CliError::Policy(e) => write!(f, "Cannot flatten: {}", e),
            CliError::Translate(e) => write!(f, "Translation failed: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No filter provided. Pass it as an argument or pipe it to stdin.")
            }
            CliError::UnknownCategory(c) => {
                write!(f, "Unknown category: '{}'\nRun 'cql2 docs' to see available categories.", c)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Semantic(e) => Some(e),
            CliError::Serialize(e) => Some(e),
            CliError::Policy(e) => Some(e),
            CliError::Translate(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<SemanticError> for CliError {
    fn from(e: SemanticError) -> Self {
        CliError::Semantic(e)
    }
}

impl From<SerializeError> for CliError {
    fn from(e: SerializeError) -> Self {
        CliError::Serialize(e)
    }
}

impl From<PolicyError> for CliError {
    fn from(e: PolicyError) -> Self {
        CliError::Policy(e)
    }
}

impl From<TranslateError> for CliError {
    fn from(e: TranslateError) -> Self {
        CliError::Translate(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
