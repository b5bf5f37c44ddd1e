use thiserror::Error;

use crate::{
    json::SemanticError, lexer::LexError, output::SerializeError, parser::ParseError,
    transform::PolicyError, translate::TranslateError,
};

/// Any failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

pub type Result<T> = std::result::Result<T, Error>;
