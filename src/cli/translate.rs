//! Render a filter in a foreign dialect

use std::path::PathBuf;

use super::{CliError, Syntax, convert::parse_filter};
use crate::{Dialect, translate};

/// Options for the translate command
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// The filter to translate
    pub filter: String,
    /// Input syntax; detected from the filter when not set
    pub from: Option<Syntax>,
    /// JSON file holding the dialect's template table
    pub dialect: PathBuf,
}

/// Execute a translate operation
pub fn execute_translate(options: &TranslateOptions) -> Result<String, CliError> {
    let dialect = Dialect::from_path(&options.dialect)?;
    let expr = parse_filter(&options.filter, options.from)?;
    Ok(translate(&expr, &dialect)?)
}
