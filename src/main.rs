use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use cql2_lang::cli::{
    self, CheckOptions, CliError, ConvertOptions, FlattenOptions, GroupBy, Syntax,
    TranslateOptions,
};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(ClapParser)]
#[command(name = "cql2")]
#[command(about = "cql2 - Parse, convert, and translate CQL2 filter expressions")]
#[command(version)]
struct Cli {
    /// Log filter (e.g. "debug", "cql2_lang=trace"); falls back to CQL2_LOG
    #[arg(long, global = true, env = "CQL2_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for Syntax {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => Syntax::Text,
            Format::Json => Syntax::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Grouping {
    Property,
    Operator,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a CQL2 filter
    Check {
        /// The filter (reads from stdin if not provided)
        filter: Option<String>,

        /// Input syntax (detected when omitted)
        #[arg(long, value_enum)]
        from: Option<Format>,

        /// Report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a filter between CQL2-Text and CQL2-JSON
    Convert {
        /// The filter (reads from stdin if not provided)
        filter: Option<String>,

        /// Output syntax
        #[arg(long, value_enum)]
        to: Format,

        /// Input syntax (detected when omitted)
        #[arg(long, value_enum)]
        from: Option<Format>,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List the predicates of an AND-only filter
    Flatten {
        /// The filter (reads from stdin if not provided)
        filter: Option<String>,

        /// Input syntax (detected when omitted)
        #[arg(long, value_enum)]
        from: Option<Format>,

        /// Group predicates by property or operator
        #[arg(long, value_enum)]
        group_by: Option<Grouping>,
    },

    /// Render a filter in another query language
    Translate {
        /// The filter (reads from stdin if not provided)
        filter: Option<String>,

        /// Dialect definition (JSON)
        #[arg(short, long)]
        dialect: PathBuf,

        /// Input syntax (detected when omitted)
        #[arg(long, value_enum)]
        from: Option<Format>,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'cql2 docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Check { filter, from, json } => run_check(filter, from, json),
        Commands::Convert {
            filter,
            to,
            from,
            pretty,
        } => read_filter(filter).and_then(|filter| {
            let output = cli::execute_convert(&ConvertOptions {
                filter,
                from: from.map(Syntax::from),
                to: to.into(),
                pretty,
            })?;
            println!("{}", output);
            Ok(())
        }),
        Commands::Flatten {
            filter,
            from,
            group_by,
        } => read_filter(filter).and_then(|filter| {
            let output = cli::execute_flatten(&FlattenOptions {
                filter,
                from: from.map(Syntax::from),
                group_by: group_by.map(|g| match g {
                    Grouping::Property => GroupBy::Property,
                    Grouping::Operator => GroupBy::Operator,
                }),
            })?;
            println!("{}", output);
            Ok(())
        }),
        Commands::Translate {
            filter,
            dialect,
            from,
        } => read_filter(filter).and_then(|filter| {
            let output = cli::execute_translate(&TranslateOptions {
                filter,
                from: from.map(Syntax::from),
                dialect,
            })?;
            println!("{}", output);
            Ok(())
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// The filter argument, or stdin when it is piped in.
fn read_filter(filter: Option<String>) -> Result<String, CliError> {
    match filter {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            let trimmed = buffer.trim();
            if trimmed.is_empty() {
                Err(CliError::NoInput)
            } else {
                Ok(trimmed.to_string())
            }
        }
        None => Err(CliError::NoInput),
    }
}

fn run_check(filter: Option<String>, from: Option<Format>, json: bool) -> Result<(), CliError> {
    let options = CheckOptions {
        filter: read_filter(filter)?,
        from: from.map(Syntax::from),
    };

    let result = cli::execute_check(&options)?;
    if json {
        println!("{}", result.to_json());
    } else {
        println!("{}", result);
    }
    Ok(())
}
