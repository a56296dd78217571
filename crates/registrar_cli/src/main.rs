//! `registrar` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments and run one store operation per invocation.
//! - Turn every failure into a one-line notice and a per-class exit code.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;
use registrar_core::{ConfigError, DocumentError, StoreError};

const EXIT_FAILURE: i32 = 1;
const EXIT_VALIDATION: i32 = 3;
const EXIT_NOT_FOUND: i32 = 4;
const EXIT_CONSTRAINT: i32 = 5;
const EXIT_FILE_NOT_FOUND: i32 = 6;
const EXIT_CONFIG: i32 = 7;

fn main() {
    let cli = Cli::parse();

    match commands::run(cli) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(exit_code(&err));
        }
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(store_error) = cause.downcast_ref::<StoreError>() {
            return match store_error {
                StoreError::Validation(_) => EXIT_VALIDATION,
                StoreError::NotFound { .. } => EXIT_NOT_FOUND,
                StoreError::Constraint(_) => EXIT_CONSTRAINT,
                StoreError::Document(DocumentError::FileNotFound(_)) => EXIT_FILE_NOT_FOUND,
                _ => EXIT_FAILURE,
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return EXIT_CONFIG;
        }
    }
    EXIT_FAILURE
}
