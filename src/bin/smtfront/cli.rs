//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for
//! `smtfront`.
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Struct containing the CLI configuration for `smtfront`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The path to the SMT-LIB v2 script to run.
    #[arg(index = 1)]
    pub file: PathBuf,

    /// Specify the log level of the parser.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of `smtfront`.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// Also logs warnings, such as a `set-logic` upgrade.
    #[value(alias("1"))]
    Warn,

    /// Also logs which commands are being run.
    #[value(alias("2"))]
    Info,

    /// Logs everything which happens internally in the parser.
    #[value(alias("3"))]
    Debug,

    /// Logs extra information, down to individual token reads.
    #[value(alias("4"))]
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
