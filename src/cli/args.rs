//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Convert HTML documents to AMP HTML
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input HTML files. Reads stdin when omitted or `-`.
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::FilePath)]
    pub inputs: Vec<PathBuf>,

    /// Write a single result to this file instead of stdout
    #[arg(short, long, conflicts_with = "out_dir", value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Write each result to DIR/<input file name>
    #[arg(short = 'd', long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Config file path (default: ampify.toml, if present)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub pretty: Option<bool>,

    /// Spaces per nesting level when pretty-printing
    #[arg(long, value_name = "N")]
    pub indent: Option<usize>,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
