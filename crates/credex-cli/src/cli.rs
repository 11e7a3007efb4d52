//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use credex_domain::{Language, OutputContract};
use std::path::PathBuf;

/// credex - Extract account information from unstructured documents.
#[derive(Debug, Parser)]
#[command(name = "credex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Definitions directory
    #[arg(short, long, global = true, env = "CREDEX_DEFINITIONS")]
    pub definitions: Option<PathBuf>,

    /// Prompt language
    #[arg(short, long, value_enum, global = true)]
    pub lang: Option<LangArg>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// Prompt language options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LangArg {
    /// Japanese
    Ja,
    /// English
    En,
}

/// Extraction reply format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ContractArg {
    /// Provider-native structured output
    Structured,
    /// JSON object in free text
    Json,
    /// YAML mapping in free text
    Yaml,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the category router only
    Classify(ClassifyArgs),

    /// Extract an account record from a document
    Extract(ExtractArgs),

    /// Benchmark extraction against fixtures with expected answers
    Bench(BenchArgs),

    /// Inspect the definition resources
    Definitions(DefinitionsArgs),
}

/// Arguments for the classify command.
#[derive(Debug, Parser)]
pub struct ClassifyArgs {
    /// Document file, or `-` for stdin
    pub input: String,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document file, or `-` for stdin
    pub input: String,

    /// Skip routing and use this sub-category (e.g. workServer)
    #[arg(long)]
    pub category: Option<String>,

    /// Reply format for the extraction call
    #[arg(long, value_enum)]
    pub contract: Option<ContractArg>,
}

/// Arguments for the bench command.
#[derive(Debug, Parser)]
pub struct BenchArgs {
    /// Fixture directory holding expected_answers.json and the documents
    #[arg(long)]
    pub fixtures: PathBuf,

    /// Runs per fixture
    #[arg(short, long, default_value = "5")]
    pub iterations: usize,

    /// Runs in flight at once
    #[arg(long, default_value = "1")]
    pub concurrency: usize,

    /// Only run fixtures of this scenario
    #[arg(long)]
    pub scenario: Option<String>,

    /// Write the full JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for definition management.
#[derive(Debug, Parser)]
pub struct DefinitionsArgs {
    #[command(subcommand)]
    pub action: DefinitionsAction,
}

/// Definition actions.
#[derive(Debug, Subcommand)]
pub enum DefinitionsAction {
    /// Load every definition and check cross-references
    Validate,

    /// List main and sub-categories
    List,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<LangArg> for Language {
    fn from(lang: LangArg) -> Self {
        match lang {
            LangArg::Ja => Language::Ja,
            LangArg::En => Language::En,
        }
    }
}

impl From<ContractArg> for OutputContract {
    fn from(contract: ContractArg) -> Self {
        match contract {
            ContractArg::Structured => OutputContract::Structured,
            ContractArg::Json => OutputContract::Json,
            ContractArg::Yaml => OutputContract::Yaml,
        }
    }
}
