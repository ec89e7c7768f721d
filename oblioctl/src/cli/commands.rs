//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};
use oblio_core::{DocumentKind, NomenclatureKind};
use std::path::PathBuf;

/// Oblio invoicing CLI
#[derive(Parser, Debug)]
#[command(name = "oblioctl")]
#[command(version, about = "Oblio invoicing API CLI", long_about = None)]
pub struct Cli {
    /// API base URL (overrides config file)
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Output format (overrides config file)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Company fiscal code used for documents and filters (overrides config file)
    #[arg(long)]
    pub cif: Option<String>,

    /// Request timeout in seconds (overrides config file)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Don't load config file
    #[arg(long)]
    pub no_config: bool,

    /// Config file path (default: ~/.config/oblio/cli.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

impl From<&OutputFormat> for crate::format::OutputFormat {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Table => crate::format::OutputFormat::Table,
            OutputFormat::Json => crate::format::OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Obtain an access token and show its metadata
    Token,

    /// Document commands
    Doc {
        #[command(subcommand)]
        command: DocCommands,
    },

    /// List reference data (companies, clients, products, ...)
    Nomenclature {
        /// Collection to list
        #[arg(value_enum)]
        kind: NomenclatureArg,

        /// Filter as key=value (repeatable)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// Don't add the configured company CIF as a filter
        #[arg(long)]
        no_cif: bool,
    },

    /// Show CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// Issue a document from a JSON file
    Create {
        /// Document kind
        #[arg(value_enum)]
        kind: DocumentArg,

        /// Path to the document JSON ("-" reads stdin)
        #[arg(long)]
        file: PathBuf,
    },

    /// Print a sample invoice document as JSON
    Template,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show the config file path
    Path,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DocumentArg {
    Invoice,
    Proforma,
    Notice,
}

impl From<DocumentArg> for DocumentKind {
    fn from(arg: DocumentArg) -> Self {
        match arg {
            DocumentArg::Invoice => DocumentKind::Invoice,
            DocumentArg::Proforma => DocumentKind::Proforma,
            DocumentArg::Notice => DocumentKind::Notice,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum NomenclatureArg {
    Companies,
    #[value(name = "vat_rates")]
    VatRates,
    Clients,
    Products,
    Series,
    Languages,
    Management,
}

impl From<NomenclatureArg> for NomenclatureKind {
    fn from(arg: NomenclatureArg) -> Self {
        match arg {
            NomenclatureArg::Companies => NomenclatureKind::Companies,
            NomenclatureArg::VatRates => NomenclatureKind::VatRates,
            NomenclatureArg::Clients => NomenclatureKind::Clients,
            NomenclatureArg::Products => NomenclatureKind::Products,
            NomenclatureArg::Series => NomenclatureKind::Series,
            NomenclatureArg::Languages => NomenclatureKind::Languages,
            NomenclatureArg::Management => NomenclatureKind::Management,
        }
    }
}

/// Parse a `key=value` filter argument
pub fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid filter '{}'. Expected key=value", s))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid filter '{}'. Key cannot be empty", s));
    }

    Ok((key.to_string(), value.trim().to_string()))
}
