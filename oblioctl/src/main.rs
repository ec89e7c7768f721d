//! Oblio CLI
//!
//! Command-line interface for the Oblio invoicing API.

use anyhow::Result;
use clap::Parser;
use oblioctl::cli::{
    generate_completion, handle_config, handle_doc_create, handle_nomenclature, handle_token,
    print_template, Cli, Commands, DocCommands, OutputFormat,
};
use oblioctl::client::OblioClient;
use oblioctl::config::{CliConfig, ConfigBuilder};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Pick up OBLIO_* variables from a local .env file, if any
    let dotenv = dotenvy::dotenv();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            if cli.verbose {
                eprintln!("Error details: {:?}", e);
            }
            std::process::exit(1);
        }
    };

    init_tracing(config.verbose);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env file"),
    }
    tracing::debug!(?config, "configuration resolved");

    let output_format = match config.output_format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let result = match cli.command {
        Commands::Config { command } => handle_config(command, &config, &output_format).await,
        Commands::Completion { shell } => {
            generate_completion(shell);
            Ok(())
        }
        Commands::Doc {
            command: DocCommands::Template,
        } => print_template(&config),
        Commands::Doc {
            command: DocCommands::Create { kind, file },
        } => handle_doc_create(&connect(&config), kind, &file, &config, &output_format).await,
        Commands::Token => handle_token(&connect(&config), &output_format).await,
        Commands::Nomenclature {
            kind,
            filters,
            no_cif,
        } => {
            handle_nomenclature(&connect(&config), kind, filters, no_cif, &config, &output_format)
                .await
        }
    };

    exit_on_error(result, &config)
}

/// Build the API client, exiting when credentials are missing
fn connect(config: &CliConfig) -> OblioClient {
    if !config.has_credentials() {
        eprintln!("Error: API credentials are not configured");
        eprintln!("Set OBLIO_CLIENT_ID and OBLIO_CLIENT_SECRET, or add them to the config file.");
        std::process::exit(1);
    }

    match OblioClient::with_config(
        &config.base_url,
        config.client_id.clone(),
        config.client_secret.clone(),
        config.timeout,
    ) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: Cannot create Oblio client: {}", e);
            std::process::exit(1);
        }
    }
}

/// Build configuration using priority chain: CLI args → env → file → defaults
fn build_config(cli: &Cli) -> Result<CliConfig> {
    let mut builder = ConfigBuilder::new();

    if let Some(ref base_url) = cli.base_url {
        builder = builder.with_base_url(base_url)?;
    }
    if let Some(ref format) = cli.format {
        let format_str = match format {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        };
        builder = builder.with_output_format(format_str)?;
    }
    if let Some(ref cif) = cli.cif {
        builder = builder.with_cif(cif);
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.with_timeout(timeout)?;
    }
    if cli.verbose {
        builder = builder.with_verbose(true);
    }

    builder
        .with_env_overrides()
        .with_config_file(!cli.no_config, cli.config.as_deref())?
        .build()
}

fn exit_on_error(result: Result<()>, config: &CliConfig) -> Result<()> {
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        if config.verbose {
            eprintln!("Error details: {:?}", e);
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
