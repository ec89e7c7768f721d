//! Command execution handlers

use anyhow::{Context, Result};
use chrono::Local;
use oblio_core::credential::mask;
use oblio_core::{Client, Document, DocumentKind, NomenclatureKind, Product};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::client::OblioClient;
use crate::config::CliConfig;
use crate::format::{format_credential, format_response, format_success, format_warning};

use super::commands::*;

/// Handle token command
pub async fn handle_token(client: &OblioClient, format: &OutputFormat) -> Result<()> {
    let credential = client
        .access_token()
        .await
        .context("Failed to obtain access token")?;

    let now = Local::now().timestamp().max(0) as u64;
    println!("{}", format_credential(&credential, now, &format.into())?);

    Ok(())
}

/// Handle `doc create`
pub async fn handle_doc_create(
    client: &OblioClient,
    kind: DocumentArg,
    file: &Path,
    config: &CliConfig,
    format: &OutputFormat,
) -> Result<()> {
    let kind = DocumentKind::from(kind);
    let document = read_document(file, &config.cif)?;

    let response = client
        .create_document(kind.as_str(), &document)
        .await
        .with_context(|| format!("Failed to create {}", kind))?;

    if let OutputFormat::Table = format {
        println!("{}", format_success(&format!("Created {}", kind)));
    }
    println!("{}", format_response(&response, &format.into())?);

    Ok(())
}

/// Print the sample invoice; needs no credentials
pub fn print_template(config: &CliConfig) -> Result<()> {
    let document = sample_invoice(&config.cif);
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Handle nomenclature command
pub async fn handle_nomenclature(
    client: &OblioClient,
    kind: NomenclatureArg,
    filters: Vec<(String, String)>,
    no_cif: bool,
    config: &CliConfig,
    format: &OutputFormat,
) -> Result<()> {
    let kind = NomenclatureKind::from(kind);
    let cif = if no_cif { "" } else { config.cif.as_str() };
    let filters = build_filters(filters, cif);

    if kind.requires_cif() && !filters.contains_key("cif") {
        eprintln!(
            "{}",
            format_warning(&format!(
                "'{}' is usually filtered by cif; set OBLIO_CIF or pass --filter cif=...",
                kind
            ))
        );
    }

    let response = client
        .list_nomenclature(kind.as_str(), &filters)
        .await
        .with_context(|| format!("Failed to list {}", kind))?;

    println!("{}", format_response(&response, &format.into())?);

    Ok(())
}

/// Handle config commands
pub async fn handle_config(
    command: ConfigCommands,
    current_config: &CliConfig,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => match format {
            OutputFormat::Json => {
                let masked = CliConfig {
                    client_secret: mask(&current_config.client_secret),
                    ..current_config.clone()
                };
                println!("{}", serde_json::to_string_pretty(&masked)?);
            }
            OutputFormat::Table => {
                println!("CLI Configuration:");
                println!("{:<20} Value", "Setting");
                println!("{}", "-".repeat(40));
                println!("{:<20} {}", "Base URL", current_config.base_url);
                println!("{:<20} {}", "Client ID", current_config.client_id);
                println!(
                    "{:<20} {}",
                    "Client Secret",
                    mask(&current_config.client_secret)
                );
                println!("{:<20} {}", "CIF", current_config.cif);
                println!("{:<20} {}", "Output Format", current_config.output_format);
                println!("{:<20} {}", "Verbose", current_config.verbose);
                println!("{:<20} {}s", "Timeout", current_config.timeout);
            }
        },
        ConfigCommands::Path => {
            let path = CliConfig::config_path()?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

/// Merge command-line filters with the configured company CIF
///
/// An explicit `cif` filter wins over the configured one.
pub fn build_filters(filters: Vec<(String, String)>, cif: &str) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = filters.into_iter().collect();
    if !cif.is_empty() {
        map.entry("cif".to_string())
            .or_insert_with(|| cif.to_string());
    }
    map
}

/// Read a document from a JSON file, or stdin for `-`
///
/// A missing `cif` is filled from the configuration.
pub fn read_document(path: &Path, default_cif: &str) -> Result<Document> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read document from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document file {}", path.display()))?
    };

    parse_document(&content, default_cif)
        .with_context(|| format!("Failed to parse document {}", path.display()))
}

fn parse_document(content: &str, default_cif: &str) -> Result<Document> {
    let mut document: Document = serde_json::from_str(content)?;
    if document.cif.is_empty() {
        document.cif = default_cif.to_string();
    }
    Ok(document)
}

/// Sample invoice with one service line, dated today
pub fn sample_invoice(cif: &str) -> Document {
    let today = Local::now().date_naive();

    Document {
        cif: cif.to_string(),
        issue_date: Some(today),
        due_date: Some(today),
        series_name: "FCT".to_string(),
        client: Client {
            name: "Irina Fabiola".to_string(),
            address: "Progresul Bloc 32, Numarul 5".to_string(),
            state: "Brasov".to_string(),
            city: "Brasov".to_string(),
            country: "Romania".to_string(),
            contact: "Irina Fabiola".to_string(),
            save: true,
            ..Default::default()
        },
        products: vec![Product {
            name: "Hemograma cu formula leucocitara, Hb,Ht,indici si reticulocite (Hemograma)"
                .to_string(),
            price: 49.5,
            measuring_unit: "buc".to_string(),
            currency: "RON".to_string(),
            vat_percentage: 19.0,
            vat_included: true,
            quantity: 1.0,
            product_type: "Serviciu".to_string(),
            management: "CV".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    }
}
