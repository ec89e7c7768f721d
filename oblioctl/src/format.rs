//! Output formatting utilities for the CLI
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use colored::*;
use oblio_core::{Credential, ServiceResponse};
use serde_json::Value;
use std::collections::BTreeSet;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Render a scalar JSON value for a table cell
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Format rows of objects as a table with one column per key
///
/// Columns are the union of keys across rows, in sorted order.
fn format_rows(rows: &[Value]) -> String {
    let columns: BTreeSet<&str> = rows
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|object| object.keys().map(String::as_str))
        .collect();

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|column| column.to_string()));
    for row in rows {
        builder.push_record(
            columns
                .iter()
                .map(|column| row.get(*column).map(cell).unwrap_or_default()),
        );
    }

    builder.build().with(Style::rounded()).to_string()
}

/// Format an object as a two-column key/value table
fn format_object(object: &serde_json::Map<String, Value>) -> String {
    #[derive(Tabled)]
    struct FieldRow {
        #[tabled(rename = "Field")]
        field: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows: Vec<FieldRow> = object
        .iter()
        .map(|(field, value)| FieldRow {
            field: field.clone(),
            value: cell(value),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format a service response envelope
pub fn format_response(response: &ServiceResponse, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
        OutputFormat::Table => {
            let status = if (200..300).contains(&response.status) {
                response.status.to_string().green()
            } else {
                response.status.to_string().red()
            };

            let mut output = format!(
                "{} {} {}",
                "Status:".bold(),
                status,
                response.status_message.cyan()
            );

            let body = match &response.data {
                Value::Null => None,
                Value::Array(rows) if rows.is_empty() => Some("No records".dimmed().to_string()),
                Value::Array(rows) => Some(format_rows(rows)),
                Value::Object(object) => Some(format_object(object)),
                other => Some(cell(other)),
            };

            if let Some(body) = body {
                output.push('\n');
                output.push_str(&body);
            }

            Ok(output)
        }
    }
}

/// Format credential metadata; the token itself is masked
pub fn format_credential(credential: &Credential, now: u64, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "access_token": credential.masked_token(),
            "token_type": credential.token_type,
            "scope": credential.scope,
            "expires_in": credential.expires_in,
            "request_time": credential.request_time,
            "expires_at": credential.expires_at(),
            "remaining_secs": credential.remaining_secs(now),
        }))?),
        OutputFormat::Table => {
            let mut output = String::new();
            output.push_str(&"Access Token".bold().to_string());
            output.push('\n');
            output.push_str(&format!("Token: {}", credential.masked_token().cyan()));
            output.push('\n');
            output.push_str(&format!("Type: {}", credential.token_type));
            if !credential.scope.is_empty() {
                output.push('\n');
                output.push_str(&format!("Scope: {}", credential.scope));
            }
            output.push('\n');
            output.push_str(&format!(
                "Expires in: {} seconds",
                credential.remaining_secs(now).to_string().yellow()
            ));
            Ok(output)
        }
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green(), message)
}

/// Format warning message
pub fn format_warning(message: &str) -> String {
    format!("{} {}", "!".yellow(), message)
}
