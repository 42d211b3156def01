//! Output formatting: table, JSON, YAML, plain.
//!
//! API responses have no fixed schema, so tables are built from the JSON
//! shape at runtime: an array of objects becomes one row per element, a
//! single object becomes a field/value listing. Raw (non-JSON) bodies are
//! printed verbatim in every format.

use std::io::{self, Write};

use serde_json::Value;
use tabled::{builder::Builder, settings::Style};

use subservices_api::ApiResult;

use crate::cli::OutputFormat;

// ── Render dispatcher ────────────────────────────────────────────────

/// Render an API result in the chosen format.
pub fn render_result(format: OutputFormat, result: &ApiResult) -> String {
    match result {
        ApiResult::Raw(body) => body.clone(),
        ApiResult::Structured(value) => render_value(format, value),
    }
}

pub fn render_value(format: OutputFormat, value: &Value) -> String {
    match format {
        OutputFormat::Table => render_table(value),
        OutputFormat::Json => render_json_pretty(value),
        OutputFormat::JsonCompact => render_json_compact(value),
        OutputFormat::Yaml => render_yaml(value),
        OutputFormat::Plain => render_plain(value),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Array(items) if items.is_empty() => String::new(),
        Value::Array(items) if items.iter().all(Value::is_object) => object_rows(items),
        Value::Array(items) => {
            let mut builder = Builder::default();
            builder.push_record(["value"]);
            for item in items {
                builder.push_record([cell(item)]);
            }
            styled(builder)
        }
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, field) in map {
                builder.push_record([key.clone(), cell(field)]);
            }
            styled(builder)
        }
        scalar => cell(scalar),
    }
}

/// One column per key, in order of first appearance across all rows.
fn object_rows(items: &[Value]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key.as_str());
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().copied());
    for map in items.iter().filter_map(Value::as_object) {
        builder.push_record(
            columns
                .iter()
                .map(|key| map.get(*key).map(cell).unwrap_or_default()),
        );
    }
    styled(builder)
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Scalars as text, nested structures as compact JSON.
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        nested => render_json_compact(nested),
    }
}

/// One line per element; objects collapse to their `id` when they have one.
fn render_plain(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(plain_item).collect::<Vec<_>>().join("\n"),
        Value::Object(map) if !map.contains_key("id") => map
            .iter()
            .map(|(key, field)| format!("{key}={}", cell(field)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => plain_item(other),
    }
}

fn plain_item(value: &Value) -> String {
    match value.get("id") {
        Some(id) => cell(id),
        None => cell(value),
    }
}
