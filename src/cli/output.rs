//! Output formatting for CLI commands.

use serde::Serialize;
use serde_json::Value;

use crate::cli::args::{DocframeArgs, OutputFormat};
use crate::error::Result;

/// Formats a backend can read.
#[derive(Debug, Serialize)]
pub struct FormatListing {
    pub backend: String,
    pub formats: Vec<String>,
}

/// Summary of a read or convert run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Output a single result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &DocframeArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            output_generic_human(&serde_json::to_value(result)?, 0);
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Jsonl => output_json(result, args),
    }
}

/// Output a sequence of records.
///
/// JSON prints one array, JSON Lines one record per line, and the human
/// format a numbered block per record followed by `summary`.
pub fn output_records<T: Serialize>(
    label: &str,
    records: &[T],
    summary: &RunSummary,
    args: &DocframeArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            for (i, record) in records.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("{label} {}:", i + 1);
                println!("─────────────");
                output_generic_human(&serde_json::to_value(record)?, 1);
            }
            if args.verbosity() > 0 {
                println!();
                println!(
                    "{} {label}(s) from {} file(s), {} row(s) read",
                    records.len(),
                    summary.files,
                    summary.rows
                );
                if args.verbosity() > 1 {
                    println!("Columns: {}", summary.columns.join(", "));
                }
            }
            Ok(())
        }
        OutputFormat::Json => output_json(&records, args),
        OutputFormat::Jsonl => {
            for record in records {
                println!("{}", serde_json::to_string(record)?);
            }
            Ok(())
        }
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &DocframeArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

/// Output any JSON value as indented `key: value` lines.
fn output_generic_human(value: &Value, indent: usize) {
    let spaces = "  ".repeat(indent);
    match value {
        Value::Object(obj) => {
            for (key, val) in obj {
                match val {
                    Value::Object(inner) if !inner.is_empty() => {
                        println!("{spaces}{key}:");
                        output_generic_human(val, indent + 1);
                    }
                    _ => println!("{spaces}{key}: {}", format_value(val)),
                }
            }
        }
        _ => println!("{spaces}{}", format_value(value)),
    }
}

/// Format a JSON value for display.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        Value::Object(obj) if obj.is_empty() => "{}".to_string(),
        Value::Object(_) => "[object]".to_string(),
        Value::Null => "null".to_string(),
    }
}
