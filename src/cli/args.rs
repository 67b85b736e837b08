//! Command line argument parsing for the docframe CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// docframe - Convert tabular files into documents
#[derive(Parser, Debug, Clone)]
#[command(name = "docframe")]
#[command(about = "Convert tabular files into documents for retrieval pipelines")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct DocframeArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "output", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl DocframeArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert table rows from files into documents
    Convert(ConvertArgs),

    /// Read files into a table and print its rows
    Read(ReadArgs),

    /// List the file formats each backend can read
    Formats(FormatsArgs),
}

/// Reader selection shared by the commands that read files
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Input files, read and concatenated in order
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Table engine (arrow or records)
    #[arg(short, long, env = "DOCFRAME_BACKEND", default_value = "arrow")]
    pub backend: String,

    /// File format (guessed from the first file extension when omitted)
    #[arg(long = "format", value_name = "FORMAT")]
    pub file_format: Option<String>,

    /// Reader parameter as KEY=VALUE; VALUE is parsed as JSON, or taken as a string
    #[arg(short = 'o', long = "read-option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub read_options: Vec<(String, Value)>,
}

/// Arguments for converting files into documents
#[derive(Parser, Debug, Clone)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Column holding the document content
    #[arg(short, long)]
    pub content_column: String,

    /// Columns copied into the document metadata (repeatable or comma-separated)
    #[arg(short, long = "meta-column", value_delimiter = ',')]
    pub meta_columns: Vec<String>,

    /// Column holding the document id
    #[arg(short, long)]
    pub index_column: Option<String>,

    /// Use the row index as document id (records backend with index_col)
    #[arg(long, conflicts_with = "index_column")]
    pub use_index_as_id: bool,

    /// Metadata added to every document as KEY=VALUE
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub extra_meta: Vec<(String, Value)>,

    /// JSON file holding extra metadata: one object for all rows, or an array with one object per row
    #[arg(long, value_name = "FILE", conflicts_with = "extra_meta")]
    pub meta_file: Option<PathBuf>,

    /// Print the pipeline descriptor instead of converting
    #[arg(long)]
    pub describe: bool,
}

/// Arguments for reading files into a table
#[derive(Parser, Debug, Clone)]
pub struct ReadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Columns to keep from every file (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Maximum number of rows to print
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for listing formats
#[derive(Parser, Debug, Clone)]
pub struct FormatsArgs {
    /// Only list formats of this backend
    #[arg(short, long)]
    pub backend: Option<String>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// A single JSON value
    Json,
    /// One JSON value per line
    Jsonl,
}

/// Parse `KEY=VALUE`, reading VALUE as JSON and falling back to a plain string.
pub fn parse_key_value(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_convert_command() {
        let args = DocframeArgs::try_parse_from([
            "docframe",
            "convert",
            "a.csv",
            "b.csv",
            "--content-column",
            "content",
            "--meta-column",
            "meta1,meta2",
            "-m",
            "meta3",
            "--index-column",
            "id",
            "--read-option",
            "n_rows=10",
            "--meta",
            "source=books",
        ])
        .unwrap();

        if let Command::Convert(convert) = args.command {
            assert_eq!(convert.source.files.len(), 2);
            assert_eq!(convert.source.backend, "arrow");
            assert_eq!(convert.content_column, "content");
            assert_eq!(convert.meta_columns, vec!["meta1", "meta2", "meta3"]);
            assert_eq!(convert.index_column.as_deref(), Some("id"));
            assert_eq!(convert.source.read_options, vec![("n_rows".to_string(), json!(10))]);
            assert_eq!(convert.extra_meta, vec![("source".to_string(), json!("books"))]);
        } else {
            panic!("Expected convert command");
        }
    }

    #[test]
    fn test_index_column_conflicts_with_use_index_as_id() {
        let result = DocframeArgs::try_parse_from([
            "docframe",
            "convert",
            "a.csv",
            "-c",
            "content",
            "-i",
            "id",
            "--use-index-as-id",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_command() {
        let args = DocframeArgs::try_parse_from([
            "docframe",
            "read",
            "data.parquet",
            "--columns",
            "a,b",
            "--limit",
            "5",
        ])
        .unwrap();

        if let Command::Read(read) = args.command {
            assert_eq!(read.columns, vec!["a", "b"]);
            assert_eq!(read.limit, Some(5));
            assert_eq!(read.source.file_format, None);
        } else {
            panic!("Expected read command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = DocframeArgs::try_parse_from(["docframe", "-q", "formats"]).unwrap();
        assert_eq!(args.verbosity(), 0);

        let args = DocframeArgs::try_parse_from(["docframe", "formats"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = DocframeArgs::try_parse_from(["docframe", "-vvv", "formats"]).unwrap();
        assert_eq!(args.verbosity(), 3);
    }

    #[test]
    fn test_output_format() {
        let args =
            DocframeArgs::try_parse_from(["docframe", "--output", "jsonl", "formats"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Jsonl);
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("columns=[\"a\",\"b\"]").unwrap(),
            ("columns".to_string(), json!(["a", "b"]))
        );
        assert_eq!(
            parse_key_value("delimiter=;").unwrap(),
            ("delimiter".to_string(), json!(";"))
        );
        assert_eq!(
            parse_key_value("has_header=false").unwrap(),
            ("has_header".to_string(), json!(false))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=1").is_err());
    }
}
