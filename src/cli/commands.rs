//! Command implementations for the docframe CLI.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use log::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::component::{
    Component, DataFrameConverter, DataFrameConverterConfig, DataFrameFileToDocument,
    DataFrameFileToDocumentConfig, FileToDataFrame, FileToDataFrameConfig,
};
use crate::converter::ExtraMetadata;
use crate::document::{FieldValue, Metadata};
use crate::error::{DocframeError, Result};
use crate::reader::{FileFormat, ReadKwargs, supported_formats};
use crate::table::{Backend, Row, Table};

/// Execute a CLI command.
pub fn execute_command(args: DocframeArgs) -> Result<()> {
    match &args.command {
        Command::Convert(convert_args) => convert(convert_args, &args),
        Command::Read(read_args) => read(read_args, &args),
        Command::Formats(formats_args) => list_formats(formats_args, &args),
    }
}

/// Convert files into documents.
fn convert(args: &ConvertArgs, cli_args: &DocframeArgs) -> Result<()> {
    let source = &args.source;
    let file_format = resolve_file_format(source)?;
    let read_kwargs = read_kwargs(source);
    let extra_metadata = extra_metadata(args)?;

    let documents = if args.use_index_as_id {
        // The index comes from the reader, so read and convert as two stages.
        let reader = FileToDataFrame::new(FileToDataFrameConfig {
            backend: source.backend.clone(),
            file_format,
            read_kwargs,
            columns_subset: None,
        })?;
        let converter = DataFrameConverter::new(
            DataFrameConverterConfig::new(args.content_column.as_str())
                .with_meta_columns(args.meta_columns.iter().cloned())
                .with_use_index_as_id(true),
        )?;

        if args.describe {
            let descriptors = vec![reader.to_descriptor()?, converter.to_descriptor()?];
            return output_result("Pipeline", &descriptors, cli_args);
        }

        let table = reader.run(&source.files)?.dataframe;
        converter.run(&table, extra_metadata.as_ref())?.documents
    } else {
        let mut config = DataFrameFileToDocumentConfig::new(args.content_column.as_str())
            .with_meta_columns(args.meta_columns.iter().cloned())
            .with_read_kwargs(read_kwargs);
        config.backend = source.backend.clone();
        config.file_format = file_format;
        if let Some(index_column) = &args.index_column {
            config = config.with_index_column(index_column.as_str());
        }
        let stage = DataFrameFileToDocument::new(config)?;

        if args.describe {
            return output_result("Pipeline", &vec![stage.to_descriptor()?], cli_args);
        }

        stage.run(&source.files, extra_metadata.as_ref())?.documents
    };

    info!(
        "Converted {} document(s) from {} file(s)",
        documents.len(),
        source.files.len()
    );

    let summary = RunSummary {
        files: source.files.len(),
        rows: documents.len(),
        columns: std::iter::once(args.content_column.clone())
            .chain(args.index_column.iter().cloned())
            .chain(args.meta_columns.iter().cloned())
            .collect(),
    };
    output_records("Document", &documents, &summary, cli_args)
}

/// Read files into a table and print its rows.
fn read(args: &ReadArgs, cli_args: &DocframeArgs) -> Result<()> {
    let source = &args.source;
    let mut config = FileToDataFrameConfig {
        backend: source.backend.clone(),
        file_format: resolve_file_format(source)?,
        read_kwargs: read_kwargs(source),
        columns_subset: None,
    };
    if !args.columns.is_empty() {
        config = config.with_columns_subset(args.columns.iter().cloned());
    }

    let table = FileToDataFrame::new(config)?.run(&source.files)?.dataframe;
    let shown = match args.limit {
        Some(limit) => table.head(limit),
        None => table.clone(),
    };
    let rows = shown.rows().collect::<Result<Vec<Row>>>()?;

    let summary = RunSummary {
        files: source.files.len(),
        rows: table.num_rows(),
        columns: table.column_names(),
    };
    output_records("Row", &rows, &summary, cli_args)
}

/// List the formats of every backend, or of one.
fn list_formats(args: &FormatsArgs, cli_args: &DocframeArgs) -> Result<()> {
    let backends = match &args.backend {
        Some(backend) => vec![backend.parse::<Backend>()?],
        None => Backend::ALL.to_vec(),
    };

    let listings: Vec<FormatListing> = backends
        .into_iter()
        .map(|backend| FormatListing {
            backend: backend.to_string(),
            formats: supported_formats(backend)
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
        .collect();

    match cli_args.output_format {
        OutputFormat::Human => {
            for listing in &listings {
                println!("{}: {}", listing.backend, listing.formats.join(", "));
            }
            Ok(())
        }
        _ => output_result("Formats", &listings, cli_args),
    }
}

/// The configured file format, or the one guessed from the first file.
fn resolve_file_format(source: &SourceArgs) -> Result<String> {
    if let Some(file_format) = &source.file_format {
        return Ok(file_format.clone());
    }
    let first = source
        .files
        .first()
        .ok_or_else(|| DocframeError::invalid_argument("no input files"))?;
    let file_format = FileFormat::from_extension(first).ok_or_else(|| {
        DocframeError::invalid_argument(format!(
            "cannot guess the file format of {}, use --format",
            first.display()
        ))
    })?;
    debug!("Guessed {file_format} format from {}", first.display());
    Ok(file_format.to_string())
}

fn read_kwargs(source: &SourceArgs) -> ReadKwargs {
    source.read_options.iter().cloned().collect()
}

fn extra_metadata(args: &ConvertArgs) -> Result<Option<ExtraMetadata>> {
    if let Some(path) = &args.meta_file {
        return load_extra_metadata(path).map(Some);
    }
    if args.extra_meta.is_empty() {
        return Ok(None);
    }
    let meta: Metadata = args
        .extra_meta
        .iter()
        .map(|(key, value)| (key.clone(), FieldValue::from_json(value)))
        .collect();
    Ok(Some(ExtraMetadata::Uniform(meta)))
}

/// Load extra metadata from a JSON file.
fn load_extra_metadata(path: &Path) -> Result<ExtraMetadata> {
    let file = File::open(path)
        .with_context(|| format!("failed to open metadata file {}", path.display()))?;
    let meta = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse metadata file {}", path.display()))?;
    Ok(meta)
}
