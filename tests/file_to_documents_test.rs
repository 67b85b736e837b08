//! Integration tests for converting tables and files into documents.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use docframe::component::{
    DataFrameConverter, DataFrameConverterConfig, DataFrameFileToDocument,
    DataFrameFileToDocumentConfig, FileToDataFrame, FileToDataFrameConfig,
};
use docframe::converter::{ExtraMetadata, frame_to_documents};
use docframe::document::{FieldValue, Metadata};
use docframe::error::{DocframeError, Result};
use docframe::reader::FileFormat;
use docframe::table::{Backend, RecordTable, Table};
use tempfile::tempdir;

fn sample_table() -> Result<RecordTable> {
    RecordTable::new()
        .with_column("content", vec!["content1", "content2"])?
        .with_column("meta1", vec!["meta1_1", "meta1_2"])?
        .with_column("meta2", vec!["meta2_1", "meta2_2"])
}

fn write_csv(dir: &Path, name: &str, rows: &[(&str, &str, &str)]) -> Result<PathBuf> {
    let mut contents = String::from("content,meta1,meta2\n");
    for (content, meta1, meta2) in rows {
        contents.push_str(&format!("{content},{meta1},{meta2}\n"));
    }
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

fn meta(entries: &[(&str, &str)]) -> Metadata {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), FieldValue::from(*value)))
        .collect()
}

#[test]
fn test_content_with_selected_metadata() -> Result<()> {
    let converter = DataFrameConverter::new(
        DataFrameConverterConfig::new("content").with_meta_columns(["meta2"]),
    )?;
    let documents = converter.run(&sample_table()?, None)?.documents;

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].content, "content1");
    assert_eq!(documents[0].meta, meta(&[("meta2", "meta2_1")]));
    assert_eq!(documents[1].content, "content2");
    assert_eq!(documents[1].meta, meta(&[("meta2", "meta2_2")]));

    Ok(())
}

#[test]
fn test_index_column_as_id() -> Result<()> {
    let converter = DataFrameConverter::new(
        DataFrameConverterConfig::new("content")
            .with_meta_columns(["meta2"])
            .with_index_column("meta1"),
    )?;
    let documents = converter.run(&sample_table()?, None)?.documents;

    assert_eq!(documents[0].id, "meta1_1");
    assert_eq!(documents[1].id, "meta1_2");

    Ok(())
}

#[test]
fn test_composite_index_fails_before_any_document() -> Result<()> {
    let table = sample_table()?.set_index(&["meta1".to_string(), "meta2".to_string()])?;
    let converter = DataFrameConverter::new(
        DataFrameConverterConfig::new("content").with_use_index_as_id(true),
    )?;

    let result = converter.run(&table, None);
    assert!(matches!(result, Err(DocframeError::IncompatibleIndex(_))));

    Ok(())
}

#[test]
fn test_two_files_read_in_file_then_row_order() -> Result<()> {
    let dir = tempdir()?;
    let first = write_csv(dir.path(), "first.csv", &[("r1", "a", "b"), ("r2", "c", "d")])?;
    let second = write_csv(dir.path(), "second.csv", &[("r3", "e", "f"), ("r4", "g", "h")])?;

    for backend in Backend::ALL {
        let stage = FileToDataFrame::new(FileToDataFrameConfig::new(backend, FileFormat::Csv))?;
        let table = stage.run(&[&first, &second])?.dataframe;
        assert_eq!(table.num_rows(), 4);

        let contents: Vec<String> = table
            .rows()
            .map(|row| row.map(|row| row.get("content").map(ToString::to_string).unwrap_or_default()))
            .collect::<Result<_>>()?;
        assert_eq!(contents, vec!["r1", "r2", "r3", "r4"]);

        let documents = DataFrameFileToDocument::new(
            DataFrameFileToDocumentConfig::new("content").with_backend(backend),
        )?
        .run(&[&first, &second], None)?
        .documents;
        let contents: Vec<&str> = documents.iter().map(|doc| doc.content.as_str()).collect();
        assert_eq!(contents, vec!["r1", "r2", "r3", "r4"]);
    }

    Ok(())
}

#[test]
fn test_row_count_and_disjointness() -> Result<()> {
    let table = sample_table()?;
    let meta_columns = vec![
        "content".to_string(),
        "meta1".to_string(),
        "meta2".to_string(),
    ];
    let documents = frame_to_documents(&table, "content", &meta_columns, None, None)?;

    assert_eq!(documents.len(), table.num_rows());
    for document in &documents {
        assert!(!document.has_meta("content"));
        assert_eq!(document.meta.len(), 2);
    }

    Ok(())
}

#[test]
fn test_extra_metadata_from_files() -> Result<()> {
    let dir = tempdir()?;
    let path = write_csv(dir.path(), "data.csv", &[("r1", "a", "b"), ("r2", "c", "d")])?;
    let stage = DataFrameFileToDocument::new(
        DataFrameFileToDocumentConfig::new("content")
            .with_meta_columns(["meta1"])
            .with_backend(Backend::Records),
    )?;

    let uniform = ExtraMetadata::from(meta(&[("meta1", "override"), ("source", "data.csv")]));
    let documents = stage.run(&[&path], Some(&uniform))?.documents;
    for document in &documents {
        assert_eq!(
            document.meta,
            meta(&[("meta1", "override"), ("source", "data.csv")])
        );
    }

    let per_row = ExtraMetadata::from(vec![meta(&[("page", "1")]), meta(&[("page", "2")])]);
    let documents = stage.run(&[&path], Some(&per_row))?.documents;
    assert_eq!(documents[0].meta, meta(&[("meta1", "a"), ("page", "1")]));
    assert_eq!(documents[1].meta, meta(&[("meta1", "c"), ("page", "2")]));

    let short = ExtraMetadata::from(vec![meta(&[("page", "1")])]);
    let result = stage.run(&[&path], Some(&short));
    assert!(matches!(
        result,
        Err(DocframeError::MetadataLengthMismatch {
            expected: 2,
            actual: 1
        })
    ));

    Ok(())
}

#[test]
fn test_records_index_col_with_use_index_as_id() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("indexed.csv");
    fs::write(&path, "doc_id,content\nd1,first\nd2,second\n")?;

    let reader = FileToDataFrame::new(
        FileToDataFrameConfig::new(Backend::Records, FileFormat::Csv)
            .with_read_kwarg("index_col", "doc_id"),
    )?;
    let table = reader.run(&[&path])?.dataframe;
    assert_eq!(table.column_names(), vec!["content"]);

    let converter = DataFrameConverter::new(
        DataFrameConverterConfig::new("content").with_use_index_as_id(true),
    )?;
    let documents = converter.run(&table, None)?.documents;
    let ids: HashMap<&str, &str> = documents
        .iter()
        .map(|doc| (doc.id.as_str(), doc.content.as_str()))
        .collect();
    assert_eq!(ids.get("d1"), Some(&"first"));
    assert_eq!(ids.get("d2"), Some(&"second"));

    Ok(())
}

#[test]
fn test_zero_row_file() -> Result<()> {
    let dir = tempdir()?;
    let path = write_csv(dir.path(), "empty.csv", &[])?;

    for backend in Backend::ALL {
        let documents = DataFrameFileToDocument::new(
            DataFrameFileToDocumentConfig::new("content")
                .with_meta_columns(["meta1"])
                .with_backend(backend),
        )?
        .run(&[&path], None)?
        .documents;
        assert!(documents.is_empty());
    }

    Ok(())
}

#[test]
fn test_extra_metadata_with_nested_values() -> Result<()> {
    let table = sample_table()?;
    let meta_columns = vec!["meta1".to_string()];

    let uniform: ExtraMetadata = serde_json::from_str(r#"{"tags": ["a", "b"]}"#)?;
    let documents = frame_to_documents(&table, "content", &meta_columns, None, Some(&uniform))?;
    let tags = FieldValue::List(vec![FieldValue::from("a"), FieldValue::from("b")]);
    for document in &documents {
        assert_eq!(document.get_meta("tags"), Some(&tags));
    }

    let per_row: ExtraMetadata =
        serde_json::from_str(r#"[{"info": {"page": 1}}, {"info": {"page": 2}}]"#)?;
    let documents = frame_to_documents(&table, "content", &meta_columns, None, Some(&per_row))?;
    let info = serde_json::to_value(documents[1].get_meta("info"))?;
    assert_eq!(info, serde_json::json!({"page": 2}));

    Ok(())
}
