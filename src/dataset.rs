use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

// @module: Review dataset loading and writing

/// On-disk layout of a dataset file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// A single JSON array of row objects
    JsonArray,
    /// One JSON object per line
    JsonLines,
}

impl DatasetFormat {
    // @returns: Format implied by the file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson") => Self::JsonLines,
            _ => Self::JsonArray,
        }
    }
}

const TITLE_COLUMN: &str = "review_title";
const BODY_COLUMN: &str = "review_text";
const LOCATION_COLUMN: &str = "location";

/// One review row
///
/// `title`, `body` and `locale_hint` are read out of `row`; missing or null
/// cells become empty text and no hint. The row itself is written back
/// unchanged, nulls included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    /// Review title
    pub title: String,

    /// Review body
    pub body: String,

    /// Free-text location, used as a locale hint
    pub locale_hint: Option<String>,

    /// Every column of the source row
    pub row: Map<String, Value>,
}

// @returns: Text of a string cell, None for a missing or null cell
fn text_cell(row: &Map<String, Value>, column: &str) -> Result<Option<String>, String> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(format!("column '{}' must be a string, found {}", column, other)),
    }
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = String;

    fn try_from(row: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            title: text_cell(&row, TITLE_COLUMN)?.unwrap_or_default(),
            body: text_cell(&row, BODY_COLUMN)?.unwrap_or_default(),
            locale_hint: text_cell(&row, LOCATION_COLUMN)?,
            row,
        })
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record.row
    }
}

impl Record {
    /// Create a record without extra columns
    pub fn new(title: impl Into<String>, body: impl Into<String>, locale_hint: Option<&str>) -> Self {
        let title = title.into();
        let body = body.into();
        let mut row = Map::new();
        row.insert(TITLE_COLUMN.to_string(), Value::String(title.clone()));
        row.insert(BODY_COLUMN.to_string(), Value::String(body.clone()));
        if let Some(hint) = locale_hint {
            row.insert(LOCATION_COLUMN.to_string(), Value::String(hint.to_string()));
        }

        Self {
            title,
            body,
            locale_hint: locale_hint.map(str::to_string),
            row,
        }
    }
}

/// A record plus its translated columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedRecord {
    /// The source row
    #[serde(flatten)]
    pub record: Record,

    /// Translated (or passed-through) title
    pub review_title_tr: String,

    /// Translated (or passed-through) body
    pub review_text_tr: String,
}

/// Load records from a JSON array or JSON Lines file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open dataset: {:?}", path))?;

    match DatasetFormat::from_path(path) {
        DatasetFormat::JsonArray => serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse dataset: {:?}", path)),
        DatasetFormat::JsonLines => {
            let mut records = Vec::new();
            for (line_no, line) in BufReader::new(file).lines().enumerate() {
                let line = line.with_context(|| format!("Failed to read dataset: {:?}", path))?;
                if line.trim().is_empty() {
                    continue;
                }
                let record = serde_json::from_str(&line)
                    .map_err(|e| anyhow!("Invalid record on line {} of {:?}: {}", line_no + 1, path, e))?;
                records.push(record);
            }
            Ok(records)
        }
    }
}

/// Write translated records, replacing the target file atomically
pub fn save_records<P: AsRef<Path>>(path: P, records: &[TranslatedRecord]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;

    match DatasetFormat::from_path(path) {
        DatasetFormat::JsonArray => serde_json::to_writer_pretty(&mut tmp, records)?,
        DatasetFormat::JsonLines => {
            for record in records {
                serde_json::to_writer(&mut tmp, record)?;
                tmp.write_all(b"\n")?;
            }
        }
    }
    tmp.flush()?;

    tmp.persist(path)
        .map_err(|e| anyhow!("Failed to write output dataset {:?}: {}", path, e.error))?;
    Ok(())
}

// @generates: Default output path next to the input, e.g. reviews.translated.json
pub fn default_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    let input = input.as_ref();
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let file_name = match input.extension() {
        Some(ext) => format!("{}.translated.{}", stem, ext.to_string_lossy()),
        None => format!("{}.translated", stem),
    };
    input.with_file_name(file_name)
}
