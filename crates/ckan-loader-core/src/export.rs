//! Serialization of rendered documents to a writer.
//!
//! Each document is written as `{"page_content": ..., "metadata": {...}}`,
//! the shape most document stores accept for bulk ingestion.
//!
//! ```
//! use ckan_loader_core::document::{RawRecord, build_document};
//! use ckan_loader_core::export::{ExportFormat, write_documents};
//!
//! let docs = vec![build_document(&RawRecord::new())];
//! let mut out = Vec::new();
//! let count = write_documents(&mut out, &docs, ExportFormat::Jsonl).unwrap();
//! assert_eq!(count, 1);
//! assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
//! ```

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::document::RenderedDocument;
use crate::error::AppError;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// JSON Lines format (one JSON object per line).
    #[default]
    Jsonl,
    /// Standard JSON array format.
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jsonl => write!(f, "jsonl"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(Self::Jsonl),
            "json" => Ok(Self::Json),
            _ => Err(AppError::ConfigError(format!(
                "Unknown export format: '{}'. Valid options: jsonl, json",
                s
            ))),
        }
    }
}

/// Writes documents to `writer`, returning how many were written.
pub fn write_documents<W: Write>(
    writer: &mut W,
    documents: &[RenderedDocument],
    format: ExportFormat,
) -> Result<u64, AppError> {
    let mut count = 0u64;

    match format {
        ExportFormat::Jsonl => {
            for document in documents {
                let json = serde_json::to_string(document)?;
                writeln!(writer, "{}", json)?;
                count += 1;
            }
        }
        ExportFormat::Json => {
            writeln!(writer, "[")?;
            for (i, document) in documents.iter().enumerate() {
                if i > 0 {
                    writeln!(writer, ",")?;
                }
                let json = serde_json::to_string_pretty(document)?;
                // Indent each line for proper formatting
                for (j, line) in json.lines().enumerate() {
                    if j > 0 {
                        writeln!(writer)?;
                    }
                    write!(writer, "  {}", line)?;
                }
                count += 1;
            }
            if count > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "]")?;
        }
    }

    writer.flush()?;
    Ok(count)
}
