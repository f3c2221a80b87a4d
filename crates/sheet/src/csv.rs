//! Reading delimited text files as single-sheet workbooks.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sheetcast_model::{RawCell, RawValue};

use crate::error::Result;
use crate::source::MemorySheet;

/// CSV reader options.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',').
    pub delimiter: u8,

    /// Quote character (default: '"').
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl CsvOptions {
    /// Options for TSV (tab-separated values).
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions {
            delimiter: b'\t',
            ..CsvOptions::default()
        }
    }

    /// Load a file as one sheet, named after the file stem.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<MemorySheet> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Sheet")
            .to_string();
        let file = File::open(path)?;
        self.read(&name, BufReader::new(file))
    }

    /// Load CSV data from a reader as one sheet with the given name.
    pub fn read<R: Read>(&self, name: &str, reader: R) -> Result<MemorySheet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows: Vec<Vec<RawCell>> = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(infer_value).collect());
        }
        tracing::debug!(sheet = name, rows = rows.len(), "CSV data loaded");
        Ok(MemorySheet::new(name, rows))
    }
}

/// Infer the cell type of a text field: empty fields are blank, Booleans and
/// numbers are recognized, everything else stays text.
fn infer_value(field: &str) -> RawCell {
    let value = if field.is_empty() {
        RawValue::Blank
    } else if field.eq_ignore_ascii_case("true") {
        RawValue::Bool(true)
    } else if field.eq_ignore_ascii_case("false") {
        RawValue::Bool(false)
    } else if let Ok(number) = field.trim().parse::<f64>() {
        RawValue::Number(number)
    } else {
        RawValue::Text(field.to_string())
    };
    RawCell {
        value,
        ..RawCell::default()
    }
}
