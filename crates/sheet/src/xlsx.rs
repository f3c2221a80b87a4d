//! Reading Excel workbooks through calamine.
//!
//! Formula cells arrive as their cached results; a formula error becomes an
//! error cell. Calamine hands date cells over as typed serial values without
//! the raw number format, so a canonical ISO-like format is attached for the
//! classifier's date rendering.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use sheetcast_model::{RawCell, RawValue};

use crate::error::{Result, SheetError};
use crate::source::MemorySheet;

/// An Excel workbook with all of its sheets loaded.
#[derive(Debug, Clone)]
pub struct XlsxBook {
    sheets: Vec<MemorySheet>,
}

impl XlsxBook {
    /// Open a workbook file and load every sheet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut workbook: Xlsx<BufReader<File>> = open_workbook(path.as_ref())
            .map_err(|e: XlsxError| SheetError::Workbook(e.to_string()))?;

        let names: Vec<String> = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(names.len());
        for name in names {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e: XlsxError| SheetError::Workbook(e.to_string()))?;

            // The range covers only the populated rectangle; pad rows and
            // columns so cell positions stay absolute.
            let (start_row, start_col) = range.start().unwrap_or((0, 0));
            let mut rows: Vec<Vec<RawCell>> = vec![Vec::new(); start_row as usize];
            for row in range.rows() {
                let mut cells: Vec<RawCell> =
                    vec![RawCell::default(); start_col as usize];
                cells.extend(row.iter().map(data_to_raw));
                rows.push(cells);
            }
            tracing::debug!(sheet = name.as_str(), rows = rows.len(), "sheet loaded");
            sheets.push(MemorySheet::new(&name, rows));
        }
        Ok(Self { sheets })
    }

    /// The loaded sheets, in workbook order.
    #[must_use]
    pub fn sheets(&self) -> &[MemorySheet] {
        &self.sheets
    }
}

fn data_to_raw(data: &Data) -> RawCell {
    let mut format = None;
    let value = match data {
        Data::Empty => RawValue::Blank,
        Data::Bool(b) => RawValue::Bool(*b),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) => RawValue::Number(*f),
        Data::String(s) => RawValue::Text(s.clone()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            format = Some(if serial.fract() == 0.0 {
                "yyyy-mm-dd".to_string()
            } else {
                "yyyy-mm-dd hh:mm:ss".to_string()
            });
            RawValue::Number(serial)
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(_) => RawValue::Error,
    };
    RawCell {
        value,
        format,
        ..RawCell::default()
    }
}
