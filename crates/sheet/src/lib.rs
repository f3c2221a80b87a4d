//! Sheet ingestion and model assembly for sheetcast.
//!
//! The pipeline per sheet: a [`SheetSource`] hands over raw, evaluated cell
//! values; the [`ColumnTitleRegistry`] resolves column titles and the
//! grouping/sorting schemes from the sheet and the user configuration; the
//! [`SheetModelBuilder`] classifies the data rows, files them into the
//! grouping tree and sorts them. The [`WorkbookParser`] drives the whole
//! thing across the sheets of an input file.
//!
//! # Examples
//!
//! ```
//! use sheetcast_sheet::{CsvOptions, WorkbookParser};
//!
//! let csv = "Name,Qty\nWidget,3\n";
//! let sheet = CsvOptions::default().read("stock", csv.as_bytes())?;
//! let model = WorkbookParser::default().parse("stock", std::slice::from_ref(&sheet))?;
//! let row = &model.sheets[0].root.rows[0];
//! assert_eq!(row.cell("Qty").and_then(|c| c.int), Some(3));
//! # Ok::<(), sheetcast_sheet::SheetError>(())
//! ```

mod builder;
mod config;
mod csv;
mod error;
mod registry;
mod source;
mod workbook;
mod xlsx;

/// Re-export the per-sheet model assembly.
pub use builder::{GroupNode, RowRecord, SheetModel, SheetModelBuilder};
/// Re-export the configuration document types.
pub use config::{ColumnSpec, RangeSpec, SheetTemplate, TitleRowSelector, WorkbookConfig};
/// Re-export the CSV loader.
pub use csv::CsvOptions;
/// Re-export the error type.
pub use error::{Result, SheetError};
/// Re-export the column title registry.
pub use registry::{ColumnTitleRegistry, SchemeColumn};
/// Re-export the sheet data boundary.
pub use source::{MemorySheet, SheetSource};
/// Re-export the workbook driver.
pub use workbook::{WorkbookModel, WorkbookParser};
/// Re-export the Excel loader.
pub use xlsx::XlsxBook;
