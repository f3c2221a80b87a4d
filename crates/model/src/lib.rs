//! Typed cell model for sheetcast.
//!
//! This crate holds the leaf components of the pipeline: the classifier that
//! turns one raw, loosely-typed sheet value into a typed [`Cell`], the sort
//! order engine used for grouping and row sorting, identifier derivation for
//! names taken from sheet contents, and the error/warning accounting shared
//! by all parsing components.
//!
//! # Examples
//!
//! ```
//! use sheetcast_model::{classify, CellKind, ErrorCounter, IdentCache, RawCell, RawValue};
//!
//! let mut idents = IdentCache::new();
//! let mut counter = ErrorCounter::new();
//! let cell = classify(
//!     RawCell { value: RawValue::Number(42.0), ..RawCell::default() },
//!     &mut idents,
//!     &mut counter,
//! );
//! assert_eq!(cell.kind, CellKind::Integer);
//! assert_eq!(cell.as_str(), "42");
//! ```

mod cell;
mod classify;
mod datetime;
mod diag;
mod escape;
mod ident;
mod sort;

/// Re-export cell model types.
pub use cell::{Cell, CellKind};
/// Re-export the classifier entry point and its input types.
pub use classify::{classify, RawCell, RawValue, ERROR_CELL_TEXT};
/// Re-export serial date helpers.
pub use datetime::{is_date_format, render_date, serial_to_datetime};
/// Re-export the error/warning counter.
pub use diag::ErrorCounter;
/// Re-export JSON text escaping.
pub use escape::json_escape;
/// Re-export identifier derivation.
pub use ident::{is_identifier, is_strict_identifier, IdentCache};
/// Re-export the sort order engine.
pub use sort::{compare_cells, compare_str, SortOrder};
