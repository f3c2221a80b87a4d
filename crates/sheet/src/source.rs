//! The boundary to the underlying sheet data.

use sheetcast_model::RawCell;

/// A read-only view of one worksheet's evaluated contents.
///
/// Implementors hand over already-evaluated values: formula cells arrive as
/// their result, a formula the evaluator gave up on arrives as
/// [`RawValue::Unevaluable`](sheetcast_model::RawValue::Unevaluable).
pub trait SheetSource {
    /// The sheet's name (tab name, or a name derived from the file).
    fn name(&self) -> &str;

    /// Exclusive upper bound of the 0-based row indexes. Rows below the
    /// bound may still be absent; see [`SheetSource::col_span`].
    fn row_count(&self) -> u32;

    /// First and last populated 0-based column index of a row, or `None` if
    /// the row has no contents at all.
    fn col_span(&self, row: u32) -> Option<(u32, u32)>;

    /// The raw cell at the given 0-based position. Positions outside the
    /// populated area yield a blank cell.
    fn cell(&self, row: u32, col: u32) -> RawCell;
}

/// An in-memory sheet, mainly for tests and for programmatic input.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    name: String,
    rows: Vec<Vec<RawCell>>,
}

impl MemorySheet {
    /// Create a sheet from rows of raw cells. Row and column indexes of the
    /// cells are filled in from their position.
    #[must_use]
    pub fn new(name: &str, rows: Vec<Vec<RawCell>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(row_idx, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(col_idx, mut cell)| {
                        cell.row = row_idx as u32;
                        cell.col = col_idx as u32;
                        cell
                    })
                    .collect()
            })
            .collect();
        Self { name: name.to_string(), rows }
    }
}

impl SheetSource for MemorySheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    fn col_span(&self, row: u32) -> Option<(u32, u32)> {
        let cells = self.rows.get(row as usize)?;
        let first = cells
            .iter()
            .position(|c| c.value != sheetcast_model::RawValue::Blank)?;
        let last = cells
            .iter()
            .rposition(|c| c.value != sheetcast_model::RawValue::Blank)?;
        Some((first as u32, last as u32))
    }

    fn cell(&self, row: u32, col: u32) -> RawCell {
        self.rows
            .get(row as usize)
            .and_then(|cells| cells.get(col as usize))
            .cloned()
            .unwrap_or(RawCell {
                row,
                col,
                ..RawCell::default()
            })
    }
}
