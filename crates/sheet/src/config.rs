//! User configuration: sheet templates and column attribute specifications.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sheetcast_model::SortOrder;

use crate::error::{Result, SheetError};

/// Selection of the row supplying column titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TitleRowSelector {
    /// Use the first row with any contents (the default).
    #[default]
    FirstNonBlank,

    /// Don't read any titles from the sheet; all columns get explicit or
    /// generic names.
    None,

    /// Use the given 1-based row.
    At(u32),
}

/// An inclusive 1-based index range. A missing upper bound means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    pub from: u32,
    #[serde(default)]
    pub to: Option<u32>,
}

impl RangeSpec {
    /// Whether the 1-based index lies in this range.
    #[must_use]
    pub fn contains(&self, index: u32) -> bool {
        index >= self.from && self.to.map_or(true, |to| index <= to)
    }
}

/// User-specified attributes of one column.
///
/// The column is addressed either by an anchored regular expression matched
/// against the titles read from the sheet, or by 1-based index — exactly one
/// of the two.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Regular expression matched against the original sheet titles.
    #[serde(default)]
    pub title: Option<String>,

    /// 1-based column index.
    #[serde(default)]
    pub index: Option<u32>,

    /// Explicit name, overriding the title read from the sheet.
    #[serde(default)]
    pub name: Option<String>,

    /// Whether the distinct values of this column define a grouping level.
    #[serde(default)]
    pub grouping: bool,

    /// Sort order for the group (grouping columns) or the row property
    /// (non-grouping columns).
    #[serde(default)]
    pub sort_order: SortOrder,

    /// Sort priority against other sorted property columns. A positive value
    /// is an explicit rank (larger = more significant); anything else is the
    /// pseudo priority "rank by order of declaration".
    #[serde(default = "pseudo_priority")]
    pub priority: i32,
}

fn pseudo_priority() -> i32 {
    -1
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.title, self.index) {
            (Some(re), _) => write!(f, "title:{re}"),
            (None, Some(index)) => write!(f, "index:{index}"),
            (None, None) => write!(f, "(unaddressed)"),
        }
    }
}

/// Parsing instructions for the sheets matched by this template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTemplate {
    /// Anchored regular expression matched against the sheet's tab name.
    #[serde(default)]
    pub tab: Option<String>,

    /// 1-based index of the sheet in the workbook.
    #[serde(default)]
    pub index: Option<u32>,

    /// Which row supplies the column titles.
    #[serde(default)]
    pub title_row: TitleRowSelector,

    /// Coerce titles read from the sheet into identifier form.
    #[serde(default)]
    pub titles_are_identifiers: bool,

    /// Column attribute specifications, applied in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,

    /// Rows to include (1-based, inclusive). Empty means all.
    #[serde(default)]
    pub include_rows: Vec<RangeSpec>,

    /// Rows to exclude; applied after the include ranges.
    #[serde(default)]
    pub exclude_rows: Vec<RangeSpec>,

    /// Columns to include (1-based, inclusive). Empty means all.
    #[serde(default)]
    pub include_cols: Vec<RangeSpec>,

    /// Columns to exclude; applied after the include ranges.
    #[serde(default)]
    pub exclude_cols: Vec<RangeSpec>,
}

impl SheetTemplate {
    /// Whether the 1-based row index is inside the supported area.
    #[must_use]
    pub fn is_row_supported(&self, row: u32) -> bool {
        in_ranges(&self.include_rows, &self.exclude_rows, row)
    }

    /// Whether the 1-based column index is inside the supported area.
    #[must_use]
    pub fn is_col_supported(&self, col: u32) -> bool {
        in_ranges(&self.include_cols, &self.exclude_cols, col)
    }
}

fn in_ranges(include: &[RangeSpec], exclude: &[RangeSpec], index: u32) -> bool {
    if !include.is_empty() && !include.iter().any(|r| r.contains(index)) {
        return false;
    }
    !exclude.iter().any(|r| r.contains(index))
}

/// Configuration for parsing one workbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookConfig {
    /// Sheet templates; a sheet is parsed with the first template matching
    /// it. An empty list parses every sheet with default settings.
    #[serde(default)]
    pub sheets: Vec<SheetTemplate>,

    /// Sort order applied to the sheet list of the produced model, over
    /// sheet names.
    #[serde(default)]
    pub sort_sheets: SortOrder,

    /// Coerce worksheet names into identifier form.
    #[serde(default)]
    pub sheet_names_are_identifiers: bool,
}

impl WorkbookConfig {
    /// Load a configuration document from a YAML or JSON file, decided by
    /// the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&raw)?,
            Some("yaml" | "yml") => serde_yaml::from_str(&raw)?,
            _ => {
                return Err(SheetError::Config(format!(
                    "unsupported config extension: {}",
                    path.display()
                )))
            }
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_include_and_exclude() {
        let template = SheetTemplate {
            include_rows: vec![RangeSpec { from: 2, to: Some(10) }],
            exclude_rows: vec![RangeSpec { from: 5, to: Some(5) }],
            ..SheetTemplate::default()
        };
        assert!(!template.is_row_supported(1));
        assert!(template.is_row_supported(2));
        assert!(!template.is_row_supported(5));
        assert!(template.is_row_supported(10));
        assert!(!template.is_row_supported(11));
        // No column restrictions configured.
        assert!(template.is_col_supported(1));
        assert!(template.is_col_supported(16384));
    }

    #[test]
    fn open_ended_range() {
        let range = RangeSpec { from: 3, to: None };
        assert!(!range.contains(2));
        assert!(range.contains(3));
        assert!(range.contains(1_000_000));
    }

    #[test]
    fn config_parses_from_yaml() {
        let yaml = r#"
sheets:
  - tab: "Data.*"
    titleRow: !at 2
    columns:
      - title: "Name"
        grouping: true
        sortOrder: lexical
      - index: 2
        name: Quantity
        sortOrder: numerical
        priority: 5
sortSheets: lexical
"#;
        let config: WorkbookConfig = serde_yaml::from_str(yaml).expect("valid config");
        assert_eq!(config.sheets.len(), 1);
        let template = &config.sheets[0];
        assert_eq!(template.title_row, TitleRowSelector::At(2));
        assert_eq!(template.columns.len(), 2);
        assert_eq!(template.columns[0].priority, -1);
        assert_eq!(template.columns[1].priority, 5);
        assert_eq!(template.columns[1].name.as_deref(), Some("Quantity"));
        assert_eq!(config.sort_sheets, SortOrder::Lexical);
    }

    #[test]
    fn column_spec_display_names_the_target() {
        let by_title = ColumnSpec { title: Some("Name".into()), ..ColumnSpec::default() };
        assert_eq!(by_title.to_string(), "title:Name");
        let by_index = ColumnSpec { index: Some(3), ..ColumnSpec::default() };
        assert_eq!(by_index.to_string(), "index:3");
    }
}
