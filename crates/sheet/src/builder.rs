//! Assembly of the typed, grouped model of one worksheet.
//!
//! The builder walks the supported area of a sheet, classifies every cell,
//! files each row under its grouping path and finally sorts groups and rows
//! per the recorded schemes. Sorting is skipped when any error was counted
//! for the sheet, so a partially broken input never silently reorders.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::Serialize;
use sheetcast_model::{classify, compare_cells, compare_str, Cell, ErrorCounter, IdentCache};

use crate::config::SheetTemplate;
use crate::registry::{ColumnTitleRegistry, SchemeColumn};
use crate::source::SheetSource;

/// One data row of a sheet, as a map from column title to classified cell.
///
/// Blank cells are not entered: a template asking for an absent property gets
/// nothing rather than an empty placeholder.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RowRecord {
    /// 0-based row index in the source sheet. Serialized 1-based, the way
    /// spreadsheet users count.
    #[serde(serialize_with = "one_based")]
    pub row: u32,

    /// 1-based position among the sibling rows of the containing group,
    /// assigned after sorting.
    pub index: u32,

    /// The row's cells, keyed by column title, in column order.
    pub cells: IndexMap<String, Cell>,
}

impl RowRecord {
    /// The cell stored under the given property name, if the row has one.
    #[must_use]
    pub fn cell(&self, property: &str) -> Option<&Cell> {
        self.cells.get(property)
    }
}

fn one_based<S: serde::Serializer>(index: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u32(index + 1)
}

/// One level of the grouping tree.
///
/// The root node carries the empty name and holds the rows that didn't
/// descend into any group, i.e. whose grouping cell was blank at some level.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupNode {
    /// The distinct cell value this group collects.
    pub name: String,

    /// Rows filed directly at this level.
    pub rows: Vec<RowRecord>,

    /// Sub-groups of the next grouping level.
    pub groups: Vec<GroupNode>,
}

impl GroupNode {
    /// The sub-group of the given name, if present.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupNode> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Number of rows in this node and all its sub-groups.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len() + self.groups.iter().map(GroupNode::row_count).sum::<usize>()
    }

    fn child_mut(&mut self, name: &str) -> &mut GroupNode {
        if let Some(pos) = self.groups.iter().position(|g| g.name == name) {
            &mut self.groups[pos]
        } else {
            self.groups.push(GroupNode {
                name: name.to_string(),
                ..GroupNode::default()
            });
            let last = self.groups.len() - 1;
            &mut self.groups[last]
        }
    }

    /// Sort this node's rows by the multi-key sort scheme (most significant
    /// key first) and its sub-groups by the grouping order of their level,
    /// then recurse.
    fn sort(&mut self, grouping: &[SchemeColumn], keys: &[SchemeColumn], depth: usize) {
        if !keys.is_empty() {
            let blank = Cell::default();
            self.rows.sort_by(|a, b| {
                keys.iter()
                    .map(|key| {
                        let left = a.cells.get(&key.title).unwrap_or(&blank);
                        let right = b.cells.get(&key.title).unwrap_or(&blank);
                        compare_cells(left, right, key.order)
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }
        if let Some(level) = grouping.get(depth) {
            if level.order.is_defined() {
                self.groups
                    .sort_by(|a, b| compare_str(&a.name, &b.name, level.order));
            }
        }
        for child in &mut self.groups {
            child.sort(grouping, keys, depth + 1);
        }
    }

    /// Assign the 1-based sibling positions, recursively.
    fn renumber(&mut self) {
        for (pos, row) in self.rows.iter_mut().enumerate() {
            row.index = pos as u32 + 1;
        }
        for child in &mut self.groups {
            child.renumber();
        }
    }
}

/// The complete parsed model of one worksheet.
#[derive(Debug, Clone, Serialize)]
pub struct SheetModel {
    /// The sheet name. May have been coerced into identifier form by the
    /// workbook driver.
    pub name: String,

    /// The grouping tree; ungrouped sheets hold all rows at this root.
    pub root: GroupNode,

    /// Errors and warnings counted while parsing this sheet.
    pub diagnostics: ErrorCounter,
}

/// Builder turning one [`SheetSource`] into a [`SheetModel`] per an optional
/// sheet template.
pub struct SheetModelBuilder<'a> {
    template: Option<&'a SheetTemplate>,
}

impl<'a> SheetModelBuilder<'a> {
    /// A builder applying the given template; `None` parses with default
    /// settings (first non-blank row as titles, no grouping, no sorting).
    #[must_use]
    pub fn new(template: Option<&'a SheetTemplate>) -> Self {
        Self { template }
    }

    /// Parse the sheet into its model.
    ///
    /// Detected conditions are counted into the per-sheet diagnostics and
    /// folded into `counter`; the identifier cache is shared across the
    /// workbook so names stay unambiguous between sheets.
    pub fn build(
        &self,
        source: &dyn SheetSource,
        idents: &mut IdentCache,
        counter: &mut ErrorCounter,
    ) -> SheetModel {
        let mut local = ErrorCounter::new();
        let mut registry =
            ColumnTitleRegistry::from_sheet(source, self.template, idents, &mut local);
        let grouping: Vec<SchemeColumn> = registry
            .grouping_scheme(&mut local)
            .map(<[SchemeColumn]>::to_vec)
            .unwrap_or_default();
        let keys: Vec<SchemeColumn> = registry
            .sort_scheme(&mut local)
            .map(<[SchemeColumn]>::to_vec)
            .unwrap_or_default();

        let mut root = GroupNode::default();
        for row in 0..source.row_count() {
            if registry.title_row() == Some(row) {
                continue;
            }
            if self.template.is_some_and(|t| !t.is_row_supported(row + 1)) {
                continue;
            }
            let Some((first, last)) = source.col_span(row) else {
                continue;
            };

            let mut record = RowRecord {
                row,
                ..RowRecord::default()
            };
            for col in first..=last {
                if self.template.is_some_and(|t| !t.is_col_supported(col + 1)) {
                    continue;
                }
                let cell = classify(source.cell(row, col), idents, &mut local);
                if !cell.is_not_blank() {
                    continue;
                }
                let title = registry.title(col, &mut local);
                record.cells.insert(title, cell);
            }
            if record.cells.is_empty() {
                continue;
            }

            // Descend the grouping tree; a blank grouping cell stops the
            // descent and the row stays at the level reached so far.
            let mut node = &mut root;
            for level in &grouping {
                let name = record
                    .cells
                    .get(&level.title)
                    .map_or("", |cell| cell.as_str().trim());
                if name.is_empty() {
                    break;
                }
                let name = name.to_string();
                node = node.child_mut(&name);
            }
            node.rows.push(record);
        }

        if local.is_clean() {
            root.sort(&grouping, &keys, 0);
        } else if !keys.is_empty() || grouping.iter().any(|g| g.order.is_defined()) {
            tracing::warn!(
                sheet = source.name(),
                errors = local.error_count(),
                "errors were counted for the sheet; sorting is not applied"
            );
        }
        root.renumber();

        counter.absorb(&local);
        SheetModel {
            name: source.name().to_string(),
            root,
            diagnostics: local,
        }
    }
}
