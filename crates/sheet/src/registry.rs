//! Management of column titles, which double as the property names of the
//! row objects in the produced model.
//!
//! - Titles are read from the sheet's title row
//! - Titles can be set explicitly through column attribute specifications
//! - Anonymous columns get generic, disambiguated names
//! - Grouping and sorting schemes are recorded and finalized on first read

use std::collections::HashSet;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use sheetcast_model::{ErrorCounter, IdentCache, RawValue, SortOrder};

use crate::config::{ColumnSpec, SheetTemplate, TitleRowSelector};
use crate::source::SheetSource;

/// Bound on attempts to disambiguate a generic column title.
const MAX_DISAMBIGUATION_ATTEMPTS: u32 = 10_000;

/// One finalized entry of the grouping or sorting scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeColumn {
    /// 0-based column index in the sheet.
    pub index: u32,

    /// The finalized column title, which is the property name of the column
    /// in row objects.
    pub title: String,

    /// The sort order attached to this scheme entry.
    pub order: SortOrder,

    /// The sort priority; -1 for grouping columns and pseudo-priority
    /// entries.
    pub priority: i32,
}

/// A recorded but not yet finalized scheme entry. Titles are attached on
/// first read of the scheme, not at record time, because a column may still
/// be anonymous when it is first flagged.
#[derive(Debug, Clone, Copy)]
struct PendingColumn {
    index: u32,
    order: SortOrder,
    priority: i32,
}

/// A scheme list with its memoized finalization.
#[derive(Debug, Default)]
struct Scheme {
    pending: Vec<PendingColumn>,
    resolved: Option<Vec<SchemeColumn>>,
}

/// Owner of the column-index-to-title mapping of one worksheet.
///
/// Constructed once per sheet, before any data row is processed: every data
/// cell's property name and every row's sort key depend on the finalized
/// registry.
#[derive(Debug)]
pub struct ColumnTitleRegistry {
    titles: IndexMap<u32, String>,
    title_row: Option<u32>,
    grouping: Scheme,
    sorting: Scheme,
}

impl ColumnTitleRegistry {
    /// Build the registry for one sheet: read the title row, apply the
    /// user-specified column attributes, record the grouping and sorting
    /// schemes.
    pub fn from_sheet(
        source: &dyn SheetSource,
        template: Option<&SheetTemplate>,
        idents: &mut IdentCache,
        counter: &mut ErrorCounter,
    ) -> Self {
        let mut registry = Self {
            titles: IndexMap::new(),
            title_row: None,
            grouping: Scheme::default(),
            sorting: Scheme::default(),
        };
        registry.read_titles(source, template, idents, counter);
        if let Some(template) = template {
            registry.apply_column_specs(&template.columns, counter);
        }
        registry
    }

    /// The resolved 0-based title row, if one was found.
    #[must_use]
    pub fn title_row(&self) -> Option<u32> {
        self.title_row
    }

    /// Find the title row per the template's selector and take every usable
    /// string cell in it as a column title.
    fn read_titles(
        &mut self,
        source: &dyn SheetSource,
        template: Option<&SheetTemplate>,
        idents: &mut IdentCache,
        counter: &mut ErrorCounter,
    ) {
        let selector = template.map_or(TitleRowSelector::FirstNonBlank, |t| t.title_row);
        if selector == TitleRowSelector::None {
            tracing::info!(sheet = source.name(), "no title row is read from the sheet");
            return;
        }

        let row = self.locate_title_row(source, selector);
        let Some(row) = row else {
            counter.error();
            tracing::error!(
                sheet = source.name(),
                ?selector,
                "the row specified to hold the column titles doesn't exist in the sheet"
            );
            return;
        };
        self.title_row = Some(row);

        let mut titles_found = 0u32;
        if let Some((first, last)) = source.col_span(row) {
            for col in first..=last {
                // The supported area is configured in 1-based indexes.
                if let Some(template) = template {
                    if !template.is_col_supported(col + 1) {
                        continue;
                    }
                }
                if let Some(title) = Self::title_from_cell(source, row, col, counter) {
                    titles_found += 1;
                    let title = if template.is_some_and(|t| t.titles_are_identifiers) {
                        let coerced = idents.identify(&title, false, counter);
                        if coerced != title {
                            tracing::info!(
                                row = row + 1,
                                col = col + 1,
                                from = title.as_str(),
                                to = coerced.as_str(),
                                "column title modified to make it an identifier"
                            );
                        }
                        coerced
                    } else {
                        title
                    };
                    self.titles.insert(col, title);
                }
            }
        }

        if titles_found == 0 {
            counter.error();
            tracing::error!(
                sheet = source.name(),
                row = row + 1,
                "the row specified to hold the column titles doesn't contain valid cells"
            );
        }
    }

    /// Resolve the title row selector to a 0-based row index.
    fn locate_title_row(&self, source: &dyn SheetSource, selector: TitleRowSelector) -> Option<u32> {
        match selector {
            TitleRowSelector::None => None,
            TitleRowSelector::At(one_based) => {
                let row = one_based.checked_sub(1)?;
                (row < source.row_count() && source.col_span(row).is_some()).then_some(row)
            }
            TitleRowSelector::FirstNonBlank => {
                let row = (0..source.row_count()).find(|&r| source.col_span(r).is_some())?;
                tracing::info!(row = row + 1, "row is used as column title row");
                Some(row)
            }
        }
    }

    /// Evaluate one title row cell. Only a non-blank string yields a title;
    /// boolean or numeric contents are a warning and the column falls back
    /// to a generic title later.
    fn title_from_cell(
        source: &dyn SheetSource,
        row: u32,
        col: u32,
        counter: &mut ErrorCounter,
    ) -> Option<String> {
        match source.cell(row, col).value {
            RawValue::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            RawValue::Bool(_) | RawValue::Number(_) => {
                counter.warning();
                tracing::warn!(
                    row = row + 1,
                    col = col + 1,
                    "cell is specified to contain the column title but is not of string \
                     type; a generic column name will be used instead"
                );
                None
            }
            RawValue::Unevaluable => {
                counter.warning();
                tracing::warn!(
                    row = row + 1,
                    col = col + 1,
                    "cell is specified to contain the column title but can't be \
                     evaluated; a generic column name will be used instead"
                );
                None
            }
            RawValue::Error | RawValue::Blank => None,
        }
    }

    /// Apply the user-specified column attributes in declaration order.
    ///
    /// The regular expressions are matched against a frozen snapshot of the
    /// sheet-derived titles, so a later alias can't be re-matched by an
    /// earlier expression.
    fn apply_column_specs(&mut self, specs: &[ColumnSpec], counter: &mut ErrorCounter) {
        let originals: Vec<(u32, String)> = self
            .titles
            .iter()
            .map(|(&idx, title)| (idx, title.clone()))
            .collect();
        let mut visited: HashSet<u32> = HashSet::new();

        for spec in specs {
            let Some(index) = Self::resolve_spec_target(spec, &originals, counter) else {
                continue;
            };

            if !visited.insert(index) {
                counter.error();
                tracing::error!(
                    spec = %spec,
                    col = index + 1,
                    "the attributes of this column had already been specified before"
                );
                continue;
            }

            if let Some(name) = &spec.name {
                self.put_title(index, name.clone());
            }

            if spec.grouping {
                self.grouping.pending.push(PendingColumn {
                    index,
                    order: spec.sort_order,
                    priority: -1,
                });
            } else if spec.sort_order.is_defined() {
                self.record_sorted_property(index, spec.sort_order, spec.priority);
            }
        }
    }

    /// Resolve one specification to a 0-based column index, or `None` when
    /// the specification has to be skipped.
    fn resolve_spec_target(
        spec: &ColumnSpec,
        originals: &[(u32, String)],
        counter: &mut ErrorCounter,
    ) -> Option<u32> {
        match (&spec.title, spec.index) {
            (Some(pattern), None) => {
                // Whole-string matching: substring hits don't count.
                let regex = match Regex::new(&format!("^(?:{pattern})$")) {
                    Ok(regex) => regex,
                    Err(err) => {
                        counter.error();
                        tracing::error!(
                            spec = %spec,
                            error = %err,
                            "column attribute specification refers to a column title by a \
                             bad regular expression"
                        );
                        return None;
                    }
                };
                let matches: Vec<u32> = originals
                    .iter()
                    .filter(|(_, title)| regex.is_match(title))
                    .map(|&(idx, _)| idx)
                    .collect();
                if matches.len() == 1 {
                    Some(matches[0])
                } else {
                    counter.error();
                    tracing::error!(
                        spec = %spec,
                        matches = matches.len(),
                        "an unambiguous match of the column title is required"
                    );
                    None
                }
            }
            (None, Some(one_based)) => {
                if let Some(index) = one_based.checked_sub(1) {
                    Some(index)
                } else {
                    counter.error();
                    tracing::error!(spec = %spec, "column indexes are 1-based");
                    None
                }
            }
            _ => {
                counter.error();
                tracing::error!(
                    spec = %spec,
                    "a column is addressed either by title or by index, one of both but \
                     not both at a time"
                );
                None
            }
        }
    }

    /// Put a title into the map. Superseding an existing association is
    /// reported as informative feedback.
    fn put_title(&mut self, index: u32, title: String) {
        if let Some(previous) = self.titles.insert(index, title.clone()) {
            if previous != title {
                tracing::info!(
                    col = index + 1,
                    from = previous.as_str(),
                    to = title.as_str(),
                    "user-specified column title aliases a title read from the sheet"
                );
            }
        }
    }

    /// Insert a sorted property column into the sort scheme.
    ///
    /// The scheme is kept in order of sort priority. A pseudo priority (non
    /// positive value) means "rank by order of declaration among pseudo
    /// entries" and such entries go to the very front. An explicit priority
    /// scans for its position: it may not overtake an entry of equal or
    /// larger real priority, and it drags skipped pseudo entries along only
    /// when forced beyond a larger real priority.
    fn record_sorted_property(&mut self, index: u32, order: SortOrder, priority: i32) {
        let scheme = &mut self.sorting.pending;
        if priority <= 0 {
            scheme.insert(
                0,
                PendingColumn {
                    index,
                    order,
                    priority: -1,
                },
            );
            return;
        }

        let mut position = 0;
        loop {
            // Look ahead for the next entry carrying a real priority.
            let next_real = scheme[position..]
                .iter()
                .enumerate()
                .find(|(_, entry)| entry.priority > 0)
                .map(|(offset, entry)| (position + offset, entry.priority));
            match next_real {
                Some((real_pos, real_priority)) if real_priority > priority => {
                    // Not yet the right position; advance past that entry,
                    // carrying the skipped pseudo entries along with it.
                    position = real_pos + 1;
                }
                _ => {
                    scheme.insert(position, PendingColumn { index, order, priority });
                    return;
                }
            }
        }
    }

    /// Generate a generic, unambiguous title for an anonymous column and
    /// record it in the map.
    fn create_generic_title(&mut self, index: u32, counter: &mut ErrorCounter) -> String {
        let stem = format!("Col{}", index + 1);
        let mut candidate = stem.clone();
        let mut attempt: u32 = 0;
        while self.titles.values().any(|title| *title == candidate) {
            attempt += 1;
            if attempt > MAX_DISAMBIGUATION_ATTEMPTS {
                counter.error();
                tracing::error!(
                    col = index + 1,
                    "no unambiguous generic title could be found; the name clash with \
                     another column disables safe data access from the model"
                );
                break;
            }
            candidate = format!("{stem}_{attempt}");
        }
        self.titles.insert(index, candidate.clone());
        candidate
    }

    /// The title of a column. Never fails: an anonymous column gets a
    /// generic title, which is recorded so repeated queries are stable and
    /// participate in future disambiguation.
    pub fn title(&mut self, index: u32, counter: &mut ErrorCounter) -> String {
        if let Some(title) = self.titles.get(&index) {
            return title.clone();
        }
        let title = self.create_generic_title(index, counter);
        counter.warning();
        tracing::warn!(
            col = index + 1,
            title = title.as_str(),
            "no title has been found or specified for the column; a generic name is used"
        );
        title
    }

    /// The grouping scheme: the ordered list of columns whose distinct
    /// values define the nested partition levels, outermost first.
    ///
    /// Titles are attached on the first call; later calls are pure reads.
    /// `None` when no grouping columns were specified — the caller applies
    /// no grouping then.
    pub fn grouping_scheme(&mut self, counter: &mut ErrorCounter) -> Option<&[SchemeColumn]> {
        if self.grouping.resolved.is_none() && !self.grouping.pending.is_empty() {
            let entries = self.resolve(&self.grouping.pending.clone(), counter);
            self.grouping.resolved = Some(entries);
        }
        self.grouping.resolved.as_deref()
    }

    /// The sort scheme: the ordered list of sorted property columns, most
    /// significant key first. Memoized like [`Self::grouping_scheme`].
    pub fn sort_scheme(&mut self, counter: &mut ErrorCounter) -> Option<&[SchemeColumn]> {
        if self.sorting.resolved.is_none() && !self.sorting.pending.is_empty() {
            let entries = self.resolve(&self.sorting.pending.clone(), counter);
            self.sorting.resolved = Some(entries);
        }
        self.sorting.resolved.as_deref()
    }

    fn resolve(&mut self, pending: &[PendingColumn], counter: &mut ErrorCounter) -> Vec<SchemeColumn> {
        pending
            .iter()
            .map(|entry| SchemeColumn {
                index: entry.index,
                title: self.title(entry.index, counter),
                order: entry.order,
                priority: entry.priority,
            })
            .collect()
    }
}
