//! The workbook driver: template matching, per-sheet parsing, sheet-list
//! ordering and the overall diagnostics.

use std::path::Path;

use regex::Regex;
use serde::Serialize;
use sheetcast_model::{compare_str, ErrorCounter, IdentCache};

use crate::builder::{SheetModel, SheetModelBuilder};
use crate::config::{SheetTemplate, WorkbookConfig};
use crate::csv::CsvOptions;
use crate::error::{Result, SheetError};
use crate::source::SheetSource;
use crate::xlsx::XlsxBook;

/// The complete parsed model of one workbook, ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct WorkbookModel {
    /// The workbook name, usually the input file stem.
    pub name: String,

    /// The parsed sheets. Ordered per the configured sheet sort order, or in
    /// workbook order.
    pub sheets: Vec<SheetModel>,

    /// Errors and warnings accumulated across all sheets and the driver
    /// itself.
    pub diagnostics: ErrorCounter,
}

impl WorkbookModel {
    /// Narrow the model down to the sheet of the given name.
    pub fn select_sheet(&mut self, name: &str) -> Result<()> {
        if !self.sheets.iter().any(|s| s.name == name) {
            return Err(SheetError::SheetNotFound {
                name: name.to_string(),
            });
        }
        self.sheets.retain(|s| s.name == name);
        Ok(())
    }

    /// Render the model as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let rendered = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(rendered)
    }
}

/// Parser applying one [`WorkbookConfig`] to workbooks.
#[derive(Debug, Clone, Default)]
pub struct WorkbookParser {
    config: WorkbookConfig,
}

/// A template with its pre-compiled tab name expression.
struct CompiledTemplate<'a> {
    template: &'a SheetTemplate,
    tab: Option<Regex>,
    matched: bool,
}

impl WorkbookParser {
    /// A parser for the given configuration.
    #[must_use]
    pub fn new(config: WorkbookConfig) -> Self {
        Self { config }
    }

    /// Parse an input file, dispatching on the file extension: `.xlsx` and
    /// `.xlsm` load as Excel workbooks, `.csv` and `.tsv` as single-sheet
    /// workbooks named after the file.
    pub fn parse_path<P: AsRef<Path>>(&self, path: P) -> Result<WorkbookModel> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("workbook")
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx" | "xlsm") => {
                let book = XlsxBook::open(path)?;
                self.parse(&name, book.sheets())
            }
            Some("csv") => {
                let sheet = CsvOptions::default().read_path(path)?;
                self.parse(&name, std::slice::from_ref(&sheet))
            }
            Some("tsv") => {
                let sheet = CsvOptions::tsv().read_path(path)?;
                self.parse(&name, std::slice::from_ref(&sheet))
            }
            _ => Err(SheetError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    /// Parse a list of sheets as one workbook.
    ///
    /// With templates configured, each sheet is parsed with the first
    /// template matching it and unmatched sheets are skipped; a template
    /// matching no sheet at all counts as an error. Without templates every
    /// sheet is parsed with default settings.
    pub fn parse<S: SheetSource>(&self, name: &str, sources: &[S]) -> Result<WorkbookModel> {
        let mut templates = self.compile_templates()?;
        let mut idents = IdentCache::new();
        let mut counter = ErrorCounter::new();
        let mut sheets = Vec::new();

        for (pos, source) in sources.iter().enumerate() {
            let template = if templates.is_empty() {
                None
            } else {
                match Self::match_template(&mut templates, source.name(), pos as u32 + 1) {
                    Some(template) => Some(template),
                    None => {
                        tracing::info!(
                            sheet = source.name(),
                            "no sheet template matches; the sheet is not parsed"
                        );
                        continue;
                    }
                }
            };

            let mut model = SheetModelBuilder::new(template).build(source, &mut idents, &mut counter);
            if self.config.sheet_names_are_identifiers {
                let coerced = idents.identify(&model.name, false, &mut counter);
                if coerced != model.name {
                    tracing::info!(
                        from = model.name.as_str(),
                        to = coerced.as_str(),
                        "worksheet name modified to make it an identifier"
                    );
                    model.name = coerced;
                }
            }
            sheets.push(model);
        }

        for unmatched in templates.iter().filter(|t| !t.matched) {
            counter.error();
            tracing::error!(
                tab = unmatched.template.tab.as_deref().unwrap_or(""),
                index = unmatched.template.index,
                "sheet template doesn't match any sheet of the workbook"
            );
        }

        if self.config.sort_sheets.is_defined() {
            if counter.is_clean() {
                let order = self.config.sort_sheets;
                sheets.sort_by(|a, b| compare_str(&a.name, &b.name, order));
            } else {
                tracing::warn!(
                    errors = counter.error_count(),
                    "errors were counted for the workbook; the sheet list is not sorted"
                );
            }
        }

        Ok(WorkbookModel {
            name: name.to_string(),
            sheets,
            diagnostics: counter,
        })
    }

    fn compile_templates(&self) -> Result<Vec<CompiledTemplate<'_>>> {
        self.config
            .sheets
            .iter()
            .map(|template| {
                let tab = match &template.tab {
                    Some(pattern) => {
                        // Tab names match whole-string, like column titles.
                        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                            SheetError::Config(format!("bad tab name expression {pattern:?}: {e}"))
                        })?;
                        Some(regex)
                    }
                    None => None,
                };
                Ok(CompiledTemplate {
                    template,
                    tab,
                    matched: false,
                })
            })
            .collect()
    }

    /// The first template matching the sheet, by tab name expression, by
    /// 1-based workbook position, or unconditionally when the template
    /// addresses neither.
    fn match_template<'a>(
        templates: &mut [CompiledTemplate<'a>],
        name: &str,
        position: u32,
    ) -> Option<&'a SheetTemplate> {
        for compiled in templates.iter_mut() {
            let hit = match (&compiled.tab, compiled.template.index) {
                (Some(regex), _) => regex.is_match(name),
                (None, Some(index)) => index == position,
                (None, None) => true,
            };
            if hit {
                compiled.matched = true;
                return Some(compiled.template);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySheet;
    use sheetcast_model::{RawCell, RawValue, SortOrder};

    fn text(s: &str) -> RawCell {
        RawCell {
            value: RawValue::Text(s.to_string()),
            ..RawCell::default()
        }
    }

    fn sheet(name: &str) -> MemorySheet {
        MemorySheet::new(name, vec![vec![text("A")], vec![text("x")]])
    }

    #[test]
    fn all_sheets_parse_without_templates() {
        let parser = WorkbookParser::default();
        let model = parser
            .parse("book", &[sheet("one"), sheet("two")])
            .expect("parses");
        assert!(model.diagnostics.is_clean());
        assert_eq!(model.sheets.len(), 2);
        assert_eq!(model.sheets[0].name, "one");
    }

    #[test]
    fn sheet_list_sorts_by_name() {
        let config = WorkbookConfig {
            sort_sheets: SortOrder::Lexical,
            ..WorkbookConfig::default()
        };
        let model = WorkbookParser::new(config)
            .parse("book", &[sheet("beta"), sheet("Alpha")])
            .expect("parses");
        let names: Vec<&str> = model.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta"]);
    }

    #[test]
    fn templates_select_sheets_by_tab_expression() {
        let config = WorkbookConfig {
            sheets: vec![SheetTemplate {
                tab: Some("Data.*".to_string()),
                ..SheetTemplate::default()
            }],
            ..WorkbookConfig::default()
        };
        let model = WorkbookParser::new(config)
            .parse("book", &[sheet("Data2024"), sheet("Notes")])
            .expect("parses");
        assert!(model.diagnostics.is_clean());
        // "Notes" matches no template and is skipped.
        assert_eq!(model.sheets.len(), 1);
        assert_eq!(model.sheets[0].name, "Data2024");
    }

    #[test]
    fn tab_expression_is_anchored() {
        let config = WorkbookConfig {
            sheets: vec![SheetTemplate {
                tab: Some("Data".to_string()),
                ..SheetTemplate::default()
            }],
            ..WorkbookConfig::default()
        };
        let model = WorkbookParser::new(config)
            .parse("book", &[sheet("Data2024")])
            .expect("parses");
        // No substring match, so the template matched nothing: an error.
        assert_eq!(model.sheets.len(), 0);
        assert_eq!(model.diagnostics.error_count(), 1);
    }

    #[test]
    fn templates_select_sheets_by_position() {
        let config = WorkbookConfig {
            sheets: vec![SheetTemplate {
                index: Some(2),
                ..SheetTemplate::default()
            }],
            ..WorkbookConfig::default()
        };
        let model = WorkbookParser::new(config)
            .parse("book", &[sheet("one"), sheet("two")])
            .expect("parses");
        assert_eq!(model.sheets.len(), 1);
        assert_eq!(model.sheets[0].name, "two");
    }

    #[test]
    fn bad_tab_expression_is_a_config_error() {
        let config = WorkbookConfig {
            sheets: vec![SheetTemplate {
                tab: Some("Data[".to_string()),
                ..SheetTemplate::default()
            }],
            ..WorkbookConfig::default()
        };
        let result = WorkbookParser::new(config).parse("book", &[sheet("Data")]);
        assert!(matches!(result, Err(SheetError::Config(_))));
    }

    #[test]
    fn sheet_names_coerce_to_identifiers() {
        let config = WorkbookConfig {
            sheet_names_are_identifiers: true,
            ..WorkbookConfig::default()
        };
        let model = WorkbookParser::new(config)
            .parse("book", &[sheet("Q1 report")])
            .expect("parses");
        assert_eq!(model.sheets[0].name, "Q1_report");
    }

    #[test]
    fn sheet_selection_by_name() {
        let parser = WorkbookParser::default();
        let mut model = parser
            .parse("book", &[sheet("one"), sheet("two")])
            .expect("parses");
        model.select_sheet("two").expect("sheet exists");
        assert_eq!(model.sheets.len(), 1);
        assert_eq!(model.sheets[0].name, "two");
        assert!(matches!(
            model.select_sheet("three"),
            Err(SheetError::SheetNotFound { .. })
        ));
    }

    #[test]
    fn model_serializes_to_json() {
        let parser = WorkbookParser::default();
        let model = parser.parse("book", &[sheet("one")]).expect("parses");
        let json = model.to_json(false).expect("serializes");
        assert!(json.contains("\"name\":\"book\""));
        assert!(json.contains("\"sheets\""));
    }
}
