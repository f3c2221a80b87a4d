//! End-to-end tests of the workbook pipeline: configuration document in,
//! typed and sorted model out.

use sheetcast_model::{Cell, RawCell, RawValue};
use sheetcast_sheet::{MemorySheet, WorkbookConfig, WorkbookParser};

fn text(s: &str) -> RawCell {
    RawCell {
        value: RawValue::Text(s.to_string()),
        ..RawCell::default()
    }
}

#[test]
fn csv_file_with_grouping_and_sorting() {
    let dir = tempfile::tempdir().expect("temp dir");
    let csv_path = dir.path().join("inventory.csv");
    std::fs::write(
        &csv_path,
        "Cat,Name,Qty\nfruit,apple,12\nveg,leek,7\nfruit,pear,3\n",
    )
    .expect("write CSV");
    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        r#"
sheets:
  - columns:
      - title: Cat
        grouping: true
        sortOrder: lexical
      - title: Qty
        sortOrder: numerical
"#,
    )
    .expect("write config");

    let config = WorkbookConfig::from_path(&config_path).expect("config loads");
    let model = WorkbookParser::new(config)
        .parse_path(&csv_path)
        .expect("workbook parses");

    assert!(model.diagnostics.is_clean());
    assert_eq!(model.name, "inventory");
    assert_eq!(model.sheets.len(), 1);

    let sheet = &model.sheets[0];
    assert_eq!(sheet.name, "inventory");
    let groups: Vec<&str> = sheet.root.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(groups, vec!["fruit", "veg"]);

    // Rows within the group come out by rising quantity.
    let fruit = sheet.root.group("fruit").expect("group exists");
    let names: Vec<&str> = fruit
        .rows
        .iter()
        .map(|r| r.cell("Name").map_or("", Cell::as_str))
        .collect();
    assert_eq!(names, vec!["pear", "apple"]);
    assert_eq!(fruit.rows[0].cell("Qty").and_then(|c| c.int), Some(3));
}

#[test]
fn sort_priority_ranks_the_keys() {
    let yaml = r#"
sheets:
  - columns:
      - title: Minor
        sortOrder: lexical
      - title: Major
        sortOrder: lexical
        priority: 5
"#;
    let config: WorkbookConfig = serde_yaml::from_str(yaml).expect("valid config");
    let sheet = MemorySheet::new(
        "data",
        vec![
            vec![text("Minor"), text("Major")],
            vec![text("z"), text("beta")],
            vec![text("a"), text("beta")],
            vec![text("m"), text("alpha")],
        ],
    );
    let model = WorkbookParser::new(config)
        .parse("book", std::slice::from_ref(&sheet))
        .expect("workbook parses");

    assert!(model.diagnostics.is_clean());
    // "Major" carries the explicit priority and becomes the primary key;
    // ties fall through to "Minor".
    let minors: Vec<&str> = model.sheets[0]
        .root
        .rows
        .iter()
        .map(|r| r.cell("Minor").map_or("", Cell::as_str))
        .collect();
    assert_eq!(minors, vec!["m", "a", "z"]);
}

#[test]
fn sheet_name_identifiers_stay_unambiguous() {
    let yaml = "sheetNamesAreIdentifiers: true\n";
    let config: WorkbookConfig = serde_yaml::from_str(yaml).expect("valid config");
    let sheets = vec![
        MemorySheet::new("My Sheet", vec![vec![text("A")]]),
        MemorySheet::new("My\tSheet", vec![vec![text("A")]]),
    ];
    let model = WorkbookParser::new(config)
        .parse("book", &sheets)
        .expect("workbook parses");
    let names: Vec<&str> = model.sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["My_Sheet", "My_Sheet_1"]);
}

#[test]
fn model_renders_as_json_tree() {
    let sheet = MemorySheet::new(
        "data",
        vec![
            vec![text("Name"), text("Qty")],
            vec![
                text("Widget"),
                RawCell {
                    value: RawValue::Number(3.0),
                    ..RawCell::default()
                },
            ],
        ],
    );
    let model = WorkbookParser::default()
        .parse("book", std::slice::from_ref(&sheet))
        .expect("workbook parses");
    let json = model.to_json(true).expect("serializes");

    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    let row = &parsed["sheets"][0]["root"]["rows"][0];
    assert_eq!(row["cells"]["Name"]["kind"], "text");
    assert_eq!(row["cells"]["Qty"]["kind"], "integer");
    assert_eq!(row["cells"]["Qty"]["int"], 3);
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("input.pdf");
    std::fs::write(&path, b"not a workbook").expect("write file");
    let result = WorkbookParser::default().parse_path(&path);
    assert!(result.is_err());
}
