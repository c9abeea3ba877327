//! Load → flatten → edit → rebuild → save, across the document formats.

use harfnegar::{transform_records, Document, Format, Record, Shaper};
use std::fs;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

struct Marker;
impl Shaper for Marker {
    fn shape(&self, text: &str) -> String {
        format!("«{text}»")
    }
}

#[test]
fn po_catalog_full_cycle() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        &dir,
        "app.po",
        concat!(
            "msgid \"\"\n",
            "msgstr \"Language: fa\\n\"\n",
            "\n",
            "# toolbar\n",
            "msgid \"Open...\"\n",
            "msgstr \"باز کردن...\"\n",
            "\n",
            "#, fuzzy\n",
            "msgid \"Exit\"\n",
            "msgstr \"خروج\"\n",
        ),
    );

    let mut document = Document::load(&path).unwrap();
    let mut records = document.records();
    assert_eq!(records.len(), 2);
    // the source id carries dots, so the path grammar quotes it
    assert_eq!(records[0].path.to_string(), "\"Open...\"");
    assert_eq!(records[0].comment.as_deref(), Some("toolbar"));
    assert!(records[1].flags.contains("fuzzy"));

    // edit out of order; the save must still land on the right entries
    records.reverse();
    records[0].value = "بستن".to_string();
    records[1].value = "گشودن".to_string();

    document.apply_records(&records).unwrap();
    document.save(&path).unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("msgid \"Open...\""));
    assert!(saved.contains("msgstr \"گشودن\""));
    assert!(saved.contains("msgstr \"بستن\""));
    assert!(saved.contains("Language: fa"));

    // source ids are the join key, so order in the file is untouched
    let reloaded = Document::load(&path).unwrap();
    let paths: Vec<String> = reloaded
        .records()
        .iter()
        .map(|r| r.path.to_string())
        .collect();
    assert_eq!(paths, ["\"Open...\"", "Exit"]);
}

#[test]
fn json_document_transform_cycle() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        &dir,
        "ui.json",
        "{\"title\": \"سلام\", \"count\": 2, \"menu\": [\"باز\", \"خروج\"]}",
    );

    let mut document = Document::load(&path).unwrap();
    let mut records = document.records();
    let summary = transform_records(&mut records, None, &[], &Marker).unwrap();
    assert_eq!(summary.transformed, 4);

    document.apply_records(&records).unwrap();
    document.save(&path).unwrap();

    let reloaded = Document::load(&path).unwrap();
    let values: Vec<String> = reloaded
        .records()
        .iter()
        .map(|r| r.value.clone())
        .collect();
    assert_eq!(values, ["«سلام»", "«2»", "«باز»", "«خروج»"]);
}

#[test]
fn yaml_document_cycle() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "strings.yaml", "app:\n  greeting: سلام\n  farewell: خداحافظ\n");

    let mut document = Document::load(&path).unwrap();
    let mut records = document.records();
    assert_eq!(records[0].path.to_string(), "app.greeting");

    records[0].value = "درود".to_string();
    document.apply_records(&records).unwrap();
    document.save(&path).unwrap();

    let reloaded = Document::load(&path).unwrap();
    assert_eq!(reloaded.records()[0].value, "درود");
    assert_eq!(reloaded.records()[1].value, "خداحافظ");
}

#[test]
fn xml_document_cycle_with_attributes_and_siblings() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        &dir,
        "menu.xml",
        "<menu id=\"main\"><item key=\"open\">باز کردن</item><item key=\"exit\">خروج</item></menu>",
    );

    let mut document = Document::load(&path).unwrap();
    let records = document.records();
    let paths: Vec<String> = records.iter().map(|r| r.path.to_string()).collect();
    assert_eq!(
        paths,
        [
            "menu[@id]",
            "menu.item[0][@key]",
            "menu.item[0].#text",
            "menu.item[1][@key]",
            "menu.item[1].#text",
        ]
    );

    let mut records = records;
    records[2].value = "گشودن".to_string();
    document.apply_records(&records).unwrap();
    document.save(&path).unwrap();

    let reloaded = Document::load(&path).unwrap();
    let paths_after: Vec<String> = reloaded
        .records()
        .iter()
        .map(|r| r.path.to_string())
        .collect();
    assert_eq!(paths, paths_after);
    assert_eq!(reloaded.records()[2].value, "گشودن");
}

#[test]
fn format_override_beats_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "data.yaml", "{\"a\": \"1\"}");
    // JSON is valid YAML, but the override must be honored as JSON
    let document = Document::load_as(Format::Json, &path).unwrap();
    assert_eq!(document.format(), Format::Json);
    assert_eq!(document.records()[0].value, "1");
}

#[test]
fn scalar_types_collapse_to_strings_by_design() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "conf.json", "{\"port\": 8080, \"debug\": false}");

    let mut document = Document::load(&path).unwrap();
    let records: Vec<Record> = document.records();
    document.apply_records(&records).unwrap();
    document.save(&path).unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("\"port\": \"8080\""));
    assert!(saved.contains("\"debug\": \"false\""));
}
