use calamine::{open_workbook, Data, Reader, Xlsx};
use feuille_sheet::{Book, CellValue, RecordingReport, Sheet, SheetError, Workbook};
use rust_xlsxwriter::Format;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tempfile::tempdir;

fn feuille1() -> Sheet {
    Sheet::from_data(vec![
        vec![CellValue::from("A"), CellValue::from("B")],
        vec![CellValue::Int(1), CellValue::from("one")],
        vec![CellValue::Int(2), CellValue::from("two")],
        vec![CellValue::Int(3), CellValue::from("three")],
    ])
}

fn create_workbook(path: &Path) {
    let mut book = Book::new();
    book.add_sheet("Feuille1", feuille1()).unwrap();
    book.add_sheet("Notes", Sheet::from_data(vec![vec!["Text"], vec!["hello"]]))
        .unwrap();
    book.save_as_xlsx(path).unwrap();
}

// ===== Sheet Round Trips =====

#[test]
fn test_write_sheet_then_read_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_workbook(&path);

    let mut table = Sheet::from_data(vec![
        vec![CellValue::from("City"), CellValue::from("Population"), CellValue::from("Capital")],
        vec![CellValue::from("Paris"), CellValue::Int(2_100_000), CellValue::Bool(true)],
        vec![CellValue::from("Lyon"), CellValue::Int(520_000), CellValue::Bool(false)],
    ]);
    table.name_columns_by_header().unwrap();

    let report = RecordingReport::new();
    let workbook = Workbook::with_report(&path, &report);
    assert!(workbook.write_sheet(&table, "Feuille2").unwrap());

    let loaded = workbook.read_sheet(Some("Feuille2")).unwrap().unwrap();
    assert_eq!(loaded.column_names(), table.column_names());
    assert_eq!(loaded.record_count(), 2);
    assert_eq!(loaded.record(1, "City").unwrap(), &CellValue::from("Paris"));
    assert_eq!(loaded.record(2, "Population").unwrap(), &CellValue::Int(520_000));
    assert_eq!(loaded.record(2, "Capital").unwrap(), &CellValue::Bool(false));

    assert_eq!(
        report.notices(),
        vec![format!("Data written to {}.", path.display())]
    );
}

#[test]
fn test_write_sheet_keeps_other_sheets_and_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_workbook(&path);

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    let mut replacement = Sheet::from_data(vec![vec!["A", "B"], vec!["x", "y"]]);
    replacement.name_columns_by_header().unwrap();
    assert!(workbook.write_sheet(&replacement, "Feuille1").unwrap());
    assert!(workbook.write_sheet(&replacement, "Extra").unwrap());

    assert_eq!(
        workbook.list_sheet_names().unwrap(),
        vec!["Feuille1".to_string(), "Notes".to_string(), "Extra".to_string()]
    );
    let notes = workbook.read_sheet(Some("Notes")).unwrap().unwrap();
    assert_eq!(notes.record(1, "Text").unwrap(), &CellValue::from("hello"));

    let replaced = workbook.read_sheet(Some("Feuille1")).unwrap().unwrap();
    assert_eq!(replaced.record_count(), 1);
}

/// "Feuille1" at A1, "Offset" with its data starting at B3 and "Dates"
/// holding a date-formatted cell
fn create_positioned_workbook(path: &Path) {
    let mut workbook = rust_xlsxwriter::Workbook::new();

    let first = workbook.add_worksheet();
    first.set_name("Feuille1").unwrap();
    first.write_string(0, 0, "A").unwrap();
    first.write_string(0, 1, "B").unwrap();
    first.write_number(1, 0, 1.0).unwrap();
    first.write_number(1, 1, 10.0).unwrap();

    let offset = workbook.add_worksheet();
    offset.set_name("Offset").unwrap();
    offset.write_string(2, 1, "label").unwrap();
    offset.write_number(3, 1, 7.0).unwrap();

    let dates = workbook.add_worksheet();
    dates.set_name("Dates").unwrap();
    dates.write_string(0, 0, "Day").unwrap();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    dates
        .write_number_with_format(1, 0, 45_000.0, &date_format)
        .unwrap();

    workbook.save(path).unwrap();
}

fn range_of(path: &Path, sheet: &str) -> calamine::Range<Data> {
    let mut xlsx: Xlsx<BufReader<File>> = open_workbook(path).unwrap();
    xlsx.worksheet_range(sheet).unwrap()
}

#[test]
fn test_write_cell_keeps_other_sheet_positions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_positioned_workbook(&path);
    assert_eq!(range_of(&path, "Offset").start(), Some((2, 1)));

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    assert!(workbook.write_cell("Feuille1", 1, "B", 42).unwrap());

    let offset = range_of(&path, "Offset");
    assert_eq!(offset.start(), Some((2, 1)));
    assert_eq!(
        offset.get_value((2, 1)),
        Some(&Data::String("label".to_string()))
    );
    assert_eq!(offset.get_value((3, 1)), Some(&Data::Float(7.0)));
    assert_eq!(
        workbook.read_cell("Feuille1", 1, "B").unwrap().as_deref(),
        Some("42")
    );
}

#[test]
fn test_write_sheet_keeps_other_sheet_positions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_positioned_workbook(&path);

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    let mut table = Sheet::from_data(vec![vec!["X"], vec!["y"]]);
    table.name_columns_by_header().unwrap();
    assert!(workbook.write_sheet(&table, "Feuille2").unwrap());

    assert_eq!(range_of(&path, "Offset").start(), Some((2, 1)));
}

#[test]
fn test_rewrite_keeps_date_serial_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_positioned_workbook(&path);

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    assert!(workbook.write_cell("Feuille1", 1, "A", 5).unwrap());

    // formatting is dropped, the serial number stays
    let dates = workbook.read_sheet(Some("Dates")).unwrap().unwrap();
    assert_eq!(dates.record(1, "Day").unwrap(), &CellValue::Int(45_000));
}

#[test]
fn test_write_sheet_default_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_workbook(&path);

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    let table = Sheet::from_data(vec![vec![1, 2], vec![3, 4]]);
    assert!(workbook
        .write_sheet(&table, feuille_sheet::DEFAULT_SHEET_NAME)
        .unwrap());

    let loaded = workbook.read_sheet(Some("Sheet1")).unwrap().unwrap();
    assert_eq!(
        loaded.column_names().unwrap(),
        &vec!["0".to_string(), "1".to_string()]
    );
    assert_eq!(loaded.record_count(), 2);
}

#[test]
fn test_read_first_sheet_by_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_workbook(&path);

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    let sheet = workbook.read_sheet(None).unwrap().unwrap();
    assert_eq!(sheet.name(), "Feuille1");
    assert_eq!(sheet.record_count(), 3);
}

// ===== Cell Access =====

#[test]
fn test_write_cell_then_read_cell() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_workbook(&path);

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    assert!(workbook.write_cell("Feuille1", 2, "B", 42).unwrap());
    assert_eq!(
        workbook.read_cell("Feuille1", 2, "B").unwrap(),
        Some("42".to_string())
    );

    // neighbours are untouched
    assert_eq!(
        workbook.read_cell("Feuille1", 1, "B").unwrap(),
        Some("one".to_string())
    );
    assert_eq!(
        workbook.read_cell("Feuille1", 3, "A").unwrap(),
        Some("3".to_string())
    );
}

#[test]
fn test_write_cell_text_and_float() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_workbook(&path);

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    workbook.write_cell("Feuille1", 1, "A", 2.5).unwrap();
    workbook.write_cell("Feuille1", 3, "B", "trois").unwrap();

    assert_eq!(
        workbook.read_cell("Feuille1", 1, "A").unwrap().as_deref(),
        Some("2.5")
    );
    assert_eq!(
        workbook.read_cell("Feuille1", 3, "B").unwrap().as_deref(),
        Some("trois")
    );
}

#[test]
fn test_write_cell_enlarges_sheet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_workbook(&path);

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    workbook.write_cell("Feuille1", 5, "C", true).unwrap();

    let sheet = workbook.read_sheet(Some("Feuille1")).unwrap().unwrap();
    assert_eq!(sheet.record_count(), 5);
    assert_eq!(
        sheet.column_names().unwrap(),
        &vec!["A".to_string(), "B".to_string(), "C".to_string()]
    );
    assert_eq!(
        workbook.read_cell("Feuille1", 5, "C").unwrap().as_deref(),
        Some("True")
    );
    assert_eq!(
        workbook.read_cell("Feuille1", 4, "A").unwrap().as_deref(),
        Some("nan")
    );
}

#[test]
fn test_read_cell_missing_sheet_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_workbook(&path);

    let report = RecordingReport::new();
    let workbook = Workbook::with_report(&path, &report);

    assert_eq!(workbook.read_cell("Absent", 1, "A").unwrap(), None);
    assert_eq!(
        report.problems(),
        vec!["Sheet 'Absent' does not exist in the workbook.".to_string()]
    );
}

#[test]
fn test_read_cell_past_end_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    create_workbook(&path);

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    assert!(matches!(
        workbook.read_cell("Feuille1", 9, "A"),
        Err(SheetError::RowIndexOutOfBounds { index: 9, count: 3 })
    ));
    assert!(matches!(
        workbook.read_cell("Feuille1", 0, "A"),
        Err(SheetError::InvalidRow(0))
    ));
}

// ===== Missing Files =====

#[test]
fn test_missing_file_yields_no_data() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.xlsx");

    let report = RecordingReport::new();
    let workbook = Workbook::with_report(&path, &report);

    assert!(workbook.read_sheet(None).unwrap().is_none());
    assert!(workbook.read_sheet(Some("Feuille1")).unwrap().is_none());
    assert!(workbook.list_sheet_names().unwrap().is_empty());
    assert!(workbook.describe_columns(None).unwrap().is_none());
    assert_eq!(workbook.read_cell("Feuille1", 1, "A").unwrap(), None);

    let expected = format!("File {} was not found.", path.display());
    assert_eq!(report.problems().len(), 5);
    assert!(report.problems().iter().all(|p| *p == expected));
    assert!(report.notices().is_empty());
}

#[test]
fn test_write_to_missing_file_does_not_create_it() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.xlsx");

    let workbook = Workbook::with_report(&path, RecordingReport::new());
    let table = Sheet::from_data(vec![vec!["A"], vec!["x"]]);

    assert!(!workbook.write_sheet(&table, "Feuille1").unwrap());
    assert!(!workbook.write_cell("Feuille1", 1, "A", 1).unwrap());
    assert!(!path.exists());
}

// ===== Permissions =====

#[cfg(unix)]
#[test]
fn test_write_sheet_on_read_only_file_leaves_content() {
    use std::fs::{self, OpenOptions};
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let path = dir.path().join("locked.xlsx");
    create_workbook(&path);
    let before = fs::read(&path).unwrap();

    fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();
    if OpenOptions::new().write(true).open(&path).is_ok() {
        // privileged users bypass file modes; nothing to observe here
        return;
    }

    let report = RecordingReport::new();
    let workbook = Workbook::with_report(&path, &report);
    let table = Sheet::from_data(vec![vec!["A"], vec!["x"]]);

    assert!(!workbook.write_sheet(&table, "Feuille2").unwrap());
    assert!(!workbook.write_cell("Feuille1", 1, "A", 99).unwrap());
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(
        report.problems(),
        vec![
            format!("Cannot access {}. Check the permissions.", path.display()),
            format!("Cannot access {}. Check the permissions.", path.display()),
        ]
    );
}

// ===== Malformed Input =====

#[test]
fn test_malformed_workbook_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"not a zip archive").unwrap();

    let report = RecordingReport::new();
    let workbook = Workbook::with_report(&path, &report);

    assert!(matches!(workbook.read_sheet(None), Err(SheetError::Read(_))));
    assert!(report.problems().is_empty());
}
