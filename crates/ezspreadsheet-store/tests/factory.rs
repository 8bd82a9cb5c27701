use ezspreadsheet_store::{
    BackendOptions, CellValue, RowStyle, StoreError, TabularFormat, create_writer, open_reader,
    resolve_path,
};

fn sample_rows() -> Vec<Vec<CellValue>> {
    vec![
        vec![
            CellValue::from("Leopard Gecko"),
            CellValue::Int(12),
            CellValue::Number(0.25),
            CellValue::Boolean(true),
        ],
        vec![
            CellValue::from("Philippine Eagle"),
            CellValue::Int(3),
            CellValue::Number(7.5),
            CellValue::Empty,
        ],
    ]
}

fn roundtrip(file_name: &str) {
    let dir = tempfile::tempdir().unwrap();
    let (path, format) = resolve_path(dir.path().join(file_name)).unwrap();
    let options = BackendOptions::default();

    let mut writer = create_writer(&path, format, &options).unwrap();
    writer
        .write_header(&["name", "count", "ratio", "flag"])
        .unwrap();
    for row in sample_rows() {
        writer.write_row(&row, RowStyle::Data).unwrap();
    }
    assert_eq!(writer.rows_written(), 3);
    writer.save().unwrap();

    let reader = open_reader(&path, format, &options).unwrap();
    let rows = reader.into_rows().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        vec![
            CellValue::from("name"),
            CellValue::from("count"),
            CellValue::from("ratio"),
            CellValue::from("flag"),
        ]
    );
    let expected = sample_rows();
    if format == TabularFormat::Xlsx {
        assert_eq!(rows[1], expected[0]);
    }
    // Delimited text reads back as text; compare renderings across formats.
    let rendered = |row: &[CellValue]| row.iter().map(ToString::to_string).collect::<Vec<_>>();
    assert_eq!(rendered(&rows[1]), rendered(&expected[0]));
    // Trailing empty cells may or may not be materialised; compare the filled prefix.
    assert_eq!(rendered(&rows[2][..3]), rendered(&expected[1][..3]));
    assert!(rows[2].get(3).is_none_or(CellValue::is_empty));
}

#[test]
fn xlsx_roundtrip_through_factory() {
    roundtrip("animals.xlsx");
}

#[test]
fn csv_roundtrip_through_factory() {
    roundtrip("animals.csv");
}

#[test]
fn tsv_roundtrip_through_factory() {
    roundtrip("animals.tsv");
}

#[test]
fn extensionless_path_roundtrips_as_workbook() {
    roundtrip("animals");
}

#[test]
fn unknown_extension_is_rejected() {
    let err = resolve_path("animals.json").unwrap_err();
    assert!(matches!(err, StoreError::UnsupportedFormat { .. }));
    assert_eq!(TabularFormat::Csv.to_string(), "csv");
}
