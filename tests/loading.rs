//! End-to-end checks: workbooks on disk → registry → tables → CSV.

use std::path::Path;

use rais_dashboard::data::analysis::{pct_change, pct_change_by_entity};
use rais_dashboard::data::export::{PERIOD_HEADER, to_csv_string};
use rais_dashboard::data::loader::{LoadOptions, load_workbook};
use rais_dashboard::data::sample::SampleSheet;
use rais_dashboard::data::{DataError, DatasetKey, Registry};

const YEARS: std::ops::RangeInclusive<i64> = 2006..=2019;

/// Values of entity `n` in year index `i`; SP grows from 1000 to 2300.
fn value(n: usize, i: usize) -> f64 {
    (1000 - 100 * n as i64 + 100 * i as i64) as f64
}

fn sheet(key: DatasetKey, names: &[&str]) -> SampleSheet {
    let periods: Vec<i64> = YEARS.collect();
    let rows = names
        .iter()
        .enumerate()
        .map(|(n, name)| {
            (
                name.to_string(),
                (0..periods.len()).map(|i| Some(value(n, i))).collect(),
            )
        })
        .collect();
    SampleSheet::for_dataset(key, periods, rows)
}

fn write(dir: &Path, key: DatasetKey, names: &[&str]) {
    sheet(key, names)
        .write(&dir.join(key.spec().file_name))
        .unwrap();
}

#[test]
fn load_one_shapes_the_table() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), DatasetKey::EmployeesByState, &["SP", "MG", "RS"]);

    let loaded = Registry::new(dir.path())
        .load_one(DatasetKey::EmployeesByState)
        .unwrap();
    let table = &loaded.table;

    assert_eq!(loaded.key, DatasetKey::EmployeesByState);
    assert_eq!(loaded.title, "Empregados por Estado");
    assert_eq!(table.periods().len(), 14);
    assert_eq!(table.first_period(), Some("2006"));
    assert_eq!(table.last_period(), Some("2019"));
    // Three states; the sheet's "Total" line is dropped for state datasets.
    assert_eq!(table.entities(), ["SP", "MG", "RS"]);
    assert_eq!(table.value("2019", "SP").unwrap(), Some(2300.0));
}

#[test]
fn drop_total_flag_controls_the_total_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("any.xlsx");
    sheet(DatasetKey::EstablishmentsByState, &["SP", "MG"])
        .write(&path)
        .unwrap();

    let dropped = load_workbook(
        &path,
        &LoadOptions {
            strip_label: "UF",
            drop_total: true,
        },
    )
    .unwrap();
    assert!(!dropped.entities().iter().any(|e| e == "Total"));
    assert_eq!(dropped.entities().len(), 2);

    let kept = load_workbook(
        &path,
        &LoadOptions {
            strip_label: "UF",
            drop_total: false,
        },
    )
    .unwrap();
    assert_eq!(kept.entities().len(), 3);
    assert_eq!(
        kept.value("2006", "Total").unwrap(),
        Some(value(0, 0) + value(1, 0))
    );
}

#[test]
fn municipal_datasets_keep_their_total() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        DatasetKey::EstablishmentsBySpMunicipality,
        &["Campinas", "Sorocaba"],
    );
    let loaded = Registry::new(dir.path())
        .load_one(DatasetKey::EstablishmentsBySpMunicipality)
        .unwrap();
    assert_eq!(loaded.table.entities(), ["Campinas", "Sorocaba", "Total"]);
}

#[test]
fn missing_file_is_reported_by_load_one() {
    let dir = tempfile::tempdir().unwrap();
    let err = Registry::new(dir.path())
        .load_one(DatasetKey::EmployeesBySpMunicipality)
        .unwrap_err();
    assert!(matches!(err, DataError::MissingFile { .. }));
}

#[test]
fn load_all_skips_absent_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), DatasetKey::EstablishmentsByState, &["SP"]);
    write(dir.path(), DatasetKey::EmployeesBySpMunicipality, &["Campinas"]);

    let registry = Registry::new(dir.path());
    let loaded = registry.load_all().unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.contains_key(&DatasetKey::EstablishmentsByState));
    assert!(loaded.contains_key(&DatasetKey::EmployeesBySpMunicipality));

    let availability = registry.check_availability();
    assert_eq!(availability.len(), 4);
    assert!(availability[&DatasetKey::EstablishmentsByState]);
    assert!(!availability[&DatasetKey::EmployeesByState]);
    assert!(!availability[&DatasetKey::EstablishmentsBySpMunicipality]);
}

#[test]
fn load_all_on_an_empty_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::new(dir.path().join("does-not-exist"));
    assert!(registry.load_all().unwrap().is_empty());
    assert!(registry.check_availability().values().all(|ok| !ok));
}

#[test]
fn unknown_dataset_key_is_an_invalid_reference() {
    assert!(matches!(
        "estab_mundo".parse::<DatasetKey>(),
        Err(DataError::InvalidReference { .. })
    ));
}

#[test]
fn csv_export_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), DatasetKey::EmployeesByState, &["SP", "MG", "RS"]);
    let table = Registry::new(dir.path())
        .load_one(DatasetKey::EmployeesByState)
        .unwrap()
        .table;

    let selected = vec!["RS".to_string(), "SP".to_string()];
    let csv = to_csv_string(&table, &selected).unwrap();

    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], PERIOD_HEADER);
    assert_eq!(&headers[1], "RS");
    assert_eq!(&headers[2], "SP");

    let mut rows = 0;
    for record in reader.records() {
        let record = record.unwrap();
        let period = &record[0];
        for (i, entity) in selected.iter().enumerate() {
            let parsed: f64 = record[i + 1].parse().unwrap();
            let original = table.value(period, entity).unwrap().unwrap();
            assert!((parsed - original).abs() < 0.5, "{period}/{entity}");
        }
        rows += 1;
    }
    assert_eq!(rows, table.periods().len());
}

#[test]
fn pct_change_over_the_full_period() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), DatasetKey::EstablishmentsByState, &["SP", "MG"]);
    let table = Registry::new(dir.path())
        .load_one(DatasetKey::EstablishmentsByState)
        .unwrap()
        .table;

    let start = table.value("2006", "SP").unwrap().unwrap();
    let end = table.value("2019", "SP").unwrap().unwrap();
    let changes = pct_change_by_entity(&table, None, 10).unwrap();
    let sp = changes.iter().find(|(name, _)| name == "SP").unwrap().1;
    assert!((sp - (end - start) / start * 100.0).abs() < 1e-9);
    assert_eq!(pct_change(0.0, end), 0.0);
}

#[test]
fn corrupt_workbook_is_not_a_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(DatasetKey::EmployeesByState.spec().file_name),
        b"PK\x03\x04 truncated",
    )
    .unwrap();
    let err = Registry::new(dir.path())
        .load_one(DatasetKey::EmployeesByState)
        .unwrap_err();
    assert!(matches!(err, DataError::Workbook { .. }));
    assert!(Registry::new(dir.path()).load_all().is_err());
}
