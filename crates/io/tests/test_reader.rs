//! Integration test: reading case-count CSV files.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use epicast_io::{IoError, ReaderConfig, read_cases};

const CASES: &str = "\
date,region,cumulative
2020-03-03,Ontario,6
2020-03-01,Ontario,1
2020-03-02,Ontario,3
2020-03-01,Quebec,2
2020-03-04,Ontario,10
2020-03-02,Quebec,2
";

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn write_csv(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("cases.csv");
    let mut file = std::fs::File::create(&path).expect("create csv");
    file.write_all(contents.as_bytes()).expect("write csv");
    path
}

#[test]
fn read_cases_file_not_found() {
    let path = Path::new("/tmp/epicast_test_nonexistent_file.csv");
    let err = read_cases(path, &ReaderConfig::new("Ontario")).unwrap_err();
    assert!(
        matches!(err, IoError::FileNotFound { .. }),
        "expected FileNotFound, got {err:?}",
    );
}

#[test]
fn read_cases_invalid_config_rejects_early() {
    let path = Path::new("/tmp/epicast_test_nonexistent_file.csv");
    let config = ReaderConfig::new("");

    // Should fail on config validation before even trying to open the file.
    let err = read_cases(path, &config).unwrap_err();
    assert!(
        matches!(err, IoError::Validation { .. }),
        "expected Validation error, got {err:?}",
    );
}

#[test]
fn read_cases_filters_and_sorts() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(&dir, CASES);

    let series = read_cases(&path, &ReaderConfig::new("Ontario")).expect("read succeeds");
    assert_eq!(series.region(), "Ontario");
    assert_eq!(series.cumulative(), &[1.0, 3.0, 6.0, 10.0]);
    assert_eq!(series.dates()[0], date("2020-03-01"));
    assert_eq!(series.daily_new_cases().values(), &[2.0, 3.0, 4.0]);
}

#[test]
fn read_cases_date_range_is_inclusive() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(&dir, CASES);

    let config = ReaderConfig::new("Ontario")
        .with_start(Some(date("2020-03-02")))
        .with_end(Some(date("2020-03-03")));
    let series = read_cases(&path, &config).expect("read succeeds");
    assert_eq!(series.cumulative(), &[3.0, 6.0]);
}

#[test]
fn read_cases_unknown_region() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(&dir, CASES);

    let err = read_cases(&path, &ReaderConfig::new("Atlantis")).unwrap_err();
    assert!(
        matches!(err, IoError::UnknownRegion { ref region, .. } if region == "Atlantis"),
        "expected UnknownRegion, got {err:?}",
    );
}

#[test]
fn read_cases_empty_range() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(&dir, CASES);

    let config = ReaderConfig::new("Quebec").with_start(Some(date("2021-01-01")));
    let err = read_cases(&path, &config).unwrap_err();
    assert!(
        matches!(err, IoError::EmptyRange { .. }),
        "expected EmptyRange, got {err:?}",
    );
}

#[test]
fn read_cases_reports_gaps() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(
        &dir,
        "date,region,cumulative\n2020-03-01,X,1\n2020-03-04,X,5\n",
    );

    let err = read_cases(&path, &ReaderConfig::new("X")).unwrap_err();
    match err {
        IoError::Validation { count, details } => {
            assert_eq!(count, 1);
            assert!(details.contains("gap of 2 day(s)"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[test]
fn read_cases_malformed_row() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(&dir, "date,region,cumulative\nnot-a-date,X,1\n");

    let err = read_cases(&path, &ReaderConfig::new("X")).unwrap_err();
    assert!(
        matches!(err, IoError::Csv { .. }),
        "expected Csv error, got {err:?}",
    );
}
