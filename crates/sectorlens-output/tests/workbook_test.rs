//! Integration tests: aggregated datasets through to a saved workbook.

use sectorlens_data::{CompanyRecord, Metric, SectorDataset, SectorDescriptor};
use sectorlens_metrics::{average_all, filter_relative_to_baseline};
use sectorlens_output::{OutputError, ReportBuilder};
use std::path::PathBuf;

fn out_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sectorlens_{}_{name}", std::process::id()))
}

fn oil_and_gas() -> SectorDataset {
    SectorDataset::new(
        SectorDescriptor::new(1, "НЕФТЕГАЗ"),
        vec!["P/E".to_string()],
        vec![
            CompanyRecord::company("Лукойл", "LKOH", "НЕФТЕГАЗ", vec![Metric::new("P/E", Some(5.2))]),
            CompanyRecord::company("Новатэк", "NVTK", "НЕФТЕГАЗ", vec![Metric::new("P/E", Some(20.0))]),
            CompanyRecord::company("Русснефть", "RNFT", "НЕФТЕГАЗ", vec![Metric::new("P/E", None)]),
        ],
    )
}

#[test]
fn test_full_report_written() {
    let path = out_path("pe_all_sectors.xlsx");
    let dataset = oil_and_gas();
    let filtered = filter_relative_to_baseline(&dataset.records, "P/E", Some(10.0), 0.0, 15.0);
    assert_eq!(filtered.len(), 1);

    let mut builder = ReportBuilder::create(&path).unwrap();
    builder
        .add_sector_sheet("НЕФТЕГАЗ", average_all(dataset).unwrap())
        .unwrap();
    builder.add_filtered_sheet("P_E < 15", filtered).unwrap();

    let artifact = builder.finalize().unwrap();
    assert_eq!(artifact.sheets, vec!["P_E < 15", "НЕФТЕГАЗ"]);

    let bytes = std::fs::read(&artifact.path).unwrap();
    assert!(bytes.starts_with(b"PK"), "workbook is a zip container");

    std::fs::remove_file(path).ok();
}

#[test]
fn test_empty_sectors_leave_no_sheet() {
    let path = out_path("debt_ebitda_all_sectors.xlsx");
    let mut builder = ReportBuilder::create(&path).unwrap();

    let empty = SectorDataset::empty(SectorDescriptor::new(11, "НЕПУБЛИЧНЫЕ"), vec!["Debt/EBITDA".into()]);
    let result = builder.add_sector_sheet("НЕПУБЛИЧНЫЕ", average_all(empty).unwrap());
    assert!(matches!(result, Err(OutputError::EmptySheet(_))));

    builder
        .add_sector_sheet("НЕФТЕГАЗ", average_all(oil_and_gas()).unwrap())
        .unwrap();
    let artifact = builder.finalize().unwrap();
    assert_eq!(artifact.sheets, vec!["НЕФТЕГАЗ"]);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_workbook_without_sheets_is_not_written() {
    let path = out_path("no_sheets.xlsx");
    std::fs::remove_file(&path).ok();

    let mut builder = ReportBuilder::create(&path).unwrap();
    let empty = SectorDataset::empty(SectorDescriptor::new(2, "БАНКИ"), vec!["P/E".into()]);
    assert!(builder.add_sector_sheet("БАНКИ", average_all(empty).unwrap()).is_err());

    let result = builder.finalize();
    assert!(matches!(result, Err(OutputError::NoSheets(p)) if p == path));
    assert!(!path.exists());
}
