// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use anyhow::Result;
use lcaview::catalog;
use lcaview::filter;
use lcaview::{Dashboard, DashboardConfig, FilterState, LcaViewError, DataError};
use std::io::Write;
use tempfile::NamedTempFile;

const RESULTS_CSV: &str = "\
main?,product,origin,year,unit,steam,water,notes
Yes,X,A,2030,kg CO2-eq,1.0,0,first
No,X,A,2030,kg CO2-eq,2.5,0.5,
Yes,X,B,2050,kg CO2-eq,3,0,
Yes,,B,2050,kg CO2-eq,9,9,no product
";

fn write_csv(contents: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn config_for(file: &NamedTempFile) -> Result<DashboardConfig> {
    let yaml = format!(
        r#"
dataset:
  path: "{}"
columns:
  filter: ["main?", "product", "origin", "year"]
  contributor: ["steam", "water"]
"#,
        file.path().display()
    );
    Ok(DashboardConfig::from_yaml_str(&yaml)?)
}

#[test]
fn test_csv_dataset_loads_and_drops_keyless_rows() -> Result<()> {
    let file = write_csv(RESULTS_CSV)?;
    let dashboard = Dashboard::load(config_for(&file)?)?;
    let table = dashboard.dataset();
    assert_eq!(table.row_count(), 3);
    assert!(!table.has_column("notes"));
    assert_eq!(catalog::options(table, "year")?, vec!["2030", "2050"]);
    assert_eq!(table.column("steam")?.sum(), 6.5);
    Ok(())
}

#[test]
fn test_end_to_end_origin_selection() -> Result<()> {
    let file = write_csv(RESULTS_CSV)?;
    let dashboard = Dashboard::load(config_for(&file)?)?;
    let mut session = dashboard.session()?;

    let origin: Vec<&str> = session
        .options("origin")
        .unwrap_or_default()
        .iter()
        .map(|o| o.value.as_str())
        .collect();
    assert_eq!(origin, vec!["A", "B"]);

    let state = FilterState::new().with("origin", ["A"]);
    assert_eq!(filter::apply(dashboard.dataset(), &state)?.row_count(), 2);

    session.select("product", ["X"])?;
    let update = session.select("origin", ["A"])?;
    assert_eq!(update.figure.title(), Some("per kg of X"));
    assert!(update.figure.data.iter().all(|trace| trace.x.len() == 2));
    assert_eq!(update.figure.unit(), Some("kg CO2-eq"));
    assert!(update.notice.is_none());
    Ok(())
}

#[test]
fn test_payload_lists_only_contributing_columns() -> Result<()> {
    let file = write_csv(RESULTS_CSV)?;
    let dashboard = Dashboard::load(config_for(&file)?)?;
    let state = FilterState::new().with("origin", ["B"]);
    let payload = dashboard.payload(&state)?;
    assert_eq!(payload.contributing_columns, vec!["steam"]);
    assert_eq!(payload.rows.len(), 1);
    Ok(())
}

#[test]
fn test_missing_columns_fail_at_startup() -> Result<()> {
    let file = write_csv("main?,product,origin,unit,steam\nYes,X,A,kg,1\n")?;
    let err = Dashboard::load(config_for(&file)?).unwrap_err();
    match err {
        LcaViewError::Data(DataError::MissingColumns { columns }) => {
            assert_eq!(columns, vec!["year", "water"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn test_non_numeric_contribution_reports_row() -> Result<()> {
    let file = write_csv(
        "main?,product,origin,year,unit,steam,water\nYes,X,A,2030,kg,1,0\nYes,X,A,2030,kg,lots,0\n",
    )?;
    let err = Dashboard::load(config_for(&file)?).unwrap_err();
    assert!(matches!(
        err,
        LcaViewError::Data(DataError::NumericConversion { row: 3, .. })
    ));
    Ok(())
}

#[test]
fn test_unsupported_extension() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    file.write_all(b"{}")?;
    let mut config = DashboardConfig::default();
    config.dataset.path = file.path().to_path_buf();
    let err = Dashboard::load(config).unwrap_err();
    assert!(matches!(
        err,
        LcaViewError::Data(DataError::UnsupportedFormat { .. })
    ));
    Ok(())
}
