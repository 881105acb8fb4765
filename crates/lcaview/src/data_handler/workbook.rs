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

use crate::data_handler::column::CellValue;
use crate::data_handler::io::RawSheet;
use crate::error::{DataError, DataResult};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;
/// Reads one named sheet of an xlsx/xlsm/xlsb/xls/ods workbook.
#[derive(Debug, Clone)]
pub struct WorkbookReader {
    sheet: String,
}
impl WorkbookReader {
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
        }
    }
    pub fn read_file(&self, path: &Path) -> DataResult<RawSheet> {
        let wrap = |source: calamine::Error| DataError::Workbook {
            path: path.display().to_string(),
            source,
        };
        let mut workbook = open_workbook_auto(path).map_err(wrap)?;
        let available = workbook.sheet_names();
        if !available.iter().any(|name| name == &self.sheet) {
            return Err(DataError::SheetNotFound {
                sheet: self.sheet.clone(),
                available,
            });
        }
        let range = workbook.worksheet_range(&self.sheet).map_err(wrap)?;
        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or(DataError::MissingHeader)?
            .iter()
            .map(|cell| cell_value(cell).to_text().unwrap_or_default().trim().to_string())
            .collect();
        let rows: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(cell_value).collect())
            .collect();
        debug!(sheet = %self.sheet, rows = rows.len(), "worksheet read");
        Ok(RawSheet { headers, rows })
    }
}
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Bool(v) => CellValue::Bool(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(v) => CellValue::Text(v.clone()),
        Data::DateTime(v) => CellValue::Number(v.as_f64()),
        Data::DateTimeIso(v) | Data::DurationIso(v) => CellValue::Text(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_cells_read_as_missing() {
        assert_eq!(
            cell_value(&Data::Error(calamine::CellErrorType::NA)),
            CellValue::Empty
        );
        assert_eq!(cell_value(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(
            cell_value(&Data::String("Yes".into())),
            CellValue::Text("Yes".into())
        );
    }

    #[test]
    fn missing_file_is_a_workbook_error() {
        let err = WorkbookReader::new("all results")
            .read_file(Path::new("/nonexistent/all_results.xlsx"))
            .unwrap_err();
        assert!(matches!(err, DataError::Workbook { .. }));
    }
}
