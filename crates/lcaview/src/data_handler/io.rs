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

use crate::data_handler::column::{CellValue, ColumnBuilder};
use crate::data_handler::common::{TableMetadata, TableSchema};
use crate::data_handler::table::Table;
use crate::data_handler::workbook::WorkbookReader;
use crate::error::{DataError, DataResult, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};
pub const DEFAULT_SHEET: &str = "all results";
/// Header row plus untyped cells, as produced by a reader.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}
#[derive(Debug, Clone)]
pub struct CsvReader {
    delimiter: u8,
    quote_char: u8,
}
impl CsvReader {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote_char: b'"',
        }
    }
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
    pub fn read_file(&self, path: &Path) -> DataResult<RawSheet> {
        let file = std::fs::File::open(path).map_err(|e| DataError::CsvFile {
            path: path.display().to_string(),
            source: e.into(),
        })?;
        self.read_from(file, &path.display().to_string())
    }
    /// `label` names the source in error messages.
    pub fn read_from<R: Read>(&self, input: R, label: &str) -> DataResult<RawSheet> {
        let wrap = |source: csv::Error| DataError::CsvFile {
            path: label.to_string(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote_char)
            .from_reader(input);
        let headers: Vec<String> = reader
            .headers()
            .map_err(wrap)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(DataError::MissingHeader);
        }
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(wrap)?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.trim().is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }
        Ok(RawSheet { headers, rows })
    }
}
impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}
/// Types a raw sheet against `schema`: projects the declared columns, drops
/// rows whose key cell is missing and converts numeric cells.
pub fn build_table(sheet: &RawSheet, schema: &TableSchema, name: &str) -> DataResult<Table> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (i, header) in sheet.headers.iter().enumerate() {
        positions.entry(header.as_str()).or_insert(i);
    }
    let declared = schema.columns();
    let missing: Vec<String> = declared
        .iter()
        .filter(|c| !positions.contains_key(*c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns { columns: missing });
    }
    let key_position = schema.key_column.as_deref().map(|k| positions[k]);
    let mut builders: Vec<(usize, ColumnBuilder)> = declared
        .iter()
        .filter_map(|c| {
            schema.data_type_of(c).map(|data_type| {
                (
                    positions[c],
                    ColumnBuilder::new(*c, data_type).with_capacity(sheet.rows.len()),
                )
            })
        })
        .collect();
    let empty = CellValue::Empty;
    let mut dropped = 0usize;
    for (i, row) in sheet.rows.iter().enumerate() {
        if let Some(key) = key_position {
            if row.get(key).map_or(true, CellValue::is_missing) {
                dropped += 1;
                continue;
            }
        }
        // header occupies spreadsheet row 1
        let row_number = i + 2;
        for (position, builder) in builders.iter_mut() {
            builder.push(row.get(*position).unwrap_or(&empty), row_number)?;
        }
    }
    if dropped > 0 {
        debug!(dropped, key = ?schema.key_column, "dropped rows without key value");
    }
    let mut table = Table::new(TableMetadata::named(name));
    for (_, builder) in builders {
        let column_name = builder.name().to_string();
        table.add_column(column_name, builder.build())?;
    }
    Ok(table)
}
/// Reads the dataset once at startup, choosing the reader by file extension.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    schema: TableSchema,
    sheet: String,
    csv: CsvReader,
}
impl DatasetLoader {
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            sheet: DEFAULT_SHEET.to_string(),
            csv: CsvReader::new(),
        }
    }
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }
    pub fn with_csv_reader(mut self, csv: CsvReader) -> Self {
        self.csv = csv;
        self
    }
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }
    pub fn load(&self, path: &Path) -> Result<Table> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let sheet = match extension.as_deref() {
            Some("csv") => self.csv.read_file(path)?,
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => {
                WorkbookReader::new(&self.sheet).read_file(path)?
            }
            other => {
                return Err(DataError::UnsupportedFormat {
                    format: other.unwrap_or("<none>").to_string(),
                }
                .into())
            }
        };
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset");
        let mut table = build_table(&sheet, &self.schema, name)?;
        table.metadata.source_path = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "dataset loaded"
        );
        Ok(table)
    }
}
