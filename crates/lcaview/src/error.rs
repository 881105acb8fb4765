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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum LcaViewError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read CSV file '{path}': {source}")]
    CsvFile {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to read workbook '{path}': {source}")]
    Workbook {
        path: String,
        #[source]
        source: calamine::Error,
    },
    #[error("Sheet '{sheet}' not found (available: {})", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },
    #[error("Unsupported data format: {format}")]
    UnsupportedFormat { format: String },
    #[error("Required columns missing from dataset: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },
    #[error("Column '{column}' not found in table")]
    ColumnNotFound { column: String },
    #[error("Numeric conversion failed for column '{column}' at row {row}: {value}")]
    NumericConversion {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Column length mismatch: expected {expected}, got {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("Row index out of bounds: {0}")]
    OutOfBounds(usize),
    #[error("Dataset has no header row")]
    MissingHeader,
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse YAML configuration: {source}")]
    YamlParse {
        #[from]
        source: serde_yaml::Error,
    },
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Column list '{field}' must not be empty")]
    EmptyColumnList { field: String },
    #[error("Column '{column}' is listed more than once")]
    DuplicateColumn { column: String },
    #[error("Column '{column}' is both a filter and a contributor column")]
    OverlappingColumn { column: String },
    #[error("Product column '{column}' must also be a filter column")]
    ProductNotFiltered { column: String },
    #[error("Label delimiter must contain a non-whitespace character")]
    InvalidDelimiter,
    #[error("Unknown filter column '{column}'")]
    UnknownFilterColumn { column: String },
    #[error("Invalid listen address '{value}'")]
    InvalidAddress { value: String },
}
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("The current selection matches no rows")]
    EmptySelection,
}
pub type Result<T> = std::result::Result<T, LcaViewError>;
pub type DataResult<T> = std::result::Result<T, DataError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
impl LcaViewError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LcaViewError::Chart(ChartError::EmptySelection)
                | LcaViewError::Config(ConfigError::UnknownFilterColumn { .. })
                | LcaViewError::Data(DataError::ColumnNotFound { .. })
        )
    }
    pub fn category(&self) -> &'static str {
        match self {
            LcaViewError::Data(_) => "Data",
            LcaViewError::Config(_) => "Configuration",
            LcaViewError::Chart(_) => "Chart",
            LcaViewError::Io(_) => "I/O",
            LcaViewError::Serialisation(_) => "Serialisation",
        }
    }
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            LcaViewError::Chart(ChartError::EmptySelection) => vec![
                "Clear one of the active filters".to_string(),
                "Pick values offered by the narrowed dropdowns".to_string(),
            ],
            LcaViewError::Data(DataError::MissingColumns { .. }) => vec![
                "Check the column names in the dataset header row".to_string(),
                "Adjust the `columns` section of the configuration file".to_string(),
            ],
            LcaViewError::Data(DataError::SheetNotFound { .. }) => vec![
                "Pass the sheet name with --sheet".to_string(),
                "Set `dataset.sheet` in the configuration file".to_string(),
            ],
            LcaViewError::Data(DataError::UnsupportedFormat { .. }) => {
                vec!["Provide an .xlsx, .xlsm, .xls, .ods or .csv file".to_string()]
            }
            _ => Vec::new(),
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            LcaViewError::Chart(ChartError::EmptySelection) => {
                "No results match the selected filters.".to_string()
            }
            _ => self.to_string(),
        }
    }
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LcaViewError::Chart(ChartError::EmptySelection) => ErrorSeverity::Warning,
            LcaViewError::Data(DataError::MissingColumns { .. }) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}
impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }
    pub fn color_code(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "\x1b[36m",
            ErrorSeverity::Warning => "\x1b[33m",
            ErrorSeverity::Error => "\x1b[31m",
            ErrorSeverity::Critical => "\x1b[35m",
        }
    }
}
/// Renders errors for terminal output with severity and suggestions.
pub struct ErrorReporter {
    pub show_suggestions: bool,
    pub colored_output: bool,
}
impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            show_suggestions: true,
            colored_output: true,
        }
    }
    pub fn plain() -> Self {
        Self {
            show_suggestions: true,
            colored_output: false,
        }
    }
    pub fn report(&self, error: &LcaViewError) -> String {
        let severity = error.severity();
        let mut output = String::new();
        if self.colored_output {
            output.push_str(severity.color_code());
        }
        output.push_str(&format!("[{}] {}\n", severity.as_str(), error));
        if self.colored_output {
            output.push_str("\x1b[0m");
        }
        if self.show_suggestions {
            let suggestions = error.suggestions();
            if !suggestions.is_empty() {
                output.push_str("\nSuggestions:\n");
                for suggestion in suggestions {
                    output.push_str(&format!("  • {suggestion}\n"));
                }
            }
        }
        output
    }
}
impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
