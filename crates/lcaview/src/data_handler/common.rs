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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataType {
    Text,
    Number,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetId(String);
impl DatasetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl AsRef<str> for DatasetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMetadata {
    pub id: DatasetId,
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub loaded_at: DateTime<Utc>,
    pub source_path: Option<PathBuf>,
}
impl TableMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: DatasetId::new(),
            name: name.into(),
            row_count: 0,
            column_count: 0,
            loaded_at: Utc::now(),
            source_path: None,
        }
    }
    /// Metadata for a table derived from `self`, e.g. a filtered view.
    pub fn derived(&self, suffix: &str) -> Self {
        Self {
            id: DatasetId::new(),
            name: format!("{}_{suffix}", self.name),
            row_count: 0,
            column_count: 0,
            loaded_at: self.loaded_at,
            source_path: self.source_path.clone(),
        }
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: DataType,
    pub null_count: usize,
}
/// Declares how each dataset column is typed at load time. Columns not listed
/// are not loaded.
#[derive(Debug, Clone, Default)]
pub struct TableSchema {
    pub text_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub key_column: Option<String>,
}
impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_text<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            if !self.text_columns.contains(&column) {
                self.text_columns.push(column);
            }
        }
        self
    }
    pub fn with_numeric<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            if !self.numeric_columns.contains(&column) {
                self.numeric_columns.push(column);
            }
        }
        self
    }
    /// Rows with a missing value in `column` are dropped at load.
    pub fn with_key(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }
    pub fn data_type_of(&self, column: &str) -> Option<DataType> {
        if self.numeric_columns.iter().any(|c| c == column) {
            Some(DataType::Number)
        } else if self.text_columns.iter().any(|c| c == column)
            || self.key_column.as_deref() == Some(column)
        {
            Some(DataType::Text)
        } else {
            None
        }
    }
    /// All declared columns in declaration order, text columns first.
    pub fn columns(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let key = self.key_column.iter().map(String::as_str);
        for name in self
            .text_columns
            .iter()
            .map(String::as_str)
            .chain(key)
            .chain(self.numeric_columns.iter().map(String::as_str))
        {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}
