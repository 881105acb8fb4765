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

use crate::data_handler::common::DataType;
use crate::error::{DataError, DataResult};
use rayon::prelude::*;
use std::sync::Arc;
const MAX_STRING_LENGTH: usize = 1024 * 1024;
/// A single cell as delivered by a reader, before schema typing.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}
impl CellValue {
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(v) => v.is_nan(),
            CellValue::Bool(_) => false,
        }
    }
    /// String rendering used for categorical columns.
    pub fn to_text(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(v) => Some(format!("{v}")),
            CellValue::Bool(true) => Some("True".to_string()),
            CellValue::Bool(false) => Some("False".to_string()),
        }
    }
}
pub trait ColumnData: Send + Sync + std::fmt::Debug {
    fn len(&self) -> usize;
    fn data_type(&self) -> DataType;
    fn null_count(&self) -> usize;
    fn get_string(&self, index: usize) -> Option<String>;
    fn to_f64(&self, index: usize) -> Option<f64>;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
#[derive(Debug, Clone)]
pub enum Column {
    Text(Arc<[Option<Arc<str>>]>),
    Number(Arc<[Option<f64>]>),
}
impl ColumnData for Column {
    fn len(&self) -> usize {
        match self {
            Column::Text(data) => data.len(),
            Column::Number(data) => data.len(),
        }
    }
    fn data_type(&self) -> DataType {
        match self {
            Column::Text(_) => DataType::Text,
            Column::Number(_) => DataType::Number,
        }
    }
    fn null_count(&self) -> usize {
        match self {
            Column::Text(data) => data.par_iter().filter(|v| v.is_none()).count(),
            Column::Number(data) => data.par_iter().filter(|v| v.is_none()).count(),
        }
    }
    fn get_string(&self, index: usize) -> Option<String> {
        match self {
            Column::Text(data) => data.get(index)?.as_ref().map(|s| s.to_string()),
            Column::Number(data) => data.get(index)?.as_ref().map(|v| format!("{v}")),
        }
    }
    fn to_f64(&self, index: usize) -> Option<f64> {
        match self {
            Column::Text(data) => data
                .get(index)?
                .as_ref()
                .and_then(|s| s.trim().parse::<f64>().ok()),
            Column::Number(data) => data.get(index).copied()?,
        }
    }
}
impl Column {
    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        Column::Text(
            values
                .into_iter()
                .map(|v| v.map(|s| Arc::from(s.as_ref())))
                .collect::<Vec<_>>()
                .into(),
        )
    }
    pub fn numbers<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Column::Number(values.into_iter().collect::<Vec<_>>().into())
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Borrowed text at `index`; `None` for missing cells and numeric columns.
    pub fn text_at(&self, index: usize) -> Option<&str> {
        match self {
            Column::Text(data) => data.get(index)?.as_deref(),
            Column::Number(_) => None,
        }
    }
    /// Sum with missing cells counted as zero.
    pub fn sum(&self) -> f64 {
        match self {
            Column::Number(data) => data.par_iter().map(|v| v.unwrap_or(0.0)).sum(),
            Column::Text(_) => (0..self.len())
                .map(|i| self.to_f64(i).unwrap_or(0.0))
                .sum(),
        }
    }
    pub fn select_rows(&self, indices: &[usize]) -> DataResult<Column> {
        match self {
            Column::Text(data) => {
                let new_data: DataResult<Vec<Option<Arc<str>>>> = indices
                    .par_iter()
                    .map(|&i| data.get(i).cloned().ok_or(DataError::OutOfBounds(i)))
                    .collect();
                Ok(Column::Text(new_data?.into()))
            }
            Column::Number(data) => {
                let new_data: DataResult<Vec<Option<f64>>> = indices
                    .par_iter()
                    .map(|&i| data.get(i).copied().ok_or(DataError::OutOfBounds(i)))
                    .collect();
                Ok(Column::Number(new_data?.into()))
            }
        }
    }
}
/// Accumulates typed cells for one column while a reader walks the rows.
#[derive(Debug)]
pub struct ColumnBuilder {
    name: String,
    data_type: DataType,
    text: Vec<Option<Arc<str>>>,
    numbers: Vec<Option<f64>>,
}
impl ColumnBuilder {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            text: Vec::new(),
            numbers: Vec::new(),
        }
    }
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        match self.data_type {
            DataType::Text => self.text.reserve(capacity),
            DataType::Number => self.numbers.reserve(capacity),
        }
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// `row` is the 1-based data row, used in conversion errors.
    pub fn push(&mut self, cell: &CellValue, row: usize) -> DataResult<()> {
        match self.data_type {
            DataType::Text => {
                let value = cell.to_text().map(|s| {
                    if s.len() > MAX_STRING_LENGTH {
                        let mut end = MAX_STRING_LENGTH;
                        while !s.is_char_boundary(end) {
                            end -= 1;
                        }
                        Arc::from(&s[..end])
                    } else {
                        Arc::from(s.as_str())
                    }
                });
                self.text.push(value);
            }
            DataType::Number => {
                let value = match cell {
                    c if c.is_missing() => None,
                    CellValue::Number(v) => Some(*v),
                    CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                    CellValue::Text(s) => Some(s.trim().parse::<f64>().map_err(|_| {
                        DataError::NumericConversion {
                            column: self.name.clone(),
                            row,
                            value: s.clone(),
                        }
                    })?),
                    CellValue::Empty => None,
                };
                self.numbers.push(value);
            }
        }
        Ok(())
    }
    pub fn build(self) -> Column {
        match self.data_type {
            DataType::Text => Column::Text(self.text.into()),
            DataType::Number => Column::Number(self.numbers.into()),
        }
    }
}
