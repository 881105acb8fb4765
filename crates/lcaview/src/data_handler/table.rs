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

use crate::data_handler::column::{Column, ColumnData};
use crate::data_handler::common::{ColumnMetadata, TableMetadata};
use crate::error::{DataError, DataResult};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
/// Rows above this count are filtered on the rayon pool.
const PARALLEL_ROW_THRESHOLD: usize = 10_000;
#[derive(Debug, Clone)]
pub struct Table {
    columns: HashMap<String, Arc<Column>>,
    pub metadata: TableMetadata,
    column_order: Vec<String>,
}
#[derive(Debug)]
pub struct TableView<'a> {
    source: &'a Table,
    row_indices: Option<Arc<[usize]>>,
}
impl<'a> TableView<'a> {
    pub fn new(source: &'a Table) -> Self {
        Self {
            source,
            row_indices: None,
        }
    }
    pub fn filter<P>(source: &'a Table, predicate: P) -> Self
    where
        P: Fn(usize) -> bool + Send + Sync,
    {
        let indices: Vec<usize> = if source.row_count() > PARALLEL_ROW_THRESHOLD {
            (0..source.row_count())
                .into_par_iter()
                .filter(|&i| predicate(i))
                .collect()
        } else {
            (0..source.row_count()).filter(|&i| predicate(i)).collect()
        };
        Self {
            source,
            row_indices: Some(indices.into()),
        }
    }
    pub fn row_count(&self) -> usize {
        self.row_indices
            .as_ref()
            .map_or(self.source.row_count(), |indices| indices.len())
    }
    pub fn collect(self) -> DataResult<Table> {
        match self.row_indices {
            None => Ok(self.source.clone()),
            Some(indices) => self.source.select_rows(&indices),
        }
    }
}
impl Table {
    pub fn new(metadata: TableMetadata) -> Self {
        Self {
            columns: HashMap::new(),
            metadata,
            column_order: Vec::new(),
        }
    }
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> DataResult<()> {
        let name = name.into();
        if let Some(first) = self.column_order.first() {
            let expected = self.columns[first].len();
            if column.len() != expected {
                return Err(DataError::LengthMismatch {
                    expected,
                    found: column.len(),
                });
            }
        }
        if !self.columns.contains_key(&name) {
            self.column_order.push(name.clone());
        }
        self.metadata.row_count = column.len();
        self.columns.insert(name, Arc::new(column));
        self.metadata.column_count = self.columns.len();
        Ok(())
    }
    pub fn row_count(&self) -> usize {
        self.metadata.row_count
    }
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
    pub fn column_count(&self) -> usize {
        self.metadata.column_count
    }
    pub fn column_names(&self) -> &[String] {
        &self.column_order
    }
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name).map(|arc| arc.as_ref())
    }
    pub fn column(&self, name: &str) -> DataResult<&Column> {
        self.get_column(name).ok_or_else(|| DataError::ColumnNotFound {
            column: name.to_string(),
        })
    }
    pub(crate) fn shared_column(&self, name: &str) -> DataResult<Arc<Column>> {
        self.columns
            .get(name)
            .cloned()
            .ok_or_else(|| DataError::ColumnNotFound {
                column: name.to_string(),
            })
    }
    pub fn column_metadata(&self) -> Vec<ColumnMetadata> {
        self.column_order
            .iter()
            .map(|name| {
                let column = &self.columns[name];
                ColumnMetadata {
                    name: name.clone(),
                    data_type: column.data_type(),
                    null_count: column.null_count(),
                }
            })
            .collect()
    }
    pub fn lazy_filter<P>(&self, predicate: P) -> TableView<'_>
    where
        P: Fn(usize) -> bool + Send + Sync,
    {
        TableView::filter(self, predicate)
    }
    pub fn filter<P>(&self, predicate: P) -> DataResult<Table>
    where
        P: Fn(usize) -> bool + Send + Sync,
    {
        self.lazy_filter(predicate).collect()
    }
    pub fn select_rows(&self, indices: &[usize]) -> DataResult<Table> {
        let mut new_table = Table::new(self.metadata.derived("filtered"));
        for name in &self.column_order {
            let new_column = self.columns[name].select_rows(indices)?;
            new_table.add_column(name.clone(), new_column)?;
        }
        new_table.metadata.row_count = indices.len();
        Ok(new_table)
    }
}
