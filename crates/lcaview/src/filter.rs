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

use crate::data_handler::{Column, ColumnData, Table};
use crate::error::Result;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
/// Wire shape of a selection: column → selected values, `null` meaning unset.
pub type SelectionsWire = IndexMap<String, Option<Vec<String>>>;
/// Column → selected values. Columns with an empty selection impose no
/// constraint and are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SelectionsWire", into = "SelectionsWire")]
pub struct FilterState {
    selections: IndexMap<String, IndexSet<String>>,
}
impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(column, values);
        self
    }
    /// Replaces the selection of `column`; an empty `values` clears it.
    pub fn set<I, S>(&mut self, column: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let column = column.into();
        let values: IndexSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.selections.shift_remove(&column);
        } else {
            self.selections.insert(column, values);
        }
    }
    pub fn clear(&mut self, column: &str) {
        self.selections.shift_remove(column);
    }
    pub fn selection(&self, column: &str) -> Option<&IndexSet<String>> {
        self.selections.get(column)
    }
    /// Selected values of `column` in selection order; empty when unset.
    pub fn selected(&self, column: &str) -> Vec<String> {
        self.selections
            .get(column)
            .map(|values| values.iter().cloned().collect())
            .unwrap_or_default()
    }
    pub fn is_unconstrained(&self) -> bool {
        self.selections.is_empty()
    }
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.selections.keys().map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.selections.len()
    }
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}
impl From<SelectionsWire> for FilterState {
    fn from(wire: SelectionsWire) -> Self {
        let mut state = FilterState::new();
        for (column, values) in wire {
            state.set(column, values.unwrap_or_default());
        }
        state
    }
}
impl From<FilterState> for SelectionsWire {
    fn from(state: FilterState) -> Self {
        state
            .selections
            .into_iter()
            .map(|(column, values)| (column, Some(values.into_iter().collect())))
            .collect()
    }
}
#[derive(Debug)]
pub enum CompiledPredicate {
    InSet {
        column: Arc<Column>,
        values: HashSet<String>,
    },
    All(Vec<CompiledPredicate>),
}
impl CompiledPredicate {
    /// Resolves every constrained column against `table` once so rows can be
    /// tested by index.
    pub fn compile(table: &Table, state: &FilterState) -> Result<Self> {
        let clauses = state
            .selections
            .iter()
            .map(|(name, values)| {
                Ok(CompiledPredicate::InSet {
                    column: table.shared_column(name)?,
                    values: values.iter().cloned().collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CompiledPredicate::All(clauses))
    }
    pub fn evaluate(&self, index: usize) -> bool {
        match self {
            CompiledPredicate::InSet { column, values } => match column.as_ref() {
                Column::Text(_) => column.text_at(index).is_some_and(|v| values.contains(v)),
                Column::Number(_) => column
                    .get_string(index)
                    .is_some_and(|v| values.contains(&v)),
            },
            CompiledPredicate::All(clauses) => clauses.iter().all(|c| c.evaluate(index)),
        }
    }
}
/// Rows matching every constrained column (any of its selected values).
pub fn apply(table: &Table, state: &FilterState) -> Result<Table> {
    if state.is_unconstrained() {
        return Ok(table.clone());
    }
    let predicate = CompiledPredicate::compile(table, state)?;
    let filtered = table.filter(|i| predicate.evaluate(i))?;
    tracing::debug!(
        constrained = state.len(),
        before = table.row_count(),
        after = filtered.row_count(),
        "filter applied"
    );
    Ok(filtered)
}
/// Like [`apply`] but ignoring the selection of `skip`.
pub fn apply_except(table: &Table, state: &FilterState, skip: &str) -> Result<Table> {
    let mut relaxed = state.clone();
    relaxed.clear(skip);
    apply(table, &relaxed)
}
