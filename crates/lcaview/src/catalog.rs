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

//! Distinct-value catalogs that feed the filter dropdowns.

use crate::data_handler::{ColumnData, Table};
use crate::error::Result;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
/// One selectable entry of a dropdown, in the widget's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}
impl From<String> for DropdownOption {
    fn from(value: String) -> Self {
        Self {
            label: value.clone(),
            value,
        }
    }
}
/// Sorted distinct non-missing values of `column`.
///
/// Fails with `ColumnNotFound` when the table has no such column; the
/// dropdown columns are validated at startup so this indicates a bug.
pub fn options(table: &Table, column: &str) -> Result<Vec<String>> {
    let column = table.column(column)?;
    Ok((0..column.len())
        .filter_map(|i| column.get_string(i))
        .unique()
        .sorted()
        .collect())
}
pub fn dropdown_options(table: &Table, column: &str) -> Result<Vec<DropdownOption>> {
    Ok(options(table, column)?
        .into_iter()
        .map(DropdownOption::from)
        .collect())
}
/// Options for every column in `columns`, keyed in the same order.
pub fn options_for_all<S: AsRef<str>>(
    table: &Table,
    columns: &[S],
) -> Result<IndexMap<String, Vec<String>>> {
    columns
        .iter()
        .map(|c| Ok((c.as_ref().to_string(), options(table, c.as_ref())?)))
        .collect()
}
