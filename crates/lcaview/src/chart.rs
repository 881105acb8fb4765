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

use crate::config::{DashboardConfig, TitleConfig};
use crate::data_handler::{ColumnData, Table};
use crate::error::{ChartError, ConfigResult, Result};
use crate::filter::{self, FilterState};
use crate::labels::LabelCompressor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
/// One bar: its cleaned axis label and the value of each contributing column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub label: String,
    pub values: IndexMap<String, f64>,
}
/// Everything the renderer needs for one stacked bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub title: String,
    pub contributing_columns: Vec<String>,
    pub rows: Vec<LabeledRow>,
    pub unit: Option<String>,
}
impl ChartPayload {
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }
    /// Values of `column` across the rows, in row order.
    pub fn series(&self, column: &str) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.values.get(column).copied().unwrap_or(0.0))
            .collect()
    }
}
#[derive(Debug, Clone)]
pub struct ChartAssembler {
    filter_columns: Vec<String>,
    contributor_columns: Vec<String>,
    product_column: String,
    unit_column: String,
    titles: TitleConfig,
    labels: LabelCompressor,
}
impl ChartAssembler {
    pub fn new(config: &DashboardConfig) -> ConfigResult<Self> {
        Ok(Self {
            filter_columns: config.columns.filter.clone(),
            contributor_columns: config.columns.contributor.clone(),
            product_column: config.dataset.product_column.clone(),
            unit_column: config.dataset.unit_column.clone(),
            titles: config.titles.clone(),
            labels: LabelCompressor::new(&config.labels)?,
        })
    }
    pub fn product_column(&self) -> &str {
        &self.product_column
    }
    /// First match wins: nothing selected, heat, electricity, per-mass.
    pub fn title(&self, products: &[String]) -> String {
        if products.is_empty() {
            return self.titles.generic.clone();
        }
        let joined = products.join(", ");
        if joined.contains(self.titles.heat_keyword.as_str()) {
            self.titles.heat.clone()
        } else if joined.contains(self.titles.electricity_keyword.as_str()) {
            self.titles.electricity.clone()
        } else {
            self.titles.per_mass_title(&joined)
        }
    }
    /// Contributor columns whose total over `table` is strictly positive.
    pub fn contributing_columns(&self, table: &Table) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for name in &self.contributor_columns {
            if table.column(name)?.sum() > 0.0 {
                out.push(name.clone());
            }
        }
        Ok(out)
    }
    /// Composite label of every row, before compression.
    pub fn composite_labels(&self, table: &Table) -> Result<Vec<String>> {
        let columns = self
            .filter_columns
            .iter()
            .map(|name| table.column(name))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok((0..table.row_count())
            .map(|i| {
                let cells: Vec<Option<String>> =
                    columns.iter().map(|c| c.get_string(i)).collect();
                self.labels.composite(cells.iter().map(Option::as_deref))
            })
            .collect())
    }
    pub fn assemble(&self, filtered: &Table, products: &[String]) -> Result<ChartPayload> {
        if filtered.is_empty() {
            return Err(ChartError::EmptySelection.into());
        }
        let contributing = self.contributing_columns(filtered)?;
        let cleaned = self.labels.compress(&self.composite_labels(filtered)?);
        let mut order: Vec<usize> = (0..filtered.row_count()).collect();
        order.sort_by(|&a, &b| cleaned[a].cmp(&cleaned[b]));
        let value_columns = contributing
            .iter()
            .map(|name| Ok((name.clone(), filtered.column(name)?)))
            .collect::<Result<Vec<_>>>()?;
        let rows = order
            .iter()
            .map(|&i| LabeledRow {
                label: cleaned[i].clone(),
                values: value_columns
                    .iter()
                    .map(|(name, column)| (name.clone(), column.to_f64(i).unwrap_or(0.0)))
                    .collect(),
            })
            .collect();
        let unit_column = filtered.column(&self.unit_column)?;
        let unit = order.iter().find_map(|&i| unit_column.get_string(i));
        debug!(
            rows = filtered.row_count(),
            contributing = contributing.len(),
            "chart assembled"
        );
        Ok(ChartPayload {
            title: self.title(products),
            contributing_columns: contributing,
            rows,
            unit,
        })
    }
    /// Filters `dataset` by `state` and assembles the chart for the result.
    pub fn render(&self, dataset: &Table, state: &FilterState) -> Result<ChartPayload> {
        let filtered = filter::apply(dataset, state)?;
        self.assemble(&filtered, &state.selected(&self.product_column))
    }
}
