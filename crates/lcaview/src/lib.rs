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

pub mod catalog;
pub mod chart;
pub mod config;
pub mod data_handler;
pub mod error;
pub mod figure;
pub mod filter;
pub mod labels;
pub mod reactive;

pub use catalog::DropdownOption;
pub use chart::{ChartAssembler, ChartPayload, LabeledRow};
pub use config::DashboardConfig;
pub use data_handler::{DatasetLoader, Table, TableSchema};
pub use error::{
    ChartError, ConfigError, DataError, ErrorReporter, ErrorSeverity, LcaViewError, Result,
};
pub use figure::Figure;
pub use filter::FilterState;
pub use labels::LabelCompressor;
pub use reactive::{ReactiveGraph, Session, Update};

use std::sync::Arc;
use tracing::info;

/// A loaded dataset wired into the reactive graph.
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    graph: Arc<ReactiveGraph>,
}
impl Dashboard {
    /// Loads the dataset named by `config` and wires the graph over it.
    pub fn load(config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        let table = config.loader().load(&config.dataset.path)?;
        Self::from_table(config, table)
    }
    pub fn from_table(config: DashboardConfig, table: Table) -> Result<Self> {
        let graph = ReactiveGraph::new(Arc::new(table), &config)?;
        info!(
            rows = graph.dataset().row_count(),
            filters = config.columns.filter.len(),
            contributors = config.columns.contributor.len(),
            "dashboard ready"
        );
        Ok(Self {
            config,
            graph: Arc::new(graph),
        })
    }
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
    pub fn graph(&self) -> &Arc<ReactiveGraph> {
        &self.graph
    }
    pub fn dataset(&self) -> &Table {
        self.graph.dataset()
    }
    pub fn session(&self) -> Result<Session> {
        Session::new(Arc::clone(&self.graph))
    }
    /// The chart payload for `state`, without rendering it to a figure.
    pub fn payload(&self, state: &FilterState) -> Result<ChartPayload> {
        ChartAssembler::new(&self.config)?.render(self.dataset(), state)
    }
}
