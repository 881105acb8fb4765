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

use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Single page: one multi-select per filter column, two per row, and the
/// chart below them. All recomputation happens server side.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>LCA contributions</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
  body { font-family: sans-serif; margin: 1rem; }
  #filters { display: flex; flex-wrap: wrap; gap: 0.5rem 4%; }
  .filter { width: 48%; }
  .filter label { display: block; font-weight: bold; margin-bottom: 0.2rem; }
  .filter select { width: 100%; min-height: 6rem; }
  #chart { height: 80vh; }
  #error { color: #b00020; }
</style>
</head>
<body>
<div id="filters"></div>
<div id="error"></div>
<div id="chart"></div>
<script>
let lastUnit = null;
let latestUpdate = 0;

function selections() {
  const out = {};
  document.querySelectorAll('.filter select').forEach(select => {
    const picked = Array.from(select.selectedOptions).map(o => o.value);
    out[select.dataset.column] = picked.length ? picked : null;
  });
  return out;
}

function fillOptions(select, options) {
  const keep = new Set(Array.from(select.selectedOptions).map(o => o.value));
  const values = options.map(o => o.value);
  keep.forEach(v => { if (!values.includes(v)) values.push(v); });
  select.innerHTML = '';
  values.forEach(v => {
    const option = document.createElement('option');
    option.value = v;
    option.textContent = v;
    option.selected = keep.has(v);
    select.appendChild(option);
  });
}

async function post(path, body) {
  const response = await fetch(path, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
  const json = await response.json();
  if (!response.ok) throw new Error(json.message || response.statusText);
  return json;
}

function draw(figure) {
  const unit = figure.layout.yaxis.title.text;
  if (unit) lastUnit = unit;
  Plotly.react('chart', figure.data, figure.layout, { responsive: true });
}

async function changed(column) {
  const seq = ++latestUpdate;
  try {
    const update = await post('/api/update', {
      trigger: column,
      selections: selections(),
      last_unit: lastUnit,
    });
    if (seq !== latestUpdate) return;
    document.getElementById('error').textContent = '';
    document.querySelectorAll('.filter select').forEach(select => {
      const options = update.options[select.dataset.column];
      if (options) fillOptions(select, options);
    });
    draw(update.figure);
  } catch (err) {
    if (seq !== latestUpdate) return;
    document.getElementById('error').textContent = err.message;
  }
}

async function init() {
  const controls = await (await fetch('/api/controls')).json();
  const container = document.getElementById('filters');
  controls.filters.forEach(filter => {
    const wrapper = document.createElement('div');
    wrapper.className = 'filter';
    const label = document.createElement('label');
    label.textContent = filter.column;
    const select = document.createElement('select');
    select.multiple = true;
    select.dataset.column = filter.column;
    fillOptions(select, filter.options);
    select.addEventListener('change', () => changed(filter.column));
    wrapper.append(label, select);
    container.appendChild(wrapper);
  });
  const initial = await post('/api/figure', { selections: {}, last_unit: null });
  draw(initial.figure);
}

init();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_updates_are_discarded() {
        assert!(INDEX_HTML.contains("const seq = ++latestUpdate;"));
        assert_eq!(INDEX_HTML.matches("if (seq !== latestUpdate) return;").count(), 2);
    }
}
