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

//! Axis-label shortening: composite labels lose the tokens every bar shares.

use crate::config::LabelConfig;
use crate::error::{ConfigError, ConfigResult};
use itertools::Itertools;
use regex::Regex;
use std::collections::HashSet;
#[derive(Debug, Clone)]
pub struct LabelCompressor {
    delimiter: String,
    trim_chars: Vec<char>,
    doubled: Regex,
    core: String,
    filler_tokens: HashSet<String>,
}
impl LabelCompressor {
    pub fn new(config: &LabelConfig) -> ConfigResult<Self> {
        let core = config.delimiter.trim();
        if core.is_empty() {
            return Err(ConfigError::InvalidDelimiter);
        }
        let escaped = regex::escape(core);
        let doubled = Regex::new(&format!(r"{escaped}\s*{escaped}"))
            .map_err(|_| ConfigError::InvalidDelimiter)?;
        Ok(Self {
            delimiter: config.delimiter.clone(),
            trim_chars: config.delimiter.chars().unique().collect(),
            doubled,
            core: core.to_string(),
            filler_tokens: config.filler_tokens.iter().cloned().collect(),
        })
    }
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }
    /// Joins the present values in order; all-missing yields `""`.
    pub fn composite<'a, I>(&self, values: I) -> String
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        values.into_iter().flatten().join(&self.delimiter)
    }
    /// Same length and order as `labels`. Fewer than two labels pass through
    /// untouched.
    pub fn compress<S: AsRef<str>>(&self, labels: &[S]) -> Vec<String> {
        if labels.len() < 2 {
            return labels.iter().map(|l| l.as_ref().to_string()).collect();
        }
        let tokenised: Vec<Vec<&str>> = labels
            .iter()
            .map(|l| l.as_ref().split(self.delimiter.as_str()).collect())
            .collect();
        let mut common: HashSet<&str> = tokenised[0].iter().copied().collect();
        for tokens in &tokenised[1..] {
            let present: HashSet<&str> = tokens.iter().copied().collect();
            common.retain(|t| present.contains(t));
        }
        tokenised
            .iter()
            .map(|tokens| {
                let kept = tokens
                    .iter()
                    .filter(|t| !common.contains(*t))
                    .join(&self.delimiter);
                let trimmed = kept.trim_matches(|c: char| self.trim_chars.contains(&c));
                let collapsed = self.collapse_doubled(trimmed);
                self.strip_fillers(&collapsed)
            })
            .collect()
    }
    fn collapse_doubled(&self, label: &str) -> String {
        let mut current = label.to_string();
        loop {
            let next = self.doubled.replace_all(&current, self.core.as_str());
            if next == current {
                return current;
            }
            current = next.into_owned();
        }
    }
    /// Filler tokens are dropped wherever a delimiter follows them.
    fn strip_fillers(&self, label: &str) -> String {
        if self.filler_tokens.is_empty() {
            return label.to_string();
        }
        let tokens: Vec<&str> = label.split(self.delimiter.as_str()).collect();
        let last = tokens.len() - 1;
        tokens
            .iter()
            .enumerate()
            .filter(|(i, t)| *i == last || !self.filler_tokens.contains(**t))
            .map(|(_, t)| *t)
            .join(&self.delimiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn compressor() -> LabelCompressor {
        LabelCompressor::new(&LabelConfig::default()).unwrap()
    }

    #[test]
    fn single_label_is_unchanged() {
        assert_eq!(compressor().compress(&["Yes | A | B"]), vec!["Yes | A | B"]);
        assert!(compressor().compress::<&str>(&[]).is_empty());
    }

    #[test]
    fn common_prefix_is_stripped() {
        assert_eq!(
            compressor().compress(&["Yes | A | B", "Yes | A | C"]),
            vec!["B", "C"]
        );
    }

    #[test]
    fn fully_common_labels_collapse_to_empty() {
        assert_eq!(compressor().compress(&["X", "X"]), vec!["", ""]);
    }

    #[test]
    fn one_differing_token_survives() {
        assert_eq!(
            compressor().compress(&[
                "GWP | methanol | PEM | 2030",
                "GWP | methanol | AEC | 2030",
            ]),
            vec!["PEM", "AEC"]
        );
    }

    #[test]
    fn tokens_match_whole_not_as_substrings() {
        assert_eq!(
            compressor().compress(&["A | BC", "AB | C"]),
            vec!["A | BC", "AB | C"]
        );
    }

    #[test]
    fn filler_tokens_removed_even_when_not_common() {
        assert_eq!(
            compressor().compress(&["GWP | Yes | 2030", "GWP | No | 2050"]),
            vec!["2030", "2050"]
        );
        assert_eq!(
            compressor().compress(&["A | Yes | B", "C | D"]),
            vec!["A | B", "C | D"]
        );
    }

    #[test]
    fn trailing_filler_is_kept() {
        assert_eq!(
            compressor().compress(&["A | Yes", "A | No"]),
            vec!["Yes", "No"]
        );
    }

    #[test]
    fn filler_inside_other_token_is_untouched() {
        assert_eq!(
            compressor().compress(&["Geno | X", "Yesterday | Y"]),
            vec!["Geno | X", "Yesterday | Y"]
        );
    }

    #[test]
    fn doubled_delimiter_is_collapsed() {
        assert_eq!(
            compressor().compress(&["Q |   | B", "Z | W"]),
            vec!["Q | B", "Z | W"]
        );
    }

    #[test]
    fn custom_delimiter_and_fillers() {
        let config = LabelConfig {
            delimiter: " / ".to_string(),
            filler_tokens: vec!["n/a".to_string()],
        };
        let c = LabelCompressor::new(&config).unwrap();
        assert_eq!(
            c.compress(&["x / n/a / 1", "x / y / 2"]),
            vec!["1", "y / 2"]
        );
    }

    #[test]
    fn composite_skips_missing_values() {
        let c = compressor();
        assert_eq!(c.composite([Some("A"), None, Some("B")]), "A | B");
        assert_eq!(c.composite([None, None]), "");
    }

    #[test]
    fn blank_delimiter_is_rejected() {
        let config = LabelConfig {
            delimiter: "   ".to_string(),
            filler_tokens: Vec::new(),
        };
        assert!(LabelCompressor::new(&config).is_err());
    }

    fn label() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-d]{1,2}", 1..5).prop_map(|tokens| tokens.join(" | "))
    }

    proptest! {
        #[test]
        fn preserves_length_and_equal_inputs(labels in prop::collection::vec(label(), 0..8)) {
            let out = compressor().compress(&labels);
            prop_assert_eq!(out.len(), labels.len());
            for i in 0..labels.len() {
                for j in 0..labels.len() {
                    if labels[i] == labels[j] {
                        prop_assert_eq!(&out[i], &out[j]);
                    }
                }
            }
        }

        #[test]
        fn output_never_contains_common_tokens(labels in prop::collection::vec(label(), 2..8)) {
            let sets: Vec<HashSet<&str>> = labels.iter().map(|l| l.split(" | ").collect()).collect();
            let common: HashSet<&str> = sets[0]
                .iter()
                .copied()
                .filter(|t| sets.iter().all(|s| s.contains(t)))
                .collect();
            let out = compressor().compress(&labels);
            for (cleaned, source) in out.iter().zip(&sets) {
                if cleaned.is_empty() {
                    continue;
                }
                for token in cleaned.split(" | ") {
                    prop_assert!(!common.contains(token));
                    prop_assert!(source.contains(token));
                }
            }
        }
    }
}
