//! Labeled rule datasets.
//!
//! A dataset is a table of rows, each naming a rule, a body to classify, and up to two
//! violating (positive) and two compliant (negative) example texts for that rule. Datasets are
//! read from JSON Lines, one object per row.

pub mod error;
pub mod submission;


pub use error::DatasetError;
pub use submission::write_submission;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::text::normalize;

/// One row of a rule dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRow {
    #[serde(deserialize_with = "deserialize_row_id")]
    pub row_id: String,
    #[serde(default)]
    pub body: Option<String>,
    pub rule: String,
    #[serde(default)]
    pub positive_example_1: Option<String>,
    #[serde(default)]
    pub positive_example_2: Option<String>,
    #[serde(default)]
    pub negative_example_1: Option<String>,
    #[serde(default)]
    pub negative_example_2: Option<String>,
}

impl DatasetRow {
    /// Creates a row with no body and no examples.
    pub fn new(row_id: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            body: None,
            rule: rule.into(),
            positive_example_1: None,
            positive_example_2: None,
            negative_example_1: None,
            negative_example_2: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Fills the positive example slots in order (extra examples are ignored).
    pub fn with_positives(mut self, examples: &[&str]) -> Self {
        self.positive_example_1 = examples.first().map(|s| s.to_string());
        self.positive_example_2 = examples.get(1).map(|s| s.to_string());
        self
    }

    /// Fills the negative example slots in order (extra examples are ignored).
    pub fn with_negatives(mut self, examples: &[&str]) -> Self {
        self.negative_example_1 = examples.first().map(|s| s.to_string());
        self.negative_example_2 = examples.get(1).map(|s| s.to_string());
        self
    }

    /// Present (non-null) violating examples.
    pub fn positive_examples(&self) -> impl Iterator<Item = &str> {
        [&self.positive_example_1, &self.positive_example_2]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Present (non-null) compliant examples.
    pub fn negative_examples(&self) -> impl Iterator<Item = &str> {
        [&self.negative_example_1, &self.negative_example_2]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// The body in normalized (cache key) form; empty when missing.
    pub fn normalized_body(&self) -> String {
        normalize(self.body.as_deref())
    }
}

fn deserialize_row_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRowId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawRowId::deserialize(deserializer)? {
        RawRowId::Text(id) => id,
        RawRowId::Signed(id) => id.to_string(),
        RawRowId::Unsigned(id) => id.to_string(),
    })
}

/// An ordered set of rows with unique row ids, indexed by rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
    /// Distinct rules in order of first appearance.
    rule_order: Vec<String>,
    /// Rule → indices into `rows`, ascending.
    rule_rows: HashMap<String, Vec<usize>>,
}

impl Dataset {
    /// Builds a dataset, rejecting duplicate row ids and empty rule names.
    pub fn new(rows: Vec<DatasetRow>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(rows.len());
        let mut rule_order = Vec::new();
        let mut rule_rows: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, row) in rows.iter().enumerate() {
            if row.rule.is_empty() {
                return Err(DatasetError::EmptyRule {
                    row_id: row.row_id.clone(),
                });
            }
            if !seen.insert(row.row_id.as_str()) {
                return Err(DatasetError::DuplicateRowId {
                    row_id: row.row_id.clone(),
                });
            }
            match rule_rows.get_mut(&row.rule) {
                Some(indices) => indices.push(index),
                None => {
                    rule_order.push(row.rule.clone());
                    rule_rows.insert(row.rule.clone(), vec![index]);
                }
            }
        }

        Ok(Self {
            rows,
            rule_order,
            rule_rows,
        })
    }

    /// Loads a JSON Lines file. Blank lines are skipped.
    pub fn load_jsonl(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Self::from_jsonl_reader(BufReader::new(file), path)?;

        info!(
            path = %path.display(),
            rows = dataset.len(),
            rules = dataset.rule_count(),
            "Loaded dataset"
        );

        Ok(dataset)
    }

    /// Parses JSON Lines from any buffered reader; `origin` is only used in I/O errors.
    pub fn from_jsonl_reader<R: BufRead>(reader: R, origin: &Path) -> Result<Self, DatasetError> {
        let mut rows = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| DatasetError::Io {
                path: origin.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let row: DatasetRow =
                serde_json::from_str(&line).map_err(|source| DatasetError::InvalidRow {
                    line: index + 1,
                    source,
                })?;
            rows.push(row);
        }
        Self::new(rows)
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct rules in order of first appearance.
    pub fn rules(&self) -> Vec<&str> {
        self.rule_order.iter().map(String::as_str).collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rule_order.len()
    }

    /// Rows belonging to `rule`, in dataset order. Unknown rules yield nothing.
    pub fn rows_for_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a DatasetRow> {
        let indices: &[usize] = self.rule_rows.get(rule).map(Vec::as_slice).unwrap_or_default();
        indices.iter().map(move |&index| &self.rows[index])
    }

    /// Normalized bodies and examples, deduplicated in first-seen order, empties excluded.
    pub fn collect_unique_texts(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut texts = Vec::new();

        for row in &self.rows {
            let candidates = row
                .body
                .as_deref()
                .into_iter()
                .chain(row.positive_examples())
                .chain(row.negative_examples());

            for raw in candidates {
                let text = normalize(raw);
                if !text.is_empty() && seen.insert(text.clone()) {
                    texts.push(text);
                }
            }
        }

        texts
    }
}
