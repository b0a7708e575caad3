//! Loader for the whitespace-separated Statlog shuttle table.
//!
//! Every non-blank line is one sample. The feature pair is the first and the
//! second-to-last column; the last column is the integer class label. No line
//! is treated as a header, so the first data row is kept and a `head(n)`
//! window starts one row earlier than a loader that drops a header line.

use anyhow::{Context, Result, anyhow, bail};
use ndarray::{Array2, s};

pub const FIXTURE: &str = "shuttle_data";

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// `rows x 2` feature matrix.
    pub features: Array2<f64>,
    pub targets: Vec<i64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// The first `rows` samples (all of them when `rows` exceeds the length).
    pub fn head(&self, rows: usize) -> Dataset {
        let rows = rows.min(self.len());
        Dataset {
            features: self.features.slice(s![..rows, ..]).to_owned(),
            targets: self.targets[..rows].to_vec(),
        }
    }
}

pub fn parse_shuttle(text: &str) -> Result<Dataset> {
    let mut width = None;
    let mut values = Vec::new();
    let mut targets = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let lineno = idx + 1;
        let expected = *width.get_or_insert(fields.len());
        if expected < 3 {
            bail!("line {}: need at least 3 columns, found {}", lineno, expected);
        }
        if fields.len() != expected {
            bail!("line {}: expected {} columns, found {}", lineno, expected, fields.len());
        }

        let number = |col: usize| -> Result<f64> {
            fields[col]
                .parse::<f64>()
                .with_context(|| format!("line {}: column {} is not numeric: '{}'", lineno, col + 1, fields[col]))
        };
        values.push(number(0)?);
        values.push(number(expected - 2)?);
        let label = fields[expected - 1];
        targets.push(
            label
                .parse::<i64>()
                .with_context(|| format!("line {}: class label is not an integer: '{}'", lineno, label))?,
        );
    }

    if targets.is_empty() {
        return Err(anyhow!("shuttle data contains no samples"));
    }
    let features = Array2::from_shape_vec((targets.len(), 2), values)?;
    Ok(Dataset { features, targets })
}
