//! Small classical-ML toolkit backing the shuttle workloads.
//!
//! Estimators are described by a hyper-parameter [`Candidate`] which fits a
//! model implementing [`Predict`]. [`grid::grid_search`] scores candidates by
//! stratified cross-validation and refits the winner on the full data.

pub mod forest;
pub mod grid;
pub mod lle;
pub mod svm;

#[cfg(test)]
mod svm_test;

use anyhow::{Result, anyhow};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// One point of a hyper-parameter grid.
pub trait Candidate: Send + Sync + std::fmt::Debug {
    type Model: Predict + Send;

    /// Fit on `x` with dense class indices `y` in `0..n_classes`.
    fn fit(&self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<Self::Model>;
}

pub trait Predict {
    fn predict(&self, x: ArrayView2<'_, f64>) -> Vec<usize>;
}

/// Maps raw integer labels onto `0..n_classes` in ascending label order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<i64>,
}

impl LabelEncoder {
    pub fn fit(labels: &[i64]) -> Self {
        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        Self { classes }
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn encode(&self, labels: &[i64]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                self.classes
                    .binary_search(label)
                    .map_err(|_| anyhow!("unknown class label {}", label))
            })
            .collect()
    }
}

/// Fraction of positions where `predicted` equals `truth`.
pub fn accuracy(predicted: &[usize], truth: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    hits as f64 / truth.len() as f64
}

/// Per-column standardisation to zero mean and unit (population) variance.
/// Constant columns are only centred.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(x: ArrayView2<'_, f64>) -> Result<Self> {
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| anyhow!("cannot fit a scaler on zero samples"))?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std > 0.0 { std } else { 1.0 });
        Ok(Self { mean, scale })
    }

    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Array2<f64> {
        (&x - &self.mean) / &self.scale
    }
}

/// Wraps a candidate so its model sees standardised features; the scaler is
/// fitted on the training data only.
#[derive(Debug, Clone)]
pub struct Standardized<C>(pub C);

#[derive(Debug)]
pub struct StandardizedModel<M> {
    scaler: StandardScaler,
    model: M,
}

impl<C: Candidate> Candidate for Standardized<C> {
    type Model = StandardizedModel<C::Model>;

    fn fit(&self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<Self::Model> {
        let scaler = StandardScaler::fit(x)?;
        let model = self.0.fit(scaler.transform(x).view(), y, n_classes)?;
        Ok(StandardizedModel { scaler, model })
    }
}

impl<M: Predict> Predict for StandardizedModel<M> {
    fn predict(&self, x: ArrayView2<'_, f64>) -> Vec<usize> {
        self.model.predict(self.scaler.transform(x).view())
    }
}

/// Copy a row-major matrix into one owned vector per row.
pub(crate) fn owned_rows(x: ArrayView2<'_, f64>) -> Vec<Vec<f64>> {
    x.rows().into_iter().map(|row| row.to_vec()).collect()
}
