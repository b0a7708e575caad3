//! Locally linear embedding with a dense eigensolver.

use crate::shuttle::{self, parse_shuttle};
use anyhow::{Result, anyhow, bail};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array2, ArrayView2};
use skperf_core::mapper::partition;
use skperf_core::{FixtureSet, Mapper, Workload};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct LleParams {
    pub n_neighbors: usize,
    pub n_components: usize,
    /// Regularisation added to each local Gram matrix, relative to its trace.
    pub reg: f64,
}

impl Default for LleParams {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            n_components: 2,
            reg: 1e-3,
        }
    }
}

fn squared_distance(x: ArrayView2<'_, f64>, a: usize, b: usize) -> f64 {
    x.row(a)
        .iter()
        .zip(x.row(b).iter())
        .map(|(p, q)| (p - q) * (p - q))
        .sum()
}

/// The `k` nearest other rows of every row, closest first; equal distances
/// are broken by row index. Rows are processed in one chunk per worker.
pub fn nearest_neighbors(x: ArrayView2<'_, f64>, k: usize, map: &Mapper) -> Vec<Vec<usize>> {
    let n = x.nrows();
    let chunks = partition(n, map.workers());
    let per_chunk = map.map(
        |rows: std::ops::Range<usize>| {
            rows.map(|row| {
                let mut others: Vec<(f64, usize)> = (0..n)
                    .filter(|&other| other != row)
                    .map(|other| (squared_distance(x, row, other), other))
                    .collect();
                let k = k.min(others.len());
                if k < others.len() {
                    others.select_nth_unstable_by(k, |a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                    others.truncate(k);
                }
                others.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                others.into_iter().map(|(_, other)| other).collect::<Vec<usize>>()
            })
            .collect::<Vec<_>>()
        },
        chunks,
    );
    per_chunk.into_iter().flatten().collect()
}

/// Weights reconstructing row `row` from `neighbors`, summing to one.
pub fn barycenter_weights(x: ArrayView2<'_, f64>, row: usize, neighbors: &[usize], reg: f64) -> Result<Vec<f64>> {
    let k = neighbors.len();
    let dim = x.ncols();
    let z = DMatrix::from_fn(k, dim, |i, j| x[[neighbors[i], j]] - x[[row, j]]);
    let mut gram = &z * z.transpose();
    let trace = gram.trace();
    let r = if trace > 0.0 { reg * trace } else { reg };
    for i in 0..k {
        gram[(i, i)] += r;
    }
    let w = gram
        .lu()
        .solve(&DVector::from_element(k, 1.0))
        .ok_or_else(|| anyhow!("singular local Gram matrix at row {}", row))?;
    let sum = w.sum();
    Ok(w.iter().map(|value| value / sum).collect())
}

/// Embed the rows of `x` into `n_components` dimensions.
pub fn locally_linear_embedding(x: ArrayView2<'_, f64>, params: &LleParams, map: &Mapper) -> Result<Array2<f64>> {
    let n = x.nrows();
    if params.n_neighbors == 0 || params.n_neighbors >= n {
        bail!("n_neighbors must be in 1..{}, got {}", n, params.n_neighbors);
    }
    if params.n_components == 0 || params.n_components >= n {
        bail!("n_components must be in 1..{}, got {}", n, params.n_components);
    }

    let neighbors = nearest_neighbors(x, params.n_neighbors, map);

    // M = (I - W)^T (I - W), accumulated one row of (I - W) at a time.
    let mut m = DMatrix::<f64>::zeros(n, n);
    for (row, nbrs) in neighbors.iter().enumerate() {
        let weights = barycenter_weights(x, row, nbrs, params.reg)?;
        let mut entries: Vec<(usize, f64)> = Vec::with_capacity(nbrs.len() + 1);
        entries.push((row, 1.0));
        entries.extend(nbrs.iter().zip(&weights).map(|(&col, &w)| (col, -w)));
        for &(p, a) in &entries {
            for &(q, b) in &entries {
                m[(p, q)] += a * b;
            }
        }
    }

    let eigen = m.symmetric_eigen();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    // The smallest eigenvector is the constant one; skip it.
    let picked = &order[1..=params.n_components];
    Ok(Array2::from_shape_fn((n, params.n_components), |(row, comp)| {
        eigen.eigenvectors[(row, picked[comp])]
    }))
}

/// Embeds the leading shuttle samples; neighbour search spreads over the
/// mapper.
#[derive(Debug, Clone)]
pub struct LocallyLinearEmbedding {
    pub samples: usize,
    pub params: LleParams,
}

impl Default for LocallyLinearEmbedding {
    fn default() -> Self {
        Self {
            samples: 4000,
            params: LleParams::default(),
        }
    }
}

impl Workload for LocallyLinearEmbedding {
    fn run(&self, _degree: usize, map: &Mapper, fixtures: &FixtureSet) -> Result<()> {
        let data = parse_shuttle(&fixtures.text(shuttle::FIXTURE)?)?.head(self.samples);
        let embedding = locally_linear_embedding(data.features.view(), &self.params, map)?;
        debug!(rows = embedding.nrows(), cols = embedding.ncols(), "embedding computed");
        Ok(())
    }
}
