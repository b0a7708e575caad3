//! C-support vector classification.
//!
//! Binary problems are solved with SMO using second-order working set
//! selection; multi-class problems are decomposed one-vs-one and decided by
//! majority vote.

use crate::ml::grid::grid_search;
use crate::ml::{Candidate, LabelEncoder, Predict, Standardized, owned_rows};
use crate::shuttle::{self, parse_shuttle};
use anyhow::{Result, bail};
use ndarray::ArrayView2;
use skperf_core::{FixtureSet, Mapper, Workload};
use tracing::{debug, warn};

const TAU: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    Linear,
    Rbf { gamma: f64 },
}

impl Kernel {
    pub fn eval(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Kernel::Linear => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            Kernel::Rbf { gamma } => {
                let dist: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
                (-gamma * dist).exp()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvcParams {
    pub c: f64,
    pub kernel: Kernel,
    /// Stopping tolerance on the maximal KKT violation.
    pub tol: f64,
}

impl SvcParams {
    pub fn new(c: f64, kernel: Kernel) -> Self {
        Self { c, kernel, tol: 1e-3 }
    }
}

/// Decision function of one class pair: positive values vote for `positive`.
#[derive(Debug, Clone)]
struct BinaryModel {
    positive: usize,
    negative: usize,
    support: Vec<Vec<f64>>,
    /// `alpha_i * y_i` for each support vector.
    coef: Vec<f64>,
    rho: f64,
}

impl BinaryModel {
    fn decision(&self, kernel: Kernel, sample: &[f64]) -> f64 {
        let sum: f64 = self
            .support
            .iter()
            .zip(&self.coef)
            .map(|(sv, coef)| coef * kernel.eval(sv, sample))
            .sum();
        sum - self.rho
    }
}

#[derive(Debug, Clone)]
pub struct SvcModel {
    kernel: Kernel,
    pairs: Vec<BinaryModel>,
    /// Set when training saw a single class.
    constant: Option<usize>,
    n_classes: usize,
}

impl SvcModel {
    pub fn support_vector_count(&self) -> usize {
        self.pairs.iter().map(|pair| pair.support.len()).sum()
    }

    fn predict_one(&self, sample: &[f64]) -> usize {
        if let Some(class) = self.constant {
            return class;
        }
        let mut votes = vec![0usize; self.n_classes];
        for pair in &self.pairs {
            if pair.decision(self.kernel, sample) > 0.0 {
                votes[pair.positive] += 1;
            } else {
                votes[pair.negative] += 1;
            }
        }
        let mut best = 0;
        for (class, count) in votes.iter().enumerate() {
            if *count > votes[best] {
                best = class;
            }
        }
        best
    }
}

impl Predict for SvcModel {
    fn predict(&self, x: ArrayView2<'_, f64>) -> Vec<usize> {
        x.rows()
            .into_iter()
            .map(|row| match row.as_slice() {
                Some(sample) => self.predict_one(sample),
                None => self.predict_one(&row.to_vec()),
            })
            .collect()
    }
}

/// Dual solution of a binary problem: `(alpha, rho)`.
fn solve_binary(rows: &[&[f64]], y: &[f64], params: &SvcParams) -> (Vec<f64>, f64) {
    let n = rows.len();
    let c = params.c;
    let kernel = params.kernel;
    let qd: Vec<f64> = rows.iter().map(|row| kernel.eval(row, row)).collect();
    let mut alpha = vec![0.0; n];
    let mut grad = vec![-1.0; n];
    let mut ki = vec![0.0; n];
    let mut kj = vec![0.0; n];
    let max_iter = (100 * n).max(10_000_000);

    let mut iter = 0;
    while iter < max_iter {
        // First index: maximal violator from the "up" set.
        let mut gmax = f64::NEG_INFINITY;
        let mut i_sel = None;
        for t in 0..n {
            if y[t] > 0.0 {
                if alpha[t] < c && -grad[t] >= gmax {
                    gmax = -grad[t];
                    i_sel = Some(t);
                }
            } else if alpha[t] > 0.0 && grad[t] >= gmax {
                gmax = grad[t];
                i_sel = Some(t);
            }
        }
        let Some(i) = i_sel else { break };
        for (t, row) in rows.iter().enumerate() {
            ki[t] = kernel.eval(rows[i], row);
        }

        // Second index: largest objective decrease from the "low" set.
        let mut gmax2 = f64::NEG_INFINITY;
        let mut obj_min = f64::INFINITY;
        let mut j_sel = None;
        for t in 0..n {
            let grad_diff = if y[t] > 0.0 {
                if alpha[t] <= 0.0 {
                    continue;
                }
                gmax2 = gmax2.max(grad[t]);
                gmax + grad[t]
            } else {
                if alpha[t] >= c {
                    continue;
                }
                gmax2 = gmax2.max(-grad[t]);
                gmax - grad[t]
            };
            if grad_diff > 0.0 {
                let quad = qd[i] + qd[t] - 2.0 * ki[t];
                let obj = -(grad_diff * grad_diff) / if quad > 0.0 { quad } else { TAU };
                if obj <= obj_min {
                    obj_min = obj;
                    j_sel = Some(t);
                }
            }
        }
        let j = match j_sel {
            Some(j) if gmax + gmax2 >= params.tol => j,
            _ => break,
        };
        for (t, row) in rows.iter().enumerate() {
            kj[t] = kernel.eval(rows[j], row);
        }

        let (old_ai, old_aj) = (alpha[i], alpha[j]);
        let quad = (qd[i] + qd[j] - 2.0 * ki[j]).max(TAU);
        if y[i] != y[j] {
            let delta = (-grad[i] - grad[j]) / quad;
            let diff = alpha[i] - alpha[j];
            alpha[i] += delta;
            alpha[j] += delta;
            if diff > 0.0 {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = diff;
                }
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = c - diff;
                }
            } else {
                if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = -diff;
                }
                if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = c + diff;
                }
            }
        } else {
            let delta = (grad[i] - grad[j]) / quad;
            let sum = alpha[i] + alpha[j];
            alpha[i] -= delta;
            alpha[j] += delta;
            if sum > c {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = sum - c;
                }
                if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = sum - c;
                }
            } else {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = sum;
                }
                if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = sum;
                }
            }
        }

        let dai = (alpha[i] - old_ai) * y[i];
        let daj = (alpha[j] - old_aj) * y[j];
        for t in 0..n {
            grad[t] += y[t] * (ki[t] * dai + kj[t] * daj);
        }
        iter += 1;
    }
    if iter >= max_iter {
        warn!(iterations = iter, "SMO stopped at the iteration limit");
    }

    let rho = compute_rho(&alpha, &grad, y, c);
    (alpha, rho)
}

fn compute_rho(alpha: &[f64], grad: &[f64], y: &[f64], c: f64) -> f64 {
    let mut upper = f64::INFINITY;
    let mut lower = f64::NEG_INFINITY;
    let mut free_sum = 0.0;
    let mut free = 0usize;
    for t in 0..alpha.len() {
        let yg = y[t] * grad[t];
        let at_upper = alpha[t] >= c;
        let at_lower = alpha[t] <= 0.0;
        if at_upper {
            if y[t] < 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else if at_lower {
            if y[t] > 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else {
            free += 1;
            free_sum += yg;
        }
    }
    if free > 0 {
        free_sum / free as f64
    } else {
        (upper + lower) / 2.0
    }
}

impl Candidate for SvcParams {
    type Model = SvcModel;

    fn fit(&self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<SvcModel> {
        if self.c.is_nan() || self.c <= 0.0 {
            bail!("C must be positive, got {}", self.c);
        }
        if x.nrows() != y.len() || y.is_empty() {
            bail!("cannot fit on {} samples with {} labels", x.nrows(), y.len());
        }
        if let Some(class) = y.iter().find(|&&class| class >= n_classes) {
            bail!("class index {} out of range for {} classes", class, n_classes);
        }
        let rows = owned_rows(x);
        let mut present: Vec<usize> = y.to_vec();
        present.sort_unstable();
        present.dedup();

        let mut model = SvcModel {
            kernel: self.kernel,
            pairs: Vec::new(),
            constant: None,
            n_classes,
        };
        if present.len() == 1 {
            model.constant = Some(present[0]);
            return Ok(model);
        }

        for (a, &positive) in present.iter().enumerate() {
            for &negative in &present[a + 1..] {
                let members: Vec<usize> = (0..y.len())
                    .filter(|&idx| y[idx] == positive || y[idx] == negative)
                    .collect();
                let pair_rows: Vec<&[f64]> = members.iter().map(|&idx| rows[idx].as_slice()).collect();
                let signs: Vec<f64> = members
                    .iter()
                    .map(|&idx| if y[idx] == positive { 1.0 } else { -1.0 })
                    .collect();
                let (alpha, rho) = solve_binary(&pair_rows, &signs, self);

                let mut support = Vec::new();
                let mut coef = Vec::new();
                for (k, a_k) in alpha.iter().enumerate() {
                    if *a_k > 0.0 {
                        support.push(pair_rows[k].to_vec());
                        coef.push(a_k * signs[k]);
                    }
                }
                model.pairs.push(BinaryModel {
                    positive,
                    negative,
                    support,
                    coef,
                    rho,
                });
            }
        }
        Ok(model)
    }
}

/// The SVC grid: linear kernels over `C`, then RBF kernels over `C x gamma`.
pub fn default_grid() -> Vec<Standardized<SvcParams>> {
    const CS: [f64; 4] = [1.0, 10.0, 100.0, 1000.0];
    const GAMMAS: [f64; 2] = [1e-3, 1e-4];
    let linear = CS.iter().map(|&c| SvcParams::new(c, Kernel::Linear));
    let rbf = CS
        .iter()
        .flat_map(|&c| GAMMAS.iter().map(move |&gamma| SvcParams::new(c, Kernel::Rbf { gamma })));
    linear.chain(rbf).map(Standardized).collect()
}

/// Grid search of a standardised SVC over the shuttle data.
#[derive(Debug, Clone)]
pub struct SupportVectorSearch {
    pub folds: usize,
}

impl Default for SupportVectorSearch {
    fn default() -> Self {
        Self { folds: 2 }
    }
}

impl Workload for SupportVectorSearch {
    fn run(&self, _degree: usize, map: &Mapper, fixtures: &FixtureSet) -> Result<()> {
        let data = parse_shuttle(&fixtures.text(shuttle::FIXTURE)?)?;
        let encoder = LabelEncoder::fit(&data.targets);
        let y = encoder.encode(&data.targets)?;
        let grid = default_grid();
        let result = grid_search(&grid, data.features.view(), &y, encoder.n_classes(), self.folds, map)?;
        debug!(
            best = ?grid[result.best_index],
            score = result.mean_scores[result.best_index],
            support_vectors = result.best_model.model.support_vector_count(),
            "svm grid search finished"
        );
        Ok(())
    }
}
