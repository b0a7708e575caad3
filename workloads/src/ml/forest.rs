//! Random forest classifier: bootstrapped CART trees with per-split feature
//! sampling, predicting the class with the highest mean leaf probability.

use crate::ml::grid::grid_search;
use crate::ml::{Candidate, LabelEncoder, Predict};
use crate::shuttle::{self, parse_shuttle};
use anyhow::{Result, bail};
use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use skperf_core::{FixtureSet, Mapper, Workload};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Gini,
    Entropy,
}

impl Criterion {
    fn impurity(&self, counts: &[usize], total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;
        match self {
            Criterion::Gini => {
                1.0 - counts
                    .iter()
                    .map(|&count| {
                        let p = count as f64 / total;
                        p * p
                    })
                    .sum::<f64>()
            }
            Criterion::Entropy => -counts
                .iter()
                .filter(|&&count| count > 0)
                .map(|&count| {
                    let p = count as f64 / total;
                    p * p.log2()
                })
                .sum::<f64>(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub criterion: Criterion,
    /// Nodes with fewer samples become leaves.
    pub min_samples_split: usize,
    /// Features examined per split; `None` means `floor(sqrt(n_features))`.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl ForestParams {
    pub fn new(criterion: Criterion, min_samples_split: usize) -> Self {
        Self {
            n_trees: 500,
            criterion,
            min_samples_split,
            max_features: None,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf { distribution: Vec<f64> },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn leaf_distribution(&self, x: ArrayView2<'_, f64>, row: usize) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split { feature, threshold, left, right } => {
                    idx = if x[[row, *feature]] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Grows one tree over `samples` (indices into `x`, repeats allowed).
struct TreeBuilder<'a> {
    x: ArrayView2<'a, f64>,
    y: &'a [usize],
    n_classes: usize,
    criterion: Criterion,
    min_samples_split: usize,
    max_features: usize,
}

impl TreeBuilder<'_> {
    fn build(&self, samples: Vec<usize>, rng: &mut StdRng) -> DecisionTree {
        let mut nodes = vec![Node::Leaf { distribution: Vec::new() }];
        let mut pending = vec![(0usize, samples)];

        while let Some((idx, samples)) = pending.pop() {
            let counts = self.class_counts(&samples);
            let pure = counts.iter().filter(|&&count| count > 0).count() <= 1;
            let split = if pure || samples.len() < self.min_samples_split {
                None
            } else {
                self.best_split(&samples, rng)
            };

            match split {
                None => {
                    let total = samples.len().max(1) as f64;
                    nodes[idx] = Node::Leaf {
                        distribution: counts.iter().map(|&count| count as f64 / total).collect(),
                    };
                }
                Some(choice) => {
                    let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                        .into_iter()
                        .partition(|&sample| self.x[[sample, choice.feature]] <= choice.threshold);
                    if left_samples.is_empty() || right_samples.is_empty() {
                        let total = (left_samples.len() + right_samples.len()).max(1) as f64;
                        nodes[idx] = Node::Leaf {
                            distribution: counts.iter().map(|&count| count as f64 / total).collect(),
                        };
                        continue;
                    }
                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(Node::Leaf { distribution: Vec::new() });
                    nodes.push(Node::Leaf { distribution: Vec::new() });
                    nodes[idx] = Node::Split {
                        feature: choice.feature,
                        threshold: choice.threshold,
                        left,
                        right,
                    };
                    pending.push((right, right_samples));
                    pending.push((left, left_samples));
                }
            }
        }
        DecisionTree { nodes }
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &sample in samples {
            counts[self.y[sample]] += 1;
        }
        counts
    }

    /// Visits features in random order until `max_features` non-constant
    /// ones were examined.
    fn best_split(&self, samples: &[usize], rng: &mut StdRng) -> Option<SplitChoice> {
        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(rng);

        let mut best: Option<SplitChoice> = None;
        let mut examined = 0;
        for feature in features {
            if examined == self.max_features {
                break;
            }
            let mut column: Vec<(f64, usize)> = samples
                .iter()
                .map(|&sample| (self.x[[sample, feature]], self.y[sample]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));
            if column[0].0 >= column[column.len() - 1].0 {
                continue;
            }
            examined += 1;

            let total = column.len();
            let mut right_counts = vec![0usize; self.n_classes];
            for (_, class) in &column {
                right_counts[*class] += 1;
            }
            let mut left_counts = vec![0usize; self.n_classes];
            for pos in 1..total {
                let class = column[pos - 1].1;
                left_counts[class] += 1;
                right_counts[class] -= 1;
                if column[pos - 1].0 >= column[pos].0 {
                    continue;
                }
                let impurity = pos as f64 * self.criterion.impurity(&left_counts, pos)
                    + (total - pos) as f64 * self.criterion.impurity(&right_counts, total - pos);
                if best.as_ref().is_none_or(|current| impurity < current.impurity) {
                    let (below, above) = (column[pos - 1].0, column[pos].0);
                    // Adjacent floats: the midpoint rounds up to `above`.
                    let mut threshold = below + (above - below) / 2.0;
                    if threshold >= above {
                        threshold = below;
                    }
                    best = Some(SplitChoice { feature, threshold, impurity });
                }
            }
        }
        best
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean of the per-tree leaf class distributions for each row.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Vec<Vec<f64>> {
        (0..x.nrows())
            .map(|row| {
                let mut mean = vec![0.0; self.n_classes];
                for tree in &self.trees {
                    for (acc, p) in mean.iter_mut().zip(tree.leaf_distribution(x, row)) {
                        *acc += p;
                    }
                }
                let n = self.trees.len().max(1) as f64;
                mean.iter_mut().for_each(|p| *p /= n);
                mean
            })
            .collect()
    }
}

impl Predict for RandomForest {
    fn predict(&self, x: ArrayView2<'_, f64>) -> Vec<usize> {
        self.predict_proba(x)
            .into_iter()
            .map(|proba| {
                let mut best = 0;
                for (class, p) in proba.iter().enumerate() {
                    if *p > proba[best] {
                        best = class;
                    }
                }
                best
            })
            .collect()
    }
}

impl Candidate for ForestParams {
    type Model = RandomForest;

    fn fit(&self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<RandomForest> {
        if x.nrows() != y.len() || y.is_empty() {
            bail!("cannot fit on {} samples with {} labels", x.nrows(), y.len());
        }
        if let Some(class) = y.iter().find(|&&class| class >= n_classes) {
            bail!("class index {} out of range for {} classes", class, n_classes);
        }
        if self.n_trees == 0 {
            bail!("a forest needs at least one tree");
        }
        let builder = TreeBuilder {
            x: x.reborrow(),
            y,
            n_classes,
            criterion: self.criterion,
            min_samples_split: self.min_samples_split.max(2),
            max_features: self
                .max_features
                .unwrap_or_else(|| (x.ncols() as f64).sqrt() as usize)
                .clamp(1, x.ncols().max(1)),
        };

        let n = y.len();
        let trees = (0..self.n_trees)
            .map(|tree| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(tree as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                builder.build(bootstrap, &mut rng)
            })
            .collect();
        Ok(RandomForest { trees, n_classes })
    }
}

/// Both criteria crossed with `min_samples_split` in `2..=10`.
pub fn default_grid() -> Vec<ForestParams> {
    [Criterion::Gini, Criterion::Entropy]
        .into_iter()
        .flat_map(|criterion| (2..=10).map(move |split| ForestParams::new(criterion, split)))
        .collect()
}

/// Grid search of a random forest over the shuttle data.
#[derive(Debug, Clone)]
pub struct RandomForestSearch {
    pub folds: usize,
    pub n_trees: usize,
}

impl Default for RandomForestSearch {
    fn default() -> Self {
        Self { folds: 2, n_trees: 500 }
    }
}

impl Workload for RandomForestSearch {
    fn run(&self, _degree: usize, map: &Mapper, fixtures: &FixtureSet) -> Result<()> {
        let data = parse_shuttle(&fixtures.text(shuttle::FIXTURE)?)?;
        let encoder = LabelEncoder::fit(&data.targets);
        let y = encoder.encode(&data.targets)?;
        let grid: Vec<ForestParams> = default_grid()
            .into_iter()
            .map(|params| ForestParams { n_trees: self.n_trees, ..params })
            .collect();
        let result = grid_search(&grid, data.features.view(), &y, encoder.n_classes(), self.folds, map)?;
        debug!(
            best = ?grid[result.best_index],
            score = result.mean_scores[result.best_index],
            trees = result.best_model.trees().len(),
            "random forest grid search finished"
        );
        Ok(())
    }
}
