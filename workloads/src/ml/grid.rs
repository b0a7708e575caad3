use crate::ml::{Candidate, Predict, accuracy};
use anyhow::{Result, bail};
use ndarray::{ArrayView2, Axis};
use skperf_core::Mapper;
use tracing::debug;

/// Train/test index sets for one cross-validation fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified, unshuffled k-fold split. The samples of each class are dealt
/// round-robin over the folds in index order, so every fold sees roughly the
/// same class proportions.
pub fn stratified_folds(y: &[usize], folds: usize) -> Result<Vec<Fold>> {
    if folds < 2 {
        bail!("cross-validation needs at least 2 folds, got {}", folds);
    }
    if folds > y.len() {
        bail!("cannot split {} samples into {} folds", y.len(), folds);
    }

    let n_classes = y.iter().max().map_or(0, |max| max + 1);
    let mut seen = vec![0usize; n_classes];
    let mut assignment = Vec::with_capacity(y.len());
    for &class in y {
        assignment.push(seen[class] % folds);
        seen[class] += 1;
    }

    Ok((0..folds)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) = (0..y.len()).partition(|&idx| assignment[idx] == fold);
            Fold { train, test }
        })
        .collect())
}

#[derive(Debug)]
pub struct GridResult<M> {
    pub best_index: usize,
    /// Mean fold accuracy per candidate, in candidate order.
    pub mean_scores: Vec<f64>,
    pub best_model: M,
}

/// Exhaustive search over `candidates` with stratified `folds`-fold
/// cross-validation scored by accuracy. Every (candidate, fold) fit is an
/// independent job on `map`; ties go to the earlier candidate. The winner is
/// refitted on all of `x`.
pub fn grid_search<C: Candidate>(
    candidates: &[C],
    x: ArrayView2<'_, f64>,
    y: &[usize],
    n_classes: usize,
    folds: usize,
    map: &Mapper,
) -> Result<GridResult<C::Model>> {
    if candidates.is_empty() {
        bail!("grid search needs at least one candidate");
    }
    let splits = stratified_folds(y, folds)?;
    let jobs: Vec<(usize, usize)> = (0..candidates.len())
        .flat_map(|cand| (0..splits.len()).map(move |fold| (cand, fold)))
        .collect();

    let scores = map.try_map(
        |(cand, fold)| -> Result<f64> {
            let Fold { train, test } = &splits[fold];
            let y_train: Vec<usize> = train.iter().map(|&idx| y[idx]).collect();
            let model = candidates[cand].fit(x.select(Axis(0), train).view(), &y_train, n_classes)?;
            let predicted = model.predict(x.select(Axis(0), test).view());
            let y_test: Vec<usize> = test.iter().map(|&idx| y[idx]).collect();
            Ok(accuracy(&predicted, &y_test))
        },
        jobs,
    )?;

    let mean_scores: Vec<f64> = scores
        .chunks(splits.len())
        .map(|fold_scores| fold_scores.iter().sum::<f64>() / fold_scores.len() as f64)
        .collect();
    let mut best_index = 0;
    for (idx, score) in mean_scores.iter().enumerate() {
        if *score > mean_scores[best_index] {
            best_index = idx;
        }
    }
    debug!(
        candidate = ?candidates[best_index],
        score = mean_scores[best_index],
        "grid search picked candidate"
    );

    let best_model = candidates[best_index].fit(x, y, n_classes)?;
    Ok(GridResult {
        best_index,
        mean_scores,
        best_model,
    })
}
