#[cfg(test)]
mod tests {
    use crate::ml::svm::{Kernel, SupportVectorSearch, SvcParams, default_grid};
    use crate::ml::{Candidate, Predict, accuracy};
    use crate::shuttle;
    use ndarray::{Array2, array};
    use skperf_core::{FixtureSet, Mapper, Workload};

    /// Three well separated blobs around (0,0), (5,5) and (0,5).
    fn blobs() -> (Array2<f64>, Vec<usize>) {
        let centres = [(0.0, 0.0), (5.0, 5.0), (0.0, 5.0)];
        let offsets = [(-0.3, 0.1), (0.2, -0.2), (0.1, 0.3), (-0.1, -0.25), (0.25, 0.2)];
        let mut values = Vec::new();
        let mut labels = Vec::new();
        for (class, (cx, cy)) in centres.iter().enumerate() {
            for (dx, dy) in offsets {
                values.extend([cx + dx, cy + dy]);
                labels.push(class);
            }
        }
        (Array2::from_shape_vec((labels.len(), 2), values).expect("shape"), labels)
    }

    #[test]
    fn test_kernels() {
        assert_eq!(Kernel::Linear.eval(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
        assert_eq!(Kernel::Rbf { gamma: 0.5 }.eval(&[1.0, 1.0], &[1.0, 1.0]), 1.0);
        let k = Kernel::Rbf { gamma: 0.5 }.eval(&[0.0, 0.0], &[1.0, 1.0]);
        assert!((k - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_linear_svc_separates_blobs() {
        let (x, y) = blobs();
        let model = SvcParams::new(10.0, Kernel::Linear).fit(x.view(), &y, 3).expect("fit");
        assert_eq!(accuracy(&model.predict(x.view()), &y), 1.0);
        assert!(model.support_vector_count() > 0);

        let probes = array![[0.2, -0.1], [4.8, 5.1], [-0.2, 5.2]];
        assert_eq!(model.predict(probes.view()), vec![0, 1, 2]);
    }

    #[test]
    fn test_rbf_svc_separates_blobs() {
        let (x, y) = blobs();
        let model = SvcParams::new(100.0, Kernel::Rbf { gamma: 0.5 })
            .fit(x.view(), &y, 3)
            .expect("fit");
        assert_eq!(accuracy(&model.predict(x.view()), &y), 1.0);
    }

    #[test]
    fn test_single_class_training_predicts_that_class() {
        let x = array![[0.0, 1.0], [1.0, 0.0]];
        let model = SvcParams::new(1.0, Kernel::Linear).fit(x.view(), &[2, 2], 4).expect("fit");
        assert_eq!(model.predict(array![[9.0, 9.0]].view()), vec![2]);
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let x = array![[0.0, 1.0], [1.0, 0.0]];
        assert!(SvcParams::new(0.0, Kernel::Linear).fit(x.view(), &[0, 1], 2).is_err());
        assert!(SvcParams::new(1.0, Kernel::Linear).fit(x.view(), &[0], 2).is_err());
        assert!(SvcParams::new(1.0, Kernel::Linear).fit(x.view(), &[0, 5], 2).is_err());
    }

    #[test]
    fn test_default_grid_shape() {
        let grid = default_grid();
        assert_eq!(grid.len(), 12);
        assert!(grid[..4].iter().all(|cand| cand.0.kernel == Kernel::Linear));
        assert_eq!(grid[4].0.kernel, Kernel::Rbf { gamma: 1e-3 });
        assert_eq!(grid[5].0.kernel, Kernel::Rbf { gamma: 1e-4 });
        assert_eq!(grid[11].0.c, 1000.0);
    }

    #[test]
    fn test_workload_runs_on_small_table() {
        let (x, y) = blobs();
        let table: String = x
            .rows()
            .into_iter()
            .zip(&y)
            .map(|(row, label)| format!("{} 0 0 {} {}\n", row[0], row[1], label + 1))
            .collect();
        let mut fixtures = FixtureSet::new();
        fixtures.insert(shuttle::FIXTURE, table.into_bytes());
        let mapper = Mapper::with_workers(2).expect("mapper");
        SupportVectorSearch::default().run(2, &mapper, &fixtures).expect("run");
    }
}
