#[cfg(test)]
mod tests {
    use crate::score::{
        MULTI_CORE_REFERENCE, SCORE_SCALE, SINGLE_CORE_REFERENCE, ScoreAccumulator, ScoreConfig, normalized_score,
    };

    #[test]
    fn test_score_is_reference_over_mean() {
        assert_eq!(normalized_score(10.0, &[5.0, 15.0], 1000.0), Some(1000));
        assert_eq!(normalized_score(10.0, &[5.0], 1000.0), Some(2000));
        assert_eq!(normalized_score(3.0, &[2.0, 2.0, 2.0], 100.0), Some(150));
    }

    #[test]
    fn test_empty_sequence_has_no_score() {
        assert_eq!(normalized_score(10.0, &[], 1000.0), None);
    }

    #[test]
    fn test_instant_timings_stay_finite() {
        let score = normalized_score(SINGLE_CORE_REFERENCE, &[0.0, 0.0], SCORE_SCALE).expect("score");
        assert!(score > 0);
        assert!(score < u64::MAX);
    }

    #[test]
    fn test_accumulator_omits_multi_score_on_single_core_host() {
        let mut acc = ScoreAccumulator::new();
        acc.push_single_core(SINGLE_CORE_REFERENCE);
        acc.push_multi_core(MULTI_CORE_REFERENCE);
        assert_eq!(acc.single_core().len(), 1);
        assert_eq!(acc.multi_core().len(), 1);

        let scores = acc.clone().finish(&ScoreConfig::default(), false);
        assert_eq!(scores.single_core, Some(1000));
        assert_eq!(scores.multi_core, None);

        let scores = acc.finish(&ScoreConfig::default(), true);
        assert_eq!(scores.multi_core, Some(1000));
    }

    #[test]
    fn test_config_defaults_and_partial_override() {
        let defaults = ScoreConfig::default();
        assert_eq!(defaults.single_core_reference, SINGLE_CORE_REFERENCE);
        assert_eq!(defaults.multi_core_reference, MULTI_CORE_REFERENCE);
        assert_eq!(defaults.scale, SCORE_SCALE);

        let config = ScoreConfig::from_toml_str("single_core_reference = 4.5\n").expect("parse");
        assert_eq!(config.single_core_reference, 4.5);
        assert_eq!(config.multi_core_reference, MULTI_CORE_REFERENCE);
    }

    #[test]
    fn test_config_rejects_non_positive_values() {
        let err = ScoreConfig::from_toml_str("scale = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("scale"));
        assert!(ScoreConfig::from_toml_str("multi_core_reference = -1.0\n").is_err());
        assert!(ScoreConfig::from_toml_str("scale = \"big\"\n").is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("references.toml");
        std::fs::write(&path, "multi_core_reference = 12.0\nscale = 100.0\n").expect("write");
        let config = ScoreConfig::load(&path).expect("load");
        assert_eq!(config.multi_core_reference, 12.0);
        assert_eq!(config.scale, 100.0);

        let missing = ScoreConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(format!("{:#}", missing).contains("nope.toml"));
    }
}
