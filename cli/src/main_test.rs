mod tests {
    use crate::*;

    #[test]
    fn test_no_arguments_runs_everything_as_text() {
        let args = CliArgs::try_parse_from(["skperf"]).expect("should parse");
        assert_eq!(args.cores, None);
        assert!(args.only.is_empty());
        assert!(!args.list);
        assert_eq!(args.references, None);
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_only_is_repeatable() {
        let args = CliArgs::try_parse_from(["skperf", "--only", "lzma", "--only", "sha512", "--format", "json"])
            .expect("should parse");
        assert_eq!(args.only, vec!["lzma".to_string(), "sha512".to_string()]);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_core_count_must_be_positive() {
        assert_eq!(parse_core_count("4"), Ok(4));
        assert!(parse_core_count("0").is_err());
        assert!(parse_core_count("many").is_err());
        assert!(CliArgs::try_parse_from(["skperf", "--cores", "0"]).is_err());
        let args = CliArgs::try_parse_from(["skperf", "--cores", "3"]).expect("should parse");
        assert_eq!(args.cores, Some(3));
    }

    #[test]
    fn test_trace_setting_parse() {
        assert_eq!(TraceSetting::parse(""), TraceSetting::Off);
        assert_eq!(TraceSetting::parse("off"), TraceSetting::Off);
        assert_eq!(TraceSetting::parse("FALSE"), TraceSetting::Off);
        assert_eq!(TraceSetting::parse("1"), TraceSetting::Default);
        assert_eq!(TraceSetting::parse("On"), TraceSetting::Default);
        assert_eq!(
            TraceSetting::parse(" skperf_core=debug "),
            TraceSetting::Filter("skperf_core=debug".to_string())
        );

        assert!(TraceSetting::Off.filter().is_none());
        assert!(TraceSetting::Filter("skperf_core=debug".to_string()).filter().is_some());
        // Unparseable directives fall back to the default filter.
        assert!(TraceSetting::Filter("skperf_core=loudly".to_string()).filter().is_some());
    }

    #[test]
    fn test_build_registry_filters_in_registry_order() {
        let registry = build_registry(&["sha512".to_string(), "xml parsing".to_string()]).expect("registry");
        assert_eq!(registry.names(), vec!["xml parsing", "sha512"]);

        let err = build_registry(&["quantum annealing".to_string()]).unwrap_err();
        assert!(err.to_string().contains("quantum annealing"));
    }

    #[test]
    fn test_listing_shows_flags_and_fixtures() {
        let registry = build_registry(&["boyer-moore/horspool".to_string()]).expect("registry");
        let mut out = Vec::new();
        write_listing(&registry, &mut out).expect("listing");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "boyer-moore/horspool\tmulticore=true\tfixtures=hamlet,words\n"
        );
    }

    #[test]
    fn test_references_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("refs.toml");
        std::fs::write(&path, "single_core_reference = 2.0\n").expect("write");
        let config = load_score_config(Some(&path)).expect("config");
        assert_eq!(config.single_core_reference, 2.0);
        assert_eq!(load_score_config(None).expect("default"), ScoreConfig::default());

        let missing = dir.path().join("missing.toml");
        assert!(load_score_config(Some(&missing)).is_err());
    }
}
