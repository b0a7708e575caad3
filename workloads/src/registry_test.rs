#[cfg(test)]
mod tests {
    use crate::{NASA_DATA, SHUTTLE_DATA, SWISSPROT_DATA, default_registry};

    #[test]
    fn test_default_suite_order_and_eligibility() {
        let registry = default_registry().expect("default registry");
        assert_eq!(
            registry.names(),
            vec![
                "locally linear embedding",
                "random forest",
                "support vector machine",
                "xml parsing",
                "lzma",
                "sha512",
                "boyer-moore/horspool",
            ]
        );
        let multicore: Vec<&str> = registry
            .iter()
            .filter(|entry| entry.is_multicore())
            .map(|entry| entry.name())
            .collect();
        assert_eq!(
            multicore,
            vec!["random forest", "support vector machine", "boyer-moore/horspool"]
        );
    }

    #[test]
    fn test_default_suite_fixture_bindings() {
        let registry = default_registry().expect("default registry");
        let url = |workload: &str, fixture: &str| {
            registry
                .get(workload)
                .expect("workload")
                .fixtures()
                .url(fixture)
                .map(str::to_string)
        };
        assert_eq!(url("xml parsing", "test_data").as_deref(), Some(NASA_DATA));
        assert_eq!(url("lzma", "test_data").as_deref(), Some(NASA_DATA));
        assert_eq!(url("sha512", "test_data").as_deref(), Some(SWISSPROT_DATA));
        assert_eq!(url("random forest", "shuttle_data").as_deref(), Some(SHUTTLE_DATA));

        let words = registry.get("boyer-moore/horspool").expect("workload");
        assert_eq!(words.fixtures().len(), 2);
        assert!(words.fixtures().url("hamlet").is_some());
        assert!(words.fixtures().url("words").is_some());
    }
}
