#[cfg(test)]
mod tests {
    use crate::word_count::{TEXT_FIXTURE, WORDS_FIXTURE, WordCount, count_occurrences, split_words, word_count};
    use skperf_core::{FixtureSet, Mapper, Workload};

    const TEXT: &str = "To be, or not to be, that is the question: \
                        Whether 'tis nobler in the mind to suffer";

    #[test]
    fn test_single_slice_matches_direct_count() {
        let words = ["be", "to", "the", "question", "absent", "o"];
        let mapper = Mapper::with_workers(1).expect("mapper");
        let counts = word_count(TEXT, &words, 1, &mapper);
        assert_eq!(counts, count_occurrences(TEXT, &words));
        assert_eq!(counts["be"], 2);
        assert_eq!(counts["to"], 2);
        assert_eq!(counts["the"], 3);
        assert_eq!(counts["absent"], 0);
    }

    #[test]
    fn test_every_degree_agrees_with_direct_count() {
        let words = split_words("a be in is mind not or question suffer that the to whether xyz");
        let expected = count_occurrences(TEXT, &words);
        for degree in 1..=(words.len() + 3) {
            let mapper = Mapper::with_workers(degree.min(4)).expect("mapper");
            let counts = word_count(TEXT, &words, degree, &mapper);
            assert_eq!(counts, expected, "degree {degree}");
        }
    }

    #[test]
    fn test_matches_are_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", &["aa"])["aa"], 2);
    }

    #[test]
    fn test_workload_reads_both_fixtures() {
        let mut fixtures = FixtureSet::new();
        fixtures.insert(TEXT_FIXTURE, TEXT.as_bytes());
        fixtures.insert(WORDS_FIXTURE, "be\nto\nthe\n".as_bytes());
        let mapper = Mapper::with_workers(2).expect("mapper");
        WordCount.run(2, &mapper, &fixtures).expect("run");

        let mut missing = FixtureSet::new();
        missing.insert(TEXT_FIXTURE, TEXT.as_bytes());
        assert!(WordCount.run(1, &Mapper::Sequential, &missing).is_err());
    }
}
