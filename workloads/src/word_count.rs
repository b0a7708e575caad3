//! Counts how often each entry of an English word list occurs in a reference
//! text. The word list is split into one contiguous slice per worker.

use anyhow::Result;
use skperf_core::mapper::partition;
use skperf_core::{FixtureSet, Mapper, Workload};
use std::collections::HashMap;
use tracing::debug;

pub const TEXT_FIXTURE: &str = "hamlet";
pub const WORDS_FIXTURE: &str = "words";

/// Non-overlapping substring occurrences of every word in `text`.
pub fn count_occurrences<'w>(text: &str, words: &[&'w str]) -> HashMap<&'w str, usize> {
    words
        .iter()
        .map(|word| (*word, text.matches(*word).count()))
        .collect()
}

/// Count `words` in `text` using `degree` slices of the word list. Partial
/// maps are merged in slice order; a word listed more than once keeps the
/// count from the last slice that holds it.
pub fn word_count<'w>(text: &str, words: &[&'w str], degree: usize, map: &Mapper) -> HashMap<&'w str, usize> {
    let slices: Vec<&[&'w str]> = partition(words.len(), degree)
        .into_iter()
        .map(|range| &words[range])
        .collect();
    let partials = map.map(|slice| count_occurrences(text, slice), slices);

    let mut merged = HashMap::with_capacity(words.len());
    for partial in partials {
        merged.extend(partial);
    }
    merged
}

/// Word list parsing: one word per whitespace-separated token.
pub fn split_words(raw: &str) -> Vec<&str> {
    raw.split_whitespace().collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WordCount;

impl Workload for WordCount {
    fn run(&self, degree: usize, map: &Mapper, fixtures: &FixtureSet) -> Result<()> {
        let text = fixtures.text(TEXT_FIXTURE)?;
        let raw_words = fixtures.text(WORDS_FIXTURE)?;
        let words = split_words(&raw_words);
        let counts = word_count(&text, &words, degree, map);
        debug!(words = words.len(), distinct = counts.len(), "word count finished");
        Ok(())
    }
}
