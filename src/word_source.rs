use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::language::Language;

/// Words generated when a session starts or resets
pub const INITIAL_BATCH: usize = 1000;
/// Words appended each time the cursor nears the tail
pub const EXTEND_BATCH: usize = 500;
/// Remaining-word distance at which the sequence is extended
pub const LOOKAHEAD: usize = 100;

/// Draw `count` words independently and uniformly (with replacement).
///
/// An empty vocabulary yields an empty batch.
pub fn sample<R: Rng + ?Sized>(vocabulary: &[String], count: usize, rng: &mut R) -> Vec<String> {
    (0..count)
        .filter_map(|_| vocabulary.choose(rng).cloned())
        .collect()
}

/// Produces the lazily extended stream of practice words
#[derive(Debug, Clone)]
pub struct WordSource {
    vocabulary: Vec<String>,
    rng: StdRng,
    initial_batch: usize,
    extend_batch: usize,
    lookahead: usize,
}

impl WordSource {
    pub fn new(language: &Language) -> Self {
        Self::with_rng(language, StdRng::from_entropy())
    }

    /// Deterministic word stream, used by `--seed` and tests
    pub fn with_seed(language: &Language, seed: u64) -> Self {
        Self::with_rng(language, StdRng::seed_from_u64(seed))
    }

    fn with_rng(language: &Language, rng: StdRng) -> Self {
        Self {
            vocabulary: language.words.clone(),
            rng,
            initial_batch: INITIAL_BATCH,
            extend_batch: EXTEND_BATCH,
            lookahead: LOOKAHEAD,
        }
    }

    pub fn with_batches(mut self, initial: usize, extend: usize) -> Self {
        self.initial_batch = initial.max(1);
        self.extend_batch = extend.max(1);
        self
    }

    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn generate(&mut self, count: usize) -> Vec<String> {
        sample(&self.vocabulary, count, &mut self.rng)
    }

    /// A fresh sequence of `initial_batch` words
    pub fn initial(&mut self) -> Vec<String> {
        self.generate(self.initial_batch)
    }

    pub fn needs_extension(&self, words: &[String], word_index: usize) -> bool {
        word_index + self.lookahead >= words.len()
    }

    /// Append a batch when `word_index` is within the lookahead of the tail.
    /// Existing entries are never touched. Returns the number of words added.
    pub fn extend(&mut self, words: &mut Vec<String>, word_index: usize) -> usize {
        if !self.needs_extension(words, word_index) {
            return 0;
        }

        let batch = self.generate(self.extend_batch);
        let added = batch.len();
        words.extend(batch);

        tracing::debug!(word_index, added, total = words.len(), "extended word stream");
        added
    }
}
