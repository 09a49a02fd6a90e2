//! Random Sampler
//!
//! Draws one subject uniformly at random and strips every code snippet from
//! it, producing the payload handed to the problem-generation prompt. The
//! random source is injected so draws can be reproduced with a fixed seed.

use crate::{
    error::TopicError,
    library::{CONSTRUCTORS, Subject},
    topic::TopicNode,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::debug;

/// A freshly built subject tree with all `code` removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrunedTree {
    pub subject: Subject,
    pub root: TopicNode,
}

impl PrunedTree {
    /// The tree in its authored JSON shape, as embedded into prompts.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.root)
    }
}

/// Returns a copy of `tree` with every `code` snippet removed.
pub fn prune(tree: &TopicNode) -> TopicNode {
    tree.pruned()
}

/// Uniform subject sampler over an injectable random source.
///
/// Every draw is independent: the same subject can come up twice in a row.
#[derive(Debug, Clone)]
pub struct Sampler<R = StdRng> {
    rng: R,
}

impl Sampler<StdRng> {
    /// A reproducible sampler.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// A sampler seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Picks a subject with probability 1/6 each.
    pub fn pick_subject(&mut self) -> Subject {
        let index = self.rng.random_range(0..CONSTRUCTORS.len());
        CONSTRUCTORS[index].0
    }

    /// Picks a subject, builds its tree and prunes it.
    ///
    /// Constructor failures propagate unchanged.
    pub fn sample(&mut self) -> Result<PrunedTree, TopicError> {
        let subject = self.pick_subject();
        let tree = subject.build()?;
        let root = prune(&tree);
        debug!(%subject, nodes = root.node_count(), "Sampled subject tree");
        Ok(PrunedTree { subject, root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_sample_has_no_code_anywhere() {
        let mut sampler = Sampler::seeded(7);
        for _ in 0..24 {
            let pruned = sampler.sample().unwrap();
            assert!(!pruned.root.contains_code());
            assert!(!pruned.to_json().unwrap().contains("\"code\""));
        }
    }

    #[test]
    fn test_prune_preserves_shape_for_every_subject() {
        fn assert_same_shape(original: &TopicNode, pruned: &TopicNode) {
            assert_eq!(original.kind(), pruned.kind());
            assert_eq!(original.content(), pruned.content());
            assert_eq!(pruned.code(), None);
            assert_eq!(
                original.labels().collect::<Vec<_>>(),
                pruned.labels().collect::<Vec<_>>()
            );
            for label in original.labels() {
                assert_same_shape(
                    original.child(label).unwrap(),
                    pruned.child(label).unwrap(),
                );
            }
        }

        for subject in Subject::ALL {
            let original = subject.build().unwrap();
            let pruned = prune(&original);
            assert_same_shape(&original, &pruned);
            assert!(original.contains_code());
            assert!(original.depth() > 1);
        }
    }

    #[test]
    fn test_sample_matches_pruned_constructor_output() {
        let mut sampler = Sampler::seeded(11);
        let sampled = sampler.sample().unwrap();
        assert_eq!(sampled.root, sampled.subject.build().unwrap().pruned());
    }

    #[test]
    fn test_sample_draws_the_subject_pick_would() {
        let mut picker = Sampler::seeded(5);
        let mut sampler = Sampler::seeded(5);
        for _ in 0..30 {
            assert_eq!(sampler.sample().unwrap().subject, picker.pick_subject());
        }
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = Sampler::seeded(42);
        let mut b = Sampler::seeded(42);
        let draws_a: Vec<_> = (0..50).map(|_| a.pick_subject()).collect();
        let draws_b: Vec<_> = (0..50).map(|_| b.pick_subject()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_sampling_is_approximately_uniform() {
        const DRAWS: usize = 6000;
        let mut sampler = Sampler::seeded(2024);
        let mut counts: HashMap<Subject, usize> = HashMap::new();
        for _ in 0..DRAWS {
            *counts.entry(sampler.sample().unwrap().subject).or_default() += 1;
        }

        assert_eq!(counts.len(), 6, "every subject should be drawn: {counts:?}");
        let expected = DRAWS as f64 / 6.0;
        let chi_square: f64 = counts
            .values()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();
        // 99.9th percentile of chi-square with 5 degrees of freedom.
        assert!(chi_square < 20.52, "chi-square {chi_square} for {counts:?}");
    }
}
