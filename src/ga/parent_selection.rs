use clap::ArgEnum;
use float_ord::FloatOrd;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::traits::ParentSelection;
use crate::utils;

/// The parent selection strategies available from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ArgEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionKind {
    Roulette,
    Tournament,
}

/// Roulette-wheel selection for minimization. Each individual is weighted by how much better it is
/// than the worst one, `worst - fitness + EPSILON`, so that even the worst has a (small) chance.
#[derive(Debug, Clone, Default)]
pub struct Roulette {
    weights: Vec<f64>,
    total: f64,
}

impl Roulette {
    pub fn new() -> Self {
        Roulette::default()
    }
}

impl ParentSelection for Roulette {
    fn init(&mut self, fitness_values: Vec<f64>) {
        let worst = fitness_values
            .iter()
            .map(|&f| FloatOrd(f))
            .max()
            .map_or(0.0, |f| f.0);

        self.weights.clear();
        self.weights
            .extend(fitness_values.into_iter().map(|f| worst - f + utils::EPSILON));
        self.total = self.weights.iter().sum();
    }

    /// Panics if initialized without any fitness values
    fn sample(&mut self, rng: &mut dyn RngCore) -> usize {
        let threshold = rng.gen_range(0.0..self.total);
        let mut sum = 0.0;

        for (i, w) in self.weights.iter().enumerate() {
            sum += *w;
            if sum > threshold {
                return i;
            }
        }

        // Only reachable through rounding in the running sum
        self.weights.len() - 1
    }
}

/// Tournament-style parent selection. Select `k` random individuals from the population, and choose the best among them for reproduction.
#[derive(Debug, Clone)]
pub struct Tournament {
    k: usize,
    buffer: Vec<f64>,
}

impl Tournament {
    pub fn new(k: usize) -> Option<Self> {
        if k > 0 {
            Tournament {
                k,
                buffer: Vec::new(),
            }
            .into()
        } else {
            None
        }
    }
}

impl ParentSelection for Tournament {
    fn init(&mut self, fitness_values: Vec<f64>) {
        self.buffer.clear();
        self.buffer.extend(fitness_values);
    }

    fn sample(&mut self, rng: &mut dyn RngCore) -> usize {
        let k = self.k.min(self.buffer.len());
        let drawn = rand::seq::index::sample(rng, self.buffer.len(), k);

        drawn
            .iter()
            .min_by_key(|&x| FloatOrd(self.buffer[x]))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn roulette_favours_low_fitness() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut roulette = Roulette::new();
        roulette.init(vec![100.0, 10.0, 60.0]);

        let mut counts = [0; 3];
        for _ in 0..3000 {
            counts[roulette.sample(&mut rng)] += 1;
        }

        assert!(counts[1] > counts[2]);
        assert!(counts[2] > counts[0]);
    }

    #[test]
    fn roulette_with_equal_fitness_is_uniform() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut roulette = Roulette::new();
        roulette.init(vec![5.0; 4]);

        let mut counts = [0; 4];
        for _ in 0..4000 {
            counts[roulette.sample(&mut rng)] += 1;
        }

        assert!(counts.iter().all(|&c| c > 800));
    }

    #[test]
    fn full_tournament_picks_the_best() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut tournament = Tournament::new(4).unwrap();
        tournament.init(vec![3.0, 1.0, 4.0, 1.5]);

        for _ in 0..20 {
            assert_eq!(tournament.sample(&mut rng), 1);
        }
    }

    #[test]
    fn tournament_needs_participants() {
        assert!(Tournament::new(0).is_none());

        let mut rng = StdRng::seed_from_u64(4);
        let mut tournament = Tournament::new(10).unwrap();
        tournament.init(vec![2.0, 1.0]);
        assert_eq!(tournament.sample(&mut rng), 1);
    }
}
