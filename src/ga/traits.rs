use rand::{seq::SliceRandom, RngCore};

use crate::{
    solution::{Individual, SolutionError},
    utils,
};

/// A trait for enabling parent selection based on a set of fitness values.
pub trait ParentSelection {
    fn init(&mut self, fitness_values: Vec<f64>);

    fn sample(&mut self, rng: &mut dyn RngCore) -> usize;
}

impl<P> ParentSelection for Box<P>
where
    P: ParentSelection + ?Sized,
{
    fn init(&mut self, fitness_values: Vec<f64>) {
        P::init(self, fitness_values)
    }

    fn sample(&mut self, rng: &mut dyn RngCore) -> usize {
        P::sample(self, rng)
    }
}

/// Recombination of two parents into a set of offspring. The parents are left untouched.
pub trait Recombination {
    fn apply(
        &mut self,
        rng: &mut dyn RngCore,
        left: &Individual,
        right: &Individual,
    ) -> Result<Vec<Individual>, SolutionError>;
}

/// Mutation of an individual
pub trait Mutation {
    fn apply(&mut self, rng: &mut dyn RngCore, individual: &mut Individual);
}

impl<M> Mutation for Box<M>
where
    M: Mutation + ?Sized,
{
    fn apply(&mut self, rng: &mut dyn RngCore, individual: &mut Individual) {
        M::apply(self, rng, individual)
    }
}

pub trait SurvivalSelection {
    /// Select the next generation of `size` individuals from the current `population` and the `children`.
    /// `parents` holds the indices (into `population`) of the individuals selected for reproduction.
    fn select_survivors(
        &mut self,
        population: Vec<Individual>,
        parents: &[usize],
        children: Vec<Individual>,
        size: usize,
    ) -> Vec<Individual>;
}

/// Applies a mutation stochastically with probability `p`
#[derive(Debug, Clone)]
pub struct Stochastic<M>(pub f64, pub M);

impl<M> Stochastic<M> {
    pub fn new(p: f64, inner: M) -> Self {
        Stochastic(p, inner)
    }
}

impl<M> Mutation for Stochastic<M>
where
    M: Mutation,
{
    fn apply(&mut self, rng: &mut dyn RngCore, individual: &mut Individual) {
        if utils::random_unit(rng) < self.0 {
            self.1.apply(rng, individual);
        }
    }
}

/// Vectors are used for "choice", i.e. choose one of (unweighted)
impl<M> Mutation for Vec<M>
where
    M: Mutation,
{
    fn apply(&mut self, rng: &mut dyn RngCore, individual: &mut Individual) {
        if let Some(mutation) = self.choose_mut(rng) {
            mutation.apply(rng, individual)
        }
    }
}
