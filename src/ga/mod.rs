pub mod fitness;
pub mod initialization;
pub mod mutations;
pub mod parent_selection;
pub mod recombinations;
pub mod survival_selection;
pub mod traits;

use std::sync::Arc;

use derive_more::Display;
use float_ord::FloatOrd;
use itertools::Itertools;
use log::{info, trace};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
pub use traits::*;

use crate::{
    problem::{Duration, Problem},
    solution::{Individual, SolutionError},
    utils,
};

use self::{
    fitness::Weighted,
    initialization::{generate_initial_population, GreedyInsertion, InitializationKind, RandomVehicleInsertion},
    mutations::MutationKind,
    parent_selection::{Roulette, SelectionKind, Tournament},
    recombinations::SegmentExchange,
    survival_selection::Elitist,
};

/// The number of draws made from the parent selection to find a second parent distinct from the first
const PARENT_DRAWS: usize = 10;

#[derive(Debug, Display)]
pub enum GaError {
    #[display(fmt = "the population is empty")]
    EmptyPopulation,
    #[display(fmt = "invalid configuration: {}", _0)]
    InvalidConfig(String),
    #[display(fmt = "{}", _0)]
    Solution(SolutionError),
}

impl std::error::Error for GaError {}

impl From<SolutionError> for GaError {
    fn from(err: SolutionError) -> Self {
        GaError::Solution(err)
    }
}

/// The parameters of the genetic algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Size of population
    pub population_size: usize,
    /// Probability that a pair of parents is recombined rather than copied
    pub crossover_rate: f64,
    /// Probability that a child is mutated
    pub mutation_rate: f64,
    pub selection: SelectionKind,
    /// The number of participants in each tournament, if using tournament selection
    pub tournament_size: usize,
    /// Number of parent pairs selected for reproduction every generation
    pub child_pairs: usize,
    /// Number of elites carried over from the previous generation
    pub parents_to_save: usize,
    /// Cost per unit of duration above a depot's limit
    pub duration_penalty_rate: f64,
    /// Cost per unit of load above a vehicle's capacity
    pub load_penalty_rate: f64,
    /// Number of segments a route is cut into during crossover
    pub k: usize,
    /// Whether this generation's parents may be kept as elites
    pub elitism: bool,
    pub mutation: MutationKind,
    /// The constructive heuristic building the initial population
    pub initialization: InitializationKind,
    /// Failed constructions tolerated before the initial population is built by force
    pub initial_attempts: usize,
    /// Seed of the random number generator. Drawn from entropy if absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            population_size: 100,
            crossover_rate: 0.8,
            mutation_rate: 0.3,
            selection: SelectionKind::Roulette,
            tournament_size: 3,
            child_pairs: 25,
            parents_to_save: 5,
            duration_penalty_rate: 10.0,
            load_penalty_rate: 10.0,
            k: 2,
            elitism: true,
            mutation: MutationKind::Cross,
            initialization: InitializationKind::Greedy,
            initial_attempts: 1000,
            seed: None,
        }
    }
}

impl Config {
    pub fn penalties(&self) -> Weighted {
        Weighted {
            duration: self.duration_penalty_rate,
            load: self.load_penalty_rate,
        }
    }

    pub fn validate(&self) -> Result<(), GaError> {
        let invalid = |msg: &str| Err(GaError::InvalidConfig(msg.to_string()));

        if self.population_size == 0 {
            return invalid("population_size must be positive");
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return invalid("crossover_rate must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid("mutation_rate must be within [0, 1]");
        }
        if self.k == 0 {
            return invalid("k must be positive");
        }
        if self.selection == SelectionKind::Tournament && self.tournament_size == 0 {
            return invalid("tournament_size must be positive");
        }
        if self.duration_penalty_rate < 0.0 || self.load_penalty_rate < 0.0 {
            return invalid("penalty rates must be non-negative");
        }

        Ok(())
    }
}

/// A genetic algorithm evolving a population of individuals for a single problem.
/// The first call to `tick` creates the initial population, and every following call evolves
/// it by one generation.
pub struct Population<PS, M> {
    problem: Arc<Problem>,
    config: Config,
    /// The current generation of individuals
    individuals: Vec<Individual>,
    /// The number of completed ticks
    generation: usize,
    /// Index of the best individual
    alpha: Option<usize>,
    parent_selection: PS,
    recombination: SegmentExchange,
    mutation: Stochastic<M>,
    survival: Elitist,
    rng: StdRng,
}

impl Population<Box<dyn ParentSelection>, Box<dyn Mutation>> {
    /// Set up the operators described by the configuration
    pub fn from_config(problem: Arc<Problem>, config: Config) -> Result<Self, GaError> {
        config.validate()?;

        let parent_selection: Box<dyn ParentSelection> = match config.selection {
            SelectionKind::Roulette => Box::new(Roulette::new()),
            SelectionKind::Tournament => Box::new(
                Tournament::new(config.tournament_size)
                    .ok_or_else(|| GaError::InvalidConfig("empty tournament".to_string()))?,
            ),
        };
        let mutation = config.mutation.build();

        Population::new(problem, config, parent_selection, mutation)
    }
}

impl<PS, M> Population<PS, M>
where
    PS: ParentSelection,
    M: Mutation,
{
    pub fn new(
        problem: Arc<Problem>,
        config: Config,
        parent_selection: PS,
        mutation: M,
    ) -> Result<Self, GaError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Population {
            problem,
            recombination: SegmentExchange::new(config.k),
            mutation: Stochastic::new(config.mutation_rate, mutation),
            survival: Elitist::new(config.parents_to_save, config.elitism),
            config,
            individuals: Vec::new(),
            generation: 0,
            alpha: None,
            parent_selection,
            rng,
        })
    }

    /// Create the initial population on the first call, and evolve it by one generation on every following call.
    pub fn tick(&mut self) -> Result<(), GaError> {
        trace!("Start of generation {}", self.generation);

        if self.generation == 0 {
            self.initialize()?;
        } else {
            self.evolve()?;
        }

        self.alpha = self
            .individuals
            .iter()
            .position_min_by_key(|x| FloatOrd(x.fitness()));
        self.generation += 1;

        if let (Some(alpha), Some(average)) = (self.alpha_individual(), self.average_fitness()) {
            info!(
                "Generation {}: F = {:.2}, duration = {:.2}, valid = {}, average F = {:.2}",
                self.generation,
                alpha.fitness(),
                alpha.duration(),
                alpha.is_valid(),
                average
            );
        }

        trace!("End of generation {}", self.generation);
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), GaError> {
        trace!("Initializing population with {:?}", self.config.initialization);
        let (size, attempts) = (self.config.population_size, self.config.initial_attempts);
        let penalties = self.config.penalties();
        self.individuals = match self.config.initialization {
            InitializationKind::Greedy => generate_initial_population(
                &GreedyInsertion::new(penalties),
                &self.problem,
                size,
                attempts,
                &mut self.rng,
            ),
            InitializationKind::RandomVehicle => generate_initial_population(
                &RandomVehicleInsertion::new(penalties),
                &self.problem,
                size,
                attempts,
                &mut self.rng,
            ),
        };

        if self.individuals.is_empty() {
            return Err(GaError::EmptyPopulation);
        }

        info!("Initial population of {} individuals", self.individuals.len());
        Ok(())
    }

    /// Two parents, distinct whenever the population has more than one individual
    fn select_parents(&mut self) -> (usize, usize) {
        let first = self.parent_selection.sample(&mut self.rng);
        let len = self.individuals.len();
        if len < 2 {
            return (first, first);
        }

        for _ in 0..PARENT_DRAWS {
            let second = self.parent_selection.sample(&mut self.rng);
            if second != first {
                return (first, second);
            }
        }

        let mut second = utils::random_index(&mut self.rng, len - 1);
        if second >= first {
            second += 1;
        }

        (first, second)
    }

    fn evolve(&mut self) -> Result<(), GaError> {
        if self.individuals.is_empty() {
            return Err(GaError::EmptyPopulation);
        }

        trace!("Initializing parent selection");
        self.parent_selection
            .init(self.individuals.iter().map(Individual::fitness).collect());

        let mut parents = Vec::with_capacity(2 * self.config.child_pairs);
        let mut children = Vec::new();

        trace!("Applying recombination");
        for _ in 0..self.config.child_pairs {
            let (a, b) = self.select_parents();
            parents.extend([a, b]);

            let (left, right) = (&self.individuals[a], &self.individuals[b]);
            if utils::random_unit(&mut self.rng) < self.config.crossover_rate {
                children.extend(self.recombination.apply(&mut self.rng, left, right)?);
            } else {
                children.push(left.clone());
                children.push(right.clone());
            }
        }

        trace!("Applying mutation to {} children", children.len());
        for child in children.iter_mut() {
            self.mutation.apply(&mut self.rng, child);
        }

        trace!("Selecting survivors");
        let previous = std::mem::take(&mut self.individuals);
        self.individuals = self.survival.select_survivors(
            previous,
            &parents,
            children,
            self.config.population_size,
        );

        Ok(())
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The current individuals, sorted by fitness after the first generation
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// The number of completed ticks
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The individual with the lowest fitness
    pub fn alpha_individual(&self) -> Option<&Individual> {
        self.alpha.map(|i| &self.individuals[i])
    }

    pub fn alpha_fitness(&self) -> Option<f64> {
        self.alpha_individual().map(Individual::fitness)
    }

    pub fn alpha_duration(&self) -> Option<Duration> {
        self.alpha_individual().map(Individual::duration)
    }

    pub fn is_alpha_valid(&self) -> Option<bool> {
        self.alpha_individual().map(Individual::is_valid)
    }

    pub fn average_fitness(&self) -> Option<f64> {
        match self.individuals.len() {
            0 => None,
            n => Some(self.individuals.iter().map(Individual::fitness).sum::<f64>() / n as f64),
        }
    }
}
