use std::sync::Arc;

use clap::ArgEnum;
use log::{debug, trace, warn};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::fitness::Weighted;
use crate::{
    problem::Problem,
    solution::{ConstructionFailure, Individual},
};

pub trait Initialization {
    type Out;
    /// Construct a new individual. A forced construction may produce individuals that break
    /// the capacity or duration limits, but only fails if the problem cannot be served at all.
    fn new(
        &self,
        problem: Arc<Problem>,
        force: bool,
        rng: &mut dyn RngCore,
    ) -> Result<Self::Out, ConstructionFailure>;
}

/// Randomized greedy insertion of each depot's customers into its vehicles
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyInsertion {
    pub penalties: Weighted,
}

impl GreedyInsertion {
    pub fn new(penalties: Weighted) -> Self {
        GreedyInsertion { penalties }
    }
}

impl Initialization for GreedyInsertion {
    type Out = Individual;

    fn new(
        &self,
        problem: Arc<Problem>,
        force: bool,
        rng: &mut dyn RngCore,
    ) -> Result<Self::Out, ConstructionFailure> {
        Individual::build_initial(problem, self.penalties, force, rng)
    }
}

/// Each customer goes to a randomly drawn vehicle of its depot with room for it, at the cheapest position in that route
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomVehicleInsertion {
    pub penalties: Weighted,
}

impl RandomVehicleInsertion {
    pub fn new(penalties: Weighted) -> Self {
        RandomVehicleInsertion { penalties }
    }
}

impl Initialization for RandomVehicleInsertion {
    type Out = Individual;

    fn new(
        &self,
        problem: Arc<Problem>,
        force: bool,
        rng: &mut dyn RngCore,
    ) -> Result<Self::Out, ConstructionFailure> {
        Individual::build_random_vehicle(problem, self.penalties, force, rng)
    }
}

/// The constructive heuristics available from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ArgEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InitializationKind {
    /// Cheapest position among all vehicles of the depot
    Greedy,
    /// Cheapest position within a random vehicle of the depot
    RandomVehicle,
}

/// Generate up to `size` individuals. Construction is attempted without force until `attempts`
/// constructions have failed, after which every construction is forced. A failed forced
/// construction ends the generation, so the result may be smaller than `size` (or even empty).
pub fn generate_initial_population<I>(
    initialization: &I,
    problem: &Arc<Problem>,
    size: usize,
    attempts: usize,
    rng: &mut dyn RngCore,
) -> Vec<I::Out>
where
    I: Initialization,
{
    let mut population = Vec::with_capacity(size);
    let mut failures = 0;

    while population.len() < size {
        let force = failures >= attempts;
        match initialization.new(problem.clone(), force, rng) {
            Ok(individual) => population.push(individual),
            Err(err) if force => {
                warn!("Forced construction failed: {}", err);
                break;
            }
            Err(err) => {
                trace!("Construction failed: {}", err);
                failures += 1;
                if failures == attempts {
                    debug!("{} constructions failed, forcing the remaining individuals", failures);
                }
            }
        }
    }

    if failures >= attempts {
        warn!(
            "The initial population may break capacity or duration limits ({} failed constructions)",
            failures
        );
    }

    if population.len() < size {
        warn!("Generated only {} of {} initial individuals", population.len(), size);
    }

    population
}
