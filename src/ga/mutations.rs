use clap::ArgEnum;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{ga::Mutation, solution::Individual};

/// Swap two customers within a single route
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapMutation;

impl Mutation for SwapMutation {
    fn apply(&mut self, rng: &mut dyn RngCore, individual: &mut Individual) {
        individual.swap_mutate(rng)
    }
}

/// Cut two routes in two and exchange their tails
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossMutation;

impl Mutation for CrossMutation {
    fn apply(&mut self, rng: &mut dyn RngCore, individual: &mut Individual) {
        individual.cross_mutate(rng)
    }
}

/// Exchange a single customer between two routes
#[derive(Debug, Clone, Copy, Default)]
pub struct InterSwapMutation;

impl Mutation for InterSwapMutation {
    fn apply(&mut self, rng: &mut dyn RngCore, individual: &mut Individual) {
        individual.inter_swap_mutate(rng)
    }
}

/// The mutation operators available from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ArgEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MutationKind {
    Cross,
    Swap,
    InterSwap,
    /// A uniform choice between all of the above for every mutation
    Any,
}

impl MutationKind {
    pub fn build(self) -> Box<dyn Mutation> {
        match self {
            MutationKind::Cross => Box::new(CrossMutation),
            MutationKind::Swap => Box::new(SwapMutation),
            MutationKind::InterSwap => Box::new(InterSwapMutation),
            MutationKind::Any => Box::new(vec![
                Box::new(CrossMutation) as Box<dyn Mutation>,
                Box::new(SwapMutation),
                Box::new(InterSwapMutation),
            ]),
        }
    }
}
