use log::trace;
use rand::{seq::IteratorRandom, RngCore};

use super::Recombination;
use crate::{
    problem::CustomerIndex,
    solution::{Individual, SolutionError},
};

/// Picks a random non-empty route of each parent and cuts it into `k` segments at random points.
/// Every segment of one parent is crossed into the other parent as a contiguous block, giving
/// up to `2k` children. Empty segments produce no child.
#[derive(Debug, Clone, Copy)]
pub struct SegmentExchange {
    pub k: usize,
}

impl SegmentExchange {
    pub fn new(k: usize) -> Self {
        SegmentExchange { k }
    }
}

fn segments(rng: &mut dyn RngCore, individual: &Individual, k: usize) -> Vec<Vec<CustomerIndex>> {
    match individual.routes().iter().filter(|r| !r.is_empty()).choose(rng) {
        Some(route) => route.split(rng, k),
        None => Vec::new(),
    }
}

impl Recombination for SegmentExchange {
    fn apply(
        &mut self,
        rng: &mut dyn RngCore,
        left: &Individual,
        right: &Individual,
    ) -> Result<Vec<Individual>, SolutionError> {
        if left.routes().is_empty() || right.routes().is_empty() {
            return Err(SolutionError::NoRoutes);
        }

        let from_left = segments(rng, left, self.k);
        let from_right = segments(rng, right, self.k);

        let mut children = Vec::with_capacity(2 * self.k);
        for segment in from_right.iter().filter(|s| !s.is_empty()) {
            children.push(left.single_point_crossover(segment)?);
        }
        for segment in from_left.iter().filter(|s| !s.is_empty()) {
            children.push(right.single_point_crossover(segment)?);
        }

        if children.is_empty() {
            trace!("No segments to exchange, cloning the parents");
            children.push(left.clone());
            children.push(right.clone());
        }

        Ok(children)
    }
}
