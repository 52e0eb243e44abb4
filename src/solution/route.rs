use derive_more::Display;
use float_ord::FloatOrd;
use itertools::Itertools;
use log::trace;
use rand::Rng;

use crate::{
    problem::{CustomerIndex, DepotIndex, Duration, Problem, Quantity},
    utils,
};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// The customer is not part of the route
    #[display(fmt = "customer {} is not on the route", _0)]
    NotFound(CustomerIndex),
}

impl std::error::Error for RouteError {}

/// The ordered stops of a single vehicle, leaving `start` and returning to `end`.
/// `load` always equals the summed demand of the customers on the route.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    start: DepotIndex,
    end: DepotIndex,
    customers: Vec<CustomerIndex>,
    load: Quantity,
}

impl Route {
    /// An empty route starting and ending at `depot`
    pub fn new(depot: DepotIndex) -> Self {
        Route {
            start: depot,
            end: depot,
            customers: Vec::new(),
            load: 0,
        }
    }

    pub fn with_customers(
        problem: &Problem,
        start: DepotIndex,
        end: DepotIndex,
        customers: Vec<CustomerIndex>,
    ) -> Self {
        let load = demand(problem, &customers);
        Route {
            start,
            end,
            customers,
            load,
        }
    }

    /// The depot the vehicle leaves from. Capacity and duration limits are those of this depot.
    pub fn start(&self) -> DepotIndex {
        self.start
    }

    /// The depot the vehicle returns to
    pub fn end(&self) -> DepotIndex {
        self.end
    }

    pub fn set_end(&mut self, depot: DepotIndex) {
        self.end = depot;
    }

    pub fn customers(&self) -> &[CustomerIndex] {
        &self.customers
    }

    pub fn load(&self) -> Quantity {
        self.load
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn last(&self) -> Option<CustomerIndex> {
        self.customers.last().copied()
    }

    /// Total travel and service time of the route. Empty routes take no time.
    pub fn duration(&self, problem: &Problem) -> Duration {
        sequence_duration(problem, self.start, self.end, self.customers.iter().copied())
    }

    /// The duration the route would have if `customer` was inserted at `index`, without modifying the route.
    /// Panics if `index > len`.
    pub fn duration_if_inserted(
        &self,
        problem: &Problem,
        index: usize,
        customer: CustomerIndex,
    ) -> Duration {
        if self.customers.is_empty() {
            let position = problem.customer(customer).position();
            return problem.depot(self.start).position().distance(position)
                + position.distance(problem.depot(self.end).position());
        }

        let (head, tail) = self.customers.split_at(index);
        let sequence = head
            .iter()
            .copied()
            .chain(std::iter::once(customer))
            .chain(tail.iter().copied());

        sequence_duration(problem, self.start, self.end, sequence)
    }

    /// Insert `customer` at `index`. Panics if `index > len`.
    pub fn insert(&mut self, problem: &Problem, index: usize, customer: CustomerIndex) {
        self.customers.insert(index, customer);
        self.load += problem.customer(customer).load_demand();
    }

    pub fn remove(&mut self, problem: &Problem, customer: CustomerIndex) -> Result<(), RouteError> {
        let index = self
            .customers
            .iter()
            .position(|&c| c == customer)
            .ok_or(RouteError::NotFound(customer))?;

        self.customers.remove(index);
        self.load -= problem.customer(customer).load_demand();
        Ok(())
    }

    /// Insert the whole `segment` in order, starting at `index`. Panics if `index > len`.
    pub fn insert_segment(&mut self, problem: &Problem, index: usize, segment: &[CustomerIndex]) {
        self.customers.splice(index..index, segment.iter().copied());
        self.load += demand(problem, segment);
    }

    /// Remove every customer in `segment` that is on this route, returning how many were removed.
    pub fn remove_segment(&mut self, problem: &Problem, segment: &[CustomerIndex]) -> usize {
        let before = self.customers.len();
        let mut removed = 0;

        self.customers.retain(|c| {
            let keep = !segment.contains(c);
            if !keep {
                removed += problem.customer(*c).load_demand();
            }
            keep
        });

        self.load -= removed;
        before - self.customers.len()
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.customers.swap(a, b);
    }

    /// Re-sequence the route greedily: starting at the start depot, always visit the nearest remaining customer next.
    pub fn optimize(&mut self, problem: &Problem) {
        self.customers = self.nearest_neighbour(problem, &self.customers);
    }

    /// Cut the route into `k` contiguous parts at random positions.
    pub fn split<R: Rng + ?Sized>(&self, rng: &mut R, k: usize) -> Vec<Vec<CustomerIndex>> {
        utils::partition(rng, &self.customers, k)
    }

    /// Concatenate `head` and `tail`. If `reoptimize` is set, the result is re-sequenced
    /// by nearest neighbour from this route's start depot.
    pub fn merge(
        &self,
        problem: &Problem,
        head: &[CustomerIndex],
        tail: &[CustomerIndex],
        reoptimize: bool,
    ) -> Vec<CustomerIndex> {
        trace!("Merging {:?} and {:?}", head, tail);
        let merged = [head, tail].concat();

        match reoptimize {
            true => self.nearest_neighbour(problem, &merged),
            false => merged,
        }
    }

    fn nearest_neighbour(&self, problem: &Problem, customers: &[CustomerIndex]) -> Vec<CustomerIndex> {
        let mut remaining = customers.to_vec();
        let mut ordered = Vec::with_capacity(remaining.len());
        let mut at = *problem.depot(self.start).position();

        // Ties go to the earliest remaining customer
        while let Some(i) = remaining
            .iter()
            .position_min_by_key(|&&c| FloatOrd(at.distance(problem.customer(c).position())))
        {
            let next = remaining.remove(i);
            at = *problem.customer(next).position();
            ordered.push(next);
        }

        ordered
    }
}

/// Summed demand of `customers`
fn demand(problem: &Problem, customers: &[CustomerIndex]) -> Quantity {
    customers
        .iter()
        .map(|&c| problem.customer(c).load_demand())
        .sum()
}

fn sequence_duration(
    problem: &Problem,
    start: DepotIndex,
    end: DepotIndex,
    sequence: impl Iterator<Item = CustomerIndex>,
) -> Duration {
    let mut at = problem.depot(start).position();
    let mut duration = 0.0;
    let mut visited = false;

    for c in sequence {
        let customer = problem.customer(c);
        duration += at.distance(customer.position()) + customer.service_duration();
        at = customer.position();
        visited = true;
    }

    match visited {
        true => duration + at.distance(problem.depot(end).position()),
        false => 0.0,
    }
}
