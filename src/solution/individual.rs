use std::{
    cell::Cell,
    fmt::Debug,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use derive_more::Display;
use float_ord::FloatOrd;
use log::{debug, trace};
use rand::{seq::SliceRandom, Rng};

use crate::{
    ga::fitness::Weighted,
    problem::{CustomerIndex, Depot, DepotIndex, Duration, Problem},
    solution::Route,
    utils::{self, GetPairMut},
};

/// The number of times the constructive heuristic tries to place a single customer
pub const INSERTION_ATTEMPTS: usize = 100;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionFailure {
    /// A customer could not be placed without breaking a capacity or duration limit
    #[display(fmt = "customer {} of depot {} could not be placed", customer, depot)]
    Unplaced {
        depot: DepotIndex,
        customer: CustomerIndex,
    },
    /// The depot has customers, but no vehicles to serve them
    #[display(fmt = "depot {} has customers but no vehicles", _0)]
    NoVehicles(DepotIndex),
}

impl std::error::Error for ConstructionFailure {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SolutionError {
    #[display(fmt = "the individual has no routes")]
    NoRoutes,
}

impl std::error::Error for SolutionError {}

/// The result of evaluating an individual
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Total duration plus penalties. Lower is better.
    pub fitness: f64,
    /// Total duration of all routes, without penalties
    pub duration: Duration,
    /// Whether no route breaks a capacity or duration limit
    pub valid: bool,
}

/// A candidate solution: every customer of the problem assigned to exactly one route.
/// The routes are grouped by start depot, in depot order.
#[derive(Clone)]
pub struct Individual {
    /// The problem this individual `belongs` to.
    problem: Arc<Problem>,
    /// Penalty rates used in the fitness
    penalties: Weighted,
    /// The vehicle routes
    routes: Vec<Route>,
    /// Evaluation of the current routes, if computed
    cache: Cell<Option<Evaluation>>,
}

impl Debug for Individual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Individual")
            .field("routes", &self.routes)
            .field("evaluation", &self.cache.get())
            .finish_non_exhaustive()
    }
}

impl Individual {
    pub fn new(problem: Arc<Problem>, penalties: Weighted, routes: Vec<Route>) -> Self {
        Individual {
            problem,
            penalties,
            routes,
            cache: Cell::new(None),
        }
    }

    /// Build an individual with a greedy insertion heuristic. Each depot gets `max_vehicles` routes,
    /// and its customers are taken in random order and placed at the position giving the shortest
    /// route, subject to the vehicle capacity and the depot's duration limit.
    ///
    /// A customer that cannot be placed within `INSERTION_ATTEMPTS` fails the construction, unless
    /// `force` is set. Forced construction accepts routes exceeding the duration limit and, as a last
    /// resort, places the customer ignoring capacity too. Violations are penalized by the fitness.
    pub fn build_initial<R: Rng + ?Sized>(
        problem: Arc<Problem>,
        penalties: Weighted,
        force: bool,
        rng: &mut R,
    ) -> Result<Individual, ConstructionFailure> {
        trace!("Starting new initialization (force = {})", force);
        construct(problem, penalties, rng, |problem, depot, vehicles, customer, _| {
            place(problem, depot, vehicles, customer, force)
        })
    }

    /// Build an individual by sending each customer (in random order) to a random vehicle of its depot,
    /// at the position in that vehicle's route giving the shortest route. A vehicle without room for the
    /// customer, or whose route would exceed the depot's duration limit, is passed over for another random
    /// vehicle, up to `INSERTION_ATTEMPTS` times.
    ///
    /// Forced construction ignores the duration limit, and falls back to the cheapest position among all
    /// vehicles, regardless of capacity, when no vehicle with room was drawn.
    pub fn build_random_vehicle<R: Rng + ?Sized>(
        problem: Arc<Problem>,
        penalties: Weighted,
        force: bool,
        rng: &mut R,
    ) -> Result<Individual, ConstructionFailure> {
        trace!("Starting new random vehicle initialization (force = {})", force);
        construct(problem, penalties, rng, |problem, depot, vehicles, customer, rng| {
            place_in_random_vehicle(problem, depot, vehicles, customer, force, rng)
        })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn penalties(&self) -> Weighted {
        self.penalties
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Access a mutator for the routes. The evaluation is invalidated when it goes out of scope.
    pub fn mutate(&mut self) -> IndividualMut<'_> {
        IndividualMut(self)
    }

    /// The evaluation of the current routes, computed on first access.
    pub fn evaluation(&self) -> Evaluation {
        match self.cache.get() {
            Some(evaluation) => evaluation,
            None => {
                let evaluation = self.evaluate();
                self.cache.set(Some(evaluation));
                evaluation
            }
        }
    }

    /// Total duration plus penalties for exceeded limits
    pub fn fitness(&self) -> f64 {
        self.evaluation().fitness
    }

    /// Total duration of all routes
    pub fn duration(&self) -> Duration {
        self.evaluation().duration
    }

    /// Whether every route respects the capacity and duration limits of its depot
    pub fn is_valid(&self) -> bool {
        self.evaluation().valid
    }

    fn evaluate(&self) -> Evaluation {
        let mut evaluation = Evaluation {
            fitness: 0.0,
            duration: 0.0,
            valid: true,
        };

        for route in &self.routes {
            let cost = self.penalties.of(&self.problem, route);
            evaluation.fitness += cost.total();
            evaluation.duration += cost.duration;
            evaluation.valid &= cost.is_feasible();
        }

        evaluation
    }

    /// Produce a child by moving the customers of `segment` (typically taken from another individual)
    /// into this individual's routes as one contiguous block, at the position giving the lowest fitness.
    /// Routes whose last customer changes are sent to the depot nearest that customer.
    pub fn single_point_crossover(
        &self,
        segment: &[CustomerIndex],
    ) -> Result<Individual, SolutionError> {
        if self.routes.is_empty() {
            return Err(SolutionError::NoRoutes);
        }

        let problem = &*self.problem;
        let mut routes = self.routes.clone();
        if segment.is_empty() {
            return Ok(Individual::new(self.problem.clone(), self.penalties, routes));
        }

        let tails = routes.iter().map(Route::last).collect::<Vec<_>>();
        for route in routes.iter_mut() {
            route.remove_segment(problem, segment);
        }

        // Only the route receiving the segment changes, so the remaining routes' costs are reused.
        let costs = routes
            .iter()
            .map(|route| self.penalties.of(problem, route).total())
            .collect::<Vec<_>>();
        let base = costs.iter().sum::<f64>();

        let mut best: Option<(usize, usize, f64)> = None;
        for (v, route) in routes.iter_mut().enumerate() {
            for i in 0..=route.len() {
                route.insert_segment(problem, i, segment);
                let fitness = base - costs[v] + self.penalties.of(problem, route).total();
                route.remove_segment(problem, segment);

                if best.map_or(true, |(_, _, f)| fitness < f) {
                    best = Some((v, i, fitness));
                }
            }
        }

        if let Some((v, i, fitness)) = best {
            trace!("Inserting segment at route {}, index {} (fitness {})", v, i, fitness);
            routes[v].insert_segment(problem, i, segment);
        }

        for (route, tail) in routes.iter_mut().zip(tails) {
            if route.last() != tail {
                let end = match route.last() {
                    Some(last) => problem.nearest_depot(problem.customer(last).position()),
                    None => route.start(),
                };
                route.set_end(end);
            }
        }

        Ok(Individual::new(self.problem.clone(), self.penalties, routes))
    }

    /// Swap two random customers within one random route.
    pub fn swap_mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.routes.is_empty() {
            return;
        }

        let v = utils::random_index(rng, self.routes.len());
        let mut routes = self.mutate();
        let route = &mut routes[v];

        if let Some((a, b)) = utils::random_distinct_pair(rng, route.len()) {
            trace!("Swapping positions {} and {} of route {}", a, b, v);
            route.swap(a, b);
        }
    }

    /// Pick two random routes, cut each in two, and recombine the head of each with the tail of the other.
    /// The recombined routes are re-sequenced by nearest neighbour and keep the depots of the route
    /// that contributed the head.
    pub fn cross_mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (a, b) = match utils::random_distinct_pair(rng, self.routes.len()) {
            Some(pair) => pair,
            None => return,
        };

        let problem = self.problem.clone();
        let (first, second) = (&self.routes[a], &self.routes[b]);
        let first_parts = first.split(rng, 2);
        let second_parts = second.split(rng, 2);

        let merged_first = first.merge(&problem, &first_parts[0], &second_parts[1], true);
        let merged_second = second.merge(&problem, &second_parts[0], &first_parts[1], true);
        let first = Route::with_customers(&problem, first.start(), first.end(), merged_first);
        let second = Route::with_customers(&problem, second.start(), second.end(), merged_second);

        trace!("Cross mutating routes {} and {}", a, b);
        let mut routes = self.mutate();
        routes[a] = first;
        routes[b] = second;
    }

    /// Exchange one random customer between two random routes. If one of them is empty,
    /// the customer of the other is moved instead.
    pub fn inter_swap_mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (a, b) = match utils::random_distinct_pair(rng, self.routes.len()) {
            Some(pair) => pair,
            None => return,
        };

        let problem = self.problem.clone();
        let mut routes = self.mutate();
        let (first, second) = routes.as_mut_slice().get_pair_mut(a, b);

        let i = (!first.is_empty()).then(|| utils::random_index(rng, first.len()));
        let j = (!second.is_empty()).then(|| utils::random_index(rng, second.len()));
        let from_first = i.map(|i| first.customers()[i]);
        let from_second = j.map(|j| second.customers()[j]);

        if let Some(customer) = from_first {
            first.remove_segment(&problem, &[customer]);
        }
        if let Some(customer) = from_second {
            second.remove_segment(&problem, &[customer]);
        }
        if let Some(customer) = from_first {
            let at = j.unwrap_or(0).min(second.len());
            second.insert(&problem, at, customer);
        }
        if let Some(customer) = from_second {
            let at = i.unwrap_or(0).min(first.len());
            first.insert(&problem, at, customer);
        }
    }
}

/// A mutable reference to the routes of an individual, which
/// invalidates the cached evaluation when it goes out of scope.
pub struct IndividualMut<'a>(&'a mut Individual);

impl Deref for IndividualMut<'_> {
    type Target = Vec<Route>;

    fn deref(&self) -> &Self::Target {
        &self.0.routes
    }
}

impl DerefMut for IndividualMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0.routes
    }
}

impl Drop for IndividualMut<'_> {
    fn drop(&mut self) {
        self.0.cache.set(None);
    }
}

/// Give every depot `max_vehicles` empty routes, and let `place` put each of its customers, in random order,
/// on one of them.
fn construct<R, F>(
    problem: Arc<Problem>,
    penalties: Weighted,
    rng: &mut R,
    mut place: F,
) -> Result<Individual, ConstructionFailure>
where
    R: Rng + ?Sized,
    F: FnMut(&Problem, &Depot, &mut [Route], CustomerIndex, &mut R) -> bool,
{
    let mut routes = Vec::with_capacity(problem.vehicle_count());

    for (d, depot) in problem.depots().iter_enumerated() {
        let mut vehicles = vec![Route::new(d); depot.max_vehicles()];
        if vehicles.is_empty() && !depot.customers().is_empty() {
            return Err(ConstructionFailure::NoVehicles(d));
        }

        let mut customers = depot.customers().to_vec();
        customers.shuffle(rng);

        for customer in customers {
            if !place(&problem, depot, &mut vehicles, customer, &mut *rng) {
                debug!("Unable to place customer {} of depot {}", customer, d);
                return Err(ConstructionFailure::Unplaced { depot: d, customer });
            }
        }

        routes.extend(vehicles);
    }

    Ok(Individual::new(problem, penalties, routes))
}

/// Try to place `customer` on one of `vehicles`. Returns false if the customer could not be placed.
fn place(
    problem: &Problem,
    depot: &Depot,
    vehicles: &mut [Route],
    customer: CustomerIndex,
    force: bool,
) -> bool {
    let demand = problem.customer(customer).load_demand();
    // Positions that broke the duration limit for this customer
    let mut rejected = Vec::new();

    for _ in 0..INSERTION_ATTEMPTS {
        let candidate = cheapest_insertion(problem, vehicles, customer, |v, i| {
            vehicles[v].load() + demand <= depot.max_load() && !rejected.contains(&(v, i))
        });

        let (v, i) = match candidate {
            Some(position) => position,
            None => break,
        };

        vehicles[v].insert(problem, i, customer);

        if !force && exceeds_duration(problem, depot, &vehicles[v]) {
            vehicles[v].remove_segment(problem, &[customer]);
            rejected.push((v, i));
        } else {
            return true;
        }
    }

    force && place_anywhere(problem, depot, vehicles, customer)
}

/// Try to place `customer` on randomly drawn vehicles with room for it.
fn place_in_random_vehicle<R: Rng + ?Sized>(
    problem: &Problem,
    depot: &Depot,
    vehicles: &mut [Route],
    customer: CustomerIndex,
    force: bool,
    rng: &mut R,
) -> bool {
    if vehicles.is_empty() {
        return false;
    }

    let demand = problem.customer(customer).load_demand();
    for _ in 0..INSERTION_ATTEMPTS {
        let v = utils::random_index(rng, vehicles.len());
        let vehicle = &mut vehicles[v];
        if vehicle.load() + demand > depot.max_load() {
            continue;
        }

        let i = (0..=vehicle.len())
            .min_by_key(|&i| FloatOrd(vehicle.duration_if_inserted(problem, i, customer)))
            .unwrap_or(0);
        vehicle.insert(problem, i, customer);

        if !force && exceeds_duration(problem, depot, vehicle) {
            trace!("Route {} of depot {} is too long for customer {}", v, depot.id(), customer);
            vehicle.remove_segment(problem, &[customer]);
        } else {
            return true;
        }
    }

    force && place_anywhere(problem, depot, vehicles, customer)
}

fn exceeds_duration(problem: &Problem, depot: &Depot, route: &Route) -> bool {
    depot.has_duration_limit() && route.duration(problem) > depot.max_duration()
}

/// Place `customer` where it gives the shortest route, ignoring capacity and duration limits.
fn place_anywhere(problem: &Problem, depot: &Depot, vehicles: &mut [Route], customer: CustomerIndex) -> bool {
    match cheapest_insertion(problem, vehicles, customer, |_, _| true) {
        Some((v, i)) => {
            debug!("Forcing customer {} onto route {} of depot {}", customer, v, depot.id());
            vehicles[v].insert(problem, i, customer);
            true
        }
        None => false,
    }
}

/// The (vehicle, index) where inserting `customer` gives the shortest route, among the positions `allowed`.
fn cheapest_insertion<F>(
    problem: &Problem,
    vehicles: &[Route],
    customer: CustomerIndex,
    allowed: F,
) -> Option<(usize, usize)>
where
    F: Fn(usize, usize) -> bool,
{
    vehicles
        .iter()
        .enumerate()
        .flat_map(|(v, route)| (0..=route.len()).map(move |i| (v, i)))
        .filter(|&(v, i)| allowed(v, i))
        .min_by_key(|&(v, i)| FloatOrd(vehicles[v].duration_if_inserted(problem, i, customer)))
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::problem::{fixtures, Quantity};

    fn c(i: usize) -> CustomerIndex {
        CustomerIndex::from(i)
    }

    fn d(i: usize) -> DepotIndex {
        DepotIndex::from(i)
    }

    fn build(problem: &Arc<Problem>, seed: u64) -> Individual {
        let mut rng = StdRng::seed_from_u64(seed);
        Individual::build_initial(problem.clone(), Weighted::default(), true, &mut rng).unwrap()
    }

    fn assert_consistent_loads(individual: &Individual) {
        for route in individual.routes() {
            let demand: Quantity = route
                .customers()
                .iter()
                .map(|&c| individual.problem().customer(c).load_demand())
                .sum();
            assert_eq!(route.load(), demand);
        }
    }

    #[test]
    fn overloaded_vehicle_only_with_force() {
        let problem = Arc::new(fixtures::overloaded());
        let mut rng = StdRng::seed_from_u64(0);

        let unforced = Individual::build_initial(problem.clone(), Weighted::default(), false, &mut rng);
        assert!(matches!(unforced, Err(ConstructionFailure::Unplaced { .. })));

        let penalties = Weighted { duration: 1.0, load: 7.0 };
        let forced = Individual::build_initial(problem.clone(), penalties, true, &mut rng).unwrap();
        fixtures::assert_complete(&forced);
        assert_eq!(forced.routes().len(), 1);
        assert_eq!(forced.routes()[0].load(), 110);
        assert!(!forced.is_valid());
        assert_eq!(forced.duration(), 20.0);
        assert_eq!(forced.fitness(), 20.0 + 10.0 * 7.0);
    }

    #[test]
    fn depot_without_vehicles() {
        let problem = Problem::assign_to_nearest_depot(
            vec![Depot::new(1, crate::problem::Point::new(0.0, 0.0), 10, 0.0, 0)],
            vec![crate::problem::Customer::new(1, crate::problem::Point::new(1.0, 1.0), 0.0, 1)],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let result = Individual::build_initial(Arc::new(problem), Weighted::default(), true, &mut rng);
        assert_eq!(result.unwrap_err(), ConstructionFailure::NoVehicles(d(0)));
    }

    #[test]
    fn initial_individuals_are_complete_and_feasible() {
        let problem = Arc::new(fixtures::line());

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let individual =
                Individual::build_initial(problem.clone(), Weighted::default(), false, &mut rng)
                    .unwrap();

            fixtures::assert_complete(&individual);
            assert_consistent_loads(&individual);
            assert_eq!(individual.routes().len(), 4);
            assert!(individual.is_valid());
            assert_eq!(individual.fitness(), individual.duration());
        }
    }

    #[test]
    fn duration_limit_is_respected_without_force() {
        let problem = Arc::new(fixtures::random(3, 24, 17));

        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let individual =
                Individual::build_initial(problem.clone(), Weighted::default(), false, &mut rng)
                    .unwrap();

            fixtures::assert_complete(&individual);
            for route in individual.routes() {
                let depot = problem.depot(route.start());
                assert!(route.duration(&problem) <= depot.max_duration());
                assert!(route.load() <= depot.max_load());
            }
            assert!(individual.is_valid());
        }
    }

    #[test]
    fn overlong_route_only_with_force() {
        let problem = Arc::new(fixtures::short_leash());
        let mut rng = StdRng::seed_from_u64(0);

        let unforced = Individual::build_initial(problem.clone(), Weighted::default(), false, &mut rng);
        assert_eq!(
            unforced.unwrap_err(),
            ConstructionFailure::Unplaced { depot: d(0), customer: c(0) }
        );

        let penalties = Weighted { duration: 4.0, load: 1.0 };
        let forced = Individual::build_initial(problem.clone(), penalties, true, &mut rng).unwrap();
        fixtures::assert_complete(&forced);
        assert_eq!(forced.routes()[0].customers(), &[c(0)]);
        assert_eq!(forced.duration(), 20.0);
        assert_eq!(forced.fitness(), 20.0 + 5.0 * 4.0);
        assert!(!forced.is_valid());
    }

    #[test]
    fn zero_rates_do_not_hide_violations() {
        let free = Weighted { duration: 0.0, load: 0.0 };
        let mut rng = StdRng::seed_from_u64(0);

        let overloaded = Arc::new(fixtures::overloaded());
        let individual = Individual::build_initial(overloaded, free, true, &mut rng).unwrap();
        assert_eq!(individual.routes()[0].load(), 110);
        assert_eq!(individual.fitness(), individual.duration());
        assert!(!individual.is_valid());

        let overlong = Arc::new(fixtures::short_leash());
        let individual = Individual::build_initial(overlong, free, true, &mut rng).unwrap();
        assert_eq!(individual.fitness(), 20.0);
        assert!(!individual.is_valid());
    }

    #[test]
    fn random_vehicle_individuals_are_complete_and_feasible() {
        let problem = Arc::new(fixtures::random(3, 24, 17));

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let individual =
                Individual::build_random_vehicle(problem.clone(), Weighted::default(), false, &mut rng)
                    .unwrap();

            fixtures::assert_complete(&individual);
            assert_consistent_loads(&individual);
            assert_eq!(individual.routes().len(), problem.vehicle_count());
            for route in individual.routes() {
                let depot = problem.depot(route.start());
                assert!(route.duration(&problem) <= depot.max_duration());
                assert!(route.load() <= depot.max_load());
            }
            assert!(individual.is_valid());
        }
    }

    #[test]
    fn random_vehicle_spreads_customers() {
        let problem = Arc::new(fixtures::line());
        let mut used = [false; 4];

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let individual =
                Individual::build_random_vehicle(problem.clone(), Weighted::default(), false, &mut rng)
                    .unwrap();
            for (v, route) in individual.routes().iter().enumerate() {
                used[v] |= !route.is_empty();
            }
        }

        assert!(used.iter().all(|&x| x));
    }

    #[test]
    fn random_vehicle_respects_limits_unless_forced() {
        let mut rng = StdRng::seed_from_u64(5);

        let overloaded = Arc::new(fixtures::overloaded());
        let unforced =
            Individual::build_random_vehicle(overloaded.clone(), Weighted::default(), false, &mut rng);
        assert!(matches!(unforced, Err(ConstructionFailure::Unplaced { .. })));
        let forced =
            Individual::build_random_vehicle(overloaded, Weighted::default(), true, &mut rng).unwrap();
        fixtures::assert_complete(&forced);
        assert_eq!(forced.routes()[0].load(), 110);
        assert!(!forced.is_valid());

        let overlong = Arc::new(fixtures::short_leash());
        let unforced =
            Individual::build_random_vehicle(overlong.clone(), Weighted::default(), false, &mut rng);
        assert_eq!(
            unforced.unwrap_err(),
            ConstructionFailure::Unplaced { depot: d(0), customer: c(0) }
        );
        let forced =
            Individual::build_random_vehicle(overlong, Weighted { duration: 2.0, load: 1.0 }, true, &mut rng)
                .unwrap();
        assert_eq!(forced.fitness(), 20.0 + 5.0 * 2.0);
        assert!(!forced.is_valid());
    }

    #[test]
    fn validity_follows_limits() {
        let problem = Arc::new(fixtures::line());
        let routes = vec![
            Route::with_customers(&problem, d(0), d(0), vec![c(0), c(1), c(2)]),
            Route::new(d(0)),
            Route::with_customers(&problem, d(1), d(1), vec![c(3), c(4), c(5)]),
            Route::new(d(1)),
        ];
        let individual = Individual::new(problem.clone(), Weighted { duration: 1.0, load: 2.0 }, routes);

        // The first vehicle of the second depot carries 150 out of 100
        assert!(!individual.is_valid());
        assert_eq!(individual.fitness(), individual.duration() + 100.0);
    }

    #[test]
    fn evaluation_is_refreshed_after_mutation() {
        let problem = Arc::new(fixtures::random(2, 20, 3));
        let mut individual = build(&problem, 1);
        let mut rng = StdRng::seed_from_u64(2);

        let _ = individual.fitness();
        for _ in 0..10 {
            individual.cross_mutate(&mut rng);
            let fresh = Individual::new(problem.clone(), individual.penalties(), individual.routes().to_vec());
            assert_eq!(individual.evaluation(), fresh.evaluation());
        }
    }

    #[test]
    fn crossover_conserves_customers() {
        let problem = Arc::new(fixtures::random(3, 30, 9));
        let left = build(&problem, 4);
        let right = build(&problem, 5);
        let mut rng = StdRng::seed_from_u64(6);

        for route in right.routes().iter().filter(|r| !r.is_empty()) {
            for segment in route.split(&mut rng, 2) {
                let child = left.single_point_crossover(&segment).unwrap();
                fixtures::assert_complete(&child);
                assert_consistent_loads(&child);
                assert_eq!(child.routes().len(), left.routes().len());

                if !segment.is_empty() {
                    // The segment is inserted as one contiguous block
                    assert!(child
                        .routes()
                        .iter()
                        .any(|r| r.customers().windows(segment.len()).any(|w| w == &segment[..])));
                }
            }
        }
    }

    #[test]
    fn crossover_edge_cases() {
        let problem = Arc::new(fixtures::line());
        let empty = Individual::new(problem.clone(), Weighted::default(), vec![]);
        assert_eq!(empty.single_point_crossover(&[c(0)]).unwrap_err(), SolutionError::NoRoutes);

        let individual = build(&problem, 0);
        let child = individual.single_point_crossover(&[]).unwrap();
        assert_eq!(child.routes(), individual.routes());
    }

    #[test]
    fn crossover_reassigns_end_depots() {
        let problem = Arc::new(fixtures::line());
        let routes = vec![
            Route::with_customers(&problem, d(0), d(1), vec![c(0), c(1), c(2), c(5)]),
            Route::new(d(0)),
            Route::with_customers(&problem, d(1), d(1), vec![c(3), c(4)]),
            Route::new(d(1)),
        ];
        let individual = Individual::new(problem.clone(), Weighted::default(), routes);

        let child = individual.single_point_crossover(&[c(5)]).unwrap();
        let routes = child.routes();
        assert_eq!(routes[0].customers(), &[c(0), c(1), c(2)]);
        assert_eq!(routes[0].end(), d(0));
        assert_eq!(routes[2].customers(), &[c(3), c(4)]);
        assert_eq!(routes[3].customers(), &[c(5)]);
        assert_eq!(routes[3].end(), d(1));
        assert!(child.is_valid());
        // The parent is left untouched
        assert_eq!(individual.routes()[0].customers(), &[c(0), c(1), c(2), c(5)]);
    }

    #[test]
    fn mutations_conserve_customers() {
        let problem = Arc::new(fixtures::random(3, 30, 21));
        let mut individual = build(&problem, 8);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..50 {
            individual.swap_mutate(&mut rng);
            fixtures::assert_complete(&individual);
            individual.cross_mutate(&mut rng);
            fixtures::assert_complete(&individual);
            individual.inter_swap_mutate(&mut rng);
            fixtures::assert_complete(&individual);
            assert_consistent_loads(&individual);
        }
        assert_eq!(individual.routes().len(), problem.vehicle_count());
    }

    #[test]
    fn swap_mutation_only_reorders_one_route() {
        let problem = Arc::new(fixtures::line());
        let routes = vec![Route::with_customers(&problem, d(0), d(0), vec![c(0), c(1), c(2)])];
        let mut individual = Individual::new(problem.clone(), Weighted::default(), routes);
        let mut rng = StdRng::seed_from_u64(4);

        individual.swap_mutate(&mut rng);
        let customers = individual.routes()[0].customers();
        assert_ne!(customers, &[c(0), c(1), c(2)]);
        assert_eq!(customers.len(), 3);

        let single = vec![Route::with_customers(&problem, d(0), d(0), vec![c(0)])];
        let mut individual = Individual::new(problem.clone(), Weighted::default(), single);
        individual.swap_mutate(&mut rng);
        assert_eq!(individual.routes()[0].customers(), &[c(0)]);
    }
}
