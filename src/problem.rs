use derive_more::{Deref, Display, From, Into};
use float_ord::FloatOrd;
use serde::{Deserialize, Serialize};
use typed_index_collections::TiVec;

use crate::utils;

/// The type used for load quantities (demand and vehicle capacity)
pub type Quantity = u32;
/// The type used for distance
pub type Distance = f64;
/// The type used for route duration. Travel time equals Euclidean distance.
pub type Duration = f64;

#[derive(Deref, Debug, PartialEq, Eq, PartialOrd, Ord, From, Into, Clone, Copy, Hash, Display)]
pub struct DepotIndex(usize);

#[derive(Deref, Debug, PartialEq, Eq, PartialOrd, Ord, From, Into, Clone, Copy, Hash, Display)]
pub struct CustomerIndex(usize);

/// A point in Euclidean 2d-space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> Distance {
        utils::euclidean_distance(self, other)
    }
}

#[derive(Debug, Clone)]
pub struct Depot {
    /// The identifier of the depot in the instance
    id: usize,
    /// The location of the depot
    position: Point,
    /// The capacity of each vehicle stationed at the depot
    max_load: Quantity,
    /// The maximum duration of a route starting at the depot. Zero means unconstrained.
    max_duration: Duration,
    /// The number of vehicles available at the depot
    max_vehicles: usize,
    /// The customers served from this depot
    customers: Vec<CustomerIndex>,
}

impl Depot {
    pub fn new(
        id: usize,
        position: Point,
        max_load: Quantity,
        max_duration: Duration,
        max_vehicles: usize,
    ) -> Self {
        Self {
            id,
            position,
            max_load,
            max_duration,
            max_vehicles,
            customers: Vec::new(),
        }
    }

    /// Attach a set of customers to the depot
    pub fn with_customers(mut self, customers: Vec<CustomerIndex>) -> Self {
        self.customers = customers;
        self
    }

    /// The identifier of the depot in the instance
    pub fn id(&self) -> usize {
        self.id
    }
    /// The location of the depot
    pub fn position(&self) -> &Point {
        &self.position
    }
    /// The capacity of each vehicle stationed at the depot
    pub fn max_load(&self) -> Quantity {
        self.max_load
    }
    /// The maximum duration of a route starting at the depot. Zero means unconstrained.
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }
    /// Whether routes from this depot have a duration limit
    pub fn has_duration_limit(&self) -> bool {
        self.max_duration != 0.0
    }
    /// The number of vehicles available at the depot
    pub fn max_vehicles(&self) -> usize {
        self.max_vehicles
    }
    /// The customers served from this depot
    pub fn customers(&self) -> &[CustomerIndex] {
        &self.customers
    }
}

#[derive(Debug, Clone)]
pub struct Customer {
    /// The identifier of the customer in the instance
    id: usize,
    /// The location of the customer
    position: Point,
    /// Time spent servicing the customer
    service_duration: Duration,
    /// The load consumed when serving the customer
    load_demand: Quantity,
}

impl Customer {
    pub fn new(id: usize, position: Point, service_duration: Duration, load_demand: Quantity) -> Self {
        Self {
            id,
            position,
            service_duration,
            load_demand,
        }
    }

    /// The identifier of the customer in the instance
    pub fn id(&self) -> usize {
        self.id
    }
    /// The location of the customer
    pub fn position(&self) -> &Point {
        &self.position
    }
    /// Time spent servicing the customer
    pub fn service_duration(&self) -> Duration {
        self.service_duration
    }
    /// The load consumed when serving the customer
    pub fn load_demand(&self) -> Quantity {
        self.load_demand
    }
}

#[derive(Debug, Display)]
pub enum ProblemConstructionError {
    /// There must be at least one depot
    #[display(fmt = "the problem has no depots")]
    NoDepots,
    /// A depot refers to a customer that does not exist
    #[display(fmt = "depot {} refers to unknown customer {}", depot, customer)]
    UnknownCustomer {
        depot: DepotIndex,
        customer: CustomerIndex,
    },
    /// A customer is served by more than one depot
    #[display(fmt = "customer {} is assigned to more than one depot", _0)]
    AssignedTwice(CustomerIndex),
    /// A customer is not served by any depot
    #[display(fmt = "customer {} is not assigned to any depot", _0)]
    Unassigned(CustomerIndex),
}

impl std::error::Error for ProblemConstructionError {}

/// An MDVRP instance: depots with their assigned customers.
#[derive(Debug, Clone)]
pub struct Problem {
    depots: TiVec<DepotIndex, Depot>,
    customers: TiVec<CustomerIndex, Customer>,
}

impl Problem {
    /// Construct a problem where each depot already lists the customers it serves.
    /// Every customer must be served by exactly one depot.
    pub fn new(
        depots: Vec<Depot>,
        customers: Vec<Customer>,
    ) -> Result<Problem, ProblemConstructionError> {
        use ProblemConstructionError::*;

        if depots.is_empty() {
            return Err(NoDepots);
        }

        let depots: TiVec<DepotIndex, Depot> = depots.into();
        let customers: TiVec<CustomerIndex, Customer> = customers.into();
        let mut owner: TiVec<CustomerIndex, Option<DepotIndex>> = vec![None; customers.len()].into();

        for (d, depot) in depots.iter_enumerated() {
            for &c in depot.customers() {
                match owner.get_mut(c) {
                    None => return Err(UnknownCustomer { depot: d, customer: c }),
                    Some(Some(_)) => return Err(AssignedTwice(c)),
                    Some(slot) => *slot = Some(d),
                }
            }
        }

        if let Some((c, _)) = owner.iter_enumerated().find(|(_, o)| o.is_none()) {
            return Err(Unassigned(c));
        }

        Ok(Problem { depots, customers })
    }

    /// Construct a problem by assigning every customer to its nearest depot. Any customers
    /// previously attached to the depots are discarded.
    pub fn assign_to_nearest_depot(
        depots: Vec<Depot>,
        customers: Vec<Customer>,
    ) -> Result<Problem, ProblemConstructionError> {
        if depots.is_empty() {
            return Err(ProblemConstructionError::NoDepots);
        }

        let mut assigned = vec![Vec::new(); depots.len()];
        for (c, customer) in customers.iter().enumerate() {
            let nearest = nearest(depots.iter().map(|d| d.position()), customer.position());
            assigned[nearest].push(CustomerIndex(c));
        }

        let depots = depots
            .into_iter()
            .zip(assigned)
            .map(|(depot, customers)| depot.with_customers(customers))
            .collect();

        Problem::new(depots, customers)
    }

    /// The depots of this problem, ordered by index
    pub fn depots(&self) -> &TiVec<DepotIndex, Depot> {
        &self.depots
    }

    /// The customers of this problem, ordered by index
    pub fn customers(&self) -> &TiVec<CustomerIndex, Customer> {
        &self.customers
    }

    pub fn depot(&self, depot: DepotIndex) -> &Depot {
        &self.depots[depot]
    }

    pub fn customer(&self, customer: CustomerIndex) -> &Customer {
        &self.customers[customer]
    }

    /// The depot closest to `point`. The first depot wins ties.
    pub fn nearest_depot(&self, point: &Point) -> DepotIndex {
        DepotIndex(nearest(self.depots.iter().map(|d| d.position()), point))
    }

    /// Total number of vehicles over all depots
    pub fn vehicle_count(&self) -> usize {
        self.depots.iter().map(|d| d.max_vehicles()).sum()
    }
}

/// Position of the point in `candidates` nearest to `point`, preferring the earliest on ties.
fn nearest<'a>(candidates: impl Iterator<Item = &'a Point>, point: &Point) -> usize {
    candidates
        .enumerate()
        .min_by_key(|(i, p)| (FloatOrd(p.distance(point)), *i))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
