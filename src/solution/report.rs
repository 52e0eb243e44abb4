use std::fmt::Display;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use slice_group_by::GroupBy;

use crate::{
    problem::{Duration, Quantity},
    solution::Individual,
    utils,
};

/// The data needed to present a single route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    /// Id of the depot the vehicle leaves from
    pub start_depot: usize,
    /// The number of the vehicle among those of its start depot, starting at 1
    pub vehicle: usize,
    pub duration: Duration,
    pub load: Quantity,
    /// Id of the depot the vehicle returns to
    pub end_depot: usize,
    /// Ids of the customers, in visiting order
    pub customers: Vec<usize>,
}

/// The data needed to present an individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionReport {
    pub duration: Duration,
    pub fitness: f64,
    pub valid: bool,
    pub routes: Vec<RouteReport>,
}

impl Individual {
    /// Summarize the individual in terms of instance ids
    pub fn report(&self) -> SolutionReport {
        let problem = self.problem();
        let evaluation = self.evaluation();

        let routes = self
            .routes()
            .linear_group_by_key(|route| route.start())
            .flat_map(|group| group.iter().enumerate())
            .map(|(k, route)| RouteReport {
                start_depot: problem.depot(route.start()).id(),
                vehicle: k + 1,
                duration: route.duration(problem),
                load: route.load(),
                end_depot: problem.depot(route.end()).id(),
                customers: route
                    .customers()
                    .iter()
                    .map(|&c| problem.customer(c).id())
                    .collect(),
            })
            .collect();

        SolutionReport {
            duration: evaluation.duration,
            fitness: evaluation.fitness,
            valid: evaluation.valid,
            routes,
        }
    }
}

/// The customary text layout of MDVRP solutions: the total duration on the first line, followed by
/// `start vehicle duration load end customers...` for every route, empty ones included.
impl Display for SolutionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", utils::round(self.duration, 2))?;

        for route in &self.routes {
            write!(
                f,
                "\n{}\t{}\t{:.2}\t{}\t{}\t{}",
                route.start_depot,
                route.vehicle,
                utils::round(route.duration, 2),
                route.load,
                route.end_depot,
                route.customers.iter().join(" ")
            )?;
        }

        Ok(())
    }
}
