use serde::{Deserialize, Serialize};

use crate::{
    problem::{Duration, Problem, Quantity},
    solution::Route,
};

/// Penalty rates applied to constraint violations when computing fitness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weighted {
    /// Cost per unit of duration exceeding the depot's limit
    pub duration: f64,
    /// Cost per unit of load exceeding the vehicle capacity
    pub load: f64,
}

impl Default for Weighted {
    fn default() -> Self {
        Weighted {
            duration: 10.0,
            load: 10.0,
        }
    }
}

/// The contribution of a single route to an individual's fitness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteCost {
    pub duration: Duration,
    pub penalty: f64,
    /// Duration beyond the depot's limit
    pub duration_excess: Duration,
    /// Load beyond the vehicle capacity
    pub load_excess: Quantity,
}

impl RouteCost {
    pub fn total(&self) -> f64 {
        self.duration + self.penalty
    }

    /// Whether the route stays within its limits, regardless of the penalty rates
    pub fn is_feasible(&self) -> bool {
        self.duration_excess <= 0.0 && self.load_excess == 0
    }
}

impl Weighted {
    /// Duration of `route` together with the penalty for violating the limits of its start depot.
    pub fn of(&self, problem: &Problem, route: &Route) -> RouteCost {
        let depot = problem.depot(route.start());
        let duration = route.duration(problem);

        let duration_excess = if depot.has_duration_limit() {
            (duration - depot.max_duration()).max(0.0)
        } else {
            0.0
        };
        let load_excess = route.load().saturating_sub(depot.max_load());

        RouteCost {
            duration,
            penalty: duration_excess * self.duration + load_excess as f64 * self.load,
            duration_excess,
            load_excess,
        }
    }
}
