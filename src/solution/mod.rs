pub mod individual;
pub mod report;
pub mod route;

pub use individual::{ConstructionFailure, Evaluation, Individual, IndividualMut, SolutionError};
pub use report::{RouteReport, SolutionReport};
pub use route::{Route, RouteError};
