pub mod ga;
pub mod parse;
pub mod problem;
pub mod solution;
pub mod termination;
pub mod utils;
