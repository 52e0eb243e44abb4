use std::time::{Duration, Instant};

use crate::solution::Individual;

#[derive(Clone, Debug)]
pub enum Termination {
    /// Terminate after a given number of generations
    Generations(usize),
    /// Terminate upon finding a valid solution with a total duration no worse than the benchmark
    Benchmark(f64),
    /// Terminate if there has been no improvement for the given amount of time
    NoImprovement(Instant, Duration, f64),
    /// Maximum running time from `Instant`
    Timeout(Instant, Duration),
    /// Run forever
    Never,
    /// Terminate if either of the two termination criteria
    /// tells it to terminate
    Any(Box<Termination>, Box<Termination>),
    /// Terminate when both of the criteria tells it to terminate
    All(Box<Termination>, Box<Termination>),
}

impl Termination {
    pub fn timeout(duration: Duration) -> Termination {
        Termination::Timeout(Instant::now(), duration)
    }

    pub fn no_improvement(duration: Duration) -> Termination {
        Termination::NoImprovement(Instant::now(), duration, f64::INFINITY)
    }

    pub fn or(self, other: Termination) -> Termination {
        Termination::Any(Box::new(self), Box::new(other))
    }

    pub fn and(self, other: Termination) -> Termination {
        Termination::All(Box::new(self), Box::new(other))
    }

    /// Whether to stop after `generation` completed generations, given the best individual so far.
    pub fn should_terminate(&mut self, generation: usize, alpha: &Individual) -> bool {
        match self {
            Termination::Generations(n) => generation >= *n,
            Termination::Benchmark(target) => alpha.is_valid() && alpha.duration() <= *target,
            Termination::Timeout(from, duration) => from.elapsed() >= *duration,
            Termination::Never => false,
            Termination::Any(one, two) => {
                // Both sides see every generation
                let one = one.should_terminate(generation, alpha);
                let two = two.should_terminate(generation, alpha);
                one || two
            }
            Termination::All(one, two) => {
                let one = one.should_terminate(generation, alpha);
                let two = two.should_terminate(generation, alpha);
                one && two
            }
            Termination::NoImprovement(last, duration, best) => {
                // Replace best fitness and reset time of last improvement if the current solution is better than the incumbent.
                let fitness = alpha.fitness();
                if fitness < *best {
                    *best = fitness;
                    *last = Instant::now();
                }

                last.elapsed() >= *duration
            }
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Generations(n) => write!(f, "{n} generations"),
            Termination::Benchmark(target) => write!(f, "benchmark {target}"),
            Termination::NoImprovement(_, dur, _) => write!(f, "{} no-improvement", dur.as_secs()),
            Termination::Timeout(_, dur) => write!(f, "{} timeout", dur.as_secs()),
            Termination::Never => write!(f, "never"),
            Termination::Any(lhs, rhs) => write!(f, "({lhs}) | ({rhs})"),
            Termination::All(lhs, rhs) => write!(f, "({lhs}) & ({rhs})"),
        }
    }
}
