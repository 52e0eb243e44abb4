use float_ord::FloatOrd;
use log::trace;

use super::traits::SurvivalSelection;
use crate::solution::Individual;

/// Keeps the `count` best individuals of the previous generation as elites, and forms the next
/// generation from the best of the children and elites combined. If that is too few, the best of
/// the remaining previous individuals fill up the rest.
#[derive(Debug, Clone)]
pub struct Elitist {
    /// The number of elites
    pub count: usize,
    /// Whether the individuals selected as parents in this generation may be elites
    pub parents_eligible: bool,
}

impl Elitist {
    pub fn new(count: usize, parents_eligible: bool) -> Self {
        Elitist {
            count,
            parents_eligible,
        }
    }
}

fn sort_by_fitness(individuals: &mut [Individual]) {
    individuals.sort_by_cached_key(|x| FloatOrd(x.fitness()));
}

impl SurvivalSelection for Elitist {
    fn select_survivors(
        &mut self,
        population: Vec<Individual>,
        parents: &[usize],
        mut children: Vec<Individual>,
        size: usize,
    ) -> Vec<Individual> {
        let mut previous = population.into_iter().enumerate().collect::<Vec<_>>();
        previous.sort_by_cached_key(|(_, x)| FloatOrd(x.fitness()));

        let (mut eligible, excluded): (Vec<_>, Vec<_>) = previous
            .into_iter()
            .partition(|(i, _)| self.parents_eligible || !parents.contains(i));
        let remaining = eligible.split_off(self.count.min(eligible.len()));

        trace!("Selecting among {} children and {} elites", children.len(), eligible.len());
        children.extend(eligible.into_iter().map(|(_, x)| x));
        sort_by_fitness(&mut children);
        children.truncate(size);

        if children.len() < size {
            let mut spare = remaining
                .into_iter()
                .chain(excluded)
                .map(|(_, x)| x)
                .collect::<Vec<_>>();
            sort_by_fitness(&mut spare);

            let missing = size - children.len();
            trace!("Filling {} places from the previous generation", missing);
            children.extend(spare.into_iter().take(missing));
            sort_by_fitness(&mut children);
        }

        children
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        ga::fitness::Weighted,
        problem::{fixtures, CustomerIndex, DepotIndex},
        solution::Route,
    };

    /// A feasible individual and an overloaded one, in that order
    fn good_and_bad() -> (Individual, Individual) {
        let problem = Arc::new(fixtures::line());
        let (d0, d1) = (DepotIndex::from(0), DepotIndex::from(1));
        let c = |i: usize| CustomerIndex::from(i);

        let good = Individual::new(
            problem.clone(),
            Weighted::default(),
            vec![
                Route::with_customers(&problem, d0, d0, vec![c(0), c(1), c(2)]),
                Route::new(d0),
                Route::with_customers(&problem, d1, d1, vec![c(3), c(4)]),
                Route::with_customers(&problem, d1, d1, vec![c(5)]),
            ],
        );
        let bad = Individual::new(
            problem.clone(),
            Weighted::default(),
            vec![
                Route::with_customers(&problem, d0, d0, vec![c(0), c(1), c(2)]),
                Route::new(d0),
                Route::with_customers(&problem, d1, d1, vec![c(3), c(4), c(5)]),
                Route::new(d1),
            ],
        );

        assert!(good.fitness() < bad.fitness());
        (good, bad)
    }

    #[test]
    fn elites_survive_worse_children() {
        let (good, bad) = good_and_bad();
        let children = vec![bad.clone(), bad.clone(), bad.clone()];

        let next = Elitist::new(1, true).select_survivors(vec![good.clone(), bad], &[0, 1], children, 2);

        assert_eq!(next.len(), 2);
        assert_eq!(next[0].fitness(), good.fitness());
    }

    #[test]
    fn parents_are_excluded_without_elitism() {
        let (good, bad) = good_and_bad();
        let children = vec![bad.clone(), bad.clone(), bad.clone()];

        let next = Elitist::new(1, false).select_survivors(vec![good.clone(), bad.clone()], &[0], children, 2);

        assert_eq!(next.len(), 2);
        assert!(next.iter().all(|x| x.fitness() == bad.fitness()));
    }

    #[test]
    fn shortfall_is_filled_from_previous_generation() {
        let (good, bad) = good_and_bad();

        let next = Elitist::new(0, true).select_survivors(
            vec![bad.clone(), good.clone(), bad.clone()],
            &[],
            Vec::new(),
            2,
        );

        assert_eq!(next.len(), 2);
        assert_eq!(next[0].fitness(), good.fitness());
        assert_eq!(next[1].fitness(), bad.fitness());
    }

    #[test]
    fn better_children_replace_the_population() {
        let (good, bad) = good_and_bad();

        let next = Elitist::new(1, true).select_survivors(
            vec![bad.clone(), bad.clone()],
            &[0, 1],
            vec![good.clone(), good.clone()],
            2,
        );

        assert!(next.iter().all(|x| x.fitness() == good.fitness()));
    }
}
