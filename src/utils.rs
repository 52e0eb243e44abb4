use itertools::Itertools;
use rand::Rng;

use crate::problem::Point;

pub trait GetPairMut {
    type Out;
    fn get_pair_mut(self, v1: usize, v2: usize) -> (Self::Out, Self::Out);
}

impl<'a, T> GetPairMut for &'a mut [T] {
    type Out = &'a mut T;

    fn get_pair_mut(self, v1: usize, v2: usize) -> (Self::Out, Self::Out) {
        assert!(v1 != v2);
        let min = v1.min(v2);
        let max = v2.max(v1);

        let (one, rest) = self[min..].split_first_mut().expect("index in range");
        let two = &mut rest[max - min - 1];

        if v1 < v2 {
            (one, two)
        } else {
            (two, one)
        }
    }
}

pub const EPSILON: f64 = 1e-5;

/// The Euclidean distance between two points
pub fn euclidean_distance(from: &Point, to: &Point) -> f64 {
    let dx = from.x - to.x;
    let dy = from.y - to.y;
    (dx * dx + dy * dy).sqrt()
}

/// A random index in `[0, limit)`, or 0 if `limit` is 0.
pub fn random_index<R: Rng + ?Sized>(rng: &mut R, limit: usize) -> usize {
    match limit {
        0 => 0,
        _ => rng.gen_range(0..limit),
    }
}

/// A random float in `[0, 1)`
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..1.0)
}

/// Two distinct random indices in `[0, limit)`, or `None` if `limit < 2`.
pub fn random_distinct_pair<R: Rng + ?Sized>(rng: &mut R, limit: usize) -> Option<(usize, usize)> {
    if limit < 2 {
        return None;
    }

    let drawn = rand::seq::index::sample(rng, limit, 2);
    Some((drawn.index(0), drawn.index(1)))
}

/// Split `items` into `k` contiguous parts at `k - 1` random cut points drawn from `[0, len)`.
/// Parts may be empty, but concatenating them always gives back `items`.
pub fn partition<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T], k: usize) -> Vec<Vec<T>> {
    let k = k.max(1);
    let cuts = (0..k - 1)
        .map(|_| random_index(rng, items.len()))
        .sorted()
        .collect::<Vec<_>>();

    std::iter::once(0)
        .chain(cuts)
        .chain(std::iter::once(items.len()))
        .tuple_windows()
        .map(|(from, to)| items[from..to].to_vec())
        .collect()
}

/// Round `value` to `places` decimal places
pub fn round(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(euclidean_distance(&a, &b), 5.0);
        assert_eq!(euclidean_distance(&b, &a), 5.0);
    }

    #[test]
    fn partition_preserves_order_and_content() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = (0..20).collect::<Vec<_>>();

        for k in 1..6 {
            let parts = partition(&mut rng, &items, k);
            assert_eq!(parts.len(), k);
            assert_eq!(parts.concat(), items);
        }
    }

    #[test]
    fn two_way_partition_keeps_tail_nonempty() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let parts = partition(&mut rng, &[1, 2, 3], 2);
            assert!(!parts[1].is_empty());
        }
    }

    #[test]
    fn partition_of_empty_sequence() {
        let mut rng = StdRng::seed_from_u64(3);
        let parts = partition::<usize, _>(&mut rng, &[], 3);
        assert_eq!(parts, vec![Vec::<usize>::new(); 3]);
    }

    #[test]
    fn pair_mut_respects_argument_order() {
        let mut xs = [1, 2, 3, 4];
        let (a, b) = xs.as_mut_slice().get_pair_mut(3, 1);
        std::mem::swap(a, b);
        assert_eq!(xs, [1, 4, 3, 2]);
    }

    #[test]
    fn distinct_pair() {
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(random_distinct_pair(&mut rng, 1), None);
        for _ in 0..20 {
            let (a, b) = random_distinct_pair(&mut rng, 3).unwrap();
            assert_ne!(a, b);
            assert!(a < 3 && b < 3);
        }
    }

    #[test]
    fn rounding() {
        assert_eq!(round(1.23456, 2), 1.23);
        assert_eq!(round(2.005, 0), 2.0);
    }
}
