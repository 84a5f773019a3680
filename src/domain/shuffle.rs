/// Seedable pseudo-random number generator (xorshift64) and the
/// Fisher–Yates shuffle built on it.
///
/// The shuffle never mutates its input and returns a true permutation:
/// every element appears exactly once in the output. Losing or duplicating
/// a tile here would corrupt the pool/slot ownership invariant downstream,
/// so the permutation property is tested directly.

#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Random number in [0, upper_bound).
    pub fn next_int(&mut self, upper_bound: u32) -> u32 {
        (self.next_u64() % u64::from(upper_bound)) as u32
    }
}

/// Uniformly shuffled copy of `items`.
pub fn shuffled<T: Clone>(items: &[T], rng: &mut Rng) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.next_int(i as u32 + 1) as usize;
        out.swap(i, j);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::{Tile, TileId};

    fn tiles(n: u32) -> Vec<Tile> {
        (0..n).map(|i| Tile::new(TileId(i), '字', i as usize)).collect()
    }

    #[test]
    fn rng_deterministic() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_int(1000), b.next_int(1000));
        }
    }

    #[test]
    fn rng_zero_seed_handled() {
        let mut rng = Rng::new(0);
        let _ = rng.next_int(100);
    }

    #[test]
    fn shuffle_is_permutation() {
        let input = tiles(12);
        let mut rng = Rng::new(7);
        let out = shuffled(&input, &mut rng);
        assert_eq!(out.len(), input.len());
        // Every id exactly once, nothing invented or lost.
        let mut ids: Vec<u32> = out.iter().map(|t| t.id.0).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_does_not_mutate_input() {
        let input = tiles(6);
        let before = input.clone();
        let mut rng = Rng::new(3);
        let _ = shuffled(&input, &mut rng);
        assert_eq!(input, before);
    }

    #[test]
    fn shuffle_same_seed_same_order() {
        let input = tiles(8);
        let a = shuffled(&input, &mut Rng::new(99));
        let b = shuffled(&input, &mut Rng::new(99));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_reaches_every_position() {
        // Across seeds, the first element should land somewhere other than
        // its start position at least once — a stuck shuffle would not.
        let input = tiles(5);
        let moved = (1..50u64).any(|seed| {
            let out = shuffled(&input, &mut Rng::new(seed));
            out[0].id != input[0].id
        });
        assert!(moved);
    }

    #[test]
    fn shuffle_handles_tiny_inputs() {
        let mut rng = Rng::new(1);
        assert!(shuffled(&tiles(0), &mut rng).is_empty());
        assert_eq!(shuffled(&tiles(1), &mut rng).len(), 1);
    }
}
