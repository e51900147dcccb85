//! A side's chakra pool

use std::fmt;

use arena_team::{ChakraCost, ChakraKind};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Typed chakra counters owned by one side.
///
/// The total is always derived from the four counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChakraPool {
    #[serde(rename = "tai")]
    pub taijutsu: u32,
    #[serde(rename = "blo")]
    pub bloodline: u32,
    #[serde(rename = "nin")]
    pub ninjutsu: u32,
    #[serde(rename = "gen")]
    pub genjutsu: u32,
}

impl ChakraPool {
    pub fn new(taijutsu: u32, bloodline: u32, ninjutsu: u32, genjutsu: u32) -> Self {
        Self {
            taijutsu,
            bloodline,
            ninjutsu,
            genjutsu,
        }
    }

    /// `n` units, each of a uniformly random kind
    pub fn generate_random<R: Rng + ?Sized>(n: u32, rng: &mut R) -> Self {
        let mut pool = Self::default();
        for _ in 0..n {
            let kind = ChakraKind::ALL[rng.gen_range(0..ChakraKind::ALL.len())];
            *pool.count_mut(kind) += 1;
        }
        pool
    }

    /// Get the count of one kind
    pub fn get(&self, kind: ChakraKind) -> u32 {
        match kind {
            ChakraKind::Taijutsu => self.taijutsu,
            ChakraKind::Bloodline => self.bloodline,
            ChakraKind::Ninjutsu => self.ninjutsu,
            ChakraKind::Genjutsu => self.genjutsu,
        }
    }

    fn count_mut(&mut self, kind: ChakraKind) -> &mut u32 {
        match kind {
            ChakraKind::Taijutsu => &mut self.taijutsu,
            ChakraKind::Bloodline => &mut self.bloodline,
            ChakraKind::Ninjutsu => &mut self.ninjutsu,
            ChakraKind::Genjutsu => &mut self.genjutsu,
        }
    }

    pub fn total(&self) -> u32 {
        self.taijutsu + self.bloodline + self.ninjutsu + self.genjutsu
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Elementwise add
    pub fn add(&mut self, gain: &ChakraPool) {
        for kind in ChakraKind::ALL {
            *self.count_mut(kind) += gain.get(kind);
        }
    }

    /// Typed minimums met and enough left over for the generic part
    pub fn can_afford(&self, cost: &ChakraCost) -> bool {
        ChakraKind::ALL
            .iter()
            .all(|&kind| self.get(kind) >= cost.of(kind))
            && self.total() >= cost.total()
    }

    /// Deduct a cost: typed amounts first, then the generic part one unit at
    /// a time from the most plentiful kind (ties go to the earlier kind).
    ///
    /// Payment is deterministic, and a pool holding at least as much of
    /// every kind ends up holding at least as much after paying the same
    /// cost. A plan checked against a copy of the pool therefore stays
    /// affordable against the real one.
    ///
    /// Returns false and leaves the pool untouched when the cost cannot be met.
    pub fn pay(&mut self, cost: &ChakraCost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for kind in ChakraKind::ALL {
            *self.count_mut(kind) -= cost.of(kind);
        }
        for _ in 0..cost.generic {
            let Some(kind) = self.most_plentiful() else {
                break;
            };
            *self.count_mut(kind) -= 1;
        }
        true
    }

    /// The kind with the highest non-zero count
    fn most_plentiful(&self) -> Option<ChakraKind> {
        ChakraKind::ALL
            .into_iter()
            .filter(|&kind| self.get(kind) > 0)
            .rev()
            .max_by_key(|&kind| self.get(kind))
    }

    /// Remove up to `n` units from random non-empty kinds.
    ///
    /// Returns the units actually removed.
    pub fn remove_random<R: Rng + ?Sized>(&mut self, n: u32, rng: &mut R) -> ChakraPool {
        let mut removed = ChakraPool::default();
        for _ in 0..n {
            let available: Vec<ChakraKind> = ChakraKind::ALL
                .into_iter()
                .filter(|&kind| self.get(kind) > 0)
                .collect();
            let Some(&kind) = available.choose(rng) else {
                break;
            };
            *self.count_mut(kind) -= 1;
            *removed.count_mut(kind) += 1;
        }
        removed
    }
}

impl fmt::Display for ChakraPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tai:{} blo:{} nin:{} gen:{} (total {})",
            self.taijutsu,
            self.bloodline,
            self.ninjutsu,
            self.genjutsu,
            self.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_generate_random_count() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = ChakraPool::generate_random(7, &mut rng);
        assert_eq!(pool.total(), 7);
    }

    #[test]
    fn test_can_afford_typed_and_generic() {
        let pool = ChakraPool::new(1, 0, 1, 0);
        assert!(pool.can_afford(&ChakraCost::parse("13")));
        assert!(pool.can_afford(&ChakraCost::parse("10")));
        assert!(!pool.can_afford(&ChakraCost::parse("130")));
        assert!(!pool.can_afford(&ChakraCost::parse("2")));
        assert!(pool.can_afford(&ChakraCost::FREE));
    }

    #[test]
    fn test_pay_typed_first() {
        let mut pool = ChakraPool::new(2, 0, 1, 0);

        assert!(pool.pay(&ChakraCost::parse("30")));
        assert_eq!(pool.ninjutsu, 0);
        assert_eq!(pool.taijutsu, 1);
        assert_eq!(pool.total(), 1);
    }

    #[test]
    fn test_generic_takes_most_plentiful() {
        let mut pool = ChakraPool::new(1, 0, 3, 1);
        assert!(pool.pay(&ChakraCost::parse("00")));
        assert_eq!(pool, ChakraPool::new(1, 0, 1, 1));

        // ties go to the earlier kind
        let mut pool = ChakraPool::new(1, 0, 1, 0);
        assert!(pool.pay(&ChakraCost::parse("0")));
        assert_eq!(pool, ChakraPool::new(0, 0, 1, 0));
    }

    #[test]
    fn test_pay_unaffordable_is_noop() {
        let mut pool = ChakraPool::new(0, 1, 0, 0);

        assert!(!pool.pay(&ChakraCost::parse("20")));
        assert_eq!(pool, ChakraPool::new(0, 1, 0, 0));
    }

    #[test]
    fn test_remove_random_stops_when_empty() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pool = ChakraPool::new(1, 1, 0, 0);

        let removed = pool.remove_random(5, &mut rng);
        assert_eq!(removed.total(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_serde_short_names() {
        let pool = ChakraPool::new(1, 2, 3, 4);
        let json = serde_json::to_string(&pool).unwrap();
        assert_eq!(json, r#"{"tai":1,"blo":2,"nin":3,"gen":4}"#);
    }

    proptest! {
        #[test]
        fn test_total_tracks_typed_sum(
            start in 0u32..20,
            gain in 0u32..20,
            remove in 0u32..30,
            cost in "[0-4]{0,6}",
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut pool = ChakraPool::generate_random(start, &mut rng);
            pool.add(&ChakraPool::generate_random(gain, &mut rng));
            prop_assert_eq!(pool.total(), start + gain);

            let before = pool.total();
            let removed = pool.remove_random(remove, &mut rng);
            prop_assert_eq!(removed.total(), remove.min(before));
            prop_assert_eq!(pool.total() + removed.total(), before);

            let cost = ChakraCost::parse(&cost);
            let before = pool.total();
            if pool.pay(&cost) {
                prop_assert_eq!(pool.total(), before - cost.total());
            } else {
                prop_assert_eq!(pool.total(), before);
            }
        }

        #[test]
        fn test_richer_pool_stays_richer(
            base in proptest::array::uniform4(0u32..4),
            extra in proptest::array::uniform4(0u32..3),
            costs in proptest::collection::vec("[0-4]{0,3}", 0..4),
        ) {
            let mut plan = ChakraPool::new(base[0], base[1], base[2], base[3]);
            let mut real = plan;
            real.add(&ChakraPool::new(extra[0], extra[1], extra[2], extra[3]));

            for cost in costs {
                let cost = ChakraCost::parse(&cost);
                if plan.pay(&cost) {
                    prop_assert!(real.pay(&cost));
                }
                for kind in ChakraKind::ALL {
                    prop_assert!(real.get(kind) >= plan.get(kind));
                }
            }
        }
    }
}
