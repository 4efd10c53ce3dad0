//! Cross-checks of the family algebra against explicit set-of-sets computations.
//!
//! Families over `{1..6}` are drawn at random and every operation is compared
//! with the same operation on plain bitmasks.

use std::collections::BTreeSet;

use num_bigint::BigUint;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use setset_rs::{Error, Family, ZddManager};

const N: u32 = 6;
const ALL: u32 = (1 << N) - 1;

type Masks = BTreeSet<u32>;

fn members(mask: u32) -> Vec<u32> {
    (1..=N).filter(|e| mask & (1u32 << (e - 1)) != 0).collect()
}

fn to_family<'m>(mgr: &'m ZddManager, masks: &Masks) -> Family<'m> {
    Family::from_sets(mgr, masks.iter().map(|&m| members(m))).unwrap()
}

fn to_masks(f: &Family<'_>) -> Masks {
    f.iter()
        .map(|set| set.iter().fold(0, |acc, e| acc | (1u32 << (e.id() - 1))))
        .collect()
}

fn random_masks(rng: &mut ChaCha8Rng) -> Masks {
    let len = rng.gen_range(0..12);
    (0..len).map(|_| rng.gen_range(0..=ALL)).collect()
}

fn manager() -> ZddManager {
    let mgr = ZddManager::new();
    mgr.set_num_elems(N).unwrap();
    mgr
}

fn pairs(a: &Masks, b: &Masks, op: impl Fn(u32, u32) -> u32) -> Masks {
    a.iter().flat_map(|&x| b.iter().map(move |&y| (x, y))).map(|(x, y)| op(x, y)).collect()
}

fn is_sub(x: u32, y: u32) -> bool {
    x & !y == 0
}

// ─── Binary Operations ─────────────────────────────────────────────────────────

#[test]
fn boolean_operations_match_sets() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..50 {
        let (a, b) = (random_masks(&mut rng), random_masks(&mut rng));
        let (fa, fb) = (to_family(&mgr, &a), to_family(&mgr, &b));

        assert_eq!(to_masks(&(fa | fb)), a.union(&b).copied().collect());
        assert_eq!(to_masks(&(fa & fb)), a.intersection(&b).copied().collect());
        assert_eq!(to_masks(&(fa - fb)), a.difference(&b).copied().collect());
        assert_eq!(to_masks(&(fa ^ fb)), a.symmetric_difference(&b).copied().collect());
        assert_eq!(fa.is_subset(fb), a.is_subset(&b));
        assert_eq!(fa.is_superset(fb), a.is_superset(&b));
        assert_eq!(fa.is_disjoint(fb), a.is_disjoint(&b));
    }
}

#[test]
fn join_and_meet_match_sets() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    for _ in 0..50 {
        let (a, b) = (random_masks(&mut rng), random_masks(&mut rng));
        let (fa, fb) = (to_family(&mgr, &a), to_family(&mgr, &b));

        assert_eq!(to_masks(&fa.join(fb)), pairs(&a, &b, |x, y| x | y));
        assert_eq!(to_masks(&fa.meet(fb)), pairs(&a, &b, |x, y| x & y));
    }
}

#[test]
fn division_matches_sets() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..50 {
        let a = random_masks(&mut rng);
        let mut d = random_masks(&mut rng);
        d.remove(&0);
        let (fa, fd) = (to_family(&mgr, &a), to_family(&mgr, &d));

        let expected: Masks = if d.is_empty() {
            Masks::new()
        } else {
            (0..=ALL)
                .filter(|&s| d.iter().all(|&x| s & x == 0 && a.contains(&(s | x))))
                .collect()
        };
        let q = fa.quotient(fd).unwrap();
        assert_eq!(to_masks(&q), expected);

        let product = pairs(&d, &expected, |x, y| x | y);
        let r = fa.remainder(fd).unwrap();
        assert_eq!(to_masks(&r), a.difference(&product).copied().collect());
    }
}

#[test]
fn division_by_family_with_empty_set_fails() {
    let mgr = manager();
    let f = to_family(&mgr, &Masks::from([0b11, 0b100]));
    let d = to_family(&mgr, &Masks::from([0, 0b1]));
    assert!(matches!(f.quotient(d), Err(Error::EmptySetDivisor)));
    assert!(matches!(f.remainder(d), Err(Error::EmptySetDivisor)));
}

#[test]
fn containment_filters_match_sets() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    for _ in 0..50 {
        let (a, b) = (random_masks(&mut rng), random_masks(&mut rng));
        let (fa, fb) = (to_family(&mgr, &a), to_family(&mgr, &b));

        let subsets: Masks = a.iter().copied().filter(|&x| b.iter().any(|&y| is_sub(x, y))).collect();
        let supersets: Masks = a.iter().copied().filter(|&x| b.iter().any(|&y| is_sub(y, x))).collect();
        assert_eq!(to_masks(&fa.subsets(fb)), subsets);
        assert_eq!(to_masks(&fa.supersets(fb)), supersets);
        assert_eq!(to_masks(&fa.non_subsets(fb)), a.difference(&subsets).copied().collect());
        assert_eq!(to_masks(&fa.non_supersets(fb)), a.difference(&supersets).copied().collect());
    }
}

// ─── Unary Operations ──────────────────────────────────────────────────────────

#[test]
fn extremal_members_match_sets() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..50 {
        let a = random_masks(&mut rng);
        let fa = to_family(&mgr, &a);

        let minimal: Masks = a.iter().copied().filter(|&x| !a.iter().any(|&y| y != x && is_sub(y, x))).collect();
        let maximal: Masks = a.iter().copied().filter(|&x| !a.iter().any(|&y| y != x && is_sub(x, y))).collect();
        assert_eq!(to_masks(&fa.minimal()), minimal);
        assert_eq!(to_masks(&fa.maximal()), maximal);
    }
}

#[test]
fn hitting_sets_match_sets() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    for _ in 0..50 {
        let a = random_masks(&mut rng);
        let fa = to_family(&mgr, &a);

        let expected: Masks = (0..=ALL).filter(|&h| a.iter().all(|&x| h & x != 0)).collect();
        assert_eq!(to_masks(&fa.hitting()), expected);
    }
}

#[test]
fn complements_match_sets() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..50 {
        let a = random_masks(&mut rng);
        let fa = to_family(&mgr, &a);

        assert_eq!(to_masks(&fa.flip()), a.iter().map(|&x| !x & ALL).collect());
        assert_eq!(to_masks(&!fa), (0..=ALL).filter(|x| !a.contains(x)).collect());
        assert_eq!(to_masks(&fa.flip_elem(3).unwrap()), a.iter().map(|&x| x ^ 0b100).collect());
        assert_eq!(fa.flip().flip(), fa);
        assert_eq!(!!fa, fa);
    }
}

#[test]
fn size_filters_match_sets() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    for _ in 0..50 {
        let a = random_masks(&mut rng);
        let fa = to_family(&mgr, &a);
        let k = rng.gen_range(0..=N);

        let by = |keep: fn(u32, u32) -> bool| -> Masks { a.iter().copied().filter(|x| keep(x.count_ones(), k)).collect() };
        assert_eq!(to_masks(&fa.smaller(k)), by(|c, k| c < k));
        assert_eq!(to_masks(&fa.larger(k)), by(|c, k| c > k));
        assert_eq!(to_masks(&fa.same_size(k)), by(|c, k| c == k));
    }
}

#[test]
fn element_filters_match_sets() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    for _ in 0..50 {
        let a = random_masks(&mut rng);
        let mut fa = to_family(&mgr, &a);
        let e = rng.gen_range(1..=N);
        let bit: u32 = 1 << (e - 1);

        assert_eq!(to_masks(&fa.include(e).unwrap()), a.iter().copied().filter(|x| x & bit != 0).collect());
        assert_eq!(to_masks(&fa.exclude(e).unwrap()), a.iter().copied().filter(|x| x & bit == 0).collect());

        fa.discard_elem(e);
        assert_eq!(to_masks(&fa), a.iter().map(|x| x & !bit).collect());
        fa.insert_elem(e).unwrap();
        assert_eq!(to_masks(&fa), a.iter().map(|x| x | bit).collect());
    }
}

// ─── Counting and Enumeration ──────────────────────────────────────────────────

#[test]
fn counts_match_sets() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    for _ in 0..50 {
        let a = random_masks(&mut rng);
        let fa = to_family(&mgr, &a);

        assert_eq!(fa.len().unwrap(), a.len() as u64);
        assert_eq!(fa.size(), BigUint::from(a.len()));
        assert_eq!(fa.iter().count(), a.len());
    }
}

#[test]
fn random_order_is_a_permutation() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    for seed in 0..20 {
        let a = random_masks(&mut rng);
        let fa = to_family(&mgr, &a);

        let drawn: Vec<Vec<_>> = fa.iter_random(seed).collect();
        assert_eq!(drawn.len(), a.len());
        let drawn: Masks = drawn
            .iter()
            .map(|set| set.iter().fold(0, |acc, e| acc | (1u32 << (e.id() - 1))))
            .collect();
        assert_eq!(drawn, a);
    }
}

#[test]
fn weighted_order_is_monotone() {
    let mgr = manager();
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let weights: Vec<f64> = (0..N).map(|_| rng.gen_range(-5.0..5.0)).collect();
    let weight = |set: &[setset_rs::Elem]| -> f64 { set.iter().map(|e| weights[e.index()]).sum() };

    for _ in 0..20 {
        let a = random_masks(&mut rng);
        let fa = to_family(&mgr, &a);

        let best: Vec<f64> = fa.maximize(&weights).map(|s| weight(&s)).collect();
        assert_eq!(best.len(), a.len());
        assert!(best.windows(2).all(|w| w[0] >= w[1] - 1e-9));

        let worst: Vec<f64> = fa.minimize(&weights).map(|s| weight(&s)).collect();
        assert_eq!(worst.len(), a.len());
        assert!(worst.windows(2).all(|w| w[0] <= w[1] + 1e-9));
    }
}
