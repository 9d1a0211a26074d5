use bplus_index::BPlusTree;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Apply a random mix of inserts and deletes to both a B+ tree and a
/// `BTreeSet`, validating the tree after every operation.
fn run_random_operations(leaf_fanout: usize, branch_fanout: usize, seed: u64, steps: usize) {
    init_logging();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = BPlusTree::new(leaf_fanout, branch_fanout).unwrap();
    let mut reference = BTreeSet::new();

    for step in 0..steps {
        let value: i32 = rng.gen_range(0..200);
        if rng.gen_bool(0.6) {
            assert_eq!(
                tree.insert(value),
                reference.insert(value),
                "insert {} at step {}",
                value,
                step
            );
        } else {
            assert_eq!(
                tree.delete(&value),
                reference.remove(&value),
                "delete {} at step {}",
                value,
                step
            );
        }

        if let Err(e) = tree.check_invariants_detailed() {
            let mut dump = Vec::new();
            tree.print_to(&mut dump).unwrap();
            panic!(
                "invariants broken at step {}: {}\n{}",
                step,
                e,
                String::from_utf8_lossy(&dump)
            );
        }
        assert_eq!(tree.len(), reference.len());
    }

    assert!(tree.iter().eq(reference.iter()));
    for probe in 0..200 {
        assert_eq!(tree.search(&probe), reference.contains(&probe));
    }
}

macro_rules! random_operation_tests {
    ($(($leaf:literal, $branch:literal)),* $(,)?) => {
        paste::paste! {
            $(
                #[test]
                fn [<test_random_operations_leaf_ $leaf _branch_ $branch>]() {
                    for seed in 0..4 {
                        run_random_operations($leaf, $branch, seed, 1500);
                    }
                }
            )*
        }
    };
}

random_operation_tests! {
    (3, 3),
    (3, 4),
    (4, 3),
    (4, 4),
    (5, 5),
    (5, 7),
    (6, 4),
    (8, 8),
    (16, 16),
}

#[test]
fn test_insert_then_delete_in_random_order() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(42);
    let mut values: Vec<i32> = (0..1000).collect();
    values.shuffle(&mut rng);

    let mut tree = BPlusTree::new(4, 5).unwrap();
    for value in &values {
        assert!(tree.insert(*value));
    }
    assert!(tree.check_invariants());
    assert!(tree.iter().copied().eq(0..1000));

    values.shuffle(&mut rng);
    for (removed, value) in values.iter().enumerate() {
        assert!(tree.delete(value));
        assert!(!tree.search(value));
        assert_eq!(tree.len(), values.len() - removed - 1);
    }
    assert!(tree.is_empty());
    assert_eq!(tree.count_nodes_in_tree(), (0, 0));
    assert_eq!(tree.leaf_arena_stats().allocated_count, 0);
}

#[test]
fn test_ranges_match_btreeset() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut tree = BPlusTree::new(3, 5).unwrap();
    let mut reference = BTreeSet::new();
    for _ in 0..400 {
        let value: i32 = rng.gen_range(-500..500);
        tree.insert(value);
        reference.insert(value);
    }

    for _ in 0..200 {
        let a: i32 = rng.gen_range(-600..600);
        let b: i32 = rng.gen_range(-600..600);
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        assert!(tree.range(start..end).eq(reference.range(start..end)));
        assert!(tree.range(start..=end).eq(reference.range(start..=end)));
        assert!(tree.range(start..).eq(reference.range(start..)));
        assert!(tree.range(..end).eq(reference.range(..end)));
    }
}

#[test]
fn test_try_operations_agree_with_btreeset() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut tree = BPlusTree::new(4, 3).unwrap();
    let mut reference = BTreeSet::new();

    for _ in 0..500 {
        let value: u16 = rng.gen_range(0..100);
        if rng.gen_bool(0.5) {
            assert_eq!(tree.try_insert(value), Ok(reference.insert(value)));
        } else {
            assert_eq!(tree.try_delete(&value), Ok(reference.remove(&value)));
        }
    }
    assert!(tree.iter().eq(reference.iter()));
}
