//! Integration tests for the B+Tree index

use std::sync::Arc;

use bramble::buffer::BufferPoolManager;
use bramble::index::{
    page_kind, BPlusTree, BytewiseComparator, FixedKey, InternalNodeRef, LeafNodeRef, PageKind,
};
use bramble::storage::disk::DiskManager;
use bramble::{PageId, RecordId, SlotId};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tempfile::NamedTempFile;

type TestTree = BPlusTree<8, BytewiseComparator>;

fn create_tree(
    pool_size: usize,
    leaf_max: usize,
    internal_max: usize,
) -> (TestTree, Arc<BufferPoolManager>, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = Arc::new(DiskManager::new(temp_file.path()).unwrap());
    let bpm = Arc::new(BufferPoolManager::new(pool_size, 2, dm));
    let tree = BPlusTree::new(Arc::clone(&bpm), BytewiseComparator, leaf_max, internal_max)
        .unwrap();
    (tree, bpm, temp_file)
}

fn key(v: u64) -> FixedKey<8> {
    FixedKey::from_u64(v)
}

fn rid(v: u64) -> RecordId {
    RecordId::new(PageId::new(v as u32), SlotId::new((v % 5) as u16))
}

fn leaf_keys(bpm: &BufferPoolManager, page_id: PageId) -> Vec<u64> {
    let guard = bpm.fetch_page_read(page_id).unwrap();
    let leaf = LeafNodeRef::<8>::new(guard.data());
    (0..leaf.size())
        .map(|i| FixedKey::<8>::from_slice(leaf.key_at(i)).to_u64())
        .collect()
}

fn collect_leaf_depths(
    bpm: &BufferPoolManager,
    page_id: PageId,
    depth: usize,
    out: &mut Vec<usize>,
) {
    let guard = bpm.fetch_page_read(page_id).unwrap();
    match page_kind(guard.data()) {
        PageKind::Leaf => out.push(depth),
        PageKind::Internal => {
            let node = InternalNodeRef::<8>::new(guard.data());
            let children: Vec<PageId> = (0..node.size()).map(|i| node.child_at(i)).collect();
            drop(guard);
            for child in children {
                collect_leaf_depths(bpm, child, depth + 1, out);
            }
        }
        PageKind::Invalid => panic!("reached an uninitialised page"),
    }
}

fn assert_balanced(tree: &TestTree, bpm: &BufferPoolManager) {
    let root_id = tree.root_page_id().unwrap();
    let mut depths = Vec::new();
    collect_leaf_depths(bpm, root_id, 0, &mut depths);
    assert!(!depths.is_empty());
    let first = depths[0];
    assert!(depths.iter().all(|&d| d == first), "leaves at mixed depths");
}

#[test]
fn test_leaf_fills_to_max_before_split() {
    let (tree, bpm, _temp) = create_tree(32, 4, 4);

    for v in 1..=4 {
        assert!(tree.insert(&key(v), rid(v)).unwrap());
    }

    // Four entries sit in a single root leaf; the next insert splits.
    let root_id = tree.root_page_id().unwrap();
    {
        let guard = bpm.fetch_page_read(root_id).unwrap();
        assert_eq!(page_kind(guard.data()), PageKind::Leaf);
        assert_eq!(LeafNodeRef::<8>::new(guard.data()).size(), 4);
    }

    assert!(tree.insert(&key(5), rid(5)).unwrap());

    let root_id = tree.root_page_id().unwrap();
    let (left_id, right_id) = {
        let guard = bpm.fetch_page_read(root_id).unwrap();
        assert_eq!(page_kind(guard.data()), PageKind::Internal);
        let root = InternalNodeRef::<8>::new(guard.data());
        assert_eq!(root.size(), 2);
        assert_eq!(FixedKey::<8>::from_slice(root.key_at(1)).to_u64(), 3);
        (root.child_at(0), root.child_at(1))
    };

    assert_eq!(leaf_keys(&bpm, left_id), vec![1, 2]);
    assert_eq!(leaf_keys(&bpm, right_id), vec![3, 4, 5]);

    // The sibling chain runs left to right.
    let guard = bpm.fetch_page_read(left_id).unwrap();
    assert_eq!(LeafNodeRef::<8>::new(guard.data()).next_page_id(), right_id);
}

#[test]
fn test_delete_redistributes_from_right_sibling() {
    let (tree, bpm, _temp) = create_tree(32, 4, 4);

    for v in 1..=5 {
        tree.insert(&key(v), rid(v)).unwrap();
    }
    // Leaves are [1,2] and [3,4,5] with separator 3.

    tree.remove(&key(1)).unwrap();

    let root_id = tree.root_page_id().unwrap();
    let (left_id, right_id, separator) = {
        let guard = bpm.fetch_page_read(root_id).unwrap();
        let root = InternalNodeRef::<8>::new(guard.data());
        assert_eq!(root.size(), 2);
        (
            root.child_at(0),
            root.child_at(1),
            FixedKey::<8>::from_slice(root.key_at(1)).to_u64(),
        )
    };

    assert_eq!(leaf_keys(&bpm, left_id), vec![2, 3]);
    assert_eq!(leaf_keys(&bpm, right_id), vec![4, 5]);
    assert_eq!(separator, 4);
}

#[test]
fn test_delete_merges_and_collapses_root() {
    let (tree, bpm, _temp) = create_tree(32, 4, 4);

    for v in 1..=5 {
        tree.insert(&key(v), rid(v)).unwrap();
    }

    tree.remove(&key(2)).unwrap();
    tree.remove(&key(3)).unwrap();

    // The leaves merged and the root dropped a level: it is a leaf again.
    let root_id = tree.root_page_id().unwrap();
    {
        let guard = bpm.fetch_page_read(root_id).unwrap();
        assert_eq!(page_kind(guard.data()), PageKind::Leaf);
    }
    assert_eq!(leaf_keys(&bpm, root_id), vec![1, 4, 5]);

    let mut result = Vec::new();
    for v in [1u64, 4, 5] {
        result.clear();
        assert!(tree.get_value(&key(v), &mut result).unwrap());
        assert_eq!(result, vec![rid(v)]);
    }
}

#[test]
fn test_delete_to_min_size_without_merge() {
    let (tree, bpm, _temp) = create_tree(32, 4, 4);

    for v in 1..=5 {
        tree.insert(&key(v), rid(v)).unwrap();
    }

    // [3,4,5] can shrink to [3,4] (exactly min size) with no structural
    // change.
    tree.remove(&key(5)).unwrap();

    let root_id = tree.root_page_id().unwrap();
    let guard = bpm.fetch_page_read(root_id).unwrap();
    assert_eq!(page_kind(guard.data()), PageKind::Internal);
    let root = InternalNodeRef::<8>::new(guard.data());
    assert_eq!(root.size(), 2);
    let (left_id, right_id) = (root.child_at(0), root.child_at(1));
    drop(guard);

    assert_eq!(leaf_keys(&bpm, left_id), vec![1, 2]);
    assert_eq!(leaf_keys(&bpm, right_id), vec![3, 4]);
}

#[test]
fn test_sequential_inserts_stay_ordered_and_balanced() {
    let (tree, bpm, _temp) = create_tree(128, 4, 4);

    for v in 0..200 {
        assert!(tree.insert(&key(v), rid(v)).unwrap());
    }

    let mut result = Vec::new();
    for v in 0..200 {
        result.clear();
        assert!(tree.get_value(&key(v), &mut result).unwrap(), "lost key {}", v);
        assert_eq!(result, vec![rid(v)]);
    }

    let scanned: Vec<u64> = tree
        .begin()
        .unwrap()
        .map(|entry| entry.unwrap().0.to_u64())
        .collect();
    let expected: Vec<u64> = (0..200).collect();
    assert_eq!(scanned, expected);

    assert_balanced(&tree, &bpm);
}

#[test]
fn test_reverse_inserts_stay_ordered_and_balanced() {
    let (tree, bpm, _temp) = create_tree(128, 4, 4);

    for v in (0..150).rev() {
        assert!(tree.insert(&key(v), rid(v)).unwrap());
    }

    let scanned: Vec<u64> = tree
        .begin()
        .unwrap()
        .map(|entry| entry.unwrap().0.to_u64())
        .collect();
    let expected: Vec<u64> = (0..150).collect();
    assert_eq!(scanned, expected);

    assert_balanced(&tree, &bpm);
}

#[test]
fn test_round_trip_leaves_no_resident_tree_page() {
    let pool_size = 64;
    let (tree, bpm, _temp) = create_tree(pool_size, 8, 8);

    for v in 0..120 {
        tree.insert(&key(v), rid(v)).unwrap();
    }
    assert!(!tree.is_empty().unwrap());

    for v in 0..120 {
        tree.remove(&key(v)).unwrap();
    }

    assert!(tree.is_empty().unwrap());
    assert_eq!(tree.root_page_id().unwrap(), bramble::common::INVALID_PAGE_ID);
    assert!(tree.begin().unwrap().next().is_none());

    // Every tree page was handed back; only the header remains resident.
    assert_eq!(bpm.free_frame_count(), pool_size - 1);
}

#[test]
fn test_shuffled_inserts_and_removes() {
    let (tree, bpm, _temp) = create_tree(128, 4, 4);
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xB7EE);

    let mut values: Vec<u64> = (0..180).collect();
    values.shuffle(&mut rng);
    for &v in &values {
        assert!(tree.insert(&key(v), rid(v)).unwrap());
    }
    assert_balanced(&tree, &bpm);

    values.shuffle(&mut rng);
    let (gone, kept) = values.split_at(90);
    for &v in gone {
        tree.remove(&key(v)).unwrap();
        // A second removal of the same key is a no-op.
        tree.remove(&key(v)).unwrap();
    }
    assert_balanced(&tree, &bpm);

    let mut result = Vec::new();
    for &v in gone {
        result.clear();
        assert!(!tree.get_value(&key(v), &mut result).unwrap());
    }
    for &v in kept {
        result.clear();
        assert!(tree.get_value(&key(v), &mut result).unwrap(), "lost key {}", v);
        assert_eq!(result, vec![rid(v)]);
    }

    let mut remaining: Vec<u64> = kept.to_vec();
    remaining.sort_unstable();
    let scanned: Vec<u64> = tree
        .begin()
        .unwrap()
        .map(|entry| entry.unwrap().0.to_u64())
        .collect();
    assert_eq!(scanned, remaining);
}

#[test]
fn test_iterator_equality_and_positioning() {
    let (tree, _bpm, _temp) = create_tree(64, 4, 4);

    // Empty tree: begin is end.
    assert!(tree.begin().unwrap() == tree.end());

    for v in 0..50 {
        tree.insert(&key(v), rid(v)).unwrap();
    }

    assert!(tree.begin().unwrap() == tree.begin().unwrap());
    assert!(!(tree.begin().unwrap() == tree.end()));

    // Positioned scan from the middle of the key space.
    let suffix: Vec<u64> = tree
        .begin_at(&key(25))
        .unwrap()
        .map(|entry| entry.unwrap().0.to_u64())
        .collect();
    let expected: Vec<u64> = (25..50).collect();
    assert_eq!(suffix, expected);

    // An absent key positions at the end.
    assert!(tree.begin_at(&key(999)).unwrap() == tree.end());

    // Advancing one of two equal iterators makes them differ.
    let mut a = tree.begin().unwrap();
    let b = tree.begin().unwrap();
    a.next();
    assert!(!(a == b));
}

fn key_width_smoke<const N: usize>() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = Arc::new(DiskManager::new(temp_file.path()).unwrap());
    let bpm = Arc::new(BufferPoolManager::new(64, 2, dm));
    let tree =
        BPlusTree::<N, BytewiseComparator>::new(bpm, BytewiseComparator, 4, 4).unwrap();

    for v in 0..40u64 {
        assert!(tree.insert(&FixedKey::from_u64(v), rid(v)).unwrap());
    }

    let mut result = Vec::new();
    for v in 0..40u64 {
        result.clear();
        assert!(tree.get_value(&FixedKey::from_u64(v), &mut result).unwrap());
        assert_eq!(result, vec![rid(v)]);
    }

    for v in 0..40u64 {
        tree.remove(&FixedKey::from_u64(v)).unwrap();
    }
    assert!(tree.is_empty().unwrap());
}

#[test]
fn test_supported_key_widths() {
    key_width_smoke::<4>();
    key_width_smoke::<16>();
    key_width_smoke::<32>();
    key_width_smoke::<64>();
}
