use std::collections::VecDeque;
use std::sync::Arc;

use crate::buffer::{BufferPoolManager, WritePageGuard};
use crate::common::{BrambleError, PageId, RecordId, Result, INVALID_PAGE_ID};

use super::btree_iterator::BTreeIterator;
use super::btree_page::{
    internal_capacity, leaf_capacity, page_kind, HeaderNode, HeaderNodeRef, InternalNode,
    InternalNodeRef, LeafNode, LeafNodeRef, PageKind,
};
use super::key::FixedKey;
use super::key_comparator::KeyComparator;

fn corrupted(page_id: PageId) -> BrambleError {
    BrambleError::IndexCorrupted(format!("page {} has no valid node header", page_id))
}

/// Per-operation descent state: the header guard, the retained ancestor
/// write guards, and every page id visited on the way down. Ancestor
/// guards are released wholesale as soon as a child is known safe; the
/// visited list stays intact so structural changes can find each node's
/// parent.
struct Context {
    root_page_id: PageId,
    header: Option<WritePageGuard>,
    write_set: VecDeque<WritePageGuard>,
    visited: Vec<PageId>,
}

impl Context {
    fn new() -> Self {
        Self {
            root_page_id: INVALID_PAGE_ID,
            header: None,
            write_set: VecDeque::new(),
            visited: Vec::new(),
        }
    }

    fn release_ancestors(&mut self) {
        self.header.take();
        self.write_set.clear();
    }

    fn parent_of(&self, page_id: PageId) -> Option<PageId> {
        let pos = self.visited.iter().position(|&p| p == page_id)?;
        if pos == 0 {
            None
        } else {
            Some(self.visited[pos - 1])
        }
    }
}

/// Concurrent B+Tree index over fixed-width keys.
///
/// One header page per tree persists the root's id. Readers descend with
/// shared latches, acquiring the child's before releasing the parent's.
/// Writers descend with exclusive latches and keep every ancestor latched
/// until the current child is safe - it will neither split on insert nor
/// underflow on delete - at which point all ancestor latches are released
/// at once.
pub struct BPlusTree<const N: usize, C: KeyComparator> {
    bpm: Arc<BufferPoolManager>,
    comparator: C,
    header_page_id: PageId,
    leaf_max_size: usize,
    internal_max_size: usize,
}

impl<const N: usize, C: KeyComparator> BPlusTree<N, C> {
    /// Creates an empty tree, allocating its header page.
    pub fn new(
        bpm: Arc<BufferPoolManager>,
        comparator: C,
        leaf_max_size: usize,
        internal_max_size: usize,
    ) -> Result<Self> {
        Self::check_sizes(leaf_max_size, internal_max_size);

        let mut header_guard = bpm.new_page_write()?;
        let header_page_id = header_guard.page_id();
        HeaderNode::new(header_guard.data_mut()).set_root_page_id(INVALID_PAGE_ID);
        drop(header_guard);

        Ok(Self {
            bpm,
            comparator,
            header_page_id,
            leaf_max_size,
            internal_max_size,
        })
    }

    /// Re-attaches to a tree whose header page already exists.
    pub fn open(
        header_page_id: PageId,
        bpm: Arc<BufferPoolManager>,
        comparator: C,
        leaf_max_size: usize,
        internal_max_size: usize,
    ) -> Self {
        Self::check_sizes(leaf_max_size, internal_max_size);
        Self {
            bpm,
            comparator,
            header_page_id,
            leaf_max_size,
            internal_max_size,
        }
    }

    fn check_sizes(leaf_max_size: usize, internal_max_size: usize) {
        assert!(
            leaf_max_size >= 2 && leaf_max_size + 1 <= leaf_capacity::<N>(),
            "leaf max size out of range"
        );
        assert!(
            internal_max_size >= 3 && internal_max_size + 1 <= internal_capacity::<N>(),
            "internal max size out of range"
        );
    }

    pub fn header_page_id(&self) -> PageId {
        self.header_page_id
    }

    /// Page id of the current root, INVALID_PAGE_ID for an empty tree.
    pub fn root_page_id(&self) -> Result<PageId> {
        let header = self.bpm.fetch_page_read(self.header_page_id)?;
        Ok(HeaderNodeRef::new(header.data()).root_page_id())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.root_page_id()? == INVALID_PAGE_ID)
    }

    /// Point lookup. Appends the matching record id and returns true when
    /// the key is present.
    pub fn get_value(&self, key: &FixedKey<N>, result: &mut Vec<RecordId>) -> Result<bool> {
        // The header's shared latch is held for the whole descent so a
        // writer cannot publish a new root underneath this reader.
        let header = self.bpm.fetch_page_read(self.header_page_id)?;
        let root_id = HeaderNodeRef::new(header.data()).root_page_id();
        if root_id == INVALID_PAGE_ID {
            return Ok(false);
        }

        let mut current = self.bpm.fetch_page_read(root_id)?;
        loop {
            match page_kind(current.data()) {
                PageKind::Leaf => {
                    let leaf = LeafNodeRef::<N>::new(current.data());
                    return Ok(
                        match leaf.find_exact(key.as_bytes(), &self.comparator) {
                            Some(index) => {
                                result.push(leaf.record_at(index));
                                true
                            }
                            None => false,
                        },
                    );
                }
                PageKind::Internal => {
                    let child_id = InternalNodeRef::<N>::new(current.data())
                        .child_for(key.as_bytes(), &self.comparator);
                    // Assignment latches the child before the parent guard
                    // is dropped.
                    current = self.bpm.fetch_page_read(child_id)?;
                }
                PageKind::Invalid => return Err(corrupted(current.page_id())),
            }
        }
    }

    /// Unique-key insert. Returns false iff the key already exists.
    pub fn insert(&self, key: &FixedKey<N>, record: RecordId) -> Result<bool> {
        let mut ctx = Context::new();
        let mut leaf_guard = self.insert_descend(key, &mut ctx)?;
        let leaf_id = leaf_guard.page_id();

        let (exists, has_room) = {
            let leaf = LeafNodeRef::<N>::new(leaf_guard.data());
            (
                leaf.find_exact(key.as_bytes(), &self.comparator).is_some(),
                leaf.size() < leaf.max_size(),
            )
        };
        if exists {
            return Ok(false);
        }
        if has_room {
            LeafNode::<N>::new(leaf_guard.data_mut()).insert(
                key.as_bytes(),
                record,
                &self.comparator,
            );
            return Ok(true);
        }

        // Full leaf: insert into the reserved spare cell, split the upper
        // half into a new right sibling, and promote its first key.
        let mut right_guard = self.bpm.new_page_write()?;
        let right_id = right_guard.page_id();
        let separator = {
            let mut left = LeafNode::<N>::new(leaf_guard.data_mut());
            let mut right = LeafNode::<N>::new(right_guard.data_mut());
            right.init(self.leaf_max_size);
            left.insert(key.as_bytes(), record, &self.comparator);
            left.move_half_to(&mut right);
            right.set_next_page_id(left.next_page_id());
            left.set_next_page_id(right_id);
            FixedKey::<N>::from_slice(right.key_at(0))
        };

        self.insert_in_parent(leaf_id, &separator, right_id, &mut ctx)?;
        Ok(true)
    }

    /// Removes a key. Removing an absent key is a no-op.
    pub fn remove(&self, key: &FixedKey<N>) -> Result<()> {
        let mut ctx = Context::new();
        let Some(leaf_guard) = self.delete_descend(key, &mut ctx)? else {
            return Ok(());
        };
        self.remove_entry(leaf_guard, key, &mut ctx)
    }

    /// Iterator positioned at the first entry of the leftmost leaf.
    pub fn begin(&self) -> Result<BTreeIterator<N>> {
        let root_id = self.root_page_id()?;
        if root_id == INVALID_PAGE_ID {
            return Ok(self.end());
        }

        let mut current = self.bpm.fetch_page_basic(root_id)?;
        loop {
            let next = {
                let data = current.data();
                match page_kind(&data[..]) {
                    PageKind::Leaf => None,
                    PageKind::Internal => Some(InternalNodeRef::<N>::new(&data[..]).child_at(0)),
                    PageKind::Invalid => return Err(corrupted(current.page_id())),
                }
            };
            match next {
                None => return Ok(BTreeIterator::new(Arc::clone(&self.bpm), current, 0)),
                Some(child_id) => current = self.bpm.fetch_page_basic(child_id)?,
            }
        }
    }

    /// Iterator positioned at exactly `key`; the end iterator when the key
    /// is absent.
    pub fn begin_at(&self, key: &FixedKey<N>) -> Result<BTreeIterator<N>> {
        let header = self.bpm.fetch_page_read(self.header_page_id)?;
        let root_id = HeaderNodeRef::new(header.data()).root_page_id();
        if root_id == INVALID_PAGE_ID {
            return Ok(self.end());
        }

        let mut current = self.bpm.fetch_page_read(root_id)?;
        loop {
            match page_kind(current.data()) {
                PageKind::Leaf => {
                    let found = {
                        let leaf = LeafNodeRef::<N>::new(current.data());
                        leaf.find_exact(key.as_bytes(), &self.comparator)
                    };
                    let Some(index) = found else {
                        return Ok(self.end());
                    };
                    let leaf_id = current.page_id();
                    drop(current);
                    let guard = self.bpm.fetch_page_basic(leaf_id)?;
                    return Ok(BTreeIterator::new(Arc::clone(&self.bpm), guard, index));
                }
                PageKind::Internal => {
                    let child_id = InternalNodeRef::<N>::new(current.data())
                        .child_for(key.as_bytes(), &self.comparator);
                    current = self.bpm.fetch_page_read(child_id)?;
                }
                PageKind::Invalid => return Err(corrupted(current.page_id())),
            }
        }
    }

    /// The end sentinel.
    pub fn end(&self) -> BTreeIterator<N> {
        BTreeIterator::end(Arc::clone(&self.bpm))
    }

    fn insert_safe(&self, data: &[u8]) -> bool {
        match page_kind(data) {
            PageKind::Leaf => {
                let leaf = LeafNodeRef::<N>::new(data);
                leaf.size() < leaf.max_size()
            }
            PageKind::Internal => {
                let node = InternalNodeRef::<N>::new(data);
                node.size() < node.max_size()
            }
            PageKind::Invalid => false,
        }
    }

    fn delete_safe(&self, data: &[u8]) -> bool {
        match page_kind(data) {
            PageKind::Leaf => {
                let leaf = LeafNodeRef::<N>::new(data);
                leaf.size() > leaf.min_size()
            }
            PageKind::Internal => {
                let node = InternalNodeRef::<N>::new(data);
                node.size() > node.min_size()
            }
            PageKind::Invalid => false,
        }
    }

    /// Write-latching descent for insert. Returns the leaf's guard; the
    /// retained ancestors stay in the context.
    fn insert_descend(&self, key: &FixedKey<N>, ctx: &mut Context) -> Result<WritePageGuard> {
        let mut header = self.bpm.fetch_page_write(self.header_page_id)?;
        let root_id = HeaderNodeRef::new(header.data()).root_page_id();

        if root_id == INVALID_PAGE_ID {
            // Empty tree: the first leaf becomes the root.
            let mut root_guard = self.bpm.new_page_write()?;
            let root_id = root_guard.page_id();
            LeafNode::<N>::new(root_guard.data_mut()).init(self.leaf_max_size);
            HeaderNode::new(header.data_mut()).set_root_page_id(root_id);
            ctx.root_page_id = root_id;
            ctx.header = Some(header);
            ctx.visited.push(root_id);
            return Ok(root_guard);
        }

        ctx.root_page_id = root_id;
        ctx.header = Some(header);
        ctx.visited.push(root_id);

        let mut current = self.bpm.fetch_page_write(root_id)?;
        loop {
            let child_id = match page_kind(current.data()) {
                PageKind::Leaf => return Ok(current),
                PageKind::Internal => InternalNodeRef::<N>::new(current.data())
                    .child_for(key.as_bytes(), &self.comparator),
                PageKind::Invalid => return Err(corrupted(current.page_id())),
            };

            let child = self.bpm.fetch_page_write(child_id)?;
            ctx.write_set.push_back(current);
            if self.insert_safe(child.data()) {
                ctx.release_ancestors();
            }
            ctx.visited.push(child_id);
            current = child;
        }
    }

    /// Write-latching descent for delete. None when the tree is empty.
    fn delete_descend(
        &self,
        key: &FixedKey<N>,
        ctx: &mut Context,
    ) -> Result<Option<WritePageGuard>> {
        let header = self.bpm.fetch_page_write(self.header_page_id)?;
        let root_id = HeaderNodeRef::new(header.data()).root_page_id();
        if root_id == INVALID_PAGE_ID {
            return Ok(None);
        }

        ctx.root_page_id = root_id;
        ctx.header = Some(header);
        ctx.visited.push(root_id);

        let mut current = self.bpm.fetch_page_write(root_id)?;
        loop {
            let child_id = match page_kind(current.data()) {
                PageKind::Leaf => return Ok(Some(current)),
                PageKind::Internal => InternalNodeRef::<N>::new(current.data())
                    .child_for(key.as_bytes(), &self.comparator),
                PageKind::Invalid => return Err(corrupted(current.page_id())),
            };

            let child = self.bpm.fetch_page_write(child_id)?;
            ctx.write_set.push_back(current);
            if self.delete_safe(child.data()) {
                ctx.release_ancestors();
            }
            ctx.visited.push(child_id);
            current = child;
        }
    }

    /// Publishes a new root id through the header guard held in the
    /// context.
    fn set_root(&self, ctx: &mut Context, root_id: PageId) -> Result<()> {
        let header = ctx.header.as_mut().ok_or_else(|| {
            BrambleError::IndexCorrupted("header latch not held for root update".to_string())
        })?;
        HeaderNode::new(header.data_mut()).set_root_page_id(root_id);
        ctx.root_page_id = root_id;
        Ok(())
    }

    /// Links a freshly split-off right node into the parent, growing a new
    /// root when the split reached the top.
    fn insert_in_parent(
        &self,
        left_id: PageId,
        separator: &FixedKey<N>,
        right_id: PageId,
        ctx: &mut Context,
    ) -> Result<()> {
        if left_id == ctx.root_page_id {
            let mut root_guard = self.bpm.new_page_write()?;
            let new_root_id = root_guard.page_id();
            {
                let mut root = InternalNode::<N>::new(root_guard.data_mut());
                root.init(self.internal_max_size);
                root.insert_first_of(left_id);
                root.insert(separator.as_bytes(), right_id, &self.comparator);
            }
            self.set_root(ctx, new_root_id)?;
            return Ok(());
        }

        let parent_id = ctx
            .parent_of(left_id)
            .ok_or_else(|| corrupted(left_id))?;
        let mut parent_guard = ctx.write_set.pop_back().ok_or_else(|| {
            BrambleError::IndexCorrupted("ancestor latch missing during split".to_string())
        })?;
        debug_assert_eq!(parent_guard.page_id(), parent_id);

        let has_room = {
            let parent = InternalNodeRef::<N>::new(parent_guard.data());
            parent.size() < parent.max_size()
        };
        if has_room {
            InternalNode::<N>::new(parent_guard.data_mut()).insert(
                separator.as_bytes(),
                right_id,
                &self.comparator,
            );
            return Ok(());
        }

        // Full parent: same spare-cell split as at the leaf level. The
        // promoted key is assembled from the new node's slot-0 cell, whose
        // key then reverts to the sentinel.
        let mut new_guard = self.bpm.new_page_write()?;
        let new_id = new_guard.page_id();
        let promoted = {
            let mut left = InternalNode::<N>::new(parent_guard.data_mut());
            let mut right = InternalNode::<N>::new(new_guard.data_mut());
            right.init(self.internal_max_size);
            left.insert(separator.as_bytes(), right_id, &self.comparator);
            left.move_half_to(&mut right);
            let promoted = FixedKey::<N>::from_slice(right.key_at(0));
            right.set_key_at(0, FixedKey::<N>::zeroed().as_bytes());
            promoted
        };

        self.insert_in_parent(parent_id, &promoted, new_id, ctx)
    }

    /// Removes `key` from the node behind `guard`, then restores the tree
    /// invariants: root maintenance, or merge/redistribute on underflow.
    fn remove_entry(
        &self,
        mut guard: WritePageGuard,
        key: &FixedKey<N>,
        ctx: &mut Context,
    ) -> Result<()> {
        let page_id = guard.page_id();
        let kind = page_kind(guard.data());

        let removed = match kind {
            PageKind::Leaf => LeafNode::<N>::new(guard.data_mut())
                .remove_key(key.as_bytes(), &self.comparator),
            PageKind::Internal => InternalNode::<N>::new(guard.data_mut())
                .remove_key(key.as_bytes(), &self.comparator),
            PageKind::Invalid => return Err(corrupted(page_id)),
        };
        if !removed {
            return Ok(());
        }

        let (size, min_size) = match kind {
            PageKind::Leaf => {
                let leaf = LeafNodeRef::<N>::new(guard.data());
                (leaf.size(), leaf.min_size())
            }
            _ => {
                let node = InternalNodeRef::<N>::new(guard.data());
                (node.size(), node.min_size())
            }
        };

        if page_id == ctx.root_page_id {
            if kind == PageKind::Leaf && size == 0 {
                // The last entry is gone; the tree is empty again.
                self.set_root(ctx, INVALID_PAGE_ID)?;
                drop(guard);
                self.bpm.delete_page(page_id)?;
            } else if kind == PageKind::Internal && size == 1 {
                // A single-child root is collapsed onto that child.
                let child_id = InternalNodeRef::<N>::new(guard.data()).child_at(0);
                self.set_root(ctx, child_id)?;
                drop(guard);
                self.bpm.delete_page(page_id)?;
            }
            return Ok(());
        }

        if size >= min_size {
            return Ok(());
        }

        self.repair_underflow(guard, page_id, kind, ctx)
    }

    /// Repairs an underfull non-root node by borrowing from or merging with
    /// a sibling. The sibling latch is taken after the parent's and dropped
    /// before it.
    fn repair_underflow(
        &self,
        mut guard: WritePageGuard,
        page_id: PageId,
        kind: PageKind,
        ctx: &mut Context,
    ) -> Result<()> {
        let _ = ctx.parent_of(page_id).ok_or_else(|| corrupted(page_id))?;
        let mut parent_guard = ctx.write_set.pop_back().ok_or_else(|| {
            BrambleError::IndexCorrupted("ancestor latch missing during repair".to_string())
        })?;

        let (slot, parent_size) = {
            let parent = InternalNodeRef::<N>::new(parent_guard.data());
            let slot = parent
                .child_index_of(page_id)
                .ok_or_else(|| corrupted(parent_guard.page_id()))?;
            (slot, parent.size())
        };

        // Prefer the left sibling except at the leftmost edge of the
        // parent.
        let use_left = slot > 1 || slot == parent_size - 1;
        let (sibling_slot, separator_slot) = if use_left {
            (slot - 1, slot)
        } else {
            (slot + 1, slot + 1)
        };

        let (sibling_id, separator) = {
            let parent = InternalNodeRef::<N>::new(parent_guard.data());
            (
                parent.child_at(sibling_slot),
                FixedKey::<N>::from_slice(parent.key_at(separator_slot)),
            )
        };

        let mut sibling_guard = self.bpm.fetch_page_write(sibling_id)?;

        let sibling_can_lend = match kind {
            PageKind::Leaf => {
                let sibling = LeafNodeRef::<N>::new(sibling_guard.data());
                sibling.size() > sibling.min_size()
            }
            _ => {
                let sibling = InternalNodeRef::<N>::new(sibling_guard.data());
                sibling.size() > sibling.min_size()
            }
        };

        if !sibling_can_lend {
            // Merge: orient the pair left/right, fold the right node into
            // the left, then remove the separator from the parent.
            let (mut left_guard, mut right_guard) = if use_left {
                (sibling_guard, guard)
            } else {
                (guard, sibling_guard)
            };
            let right_id = right_guard.page_id();

            match kind {
                PageKind::Leaf => {
                    let mut left = LeafNode::<N>::new(left_guard.data_mut());
                    let mut right = LeafNode::<N>::new(right_guard.data_mut());
                    right.move_all_to(&mut left);
                    left.set_next_page_id(right.next_page_id());
                }
                _ => {
                    let mut left = InternalNode::<N>::new(left_guard.data_mut());
                    let mut right = InternalNode::<N>::new(right_guard.data_mut());
                    right.merge_into(&mut left, separator.as_bytes());
                }
            }

            drop(right_guard);
            drop(left_guard);
            // The emptied page is unreachable: its parent entry goes away
            // under the parent latch held through the recursion below.
            self.bpm.delete_page(right_id)?;
            return self.remove_entry(parent_guard, &separator, ctx);
        }

        // Redistribute: one entry moves from the lending sibling and the
        // parent's separator is updated to the new boundary.
        let new_separator = match kind {
            PageKind::Leaf => {
                let mut node = LeafNode::<N>::new(guard.data_mut());
                let mut sibling = LeafNode::<N>::new(sibling_guard.data_mut());
                if use_left {
                    sibling.move_last_to_front_of(&mut node);
                    FixedKey::<N>::from_slice(node.key_at(0))
                } else {
                    sibling.move_first_to_end_of(&mut node);
                    FixedKey::<N>::from_slice(sibling.key_at(0))
                }
            }
            _ => {
                let mut node = InternalNode::<N>::new(guard.data_mut());
                let mut sibling = InternalNode::<N>::new(sibling_guard.data_mut());
                if use_left {
                    // The sibling's last child moves over; the old
                    // separator rotates down above the node's former
                    // slot-0 child.
                    let last = sibling.size() - 1;
                    let lend_key = FixedKey::<N>::from_slice(sibling.key_at(last));
                    let lend_child = sibling.child_at(last);
                    sibling.erase_at(last);
                    node.insert_first_of(lend_child);
                    node.set_key_at(1, separator.as_bytes());
                    lend_key
                } else {
                    // The sibling's slot-0 child moves over under the old
                    // separator; the sibling's first real key is lifted.
                    let lend_child = sibling.child_at(0);
                    let lifted = FixedKey::<N>::from_slice(sibling.key_at(1));
                    node.append(separator.as_bytes(), lend_child);
                    sibling.erase_at(0);
                    sibling.set_key_at(0, FixedKey::<N>::zeroed().as_bytes());
                    lifted
                }
            }
        };
        InternalNode::<N>::new(parent_guard.data_mut())
            .set_key_at(separator_slot, new_separator.as_bytes());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SlotId;
    use crate::index::key_comparator::BytewiseComparator;
    use crate::storage::disk::DiskManager;
    use tempfile::NamedTempFile;

    fn create_tree(
        pool_size: usize,
        leaf_max: usize,
        internal_max: usize,
    ) -> (BPlusTree<8, BytewiseComparator>, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let dm = Arc::new(DiskManager::new(temp_file.path()).unwrap());
        let bpm = Arc::new(BufferPoolManager::new(pool_size, 2, dm));
        let tree = BPlusTree::new(bpm, BytewiseComparator, leaf_max, internal_max).unwrap();
        (tree, temp_file)
    }

    fn key(v: u64) -> FixedKey<8> {
        FixedKey::from_u64(v)
    }

    fn rid(v: u64) -> RecordId {
        RecordId::new(PageId::new(v as u32), SlotId::new((v % 7) as u16))
    }

    #[test]
    fn test_insert_and_get() {
        let (tree, _temp) = create_tree(16, 4, 4);

        assert!(tree.is_empty().unwrap());
        assert!(tree.insert(&key(10), rid(10)).unwrap());
        assert!(tree.insert(&key(20), rid(20)).unwrap());
        assert!(!tree.is_empty().unwrap());

        let mut result = Vec::new();
        assert!(tree.get_value(&key(10), &mut result).unwrap());
        assert_eq!(result, vec![rid(10)]);

        result.clear();
        assert!(!tree.get_value(&key(15), &mut result).unwrap());
        assert!(result.is_empty());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let (tree, _temp) = create_tree(16, 4, 4);

        assert!(tree.insert(&key(1), rid(1)).unwrap());
        assert!(!tree.insert(&key(1), rid(99)).unwrap());

        let mut result = Vec::new();
        assert!(tree.get_value(&key(1), &mut result).unwrap());
        assert_eq!(result, vec![rid(1)]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (tree, _temp) = create_tree(16, 4, 4);

        tree.remove(&key(5)).unwrap();
        assert!(tree.is_empty().unwrap());

        tree.insert(&key(5), rid(5)).unwrap();
        tree.remove(&key(6)).unwrap();

        let mut result = Vec::new();
        assert!(tree.get_value(&key(5), &mut result).unwrap());
    }
}
