use std::sync::Arc;

use crate::buffer::{BasicPageGuard, BufferPoolManager};
use crate::common::{PageId, RecordId, Result, INVALID_PAGE_ID};

use super::btree_page::LeafNodeRef;
use super::key::FixedKey;

/// Forward, read-only, non-restartable iterator over the leaf chain.
///
/// Holds a basic guard (a pin, no latch) on the current leaf and a slot
/// index. Stepping past the last slot follows the leaf's forward pointer,
/// dropping the old guard only after the next one is acquired fails-free.
/// Two iterators are equal iff they reference the same (page, slot) or
/// both are at the end.
pub struct BTreeIterator<const N: usize> {
    bpm: Arc<BufferPoolManager>,
    guard: Option<BasicPageGuard>,
    page_id: PageId,
    index: usize,
}

impl<const N: usize> BTreeIterator<N> {
    pub(crate) fn new(bpm: Arc<BufferPoolManager>, guard: BasicPageGuard, index: usize) -> Self {
        let page_id = guard.page_id();
        Self {
            bpm,
            guard: Some(guard),
            page_id,
            index,
        }
    }

    /// The end sentinel.
    pub(crate) fn end(bpm: Arc<BufferPoolManager>) -> Self {
        Self {
            bpm,
            guard: None,
            page_id: INVALID_PAGE_ID,
            index: 0,
        }
    }

    pub fn is_end(&self) -> bool {
        self.guard.is_none()
    }

    fn step(&mut self) -> Result<Option<(FixedKey<N>, RecordId)>> {
        loop {
            let Some(guard) = self.guard.as_ref() else {
                return Ok(None);
            };

            let (entry, next_id) = {
                let data = guard.data();
                let leaf = LeafNodeRef::<N>::new(&data[..]);
                if self.index < leaf.size() {
                    let key = FixedKey::<N>::from_slice(leaf.key_at(self.index));
                    let record = leaf.record_at(self.index);
                    (Some((key, record)), INVALID_PAGE_ID)
                } else {
                    (None, leaf.next_page_id())
                }
            };

            if let Some(entry) = entry {
                self.index += 1;
                return Ok(Some(entry));
            }

            self.guard.take();
            if next_id == INVALID_PAGE_ID {
                self.page_id = INVALID_PAGE_ID;
                self.index = 0;
                return Ok(None);
            }

            self.guard = Some(self.bpm.fetch_page_basic(next_id)?);
            self.page_id = next_id;
            self.index = 0;
        }
    }
}

impl<const N: usize> Iterator for BTreeIterator<N> {
    type Item = Result<(FixedKey<N>, RecordId)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => None,
            Err(e) => {
                self.guard.take();
                self.page_id = INVALID_PAGE_ID;
                Some(Err(e))
            }
        }
    }
}

impl<const N: usize> PartialEq for BTreeIterator<N> {
    fn eq(&self, other: &Self) -> bool {
        (self.is_end() && other.is_end())
            || (self.page_id == other.page_id && self.index == other.index)
    }
}
