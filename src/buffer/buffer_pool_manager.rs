use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::{
    AccessType, BrambleError, FrameId, PageId, Result, INVALID_PAGE_ID, PAGE_SIZE,
};
use crate::storage::disk::{DiskManager, DiskScheduler};

use super::{BasicPageGuard, FrameHeader, LruKReplacer, ReadPageGuard, WritePageGuard};

/// Bookkeeping protected by the pool's single mutex.
struct PoolInner {
    /// Maps resident page IDs to the frames that hold them
    page_table: HashMap<PageId, FrameId>,
    /// Frames with no resident page, popped LIFO
    free_list: Vec<FrameId>,
    /// Monotonic page id allocator
    next_page_id: u32,
}

/// State shared between the pool and the guards it hands out.
pub(crate) struct PoolShared {
    frames: Vec<Arc<FrameHeader>>,
    inner: Mutex<PoolInner>,
    replacer: LruKReplacer,
}

impl PoolShared {
    /// Decrements a page's pin count, OR-merging the dirty flag. When the
    /// count reaches zero the frame becomes evictable. Returns false iff the
    /// page is not resident or its pin count was already zero.
    pub(crate) fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let inner = self.inner.lock();
        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return false;
        };

        let frame = &self.frames[frame_id.as_usize()];
        if is_dirty {
            frame.set_dirty(true);
        }
        match frame.unpin() {
            None => false,
            Some(0) => {
                self.replacer.set_evictable(frame_id, true);
                true
            }
            Some(_) => true,
        }
    }
}

/// BufferPoolManager maps logical page ids onto a fixed set of in-memory
/// frames, fetching from and flushing to disk as needed. Eviction decisions
/// are delegated to the LRU-K replacer; page contents are only ever handed
/// out through pin-holding guards.
///
/// All public methods serialize their bookkeeping on one internal mutex,
/// which is also held across the disk I/O issued on the miss and eviction
/// paths. That mutex does not protect page contents; those are guarded by
/// each frame's own latch via the page guards.
pub struct BufferPoolManager {
    /// Number of frames in the buffer pool
    pool_size: usize,
    /// Shared state, also referenced by outstanding guards
    shared: Arc<PoolShared>,
    /// Synchronous I/O front-end over the disk manager
    disk_scheduler: DiskScheduler,
}

impl BufferPoolManager {
    /// Creates a new BufferPoolManager with the given pool size, LRU-K `k`
    /// parameter, and disk manager.
    pub fn new(pool_size: usize, k: usize, disk_manager: Arc<DiskManager>) -> Self {
        let mut frames = Vec::with_capacity(pool_size);
        let mut free_list = Vec::with_capacity(pool_size);

        for i in (0..pool_size).rev() {
            free_list.push(FrameId::new(i as u32));
        }
        for i in 0..pool_size {
            frames.push(Arc::new(FrameHeader::new(FrameId::new(i as u32))));
        }

        let shared = Arc::new(PoolShared {
            frames,
            inner: Mutex::new(PoolInner {
                page_table: HashMap::new(),
                free_list,
                next_page_id: 0,
            }),
            replacer: LruKReplacer::new(k, pool_size),
        });

        Self {
            pool_size,
            shared,
            disk_scheduler: DiskScheduler::new(disk_manager),
        }
    }

    /// Allocates a new page id, installs it in a frame, and pins it once.
    /// The caller owns that pin and must release it with `unpin_page` (or
    /// use `new_page_guarded`). Fails with `PoolExhausted` when every frame
    /// is pinned and nothing can be evicted.
    pub fn new_page(&self) -> Result<PageId> {
        Ok(self.allocate_page()?.0)
    }

    /// Like `new_page`, but wraps the initial pin in a basic guard.
    pub fn new_page_guarded(&self) -> Result<BasicPageGuard> {
        let (page_id, frame) = self.allocate_page()?;
        Ok(BasicPageGuard::new(
            page_id,
            frame,
            Arc::clone(&self.shared),
        ))
    }

    /// Like `new_page`, but returns the page already write-latched.
    pub fn new_page_write(&self) -> Result<WritePageGuard> {
        Ok(self.new_page_guarded()?.upgrade_write())
    }

    /// Fetches a page and wraps the pin in a basic guard (no latch).
    pub fn fetch_page_basic(&self, page_id: PageId) -> Result<BasicPageGuard> {
        let frame = self.pin_page(page_id, AccessType::Unknown)?;
        Ok(BasicPageGuard::new(
            page_id,
            frame,
            Arc::clone(&self.shared),
        ))
    }

    /// Fetches a page for shared read access. Blocks until the page's latch
    /// can be acquired in shared mode.
    pub fn fetch_page_read(&self, page_id: PageId) -> Result<ReadPageGuard> {
        Ok(self.fetch_page_basic(page_id)?.upgrade_read())
    }

    /// Fetches a page for exclusive write access. Blocks until the page's
    /// latch can be acquired exclusively.
    pub fn fetch_page_write(&self, page_id: PageId) -> Result<WritePageGuard> {
        Ok(self.fetch_page_basic(page_id)?.upgrade_write())
    }

    /// Decrements the pin count of a resident page; see
    /// `PoolShared::unpin_page`.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        self.shared.unpin_page(page_id, is_dirty)
    }

    /// Writes a resident page through to disk and clears its dirty flag.
    /// Pin state is untouched. Returns Ok(false) iff the page is not
    /// resident.
    pub fn flush_page(&self, page_id: PageId) -> Result<bool> {
        if page_id == INVALID_PAGE_ID {
            return Err(BrambleError::InvalidPageId(page_id));
        }

        let inner = self.shared.inner.lock();
        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return Ok(false);
        };

        let frame = &self.shared.frames[frame_id.as_usize()];
        let mut data = [0u8; PAGE_SIZE];
        frame.copy_to(&mut data);
        self.disk_scheduler.schedule_write_sync(page_id, &data)?;
        frame.set_dirty(false);
        Ok(true)
    }

    /// Flushes every resident dirty page.
    pub fn flush_all_pages(&self) -> Result<()> {
        let inner = self.shared.inner.lock();

        for (&page_id, &frame_id) in inner.page_table.iter() {
            let frame = &self.shared.frames[frame_id.as_usize()];
            if frame.is_dirty() {
                let mut data = [0u8; PAGE_SIZE];
                frame.copy_to(&mut data);
                self.disk_scheduler.schedule_write_sync(page_id, &data)?;
                frame.set_dirty(false);
            }
        }

        Ok(())
    }

    /// Removes a page from the pool and tells the disk layer its id is
    /// free. Returns Ok(true) if the page was deleted or was not resident,
    /// Ok(false) if it is pinned.
    pub fn delete_page(&self, page_id: PageId) -> Result<bool> {
        let mut inner = self.shared.inner.lock();
        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return Ok(true);
        };

        let frame = &self.shared.frames[frame_id.as_usize()];
        if frame.pin_count() > 0 {
            return Ok(false);
        }

        if frame.is_dirty() {
            let mut data = [0u8; PAGE_SIZE];
            frame.copy_to(&mut data);
            self.disk_scheduler.schedule_write_sync(page_id, &data)?;
        }

        inner.page_table.remove(&page_id);
        self.shared.replacer.remove(frame_id);
        frame.reset();
        inner.free_list.push(frame_id);

        self.disk_scheduler
            .disk_manager()
            .deallocate_page(page_id)?;
        Ok(true)
    }

    /// Returns the pin count of a resident page, None otherwise.
    pub fn get_pin_count(&self, page_id: PageId) -> Option<u32> {
        let inner = self.shared.inner.lock();
        inner
            .page_table
            .get(&page_id)
            .map(|&frame_id| self.shared.frames[frame_id.as_usize()].pin_count())
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn free_frame_count(&self) -> usize {
        self.shared.inner.lock().free_list.len()
    }

    /// Allocates a new page id and installs it, pinned once, in a frame.
    fn allocate_page(&self) -> Result<(PageId, Arc<FrameHeader>)> {
        let mut inner = self.shared.inner.lock();
        let frame_id = self.acquire_frame(&mut inner)?;

        let page_id = PageId::new(inner.next_page_id);
        inner.next_page_id += 1;

        let frame = &self.shared.frames[frame_id.as_usize()];
        frame.set_page_id(page_id);
        frame.pin();

        inner.page_table.insert(page_id, frame_id);
        self.shared
            .replacer
            .record_access(frame_id, AccessType::Unknown)?;
        self.shared.replacer.set_evictable(frame_id, false);

        Ok((page_id, Arc::clone(frame)))
    }

    /// Pins a page, reading it from disk on a miss. The pin increment and
    /// the evictability change happen under the same mutex hold as the page
    /// table lookup.
    fn pin_page(&self, page_id: PageId, access_type: AccessType) -> Result<Arc<FrameHeader>> {
        if page_id == INVALID_PAGE_ID {
            return Err(BrambleError::InvalidPageId(page_id));
        }

        let mut inner = self.shared.inner.lock();

        if let Some(&frame_id) = inner.page_table.get(&page_id) {
            let frame = &self.shared.frames[frame_id.as_usize()];
            frame.pin();
            self.shared.replacer.record_access(frame_id, access_type)?;
            self.shared.replacer.set_evictable(frame_id, false);
            return Ok(Arc::clone(frame));
        }

        let frame_id = self.acquire_frame(&mut inner)?;
        let frame = &self.shared.frames[frame_id.as_usize()];

        let data = self.disk_scheduler.schedule_read_sync(page_id)?;
        frame.set_page_id(page_id);
        frame.copy_from(&data[..]);
        frame.set_dirty(false);
        frame.pin();

        inner.page_table.insert(page_id, frame_id);
        self.shared.replacer.record_access(frame_id, access_type)?;
        self.shared.replacer.set_evictable(frame_id, false);

        Ok(Arc::clone(frame))
    }

    /// Finds a usable frame: free list first, otherwise evict a victim,
    /// writing it back if dirty. The returned frame is non-resident and
    /// zeroed.
    fn acquire_frame(&self, inner: &mut PoolInner) -> Result<FrameId> {
        if let Some(frame_id) = inner.free_list.pop() {
            return Ok(frame_id);
        }

        let frame_id = self
            .shared
            .replacer
            .evict()
            .ok_or(BrambleError::PoolExhausted)?;

        let frame = &self.shared.frames[frame_id.as_usize()];
        let old_page_id = frame.page_id();

        if frame.is_dirty() {
            let mut data = [0u8; PAGE_SIZE];
            frame.copy_to(&mut data);
            self.disk_scheduler.schedule_write_sync(old_page_id, &data)?;
        }

        inner.page_table.remove(&old_page_id);
        frame.reset();
        Ok(frame_id)
    }
}
