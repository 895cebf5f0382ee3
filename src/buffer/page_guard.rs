use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::common::{PageId, INVALID_PAGE_ID, PAGE_SIZE};

use super::buffer_pool_manager::PoolShared;
use super::FrameHeader;

/// Everything a guard owns: the pin on the frame plus the pending dirty
/// flag reported back to the pool when the pin is released.
struct GuardInner {
    page_id: PageId,
    frame: Arc<FrameHeader>,
    pool: Arc<PoolShared>,
    is_dirty: bool,
}

impl GuardInner {
    fn release(self) {
        self.pool.unpin_page(self.page_id, self.is_dirty);
    }
}

/// RAII guard owning one pin on a page, without a latch.
///
/// The pin is released exactly once, on drop. Guards are movable but not
/// copyable; converting to a latched guard consumes the basic guard and
/// leaves no release behind.
pub struct BasicPageGuard {
    inner: Option<GuardInner>,
}

impl BasicPageGuard {
    pub(super) fn new(page_id: PageId, frame: Arc<FrameHeader>, pool: Arc<PoolShared>) -> Self {
        Self {
            inner: Some(GuardInner {
                page_id,
                frame,
                pool,
                is_dirty: false,
            }),
        }
    }

    pub fn page_id(&self) -> PageId {
        self.inner
            .as_ref()
            .map_or(INVALID_PAGE_ID, |inner| inner.page_id)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// Read access to the page image under a briefly held shared latch.
    /// Panics on an empty guard.
    pub fn data(&self) -> RwLockReadGuard<'_, Box<[u8; PAGE_SIZE]>> {
        self.inner
            .as_ref()
            .expect("empty page guard")
            .frame
            .latch()
            .read()
    }

    /// Drops this guard, releasing the pin.
    pub fn drop_guard(self) {
        drop(self);
    }

    /// Acquires the shared latch, converting into a read guard.
    /// Only the buffer pool's factories perform this conversion.
    pub(super) fn upgrade_read(mut self) -> ReadPageGuard {
        let inner = self.inner.take().expect("empty page guard");
        ReadPageGuard::new(inner)
    }

    /// Acquires the exclusive latch, converting into a write guard.
    /// Only the buffer pool's factories perform this conversion.
    pub(super) fn upgrade_write(mut self) -> WritePageGuard {
        let inner = self.inner.take().expect("empty page guard");
        WritePageGuard::new(inner)
    }
}

impl Drop for BasicPageGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            inner.release();
        }
    }
}

/// RAII guard owning one pin plus the page's shared latch.
/// On drop the latch is released first, then the pin.
pub struct ReadPageGuard {
    inner: Option<GuardInner>,
    /// Shared latch on the page data. The 'static lifetime is a lie the
    /// guard maintains: `inner` keeps the frame alive for at least as long
    /// as this latch guard exists, and the latch is dropped first.
    latch: Option<RwLockReadGuard<'static, Box<[u8; PAGE_SIZE]>>>,
}

impl ReadPageGuard {
    fn new(inner: GuardInner) -> Self {
        let latch = inner.frame.latch().read();
        // SAFETY: the frame is kept alive by the Arc in `inner`, and Drop
        // releases the latch before `inner`.
        let latch: RwLockReadGuard<'static, Box<[u8; PAGE_SIZE]>> =
            unsafe { std::mem::transmute(latch) };

        Self {
            inner: Some(inner),
            latch: Some(latch),
        }
    }

    pub fn page_id(&self) -> PageId {
        self.inner
            .as_ref()
            .map_or(INVALID_PAGE_ID, |inner| inner.page_id)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    pub fn data(&self) -> &[u8] {
        &self.latch.as_ref().expect("empty page guard")[..]
    }

    /// Drops this guard, releasing the latch and the pin.
    pub fn drop_guard(self) {
        drop(self);
    }
}

impl Deref for ReadPageGuard {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.data()
    }
}

impl Drop for ReadPageGuard {
    fn drop(&mut self) {
        self.latch.take();
        if let Some(inner) = self.inner.take() {
            inner.release();
        }
    }
}

/// RAII guard owning one pin plus the page's exclusive latch.
/// Mutable access marks the page dirty; on drop the latch is released
/// first, then the pin.
pub struct WritePageGuard {
    inner: Option<GuardInner>,
    /// Exclusive latch on the page data; same lifetime contract as the
    /// read guard's.
    latch: Option<RwLockWriteGuard<'static, Box<[u8; PAGE_SIZE]>>>,
}

impl WritePageGuard {
    fn new(inner: GuardInner) -> Self {
        let latch = inner.frame.latch().write();
        // SAFETY: the frame is kept alive by the Arc in `inner`, and Drop
        // releases the latch before `inner`.
        let latch: RwLockWriteGuard<'static, Box<[u8; PAGE_SIZE]>> =
            unsafe { std::mem::transmute(latch) };

        Self {
            inner: Some(inner),
            latch: Some(latch),
        }
    }

    pub fn page_id(&self) -> PageId {
        self.inner
            .as_ref()
            .map_or(INVALID_PAGE_ID, |inner| inner.page_id)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    pub fn data(&self) -> &[u8] {
        &self.latch.as_ref().expect("empty page guard")[..]
    }

    /// Mutable view of the page image. Marks the pending dirty flag.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.inner.as_mut().expect("empty page guard").is_dirty = true;
        &mut self.latch.as_mut().expect("empty page guard")[..]
    }

    /// Drops this guard, releasing the latch and the pin.
    pub fn drop_guard(self) {
        drop(self);
    }
}

impl Deref for WritePageGuard {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.data()
    }
}

impl DerefMut for WritePageGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.data_mut()
    }
}

impl Drop for WritePageGuard {
    fn drop(&mut self) {
        self.latch.take();
        if let Some(inner) = self.inner.take() {
            inner.release();
        }
    }
}
