use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use crate::common::{AccessType, BrambleError, FrameId, Result};

/// Per-frame replacement state.
struct FrameState {
    /// Total number of recorded accesses
    uses: usize,
    /// Whether this frame may currently be evicted
    evictable: bool,
}

/// Interior state, guarded by one mutex.
struct ReplacerInner {
    /// Frames with fewer than k accesses, front = most recent first touch.
    /// Evicted FIFO: the tail is the oldest first touch.
    history: VecDeque<FrameId>,
    /// Frames with at least k accesses, front = most recent k-th access.
    /// Evicted LRU-K: the tail has the largest backward k-distance.
    cache: VecDeque<FrameId>,
    /// Access counter and evictable flag per tracked frame
    frames: HashMap<FrameId, FrameState>,
    /// Number of currently evictable frames across both queues
    curr_size: usize,
}

impl ReplacerInner {
    fn remove_from_queue(queue: &mut VecDeque<FrameId>, frame_id: FrameId) {
        if let Some(pos) = queue.iter().position(|&f| f == frame_id) {
            queue.remove(pos);
        }
    }
}

/// LRU-K replacement policy.
///
/// A frame's eviction priority is the age of its k-th-most-recent access.
/// Frames with fewer than k recorded accesses have infinite backward
/// k-distance and are evicted first, FIFO by first touch; mature frames are
/// evicted by the age of their k-th-most-recent access. The policy is kept
/// as two queues: a history queue for young frames and a cache queue for
/// mature ones. Victim scans walk each queue tail to head, which is
/// O(pool size) worst case; pool sizes are small and fixed.
pub struct LruKReplacer {
    /// K value for the LRU-K algorithm
    k: usize,
    /// Maximum number of frames the replacer can track
    num_frames: usize,
    inner: Mutex<ReplacerInner>,
}

impl LruKReplacer {
    /// Creates a new LRU-K replacer tracking up to `num_frames` frames.
    pub fn new(k: usize, num_frames: usize) -> Self {
        assert!(k >= 1, "LRU-K requires k >= 1");
        Self {
            k,
            num_frames,
            inner: Mutex::new(ReplacerInner {
                history: VecDeque::new(),
                cache: VecDeque::new(),
                frames: HashMap::new(),
                curr_size: 0,
            }),
        }
    }

    /// Records an access to the given frame.
    ///
    /// On the k-th access the frame graduates from the history queue to the
    /// front of the cache queue; later accesses refresh its cache position.
    /// Accesses before the k-th do not reorder the history queue.
    pub fn record_access(&self, frame_id: FrameId, _access_type: AccessType) -> Result<()> {
        if frame_id.as_usize() >= self.num_frames {
            return Err(BrambleError::InvalidFrameId(frame_id));
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let state = inner.frames.entry(frame_id).or_insert(FrameState {
            uses: 0,
            evictable: false,
        });
        state.uses += 1;
        let uses = state.uses;

        if uses == self.k {
            ReplacerInner::remove_from_queue(&mut inner.history, frame_id);
            inner.cache.push_front(frame_id);
        } else if uses > self.k {
            ReplacerInner::remove_from_queue(&mut inner.cache, frame_id);
            inner.cache.push_front(frame_id);
        } else if uses == 1 {
            inner.history.push_front(frame_id);
        }

        Ok(())
    }

    /// Sets whether a frame may be evicted. Idempotent; the evictable count
    /// is adjusted only when the flag actually changes. Out-of-range or
    /// untracked frames are ignored.
    pub fn set_evictable(&self, frame_id: FrameId, evictable: bool) {
        if frame_id.as_usize() >= self.num_frames {
            return;
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if let Some(state) = inner.frames.get_mut(&frame_id) {
            if state.evictable != evictable {
                state.evictable = evictable;
                if evictable {
                    inner.curr_size += 1;
                } else {
                    inner.curr_size -= 1;
                }
            }
        }
    }

    /// Evicts the frame with the largest backward k-distance.
    ///
    /// The history queue is scanned tail to head first; only if it contains
    /// no evictable frame does the cache queue get scanned, also tail to
    /// head. Eviction clears the frame's access history. Returns None when
    /// nothing is evictable.
    pub fn evict(&self) -> Option<FrameId> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if inner.curr_size == 0 {
            return None;
        }

        let pick = |queue: &VecDeque<FrameId>, frames: &HashMap<FrameId, FrameState>| {
            queue
                .iter()
                .rev()
                .find(|f| frames.get(*f).map_or(false, |s| s.evictable))
                .copied()
        };

        let victim = pick(&inner.history, &inner.frames)
            .map(|f| (f, true))
            .or_else(|| pick(&inner.cache, &inner.frames).map(|f| (f, false)));

        if let Some((frame_id, in_history)) = victim {
            if in_history {
                ReplacerInner::remove_from_queue(&mut inner.history, frame_id);
            } else {
                ReplacerInner::remove_from_queue(&mut inner.cache, frame_id);
            }
            inner.frames.remove(&frame_id);
            inner.curr_size -= 1;
            return Some(frame_id);
        }

        None
    }

    /// Removes an evictable frame from the replacer, clearing its history.
    /// Removing a non-evictable (or unknown) frame is a no-op; callers must
    /// mark the frame evictable first.
    pub fn remove(&self, frame_id: FrameId) {
        if frame_id.as_usize() >= self.num_frames {
            return;
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let uses = match inner.frames.get(&frame_id) {
            Some(state) if state.evictable => state.uses,
            _ => return,
        };

        if uses < self.k {
            ReplacerInner::remove_from_queue(&mut inner.history, frame_id);
        } else {
            ReplacerInner::remove_from_queue(&mut inner.cache, frame_id);
        }
        inner.frames.remove(&frame_id);
        inner.curr_size -= 1;
    }

    /// Returns the number of evictable frames.
    pub fn size(&self) -> usize {
        self.inner.lock().curr_size
    }

    /// Returns the k value of this replacer.
    pub fn k(&self) -> usize {
        self.k
    }
}
