//! Bramble - an educational disk-backed storage engine core
//!
//! The crate provides the three subsystems every disk-oriented database
//! rests on: a buffer pool that caches fixed-size pages in memory, scoped
//! guards that tie page pins and latches to lexical scope, and a concurrent
//! B+Tree index built on top of both.
//!
//! # Architecture
//!
//! - **Disk layer** (`storage::disk`): byte-level page I/O
//!   - `DiskManager`: reads and writes pages in a single database file
//!   - `DiskScheduler`: background worker the buffer pool issues I/O through
//!
//! - **Buffer pool** (`buffer`): memory management for database pages
//!   - `BufferPoolManager`: maps page ids onto frames, pins, fetches, flushes
//!   - `LruKReplacer`: LRU-K page replacement policy
//!   - `FrameHeader`: per-frame metadata and the page latch
//!   - `BasicPageGuard`/`ReadPageGuard`/`WritePageGuard`: RAII pin + latch
//!     ownership
//!
//! - **Index** (`index`): ordered access methods
//!   - `BPlusTree`: concurrent B+Tree with latch crabbing
//!   - `BTreeIterator`: forward scan over the leaf chain
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bramble::buffer::BufferPoolManager;
//! use bramble::index::{BPlusTree, BytewiseComparator, FixedKey};
//! use bramble::storage::disk::DiskManager;
//! use bramble::{PageId, RecordId, SlotId};
//!
//! let disk_manager = Arc::new(DiskManager::new("bramble.db").unwrap());
//! let bpm = Arc::new(BufferPoolManager::new(64, 2, disk_manager));
//!
//! let tree = BPlusTree::<8, _>::new(bpm, BytewiseComparator, 32, 32).unwrap();
//! let record = RecordId::new(PageId::new(7), SlotId::new(0));
//! tree.insert(&FixedKey::from_u64(42), record).unwrap();
//!
//! let mut found = Vec::new();
//! assert!(tree.get_value(&FixedKey::from_u64(42), &mut found).unwrap());
//! ```

pub mod buffer;
pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used types at the crate root
pub use common::{BrambleError, PageId, RecordId, Result, SlotId};
