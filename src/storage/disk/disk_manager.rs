use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;

use crate::common::{PageId, Result, PAGE_SIZE};

/// DiskManager is responsible for reading and writing fixed-size pages
/// to/from a single database file. Pages live at `page_id * PAGE_SIZE`.
pub struct DiskManager {
    /// The database file, guarded for exclusive cursor access
    file: Mutex<File>,
    /// Path the file was opened from
    db_path: PathBuf,
    /// Number of disk reads performed
    num_reads: AtomicU32,
    /// Number of disk writes performed
    num_writes: AtomicU32,
    /// Number of pages handed back via deallocate_page
    num_deallocs: AtomicU32,
}

impl DiskManager {
    /// Creates a new DiskManager for the given database file path.
    /// The file is created if it does not exist.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&db_path)?;

        Ok(Self {
            file: Mutex::new(file),
            db_path,
            num_reads: AtomicU32::new(0),
            num_writes: AtomicU32::new(0),
            num_deallocs: AtomicU32::new(0),
        })
    }

    /// Reads a page from disk into the provided buffer.
    /// Reads past the end of the file yield zeroed bytes.
    pub fn read_page(&self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        assert_eq!(data.len(), PAGE_SIZE, "Buffer must be PAGE_SIZE bytes");

        let byte_offset = page_id.as_u64() * PAGE_SIZE as u64;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(byte_offset))?;

        let mut total = 0;
        while total < PAGE_SIZE {
            let n = file.read(&mut data[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        if total < PAGE_SIZE {
            data[total..].fill(0);
        }

        self.num_reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Writes a page to disk from the provided buffer.
    pub fn write_page(&self, page_id: PageId, data: &[u8]) -> Result<()> {
        assert_eq!(data.len(), PAGE_SIZE, "Buffer must be PAGE_SIZE bytes");

        let byte_offset = page_id.as_u64() * PAGE_SIZE as u64;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(byte_offset))?;
        file.write_all(data)?;
        file.flush()?;

        self.num_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Releases a logical page id. The on-disk bytes are left in place;
    /// the id simply stops being referenced by the caller.
    pub fn deallocate_page(&self, _page_id: PageId) -> Result<()> {
        self.num_deallocs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn get_num_reads(&self) -> u32 {
        self.num_reads.load(Ordering::Relaxed)
    }

    pub fn get_num_writes(&self) -> u32 {
        self.num_writes.load(Ordering::Relaxed)
    }

    pub fn get_num_deallocs(&self) -> u32 {
        self.num_deallocs.load(Ordering::Relaxed)
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn sync(&self) -> Result<()> {
        let file = self.file.lock();
        file.sync_all()?;
        Ok(())
    }
}

impl Drop for DiskManager {
    fn drop(&mut self) {
        let file = self.file.get_mut();
        let _ = file.sync_all();
    }
}
