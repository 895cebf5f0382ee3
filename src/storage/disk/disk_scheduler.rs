use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::common::{BrambleError, PageId, Result, PAGE_SIZE};

use super::DiskManager;

/// A disk I/O request processed by the background worker.
/// Buffers are owned by the request so nothing outlives its borrow.
enum DiskRequest {
    Read {
        page_id: PageId,
        reply: Sender<Result<Box<[u8; PAGE_SIZE]>>>,
    },
    Write {
        page_id: PageId,
        data: Box<[u8; PAGE_SIZE]>,
        reply: Sender<Result<()>>,
    },
}

/// DiskScheduler manages a background worker thread that processes disk I/O
/// requests from a queue. The synchronous wrappers block until the worker
/// signals completion.
pub struct DiskScheduler {
    /// The disk manager for actual I/O operations
    disk_manager: Arc<DiskManager>,
    /// Channel sender for queuing requests. Dropped on shutdown, which makes
    /// the worker's recv fail and the loop exit.
    request_sender: Option<Sender<DiskRequest>>,
    /// Handle to the background worker thread
    worker_handle: Option<JoinHandle<()>>,
}

impl DiskScheduler {
    /// Creates a new DiskScheduler with the given DiskManager and spawns its
    /// worker thread.
    pub fn new(disk_manager: Arc<DiskManager>) -> Self {
        let (sender, receiver) = unbounded::<DiskRequest>();

        let dm = Arc::clone(&disk_manager);
        let worker_handle = thread::spawn(move || {
            Self::run_worker(dm, receiver);
        });

        Self {
            disk_manager,
            request_sender: Some(sender),
            worker_handle: Some(worker_handle),
        }
    }

    /// Schedules a read and waits for completion, returning the page image.
    pub fn schedule_read_sync(&self, page_id: PageId) -> Result<Box<[u8; PAGE_SIZE]>> {
        let (tx, rx) = bounded(1);
        self.submit(DiskRequest::Read { page_id, reply: tx })?;
        Self::wait(rx.recv())
    }

    /// Schedules a write of the given page image and waits for completion.
    pub fn schedule_write_sync(&self, page_id: PageId, data: &[u8]) -> Result<()> {
        assert_eq!(data.len(), PAGE_SIZE);

        let mut owned = Box::new([0u8; PAGE_SIZE]);
        owned.copy_from_slice(data);

        let (tx, rx) = bounded(1);
        self.submit(DiskRequest::Write {
            page_id,
            data: owned,
            reply: tx,
        })?;
        Self::wait(rx.recv())
    }

    /// Returns a reference to the underlying DiskManager.
    pub fn disk_manager(&self) -> &Arc<DiskManager> {
        &self.disk_manager
    }

    fn submit(&self, request: DiskRequest) -> Result<()> {
        let sender = self
            .request_sender
            .as_ref()
            .ok_or_else(|| BrambleError::Scheduler("scheduler shut down".to_string()))?;
        sender
            .send(request)
            .map_err(|e| BrambleError::Scheduler(format!("failed to queue request: {}", e)))
    }

    fn wait<T>(received: std::result::Result<Result<T>, crossbeam_channel::RecvError>) -> Result<T> {
        received
            .map_err(|e| BrambleError::Scheduler(format!("worker dropped reply: {}", e)))?
    }

    /// Worker loop: drains requests until the request channel closes.
    fn run_worker(disk_manager: Arc<DiskManager>, receiver: Receiver<DiskRequest>) {
        while let Ok(request) = receiver.recv() {
            match request {
                DiskRequest::Read { page_id, reply } => {
                    let mut buf = Box::new([0u8; PAGE_SIZE]);
                    let result = disk_manager
                        .read_page(page_id, &mut buf[..])
                        .map(|_| buf);
                    let _ = reply.send(result);
                }
                DiskRequest::Write {
                    page_id,
                    data,
                    reply,
                } => {
                    let _ = reply.send(disk_manager.write_page(page_id, &data[..]));
                }
            }
        }
    }
}

impl Drop for DiskScheduler {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish queued work and exit.
        self.request_sender.take();
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}
