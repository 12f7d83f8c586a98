//! FILENAME: core/skeleton-store/src/sync.rs
//! Sync Queue - Serialized, coalescing background writes of the library.
//!
//! Algorithm:
//! 1. Callers submit whole snapshots; submission never blocks on disk
//! 2. The writer thread wakes on the first message, then drains the channel
//! 3. Only the newest drained snapshot is written (older ones are superseded)
//! 4. Flush requests drained in the same batch are acknowledged after the write
//! 5. Dropping the queue writes anything pending and joins the thread

use crate::error::StoreError;
use crate::model::LibrarySnapshot;
use crate::storage::JsonStorage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

enum Command {
    Write(Box<LibrarySnapshot>),
    Flush(Sender<()>),
    Shutdown,
}

#[derive(Debug, Default)]
struct Shared {
    last_error: Mutex<Option<String>>,
    writes: AtomicUsize,
}

pub struct SyncQueue {
    tx: Sender<Command>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl SyncQueue {
    /// Starts the writer thread for `storage`.
    pub fn spawn(storage: JsonStorage) -> Result<Self, StoreError> {
        let (tx, rx) = channel();
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);

        let worker = thread::Builder::new()
            .name("demolens-sync".to_string())
            .spawn(move || run_writer(storage, rx, worker_shared))?;

        Ok(SyncQueue {
            tx,
            shared,
            worker: Some(worker),
        })
    }

    /// Queues `snapshot` for writing.
    pub fn submit(&self, snapshot: LibrarySnapshot) {
        let _ = self.tx.send(Command::Write(Box::new(snapshot)));
    }

    /// Blocks until every snapshot submitted before this call is on disk.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = channel();
        if self.tx.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// The most recent write failure, if the last write failed.
    pub fn last_error(&self) -> Option<String> {
        self.shared
            .last_error
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    /// Number of files written so far.
    pub fn write_count(&self) -> usize {
        self.shared.writes.load(Ordering::SeqCst)
    }
}

impl Drop for SyncQueue {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_writer(storage: JsonStorage, rx: Receiver<Command>, shared: Arc<Shared>) {
    while let Ok(first) = rx.recv() {
        let mut pending: Option<Box<LibrarySnapshot>> = None;
        let mut acks: Vec<Sender<()>> = Vec::new();
        let mut shutdown = false;

        for command in std::iter::once(first).chain(rx.try_iter()) {
            match command {
                Command::Write(snapshot) => pending = Some(snapshot),
                Command::Flush(ack) => acks.push(ack),
                Command::Shutdown => shutdown = true,
            }
        }

        if let Some(snapshot) = pending {
            let result = storage.save(&snapshot);
            if let Ok(mut last_error) = shared.last_error.lock() {
                *last_error = result.err().map(|e| e.to_string());
            }
            shared.writes.fetch_add(1, Ordering::SeqCst);
        }

        for ack in acks {
            let _ = ack.send(());
        }

        if shutdown {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scenario;

    #[test]
    fn test_flush_persists_latest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path().join("library.json"));
        let queue = SyncQueue::spawn(storage.clone()).unwrap();

        let mut snapshot = LibrarySnapshot::default();
        for i in 0..20 {
            snapshot.scenarios.push(Scenario::new(format!("S{}", i), None));
            queue.submit(snapshot.clone());
        }
        queue.flush();

        assert_eq!(storage.load().unwrap(), snapshot);
        assert!(queue.write_count() >= 1);
        assert!(queue.write_count() <= 20);
        assert!(queue.last_error().is_none());
    }

    #[test]
    fn test_drop_drains_pending_writes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path().join("library.json"));

        let mut snapshot = LibrarySnapshot::default();
        snapshot.active_scenario_id = Some("a".to_string());
        {
            let queue = SyncQueue::spawn(storage.clone()).unwrap();
            queue.submit(snapshot.clone());
        }

        assert_eq!(storage.load().unwrap(), snapshot);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("library.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        let queue = SyncQueue::spawn(JsonStorage::new(path)).unwrap();
        queue.submit(LibrarySnapshot::default());
        queue.flush();

        assert!(queue.last_error().is_some());
    }

    #[test]
    fn test_flush_without_writes_returns() {
        let dir = tempfile::tempdir().unwrap();
        let queue = SyncQueue::spawn(JsonStorage::new(dir.path().join("library.json"))).unwrap();
        queue.flush();
        assert_eq!(queue.write_count(), 0);
    }
}
