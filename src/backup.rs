//! Periodic snapshot backup into the secondary persisted slot.
//!
//! Backup failures are logged and swallowed; they never surface as a
//! user-facing error and never block user-initiated operations.

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

use crate::repository::Repository;
use crate::store::KEY_BACKUP;

/// Background thread writing the backup slot on a fixed interval.
///
/// For long-running embedders. The thread opens its own repository view on
/// every tick; there is no coordination with foreground writers beyond the
/// store's atomic whole-file writes.
#[derive(Debug)]
pub struct BackupScheduler {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl BackupScheduler {
    /// Spawn the scheduler over a data directory
    pub fn spawn(data_dir: PathBuf, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => run_backup(&data_dir),
            }
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the thread and wait for it to finish
    pub fn stop(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for BackupScheduler {
    fn drop(&mut self) {
        // Unblock the thread if stop() was never called.
        let _ = self.stop_tx.send(());
    }
}

fn run_backup(data_dir: &PathBuf) {
    match Repository::open(data_dir) {
        Ok(repo) => {
            if repo.write_backup() {
                debug!("periodic backup completed");
            }
            // write_backup already logged the failure case
        }
        Err(err) => warn!(%err, "periodic backup could not open repository"),
    }
}

/// Refresh the backup slot when it is missing or older than `max_age`.
///
/// The short-lived-process counterpart of the scheduler: called after
/// mutating CLI commands. Returns whether a backup was written; failures
/// are logged only.
pub fn maybe_backup(repo: &Repository, max_age: Duration) -> bool {
    let slot = repo.store().path_for(KEY_BACKUP);
    let stale = match slot.metadata().and_then(|m| m.modified()) {
        Ok(modified) => SystemTime::now()
            .duration_since(modified)
            .map(|age| age >= max_age)
            .unwrap_or(true),
        // Missing slot or unreadable metadata both mean "write one now".
        Err(_) => true,
    };

    if !stale {
        return false;
    }
    repo.write_backup()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use tempfile::TempDir;

    #[test]
    fn scheduler_writes_slot_and_stops() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("data");
        let repo = Repository::open(&data_dir).unwrap();
        repo.add_task(Task::new("backed up")).unwrap();

        let scheduler = BackupScheduler::spawn(data_dir.clone(), Duration::from_millis(20));
        let slot = repo.store().path_for(KEY_BACKUP);
        for _ in 0..100 {
            if slot.exists() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        scheduler.stop();

        assert!(slot.exists());
        let backup: crate::repository::Snapshot = repo.store().get(KEY_BACKUP).unwrap().unwrap();
        assert_eq!(backup.tasks.len(), 1);
    }

    #[test]
    fn maybe_backup_refreshes_only_when_stale() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::open(temp.path().join("data")).unwrap();

        // No slot yet: writes one
        assert!(maybe_backup(&repo, Duration::from_secs(3600)));
        // Fresh slot within max_age: skipped
        assert!(!maybe_backup(&repo, Duration::from_secs(3600)));
        // Zero max_age always refreshes
        assert!(maybe_backup(&repo, Duration::ZERO));
    }
}
