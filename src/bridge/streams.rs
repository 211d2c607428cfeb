//! Registry of background streaming tasks keyed by container id

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Default)]
pub struct StreamTasks {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl StreamTasks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track a task, aborting any earlier task for the same key
    pub fn insert(&self, key: &str, handle: JoinHandle<()>) {
        if let Some(previous) = self.lock().insert(key.to_string(), handle) {
            debug!("Replacing stream task for {}", key);
            previous.abort();
        }
    }

    /// Abort and forget the task for `key`. Returns whether one was running.
    pub fn abort(&self, key: &str) -> bool {
        match self.lock().remove(key) {
            Some(handle) => {
                let running = !handle.is_finished();
                handle.abort();
                running
            }
            None => false,
        }
    }

    pub fn abort_all(&self) {
        for (key, handle) in self.lock().drain() {
            debug!("Aborting stream task for {}", key);
            handle.abort();
        }
    }
}

impl Drop for StreamTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}
