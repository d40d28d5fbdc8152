use parking_lot::Mutex;

/// Point-in-time view of a job's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadProgress {
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    pub completed: bool,
}

/// The mutable half of a download job. Every field sits behind one lock
/// that is never held across I/O.
#[derive(Debug, Default)]
pub struct DownloadTracker {
    progress: Mutex<DownloadProgress>,
}

impl DownloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_total_size(&self, total_bytes: u64) {
        self.progress.lock().total_bytes = total_bytes;
    }

    pub fn add_downloaded(&self, length: u64) {
        self.progress.lock().downloaded_bytes += length;
    }

    pub fn mark_completed(&self) {
        self.progress.lock().completed = true;
    }

    pub fn progress(&self) -> DownloadProgress {
        *self.progress.lock()
    }
}
