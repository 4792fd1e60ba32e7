/// Snapshot handed to progress callbacks after each persisted response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Bytes on disk for this download (partial file, or destination once
    /// complete).
    pub bytes_persisted: u64,

    /// Total size of the resource, when the server announced it.
    pub total_bytes: Option<u64>,

    /// 0-based attempt that produced this snapshot.
    pub attempt: u32,
}

impl Progress {
    pub fn new(bytes_persisted: u64, total_bytes: Option<u64>, attempt: u32) -> Self {
        Self {
            bytes_persisted,
            total_bytes,
            attempt,
        }
    }

    pub fn percentage(&self) -> Option<f32> {
        self.total_bytes.map(|total| {
            if total == 0 {
                0.0
            } else {
                (self.bytes_persisted as f32 / total as f32) * 100.0
            }
        })
    }
}
