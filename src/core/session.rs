use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime};

/// One run of the capture engine.
///
/// Shared between the engine and its capture thread. The sequence counter
/// and start time live here so every `start` begins from scratch; after the
/// session stops they stay readable.
#[derive(Debug)]
pub struct CaptureSession {
    interface: String,
    filter: String,
    started_at: SystemTime,
    started: Instant,
    running: AtomicBool,
    sequence: AtomicU64,
}

impl CaptureSession {
    pub(crate) fn new(interface: &str, filter: &str) -> Self {
        Self {
            interface: interface.to_string(),
            filter: filter.to_string(),
            started_at: SystemTime::now(),
            started: Instant::now(),
            running: AtomicBool::new(true),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of frames captured so far (the last sequence number issued).
    pub fn packets(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Sequence numbers start at 1.
    pub(crate) fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Time from session start to a frame's capture timestamp. Kernel
    /// timestamps can precede `started_at` slightly; those clamp to zero.
    pub(crate) fn elapsed_at(&self, timestamp: SystemTime) -> Duration {
        timestamp.duration_since(self.started_at).unwrap_or(Duration::ZERO)
    }

    /// Clears the running flag. Returns whether it was still set.
    pub(crate) fn halt(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_at_one() {
        let session = CaptureSession::new("eth0", "tcp");
        assert_eq!(session.packets(), 0);
        assert_eq!(session.next_sequence(), 1);
        assert_eq!(session.next_sequence(), 2);
        assert_eq!(session.packets(), 2);
    }

    #[test]
    fn test_halt_only_once() {
        let session = CaptureSession::new("eth0", "");
        assert!(session.is_running());
        assert!(session.halt());
        assert!(!session.halt());
        assert!(!session.is_running());
    }

    #[test]
    fn test_elapsed_clamps_to_zero() {
        let session = CaptureSession::new("eth0", "");
        let before = session.started_at() - Duration::from_millis(5);
        assert_eq!(session.elapsed_at(before), Duration::ZERO);
        let after = session.started_at() + Duration::from_millis(250);
        assert_eq!(session.elapsed_at(after), Duration::from_millis(250));
    }
}
