use std::time::Duration;

/// Settings for opening an interface and running a capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Maximum bytes kept per frame.
    pub snaplen: i32,
    pub promiscuous: bool,
    /// How long a read may block before the capture thread rechecks its
    /// running flag.
    pub read_timeout: Duration,
    /// Deliver frames as they arrive instead of batching in the kernel.
    pub immediate_mode: bool,
    /// Upper bound on how long `stop` waits for the capture thread.
    pub stop_timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            snaplen: 65535,
            promiscuous: true,
            read_timeout: Duration::from_millis(100),
            immediate_mode: true,
            stop_timeout: Duration::from_secs(2),
        }
    }
}

impl CaptureConfig {
    /// Read timeout in the millisecond form libpcap expects.
    pub fn read_timeout_ms(&self) -> i32 {
        i32::try_from(self.read_timeout.as_millis()).unwrap_or(i32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.snaplen, 65535);
        assert_eq!(config.read_timeout_ms(), 100);
        assert!(config.stop_timeout > config.read_timeout);
    }
}
