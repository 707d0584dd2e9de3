use std::thread;
use std::time::Duration;

/// Default window before the first flush of an idle batch worker
pub const DEFAULT_FIRST_BATCH_WINDOW: Duration = Duration::from_millis(1);

/// Default window between subsequent flushes while a worker stays busy
pub const DEFAULT_BATCH_WINDOW: Duration = Duration::from_millis(3);

/// Default upper bound on requests written in a single frame
pub const DEFAULT_MAX_BATCH_REQUESTS: usize = 256;

/// Default interval between session keep-alive pulses
pub const DEFAULT_PULSE_INTERVAL: Duration = Duration::from_secs(5);

/// Number of batch workers for a machine with `cores` logical cores.
///
/// Small machines get a fixed tier; beyond 16 cores one worker serves
/// every four cores.
pub fn default_worker_count(cores: usize) -> usize {
    match cores {
        0..=4 => 2,
        5..=9 => 3,
        10..=16 => 4,
        n => (n + 3) / 4,
    }
}

/// Client configuration for the multiplexing layer
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Number of batch worker threads shared by all transactions
    pub worker_count: usize,

    /// Delay before the first flush after a worker wakes up
    pub first_batch_window: Duration,

    /// Delay between flushes while requests keep arriving
    pub batch_window: Duration,

    /// Maximum number of requests per outbound frame
    pub max_batch_requests: usize,

    /// Default time to wait for a response (None = wait forever)
    pub request_timeout: Option<Duration>,

    /// Interval between session keep-alive pulses
    pub pulse_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let cores = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            worker_count: default_worker_count(cores),
            first_batch_window: DEFAULT_FIRST_BATCH_WINDOW,
            batch_window: DEFAULT_BATCH_WINDOW,
            max_batch_requests: DEFAULT_MAX_BATCH_REQUESTS,
            request_timeout: None,
            pulse_interval: DEFAULT_PULSE_INTERVAL,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of batch workers
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Set both batch windows
    pub fn with_batch_windows(mut self, first: Duration, subsequent: Duration) -> Self {
        self.first_batch_window = first;
        self.batch_window = subsequent;
        self
    }

    /// Set maximum number of requests per frame
    pub fn with_max_batch_requests(mut self, max: usize) -> Self {
        self.max_batch_requests = max;
        self
    }

    /// Set the default response timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the session pulse interval
    pub fn with_pulse_interval(mut self, interval: Duration) -> Self {
        self.pulse_interval = interval;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".to_string());
        }

        if self.max_batch_requests == 0 {
            return Err("max_batch_requests must be greater than 0".to_string());
        }

        if self.batch_window.is_zero() {
            return Err("batch_window must be greater than 0".to_string());
        }

        if self.pulse_interval.is_zero() {
            return Err("pulse_interval must be greater than 0".to_string());
        }

        if let Some(timeout) = self.request_timeout {
            if timeout.is_zero() {
                return Err("request_timeout must be greater than 0 when set".to_string());
            }
        }

        Ok(())
    }
}
