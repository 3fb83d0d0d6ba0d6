//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Per-call retry constants
pub mod retry {
    /// Maximum retries after the initial attempt
    pub const MAX_RETRIES: u32 = 2;

    /// Initial delay before the first retry (milliseconds)
    pub const INITIAL_DELAY_MS: u64 = 1000;

    /// Backoff multiplier applied after every failed attempt
    pub const BACKOFF_MULTIPLIER: f32 = 1.5;
}

/// Document shape constants
pub mod document {
    /// Number of outline section titles requested from the model
    pub const SECTION_COUNT: usize = 6;

    /// Hard cap on parsed outline titles regardless of model output
    pub const MAX_SECTIONS: usize = 6;

    /// Target title length range (Korean characters)
    pub const TITLE_MIN_CHARS: usize = 15;
    pub const TITLE_MAX_CHARS: usize = 25;
}

/// Admission shaping constants
///
/// Randomized delay before the first provider attempt so that many
/// simultaneous requests do not burst against upstream providers.
pub mod admission {
    /// Minimum admission delay (milliseconds)
    pub const MIN_DELAY_MS: u64 = 1000;

    /// Maximum admission delay (milliseconds)
    pub const MAX_DELAY_MS: u64 = 4000;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout per model call (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
