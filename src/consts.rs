pub mod cli_consts {
    //! Client configuration constants
    //!
    //! Grouped by functional area.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// The maximum number of notifications kept in the activity log.
    pub const MAX_ACTIVITY_LOGS: usize = 100;

    /// Buffer size of the channel carrying fetch outcomes back to the UI loop.
    pub const OUTCOME_QUEUE_SIZE: usize = 64;

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    pub mod network {
        use std::time::Duration;

        /// Connect timeout for backend requests (seconds)
        pub const CONNECT_TIMEOUT_SECS: u64 = 10;

        /// Overall request timeout (seconds)
        pub const REQUEST_TIMEOUT_SECS: u64 = 10;

        pub const fn connect_timeout() -> Duration {
            Duration::from_secs(CONNECT_TIMEOUT_SECS)
        }

        pub const fn request_timeout() -> Duration {
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        }
    }

    // =============================================================================
    // UI CONFIGURATION
    // =============================================================================

    pub mod ui {
        use std::time::Duration;

        /// How long a notification stays visible (milliseconds)
        pub const NOTIFICATION_TTL_MS: u64 = 4_000;

        /// Header clock refresh interval (milliseconds)
        pub const CLOCK_INTERVAL_MS: u64 = 1_000;

        /// Key polling interval of the UI loop (milliseconds)
        pub const POLL_INTERVAL_MS: u64 = 100;

        /// Number of neighborhoods shown in the statistics bar chart
        pub const TOP_NEIGHBORHOODS: usize = 10;

        pub const fn notification_ttl() -> Duration {
            Duration::from_millis(NOTIFICATION_TTL_MS)
        }

        pub const fn clock_interval() -> Duration {
            Duration::from_millis(CLOCK_INTERVAL_MS)
        }

        pub const fn poll_interval() -> Duration {
            Duration::from_millis(POLL_INTERVAL_MS)
        }
    }
}
