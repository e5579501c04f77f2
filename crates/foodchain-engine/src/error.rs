//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run so
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: foodchain_core::ConfigError,
    },

    /// Clock initialization failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: foodchain_core::ClockError,
    },

    /// The initial population could not be spawned.
    #[error("spawner error: {source}")]
    Spawn {
        /// The underlying spawn error.
        #[from]
        source: foodchain_core::SpawnError,
    },

    /// The run loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: foodchain_core::RunnerError,
    },

    /// Writing the final report failed.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
