use thiserror::Error;

/// Core error type for the controller.
///
/// Variants line up with the error taxonomy the controller classifies every
/// failure into: `Config` and `SchemaInitTimeout` are fatal at startup,
/// `BackingStoreTransient` and `LockLost` are recovered locally by the
/// election loop (they never reach a client), and `NotLeader`/`Internal`
/// are the only variants a client ever sees directly.
#[derive(Error, Debug)]
pub enum DspuError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("schema init timed out after {elapsed_s:.1}s: {last_error}")]
    SchemaInitTimeout { elapsed_s: f64, last_error: String },

    #[error("backing store transient error: {0}")]
    BackingStoreTransient(String),

    #[error("lock lost: {0}")]
    LockLost(String),

    #[error("not leader")]
    NotLeader,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`DspuError`].
pub type Result<T> = std::result::Result<T, DspuError>;
