use thiserror::Error;

/// Errors raised by the plumbing around the counting core: configuration, loading, pool set-up.
///
/// The core stages themselves never return errors. A broken internal invariant there is a bug
/// and aborts the run through an assertion naming the invariant.
#[derive(Debug, Error)]
pub enum TcError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown kernel strategy `{0}`")]
    UnknownStrategy(String),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type TcResult<T> = Result<T, TcError>;
